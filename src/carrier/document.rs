// Copyright (c) 2026 Stegvault Contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Text document carrier.
//!
//! Documents have no noise floor to hide in, so the channel is zero-width
//! characters instead of LSBs: U+200B (zero-width space) encodes a 0 bit,
//! U+200C (zero-width non-joiner) a 1 bit. After each visible character the
//! encoder appends at most eight carrier characters, one payload byte per
//! visible character, which keeps the inflation bounded and the text renders
//! unchanged.
//!
//! Embedding strips any zero-width characters already present; they would
//! otherwise be read back as payload bits.

use crate::carrier::bits::{bits_to_bytes, bytes_to_bits};
use crate::carrier::header::{self, HEADER_LEN, HEADER_OVERHEAD};
use crate::error::CoreError;

const ZW_ZERO: char = '\u{200B}';
const ZW_ONE: char = '\u{200C}';

fn is_carrier_char(c: char) -> bool {
    c == ZW_ZERO || c == ZW_ONE
}

/// Content-based check: any valid UTF-8 text. Documents are the fallback
/// carrier type, tried after the binary formats.
pub fn detect(bytes: &[u8]) -> bool {
    std::str::from_utf8(bytes).is_ok()
}

fn visible_count(text: &str) -> usize {
    text.chars().filter(|c| !is_carrier_char(*c)).count()
}

/// Ciphertext bytes the document can hold: one payload byte per visible
/// character, minus the message header.
pub fn capacity(text: &str) -> usize {
    visible_count(text).saturating_sub(HEADER_OVERHEAD)
}

/// Interleave `message` (header plus ciphertext) into the text.
pub fn embed(text: &str, message: &[u8]) -> Result<String, CoreError> {
    let available = capacity(text);
    let needed = message.len().saturating_sub(HEADER_OVERHEAD);
    if message.len() > visible_count(text) {
        return Err(CoreError::CapacityExceeded { needed, available });
    }

    let bits = bytes_to_bits(message);
    let mut out = String::with_capacity(text.len() + bits.len() * 3);
    let mut next = 0usize;
    for c in text.chars().filter(|c| !is_carrier_char(*c)) {
        out.push(c);
        for &bit in bits.get(next..(next + 8).min(bits.len())).unwrap_or(&[]) {
            out.push(if bit == 1 { ZW_ONE } else { ZW_ZERO });
        }
        next = (next + 8).min(bits.len());
    }
    Ok(out)
}

/// Recover the ciphertext from a document's zero-width characters.
pub fn extract(text: &str) -> Result<Vec<u8>, CoreError> {
    let bits: Vec<u8> = text
        .chars()
        .filter_map(|c| match c {
            ZW_ZERO => Some(0),
            ZW_ONE => Some(1),
            _ => None,
        })
        .collect();
    let bytes = bits_to_bytes(&bits[..bits.len() & !7]);

    if bytes.len() < HEADER_LEN {
        return Err(CoreError::NoPayloadFound);
    }
    let parsed = header::parse(&bytes[..HEADER_LEN])?;
    let end = HEADER_LEN + parsed.ciphertext_len;
    if bytes.len() < end {
        return Err(CoreError::TruncatedPayload);
    }
    let ciphertext = &bytes[HEADER_LEN..end];
    parsed.verify(ciphertext)?;
    Ok(ciphertext.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "The quick brown fox jumps over the lazy dog. \
                        Pack my box with five dozen liquor jugs.";

    #[test]
    fn embed_extract_roundtrip() {
        let ciphertext = vec![0x5A; 16];
        let message = header::seal(&ciphertext);
        let stego = embed(TEXT, &message).unwrap();
        assert_eq!(extract(&stego).unwrap(), ciphertext);
    }

    #[test]
    fn stego_text_renders_identically() {
        let message = header::seal(&[1, 2, 3]);
        let stego = embed(TEXT, &message).unwrap();
        let visible: String = stego.chars().filter(|c| !is_carrier_char(*c)).collect();
        assert_eq!(visible, TEXT);
    }

    #[test]
    fn at_most_eight_carriers_per_visible_char() {
        let message = header::seal(&[0xFF; 20]);
        let stego = embed(TEXT, &message).unwrap();
        let mut run = 0usize;
        for c in stego.chars() {
            if is_carrier_char(c) {
                run += 1;
                assert!(run <= 8);
            } else {
                run = 0;
            }
        }
    }

    #[test]
    fn existing_zero_width_chars_stripped_before_embed() {
        let dirty = format!("ab{}{}cd", ZW_ONE, ZW_ZERO);
        let message = header::seal(&[9]);
        // 4 visible chars cannot hold a 13-byte message.
        assert!(embed(&dirty, &message).is_err());

        let long = format!("{}{}{}", TEXT, ZW_ONE, TEXT);
        let stego = embed(&long, &message).unwrap();
        assert_eq!(extract(&stego).unwrap(), vec![9]);
    }

    #[test]
    fn capacity_counts_visible_chars_only() {
        assert_eq!(capacity(""), 0);
        assert_eq!(capacity(TEXT), TEXT.chars().count() - HEADER_OVERHEAD);
        let noisy = format!("{}{}", ZW_ZERO, ZW_ONE);
        assert_eq!(capacity(&noisy), 0);
    }

    #[test]
    fn capacity_boundary_is_exact() {
        let text: String = "x".repeat(40);
        let fit = vec![0xAB; capacity(&text)];
        assert!(embed(&text, &header::seal(&fit)).is_ok());

        let too_big = vec![0xAB; capacity(&text) + 1];
        assert!(matches!(
            embed(&text, &header::seal(&too_big)),
            Err(CoreError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn clean_document_has_no_payload() {
        assert!(matches!(extract(TEXT), Err(CoreError::NoPayloadFound)));
        assert!(matches!(extract(""), Err(CoreError::NoPayloadFound)));
    }

    #[test]
    fn truncated_channel_reported() {
        let message = header::seal(&[0x77; 30]);
        let stego = embed(TEXT, &message).unwrap();
        // Drop enough trailing carriers to lose part of the ciphertext.
        let cut: String = stego
            .chars()
            .rev()
            .skip_while(|c| !is_carrier_char(*c))
            .skip(40)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        assert!(matches!(extract(&cut), Err(CoreError::TruncatedPayload)));
    }

    #[test]
    fn unicode_text_supported() {
        let text = "こんにちは世界。素晴らしい一日ですね。雨が降っています。".repeat(2);
        let ciphertext = vec![0xC3; 8];
        let stego = embed(&text, &header::seal(&ciphertext)).unwrap();
        assert_eq!(extract(&stego).unwrap(), ciphertext);
    }
}
