// Copyright (c) 2026 Stegvault Contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Carrier codecs: capacity, embed and extract for each media family.
//!
//! Detection is content-based only. Filenames and extensions are never
//! consulted; the bytes decide. The binary containers are tried first and
//! plain UTF-8 text is the fallback, so a `.txt` file holding a bitmap is
//! treated as an image.
//!
//! The binary codecs share one mechanism: each describes its embeddable byte
//! positions as [`bits::Regions`] and the payload lands in the LSBs of those
//! positions. The document codec carries bits as zero-width characters
//! instead. All codecs embed the same message layout (see [`header`]), so
//! capacity, embed and extract behave identically from the caller's side.

pub mod audio;
pub mod bits;
pub mod document;
pub mod header;
pub mod image;
pub mod video;

use serde::{Deserialize, Serialize};

use crate::carrier::bits::{read_lsb, write_lsb, Regions};
use crate::carrier::header::{HEADER_LEN, HEADER_OVERHEAD};
use crate::error::CoreError;

/// Media family a carrier was detected as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Audio,
    Video,
    Document,
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FileType::Image => "image",
            FileType::Audio => "audio",
            FileType::Video => "video",
            FileType::Document => "document",
        };
        f.write_str(s)
    }
}

/// Classify a carrier by content.
///
/// # Errors
/// [`CoreError::UnsupportedCarrierType`] when no codec accepts the bytes.
pub fn detect(bytes: &[u8]) -> Result<FileType, CoreError> {
    if image::detect(bytes) {
        Ok(FileType::Image)
    } else if audio::detect(bytes) {
        Ok(FileType::Audio)
    } else if video::detect(bytes) {
        Ok(FileType::Video)
    } else if document::detect(bytes) {
        Ok(FileType::Document)
    } else {
        Err(CoreError::UnsupportedCarrierType)
    }
}

fn regions_for(bytes: &[u8], file_type: FileType) -> Result<Regions, CoreError> {
    match file_type {
        FileType::Image => image::regions(bytes),
        FileType::Audio => audio::regions(bytes),
        FileType::Video => video::regions(bytes),
        FileType::Document => unreachable!("documents have no LSB regions"),
    }
}

/// Ciphertext bytes this carrier can hold after the message header.
pub fn capacity_for(bytes: &[u8], file_type: FileType) -> Result<usize, CoreError> {
    match file_type {
        FileType::Document => {
            let text = as_text(bytes)?;
            Ok(document::capacity(text))
        }
        _ => {
            let regions = regions_for(bytes, file_type)?;
            Ok((regions.bit_len() / 8).saturating_sub(HEADER_OVERHEAD))
        }
    }
}

/// Produce a stego copy of the carrier holding `ciphertext`.
pub fn embed_into(
    bytes: &[u8],
    file_type: FileType,
    ciphertext: &[u8],
) -> Result<Vec<u8>, CoreError> {
    let message = header::seal(ciphertext);
    if let FileType::Document = file_type {
        let text = as_text(bytes)?;
        return Ok(document::embed(text, &message)?.into_bytes());
    }

    let regions = regions_for(bytes, file_type)?;
    let available = (regions.bit_len() / 8).saturating_sub(HEADER_OVERHEAD);
    if ciphertext.len() > available {
        return Err(CoreError::CapacityExceeded { needed: ciphertext.len(), available });
    }

    let mut stego = bytes.to_vec();
    if !write_lsb(&mut stego, &regions, &message) {
        return Err(CoreError::CapacityExceeded { needed: ciphertext.len(), available });
    }
    Ok(stego)
}

/// Recover the embedded ciphertext from a stego carrier.
///
/// # Errors
/// - [`CoreError::NoPayloadFound`] when no message header is present or the
///   embedded checksum does not match.
/// - [`CoreError::TruncatedPayload`] when the header promises more bytes than
///   the carrier holds.
pub fn extract_from(bytes: &[u8], file_type: FileType) -> Result<Vec<u8>, CoreError> {
    if let FileType::Document = file_type {
        let text = as_text(bytes)?;
        return document::extract(text);
    }

    let regions = regions_for(bytes, file_type)?;
    let head = read_lsb(bytes, &regions, 0, HEADER_LEN).ok_or(CoreError::NoPayloadFound)?;
    let parsed = header::parse(&head)?;

    if regions.bit_len() < (HEADER_LEN + parsed.ciphertext_len) * 8 {
        return Err(CoreError::TruncatedPayload);
    }
    let ciphertext = read_lsb(bytes, &regions, HEADER_LEN, parsed.ciphertext_len)
        .ok_or(CoreError::TruncatedPayload)?;
    parsed.verify(&ciphertext)?;
    Ok(ciphertext)
}

fn as_text(bytes: &[u8]) -> Result<&str, CoreError> {
    std::str::from_utf8(bytes).map_err(|_| CoreError::UnsupportedCarrierType)
}

#[cfg(test)]
mod tests {
    use super::audio::tests::make_wav;
    use super::image::tests::make_bmp;
    use super::video::tests::make_avi;
    use super::*;

    #[test]
    fn detection_is_content_based() {
        assert_eq!(detect(&make_bmp(8, 8, 24, 0x33)).unwrap(), FileType::Image);
        assert_eq!(detect(&make_wav(512, 0x0102)).unwrap(), FileType::Audio);
        assert_eq!(detect(&make_avi(2, 256, 0x44)).unwrap(), FileType::Video);
        assert_eq!(detect(b"plain old notes").unwrap(), FileType::Document);
    }

    #[test]
    fn binary_before_text_fallback() {
        // A bitmap whose bytes happen to be valid UTF-8 is still an image.
        let bmp = make_bmp(8, 8, 24, 0x41);
        assert!(std::str::from_utf8(&bmp[54..]).is_ok());
        assert_eq!(detect(&bmp).unwrap(), FileType::Image);
    }

    #[test]
    fn undetectable_bytes_rejected() {
        // Invalid UTF-8 with no recognizable container.
        assert!(matches!(
            detect(&[0xFF, 0xFE, 0x00, 0x99]),
            Err(CoreError::UnsupportedCarrierType)
        ));
    }

    #[test]
    fn embed_extract_across_binary_codecs() {
        let ciphertext = b"not-really-encrypted-but-opaque".to_vec();
        for (carrier, ft) in [
            (make_bmp(32, 32, 24, 0x7F), FileType::Image),
            (make_wav(2048, 0x0102), FileType::Audio),
            (make_avi(4, 256, 0x20), FileType::Video),
        ] {
            let stego = embed_into(&carrier, ft, &ciphertext).unwrap();
            assert_eq!(stego.len(), carrier.len());
            assert_eq!(extract_from(&stego, ft).unwrap(), ciphertext);
        }
    }

    #[test]
    fn capacity_boundary_exact() {
        let carrier = make_wav(1024, 0);
        let cap = capacity_for(&carrier, FileType::Audio).unwrap();
        assert_eq!(cap, 1024 / 8 - HEADER_OVERHEAD);

        assert!(embed_into(&carrier, FileType::Audio, &vec![1u8; cap]).is_ok());
        assert!(matches!(
            embed_into(&carrier, FileType::Audio, &vec![1u8; cap + 1]),
            Err(CoreError::CapacityExceeded { needed, available })
                if needed == cap + 1 && available == cap
        ));
    }

    #[test]
    fn clean_carrier_has_no_payload() {
        let bmp = make_bmp(16, 16, 24, 0xB4);
        assert!(matches!(
            extract_from(&bmp, FileType::Image),
            Err(CoreError::NoPayloadFound)
        ));
    }

    #[test]
    fn truncated_header_length_reported() {
        // Craft a header that declares more ciphertext than the carrier
        // holds: embed into a big carrier, then rebuild a small one with the
        // same LSB prefix.
        let big = make_wav(4096, 0);
        let stego = embed_into(&big, FileType::Audio, &vec![0xAB; 400]).unwrap();

        let small_header: Vec<u8> = stego[..44 + 2 * 8 * HEADER_LEN].to_vec();
        let mut small = make_wav(8 * HEADER_LEN + 16, 0);
        small[..small_header.len()].copy_from_slice(&small_header[..]);
        // Fix the data chunk length for the smaller sample count.
        let samples = 8 * HEADER_LEN + 16;
        small[40..44].copy_from_slice(&((samples * 2) as u32).to_le_bytes());

        assert!(matches!(
            extract_from(&small, FileType::Audio),
            Err(CoreError::TruncatedPayload)
        ));
    }

    #[test]
    fn stego_wav_still_detects_as_audio() {
        let stego = embed_into(&make_wav(1024, 0x0100), FileType::Audio, &[9; 32]).unwrap();
        assert_eq!(detect(&stego).unwrap(), FileType::Audio);
    }
}
