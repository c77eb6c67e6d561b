// Copyright (c) 2026 Stegvault Contributors
// SPDX-License-Identifier: GPL-3.0-only

//! WAV audio carrier.
//!
//! Accepts RIFF/WAVE files holding uncompressed 16-bit PCM. The embeddable
//! positions are the low-order byte of every sample, so one bit flips the
//! amplitude by at most one quantization step. Samples are little-endian,
//! which puts the low byte first in each 2-byte pair.

use crate::carrier::bits::{Regions, Span};
use crate::error::CoreError;

const RIFF_HEADER_LEN: usize = 12;

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Walk the top-level RIFF chunks, yielding `(id, data_start, data_len)`.
fn chunks(bytes: &[u8]) -> impl Iterator<Item = ([u8; 4], usize, usize)> + '_ {
    let mut at = RIFF_HEADER_LEN;
    std::iter::from_fn(move || {
        if at + 8 > bytes.len() {
            return None;
        }
        let id: [u8; 4] = bytes[at..at + 4].try_into().unwrap();
        let len = read_u32(bytes, at + 4) as usize;
        let data_start = at + 8;
        if data_start + len > bytes.len() {
            return None;
        }
        // Chunks are padded to even length.
        at = data_start + len + (len & 1);
        Some((id, data_start, len))
    })
}

fn parse(bytes: &[u8]) -> Option<Regions> {
    if bytes.len() < RIFF_HEADER_LEN + 8
        || &bytes[..4] != b"RIFF"
        || &bytes[8..12] != b"WAVE"
    {
        return None;
    }

    let mut pcm16 = false;
    let mut spans = Vec::new();
    for (id, start, len) in chunks(bytes) {
        match &id {
            b"fmt " if len >= 16 => {
                let format = u16::from_le_bytes([bytes[start], bytes[start + 1]]);
                let depth = u16::from_le_bytes([bytes[start + 14], bytes[start + 15]]);
                if format != 1 || depth != 16 {
                    return None;
                }
                pcm16 = true;
            }
            b"data" if len >= 2 => {
                spans.push(Span { start, count: len / 2, step: 2 });
            }
            _ => {}
        }
    }

    if pcm16 && !spans.is_empty() {
        Some(Regions::new(spans))
    } else {
        None
    }
}

/// Content-based check: a RIFF/WAVE file carrying 16-bit PCM.
pub fn detect(bytes: &[u8]) -> bool {
    parse(bytes).is_some()
}

/// Embeddable positions: the low byte of every sample in every data chunk.
pub fn regions(bytes: &[u8]) -> Result<Regions, CoreError> {
    parse(bytes).ok_or(CoreError::UnsupportedCarrierType)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal PCM-16 mono WAV with `samples` samples, all `fill`.
    pub(crate) fn make_wav(samples: usize, fill: i16) -> Vec<u8> {
        let data_len = samples * 2;
        let mut out = Vec::with_capacity(44 + data_len);
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&((36 + data_len) as u32).to_le_bytes());
        out.extend_from_slice(b"WAVE");

        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes()); // PCM
        out.extend_from_slice(&1u16.to_le_bytes()); // mono
        out.extend_from_slice(&44_100u32.to_le_bytes());
        out.extend_from_slice(&88_200u32.to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());

        out.extend_from_slice(b"data");
        out.extend_from_slice(&(data_len as u32).to_le_bytes());
        for _ in 0..samples {
            out.extend_from_slice(&fill.to_le_bytes());
        }
        out
    }

    #[test]
    fn detects_pcm16() {
        assert!(detect(&make_wav(256, 0x0102)));
    }

    #[test]
    fn rejects_non_wave() {
        assert!(!detect(b"BMxxxxxxxxxxxxxxxxxxxx"));
        assert!(!detect(b"RIFF\x04\x00\x00\x00AVI "));
        assert!(!detect(&[]));
    }

    #[test]
    fn rejects_wrong_format_or_depth() {
        let mut wav = make_wav(16, 0);
        wav[20..22].copy_from_slice(&3u16.to_le_bytes()); // IEEE float
        assert!(!detect(&wav));

        let mut wav = make_wav(16, 0);
        wav[34..36].copy_from_slice(&8u16.to_le_bytes()); // 8-bit
        assert!(!detect(&wav));
    }

    #[test]
    fn rejects_missing_data_chunk() {
        let wav = make_wav(16, 0);
        assert!(!detect(&wav[..44])); // header + fmt only, data truncated away
    }

    #[test]
    fn regions_hit_only_low_bytes() {
        let wav = make_wav(8, 0x0102);
        let regions = regions(&wav).unwrap();
        assert_eq!(regions.bit_len(), 8);
        // Every offset holds a low byte (0x02 for sample 0x0102).
        assert!(regions.offsets().all(|o| wav[o] == 0x02));
    }

    #[test]
    fn truncated_data_chunk_rejected() {
        let wav = make_wav(16, 0);
        // Cut the file mid-data so the declared chunk length overruns.
        assert!(!detect(&wav[..wav.len() - 8]));
    }
}
