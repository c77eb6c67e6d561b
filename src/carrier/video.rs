// Copyright (c) 2026 Stegvault Contributors
// SPDX-License-Identifier: GPL-3.0-only

//! AVI video carrier.
//!
//! Accepts RIFF/AVI files and embeds into uncompressed video frame chunks:
//! the `##db` chunks inside the `movi` list (`##` is the stream number).
//! Compressed `##dc` frames, audio `##wb` chunks, headers and index are left
//! untouched, since bit flips there corrupt the container rather than shift a
//! pixel value. Frames grouped in nested `rec ` lists are walked too.

use crate::carrier::bits::{Regions, Span};
use crate::error::CoreError;

const RIFF_HEADER_LEN: usize = 12;

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// `##db`: two ASCII digits then "db".
fn is_dib_frame(id: &[u8; 4]) -> bool {
    id[0].is_ascii_digit() && id[1].is_ascii_digit() && &id[2..4] == b"db"
}

/// Collect frame spans from the chunk run `bytes[at..end]`.
/// `inside_movi` flips once we enter the movi list (possibly nested in
/// further `rec ` lists).
fn walk(bytes: &[u8], mut at: usize, end: usize, inside_movi: bool, spans: &mut Vec<Span>) -> Option<()> {
    while at + 8 <= end {
        let id: [u8; 4] = bytes[at..at + 4].try_into().unwrap();
        let len = read_u32(bytes, at + 4) as usize;
        let data_start = at + 8;
        if data_start + len > end {
            return None;
        }

        if &id == b"LIST" {
            if len < 4 {
                return None;
            }
            let list_type: [u8; 4] = bytes[data_start..data_start + 4].try_into().unwrap();
            let descend = inside_movi || &list_type == b"movi";
            walk(bytes, data_start + 4, data_start + len, descend, spans)?;
        } else if inside_movi && is_dib_frame(&id) && len > 0 {
            spans.push(Span { start: data_start, count: len, step: 1 });
        }

        at = data_start + len + (len & 1);
    }
    Some(())
}

fn parse(bytes: &[u8]) -> Option<Regions> {
    if bytes.len() < RIFF_HEADER_LEN
        || &bytes[..4] != b"RIFF"
        || &bytes[8..12] != b"AVI "
    {
        return None;
    }
    let mut spans = Vec::new();
    walk(bytes, RIFF_HEADER_LEN, bytes.len(), false, &mut spans)?;
    if spans.is_empty() {
        return None;
    }
    Some(Regions::new(spans))
}

/// Content-based check: a RIFF/AVI file with at least one uncompressed frame.
pub fn detect(bytes: &[u8]) -> bool {
    parse(bytes).is_some()
}

/// Embeddable positions: every byte of every `##db` frame chunk.
pub fn regions(bytes: &[u8]) -> Result<Regions, CoreError> {
    parse(bytes).ok_or(CoreError::UnsupportedCarrierType)
}
