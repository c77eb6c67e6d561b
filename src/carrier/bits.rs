// Copyright (c) 2026 Stegvault Contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Bit-level I/O over a carrier's embeddable positions.
//!
//! Codecs describe their embeddable positions as [`Span`]s — arithmetic
//! sequences of byte offsets into the carrier buffer — so even multi-megabyte
//! carriers never materialize an offset table. One payload bit lives in the
//! least-significant bit of each position; bits are MSB-first within each
//! payload byte, matching the extraction order exactly.

/// An arithmetic run of embeddable byte offsets: `start`, `start + step`, …
/// (`count` positions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub count: usize,
    pub step: usize,
}

/// The full set of embeddable positions for one carrier, in scan order.
#[derive(Debug, Clone, Default)]
pub struct Regions {
    spans: Vec<Span>,
}

impl Regions {
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    /// Total number of embeddable bit positions.
    pub fn bit_len(&self) -> usize {
        self.spans.iter().map(|s| s.count).sum()
    }

    /// Byte offsets in deterministic scan order.
    pub fn offsets(&self) -> impl Iterator<Item = usize> + '_ {
        self.spans
            .iter()
            .flat_map(|s| (0..s.count).map(move |i| s.start + i * s.step))
    }
}

/// Convert bytes to a bit vector (MSB first within each byte).
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for bit_pos in (0..8).rev() {
            bits.push((byte >> bit_pos) & 1);
        }
    }
    bits
}

/// Convert a bit vector (MSB first) back to bytes.
/// Pads the last byte with zero bits if `bits.len()` is not a multiple of 8.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(bits.len().div_ceil(8));
    for chunk in bits.chunks(8) {
        let mut byte = 0u8;
        for (i, &bit) in chunk.iter().enumerate() {
            byte |= (bit & 1) << (7 - i);
        }
        bytes.push(byte);
    }
    bytes
}

/// Write `data` into the LSBs at the region's positions.
///
/// Returns `false` (carrier unchanged past that point) if the region runs out
/// of positions; callers check capacity beforehand so this is a guard, not a
/// control path.
pub fn write_lsb(buf: &mut [u8], regions: &Regions, data: &[u8]) -> bool {
    let mut offsets = regions.offsets();
    for &byte in data {
        for bit_pos in (0..8).rev() {
            let Some(offset) = offsets.next() else { return false };
            let bit = (byte >> bit_pos) & 1;
            buf[offset] = (buf[offset] & 0xFE) | bit;
        }
    }
    true
}

/// Read `nbytes` from the LSBs at the region's positions, skipping the first
/// `skip_bytes` payload bytes. Returns `None` if the region is too short.
pub fn read_lsb(buf: &[u8], regions: &Regions, skip_bytes: usize, nbytes: usize) -> Option<Vec<u8>> {
    let needed_bits = (skip_bytes + nbytes).checked_mul(8)?;
    if regions.bit_len() < needed_bits {
        return None;
    }
    let mut offsets = regions.offsets().skip(skip_bytes * 8);
    let mut out = Vec::with_capacity(nbytes);
    for _ in 0..nbytes {
        let mut byte = 0u8;
        for bit_pos in (0..8).rev() {
            let offset = offsets.next()?;
            byte |= (buf[offset] & 1) << bit_pos;
        }
        out.push(byte);
    }
    Some(out)
}
