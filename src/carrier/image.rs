// Copyright (c) 2026 Stegvault Contributors
// SPDX-License-Identifier: GPL-3.0-only

//! BMP image carrier.
//!
//! Accepts uncompressed Windows bitmaps at 24 or 32 bits per pixel. Every
//! pixel byte is an embeddable position; row padding bytes are skipped since
//! some writers normalize them and would wipe the payload.
//!
//! ```text
//! [ 2 bytes] "BM"
//! [ 8 bytes] file size + reserved
//! [ 4 bytes] pixel data offset (LE)
//! [ 4 bytes] DIB header size (LE, >= 40)
//! [ 4 bytes] width  (LE i32)
//! [ 4 bytes] height (LE i32, negative = top-down)
//! [ 2 bytes] planes
//! [ 2 bytes] bits per pixel (24 or 32)
//! [ 4 bytes] compression (0 = BI_RGB)
//! ...
//! [pixel rows, each padded to a 4-byte boundary]
//! ```

use crate::carrier::bits::{Regions, Span};
use crate::error::CoreError;

const FILE_HEADER_LEN: usize = 14;
const MIN_DIB_LEN: usize = 40;

struct Bmp {
    pixel_offset: usize,
    rows: usize,
    row_bytes: usize,
    stride: usize,
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn parse(bytes: &[u8]) -> Option<Bmp> {
    if bytes.len() < FILE_HEADER_LEN + MIN_DIB_LEN || &bytes[..2] != b"BM" {
        return None;
    }
    if read_u32(bytes, 14) < MIN_DIB_LEN as u32 {
        return None;
    }

    let width = read_u32(bytes, 18) as i32;
    let height = read_u32(bytes, 22) as i32;
    let bpp = read_u16(bytes, 28);
    let compression = read_u32(bytes, 30);
    if width <= 0 || height == 0 || compression != 0 || !matches!(bpp, 24 | 32) {
        return None;
    }

    let pixel_offset = read_u32(bytes, 10) as usize;
    let rows = height.unsigned_abs() as usize;
    let row_bytes = width as usize * (bpp as usize / 8);
    let stride = (row_bytes + 3) & !3;

    // The final row's padding is optional in the wild.
    let need = pixel_offset
        .checked_add(stride.checked_mul(rows - 1)?)?
        .checked_add(row_bytes)?;
    if need > bytes.len() {
        return None;
    }

    Some(Bmp { pixel_offset, rows, row_bytes, stride })
}

/// Content-based check: a parseable, uncompressed 24/32bpp bitmap.
pub fn detect(bytes: &[u8]) -> bool {
    parse(bytes).is_some()
}

/// Embeddable positions: all pixel bytes, row by row, padding excluded.
pub fn regions(bytes: &[u8]) -> Result<Regions, CoreError> {
    let bmp = parse(bytes).ok_or(CoreError::UnsupportedCarrierType)?;
    if bmp.stride == bmp.row_bytes {
        // No padding, the whole pixel array is one run.
        return Ok(Regions::new(vec![Span {
            start: bmp.pixel_offset,
            count: bmp.row_bytes * bmp.rows,
            step: 1,
        }]));
    }
    let spans = (0..bmp.rows)
        .map(|r| Span {
            start: bmp.pixel_offset + r * bmp.stride,
            count: bmp.row_bytes,
            step: 1,
        })
        .collect();
    Ok(Regions::new(spans))
}
