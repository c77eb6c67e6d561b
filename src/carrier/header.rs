// Copyright (c) 2026 Stegvault Contributors
// SPDX-License-Identifier: GPL-3.0-only

//! On-carrier message layout.
//!
//! Every codec embeds the same byte sequence, so extraction knows exactly how
//! many bits to read regardless of media type:
//!
//! ```text
//! [4 bytes ] magic "SGV1"
//! [4 bytes ] ciphertext length (big-endian u32)
//! [4 bytes ] CRC-32 of the ciphertext
//! [N bytes ] ciphertext
//! ```
//!
//! This layout is stable across versions: carriers embedded by one build must
//! remain extractable by later builds. The magic doubles as the payload
//! presence check — a carrier that never went through embed yields random
//! LSBs, which fail the magic test and report
//! [`CoreError::NoPayloadFound`].

use crate::error::CoreError;

/// Message magic marker.
pub const MAGIC: [u8; 4] = *b"SGV1";

/// Fixed header size: magic(4) + length(4) + crc(4).
pub const HEADER_LEN: usize = 12;

/// Byte overhead the header costs against a carrier's capacity.
pub const HEADER_OVERHEAD: usize = HEADER_LEN;

/// Upper bound on a plausible ciphertext length. Anything above this in a
/// decoded header means the header is noise, not a payload.
pub const MAX_CIPHERTEXT_LEN: usize = 16 * 1024 * 1024;

/// Parsed header fields.
#[derive(Debug, Clone, Copy)]
pub struct Header {
    pub ciphertext_len: usize,
    crc: u32,
}

impl Header {
    /// Verify the ciphertext against the header's CRC.
    ///
    /// A mismatch means the carrier's embedded bits were damaged after embed
    /// (or the magic matched by coincidence); either way there is no payload
    /// to hand to the cipher.
    pub fn verify(&self, ciphertext: &[u8]) -> Result<(), CoreError> {
        if crc32fast::hash(ciphertext) != self.crc {
            return Err(CoreError::NoPayloadFound);
        }
        Ok(())
    }
}

/// Build the full embeddable message: header followed by ciphertext.
pub fn seal(ciphertext: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&(ciphertext.len() as u32).to_be_bytes());
    out.extend_from_slice(&crc32fast::hash(ciphertext).to_be_bytes());
    out.extend_from_slice(ciphertext);
    out
}

/// Parse a header from the first [`HEADER_LEN`] extracted bytes.
///
/// # Errors
/// [`CoreError::NoPayloadFound`] on magic mismatch or an implausible length.
pub fn parse(bytes: &[u8]) -> Result<Header, CoreError> {
    if bytes.len() < HEADER_LEN || bytes[..4] != MAGIC {
        return Err(CoreError::NoPayloadFound);
    }
    let ciphertext_len = u32::from_be_bytes(bytes[4..8].try_into().unwrap()) as usize;
    if ciphertext_len == 0 || ciphertext_len > MAX_CIPHERTEXT_LEN {
        return Err(CoreError::NoPayloadFound);
    }
    let crc = u32::from_be_bytes(bytes[8..12].try_into().unwrap());
    Ok(Header { ciphertext_len, crc })
}
