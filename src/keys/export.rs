// Copyright (c) 2026 Stegvault Contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Stable binary layout for key export/import.
//!
//! Exported material must survive across builds, so the layout is fixed:
//!
//! ```text
//! [4 bytes ] magic "SVK1"
//! [1 byte  ] key_type tag (1 = AES-256, 2 = ChaCha20, 3 = RSA-2048)
//! symmetric:
//!   [32 bytes] key
//! RSA-2048:
//!   [4 bytes ] private_der length (big-endian u32)
//!   [N bytes ] private_der (PKCS#8)
//!   [4 bytes ] public_der length (big-endian u32)
//!   [M bytes ] public_der (SPKI)
//! [4 bytes ] CRC-32 of everything above
//! ```
//!
//! The export channel's confidentiality is the environment's responsibility;
//! the material itself is not wrapped a second time here.

use crate::error::CoreError;
use crate::keys::{EncryptionKey, KeyMaterial, KeyType};

/// Export format magic.
pub const MAGIC: [u8; 4] = *b"SVK1";

const TAG_AES256: u8 = 1;
const TAG_CHACHA20: u8 = 2;
const TAG_RSA2048: u8 = 3;

/// Serialize a key's material in the stable export layout.
pub fn serialize_key(key: &EncryptionKey) -> Vec<u8> {
    serialize_material(&key.material)
}

/// Serialize bare material (used by [`serialize_key`] and tests).
pub fn serialize_material(material: &KeyMaterial) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + 1 + 32 + 4);
    out.extend_from_slice(&MAGIC);

    match material {
        KeyMaterial::Aes256(key) => {
            out.push(TAG_AES256);
            out.extend_from_slice(key);
        }
        KeyMaterial::ChaCha20(key) => {
            out.push(TAG_CHACHA20);
            out.extend_from_slice(key);
        }
        KeyMaterial::Rsa2048 { private_der, public_der } => {
            out.push(TAG_RSA2048);
            out.extend_from_slice(&(private_der.len() as u32).to_be_bytes());
            out.extend_from_slice(private_der);
            out.extend_from_slice(&(public_der.len() as u32).to_be_bytes());
            out.extend_from_slice(public_der);
        }
    }

    let crc = crc32fast::hash(&out);
    out.extend_from_slice(&crc.to_be_bytes());
    out
}

/// Parse material from the export layout, verifying magic and CRC.
///
/// # Errors
/// [`CoreError::MalformedKeyMaterial`] on bad magic, unknown tag, length
/// mismatch, or CRC failure.
pub fn deserialize_material(data: &[u8]) -> Result<(KeyType, KeyMaterial), CoreError> {
    if data.len() < 4 + 1 + 4 {
        return Err(CoreError::MalformedKeyMaterial("too short".into()));
    }
    if data[..4] != MAGIC {
        return Err(CoreError::MalformedKeyMaterial("bad magic".into()));
    }

    let body = &data[..data.len() - 4];
    let stored_crc = u32::from_be_bytes(data[data.len() - 4..].try_into().unwrap());
    if crc32fast::hash(body) != stored_crc {
        return Err(CoreError::MalformedKeyMaterial("CRC mismatch".into()));
    }

    let tag = body[4];
    let payload = &body[5..];
    match tag {
        TAG_AES256 => Ok((KeyType::Aes256, KeyMaterial::Aes256(read_key32(payload)?))),
        TAG_CHACHA20 => Ok((KeyType::ChaCha20, KeyMaterial::ChaCha20(read_key32(payload)?))),
        TAG_RSA2048 => {
            let (private_der, rest) = read_block(payload)?;
            let (public_der, rest) = read_block(rest)?;
            if !rest.is_empty() {
                return Err(CoreError::MalformedKeyMaterial("trailing bytes".into()));
            }
            Ok((KeyType::Rsa2048, KeyMaterial::Rsa2048 { private_der, public_der }))
        }
        other => Err(CoreError::MalformedKeyMaterial(format!("unknown tag {other}"))),
    }
}

fn read_key32(payload: &[u8]) -> Result<[u8; 32], CoreError> {
    payload
        .try_into()
        .map_err(|_| CoreError::MalformedKeyMaterial("symmetric key must be 32 bytes".into()))
}

fn read_block(payload: &[u8]) -> Result<(Vec<u8>, &[u8]), CoreError> {
    if payload.len() < 4 {
        return Err(CoreError::MalformedKeyMaterial("missing length prefix".into()));
    }
    let len = u32::from_be_bytes(payload[..4].try_into().unwrap()) as usize;
    let rest = &payload[4..];
    if rest.len() < len {
        return Err(CoreError::MalformedKeyMaterial("block shorter than declared".into()));
    }
    Ok((rest[..len].to_vec(), &rest[len..]))
}
