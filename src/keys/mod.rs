// Copyright (c) 2026 Stegvault Contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Encryption key model: algorithm families, key material, and key records.
//!
//! Key material is a tagged union ([`KeyMaterial`]) rather than a trait
//! hierarchy, so the payload cipher can dispatch exhaustively and the
//! compiler proves every key type is handled. Material is immutable once
//! created: a key is regenerated (new id) or deleted, never edited. All
//! material is zeroized on drop.

pub mod export;
pub mod generate;
pub mod store;

use core::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CoreError;

/// Supported key algorithm families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// AES-256-GCM-SIV authenticated encryption (256-bit symmetric key).
    #[serde(rename = "AES-256")]
    Aes256,
    /// RSA-2048 hybrid encryption (2048-bit key pair wrapping a session key).
    #[serde(rename = "RSA-2048")]
    Rsa2048,
    /// XChaCha20-Poly1305 authenticated encryption (256-bit symmetric key).
    #[serde(rename = "ChaCha20")]
    ChaCha20,
}

impl KeyType {
    /// Canonical name, as used by the external API surface.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aes256 => "AES-256",
            Self::Rsa2048 => "RSA-2048",
            Self::ChaCha20 => "ChaCha20",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AES-256" => Ok(Self::Aes256),
            "RSA-2048" => Ok(Self::Rsa2048),
            "ChaCha20" => Ok(Self::ChaCha20),
            other => Err(CoreError::UnsupportedKeyType(other.to_string())),
        }
    }
}

/// Opaque key material, variant-matched to [`KeyType`].
///
/// Never serialized by serde; the only way material leaves this type is the
/// documented export layout in [`export`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub enum KeyMaterial {
    /// 256-bit symmetric key for AES-256-GCM-SIV.
    Aes256([u8; 32]),
    /// 256-bit symmetric key for XChaCha20-Poly1305. A fresh nonce is drawn
    /// per encryption and travels with the ciphertext, never reused.
    ChaCha20([u8; 32]),
    /// 2048-bit RSA key pair. The public half encrypts (embedding side),
    /// the private half decrypts (extraction side).
    Rsa2048 {
        /// PKCS#8 DER encoding of the private key.
        private_der: Vec<u8>,
        /// SPKI DER encoding of the public key.
        public_der: Vec<u8>,
    },
}

impl KeyMaterial {
    /// The key type this material belongs to.
    pub fn key_type(&self) -> KeyType {
        match self {
            Self::Aes256(_) => KeyType::Aes256,
            Self::ChaCha20(_) => KeyType::ChaCha20,
            Self::Rsa2048 { .. } => KeyType::Rsa2048,
        }
    }
}

// Material must never leak through Debug output or logs.
impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial({}, <redacted>)", self.key_type())
    }
}

/// A managed encryption key: metadata plus material.
#[derive(Debug, Clone)]
pub struct EncryptionKey {
    /// System-generated unique id.
    pub id: Uuid,
    /// Owning user identity. Every operation is scoped to this owner.
    pub owner: String,
    /// User-chosen label, non-empty.
    pub name: String,
    /// Algorithm family.
    pub key_type: KeyType,
    /// Secret material, structure matching `key_type`.
    pub material: KeyMaterial,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl EncryptionKey {
    /// Metadata view with the material stripped, safe for listings.
    pub fn info(&self) -> KeyInfo {
        KeyInfo {
            id: self.id,
            owner: self.owner.clone(),
            name: self.name.clone(),
            key_type: self.key_type,
            description: self.description.clone(),
            created_at: self.created_at,
        }
    }
}

/// Key metadata exposed by listings. Material is exposed only via export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    pub id: Uuid,
    pub owner: String,
    pub name: String,
    pub key_type: KeyType,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
