// Copyright (c) 2026 Stegvault Contributors
// SPDX-License-Identifier: GPL-3.0-only

//! # stegvault-core
//!
//! Steganographic vault engine: hides encrypted text payloads inside media
//! carriers under managed encryption keys. Four carrier families are
//! supported, detected from content structure rather than filename:
//!
//! - **Image** (BMP, 24/32bpp uncompressed): pixel LSBs.
//! - **Audio** (WAV, 16-bit PCM): sample low-byte LSBs.
//! - **Video** (AVI, uncompressed frames): frame byte LSBs.
//! - **Document** (UTF-8 text): zero-width character channel.
//!
//! Payloads are encrypted before embedding with a key from the vault's key
//! store: AES-256-GCM-SIV, XChaCha20-Poly1305, or RSA-2048 hybrid (session
//! key wrapped with OAEP). Extraction authenticates the ciphertext, so a
//! wrong key fails loudly instead of returning garbage.
//!
//! Key and file metadata live behind the [`keys::store::KeyStore`],
//! [`registry::FileRegistry`] and [`registry::BlobStore`] traits; in-memory
//! implementations back tests and single-process use. Every operation takes
//! an explicit `owner`, and cross-owner lookups report not-found.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use stegvault_core::{KeyType, Vault};
//!
//! let vault = Vault::in_memory();
//! let key = vault.generate_key("alice", "demo", KeyType::Aes256, None)?;
//!
//! let carrier = std::fs::read("photo.bmp")?;
//! let file = vault.embed("alice", "photo.bmp", &carrier, "hello world", key.id)?;
//!
//! let (_, stego_bytes) = vault.download_file("alice", file.id)?;
//! assert_eq!(vault.extract("alice", &stego_bytes, key.id)?, "hello world");
//! ```

pub mod carrier;
pub mod cipher;
pub mod error;
pub mod keys;
pub mod registry;
pub mod vault;

pub use carrier::FileType;
pub use error::{CoreError, Result};
pub use keys::store::{KeyLease, KeyStore, MemoryKeyStore};
pub use keys::{EncryptionKey, KeyInfo, KeyMaterial, KeyType};
pub use registry::{BlobStore, FileRegistry, MemoryBlobStore, MemoryFileRegistry, StegoFile};
pub use vault::{OwnerStats, Vault, MAX_PAYLOAD_BYTES};
