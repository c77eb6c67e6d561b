// Copyright (c) 2026 Stegvault Contributors
// SPDX-License-Identifier: GPL-3.0-only

//! The operation surface: embedding and extraction engines plus key and file
//! lifecycle, with `owner` threaded through every call.
//!
//! A [`Vault`] wires the three collaborator seams together. Every operation
//! is a stateless unit of work; nothing carries over between calls except the
//! rows behind the stores.
//!
//! Embed runs the fixed pipeline:
//!
//! 1. validate payload, filename and key
//! 2. detect the carrier type from content
//! 3. encrypt the payload with the leased key
//! 4. embed the ciphertext into the carrier
//! 5. persist blob + registry row
//!
//! A failure at any step aborts with nothing persisted; a registry failure
//! after the blob write rolls the blob back.

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::carrier;
use crate::cipher;
use crate::error::CoreError;
use crate::keys::store::{KeyStore, MemoryKeyStore};
use crate::keys::{generate, EncryptionKey, KeyInfo, KeyType};
use crate::registry::{BlobStore, FileRegistry, MemoryBlobStore, MemoryFileRegistry, StegoFile};

/// Largest accepted payload in bytes.
pub const MAX_PAYLOAD_BYTES: usize = 65_535;

/// Per-owner resource counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerStats {
    pub key_count: usize,
    pub file_count: usize,
}

/// Steganographic vault over pluggable key, metadata and blob stores.
pub struct Vault<K: KeyStore, R: FileRegistry, B: BlobStore> {
    keys: K,
    registry: R,
    blobs: B,
}

impl Vault<MemoryKeyStore, MemoryFileRegistry, MemoryBlobStore> {
    /// A vault backed entirely by in-memory stores.
    pub fn in_memory() -> Self {
        Self::new(MemoryKeyStore::new(), MemoryFileRegistry::new(), MemoryBlobStore::new())
    }
}

impl<K: KeyStore, R: FileRegistry, B: BlobStore> Vault<K, R, B> {
    pub fn new(keys: K, registry: R, blobs: B) -> Self {
        Self { keys, registry, blobs }
    }

    // ---- keys ----------------------------------------------------------

    /// Generate a key of the requested type and register it.
    pub fn generate_key(
        &self,
        owner: &str,
        name: &str,
        key_type: KeyType,
        description: Option<String>,
    ) -> Result<KeyInfo, CoreError> {
        if name.trim().is_empty() {
            return Err(CoreError::EmptyName);
        }
        let material = generate::generate_material(key_type)?;
        let key = EncryptionKey {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            name: name.to_string(),
            key_type,
            material,
            description,
            created_at: Utc::now(),
        };
        let key_info = key.info();
        self.keys.create(key)?;
        info!(owner, key_id = %key_info.id, %key_type, "key generated");
        Ok(key_info)
    }

    /// Metadata for the owner's keys, material never included.
    pub fn list_keys(&self, owner: &str) -> Result<Vec<KeyInfo>, CoreError> {
        self.keys.list(owner)
    }

    /// Serialize a key's material in the stable export layout.
    pub fn export_key(&self, owner: &str, key_id: Uuid) -> Result<Vec<u8>, CoreError> {
        let bytes = self.keys.export(key_id, owner)?;
        info!(owner, %key_id, "key exported");
        Ok(bytes)
    }

    /// Delete a key that no stored file references.
    ///
    /// The lease taken here is held through the removal itself: the store
    /// removes the row only while this lease is the sole pin, so a
    /// concurrent embed either raises the pin (this delete fails
    /// [`CoreError::KeyInUse`]) or leases after removal (the embed fails
    /// [`CoreError::KeyNotFound`]). An embed that completed entirely before
    /// the removal has already created its registry row, which the re-check
    /// after removal observes; the removal is then undone and the delete
    /// fails [`CoreError::KeyInUse`]. No interleaving lets both operations
    /// succeed.
    pub fn delete_key(&self, owner: &str, key_id: Uuid) -> Result<(), CoreError> {
        let lease = self.keys.lease(key_id, owner)?;
        if self.registry.count_referencing(key_id)? > 0 {
            return Err(CoreError::KeyInUse);
        }
        let key = lease.key().clone();
        self.keys.delete_leased(lease)?;

        // Rows created by embeds that finished before the removal are
        // visible now, and no new embed can lease the removed key.
        if self.registry.count_referencing(key_id)? > 0 {
            self.keys.create(key)?;
            return Err(CoreError::KeyInUse);
        }
        info!(owner, %key_id, "key deleted");
        Ok(())
    }

    // ---- engines ---------------------------------------------------------

    /// Embed `payload` into `carrier_bytes` under the given key and persist
    /// the resulting artifact.
    pub fn embed(
        &self,
        owner: &str,
        filename: &str,
        carrier_bytes: &[u8],
        payload: &str,
        key_id: Uuid,
    ) -> Result<StegoFile, CoreError> {
        if payload.is_empty() {
            return Err(CoreError::EmptyPayload);
        }
        if payload.len() > MAX_PAYLOAD_BYTES {
            return Err(CoreError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_BYTES,
            });
        }
        if filename.trim().is_empty() {
            return Err(CoreError::EmptyFilename);
        }

        // The lease pins the key against deletion for the whole pipeline.
        let lease = self.keys.lease(key_id, owner)?;
        let file_type = carrier::detect(carrier_bytes)?;
        debug!(owner, %key_id, %file_type, carrier_len = carrier_bytes.len(), "embedding");

        let ciphertext = cipher::encrypt(payload.as_bytes(), lease.material())?;
        let stego_bytes = carrier::embed_into(carrier_bytes, file_type, &ciphertext)?;

        let storage_ref = self.blobs.put(stego_bytes.clone())?;
        let file = StegoFile {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            filename: filename.to_string(),
            file_type,
            file_size: stego_bytes.len() as u64,
            has_payload: true,
            key_id: Some(key_id),
            storage_ref,
            created_at: Utc::now(),
        };
        if let Err(err) = self.registry.create(file.clone()) {
            // All-or-nothing: don't leave an orphaned blob behind.
            let _ = self.blobs.delete(storage_ref);
            return Err(err);
        }

        info!(owner, file_id = %file.id, %file_type, payload_len = payload.len(), "embed complete");
        Ok(file)
    }

    /// Recover the payload hidden in `carrier_bytes` using the given key.
    /// Read-only: no registry or blob state changes.
    pub fn extract(
        &self,
        owner: &str,
        carrier_bytes: &[u8],
        key_id: Uuid,
    ) -> Result<String, CoreError> {
        let lease = self.keys.lease(key_id, owner)?;
        let file_type = carrier::detect(carrier_bytes)?;
        debug!(owner, %key_id, %file_type, "extracting");

        let ciphertext = carrier::extract_from(carrier_bytes, file_type)?;
        let plaintext = cipher::decrypt(&ciphertext, lease.material())?;
        String::from_utf8(plaintext).map_err(|_| CoreError::InvalidEncoding)
    }

    // ---- files -----------------------------------------------------------

    /// Store a plain carrier without embedding anything into it.
    pub fn store_carrier(
        &self,
        owner: &str,
        filename: &str,
        carrier_bytes: &[u8],
    ) -> Result<StegoFile, CoreError> {
        if filename.trim().is_empty() {
            return Err(CoreError::EmptyFilename);
        }
        let file_type = carrier::detect(carrier_bytes)?;

        let storage_ref = self.blobs.put(carrier_bytes.to_vec())?;
        let file = StegoFile {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            filename: filename.to_string(),
            file_type,
            file_size: carrier_bytes.len() as u64,
            has_payload: false,
            key_id: None,
            storage_ref,
            created_at: Utc::now(),
        };
        if let Err(err) = self.registry.create(file.clone()) {
            let _ = self.blobs.delete(storage_ref);
            return Err(err);
        }

        info!(owner, file_id = %file.id, %file_type, "carrier stored");
        Ok(file)
    }

    /// Ciphertext bytes a carrier can hold under its detected codec.
    pub fn carrier_capacity(&self, carrier_bytes: &[u8]) -> Result<usize, CoreError> {
        let file_type = carrier::detect(carrier_bytes)?;
        carrier::capacity_for(carrier_bytes, file_type)
    }

    pub fn list_files(&self, owner: &str) -> Result<Vec<StegoFile>, CoreError> {
        self.registry.list(owner)
    }

    /// The metadata row plus the stored bytes.
    pub fn download_file(
        &self,
        owner: &str,
        file_id: Uuid,
    ) -> Result<(StegoFile, Vec<u8>), CoreError> {
        let file = self.registry.get(file_id, owner)?;
        let bytes = self.blobs.get(file.storage_ref)?;
        Ok((file, bytes))
    }

    /// Remove the metadata row and release the stored bytes.
    ///
    /// The row removal is the authoritative part; a blob-release failure
    /// afterwards is logged rather than surfaced, since the row (and with it
    /// the only retry handle) is already gone.
    pub fn delete_file(&self, owner: &str, file_id: Uuid) -> Result<(), CoreError> {
        let file = self.registry.get(file_id, owner)?;
        self.registry.delete(file_id, owner)?;
        if let Err(err) = self.blobs.delete(file.storage_ref) {
            warn!(owner, %file_id, %err, "blob release failed after row removal");
        }
        info!(owner, %file_id, "file deleted");
        Ok(())
    }

    pub fn stats(&self, owner: &str) -> Result<OwnerStats, CoreError> {
        Ok(OwnerStats {
            key_count: self.keys.list(owner)?.len(),
            file_count: self.registry.list(owner)?.len(),
        })
    }
}
