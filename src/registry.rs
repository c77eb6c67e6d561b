// Copyright (c) 2026 Stegvault Contributors
// SPDX-License-Identifier: GPL-3.0-only

//! File registry: metadata rows for processed carriers, plus the blob storage
//! collaborator seam.
//!
//! The registry holds only metadata; raw carrier bytes live behind
//! [`BlobStore`], referenced by an opaque `storage_ref`. Both are traits so a
//! persistent engine can replace the in-memory reference implementations
//! without touching the engines. Lookups are owner-scoped and fail
//! [`CoreError::FileNotFound`] for absent ids and for other owners' rows
//! alike.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::carrier::FileType;
use crate::error::CoreError;

/// Metadata for one stored carrier artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StegoFile {
    pub id: Uuid,
    pub owner: String,
    pub filename: String,
    pub file_type: FileType,
    pub file_size: u64,
    /// True iff the stored bytes came out of a successful embed.
    pub has_payload: bool,
    /// The key the payload was embedded with; `None` for plain uploads.
    pub key_id: Option<Uuid>,
    /// Handle into the blob storage collaborator.
    pub storage_ref: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Owner-scoped metadata rows.
pub trait FileRegistry: Send + Sync {
    /// Insert a new row. Fails if the id already exists.
    fn create(&self, file: StegoFile) -> Result<(), CoreError>;

    fn get(&self, id: Uuid, owner: &str) -> Result<StegoFile, CoreError>;

    /// All of `owner`'s rows, newest first.
    fn list(&self, owner: &str) -> Result<Vec<StegoFile>, CoreError>;

    fn delete(&self, id: Uuid, owner: &str) -> Result<(), CoreError>;

    /// Number of rows whose `key_id` references the given key. Backs the
    /// key-in-use check; key ids are unique across owners so no owner filter
    /// is needed.
    fn count_referencing(&self, key_id: Uuid) -> Result<usize, CoreError>;
}

/// Raw byte storage, the external storage collaborator.
pub trait BlobStore: Send + Sync {
    /// Store bytes and hand back the reference to retrieve them.
    fn put(&self, bytes: Vec<u8>) -> Result<Uuid, CoreError>;

    fn get(&self, storage_ref: Uuid) -> Result<Vec<u8>, CoreError>;

    /// Release the stored bytes.
    fn delete(&self, storage_ref: Uuid) -> Result<(), CoreError>;
}

/// In-memory registry with per-row atomicity.
#[derive(Default)]
pub struct MemoryFileRegistry {
    rows: Mutex<HashMap<Uuid, StegoFile>>,
}

impl MemoryFileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, StegoFile>>, CoreError> {
        self.rows
            .lock()
            .map_err(|_| CoreError::Storage("file registry lock poisoned".into()))
    }
}

impl FileRegistry for MemoryFileRegistry {
    fn create(&self, file: StegoFile) -> Result<(), CoreError> {
        let mut rows = self.lock()?;
        if rows.contains_key(&file.id) {
            return Err(CoreError::Storage(format!("duplicate file id {}", file.id)));
        }
        rows.insert(file.id, file);
        Ok(())
    }

    fn get(&self, id: Uuid, owner: &str) -> Result<StegoFile, CoreError> {
        let rows = self.lock()?;
        rows.get(&id)
            .filter(|f| f.owner == owner)
            .cloned()
            .ok_or(CoreError::FileNotFound)
    }

    fn list(&self, owner: &str) -> Result<Vec<StegoFile>, CoreError> {
        let rows = self.lock()?;
        let mut files: Vec<StegoFile> =
            rows.values().filter(|f| f.owner == owner).cloned().collect();
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(files)
    }

    fn delete(&self, id: Uuid, owner: &str) -> Result<(), CoreError> {
        let mut rows = self.lock()?;
        if rows.get(&id).filter(|f| f.owner == owner).is_none() {
            return Err(CoreError::FileNotFound);
        }
        rows.remove(&id);
        Ok(())
    }

    fn count_referencing(&self, key_id: Uuid) -> Result<usize, CoreError> {
        let rows = self.lock()?;
        Ok(rows.values().filter(|f| f.key_id == Some(key_id)).count())
    }
}

/// In-memory blob store.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<Uuid, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, Vec<u8>>>, CoreError> {
        self.blobs
            .lock()
            .map_err(|_| CoreError::Storage("blob store lock poisoned".into()))
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, bytes: Vec<u8>) -> Result<Uuid, CoreError> {
        let storage_ref = Uuid::new_v4();
        self.lock()?.insert(storage_ref, bytes);
        Ok(storage_ref)
    }

    fn get(&self, storage_ref: Uuid) -> Result<Vec<u8>, CoreError> {
        self.lock()?
            .get(&storage_ref)
            .cloned()
            .ok_or_else(|| CoreError::Storage(format!("missing blob {storage_ref}")))
    }

    fn delete(&self, storage_ref: Uuid) -> Result<(), CoreError> {
        if self.lock()?.remove(&storage_ref).is_none() {
            return Err(CoreError::Storage(format!("missing blob {storage_ref}")));
        }
        Ok(())
    }
}
