// Copyright (c) 2026 Stegvault Contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Key storage: per-owner lifecycle of generated keys.
//!
//! The persistent row engine is an external collaborator, so the store is a
//! trait; [`MemoryKeyStore`] is the reference implementation backing tests
//! and single-process deployments. Every row is created and removed
//! atomically; no operation spans multiple rows.
//!
//! # Leases
//!
//! An embed or extract holds the key for the duration of the operation. To
//! keep the "key in use" invariant under concurrency, [`KeyStore::lease`]
//! pins the key: the returned [`KeyLease`] increments a per-key in-flight
//! counter that deletion observes. [`KeyStore::delete_leased`] removes the
//! row under the store lock only while the caller's lease is the sole pin,
//! so a delete racing an embed on the same key ends with either the embed
//! failing [`CoreError::KeyNotFound`] (removal won) or the delete failing
//! [`CoreError::KeyInUse`] (another lease in flight) — never both
//! succeeding.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::error::CoreError;
use crate::keys::{export, EncryptionKey, KeyInfo, KeyMaterial};

/// A pinned key handle. Holding a lease blocks deletion of the key; the pin
/// is released on drop.
pub struct KeyLease {
    key: EncryptionKey,
    pin: Arc<AtomicUsize>,
}

impl KeyLease {
    fn new(key: EncryptionKey, pin: Arc<AtomicUsize>) -> Self {
        pin.fetch_add(1, Ordering::SeqCst);
        Self { key, pin }
    }

    /// The leased key record.
    pub fn key(&self) -> &EncryptionKey {
        &self.key
    }

    /// Shorthand for the leased key's material.
    pub fn material(&self) -> &KeyMaterial {
        &self.key.material
    }
}

impl Drop for KeyLease {
    fn drop(&mut self) {
        self.pin.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Owner-scoped key storage.
///
/// All lookups fail [`CoreError::KeyNotFound`] both when the id is absent and
/// when it belongs to a different owner, so callers cannot probe for other
/// owners' keys.
pub trait KeyStore: Send + Sync {
    /// Insert a freshly generated key. Fails if the id already exists.
    fn create(&self, key: EncryptionKey) -> Result<(), CoreError>;

    /// Fetch a key and pin it against deletion for the lease's lifetime.
    fn lease(&self, id: Uuid, owner: &str) -> Result<KeyLease, CoreError>;

    /// Metadata for all of `owner`'s keys, newest first. Never includes
    /// material.
    fn list(&self, owner: &str) -> Result<Vec<KeyInfo>, CoreError>;

    /// Serialize a key's material in the stable export layout.
    fn export(&self, id: Uuid, owner: &str) -> Result<Vec<u8>, CoreError>;

    /// Remove a key. Fails [`CoreError::KeyInUse`] while a lease is
    /// outstanding.
    fn delete(&self, id: Uuid, owner: &str) -> Result<(), CoreError>;

    /// Remove a key while holding its lease, consuming the lease.
    ///
    /// Succeeds only when the caller's lease is the sole pin on the row;
    /// removal and the pin check happen atomically under the store lock, so
    /// no new lease can be taken in between. Fails [`CoreError::KeyInUse`]
    /// if another lease is in flight, [`CoreError::KeyNotFound`] if the row
    /// is gone or the lease is from an earlier generation of the id.
    fn delete_leased(&self, lease: KeyLease) -> Result<(), CoreError>;
}

struct Row {
    key: EncryptionKey,
    pin: Arc<AtomicUsize>,
}

/// In-memory key store with per-row atomicity.
#[derive(Default)]
pub struct MemoryKeyStore {
    rows: Mutex<HashMap<Uuid, Row>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, Row>>, CoreError> {
        self.rows
            .lock()
            .map_err(|_| CoreError::Storage("key store lock poisoned".into()))
    }
}

impl KeyStore for MemoryKeyStore {
    fn create(&self, key: EncryptionKey) -> Result<(), CoreError> {
        let mut rows = self.lock()?;
        if rows.contains_key(&key.id) {
            return Err(CoreError::Storage(format!("duplicate key id {}", key.id)));
        }
        rows.insert(key.id, Row { key, pin: Arc::new(AtomicUsize::new(0)) });
        Ok(())
    }

    fn lease(&self, id: Uuid, owner: &str) -> Result<KeyLease, CoreError> {
        let rows = self.lock()?;
        let row = rows.get(&id).filter(|r| r.key.owner == owner).ok_or(CoreError::KeyNotFound)?;
        // Pin while still under the lock so a concurrent delete cannot miss it.
        Ok(KeyLease::new(row.key.clone(), Arc::clone(&row.pin)))
    }

    fn list(&self, owner: &str) -> Result<Vec<KeyInfo>, CoreError> {
        let rows = self.lock()?;
        let mut keys: Vec<KeyInfo> = rows
            .values()
            .filter(|r| r.key.owner == owner)
            .map(|r| r.key.info())
            .collect();
        keys.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(keys)
    }

    fn export(&self, id: Uuid, owner: &str) -> Result<Vec<u8>, CoreError> {
        let rows = self.lock()?;
        let row = rows.get(&id).filter(|r| r.key.owner == owner).ok_or(CoreError::KeyNotFound)?;
        Ok(export::serialize_key(&row.key))
    }

    fn delete(&self, id: Uuid, owner: &str) -> Result<(), CoreError> {
        let mut rows = self.lock()?;
        let row = rows.get(&id).filter(|r| r.key.owner == owner).ok_or(CoreError::KeyNotFound)?;
        if row.pin.load(Ordering::SeqCst) > 0 {
            return Err(CoreError::KeyInUse);
        }
        rows.remove(&id);
        Ok(())
    }

    fn delete_leased(&self, lease: KeyLease) -> Result<(), CoreError> {
        let mut rows = self.lock()?;
        let id = lease.key().id;
        let row = rows.get(&id).ok_or(CoreError::KeyNotFound)?;
        // The lease must pin this row, not a recreated one under the same id.
        if !Arc::ptr_eq(&row.pin, &lease.pin) {
            return Err(CoreError::KeyNotFound);
        }
        if row.pin.load(Ordering::SeqCst) > 1 {
            return Err(CoreError::KeyInUse);
        }
        rows.remove(&id);
        Ok(())
    }
}
