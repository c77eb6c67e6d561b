// Copyright (c) 2026 Stegvault Contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the steganography core.
//!
//! [`CoreError`] covers all failure modes from input validation through
//! carrier parsing, embedding, encryption, and registry bookkeeping. The
//! variants are grouped so callers can tell apart "bad input", "this is not
//! a steganographic file", "wrong key", and "resource missing" without
//! inspecting error strings:
//!
//! - input validation: [`EmptyPayload`](CoreError::EmptyPayload),
//!   [`PayloadTooLarge`](CoreError::PayloadTooLarge),
//!   [`EmptyName`](CoreError::EmptyName),
//!   [`EmptyFilename`](CoreError::EmptyFilename)
//! - carrier structure: [`UnsupportedCarrierType`](CoreError::UnsupportedCarrierType),
//!   [`CapacityExceeded`](CoreError::CapacityExceeded),
//!   [`NoPayloadFound`](CoreError::NoPayloadFound),
//!   [`TruncatedPayload`](CoreError::TruncatedPayload)
//! - cryptography: [`IntegrityCheckFailed`](CoreError::IntegrityCheckFailed),
//!   [`KeyMismatch`](CoreError::KeyMismatch),
//!   [`InvalidEncoding`](CoreError::InvalidEncoding),
//!   [`GenerationFailure`](CoreError::GenerationFailure)
//! - lookup/lifecycle: [`KeyNotFound`](CoreError::KeyNotFound),
//!   [`FileNotFound`](CoreError::FileNotFound),
//!   [`KeyInUse`](CoreError::KeyInUse),
//!   [`UnsupportedKeyType`](CoreError::UnsupportedKeyType)
//!
//! Cross-owner access deliberately surfaces as `KeyNotFound`/`FileNotFound`
//! rather than a distinct "forbidden" variant, so an error response never
//! confirms the existence of another owner's resource.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur during key management, embedding, or extraction.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The payload text is empty.
    #[error("payload is empty")]
    EmptyPayload,

    /// The payload exceeds the maximum supported plaintext size.
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The key name is empty.
    #[error("key name is empty")]
    EmptyName,

    /// The carrier filename is empty.
    #[error("filename is empty")]
    EmptyFilename,

    /// The requested key type is not one of the supported algorithms.
    #[error("unsupported key type: {0:?}")]
    UnsupportedKeyType(String),

    /// Key material generation failed (randomness or primitive construction).
    #[error("key generation failed: {0}")]
    GenerationFailure(String),

    /// The key does not exist, or belongs to a different owner.
    #[error("key not found")]
    KeyNotFound,

    /// The file does not exist, or belongs to a different owner.
    #[error("file not found")]
    FileNotFound,

    /// The key is referenced by an embedded file or an in-flight operation.
    #[error("key is in use by existing files or an in-flight operation")]
    KeyInUse,

    /// The carrier's content structure matches no supported media type.
    #[error("unsupported carrier type")]
    UnsupportedCarrierType,

    /// The ciphertext does not fit in the carrier's embedding capacity.
    #[error("capacity exceeded: need {needed} bytes, carrier holds {available}")]
    CapacityExceeded { needed: usize, available: usize },

    /// The carrier holds no embedded payload (missing or invalid header).
    #[error("no payload found in carrier")]
    NoPayloadFound,

    /// The carrier is shorter than its embedded header declares.
    #[error("embedded payload is truncated")]
    TruncatedPayload,

    /// Authenticated decryption failed (wrong key or corrupted payload).
    #[error("integrity check failed (wrong key or corrupted payload)")]
    IntegrityCheckFailed,

    /// The asymmetric session-key unwrap failed (key pair mismatch).
    #[error("key mismatch: session key unwrap failed")]
    KeyMismatch,

    /// The decrypted payload is not valid UTF-8.
    #[error("decrypted payload is not valid UTF-8")]
    InvalidEncoding,

    /// The serialized key material could not be parsed.
    #[error("malformed key material: {0}")]
    MalformedKeyMaterial(String),

    /// A storage collaborator (row store or blob store) failed.
    #[error("storage error: {0}")]
    Storage(String),
}
