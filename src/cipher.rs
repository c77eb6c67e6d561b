// Copyright (c) 2026 Stegvault Contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Payload encryption, keyed by the managed key's algorithm family.
//!
//! Every construction is authenticated; a bare stream cipher would silently
//! return garbage under a wrong key instead of failing deterministically.
//! Wire layouts are stable across versions (carriers embedded by one build
//! must extract under a later build):
//!
//! ```text
//! AES-256      [12-byte nonce][ciphertext + 16-byte tag]         (AES-256-GCM-SIV)
//! ChaCha20     [24-byte nonce][ciphertext + 16-byte tag]         (XChaCha20-Poly1305)
//! RSA-2048     [2 bytes wrapped_len BE][wrapped session key]
//!              [12-byte nonce][ciphertext + 16-byte tag]
//! ```
//!
//! RSA cannot encrypt payloads larger than its modulus, so the RSA path is
//! hybrid: a fresh 32-byte session key seals the payload with
//! AES-256-GCM-SIV and is itself wrapped with RSA-OAEP (SHA-256). A fresh
//! nonce is drawn per call for every family and travels with the ciphertext.

use aes_gcm_siv::aead::Aead;
use aes_gcm_siv::{Aes256GcmSiv, KeyInit, Nonce};
use chacha20poly1305::aead::OsRng as AeadOsRng;
use chacha20poly1305::{AeadCore, XChaCha20Poly1305, XNonce};
use rand::RngCore;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::CoreError;
use crate::keys::KeyMaterial;

/// AES-GCM-SIV nonce length in bytes.
pub const AES_NONCE_LEN: usize = 12;
/// XChaCha20-Poly1305 nonce length in bytes.
pub const CHACHA_NONCE_LEN: usize = 24;
/// Poly1305 / GCM-SIV authentication tag length in bytes.
pub const TAG_LEN: usize = 16;
/// Length of the RSA-OAEP wrapped session key for a 2048-bit modulus.
pub const RSA_WRAPPED_LEN: usize = 256;

/// Ciphertext overhead added on top of the plaintext, per key type.
///
/// Used by callers that want to translate a carrier's ciphertext capacity
/// into a plaintext budget.
pub fn overhead(material: &KeyMaterial) -> usize {
    match material {
        KeyMaterial::Aes256(_) => AES_NONCE_LEN + TAG_LEN,
        KeyMaterial::ChaCha20(_) => CHACHA_NONCE_LEN + TAG_LEN,
        KeyMaterial::Rsa2048 { .. } => 2 + RSA_WRAPPED_LEN + AES_NONCE_LEN + TAG_LEN,
    }
}

/// Encrypt a payload with the given key material.
///
/// # Errors
/// [`CoreError::GenerationFailure`] if the RSA wrap fails, or
/// [`CoreError::MalformedKeyMaterial`] if stored DER cannot be parsed.
pub fn encrypt(plaintext: &[u8], material: &KeyMaterial) -> Result<Vec<u8>, CoreError> {
    match material {
        KeyMaterial::Aes256(key) => Ok(aes_seal(key, plaintext)),
        KeyMaterial::ChaCha20(key) => Ok(chacha_seal(key, plaintext)),
        KeyMaterial::Rsa2048 { public_der, .. } => rsa_seal(public_der, plaintext),
    }
}

/// Decrypt a payload with the given key material.
///
/// # Errors
/// - [`CoreError::IntegrityCheckFailed`] on tag mismatch (wrong key or
///   corrupted payload).
/// - [`CoreError::KeyMismatch`] if the RSA session-key unwrap fails.
pub fn decrypt(ciphertext: &[u8], material: &KeyMaterial) -> Result<Vec<u8>, CoreError> {
    match material {
        KeyMaterial::Aes256(key) => aes_open(key, ciphertext),
        KeyMaterial::ChaCha20(key) => chacha_open(key, ciphertext),
        KeyMaterial::Rsa2048 { private_der, .. } => rsa_open(private_der, ciphertext),
    }
}

fn aes_seal(key: &[u8; 32], plaintext: &[u8]) -> Vec<u8> {
    let mut nonce_bytes = [0u8; AES_NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let cipher = Aes256GcmSiv::new_from_slice(key).expect("valid key length");
    let nonce = Nonce::from_slice(&nonce_bytes);
    let sealed = cipher.encrypt(nonce, plaintext).expect("AES-GCM-SIV encrypt should not fail");

    let mut out = Vec::with_capacity(AES_NONCE_LEN + sealed.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&sealed);
    out
}

fn aes_open(key: &[u8; 32], data: &[u8]) -> Result<Vec<u8>, CoreError> {
    if data.len() < AES_NONCE_LEN + TAG_LEN {
        return Err(CoreError::IntegrityCheckFailed);
    }
    let (nonce_bytes, sealed) = data.split_at(AES_NONCE_LEN);
    let cipher = Aes256GcmSiv::new_from_slice(key).expect("valid key length");
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), sealed)
        .map_err(|_| CoreError::IntegrityCheckFailed)
}

fn chacha_seal(key: &[u8; 32], plaintext: &[u8]) -> Vec<u8> {
    let cipher = XChaCha20Poly1305::new_from_slice(key).expect("valid key length");
    let nonce = XChaCha20Poly1305::generate_nonce(&mut AeadOsRng);
    let sealed = cipher
        .encrypt(&nonce, plaintext)
        .expect("XChaCha20-Poly1305 encrypt should not fail");

    let mut out = Vec::with_capacity(CHACHA_NONCE_LEN + sealed.len());
    out.extend_from_slice(nonce.as_slice());
    out.extend_from_slice(&sealed);
    out
}

fn chacha_open(key: &[u8; 32], data: &[u8]) -> Result<Vec<u8>, CoreError> {
    if data.len() < CHACHA_NONCE_LEN + TAG_LEN {
        return Err(CoreError::IntegrityCheckFailed);
    }
    let (nonce_bytes, sealed) = data.split_at(CHACHA_NONCE_LEN);
    let cipher = XChaCha20Poly1305::new_from_slice(key).expect("valid key length");
    cipher
        .decrypt(XNonce::from_slice(nonce_bytes), sealed)
        .map_err(|_| CoreError::IntegrityCheckFailed)
}

fn rsa_seal(public_der: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CoreError> {
    let public = RsaPublicKey::from_public_key_der(public_der)
        .map_err(|e| CoreError::MalformedKeyMaterial(e.to_string()))?;

    let mut session_key = Zeroizing::new([0u8; 32]);
    rand::thread_rng().fill_bytes(&mut *session_key);

    let wrapped = public
        .encrypt(&mut rand::rngs::OsRng, Oaep::new::<Sha256>(), &session_key[..])
        .map_err(|e| CoreError::GenerationFailure(e.to_string()))?;

    let sealed = aes_seal(&session_key, plaintext);

    let mut out = Vec::with_capacity(2 + wrapped.len() + sealed.len());
    out.extend_from_slice(&(wrapped.len() as u16).to_be_bytes());
    out.extend_from_slice(&wrapped);
    out.extend_from_slice(&sealed);
    Ok(out)
}

fn rsa_open(private_der: &[u8], data: &[u8]) -> Result<Vec<u8>, CoreError> {
    if data.len() < 2 {
        return Err(CoreError::IntegrityCheckFailed);
    }
    let wrapped_len = u16::from_be_bytes([data[0], data[1]]) as usize;
    // A 2048-bit modulus produces exactly 256 wrapped bytes; anything else
    // means this ciphertext was not produced by this scheme.
    if wrapped_len != RSA_WRAPPED_LEN || data.len() < 2 + wrapped_len {
        return Err(CoreError::IntegrityCheckFailed);
    }
    let wrapped = &data[2..2 + wrapped_len];
    let sealed = &data[2 + wrapped_len..];

    let private = RsaPrivateKey::from_pkcs8_der(private_der)
        .map_err(|e| CoreError::MalformedKeyMaterial(e.to_string()))?;

    let session_key = Zeroizing::new(
        private
            .decrypt(Oaep::new::<Sha256>(), wrapped)
            .map_err(|_| CoreError::KeyMismatch)?,
    );
    let session_key: &[u8; 32] = session_key
        .as_slice()
        .try_into()
        .map_err(|_| CoreError::KeyMismatch)?;

    aes_open(session_key, sealed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::generate::generate_material;
    use crate::keys::KeyType;
    use std::sync::OnceLock;

    // RSA key generation is expensive; share one pair across tests.
    fn rsa_material() -> &'static KeyMaterial {
        static MATERIAL: OnceLock<KeyMaterial> = OnceLock::new();
        MATERIAL.get_or_init(|| generate_material(KeyType::Rsa2048).unwrap())
    }

    #[test]
    fn aes_roundtrip() {
        let material = KeyMaterial::Aes256([9u8; 32]);
        let ct = encrypt(b"hello world", &material).unwrap();
        assert_eq!(ct.len(), 11 + overhead(&material));
        assert_eq!(decrypt(&ct, &material).unwrap(), b"hello world");
    }

    #[test]
    fn chacha_roundtrip() {
        let material = KeyMaterial::ChaCha20([3u8; 32]);
        let ct = encrypt(b"stream of secrets", &material).unwrap();
        assert_eq!(ct.len(), 17 + overhead(&material));
        assert_eq!(decrypt(&ct, &material).unwrap(), b"stream of secrets");
    }

    #[test]
    fn rsa_hybrid_roundtrip() {
        let material = rsa_material();
        let ct = encrypt(b"wrapped session", material).unwrap();
        assert_eq!(ct.len(), 15 + overhead(material));
        assert_eq!(decrypt(&ct, material).unwrap(), b"wrapped session");
    }

    #[test]
    fn rsa_hybrid_large_payload() {
        // 10,000 bytes exceeds the RSA modulus; must succeed via the hybrid
        // session key.
        let material = rsa_material();
        let payload = vec![0x5Au8; 10_000];
        let ct = encrypt(&payload, material).unwrap();
        assert_eq!(decrypt(&ct, material).unwrap(), payload);
    }

    #[test]
    fn aes_wrong_key_fails_integrity() {
        let ct = encrypt(b"secret", &KeyMaterial::Aes256([1u8; 32])).unwrap();
        let result = decrypt(&ct, &KeyMaterial::Aes256([2u8; 32]));
        assert!(matches!(result, Err(CoreError::IntegrityCheckFailed)));
    }

    #[test]
    fn chacha_wrong_key_fails_integrity() {
        let ct = encrypt(b"secret", &KeyMaterial::ChaCha20([1u8; 32])).unwrap();
        let result = decrypt(&ct, &KeyMaterial::ChaCha20([2u8; 32]));
        assert!(matches!(result, Err(CoreError::IntegrityCheckFailed)));
    }

    #[test]
    fn rsa_wrong_key_fails_key_mismatch() {
        let ct = encrypt(b"secret", rsa_material()).unwrap();
        let other = generate_material(KeyType::Rsa2048).unwrap();
        let result = decrypt(&ct, &other);
        assert!(matches!(result, Err(CoreError::KeyMismatch)));
    }

    #[test]
    fn tampered_ciphertext_fails_integrity() {
        let material = KeyMaterial::Aes256([7u8; 32]);
        let mut ct = encrypt(b"payload", &material).unwrap();
        let last = ct.len() - 1;
        ct[last] ^= 0x01;
        assert!(matches!(decrypt(&ct, &material), Err(CoreError::IntegrityCheckFailed)));
    }

    #[test]
    fn nonce_is_fresh_per_call() {
        let material = KeyMaterial::Aes256([7u8; 32]);
        let a = encrypt(b"same", &material).unwrap();
        let b = encrypt(b"same", &material).unwrap();
        assert_ne!(a, b, "repeated encryptions must differ (fresh nonce)");
    }

    #[test]
    fn cross_algorithm_ciphertext_fails_cleanly() {
        // A ChaCha ciphertext handed to an AES key must fail, not panic.
        let ct = encrypt(b"mismatched", &KeyMaterial::ChaCha20([1u8; 32])).unwrap();
        let result = decrypt(&ct, &KeyMaterial::Aes256([1u8; 32]));
        assert!(matches!(result, Err(CoreError::IntegrityCheckFailed)));
    }

    #[test]
    fn short_ciphertext_rejected() {
        let material = KeyMaterial::Aes256([7u8; 32]);
        assert!(matches!(decrypt(&[], &material), Err(CoreError::IntegrityCheckFailed)));
        assert!(matches!(decrypt(&[1, 2, 3], &material), Err(CoreError::IntegrityCheckFailed)));
    }
}
