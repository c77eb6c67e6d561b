// Copyright (c) 2026 Stegvault Contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Key material generation.
//!
//! Symmetric keys (AES-256, ChaCha20) are 32 bytes drawn from the operating
//! system CSPRNG. RSA-2048 key pairs come from the `rsa` crate's prime
//! generation and are stored as DER (PKCS#8 private half, SPKI public half)
//! so the material survives export/import byte-for-byte.

use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::error::CoreError;
use crate::keys::{KeyMaterial, KeyType};

/// RSA modulus size in bits.
pub const RSA_BITS: usize = 2048;

/// Generate fresh key material for the requested algorithm family.
///
/// # Errors
/// [`CoreError::GenerationFailure`] if prime generation or DER encoding
/// fails. Symmetric generation is infallible apart from OS RNG failure,
/// which panics inside `rand` by design.
pub fn generate_material(key_type: KeyType) -> Result<KeyMaterial, CoreError> {
    match key_type {
        KeyType::Aes256 => Ok(KeyMaterial::Aes256(random_key())),
        KeyType::ChaCha20 => Ok(KeyMaterial::ChaCha20(random_key())),
        KeyType::Rsa2048 => generate_rsa(),
    }
}

fn random_key() -> [u8; 32] {
    let mut key = [0u8; 32];
    OsRng.fill_bytes(&mut key);
    key
}

fn generate_rsa() -> Result<KeyMaterial, CoreError> {
    let private = RsaPrivateKey::new(&mut OsRng, RSA_BITS)
        .map_err(|e| CoreError::GenerationFailure(e.to_string()))?;
    let public = RsaPublicKey::from(&private);

    let private_der = private
        .to_pkcs8_der()
        .map_err(|e| CoreError::GenerationFailure(e.to_string()))?
        .as_bytes()
        .to_vec();
    let public_der = public
        .to_public_key_der()
        .map_err(|e| CoreError::GenerationFailure(e.to_string()))?
        .as_bytes()
        .to_vec();

    Ok(KeyMaterial::Rsa2048 { private_der, public_der })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs8::DecodePrivateKey;
    use rsa::traits::PublicKeyParts;

    #[test]
    fn symmetric_keys_are_32_bytes_and_distinct() {
        let a = generate_material(KeyType::Aes256).unwrap();
        let b = generate_material(KeyType::Aes256).unwrap();
        let (KeyMaterial::Aes256(ka), KeyMaterial::Aes256(kb)) = (&a, &b) else {
            panic!("wrong variant");
        };
        assert_eq!(ka.len(), 32);
        assert_ne!(ka, kb, "two generations must not collide");
    }

    #[test]
    fn chacha_key_matches_variant() {
        let material = generate_material(KeyType::ChaCha20).unwrap();
        assert_eq!(material.key_type(), KeyType::ChaCha20);
    }

    #[test]
    fn rsa_keypair_has_2048_bit_modulus() {
        let material = generate_material(KeyType::Rsa2048).unwrap();
        let KeyMaterial::Rsa2048 { private_der, public_der } = &material else {
            panic!("wrong variant");
        };
        assert!(!public_der.is_empty());
        let private = RsaPrivateKey::from_pkcs8_der(private_der).unwrap();
        assert_eq!(private.n().bits(), RSA_BITS);
    }
}
