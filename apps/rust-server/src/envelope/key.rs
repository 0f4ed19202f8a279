// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Envelope key derivation and raw AEAD operations.
//!
//! The configured secret is never used as a key directly. It is run through
//! HKDF-SHA256 with a fixed salt and info string, producing the AES-256-GCM
//! key used for every response.

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::hkdf;
use ring::rand::{SecureRandom, SystemRandom};

/// Minimum accepted secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

const HKDF_SALT: &[u8] = b"agora/response-envelope/salt";
const HKDF_INFO: &[u8] = b"agora/response-envelope/aes-256-gcm";

/// Errors raised while building an [`EnvelopeKey`].
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("envelope secret must be at least {MIN_SECRET_LEN} bytes (got {0})")]
    TooShort(usize),

    #[error("envelope key derivation failed")]
    Derivation,
}

/// The AEAD primitive failed (RNG failure, or authentication failure on open).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AeadFailure;

/// AES-256-GCM key shared by the encode and decode sides.
///
/// Read-only after construction; share it behind an `Arc`.
pub struct EnvelopeKey {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl std::fmt::Debug for EnvelopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EnvelopeKey { .. }")
    }
}

impl EnvelopeKey {
    /// Derive the envelope key from the server-held secret.
    pub fn from_secret(secret: &[u8]) -> Result<Self, KeyError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(KeyError::TooShort(secret.len()));
        }

        let prk = hkdf::Salt::new(hkdf::HKDF_SHA256, HKDF_SALT).extract(secret);
        let unbound: UnboundKey = prk
            .expand(&[HKDF_INFO], &AES_256_GCM)
            .map_err(|_| KeyError::Derivation)?
            .into();

        Ok(Self {
            key: LessSafeKey::new(unbound),
            rng: SystemRandom::new(),
        })
    }

    /// Encrypt `plaintext` under a fresh random nonce.
    ///
    /// Returns the nonce and the ciphertext with the tag appended.
    pub(crate) fn seal(
        &self,
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<([u8; NONCE_LEN], Vec<u8>), AeadFailure> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng.fill(&mut nonce_bytes).map_err(|_| AeadFailure)?;

        let mut in_out = plaintext.to_vec();
        self.key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::from(aad),
                &mut in_out,
            )
            .map_err(|_| AeadFailure)?;

        Ok((nonce_bytes, in_out))
    }

    /// Decrypt and authenticate `ciphertext` (tag included).
    ///
    /// A nonce of the wrong length, a truncated ciphertext and a tag
    /// mismatch are indistinguishable to the caller.
    pub(crate) fn open(
        &self,
        aad: &[u8],
        nonce: &[u8],
        mut ciphertext: Vec<u8>,
    ) -> Result<Vec<u8>, AeadFailure> {
        let nonce = Nonce::try_assume_unique_for_key(nonce).map_err(|_| AeadFailure)?;
        let plaintext_len = self
            .key
            .open_in_place(nonce, Aad::from(aad), &mut ciphertext)
            .map_err(|_| AeadFailure)?
            .len();
        ciphertext.truncate(plaintext_len);
        Ok(ciphertext)
    }
}
