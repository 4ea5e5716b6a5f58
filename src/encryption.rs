//! AES-256-GCM encryption of token payloads.
//!
//! # Security Properties
//!
//! - **Confidentiality**: AES-256 keeps payload fields opaque inside the code
//! - **Integrity**: the GCM authentication tag detects tampering
//! - **Unique IVs**: a fresh random 128-bit IV is drawn from the OS CSPRNG on
//!   every call, so IV reuse under one key cannot happen by construction
//!
//! # Wire Format
//!
//! ```text
//! base64( [16 bytes IV][16 bytes auth tag][N bytes ciphertext] )
//! ```
//!
//! The tag sits between the IV and the ciphertext; the RustCrypto AEAD API
//! appends it instead, so both directions re-order the buffer at fixed
//! offsets.

use aes_gcm::{
    aead::{consts::U16, Aead, KeyInit},
    aes::Aes256,
    AesGcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;

use crate::errors::{Result, TokenError};
use crate::keys::DerivedKey;

/// Size of the initialization vector in bytes (128 bits).
pub const IV_SIZE: usize = 16;

/// Size of the GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// AES-256-GCM with the 16-byte IV the wire format fixes (the AEAD default
/// would be 12).
type LoyaltyCipher = AesGcm<Aes256, U16>;

/// Encrypt a plaintext payload, returning the base64 combined buffer.
///
/// A new random IV is generated per call, so encrypting the same plaintext
/// twice yields different output.
pub(crate) fn encrypt(plaintext: &[u8], key: &DerivedKey) -> Result<String> {
    let cipher = LoyaltyCipher::new_from_slice(key.as_bytes())
        .map_err(|e| TokenError::Encryption(e.to_string()))?;

    let mut iv = [0u8; IV_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut iv);

    let sealed = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| TokenError::Encryption("AEAD sealing failed".to_string()))?;

    // RustCrypto returns ciphertext||tag; the wire wants IV||tag||ciphertext.
    let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_SIZE);

    let mut combined = Vec::with_capacity(IV_SIZE + TAG_SIZE + ciphertext.len());
    combined.extend_from_slice(&iv);
    combined.extend_from_slice(tag);
    combined.extend_from_slice(ciphertext);

    Ok(STANDARD.encode(combined))
}

/// Decrypt a base64 combined buffer produced by [`encrypt`].
///
/// # Errors
///
/// Returns [`TokenError::Decryption`] if the base64 is invalid, the buffer
/// is shorter than IV + tag (32 bytes), or the authentication tag does not
/// verify. The cause is deliberately not distinguished further.
pub(crate) fn decrypt(combined_b64: &str, key: &DerivedKey) -> Result<Vec<u8>> {
    let combined = STANDARD
        .decode(combined_b64)
        .map_err(|_| TokenError::Decryption)?;

    if combined.len() < IV_SIZE + TAG_SIZE {
        return Err(TokenError::Decryption);
    }

    let (iv, rest) = combined.split_at(IV_SIZE);
    let (tag, ciphertext) = rest.split_at(TAG_SIZE);

    let cipher =
        LoyaltyCipher::new_from_slice(key.as_bytes()).map_err(|_| TokenError::Decryption)?;

    // Re-append the tag the way the AEAD API expects it.
    let mut sealed = Vec::with_capacity(ciphertext.len() + TAG_SIZE);
    sealed.extend_from_slice(ciphertext);
    sealed.extend_from_slice(tag);

    cipher
        .decrypt(Nonce::from_slice(iv), sealed.as_slice())
        .map_err(|_| TokenError::Decryption)
}
