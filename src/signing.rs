//! HMAC-SHA256 signing of token envelopes.
//!
//! The signature covers the ciphertext, never the plaintext: the message is
//! every wire field except the signature itself
//! (`prefix:version:type:ciphertextBase64`). Verification recomputes the
//! digest and compares in constant time, and the verify path runs this check
//! before any decryption so tampered ciphertext never reaches the cipher.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::errors::{Result, TokenError};
use crate::keys::DerivedKey;

type HmacSha256 = Hmac<Sha256>;

/// Sign a message, returning the lowercase hex HMAC-SHA256 digest.
pub(crate) fn sign(message: &str, key: &DerivedKey) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| TokenError::Signing(e.to_string()))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a hex signature against a message.
///
/// The length comparison happens first: a wrong-length signature is rejected
/// immediately, which leaks only the digest size. Equal-length digests are
/// compared with a constant-time routine so the mismatch position cannot be
/// timed.
///
/// # Errors
///
/// Returns [`TokenError::SignatureInvalid`] for any mismatch, including
/// signatures that are not valid hex.
pub(crate) fn verify(message: &str, signature_hex: &str, key: &DerivedKey) -> Result<()> {
    let supplied: Vec<u8> = hex::decode(signature_hex).map_err(|_| TokenError::SignatureInvalid)?;

    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| TokenError::Signing(e.to_string()))?;
    mac.update(message.as_bytes());
    let expected = mac.finalize().into_bytes();

    if supplied.len() != expected.len() {
        return Err(TokenError::SignatureInvalid);
    }

    if bool::from(expected.as_slice().ct_eq(supplied.as_slice())) {
        Ok(())
    } else {
        Err(TokenError::SignatureInvalid)
    }
}
