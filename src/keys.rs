//! Key derivation from the caller-supplied secret.
//!
//! The codec derives one 256-bit symmetric key from the secret string via
//! scrypt and uses it for both AES-256-GCM and HMAC-SHA256. Derivation is
//! deliberately slow (CPU- and memory-hard); hold a
//! [`TokenCodec`](crate::TokenCodec) to pay the cost once instead of per
//! call.
//!
//! # Security
//!
//! The scrypt salt is a fixed constant shared by every token issued with a
//! given secret. That keeps derivation deterministic, which the verify path
//! requires (only the secret is available at decode time), but it means two
//! deployments using the same secret string derive the identical key. Use
//! distinct secrets per deployment if cross-deployment key reuse is a
//! concern.

use scrypt::Params;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{Result, TokenError};

/// Fixed salt for scrypt. Shared by all tokens so that the same secret
/// always derives the same key.
const KDF_SALT: &[u8] = b"loyalty-qr-token-v1";

/// scrypt cost parameter, log2(N). N = 16384.
const SCRYPT_LOG_N: u8 = 14;

/// scrypt block size parameter.
const SCRYPT_R: u32 = 8;

/// scrypt parallelization parameter.
const SCRYPT_P: u32 = 1;

/// Size of the derived key in bytes (256 bits).
pub const KEY_SIZE: usize = 32;

/// A 256-bit key derived from the caller's secret.
///
/// Used for both encryption and signing. Zeroized when dropped; never
/// printed, serialized, or logged.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_SIZE]);

impl DerivedKey {
    /// Raw key bytes, for handing to the cipher and MAC.
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose key bytes through Debug.
        f.write_str("DerivedKey(..)")
    }
}

/// Derive the symmetric key from a secret string.
///
/// Same secret in, same key out, every time. scrypt parameters are
/// N=16384, r=8, p=1 with a 32-byte output.
pub fn derive_key(secret: &str) -> Result<DerivedKey> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_SIZE)
        .map_err(|e| TokenError::KeyDerivation(e.to_string()))?;

    let mut key = [0u8; KEY_SIZE];
    scrypt::scrypt(secret.as_bytes(), KDF_SALT, &params, &mut key)
        .map_err(|e| TokenError::KeyDerivation(e.to_string()))?;

    Ok(DerivedKey(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_secret_same_key() {
        let a = derive_key("correct horse battery staple").unwrap();
        let b = derive_key("correct horse battery staple").unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_different_secret_different_key() {
        let a = derive_key("secret-one").unwrap();
        let b = derive_key("secret-two").unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_empty_secret_still_derives() {
        // An empty secret is weak but not an error at this layer.
        let key = derive_key("").unwrap();
        assert_eq!(key.as_bytes().len(), KEY_SIZE);
    }

    #[test]
    fn test_debug_hides_key_bytes() {
        let key = derive_key("k").unwrap();
        assert_eq!(format!("{:?}", key), "DerivedKey(..)");
    }
}
