//! Error types for token issue and verification.
//!
//! Every failure is local and terminal: there is no retry, no partial
//! success, and no silent downgrade. Verification rejections map one-to-one
//! onto the pipeline step that detected them, so callers can distinguish a
//! malformed string from a tampered signature from an expired payload.
//!
//! Display strings never contain the secret, the derived key, or decrypted
//! payload content.

use chrono::{DateTime, Utc};

/// Error type for all codec operations.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The wire string does not have exactly five `:`-delimited fields.
    #[error("malformed token: expected 5 fields, found {found}")]
    MalformedToken {
        /// Number of fields actually present.
        found: usize,
    },

    /// The first wire field is not the expected `loyalty` prefix.
    #[error("unknown token prefix: {0:?}")]
    UnknownPrefix(String),

    /// The version field names a format this codec does not understand.
    ///
    /// Unknown or future versions are rejected outright, never
    /// best-effort parsed.
    #[error("unsupported token version: {0:?}")]
    UnsupportedVersion(String),

    /// The type field is not one of `card`, `transaction`, `coupon`,
    /// or `referral`.
    #[error("unsupported token type: {0:?}")]
    UnsupportedType(String),

    /// HMAC mismatch: the token was tampered with or verified against
    /// the wrong secret.
    ///
    /// A wrong secret always surfaces as this variant, never as
    /// [`TokenError::Decryption`], because the signature is checked first.
    #[error("signature verification failed")]
    SignatureInvalid,

    /// The ciphertext buffer is malformed or the AEAD tag did not verify.
    #[error("decryption failed")]
    Decryption,

    /// The decrypted bytes are not a valid payload for the envelope type.
    #[error("payload parse failed: {0}")]
    PayloadParse(String),

    /// The payload's absolute expiry has passed.
    #[error("token expired at {expires_at}")]
    Expired {
        /// The `expiresAt` timestamp embedded in the payload.
        expires_at: DateTime<Utc>,
    },

    /// The payload's `issuedAt` is older than the caller-supplied maximum age.
    #[error("token is {age_secs}s old, maximum allowed is {max_age_secs}s")]
    TooOld {
        /// Seconds elapsed since the payload was issued.
        age_secs: i64,
        /// Maximum age the caller allowed, in seconds.
        max_age_secs: u64,
    },

    /// Deriving the symmetric key from the secret failed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Setting up or running the cipher on the issue path failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Setting up the MAC failed.
    #[error("signing failed: {0}")]
    Signing(String),
}

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, TokenError>;
