//! Issue and verify pipelines.
//!
//! Two symmetric, stateless pipelines over one wire format:
//!
//! - issue: assemble payload → encrypt → sign → serialize
//! - verify: parse → check signature → decrypt → parse payload → temporal
//!   checks
//!
//! Every verification failure is terminal and carries the step that
//! rejected it; there are no retries and no partial successes. The
//! signature is always checked before decryption, so tampered ciphertext
//! never reaches the cipher and a wrong secret surfaces as
//! [`TokenError::SignatureInvalid`] rather than a decryption failure.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::keys::{derive_key, DerivedKey};
use crate::payload::{IssueOptions, Payload, TokenFields};
use crate::wire::Envelope;
use crate::{encryption, signing, validity, wire};

/// A token issuer/verifier bound to one secret.
///
/// Construction runs the deliberately slow scrypt derivation once; keep the
/// codec around to amortize that cost across many operations. All methods
/// are pure CPU-bound functions of their inputs, so a single codec can be
/// shared freely across threads.
#[derive(Clone)]
pub struct TokenCodec {
    key: DerivedKey,
}

impl TokenCodec {
    /// Derive the symmetric key from `secret` and build a codec.
    pub fn new(secret: &str) -> Result<Self> {
        Ok(Self {
            key: derive_key(secret)?,
        })
    }

    /// Issue a token carrying `fields`.
    ///
    /// Produces the wire string
    /// `loyalty:v1:{type}:{ciphertextBase64}:{signatureHex}`. A fresh random
    /// IV makes every call unique on the wire, even for identical inputs;
    /// the payloads still verify as equal.
    pub fn issue(&self, fields: TokenFields, opts: IssueOptions) -> Result<String> {
        let payload = Payload::assemble(fields, opts, Utc::now());

        let plaintext = payload.to_plaintext()?;
        let ciphertext_b64 = encryption::encrypt(&plaintext, &self.key)?;
        let envelope = Envelope {
            qr_type: payload.qr_type(),
            ciphertext_b64,
        };
        let signature = signing::sign(&envelope.signing_input(), &self.key)?;

        tracing::trace!("issued {} token", envelope.qr_type);
        Ok(envelope.into_wire(&signature))
    }

    /// Verify a wire string and return its payload.
    ///
    /// `max_age` bounds the payload's age relative to its `issuedAt` stamp.
    /// Only `card` payloads carry one, so the limit is silently inert for
    /// the other types.
    pub fn verify(&self, token: &str, max_age: Option<Duration>) -> Result<Payload> {
        match self.verify_at(token, Utc::now(), max_age) {
            Ok(payload) => {
                tracing::trace!("verified {} token", payload.qr_type());
                Ok(payload)
            }
            Err(e) => {
                // Error kinds only; never the token or payload content.
                tracing::debug!("token verification rejected: {}", e);
                Err(e)
            }
        }
    }

    /// Verification against an explicit clock. The pipeline proper.
    pub(crate) fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
        max_age: Option<Duration>,
    ) -> Result<Payload> {
        let parsed = wire::parse(token)?;

        signing::verify(
            &parsed.envelope.signing_input(),
            &parsed.signature_hex,
            &self.key,
        )?;

        let plaintext = encryption::decrypt(&parsed.envelope.ciphertext_b64, &self.key)?;
        let payload = Payload::from_plaintext(parsed.envelope.qr_type, &plaintext)?;

        validity::check(&payload, now, max_age)?;
        Ok(payload)
    }
}

/// One-shot issue: derives the key, issues, and discards the codec.
///
/// Prefer [`TokenCodec`] when issuing or verifying more than once with the
/// same secret.
pub fn issue(fields: TokenFields, opts: IssueOptions, secret: &str) -> Result<String> {
    TokenCodec::new(secret)?.issue(fields, opts)
}

/// One-shot verify; see [`TokenCodec::verify`].
pub fn verify(token: &str, secret: &str, max_age: Option<Duration>) -> Result<Payload> {
    TokenCodec::new(secret)?.verify(token, max_age)
}
