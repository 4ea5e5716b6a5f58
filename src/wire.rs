//! Wire format for loyalty QR tokens.
//!
//! A token is a five-field, colon-separated ASCII string:
//!
//! ```text
//! loyalty:v1:{type}:{ciphertextBase64}:{signatureHex}
//! ```
//!
//! `type` is one of `card|transaction|coupon|referral`, lowercase, no
//! quoting. The ciphertext and signature fields are base64 and hex, which
//! never contain `:`, so splitting on `:` is unambiguous by construction.
//! This string is the only thing that crosses the boundary to external
//! collaborators (QR renderers, scanners, transports).

use std::fmt;
use std::str::FromStr;

use crate::errors::{Result, TokenError};

/// Wire prefix shared by every token this codec produces.
pub const TOKEN_PREFIX: &str = "loyalty";

/// Wire format version this codec understands. Unknown versions are
/// rejected, not best-effort parsed.
pub const TOKEN_VERSION: &str = "v1";

/// Number of colon-separated fields in a well-formed token.
const WIRE_FIELDS: usize = 5;

/// The kind of payload a token carries.
///
/// A closed enumeration: adding a type requires updating both the issue and
/// verify paths, which the exhaustive matches in [`crate::payload`] enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QrType {
    /// Loyalty card identity.
    Card,
    /// Completed purchase for point accrual.
    Transaction,
    /// Discount coupon.
    Coupon,
    /// Referral invitation.
    Referral,
}

impl QrType {
    /// The lowercase wire name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            QrType::Card => "card",
            QrType::Transaction => "transaction",
            QrType::Coupon => "coupon",
            QrType::Referral => "referral",
        }
    }
}

impl fmt::Display for QrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QrType {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "card" => Ok(QrType::Card),
            "transaction" => Ok(QrType::Transaction),
            "coupon" => Ok(QrType::Coupon),
            "referral" => Ok(QrType::Referral),
            other => Err(TokenError::UnsupportedType(other.to_string())),
        }
    }
}

/// The signed unit: every wire field except the signature itself.
#[derive(Debug, Clone)]
pub(crate) struct Envelope {
    pub qr_type: QrType,
    pub ciphertext_b64: String,
}

impl Envelope {
    /// The exact byte string the HMAC covers:
    /// `{prefix}:{version}:{type}:{ciphertextBase64}`.
    pub fn signing_input(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            TOKEN_PREFIX, TOKEN_VERSION, self.qr_type, self.ciphertext_b64
        )
    }

    /// Append the signature to produce the final wire string.
    pub fn into_wire(self, signature_hex: &str) -> String {
        format!("{}:{}", self.signing_input(), signature_hex)
    }
}

/// A wire string split into its envelope and signature.
#[derive(Debug, Clone)]
pub(crate) struct ParsedToken {
    pub envelope: Envelope,
    pub signature_hex: String,
}

/// Parse a wire string into its components.
///
/// Structural checks only: field count, prefix, version, and type. All of
/// them run before any cryptographic work, so a garbled scan is rejected
/// without touching the MAC or cipher.
pub(crate) fn parse(token: &str) -> Result<ParsedToken> {
    let parts: Vec<&str> = token.split(':').collect();
    if parts.len() != WIRE_FIELDS {
        return Err(TokenError::MalformedToken { found: parts.len() });
    }

    if parts[0] != TOKEN_PREFIX {
        return Err(TokenError::UnknownPrefix(parts[0].to_string()));
    }
    if parts[1] != TOKEN_VERSION {
        return Err(TokenError::UnsupportedVersion(parts[1].to_string()));
    }
    let qr_type = parts[2].parse::<QrType>()?;

    Ok(ParsedToken {
        envelope: Envelope {
            qr_type,
            ciphertext_b64: parts[3].to_string(),
        },
        signature_hex: parts[4].to_string(),
    })
}
