//! Typed token payloads and issue-side assembly rules.
//!
//! The plaintext inside a token is a JSON object with camelCase field names:
//! optional common fields (`expiresAt`, `oneTimeUse`, `useToken`,
//! `issuedAt`) plus the fields of one payload type. The JSON carries no type
//! discriminator; the envelope's type field decides which shape the verifier
//! parses, and a mismatch fails as [`TokenError::PayloadParse`].
//!
//! Only `card` payloads are stamped with `issuedAt` at issue time. The other
//! types never carry it, which makes a caller-supplied max-age check a no-op
//! for them (see [`crate::validity`]).

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TokenError};
use crate::wire::QrType;

/// Fields of a loyalty card identity token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardFields {
    pub card_number: String,
    pub customer_id: String,
    pub tier: String,
}

/// Fields of a completed-purchase token used for point accrual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFields {
    pub transaction_id: String,
    pub amount: f64,
    pub points: u32,
    pub store_id: String,
}

/// Fields of a discount coupon token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponFields {
    pub coupon_code: String,
    pub discount_percent: f64,
    pub min_purchase: f64,
}

/// Fields of a referral invitation token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralFields {
    pub referrer_id: String,
    pub referral_code: String,
    pub bonus_points: u32,
}

/// Type-specific payload fields, one variant per [`QrType`].
///
/// Serialized untagged: the variant's fields land directly in the payload
/// JSON, with the type carried by the envelope instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TokenFields {
    Card(CardFields),
    Transaction(TransactionFields),
    Coupon(CouponFields),
    Referral(ReferralFields),
}

impl TokenFields {
    /// The wire type matching this variant.
    pub fn qr_type(&self) -> QrType {
        match self {
            TokenFields::Card(_) => QrType::Card,
            TokenFields::Transaction(_) => QrType::Transaction,
            TokenFields::Coupon(_) => QrType::Coupon,
            TokenFields::Referral(_) => QrType::Referral,
        }
    }
}

/// Optional common fields the caller can attach at issue time.
///
/// `one_time_use`/`use_token` are carried verbatim; consumption tracking is
/// an external collaborator's job, this codec only transports the marker.
#[derive(Debug, Clone, Default)]
pub struct IssueOptions {
    /// Absolute expiry; verification rejects the token after this instant.
    pub expires_at: Option<DateTime<Utc>>,
    /// Marks the token as single-use for the caller's bookkeeping.
    pub one_time_use: Option<bool>,
    /// Caller-chosen identifier for single-use bookkeeping.
    pub use_token: Option<String>,
}

impl IssueOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an absolute expiry.
    pub fn with_expiration(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Mark the token single-use under the given identifier.
    pub fn with_single_use(mut self, use_token: impl Into<String>) -> Self {
        self.one_time_use = Some(true);
        self.use_token = Some(use_token.into());
        self
    }
}

/// A decrypted, validated token payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_time_use: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_token: Option<String>,
    /// Stamped at issue time for `card` payloads only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fields: TokenFields,
}

/// Deserialization shape: common fields plus one known type's fields,
/// selected by the envelope type before parsing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPayload<T> {
    expires_at: Option<DateTime<Utc>>,
    one_time_use: Option<bool>,
    use_token: Option<String>,
    issued_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    fields: T,
}

impl<T> RawPayload<T> {
    fn into_payload(self, wrap: impl FnOnce(T) -> TokenFields) -> Payload {
        Payload {
            expires_at: self.expires_at,
            one_time_use: self.one_time_use,
            use_token: self.use_token,
            issued_at: self.issued_at,
            fields: wrap(self.fields),
        }
    }
}

impl Payload {
    /// Assemble the payload for issuing.
    ///
    /// Common fields first, then type-specific fields. `issued_at` is
    /// stamped with the current time for `card` only; the other types do not
    /// receive one.
    pub(crate) fn assemble(fields: TokenFields, opts: IssueOptions, now: DateTime<Utc>) -> Payload {
        let issued_at = match fields {
            TokenFields::Card(_) => Some(now),
            TokenFields::Transaction(_) | TokenFields::Coupon(_) | TokenFields::Referral(_) => None,
        };
        Payload {
            expires_at: opts.expires_at,
            one_time_use: opts.one_time_use,
            use_token: opts.use_token,
            issued_at,
            fields,
        }
    }

    /// Serialize to the plaintext JSON handed to the encryptor.
    pub(crate) fn to_plaintext(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| TokenError::Encryption(format!("payload serialization failed: {}", e)))
    }

    /// Parse decrypted plaintext into the shape the envelope type demands.
    pub(crate) fn from_plaintext(qr_type: QrType, plaintext: &[u8]) -> Result<Payload> {
        fn parse<T: DeserializeOwned>(plaintext: &[u8]) -> Result<RawPayload<T>> {
            serde_json::from_slice(plaintext).map_err(|e| TokenError::PayloadParse(e.to_string()))
        }

        Ok(match qr_type {
            QrType::Card => parse::<CardFields>(plaintext)?.into_payload(TokenFields::Card),
            QrType::Transaction => {
                parse::<TransactionFields>(plaintext)?.into_payload(TokenFields::Transaction)
            }
            QrType::Coupon => parse::<CouponFields>(plaintext)?.into_payload(TokenFields::Coupon),
            QrType::Referral => {
                parse::<ReferralFields>(plaintext)?.into_payload(TokenFields::Referral)
            }
        })
    }

    /// The wire type of this payload.
    pub fn qr_type(&self) -> QrType {
        self.fields.qr_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn card_fields() -> TokenFields {
        TokenFields::Card(CardFields {
            card_number: "LC-1001".to_string(),
            customer_id: "cust-7".to_string(),
            tier: "gold".to_string(),
        })
    }

    #[test]
    fn test_card_gets_issued_at_stamp() {
        let now = Utc::now();
        let payload = Payload::assemble(card_fields(), IssueOptions::new(), now);
        assert_eq!(payload.issued_at, Some(now));
    }

    #[test]
    fn test_other_types_get_no_issued_at() {
        let now = Utc::now();
        for fields in [
            TokenFields::Transaction(TransactionFields {
                transaction_id: "t1".to_string(),
                amount: 100.0,
                points: 10,
                store_id: "s1".to_string(),
            }),
            TokenFields::Coupon(CouponFields {
                coupon_code: "SAVE10".to_string(),
                discount_percent: 10.0,
                min_purchase: 25.0,
            }),
            TokenFields::Referral(ReferralFields {
                referrer_id: "u1".to_string(),
                referral_code: "FRIEND".to_string(),
                bonus_points: 500,
            }),
        ] {
            let payload = Payload::assemble(fields, IssueOptions::new(), now);
            assert_eq!(payload.issued_at, None);
        }
    }

    #[test]
    fn test_json_uses_camel_case_and_omits_absent_options() {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let payload = Payload::assemble(card_fields(), IssueOptions::new(), now);
        let json: serde_json::Value =
            serde_json::from_slice(&payload.to_plaintext().unwrap()).unwrap();

        assert_eq!(json["cardNumber"], "LC-1001");
        assert_eq!(json["customerId"], "cust-7");
        assert!(json.get("issuedAt").is_some());
        assert!(json.get("expiresAt").is_none());
        assert!(json.get("oneTimeUse").is_none());
        assert!(json.get("useToken").is_none());
    }

    #[test]
    fn test_plaintext_roundtrip_per_type() {
        let now = Utc::now();
        let opts = IssueOptions::new()
            .with_expiration(now + chrono::Duration::hours(1))
            .with_single_use("use-1");
        let payload = Payload::assemble(card_fields(), opts, now);

        let bytes = payload.to_plaintext().unwrap();
        let parsed = Payload::from_plaintext(QrType::Card, &bytes).unwrap();
        assert_eq!(parsed, payload);
        assert_eq!(parsed.qr_type(), QrType::Card);
        assert_eq!(parsed.one_time_use, Some(true));
        assert_eq!(parsed.use_token.as_deref(), Some("use-1"));
    }

    #[test]
    fn test_envelope_type_drives_parse_shape() {
        let now = Utc::now();
        let card = Payload::assemble(card_fields(), IssueOptions::new(), now);
        let bytes = card.to_plaintext().unwrap();

        // Card JSON parsed as a transaction is missing required fields.
        let err = Payload::from_plaintext(QrType::Transaction, &bytes).unwrap_err();
        assert!(matches!(err, TokenError::PayloadParse(_)));
    }

    #[test]
    fn test_non_json_plaintext_rejected() {
        let err = Payload::from_plaintext(QrType::Card, b"not json").unwrap_err();
        assert!(matches!(err, TokenError::PayloadParse(_)));
    }

    #[test]
    fn test_single_use_helper_sets_both_fields() {
        let opts = IssueOptions::new().with_single_use("tok-9");
        assert_eq!(opts.one_time_use, Some(true));
        assert_eq!(opts.use_token.as_deref(), Some("tok-9"));
    }
}
