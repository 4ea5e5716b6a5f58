//! Temporal validity checks on decrypted payloads.
//!
//! Runs last in the verify pipeline, after the signature and AEAD tag have
//! already vouched for the payload bytes. Two independent rules:
//!
//! 1. absolute expiry: reject when `now > expiresAt`, if the payload
//!    carries one
//! 2. relative max age: reject when `now - issuedAt > max_age`, if the
//!    caller supplied a limit AND the payload carries `issuedAt`
//!
//! Only `card` payloads are stamped with `issuedAt`, so a max-age limit is
//! silently inert for the other types.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::errors::{Result, TokenError};
use crate::payload::Payload;

/// Check a payload's temporal rules against an explicit clock.
pub(crate) fn check(payload: &Payload, now: DateTime<Utc>, max_age: Option<Duration>) -> Result<()> {
    if let Some(expires_at) = payload.expires_at {
        if now > expires_at {
            return Err(TokenError::Expired { expires_at });
        }
    }

    if let (Some(max_age), Some(issued_at)) = (max_age, payload.issued_at) {
        let age_secs = now.signed_duration_since(issued_at).num_seconds();
        let max_age_secs = max_age.as_secs();
        let limit_secs = i64::try_from(max_age_secs).unwrap_or(i64::MAX);
        if age_secs > limit_secs {
            return Err(TokenError::TooOld {
                age_secs,
                max_age_secs,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{CardFields, IssueOptions, TokenFields, TransactionFields};
    use chrono::Duration as ChronoDuration;

    fn card_payload(opts: IssueOptions, issued: DateTime<Utc>) -> Payload {
        Payload::assemble(
            TokenFields::Card(CardFields {
                card_number: "LC-1".to_string(),
                customer_id: "u1".to_string(),
                tier: "gold".to_string(),
            }),
            opts,
            issued,
        )
    }

    fn transaction_payload(issued: DateTime<Utc>) -> Payload {
        Payload::assemble(
            TokenFields::Transaction(TransactionFields {
                transaction_id: "t1".to_string(),
                amount: 100.0,
                points: 10,
                store_id: "s1".to_string(),
            }),
            IssueOptions::new(),
            issued,
        )
    }

    #[test]
    fn test_no_expiry_no_max_age_passes() {
        let now = Utc::now();
        check(&card_payload(IssueOptions::new(), now), now, None).unwrap();
    }

    #[test]
    fn test_expired_one_second_ago_rejected() {
        let now = Utc::now();
        let opts = IssueOptions::new().with_expiration(now - ChronoDuration::seconds(1));
        let err = check(&card_payload(opts, now), now, None).unwrap_err();
        assert!(matches!(err, TokenError::Expired { .. }));
    }

    #[test]
    fn test_expiry_an_hour_out_passes() {
        let now = Utc::now();
        let opts = IssueOptions::new().with_expiration(now + ChronoDuration::hours(1));
        check(&card_payload(opts, now), now, None).unwrap();
    }

    #[test]
    fn test_expiry_exactly_now_passes() {
        // The boundary is strict: rejection requires now > expiresAt.
        let now = Utc::now();
        let opts = IssueOptions::new().with_expiration(now);
        check(&card_payload(opts, now), now, None).unwrap();
    }

    #[test]
    fn test_max_age_exceeded_rejected() {
        let issued = Utc::now();
        let now = issued + ChronoDuration::seconds(400);
        let err = check(
            &card_payload(IssueOptions::new(), issued),
            now,
            Some(Duration::from_secs(300)),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TokenError::TooOld {
                age_secs: 400,
                max_age_secs: 300
            }
        ));
    }

    #[test]
    fn test_max_age_within_limit_passes() {
        let issued = Utc::now();
        let now = issued + ChronoDuration::seconds(200);
        check(
            &card_payload(IssueOptions::new(), issued),
            now,
            Some(Duration::from_secs(300)),
        )
        .unwrap();
    }

    #[test]
    fn test_max_age_ignored_without_issued_at() {
        // Transaction payloads carry no issuedAt, so the limit is inert.
        let issued = Utc::now();
        let now = issued + ChronoDuration::hours(24);
        check(
            &transaction_payload(issued),
            now,
            Some(Duration::from_secs(300)),
        )
        .unwrap();
    }

    #[test]
    fn test_expiry_checked_before_max_age() {
        let issued = Utc::now();
        let now = issued + ChronoDuration::seconds(400);
        let opts = IssueOptions::new().with_expiration(issued + ChronoDuration::seconds(100));
        let err = check(
            &card_payload(opts, issued),
            now,
            Some(Duration::from_secs(300)),
        )
        .unwrap_err();
        assert!(matches!(err, TokenError::Expired { .. }));
    }
}
