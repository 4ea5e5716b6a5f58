//! # Loyalty QR token codec
//!
//! Encodes and verifies short-lived, tamper-evident codes that carry a typed
//! payload (card identity, transaction, coupon, or referral) inside a
//! scannable string. Strings in, typed payloads or typed failures out; this
//! crate renders no images, scans no cameras, and talks to no network.
//!
//! ## Security model
//!
//! - Payloads are sealed with AES-256-GCM under a key scrypt-derived from
//!   the caller's secret
//! - The envelope is signed with HMAC-SHA256 over the ciphertext, and
//!   verification rejects a bad signature before attempting decryption
//! - Signature comparison is constant-time
//! - A fresh random IV per token makes encoding non-deterministic while
//!   decoding stays deterministic
//!
//! ## Wire format
//!
//! ```text
//! loyalty:v1:{type}:{base64(IV ‖ tag ‖ ciphertext)}:{hex(HMAC-SHA256)}
//! ```
//!
//! ## Example
//!
//! ```
//! use loyalty_codec::{CardFields, IssueOptions, QrType, TokenCodec, TokenFields};
//!
//! # fn main() -> loyalty_codec::Result<()> {
//! let codec = TokenCodec::new("store-secret")?;
//!
//! let token = codec.issue(
//!     TokenFields::Card(CardFields {
//!         card_number: "LC-1001".into(),
//!         customer_id: "cust-7".into(),
//!         tier: "gold".into(),
//!     }),
//!     IssueOptions::new(),
//! )?;
//!
//! let payload = codec.verify(&token, None)?;
//! assert_eq!(payload.qr_type(), QrType::Card);
//! # Ok(())
//! # }
//! ```
//!
//! Replay and consumption tracking are the caller's job: the codec carries
//! the `oneTimeUse`/`useToken` markers but keeps no state about which
//! tokens were already redeemed.

pub mod codec;
pub mod errors;
pub mod keys;
pub mod payload;
pub mod wire;

mod encryption;
mod signing;
mod validity;

pub use codec::{issue, verify, TokenCodec};
pub use errors::{Result, TokenError};
pub use keys::{derive_key, DerivedKey};
pub use payload::{
    CardFields, CouponFields, IssueOptions, Payload, ReferralFields, TokenFields,
    TransactionFields,
};
pub use wire::{QrType, TOKEN_PREFIX, TOKEN_VERSION};
