//! Admin session token.
//!
//! The token is `base64("{username}:{issued_at_millis}")`. It is neither
//! signed nor encrypted: any value that decodes to a string containing a
//! colon is accepted, and the username is the text before the first colon.
//! Decoding takes padded or unpadded input in either the standard or the
//! URL-safe alphabet.

use base64::{
    Engine, alphabet,
    engine::{
        DecodePaddingMode,
        general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD},
    },
};
use chrono::{DateTime, Utc};

/// Cookie carrying the admin token.
pub const ADMIN_COOKIE_NAME: &str = "luxeshopy_admin";

/// Cookie lifetime in seconds (7 days).
pub const ADMIN_COOKIE_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// An admin session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminToken(String);

impl AdminToken {
    /// Issue a token for `username` at `now`.
    #[must_use]
    pub fn issue(username: &str, now: DateTime<Utc>) -> Self {
        let raw = format!("{username}:{}", now.timestamp_millis());
        Self(STANDARD.encode(raw))
    }

    /// Validate a raw cookie value, returning the username it names.
    #[must_use]
    pub fn verify(raw: &str) -> Option<String> {
        let normalized = raw.trim().replace('-', "+").replace('_', "/");
        let bytes = LENIENT.decode(normalized).ok()?;
        let decoded = String::from_utf8(bytes).ok()?;
        let (username, _) = decoded.split_once(':')?;
        Some(username.to_string())
    }

    /// The encoded cookie value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<AdminToken> for String {
    fn from(token: AdminToken) -> Self {
        token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_then_verify_yields_username() {
        let token = AdminToken::issue("admin", Utc::now());
        assert_eq!(AdminToken::verify(token.as_str()).as_deref(), Some("admin"));
    }

    #[test]
    fn test_token_is_plain_base64() {
        let at = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap_or_default();
        let token = AdminToken::issue("root", at);
        assert_eq!(token.as_str(), STANDARD.encode("root:1700000000000"));
    }

    #[test]
    fn test_any_value_with_colon_is_accepted() {
        let forged = STANDARD.encode("someone:whatever");
        assert_eq!(AdminToken::verify(&forged).as_deref(), Some("someone"));
        let empty_user = STANDARD.encode(":123");
        assert_eq!(AdminToken::verify(&empty_user).as_deref(), Some(""));
    }

    #[test]
    fn test_unpadded_and_url_safe_values_verify() {
        // "ab:1" encodes to "YWI6MQ==".
        assert_eq!(AdminToken::verify("YWI6MQ").as_deref(), Some("ab"));
        // "~~>:1" encodes to "fn4+OjE=", which is "fn4-OjE" URL-safe and unpadded.
        assert_eq!(AdminToken::verify("fn4-OjE").as_deref(), Some("~~>"));
        assert_eq!(AdminToken::verify("fn4-OjE=").as_deref(), Some("~~>"));
    }

    #[test]
    fn test_rejects_values_without_colon_or_bad_base64() {
        assert_eq!(AdminToken::verify(&STANDARD.encode("nocolon")), None);
        assert_eq!(AdminToken::verify("%%%not-base64"), None);
        assert_eq!(AdminToken::verify(""), None);
    }
}
