//! Email address value object.
//!
//! Emails are the join key between the ledger, submissions and accounts,
//! so they are normalized (trimmed, lowercased) at construction and every
//! comparison happens on the normalized form.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// A syntactically valid, normalized email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parses and normalizes an email address.
    ///
    /// Requires exactly one `@` with a non-empty local part and a domain
    /// containing no whitespace.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }

        let (local, domain) = trimmed
            .split_once('@')
            .ok_or_else(|| ValidationError::invalid_format("email", "missing @ symbol"))?;

        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(ValidationError::invalid_format(
                "email",
                "expected exactly one @ between local part and domain",
            ));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(ValidationError::invalid_format("email", "contains whitespace"));
        }

        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(email: EmailAddress) -> Self {
        email.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let email = EmailAddress::parse("  A@X.com ").unwrap();
        assert_eq!(email.as_str(), "a@x.com");
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(
            EmailAddress::parse("  "),
            Err(ValidationError::empty_field("email"))
        );
    }

    #[test]
    fn parse_rejects_missing_at() {
        assert!(matches!(
            EmailAddress::parse("ax.com"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn parse_rejects_empty_local_or_domain() {
        assert!(EmailAddress::parse("@x.com").is_err());
        assert!(EmailAddress::parse("a@").is_err());
        assert!(EmailAddress::parse("a@b@c").is_err());
    }

    #[test]
    fn parse_rejects_inner_whitespace() {
        assert!(EmailAddress::parse("a b@x.com").is_err());
    }

    #[test]
    fn deserialize_validates() {
        let ok: Result<EmailAddress, _> = serde_json::from_str("\"B@Y.org\"");
        assert_eq!(ok.unwrap().as_str(), "b@y.org");

        let bad: Result<EmailAddress, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }
}
