use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

lazy_static! {
    static ref EMAIL_FORMAT: Regex = Regex::new(r"^[^@]+@[^@]+\.[^@]+$").unwrap();
}

/// An email address that passed the basic `local@domain.tld` format check.
///
/// This only rules out obviously broken input; whether the mailbox
/// actually exists is up to the mail relay to decide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

#[derive(Error, Debug, PartialEq)]
pub enum InvalidEmailError {
    #[error("participant {0} should be a valid email")]
    Malformed(String),
}

impl EmailAddress {
    pub fn parse(address: &str) -> Result<Self, InvalidEmailError> {
        let address = address.trim();
        if EMAIL_FORMAT.is_match(address) {
            Ok(Self(address.to_string()))
        } else {
            Err(InvalidEmailError::Malformed(address.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for EmailAddress {
    type Err = InvalidEmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::convert::TryFrom<String> for EmailAddress {
    type Error = InvalidEmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(address: EmailAddress) -> Self {
        address.0
    }
}

impl Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        for valid in &["p@example.com", "first.last@mail.example.org", " a@x.com "] {
            assert!(EmailAddress::parse(valid).is_ok(), "{}", valid);
        }
        assert_eq!(EmailAddress::parse(" a@x.com ").unwrap().as_str(), "a@x.com");
    }

    #[test]
    fn rejects_malformed_addresses() {
        for invalid in &["bad-address", "a@b", "@example.com", "a@@example.com", ""] {
            assert_eq!(
                EmailAddress::parse(invalid),
                Err(InvalidEmailError::Malformed(invalid.to_string())),
            );
        }
    }

    #[test]
    fn deserialization_validates() {
        let ok: Result<EmailAddress, _> = serde_json::from_str("\"p@example.com\"");
        assert!(ok.is_ok());
        let bad: Result<EmailAddress, _> = serde_json::from_str("\"bad-address\"");
        assert!(bad.is_err());
    }
}
