//! Email addresses as the Madstore API hands them out.
//!
//! The API keys wishlists, reviews and orders by email. While nobody is signed
//! in, request bodies carry the guest sentinel instead.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Active email used while nobody is signed in.
pub const GUEST_EMAIL: &str = "guest@madstore.local";

/// Why a string is not an email address.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    /// Nothing before the `@`, nothing after it, or no `@` at all.
    #[error("email must look like name@domain")]
    Malformed,
}

/// An email address.
///
/// Values received from the API are taken as is; [`Email::parse`] is for
/// text typed by a person.
///
/// ```
/// use madstore_core::Email;
///
/// assert_eq!(Email::parse(" Jane@Example.com ").unwrap().lookup_key(), "jane@example.com");
/// assert!(Email::parse("jane@").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parse typed input, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] if the trimmed input is empty or has no
    /// non-empty name and domain around an `@`.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        match s.split_once('@') {
            Some((name, domain)) if !name.is_empty() && !domain.is_empty() => {
                Ok(Self(s.to_owned()))
            }
            _ => Err(EmailError::Malformed),
        }
    }

    /// The guest sentinel address.
    #[must_use]
    pub fn guest() -> Self {
        Self(GUEST_EMAIL.to_owned())
    }

    #[must_use]
    pub fn is_guest(&self) -> bool {
        self.0 == GUEST_EMAIL
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased form the order endpoints expect.
    #[must_use]
    pub fn lookup_key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
