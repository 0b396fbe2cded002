//! Shop domain type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ShopDomain`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum ShopDomainError {
    /// The input string is empty.
    #[error("shop domain cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("shop domain must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character that cannot appear in a hostname.
    #[error("shop domain contains invalid character {0:?}")]
    InvalidCharacter(char),
    /// The input has no dot-separated labels (e.g. a bare `my-store`).
    #[error("shop domain must contain a dot")]
    MissingDot,
    /// A dot-separated label is empty (leading, trailing, or double dot).
    #[error("shop domain has an empty label")]
    EmptyLabel,
}

/// A merchant's shop domain, the tenant key of the platform.
///
/// Parsing lowercases the input, so lookups keyed on a `ShopDomain` are
/// case-insensitive by construction.
///
/// ## Constraints
///
/// - Length: 1-255 characters (RFC 1035 hostname limit)
/// - ASCII letters, digits, `-`, and `.` only
/// - At least one dot, and no empty labels
///
/// ## Examples
///
/// ```
/// use tracknest_core::ShopDomain;
///
/// // Valid domains
/// assert!(ShopDomain::parse("my-store.myshopify.com").is_ok());
/// assert!(ShopDomain::parse("SHOUTY.myshopify.com").is_ok()); // lowercased
///
/// // Invalid domains
/// assert!(ShopDomain::parse("").is_err());          // empty
/// assert!(ShopDomain::parse("my-store").is_err());  // no dot
/// assert!(ShopDomain::parse("a..b.com").is_err());  // empty label
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ShopDomain(String);

impl ShopDomain {
    /// Maximum length of a hostname (RFC 1035).
    pub const MAX_LENGTH: usize = 255;

    /// Parse a `ShopDomain` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Is longer than 255 characters
    /// - Contains a character other than ASCII letters, digits, `-`, or `.`
    /// - Has no dot, or has an empty label
    pub fn parse(s: &str) -> Result<Self, ShopDomainError> {
        if s.is_empty() {
            return Err(ShopDomainError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(ShopDomainError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '.'))
        {
            return Err(ShopDomainError::InvalidCharacter(c));
        }

        if !s.contains('.') {
            return Err(ShopDomainError::MissingDot);
        }

        if s.split('.').any(str::is_empty) {
            return Err(ShopDomainError::EmptyLabel);
        }

        Ok(Self(s.to_ascii_lowercase()))
    }

    /// Returns the shop domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
