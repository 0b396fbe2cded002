//! Order number type.

use core::fmt;

/// A shopper-supplied order number, normalized for lookup.
///
/// Shoppers tend to paste the display form of an order name (`#1001`), often
/// with surrounding whitespace. Normalization trims the whitespace and strips
/// a single leading `#`; the order search syntax matches the bare number
/// against the order name.
///
/// Normalization never fails. A value that identifies no order simply yields
/// an empty lookup result, so there is nothing to validate here.
///
/// ## Examples
///
/// ```
/// use tracknest_core::OrderNumber;
///
/// assert_eq!(OrderNumber::new("#1001").as_str(), "1001");
/// assert_eq!(OrderNumber::new("  1001 ").as_str(), "1001");
/// assert_eq!(OrderNumber::new("##1001").as_str(), "#1001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Normalize a raw order number.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        let normalized = trimmed.strip_prefix('#').unwrap_or(trimmed);
        Self(normalized.to_owned())
    }

    /// Returns the normalized order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
