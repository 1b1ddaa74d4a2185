//! Human-facing order codes.
//!
//! An [`OrderCode`] is the identifier customers see on the success screen
//! and in order history, distinct from the server-assigned [`crate::OrderId`].
//! It is also the external reference passed to the payment gateway so
//! webhook reconciliation can link gateway events back to the order.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur when parsing an [`OrderCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum OrderCodeError {
    /// The input string is empty.
    #[error("order code cannot be empty")]
    Empty,
    /// The input does not start with the `ZEN-` prefix.
    #[error("order code must start with {prefix}", prefix = OrderCode::PREFIX)]
    MissingPrefix,
    /// The suffix has the wrong length or contains invalid characters.
    #[error("order code suffix must be {len} uppercase hex characters", len = OrderCode::SUFFIX_LENGTH)]
    InvalidSuffix,
}

/// A human-facing order code (e.g., `ZEN-9F3A2C71`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderCode(String);

impl OrderCode {
    /// Prefix shared by all order codes.
    pub const PREFIX: &'static str = "ZEN-";

    /// Length of the random suffix.
    pub const SUFFIX_LENGTH: usize = 8;

    /// Generate a fresh order code.
    ///
    /// The suffix is taken from a v4 UUID, which gives plenty of entropy
    /// for a human-facing reference (uniqueness is ultimately enforced by
    /// the backend's unique constraint on the column).
    #[must_use]
    pub fn generate() -> Self {
        let raw = Uuid::new_v4().simple().to_string().to_uppercase();
        let suffix: String = raw.chars().take(Self::SUFFIX_LENGTH).collect();
        Self(format!("{}{suffix}", Self::PREFIX))
    }

    /// Parse an `OrderCode` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, lacks the `ZEN-` prefix, or
    /// has a malformed suffix.
    pub fn parse(s: &str) -> Result<Self, OrderCodeError> {
        if s.is_empty() {
            return Err(OrderCodeError::Empty);
        }

        let suffix = s.strip_prefix(Self::PREFIX).ok_or(OrderCodeError::MissingPrefix)?;

        if suffix.len() != Self::SUFFIX_LENGTH
            || !suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        {
            return Err(OrderCodeError::InvalidSuffix);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
