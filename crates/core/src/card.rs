//! Pure validators and formatters for card-like payment fields.
//!
//! These functions are consumed by the submission sequencer before any
//! payment request goes on the wire; nothing here performs I/O or binds to
//! UI state. A field that fails validation never reaches the network.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when validating card fields.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CardError {
    /// The holder name is empty or whitespace.
    #[error("holder name cannot be empty")]
    EmptyHolderName,
    /// The holder document does not resolve to 11 digits.
    #[error("document must contain exactly 11 digits, got {0}")]
    InvalidDocument(usize),
    /// The expiry is not in `MM/YY` form.
    #[error("expiry must be MM/YY")]
    MalformedExpiry,
    /// The expiry month is outside 1-12.
    #[error("expiry month must be between 01 and 12")]
    InvalidExpiryMonth,
    /// The expiry lies before the current month.
    #[error("card is expired")]
    Expired,
    /// The card number has an implausible digit count.
    #[error("card number must contain 13 to 19 digits, got {0}")]
    InvalidCardNumber(usize),
    /// The security code is not 3 or 4 digits.
    #[error("security code must be 3 or 4 digits")]
    InvalidSecurityCode,
}

/// A validated holder document (CPF), stored as its 11 digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(String);

impl Document {
    /// Parse a CPF-style document, accepting punctuation (`123.456.789-09`).
    ///
    /// # Errors
    ///
    /// Returns [`CardError::InvalidDocument`] if the input does not strip
    /// to exactly 11 digits.
    pub fn parse(input: &str) -> Result<Self, CardError> {
        let digits: String = input.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != 11 {
            return Err(CardError::InvalidDocument(digits.len()));
        }
        Ok(Self(digits))
    }

    /// The 11 digits, unpunctuated.
    #[must_use]
    pub fn as_digits(&self) -> &str {
        &self.0
    }

    /// Display form with standard CPF punctuation.
    #[must_use]
    pub fn formatted(&self) -> String {
        let d = &self.0;
        format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])
    }
}

/// A validated card expiry in `MM/YY` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Expiry {
    pub month: u8,
    pub year: u8,
}

impl Expiry {
    /// Parse an expiry from `MM/YY` (also accepts `MMYY`).
    ///
    /// # Errors
    ///
    /// Returns [`CardError::MalformedExpiry`] for anything that is not two
    /// digit pairs, and [`CardError::InvalidExpiryMonth`] for months
    /// outside 01-12.
    pub fn parse(input: &str) -> Result<Self, CardError> {
        let digits: String = input.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != 4 || input.chars().any(|c| !c.is_ascii_digit() && c != '/') {
            return Err(CardError::MalformedExpiry);
        }

        let month: u8 = digits[0..2].parse().map_err(|_| CardError::MalformedExpiry)?;
        let year: u8 = digits[2..4].parse().map_err(|_| CardError::MalformedExpiry)?;

        if !(1..=12).contains(&month) {
            return Err(CardError::InvalidExpiryMonth);
        }

        Ok(Self { month, year })
    }

    /// Whether the expiry lies before the given reference point
    /// (two-digit year). A card is valid through the end of its expiry
    /// month, so the current month itself is not past.
    #[must_use]
    pub const fn is_past(self, current_month: u8, current_year: u8) -> bool {
        self.year < current_year || (self.year == current_year && self.month < current_month)
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.year)
    }
}

/// A validated card number, stored as its digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardNumber(String);

impl CardNumber {
    /// Parse a card number, accepting spaces between digit groups.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::InvalidCardNumber`] if the input does not strip
    /// to 13-19 digits.
    pub fn parse(input: &str) -> Result<Self, CardError> {
        let digits: String = input.chars().filter(char::is_ascii_digit).collect();
        if !(13..=19).contains(&digits.len()) {
            return Err(CardError::InvalidCardNumber(digits.len()));
        }
        Ok(Self(digits))
    }

    /// Digits grouped in fours for display (`4111 1111 1111 1111`).
    #[must_use]
    pub fn grouped(&self) -> String {
        self.0
            .as_bytes()
            .chunks(4)
            .map(|chunk| core::str::from_utf8(chunk).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Masked form for submission payloads: all but the last four digits
    /// replaced (`**** **** **** 1111`).
    #[must_use]
    pub fn masked(&self) -> String {
        let len = self.0.len();
        let last_four = &self.0[len - 4..];
        let masked: String = core::iter::repeat_n('*', len - 4).collect();
        let full = format!("{masked}{last_four}");
        full.as_bytes()
            .chunks(4)
            .map(|chunk| core::str::from_utf8(chunk).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The last four digits.
    #[must_use]
    pub fn last_four(&self) -> &str {
        &self.0[self.0.len() - 4..]
    }
}

/// Validate a card security code (CVV): 3 or 4 digits.
///
/// # Errors
///
/// Returns [`CardError::InvalidSecurityCode`] otherwise.
pub fn validate_security_code(input: &str) -> Result<(), CardError> {
    let len = input.len();
    if (len == 3 || len == 4) && input.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(CardError::InvalidSecurityCode)
    }
}

/// Validate a holder name: non-empty after trimming.
///
/// # Errors
///
/// Returns [`CardError::EmptyHolderName`] otherwise.
pub fn validate_holder_name(input: &str) -> Result<(), CardError> {
    if input.trim().is_empty() {
        Err(CardError::EmptyHolderName)
    } else {
        Ok(())
    }
}
