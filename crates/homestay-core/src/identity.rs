//! # Identity Newtypes
//!
//! Human-facing identifiers and contact primitives. Generated codes
//! ([`BookingReference`], [`InvoiceNumber`]) take the current instant as a
//! parameter so that callers control time. Contact fields ([`EmailAddress`],
//! [`PhoneNumber`], [`DocumentUrl`]) validate at construction and on
//! deserialization, so a value of the type is always well formed.
//!
//! ## Formats
//!
//! - Booking reference: `HSB` + last 6 digits of epoch millis + 3 of `[A-Z0-9]`
//! - Invoice number: `INV` + `YYYYMM` + 4 digits

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

const REFERENCE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random bytes drawn from a v4 UUID.
fn random_bytes() -> [u8; 16] {
    *Uuid::new_v4().as_bytes()
}

// ---------------------------------------------------------------------------
// Generated codes
// ---------------------------------------------------------------------------

/// Booking reference shown to guests, e.g. `HSB482913K7Q`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingReference(String);

impl BookingReference {
    /// Prefix shared by every booking reference.
    pub const PREFIX: &'static str = "HSB";

    /// Generate a fresh reference for a booking made at `now`.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let millis = now.timestamp_millis().rem_euclid(1_000_000);
        let bytes = random_bytes();
        let suffix: String = bytes[..3]
            .iter()
            .map(|b| REFERENCE_ALPHABET[usize::from(*b) % REFERENCE_ALPHABET.len()] as char)
            .collect();
        Self(format!("{}{millis:06}{suffix}", Self::PREFIX))
    }

    /// Access the reference string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookingReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Invoice number printed on a payment receipt, e.g. `INV2024030417`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    /// Prefix shared by every invoice number.
    pub const PREFIX: &'static str = "INV";

    /// Generate a fresh invoice number for a payment recorded at `now`.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let bytes = random_bytes();
        let serial = u16::from_be_bytes([bytes[0], bytes[1]]) % 10_000;
        Self(format!(
            "{}{:04}{:02}{serial:04}",
            Self::PREFIX,
            now.year(),
            now.month()
        ))
    }

    /// Access the invoice number string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Contact primitives (validated at construction)
// ---------------------------------------------------------------------------

/// An email address that passed structural validation.
///
/// # Validation
///
/// - Exactly one `@`, with a non-empty local part
/// - Domain contains a `.` and no empty labels
/// - No whitespace anywhere
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and wrap an email address. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidEmail`] on malformed input.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let s = raw.trim();
        let invalid = || ValidationError::InvalidEmail(raw.clone());

        if s.chars().any(char::is_whitespace) {
            return Err(invalid());
        }
        let (local, domain) = s.split_once('@').ok_or_else(invalid)?;
        if local.is_empty() || domain.contains('@') || !domain.contains('.') {
            return Err(invalid());
        }
        if domain.split('.').any(str::is_empty) {
            return Err(invalid());
        }
        Ok(Self(s.to_string()))
    }

    /// Access the address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A phone number with at least 10 digits.
///
/// Digits, spaces, `+`, `-`, and parentheses are accepted; anything else is
/// rejected. The original formatting is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 10;

    /// Validate and wrap a phone number.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPhone`] when the number has stray
    /// characters or fewer than [`Self::MIN_DIGITS`] digits.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let s = raw.trim();
        let allowed = |c: char| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')');
        if !s.chars().all(allowed) {
            return Err(ValidationError::InvalidPhone(raw));
        }
        if s.chars().filter(char::is_ascii_digit).count() < Self::MIN_DIGITS {
            return Err(ValidationError::InvalidPhone(raw));
        }
        Ok(Self(s.to_string()))
    }

    /// Access the phone number as entered.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Only the digits, for substring search.
    pub fn digits(&self) -> String {
        self.0.chars().filter(char::is_ascii_digit).collect()
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Absolute `http://` or `https://` link to an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentUrl(String);

impl DocumentUrl {
    /// Validate and wrap a document URL.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidUrl`] unless the scheme is http(s)
    /// and a host follows it.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let s = raw.trim();
        let rest = s
            .strip_prefix("https://")
            .or_else(|| s.strip_prefix("http://"))
            .ok_or_else(|| ValidationError::InvalidUrl(raw.clone()))?;
        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        if host.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidUrl(raw));
        }
        Ok(Self(s.to_string()))
    }

    /// Access the URL string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DocumentUrl {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DocumentUrl> for String {
    fn from(value: DocumentUrl) -> Self {
        value.0
    }
}

impl std::fmt::Display for DocumentUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
