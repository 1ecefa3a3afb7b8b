//! Core types for SMS verification operations.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// PhoneNumber
// =============================================================================

/// Error when parsing a destination phone number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneNumberError {
    /// Number is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// Number is missing the leading '+'.
    #[error("phone number must start with '+' followed by the country code")]
    MissingPlus,
    /// Number is not a valid E.164 number.
    #[error("phone number must be in E.164 format (e.g., +15551234567)")]
    NotE164,
}

static E164: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[1-9][0-9]{6,14}$").expect("valid regex"));

/// Destination phone number in E.164 format (e.g., "+15551234567").
///
/// Spaces, dashes, dots and parentheses are stripped before validation, so
/// `"+1 (555) 123-4567"` parses to `"+15551234567"`.
///
/// # Example
///
/// ```rust
/// use sms_otp::PhoneNumber;
///
/// let number = PhoneNumber::new("+1 555 123 4567").unwrap();
/// assert_eq!(number.as_str(), "+15551234567");
/// assert_eq!(number.masked(), "+15****4567");
///
/// assert!(PhoneNumber::new("5551234567").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse and normalize a phone number.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PhoneNumberError> {
        let normalized: String = raw
            .as_ref()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
            .collect();

        if normalized.is_empty() {
            return Err(PhoneNumberError::Empty);
        }
        if !normalized.starts_with('+') {
            return Err(PhoneNumberError::MissingPlus);
        }
        if !E164.is_match(&normalized) {
            return Err(PhoneNumberError::NotE164);
        }

        Ok(Self(normalized))
    }

    /// Get the number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number with the middle digits hidden, for logs.
    pub fn masked(&self) -> String {
        let n = &self.0;
        if n.len() >= 8 {
            format!("{}****{}", &n[..3], &n[n.len() - 4..])
        } else {
            "****".to_string()
        }
    }
}

impl FromStr for PhoneNumber {
    type Err = PhoneNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Display for PhoneNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for PhoneNumber {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        PhoneNumber::new(raw).map_err(de::Error::custom)
    }
}

impl Serialize for PhoneNumber {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.0)
    }
}

// =============================================================================
// VerificationCode (OTP)
// =============================================================================

/// One-time verification code sent to the recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Create a new VerificationCode.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters in the code.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the code is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if the code is non-empty and only contains ASCII digits.
    pub fn is_numeric(&self) -> bool {
        !self.0.is_empty() && self.0.chars().all(|c| c.is_ascii_digit())
    }
}

impl Display for VerificationCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for VerificationCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for VerificationCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl From<&str> for VerificationCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

// =============================================================================
// MessageId
// =============================================================================

/// Identifier the provider assigned to an accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Create a new MessageId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for MessageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// =============================================================================
// SmsType
// =============================================================================

/// Error when parsing an SMS classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown SMS type '{0}', expected 'Transactional' or 'Promotional'")]
pub struct SmsTypeError(pub String);

/// Message classification.
///
/// Transactional traffic (OTPs, alerts) gets delivery priority; promotional
/// traffic is cheaper but may be delayed or filtered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SmsType {
    #[default]
    Transactional,
    Promotional,
}

impl SmsType {
    /// Attribute value expected by the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transactional => "Transactional",
            Self::Promotional => "Promotional",
        }
    }
}

impl FromStr for SmsType {
    type Err = SmsTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transactional" => Ok(Self::Transactional),
            "promotional" => Ok(Self::Promotional),
            _ => Err(SmsTypeError(s.to_string())),
        }
    }
}

impl Display for SmsType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SmsType {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(de::Error::custom)
    }
}

impl Serialize for SmsType {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}
