//! Service-level error types.

use crate::errors::RetryableError;
use crate::types::{PhoneNumber, PhoneNumberError};
use std::error::Error as StdError;
use thiserror::Error;

/// Boxed provider error carried by service errors.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Every attempt (initial plus retries) failed.
pub const SEND_MAX_RETRIES_EXCEEDED: &str = "SEND_MAX_RETRIES_EXCEEDED";
/// The provider reported an error classified as permanent.
pub const SEND_PERMANENT_FAILURE: &str = "SEND_PERMANENT_FAILURE";
/// The caller cancelled the send.
pub const SEND_CANCELLED: &str = "SEND_CANCELLED";
/// The caller's deadline passed before the send completed.
pub const SEND_DEADLINE_EXCEEDED: &str = "SEND_DEADLINE_EXCEEDED";
/// The destination is not an E.164 number.
pub const SEND_INVALID_DESTINATION: &str = "SEND_INVALID_DESTINATION";
/// The provider rejected the credentials.
pub const AUTH_INVALID_CREDENTIALS: &str = "AUTH_INVALID_CREDENTIALS";
/// No code generator was available when building the service.
pub const CODE_GENERATOR_MISSING: &str = "CODE_GENERATOR_MISSING";

/// Service-level errors that wrap provider errors.
#[derive(Debug, Error)]
pub enum SmsServiceError {
    /// The provider rejected the credentials during construction.
    #[error("{provider} rejected the supplied credentials: {source}")]
    Auth {
        provider: &'static str,
        #[source]
        source: BoxError,
    },

    /// No code generator configured.
    #[error("No verification code generator configured")]
    MissingCodeGenerator,

    /// Destination is not a valid E.164 number. No attempt was made.
    #[error("Invalid destination number '{destination}': {source}")]
    InvalidDestination {
        destination: String,
        #[source]
        source: PhoneNumberError,
    },

    /// All attempts failed.
    #[error("SMS error [SEND_MAX_RETRIES_EXCEEDED] for {destination} after {attempts} attempt(s): {source}")]
    SendExhausted {
        /// Destination of the failed send.
        destination: PhoneNumber,
        /// Attempts made (initial plus retries).
        attempts: u32,
        /// Error from the final attempt.
        #[source]
        source: BoxError,
    },

    /// The provider reported a permanent error and retries were short-circuited.
    #[error("SMS error [SEND_PERMANENT_FAILURE] for {destination} after {attempts} attempt(s): {source}")]
    PermanentFailure {
        destination: PhoneNumber,
        attempts: u32,
        #[source]
        source: BoxError,
    },

    /// Cancellation was requested.
    #[error("SMS error [SEND_CANCELLED] for {destination} after {attempts} attempt(s)")]
    Cancelled {
        destination: PhoneNumber,
        attempts: u32,
        /// Error from the last attempt, if any attempt was made.
        #[source]
        last_error: Option<BoxError>,
    },

    /// The deadline passed, or the next retry delay would overrun it.
    #[error("SMS error [SEND_DEADLINE_EXCEEDED] for {destination} after {attempts} attempt(s)")]
    DeadlineExceeded {
        destination: PhoneNumber,
        attempts: u32,
        #[source]
        last_error: Option<BoxError>,
    },
}

impl SmsServiceError {
    /// Stable classification code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Auth { .. } => AUTH_INVALID_CREDENTIALS,
            Self::MissingCodeGenerator => CODE_GENERATOR_MISSING,
            Self::InvalidDestination { .. } => SEND_INVALID_DESTINATION,
            Self::SendExhausted { .. } => SEND_MAX_RETRIES_EXCEEDED,
            Self::PermanentFailure { .. } => SEND_PERMANENT_FAILURE,
            Self::Cancelled { .. } => SEND_CANCELLED,
            Self::DeadlineExceeded { .. } => SEND_DEADLINE_EXCEEDED,
        }
    }

    /// Destination of the failed send, when one was parsed.
    pub fn destination(&self) -> Option<&PhoneNumber> {
        match self {
            Self::SendExhausted { destination, .. }
            | Self::PermanentFailure { destination, .. }
            | Self::Cancelled { destination, .. }
            | Self::DeadlineExceeded { destination, .. } => Some(destination),
            Self::Auth { .. } | Self::MissingCodeGenerator | Self::InvalidDestination { .. } => {
                None
            }
        }
    }

    /// Attempts made before the error surfaced.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::SendExhausted { attempts, .. }
            | Self::PermanentFailure { attempts, .. }
            | Self::Cancelled { attempts, .. }
            | Self::DeadlineExceeded { attempts, .. } => *attempts,
            Self::Auth { .. } | Self::MissingCodeGenerator | Self::InvalidDestination { .. } => 0,
        }
    }
}

impl RetryableError for SmsServiceError {
    fn is_retryable(&self) -> bool {
        // Retries were already exhausted locally.
        false
    }

    fn should_retry_operation(&self) -> bool {
        match self {
            SmsServiceError::SendExhausted { .. } => true,
            SmsServiceError::DeadlineExceeded { .. } => true,
            SmsServiceError::Auth { .. }
            | SmsServiceError::MissingCodeGenerator
            | SmsServiceError::InvalidDestination { .. }
            | SmsServiceError::PermanentFailure { .. }
            | SmsServiceError::Cancelled { .. } => false,
        }
    }
}
