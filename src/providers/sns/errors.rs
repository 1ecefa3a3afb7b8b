//! Error types for the AWS SNS provider.

use crate::errors::RetryableError;
use aws_sdk_sns::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use thiserror::Error;

#[cfg(feature = "tracing")]
use tracing::warn;

/// Error codes returned by the SNS API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnsErrorCode {
    // === Transient / Server Errors (Retryable) ===
    /// Request rate exceeded for the account.
    Throttled,
    /// Generic AWS throttling.
    Throttling,
    /// KMS request throttled (encrypted topics).
    KmsThrottling,
    /// Internal error on the SNS side.
    InternalError,
    /// Internal failure on the AWS side.
    InternalFailure,
    /// Service temporarily unavailable.
    ServiceUnavailable,
    /// Request timed out on the service side.
    RequestTimeout,

    // === Fatal / Client Errors (Non-retryable) ===
    /// Invalid request parameter (malformed destination, bad attribute).
    InvalidParameter,
    /// Invalid value for a request parameter.
    ParameterValueInvalid,
    /// Caller is not authorized for the action.
    AuthorizationError,
    /// Access key does not exist.
    InvalidClientTokenId,
    /// Secret key does not match the access key.
    SignatureDoesNotMatch,
    /// Requested resource does not exist.
    NotFound,
    /// Endpoint disabled.
    EndpointDisabled,
    /// Request failed input validation.
    ValidationError,

    /// Unknown error code from the service.
    Unknown { raw: String },
}

impl SnsErrorCode {
    /// Returns the API error code string representation.
    pub fn code_name(&self) -> &str {
        match self {
            Self::Throttled => "Throttled",
            Self::Throttling => "Throttling",
            Self::KmsThrottling => "KMSThrottling",
            Self::InternalError => "InternalError",
            Self::InternalFailure => "InternalFailure",
            Self::ServiceUnavailable => "ServiceUnavailable",
            Self::RequestTimeout => "RequestTimeout",
            Self::InvalidParameter => "InvalidParameter",
            Self::ParameterValueInvalid => "ParameterValueInvalid",
            Self::AuthorizationError => "AuthorizationError",
            Self::InvalidClientTokenId => "InvalidClientTokenId",
            Self::SignatureDoesNotMatch => "SignatureDoesNotMatch",
            Self::NotFound => "NotFound",
            Self::EndpointDisabled => "EndpointDisabled",
            Self::ValidationError => "ValidationError",
            Self::Unknown { raw } => raw.as_str(),
        }
    }

    /// Parse an error code as reported in the SNS error response.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            "Throttled" => Self::Throttled,
            "Throttling" => Self::Throttling,
            "KMSThrottling" => Self::KmsThrottling,
            "InternalError" => Self::InternalError,
            "InternalFailure" => Self::InternalFailure,
            "ServiceUnavailable" => Self::ServiceUnavailable,
            "RequestTimeout" => Self::RequestTimeout,
            "InvalidParameter" => Self::InvalidParameter,
            "ParameterValueInvalid" => Self::ParameterValueInvalid,
            "AuthorizationError" => Self::AuthorizationError,
            "InvalidClientTokenId" => Self::InvalidClientTokenId,
            "SignatureDoesNotMatch" => Self::SignatureDoesNotMatch,
            "NotFound" => Self::NotFound,
            "EndpointDisabled" => Self::EndpointDisabled,
            "ValidationError" => Self::ValidationError,
            other => Self::Unknown {
                raw: other.to_string(),
            },
        }
    }

    /// Returns true if re-sending the same request might succeed.
    ///
    /// Unknown codes are treated as transient.
    pub fn is_retryable(&self) -> bool {
        !self.is_permanent()
    }

    /// Returns true if the request can never succeed as sent.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter
                | Self::ParameterValueInvalid
                | Self::AuthorizationError
                | Self::InvalidClientTokenId
                | Self::SignatureDoesNotMatch
                | Self::NotFound
                | Self::EndpointDisabled
                | Self::ValidationError
        )
    }

    /// Returns true if the code points at rejected credentials.
    ///
    /// `AuthorizationError` is not one: the request was authenticated but the
    /// caller lacks permission for that action.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::InvalidClientTokenId | Self::SignatureDoesNotMatch)
    }
}

impl Display for SnsErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code_name())
    }
}

/// Error returned by the SNS service.
#[derive(Debug, Clone, Error)]
#[error("SNS service error: code={code}, message={message}")]
pub struct SnsServiceError {
    /// Error code from the service.
    pub code: SnsErrorCode,
    /// Message from the service.
    pub message: String,
}

impl SnsServiceError {
    pub fn new(code: SnsErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Main error type for SNS client operations.
#[derive(Debug, Error)]
pub enum SnsError {
    /// A credential field is empty.
    #[error("Missing AWS credential field: {field}")]
    MissingCredentials { field: &'static str },

    /// Failed to build a message attribute.
    #[error("Failed to build SNS message attribute {name}: {message}")]
    InvalidAttribute { name: &'static str, message: String },

    /// SNS rejected the request.
    #[error("{0}")]
    Service(#[source] SnsServiceError),

    /// The request never got a response (network failure, timeout).
    #[error("Failed to dispatch request to SNS: {message}")]
    Dispatch { message: String },

    /// The SDK could not build the request.
    #[error("Failed to construct SNS request: {message}")]
    Construction { message: String },

    /// SNS accepted the message without returning an id.
    #[error("SNS accepted the message but returned no message id")]
    MissingMessageId,
}

pub type Result<T> = std::result::Result<T, SnsError>;

impl SnsError {
    /// Convert an SDK error, keeping the service error code when present.
    pub(crate) fn from_sdk<E, R>(err: SdkError<E, R>) -> Self
    where
        E: ProvideErrorMetadata + StdError + Send + Sync + 'static,
        R: Debug,
    {
        if let Some(service_err) = err.as_service_error() {
            let code = SnsErrorCode::from_raw(service_err.code().unwrap_or("Unknown"));
            let error = SnsServiceError::new(code, service_err.message().unwrap_or_default());

            #[cfg(feature = "tracing")]
            warn!(
                code = %error.code,
                message = %error.message,
                "SNS service returned error"
            );

            return Self::Service(error);
        }

        let message = DisplayErrorContext(&err).to_string();
        match err {
            SdkError::ConstructionFailure(_) => Self::Construction { message },
            _ => Self::Dispatch { message },
        }
    }

    /// Service error code, if SNS answered with one.
    pub fn service_code(&self) -> Option<&SnsErrorCode> {
        match self {
            Self::Service(error) => Some(&error.code),
            _ => None,
        }
    }
}

impl RetryableError for SnsError {
    fn is_retryable(&self) -> bool {
        match self {
            // Service errors have their own logic
            SnsError::Service(error) => error.code.is_retryable(),
            // Network failures and timeouts
            SnsError::Dispatch { .. } => true,
            // Malformed response; treated like a dropped reply
            SnsError::MissingMessageId => true,
            SnsError::MissingCredentials { .. }
            | SnsError::InvalidAttribute { .. }
            | SnsError::Construction { .. } => false,
        }
    }

    fn should_retry_operation(&self) -> bool {
        match self {
            SnsError::Service(error) => !error.code.is_auth_failure() && error.code.is_retryable(),
            SnsError::Dispatch { .. } | SnsError::MissingMessageId => true,
            SnsError::MissingCredentials { .. }
            | SnsError::InvalidAttribute { .. }
            | SnsError::Construction { .. } => false,
        }
    }
}
