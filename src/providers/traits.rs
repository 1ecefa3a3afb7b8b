//! Provider trait definition.

use crate::errors::RetryableError;
use crate::types::{MessageId, PhoneNumber, SmsType};
use std::error::Error as StdError;
use std::future::Future;

/// A single message submission, as handed to a provider.
///
/// One logical send builds exactly one request; every retry attempt
/// re-submits the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    /// Destination number.
    pub destination: PhoneNumber,
    /// Message body, with the verification code already embedded.
    pub message: String,
    /// Transactional or promotional classification.
    pub sms_type: SmsType,
    /// Sender label shown to the recipient where the carrier supports it.
    pub sender_id: Option<String>,
}

impl PublishRequest {
    pub fn new(destination: PhoneNumber, message: impl Into<String>) -> Self {
        Self {
            destination,
            message: message.into(),
            sms_type: SmsType::default(),
            sender_id: None,
        }
    }

    pub fn with_sms_type(mut self, sms_type: SmsType) -> Self {
        self.sms_type = sms_type;
        self
    }

    /// Set the sender label. Empty labels are ignored.
    pub fn with_sender_id(mut self, sender_id: Option<String>) -> Self {
        self.sender_id = sender_id.filter(|s| !s.is_empty());
        self
    }
}

/// Core trait that all SMS providers must implement.
///
/// # Type Parameters
///
/// - `Error`: The error type for this provider. Its [`RetryableError`]
///   classification decides whether the service may short-circuit retries.
///
/// # Example
///
/// ```rust,ignore
/// use sms_otp::{MessageId, Provider, PublishRequest};
///
/// struct MyProvider { /* ... */ }
///
/// impl Provider for MyProvider {
///     type Error = MyError;
///
///     async fn validate_credentials(&self) -> Result<(), Self::Error> {
///         // Make a cheap authenticated call
///     }
///
///     async fn publish(&self, request: &PublishRequest) -> Result<MessageId, Self::Error> {
///         // Submit the message
///     }
/// }
/// ```
pub trait Provider: Send + Sync {
    /// Error type returned by provider operations.
    type Error: StdError + RetryableError + Send + Sync + 'static;

    /// Human-readable provider name, used in errors and logs.
    fn name(&self) -> &'static str {
        "sms-provider"
    }

    /// Check the configured credentials against the provider.
    ///
    /// Called once when the verification service is constructed.
    fn validate_credentials(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Submit a message and return the provider-assigned message id.
    fn publish(
        &self,
        request: &PublishRequest,
    ) -> impl Future<Output = Result<MessageId, Self::Error>> + Send;
}
