//! Service trait definition.

use crate::errors::RetryableError;
use crate::types::VerificationCode;
use std::error::Error as StdError;
use std::future::Future;

/// Trait for SMS verification service implementations.
///
/// Callers that only need "send a code to this number" can depend on this
/// trait and swap in a fake in their own tests.
pub trait SmsVerificationServiceTrait: Send + Sync {
    /// The error type for this service.
    type Error: StdError + RetryableError;

    /// Send a freshly generated verification code to `destination`.
    ///
    /// # Arguments
    ///
    /// * `destination` - E.164 phone number (e.g. `+15551234567`)
    ///
    /// # Returns
    ///
    /// The code that was delivered to the provider.
    fn send_verification_code(
        &self,
        destination: &str,
    ) -> impl Future<Output = Result<VerificationCode, Self::Error>> + Send;
}
