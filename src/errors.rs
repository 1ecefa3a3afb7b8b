//! Error classification shared by providers and the verification service.

/// Trait for errors that can be classified as transient or permanent.
///
/// This trait provides two levels of retryability classification:
///
/// 1. **Attempt-level** (`is_retryable`): Whether re-sending the same request
///    might succeed. Use this for transient errors like throttling or timeouts.
///
/// 2. **Operation-level** (`should_retry_operation`): Whether the caller could
///    start a fresh send later (new code, new request) with a chance of success.
///
/// # Examples
///
/// ```rust
/// use sms_otp::RetryableError;
///
/// enum MyError {
///     Throttled,        // Retry the same request
///     InvalidNumber,    // Never going to work for this destination
///     BadCredentials,   // Never going to work until reconfigured
/// }
///
/// impl RetryableError for MyError {
///     fn is_retryable(&self) -> bool {
///         matches!(self, MyError::Throttled)
///     }
/// }
///
/// assert!(MyError::Throttled.is_retryable());
/// assert!(!MyError::InvalidNumber.should_retry_operation());
/// ```
pub trait RetryableError {
    /// Returns true if this error represents a transient failure
    /// that might succeed when the same request is sent again.
    ///
    /// Examples: throttling, internal provider errors, network timeouts.
    fn is_retryable(&self) -> bool;

    /// Returns true if a fresh send operation might succeed later.
    ///
    /// Default implementation returns the same as `is_retryable()`.
    fn should_retry_operation(&self) -> bool {
        self.is_retryable()
    }
}

impl<E: RetryableError + ?Sized> RetryableError for Box<E> {
    fn is_retryable(&self) -> bool {
        (**self).is_retryable()
    }

    fn should_retry_operation(&self) -> bool {
        (**self).should_retry_operation()
    }
}
