//! Main service implementation.

use super::config::{SmsServiceConfig, SmsServiceConfigBuilder};
use super::error::SmsServiceError;
use super::options::{Interruption, SendOptions};
use super::traits::SmsVerificationServiceTrait;
use crate::errors::RetryableError;
use crate::generator::CodeGenerator;
use crate::providers::traits::{Provider, PublishRequest};
use crate::types::{MessageId, PhoneNumber, SmsType, VerificationCode};
use backon::BackoffBuilder;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::{debug, error, info, warn};

/// Callback invoked before each retry delay that will actually be slept.
///
/// Receives the error from the failed attempt, the 1-based number of that
/// attempt, and the delay before the next one.
pub type OnRetryCallback<E> = Arc<dyn Fn(&E, u32, Duration) + Send + Sync>;

/// Result of a successful provider dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReceipt {
    /// Identifier the provider assigned to the message.
    pub message_id: MessageId,
    /// Attempts it took, including the successful one.
    pub attempts: u32,
}

/// Result of a successful verification send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReceipt {
    pub destination: PhoneNumber,
    pub code: VerificationCode,
    pub message_id: MessageId,
    pub attempts: u32,
}

/// Verification code sender over any [`Provider`].
///
/// The only way to obtain a service is [`SmsVerificationService::connect`]
/// (or the builder's `connect`), which checks the provider credentials once.
///
/// # Example
///
/// ```rust,ignore
/// use sms_otp::{SmsServiceConfig, SmsVerificationService, SmsVerificationServiceTrait};
/// use sms_otp::sns::{AuthCredentials, SnsClient, SnsProvider};
///
/// let client = SnsClient::new(AuthCredentials::new("AKIA...", "secret", "eu-west-2")).await?;
/// let service = SmsVerificationService::connect(SnsProvider::new(client), SmsServiceConfig::default()).await?;
///
/// let code = service.send_verification_code("+447770428172").await?;
/// println!("Sent {}", code);
/// ```
pub struct SmsVerificationService<P: Provider> {
    provider: P,
    config: SmsServiceConfig,
    generator: Arc<dyn CodeGenerator>,
    on_retry: Option<OnRetryCallback<P::Error>>,
}

impl<P: Provider + Debug> Debug for SmsVerificationService<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsVerificationService")
            .field("provider", &self.provider)
            .field("config", &self.config)
            .field("on_retry", &self.on_retry.as_ref().map(|_| "..."))
            .finish()
    }
}

impl<P: Provider> SmsVerificationService<P> {
    /// Validate the provider credentials and create a service with the
    /// default code generator.
    pub async fn connect(provider: P, config: SmsServiceConfig) -> Result<Self, SmsServiceError> {
        Self::builder(provider).config(config).connect().await
    }

    /// Create a new builder for SmsVerificationService.
    pub fn builder(provider: P) -> SmsVerificationServiceBuilder<P> {
        SmsVerificationServiceBuilder::new(provider)
    }

    /// Get reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Get reference to the service configuration.
    pub fn config(&self) -> &SmsServiceConfig {
        &self.config
    }

    /// Build the provider request for one logical send.
    pub fn build_request(&self, destination: PhoneNumber, code: &VerificationCode) -> PublishRequest {
        PublishRequest::new(destination, self.config.render_message(code))
            .with_sms_type(self.config.sms_type)
            .with_sender_id(self.config.sender_id.clone())
    }

    /// Send a verification code with cancellation/deadline controls.
    ///
    /// Returns the full receipt (code, message id, attempts).
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "sms_otp.send_verification_code", skip_all)
    )]
    pub async fn send_verification_code_with(
        &self,
        destination: &str,
        options: &SendOptions,
    ) -> Result<VerificationReceipt, SmsServiceError> {
        let destination =
            PhoneNumber::new(destination).map_err(|source| SmsServiceError::InvalidDestination {
                destination: destination.to_string(),
                source,
            })?;

        let code = self.generator.generate();
        let request = self.build_request(destination, &code);
        let receipt = self.dispatch_with_retry(&request, options).await?;

        Ok(VerificationReceipt {
            destination: request.destination,
            code,
            message_id: receipt.message_id,
            attempts: receipt.attempts,
        })
    }

    /// Submit `request`, retrying failures with a constant delay.
    ///
    /// Makes at most `max_retries + 1` attempts, each with the identical
    /// request. Cancellation and the deadline in `options` are checked before
    /// every attempt and before every delay.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sms_otp.dispatch_with_retry",
            skip_all,
            fields(
                provider = self.provider.name(),
                destination = %request.destination.masked(),
                max_attempts = self.config.max_attempts()
            )
        )
    )]
    pub async fn dispatch_with_retry(
        &self,
        request: &PublishRequest,
        options: &SendOptions,
    ) -> Result<DispatchReceipt, SmsServiceError> {
        let mut delays = self.config.backoff().build();
        let mut attempts: u32 = 0;
        let mut last_error: Option<P::Error> = None;

        loop {
            if let Some(interruption) = options.interruption(Duration::ZERO) {
                return Err(self.interrupted(interruption, request, attempts, last_error));
            }

            attempts += 1;

            #[cfg(feature = "tracing")]
            debug!(attempt = attempts, "Publishing verification SMS");

            let err = match self.provider.publish(request).await {
                Ok(message_id) => {
                    #[cfg(feature = "tracing")]
                    info!(
                        message_id = %message_id,
                        attempts,
                        "Verification SMS accepted"
                    );

                    return Ok(DispatchReceipt {
                        message_id,
                        attempts,
                    });
                }
                Err(err) => err,
            };

            if self.config.stop_on_permanent_error && !err.is_retryable() {
                #[cfg(feature = "tracing")]
                error!(error = %err, attempts, "Permanent provider error, not retrying");

                return Err(SmsServiceError::PermanentFailure {
                    destination: request.destination.clone(),
                    attempts,
                    source: Box::new(err),
                });
            }

            let Some(delay) = delays.next() else {
                #[cfg(feature = "tracing")]
                error!(error = %err, attempts, "Retries exhausted");

                return Err(SmsServiceError::SendExhausted {
                    destination: request.destination.clone(),
                    attempts,
                    source: Box::new(err),
                });
            };

            if let Some(interruption) = options.interruption(delay) {
                return Err(self.interrupted(interruption, request, attempts, Some(err)));
            }

            #[cfg(feature = "tracing")]
            warn!(
                error = %err,
                attempt = attempts,
                retry_after_secs = %delay.as_secs_f64(),
                "Send failed, retrying"
            );

            if let Some(callback) = &self.on_retry {
                callback(&err, attempts, delay);
            }
            last_error = Some(err);

            if let Err(interruption) = options.sleep(delay).await {
                return Err(self.interrupted(interruption, request, attempts, last_error));
            }
        }
    }

    fn interrupted(
        &self,
        interruption: Interruption,
        request: &PublishRequest,
        attempts: u32,
        last_error: Option<P::Error>,
    ) -> SmsServiceError {
        let destination = request.destination.clone();
        let last_error = last_error.map(|e| Box::new(e) as super::error::BoxError);

        #[cfg(feature = "tracing")]
        warn!(attempts, reason = ?interruption, "Send interrupted");

        match interruption {
            Interruption::Cancelled => SmsServiceError::Cancelled {
                destination,
                attempts,
                last_error,
            },
            Interruption::DeadlineExceeded => SmsServiceError::DeadlineExceeded {
                destination,
                attempts,
                last_error,
            },
        }
    }
}

impl<P: Provider> SmsVerificationServiceTrait for SmsVerificationService<P> {
    type Error = SmsServiceError;

    async fn send_verification_code(
        &self,
        destination: &str,
    ) -> Result<VerificationCode, Self::Error> {
        let receipt = self
            .send_verification_code_with(destination, &SendOptions::default())
            .await?;
        Ok(receipt.code)
    }
}

#[cfg(feature = "random")]
fn default_generator() -> Option<Arc<dyn CodeGenerator>> {
    Some(Arc::new(crate::generator::RandomDigits::default()))
}

#[cfg(not(feature = "random"))]
fn default_generator() -> Option<Arc<dyn CodeGenerator>> {
    None
}

/// Builder for SmsVerificationService.
///
/// # Example
///
/// ```rust,ignore
/// use sms_otp::{FixedCode, SmsVerificationService};
/// use std::time::Duration;
///
/// let service = SmsVerificationService::builder(provider)
///     .sender_id("OTPService")
///     .max_retries(3)
///     .retry_delay(Duration::from_secs(2))
///     .generator(FixedCode::new("12345"))
///     .on_retry(|err, attempt, delay| eprintln!("attempt {attempt} failed: {err}; next in {delay:?}"))
///     .connect()
///     .await?;
/// ```
pub struct SmsVerificationServiceBuilder<P: Provider> {
    provider: P,
    config_builder: SmsServiceConfigBuilder,
    generator: Option<Arc<dyn CodeGenerator>>,
    on_retry: Option<OnRetryCallback<P::Error>>,
}

impl<P: Provider> SmsVerificationServiceBuilder<P> {
    /// Create a new builder with the given provider.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config_builder: SmsServiceConfigBuilder::default(),
            generator: None,
            on_retry: None,
        }
    }

    /// Set the sender label.
    pub fn sender_id(mut self, sender_id: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.sender_id(sender_id);
        self
    }

    /// Set the message classification.
    pub fn sms_type(mut self, sms_type: SmsType) -> Self {
        self.config_builder = self.config_builder.sms_type(sms_type);
        self
    }

    /// Set the number of retries after the first failed attempt.
    ///
    /// Default: 3
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config_builder = self.config_builder.max_retries(max_retries);
        self
    }

    /// Set the constant delay between attempts.
    ///
    /// Default: 2 seconds
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config_builder = self.config_builder.retry_delay(delay);
        self
    }

    /// Stop retrying on errors the provider classifies as permanent.
    pub fn stop_on_permanent_error(mut self, stop: bool) -> Self {
        self.config_builder = self.config_builder.stop_on_permanent_error(stop);
        self
    }

    /// Set the message body template.
    pub fn message_template(mut self, template: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.message_template(template);
        self
    }

    /// Set the full configuration.
    pub fn config(mut self, config: SmsServiceConfig) -> Self {
        self.config_builder = SmsServiceConfigBuilder::from(config);
        self
    }

    /// Set the code generator.
    ///
    /// Default: six random digits (feature `random`).
    pub fn generator(mut self, generator: impl CodeGenerator + 'static) -> Self {
        self.generator = Some(Arc::new(generator));
        self
    }

    /// Set a callback to be invoked on each retry.
    pub fn on_retry<F>(mut self, callback: F) -> Self
    where
        F: Fn(&P::Error, u32, Duration) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(callback));
        self
    }

    /// Validate the provider credentials and build the service.
    ///
    /// Any failure of the credential check is reported as
    /// [`SmsServiceError::Auth`]; no service is returned.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sms_otp.connect",
            skip_all,
            fields(provider = self.provider.name())
        )
    )]
    pub async fn connect(self) -> Result<SmsVerificationService<P>, SmsServiceError> {
        let generator = self
            .generator
            .or_else(default_generator)
            .ok_or(SmsServiceError::MissingCodeGenerator)?;

        if let Err(err) = self.provider.validate_credentials().await {
            #[cfg(feature = "tracing")]
            error!(error = %err, "Credential validation failed");

            return Err(SmsServiceError::Auth {
                provider: self.provider.name(),
                source: Box::new(err),
            });
        }

        let config = self.config_builder.build();

        #[cfg(feature = "tracing")]
        info!(
            sms_type = %config.sms_type,
            max_retries = config.max_retries,
            retry_delay_ms = config.retry_delay.as_millis() as u64,
            "SMS verification service ready"
        );

        Ok(SmsVerificationService {
            provider: self.provider,
            config,
            generator,
            on_retry: self.on_retry,
        })
    }
}
