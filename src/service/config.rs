//! Service configuration types.

use crate::types::{SmsType, VerificationCode};
use backon::ConstantBuilder;
use std::time::Duration;

/// Placeholder replaced by the verification code in message templates.
pub const CODE_PLACEHOLDER: &str = "{code}";

/// Default message body template.
pub const DEFAULT_MESSAGE_TEMPLATE: &str = "Your verification code: {code}";

/// Messaging policy for the verification service.
///
/// Applied unchanged to every send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsServiceConfig {
    /// Sender label shown to the recipient, where the carrier supports it.
    pub sender_id: Option<String>,
    /// Transactional or promotional classification.
    pub sms_type: SmsType,
    /// Retries after the first failed attempt.
    pub max_retries: u32,
    /// Constant delay between attempts.
    pub retry_delay: Duration,
    /// Stop retrying as soon as the provider reports a permanent error.
    pub stop_on_permanent_error: bool,
    /// Message body template; `{code}` is replaced by the code.
    pub message_template: String,
}

impl Default for SmsServiceConfig {
    fn default() -> Self {
        Self {
            sender_id: None,
            sms_type: SmsType::Transactional,
            max_retries: 3,
            retry_delay: Duration::from_secs(2),
            stop_on_permanent_error: false,
            message_template: DEFAULT_MESSAGE_TEMPLATE.to_string(),
        }
    }
}

impl SmsServiceConfig {
    /// Create a new builder for SmsServiceConfig.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sms_otp::SmsServiceConfig;
    /// use std::time::Duration;
    ///
    /// let config = SmsServiceConfig::builder()
    ///     .sender_id("OTPService")
    ///     .max_retries(5)
    ///     .retry_delay(Duration::from_millis(500))
    ///     .build();
    ///
    /// assert_eq!(config.max_retries, 5);
    /// assert_eq!(config.max_attempts(), 6);
    /// ```
    pub fn builder() -> SmsServiceConfigBuilder {
        SmsServiceConfigBuilder::default()
    }

    /// Create a new config with a custom retry limit.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Create a new config with a custom retry delay.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Create a new config with a sender label.
    pub fn with_sender_id(mut self, sender_id: impl Into<String>) -> Self {
        self.sender_id = Some(sender_id.into());
        self
    }

    /// Total attempts allowed for one send (initial attempt plus retries).
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Render the message body for a code.
    ///
    /// A template without a placeholder gets the code appended.
    pub fn render_message(&self, code: &VerificationCode) -> String {
        if self.message_template.contains(CODE_PLACEHOLDER) {
            self.message_template
                .replace(CODE_PLACEHOLDER, code.as_str())
        } else {
            format!("{} {}", self.message_template.trim_end(), code)
        }
    }

    /// Constant delay schedule yielding one delay per permitted retry.
    pub fn backoff(&self) -> ConstantBuilder {
        ConstantBuilder::default()
            .with_delay(self.retry_delay)
            .with_max_times(self.max_retries as usize)
    }
}

/// Builder for SmsServiceConfig.
#[derive(Debug, Clone)]
pub struct SmsServiceConfigBuilder {
    pub(crate) sender_id: Option<String>,
    pub(crate) sms_type: SmsType,
    pub(crate) max_retries: u32,
    pub(crate) retry_delay: Duration,
    pub(crate) stop_on_permanent_error: bool,
    pub(crate) message_template: String,
}

impl Default for SmsServiceConfigBuilder {
    fn default() -> Self {
        SmsServiceConfig::default().into()
    }
}

impl From<SmsServiceConfig> for SmsServiceConfigBuilder {
    fn from(config: SmsServiceConfig) -> Self {
        Self {
            sender_id: config.sender_id,
            sms_type: config.sms_type,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
            stop_on_permanent_error: config.stop_on_permanent_error,
            message_template: config.message_template,
        }
    }
}

impl SmsServiceConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sender label.
    pub fn sender_id(mut self, sender_id: impl Into<String>) -> Self {
        self.sender_id = Some(sender_id.into());
        self
    }

    /// Set the message classification.
    ///
    /// Default: Transactional
    pub fn sms_type(mut self, sms_type: SmsType) -> Self {
        self.sms_type = sms_type;
        self
    }

    /// Set the number of retries after the first failed attempt.
    ///
    /// Default: 3
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the constant delay between attempts.
    ///
    /// Default: 2 seconds
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Stop retrying on errors the provider classifies as permanent.
    ///
    /// Default: false (every error is retried)
    pub fn stop_on_permanent_error(mut self, stop: bool) -> Self {
        self.stop_on_permanent_error = stop;
        self
    }

    /// Set the message body template.
    pub fn message_template(mut self, template: impl Into<String>) -> Self {
        self.message_template = template.into();
        self
    }

    /// Build the SmsServiceConfig.
    pub fn build(self) -> SmsServiceConfig {
        SmsServiceConfig {
            sender_id: self.sender_id.filter(|s| !s.is_empty()),
            sms_type: self.sms_type,
            max_retries: self.max_retries,
            retry_delay: self.retry_delay,
            stop_on_permanent_error: self.stop_on_permanent_error,
            message_template: self.message_template,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backon::BackoffBuilder;

    #[test]
    fn test_service_config_default() {
        let config = SmsServiceConfig::default();
        assert_eq!(config.sender_id, None);
        assert_eq!(config.sms_type, SmsType::Transactional);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay, Duration::from_secs(2));
        assert!(!config.stop_on_permanent_error);
        assert_eq!(config.message_template, DEFAULT_MESSAGE_TEMPLATE);
    }

    #[test]
    fn test_config_builder() {
        let config = SmsServiceConfig::builder()
            .sender_id("OTPService")
            .sms_type(SmsType::Promotional)
            .max_retries(1)
            .retry_delay(Duration::from_millis(250))
            .stop_on_permanent_error(true)
            .message_template("Code {code}")
            .build();

        assert_eq!(config.sender_id.as_deref(), Some("OTPService"));
        assert_eq!(config.sms_type, SmsType::Promotional);
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.retry_delay, Duration::from_millis(250));
        assert!(config.stop_on_permanent_error);
        assert_eq!(config.message_template, "Code {code}");
    }

    #[test]
    fn test_builder_from_config_round_trips() {
        let config = SmsServiceConfig::default()
            .with_max_retries(7)
            .with_retry_delay(Duration::from_secs(1))
            .with_sender_id("Acme");
        let rebuilt = SmsServiceConfigBuilder::from(config.clone()).build();
        assert_eq!(rebuilt, config);
    }

    #[test]
    fn test_empty_sender_id_is_dropped() {
        let config = SmsServiceConfig::builder().sender_id("").build();
        assert_eq!(config.sender_id, None);
    }

    #[test]
    fn test_render_message() {
        let config = SmsServiceConfig::default();
        let code = VerificationCode::from("123456");
        assert_eq!(
            config.render_message(&code),
            "Your verification code: 123456"
        );

        let config = SmsServiceConfig::builder()
            .message_template("Use {code} to sign in. {code} expires soon.")
            .build();
        assert_eq!(
            config.render_message(&code),
            "Use 123456 to sign in. 123456 expires soon."
        );

        let config = SmsServiceConfig::builder()
            .message_template("Your code is ")
            .build();
        assert_eq!(config.render_message(&code), "Your code is 123456");
    }

    #[test]
    fn test_backoff_is_constant_and_bounded() {
        let config = SmsServiceConfig::builder()
            .max_retries(3)
            .retry_delay(Duration::from_millis(1500))
            .build();

        let delays: Vec<Duration> = config.backoff().build().collect();
        assert_eq!(delays, vec![Duration::from_millis(1500); 3]);
    }

    #[test]
    fn test_backoff_without_retries_is_empty() {
        let config = SmsServiceConfig::default().with_max_retries(0);
        assert_eq!(config.backoff().build().count(), 0);
        assert_eq!(config.max_attempts(), 1);
    }
}
