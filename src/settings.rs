//! Configuration file loading.
//!
//! Settings come from a `config.{yaml,yml,toml,json}` file in the working
//! directory (or an explicit path), overridden by `SMS_OTP__*` environment
//! variables, e.g. `SMS_OTP__AWS__REGION=eu-west-2` or
//! `SMS_OTP__SMS__MAX_RETRIES=5`.
//!
//! ```yaml
//! aws:
//!   access_key_id: AKIA...
//!   secret_access_key: ...
//!   region: eu-west-2
//! sms:
//!   sender_id: OTPService
//!   sms_type: Transactional
//!   max_retries: 3
//!   retry_delay_ms: 2000
//! recipient: "+447770428172"
//! ```

use crate::service::{CODE_PLACEHOLDER, DEFAULT_MESSAGE_TEMPLATE, SmsServiceConfig};
use crate::types::{PhoneNumber, SmsType};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[cfg(feature = "tracing")]
use tracing::debug;

/// Base name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_NAME: &str = "config";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "SMS_OTP";

const MIN_CODE_LENGTH: usize = 4;
const MAX_CODE_LENGTH: usize = 10;
const MAX_SENDER_ID_LENGTH: usize = 11;

/// Errors raised while loading settings. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The source could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A value was read but is not acceptable.
    #[error("Invalid configuration value for '{field}': {message}")]
    Invalid { field: &'static str, message: String },
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// AWS connection settings.
#[derive(Clone, Deserialize)]
pub struct AwsSettings {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    /// Custom SNS endpoint (LocalStack and similar).
    #[serde(default)]
    pub endpoint_url: Option<Url>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl std::fmt::Debug for AwsSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsSettings")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Messaging policy settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmsSettings {
    pub sender_id: Option<String>,
    pub sms_type: SmsType,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub stop_on_permanent_error: bool,
    pub code_length: usize,
    pub message_template: String,
}

impl Default for SmsSettings {
    fn default() -> Self {
        Self {
            sender_id: None,
            sms_type: SmsType::Transactional,
            max_retries: 3,
            retry_delay_ms: 2000,
            stop_on_permanent_error: false,
            code_length: 6,
            message_template: DEFAULT_MESSAGE_TEMPLATE.to_string(),
        }
    }
}

/// Complete application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub aws: AwsSettings,
    #[serde(default)]
    pub sms: SmsSettings,
    /// Destination number for a single CLI run.
    #[serde(default)]
    pub recipient: Option<String>,
}

impl Settings {
    /// Load `config.*` from the working directory plus environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(Config::builder().add_source(File::with_name(DEFAULT_CONFIG_NAME)))
    }

    /// Load an explicit file plus environment overrides.
    ///
    /// The format is taken from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_builder(Config::builder().add_source(File::from(path.as_ref())))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;

        #[cfg(feature = "tracing")]
        debug!(
            region = %settings.aws.region,
            sms_type = %settings.sms.sms_type,
            max_retries = settings.sms.max_retries,
            "Configuration loaded"
        );

        Ok(settings)
    }

    /// Check values that deserialize fine but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.aws.access_key_id.trim().is_empty() {
            return Err(ConfigError::invalid("aws.access_key_id", "must not be empty"));
        }
        if self.aws.secret_access_key.trim().is_empty() {
            return Err(ConfigError::invalid(
                "aws.secret_access_key",
                "must not be empty",
            ));
        }
        if self.aws.region.trim().is_empty() {
            return Err(ConfigError::invalid("aws.region", "must not be empty"));
        }
        if self.aws.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "aws.request_timeout_secs",
                "must be greater than zero",
            ));
        }

        if let Some(sender_id) = &self.sms.sender_id {
            validate_sender_id(sender_id)?;
        }
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&self.sms.code_length) {
            return Err(ConfigError::invalid(
                "sms.code_length",
                format!("must be between {MIN_CODE_LENGTH} and {MAX_CODE_LENGTH}"),
            ));
        }
        if !self.sms.message_template.contains(CODE_PLACEHOLDER) {
            return Err(ConfigError::invalid(
                "sms.message_template",
                format!("must contain the {CODE_PLACEHOLDER} placeholder"),
            ));
        }

        if self.recipient.is_some() {
            self.recipient()?;
        }

        Ok(())
    }

    /// Destination for a CLI run.
    pub fn recipient(&self) -> Result<PhoneNumber, ConfigError> {
        let raw = self
            .recipient
            .as_deref()
            .ok_or_else(|| ConfigError::invalid("recipient", "is required"))?;
        PhoneNumber::new(raw).map_err(|e| ConfigError::invalid("recipient", e.to_string()))
    }

    /// Per-operation timeout for provider calls.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.aws.request_timeout_secs)
    }

    /// Messaging policy for the verification service.
    pub fn service_config(&self) -> SmsServiceConfig {
        let mut builder = SmsServiceConfig::builder()
            .sms_type(self.sms.sms_type)
            .max_retries(self.sms.max_retries)
            .retry_delay(Duration::from_millis(self.sms.retry_delay_ms))
            .stop_on_permanent_error(self.sms.stop_on_permanent_error)
            .message_template(self.sms.message_template.clone());
        if let Some(sender_id) = &self.sms.sender_id {
            builder = builder.sender_id(sender_id.clone());
        }
        builder.build()
    }

    /// Credentials for the SNS client.
    #[cfg(feature = "aws-sns")]
    pub fn credentials(&self) -> crate::providers::sns::AuthCredentials {
        crate::providers::sns::AuthCredentials::new(
            self.aws.access_key_id.clone(),
            self.aws.secret_access_key.clone(),
            self.aws.region.clone(),
        )
    }

    /// Code generator producing `sms.code_length` random digits.
    #[cfg(feature = "random")]
    pub fn code_generator(&self) -> crate::generator::RandomDigits {
        crate::generator::RandomDigits::new(self.sms.code_length)
    }
}

/// Sender labels are 1-11 alphanumeric characters with at least one letter.
fn validate_sender_id(sender_id: &str) -> Result<(), ConfigError> {
    if sender_id.is_empty() || sender_id.len() > MAX_SENDER_ID_LENGTH {
        return Err(ConfigError::invalid(
            "sms.sender_id",
            format!("must be 1 to {MAX_SENDER_ID_LENGTH} characters"),
        ));
    }
    if !sender_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::invalid(
            "sms.sender_id",
            "must contain only letters and digits",
        ));
    }
    if !sender_id.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(ConfigError::invalid(
            "sms.sender_id",
            "must contain at least one letter",
        ));
    }
    Ok(())
}
