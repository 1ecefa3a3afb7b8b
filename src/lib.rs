//! # SMS OTP
//!
//! Send one-time verification codes over SMS with bounded, constant-delay retry.
//!
//! The crate is built around a single operation: generate a code, embed it in
//! a message, submit it to a provider, and retry failed submissions up to a
//! configured limit with a fixed delay between attempts.
//!
//! ## Supported Providers
//!
//! | Provider | Feature | Website |
//! |----------|---------|---------|
//! | AWS SNS | `aws-sns` (default) | <https://aws.amazon.com/sns/> |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sms_otp::sns::{AuthCredentials, SnsClient, SnsProvider};
//! use sms_otp::{SmsServiceConfig, SmsVerificationService, SmsVerificationServiceTrait};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = AuthCredentials::new("AKIA...", "secret", "eu-west-2");
//!     let provider = SnsProvider::new(SnsClient::new(credentials).await?);
//!
//!     let config = SmsServiceConfig::builder()
//!         .sender_id("OTPService")
//!         .max_retries(3)
//!         .retry_delay(Duration::from_secs(2))
//!         .build();
//!
//!     // Fails fast if the credentials are rejected
//!     let service = SmsVerificationService::connect(provider, config).await?;
//!
//!     let code = service.send_verification_code("+447770428172").await?;
//!     println!("Verification code sent: {}", code);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Settings ──► SmsVerificationService<P>
//!                      │  generate code, render body,
//!                      │  dispatch_with_retry (constant delay)
//!                      ▼
//!                  Provider          (trait: SnsProvider, etc.)
//! ```
//!
//! ## Features
//!
//! - `aws-sns` - AWS SNS provider (enabled by default)
//! - `tracing` - OpenTelemetry tracing instrumentation (enabled by default)
//! - `random` - random numeric code generator (enabled by default)
//! - `cli` - the `sms-otp` binary (enabled by default)

pub mod errors;
pub mod generator;
pub mod providers;
pub mod service;
pub mod settings;
pub mod types;

#[cfg(feature = "aws-sns")]
pub use providers::sns;

// Re-export commonly used types at the crate root
pub use errors::RetryableError;
#[cfg(feature = "random")]
pub use generator::RandomDigits;
pub use generator::{CodeGenerator, FixedCode};
pub use providers::{Provider, PublishRequest};
pub use service::{
    DispatchReceipt, SendOptions, SmsServiceConfig, SmsServiceConfigBuilder, SmsServiceError,
    SmsVerificationService, SmsVerificationServiceBuilder, SmsVerificationServiceTrait,
    VerificationReceipt,
};
pub use settings::{ConfigError, Settings};
pub use tokio_util::sync::CancellationToken;
pub use types::{MessageId, PhoneNumber, PhoneNumberError, SmsType, VerificationCode};
