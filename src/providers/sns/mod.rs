//! AWS SNS provider implementation.
//!
//! Sends SMS directly to phone numbers through the SNS `Publish` action,
//! tagging each message with its classification and optional sender label.
//!
//! # Example
//!
//! ```rust,ignore
//! use sms_otp::sns::{AuthCredentials, SnsClient, SnsProvider};
//! use sms_otp::{SmsServiceConfig, SmsVerificationService};
//! use std::time::Duration;
//!
//! let credentials = AuthCredentials::new("AKIA...", "secret", "eu-west-2");
//! let client = SnsClient::builder(credentials)
//!     .request_timeout(Duration::from_secs(10))
//!     .build()
//!     .await?;
//!
//! let config = SmsServiceConfig::builder()
//!     .sender_id("OTPService")
//!     .max_retries(3)
//!     .retry_delay(Duration::from_secs(2))
//!     .build();
//!
//! let service = SmsVerificationService::connect(SnsProvider::new(client), config).await?;
//! let code = service.send_verification_code("+447770428172").await?;
//! println!("Sent code {}", code);
//! ```

pub mod client;
pub mod errors;
pub mod provider;

// Re-export commonly used types
pub use client::{AuthCredentials, SnsClient, SnsClientBuilder};
pub use errors::{SnsError, SnsErrorCode, SnsServiceError};
pub use provider::SnsProvider;
