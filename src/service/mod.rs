//! Verification code sending with bounded constant-delay retry.

pub(crate) mod config;
pub(crate) mod error;
pub(crate) mod options;
pub(crate) mod structure;
pub(crate) mod traits;

pub use config::{
    CODE_PLACEHOLDER, DEFAULT_MESSAGE_TEMPLATE, SmsServiceConfig, SmsServiceConfigBuilder,
};
pub use error::{
    AUTH_INVALID_CREDENTIALS, BoxError, CODE_GENERATOR_MISSING, SEND_CANCELLED,
    SEND_DEADLINE_EXCEEDED, SEND_INVALID_DESTINATION, SEND_MAX_RETRIES_EXCEEDED,
    SEND_PERMANENT_FAILURE, SmsServiceError,
};
pub use options::SendOptions;
pub use structure::{
    DispatchReceipt, OnRetryCallback, SmsVerificationService, SmsVerificationServiceBuilder,
    VerificationReceipt,
};
pub use traits::SmsVerificationServiceTrait;
