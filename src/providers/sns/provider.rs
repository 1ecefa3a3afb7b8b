//! AWS SNS provider implementation.

use super::client::SnsClient;
use super::errors::{Result, SnsError, SnsErrorCode};
use crate::providers::traits::{Provider, PublishRequest};
use crate::types::MessageId;

#[cfg(feature = "tracing")]
use tracing::debug;

/// AWS SNS provider implementation.
///
/// This wraps the [`SnsClient`] and implements the generic [`Provider`] trait.
///
/// # Example
///
/// ```rust,ignore
/// use sms_otp::sns::{AuthCredentials, SnsClient, SnsProvider};
/// use sms_otp::{SmsServiceConfig, SmsVerificationService};
///
/// let client = SnsClient::new(AuthCredentials::new("AKIA...", "secret", "eu-west-2")).await?;
/// let provider = SnsProvider::new(client);
///
/// let service = SmsVerificationService::connect(provider, SmsServiceConfig::default()).await?;
/// let code = service.send_verification_code("+447770428172").await?;
/// ```
#[derive(Debug, Clone)]
pub struct SnsProvider {
    client: SnsClient,
}

impl SnsProvider {
    /// Create a new SNS provider.
    pub fn new(client: SnsClient) -> Self {
        Self { client }
    }

    /// Get reference to the inner client.
    pub fn client(&self) -> &SnsClient {
        &self.client
    }
}

impl Provider for SnsProvider {
    type Error = SnsError;

    fn name(&self) -> &'static str {
        "AWS SNS"
    }

    /// Checks that SNS accepts the credentials.
    ///
    /// Credentials scoped to `sns:Publish` get `AuthorizationError` here; the
    /// request was still authenticated, so that counts as success.
    async fn validate_credentials(&self) -> Result<()> {
        match self.client.get_sms_attributes().await {
            Ok(_attributes) => {
                #[cfg(feature = "tracing")]
                debug!(
                    region = %self.client.region(),
                    attributes = _attributes.len(),
                    "AWS SNS credentials accepted"
                );
                Ok(())
            }
            Err(SnsError::Service(error)) if error.code == SnsErrorCode::AuthorizationError => {
                #[cfg(feature = "tracing")]
                debug!(
                    region = %self.client.region(),
                    message = %error.message,
                    "AWS SNS credentials accepted without GetSMSAttributes permission"
                );
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn publish(&self, request: &PublishRequest) -> Result<MessageId> {
        self.client.publish(request).await
    }
}
