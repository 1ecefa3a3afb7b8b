//! AWS SNS client.

use super::errors::{Result, SnsError};
use crate::providers::traits::PublishRequest;
use crate::types::MessageId;
use aws_config::BehaviorVersion;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_sns::config::Region;
use aws_sdk_sns::types::MessageAttributeValue;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

#[cfg(feature = "tracing")]
use opentelemetry::trace::Status;
#[cfg(feature = "tracing")]
use tracing::Span;
#[cfg(feature = "tracing")]
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Message attribute carrying the Transactional/Promotional classification.
pub const SMS_TYPE_ATTRIBUTE: &str = "AWS.SNS.SMS.SMSType";

/// Message attribute carrying the sender label.
pub const SENDER_ID_ATTRIBUTE: &str = "AWS.SNS.SMS.SenderID";

/// Default per-operation timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const CREDENTIALS_PROVIDER_NAME: &str = "sms-otp-static";

/// Static AWS credentials for the SNS client.
#[derive(Clone)]
pub struct AuthCredentials {
    pub access_key_id: String,
    pub secret_access_key: SecretString,
    pub region: String,
}

impl AuthCredentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: SecretString::from(secret_access_key.into()),
            region: region.into(),
        }
    }

    fn check(&self) -> Result<()> {
        if self.access_key_id.trim().is_empty() {
            return Err(SnsError::MissingCredentials {
                field: "access_key_id",
            });
        }
        if self.secret_access_key.expose_secret().trim().is_empty() {
            return Err(SnsError::MissingCredentials {
                field: "secret_access_key",
            });
        }
        if self.region.trim().is_empty() {
            return Err(SnsError::MissingCredentials { field: "region" });
        }
        Ok(())
    }
}

impl std::fmt::Debug for AuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("region", &self.region)
            .finish()
    }
}

/// AWS SNS client.
///
/// Thin wrapper around the SDK client that speaks in this crate's types.
/// SDK-level retries are disabled; retrying is the verification service's job.
///
/// # Example
///
/// ```rust,ignore
/// use sms_otp::sns::{AuthCredentials, SnsClient};
///
/// let credentials = AuthCredentials::new("AKIA...", "secret", "eu-west-2");
/// let client = SnsClient::builder(credentials).build().await?;
/// ```
#[derive(Clone)]
pub struct SnsClient {
    inner: aws_sdk_sns::Client,
    region: String,
    endpoint: Option<Url>,
}

impl std::fmt::Debug for SnsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnsClient")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Builder for configuring a [`SnsClient`].
pub struct SnsClientBuilder {
    credentials: AuthCredentials,
    endpoint: Option<Url>,
    request_timeout: Duration,
}

impl SnsClientBuilder {
    /// Create a new builder with the given credentials.
    pub fn new(credentials: AuthCredentials) -> Self {
        Self {
            credentials,
            endpoint: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Send requests to a custom endpoint instead of the regional SNS one.
    pub fn endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Set the timeout for a single SNS operation.
    ///
    /// Default: 30 seconds
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build the [`SnsClient`].
    pub async fn build(self) -> Result<SnsClient> {
        self.credentials.check()?;

        let credentials = aws_credential_types::Credentials::new(
            &self.credentials.access_key_id,
            self.credentials.secret_access_key.expose_secret(),
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.credentials.region.clone()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(self.request_timeout)
                    .build(),
            );

        if let Some(endpoint) = &self.endpoint {
            loader = loader.endpoint_url(endpoint.as_str());
        }

        let sdk_config = loader.load().await;

        Ok(SnsClient {
            inner: aws_sdk_sns::Client::new(&sdk_config),
            region: self.credentials.region,
            endpoint: self.endpoint,
        })
    }
}

impl SnsClient {
    /// Create a client for the regional SNS endpoint.
    pub async fn new(credentials: AuthCredentials) -> Result<Self> {
        Self::builder(credentials).build().await
    }

    /// Create a builder for configuring the client.
    pub fn builder(credentials: AuthCredentials) -> SnsClientBuilder {
        SnsClientBuilder::new(credentials)
    }

    /// Wrap an SDK client built elsewhere (e.g. from the default credential chain).
    pub fn from_sdk_client(inner: aws_sdk_sns::Client) -> Self {
        let region = inner
            .config()
            .region()
            .map(|r| r.to_string())
            .unwrap_or_default();
        Self {
            inner,
            region,
            endpoint: None,
        }
    }

    /// Region the client talks to.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Fetch the account-level SMS attributes.
    ///
    /// Cheap authenticated call, used to check credentials.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "SnsClient::get_sms_attributes", skip_all, fields(region = %self.region))
    )]
    pub async fn get_sms_attributes(&self) -> Result<HashMap<String, String>> {
        let output = self
            .inner
            .get_sms_attributes()
            .send()
            .await
            .map_err(SnsError::from_sdk)?;

        #[cfg(feature = "tracing")]
        Span::current().set_status(Status::Ok);

        Ok(output.attributes().cloned().unwrap_or_default())
    }

    /// Publish an SMS directly to a phone number.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "SnsClient::publish",
            skip_all,
            fields(
                destination = %request.destination.masked(),
                sms_type = %request.sms_type,
                message_id = tracing::field::Empty
            )
        )
    )]
    pub async fn publish(&self, request: &PublishRequest) -> Result<MessageId> {
        let output = self
            .inner
            .publish()
            .phone_number(request.destination.as_str())
            .message(&request.message)
            .set_message_attributes(Some(message_attributes(request)?))
            .send()
            .await
            .map_err(SnsError::from_sdk)?;

        let message_id = output
            .message_id()
            .map(MessageId::from)
            .ok_or(SnsError::MissingMessageId)?;

        #[cfg(feature = "tracing")]
        {
            Span::current()
                .record("message_id", message_id.as_ref())
                .set_status(Status::Ok);
        }

        Ok(message_id)
    }
}

/// Build the SMS message attributes for a request.
pub(crate) fn message_attributes(
    request: &PublishRequest,
) -> Result<HashMap<String, MessageAttributeValue>> {
    let mut attributes = HashMap::new();

    attributes.insert(
        SMS_TYPE_ATTRIBUTE.to_string(),
        string_attribute(SMS_TYPE_ATTRIBUTE, request.sms_type.as_str())?,
    );

    if let Some(sender_id) = &request.sender_id {
        attributes.insert(
            SENDER_ID_ATTRIBUTE.to_string(),
            string_attribute(SENDER_ID_ATTRIBUTE, sender_id)?,
        );
    }

    Ok(attributes)
}

fn string_attribute(name: &'static str, value: &str) -> Result<MessageAttributeValue> {
    MessageAttributeValue::builder()
        .data_type("String")
        .string_value(value)
        .build()
        .map_err(|e| SnsError::InvalidAttribute {
            name,
            message: e.to_string(),
        })
}
