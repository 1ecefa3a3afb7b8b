//! Send one verification code to the configured recipient and exit.
//!
//! Reads `config.{yaml,toml,json}` from the working directory (see
//! [`sms_otp::Settings`]). Log verbosity follows `RUST_LOG` (default `info`).

use anyhow::Context;
use sms_otp::sns::{SnsClient, SnsProvider};
use sms_otp::{Settings, SmsVerificationService, VerificationCode};
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(code) => {
            println!("Verification code sent successfully: {code}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %format!("{err:#}"), "Failed to send verification code");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<VerificationCode> {
    let settings = Settings::load().context("Failed to load configuration")?;
    let recipient = settings.recipient()?;

    let mut client = SnsClient::builder(settings.credentials())
        .request_timeout(settings.request_timeout());
    if let Some(endpoint) = settings.aws.endpoint_url.clone() {
        client = client.endpoint(endpoint);
    }
    let client = client.build().await.context("Error initializing SNS client")?;

    let service = SmsVerificationService::builder(SnsProvider::new(client))
        .config(settings.service_config())
        .generator(settings.code_generator())
        .connect()
        .await
        .context("Error initializing SMS service")?;

    info!(recipient = %recipient.masked(), "Sending verification code");

    let receipt = service
        .send_verification_code_with(recipient.as_str(), &Default::default())
        .await
        .context("Error sending SMS")?;

    info!(
        message_id = %receipt.message_id,
        attempts = receipt.attempts,
        "Verification code delivered to provider"
    );

    Ok(receipt.code)
}
