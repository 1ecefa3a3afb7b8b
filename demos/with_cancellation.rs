//! Example demonstrating cancellation and deadlines.
//!
//! The send gives up when the token is cancelled from another task, or when
//! the next retry delay would run past the deadline.
//!
//! # Running
//!
//! ```bash
//! AWS_ACCESS_KEY_ID=... AWS_SECRET_ACCESS_KEY=... AWS_REGION=eu-west-2 \
//!     cargo run --example with_cancellation -- +447700900123
//! ```

use sms_otp::sns::{AuthCredentials, SnsClient, SnsProvider};
use sms_otp::{
    CancellationToken, SendOptions, SmsServiceConfig, SmsServiceError, SmsVerificationService,
};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let recipient = env::args()
        .nth(1)
        .expect("usage: with_cancellation <E.164 number>");

    let credentials = AuthCredentials::new(
        env::var("AWS_ACCESS_KEY_ID")?,
        env::var("AWS_SECRET_ACCESS_KEY")?,
        env::var("AWS_REGION")?,
    );
    let provider = SnsProvider::new(SnsClient::new(credentials).await?);

    let config = SmsServiceConfig::default()
        .with_max_retries(10)
        .with_retry_delay(Duration::from_secs(3));
    let service = SmsVerificationService::connect(provider, config).await?;

    let cancel_token = CancellationToken::new();
    let token_clone = cancel_token.clone();

    // Cancel on Ctrl+C
    let cancel_handle = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("Cancelling send...");
            token_clone.cancel();
        }
    });

    let options = SendOptions::new()
        .with_cancellation(cancel_token)
        .with_timeout(Duration::from_secs(20));

    println!("Sending verification code (Ctrl+C to cancel, 20s deadline)...");
    match service.send_verification_code_with(&recipient, &options).await {
        Ok(receipt) => {
            println!("Sent code {} after {} attempt(s)", receipt.code, receipt.attempts);
        }
        Err(SmsServiceError::Cancelled { attempts, .. }) => {
            println!("Send was cancelled after {} attempt(s)", attempts);
        }
        Err(SmsServiceError::DeadlineExceeded {
            attempts,
            last_error,
            ..
        }) => {
            println!("Deadline reached after {} attempt(s)", attempts);
            if let Some(err) = last_error {
                println!("Last error: {}", err);
            }
        }
        Err(e) => {
            println!("Error: {}", e);
        }
    }

    cancel_handle.abort();
    Ok(())
}
