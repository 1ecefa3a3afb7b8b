//! Example demonstrating retry callbacks.
//!
//! Registers an `on_retry` callback that counts failed attempts, enabling
//! custom logging or metrics.
//!
//! # Running
//!
//! ```bash
//! AWS_ACCESS_KEY_ID=... AWS_SECRET_ACCESS_KEY=... AWS_REGION=eu-west-2 \
//!     cargo run --example retry_callbacks -- +447700900123
//! ```

use sms_otp::sns::{AuthCredentials, SnsClient, SnsError, SnsProvider};
use sms_otp::{SmsServiceError, SmsVerificationService};
use std::env;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let recipient = env::args()
        .nth(1)
        .expect("usage: retry_callbacks <E.164 number>");

    let credentials = AuthCredentials::new(
        env::var("AWS_ACCESS_KEY_ID")?,
        env::var("AWS_SECRET_ACCESS_KEY")?,
        env::var("AWS_REGION")?,
    );
    let provider = SnsProvider::new(SnsClient::new(credentials).await?);

    // Track retry count across the send
    let retry_count = Arc::new(AtomicU32::new(0));
    let retry_count_clone = Arc::clone(&retry_count);

    let service = SmsVerificationService::builder(provider)
        .sender_id("OTPService")
        .max_retries(5)
        .retry_delay(Duration::from_secs(1))
        .stop_on_permanent_error(true)
        .on_retry(move |error: &SnsError, attempt, delay| {
            let count = retry_count_clone.fetch_add(1, Ordering::SeqCst) + 1;
            println!(
                "[RETRY #{}] Attempt {} failed: {} | Next attempt in: {:.1}s",
                count,
                attempt,
                error,
                delay.as_secs_f64()
            );
        })
        .connect()
        .await?;

    println!("Sending verification code (retries will be logged)...\n");

    match service
        .send_verification_code_with(&recipient, &Default::default())
        .await
    {
        Ok(receipt) => {
            println!("Sent code {} as message {}", receipt.code, receipt.message_id);
            println!("Attempts: {}", receipt.attempts);
        }
        Err(e @ SmsServiceError::PermanentFailure { .. }) => {
            println!("Provider rejected the message, not retried: {}", e);
        }
        Err(e) => {
            println!("[{}] {}", e.code(), e);
        }
    }

    println!("\n=== Summary ===");
    println!("Total retries: {}", retry_count.load(Ordering::SeqCst));

    Ok(())
}
