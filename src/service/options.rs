//! Per-send cancellation and deadline controls.

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Caller-supplied controls for a single send.
///
/// Checked before every attempt and before every retry delay; a pending
/// delay also ends early when the token is cancelled.
///
/// # Example
///
/// ```rust
/// use sms_otp::{CancellationToken, SendOptions};
/// use std::time::Duration;
///
/// let token = CancellationToken::new();
/// let options = SendOptions::new()
///     .with_cancellation(token.clone())
///     .with_timeout(Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    cancellation: Option<CancellationToken>,
    deadline: Option<Instant>,
}

/// Why a send stopped before it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interruption {
    Cancelled,
    DeadlineExceeded,
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the send when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Stop the send at `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Stop the send `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Check whether the send may continue and then wait for `upcoming_wait`.
    pub(crate) fn interruption(&self, upcoming_wait: Duration) -> Option<Interruption> {
        if let Some(token) = &self.cancellation
            && token.is_cancelled()
        {
            return Some(Interruption::Cancelled);
        }

        if let Some(deadline) = self.deadline {
            // A wait ending exactly at the deadline leaves no time for an attempt.
            if Instant::now() + upcoming_wait >= deadline {
                return Some(Interruption::DeadlineExceeded);
            }
        }

        None
    }

    /// Sleep for `delay`, waking early on cancellation.
    pub(crate) async fn sleep(&self, delay: Duration) -> Result<(), Interruption> {
        if delay.is_zero() {
            return Ok(());
        }

        match &self.cancellation {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(Interruption::Cancelled),
                _ = tokio::time::sleep(delay) => Ok(()),
            },
            None => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}
