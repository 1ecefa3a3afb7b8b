//! Integration tests for the retry-wrapped send.
//!
//! A scripted in-memory provider records every request it receives and the
//! (paused) tokio clock reading at each attempt.

use sms_otp::{
    CancellationToken, FixedCode, MessageId, PhoneNumber, Provider, PublishRequest,
    RetryableError, SendOptions, SmsServiceConfig, SmsServiceError, SmsType,
    SmsVerificationService, SmsVerificationServiceTrait, VerificationCode,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

const DESTINATION: &str = "+15551234567";

#[derive(Debug, Clone, PartialEq, Error)]
enum MockError {
    #[error("throttled")]
    Throttled,
    #[error("invalid parameter: PhoneNumber")]
    InvalidParameter,
    #[error("invalid credentials")]
    BadCredentials,
}

impl RetryableError for MockError {
    fn is_retryable(&self) -> bool {
        matches!(self, MockError::Throttled)
    }
}

#[derive(Debug, Default)]
struct MockState {
    script: VecDeque<Result<String, MockError>>,
    fallback: Option<MockError>,
    reject_credentials: bool,
    validations: u32,
    requests: Vec<PublishRequest>,
    attempt_times: Vec<Instant>,
}

#[derive(Debug, Clone, Default)]
struct MockProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Replays `script` in order, then fails with `Throttled` forever.
    fn scripted(script: Vec<Result<&str, MockError>>) -> Self {
        let provider = Self::default();
        {
            let mut state = provider.state.lock().unwrap();
            state.script = script
                .into_iter()
                .map(|r| r.map(str::to_string))
                .collect();
            state.fallback = Some(MockError::Throttled);
        }
        provider
    }

    fn always_failing(error: MockError) -> Self {
        let provider = Self::default();
        provider.state.lock().unwrap().fallback = Some(error);
        provider
    }

    /// Fails until `attempt`, which succeeds with "msg-<attempt>".
    fn succeeding_on(attempt: usize) -> Self {
        let script = (1..=attempt)
            .map(|n| {
                if n == attempt {
                    Ok(format!("msg-{n}"))
                } else {
                    Err(MockError::Throttled)
                }
            })
            .collect::<Vec<_>>();
        let provider = Self::default();
        {
            let mut state = provider.state.lock().unwrap();
            state.script = script.into_iter().collect();
            state.fallback = Some(MockError::Throttled);
        }
        provider
    }

    fn rejecting_credentials() -> Self {
        let provider = Self::always_failing(MockError::Throttled);
        provider.state.lock().unwrap().reject_credentials = true;
        provider
    }

    fn attempts(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    fn validations(&self) -> u32 {
        self.state.lock().unwrap().validations
    }

    fn requests(&self) -> Vec<PublishRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    fn attempt_times(&self) -> Vec<Instant> {
        self.state.lock().unwrap().attempt_times.clone()
    }
}

impl Provider for MockProvider {
    type Error = MockError;

    fn name(&self) -> &'static str {
        "mock"
    }

    async fn validate_credentials(&self) -> Result<(), MockError> {
        let mut state = self.state.lock().unwrap();
        state.validations += 1;
        if state.reject_credentials {
            Err(MockError::BadCredentials)
        } else {
            Ok(())
        }
    }

    async fn publish(&self, request: &PublishRequest) -> Result<MessageId, MockError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());
        state.attempt_times.push(Instant::now());

        match state.script.pop_front() {
            Some(result) => result.map(MessageId::from),
            None => Err(state.fallback.clone().unwrap_or(MockError::Throttled)),
        }
    }
}

fn config(max_retries: u32, retry_delay: Duration) -> SmsServiceConfig {
    SmsServiceConfig::builder()
        .max_retries(max_retries)
        .retry_delay(retry_delay)
        .build()
}

async fn service(
    provider: &MockProvider,
    config: SmsServiceConfig,
) -> SmsVerificationService<MockProvider> {
    SmsVerificationService::builder(provider.clone())
        .config(config)
        .generator(FixedCode::new("12345"))
        .connect()
        .await
        .unwrap()
}

fn request() -> PublishRequest {
    PublishRequest::new(
        PhoneNumber::new(DESTINATION).unwrap(),
        "Your verification code: 12345",
    )
}

// =============================================================================
// Attempt counting
// =============================================================================

#[tokio::test]
async fn test_always_failing_provider_makes_max_retries_plus_one_attempts() {
    for max_retries in 0..=4u32 {
        let provider = MockProvider::always_failing(MockError::Throttled);
        let service = service(&provider, config(max_retries, Duration::ZERO)).await;

        let err = service
            .dispatch_with_retry(&request(), &SendOptions::default())
            .await
            .unwrap_err();

        assert_eq!(provider.attempts(), max_retries as usize + 1);
        match &err {
            SmsServiceError::SendExhausted {
                destination,
                attempts,
                source,
            } => {
                assert_eq!(destination.as_str(), DESTINATION);
                assert_eq!(*attempts, max_retries + 1);
                assert_eq!(source.to_string(), "throttled");
            }
            other => panic!("Expected SendExhausted, got {other:?}"),
        }
        assert_eq!(err.code(), "SEND_MAX_RETRIES_EXCEEDED");
    }
}

#[tokio::test]
async fn test_success_on_kth_attempt_returns_kth_message_id() {
    let max_retries = 3u32;
    for k in 1..=(max_retries as usize + 1) {
        let provider = MockProvider::succeeding_on(k);
        let service = service(&provider, config(max_retries, Duration::ZERO)).await;

        let receipt = service
            .dispatch_with_retry(&request(), &SendOptions::default())
            .await
            .unwrap();

        assert_eq!(provider.attempts(), k);
        assert_eq!(receipt.attempts as usize, k);
        assert_eq!(receipt.message_id.as_ref(), format!("msg-{k}"));
    }
}

#[tokio::test]
async fn test_final_cause_is_last_error() {
    let provider = MockProvider::scripted(vec![
        Err(MockError::Throttled),
        Err(MockError::InvalidParameter),
    ]);
    let service = service(&provider, config(1, Duration::ZERO)).await;

    let err = service
        .dispatch_with_retry(&request(), &SendOptions::default())
        .await
        .unwrap_err();

    assert_eq!(provider.attempts(), 2);
    let source = std::error::Error::source(&err).unwrap();
    assert_eq!(source.to_string(), "invalid parameter: PhoneNumber");
}

// =============================================================================
// Timing (paused clock)
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_kth_attempt_starts_after_k_minus_one_delays() {
    let delay = Duration::from_secs(2);
    let provider = MockProvider::always_failing(MockError::Throttled);
    let service = service(&provider, config(3, delay)).await;

    let start = Instant::now();
    let result = service
        .dispatch_with_retry(&request(), &SendOptions::default())
        .await;
    assert!(result.is_err());

    let times = provider.attempt_times();
    assert_eq!(times.len(), 4);
    for (index, time) in times.iter().enumerate() {
        assert_eq!(time.duration_since(start), delay * index as u32);
    }
    // No delay after the final attempt
    assert_eq!(start.elapsed(), delay * 3);
}

#[tokio::test(start_paused = true)]
async fn test_no_delay_after_success() {
    let delay = Duration::from_secs(5);
    let provider = MockProvider::succeeding_on(2);
    let service = service(&provider, config(3, delay)).await;

    let start = Instant::now();
    service
        .dispatch_with_retry(&request(), &SendOptions::default())
        .await
        .unwrap();

    assert_eq!(start.elapsed(), delay);
}

// =============================================================================
// Request shape
// =============================================================================

#[tokio::test]
async fn test_every_attempt_carries_identical_request() {
    let provider = MockProvider::always_failing(MockError::Throttled);
    let config = SmsServiceConfig::builder()
        .max_retries(3)
        .retry_delay(Duration::ZERO)
        .sender_id("OTPService")
        .sms_type(SmsType::Transactional)
        .build();
    let service = service(&provider, config).await;

    let result = service.send_verification_code(DESTINATION).await;
    assert!(result.is_err());

    let requests = provider.requests();
    assert_eq!(requests.len(), 4);
    let first = &requests[0];
    assert_eq!(first.destination.as_str(), DESTINATION);
    assert_eq!(first.message, "Your verification code: 12345");
    assert_eq!(first.sms_type, SmsType::Transactional);
    assert_eq!(first.sender_id.as_deref(), Some("OTPService"));
    for request in &requests[1..] {
        assert_eq!(request, first);
    }
}

#[tokio::test]
async fn test_custom_template_and_generator() {
    let provider = MockProvider::succeeding_on(1);
    let service = SmsVerificationService::builder(provider.clone())
        .max_retries(0)
        .message_template("{code} is your Acme code")
        .generator(|| VerificationCode::from("987654"))
        .connect()
        .await
        .unwrap();

    let code = service.send_verification_code(DESTINATION).await.unwrap();

    assert_eq!(code.as_str(), "987654");
    assert_eq!(provider.requests()[0].message, "987654 is your Acme code");
}

#[tokio::test]
async fn test_default_generator_produces_six_digits() {
    let provider = MockProvider::succeeding_on(1);
    let service = SmsVerificationService::connect(provider.clone(), config(0, Duration::ZERO))
        .await
        .unwrap();

    let code = service.send_verification_code(DESTINATION).await.unwrap();

    assert_eq!(code.len(), 6);
    assert!(code.is_numeric());
    assert!(provider.requests()[0].message.ends_with(code.as_str()));
}

// =============================================================================
// Construction
// =============================================================================

#[tokio::test]
async fn test_invalid_credentials_return_auth_error() {
    let provider = MockProvider::rejecting_credentials();

    let result =
        SmsVerificationService::connect(provider.clone(), SmsServiceConfig::default()).await;

    match result {
        Err(SmsServiceError::Auth { provider: name, source }) => {
            assert_eq!(name, "mock");
            assert_eq!(source.to_string(), "invalid credentials");
        }
        Err(other) => panic!("Expected Auth error, got {other:?}"),
        Ok(_) => panic!("Service must not be constructed with rejected credentials"),
    }
    assert_eq!(provider.validations(), 1);
    assert_eq!(provider.attempts(), 0);
}

#[tokio::test]
async fn test_credentials_validated_once() {
    let provider = MockProvider::succeeding_on(1);
    let service = service(&provider, config(0, Duration::ZERO)).await;

    service.send_verification_code(DESTINATION).await.unwrap();

    assert_eq!(provider.validations(), 1);
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_scenario_fails_twice_then_succeeds() {
    let provider = MockProvider::scripted(vec![
        Err(MockError::Throttled),
        Err(MockError::Throttled),
        Ok("msg-3"),
    ]);
    let service = service(&provider, config(3, Duration::ZERO)).await;

    let code = service.send_verification_code(DESTINATION).await.unwrap();

    assert_eq!(code.as_str(), "12345");
    assert_eq!(provider.attempts(), 3);
}

#[tokio::test]
async fn test_scenario_no_retries_single_failure() {
    let provider = MockProvider::always_failing(MockError::Throttled);
    let service = service(&provider, config(0, Duration::ZERO)).await;

    let err = service
        .send_verification_code(DESTINATION)
        .await
        .unwrap_err();

    assert_eq!(provider.attempts(), 1);
    assert_eq!(err.code(), "SEND_MAX_RETRIES_EXCEEDED");
    assert_eq!(err.destination().map(|d| d.as_str()), Some(DESTINATION));
    assert!(matches!(err, SmsServiceError::SendExhausted { attempts: 1, .. }));
}

// =============================================================================
// Permanent errors
// =============================================================================

#[tokio::test]
async fn test_permanent_errors_retried_by_default() {
    let provider = MockProvider::always_failing(MockError::InvalidParameter);
    let service = service(&provider, config(2, Duration::ZERO)).await;

    let err = service
        .send_verification_code(DESTINATION)
        .await
        .unwrap_err();

    assert_eq!(provider.attempts(), 3);
    assert_eq!(err.code(), "SEND_MAX_RETRIES_EXCEEDED");
}

#[tokio::test]
async fn test_permanent_errors_short_circuit_when_configured() {
    let provider = MockProvider::always_failing(MockError::InvalidParameter);
    let config = SmsServiceConfig::builder()
        .max_retries(5)
        .retry_delay(Duration::ZERO)
        .stop_on_permanent_error(true)
        .build();
    let service = service(&provider, config).await;

    let err = service
        .send_verification_code(DESTINATION)
        .await
        .unwrap_err();

    assert_eq!(provider.attempts(), 1);
    assert_eq!(err.code(), "SEND_PERMANENT_FAILURE");
    assert!(matches!(err, SmsServiceError::PermanentFailure { attempts: 1, .. }));
}

#[tokio::test]
async fn test_transient_errors_still_retried_when_short_circuit_enabled() {
    let provider = MockProvider::scripted(vec![
        Err(MockError::Throttled),
        Err(MockError::Throttled),
        Ok("msg-3"),
    ]);
    let config = SmsServiceConfig::builder()
        .max_retries(3)
        .retry_delay(Duration::ZERO)
        .stop_on_permanent_error(true)
        .build();
    let service = service(&provider, config).await;

    service.send_verification_code(DESTINATION).await.unwrap();
    assert_eq!(provider.attempts(), 3);
}

// =============================================================================
// Cancellation and deadlines
// =============================================================================

#[tokio::test]
async fn test_cancelled_before_first_attempt() {
    let provider = MockProvider::succeeding_on(1);
    let service = service(&provider, config(3, Duration::ZERO)).await;

    let token = CancellationToken::new();
    token.cancel();
    let options = SendOptions::new().with_cancellation(token);

    let err = service
        .send_verification_code_with(DESTINATION, &options)
        .await
        .unwrap_err();

    assert_eq!(provider.attempts(), 0);
    assert!(matches!(
        err,
        SmsServiceError::Cancelled {
            attempts: 0,
            last_error: None,
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_during_retry_delay() {
    let provider = MockProvider::always_failing(MockError::Throttled);
    let service = service(&provider, config(3, Duration::from_secs(60))).await;

    let token = CancellationToken::new();
    let canceller = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            token.cancel();
        })
    };
    let options = SendOptions::new().with_cancellation(token);

    let start = Instant::now();
    let err = service
        .send_verification_code_with(DESTINATION, &options)
        .await
        .unwrap_err();
    canceller.await.unwrap();

    assert_eq!(provider.attempts(), 1);
    assert_eq!(start.elapsed(), Duration::from_secs(10));
    match err {
        SmsServiceError::Cancelled {
            attempts,
            last_error,
            ..
        } => {
            assert_eq!(attempts, 1);
            assert_eq!(last_error.unwrap().to_string(), "throttled");
        }
        other => panic!("Expected Cancelled, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_deadline_stops_before_overrunning_sleep() {
    let provider = MockProvider::always_failing(MockError::Throttled);
    let service = service(&provider, config(5, Duration::from_secs(5))).await;

    let options = SendOptions::new().with_timeout(Duration::from_secs(7));
    let start = Instant::now();
    let err = service
        .send_verification_code_with(DESTINATION, &options)
        .await
        .unwrap_err();

    // Attempts at t=0 and t=5; the next delay would end at t=10 > 7.
    assert_eq!(provider.attempts(), 2);
    assert_eq!(start.elapsed(), Duration::from_secs(5));
    assert_eq!(err.code(), "SEND_DEADLINE_EXCEEDED");
    assert_eq!(err.attempts(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_delay_ending_at_deadline_is_not_slept() {
    let provider = MockProvider::always_failing(MockError::Throttled);
    let service = service(&provider, config(3, Duration::from_secs(5))).await;

    let options = SendOptions::new().with_timeout(Duration::from_secs(5));
    let start = Instant::now();
    let err = service
        .send_verification_code_with(DESTINATION, &options)
        .await
        .unwrap_err();

    // Waking at t=5 would leave no time for a second attempt.
    assert_eq!(provider.attempts(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(err.code(), "SEND_DEADLINE_EXCEEDED");
    assert_eq!(err.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_on_retry_skipped_when_deadline_stops_the_retry() {
    let provider = MockProvider::always_failing(MockError::Throttled);
    let seen: Arc<Mutex<Vec<u32>>> = Arc::default();

    let service = {
        let seen = Arc::clone(&seen);
        SmsVerificationService::builder(provider.clone())
            .max_retries(5)
            .retry_delay(Duration::from_secs(5))
            .generator(FixedCode::new("12345"))
            .on_retry(move |_: &MockError, attempt, _| seen.lock().unwrap().push(attempt))
            .connect()
            .await
            .unwrap()
    };

    let options = SendOptions::new().with_timeout(Duration::from_secs(7));
    let err = service
        .send_verification_code_with(DESTINATION, &options)
        .await
        .unwrap_err();

    // Only the retry after attempt 1 was slept; the one after attempt 2 was not.
    assert_eq!(provider.attempts(), 2);
    assert_eq!(err.code(), "SEND_DEADLINE_EXCEEDED");
    assert_eq!(*seen.lock().unwrap(), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn test_expired_deadline_prevents_any_attempt() {
    let provider = MockProvider::succeeding_on(1);
    let service = service(&provider, config(0, Duration::ZERO)).await;

    let options = SendOptions::new().with_deadline(Instant::now());
    let err = service
        .send_verification_code_with(DESTINATION, &options)
        .await
        .unwrap_err();

    assert_eq!(provider.attempts(), 0);
    assert!(matches!(
        err,
        SmsServiceError::DeadlineExceeded { attempts: 0, .. }
    ));
}

// =============================================================================
// Destination validation, callbacks, receipts
// =============================================================================

#[tokio::test]
async fn test_invalid_destination_makes_no_attempt() {
    let provider = MockProvider::succeeding_on(1);
    let service = service(&provider, config(3, Duration::ZERO)).await;

    let err = service
        .send_verification_code("07770 428172")
        .await
        .unwrap_err();

    assert_eq!(provider.attempts(), 0);
    assert_eq!(err.code(), "SEND_INVALID_DESTINATION");
    assert!(matches!(
        err,
        SmsServiceError::InvalidDestination { ref destination, .. } if destination == "07770 428172"
    ));
}

#[tokio::test]
async fn test_on_retry_callback_sees_each_failed_attempt() {
    let provider = MockProvider::always_failing(MockError::Throttled);
    let seen: Arc<Mutex<Vec<(u32, Duration)>>> = Arc::default();

    let service = {
        let seen = Arc::clone(&seen);
        SmsVerificationService::builder(provider.clone())
            .max_retries(2)
            .retry_delay(Duration::ZERO)
            .generator(FixedCode::new("12345"))
            .on_retry(move |err: &MockError, attempt, delay| {
                assert_eq!(err, &MockError::Throttled);
                seen.lock().unwrap().push((attempt, delay));
            })
            .connect()
            .await
            .unwrap()
    };

    let _ = service.send_verification_code(DESTINATION).await;

    // Two retries follow attempts 1 and 2; attempt 3 exhausts the budget.
    assert_eq!(
        *seen.lock().unwrap(),
        vec![(1, Duration::ZERO), (2, Duration::ZERO)]
    );
}

#[tokio::test]
async fn test_receipt_reports_destination_code_and_message_id() {
    let provider = MockProvider::succeeding_on(2);
    let service = service(&provider, config(3, Duration::ZERO)).await;

    let receipt = service
        .send_verification_code_with("+1 (555) 123-4567", &SendOptions::default())
        .await
        .unwrap();

    assert_eq!(receipt.destination.as_str(), DESTINATION);
    assert_eq!(receipt.code.as_str(), "12345");
    assert_eq!(receipt.message_id.as_ref(), "msg-2");
    assert_eq!(receipt.attempts, 2);
}

async fn send_through_trait<S: SmsVerificationServiceTrait>(
    service: &S,
) -> Result<VerificationCode, S::Error> {
    service.send_verification_code(DESTINATION).await
}

#[tokio::test]
async fn test_service_usable_through_trait() {
    let provider = MockProvider::succeeding_on(1);
    let service = service(&provider, config(0, Duration::ZERO)).await;

    let code = send_through_trait(&service).await.unwrap();
    assert_eq!(code.as_str(), "12345");
}
