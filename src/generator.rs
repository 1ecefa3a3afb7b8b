//! Verification code generation strategies.

use crate::types::VerificationCode;

/// Strategy producing the code embedded in each verification message.
///
/// Implemented for any `Fn() -> VerificationCode` closure, so tests and
/// callers with their own code store can inject a generator directly:
///
/// ```rust
/// use sms_otp::{CodeGenerator, VerificationCode};
///
/// let generator = || VerificationCode::from("424242");
/// assert_eq!(generator.generate().as_str(), "424242");
/// ```
pub trait CodeGenerator: Send + Sync {
    /// Produce a new code.
    fn generate(&self) -> VerificationCode;
}

impl<F> CodeGenerator for F
where
    F: Fn() -> VerificationCode + Send + Sync,
{
    fn generate(&self) -> VerificationCode {
        self()
    }
}

/// Always returns the same code.
#[derive(Debug, Clone)]
pub struct FixedCode(VerificationCode);

impl FixedCode {
    pub fn new(code: impl Into<VerificationCode>) -> Self {
        Self(code.into())
    }
}

impl CodeGenerator for FixedCode {
    fn generate(&self) -> VerificationCode {
        self.0.clone()
    }
}

/// Uniformly random numeric codes of a fixed length.
#[cfg(feature = "random")]
#[derive(Debug, Clone, Copy)]
pub struct RandomDigits {
    length: usize,
}

#[cfg(feature = "random")]
impl RandomDigits {
    /// Default number of digits.
    pub const DEFAULT_LENGTH: usize = 6;

    /// Create a generator for codes with `length` digits (at least one).
    pub fn new(length: usize) -> Self {
        Self {
            length: length.max(1),
        }
    }

    /// Number of digits in generated codes.
    pub fn length(&self) -> usize {
        self.length
    }
}

#[cfg(feature = "random")]
impl Default for RandomDigits {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LENGTH)
    }
}

#[cfg(feature = "random")]
impl CodeGenerator for RandomDigits {
    fn generate(&self) -> VerificationCode {
        use rand::Rng;

        let mut rng = rand::thread_rng();
        let code: String = (0..self.length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        VerificationCode::from(code)
    }
}
