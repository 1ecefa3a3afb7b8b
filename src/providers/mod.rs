//! SMS provider implementations.

pub(crate) mod traits;

#[cfg(feature = "aws-sns")]
pub mod sns;

pub use traits::{Provider, PublishRequest};
