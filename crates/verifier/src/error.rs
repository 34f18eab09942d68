//! Verification failure types.

use thiserror::Error;
use wallet_core::ProviderError;

/// A verification attempt that failed before reaching a verdict.
///
/// Provider failures are wrapped rather than re-interpreted; nothing below
/// this type escapes [`VerificationClient`](crate::VerificationClient).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// The bytecode probe at the verifier address failed.
    #[error("could not inspect the verifier address: {0}")]
    CodeCheckFailed(ProviderError),

    /// The read-only verifier call failed.
    #[error("verifier call failed: {0}")]
    CallFailed(ProviderError),

    /// The verifier returned bytes that do not decode as a boolean.
    #[error("unreadable verifier response: {0}")]
    MalformedResponse(String),
}
