//! User-facing verification outcomes.

use std::fmt;

use alloy_primitives::U256;
use proof::FormatError;

use crate::error::VerificationError;

/// What the public signal of an accepted proof attests.
///
/// The circuit proves knowledge of a birthdate and exposes one signal:
/// `1` when the prover is 18 or older, `0` when not. Any other value means
/// the artifact came from a different circuit than the deployed verifier
/// was built for, even though the pairing check passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeAttestation {
    Adult,
    Minor,
    Unrecognized,
}

impl AgeAttestation {
    pub fn from_signal(signal: U256) -> Self {
        if signal == U256::from(1u64) {
            Self::Adult
        } else if signal == U256::ZERO {
            Self::Minor
        } else {
            Self::Unrecognized
        }
    }
}

/// Outcome of one verification attempt.
///
/// Every exit from [`VerificationClient::verify`] is one of these; nothing
/// else reaches the caller. `Rejected` is the contract saying no;
/// `Failed` is not reaching the contract (or not understanding it).
///
/// [`VerificationClient::verify`]: crate::VerificationClient::verify
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// No proof artifact has been loaded yet.
    MissingArtifact,
    /// No wallet account is connected.
    WalletNotConnected,
    /// The wallet sits on a chain with no known verifier deployment.
    UnsupportedNetwork,
    /// The resolved verifier address has no bytecode.
    ContractMissing { local: bool },
    /// The artifact could not be shaped into verifier arguments.
    MalformedArtifact(FormatError),
    /// Another verification is still in flight.
    Busy,
    /// The contract ran the pairing check and rejected the proof.
    Rejected,
    /// The contract accepted the proof.
    Verified(AgeAttestation),
    /// The attempt ended before the contract produced an answer.
    Failed(VerificationError),
}

impl Verdict {
    /// True only when the pairing check passed, whatever the signal says.
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified(_))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArtifact => write!(f, "upload a proof file"),
            Self::WalletNotConnected => write!(f, "wallet not connected"),
            Self::UnsupportedNetwork => write!(f, "unsupported network"),
            Self::ContractMissing { local: true } => write!(f, "deploy the contract locally"),
            Self::ContractMissing { local: false } => write!(f, "no contract at this address"),
            Self::MalformedArtifact(err) => write!(f, "invalid proof file: {err}"),
            Self::Busy => write!(f, "a verification is already running"),
            Self::Rejected => write!(f, "proof invalid"),
            Self::Verified(AgeAttestation::Adult) => write!(f, "proof valid: 18 or older"),
            Self::Verified(AgeAttestation::Minor) => write!(f, "proof valid: under 18"),
            Self::Verified(AgeAttestation::Unrecognized) => {
                write!(f, "proof valid: unrecognized signal value")
            }
            Self::Failed(err) => write!(f, "verification failed: {err}"),
        }
    }
}
