//! Error types for wallet and network operations.

use thiserror::Error;

/// Wallet provider failures.
///
/// Providers translate their raw error codes into this closed set at the
/// boundary; numeric codes never reach session logic. Conditions with
/// dedicated recovery paths (`RequestPending`, `UnrecognizedChain`) get their
/// own variants, everything else stays generic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("user rejected the request")]
    UserRejected,

    #[error("a request is already pending in the wallet")]
    RequestPending,

    #[error("chain {0} is not registered with the wallet")]
    UnrecognizedChain(u64),

    #[error("provider call failed with code {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("transport failure: {0}")]
    Transport(String),
}

/// Wallet session errors.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("connection request already pending — approve it in your wallet")]
    RequestPending,

    #[error("user rejected the connection request")]
    UserRejected,

    #[error("wallet granted access but reported no accounts")]
    NoAccounts,

    #[error("wallet provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Network session errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("unsupported network: chain {0} is not in the registry")]
    UnsupportedChain(u64),

    #[error("chain switch failed: {0}")]
    SwitchFailed(String),

    #[error("chain registration failed: {0}")]
    RegistrationFailed(String),

    #[error("invalid account address: {0:?}")]
    InvalidAddress(String),

    #[error("registry has no local network entry")]
    NoLocalNetwork,

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}
