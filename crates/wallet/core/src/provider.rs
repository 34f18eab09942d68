//! Wallet provider abstraction.

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::ProviderError;

/// Notifications pushed by the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The authorized account list changed. An empty list means access was
    /// revoked on the wallet side.
    AccountsChanged(Vec<Address>),

    /// The wallet moved to a different chain.
    ChainChanged(u64),
}

/// Parameters for registering a chain the wallet does not know yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainRegistration {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
}

/// The wallet the user brokers account access and contract calls through.
///
/// Sessions receive an implementation of this trait instead of talking to a
/// concrete wallet directly, so the same state machines run against the
/// JSON-RPC bridge in production and a scripted mock in tests.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Accounts already authorized for this client, without prompting.
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Prompt the user for account access.
    ///
    /// Returns [`ProviderError::RequestPending`] when a prompt is already
    /// open and [`ProviderError::UserRejected`] when the user declines.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Chain id the wallet is currently on.
    async fn chain_id(&self) -> Result<u64, ProviderError>;

    /// Ask the wallet to move to `chain_id`.
    ///
    /// Returns [`ProviderError::UnrecognizedChain`] when the wallet has no
    /// entry for the chain; callers register it and retry.
    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError>;

    /// Register a chain with the wallet.
    async fn add_chain(&self, registration: &ChainRegistration) -> Result<(), ProviderError>;

    /// Deployed bytecode at `address`. Empty bytes mean no contract.
    async fn get_code(&self, address: Address) -> Result<Bytes, ProviderError>;

    /// Read-only contract call. Returns the raw ABI-encoded result.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError>;

    /// Subscribe to account and chain notifications.
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}
