//! JSON-RPC wallet provider.
//!
//! Implements [`wallet_core::WalletProvider`] against a wallet bridge that
//! speaks EIP-1193-shaped JSON-RPC 2.0 over HTTP. Provider error codes are
//! translated into the closed [`wallet_core::ProviderError`] set right here;
//! nothing numeric leaks upward. Since plain HTTP cannot push notifications,
//! the provider runs an optional polling watcher that diffs the account list
//! and chain id and emits the corresponding events.

pub mod provider;
mod transport;

pub use provider::JsonRpcProvider;
