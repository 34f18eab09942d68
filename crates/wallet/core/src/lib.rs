//! Wallet and network session management.
//!
//! This crate provides the session layer between a wallet provider and the
//! verification client:
//!
//! ```text
//! NetworkSession ── chain detection, switching, local verifier override
//!       │
//! WalletSession ─── connection state machine, provider notifications
//!       │
//! WalletProvider ── injected provider trait (JSON-RPC bridge or mock)
//! ```
//!
//! The provider is an explicit dependency rather than an ambient global, so
//! every piece of session logic can run against the scripted
//! [`mock::MockWalletProvider`] in tests.

pub mod error;
pub mod network;
pub mod provider;
pub mod registry;
pub mod state;
pub mod wallet;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{NetworkError, ProviderError, WalletError};
pub use network::NetworkSession;
pub use provider::{ChainRegistration, ProviderEvent, WalletProvider};
pub use registry::{NetworkConfig, NetworkRegistry, chain};
pub use state::{ConnectionPhase, SessionEvent, WalletState};
pub use wallet::WalletSession;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockWalletProvider;
