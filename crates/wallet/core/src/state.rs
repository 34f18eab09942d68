//! Shared session state and notifications.

use alloy_primitives::Address;

use crate::registry::NetworkConfig;

/// Connection lifecycle of the wallet session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionPhase {
    #[default]
    Disconnected,

    /// An account-access request is outstanding in the wallet.
    Connecting,

    Connected,
}

/// Snapshot of the session as seen by callers.
///
/// Written only by `WalletSession` and `NetworkSession`, either from explicit
/// calls or from provider notifications.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WalletState {
    pub phase: ConnectionPhase,

    /// Active account, when connected.
    pub account: Option<Address>,

    /// Active network. `None` while the wallet sits on a chain outside the
    /// registry.
    pub network: Option<NetworkConfig>,
}

impl WalletState {
    pub fn connected(&self) -> bool {
        self.phase == ConnectionPhase::Connected && self.account.is_some()
    }
}

/// Session notifications published to front-ends.
///
/// Broadcast on a `tokio::sync::broadcast` channel so observers react to
/// state changes without polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected { account: Address },

    AccountChanged { account: Address },

    Disconnected,

    /// Active network changed. `None` means the wallet moved to an
    /// unsupported chain.
    NetworkChanged { network: Option<NetworkConfig> },
}
