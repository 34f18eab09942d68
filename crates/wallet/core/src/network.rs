//! Network session: chain detection, switching, and the local override.

use std::sync::Arc;

use alloy_primitives::Address;
use tokio::sync::{RwLock, broadcast};
use tracing::{info, warn};

use crate::error::{NetworkError, ProviderError};
use crate::provider::WalletProvider;
use crate::registry::{NetworkConfig, NetworkRegistry};
use crate::state::{SessionEvent, WalletState};
use crate::wallet::WalletSession;

/// Chain-level companion to [`WalletSession`].
///
/// Shares the wallet session's state and event channel and owns the registry
/// snapshot. Cheap to clone; clones observe the same session.
#[derive(Clone)]
pub struct NetworkSession {
    provider: Arc<dyn WalletProvider>,
    state: Arc<RwLock<WalletState>>,
    events: broadcast::Sender<SessionEvent>,
    registry: Arc<RwLock<NetworkRegistry>>,
}

impl NetworkSession {
    pub fn new(wallet: &WalletSession, registry: NetworkRegistry) -> Self {
        Self {
            provider: Arc::clone(&wallet.provider),
            state: Arc::clone(&wallet.state),
            events: wallet.events.clone(),
            registry: Arc::new(RwLock::new(registry)),
        }
    }

    /// Current registry snapshot.
    pub async fn registry(&self) -> NetworkRegistry {
        self.registry.read().await.clone()
    }

    /// Active network, when the wallet sits on a supported chain.
    pub async fn active(&self) -> Option<NetworkConfig> {
        self.state.read().await.network.clone()
    }

    /// Query the wallet's current chain and resolve it against the registry.
    ///
    /// A supported chain becomes the active network; an unsupported one
    /// clears it and returns [`NetworkError::UnsupportedChain`]. The registry
    /// itself, including any local override, is never modified here.
    pub async fn detect(&self) -> Result<NetworkConfig, NetworkError> {
        let chain_id = self.provider.chain_id().await?;
        self.apply_chain(chain_id).await
    }

    /// Resolve a known chain id and update the active network.
    ///
    /// Shared by [`detect`](Self::detect), the post-switch update, and the
    /// provider's chain-change notifications.
    pub(crate) async fn apply_chain(&self, chain_id: u64) -> Result<NetworkConfig, NetworkError> {
        let resolved = self.registry.read().await.lookup(chain_id).cloned();

        match resolved {
            Some(config) => {
                let changed = {
                    let mut state = self.state.write().await;
                    let changed = state.network.as_ref() != Some(&config);
                    state.network = Some(config.clone());
                    changed
                };
                if changed {
                    info!(chain_id, network = %config.name, "active network set");
                    let _ = self.events.send(SessionEvent::NetworkChanged {
                        network: Some(config.clone()),
                    });
                }
                Ok(config)
            }
            None => {
                let changed = {
                    let mut state = self.state.write().await;
                    let changed = state.network.is_some();
                    state.network = None;
                    changed
                };
                warn!(chain_id, "wallet is on an unsupported chain");
                if changed {
                    let _ = self
                        .events
                        .send(SessionEvent::NetworkChanged { network: None });
                }
                Err(NetworkError::UnsupportedChain(chain_id))
            }
        }
    }

    /// Ask the wallet to move to `target`.
    ///
    /// Always performs the provider round trip, even when `target` is
    /// already active. When the wallet does not recognize the chain, the
    /// chain is registered from the config and the switch retried exactly
    /// once; any further failure is terminal for this call.
    pub async fn switch_to(&self, target: &NetworkConfig) -> Result<NetworkConfig, NetworkError> {
        match self.provider.switch_chain(target.chain_id).await {
            Ok(()) => {}
            Err(ProviderError::UnrecognizedChain(_)) => {
                info!(chain_id = target.chain_id, network = %target.name, "registering chain with the wallet");
                self.provider
                    .add_chain(&target.registration())
                    .await
                    .map_err(|err| NetworkError::RegistrationFailed(err.to_string()))?;
                self.provider
                    .switch_chain(target.chain_id)
                    .await
                    .map_err(|err| NetworkError::SwitchFailed(err.to_string()))?;
            }
            Err(err) => return Err(NetworkError::SwitchFailed(err.to_string())),
        }

        self.apply_chain(target.chain_id).await
    }

    /// Override the local network's verifier contract address.
    ///
    /// The candidate must be a well-formed account address; on success a new
    /// registry snapshot is installed and the returned config reflects the
    /// override. Rejected candidates leave every snapshot untouched.
    pub async fn update_local_verifier(
        &self,
        candidate: &str,
    ) -> Result<NetworkConfig, NetworkError> {
        let verifier: Address = candidate
            .parse()
            .map_err(|_| NetworkError::InvalidAddress(candidate.to_string()))?;

        let config = {
            let mut registry = self.registry.write().await;
            let updated = registry.with_local_verifier(verifier);
            let config = updated
                .dev()
                .cloned()
                .ok_or(NetworkError::NoLocalNetwork)?;
            *registry = updated;
            config
        };

        // An already-active dev network picks the override up immediately.
        let refreshed = {
            let mut state = self.state.write().await;
            if state
                .network
                .as_ref()
                .is_some_and(|n| n.chain_id == config.chain_id && *n != config)
            {
                state.network = Some(config.clone());
                true
            } else {
                false
            }
        };
        if refreshed {
            let _ = self.events.send(SessionEvent::NetworkChanged {
                network: Some(config.clone()),
            });
        }

        info!(%verifier, "local verifier address overridden");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockWalletProvider;
    use crate::registry::chain;

    const OVERRIDE: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

    fn session_pair(provider: Arc<MockWalletProvider>) -> (WalletSession, NetworkSession) {
        let wallet = WalletSession::new(provider);
        let network = NetworkSession::new(&wallet, NetworkRegistry::builtin());
        (wallet, network)
    }

    #[tokio::test]
    async fn detect_resolves_a_supported_chain() {
        let provider = Arc::new(MockWalletProvider::new());
        provider.set_chain_id(chain::SEPOLIA);
        let (_wallet, network) = session_pair(provider);

        let config = network.detect().await.unwrap();

        assert_eq!(config.chain_id, chain::SEPOLIA);
        assert_eq!(network.active().await.unwrap().name, "Sepolia");
    }

    #[tokio::test]
    async fn detect_unsupported_chain_clears_active_but_keeps_override() {
        let provider = Arc::new(MockWalletProvider::new());
        provider.set_chain_id(chain::LOCALHOST);
        let (_wallet, network) = session_pair(provider.clone());

        network.detect().await.unwrap();
        network.update_local_verifier(OVERRIDE).await.unwrap();

        provider.set_chain_id(1);
        let err = network.detect().await.unwrap_err();

        assert!(matches!(err, NetworkError::UnsupportedChain(1)));
        assert!(network.active().await.is_none());
        // The override survives wandering onto an unsupported chain.
        assert_eq!(
            network.registry().await.dev().unwrap().verifier,
            OVERRIDE.parse::<Address>().unwrap()
        );
    }

    #[tokio::test]
    async fn detect_propagates_provider_failure() {
        let provider = Arc::new(MockWalletProvider::new());
        provider.fail_chain_id(ProviderError::Transport("down".to_string()));
        let (_wallet, network) = session_pair(provider);

        let err = network.detect().await.unwrap_err();
        assert!(matches!(err, NetworkError::Provider(_)));
    }

    #[tokio::test]
    async fn switching_to_the_active_chain_still_round_trips() {
        let provider = Arc::new(MockWalletProvider::new());
        provider.set_chain_id(chain::SEPOLIA);
        let (_wallet, network) = session_pair(provider.clone());
        let target = network.registry().await.lookup(chain::SEPOLIA).cloned().unwrap();

        let config = network.switch_to(&target).await.unwrap();

        assert_eq!(config.chain_id, chain::SEPOLIA);
        assert_eq!(provider.calls().switch_chain, 1);
    }

    #[tokio::test]
    async fn switch_registers_an_unrecognized_chain_and_retries_once() {
        let provider = Arc::new(MockWalletProvider::new());
        let (_wallet, network) = session_pair(provider.clone());
        // Localhost is not among the mock wallet's known chains.
        let target = network.registry().await.dev().cloned().unwrap();

        let config = network.switch_to(&target).await.unwrap();

        assert_eq!(config.chain_id, chain::LOCALHOST);
        assert_eq!(provider.calls().switch_chain, 2);
        assert_eq!(provider.calls().add_chain, 1);
        assert_eq!(network.active().await.unwrap().chain_id, chain::LOCALHOST);
    }

    #[tokio::test]
    async fn unrecognized_chain_after_registration_is_terminal() {
        let provider = Arc::new(MockWalletProvider::new());
        provider.fail_switch_chain(ProviderError::UnrecognizedChain(chain::LOCALHOST));
        provider.fail_switch_chain(ProviderError::UnrecognizedChain(chain::LOCALHOST));
        let (_wallet, network) = session_pair(provider.clone());
        let target = network.registry().await.dev().cloned().unwrap();

        let err = network.switch_to(&target).await.unwrap_err();

        assert!(matches!(err, NetworkError::SwitchFailed(_)));
        // Registered once, retried once, no further attempts.
        assert_eq!(provider.calls().add_chain, 1);
        assert_eq!(provider.calls().switch_chain, 2);
    }

    #[tokio::test]
    async fn registration_failure_surfaces() {
        let provider = Arc::new(MockWalletProvider::new());
        provider.fail_add_chain(ProviderError::UserRejected);
        let (_wallet, network) = session_pair(provider.clone());
        let target = network.registry().await.dev().cloned().unwrap();

        let err = network.switch_to(&target).await.unwrap_err();

        assert!(matches!(err, NetworkError::RegistrationFailed(_)));
        assert_eq!(provider.calls().switch_chain, 1);
    }

    #[tokio::test]
    async fn declined_switch_is_switch_failed() {
        let provider = Arc::new(MockWalletProvider::new());
        provider.fail_switch_chain(ProviderError::UserRejected);
        let (_wallet, network) = session_pair(provider);
        let target = NetworkRegistry::builtin().lookup(chain::SEPOLIA).cloned().unwrap();

        let err = network.switch_to(&target).await.unwrap_err();
        assert!(matches!(err, NetworkError::SwitchFailed(_)));
    }

    #[tokio::test]
    async fn malformed_override_is_rejected_without_mutation() {
        let provider = Arc::new(MockWalletProvider::new());
        let (_wallet, network) = session_pair(provider);
        let before = network.registry().await;

        for candidate in ["florp", "0x1234", ""] {
            let err = network.update_local_verifier(candidate).await.unwrap_err();
            assert!(matches!(err, NetworkError::InvalidAddress(_)));
        }

        assert_eq!(network.registry().await, before);
    }

    #[tokio::test]
    async fn valid_override_installs_a_new_snapshot() {
        let provider = Arc::new(MockWalletProvider::new());
        let (_wallet, network) = session_pair(provider);
        let before = network.registry().await;

        let config = network.update_local_verifier(OVERRIDE).await.unwrap();

        assert_eq!(config.verifier, OVERRIDE.parse::<Address>().unwrap());
        assert_eq!(
            network.registry().await.lookup(chain::SEPOLIA),
            before.lookup(chain::SEPOLIA)
        );
    }

    #[tokio::test]
    async fn active_dev_network_picks_the_override_up() {
        let provider = Arc::new(MockWalletProvider::new());
        provider.set_chain_id(chain::LOCALHOST);
        let (wallet, network) = session_pair(provider);
        network.detect().await.unwrap();
        let mut rx = wallet.subscribe();

        network.update_local_verifier(OVERRIDE).await.unwrap();

        assert_eq!(
            network.active().await.unwrap().verifier,
            OVERRIDE.parse::<Address>().unwrap()
        );
        match rx.recv().await.unwrap() {
            SessionEvent::NetworkChanged {
                network: Some(config),
            } => assert_eq!(config.verifier, OVERRIDE.parse::<Address>().unwrap()),
            other => panic!("expected network change, got {other:?}"),
        }
    }
}
