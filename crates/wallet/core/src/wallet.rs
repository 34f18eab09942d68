//! Wallet connection session.

use std::sync::Arc;

use alloy_primitives::Address;
use tokio::sync::{Mutex, RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::{ProviderError, WalletError};
use crate::network::NetworkSession;
use crate::provider::{ProviderEvent, WalletProvider};
use crate::state::{ConnectionPhase, SessionEvent, WalletState};

const EVENT_CAPACITY: usize = 32;

/// Wallet connection state machine.
///
/// Tracks `Disconnected -> Connecting -> Connected` against an injected
/// provider and publishes [`SessionEvent`]s on every transition. At most one
/// account-access request is outstanding at any time: the `Connecting` phase
/// is claimed inside a single lock section, so a racing second `connect()`
/// is refused before it reaches the provider.
pub struct WalletSession {
    pub(crate) provider: Arc<dyn WalletProvider>,
    pub(crate) state: Arc<RwLock<WalletState>>,
    pub(crate) events: broadcast::Sender<SessionEvent>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl WalletSession {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            provider,
            state: Arc::new(RwLock::new(WalletState::default())),
            events,
            listener: Mutex::new(None),
        }
    }

    /// Current session snapshot.
    pub async fn state(&self) -> WalletState {
        self.state.read().await.clone()
    }

    /// Subscribe to session notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// The injected provider, shared with collaborating components.
    pub fn provider(&self) -> Arc<dyn WalletProvider> {
        Arc::clone(&self.provider)
    }

    /// Connect the wallet.
    ///
    /// An account already authorized for this client is adopted silently;
    /// otherwise the provider prompts the user. While a request is
    /// outstanding (ours or one already open in the wallet), further calls
    /// return [`WalletError::RequestPending`] without touching the provider.
    pub async fn connect(&self) -> Result<WalletState, WalletError> {
        {
            let mut state = self.state.write().await;
            match state.phase {
                ConnectionPhase::Connected if state.account.is_some() => {
                    return Ok(state.clone());
                }
                ConnectionPhase::Connecting => return Err(WalletError::RequestPending),
                _ => state.phase = ConnectionPhase::Connecting,
            }
        }

        // Silent pre-check: adopt an already-authorized account without a prompt.
        match self.provider.accounts().await {
            Ok(accounts) => {
                if let Some(account) = accounts.first().copied() {
                    return Ok(self.finish_connect(account).await);
                }
            }
            Err(err) => return Err(self.fail_connect(err).await),
        }

        match self.provider.request_accounts().await {
            Ok(accounts) => match accounts.first().copied() {
                Some(account) => Ok(self.finish_connect(account).await),
                None => {
                    self.reset_phase().await;
                    Err(WalletError::NoAccounts)
                }
            },
            Err(err) => Err(self.fail_connect(err).await),
        }
    }

    /// Reset the session to `Disconnected`.
    ///
    /// Also the escape hatch when a wallet prompt was dismissed without the
    /// provider ever reporting a resolution.
    pub async fn disconnect(&self) {
        {
            let mut state = self.state.write().await;
            if state.phase == ConnectionPhase::Disconnected {
                return;
            }
            state.phase = ConnectionPhase::Disconnected;
            state.account = None;
        }
        let _ = self.events.send(SessionEvent::Disconnected);
        info!("wallet session reset");
    }

    /// Start handling provider notifications.
    ///
    /// Subscribed once per session: calling this again aborts the previous
    /// listener before spawning the new one, so no event is delivered twice.
    /// Account changes update the session directly; chain changes run the
    /// network session's detection.
    pub async fn watch_provider(&self, network: NetworkSession) {
        let mut guard = self.listener.lock().await;
        if let Some(previous) = guard.take() {
            previous.abort();
        }

        let mut rx = self.provider.subscribe();
        let state = Arc::clone(&self.state);
        let events = self.events.clone();

        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        Self::handle_provider_event(&state, &events, &network, event).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "provider event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        *guard = Some(handle);
    }

    async fn handle_provider_event(
        state: &Arc<RwLock<WalletState>>,
        events: &broadcast::Sender<SessionEvent>,
        network: &NetworkSession,
        event: ProviderEvent,
    ) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.first().copied() {
                Some(account) => {
                    let (was_connected, changed) = {
                        let mut state = state.write().await;
                        let was_connected = state.phase == ConnectionPhase::Connected;
                        let changed = state.account != Some(account);
                        state.phase = ConnectionPhase::Connected;
                        state.account = Some(account);
                        (was_connected, changed)
                    };

                    if !was_connected {
                        info!(%account, "wallet connected");
                        let _ = events.send(SessionEvent::Connected { account });
                    } else if changed {
                        info!(%account, "active account changed");
                        let _ = events.send(SessionEvent::AccountChanged { account });
                    }
                }
                None => {
                    {
                        let mut state = state.write().await;
                        state.phase = ConnectionPhase::Disconnected;
                        state.account = None;
                    }
                    info!("wallet access revoked");
                    let _ = events.send(SessionEvent::Disconnected);
                }
            },
            ProviderEvent::ChainChanged(chain_id) => {
                // Unsupported chains are reported through the session state.
                let _ = network.apply_chain(chain_id).await;
            }
        }
    }

    async fn finish_connect(&self, account: Address) -> WalletState {
        let snapshot = {
            let mut state = self.state.write().await;
            state.phase = ConnectionPhase::Connected;
            state.account = Some(account);
            state.clone()
        };
        info!(%account, "wallet connected");
        let _ = self.events.send(SessionEvent::Connected { account });
        snapshot
    }

    async fn fail_connect(&self, err: ProviderError) -> WalletError {
        match err {
            ProviderError::RequestPending => {
                // The wallet prompt is still open; stay in Connecting so no
                // second request goes out until the provider resolves it.
                warn!("wallet connection request already pending");
                WalletError::RequestPending
            }
            ProviderError::UserRejected => {
                self.reset_phase().await;
                info!("user rejected the connection request");
                WalletError::UserRejected
            }
            ProviderError::Transport(message) => {
                self.reset_phase().await;
                warn!(%message, "wallet provider unreachable");
                WalletError::ProviderUnavailable(message)
            }
            other => {
                self.reset_phase().await;
                WalletError::Provider(other)
            }
        }
    }

    async fn reset_phase(&self) {
        let mut state = self.state.write().await;
        state.phase = ConnectionPhase::Disconnected;
        state.account = None;
    }
}

impl Drop for WalletSession {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.listener.try_lock()
            && let Some(handle) = guard.take()
        {
            handle.abort();
        }
    }
}
