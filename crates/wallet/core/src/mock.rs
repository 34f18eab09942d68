//! Mock wallet provider for testing without a wallet.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use tokio::sync::{broadcast, watch};

use crate::error::ProviderError;
use crate::provider::{ChainRegistration, ProviderEvent, WalletProvider};
use crate::registry::chain;

const EVENT_CAPACITY: usize = 16;

/// Number of times each provider method was invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub accounts: usize,
    pub request_accounts: usize,
    pub chain_id: usize,
    pub switch_chain: usize,
    pub add_chain: usize,
    pub get_code: usize,
    pub call: usize,
}

#[derive(Debug, Default)]
struct Faults {
    accounts: VecDeque<ProviderError>,
    request_accounts: VecDeque<ProviderError>,
    chain_id: VecDeque<ProviderError>,
    switch_chain: VecDeque<ProviderError>,
    add_chain: VecDeque<ProviderError>,
    get_code: VecDeque<ProviderError>,
    call: VecDeque<ProviderError>,
}

struct MockState {
    /// Accounts returned by `accounts` without prompting.
    authorized: Vec<Address>,
    /// Accounts granted when a prompt is approved.
    approval: Vec<Address>,
    chain_id: u64,
    known_chains: HashSet<u64>,
    code: HashMap<Address, Bytes>,
    call_results: VecDeque<Result<Bytes, ProviderError>>,
    call_log: Vec<(Address, Bytes)>,
    faults: Faults,
    calls: CallCounts,
}

/// Scripted in-memory wallet provider.
///
/// Simulates wallet behavior for session and verification tests: per-method
/// call counters, injectable failures, gates that hold account prompts and
/// contract calls open, and manual event emission. Chain switching behaves
/// like a real wallet: switching to a chain outside `known_chains` reports
/// [`ProviderError::UnrecognizedChain`] until the chain is added.
#[derive(Clone)]
pub struct MockWalletProvider {
    inner: Arc<Mutex<MockState>>,
    events: broadcast::Sender<ProviderEvent>,
    hold: Arc<watch::Sender<bool>>,
    call_hold: Arc<watch::Sender<bool>>,
}

impl MockWalletProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (hold, _) = watch::channel(false);
        let (call_hold, _) = watch::channel(false);

        Self {
            inner: Arc::new(Mutex::new(MockState {
                authorized: Vec::new(),
                approval: Vec::new(),
                chain_id: chain::SEPOLIA,
                known_chains: HashSet::from([chain::SEPOLIA, chain::GOERLI]),
                code: HashMap::new(),
                call_results: VecDeque::new(),
                call_log: Vec::new(),
                faults: Faults::default(),
                calls: CallCounts::default(),
            })),
            events,
            hold: Arc::new(hold),
            call_hold: Arc::new(call_hold),
        }
    }

    /// Accounts reported as already authorized.
    pub fn set_authorized(&self, accounts: Vec<Address>) {
        self.inner.lock().unwrap().authorized = accounts;
    }

    /// Accounts granted when the user approves a prompt.
    pub fn set_approval(&self, accounts: Vec<Address>) {
        self.inner.lock().unwrap().approval = accounts;
    }

    /// Put the wallet on `chain_id`. The chain becomes known to the wallet.
    pub fn set_chain_id(&self, chain_id: u64) {
        let mut state = self.inner.lock().unwrap();
        state.chain_id = chain_id;
        state.known_chains.insert(chain_id);
    }

    /// Deployed bytecode reported for `address`.
    pub fn set_code(&self, address: Address, code: Bytes) {
        self.inner.lock().unwrap().code.insert(address, code);
    }

    /// Queue the result of the next contract call.
    pub fn push_call_result(&self, result: Result<Bytes, ProviderError>) {
        self.inner.lock().unwrap().call_results.push_back(result);
    }

    pub fn fail_accounts(&self, error: ProviderError) {
        self.inner.lock().unwrap().faults.accounts.push_back(error);
    }

    pub fn fail_request_accounts(&self, error: ProviderError) {
        let mut state = self.inner.lock().unwrap();
        state.faults.request_accounts.push_back(error);
    }

    pub fn fail_chain_id(&self, error: ProviderError) {
        self.inner.lock().unwrap().faults.chain_id.push_back(error);
    }

    pub fn fail_switch_chain(&self, error: ProviderError) {
        let mut state = self.inner.lock().unwrap();
        state.faults.switch_chain.push_back(error);
    }

    pub fn fail_add_chain(&self, error: ProviderError) {
        self.inner.lock().unwrap().faults.add_chain.push_back(error);
    }

    pub fn fail_get_code(&self, error: ProviderError) {
        self.inner.lock().unwrap().faults.get_code.push_back(error);
    }

    pub fn fail_call(&self, error: ProviderError) {
        self.inner.lock().unwrap().faults.call.push_back(error);
    }

    /// Park every `request_accounts` call until [`release_requests`].
    ///
    /// [`release_requests`]: Self::release_requests
    pub fn hold_requests(&self) {
        self.hold.send_replace(true);
    }

    pub fn release_requests(&self) {
        self.hold.send_replace(false);
    }

    /// Park every contract `call` until [`release_calls`].
    ///
    /// [`release_calls`]: Self::release_calls
    pub fn hold_calls(&self) {
        self.call_hold.send_replace(true);
    }

    pub fn release_calls(&self) {
        self.call_hold.send_replace(false);
    }

    /// Per-method invocation counts.
    pub fn calls(&self) -> CallCounts {
        self.inner.lock().unwrap().calls
    }

    /// Every contract call issued so far, in order.
    pub fn call_log(&self) -> Vec<(Address, Bytes)> {
        self.inner.lock().unwrap().call_log.clone()
    }

    /// Emit a provider notification to all subscribers.
    pub fn emit(&self, event: ProviderEvent) {
        let _ = self.events.send(event);
    }
}

impl Default for MockWalletProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletProvider for MockWalletProvider {
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let mut state = self.inner.lock().unwrap();
        state.calls.accounts += 1;
        if let Some(err) = state.faults.accounts.pop_front() {
            return Err(err);
        }
        Ok(state.authorized.clone())
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        {
            let mut state = self.inner.lock().unwrap();
            state.calls.request_accounts += 1;
        }

        // Park while the harness holds the prompt open. The lock is not held
        // across the await.
        let mut waiting = self.hold.subscribe();
        let _ = waiting.wait_for(|held| !*held).await;

        let mut state = self.inner.lock().unwrap();
        if let Some(err) = state.faults.request_accounts.pop_front() {
            return Err(err);
        }
        state.authorized = state.approval.clone();
        Ok(state.authorized.clone())
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        let mut state = self.inner.lock().unwrap();
        state.calls.chain_id += 1;
        if let Some(err) = state.faults.chain_id.pop_front() {
            return Err(err);
        }
        Ok(state.chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError> {
        let mut state = self.inner.lock().unwrap();
        state.calls.switch_chain += 1;
        if let Some(err) = state.faults.switch_chain.pop_front() {
            return Err(err);
        }
        if !state.known_chains.contains(&chain_id) {
            return Err(ProviderError::UnrecognizedChain(chain_id));
        }
        state.chain_id = chain_id;
        Ok(())
    }

    async fn add_chain(&self, registration: &ChainRegistration) -> Result<(), ProviderError> {
        let mut state = self.inner.lock().unwrap();
        state.calls.add_chain += 1;
        if let Some(err) = state.faults.add_chain.pop_front() {
            return Err(err);
        }
        state.known_chains.insert(registration.chain_id);
        Ok(())
    }

    async fn get_code(&self, address: Address) -> Result<Bytes, ProviderError> {
        let mut state = self.inner.lock().unwrap();
        state.calls.get_code += 1;
        if let Some(err) = state.faults.get_code.pop_front() {
            return Err(err);
        }
        Ok(state.code.get(&address).cloned().unwrap_or_default())
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError> {
        {
            let mut state = self.inner.lock().unwrap();
            state.calls.call += 1;
            state.call_log.push((to, data));
        }

        // Park while the harness holds the call open. The lock is not held
        // across the await.
        let mut waiting = self.call_hold.subscribe();
        let _ = waiting.wait_for(|held| !*held).await;

        let mut state = self.inner.lock().unwrap();
        if let Some(err) = state.faults.call.pop_front() {
            return Err(err);
        }
        state
            .call_results
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Transport("no scripted call result".to_string())))
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}
