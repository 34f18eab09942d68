//! HTTP JSON-RPC implementation of the wallet provider.

use std::sync::Mutex;
use std::time::Duration;

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info};

use wallet_core::{ChainRegistration, ProviderError, ProviderEvent, WalletProvider};

use crate::transport::{RpcTransport, parse_quantity, refine_unrecognized};

const EVENT_CAPACITY: usize = 16;

/// Wallet provider speaking JSON-RPC 2.0 to a wallet bridge endpoint.
pub struct JsonRpcProvider {
    transport: RpcTransport,
    events: broadcast::Sender<ProviderEvent>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl JsonRpcProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            transport: RpcTransport::new(endpoint.into()),
            events,
            watcher: Mutex::new(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    /// Start polling the bridge for account and chain changes.
    ///
    /// HTTP cannot push notifications, so differences between polls become
    /// [`ProviderEvent`]s. Calling this again replaces the running watcher.
    pub fn start_watcher(&self, interval: Duration) {
        let transport = self.transport.clone();
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            watch_loop(transport, events, interval).await;
        });

        let mut guard = self.watcher.lock().unwrap();
        if let Some(previous) = guard.replace(handle) {
            previous.abort();
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, ProviderError> {
        decode(self.transport.request(method, params).await?)
    }
}

impl Drop for JsonRpcProvider {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.watcher.lock()
            && let Some(handle) = guard.take()
        {
            handle.abort();
        }
    }
}

#[async_trait]
impl WalletProvider for JsonRpcProvider {
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.fetch("eth_accounts", json!([])).await
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.fetch("eth_requestAccounts", json!([])).await
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        let quantity: String = self.fetch("eth_chainId", json!([])).await?;
        parse_quantity(&quantity)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError> {
        match self
            .transport
            .request("wallet_switchEthereumChain", switch_chain_params(chain_id))
            .await
        {
            Ok(_) => Ok(()),
            Err(err) => Err(refine_unrecognized(err, chain_id)),
        }
    }

    async fn add_chain(&self, registration: &ChainRegistration) -> Result<(), ProviderError> {
        self.transport
            .request("wallet_addEthereumChain", add_chain_params(registration))
            .await
            .map(|_| ())
    }

    async fn get_code(&self, address: Address) -> Result<Bytes, ProviderError> {
        self.fetch("eth_getCode", json!([address, "latest"])).await
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError> {
        self.fetch("eth_call", call_params(to, &data)).await
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ProviderError> {
    serde_json::from_value(value)
        .map_err(|err| ProviderError::Transport(format!("malformed response: {err}")))
}

fn switch_chain_params(chain_id: u64) -> Value {
    json!([{ "chainId": format!("0x{chain_id:x}") }])
}

fn add_chain_params(registration: &ChainRegistration) -> Value {
    json!([{
        "chainId": format!("0x{:x}", registration.chain_id),
        "chainName": registration.name,
        "rpcUrls": [registration.rpc_url],
    }])
}

fn call_params(to: Address, data: &Bytes) -> Value {
    json!([{ "to": to, "data": data }, "latest"])
}

/// Poll loop behind [`JsonRpcProvider::start_watcher`].
async fn watch_loop(
    transport: RpcTransport,
    events: broadcast::Sender<ProviderEvent>,
    interval: Duration,
) {
    info!(
        endpoint = transport.endpoint(),
        interval_ms = interval.as_millis() as u64,
        "provider watcher started"
    );

    let mut accounts: Option<Vec<Address>> = None;
    let mut chain: Option<u64> = None;

    loop {
        time::sleep(interval).await;

        match transport
            .request("eth_accounts", json!([]))
            .await
            .and_then(decode::<Vec<Address>>)
        {
            Ok(current) => {
                if let Some(event) = account_change(&mut accounts, current) {
                    let _ = events.send(event);
                }
            }
            Err(err) => debug!(%err, "account poll failed"),
        }

        match transport
            .request("eth_chainId", json!([]))
            .await
            .and_then(decode::<String>)
            .and_then(|quantity| parse_quantity(&quantity))
        {
            Ok(current) => {
                if let Some(event) = chain_change(&mut chain, current) {
                    let _ = events.send(event);
                }
            }
            Err(err) => debug!(%err, "chain poll failed"),
        }
    }
}

/// The first observation only seeds the baseline; a poll must never
/// fabricate a connection the user did not make.
fn account_change(
    previous: &mut Option<Vec<Address>>,
    current: Vec<Address>,
) -> Option<ProviderEvent> {
    match previous.replace(current.clone()) {
        Some(prev) if prev != current => Some(ProviderEvent::AccountsChanged(current)),
        _ => None,
    }
}

fn chain_change(previous: &mut Option<u64>, current: u64) -> Option<ProviderEvent> {
    match previous.replace(current) {
        Some(prev) if prev != current => Some(ProviderEvent::ChainChanged(current)),
        _ => None,
    }
}
