//! CLI runtime configuration.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration required to bootstrap the client.
#[derive(Clone, Debug)]
pub struct CliConfig {
    /// Wallet bridge JSON-RPC endpoint.
    pub rpc_url: String,
    /// Deployed-address book next to the process.
    pub address_book: PathBuf,
    /// Provider polling interval in seconds; `0` disables the watcher.
    pub poll_secs: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            address_book: PathBuf::from("contract-addresses.json"),
            poll_secs: 5,
        }
    }
}

impl CliConfig {
    /// Construct configuration from process environment variables.
    ///
    /// - `AGEGATE_RPC_URL`
    /// - `AGEGATE_ADDRESS_BOOK`
    /// - `AGEGATE_POLL_SECS`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(url) = read_env::<String>("AGEGATE_RPC_URL") {
            config.rpc_url = url;
        }

        if let Some(path) = env::var_os("AGEGATE_ADDRESS_BOOK") {
            config.address_book = PathBuf::from(path);
        }

        if let Some(secs) = read_env::<u64>("AGEGATE_POLL_SECS") {
            config.poll_secs = secs;
        }

        config
    }

    /// Watcher interval, or `None` when polling is disabled.
    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_secs > 0).then(|| Duration::from_secs(self.poll_secs))
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
