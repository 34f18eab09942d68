//! Chain registry: the networks the verifier contract is deployed on.

use alloy_primitives::{Address, address};

use crate::provider::ChainRegistration;

/// Chain ids of the builtin networks.
pub mod chain {
    pub const SEPOLIA: u64 = 11_155_111;
    pub const GOERLI: u64 = 5;
    pub const LOCALHOST: u64 = 31_337;
}

/// A chain the client can submit proofs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// EIP-155 chain id.
    pub chain_id: u64,

    /// Display name, also sent to the wallet when registering the chain.
    pub name: String,

    /// Verifier contract address on this chain.
    pub verifier: Address,

    /// Public RPC endpoint for chain registration.
    pub rpc_url: String,

    /// Local development network. Only the dev entry's verifier address may
    /// be overridden at runtime.
    pub dev: bool,
}

impl NetworkConfig {
    /// Registration payload for `WalletProvider::add_chain`.
    pub fn registration(&self) -> ChainRegistration {
        ChainRegistration {
            chain_id: self.chain_id,
            name: self.name.clone(),
            rpc_url: self.rpc_url.clone(),
        }
    }
}

/// Immutable snapshot of the supported networks.
///
/// There is no shared mutable table: overriding the local verifier address
/// produces a new snapshot via [`NetworkRegistry::with_local_verifier`], and
/// the session swaps snapshots atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRegistry {
    networks: Vec<NetworkConfig>,
}

impl NetworkRegistry {
    /// The builtin network table.
    ///
    /// The testnet verifier was deployed from the same account and nonce on
    /// both testnets, so it lives at the same address. The localhost entry
    /// defaults to the address the contract lands on in a fresh local node
    /// and is expected to be overridden per deployment.
    pub fn builtin() -> Self {
        Self {
            networks: vec![
                NetworkConfig {
                    chain_id: chain::SEPOLIA,
                    name: "Sepolia".to_string(),
                    verifier: address!("d0450dc112982f5904d3122caeea01d5a8021821"),
                    rpc_url: "https://rpc.sepolia.org".to_string(),
                    dev: false,
                },
                NetworkConfig {
                    chain_id: chain::GOERLI,
                    name: "Goerli".to_string(),
                    verifier: address!("d0450dc112982f5904d3122caeea01d5a8021821"),
                    rpc_url: "https://rpc.ankr.com/eth_goerli".to_string(),
                    dev: false,
                },
                NetworkConfig {
                    chain_id: chain::LOCALHOST,
                    name: "Localhost 8545".to_string(),
                    verifier: address!("9fe46736679d2d9a65f0992f2272de9f3c7fa6e0"),
                    rpc_url: "http://127.0.0.1:8545".to_string(),
                    dev: true,
                },
            ],
        }
    }

    /// Look up a network by chain id.
    pub fn lookup(&self, chain_id: u64) -> Option<&NetworkConfig> {
        self.networks.iter().find(|n| n.chain_id == chain_id)
    }

    /// The designated local development network, if the table has one.
    pub fn dev(&self) -> Option<&NetworkConfig> {
        self.networks.iter().find(|n| n.dev)
    }

    /// All networks, in table order.
    pub fn iter(&self) -> impl Iterator<Item = &NetworkConfig> {
        self.networks.iter()
    }

    /// A new snapshot with the dev entry's verifier address replaced.
    ///
    /// Non-dev entries are never touched. Without a dev entry this returns
    /// an identical snapshot.
    pub fn with_local_verifier(&self, verifier: Address) -> Self {
        let networks = self
            .networks
            .iter()
            .map(|n| {
                if n.dev {
                    NetworkConfig {
                        verifier,
                        ..n.clone()
                    }
                } else {
                    n.clone()
                }
            })
            .collect();

        Self { networks }
    }
}
