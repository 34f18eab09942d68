//! Command dispatch and the interactive session.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use verifier::VerificationClient;
use wallet_core::{ConnectionPhase, NetworkRegistry, NetworkSession, SessionEvent, WalletSession};
use wallet_rpc::JsonRpcProvider;

use crate::address_book::AddressBook;
use crate::artifact;
use crate::config::CliConfig;

/// Groth16 age-proof submission client.
#[derive(Parser)]
#[command(name = "agegate")]
#[command(about = "Submit a Groth16 age proof to the on-chain verifier", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Parser)]
pub enum Command {
    /// Connect the wallet
    Connect,

    /// Show wallet, network and last-verdict state
    Status,

    /// List the known networks
    Networks,

    /// Switch the wallet to another network, by chain id or name
    Switch { chain: String },

    /// Override the local verifier address and persist it
    SetLocalVerifier { address: String },

    /// Verify a proof file against the active network's contract
    Verify {
        /// Path to proof.json
        proof: PathBuf,

        /// Separate public.json (overrides signals embedded in the proof)
        public: Option<PathBuf>,
    },
}

/// Live session stack shared by every command.
///
/// Commands run against the same wallet/network sessions, so the interactive
/// mode carries connection state from one command to the next the way a
/// browser tab would.
pub struct App {
    wallet: Arc<WalletSession>,
    network: NetworkSession,
    client: VerificationClient,
    address_book: PathBuf,
}

impl App {
    /// Build the provider and session stack, then apply the saved address
    /// book.
    pub async fn start(config: CliConfig) -> Result<Self> {
        let provider = JsonRpcProvider::new(config.rpc_url.clone());
        match config.poll_interval() {
            Some(interval) => provider.start_watcher(interval),
            None => info!("provider polling disabled"),
        }
        info!(endpoint = %config.rpc_url, "wallet bridge configured");

        let wallet = Arc::new(WalletSession::new(Arc::new(provider)));
        let network = NetworkSession::new(&wallet, NetworkRegistry::builtin());
        wallet.watch_provider(network.clone()).await;

        let app = Self {
            client: VerificationClient::new(Arc::clone(&wallet), network.clone()),
            wallet,
            network,
            address_book: config.address_book,
        };
        app.apply_address_book().await?;
        Ok(app)
    }

    pub async fn run(self, command: Option<Command>) -> Result<()> {
        match command {
            Some(command) => self.execute(command).await,
            None => self.interactive().await,
        }
    }

    /// Apply the persisted dev verifier override, if any.
    ///
    /// Other networks' addresses are fixed at build time; entries for them
    /// are ignored so a shared book written by deploy tooling stays usable.
    async fn apply_address_book(&self) -> Result<()> {
        let book = AddressBook::load(&self.address_book)?;
        for (name, address) in book.entries() {
            if name == AddressBook::DEV_NETWORK {
                match self.network.update_local_verifier(address).await {
                    Ok(config) => {
                        info!(verifier = %config.verifier, "saved local verifier applied");
                    }
                    Err(err) => warn!(%err, "saved local verifier rejected"),
                }
            } else {
                warn!(
                    network = name,
                    "address book entry ignored; only the local network is adjustable at runtime"
                );
            }
        }
        Ok(())
    }

    async fn execute(&self, command: Command) -> Result<()> {
        match command {
            Command::Connect => self.connect().await,
            Command::Status => self.status().await,
            Command::Networks => self.networks().await,
            Command::Switch { chain } => self.switch(&chain).await,
            Command::SetLocalVerifier { address } => self.set_local_verifier(&address).await,
            Command::Verify { proof, public } => self.verify(&proof, public.as_deref()).await,
        }
    }

    async fn connect(&self) -> Result<()> {
        let state = self.wallet.connect().await?;
        if let Some(account) = state.account {
            println!("connected: {account}");
        }
        // An unsupported chain is a normal state here, not a failure.
        match self.network.detect().await {
            Ok(network) => println!("network: {} (chain {})", network.name, network.chain_id),
            Err(err) => println!("network: {err}"),
        }
        Ok(())
    }

    async fn status(&self) -> Result<()> {
        let state = self.wallet.state().await;
        match (state.phase, state.account) {
            (ConnectionPhase::Connected, Some(account)) => {
                println!("wallet: connected ({account})");
            }
            (ConnectionPhase::Connecting, _) => {
                println!("wallet: connecting; approve the request in your wallet");
            }
            _ => println!("wallet: not connected"),
        }

        match self.network.active().await {
            Some(network) => println!(
                "network: {} (chain {}), verifier {}",
                network.name, network.chain_id, network.verifier
            ),
            None => println!("network: none (unsupported or not detected)"),
        }

        if let Some(verdict) = self.client.latest().await {
            println!("last verdict: {verdict}");
        }
        Ok(())
    }

    async fn networks(&self) -> Result<()> {
        let active = self.network.active().await.map(|n| n.chain_id);
        let registry = self.network.registry().await;
        for network in registry.iter() {
            let marker = if active == Some(network.chain_id) { "*" } else { " " };
            let dev = if network.dev { " (dev)" } else { "" };
            println!(
                "{marker} {} [chain {}] verifier {}{dev}",
                network.name, network.chain_id, network.verifier
            );
        }
        Ok(())
    }

    async fn switch(&self, chain: &str) -> Result<()> {
        let registry = self.network.registry().await;
        let target = match chain.parse::<u64>() {
            Ok(id) => registry.lookup(id).cloned(),
            Err(_) => {
                let needle = chain.to_ascii_lowercase();
                registry
                    .iter()
                    .find(|n| n.name.to_ascii_lowercase().starts_with(&needle))
                    .cloned()
            }
        };
        let Some(target) = target else {
            bail!("unknown network `{chain}`; `networks` lists the known ones");
        };

        let network = self.network.switch_to(&target).await?;
        println!("switched to {} (chain {})", network.name, network.chain_id);
        Ok(())
    }

    async fn set_local_verifier(&self, address: &str) -> Result<()> {
        let config = self.network.update_local_verifier(address).await?;
        println!(
            "local verifier: {} on {} (chain {})",
            config.verifier, config.name, config.chain_id
        );

        let mut book = AddressBook::load(&self.address_book)?;
        book.set_dev(config.verifier);
        book.save(&self.address_book)?;
        info!(path = %self.address_book.display(), "address book updated");
        Ok(())
    }

    async fn verify(&self, proof: &Path, public: Option<&Path>) -> Result<()> {
        let artifact = artifact::load(proof, public)?;
        let verdict = self.client.verify(Some(&artifact)).await;
        println!("{verdict}");
        Ok(())
    }

    /// Read-eval loop that keeps the session alive between commands.
    ///
    /// Session events surface as notices between prompts, so an account
    /// revoked or a chain switched in the wallet shows up without polling.
    async fn interactive(&self) -> Result<()> {
        println!("agegate interactive session: `help` lists commands, `quit` leaves");
        let mut events = self.wallet.subscribe();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("agegate> ");
            std::io::stdout().flush()?;

            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("reading stdin")? else {
                        break;
                    };
                    if !self.dispatch(line.trim()).await {
                        break;
                    }
                }
                event = events.recv() => {
                    if let Ok(event) = event {
                        announce(&event);
                    }
                }
            }
        }

        Ok(())
    }

    /// Run one interactive line. Returns `false` to leave the loop.
    async fn dispatch(&self, line: &str) -> bool {
        if line.is_empty() {
            return true;
        }
        if matches!(line, "quit" | "exit") {
            return false;
        }
        if line == "help" {
            print_help();
            return true;
        }

        let words = std::iter::once("agegate").chain(line.split_whitespace());
        match Cli::try_parse_from(words) {
            Ok(Cli {
                command: Some(command),
            }) => {
                if let Err(err) = self.execute(command).await {
                    println!("error: {err:#}");
                }
            }
            Ok(Cli { command: None }) => print_help(),
            Err(err) => println!("{err}"),
        }
        true
    }
}

fn print_help() {
    println!("commands:");
    println!("  connect                            connect the wallet");
    println!("  status                             wallet, network and verdict state");
    println!("  networks                           list the known networks");
    println!("  switch <chain>                     switch network by chain id or name");
    println!("  set-local-verifier <address>       override the local verifier");
    println!("  verify <proof.json> [public.json]  submit a proof");
    println!("  quit                               leave");
}

fn announce(event: &SessionEvent) {
    match event {
        SessionEvent::Connected { account } => println!("\n[wallet] connected: {account}"),
        SessionEvent::AccountChanged { account } => {
            println!("\n[wallet] account changed: {account}");
        }
        SessionEvent::Disconnected => println!("\n[wallet] disconnected"),
        SessionEvent::NetworkChanged {
            network: Some(network),
        } => println!(
            "\n[network] active: {} (chain {})",
            network.name, network.chain_id
        ),
        SessionEvent::NetworkChanged { network: None } => {
            println!("\n[network] active chain is unsupported");
        }
    }
}
