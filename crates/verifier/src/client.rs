//! End-to-end verification flow.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use proof::ProofArtifact;
use wallet_core::{NetworkSession, WalletSession};

use crate::contract;
use crate::error::VerificationError;
use crate::verdict::{AgeAttestation, Verdict};

/// Runs proof verification against the active network's contract.
///
/// `verify` walks a fixed sequence of checks and always produces a
/// [`Verdict`]; session errors, provider failures and contract responses
/// are all folded into it. At most one verification is in flight: a
/// concurrent call returns [`Verdict::Busy`] without touching the provider
/// or the stored result.
pub struct VerificationClient {
    wallet: Arc<WalletSession>,
    network: NetworkSession,
    latest: RwLock<Option<Verdict>>,
    in_flight: Mutex<()>,
}

impl VerificationClient {
    pub fn new(wallet: Arc<WalletSession>, network: NetworkSession) -> Self {
        Self {
            wallet,
            network,
            latest: RwLock::new(None),
            in_flight: Mutex::new(()),
        }
    }

    /// The verdict of the most recent completed run, if any.
    ///
    /// Cleared when a new run starts, so readers never see a stale verdict
    /// next to an in-flight verification.
    pub async fn latest(&self) -> Option<Verdict> {
        self.latest.read().await.clone()
    }

    /// Verify a proof artifact against the on-chain verifier.
    ///
    /// Checks run in order, each a potential exit: artifact present, wallet
    /// connected, network supported, contract deployed, artifact
    /// well-formed, call delivered, response understood. The first three
    /// exits happen before any provider traffic.
    pub async fn verify(&self, artifact: Option<&ProofArtifact>) -> Verdict {
        let Ok(_guard) = self.in_flight.try_lock() else {
            return Verdict::Busy;
        };

        *self.latest.write().await = None;
        let verdict = self.run(artifact).await;
        *self.latest.write().await = Some(verdict.clone());
        verdict
    }

    async fn run(&self, artifact: Option<&ProofArtifact>) -> Verdict {
        let Some(artifact) = artifact else {
            return Verdict::MissingArtifact;
        };

        if !self.wallet.state().await.connected() {
            return Verdict::WalletNotConnected;
        }

        let Some(network) = self.network.active().await else {
            return Verdict::UnsupportedNetwork;
        };

        let provider = self.wallet.provider();
        let code = match provider.get_code(network.verifier).await {
            Ok(code) => code,
            Err(err) => {
                warn!(%err, "verifier code probe failed");
                return Verdict::Failed(VerificationError::CodeCheckFailed(err));
            }
        };
        if code.is_empty() {
            warn!(
                chain = network.chain_id,
                address = %network.verifier,
                "no bytecode at the verifier address"
            );
            return Verdict::ContractMissing { local: network.dev };
        }
        debug!(bytes = code.len(), "verifier bytecode present");

        let args = match proof::format(artifact) {
            Ok(args) => args,
            Err(err) => return Verdict::MalformedArtifact(err),
        };

        let response = match provider.call(network.verifier, contract::encode_call(&args)).await {
            Ok(response) => response,
            Err(err) => {
                warn!(%err, "verifier call failed");
                return Verdict::Failed(VerificationError::CallFailed(err));
            }
        };

        match contract::decode_result(&response) {
            Ok(true) => {
                let attestation = AgeAttestation::from_signal(args.input[0]);
                info!(chain = network.chain_id, ?attestation, "proof accepted on-chain");
                Verdict::Verified(attestation)
            }
            Ok(false) => {
                info!(chain = network.chain_id, "proof rejected on-chain");
                Verdict::Rejected
            }
            Err(err) => Verdict::Failed(err),
        }
    }
}
