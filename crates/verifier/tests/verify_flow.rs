//! End-to-end verification flow against the scripted wallet provider.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, Bytes};
use proof::ProofArtifact;
use verifier::{AgeAttestation, VERIFY_PROOF_SELECTOR, VerificationClient, Verdict};
use wallet_core::{
    MockWalletProvider, NetworkRegistry, NetworkSession, ProviderError, WalletSession, chain,
};

const PROOF_JSON: &str = r#"{
    "pi_a": ["1", "2", "1"],
    "pi_b": [["3", "4"], ["5", "6"], ["1", "0"]],
    "pi_c": ["7", "8", "1"],
    "publicSignals": ["1"]
}"#;

#[tokio::test]
async fn accepted_proof_reports_the_age_attestation() {
    let (provider, network, client) = verifying_stack(chain::SEPOLIA).await;
    let address = network.active().await.expect("active network").verifier;
    provider.set_code(address, deployed_bytecode());
    provider.push_call_result(Ok(bool_word(true)));

    let verdict = client.verify(Some(&artifact())).await;

    assert_eq!(verdict, Verdict::Verified(AgeAttestation::Adult));
    assert!(verdict.is_verified());
    assert_eq!(client.latest().await, Some(verdict));

    // One call, to the resolved verifier, selector-prefixed static calldata.
    let log = provider.call_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].0, address);
    assert!(log[0].1.starts_with(&VERIFY_PROOF_SELECTOR));
    assert_eq!(log[0].1.len(), 4 + 9 * 32);
}

#[tokio::test]
async fn public_signal_decides_the_attestation() {
    let (provider, network, client) = verifying_stack(chain::SEPOLIA).await;
    let address = network.active().await.expect("active network").verifier;
    provider.set_code(address, deployed_bytecode());

    provider.push_call_result(Ok(bool_word(true)));
    let minor = artifact().with_public_signals(vec!["0".to_string()]);
    assert_eq!(
        client.verify(Some(&minor)).await,
        Verdict::Verified(AgeAttestation::Minor)
    );

    provider.push_call_result(Ok(bool_word(true)));
    let odd = artifact().with_public_signals(vec!["5".to_string()]);
    assert_eq!(
        client.verify(Some(&odd)).await,
        Verdict::Verified(AgeAttestation::Unrecognized)
    );
}

#[tokio::test]
async fn contract_rejection_is_proof_invalid() {
    let (provider, network, client) = verifying_stack(chain::SEPOLIA).await;
    let address = network.active().await.expect("active network").verifier;
    provider.set_code(address, deployed_bytecode());
    provider.push_call_result(Ok(bool_word(false)));

    let verdict = client.verify(Some(&artifact())).await;

    assert_eq!(verdict, Verdict::Rejected);
    assert_eq!(verdict.to_string(), "proof invalid");
}

#[tokio::test]
async fn missing_artifact_exits_before_everything_else() {
    // Not connected and no detected network, yet the artifact check wins.
    let provider = MockWalletProvider::new();
    let wallet = Arc::new(WalletSession::new(Arc::new(provider.clone())));
    let network = NetworkSession::new(&wallet, NetworkRegistry::builtin());
    let client = VerificationClient::new(wallet, network);

    let verdict = client.verify(None).await;

    assert_eq!(verdict, Verdict::MissingArtifact);
    assert_eq!(verdict.to_string(), "upload a proof file");
    assert_eq!(provider.calls().get_code, 0);
    assert_eq!(provider.calls().call, 0);
}

#[tokio::test]
async fn disconnected_wallet_is_reported_before_the_network() {
    let provider = MockWalletProvider::new();
    let wallet = Arc::new(WalletSession::new(Arc::new(provider.clone())));
    let network = NetworkSession::new(&wallet, NetworkRegistry::builtin());
    let client = VerificationClient::new(wallet, network);

    let verdict = client.verify(Some(&artifact())).await;

    assert_eq!(verdict, Verdict::WalletNotConnected);
    assert_eq!(provider.calls().get_code, 0);
    assert_eq!(provider.calls().call, 0);
}

#[tokio::test]
async fn unsupported_network_stops_before_any_contract_traffic() {
    let provider = MockWalletProvider::new();
    provider.set_authorized(vec![Address::repeat_byte(0xaa)]);
    provider.set_chain_id(1);
    let wallet = Arc::new(WalletSession::new(Arc::new(provider.clone())));
    let network = NetworkSession::new(&wallet, NetworkRegistry::builtin());
    wallet.connect().await.expect("connect");
    assert!(network.detect().await.is_err());
    let client = VerificationClient::new(wallet, network);

    let verdict = client.verify(Some(&artifact())).await;

    assert_eq!(verdict, Verdict::UnsupportedNetwork);
    assert_eq!(provider.calls().get_code, 0);
    assert_eq!(provider.calls().call, 0);
}

#[tokio::test]
async fn undeployed_contract_distinguishes_the_local_network() {
    // Dev chain with nothing deployed at the verifier address.
    let (provider, _network, client) = verifying_stack(chain::LOCALHOST).await;
    let verdict = client.verify(Some(&artifact())).await;
    assert_eq!(verdict, Verdict::ContractMissing { local: true });
    assert_eq!(verdict.to_string(), "deploy the contract locally");
    assert_eq!(provider.calls().call, 0);

    // Same condition on a public chain reads differently.
    let (provider, _network, client) = verifying_stack(chain::SEPOLIA).await;
    let verdict = client.verify(Some(&artifact())).await;
    assert_eq!(verdict, Verdict::ContractMissing { local: false });
    assert_eq!(verdict.to_string(), "no contract at this address");
    assert_eq!(provider.calls().call, 0);
}

#[tokio::test]
async fn malformed_artifact_never_reaches_the_contract() {
    let (provider, network, client) = verifying_stack(chain::SEPOLIA).await;
    let address = network.active().await.expect("active network").verifier;
    provider.set_code(address, deployed_bytecode());

    let incomplete = ProofArtifact {
        pi_b: None,
        ..artifact()
    };
    let verdict = client.verify(Some(&incomplete)).await;

    assert!(matches!(verdict, Verdict::MalformedArtifact(_)));
    assert!(verdict.to_string().starts_with("invalid proof file"));
    assert_eq!(provider.calls().call, 0);
}

#[tokio::test]
async fn provider_failures_become_verification_errors() {
    let (provider, network, client) = verifying_stack(chain::SEPOLIA).await;
    let address = network.active().await.expect("active network").verifier;

    provider.fail_get_code(ProviderError::Transport("connection refused".to_string()));
    let verdict = client.verify(Some(&artifact())).await;
    assert!(matches!(verdict, Verdict::Failed(_)));
    assert!(verdict.to_string().starts_with("verification failed"));

    provider.set_code(address, deployed_bytecode());
    provider.fail_call(ProviderError::Rpc {
        code: -32000,
        message: "execution reverted".to_string(),
    });
    let verdict = client.verify(Some(&artifact())).await;
    assert!(matches!(verdict, Verdict::Failed(_)));
}

#[tokio::test]
async fn unreadable_response_is_caught() {
    let (provider, network, client) = verifying_stack(chain::SEPOLIA).await;
    let address = network.active().await.expect("active network").verifier;
    provider.set_code(address, deployed_bytecode());
    provider.push_call_result(Ok(Bytes::from(vec![0xde, 0xad])));

    let verdict = client.verify(Some(&artifact())).await;

    assert!(matches!(verdict, Verdict::Failed(_)));
}

#[tokio::test]
async fn concurrent_verify_is_rejected_without_provider_traffic() {
    let (provider, network, client) = verifying_stack(chain::SEPOLIA).await;
    let address = network.active().await.expect("active network").verifier;
    provider.set_code(address, deployed_bytecode());
    provider.push_call_result(Ok(bool_word(true)));
    provider.hold_calls();

    let client = Arc::new(client);
    let first = tokio::spawn({
        let client = Arc::clone(&client);
        async move { client.verify(Some(&artifact())).await }
    });

    // Wait for the first run to park inside the contract call.
    while provider.calls().call == 0 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    let before = provider.calls();
    let verdict = client.verify(Some(&artifact())).await;
    assert_eq!(verdict, Verdict::Busy);
    assert_eq!(verdict.to_string(), "a verification is already running");
    assert_eq!(provider.calls(), before);
    // The busy exit must not disturb the in-flight run's result slot.
    assert_eq!(client.latest().await, None);

    provider.release_calls();
    let settled = first.await.expect("verify task");
    assert_eq!(settled, Verdict::Verified(AgeAttestation::Adult));
    assert_eq!(client.latest().await, Some(settled));
}

fn artifact() -> ProofArtifact {
    ProofArtifact::from_json(PROOF_JSON).expect("reference artifact parses")
}

fn deployed_bytecode() -> Bytes {
    Bytes::from(vec![0x60, 0x80, 0x60, 0x40, 0x52])
}

fn bool_word(value: bool) -> Bytes {
    let mut word = [0u8; 32];
    word[31] = value as u8;
    Bytes::from(word.to_vec())
}

// Connected session on the given chain, with the builtin registry resolved.
async fn verifying_stack(
    chain_id: u64,
) -> (MockWalletProvider, NetworkSession, VerificationClient) {
    let provider = MockWalletProvider::new();
    provider.set_chain_id(chain_id);
    provider.set_authorized(vec![Address::repeat_byte(0xaa)]);

    let wallet = Arc::new(WalletSession::new(Arc::new(provider.clone())));
    let network = NetworkSession::new(&wallet, NetworkRegistry::builtin());
    wallet.connect().await.expect("connect");
    network.detect().await.expect("detect");

    let client = VerificationClient::new(wallet, network.clone());
    (provider, network, client)
}
