//! On-chain Groth16 proof verification.
//!
//! Ties the proof, wallet and network layers together: a
//! [`VerificationClient`] takes a parsed proof artifact, checks the session
//! preconditions, probes for deployed bytecode and issues the read-only
//! `verifyProof` call, folding every outcome into a [`Verdict`].

pub mod client;
pub mod contract;
pub mod error;
pub mod verdict;

pub use client::VerificationClient;
pub use contract::{VERIFY_PROOF_SELECTOR, encode_call};
pub use error::VerificationError;
pub use verdict::{AgeAttestation, Verdict};
