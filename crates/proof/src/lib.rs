//! Groth16 proof artifact handling.
//!
//! Models the proof file emitted by the external proving pipeline (snarkjs
//! layout: `pi_a` / `pi_b` / `pi_c` plus `publicSignals`) and converts it
//! into the exact positional argument layout the on-chain verifier expects.
//! Everything here is pure: no I/O, no network, arbitrary-precision integers
//! only.

pub mod artifact;
pub mod calldata;
pub mod error;

pub use artifact::{ProofArtifact, parse_public_signals};
pub use calldata::{PUBLIC_SIGNAL_COUNT, VerifierCallArgs, format};
pub use error::{Component, FormatError};
