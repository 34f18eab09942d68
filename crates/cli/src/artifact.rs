//! Proof file loading.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use proof::ProofArtifact;

/// Load a proof artifact, optionally merging a separate `public.json`.
///
/// snarkjs writes the proof and the public signals as two files; some
/// pipelines bundle the signals into the proof document instead. Signals
/// from the second file override any embedded ones.
pub fn load(proof: &Path, public: Option<&Path>) -> Result<ProofArtifact> {
    let raw = fs::read_to_string(proof)
        .with_context(|| format!("reading proof file {}", proof.display()))?;
    let mut artifact = ProofArtifact::from_json(&raw)
        .with_context(|| format!("parsing proof file {}", proof.display()))?;

    if let Some(public) = public {
        let raw = fs::read_to_string(public)
            .with_context(|| format!("reading public signals {}", public.display()))?;
        let signals = proof::parse_public_signals(&raw)
            .with_context(|| format!("parsing public signals {}", public.display()))?;
        artifact = artifact.with_public_signals(signals);
    }

    Ok(artifact)
}
