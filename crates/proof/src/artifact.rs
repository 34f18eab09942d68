//! Proof artifact model.
//!
//! The proving pipeline writes a snarkjs-layout `proof.json`; the public
//! signals either ride along under `publicSignals` or live in a separate
//! `public.json`. Both shapes are accepted here. Every component is optional
//! at the parse layer so that an incomplete file is diagnosed by
//! [`crate::format`] with a precise [`crate::FormatError`] instead of a
//! generic deserialization failure.

use serde::{Deserialize, Serialize};

/// A Groth16 proof artifact as produced by the external proving pipeline.
///
/// All field elements are decimal strings; they are only converted to
/// integers during [`crate::format`]. The third entry of `pi_a`/`pi_c` and
/// the third row of `pi_b` are projective normalizers (conventionally `"1"`)
/// and are dropped during formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofArtifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pi_a: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pi_b: Option<Vec<Vec<String>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pi_c: Option<Vec<String>>,

    #[serde(
        rename = "publicSignals",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub public_signals: Option<Vec<String>>,
}

impl ProofArtifact {
    /// Parse an artifact from a JSON document.
    ///
    /// Unknown keys (snarkjs also emits `protocol` and `curve`) are ignored.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Attach public signals loaded from a separate `public.json`.
    ///
    /// Overrides any signals already present in the artifact.
    pub fn with_public_signals(mut self, signals: Vec<String>) -> Self {
        self.public_signals = Some(signals);
        self
    }
}

/// Parse a standalone `public.json`.
///
/// snarkjs writes an array of decimal strings, but older tooling sometimes
/// emitted a bare value; both are accepted and normalized to a list.
pub fn parse_public_signals(json: &str) -> serde_json::Result<Vec<String>> {
    use serde_json::Value;

    let value: Value = serde_json::from_str(json)?;
    let signals = match value {
        Value::Array(items) => items.into_iter().map(signal_to_string).collect(),
        other => vec![signal_to_string(other)],
    };
    Ok(signals)
}

fn signal_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_snarkjs_document() {
        let json = r#"{
            "pi_a": ["1", "2", "1"],
            "pi_b": [["3", "4"], ["5", "6"], ["1", "0"]],
            "pi_c": ["7", "8", "1"],
            "protocol": "groth16",
            "curve": "bn128",
            "publicSignals": ["1"]
        }"#;

        let artifact = ProofArtifact::from_json(json).unwrap();
        assert_eq!(artifact.pi_a.as_deref().unwrap().len(), 3);
        assert_eq!(artifact.pi_b.as_deref().unwrap().len(), 3);
        assert_eq!(artifact.public_signals.as_deref(), Some(&["1".to_string()][..]));
    }

    #[test]
    fn missing_keys_parse_as_none() {
        let artifact = ProofArtifact::from_json(r#"{"pi_a": ["1", "2", "1"]}"#).unwrap();
        assert!(artifact.pi_a.is_some());
        assert!(artifact.pi_b.is_none());
        assert!(artifact.pi_c.is_none());
        assert!(artifact.public_signals.is_none());
    }

    #[test]
    fn separate_public_signals_override_embedded_ones() {
        let artifact = ProofArtifact::from_json(r#"{"publicSignals": ["0"]}"#)
            .unwrap()
            .with_public_signals(vec!["1".to_string()]);
        assert_eq!(artifact.public_signals.as_deref(), Some(&["1".to_string()][..]));
    }

    #[test]
    fn public_json_accepts_array_and_bare_value() {
        assert_eq!(parse_public_signals(r#"["1"]"#).unwrap(), vec!["1"]);
        assert_eq!(parse_public_signals(r#""1""#).unwrap(), vec!["1"]);
        assert_eq!(parse_public_signals("7").unwrap(), vec!["7"]);
    }
}
