//! Error types for proof artifact formatting.

use std::fmt;

use thiserror::Error;

/// Names one of the four artifact components in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    PiA,
    PiB,
    PiC,
    PublicSignals,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            Component::PiA => "pi_a",
            Component::PiB => "pi_b",
            Component::PiC => "pi_c",
            Component::PublicSignals => "publicSignals",
        };
        f.write_str(key)
    }
}

/// Errors raised while converting a proof artifact into verifier call
/// arguments.
///
/// All of these mean the artifact file is malformed or incomplete; none of
/// them involve the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("proof artifact is missing `{0}`")]
    Missing(Component),

    #[error("`{component}` needs at least {expected} elements, found {found}")]
    TooShort {
        component: Component,
        expected: usize,
        found: usize,
    },

    #[error("`{location}` is not a decimal field element (got {value:?})")]
    InvalidFieldElement { location: String, value: String },

    #[error("expected exactly 1 public signal, found {0}")]
    PublicSignalCount(usize),
}
