//! Conversion of a proof artifact into verifier call arguments.

use alloy_primitives::U256;

use crate::artifact::ProofArtifact;
use crate::error::{Component, FormatError};

/// Number of public signals the circuit exposes (the verifier ABI takes
/// `uint256[1]`).
pub const PUBLIC_SIGNAL_COUNT: usize = 1;

/// The verifier's positional argument layout: `(pA, pB, pC, pubSignals)`.
///
/// Relative to the artifact, `a`/`c` drop the projective third coordinate
/// and each row of `b` has its two coefficients swapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierCallArgs {
    pub a: [U256; 2],
    pub b: [[U256; 2]; 2],
    pub c: [U256; 2],
    pub input: [U256; PUBLIC_SIGNAL_COUNT],
}

/// Convert a proof artifact into the verifier's argument layout.
///
/// Pure and deterministic: the same artifact always yields the same
/// arguments, and no I/O happens here. Callers check the result before
/// touching the network.
///
/// # Errors
///
/// [`FormatError`] when a component is absent, too short, has the wrong
/// public-signal count, or contains a value that is not a decimal
/// 256-bit integer.
pub fn format(artifact: &ProofArtifact) -> Result<VerifierCallArgs, FormatError> {
    let pi_a = require(&artifact.pi_a, Component::PiA)?;
    let pi_b = require(&artifact.pi_b, Component::PiB)?;
    let pi_c = require(&artifact.pi_c, Component::PiC)?;
    let signals = require(&artifact.public_signals, Component::PublicSignals)?;

    require_len(pi_a.len(), 2, Component::PiA)?;
    require_len(pi_c.len(), 2, Component::PiC)?;
    require_len(pi_b.len(), 2, Component::PiB)?;
    for row in pi_b.iter().take(2) {
        require_len(row.len(), 2, Component::PiB)?;
    }
    if signals.len() != PUBLIC_SIGNAL_COUNT {
        return Err(FormatError::PublicSignalCount(signals.len()));
    }

    let a = [
        field_element("pi_a[0]", &pi_a[0])?,
        field_element("pi_a[1]", &pi_a[1])?,
    ];

    // G2 coefficient swap. The proving side emits each extension-field pair
    // in the opposite coefficient order from the verifier's encoding; an
    // unswapped proof fails verification on-chain without reverting.
    let b = [
        [
            field_element("pi_b[0][1]", &pi_b[0][1])?,
            field_element("pi_b[0][0]", &pi_b[0][0])?,
        ],
        [
            field_element("pi_b[1][1]", &pi_b[1][1])?,
            field_element("pi_b[1][0]", &pi_b[1][0])?,
        ],
    ];

    let c = [
        field_element("pi_c[0]", &pi_c[0])?,
        field_element("pi_c[1]", &pi_c[1])?,
    ];

    let input = [field_element("publicSignals[0]", &signals[0])?];

    Ok(VerifierCallArgs { a, b, c, input })
}

fn require<T>(component: &Option<T>, name: Component) -> Result<&T, FormatError> {
    component.as_ref().ok_or(FormatError::Missing(name))
}

fn require_len(found: usize, expected: usize, component: Component) -> Result<(), FormatError> {
    if found < expected {
        return Err(FormatError::TooShort {
            component,
            expected,
            found,
        });
    }
    Ok(())
}

/// Parse one decimal-string field element.
///
/// The artifact grammar is plain ASCII digits only. `from_str_radix` alone
/// is laxer than that (it reads an empty string as zero and allows `_`
/// separators), so the shape is checked first; anything else, including
/// values overflowing 256 bits, is a [`FormatError::InvalidFieldElement`].
/// Floating point never enters this pipeline.
fn field_element(location: &str, value: &str) -> Result<U256, FormatError> {
    let invalid = || FormatError::InvalidFieldElement {
        location: location.to_string(),
        value: value.to_string(),
    };

    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    U256::from_str_radix(value, 10).map_err(|_| invalid())
}
