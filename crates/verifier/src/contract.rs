//! ABI binding for the deployed Groth16 verifier.
//!
//! The contract is generated by the proving pipeline with a fixed entry
//! point: four positional arguments `(pA, pB, pC, pubSignals)` of static
//! size, returning a single `bool`. All arrays are fixed-length, so the
//! calldata is nine head words after the selector with no dynamic tail.

use alloy_primitives::Bytes;
use alloy_sol_types::{SolCall, sol};
use proof::VerifierCallArgs;

use crate::error::VerificationError;

sol! {
    function verifyProof(
        uint256[2] _pA,
        uint256[2][2] _pB,
        uint256[2] _pC,
        uint256[1] _pubSignals
    ) external view returns (bool);
}

/// Four-byte selector of the verifier entry point.
pub const VERIFY_PROOF_SELECTOR: [u8; 4] = verifyProofCall::SELECTOR;

/// ABI-encode a `verifyProof` invocation.
pub fn encode_call(args: &VerifierCallArgs) -> Bytes {
    verifyProofCall {
        _pA: args.a,
        _pB: args.b,
        _pC: args.c,
        _pubSignals: args.input,
    }
    .abi_encode()
    .into()
}

/// Decode the boolean returned by `verifyProof`.
pub fn decode_result(data: &[u8]) -> Result<bool, VerificationError> {
    verifyProofCall::abi_decode_returns(data)
        .map_err(|err| VerificationError::MalformedResponse(err.to_string()))
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;

    use super::*;

    fn sample_args() -> VerifierCallArgs {
        VerifierCallArgs {
            a: [U256::from(1u64), U256::from(2u64)],
            b: [
                [U256::from(4u64), U256::from(3u64)],
                [U256::from(6u64), U256::from(5u64)],
            ],
            c: [U256::from(7u64), U256::from(8u64)],
            input: [U256::from(1u64)],
        }
    }

    fn word(data: &[u8], index: usize) -> U256 {
        let start = 4 + index * 32;
        U256::from_be_slice(&data[start..start + 32])
    }

    #[test]
    fn calldata_is_selector_plus_nine_static_words() {
        let data = encode_call(&sample_args());

        assert_eq!(data.len(), 4 + 9 * 32);
        assert_eq!(&data[..4], VERIFY_PROOF_SELECTOR);
    }

    #[test]
    fn arguments_encode_in_declaration_order() {
        let data = encode_call(&sample_args());

        // a, then b row-major, then c, then the public signal.
        let expected = [1u64, 2, 4, 3, 6, 5, 7, 8, 1];
        for (index, value) in expected.into_iter().enumerate() {
            assert_eq!(word(&data, index), U256::from(value), "word {index}");
        }
    }

    #[test]
    fn boolean_words_decode() {
        let mut accepted = [0u8; 32];
        accepted[31] = 1;
        assert!(decode_result(&accepted).unwrap());

        let rejected = [0u8; 32];
        assert!(!decode_result(&rejected).unwrap());
    }

    #[test]
    fn short_responses_are_malformed() {
        assert!(matches!(
            decode_result(&[]),
            Err(VerificationError::MalformedResponse(_))
        ));
        assert!(matches!(
            decode_result(&[0x01]),
            Err(VerificationError::MalformedResponse(_))
        ));
    }
}
