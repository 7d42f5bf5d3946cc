// src/tests/finalization_tests.rs
//! Tests for state batch finalization

use super::{test_config, Harness};
use crate::error_handling::{Layer2Error, StateCommitmentError};

#[test]
fn test_batch_finalizes_only_after_window() {
    let mut h = Harness::new();
    let sequencer = h.sequencer;
    let window = test_config().fraud_proof_window;

    h.rollup.append_state_batch(&sequencer, [1; 32]).unwrap();
    assert!(h.rollup.is_in_fraud_proof_window(0));

    h.advance(window - 1);
    assert_eq!(
        h.rollup.finalize_batch(0),
        Err(Layer2Error::StateCommitment(
            StateCommitmentError::FraudProofWindowNotPassed {
                index: 0,
                finalizable_at: super::START + window
            }
        ))
    );
    assert!(!h.rollup.is_state_root_finalized(&[1; 32]));

    h.advance(1);
    h.rollup.finalize_batch(0).unwrap();
    assert!(h.rollup.is_state_root_finalized(&[1; 32]));
    assert!(!h.rollup.is_in_fraud_proof_window(0));
    assert_eq!(
        h.rollup.finalize_batch(0),
        Err(Layer2Error::StateCommitment(StateCommitmentError::AlreadyFinalized(0)))
    );
    assert_eq!(h.rollup.total_finalized_batches(), 1);
}

#[test]
fn test_unknown_batch() {
    let mut h = Harness::new();
    assert_eq!(
        h.rollup.finalize_batch(0),
        Err(Layer2Error::StateCommitment(StateCommitmentError::UnknownBatch(0)))
    );
}

#[test]
fn test_open_challenge_blocks_finalization() {
    let mut h = Harness::new();
    let (sequencer, challenger) = (h.sequencer, h.challenger);
    let config = test_config();

    h.rollup.append_state_batch(&sequencer, [1; 32]).unwrap();
    let id = h.rollup.initiate_challenge(&challenger, 0, [9; 32]).unwrap();

    h.advance(config.fraud_proof_window);
    assert_eq!(
        h.rollup.finalize_batch(0),
        Err(Layer2Error::StateCommitment(StateCommitmentError::BatchChallenged(0)))
    );

    // The challenge outlives the window; once it fails the batch can finalize.
    h.advance(config.challenge_resolution_period);
    h.rollup.resolve_expired_challenge(id).unwrap();
    h.rollup.finalize_batch(0).unwrap();
    assert_eq!(h.rollup.total_finalized_batches(), 1);
}

#[test]
fn test_batches_finalize_in_order() {
    let mut h = Harness::new();
    let sequencer = h.sequencer;

    h.rollup.append_state_batches(&sequencer, &[[1; 32], [2; 32]]).unwrap();
    h.advance(test_config().fraud_proof_window);

    assert_eq!(
        h.rollup.finalize_batch(1),
        Err(Layer2Error::StateCommitment(StateCommitmentError::PreviousBatchNotFinalized(0)))
    );
    h.rollup.finalize_batch(0).unwrap();
    h.rollup.finalize_batch(1).unwrap();
    assert_eq!(h.rollup.total_finalized_batches(), 2);
}

#[test]
fn test_finalization_safety_over_time() {
    let mut h = Harness::new();
    let sequencer = h.sequencer;
    let window = test_config().fraud_proof_window;

    for round in 0..5u8 {
        h.rollup.append_state_batch(&sequencer, [round + 1; 32]).unwrap();
        h.advance(window / 4);
    }

    for index in 0..5u64 {
        let batch = h.rollup.get_state_batch(index).unwrap().clone();
        let result = h.rollup.finalize_batch(index);
        let now = h.rollup.last_timestamp();
        if now < batch.timestamp + window {
            assert!(result.is_err());
            assert!(!h.rollup.get_state_batch(index).unwrap().finalized);
        } else {
            assert!(result.is_ok());
        }
    }
    // Batches 0 and 1 are old enough; 2..5 are not.
    assert_eq!(h.rollup.total_finalized_batches(), 2);
}
