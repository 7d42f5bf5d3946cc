// src/fraud_proof_system/verification.rs
//! Verification module for the Fraud Proof System
//!
//! Decides whether a submitted transition proves the disputed root wrong.

use crate::error_handling::FraudProofError;
use crate::utils::hash_bytes;
use borsh::{BorshDeserialize, BorshSerialize};
use std::fmt;

/// Proof of an inconsistent state transition
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct FraudProof {
    /// Root the disputed batch transitions from
    pub pre_state_root: [u8; 32],

    /// Root the transition actually produces
    pub post_state_root: [u8; 32],

    /// Execution evidence for the transition
    pub evidence: Vec<u8>,
}

impl FraudProof {
    pub fn new(pre_state_root: [u8; 32], post_state_root: [u8; 32], evidence: Vec<u8>) -> Self {
        Self {
            pre_state_root,
            post_state_root,
            evidence,
        }
    }

    pub fn evidence_hash(&self) -> [u8; 32] {
        hash_bytes(&self.evidence)
    }
}

/// Result of proof verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofVerificationResult {
    /// The committed root is wrong
    FraudProven,

    /// The transition reproduces the committed root
    NoFraud,
}

impl fmt::Display for ProofVerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofVerificationResult::FraudProven => write!(f, "FraudProven"),
            ProofVerificationResult::NoFraud => write!(f, "NoFraud"),
        }
    }
}

/// Verify a fraud proof against the disputed batch
///
/// `expected_pre_state_root` is the root committed just before the disputed
/// batch. Fraud is proven when, from that pre-state, the transition yields
/// any root other than the committed one. The challenger's original claim
/// plays no part in the verdict.
pub fn verify_fraud_proof(
    proof: &FraudProof,
    expected_pre_state_root: &[u8; 32],
    committed_root: &[u8; 32],
) -> Result<ProofVerificationResult, FraudProofError> {
    if proof.pre_state_root != *expected_pre_state_root {
        return Err(FraudProofError::InvalidPreStateRoot);
    }
    if proof.evidence.is_empty() {
        return Err(FraudProofError::InvalidFraudProof(
            "missing execution evidence".to_string(),
        ));
    }

    if proof.post_state_root == *committed_root {
        Ok(ProofVerificationResult::NoFraud)
    } else {
        Ok(ProofVerificationResult::FraudProven)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRE: [u8; 32] = [1; 32];
    const COMMITTED: [u8; 32] = [2; 32];
    const CLAIMED: [u8; 32] = [3; 32];

    #[test]
    fn test_fraud_proven_when_post_matches_claim() {
        let proof = FraudProof::new(PRE, CLAIMED, b"trace".to_vec());
        assert_eq!(
            verify_fraud_proof(&proof, &PRE, &COMMITTED),
            Ok(ProofVerificationResult::FraudProven)
        );
    }

    #[test]
    fn test_no_fraud_when_post_matches_commitment() {
        let proof = FraudProof::new(PRE, COMMITTED, b"trace".to_vec());
        assert_eq!(
            verify_fraud_proof(&proof, &PRE, &COMMITTED),
            Ok(ProofVerificationResult::NoFraud)
        );
    }

    #[test]
    fn test_rejects_wrong_pre_state() {
        let proof = FraudProof::new([7; 32], CLAIMED, b"trace".to_vec());
        assert_eq!(
            verify_fraud_proof(&proof, &PRE, &COMMITTED),
            Err(FraudProofError::InvalidPreStateRoot)
        );
    }

    #[test]
    fn test_any_divergent_post_state_proves_fraud() {
        let unrelated = FraudProof::new(PRE, [8; 32], b"trace".to_vec());
        assert_eq!(
            verify_fraud_proof(&unrelated, &PRE, &COMMITTED),
            Ok(ProofVerificationResult::FraudProven)
        );
    }

    #[test]
    fn test_rejects_empty_proof() {
        let empty = FraudProof::new(PRE, CLAIMED, Vec::new());
        assert!(matches!(
            verify_fraud_proof(&empty, &PRE, &COMMITTED),
            Err(FraudProofError::InvalidFraudProof(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(ProofVerificationResult::FraudProven.to_string(), "FraudProven");
    }
}
