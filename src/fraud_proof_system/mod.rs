// src/fraud_proof_system/mod.rs
//! Fraud Proof System module for the Layer-2 security core
//!
//! This module integrates the dispute protocol:
//! - Challenge records and their registry
//! - Fraud proof verification
//! - The fraud prover driving the challenge lifecycle

mod challenge;
mod fraud_prover;
mod verification;

pub use challenge::{Challenge, ChallengeRegistry, ChallengeStatus};
pub use fraud_prover::{DisputeContext, FraudProver, FraudProverConfig};
pub use verification::{verify_fraud_proof, FraudProof, ProofVerificationResult};
