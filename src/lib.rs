// src/lib.rs
//! Layer-2 Rollup Core - Integration Module
//!
//! The security core of an optimistic Layer-2 rollup:
//! - Bond ledger backing sequencers and challengers
//! - Transaction chain with an anti-censorship message queue
//! - State commitment chain with a fraud-proof window
//! - Fraud prover running the challenge lifecycle
//! - Asset bridge with its own challenge path
//!
//! [`OptimisticRollup`] wires the components together and records every
//! state change in one audit log.

pub mod bond;
pub mod bridge;
pub mod error_handling;
pub mod events;
pub mod finalization;
pub mod fraud_proof_system;
pub mod interfaces;
pub mod rollup;
pub mod sequencer;
pub mod utils;

#[cfg(test)]
mod tests;

pub use bond::{BondManager, BondRole};
pub use bridge::{Bridge, ChallengeAccess};
pub use error_handling::{
    BondError, BridgeError, FraudProofError, Layer2Error, StateCommitmentError,
    TransactionChainError,
};
pub use events::{EventRecord, Layer2Event};
pub use finalization::StateCommitmentChain;
pub use fraud_proof_system::{ChallengeStatus, FraudProver};
pub use interfaces::{Clock, ComponentError, ManualClock};
pub use rollup::{Layer2Config, OptimisticRollup};
pub use sequencer::TransactionChain;
