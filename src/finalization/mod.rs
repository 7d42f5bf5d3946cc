// src/finalization/mod.rs
//! Finalization module for the Layer-2 security core
//!
//! State roots published by sequencers become final and irreversible after
//! the fraud-proof window, unless a dispute is open against them.

mod state_commitment;

pub use state_commitment::{StateBatch, StateCommitmentChain, StateCommitmentConfig};
