// src/error_handling/mod.rs
//! Error handling for the Layer-2 security core
//!
//! This module provides the per-component error types and the umbrella
//! [`Layer2Error`] used by the rollup facade.

pub mod error_types;

pub use error_types::{
    BondError, BridgeError, FraudProofError, Layer2Error, StateCommitmentError,
    TransactionChainError,
};
