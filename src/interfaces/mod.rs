// src/interfaces/mod.rs
//! Interfaces module for the Layer-2 security core
//!
//! Shared traits at the seams between components: error reporting, the
//! ledger clock, and the privileged dispute-protocol entry points.

mod component_interface;
mod fraud_proof_interface;

pub use component_interface::*;
pub use fraud_proof_interface::*;
