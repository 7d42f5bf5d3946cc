// src/rollup/mod.rs
//! Rollup module for the Layer-2 security core
//!
//! This module composes the bond ledger, both chains, the fraud prover and
//! the bridge into one serialized state machine, together with the
//! configuration that parameterizes them.

mod config;
mod optimistic_rollup;

pub use config::Layer2Config;
pub use optimistic_rollup::{OptimisticRollup, RollupSnapshot};
