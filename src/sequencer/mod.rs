// src/sequencer/mod.rs
//! Transaction sequencing for the Layer-2 security core
//!
//! This module contains the canonical transaction chain and the inbound
//! message queue that backs its force-inclusion guarantee.

mod message_queue;
mod transaction_chain;

pub use message_queue::{message_hash, MessageQueue, QueuedMessage};
pub use transaction_chain::{BatchKind, TransactionBatch, TransactionChain, TransactionChainConfig};
