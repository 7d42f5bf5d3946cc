// src/sequencer/transaction_chain.rs
//! Transaction batch chain for the Layer-2 security core
//!
//! This module implements the canonical transaction chain:
//! - Collateralized sequencers append batches of transactions
//! - Anyone may enqueue a message for inclusion
//! - Messages the sequencer ignores for longer than the force-inclusion
//!   period are drained into a batch, either automatically ahead of the
//!   next sequencer batch or by any caller through force inclusion
//!
//! No external party needs sequencer cooperation to get a message on-chain.

use super::message_queue::{message_hash, MessageQueue, QueuedMessage};
use crate::bond::BondManager;
use crate::error_handling::TransactionChainError;
use crate::events::{EventLog, Layer2Event};
use crate::interfaces::TransactionDataSource;
use crate::utils::{hash_bytes, hash_multiple, is_zero_root, short_hex};
use borsh::{BorshDeserialize, BorshSerialize};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use std::ops::Range;

/// Transaction chain configuration
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct TransactionChainConfig {
    /// Maximum number of transactions in a batch
    pub max_batch_size: u64,

    /// Maximum compute budget of an enqueued message
    pub max_enqueue_gas_limit: u64,

    /// Maximum calldata size of an enqueued message (bytes)
    pub max_enqueue_data_size: u64,

    /// Age after which a queued message may be force-included (seconds)
    pub force_inclusion_period: u64,
}

impl Default for TransactionChainConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 1000,
            max_enqueue_gas_limit: 15_000_000,
            max_enqueue_data_size: 50_000,
            force_inclusion_period: 24 * 60 * 60,
        }
    }
}

/// Origin of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum BatchKind {
    /// Submitted by a sequencer
    Sequenced,

    /// Built from stale queue entries
    ForcedInclusion,
}

/// Committed transaction batch
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct TransactionBatch {
    /// Dense index starting at 0
    pub index: u64,

    pub kind: BatchKind,

    /// Root committing to the batch contents
    pub content_root: [u8; 32],

    /// Number of transactions in the batch
    pub size: u64,

    /// Running element count before this batch
    pub cumulative_elements_before: u64,

    pub submitter: Pubkey,

    pub timestamp: u64,

    /// Digest of the calldata posted with the batch
    pub payload_hash: [u8; 32],
}

/// Canonical transaction chain
#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
pub struct TransactionChain {
    config: TransactionChainConfig,

    batches: Vec<TransactionBatch>,

    queue: MessageQueue,

    total_elements: u64,

    #[borsh_skip]
    events: EventLog,
}

/// Forced batch computed ahead of mutation
struct ForcedDrain {
    range: Range<u64>,
    content_root: [u8; 32],
    payload_hash: [u8; 32],
}

impl TransactionChain {
    /// Create a new transaction chain with default configuration
    pub fn new() -> Self {
        Self::with_config(TransactionChainConfig::default())
    }

    /// Create a new transaction chain with the specified configuration
    pub fn with_config(config: TransactionChainConfig) -> Self {
        Self {
            config,
            batches: Vec::new(),
            queue: MessageQueue::new(),
            total_elements: 0,
            events: EventLog::new(),
        }
    }

    pub fn config(&self) -> &TransactionChainConfig {
        &self.config
    }

    /// Append a sequencer batch
    ///
    /// Stale queue entries are first drained into a forced batch so a
    /// censoring sequencer cannot skip them forever. Returns the index of the
    /// caller's batch.
    pub fn append_transaction_batch(
        &mut self,
        bonds: &BondManager,
        caller: &Pubkey,
        content_root: [u8; 32],
        size: u64,
        payload: &[u8],
        now: u64,
    ) -> Result<u64, TransactionChainError> {
        if !bonds.is_sequencer_collateralized(caller) {
            return Err(TransactionChainError::NotCollateralized);
        }
        if is_zero_root(&content_root) {
            return Err(TransactionChainError::InvalidBatchData);
        }
        if size == 0 || size > self.config.max_batch_size {
            return Err(TransactionChainError::BatchSizeTooLarge {
                size,
                max: self.config.max_batch_size,
            });
        }

        let drain = self.plan_drain(now);
        let forced_size = drain.as_ref().map(|d| d.range.end - d.range.start).unwrap_or(0);
        self.total_elements
            .checked_add(forced_size)
            .and_then(|total| total.checked_add(size))
            .ok_or(TransactionChainError::ArithmeticOverflow)?;

        if let Some(drain) = drain {
            debug!(
                "Auto-draining {} stale queue entries ahead of sequencer batch",
                forced_size
            );
            self.commit_drain(caller, drain, now);
        }

        let index = self.push_batch(
            BatchKind::Sequenced,
            content_root,
            size,
            *caller,
            hash_bytes(payload),
            now,
        );

        info!(
            "Transaction batch {} appended by {}: size {}, root {}",
            index,
            caller,
            size,
            short_hex(&content_root)
        );

        Ok(index)
    }

    /// Queue a message for inclusion; open to any caller
    pub fn enqueue_transaction(
        &mut self,
        caller: &Pubkey,
        target: &Pubkey,
        compute_budget: u64,
        data: &[u8],
        now: u64,
    ) -> Result<u64, TransactionChainError> {
        if *target == Pubkey::default() {
            return Err(TransactionChainError::InvalidAddress);
        }
        if compute_budget == 0 || compute_budget > self.config.max_enqueue_gas_limit {
            return Err(TransactionChainError::InvalidGasLimit {
                gas_limit: compute_budget,
                max: self.config.max_enqueue_gas_limit,
            });
        }
        if data.len() as u64 > self.config.max_enqueue_data_size {
            return Err(TransactionChainError::DataTooLarge {
                size: data.len(),
                max: self.config.max_enqueue_data_size as usize,
            });
        }

        let data_hash = message_hash(caller, target, compute_budget, data);
        let queue_index = self.queue.push(*caller, *target, compute_budget, data_hash, now);

        debug!("Transaction enqueued at {} by {}", queue_index, caller);
        self.events.emit(Layer2Event::TransactionEnqueued {
            queue_index,
            sender: *caller,
            target: *target,
            compute_budget,
            data_hash,
        });

        Ok(queue_index)
    }

    /// Drain eligible queue entries into one forced batch
    ///
    /// A forced batch holds at most `max_batch_size` entries; the rest stay
    /// queued for the next drain.
    pub fn force_include_queued_transactions(
        &mut self,
        caller: &Pubkey,
        now: u64,
    ) -> Result<u64, TransactionChainError> {
        let period = self.config.force_inclusion_period;
        let oldest = self
            .queue
            .oldest_pending()
            .ok_or(TransactionChainError::QueueEmpty)?;
        if !oldest.is_force_includable(now, period) {
            return Err(TransactionChainError::ForceInclusionPeriodNotPassed {
                eligible_at: oldest.eligible_at(period),
            });
        }

        let drain = self.plan_drain(now).ok_or(TransactionChainError::QueueEmpty)?;
        let count = drain.range.end - drain.range.start;
        self.total_elements
            .checked_add(count)
            .ok_or(TransactionChainError::ArithmeticOverflow)?;

        let index = self.commit_drain(caller, drain, now);
        info!("Force-included {} queued transactions into batch {}", count, index);

        Ok(index)
    }

    /// Work out the forced batch for the currently eligible entries
    fn plan_drain(&self, now: u64) -> Option<ForcedDrain> {
        let range = self.queue.eligible(
            now,
            self.config.force_inclusion_period,
            self.config.max_batch_size,
        );
        if range.is_empty() {
            return None;
        }

        let hashes: Vec<[u8; 32]> = self
            .queue
            .slice(&range)
            .iter()
            .map(|message| message.data_hash)
            .collect();
        let content_root = hash_multiple(&hashes);
        let payload: Vec<u8> = hashes.iter().flatten().copied().collect();

        Some(ForcedDrain {
            range,
            content_root,
            payload_hash: hash_bytes(&payload),
        })
    }

    fn commit_drain(&mut self, caller: &Pubkey, drain: ForcedDrain, now: u64) -> u64 {
        let size = drain.range.end - drain.range.start;
        let index = self.push_batch(
            BatchKind::ForcedInclusion,
            drain.content_root,
            size,
            *caller,
            drain.payload_hash,
            now,
        );

        for queue_index in drain.range.clone() {
            self.events.emit(Layer2Event::QueuedTransactionIncluded {
                queue_index,
                batch_index: index,
            });
        }
        self.queue.mark_included(drain.range);

        index
    }

    /// Append a batch whose totals have already been checked
    fn push_batch(
        &mut self,
        kind: BatchKind,
        content_root: [u8; 32],
        size: u64,
        submitter: Pubkey,
        payload_hash: [u8; 32],
        now: u64,
    ) -> u64 {
        let index = self.batches.len() as u64;
        let batch = TransactionBatch {
            index,
            kind,
            content_root,
            size,
            cumulative_elements_before: self.total_elements,
            submitter,
            timestamp: now,
            payload_hash,
        };
        self.total_elements += size;

        self.events.emit(Layer2Event::TransactionBatchAppended {
            index,
            kind,
            content_root,
            size,
            cumulative_elements_before: batch.cumulative_elements_before,
            submitter,
            payload_hash,
        });
        self.batches.push(batch);

        index
    }

    pub fn get_batch(&self, index: u64) -> Option<&TransactionBatch> {
        self.batches.get(usize::try_from(index).ok()?)
    }

    pub fn get_queued_transaction(&self, queue_index: u64) -> Option<&QueuedMessage> {
        self.queue.get(queue_index)
    }

    pub fn get_queue_length(&self) -> u64 {
        self.queue.len()
    }

    pub fn get_pending_queue_count(&self) -> u64 {
        self.queue.pending_count()
    }

    pub fn get_latest_batch_index(&self) -> Option<u64> {
        self.next_batch_index().checked_sub(1)
    }

    pub fn next_batch_index(&self) -> u64 {
        self.batches.len() as u64
    }

    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }
}

impl Default for TransactionChain {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionDataSource for TransactionChain {
    fn latest_batch_index(&self) -> Option<u64> {
        self.get_latest_batch_index()
    }

    fn total_elements(&self) -> u64 {
        self.total_elements
    }
}
