// src/finalization/state_commitment.rs
//! State Commitment chain for the Layer-2 security core
//!
//! Sequencers publish state roots here. A root becomes final only after its
//! fraud-proof window has elapsed without an open dispute, and batches
//! finalize strictly in index order. The fraud prover may roll the chain
//! back to the last known-good root on proven fraud.

use crate::bond::BondManager;
use crate::error_handling::StateCommitmentError;
use crate::events::{EventLog, Layer2Event};
use crate::interfaces::{DisputableStateChain, FraudProverCapability};
use crate::utils::{is_zero_root, short_hex};
use borsh::{BorshDeserialize, BorshSerialize};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use std::collections::BTreeMap;

/// State commitment configuration
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct StateCommitmentConfig {
    /// Delay after submission during which a batch may be disputed (seconds)
    pub fraud_proof_window: u64,

    /// Root that batch 0 transitions from
    pub genesis_state_root: [u8; 32],
}

impl Default for StateCommitmentConfig {
    fn default() -> Self {
        Self {
            fraud_proof_window: 7 * 24 * 60 * 60,
            genesis_state_root: [0; 32],
        }
    }
}

/// Committed state root
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct StateBatch {
    /// Dense index starting at 0
    pub index: u64,

    pub state_root: [u8; 32],

    pub timestamp: u64,

    /// Sequencer answerable for this root
    pub submitter: Pubkey,

    /// Set while a dispute is open
    pub challenged: bool,

    /// One-way
    pub finalized: bool,
}

impl StateBatch {
    /// Earliest time the batch may finalize
    pub fn finalizable_at(&self, fraud_proof_window: u64) -> u64 {
        self.timestamp.saturating_add(fraud_proof_window)
    }
}

/// State commitment chain
#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
pub struct StateCommitmentChain {
    config: StateCommitmentConfig,

    batches: Vec<StateBatch>,

    /// Batch indices by state root, ascending
    root_index: BTreeMap<[u8; 32], Vec<u64>>,

    total_finalized_batches: u64,

    #[borsh_skip]
    events: EventLog,
}

impl StateCommitmentChain {
    /// Create a new state commitment chain with default configuration
    pub fn new() -> Self {
        Self::with_config(StateCommitmentConfig::default())
    }

    /// Create a new state commitment chain with the specified configuration
    pub fn with_config(config: StateCommitmentConfig) -> Self {
        Self {
            config,
            batches: Vec::new(),
            root_index: BTreeMap::new(),
            total_finalized_batches: 0,
            events: EventLog::new(),
        }
    }

    pub fn config(&self) -> &StateCommitmentConfig {
        &self.config
    }

    /// Append one state root
    pub fn append_state_batch(
        &mut self,
        bonds: &BondManager,
        caller: &Pubkey,
        state_root: [u8; 32],
        now: u64,
    ) -> Result<u64, StateCommitmentError> {
        self.append_state_batches(bonds, caller, &[state_root], now)
    }

    /// Append several state roots; returns the index of the first one
    ///
    /// All roots are validated before any is appended.
    pub fn append_state_batches(
        &mut self,
        bonds: &BondManager,
        caller: &Pubkey,
        state_roots: &[[u8; 32]],
        now: u64,
    ) -> Result<u64, StateCommitmentError> {
        if !bonds.is_sequencer_collateralized(caller) {
            return Err(StateCommitmentError::NotCollateralized);
        }
        if state_roots.is_empty() {
            return Err(StateCommitmentError::InvalidBatchData(
                "no state roots".to_string(),
            ));
        }
        if let Some(position) = state_roots.iter().position(is_zero_root) {
            return Err(StateCommitmentError::InvalidBatchData(format!(
                "state root {} is empty",
                position
            )));
        }

        let first = self.next_batch_index();
        for state_root in state_roots {
            let index = self.next_batch_index();
            self.batches.push(StateBatch {
                index,
                state_root: *state_root,
                timestamp: now,
                submitter: *caller,
                challenged: false,
                finalized: false,
            });
            self.root_index.entry(*state_root).or_default().push(index);

            info!(
                "State batch {} appended by {}: root {}",
                index,
                caller,
                short_hex(state_root)
            );
            self.events.emit(Layer2Event::StateBatchAppended {
                index,
                state_root: *state_root,
                submitter: *caller,
            });
        }

        Ok(first)
    }

    /// Finalize a batch whose fraud-proof window has elapsed undisputed
    pub fn finalize_batch(&mut self, index: u64, now: u64) -> Result<(), StateCommitmentError> {
        let window = self.config.fraud_proof_window;
        let batch = self
            .get_state_batch(index)
            .ok_or(StateCommitmentError::UnknownBatch(index))?;

        if batch.finalized {
            return Err(StateCommitmentError::AlreadyFinalized(index));
        }
        if batch.challenged {
            return Err(StateCommitmentError::BatchChallenged(index));
        }
        let finalizable_at = batch.finalizable_at(window);
        if now < finalizable_at {
            return Err(StateCommitmentError::FraudProofWindowNotPassed {
                index,
                finalizable_at,
            });
        }
        if index > 0 && !self.batches[index as usize - 1].finalized {
            return Err(StateCommitmentError::PreviousBatchNotFinalized(index - 1));
        }

        let state_root = batch.state_root;
        self.batches[index as usize].finalized = true;
        self.total_finalized_batches += 1;

        info!("State batch {} finalized: root {}", index, short_hex(&state_root));
        self.events.emit(Layer2Event::StateBatchFinalized { index, state_root });

        Ok(())
    }

    pub fn get_state_batch(&self, index: u64) -> Option<&StateBatch> {
        self.batches.get(usize::try_from(index).ok()?)
    }

    /// Whether the batch can still be disputed
    pub fn is_in_fraud_proof_window(&self, index: u64, now: u64) -> bool {
        self.get_state_batch(index)
            .map(|batch| !batch.finalized && now < batch.finalizable_at(self.config.fraud_proof_window))
            .unwrap_or(false)
    }

    /// Whether some finalized batch carries this root
    pub fn is_state_root_finalized(&self, state_root: &[u8; 32]) -> bool {
        self.root_index
            .get(state_root)
            .map(|indices| {
                indices
                    .iter()
                    .any(|index| self.batches[*index as usize].finalized)
            })
            .unwrap_or(false)
    }

    pub fn total_finalized_batches(&self) -> u64 {
        self.total_finalized_batches
    }

    pub fn next_batch_index(&self) -> u64 {
        self.batches.len() as u64
    }

    pub fn get_latest_batch_index(&self) -> Option<u64> {
        self.next_batch_index().checked_sub(1)
    }

    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }

    fn batch_mut(&mut self, index: u64) -> Result<&mut StateBatch, StateCommitmentError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.batches.get_mut(i))
            .ok_or(StateCommitmentError::UnknownBatch(index))
    }
}

impl Default for StateCommitmentChain {
    fn default() -> Self {
        Self::new()
    }
}

impl DisputableStateChain for StateCommitmentChain {
    fn state_batch(&self, index: u64) -> Option<&StateBatch> {
        self.get_state_batch(index)
    }

    fn previous_state_root(&self, index: u64) -> Option<[u8; 32]> {
        self.get_state_batch(index)?;
        match index {
            0 => Some(self.config.genesis_state_root),
            _ => self.get_state_batch(index - 1).map(|batch| batch.state_root),
        }
    }

    fn is_in_fraud_proof_window(&self, index: u64, now: u64) -> bool {
        StateCommitmentChain::is_in_fraud_proof_window(self, index, now)
    }

    fn mark_challenged(
        &mut self,
        _capability: &FraudProverCapability,
        index: u64,
    ) -> Result<(), StateCommitmentError> {
        let batch = self.batch_mut(index)?;
        if batch.finalized {
            return Err(StateCommitmentError::AlreadyFinalized(index));
        }
        if batch.challenged {
            return Err(StateCommitmentError::BatchChallenged(index));
        }
        batch.challenged = true;
        Ok(())
    }

    fn clear_challenged(
        &mut self,
        _capability: &FraudProverCapability,
        index: u64,
    ) -> Result<(), StateCommitmentError> {
        let batch = self.batch_mut(index)?;
        if !batch.challenged {
            return Err(StateCommitmentError::NotChallenged(index));
        }
        batch.challenged = false;
        Ok(())
    }

    fn delete_from(
        &mut self,
        _capability: &FraudProverCapability,
        index: u64,
        _now: u64,
    ) -> Result<Vec<StateBatch>, StateCommitmentError> {
        let batch = self
            .get_state_batch(index)
            .ok_or(StateCommitmentError::UnknownBatch(index))?;
        // Finalization is sequential, so no later batch can be final either.
        if batch.finalized {
            return Err(StateCommitmentError::AlreadyFinalized(index));
        }

        let deleted = self.batches.split_off(index as usize);
        for removed in &deleted {
            if let Some(indices) = self.root_index.get_mut(&removed.state_root) {
                indices.retain(|i| *i < index);
                if indices.is_empty() {
                    self.root_index.remove(&removed.state_root);
                }
            }
        }

        warn!(
            "State chain rolled back to index {}: {} batches deleted",
            index,
            deleted.len()
        );
        self.events.emit(Layer2Event::StateBatchesDeleted {
            from_index: index,
            count: deleted.len() as u64,
        });

        Ok(deleted)
    }
}
