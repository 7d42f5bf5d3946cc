// src/fraud_proof_system/challenge.rs
//! Challenge records and the registry that tracks them

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use std::collections::BTreeMap;

/// Challenge status
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum ChallengeStatus {
    /// Dispute is open
    Open,

    /// Fraud proven; sequencer slashed and chain rolled back
    Successful,

    /// Fraud disproven or never substantiated; challenger slashed
    Unsuccessful,

    /// Target batch removed by another challenge's rollback; bond refunded
    Voided,
}

/// Dispute against one state batch
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Challenge {
    /// Dense id starting at 0
    pub id: u64,

    pub batch_index: u64,

    pub challenger: Pubkey,

    /// Sequencer that submitted the disputed root
    pub sequencer: Pubkey,

    /// Root the challenger claims is correct
    pub claimed_correct_root: [u8; 32],

    /// Challenger collateral locked for the dispute
    pub bond_locked: u64,

    pub created_at: u64,

    /// Latest transaction batch when the dispute opened
    pub tx_batch_reference: Option<u64>,

    pub status: ChallengeStatus,

    pub resolved_at: Option<u64>,
}

impl Challenge {
    pub fn resolved(&self) -> bool {
        self.status != ChallengeStatus::Open
    }

    pub fn successful(&self) -> bool {
        self.status == ChallengeStatus::Successful
    }

    /// Time after which the dispute may be resolved by expiry
    pub fn resolvable_at(&self, challenge_resolution_period: u64) -> u64 {
        self.created_at.saturating_add(challenge_resolution_period)
    }
}

/// All challenges ever opened, plus the open one per batch
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ChallengeRegistry {
    challenges: Vec<Challenge>,

    /// Batch index -> id of its open challenge
    open_by_batch: BTreeMap<u64, u64>,

    total_successful: u64,
}

impl ChallengeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> u64 {
        self.challenges.len() as u64
    }

    /// Record a new open challenge
    pub fn open(&mut self, challenge: Challenge) {
        debug_assert_eq!(challenge.id, self.next_id());
        debug_assert!(!self.open_by_batch.contains_key(&challenge.batch_index));
        self.open_by_batch.insert(challenge.batch_index, challenge.id);
        self.challenges.push(challenge);
    }

    /// Settle an open challenge
    pub fn close(&mut self, id: u64, status: ChallengeStatus, now: u64) {
        if let Some(challenge) = self.challenges.get_mut(id as usize) {
            challenge.status = status;
            challenge.resolved_at = Some(now);
            self.open_by_batch.remove(&challenge.batch_index);
            if status == ChallengeStatus::Successful {
                self.total_successful += 1;
            }
        }
    }

    pub fn get(&self, id: u64) -> Option<&Challenge> {
        self.challenges.get(usize::try_from(id).ok()?)
    }

    pub fn open_challenge_for(&self, batch_index: u64) -> Option<u64> {
        self.open_by_batch.get(&batch_index).copied()
    }

    /// Open challenges targeting batches after `batch_index`
    pub fn open_after(&self, batch_index: u64) -> Vec<u64> {
        self.open_by_batch
            .range(batch_index.saturating_add(1)..)
            .map(|(_, id)| *id)
            .collect()
    }

    pub fn len(&self) -> u64 {
        self.challenges.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }

    pub fn total_successful(&self) -> u64 {
        self.total_successful
    }
}
