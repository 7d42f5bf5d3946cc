// src/events/mod.rs
//! Audit events emitted by every state-mutating call
//!
//! Components push [`Layer2Event`]s into their own [`EventLog`]; the rollup
//! facade drains them after each call into one totally ordered list of
//! [`EventRecord`]s. That list is the only history observable beyond
//! current-state reads.
//!
//! Every emit takes a stamp from one process-wide counter, so merging the
//! per-component logs by stamp reproduces the order the events happened in.

use crate::bond::BondRole;
use crate::fraud_proof_system::ChallengeStatus;
use crate::sequencer::BatchKind;
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of emission stamps shared by every [`EventLog`]
static EMISSION_STAMP: AtomicU64 = AtomicU64::new(0);

/// Structured audit event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layer2Event {
    BondPosted {
        identity: Pubkey,
        role: BondRole,
        amount: u64,
        principal: u64,
    },
    BondWithdrawalRequested {
        identity: Pubkey,
        role: BondRole,
        amount: u64,
        ready_at: u64,
    },
    BondWithdrawn {
        identity: Pubkey,
        role: BondRole,
        amount: u64,
        principal: u64,
    },
    BondSlashed {
        identity: Pubkey,
        role: BondRole,
        amount: u64,
        beneficiary: Pubkey,
        beneficiary_share: u64,
        cancelled_withdrawal: Option<u64>,
    },
    ChallengerBondLocked {
        challenger: Pubkey,
        amount: u64,
    },
    ChallengerBondReleased {
        challenger: Pubkey,
        amount: u64,
    },
    TransactionEnqueued {
        queue_index: u64,
        sender: Pubkey,
        target: Pubkey,
        compute_budget: u64,
        data_hash: [u8; 32],
    },
    TransactionBatchAppended {
        index: u64,
        kind: BatchKind,
        content_root: [u8; 32],
        size: u64,
        cumulative_elements_before: u64,
        submitter: Pubkey,
        payload_hash: [u8; 32],
    },
    QueuedTransactionIncluded {
        queue_index: u64,
        batch_index: u64,
    },
    StateBatchAppended {
        index: u64,
        state_root: [u8; 32],
        submitter: Pubkey,
    },
    StateBatchFinalized {
        index: u64,
        state_root: [u8; 32],
    },
    StateBatchesDeleted {
        from_index: u64,
        count: u64,
    },
    ChallengeInitiated {
        challenge_id: u64,
        batch_index: u64,
        challenger: Pubkey,
        claimed_correct_root: [u8; 32],
        bond_locked: u64,
    },
    ChallengeResolved {
        challenge_id: u64,
        batch_index: u64,
        status: ChallengeStatus,
        sequencer_slashed: u64,
        challenger_reward: u64,
        challenger_forfeited: u64,
    },
    OperatorUpdated {
        operator: Pubkey,
        enabled: bool,
    },
    DepositProcessed {
        deposit_id: [u8; 32],
        l1_sender: [u8; 20],
        recipient: Pubkey,
        amount: u64,
    },
    DepositChallenged {
        deposit_id: [u8; 32],
        challenger: Pubkey,
        reversed: u64,
    },
    DepositFinalized {
        deposit_id: [u8; 32],
    },
    WithdrawalInitiated {
        withdrawal_id: u64,
        owner: Pubkey,
        l1_recipient: [u8; 20],
        amount: u64,
    },
    WithdrawalChallenged {
        withdrawal_id: u64,
        challenger: Pubkey,
        refunded: u64,
    },
    WithdrawalFinalized {
        withdrawal_id: u64,
        l1_recipient: [u8; 20],
        amount: u64,
    },
    ChallengeBondEscrowed {
        challenger: Pubkey,
        amount: u64,
        unlock_at: u64,
    },
    ChallengeBondReclaimed {
        challenger: Pubkey,
        amount: u64,
    },
    Transfer {
        from: Pubkey,
        to: Pubkey,
        amount: u64,
    },
}

/// Event tagged with its emission stamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampedEvent {
    pub stamp: u64,
    pub event: Layer2Event,
}

/// Append-only event buffer owned by a component
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<StampedEvent>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event
    pub fn emit(&mut self, event: Layer2Event) {
        let stamp = EMISSION_STAMP.fetch_add(1, Ordering::Relaxed);
        log::trace!("event {}: {:?}", stamp, event);
        self.events.push(StampedEvent { stamp, event });
    }

    /// Take every buffered event with its stamp, oldest first
    pub fn drain_stamped(&mut self) -> Vec<StampedEvent> {
        std::mem::take(&mut self.events)
    }

    /// Take every buffered event, oldest first
    pub fn drain(&mut self) -> Vec<Layer2Event> {
        self.drain_stamped()
            .into_iter()
            .map(|stamped| stamped.event)
            .collect()
    }

    /// Buffered events
    pub fn events(&self) -> impl Iterator<Item = &Layer2Event> {
        self.events.iter().map(|stamped| &stamped.event)
    }

    /// Most recent event
    pub fn last(&self) -> Option<&Layer2Event> {
        self.events.last().map(|stamped| &stamped.event)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Event stamped with its position in the global order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Dense sequence number, starting at 0
    pub sequence: u64,

    /// Ledger time of the call that produced the event
    pub timestamp: u64,

    pub event: Layer2Event,
}
