// src/rollup/optimistic_rollup.rs
//! Optimistic Rollup facade for the Layer-2 security core
//!
//! [`OptimisticRollup`] owns the five components and plays the part of the
//! host ledger. Each `&mut self` call is one atomic transaction: it reads the
//! trusted clock once, runs against the components, then moves every event
//! they emitted into a single, totally ordered audit log.

use super::config::Layer2Config;
use crate::bond::{BondManager, BondRole};
use crate::bridge::{Bridge, Deposit, WithdrawalRequest};
use crate::error_handling::Layer2Error;
use crate::events::{EventRecord, StampedEvent};
use crate::finalization::{StateBatch, StateCommitmentChain};
use crate::fraud_proof_system::{
    Challenge, ChallengeRegistry, ChallengeStatus, DisputeContext, FraudProver,
};
use crate::interfaces::Clock;
use crate::sequencer::{QueuedMessage, TransactionBatch, TransactionChain};
use borsh::{BorshDeserialize, BorshSerialize};
use log::info;
use solana_program::pubkey::Pubkey;

/// Persistent state of a rollup
#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
pub struct RollupSnapshot {
    pub config: Layer2Config,
    pub owner: Pubkey,
    pub last_timestamp: u64,
    pub next_event_sequence: u64,
    pub bonds: BondManager,
    pub transactions: TransactionChain,
    pub state: StateCommitmentChain,
    pub challenges: ChallengeRegistry,
    pub bridge: Bridge,
}

/// The Optimistic Rollup system
pub struct OptimisticRollup {
    config: Layer2Config,

    owner: Pubkey,

    clock: Box<dyn Clock>,

    /// Time of the most recent call
    last_timestamp: u64,

    bonds: BondManager,

    transactions: TransactionChain,

    state: StateCommitmentChain,

    fraud_prover: FraudProver,

    bridge: Bridge,

    audit_log: Vec<EventRecord>,

    next_event_sequence: u64,
}

impl OptimisticRollup {
    /// Create a rollup; `owner` administers the bridge
    pub fn new(owner: Pubkey, config: Layer2Config, clock: Box<dyn Clock>) -> Result<Self, Layer2Error> {
        config.validate()?;
        let last_timestamp = clock.now();

        info!("Optimistic rollup created, owner {}", owner);
        Ok(Self {
            bonds: BondManager::with_config(config.bond_config()),
            transactions: TransactionChain::with_config(config.transaction_chain_config()),
            state: StateCommitmentChain::with_config(config.state_commitment_config()),
            fraud_prover: FraudProver::with_config(config.fraud_prover_config()),
            bridge: Bridge::with_config(owner, config.bridge_config()),
            config,
            owner,
            clock,
            last_timestamp,
            audit_log: Vec::new(),
            next_event_sequence: 0,
        })
    }

    /// Create a rollup with the default configuration
    pub fn with_defaults(owner: Pubkey, clock: Box<dyn Clock>) -> Result<Self, Layer2Error> {
        Self::new(owner, Layer2Config::default(), clock)
    }

    /// Encode the complete protocol state
    pub fn snapshot(&self) -> Result<Vec<u8>, Layer2Error> {
        RollupSnapshot {
            config: self.config.clone(),
            owner: self.owner,
            last_timestamp: self.last_timestamp,
            next_event_sequence: self.next_event_sequence,
            bonds: self.bonds.clone(),
            transactions: self.transactions.clone(),
            state: self.state.clone(),
            challenges: self.fraud_prover.registry().clone(),
            bridge: self.bridge.clone(),
        }
        .try_to_vec()
        .map_err(|e| Layer2Error::Snapshot(e.to_string()))
    }

    /// Rebuild a rollup from [`OptimisticRollup::snapshot`] output
    ///
    /// The audit log starts empty; sequence numbers carry on where the
    /// snapshot left off.
    pub fn restore(bytes: &[u8], clock: Box<dyn Clock>) -> Result<Self, Layer2Error> {
        let snapshot = RollupSnapshot::try_from_slice(bytes)
            .map_err(|e| Layer2Error::Snapshot(e.to_string()))?;
        snapshot.config.validate()?;

        let now = clock.now();
        if now < snapshot.last_timestamp {
            return Err(Layer2Error::ClockRegression {
                last: snapshot.last_timestamp,
                now,
            });
        }

        info!(
            "Optimistic rollup restored at {}, owner {}",
            snapshot.last_timestamp, snapshot.owner
        );
        Ok(Self {
            fraud_prover: FraudProver::from_registry(
                snapshot.config.fraud_prover_config(),
                snapshot.challenges,
            ),
            config: snapshot.config,
            owner: snapshot.owner,
            clock,
            last_timestamp: snapshot.last_timestamp,
            bonds: snapshot.bonds,
            transactions: snapshot.transactions,
            state: snapshot.state,
            bridge: snapshot.bridge,
            audit_log: Vec::new(),
            next_event_sequence: snapshot.next_event_sequence,
        })
    }

    pub fn config(&self) -> &Layer2Config {
        &self.config
    }

    pub fn owner(&self) -> &Pubkey {
        &self.owner
    }

    pub fn last_timestamp(&self) -> u64 {
        self.last_timestamp
    }

    pub fn bonds(&self) -> &BondManager {
        &self.bonds
    }

    pub fn transaction_chain(&self) -> &TransactionChain {
        &self.transactions
    }

    pub fn state_commitment_chain(&self) -> &StateCommitmentChain {
        &self.state
    }

    pub fn fraud_prover(&self) -> &FraudProver {
        &self.fraud_prover
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    /// Every event recorded since creation or restore
    pub fn audit_log(&self) -> &[EventRecord] {
        &self.audit_log
    }

    pub fn audit_log_json(&self) -> Result<String, Layer2Error> {
        serde_json::to_string(&self.audit_log).map_err(|e| Layer2Error::Snapshot(e.to_string()))
    }

    // Bonds

    pub fn post_sequencer_bond(&mut self, caller: &Pubkey, amount: u64) -> Result<u64, Layer2Error> {
        self.execute(|rollup, _| rollup.bonds.post_sequencer_bond(caller, amount))
    }

    pub fn post_challenger_bond(&mut self, caller: &Pubkey, amount: u64) -> Result<u64, Layer2Error> {
        self.execute(|rollup, _| rollup.bonds.post_challenger_bond(caller, amount))
    }

    /// Queue a bond withdrawal; returns the time it becomes claimable
    pub fn request_bond_withdrawal(
        &mut self,
        caller: &Pubkey,
        role: BondRole,
        amount: u64,
    ) -> Result<u64, Layer2Error> {
        self.execute(|rollup, now| rollup.bonds.request_withdrawal(caller, role, amount, now))
    }

    pub fn finalize_bond_withdrawal(&mut self, caller: &Pubkey, role: BondRole) -> Result<u64, Layer2Error> {
        self.execute(|rollup, now| rollup.bonds.finalize_withdrawal(caller, role, now))
    }

    pub fn sequencer_bond(&self, identity: &Pubkey) -> u64 {
        self.bonds.sequencer_bond(identity)
    }

    pub fn challenger_bond(&self, identity: &Pubkey) -> u64 {
        self.bonds.challenger_bond(identity)
    }

    pub fn is_sequencer(&self, identity: &Pubkey) -> bool {
        self.bonds.is_sequencer(identity)
    }

    pub fn is_sequencer_collateralized(&self, identity: &Pubkey) -> bool {
        self.bonds.is_sequencer_collateralized(identity)
    }

    // Transaction chain

    pub fn append_transaction_batch(
        &mut self,
        caller: &Pubkey,
        content_root: [u8; 32],
        size: u64,
        payload: &[u8],
    ) -> Result<u64, Layer2Error> {
        self.execute(|rollup, now| {
            rollup
                .transactions
                .append_transaction_batch(&rollup.bonds, caller, content_root, size, payload, now)
        })
    }

    pub fn enqueue_transaction(
        &mut self,
        caller: &Pubkey,
        target: &Pubkey,
        compute_budget: u64,
        data: &[u8],
    ) -> Result<u64, Layer2Error> {
        self.execute(|rollup, now| {
            rollup
                .transactions
                .enqueue_transaction(caller, target, compute_budget, data, now)
        })
    }

    pub fn force_include_queued_transactions(&mut self, caller: &Pubkey) -> Result<u64, Layer2Error> {
        self.execute(|rollup, now| rollup.transactions.force_include_queued_transactions(caller, now))
    }

    pub fn get_batch(&self, index: u64) -> Option<&TransactionBatch> {
        self.transactions.get_batch(index)
    }

    pub fn get_queued_transaction(&self, queue_index: u64) -> Option<&QueuedMessage> {
        self.transactions.get_queued_transaction(queue_index)
    }

    pub fn get_queue_length(&self) -> u64 {
        self.transactions.get_queue_length()
    }

    pub fn get_pending_queue_count(&self) -> u64 {
        self.transactions.get_pending_queue_count()
    }

    pub fn get_latest_batch_index(&self) -> Option<u64> {
        self.transactions.get_latest_batch_index()
    }

    pub fn total_elements(&self) -> u64 {
        self.transactions.total_elements()
    }

    // State commitment chain

    pub fn append_state_batch(&mut self, caller: &Pubkey, state_root: [u8; 32]) -> Result<u64, Layer2Error> {
        self.execute(|rollup, now| {
            rollup
                .state
                .append_state_batch(&rollup.bonds, caller, state_root, now)
        })
    }

    pub fn append_state_batches(
        &mut self,
        caller: &Pubkey,
        state_roots: &[[u8; 32]],
    ) -> Result<u64, Layer2Error> {
        self.execute(|rollup, now| {
            rollup
                .state
                .append_state_batches(&rollup.bonds, caller, state_roots, now)
        })
    }

    pub fn finalize_batch(&mut self, index: u64) -> Result<(), Layer2Error> {
        self.execute(|rollup, now| rollup.state.finalize_batch(index, now))
    }

    pub fn get_state_batch(&self, index: u64) -> Option<&StateBatch> {
        self.state.get_state_batch(index)
    }

    /// Whether the batch can still be disputed at the current clock reading
    pub fn is_in_fraud_proof_window(&self, index: u64) -> bool {
        self.state.is_in_fraud_proof_window(index, self.read_clock())
    }

    pub fn is_state_root_finalized(&self, state_root: &[u8; 32]) -> bool {
        self.state.is_state_root_finalized(state_root)
    }

    pub fn total_finalized_batches(&self) -> u64 {
        self.state.total_finalized_batches()
    }

    pub fn next_state_batch_index(&self) -> u64 {
        self.state.next_batch_index()
    }

    // Disputes

    pub fn initiate_challenge(
        &mut self,
        caller: &Pubkey,
        batch_index: u64,
        claimed_correct_root: [u8; 32],
    ) -> Result<u64, Layer2Error> {
        self.execute(|rollup, now| {
            let ctx = DisputeContext {
                state_chain: &mut rollup.state,
                bonds: &mut rollup.bonds,
                transactions: &rollup.transactions,
            };
            rollup
                .fraud_prover
                .initiate_challenge(ctx, caller, batch_index, claimed_correct_root, now)
        })
    }

    pub fn submit_fraud_proof(
        &mut self,
        caller: &Pubkey,
        challenge_id: u64,
        pre_state_root: [u8; 32],
        post_state_root: [u8; 32],
        evidence: &[u8],
    ) -> Result<ChallengeStatus, Layer2Error> {
        self.execute(|rollup, now| {
            let ctx = DisputeContext {
                state_chain: &mut rollup.state,
                bonds: &mut rollup.bonds,
                transactions: &rollup.transactions,
            };
            rollup.fraud_prover.submit_fraud_proof(
                ctx,
                caller,
                challenge_id,
                pre_state_root,
                post_state_root,
                evidence,
                now,
            )
        })
    }

    pub fn resolve_expired_challenge(&mut self, challenge_id: u64) -> Result<ChallengeStatus, Layer2Error> {
        self.execute(|rollup, now| {
            let ctx = DisputeContext {
                state_chain: &mut rollup.state,
                bonds: &mut rollup.bonds,
                transactions: &rollup.transactions,
            };
            rollup
                .fraud_prover
                .resolve_expired_challenge(ctx, challenge_id, now)
        })
    }

    pub fn has_active_challenge(&self, batch_index: u64) -> bool {
        self.fraud_prover.has_active_challenge(batch_index)
    }

    pub fn get_challenge(&self, challenge_id: u64) -> Option<&Challenge> {
        self.fraud_prover.get_challenge(challenge_id)
    }

    pub fn total_challenges(&self) -> u64 {
        self.fraud_prover.total_challenges()
    }

    pub fn total_successful_fraud_proofs(&self) -> u64 {
        self.fraud_prover.total_successful_fraud_proofs()
    }

    // Bridge

    pub fn add_bridge_operator(&mut self, caller: &Pubkey, operator: &Pubkey) -> Result<bool, Layer2Error> {
        self.execute(|rollup, _| rollup.bridge.add_operator(caller, operator))
    }

    pub fn remove_bridge_operator(&mut self, caller: &Pubkey, operator: &Pubkey) -> Result<bool, Layer2Error> {
        self.execute(|rollup, _| rollup.bridge.remove_operator(caller, operator))
    }

    pub fn process_deposit(
        &mut self,
        caller: &Pubkey,
        deposit_id: [u8; 32],
        l1_sender: [u8; 20],
        recipient: &Pubkey,
        amount: u64,
    ) -> Result<(), Layer2Error> {
        self.execute(|rollup, now| {
            rollup
                .bridge
                .process_deposit(caller, deposit_id, l1_sender, recipient, amount, now)
        })
    }

    pub fn finalize_deposit(&mut self, deposit_id: &[u8; 32]) -> Result<(), Layer2Error> {
        self.execute(|rollup, now| rollup.bridge.finalize_deposit(deposit_id, now))
    }

    pub fn challenge_deposit(&mut self, caller: &Pubkey, deposit_id: &[u8; 32]) -> Result<(), Layer2Error> {
        self.execute(|rollup, now| rollup.bridge.challenge_deposit(caller, deposit_id, now))
    }

    pub fn initiate_withdrawal(
        &mut self,
        caller: &Pubkey,
        l1_recipient: [u8; 20],
        amount: u64,
    ) -> Result<u64, Layer2Error> {
        self.execute(|rollup, now| rollup.bridge.initiate_withdrawal(caller, l1_recipient, amount, now))
    }

    pub fn finalize_withdrawal(&mut self, withdrawal_id: u64) -> Result<u64, Layer2Error> {
        self.execute(|rollup, now| rollup.bridge.finalize_withdrawal(withdrawal_id, now))
    }

    pub fn challenge_withdrawal(&mut self, caller: &Pubkey, withdrawal_id: u64) -> Result<(), Layer2Error> {
        self.execute(|rollup, now| rollup.bridge.challenge_withdrawal(caller, withdrawal_id, now))
    }

    pub fn transfer(&mut self, caller: &Pubkey, to: &Pubkey, amount: u64) -> Result<(), Layer2Error> {
        self.execute(|rollup, _| rollup.bridge.transfer(caller, to, amount))
    }

    pub fn reclaim_challenge_bond(&mut self, caller: &Pubkey) -> Result<u64, Layer2Error> {
        self.execute(|rollup, now| rollup.bridge.reclaim_challenge_bond(caller, now))
    }

    pub fn balance_of(&self, identity: &Pubkey) -> u64 {
        self.bridge.balance_of(identity)
    }

    pub fn available_balance(&self, identity: &Pubkey) -> u64 {
        self.bridge.available_balance(identity)
    }

    pub fn get_deposit(&self, deposit_id: &[u8; 32]) -> Option<&Deposit> {
        self.bridge.get_deposit(deposit_id)
    }

    pub fn get_withdrawal(&self, withdrawal_id: u64) -> Option<&WithdrawalRequest> {
        self.bridge.get_withdrawal(withdrawal_id)
    }

    pub fn total_released(&self) -> u64 {
        self.bridge.total_released()
    }

    /// Run one atomic call at the current ledger time
    fn execute<T, E>(
        &mut self,
        operation: impl FnOnce(&mut Self, u64) -> Result<T, E>,
    ) -> Result<T, Layer2Error>
    where
        Layer2Error: From<E>,
    {
        let now = self.tick()?;
        let result = operation(self, now);
        self.collect_events(now);
        result.map_err(Layer2Error::from)
    }

    fn tick(&mut self) -> Result<u64, Layer2Error> {
        let now = self.clock.now();
        if now < self.last_timestamp {
            return Err(Layer2Error::ClockRegression {
                last: self.last_timestamp,
                now,
            });
        }
        self.last_timestamp = now;
        Ok(now)
    }

    fn read_clock(&self) -> u64 {
        self.clock.now().max(self.last_timestamp)
    }

    fn collect_events(&mut self, now: u64) {
        let mut events: Vec<StampedEvent> = Vec::new();
        events.extend(self.bonds.events_mut().drain_stamped());
        events.extend(self.transactions.events_mut().drain_stamped());
        events.extend(self.state.events_mut().drain_stamped());
        events.extend(self.fraud_prover.events_mut().drain_stamped());
        events.extend(self.bridge.events_mut().drain_stamped());
        events.sort_by_key(|stamped| stamped.stamp);

        for StampedEvent { event, .. } in events {
            self.audit_log.push(EventRecord {
                sequence: self.next_event_sequence,
                timestamp: now,
                event,
            });
            self.next_event_sequence += 1;
        }
    }
}
