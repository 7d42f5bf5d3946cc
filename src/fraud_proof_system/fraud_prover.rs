// src/fraud_proof_system/fraud_prover.rs
//! Fraud prover: the challenge lifecycle for state batches
//!
//! Per disputed batch the lifecycle is
//! `None -> Open -> Successful | Unsuccessful`:
//! - a bonded challenger opens a dispute inside the fraud-proof window
//! - the challenger proves fraud, or the proof disproves it
//! - a dispute left without proof past the resolution period fails
//!
//! Proven fraud slashes the sequencer, rewards and refunds the challenger and
//! rolls the state chain back to the last known-good root. Any other outcome
//! forfeits the challenger's bond and leaves the batch intact.

use super::challenge::{Challenge, ChallengeRegistry, ChallengeStatus};
use super::verification::{verify_fraud_proof, FraudProof, ProofVerificationResult};
use crate::bond::BondRole;
use crate::error_handling::FraudProofError;
use crate::events::{EventLog, Layer2Event};
use crate::interfaces::{
    DisputableStateChain, FraudProverCapability, SlashableCollateral, TransactionDataSource,
};
use crate::utils::{is_zero_root, short_hex};
use borsh::{BorshDeserialize, BorshSerialize};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

/// Fraud prover configuration
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct FraudProverConfig {
    /// Challenger collateral locked per dispute
    pub min_challenger_bond: u64,

    /// Time a challenger has to submit its proof (seconds)
    pub challenge_resolution_period: u64,

    /// Sequencer collateral slashed on proven fraud
    pub sequencer_slash_penalty: u64,

    /// Share of the sequencer slash paid to the challenger
    pub challenger_reward_bps: u16,

    /// Share of a forfeited challenger bond paid to the sequencer
    pub sequencer_compensation_bps: u16,
}

impl Default for FraudProverConfig {
    fn default() -> Self {
        Self {
            min_challenger_bond: 1_000,
            challenge_resolution_period: 2 * 24 * 60 * 60,
            sequencer_slash_penalty: 5_000,
            challenger_reward_bps: 5_000,
            sequencer_compensation_bps: 5_000,
        }
    }
}

/// Borrowed collaborators for a single dispute operation
pub struct DisputeContext<'a> {
    /// Chain holding the disputed batch
    pub state_chain: &'a mut dyn DisputableStateChain,
    pub bonds: &'a mut dyn SlashableCollateral,
    pub transactions: &'a dyn TransactionDataSource,
}

/// Fraud prover
#[derive(Debug)]
pub struct FraudProver {
    config: FraudProverConfig,

    registry: ChallengeRegistry,

    capability: FraudProverCapability,

    events: EventLog,
}

impl FraudProver {
    /// Create a new fraud prover with default configuration
    pub fn new() -> Self {
        Self::with_config(FraudProverConfig::default())
    }

    /// Create a new fraud prover with the specified configuration
    pub fn with_config(config: FraudProverConfig) -> Self {
        Self::from_registry(config, ChallengeRegistry::new())
    }

    /// Rebuild a fraud prover around previously persisted challenges
    pub fn from_registry(config: FraudProverConfig, registry: ChallengeRegistry) -> Self {
        Self {
            config,
            registry,
            capability: FraudProverCapability::issue(),
            events: EventLog::new(),
        }
    }

    pub fn config(&self) -> &FraudProverConfig {
        &self.config
    }

    pub fn registry(&self) -> &ChallengeRegistry {
        &self.registry
    }

    /// Open a dispute against a state batch
    pub fn initiate_challenge(
        &mut self,
        ctx: DisputeContext<'_>,
        caller: &Pubkey,
        batch_index: u64,
        claimed_correct_root: [u8; 32],
        now: u64,
    ) -> Result<u64, FraudProofError> {
        let batch = ctx
            .state_chain
            .state_batch(batch_index)
            .ok_or(FraudProofError::UnknownBatch(batch_index))?;

        if self.registry.open_challenge_for(batch_index).is_some() || batch.challenged {
            return Err(FraudProofError::BatchAlreadyChallenged(batch_index));
        }
        if batch.finalized {
            return Err(FraudProofError::AlreadyFinalized(batch_index));
        }
        if !ctx.state_chain.is_in_fraud_proof_window(batch_index, now) {
            return Err(FraudProofError::FraudProofWindowPassed(batch_index));
        }
        if is_zero_root(&claimed_correct_root) {
            return Err(FraudProofError::InvalidClaim("claimed root is empty".to_string()));
        }
        if claimed_correct_root == batch.state_root {
            return Err(FraudProofError::InvalidClaim(
                "claimed root equals the committed root".to_string(),
            ));
        }

        let required = self.config.min_challenger_bond;
        let available = ctx.bonds.available_bond(caller, BondRole::Challenger);
        if available < required {
            return Err(FraudProofError::InsufficientChallengerBond {
                required,
                available,
            });
        }

        let sequencer = batch.submitter;
        ctx.bonds
            .lock_challenger_bond(&self.capability, caller, required, now)?;
        if let Err(error) = ctx.state_chain.mark_challenged(&self.capability, batch_index) {
            ctx.bonds
                .release_challenger_bond(&self.capability, caller, required, now)?;
            return Err(error.into());
        }

        let id = self.registry.next_id();
        self.registry.open(Challenge {
            id,
            batch_index,
            challenger: *caller,
            sequencer,
            claimed_correct_root,
            bond_locked: required,
            created_at: now,
            tx_batch_reference: ctx.transactions.latest_batch_index(),
            status: ChallengeStatus::Open,
            resolved_at: None,
        });

        warn!(
            "Challenge {} opened by {} against state batch {} (claims {})",
            id,
            caller,
            batch_index,
            short_hex(&claimed_correct_root)
        );
        self.events.emit(Layer2Event::ChallengeInitiated {
            challenge_id: id,
            batch_index,
            challenger: *caller,
            claimed_correct_root,
            bond_locked: required,
        });

        Ok(id)
    }

    /// Settle a dispute with a proof of the disputed transition
    #[allow(clippy::too_many_arguments)]
    pub fn submit_fraud_proof(
        &mut self,
        ctx: DisputeContext<'_>,
        caller: &Pubkey,
        challenge_id: u64,
        pre_state_root: [u8; 32],
        post_state_root: [u8; 32],
        evidence: &[u8],
        now: u64,
    ) -> Result<ChallengeStatus, FraudProofError> {
        let challenge = self.open_challenge(challenge_id)?.clone();

        if challenge.challenger != *caller {
            return Err(FraudProofError::NotChallenger);
        }
        if now >= challenge.resolvable_at(self.config.challenge_resolution_period) {
            return Err(FraudProofError::ResolutionPeriodPassed(challenge_id));
        }

        let batch = ctx
            .state_chain
            .state_batch(challenge.batch_index)
            .ok_or(FraudProofError::UnknownBatch(challenge.batch_index))?;
        let expected_pre_state_root = ctx
            .state_chain
            .previous_state_root(challenge.batch_index)
            .ok_or(FraudProofError::UnknownBatch(challenge.batch_index))?;

        let proof = FraudProof::new(pre_state_root, post_state_root, evidence.to_vec());
        let verdict = verify_fraud_proof(&proof, &expected_pre_state_root, &batch.state_root)?;

        info!(
            "Fraud proof for challenge {} verified: {} (evidence {})",
            challenge_id,
            verdict,
            short_hex(&proof.evidence_hash())
        );

        match verdict {
            ProofVerificationResult::FraudProven => self.resolve_successful(ctx, &challenge, now),
            ProofVerificationResult::NoFraud => self.resolve_unsuccessful(ctx, &challenge, now),
        }
    }

    /// Fail a dispute whose challenger never substantiated it
    pub fn resolve_expired_challenge(
        &mut self,
        ctx: DisputeContext<'_>,
        challenge_id: u64,
        now: u64,
    ) -> Result<ChallengeStatus, FraudProofError> {
        let challenge = self.open_challenge(challenge_id)?.clone();

        let resolvable_at = challenge.resolvable_at(self.config.challenge_resolution_period);
        if now < resolvable_at {
            return Err(FraudProofError::ResolutionPeriodNotPassed { resolvable_at });
        }

        info!("Challenge {} expired without proof", challenge_id);
        self.resolve_unsuccessful(ctx, &challenge, now)
    }

    pub fn has_active_challenge(&self, batch_index: u64) -> bool {
        self.registry.open_challenge_for(batch_index).is_some()
    }

    pub fn get_challenge(&self, challenge_id: u64) -> Option<&Challenge> {
        self.registry.get(challenge_id)
    }

    pub fn total_challenges(&self) -> u64 {
        self.registry.len()
    }

    pub fn total_successful_fraud_proofs(&self) -> u64 {
        self.registry.total_successful()
    }

    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }

    fn open_challenge(&self, challenge_id: u64) -> Result<&Challenge, FraudProofError> {
        let challenge = self
            .registry
            .get(challenge_id)
            .ok_or(FraudProofError::ChallengeNotFound(challenge_id))?;
        if challenge.resolved() {
            return Err(FraudProofError::AlreadyResolved(challenge_id));
        }
        Ok(challenge)
    }

    fn resolve_successful(
        &mut self,
        ctx: DisputeContext<'_>,
        challenge: &Challenge,
        now: u64,
    ) -> Result<ChallengeStatus, FraudProofError> {
        let slash = ctx.bonds.slash(
            &self.capability,
            &challenge.sequencer,
            BondRole::Sequencer,
            self.config.sequencer_slash_penalty,
            &challenge.challenger,
            self.config.challenger_reward_bps,
            now,
        )?;
        ctx.bonds.release_challenger_bond(
            &self.capability,
            &challenge.challenger,
            challenge.bond_locked,
            now,
        )?;

        // Disputes against batches the rollback is about to delete lose their target.
        for voided_id in self.registry.open_after(challenge.batch_index) {
            let Some(voided) = self.registry.get(voided_id).cloned() else {
                continue;
            };
            ctx.bonds.release_challenger_bond(
                &self.capability,
                &voided.challenger,
                voided.bond_locked,
                now,
            )?;
            self.registry.close(voided_id, ChallengeStatus::Voided, now);
            info!(
                "Challenge {} voided by rollback of state batch {}",
                voided_id, challenge.batch_index
            );
            self.events.emit(Layer2Event::ChallengeResolved {
                challenge_id: voided_id,
                batch_index: voided.batch_index,
                status: ChallengeStatus::Voided,
                sequencer_slashed: 0,
                challenger_reward: 0,
                challenger_forfeited: 0,
            });
        }

        ctx.state_chain
            .delete_from(&self.capability, challenge.batch_index, now)?;
        self.registry
            .close(challenge.id, ChallengeStatus::Successful, now);

        warn!(
            "Fraud proven on state batch {}: sequencer {} slashed {}, challenger {} rewarded {}",
            challenge.batch_index,
            challenge.sequencer,
            slash.slashed,
            challenge.challenger,
            slash.beneficiary_share
        );
        self.events.emit(Layer2Event::ChallengeResolved {
            challenge_id: challenge.id,
            batch_index: challenge.batch_index,
            status: ChallengeStatus::Successful,
            sequencer_slashed: slash.slashed,
            challenger_reward: slash.beneficiary_share,
            challenger_forfeited: 0,
        });

        Ok(ChallengeStatus::Successful)
    }

    fn resolve_unsuccessful(
        &mut self,
        ctx: DisputeContext<'_>,
        challenge: &Challenge,
        now: u64,
    ) -> Result<ChallengeStatus, FraudProofError> {
        let forfeit = ctx.bonds.forfeit_challenger_bond(
            &self.capability,
            &challenge.challenger,
            challenge.bond_locked,
            &challenge.sequencer,
            self.config.sequencer_compensation_bps,
            now,
        )?;
        ctx.state_chain
            .clear_challenged(&self.capability, challenge.batch_index)?;
        self.registry
            .close(challenge.id, ChallengeStatus::Unsuccessful, now);

        info!(
            "Challenge {} on state batch {} failed: challenger {} forfeits {}",
            challenge.id, challenge.batch_index, challenge.challenger, forfeit.slashed
        );
        self.events.emit(Layer2Event::ChallengeResolved {
            challenge_id: challenge.id,
            batch_index: challenge.batch_index,
            status: ChallengeStatus::Unsuccessful,
            sequencer_slashed: 0,
            challenger_reward: 0,
            challenger_forfeited: forfeit.slashed,
        });

        Ok(ChallengeStatus::Unsuccessful)
    }
}

impl Default for FraudProver {
    fn default() -> Self {
        Self::new()
    }
}
