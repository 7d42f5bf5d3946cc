// src/rollup/config.rs
//! Configuration for the optimistic rollup
//!
//! One flat [`Layer2Config`] carries every protocol constant. Each component
//! receives its own config struct cut from it.

use crate::bond::{BondConfig, BPS_DENOMINATOR};
use crate::bridge::{BridgeConfig, ChallengeAccess};
use crate::error_handling::Layer2Error;
use crate::finalization::StateCommitmentConfig;
use crate::fraud_proof_system::FraudProverConfig;
use crate::sequencer::TransactionChainConfig;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

const DAY: u64 = 24 * 60 * 60;

/// Rollup configuration
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(default)]
pub struct Layer2Config {
    /// Minimum principal for a sequencer to post batches
    pub min_sequencer_bond: u64,

    /// Challenger collateral locked per dispute
    pub min_challenger_bond: u64,

    /// Delay between requesting and finalizing a bond withdrawal (seconds)
    pub bond_withdrawal_delay: u64,

    /// Maximum number of transactions in a batch
    pub max_batch_size: u64,

    /// Maximum compute budget of an enqueued message
    pub max_enqueue_gas_limit: u64,

    /// Maximum calldata size of an enqueued message (bytes)
    pub max_enqueue_data_size: u64,

    /// Age after which a queued message may be force-included (seconds)
    pub force_inclusion_period: u64,

    /// Delay during which a state batch may be disputed (seconds)
    pub fraud_proof_window: u64,

    /// Time a challenger has to submit its proof (seconds)
    pub challenge_resolution_period: u64,

    /// Sequencer collateral slashed on proven fraud
    pub sequencer_slash_penalty: u64,

    /// Share of the sequencer slash paid to the challenger
    pub challenger_reward_bps: u16,

    /// Share of a forfeited challenger bond paid to the sequencer
    pub sequencer_compensation_bps: u16,

    /// Delay before a bridge withdrawal is released on L1 (seconds)
    pub bridge_withdrawal_delay: u64,

    /// Delay before a deposit credit becomes spendable (seconds)
    pub deposit_challenge_period: u64,

    /// Time an escrowed bridge challenge bond stays locked (seconds)
    pub challenge_bond_lock_period: u64,

    /// Who may challenge bridge deposits and withdrawals
    pub challenge_access: ChallengeAccess,

    /// Root that state batch 0 transitions from
    pub genesis_state_root: [u8; 32],
}

impl Default for Layer2Config {
    fn default() -> Self {
        Self {
            min_sequencer_bond: 10_000,
            min_challenger_bond: 1_000,
            bond_withdrawal_delay: 10 * DAY,
            max_batch_size: 1000,
            max_enqueue_gas_limit: 15_000_000,
            max_enqueue_data_size: 50_000,
            force_inclusion_period: DAY,
            fraud_proof_window: 7 * DAY,
            challenge_resolution_period: 2 * DAY,
            sequencer_slash_penalty: 5_000,
            challenger_reward_bps: 5_000,
            sequencer_compensation_bps: 5_000,
            bridge_withdrawal_delay: 7 * DAY,
            deposit_challenge_period: DAY,
            challenge_bond_lock_period: 7 * DAY,
            challenge_access: ChallengeAccess::Bonded { amount: 100 },
            genesis_state_root: [0; 32],
        }
    }
}

impl Layer2Config {
    /// Parse and validate a JSON configuration; absent fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self, Layer2Error> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Layer2Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, Layer2Error> {
        serde_json::to_string_pretty(self).map_err(|e| Layer2Error::InvalidConfig(e.to_string()))
    }

    /// Reject values the protocol cannot run with
    pub fn validate(&self) -> Result<(), Layer2Error> {
        let positive = [
            ("min_sequencer_bond", self.min_sequencer_bond),
            ("min_challenger_bond", self.min_challenger_bond),
            ("max_batch_size", self.max_batch_size),
            ("max_enqueue_gas_limit", self.max_enqueue_gas_limit),
            ("force_inclusion_period", self.force_inclusion_period),
            ("fraud_proof_window", self.fraud_proof_window),
            ("challenge_resolution_period", self.challenge_resolution_period),
            ("sequencer_slash_penalty", self.sequencer_slash_penalty),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(Layer2Error::InvalidConfig(format!("{} must be positive", name)));
        }

        for (name, bps) in [
            ("challenger_reward_bps", self.challenger_reward_bps),
            ("sequencer_compensation_bps", self.sequencer_compensation_bps),
        ] {
            if u64::from(bps) > BPS_DENOMINATOR {
                return Err(Layer2Error::InvalidConfig(format!(
                    "{} must not exceed {}",
                    name, BPS_DENOMINATOR
                )));
            }
        }

        if self.sequencer_slash_penalty > self.min_sequencer_bond {
            return Err(Layer2Error::InvalidConfig(format!(
                "sequencer_slash_penalty {} exceeds min_sequencer_bond {}",
                self.sequencer_slash_penalty, self.min_sequencer_bond
            )));
        }

        // Posting rights end at the withdrawal request, so the delay must
        // cover a full dispute on the last batch posted before it.
        let dispute_span = self
            .fraud_proof_window
            .checked_add(self.challenge_resolution_period)
            .ok_or_else(|| Layer2Error::InvalidConfig("dispute periods overflow".to_string()))?;
        if self.bond_withdrawal_delay < dispute_span {
            return Err(Layer2Error::InvalidConfig(format!(
                "bond_withdrawal_delay {} shorter than fraud_proof_window + challenge_resolution_period {}",
                self.bond_withdrawal_delay, dispute_span
            )));
        }

        Ok(())
    }

    pub fn bond_config(&self) -> BondConfig {
        BondConfig {
            min_sequencer_bond: self.min_sequencer_bond,
            min_challenger_bond: self.min_challenger_bond,
            withdrawal_delay: self.bond_withdrawal_delay,
        }
    }

    pub fn transaction_chain_config(&self) -> TransactionChainConfig {
        TransactionChainConfig {
            max_batch_size: self.max_batch_size,
            max_enqueue_gas_limit: self.max_enqueue_gas_limit,
            max_enqueue_data_size: self.max_enqueue_data_size,
            force_inclusion_period: self.force_inclusion_period,
        }
    }

    pub fn state_commitment_config(&self) -> StateCommitmentConfig {
        StateCommitmentConfig {
            fraud_proof_window: self.fraud_proof_window,
            genesis_state_root: self.genesis_state_root,
        }
    }

    pub fn fraud_prover_config(&self) -> FraudProverConfig {
        FraudProverConfig {
            min_challenger_bond: self.min_challenger_bond,
            challenge_resolution_period: self.challenge_resolution_period,
            sequencer_slash_penalty: self.sequencer_slash_penalty,
            challenger_reward_bps: self.challenger_reward_bps,
            sequencer_compensation_bps: self.sequencer_compensation_bps,
        }
    }

    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            withdrawal_delay: self.bridge_withdrawal_delay,
            deposit_challenge_period: self.deposit_challenge_period,
            challenge_bond_lock_period: self.challenge_bond_lock_period,
            challenge_access: self.challenge_access,
        }
    }
}
