// src/tests/mod.rs
//! Scenario tests driven through the rollup facade

mod finalization_tests;

use crate::bridge::ChallengeAccess;
use crate::interfaces::ManualClock;
use crate::rollup::{Layer2Config, OptimisticRollup};
use solana_program::pubkey::Pubkey;

pub(crate) const START: u64 = 10_000;
pub(crate) const GENESIS: [u8; 32] = [0xee; 32];

/// Small, fast protocol constants
pub(crate) fn test_config() -> Layer2Config {
    Layer2Config {
        min_sequencer_bond: 1_000,
        min_challenger_bond: 100,
        bond_withdrawal_delay: 1_500,
        max_batch_size: 100,
        max_enqueue_gas_limit: 1_000_000,
        max_enqueue_data_size: 1_024,
        force_inclusion_period: 50,
        fraud_proof_window: 1_000,
        challenge_resolution_period: 200,
        sequencer_slash_penalty: 400,
        challenger_reward_bps: 5_000,
        sequencer_compensation_bps: 5_000,
        bridge_withdrawal_delay: 300,
        deposit_challenge_period: 100,
        challenge_bond_lock_period: 500,
        challenge_access: ChallengeAccess::Anyone,
        genesis_state_root: GENESIS,
    }
}

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Rollup plus the actors most scenarios need
pub(crate) struct Harness {
    pub rollup: OptimisticRollup,
    pub clock: ManualClock,
    pub owner: Pubkey,
    pub sequencer: Pubkey,
    pub challenger: Pubkey,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Bonded sequencer (2x minimum) and challenger (3x minimum)
    pub fn with_config(config: Layer2Config) -> Self {
        init_logging();
        let clock = ManualClock::new(START);
        let owner = Pubkey::new_unique();
        let sequencer = Pubkey::new_unique();
        let challenger = Pubkey::new_unique();

        let sequencer_bond = config.min_sequencer_bond * 2;
        let challenger_bond = config.min_challenger_bond * 3;
        let mut rollup = OptimisticRollup::new(owner, config, Box::new(clock.clone())).unwrap();
        rollup.post_sequencer_bond(&sequencer, sequencer_bond).unwrap();
        rollup.post_challenger_bond(&challenger, challenger_bond).unwrap();

        Self {
            rollup,
            clock,
            owner,
            sequencer,
            challenger,
        }
    }

    pub fn advance(&self, seconds: u64) {
        self.clock.advance(seconds);
    }
}
