// src/interfaces/fraud_proof_interface.rs
//! Interfaces the dispute protocol uses to reach its collaborators
//!
//! The fraud prover never touches the state commitment chain or the bond
//! ledger directly. It goes through the traits below, and every mutating
//! entry point demands a [`FraudProverCapability`], which only the fraud
//! prover holds.

use crate::bond::{BondRole, SlashOutcome};
use crate::error_handling::{BondError, StateCommitmentError};
use crate::finalization::StateBatch;
use solana_program::pubkey::Pubkey;

/// Proof of the fraud-prover role.
///
/// Cannot be constructed outside this crate; the fraud prover is issued one
/// at construction time.
#[derive(Debug)]
pub struct FraudProverCapability {
    _sealed: (),
}

impl FraudProverCapability {
    pub(crate) fn issue() -> Self {
        Self { _sealed: () }
    }
}

/// State commitment chain as seen by the dispute protocol
pub trait DisputableStateChain {
    /// Get a committed state batch
    fn state_batch(&self, index: u64) -> Option<&StateBatch>;

    /// Root the batch at `index` transitions from (genesis root for index 0)
    fn previous_state_root(&self, index: u64) -> Option<[u8; 32]>;

    /// Whether the batch is still inside its fraud-proof window
    fn is_in_fraud_proof_window(&self, index: u64, now: u64) -> bool;

    /// Flag a batch as disputed, blocking finalization
    fn mark_challenged(
        &mut self,
        capability: &FraudProverCapability,
        index: u64,
    ) -> Result<(), StateCommitmentError>;

    /// Clear the disputed flag after an unsuccessful challenge
    fn clear_challenged(
        &mut self,
        capability: &FraudProverCapability,
        index: u64,
    ) -> Result<(), StateCommitmentError>;

    /// Roll back to the last known-good state: remove `index` and every later batch
    fn delete_from(
        &mut self,
        capability: &FraudProverCapability,
        index: u64,
        now: u64,
    ) -> Result<Vec<StateBatch>, StateCommitmentError>;
}

/// Bond ledger as seen by the dispute protocol
pub trait SlashableCollateral {
    /// Collateral not locked by open disputes
    fn available_bond(&self, identity: &Pubkey, role: BondRole) -> u64;

    /// Lock challenger collateral for the life of a dispute
    fn lock_challenger_bond(
        &mut self,
        capability: &FraudProverCapability,
        challenger: &Pubkey,
        amount: u64,
        now: u64,
    ) -> Result<(), BondError>;

    /// Return locked challenger collateral in full
    fn release_challenger_bond(
        &mut self,
        capability: &FraudProverCapability,
        challenger: &Pubkey,
        amount: u64,
        now: u64,
    ) -> Result<(), BondError>;

    /// Forfeit locked challenger collateral
    fn forfeit_challenger_bond(
        &mut self,
        capability: &FraudProverCapability,
        challenger: &Pubkey,
        amount: u64,
        beneficiary: &Pubkey,
        beneficiary_share_bps: u16,
        now: u64,
    ) -> Result<SlashOutcome, BondError>;

    /// Slash free collateral of any role
    #[allow(clippy::too_many_arguments)]
    fn slash(
        &mut self,
        capability: &FraudProverCapability,
        identity: &Pubkey,
        role: BondRole,
        amount: u64,
        beneficiary: &Pubkey,
        beneficiary_share_bps: u16,
        now: u64,
    ) -> Result<SlashOutcome, BondError>;
}

/// Transaction chain as a data-availability reference for disputes
pub trait TransactionDataSource {
    /// Index of the most recent transaction batch, if any
    fn latest_batch_index(&self) -> Option<u64>;

    /// Running count of committed transaction elements
    fn total_elements(&self) -> u64;
}
