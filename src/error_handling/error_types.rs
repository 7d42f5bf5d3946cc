// src/error_handling/error_types.rs
//! Error types for the Layer-2 security core
//!
//! Each component has its own error enum; [`Layer2Error`] wraps all of them
//! for callers that drive the whole system. Every rejected call leaves state
//! untouched, so all of these are recoverable by retrying once the blocking
//! condition clears.
//!
//! Error code ranges:
//! - 1000: bond manager
//! - 2000: transaction chain
//! - 3000: state commitment chain
//! - 4000: fraud prover
//! - 5000: bridge
//! - 6000: system

use crate::interfaces::ComponentError;
use solana_program::program_error::ProgramError;
use thiserror::Error;

/// Bond manager errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BondError {
    /// Zero amount
    #[error("Invalid amount: bond amounts must be positive")]
    InvalidAmount,

    /// Requested more than the free principal
    #[error("Insufficient bond: requested {requested}, available {available}")]
    InsufficientBond { requested: u64, available: u64 },

    /// No account for this identity and role
    #[error("No bond account for this identity and role")]
    NoBondAccount,

    /// Nothing queued to finalize
    #[error("No pending withdrawal")]
    NoPendingWithdrawal,

    /// Withdrawal delay still running
    #[error("Withdrawal delay not passed: ready at {ready_at}")]
    WithdrawalDelayNotPassed { ready_at: u64 },

    /// Beneficiary share above 100%
    #[error("Invalid beneficiary share: {0} bps")]
    InvalidShare(u16),

    /// Checked arithmetic failed
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

impl ComponentError for BondError {
    fn error_code(&self) -> u32 {
        match self {
            BondError::InvalidAmount => 1000,
            BondError::InsufficientBond { .. } => 1001,
            BondError::NoBondAccount => 1002,
            BondError::NoPendingWithdrawal => 1003,
            BondError::WithdrawalDelayNotPassed { .. } => 1004,
            BondError::InvalidShare(_) => 1005,
            BondError::ArithmeticOverflow => 1006,
        }
    }
}

/// Transaction chain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionChainError {
    /// Caller is not a collateralized sequencer
    #[error("Caller is not a collateralized sequencer")]
    NotCollateralized,

    /// Zero content root
    #[error("Invalid batch data: content root is empty")]
    InvalidBatchData,

    /// Zero or oversized batch
    #[error("Batch size {size} outside 1..={max}")]
    BatchSizeTooLarge { size: u64, max: u64 },

    /// Null target
    #[error("Invalid address: target is null")]
    InvalidAddress,

    /// Zero or oversized compute budget
    #[error("Invalid gas limit {gas_limit}, maximum {max}")]
    InvalidGasLimit { gas_limit: u64, max: u64 },

    /// Enqueued calldata too large
    #[error("Queued data of {size} bytes exceeds {max}")]
    DataTooLarge { size: usize, max: usize },

    /// No pending queue entries
    #[error("Queue empty")]
    QueueEmpty,

    /// Oldest pending entry is still too young
    #[error("Force inclusion period not passed: eligible at {eligible_at}")]
    ForceInclusionPeriodNotPassed { eligible_at: u64 },

    /// Checked arithmetic failed
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

impl ComponentError for TransactionChainError {
    fn error_code(&self) -> u32 {
        match self {
            TransactionChainError::NotCollateralized => 2000,
            TransactionChainError::InvalidBatchData => 2001,
            TransactionChainError::BatchSizeTooLarge { .. } => 2002,
            TransactionChainError::InvalidAddress => 2003,
            TransactionChainError::InvalidGasLimit { .. } => 2004,
            TransactionChainError::DataTooLarge { .. } => 2005,
            TransactionChainError::QueueEmpty => 2006,
            TransactionChainError::ForceInclusionPeriodNotPassed { .. } => 2007,
            TransactionChainError::ArithmeticOverflow => 2008,
        }
    }
}

/// State commitment chain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateCommitmentError {
    /// Caller is not a collateralized sequencer
    #[error("Caller is not a collateralized sequencer")]
    NotCollateralized,

    /// Empty root list or zero root
    #[error("Invalid batch data: {0}")]
    InvalidBatchData(String),

    /// Index out of range
    #[error("Unknown state batch {0}")]
    UnknownBatch(u64),

    /// Batch is already final
    #[error("State batch {0} already finalized")]
    AlreadyFinalized(u64),

    /// Batch has an open dispute
    #[error("State batch {0} is challenged")]
    BatchChallenged(u64),

    /// Batch is not disputed
    #[error("State batch {0} is not challenged")]
    NotChallenged(u64),

    /// Window still open
    #[error("Fraud proof window for batch {index} not passed: final at {finalizable_at}")]
    FraudProofWindowNotPassed { index: u64, finalizable_at: u64 },

    /// Finalization must proceed in index order
    #[error("Previous state batch {0} not finalized")]
    PreviousBatchNotFinalized(u64),

    /// Checked arithmetic failed
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

impl ComponentError for StateCommitmentError {
    fn error_code(&self) -> u32 {
        match self {
            StateCommitmentError::NotCollateralized => 3000,
            StateCommitmentError::InvalidBatchData(_) => 3001,
            StateCommitmentError::UnknownBatch(_) => 3002,
            StateCommitmentError::AlreadyFinalized(_) => 3003,
            StateCommitmentError::BatchChallenged(_) => 3004,
            StateCommitmentError::NotChallenged(_) => 3005,
            StateCommitmentError::FraudProofWindowNotPassed { .. } => 3006,
            StateCommitmentError::PreviousBatchNotFinalized(_) => 3007,
            StateCommitmentError::ArithmeticOverflow => 3008,
        }
    }
}

/// Fraud prover errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FraudProofError {
    /// No committed state root at this index
    #[error("Unknown state batch {0}")]
    UnknownBatch(u64),

    /// An open challenge already targets this batch
    #[error("State batch {0} already challenged")]
    BatchAlreadyChallenged(u64),

    /// Final batches cannot be disputed
    #[error("State batch {0} already finalized")]
    AlreadyFinalized(u64),

    /// Dispute opened too late
    #[error("Fraud proof window for batch {0} has passed")]
    FraudProofWindowPassed(u64),

    /// Claimed root is zero or equal to the committed one
    #[error("Invalid claim: {0}")]
    InvalidClaim(String),

    /// Not enough free challenger collateral
    #[error("Insufficient challenger bond: required {required}, available {available}")]
    InsufficientChallengerBond { required: u64, available: u64 },

    /// Unknown challenge id
    #[error("Challenge {0} not found")]
    ChallengeNotFound(u64),

    /// Challenge already settled
    #[error("Challenge {0} already resolved")]
    AlreadyResolved(u64),

    /// Only the challenger may submit the proof
    #[error("Caller is not the challenger")]
    NotChallenger,

    /// Proof arrived after the resolution period
    #[error("Resolution period for challenge {0} has passed")]
    ResolutionPeriodPassed(u64),

    /// Expiry resolution attempted too early
    #[error("Resolution period not passed: resolvable at {resolvable_at}")]
    ResolutionPeriodNotPassed { resolvable_at: u64 },

    /// Pre-state does not match the previous committed root
    #[error("Invalid pre-state root")]
    InvalidPreStateRoot,

    /// Proof is malformed or self-inconsistent
    #[error("Invalid fraud proof: {0}")]
    InvalidFraudProof(String),

    /// Bond ledger rejected a movement
    #[error("{0}")]
    Bond(#[from] BondError),

    /// State chain rejected a mutation
    #[error("{0}")]
    StateCommitment(#[from] StateCommitmentError),
}

impl ComponentError for FraudProofError {
    fn error_code(&self) -> u32 {
        match self {
            FraudProofError::UnknownBatch(_) => 4000,
            FraudProofError::BatchAlreadyChallenged(_) => 4001,
            FraudProofError::AlreadyFinalized(_) => 4002,
            FraudProofError::FraudProofWindowPassed(_) => 4003,
            FraudProofError::InvalidClaim(_) => 4004,
            FraudProofError::InsufficientChallengerBond { .. } => 4005,
            FraudProofError::ChallengeNotFound(_) => 4006,
            FraudProofError::AlreadyResolved(_) => 4007,
            FraudProofError::NotChallenger => 4008,
            FraudProofError::ResolutionPeriodPassed(_) => 4009,
            FraudProofError::ResolutionPeriodNotPassed { .. } => 4010,
            FraudProofError::InvalidPreStateRoot => 4011,
            FraudProofError::InvalidFraudProof(_) => 4012,
            FraudProofError::Bond(e) => e.error_code(),
            FraudProofError::StateCommitment(e) => e.error_code(),
        }
    }
}

/// Bridge errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// Caller is not the bridge owner
    #[error("Caller is not the bridge owner")]
    NotOwner,

    /// Caller is not a deposit operator
    #[error("Caller is not a bridge operator")]
    NotOperator,

    /// Zero amount
    #[error("Invalid amount: must be positive")]
    InvalidAmount,

    /// Null address
    #[error("Invalid address")]
    InvalidAddress,

    /// Deposit id seen before
    #[error("Deposit {0} already processed")]
    DepositAlreadyProcessed(String),

    /// Unknown deposit id
    #[error("Deposit {0} not found")]
    DepositNotFound(String),

    /// Unknown withdrawal id
    #[error("Withdrawal {0} not found")]
    WithdrawalNotFound(u64),

    /// Not enough spendable layer-2 balance
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: u64 },

    /// Record is already final
    #[error("Already finalized")]
    AlreadyFinalized,

    /// Record was reversed by a challenge
    #[error("Already challenged")]
    AlreadyChallenged,

    /// Withdrawal delay still running
    #[error("Withdrawal delay not passed: ready at {ready_at}")]
    WithdrawalDelayNotPassed { ready_at: u64 },

    /// Deposit challenge period still running
    #[error("Deposit challenge period not passed: ready at {ready_at}")]
    ChallengePeriodNotPassed { ready_at: u64 },

    /// Configured challenge access excludes the caller
    #[error("Caller may not challenge")]
    ChallengeNotPermitted,

    /// No escrowed challenge bond for this caller and record
    #[error("Challenge bond not found")]
    ChallengeBondNotFound,

    /// Escrowed challenge bond still locked
    #[error("Challenge bond locked until {unlock_at}")]
    ChallengeBondLocked { unlock_at: u64 },

    /// Checked arithmetic failed
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

impl ComponentError for BridgeError {
    fn error_code(&self) -> u32 {
        match self {
            BridgeError::NotOwner => 5000,
            BridgeError::NotOperator => 5001,
            BridgeError::InvalidAmount => 5002,
            BridgeError::InvalidAddress => 5003,
            BridgeError::DepositAlreadyProcessed(_) => 5004,
            BridgeError::DepositNotFound(_) => 5005,
            BridgeError::WithdrawalNotFound(_) => 5006,
            BridgeError::InsufficientBalance { .. } => 5007,
            BridgeError::AlreadyFinalized => 5008,
            BridgeError::AlreadyChallenged => 5009,
            BridgeError::WithdrawalDelayNotPassed { .. } => 5010,
            BridgeError::ChallengePeriodNotPassed { .. } => 5011,
            BridgeError::ChallengeNotPermitted => 5012,
            BridgeError::ChallengeBondNotFound => 5013,
            BridgeError::ChallengeBondLocked { .. } => 5014,
            BridgeError::ArithmeticOverflow => 5015,
        }
    }
}

/// Base error type for the Layer-2 system
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Layer2Error {
    /// Bond manager error
    #[error("Bond error: {0}")]
    Bond(#[from] BondError),

    /// Transaction chain error
    #[error("Transaction chain error: {0}")]
    TransactionChain(#[from] TransactionChainError),

    /// State commitment chain error
    #[error("State commitment error: {0}")]
    StateCommitment(#[from] StateCommitmentError),

    /// Fraud prover error
    #[error("Fraud proof error: {0}")]
    FraudProof(#[from] FraudProofError),

    /// Bridge error
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// Host clock moved backwards
    #[error("Clock regression: last {last}, now {now}")]
    ClockRegression { last: u64, now: u64 },

    /// Configuration rejected
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Snapshot could not be encoded or decoded
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl ComponentError for Layer2Error {
    fn error_code(&self) -> u32 {
        match self {
            Layer2Error::Bond(e) => e.error_code(),
            Layer2Error::TransactionChain(e) => e.error_code(),
            Layer2Error::StateCommitment(e) => e.error_code(),
            Layer2Error::FraudProof(e) => e.error_code(),
            Layer2Error::Bridge(e) => e.error_code(),
            Layer2Error::ClockRegression { .. } => 6000,
            Layer2Error::InvalidConfig(_) => 6001,
            Layer2Error::Snapshot(_) => 6002,
        }
    }
}

impl From<Layer2Error> for ProgramError {
    fn from(error: Layer2Error) -> Self {
        error.to_program_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_ranged_by_component() {
        assert_eq!(BondError::InvalidAmount.error_code(), 1000);
        assert_eq!(TransactionChainError::QueueEmpty.error_code(), 2006);
        assert_eq!(StateCommitmentError::UnknownBatch(3).error_code(), 3002);
        assert_eq!(FraudProofError::NotChallenger.error_code(), 4008);
        assert_eq!(BridgeError::AlreadyChallenged.error_code(), 5009);
    }

    #[test]
    fn test_wrapped_errors_keep_inner_code() {
        let inner = StateCommitmentError::BatchChallenged(1);
        let wrapped = Layer2Error::from(FraudProofError::from(inner.clone()));
        assert_eq!(wrapped.error_code(), inner.error_code());
    }

    #[test]
    fn test_program_error_conversion() {
        let error = Layer2Error::from(BridgeError::NotOperator);
        assert_eq!(ProgramError::from(error), ProgramError::Custom(5001));
    }

    #[test]
    fn test_error_messages() {
        let error = TransactionChainError::BatchSizeTooLarge { size: 0, max: 1000 };
        assert_eq!(error.error_message(), "Batch size 0 outside 1..=1000");
    }
}
