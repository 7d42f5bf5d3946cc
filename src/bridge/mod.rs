// src/bridge/mod.rs
//! Bridge module for the Layer-2 security core
//!
//! This module moves value between L1 and the Layer-2 ledger. Deposits and
//! withdrawals both pass through a delay during which a challenge can
//! reverse them.

mod asset_bridge;
mod deposit_handler;
mod withdrawal_handler;

pub use asset_bridge::{Balance, Bridge, BridgeConfig, ChallengeAccess, EscrowedChallengeBond};
pub use deposit_handler::{Deposit, DepositRegistry};
pub use withdrawal_handler::{WithdrawalQueue, WithdrawalRequest};
