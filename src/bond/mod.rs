// src/bond/mod.rs
//! Collateral ledger for sequencers and challengers

mod bond_manager;

pub use bond_manager::{
    BondAccount, BondConfig, BondManager, BondRole, PendingWithdrawal, SlashOutcome,
    BPS_DENOMINATOR,
};
