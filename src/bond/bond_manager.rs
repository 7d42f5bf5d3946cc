// src/bond/bond_manager.rs
//! Bond Manager for the Layer-2 security core
//!
//! This module holds the collateral backing the two bonded roles:
//! - Sequencer bonds gate who may submit transaction and state batches
//! - Challenger bonds back disputes against state batches
//!
//! Collateralization is never stored. It is recomputed on every read from
//! the principal net of any queued withdrawal, so slashing below the role
//! minimum, or merely requesting a withdrawal that would leave less than it,
//! revokes posting rights immediately. Every batch a sequencer posts is
//! therefore backed by collateral that stays put for at least the
//! withdrawal delay.

use crate::error_handling::BondError;
use crate::events::{EventLog, Layer2Event};
use crate::interfaces::{FraudProverCapability, SlashableCollateral};
use borsh::{BorshDeserialize, BorshSerialize};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use std::collections::BTreeMap;

/// Basis points denominator
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Bonded role
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub enum BondRole {
    /// May submit transaction and state batches
    Sequencer,

    /// May dispute state batches
    Challenger,
}

/// Bond configuration
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct BondConfig {
    /// Minimum principal for a sequencer to post batches
    pub min_sequencer_bond: u64,

    /// Minimum free principal for a challenger to open a dispute
    pub min_challenger_bond: u64,

    /// Delay between requesting and finalizing a bond withdrawal (seconds)
    pub withdrawal_delay: u64,
}

impl Default for BondConfig {
    fn default() -> Self {
        Self {
            min_sequencer_bond: 10_000,
            min_challenger_bond: 1_000,
            withdrawal_delay: 10 * 24 * 60 * 60,
        }
    }
}

impl BondConfig {
    /// Minimum principal for a role
    pub fn minimum_for(&self, role: BondRole) -> u64 {
        match role {
            BondRole::Sequencer => self.min_sequencer_bond,
            BondRole::Challenger => self.min_challenger_bond,
        }
    }
}

/// Queued bond withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct PendingWithdrawal {
    pub amount: u64,
    pub requested_at: u64,
}

/// Collateral held for one identity in one role
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct BondAccount {
    /// Role this collateral backs
    pub role: BondRole,

    /// Total collateral held, including any locked part
    pub principal: u64,

    /// Part of the principal locked by open disputes
    pub locked: u64,

    /// At most one queued withdrawal
    pub pending_withdrawal: Option<PendingWithdrawal>,
}

impl BondAccount {
    fn new(role: BondRole) -> Self {
        Self {
            role,
            principal: 0,
            locked: 0,
            pending_withdrawal: None,
        }
    }

    /// Principal not locked by disputes
    pub fn available(&self) -> u64 {
        self.principal.saturating_sub(self.locked)
    }

    /// Principal that will remain once the queued withdrawal is paid out
    pub fn committed(&self) -> u64 {
        let queued = self.pending_withdrawal.map(|pending| pending.amount).unwrap_or(0);
        self.principal.saturating_sub(queued)
    }
}

/// Result of a slash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlashOutcome {
    /// Collateral removed from the account
    pub slashed: u64,

    /// Amount routed to the beneficiary
    pub beneficiary_share: u64,

    /// Amount kept by the protocol
    pub retained: u64,

    /// Withdrawal request cancelled by the slash
    pub cancelled_withdrawal: Option<PendingWithdrawal>,
}

/// Bond manager
#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
pub struct BondManager {
    config: BondConfig,

    accounts: BTreeMap<(Pubkey, BondRole), BondAccount>,

    /// Funds released out of the bond ledger, owed to each identity
    released: BTreeMap<Pubkey, u64>,

    /// Slashed collateral retained by the protocol
    slashed_pool: u64,

    #[borsh_skip]
    events: EventLog,
}

impl BondManager {
    /// Create a new bond manager with default configuration
    pub fn new() -> Self {
        Self::with_config(BondConfig::default())
    }

    /// Create a new bond manager with the specified configuration
    pub fn with_config(config: BondConfig) -> Self {
        Self {
            config,
            accounts: BTreeMap::new(),
            released: BTreeMap::new(),
            slashed_pool: 0,
            events: EventLog::new(),
        }
    }

    pub fn config(&self) -> &BondConfig {
        &self.config
    }

    /// Add collateral to an account, creating it if needed
    pub fn post_bond(
        &mut self,
        caller: &Pubkey,
        role: BondRole,
        amount: u64,
    ) -> Result<u64, BondError> {
        if amount == 0 {
            return Err(BondError::InvalidAmount);
        }

        let current = self.principal(caller, role);
        let principal = current
            .checked_add(amount)
            .ok_or(BondError::ArithmeticOverflow)?;

        let account = self
            .accounts
            .entry((*caller, role))
            .or_insert_with(|| BondAccount::new(role));
        account.principal = principal;

        info!("Bond posted: {} {:?} +{} -> {}", caller, role, amount, principal);
        self.events.emit(Layer2Event::BondPosted {
            identity: *caller,
            role,
            amount,
            principal,
        });

        Ok(principal)
    }

    pub fn post_sequencer_bond(&mut self, caller: &Pubkey, amount: u64) -> Result<u64, BondError> {
        self.post_bond(caller, BondRole::Sequencer, amount)
    }

    pub fn post_challenger_bond(&mut self, caller: &Pubkey, amount: u64) -> Result<u64, BondError> {
        self.post_bond(caller, BondRole::Challenger, amount)
    }

    /// Queue a withdrawal, replacing any earlier request
    pub fn request_withdrawal(
        &mut self,
        caller: &Pubkey,
        role: BondRole,
        amount: u64,
        now: u64,
    ) -> Result<u64, BondError> {
        if amount == 0 {
            return Err(BondError::InvalidAmount);
        }

        let delay = self.config.withdrawal_delay;
        let account = self
            .accounts
            .get_mut(&(*caller, role))
            .ok_or(BondError::NoBondAccount)?;

        if amount > account.available() {
            return Err(BondError::InsufficientBond {
                requested: amount,
                available: account.available(),
            });
        }

        let ready_at = now.checked_add(delay).ok_or(BondError::ArithmeticOverflow)?;
        account.pending_withdrawal = Some(PendingWithdrawal {
            amount,
            requested_at: now,
        });

        info!("Bond withdrawal requested: {} {:?} {} ready at {}", caller, role, amount, ready_at);
        self.events.emit(Layer2Event::BondWithdrawalRequested {
            identity: *caller,
            role,
            amount,
            ready_at,
        });

        Ok(ready_at)
    }

    /// Release a queued withdrawal once its delay has elapsed
    pub fn finalize_withdrawal(
        &mut self,
        caller: &Pubkey,
        role: BondRole,
        now: u64,
    ) -> Result<u64, BondError> {
        let delay = self.config.withdrawal_delay;
        let account = self
            .accounts
            .get(&(*caller, role))
            .ok_or(BondError::NoBondAccount)?;
        let pending = account
            .pending_withdrawal
            .ok_or(BondError::NoPendingWithdrawal)?;

        let ready_at = pending
            .requested_at
            .checked_add(delay)
            .ok_or(BondError::ArithmeticOverflow)?;
        if now < ready_at {
            return Err(BondError::WithdrawalDelayNotPassed { ready_at });
        }

        // Collateral may have been locked since the request was made.
        if pending.amount > account.available() {
            return Err(BondError::InsufficientBond {
                requested: pending.amount,
                available: account.available(),
            });
        }

        let released = self
            .released_funds(caller)
            .checked_add(pending.amount)
            .ok_or(BondError::ArithmeticOverflow)?;
        let principal = account.principal - pending.amount;

        if let Some(account) = self.accounts.get_mut(&(*caller, role)) {
            account.principal = principal;
            account.pending_withdrawal = None;
        }
        self.released.insert(*caller, released);

        info!("Bond withdrawn: {} {:?} {} -> {}", caller, role, pending.amount, principal);
        self.events.emit(Layer2Event::BondWithdrawn {
            identity: *caller,
            role,
            amount: pending.amount,
            principal,
        });

        Ok(pending.amount)
    }

    /// Principal held for an identity in a role
    pub fn principal(&self, identity: &Pubkey, role: BondRole) -> u64 {
        self.accounts
            .get(&(*identity, role))
            .map(|account| account.principal)
            .unwrap_or(0)
    }

    pub fn sequencer_bond(&self, identity: &Pubkey) -> u64 {
        self.principal(identity, BondRole::Sequencer)
    }

    pub fn challenger_bond(&self, identity: &Pubkey) -> u64 {
        self.principal(identity, BondRole::Challenger)
    }

    pub fn account(&self, identity: &Pubkey, role: BondRole) -> Option<&BondAccount> {
        self.accounts.get(&(*identity, role))
    }

    /// Whether the identity ever registered as a sequencer
    pub fn is_sequencer(&self, identity: &Pubkey) -> bool {
        self.accounts.contains_key(&(*identity, BondRole::Sequencer))
    }

    /// Whether the committed principal meets the role minimum
    pub fn is_collateralized(&self, identity: &Pubkey, role: BondRole) -> bool {
        self.accounts
            .get(&(*identity, role))
            .map(|account| account.committed() >= self.config.minimum_for(role))
            .unwrap_or(false)
    }

    pub fn is_sequencer_collateralized(&self, identity: &Pubkey) -> bool {
        self.is_collateralized(identity, BondRole::Sequencer)
    }

    /// Funds released to an identity by withdrawals and slash rewards
    pub fn released_funds(&self, identity: &Pubkey) -> u64 {
        self.released.get(identity).copied().unwrap_or(0)
    }

    pub fn slashed_pool(&self) -> u64 {
        self.slashed_pool
    }

    /// Sum of all principals
    pub fn total_bonded(&self) -> u64 {
        self.accounts.values().map(|account| account.principal).sum()
    }

    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }

    /// Split a slash between the beneficiary and the protocol
    fn split(slashed: u64, beneficiary_share_bps: u16) -> Result<(u64, u64), BondError> {
        if u64::from(beneficiary_share_bps) > BPS_DENOMINATOR {
            return Err(BondError::InvalidShare(beneficiary_share_bps));
        }
        let share = slashed
            .checked_mul(u64::from(beneficiary_share_bps))
            .ok_or(BondError::ArithmeticOverflow)?
            / BPS_DENOMINATOR;
        Ok((share, slashed - share))
    }

    /// Route a slashed amount; callers have already removed it from the account
    fn credit_slash(&mut self, beneficiary: &Pubkey, share: u64, retained: u64) -> Result<(), BondError> {
        let released = self
            .released_funds(beneficiary)
            .checked_add(share)
            .ok_or(BondError::ArithmeticOverflow)?;
        let pool = self
            .slashed_pool
            .checked_add(retained)
            .ok_or(BondError::ArithmeticOverflow)?;

        if share > 0 {
            self.released.insert(*beneficiary, released);
        }
        self.slashed_pool = pool;
        Ok(())
    }

    fn check_credit(&self, beneficiary: &Pubkey, share: u64, retained: u64) -> Result<(), BondError> {
        self.released_funds(beneficiary)
            .checked_add(share)
            .ok_or(BondError::ArithmeticOverflow)?;
        self.slashed_pool
            .checked_add(retained)
            .ok_or(BondError::ArithmeticOverflow)?;
        Ok(())
    }
}

impl Default for BondManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SlashableCollateral for BondManager {
    fn available_bond(&self, identity: &Pubkey, role: BondRole) -> u64 {
        self.accounts
            .get(&(*identity, role))
            .map(BondAccount::available)
            .unwrap_or(0)
    }

    fn lock_challenger_bond(
        &mut self,
        _capability: &FraudProverCapability,
        challenger: &Pubkey,
        amount: u64,
        _now: u64,
    ) -> Result<(), BondError> {
        let account = self
            .accounts
            .get_mut(&(*challenger, BondRole::Challenger))
            .ok_or(BondError::NoBondAccount)?;

        if amount > account.available() {
            return Err(BondError::InsufficientBond {
                requested: amount,
                available: account.available(),
            });
        }
        account.locked += amount;

        self.events.emit(Layer2Event::ChallengerBondLocked {
            challenger: *challenger,
            amount,
        });
        Ok(())
    }

    fn release_challenger_bond(
        &mut self,
        _capability: &FraudProverCapability,
        challenger: &Pubkey,
        amount: u64,
        _now: u64,
    ) -> Result<(), BondError> {
        let account = self
            .accounts
            .get_mut(&(*challenger, BondRole::Challenger))
            .ok_or(BondError::NoBondAccount)?;

        if amount > account.locked {
            return Err(BondError::InsufficientBond {
                requested: amount,
                available: account.locked,
            });
        }
        account.locked -= amount;

        self.events.emit(Layer2Event::ChallengerBondReleased {
            challenger: *challenger,
            amount,
        });
        Ok(())
    }

    fn forfeit_challenger_bond(
        &mut self,
        _capability: &FraudProverCapability,
        challenger: &Pubkey,
        amount: u64,
        beneficiary: &Pubkey,
        beneficiary_share_bps: u16,
        _now: u64,
    ) -> Result<SlashOutcome, BondError> {
        let account = self
            .accounts
            .get(&(*challenger, BondRole::Challenger))
            .ok_or(BondError::NoBondAccount)?;
        if amount > account.locked {
            return Err(BondError::InsufficientBond {
                requested: amount,
                available: account.locked,
            });
        }

        let (share, retained) = Self::split(amount, beneficiary_share_bps)?;
        self.check_credit(beneficiary, share, retained)?;

        let mut cancelled_withdrawal = None;
        if let Some(account) = self.accounts.get_mut(&(*challenger, BondRole::Challenger)) {
            account.locked -= amount;
            account.principal -= amount;
            cancelled_withdrawal = account.pending_withdrawal.take();
        }
        self.credit_slash(beneficiary, share, retained)?;

        warn!(
            "Challenger bond forfeited: {} {} (beneficiary {} gets {})",
            challenger, amount, beneficiary, share
        );
        self.events.emit(Layer2Event::BondSlashed {
            identity: *challenger,
            role: BondRole::Challenger,
            amount,
            beneficiary: *beneficiary,
            beneficiary_share: share,
            cancelled_withdrawal: cancelled_withdrawal.map(|pending| pending.amount),
        });

        Ok(SlashOutcome {
            slashed: amount,
            beneficiary_share: share,
            retained,
            cancelled_withdrawal,
        })
    }

    fn slash(
        &mut self,
        _capability: &FraudProverCapability,
        identity: &Pubkey,
        role: BondRole,
        amount: u64,
        beneficiary: &Pubkey,
        beneficiary_share_bps: u16,
        _now: u64,
    ) -> Result<SlashOutcome, BondError> {
        let free = self.available_bond(identity, role);
        let slashed = amount.min(free);
        let (share, retained) = Self::split(slashed, beneficiary_share_bps)?;
        self.check_credit(beneficiary, share, retained)?;

        let mut cancelled_withdrawal = None;
        if let Some(account) = self.accounts.get_mut(&(*identity, role)) {
            account.principal -= slashed;
            cancelled_withdrawal = account.pending_withdrawal.take();
        }
        self.credit_slash(beneficiary, share, retained)?;

        warn!(
            "Bond slashed: {} {:?} {} (requested {}, beneficiary {} gets {})",
            identity, role, slashed, amount, beneficiary, share
        );
        self.events.emit(Layer2Event::BondSlashed {
            identity: *identity,
            role,
            amount: slashed,
            beneficiary: *beneficiary,
            beneficiary_share: share,
            cancelled_withdrawal: cancelled_withdrawal.map(|pending| pending.amount),
        });

        Ok(SlashOutcome {
            slashed,
            beneficiary_share: share,
            retained,
            cancelled_withdrawal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = 24 * 60 * 60;

    fn manager() -> BondManager {
        BondManager::with_config(BondConfig {
            min_sequencer_bond: 1_000,
            min_challenger_bond: 100,
            withdrawal_delay: DAY,
        })
    }

    #[test]
    fn test_post_bond_accumulates() {
        let mut bonds = manager();
        let sequencer = Pubkey::new_unique();

        assert_eq!(bonds.post_sequencer_bond(&sequencer, 600).unwrap(), 600);
        assert!(!bonds.is_sequencer_collateralized(&sequencer));
        assert!(bonds.is_sequencer(&sequencer));

        assert_eq!(bonds.post_sequencer_bond(&sequencer, 400).unwrap(), 1_000);
        assert!(bonds.is_sequencer_collateralized(&sequencer));
        assert_eq!(bonds.total_bonded(), 1_000);
    }

    #[test]
    fn test_post_bond_rejects_zero() {
        let mut bonds = manager();
        let sequencer = Pubkey::new_unique();
        assert_eq!(bonds.post_sequencer_bond(&sequencer, 0), Err(BondError::InvalidAmount));
        assert!(!bonds.is_sequencer(&sequencer));
        assert!(bonds.events_mut().is_empty());
    }

    #[test]
    fn test_roles_are_tracked_independently() {
        let mut bonds = manager();
        let who = Pubkey::new_unique();
        bonds.post_sequencer_bond(&who, 1_000).unwrap();
        bonds.post_challenger_bond(&who, 50).unwrap();

        assert_eq!(bonds.sequencer_bond(&who), 1_000);
        assert_eq!(bonds.challenger_bond(&who), 50);
        assert!(!bonds.is_collateralized(&who, BondRole::Challenger));
    }

    #[test]
    fn test_withdrawal_lifecycle() {
        let mut bonds = manager();
        let sequencer = Pubkey::new_unique();
        bonds.post_sequencer_bond(&sequencer, 1_500).unwrap();

        assert_eq!(
            bonds.request_withdrawal(&sequencer, BondRole::Sequencer, 2_000, 0),
            Err(BondError::InsufficientBond { requested: 2_000, available: 1_500 })
        );

        let ready_at = bonds.request_withdrawal(&sequencer, BondRole::Sequencer, 600, 10).unwrap();
        assert_eq!(ready_at, 10 + DAY);
        // The queued amount no longer backs new batches
        assert_eq!(bonds.sequencer_bond(&sequencer), 1_500);
        assert!(!bonds.is_sequencer_collateralized(&sequencer));

        assert_eq!(
            bonds.finalize_withdrawal(&sequencer, BondRole::Sequencer, ready_at - 1),
            Err(BondError::WithdrawalDelayNotPassed { ready_at })
        );

        assert_eq!(bonds.finalize_withdrawal(&sequencer, BondRole::Sequencer, ready_at).unwrap(), 600);
        assert_eq!(bonds.sequencer_bond(&sequencer), 900);
        assert_eq!(bonds.released_funds(&sequencer), 600);
        assert!(!bonds.is_sequencer_collateralized(&sequencer));

        assert_eq!(
            bonds.finalize_withdrawal(&sequencer, BondRole::Sequencer, ready_at),
            Err(BondError::NoPendingWithdrawal)
        );
    }

    #[test]
    fn test_partial_request_keeps_posting_rights_above_minimum() {
        let mut bonds = manager();
        let sequencer = Pubkey::new_unique();
        bonds.post_sequencer_bond(&sequencer, 1_500).unwrap();

        bonds.request_withdrawal(&sequencer, BondRole::Sequencer, 500, 0).unwrap();
        assert_eq!(bonds.account(&sequencer, BondRole::Sequencer).unwrap().committed(), 1_000);
        assert!(bonds.is_sequencer_collateralized(&sequencer));

        bonds.request_withdrawal(&sequencer, BondRole::Sequencer, 501, 1).unwrap();
        assert!(!bonds.is_sequencer_collateralized(&sequencer));

        // Topping up restores the rights without touching the request
        bonds.post_sequencer_bond(&sequencer, 1).unwrap();
        assert!(bonds.is_sequencer_collateralized(&sequencer));
    }

    #[test]
    fn test_new_request_overwrites_previous() {
        let mut bonds = manager();
        let sequencer = Pubkey::new_unique();
        bonds.post_sequencer_bond(&sequencer, 1_500).unwrap();

        bonds.request_withdrawal(&sequencer, BondRole::Sequencer, 100, 0).unwrap();
        bonds.request_withdrawal(&sequencer, BondRole::Sequencer, 300, 50).unwrap();

        let pending = bonds
            .account(&sequencer, BondRole::Sequencer)
            .and_then(|account| account.pending_withdrawal)
            .unwrap();
        assert_eq!(pending, PendingWithdrawal { amount: 300, requested_at: 50 });

        assert!(bonds.finalize_withdrawal(&sequencer, BondRole::Sequencer, DAY).is_err());
        assert_eq!(bonds.finalize_withdrawal(&sequencer, BondRole::Sequencer, DAY + 50).unwrap(), 300);
    }

    #[test]
    fn test_request_without_account() {
        let mut bonds = manager();
        assert_eq!(
            bonds.request_withdrawal(&Pubkey::new_unique(), BondRole::Challenger, 1, 0),
            Err(BondError::NoBondAccount)
        );
    }

    #[test]
    fn test_slash_cancels_pending_withdrawal_and_routes_share() {
        let mut bonds = manager();
        let capability = FraudProverCapability::issue();
        let sequencer = Pubkey::new_unique();
        let challenger = Pubkey::new_unique();
        bonds.post_sequencer_bond(&sequencer, 1_000).unwrap();
        bonds.request_withdrawal(&sequencer, BondRole::Sequencer, 1_000, 0).unwrap();

        let outcome = bonds
            .slash(&capability, &sequencer, BondRole::Sequencer, 400, &challenger, 5_000, 1)
            .unwrap();

        assert_eq!(outcome.slashed, 400);
        assert_eq!(outcome.beneficiary_share, 200);
        assert_eq!(outcome.retained, 200);
        assert_eq!(
            outcome.cancelled_withdrawal,
            Some(PendingWithdrawal { amount: 1_000, requested_at: 0 })
        );

        assert_eq!(bonds.sequencer_bond(&sequencer), 600);
        assert!(!bonds.is_sequencer_collateralized(&sequencer));
        assert_eq!(bonds.released_funds(&challenger), 200);
        assert_eq!(bonds.slashed_pool(), 200);
        assert_eq!(
            bonds.finalize_withdrawal(&sequencer, BondRole::Sequencer, DAY),
            Err(BondError::NoPendingWithdrawal)
        );
    }

    #[test]
    fn test_slash_is_capped_at_principal() {
        let mut bonds = manager();
        let capability = FraudProverCapability::issue();
        let sequencer = Pubkey::new_unique();
        let beneficiary = Pubkey::new_unique();
        bonds.post_sequencer_bond(&sequencer, 300).unwrap();

        let outcome = bonds
            .slash(&capability, &sequencer, BondRole::Sequencer, 1_000, &beneficiary, 10_000, 0)
            .unwrap();
        assert_eq!(outcome.slashed, 300);
        assert_eq!(bonds.sequencer_bond(&sequencer), 0);
        assert_eq!(bonds.released_funds(&beneficiary), 300);
        assert_eq!(bonds.slashed_pool(), 0);
    }

    #[test]
    fn test_slash_rejects_invalid_share_without_moving_funds() {
        let mut bonds = manager();
        let capability = FraudProverCapability::issue();
        let sequencer = Pubkey::new_unique();
        bonds.post_sequencer_bond(&sequencer, 1_000).unwrap();

        assert_eq!(
            bonds.slash(&capability, &sequencer, BondRole::Sequencer, 100, &sequencer, 10_001, 0),
            Err(BondError::InvalidShare(10_001))
        );
        assert_eq!(bonds.sequencer_bond(&sequencer), 1_000);
        assert_eq!(bonds.slashed_pool(), 0);
    }

    #[test]
    fn test_locked_challenger_bond_is_not_withdrawable() {
        let mut bonds = manager();
        let capability = FraudProverCapability::issue();
        let challenger = Pubkey::new_unique();
        bonds.post_challenger_bond(&challenger, 150).unwrap();

        bonds.lock_challenger_bond(&capability, &challenger, 100, 0).unwrap();
        assert_eq!(bonds.available_bond(&challenger, BondRole::Challenger), 50);
        assert!(bonds.request_withdrawal(&challenger, BondRole::Challenger, 100, 0).is_err());

        bonds.release_challenger_bond(&capability, &challenger, 100, 0).unwrap();
        assert_eq!(bonds.available_bond(&challenger, BondRole::Challenger), 150);
    }

    #[test]
    fn test_lock_after_request_blocks_finalize() {
        let mut bonds = manager();
        let capability = FraudProverCapability::issue();
        let challenger = Pubkey::new_unique();
        bonds.post_challenger_bond(&challenger, 150).unwrap();
        bonds.request_withdrawal(&challenger, BondRole::Challenger, 150, 0).unwrap();
        bonds.lock_challenger_bond(&capability, &challenger, 100, 1).unwrap();

        assert_eq!(
            bonds.finalize_withdrawal(&challenger, BondRole::Challenger, DAY),
            Err(BondError::InsufficientBond { requested: 150, available: 50 })
        );
    }

    #[test]
    fn test_forfeit_challenger_bond() {
        let mut bonds = manager();
        let capability = FraudProverCapability::issue();
        let challenger = Pubkey::new_unique();
        let sequencer = Pubkey::new_unique();
        bonds.post_challenger_bond(&challenger, 250).unwrap();
        bonds.lock_challenger_bond(&capability, &challenger, 100, 0).unwrap();

        let outcome = bonds
            .forfeit_challenger_bond(&capability, &challenger, 100, &sequencer, 2_500, 5)
            .unwrap();
        assert_eq!(outcome.slashed, 100);
        assert_eq!(outcome.beneficiary_share, 25);
        assert_eq!(bonds.challenger_bond(&challenger), 150);
        assert_eq!(bonds.available_bond(&challenger, BondRole::Challenger), 150);
        assert_eq!(bonds.released_funds(&sequencer), 25);
        assert_eq!(bonds.slashed_pool(), 75);

        assert!(bonds
            .forfeit_challenger_bond(&capability, &challenger, 1, &sequencer, 0, 5)
            .is_err());
    }
}
