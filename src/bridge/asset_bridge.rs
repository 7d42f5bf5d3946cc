// src/bridge/asset_bridge.rs
//! Asset bridge between L1 and the Layer-2 ledger
//!
//! Deposits are relayed by operators and credited immediately but stay
//! pending until the deposit challenge period has passed. Withdrawals debit
//! the owner at once and are released on L1 after the withdrawal delay.
//! Before either settles, a challenge reverses it: a challenged deposit takes
//! its credit back and a challenged withdrawal refunds the owner. Only the
//! configured [`ChallengeAccess`] decides who may pull that switch. No proof
//! is involved.

use super::deposit_handler::{Deposit, DepositRegistry};
use super::withdrawal_handler::{WithdrawalQueue, WithdrawalRequest};
use crate::error_handling::BridgeError;
use crate::events::{EventLog, Layer2Event};
use borsh::{BorshDeserialize, BorshSerialize};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use std::collections::{BTreeMap, BTreeSet};

/// Who may challenge a deposit or a withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum ChallengeAccess {
    /// Any caller, free of charge
    Anyone,

    /// Only the bridge owner
    OwnerOnly,

    /// Any caller who escrows `amount` of layer-2 balance
    Bonded { amount: u64 },
}

/// Bridge configuration
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Delay before a withdrawal is released on L1 (seconds)
    pub withdrawal_delay: u64,

    /// Delay before a deposit credit becomes spendable (seconds)
    pub deposit_challenge_period: u64,

    /// Time an escrowed challenge bond stays locked (seconds)
    pub challenge_bond_lock_period: u64,

    pub challenge_access: ChallengeAccess,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            withdrawal_delay: 7 * 24 * 60 * 60,
            deposit_challenge_period: 24 * 60 * 60,
            challenge_bond_lock_period: 7 * 24 * 60 * 60,
            challenge_access: ChallengeAccess::Bonded { amount: 100 },
        }
    }
}

/// Layer-2 balance of one identity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Balance {
    /// Everything credited, including pending deposits
    pub total: u64,

    /// Credit from deposits not finalized yet
    pub pending: u64,
}

impl Balance {
    /// Spendable part of the balance
    pub fn available(&self) -> u64 {
        self.total.saturating_sub(self.pending)
    }
}

/// Challenge bond held in escrow
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct EscrowedChallengeBond {
    pub amount: u64,
    pub unlock_at: u64,
}

/// Asset bridge
#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
pub struct Bridge {
    config: BridgeConfig,

    owner: Pubkey,

    operators: BTreeSet<Pubkey>,

    balances: BTreeMap<Pubkey, Balance>,

    deposits: DepositRegistry,

    withdrawals: WithdrawalQueue,

    challenge_bonds: BTreeMap<Pubkey, Vec<EscrowedChallengeBond>>,

    /// Value released on L1 by finalized withdrawals
    total_released: u64,

    #[borsh_skip]
    events: EventLog,
}

impl Bridge {
    /// Create a new bridge with default configuration
    pub fn new(owner: Pubkey) -> Self {
        Self::with_config(owner, BridgeConfig::default())
    }

    /// Create a new bridge with the specified configuration
    ///
    /// The owner starts out as the only operator.
    pub fn with_config(owner: Pubkey, config: BridgeConfig) -> Self {
        let mut operators = BTreeSet::new();
        operators.insert(owner);
        Self {
            config,
            owner,
            operators,
            balances: BTreeMap::new(),
            deposits: DepositRegistry::new(),
            withdrawals: WithdrawalQueue::new(),
            challenge_bonds: BTreeMap::new(),
            total_released: 0,
            events: EventLog::new(),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn owner(&self) -> &Pubkey {
        &self.owner
    }

    /// Grant the operator role; returns whether the set changed
    pub fn add_operator(&mut self, caller: &Pubkey, operator: &Pubkey) -> Result<bool, BridgeError> {
        self.ensure_owner(caller)?;
        if *operator == Pubkey::default() {
            return Err(BridgeError::InvalidAddress);
        }

        let changed = self.operators.insert(*operator);
        if changed {
            info!("Bridge operator added: {}", operator);
            self.events.emit(Layer2Event::OperatorUpdated {
                operator: *operator,
                enabled: true,
            });
        }
        Ok(changed)
    }

    /// Revoke the operator role; returns whether the set changed
    pub fn remove_operator(&mut self, caller: &Pubkey, operator: &Pubkey) -> Result<bool, BridgeError> {
        self.ensure_owner(caller)?;

        let changed = self.operators.remove(operator);
        if changed {
            info!("Bridge operator removed: {}", operator);
            self.events.emit(Layer2Event::OperatorUpdated {
                operator: *operator,
                enabled: false,
            });
        }
        Ok(changed)
    }

    /// Credit a deposit relayed from L1
    pub fn process_deposit(
        &mut self,
        caller: &Pubkey,
        deposit_id: [u8; 32],
        l1_sender: [u8; 20],
        recipient: &Pubkey,
        amount: u64,
        now: u64,
    ) -> Result<(), BridgeError> {
        if !self.operators.contains(caller) {
            return Err(BridgeError::NotOperator);
        }
        if amount == 0 {
            return Err(BridgeError::InvalidAmount);
        }
        if *recipient == Pubkey::default() || l1_sender == [0; 20] {
            return Err(BridgeError::InvalidAddress);
        }
        if self.deposits.contains(&deposit_id) {
            return Err(BridgeError::DepositAlreadyProcessed(hex::encode(deposit_id)));
        }

        let mut balance = self.balance(recipient);
        balance.total = balance
            .total
            .checked_add(amount)
            .ok_or(BridgeError::ArithmeticOverflow)?;
        balance.pending = balance
            .pending
            .checked_add(amount)
            .ok_or(BridgeError::ArithmeticOverflow)?;

        self.balances.insert(*recipient, balance);
        self.deposits.insert(Deposit {
            id: deposit_id,
            l1_sender,
            recipient: *recipient,
            amount,
            created_at: now,
            finalized: false,
            challenged: false,
        });

        info!(
            "Deposit {} processed: {} credited to {}",
            hex::encode(&deposit_id[..8]),
            amount,
            recipient
        );
        self.events.emit(Layer2Event::DepositProcessed {
            deposit_id,
            l1_sender,
            recipient: *recipient,
            amount,
        });

        Ok(())
    }

    /// Make a deposit credit spendable once its challenge period has passed
    pub fn finalize_deposit(&mut self, deposit_id: &[u8; 32], now: u64) -> Result<(), BridgeError> {
        let deposit = self.deposits.require(deposit_id)?;
        deposit.ensure_open()?;

        let ready_at = deposit.finalizable_at(self.config.deposit_challenge_period);
        if now < ready_at {
            return Err(BridgeError::ChallengePeriodNotPassed { ready_at });
        }

        let (recipient, amount) = (deposit.recipient, deposit.amount);
        let mut balance = self.balance(&recipient);
        balance.pending = balance
            .pending
            .checked_sub(amount)
            .ok_or(BridgeError::ArithmeticOverflow)?;

        self.balances.insert(recipient, balance);
        if let Some(deposit) = self.deposits.get_mut(deposit_id) {
            deposit.finalized = true;
        }

        info!("Deposit {} finalized", hex::encode(&deposit_id[..8]));
        self.events.emit(Layer2Event::DepositFinalized {
            deposit_id: *deposit_id,
        });

        Ok(())
    }

    /// Reverse an unfinalized deposit, taking back its credit
    pub fn challenge_deposit(
        &mut self,
        caller: &Pubkey,
        deposit_id: &[u8; 32],
        now: u64,
    ) -> Result<(), BridgeError> {
        let deposit = self.deposits.require(deposit_id)?;
        deposit.ensure_open()?;
        let (recipient, amount) = (deposit.recipient, deposit.amount);

        // Pending credit is never spendable, so it is always still there.
        if self.balance(&recipient).pending < amount {
            return Err(BridgeError::ArithmeticOverflow);
        }
        let bond = self.plan_challenge_bond(caller, now)?;
        self.escrow_challenge_bond(caller, bond)?;

        let mut balance = self.balance(&recipient);
        balance.total -= amount;
        balance.pending -= amount;
        self.balances.insert(recipient, balance);
        if let Some(deposit) = self.deposits.get_mut(deposit_id) {
            deposit.challenged = true;
        }

        warn!(
            "Deposit {} challenged by {}: {} reversed from {}",
            hex::encode(&deposit_id[..8]),
            caller,
            amount,
            recipient
        );
        self.events.emit(Layer2Event::DepositChallenged {
            deposit_id: *deposit_id,
            challenger: *caller,
            reversed: amount,
        });

        Ok(())
    }

    /// Debit the caller and queue a release on L1; returns the withdrawal id
    pub fn initiate_withdrawal(
        &mut self,
        caller: &Pubkey,
        l1_recipient: [u8; 20],
        amount: u64,
        now: u64,
    ) -> Result<u64, BridgeError> {
        if l1_recipient == [0; 20] {
            return Err(BridgeError::InvalidAddress);
        }
        if amount == 0 {
            return Err(BridgeError::InvalidAmount);
        }

        let mut balance = self.balance(caller);
        let available = balance.available();
        if amount > available {
            return Err(BridgeError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        balance.total -= amount;

        self.balances.insert(*caller, balance);
        let withdrawal_id = self.withdrawals.push(*caller, l1_recipient, amount, now);

        info!(
            "Withdrawal {} initiated by {}: {} to 0x{}",
            withdrawal_id,
            caller,
            amount,
            hex::encode(l1_recipient)
        );
        self.events.emit(Layer2Event::WithdrawalInitiated {
            withdrawal_id,
            owner: *caller,
            l1_recipient,
            amount,
        });

        Ok(withdrawal_id)
    }

    /// Release a withdrawal on L1 once its delay has passed
    pub fn finalize_withdrawal(&mut self, withdrawal_id: u64, now: u64) -> Result<u64, BridgeError> {
        let request = self.withdrawals.require(withdrawal_id)?;
        if request.challenged {
            return Err(BridgeError::AlreadyChallenged);
        }
        if request.finalized {
            return Err(BridgeError::AlreadyFinalized);
        }
        let ready_at = request.ready_at(self.config.withdrawal_delay);
        if now < ready_at {
            return Err(BridgeError::WithdrawalDelayNotPassed { ready_at });
        }

        let (l1_recipient, amount) = (request.l1_recipient, request.amount);
        let total_released = self
            .total_released
            .checked_add(amount)
            .ok_or(BridgeError::ArithmeticOverflow)?;

        self.total_released = total_released;
        if let Some(request) = self.withdrawals.get_mut(withdrawal_id) {
            request.finalized = true;
        }

        info!(
            "Withdrawal {} finalized: {} released to 0x{}",
            withdrawal_id,
            amount,
            hex::encode(l1_recipient)
        );
        self.events.emit(Layer2Event::WithdrawalFinalized {
            withdrawal_id,
            l1_recipient,
            amount,
        });

        Ok(amount)
    }

    /// Reverse an unfinalized withdrawal, refunding its owner
    pub fn challenge_withdrawal(
        &mut self,
        caller: &Pubkey,
        withdrawal_id: u64,
        now: u64,
    ) -> Result<(), BridgeError> {
        let request = self.withdrawals.require(withdrawal_id)?;
        if request.finalized {
            return Err(BridgeError::AlreadyFinalized);
        }
        if request.challenged {
            return Err(BridgeError::AlreadyChallenged);
        }
        let (owner, amount) = (request.owner, request.amount);

        let bond = self.plan_challenge_bond(caller, now)?;
        self.escrow_challenge_bond(caller, bond)?;

        let mut balance = self.balance(&owner);
        balance.total = balance
            .total
            .checked_add(amount)
            .ok_or(BridgeError::ArithmeticOverflow)?;
        self.balances.insert(owner, balance);
        if let Some(request) = self.withdrawals.get_mut(withdrawal_id) {
            request.challenged = true;
        }

        warn!(
            "Withdrawal {} challenged by {}: {} refunded to {}",
            withdrawal_id, caller, amount, owner
        );
        self.events.emit(Layer2Event::WithdrawalChallenged {
            withdrawal_id,
            challenger: *caller,
            refunded: amount,
        });

        Ok(())
    }

    /// Move spendable layer-2 balance between identities
    pub fn transfer(&mut self, caller: &Pubkey, to: &Pubkey, amount: u64) -> Result<(), BridgeError> {
        if *to == Pubkey::default() {
            return Err(BridgeError::InvalidAddress);
        }
        if amount == 0 {
            return Err(BridgeError::InvalidAmount);
        }

        let mut from_balance = self.balance(caller);
        let available = from_balance.available();
        if amount > available {
            return Err(BridgeError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        if caller != to {
            let mut to_balance = self.balance(to);
            to_balance.total = to_balance
                .total
                .checked_add(amount)
                .ok_or(BridgeError::ArithmeticOverflow)?;
            from_balance.total -= amount;
            self.balances.insert(*caller, from_balance);
            self.balances.insert(*to, to_balance);
        }

        info!("Transfer: {} -> {} {}", caller, to, amount);
        self.events.emit(Layer2Event::Transfer {
            from: *caller,
            to: *to,
            amount,
        });

        Ok(())
    }

    /// Return every unlocked challenge bond of the caller to its balance
    pub fn reclaim_challenge_bond(&mut self, caller: &Pubkey, now: u64) -> Result<u64, BridgeError> {
        let bonds = self
            .challenge_bonds
            .get(caller)
            .filter(|bonds| !bonds.is_empty())
            .ok_or(BridgeError::ChallengeBondNotFound)?;

        let (unlocked, locked): (Vec<_>, Vec<_>) =
            bonds.iter().copied().partition(|bond| bond.unlock_at <= now);
        if unlocked.is_empty() {
            let unlock_at = locked
                .iter()
                .map(|bond| bond.unlock_at)
                .min()
                .unwrap_or(now);
            return Err(BridgeError::ChallengeBondLocked { unlock_at });
        }

        let amount = unlocked
            .iter()
            .try_fold(0u64, |sum, bond| sum.checked_add(bond.amount))
            .ok_or(BridgeError::ArithmeticOverflow)?;
        let mut balance = self.balance(caller);
        balance.total = balance
            .total
            .checked_add(amount)
            .ok_or(BridgeError::ArithmeticOverflow)?;

        self.balances.insert(*caller, balance);
        if locked.is_empty() {
            self.challenge_bonds.remove(caller);
        } else {
            self.challenge_bonds.insert(*caller, locked);
        }

        info!("Challenge bond reclaimed by {}: {}", caller, amount);
        self.events.emit(Layer2Event::ChallengeBondReclaimed {
            challenger: *caller,
            amount,
        });

        Ok(amount)
    }

    /// Layer-2 balance including pending deposit credit
    pub fn balance_of(&self, identity: &Pubkey) -> u64 {
        self.balance(identity).total
    }

    pub fn available_balance(&self, identity: &Pubkey) -> u64 {
        self.balance(identity).available()
    }

    pub fn pending_balance(&self, identity: &Pubkey) -> u64 {
        self.balance(identity).pending
    }

    pub fn get_deposit(&self, deposit_id: &[u8; 32]) -> Option<&Deposit> {
        self.deposits.get(deposit_id)
    }

    pub fn get_withdrawal(&self, withdrawal_id: u64) -> Option<&WithdrawalRequest> {
        self.withdrawals.get(withdrawal_id)
    }

    pub fn pending_withdrawals(&self) -> impl Iterator<Item = &WithdrawalRequest> {
        self.withdrawals.pending()
    }

    pub fn total_released(&self) -> u64 {
        self.total_released
    }

    /// Challenge bond currently escrowed for an identity
    pub fn escrowed_challenge_bond(&self, identity: &Pubkey) -> u64 {
        self.challenge_bonds
            .get(identity)
            .map(|bonds| bonds.iter().map(|bond| bond.amount).sum())
            .unwrap_or(0)
    }

    pub fn is_operator(&self, identity: &Pubkey) -> bool {
        self.operators.contains(identity)
    }

    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }

    fn balance(&self, identity: &Pubkey) -> Balance {
        self.balances.get(identity).copied().unwrap_or_default()
    }

    fn ensure_owner(&self, caller: &Pubkey) -> Result<(), BridgeError> {
        if *caller != self.owner {
            return Err(BridgeError::NotOwner);
        }
        Ok(())
    }

    /// Check the caller may challenge and work out the bond it owes
    fn plan_challenge_bond(
        &self,
        caller: &Pubkey,
        now: u64,
    ) -> Result<Option<EscrowedChallengeBond>, BridgeError> {
        match self.config.challenge_access {
            ChallengeAccess::Anyone => Ok(None),
            ChallengeAccess::OwnerOnly if *caller == self.owner => Ok(None),
            ChallengeAccess::OwnerOnly => Err(BridgeError::ChallengeNotPermitted),
            ChallengeAccess::Bonded { amount } => {
                let available = self.available_balance(caller);
                if amount > available {
                    return Err(BridgeError::InsufficientBalance {
                        requested: amount,
                        available,
                    });
                }
                let unlock_at = now
                    .checked_add(self.config.challenge_bond_lock_period)
                    .ok_or(BridgeError::ArithmeticOverflow)?;
                Ok(Some(EscrowedChallengeBond { amount, unlock_at }))
            }
        }
    }

    fn escrow_challenge_bond(
        &mut self,
        caller: &Pubkey,
        bond: Option<EscrowedChallengeBond>,
    ) -> Result<(), BridgeError> {
        let Some(bond) = bond else {
            return Ok(());
        };
        if bond.amount == 0 {
            return Ok(());
        }

        let mut balance = self.balance(caller);
        balance.total = balance
            .total
            .checked_sub(bond.amount)
            .ok_or(BridgeError::ArithmeticOverflow)?;
        self.balances.insert(*caller, balance);
        self.challenge_bonds.entry(*caller).or_default().push(bond);

        self.events.emit(Layer2Event::ChallengeBondEscrowed {
            challenger: *caller,
            amount: bond.amount,
            unlock_at: bond.unlock_at,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: u64 = 100;
    const DEPOSIT_PERIOD: u64 = 50;
    const LOCK: u64 = 200;
    const L1: [u8; 20] = [7; 20];

    fn bridge(challenge_access: ChallengeAccess) -> (Bridge, Pubkey) {
        let owner = Pubkey::new_unique();
        let bridge = Bridge::with_config(
            owner,
            BridgeConfig {
                withdrawal_delay: DELAY,
                deposit_challenge_period: DEPOSIT_PERIOD,
                challenge_bond_lock_period: LOCK,
                challenge_access,
            },
        );
        (bridge, owner)
    }

    /// Credit and finalize a deposit so the balance is spendable
    fn fund(bridge: &mut Bridge, operator: &Pubkey, who: &Pubkey, id: u8, amount: u64) {
        bridge
            .process_deposit(operator, [id; 32], L1, who, amount, 0)
            .unwrap();
        bridge.finalize_deposit(&[id; 32], DEPOSIT_PERIOD).unwrap();
    }

    #[test]
    fn test_operator_management() {
        let (mut bridge, owner) = bridge(ChallengeAccess::Anyone);
        let operator = Pubkey::new_unique();
        let stranger = Pubkey::new_unique();

        assert!(bridge.is_operator(&owner));
        assert_eq!(bridge.add_operator(&stranger, &operator), Err(BridgeError::NotOwner));
        assert_eq!(bridge.add_operator(&owner, &operator), Ok(true));
        assert_eq!(bridge.add_operator(&owner, &operator), Ok(false));
        assert!(bridge.is_operator(&operator));

        assert_eq!(bridge.remove_operator(&stranger, &operator), Err(BridgeError::NotOwner));
        assert_eq!(bridge.remove_operator(&owner, &operator), Ok(true));
        assert_eq!(
            bridge.process_deposit(&operator, [1; 32], L1, &stranger, 10, 0),
            Err(BridgeError::NotOperator)
        );
    }

    #[test]
    fn test_deposit_credit_is_pending_until_finalized() {
        let (mut bridge, owner) = bridge(ChallengeAccess::Anyone);
        let alice = Pubkey::new_unique();

        bridge.process_deposit(&owner, [1; 32], L1, &alice, 300, 10).unwrap();
        assert_eq!(bridge.balance_of(&alice), 300);
        assert_eq!(bridge.available_balance(&alice), 0);
        assert_eq!(
            bridge.transfer(&alice, &owner, 1),
            Err(BridgeError::InsufficientBalance { requested: 1, available: 0 })
        );
        assert_eq!(
            bridge.finalize_deposit(&[1; 32], 10 + DEPOSIT_PERIOD - 1),
            Err(BridgeError::ChallengePeriodNotPassed { ready_at: 10 + DEPOSIT_PERIOD })
        );

        bridge.finalize_deposit(&[1; 32], 10 + DEPOSIT_PERIOD).unwrap();
        assert_eq!(bridge.available_balance(&alice), 300);
        assert!(bridge.get_deposit(&[1; 32]).unwrap().finalized);
        assert_eq!(
            bridge.finalize_deposit(&[1; 32], 10 + DEPOSIT_PERIOD),
            Err(BridgeError::AlreadyFinalized)
        );
    }

    #[test]
    fn test_process_deposit_validation() {
        let (mut bridge, owner) = bridge(ChallengeAccess::Anyone);
        let alice = Pubkey::new_unique();

        assert_eq!(
            bridge.process_deposit(&owner, [1; 32], L1, &alice, 0, 0),
            Err(BridgeError::InvalidAmount)
        );
        assert_eq!(
            bridge.process_deposit(&owner, [1; 32], L1, &Pubkey::default(), 5, 0),
            Err(BridgeError::InvalidAddress)
        );
        assert_eq!(
            bridge.process_deposit(&owner, [1; 32], [0; 20], &alice, 5, 0),
            Err(BridgeError::InvalidAddress)
        );
        bridge.process_deposit(&owner, [1; 32], L1, &alice, 5, 0).unwrap();
        assert_eq!(
            bridge.process_deposit(&owner, [1; 32], L1, &alice, 5, 0),
            Err(BridgeError::DepositAlreadyProcessed("01".repeat(32)))
        );
        assert_eq!(bridge.balance_of(&alice), 5);
    }

    #[test]
    fn test_challenge_deposit_zeroes_credit_once() {
        let (mut bridge, owner) = bridge(ChallengeAccess::Anyone);
        let alice = Pubkey::new_unique();
        let watcher = Pubkey::new_unique();

        bridge.process_deposit(&owner, [1; 32], L1, &alice, 300, 0).unwrap();
        bridge.challenge_deposit(&watcher, &[1; 32], 1).unwrap();

        assert_eq!(bridge.balance_of(&alice), 0);
        assert_eq!(bridge.pending_balance(&alice), 0);
        assert_eq!(bridge.challenge_deposit(&watcher, &[1; 32], 2), Err(BridgeError::AlreadyChallenged));
        assert_eq!(bridge.finalize_deposit(&[1; 32], DEPOSIT_PERIOD), Err(BridgeError::AlreadyChallenged));
        assert!(matches!(
            bridge.challenge_deposit(&watcher, &[9; 32], 2),
            Err(BridgeError::DepositNotFound(_))
        ));
    }

    #[test]
    fn test_finalized_deposit_cannot_be_challenged() {
        let (mut bridge, owner) = bridge(ChallengeAccess::Anyone);
        let alice = Pubkey::new_unique();
        fund(&mut bridge, &owner, &alice, 1, 300);

        assert_eq!(
            bridge.challenge_deposit(&owner, &[1; 32], DEPOSIT_PERIOD),
            Err(BridgeError::AlreadyFinalized)
        );
        assert_eq!(bridge.balance_of(&alice), 300);
    }

    #[test]
    fn test_withdrawal_lifecycle() {
        let (mut bridge, owner) = bridge(ChallengeAccess::Anyone);
        let alice = Pubkey::new_unique();
        fund(&mut bridge, &owner, &alice, 1, 300);

        assert_eq!(
            bridge.initiate_withdrawal(&alice, L1, 301, 0),
            Err(BridgeError::InsufficientBalance { requested: 301, available: 300 })
        );
        assert_eq!(bridge.initiate_withdrawal(&alice, [0; 20], 10, 0), Err(BridgeError::InvalidAddress));
        assert_eq!(bridge.initiate_withdrawal(&alice, L1, 0, 0), Err(BridgeError::InvalidAmount));

        let id = bridge.initiate_withdrawal(&alice, L1, 120, 1_000).unwrap();
        assert_eq!(id, 0);
        assert_eq!(bridge.balance_of(&alice), 180);
        assert_eq!(
            bridge.finalize_withdrawal(id, 1_000 + DELAY - 1),
            Err(BridgeError::WithdrawalDelayNotPassed { ready_at: 1_000 + DELAY })
        );

        assert_eq!(bridge.finalize_withdrawal(id, 1_000 + DELAY), Ok(120));
        assert_eq!(bridge.total_released(), 120);
        assert_eq!(bridge.finalize_withdrawal(id, 1_000 + DELAY), Err(BridgeError::AlreadyFinalized));
        assert_eq!(bridge.challenge_withdrawal(&owner, id, 1_000 + DELAY), Err(BridgeError::AlreadyFinalized));
        assert_eq!(bridge.total_released(), 120);
        assert_eq!(bridge.finalize_withdrawal(5, 0), Err(BridgeError::WithdrawalNotFound(5)));
    }

    #[test]
    fn test_challenge_withdrawal_refunds_owner() {
        let (mut bridge, owner) = bridge(ChallengeAccess::Anyone);
        let alice = Pubkey::new_unique();
        let watcher = Pubkey::new_unique();
        fund(&mut bridge, &owner, &alice, 1, 300);

        let id = bridge.initiate_withdrawal(&alice, L1, 120, 0).unwrap();
        bridge.challenge_withdrawal(&watcher, id, 10).unwrap();

        assert_eq!(bridge.balance_of(&alice), 300);
        assert!(bridge.get_withdrawal(id).unwrap().challenged);
        assert_eq!(bridge.finalize_withdrawal(id, DELAY), Err(BridgeError::AlreadyChallenged));
        assert_eq!(bridge.challenge_withdrawal(&watcher, id, 11), Err(BridgeError::AlreadyChallenged));
        assert_eq!(bridge.total_released(), 0);
        assert_eq!(bridge.pending_withdrawals().count(), 0);
    }

    #[test]
    fn test_transfer_moves_available_balance() {
        let (mut bridge, owner) = bridge(ChallengeAccess::Anyone);
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        fund(&mut bridge, &owner, &alice, 1, 300);

        bridge.transfer(&alice, &bob, 100).unwrap();
        assert_eq!(bridge.balance_of(&alice), 200);
        assert_eq!(bridge.available_balance(&bob), 100);

        bridge.transfer(&alice, &alice, 50).unwrap();
        assert_eq!(bridge.balance_of(&alice), 200);

        assert_eq!(bridge.transfer(&alice, &Pubkey::default(), 1), Err(BridgeError::InvalidAddress));
        assert_eq!(bridge.transfer(&alice, &bob, 0), Err(BridgeError::InvalidAmount));
    }

    #[test]
    fn test_owner_only_challenges() {
        let (mut bridge, owner) = bridge(ChallengeAccess::OwnerOnly);
        let alice = Pubkey::new_unique();
        bridge.process_deposit(&owner, [1; 32], L1, &alice, 300, 0).unwrap();

        assert_eq!(
            bridge.challenge_deposit(&alice, &[1; 32], 1),
            Err(BridgeError::ChallengeNotPermitted)
        );
        assert_eq!(bridge.balance_of(&alice), 300);
        bridge.challenge_deposit(&owner, &[1; 32], 1).unwrap();
        assert_eq!(bridge.balance_of(&alice), 0);
    }

    #[test]
    fn test_bonded_challenge_escrows_and_reclaims() {
        let (mut bridge, owner) = bridge(ChallengeAccess::Bonded { amount: 40 });
        let alice = Pubkey::new_unique();
        let watcher = Pubkey::new_unique();
        fund(&mut bridge, &owner, &alice, 1, 300);
        bridge.process_deposit(&owner, [2; 32], L1, &alice, 500, 0).unwrap();

        assert_eq!(
            bridge.challenge_deposit(&watcher, &[2; 32], 10),
            Err(BridgeError::InsufficientBalance { requested: 40, available: 0 })
        );
        assert_eq!(bridge.balance_of(&alice), 800);

        fund(&mut bridge, &owner, &watcher, 3, 100);
        bridge.challenge_deposit(&watcher, &[2; 32], 10).unwrap();
        assert_eq!(bridge.balance_of(&alice), 300);
        assert_eq!(bridge.balance_of(&watcher), 60);
        assert_eq!(bridge.escrowed_challenge_bond(&watcher), 40);

        assert_eq!(
            bridge.reclaim_challenge_bond(&watcher, 10 + LOCK - 1),
            Err(BridgeError::ChallengeBondLocked { unlock_at: 10 + LOCK })
        );
        assert_eq!(bridge.reclaim_challenge_bond(&watcher, 10 + LOCK), Ok(40));
        assert_eq!(bridge.balance_of(&watcher), 100);
        assert_eq!(bridge.escrowed_challenge_bond(&watcher), 0);
        assert_eq!(
            bridge.reclaim_challenge_bond(&watcher, 10 + LOCK),
            Err(BridgeError::ChallengeBondNotFound)
        );
    }

    #[test]
    fn test_events_are_recorded() {
        let (mut bridge, owner) = bridge(ChallengeAccess::Anyone);
        let alice = Pubkey::new_unique();
        fund(&mut bridge, &owner, &alice, 1, 300);
        bridge.initiate_withdrawal(&alice, L1, 100, 0).unwrap();

        let events = bridge.events_mut().drain();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], Layer2Event::DepositProcessed { amount: 300, .. }));
        assert!(matches!(events[1], Layer2Event::DepositFinalized { .. }));
        assert!(matches!(events[2], Layer2Event::WithdrawalInitiated { withdrawal_id: 0, amount: 100, .. }));
    }
}
