// src/bridge/deposit_handler.rs
//! Deposit records for the bridge
//!
//! A deposit credits a layer-2 balance as soon as an operator relays it, but
//! that credit stays pending until the deposit challenge period has passed
//! and the deposit is finalized.

use crate::error_handling::BridgeError;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use std::collections::BTreeMap;

/// Deposit relayed from L1
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Deposit {
    /// L1 deposit identifier
    pub id: [u8; 32],

    /// L1 sender address
    pub l1_sender: [u8; 20],

    /// Layer-2 identity credited
    pub recipient: Pubkey,

    pub amount: u64,

    pub created_at: u64,

    pub finalized: bool,

    pub challenged: bool,
}

impl Deposit {
    /// Earliest time the deposit may finalize
    pub fn finalizable_at(&self, deposit_challenge_period: u64) -> u64 {
        self.created_at.saturating_add(deposit_challenge_period)
    }

    /// Settled deposits can be neither challenged nor finalized again
    pub fn ensure_open(&self) -> Result<(), BridgeError> {
        if self.finalized {
            return Err(BridgeError::AlreadyFinalized);
        }
        if self.challenged {
            return Err(BridgeError::AlreadyChallenged);
        }
        Ok(())
    }
}

/// Deposits keyed by their L1 identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct DepositRegistry {
    deposits: BTreeMap<[u8; 32], Deposit>,
}

impl DepositRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &[u8; 32]) -> bool {
        self.deposits.contains_key(id)
    }

    pub fn insert(&mut self, deposit: Deposit) {
        self.deposits.insert(deposit.id, deposit);
    }

    pub fn get(&self, id: &[u8; 32]) -> Option<&Deposit> {
        self.deposits.get(id)
    }

    /// Look up a deposit or fail with `DepositNotFound`
    pub fn require(&self, id: &[u8; 32]) -> Result<&Deposit, BridgeError> {
        self.deposits
            .get(id)
            .ok_or_else(|| BridgeError::DepositNotFound(hex::encode(id)))
    }

    pub fn get_mut(&mut self, id: &[u8; 32]) -> Option<&mut Deposit> {
        self.deposits.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.deposits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deposits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deposit(id: u8) -> Deposit {
        Deposit {
            id: [id; 32],
            l1_sender: [1; 20],
            recipient: Pubkey::new_unique(),
            amount: 50,
            created_at: 10,
            finalized: false,
            challenged: false,
        }
    }

    #[test]
    fn test_require_reports_hex_id() {
        let mut registry = DepositRegistry::new();
        registry.insert(deposit(1));

        assert!(registry.contains(&[1; 32]));
        assert_eq!(registry.require(&[1; 32]).unwrap().amount, 50);
        assert_eq!(
            registry.require(&[0xab; 32]),
            Err(BridgeError::DepositNotFound("ab".repeat(32)))
        );
    }

    #[test]
    fn test_ensure_open() {
        let mut d = deposit(1);
        assert_eq!(d.ensure_open(), Ok(()));
        assert_eq!(d.finalizable_at(100), 110);

        d.challenged = true;
        assert_eq!(d.ensure_open(), Err(BridgeError::AlreadyChallenged));

        d.finalized = true;
        assert_eq!(d.ensure_open(), Err(BridgeError::AlreadyFinalized));
    }
}
