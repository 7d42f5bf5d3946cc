// src/bridge/withdrawal_handler.rs
//! Withdrawal requests for the bridge
//!
//! The layer-2 balance is debited when the request is made. The funds are
//! released on L1 only after the withdrawal delay, and only if nobody
//! challenged the request in the meantime.

use crate::error_handling::BridgeError;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

/// Withdrawal from layer-2 to L1
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    /// Dense id starting at 0
    pub id: u64,

    /// Layer-2 identity debited
    pub owner: Pubkey,

    /// L1 recipient address
    pub l1_recipient: [u8; 20],

    pub amount: u64,

    pub created_at: u64,

    pub finalized: bool,

    pub challenged: bool,
}

impl WithdrawalRequest {
    /// Earliest time the withdrawal may be released
    pub fn ready_at(&self, withdrawal_delay: u64) -> u64 {
        self.created_at.saturating_add(withdrawal_delay)
    }
}

/// All withdrawal requests, indexed by id
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct WithdrawalQueue {
    requests: Vec<WithdrawalRequest>,
}

impl WithdrawalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> u64 {
        self.requests.len() as u64
    }

    /// Record a request and return its id
    pub fn push(
        &mut self,
        owner: Pubkey,
        l1_recipient: [u8; 20],
        amount: u64,
        now: u64,
    ) -> u64 {
        let id = self.next_id();
        self.requests.push(WithdrawalRequest {
            id,
            owner,
            l1_recipient,
            amount,
            created_at: now,
            finalized: false,
            challenged: false,
        });
        id
    }

    pub fn get(&self, id: u64) -> Option<&WithdrawalRequest> {
        self.requests.get(usize::try_from(id).ok()?)
    }

    /// Look up a request or fail with `WithdrawalNotFound`
    pub fn require(&self, id: u64) -> Result<&WithdrawalRequest, BridgeError> {
        self.get(id).ok_or(BridgeError::WithdrawalNotFound(id))
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut WithdrawalRequest> {
        self.requests.get_mut(usize::try_from(id).ok()?)
    }

    pub fn len(&self) -> u64 {
        self.requests.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Requests neither released nor reversed yet
    pub fn pending(&self) -> impl Iterator<Item = &WithdrawalRequest> {
        self.requests
            .iter()
            .filter(|request| !request.finalized && !request.challenged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_dense() {
        let mut queue = WithdrawalQueue::new();
        let owner = Pubkey::new_unique();

        assert_eq!(queue.push(owner, [1; 20], 10, 0), 0);
        assert_eq!(queue.push(owner, [2; 20], 20, 5), 1);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.get(1).unwrap().ready_at(100), 105);
        assert_eq!(queue.require(2), Err(BridgeError::WithdrawalNotFound(2)));
    }

    #[test]
    fn test_pending_skips_settled() {
        let mut queue = WithdrawalQueue::new();
        let owner = Pubkey::new_unique();
        queue.push(owner, [1; 20], 10, 0);
        queue.push(owner, [1; 20], 20, 0);
        queue.push(owner, [1; 20], 30, 0);

        queue.get_mut(0).unwrap().finalized = true;
        queue.get_mut(2).unwrap().challenged = true;

        let pending: Vec<u64> = queue.pending().map(|request| request.id).collect();
        assert_eq!(pending, vec![1]);
    }
}
