// src/sequencer/message_queue.rs
//! Inbound message queue
//!
//! Any caller may enqueue a message for the rollup. Messages are consumed in
//! arrival order, so the included messages always form a prefix of the queue
//! and a single cursor marks where the pending ones start.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use solana_program::pubkey::Pubkey;
use std::ops::Range;

/// Message queued for inclusion
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct QueuedMessage {
    /// Position in the queue
    pub queue_index: u64,

    pub sender: Pubkey,

    pub target: Pubkey,

    /// Compute budget granted to the message on layer 2
    pub compute_budget: u64,

    /// Digest of sender, target, budget and calldata
    pub data_hash: [u8; 32],

    pub queued_at: u64,

    /// Only ever flips false -> true
    pub included: bool,
}

impl QueuedMessage {
    /// Earliest time the message may be force-included
    ///
    /// A message becomes includable once its age exceeds the period.
    pub fn eligible_at(&self, force_inclusion_period: u64) -> u64 {
        self.queued_at
            .saturating_add(force_inclusion_period)
            .saturating_add(1)
    }

    /// Whether the message is old enough to be force-included
    pub fn is_force_includable(&self, now: u64, force_inclusion_period: u64) -> bool {
        now >= self.eligible_at(force_inclusion_period)
    }
}

/// Digest identifying a queued message
pub fn message_hash(sender: &Pubkey, target: &Pubkey, compute_budget: u64, data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(sender.as_ref());
    hasher.update(target.as_ref());
    hasher.update(compute_budget.to_le_bytes());
    hasher.update(data);
    hasher.finalize().into()
}

/// Append-only queue of inbound messages
#[derive(Debug, Clone, Default, BorshSerialize, BorshDeserialize)]
pub struct MessageQueue {
    messages: Vec<QueuedMessage>,

    /// Index of the first message not yet included
    next_pending: u64,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its queue index
    pub fn push(
        &mut self,
        sender: Pubkey,
        target: Pubkey,
        compute_budget: u64,
        data_hash: [u8; 32],
        queued_at: u64,
    ) -> u64 {
        let queue_index = self.messages.len() as u64;
        self.messages.push(QueuedMessage {
            queue_index,
            sender,
            target,
            compute_budget,
            data_hash,
            queued_at,
            included: false,
        });
        queue_index
    }

    pub fn get(&self, queue_index: u64) -> Option<&QueuedMessage> {
        self.messages.get(usize::try_from(queue_index).ok()?)
    }

    pub fn len(&self) -> u64 {
        self.messages.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn pending_count(&self) -> u64 {
        self.len() - self.next_pending
    }

    /// Oldest message not yet included
    pub fn oldest_pending(&self) -> Option<&QueuedMessage> {
        self.get(self.next_pending)
    }

    /// Queue indices of at most `limit` pending messages that may be
    /// force-included at `now`
    pub fn eligible(&self, now: u64, force_inclusion_period: u64, limit: u64) -> Range<u64> {
        let start = self.next_pending;
        let eligible = self.messages[start as usize..]
            .iter()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .take_while(|message| message.is_force_includable(now, force_inclusion_period))
            .count() as u64;
        start..start + eligible
    }

    /// Pending messages in a range, for computing a batch over them
    pub fn slice(&self, range: &Range<u64>) -> &[QueuedMessage] {
        &self.messages[range.start as usize..range.end as usize]
    }

    /// Mark a range of pending messages as included and advance the cursor
    ///
    /// The range must start at the cursor, as returned by [`Self::eligible`].
    pub fn mark_included(&mut self, range: Range<u64>) {
        debug_assert_eq!(range.start, self.next_pending);
        for message in &mut self.messages[range.start as usize..range.end as usize] {
            message.included = true;
        }
        self.next_pending = range.end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligible_is_a_prefix_of_pending() {
        let mut queue = MessageQueue::new();
        let sender = Pubkey::new_unique();
        let target = Pubkey::new_unique();
        queue.push(sender, target, 100, [1; 32], 0);
        queue.push(sender, target, 100, [2; 32], 10);
        queue.push(sender, target, 100, [3; 32], 50);

        assert_eq!(queue.eligible(5, 10, u64::MAX), 0..0);
        assert_eq!(queue.eligible(20, 10, u64::MAX), 0..1);
        assert_eq!(queue.eligible(21, 10, u64::MAX), 0..2);
        assert_eq!(queue.eligible(61, 10, u64::MAX), 0..3);
        assert_eq!(queue.eligible(61, 10, 2), 0..2);
    }

    #[test]
    fn test_age_must_exceed_period() {
        let mut queue = MessageQueue::new();
        let sender = Pubkey::new_unique();
        queue.push(sender, sender, 1, [1; 32], 100);

        let message = queue.get(0).unwrap();
        assert_eq!(message.eligible_at(50), 151);
        assert!(!message.is_force_includable(150, 50));
        assert!(message.is_force_includable(151, 50));
    }

    #[test]
    fn test_mark_included_advances_cursor() {
        let mut queue = MessageQueue::new();
        let sender = Pubkey::new_unique();
        for i in 0..3 {
            queue.push(sender, sender, 1, [i; 32], u64::from(i));
        }

        let range = queue.eligible(2, 0, u64::MAX);
        assert_eq!(range, 0..2);
        queue.mark_included(range);

        assert_eq!(queue.pending_count(), 1);
        assert!(queue.get(0).unwrap().included);
        assert!(queue.get(1).unwrap().included);
        assert!(!queue.get(2).unwrap().included);
        assert_eq!(queue.oldest_pending().unwrap().queue_index, 2);
        assert_eq!(queue.eligible(100, 0, u64::MAX), 2..3);
    }

    #[test]
    fn test_message_hash_binds_every_field() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let base = message_hash(&a, &b, 10, b"data");
        assert_ne!(base, message_hash(&b, &a, 10, b"data"));
        assert_ne!(base, message_hash(&a, &b, 11, b"data"));
        assert_ne!(base, message_hash(&a, &b, 10, b"date"));
    }
}
