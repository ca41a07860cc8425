use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::hasher;
use super::{GENESIS_PREV_HASH, GENESIS_PROOF, GENESIS_TIMESTAMP};
use crate::transaction::Transaction;

/// A single block in the ledger holding the transactions it sealed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: f64, // seconds since epoch (UTC)
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub prev_hash: String,
}

impl Block {
    /// The fixed first block. Every node builds the same one.
    pub fn genesis() -> Self {
        Self {
            index: 1,
            timestamp: GENESIS_TIMESTAMP,
            transactions: Vec::new(),
            proof: GENESIS_PROOF,
            prev_hash: GENESIS_PREV_HASH.to_string(),
        }
    }

    /// Create a block stamped with the current time.
    pub fn new(index: u64, transactions: Vec<Transaction>, proof: u64, prev_hash: String) -> Self {
        Self {
            index,
            timestamp: now_secs(),
            transactions,
            proof,
            prev_hash,
        }
    }

    pub fn is_genesis(&self) -> bool {
        *self == Self::genesis()
    }

    /// SHA-256 of the canonical encoding, lowercase hex.
    pub fn hash(&self) -> String {
        hasher::hash_block(self)
    }
}

fn now_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::Block;
    use crate::transaction::Transaction;

    #[test]
    fn genesis_is_fixed() {
        let a = Block::genesis();
        let b = Block::genesis();
        assert_eq!(a, b);
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.index, 1);
        assert_eq!(a.prev_hash, "1");
        assert!(a.is_genesis());
    }

    #[test]
    fn new_block_is_timestamped_now() {
        let b = Block::new(2, vec![], 35293, "abc".into());
        assert!(b.timestamp > 1_600_000_000.0);
        assert!(!b.is_genesis());
    }

    #[test]
    fn tampering_changes_hash() {
        let tx = Transaction::new("alice", "bob", 5u64).unwrap();
        let mut b = Block::new(2, vec![tx], 7, "prev".into());
        let before = b.hash();

        b.transactions.push(Transaction::new("mallory", "mallory", 100u64).unwrap());

        assert_ne!(before, b.hash());
    }
}
