use super::DEFAULT_DIFFICULTY;
use super::hasher::sha256_hex;

/// How many candidates to try between two cancellation checks.
const CANCEL_CHECK_INTERVAL: u64 = 4096;

/// Proof-of-Work puzzle: find `proof` such that
/// `sha256("{last_proof}{proof}{last_hash}")` starts with `difficulty` zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: u32,
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY)
    }
}

impl ProofOfWork {
    pub fn new(difficulty: u32) -> Self {
        Self { difficulty }
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Check a candidate proof against the previous block's proof and hash.
    pub fn valid(&self, last_proof: u64, proof: u64, last_hash: &str) -> bool {
        let guess = format!("{last_proof}{proof}{last_hash}");
        let digest = sha256_hex(guess.as_bytes());
        let wanted = self.difficulty as usize;
        digest.len() >= wanted && digest.bytes().take(wanted).all(|c| c == b'0')
    }

    /// Linear search from 0 for the first valid proof. Unbounded.
    pub fn mine(&self, last_proof: u64, last_hash: &str) -> u64 {
        let mut proof = 0;
        while !self.valid(last_proof, proof, last_hash) {
            proof += 1;
        }
        proof
    }

    /// Same search as [`mine`](Self::mine), but polls `cancelled` every few
    /// thousand candidates and gives up with `None` once it returns true.
    pub fn mine_until<F>(&self, last_proof: u64, last_hash: &str, cancelled: F) -> Option<u64>
    where
        F: Fn() -> bool,
    {
        let mut proof = 0;
        loop {
            if proof % CANCEL_CHECK_INTERVAL == 0 && cancelled() {
                return None;
            }
            if self.valid(last_proof, proof, last_hash) {
                return Some(proof);
            }
            proof += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ProofOfWork;
    use crate::blockchain::Block;
    use crate::blockchain::hasher::sha256_hex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn mined_proof_is_valid() {
        let pow = ProofOfWork::new(3);
        let last = Block::genesis();
        let proof = pow.mine(last.proof, &last.hash());
        assert!(pow.valid(last.proof, proof, &last.hash()));
    }

    #[test]
    fn mine_returns_first_valid_proof() {
        let pow = ProofOfWork::new(2);
        let proof = pow.mine(100, "deadbeef");
        for earlier in 0..proof {
            assert!(!pow.valid(100, earlier, "deadbeef"));
        }
    }

    #[test]
    fn valid_matches_digest_prefix() {
        let pow = ProofOfWork::new(2);
        for proof in 0..500u64 {
            let digest = sha256_hex(format!("7{proof}cafe").as_bytes());
            assert_eq!(pow.valid(7, proof, "cafe"), digest.starts_with("00"));
        }
    }

    #[test]
    fn default_difficulty_is_four_zeros() {
        let pow = ProofOfWork::default();
        assert_eq!(pow.difficulty(), 4);
        let last = Block::genesis();
        let proof = pow.mine(last.proof, &last.hash());
        let digest = sha256_hex(format!("{}{}{}", last.proof, proof, last.hash()).as_bytes());
        assert!(digest.starts_with("0000"));
    }

    #[test]
    fn mine_until_agrees_with_mine() {
        let pow = ProofOfWork::new(2);
        assert_eq!(pow.mine_until(5, "ab", || false), Some(pow.mine(5, "ab")));
    }

    #[test]
    fn mine_until_stops_when_cancelled() {
        // Unreachable difficulty; only cancellation can end the search.
        let pow = ProofOfWork::new(64);
        let polls = AtomicUsize::new(0);
        let found = pow.mine_until(1, "x", || polls.fetch_add(1, Ordering::SeqCst) >= 3);
        assert_eq!(found, None);
        assert_eq!(polls.load(Ordering::SeqCst), 4);
    }
}
