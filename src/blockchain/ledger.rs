use log::{debug, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::Block;
use crate::error::LedgerError;
use crate::transaction::{Amount, Transaction};

/// Snapshot of the chain tip taken before mining starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tip {
    pub index: u64,
    pub last_proof: u64,
    pub last_hash: String,
    pub generation: u64,
}

/// In-memory chain plus the pool of transactions waiting for the next block.
///
/// Callers serialize access (the node keeps it behind a single mutex), so a
/// transaction is either drained into the block being appended or left for
/// the next one.
#[derive(Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    // Bumped on every tip change; in-flight searches watch it.
    generation: Arc<AtomicU64>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Initialize a new ledger holding only the genesis block.
    pub fn new() -> Self {
        let mut ledger = Self {
            chain: Vec::new(),
            pending: Vec::new(),
            generation: Arc::new(AtomicU64::new(0)),
        };
        ledger.create_genesis();
        ledger
    }

    fn create_genesis(&mut self) {
        self.chain.push(Block::genesis());
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn last_block(&self) -> Result<&Block, LedgerError> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    /// Queue a transaction; returns the index of the block it will land in.
    pub fn queue_transaction(
        &mut self,
        sender: &str,
        recipient: &str,
        amount: impl Into<Amount>,
    ) -> Result<u64, LedgerError> {
        let tx = Transaction::new(sender, recipient, amount)?;
        let next = self.chain.len() as u64 + 1;
        debug!(
            "queued {} -> {} ({}) for block #{}; pending={}",
            tx.sender,
            tx.recipient,
            tx.amount,
            next,
            self.pending.len() + 1
        );
        self.pending.push(tx);
        Ok(next)
    }

    /// Seal the whole pending pool into a new block and append it.
    /// `prev_hash` falls back to the hash of the current last block.
    pub fn append_block(
        &mut self,
        proof: u64,
        prev_hash: Option<&str>,
    ) -> Result<&Block, LedgerError> {
        let prev_hash = match prev_hash.filter(|h| !h.is_empty()) {
            Some(h) => h.to_string(),
            None => self.last_block()?.hash(),
        };
        let index = self.chain.len() as u64 + 1;
        let transactions = std::mem::take(&mut self.pending);

        self.chain.push(Block::new(index, transactions, proof, prev_hash));
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.last_block()
    }

    /// Install `candidate` wholesale. The pending pool is kept.
    pub fn replace_chain(&mut self, candidate: Vec<Block>) -> Result<(), LedgerError> {
        if candidate.is_empty() {
            return Err(LedgerError::EmptyChain);
        }
        info!(
            "replacing chain: {} -> {} blocks",
            self.chain.len(),
            candidate.len()
        );
        self.chain = candidate;
        self.generation.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    /// Replace the chain only if `candidate` is still strictly longer.
    /// The chain may have grown while peers were being queried.
    pub fn adopt_if_longer(&mut self, candidate: Vec<Block>) -> Result<bool, LedgerError> {
        if candidate.len() <= self.chain.len() {
            debug!(
                "candidate of {} blocks no longer beats local {}",
                candidate.len(),
                self.chain.len()
            );
            return Ok(false);
        }
        self.replace_chain(candidate)?;
        Ok(true)
    }

    pub fn tip(&self) -> Result<Tip, LedgerError> {
        let last = self.last_block()?;
        Ok(Tip {
            index: last.index,
            last_proof: last.proof,
            last_hash: last.hash(),
            generation: self.generation.load(Ordering::Acquire),
        })
    }

    /// Shared counter that changes whenever the tip does.
    pub fn generation_handle(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.generation)
    }

    /// Append a block mined against `tip`, paying `reward` into it.
    /// Fails with `StaleProof` (and changes nothing) if the tip has moved.
    pub fn seal_block(
        &mut self,
        tip: &Tip,
        proof: u64,
        reward: Transaction,
    ) -> Result<Block, LedgerError> {
        let current = self.tip()?;
        if current.generation != tip.generation || current.last_hash != tip.last_hash {
            return Err(LedgerError::StaleProof);
        }
        self.queue_transaction(&reward.sender, &reward.recipient, reward.amount)?;
        let block = self.append_block(proof, Some(&tip.last_hash))?;
        Ok(block.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::Ledger;
    use crate::blockchain::validator::tests::mined_chain;
    use crate::blockchain::{Block, ChainValidator, ProofOfWork};
    use crate::error::LedgerError;
    use crate::transaction::{Amount, Transaction};

    #[test]
    fn starts_with_genesis() {
        let ledger = Ledger::new();
        assert_eq!(ledger.len(), 1);
        assert!(ledger.last_block().unwrap().is_genesis());
        assert!(ledger.pending().is_empty());
    }

    #[test]
    fn queue_returns_next_block_index() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.queue_transaction("A", "B", 10u64).unwrap(), 2);
        assert_eq!(ledger.queue_transaction("B", "C", 3u64).unwrap(), 2);
        assert_eq!(ledger.pending().len(), 2);
    }

    #[test]
    fn invalid_transaction_leaves_pool_untouched() {
        let mut ledger = Ledger::new();
        let err = ledger.queue_transaction("", "B", 10u64).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTransaction(_)));
        assert!(ledger.pending().is_empty());
    }

    #[test]
    fn append_drains_exactly_the_pool() {
        let pow = ProofOfWork::new(2);
        let mut ledger = Ledger::new();
        ledger.queue_transaction("A", "B", 10u64).unwrap();

        let last = ledger.last_block().unwrap().clone();
        let hash = last.hash();
        let proof = pow.mine(last.proof, &hash);
        let block = ledger.append_block(proof, Some(&hash)).unwrap().clone();

        assert_eq!(block.index, 2);
        assert_eq!(
            block.transactions,
            vec![Transaction::new("A", "B", 10u64).unwrap()]
        );
        assert!(ledger.pending().is_empty());

        // Queued after the append: goes to the following block.
        assert_eq!(ledger.queue_transaction("C", "D", 1u64).unwrap(), 3);
        assert_eq!(ledger.last_block().unwrap().transactions.len(), 1);
        assert!(
            ChainValidator::new(pow)
                .is_valid(ledger.chain())
                .unwrap()
        );
    }

    #[test]
    fn concurrent_queue_and_append_neither_lose_nor_duplicate() {
        use std::sync::{Arc, Mutex};
        use std::thread;

        let ledger = Arc::new(Mutex::new(Ledger::new()));
        let writers: Vec<_> = (0..4)
            .map(|w| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || {
                    for i in 1..=250u64 {
                        ledger
                            .lock()
                            .unwrap()
                            .queue_transaction(&format!("w{w}"), "sink", i)
                            .unwrap();
                    }
                })
            })
            .collect();

        for _ in 0..20 {
            ledger.lock().unwrap().append_block(0, None).unwrap();
            thread::yield_now();
        }
        for h in writers {
            h.join().unwrap();
        }
        let mut ledger = ledger.lock().unwrap();
        ledger.append_block(0, None).unwrap();

        let sealed: Vec<_> = ledger
            .chain()
            .iter()
            .flat_map(|b| b.transactions.iter())
            .collect();
        assert_eq!(sealed.len(), 1000);
        assert!(ledger.pending().is_empty());
        for w in 0..4 {
            let amounts: Vec<Amount> = sealed
                .iter()
                .filter(|t| t.sender == format!("w{w}"))
                .map(|t| t.amount.clone())
                .collect();
            assert_eq!(amounts, (1..=250u64).map(Amount::from).collect::<Vec<_>>());
        }
    }

    #[test]
    fn append_falls_back_to_last_hash() {
        let mut ledger = Ledger::new();
        let expected = Block::genesis().hash();
        let block = ledger.append_block(1, None).unwrap();
        assert_eq!(block.prev_hash, expected);
        let block = ledger.append_block(1, Some("")).unwrap().clone();
        assert_eq!(block.prev_hash, ledger.chain()[1].hash());
    }

    #[test]
    fn replace_rejects_empty_chain() {
        let mut ledger = Ledger::new();
        assert!(matches!(
            ledger.replace_chain(Vec::new()),
            Err(LedgerError::EmptyChain)
        ));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn adopt_only_when_longer() {
        let pow = ProofOfWork::new(1);
        let mut ledger = Ledger::new();
        ledger.queue_transaction("A", "B", 1u64).unwrap();

        assert!(!ledger.adopt_if_longer(vec![Block::genesis()]).unwrap());
        assert!(ledger.adopt_if_longer(mined_chain(&pow, 3)).unwrap());
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.pending().len(), 1);
    }

    #[test]
    fn seal_rejects_stale_tip() {
        let pow = ProofOfWork::new(1);
        let mut ledger = Ledger::new();
        let tip = ledger.tip().unwrap();
        let proof = pow.mine(tip.last_proof, &tip.last_hash);

        ledger.replace_chain(mined_chain(&pow, 2)).unwrap();

        let reward = Transaction::new("0", "me", 1u64).unwrap();
        assert!(matches!(
            ledger.seal_block(&tip, proof, reward),
            Err(LedgerError::StaleProof)
        ));
        assert_eq!(ledger.len(), 2);
        assert!(ledger.pending().is_empty());
    }

    #[test]
    fn seal_appends_reward_with_pool() {
        let pow = ProofOfWork::new(2);
        let mut ledger = Ledger::new();
        ledger.queue_transaction("A", "B", 10u64).unwrap();
        let tip = ledger.tip().unwrap();
        let proof = pow.mine(tip.last_proof, &tip.last_hash);

        let reward = Transaction::new("0", "me", 1u64).unwrap();
        let block = ledger.seal_block(&tip, proof, reward.clone()).unwrap();

        assert_eq!(block.transactions.len(), 2);
        assert_eq!(block.transactions[1], reward);
        assert_eq!(block.prev_hash, tip.last_hash);
        assert!(ledger.tip().unwrap().generation > tip.generation);
        assert!(
            ChainValidator::new(pow)
                .is_valid(ledger.chain())
                .unwrap()
        );
    }
}
