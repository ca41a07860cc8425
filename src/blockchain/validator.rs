use super::{Block, ProofOfWork};
use crate::error::LedgerError;

/// Certifies a whole chain: genesis identity, index continuity, hash
/// linkage, proof validity and well-formed transactions for every block.
#[derive(Debug, Clone, Copy)]
pub struct ChainValidator {
    pow: ProofOfWork,
}

impl ChainValidator {
    pub fn new(pow: ProofOfWork) -> Self {
        Self { pow }
    }

    /// `Ok(true)` only after every block has been checked.
    /// An empty chain is not a ledger state and yields `EmptyChain`.
    pub fn is_valid(&self, chain: &[Block]) -> Result<bool, LedgerError> {
        match self.check(chain) {
            Ok(()) => Ok(true),
            Err(LedgerError::ChainValidationFailure { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Like [`is_valid`](Self::is_valid) but reports the first failing block.
    pub fn check(&self, chain: &[Block]) -> Result<(), LedgerError> {
        let genesis = chain.first().ok_or(LedgerError::EmptyChain)?;
        if !genesis.is_genesis() {
            return Err(LedgerError::ChainValidationFailure {
                index: genesis.index,
                reason: "unexpected genesis block",
            });
        }

        for (pos, pair) in chain.windows(2).enumerate() {
            let (prev, block) = (&pair[0], &pair[1]);

            if block.index != pos as u64 + 2 {
                return Err(LedgerError::ChainValidationFailure {
                    index: block.index,
                    reason: "index out of sequence",
                });
            }

            let prev_hash = prev.hash();
            if block.prev_hash != prev_hash {
                return Err(LedgerError::ChainValidationFailure {
                    index: block.index,
                    reason: "prev_hash mismatch",
                });
            }

            if !self.pow.valid(prev.proof, block.proof, &prev_hash) {
                return Err(LedgerError::ChainValidationFailure {
                    index: block.index,
                    reason: "invalid proof of work",
                });
            }

            if block.transactions.iter().any(|tx| tx.check().is_err()) {
                return Err(LedgerError::ChainValidationFailure {
                    index: block.index,
                    reason: "malformed transaction",
                });
            }
        }

        Ok(())
    }
}
