use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{Block, Ledger, ProofOfWork, Tip};
use crate::error::LedgerError;
use crate::transaction::Transaction;

/// Forge the next block on `ledger`, paying `reward` into it.
///
/// The proof search runs without holding the lock. If the tip moves
/// meanwhile (a local append or an adopted peer chain) the search is
/// abandoned and restarted on the new tip, so the returned block always
/// extends whatever chain is installed when it is sealed.
///
/// Blocks the calling thread until a proof is found.
pub fn mine_next(
    ledger: &Mutex<Ledger>,
    pow: ProofOfWork,
    reward: &Transaction,
) -> Result<Block, LedgerError> {
    mine_next_with(ledger, reward, |tip, generation| {
        pow.mine_until(tip.last_proof, &tip.last_hash, || {
            generation.load(Ordering::Acquire) != tip.generation
        })
    })
}

/// [`mine_next`] with the proof search supplied by the caller.
/// `search` returns `None` when it gave up because the tip moved.
pub(crate) fn mine_next_with<F>(
    ledger: &Mutex<Ledger>,
    reward: &Transaction,
    mut search: F,
) -> Result<Block, LedgerError>
where
    F: FnMut(&Tip, &AtomicU64) -> Option<u64>,
{
    loop {
        let (tip, generation) = {
            let ledger = lock(ledger)?;
            (ledger.tip()?, ledger.generation_handle())
        };
        debug!(
            "MINER - searching proof on top of block #{} (gen={})",
            tip.index, tip.generation
        );

        let Some(proof) = search(&tip, generation.as_ref()) else {
            debug!("MINER - tip moved during search; restarting");
            continue;
        };

        match lock(ledger)?.seal_block(&tip, proof, reward.clone()) {
            Err(LedgerError::StaleProof) => {
                warn!(
                    "MINER - proof {proof} for block #{} is stale; retrying",
                    tip.index + 1
                );
            }
            sealed => return sealed,
        }
    }
}

fn lock(ledger: &Mutex<Ledger>) -> Result<MutexGuard<'_, Ledger>, LedgerError> {
    ledger
        .lock()
        .map_err(|_| LedgerError::Mining("ledger lock poisoned".into()))
}
