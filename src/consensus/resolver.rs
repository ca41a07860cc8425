//! Longest-valid-chain resolution against registered peers.

use futures_util::future::join_all;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::blockchain::{Block, ChainValidator};
use crate::error::LedgerError;

/// What a peer's "get chain" endpoint returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerChain {
    pub chain: Vec<Block>,
    pub length: usize,
}

/// Fetches a peer's chain. Transport and status failures come back as
/// `PeerUnreachable`.
#[allow(async_fn_in_trait)]
pub trait ChainSource {
    async fn fetch_chain(&self, peer: &str) -> Result<PeerChain, LedgerError>;
}

/// Outcome of a resolution round.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub replaced: bool,
    /// The adopted chain when `replaced`, otherwise the current one.
    pub chain: Vec<Block>,
}

#[derive(Debug, Clone, Copy)]
pub struct ConsensusResolver {
    validator: ChainValidator,
}

impl ConsensusResolver {
    pub fn new(validator: ChainValidator) -> Self {
        Self { validator }
    }

    /// Query every peer, keep the longest chain that validates, and decide
    /// once the scan is complete. Unreachable or invalid peers are skipped.
    pub async fn resolve<S: ChainSource>(
        &self,
        current: Vec<Block>,
        peers: &[String],
        source: &S,
    ) -> Resolution {
        let responses = join_all(peers.iter().map(|peer| source.fetch_chain(peer))).await;

        let mut best: Option<Vec<Block>> = None;
        let mut best_len = current.len();

        for (peer, response) in peers.iter().zip(responses) {
            let PeerChain { chain, length } = match response {
                Ok(pc) => pc,
                Err(e) => {
                    warn!("skipping peer {peer}: {e}");
                    continue;
                }
            };
            debug!("peer {peer} reports {length} blocks (best so far {best_len})");

            if length <= best_len {
                continue;
            }
            if chain.len() != length {
                warn!(
                    "peer {peer} declared {length} blocks but sent {}",
                    chain.len()
                );
                continue;
            }
            match self.validator.check(&chain) {
                Ok(()) => {
                    best_len = length;
                    best = Some(chain);
                }
                Err(e) => warn!("discarding chain from {peer}: {e}"),
            }
        }

        match best {
            Some(chain) => {
                info!(
                    "consensus: adopting chain of {} blocks (local had {})",
                    chain.len(),
                    current.len()
                );
                Resolution {
                    replaced: true,
                    chain,
                }
            }
            None => Resolution {
                replaced: false,
                chain: current,
            },
        }
    }
}
