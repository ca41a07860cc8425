pub mod block;
pub mod hasher;
pub mod ledger;
pub mod miner;
pub mod pow;
pub mod validator;

pub use block::Block;
pub use ledger::{Ledger, Tip};
pub use pow::ProofOfWork;
pub use validator::ChainValidator;

/// Default Proof-of-Work difficulty (number of leading zero hex digits).
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// Difficulty bounds accepted from configuration.
pub const DIFF_MIN: u32 = 1;
pub const DIFF_MAX: u32 = 6;

/// Genesis block parameters shared by every node.
pub const GENESIS_PREV_HASH: &str = "1";
pub const GENESIS_PROOF: u64 = 100;
pub const GENESIS_TIMESTAMP: f64 = 0.0;

/// Mining reward paid to the node that forges a block.
pub const MINING_REWARD: u64 = 1;

/// Sender used for reward transactions; nobody pays for a mined coin.
pub const MINING_SENDER: &str = "0";
