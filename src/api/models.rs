use crate::blockchain::{Block, ChainValidator, Ledger, ProofOfWork};
use crate::config::NodeConfig;
use crate::consensus::{ConsensusResolver, HttpChainSource, NodeRegistry};
use crate::error::StartupError;
use crate::transaction::Transaction;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};

/// Shared application state: the ledger, known peers and consensus plumbing.
pub struct AppState {
    pub ledger: Mutex<Ledger>,
    pub registry: Mutex<NodeRegistry>,
    pub pow: ProofOfWork,
    pub validator: ChainValidator,
    pub resolver: ConsensusResolver,
    pub chain_source: HttpChainSource,
    pub node_id: String,
}

impl AppState {
    /// Build the node state. Refuses to start if the freshly created chain
    /// does not pass validation or a bootstrap peer is malformed.
    pub fn new(config: &NodeConfig) -> Result<Self, StartupError> {
        let pow = ProofOfWork::new(config.difficulty);
        let validator = ChainValidator::new(pow);

        let ledger = Ledger::new();
        validator
            .check(ledger.chain())
            .map_err(StartupError::Genesis)?;

        let mut registry = NodeRegistry::new();
        registry
            .register_all(&config.peers)
            .map_err(StartupError::Peers)?;
        if !registry.is_empty() {
            info!("bootstrap peers: {:?}", registry.addresses());
        }

        Ok(Self {
            ledger: Mutex::new(ledger),
            registry: Mutex::new(registry),
            pow,
            validator,
            resolver: ConsensusResolver::new(validator),
            chain_source: HttpChainSource::new(config.peer_timeout)?,
            node_id: config.node_id.clone(),
        })
    }

    pub fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().expect("mutex poisoned")
    }

    pub fn registry(&self) -> MutexGuard<'_, NodeRegistry> {
        self.registry.lock().expect("mutex poisoned")
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse<'a> {
    pub chain: &'a [Block],
    pub length: usize,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub message: &'static str,
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub prev_hash: String,
}

/* ---------- TX API Models ---------- */

/// Fields are optional so a missing one is reported as an invalid
/// transaction rather than a JSON decode failure.
#[derive(Deserialize)]
pub struct NewTxRequest {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    // Kept loose so a bad amount is reported like any other invalid field.
    pub amount: Option<Value>,
}

#[derive(Serialize)]
pub struct NewTxResponse {
    pub message: String,
    pub index: u64,
}

#[derive(Serialize)]
pub struct PendingResponse<'a> {
    pub size: usize,
    pub transactions: &'a [Transaction],
}

/* ---------- Node API Models ---------- */

#[derive(Deserialize)]
pub struct RegisterNodesRequest {
    pub nodes: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct NodesResponse {
    pub message: &'static str,
    pub total_nodes: Vec<String>,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    pub message: &'static str,
    pub replaced: bool,
    pub chain: Vec<Block>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub node_id: String,
    pub height: usize,
    pub difficulty: u32,
    pub last_interval_secs: Option<f64>,
    pub pending_size: usize,
    pub peers: usize,
}
