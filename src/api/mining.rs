use actix_web::{HttpResponse, get, web};
use log::info;
use std::time::Instant;

use super::models::{AppState, MineResponse};
use crate::blockchain::{MINING_REWARD, MINING_SENDER, miner};
use crate::error::LedgerError;
use crate::transaction::Transaction;

/// Forge a new block. The proof search runs on the blocking pool; see
/// [`miner::mine_next`] for how a tip change during the search is handled.
#[get("/mine/")]
pub async fn mine(state: web::Data<AppState>) -> Result<HttpResponse, LedgerError> {
    let t0 = Instant::now();
    let reward = Transaction::new(MINING_SENDER, &state.node_id, MINING_REWARD)?;

    let st = state.clone();
    let block = web::block(move || miner::mine_next(&st.ledger, st.pow, &reward))
        .await
        .map_err(|e| LedgerError::Mining(e.to_string()))??;

    info!(
        "MINER - forged block #{} (proof={}, txs={}, {} ms)",
        block.index,
        block.proof,
        block.transactions.len(),
        t0.elapsed().as_millis()
    );

    Ok(HttpResponse::Ok().json(MineResponse {
        message: "New Block Forged",
        index: block.index,
        transactions: block.transactions,
        proof: block.proof,
        prev_hash: block.prev_hash,
    }))
}
