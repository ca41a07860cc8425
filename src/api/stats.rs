use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, StatsResponse};

#[get("/stats/")]
pub async fn get_stats(state: web::Data<AppState>) -> impl Responder {
    // Snapshot the ledger first, then the registry (short separate locks)
    let (height, last_interval_secs, pending_size) = {
        let ledger = state.ledger();
        let chain = ledger.chain();
        let last_interval = match chain {
            [.., older, newer] if !older.is_genesis() => {
                Some((newer.timestamp - older.timestamp).max(0.0))
            }
            _ => None,
        };
        (chain.len(), last_interval, ledger.pending().len())
    };
    let peers = state.registry().len();

    HttpResponse::Ok().json(StatsResponse {
        node_id: state.node_id.clone(),
        height,
        difficulty: state.pow.difficulty(),
        last_interval_secs,
        pending_size,
        peers,
    })
}
