use actix_web::{HttpResponse, get, post, web};
use log::{debug, info};

use super::models::{AppState, NodesResponse, RegisterNodesRequest, ResolveResponse};
use crate::error::LedgerError;

/// Register a batch of peers. Either all addresses are stored or none.
#[post("/nodes/register/")]
pub async fn register_nodes(
    state: web::Data<AppState>,
    body: web::Json<RegisterNodesRequest>,
) -> Result<HttpResponse, LedgerError> {
    let Some(nodes) = body.into_inner().nodes.filter(|n| !n.is_empty()) else {
        return Ok(HttpResponse::BadRequest().body("Error: Please supply a valid list of nodes"));
    };

    let mut registry = state.registry();
    registry.register_all(&nodes)?;
    info!("registered {} node(s); {} known", nodes.len(), registry.len());

    Ok(HttpResponse::Created().json(NodesResponse {
        message: "New nodes have been added",
        total_nodes: registry.addresses(),
    }))
}

#[get("/nodes/")]
pub async fn list_nodes(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(NodesResponse {
        message: "Known nodes",
        total_nodes: state.registry().addresses(),
    })
}

/// Run consensus: adopt the longest valid chain among peers.
/// Peers are queried without holding any lock; the candidate is installed
/// under the ledger lock only if it still beats the local chain.
#[get("/nodes/resolve/")]
pub async fn resolve(state: web::Data<AppState>) -> Result<HttpResponse, LedgerError> {
    let current = state.ledger().chain().to_vec();
    let peers = state.registry().addresses();
    debug!("resolving against {} peer(s)", peers.len());

    let resolution = state
        .resolver
        .resolve(current, &peers, &state.chain_source)
        .await;

    let (replaced, chain) = {
        let mut ledger = state.ledger();
        let replaced = resolution.replaced && ledger.adopt_if_longer(resolution.chain)?;
        (replaced, ledger.chain().to_vec())
    };

    Ok(HttpResponse::Ok().json(ResolveResponse {
        message: if replaced {
            "Our chain was replaced"
        } else {
            "Our chain is authoritative"
        },
        replaced,
        chain,
    }))
}
