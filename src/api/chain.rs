use actix_web::{HttpResponse, get, web};

use super::models::{AppState, ChainResponse, ValidateResponse};
use crate::error::LedgerError;

/// Get the full chain. Peers read this during consensus.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> HttpResponse {
    let ledger = state.ledger();
    HttpResponse::Ok().json(ChainResponse {
        chain: ledger.chain(),
        length: ledger.len(),
    })
}

/// Validate the whole local chain.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> Result<HttpResponse, LedgerError> {
    let ledger = state.ledger();
    Ok(HttpResponse::Ok().json(ValidateResponse {
        valid: state.validator.is_valid(ledger.chain())?,
        length: ledger.len(),
    }))
}
