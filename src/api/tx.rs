use actix_web::{HttpResponse, get, post, web};
use log::{info, warn};
use serde_json::Value;

use super::models::{AppState, NewTxRequest, NewTxResponse, PendingResponse};
use crate::error::LedgerError;
use crate::transaction::Amount;

/// Queue a transaction for the next block.
#[post("/transactions/new/")]
pub async fn post_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTxRequest>,
) -> Result<HttpResponse, LedgerError> {
    let NewTxRequest {
        sender,
        recipient,
        amount,
    } = body.into_inner();

    let (Some(sender), Some(recipient), Some(amount)) = (sender, recipient, amount) else {
        warn!("POST /transactions/new/ - rejected: missing values");
        return Err(LedgerError::InvalidTransaction(
            "sender, recipient and amount are required".into(),
        ));
    };
    let amount = parse_amount(amount).inspect_err(|e| {
        warn!("POST /transactions/new/ - rejected: {e}");
    })?;

    let index = state
        .ledger()
        .queue_transaction(&sender, &recipient, amount.clone())?;
    info!("POST /transactions/new/ - {sender} -> {recipient} ({amount}) queued for block #{index}");

    Ok(HttpResponse::Created().json(NewTxResponse {
        message: format!("Transaction will be added to Block {index}"),
        index,
    }))
}

fn parse_amount(value: Value) -> Result<Amount, LedgerError> {
    match value {
        Value::Number(n) => Amount::try_from(n),
        other => Err(LedgerError::InvalidTransaction(format!(
            "amount must be a number, got {other}"
        ))),
    }
}

/// List transactions waiting for the next block.
#[get("/transactions/pending/")]
pub async fn get_pending(state: web::Data<AppState>) -> HttpResponse {
    let ledger = state.ledger();
    HttpResponse::Ok().json(PendingResponse {
        size: ledger.pending().len(),
        transactions: ledger.pending(),
    })
}
