use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised by the ledger core and surfaced through the HTTP layer.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("invalid peer address: {0:?}")]
    InvalidAddress(String),

    /// Only reachable if the genesis invariant was broken.
    #[error("chain has no blocks")]
    EmptyChain,

    #[error("chain invalid at block #{index}: {reason}")]
    ChainValidationFailure { index: u64, reason: &'static str },

    #[error("peer {peer} unreachable: {reason}")]
    PeerUnreachable { peer: String, reason: String },

    /// The tip moved while a proof was being searched for.
    #[error("proof was mined against a stale tip")]
    StaleProof,

    #[error("mining worker failed: {0}")]
    Mining(String),
}

/// Reasons a node refuses to start.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("genesis check failed: {0}")]
    Genesis(LedgerError),

    #[error("bootstrap peers rejected: {0}")]
    Peers(LedgerError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for LedgerError {
    fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::InvalidTransaction(_) | LedgerError::InvalidAddress(_) => {
                StatusCode::BAD_REQUEST
            }
            LedgerError::PeerUnreachable { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}
