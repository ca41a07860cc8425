//! HTTP client for the peer "get chain" endpoint.
//!
//! Every node serves `GET /api/v1/chain/` returning:
//!
//! ```json
//! { "chain": [ { "index": 1, "timestamp": 0.0, ... } ], "length": 1 }
//! ```

use std::time::Duration;

use reqwest::Client;

use super::resolver::{ChainSource, PeerChain};
use crate::error::LedgerError;

/// Path of the chain endpoint on every node.
pub const CHAIN_PATH: &str = "/api/v1/chain/";

pub struct HttpChainSource {
    client: Client,
}

impl HttpChainSource {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    fn endpoint(peer: &str) -> String {
        format!("http://{}{}", peer.trim_end_matches('/'), CHAIN_PATH)
    }
}

impl ChainSource for HttpChainSource {
    async fn fetch_chain(&self, peer: &str) -> Result<PeerChain, LedgerError> {
        let url = Self::endpoint(peer);
        let unreachable = |reason: String| LedgerError::PeerUnreachable {
            peer: peer.to_string(),
            reason,
        };

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| unreachable(format!("GET {url} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(unreachable(format!("GET {url} returned HTTP {status}")));
        }

        resp.json::<PeerChain>()
            .await
            .map_err(|e| unreachable(format!("malformed chain response: {e}")))
    }
}
