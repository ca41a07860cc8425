use std::collections::HashSet;
use url::{ParseError, Url};

use crate::error::LedgerError;

/// Known peers, stored as `host[:port]` network locations.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: HashSet<String>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer. Idempotent; returns the stored location.
    pub fn register(&mut self, address: &str) -> Result<String, LedgerError> {
        let location = parse_location(address)?;
        self.nodes.insert(location.clone());
        Ok(location)
    }

    /// Register a batch. Nothing is stored unless every address parses.
    pub fn register_all<I, S>(&mut self, addresses: I) -> Result<(), LedgerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = addresses
            .into_iter()
            .map(|a| parse_location(a.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.nodes.extend(parsed);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, location: &str) -> bool {
        self.nodes.contains(location)
    }

    /// Sorted copy of the peer set, for responses and resolver input.
    pub fn addresses(&self) -> Vec<String> {
        let mut out: Vec<String> = self.nodes.iter().cloned().collect();
        out.sort();
        out
    }
}

/// Extract the network location of `address`.
///
/// Full URLs contribute their `host[:port]`. Scheme-less input such as
/// `192.168.0.5:5000` or `node-b:5000` is taken as a bare location.
fn parse_location(address: &str) -> Result<String, LedgerError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidAddress(address.to_string()));
    }

    match Url::parse(trimmed) {
        Ok(url) if url.host_str().is_some() => location_of(&url, address),
        // `node-b:5000` parses as scheme "node-b" with path "5000".
        Ok(url) if url.path().parse::<u16>().is_ok() => bare_location(trimmed, address),
        Ok(_) => Err(LedgerError::InvalidAddress(address.to_string())),
        Err(ParseError::RelativeUrlWithoutBase) => bare_location(trimmed, address),
        Err(_) => Err(LedgerError::InvalidAddress(address.to_string())),
    }
}

fn bare_location(trimmed: &str, original: &str) -> Result<String, LedgerError> {
    let url = Url::parse(&format!("http://{trimmed}"))
        .map_err(|_| LedgerError::InvalidAddress(original.to_string()))?;
    // A bare location carries nothing but host and port.
    if url.path() != "/" || url.query().is_some() || !url.username().is_empty() {
        return Err(LedgerError::InvalidAddress(original.to_string()));
    }
    location_of(&url, original)
}

/// `host[:port]`. Peers are reached over plain HTTP, so only its default
/// port is implied; any other scheme keeps its (possibly default) port.
fn location_of(url: &Url, original: &str) -> Result<String, LedgerError> {
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| LedgerError::InvalidAddress(original.to_string()))?;
    Ok(match url.port_or_known_default() {
        Some(80) if url.scheme() == "http" => host.to_string(),
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
