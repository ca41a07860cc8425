use std::env;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::blockchain::{DEFAULT_DIFFICULTY, DIFF_MAX, DIFF_MIN};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a valid {expected}, got {value:?}")]
    Parse {
        key: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("DIFFICULTY must be between 1 and 6, got {0}")]
    DifficultyOutOfRange(u32),
}

/// Node settings, read from the environment (optionally via `.env`).
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    pub difficulty: u32,
    pub peer_timeout: Duration,
    /// Recipient of mining rewards.
    pub node_id: String,
    /// Peers registered at startup.
    pub peers: Vec<String>,
}

impl NodeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(&lookup, "PORT", "port number", 8080u16)?;
        let difficulty = parse_or(&lookup, "DIFFICULTY", "integer", DEFAULT_DIFFICULTY)?;
        if !(DIFF_MIN..=DIFF_MAX).contains(&difficulty) {
            return Err(ConfigError::DifficultyOutOfRange(difficulty));
        }
        let timeout_secs = parse_or(&lookup, "PEER_TIMEOUT_SECS", "number of seconds", 5u64)?;

        let node_id = lookup("NODE_ID")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

        let peers: Vec<String> = lookup("PEERS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            difficulty,
            peer_timeout: Duration::from_secs(timeout_secs),
            node_id,
            peers,
        })
    }
}

fn parse_or<F, T>(
    lookup: &F,
    key: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Parse {
            key,
            expected,
            value: raw,
        }),
    }
}
