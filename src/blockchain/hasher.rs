//! Canonical block encoding and digest.
//!
//! The encoding is compact JSON with keys in lexicographic order:
//!
//! ```text
//! {"index":2,"prev_hash":"..","proof":35293,"timestamp":1700000000.250000,
//!  "transactions":[{"amount":1,"recipient":"..","sender":"0"}]}
//! ```
//!
//! Integers are plain decimal and timestamps always carry six fractional
//! digits, so two nodes holding the same block value agree on its digest.
//! Mining, appending and validation all go through [`hash_block`].

use serde_json::Value;
use sha2::{Digest, Sha256};

use super::Block;
use crate::transaction::Transaction;

/// Fractional digits used when encoding timestamps.
pub const TIMESTAMP_PRECISION: usize = 6;

/// Canonical UTF-8 encoding of `block`.
pub fn canonical_encoding(block: &Block) -> String {
    let txs = block
        .transactions
        .iter()
        .map(encode_transaction)
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "{{\"index\":{},\"prev_hash\":{},\"proof\":{},\"timestamp\":{:.prec$},\"transactions\":[{}]}}",
        block.index,
        json_string(&block.prev_hash),
        block.proof,
        block.timestamp,
        txs,
        prec = TIMESTAMP_PRECISION,
    )
}

fn encode_transaction(tx: &Transaction) -> String {
    format!(
        "{{\"amount\":{},\"recipient\":{},\"sender\":{}}}",
        tx.amount,
        json_string(&tx.recipient),
        json_string(&tx.sender),
    )
}

fn json_string(s: &str) -> String {
    Value::from(s).to_string()
}

/// SHA-256 of the canonical encoding as 64 lowercase hex characters.
pub fn hash_block(block: &Block) -> String {
    sha256_hex(canonical_encoding(block).as_bytes())
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Amount;

    fn sample() -> Block {
        Block {
            index: 2,
            timestamp: 1_700_000_000.25,
            transactions: vec![
                Transaction::new("0", "node-a", 1u64).unwrap(),
                Transaction::new("alice", "bob", 42u64).unwrap(),
            ],
            proof: 35293,
            prev_hash: "ab12".into(),
        }
    }

    #[test]
    fn encoding_is_sorted_and_fixed_precision() {
        assert_eq!(
            canonical_encoding(&sample()),
            "{\"index\":2,\"prev_hash\":\"ab12\",\"proof\":35293,\"timestamp\":1700000000.250000,\
             \"transactions\":[{\"amount\":1,\"recipient\":\"node-a\",\"sender\":\"0\"},\
             {\"amount\":42,\"recipient\":\"bob\",\"sender\":\"alice\"}]}"
        );
    }

    #[test]
    fn genesis_encoding() {
        assert_eq!(
            canonical_encoding(&Block::genesis()),
            "{\"index\":1,\"prev_hash\":\"1\",\"proof\":100,\"timestamp\":0.000000,\"transactions\":[]}"
        );
    }

    #[test]
    fn fractional_amounts_encode_in_shortest_form() {
        let mut b = sample();
        b.transactions = vec![
            Transaction::new("alice", "bob", Amount::try_from(2.5).unwrap()).unwrap(),
            Transaction::new("bob", "carol", Amount::try_from(7.0).unwrap()).unwrap(),
        ];
        let encoded = canonical_encoding(&b);
        assert!(encoded.contains("{\"amount\":2.5,\"recipient\":\"bob\",\"sender\":\"alice\"}"));
        assert!(encoded.contains("{\"amount\":7,\"recipient\":\"carol\",\"sender\":\"bob\"}"));
    }

    #[test]
    fn strings_are_json_escaped() {
        let mut b = sample();
        b.prev_hash = "a\"b".into();
        assert!(canonical_encoding(&b).contains("\"prev_hash\":\"a\\\"b\""));
    }

    #[test]
    fn digest_is_stable_lowercase_hex() {
        let b = sample();
        let h1 = hash_block(&b);
        let h2 = hash_block(&b.clone());
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(h1.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn survives_json_round_trip() {
        let b = sample();
        let wire = serde_json::to_string(&b).unwrap();
        let back: Block = serde_json::from_str(&wire).unwrap();
        assert_eq!(hash_block(&b), hash_block(&back));
    }

    #[test]
    fn known_sha256_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
