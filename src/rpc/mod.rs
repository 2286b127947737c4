mod client;

pub use client::HttpRpc;

use crate::error::Result;
use crate::ops::{timestamp, TransactionRecord};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_derive::{Deserialize, Serialize};

/// Calls the sync needs from a chain node. Each call succeeds or fails as a whole.
#[async_trait]
pub trait Rpc: Send + Sync {
    /// `get_ops_in_block` for every block in one round trip, results in request order.
    async fn get_ops_in_blocks(&self, blocks: &[u64]) -> Result<Vec<Vec<TransactionRecord>>>;

    async fn get_active_votes(&self, author: &str, permlink: &str) -> Result<Vec<ActiveVote>>;

    async fn last_irreversible_block(&self) -> Result<u64>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveVote {
    pub voter: String,
    pub percent: i64,
    #[serde(deserialize_with = "lenient_int::deserialize")]
    pub rshares: i64,
    #[serde(with = "timestamp")]
    pub time: NaiveDateTime,
}

/// Nodes encode large int64 values as strings.
mod lenient_int {
    use serde::de::{self, Deserializer};
    use serde_derive::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i64),
        String(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match <IntOrString as serde::Deserialize>::deserialize(deserializer)? {
            IntOrString::Int(value) => Ok(value),
            IntOrString::String(value) => value.parse().map_err(de::Error::custom),
        }
    }
}
