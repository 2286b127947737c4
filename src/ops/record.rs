use super::operation::Operation;
use chrono::NaiveDateTime;
use serde_derive::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One operation as returned by `get_ops_in_block`.
///
/// Fields other than `op` and `timestamp` (trx_id, block, op_in_trx, ...)
/// are kept in `extra` so a cached batch serializes back to the same
/// records the online path consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub op: (String, Value),
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransactionRecord {
    pub fn new<K: Into<String>>(kind: K, payload: Value, timestamp: NaiveDateTime) -> TransactionRecord {
        TransactionRecord {
            op: (kind.into(), payload),
            timestamp,
            extra: Map::new(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.op.0
    }

    pub fn payload(&self) -> &Value {
        &self.op.1
    }

    pub fn operation(&self) -> Result<Operation, serde_json::Error> {
        Operation::decode(self.kind(), self.payload())
    }
}

pub mod timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(de::Error::custom)
    }
}
