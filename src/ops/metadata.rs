use serde_derive::Serialize;
use serde_json::{Map, Value};

/// Parsed `json_metadata` of accounts and posts.
///
/// Metadata is free-form user input. Callers collapse a failed parse to
/// `Metadata::default()` (an empty object) instead of failing the record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Metadata(pub Value);

impl Metadata {
    pub fn parse(raw: &str) -> Result<Metadata, serde_json::Error> {
        serde_json::from_str(raw).map(Metadata)
    }

    /// Parses optional metadata, using an empty object for anything missing or malformed.
    pub fn parse_or_empty(raw: Option<&str>) -> Metadata {
        match raw.map(Metadata::parse) {
            Some(Ok(metadata)) => metadata,
            Some(Err(err)) => {
                log::debug!("malformed json_metadata, using {{}}: {}", err);
                Metadata::default()
            }
            None => Metadata::default(),
        }
    }
}

impl Default for Metadata {
    fn default() -> Metadata {
        Metadata(Value::Object(Map::new()))
    }
}
