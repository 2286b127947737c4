use serde::de::DeserializeOwned;
use serde::Deserialize as _;
use serde_derive::Deserialize;
use serde_json::Value;
use std::fmt;

/// Social graph event carried in a `custom_json` operation with id `follow`.
#[derive(Debug, Clone, PartialEq)]
pub enum FollowOp {
    Follow(FollowArgs),
    Reblog(ReblogArgs),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FollowArgs {
    pub follower: String,
    pub following: String,
    pub what: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReblogArgs {
    pub account: String,
    pub author: String,
    pub permlink: String,
}

#[derive(Debug)]
pub enum FollowParseError {
    Json(serde_json::Error),
    UnsupportedShape(Value),
}

impl fmt::Display for FollowParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FollowParseError::Json(err) => write!(f, "not json: {}", err),
            FollowParseError::UnsupportedShape(value) => write!(f, "unsupported shape: {}", value),
        }
    }
}

impl From<serde_json::Error> for FollowParseError {
    fn from(err: serde_json::Error) -> FollowParseError {
        FollowParseError::Json(err)
    }
}

impl FollowOp {
    /// Accepts `["follow", {..}]`, `["reblog", {..}]` and a bare follow object.
    pub fn parse(json: &str) -> Result<FollowOp, FollowParseError> {
        let value: Value = serde_json::from_str(json)?;

        let op = match &value {
            Value::Array(items) if items.len() == 2 => match (&items[0], &items[1]) {
                (Value::String(name), args) if name == "follow" => {
                    from_args(args).map(FollowOp::Follow)
                }
                (Value::String(name), args) if name == "reblog" => {
                    from_args(args).map(FollowOp::Reblog)
                }
                _ => None,
            },
            Value::Object(_) => from_args(&value).map(FollowOp::Follow),
            _ => None,
        };

        op.ok_or(FollowParseError::UnsupportedShape(value))
    }
}

fn from_args<T: DeserializeOwned>(args: &Value) -> Option<T> {
    T::deserialize(args).ok()
}
