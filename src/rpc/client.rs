use super::{ActiveVote, Rpc};
use crate::config::DEFAULT_RPC_TIMEOUT;
use crate::error::{Error, Result};
use crate::ops::TransactionRecord;
use async_trait::async_trait;
use bytes::Buf;
use hyper::client::HttpConnector;
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Client, Method, Request, Uri};
use serde_derive::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const GET_OPS_IN_BLOCK: &str = "condenser_api.get_ops_in_block";
const GET_ACTIVE_VOTES: &str = "condenser_api.get_active_votes";
const GET_DYNAMIC_GLOBAL_PROPERTIES: &str = "condenser_api.get_dynamic_global_properties";

#[derive(Serialize)]
struct Call<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct Reply {
    id: Option<u64>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Deserialize)]
struct GlobalProperties {
    last_irreversible_block_num: u64,
}

/// JSON-RPC 2.0 client talking to a node over plain HTTP.
///
/// Every round trip, body included, is bounded by `timeout`.
pub struct HttpRpc {
    client: Client<HttpConnector>,
    uri: Uri,
    timeout: Duration,
    next_id: AtomicU64,
}

impl HttpRpc {
    pub fn new(url: &str) -> Result<HttpRpc> {
        Ok(HttpRpc {
            client: Client::new(),
            uri: url.parse()?,
            timeout: DEFAULT_RPC_TIMEOUT,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> HttpRpc {
        self.timeout = timeout;
        self
    }

    /// Sends all calls as one json array and returns their results in call order.
    async fn call_bundle(&self, calls: &[(&str, Value)]) -> Result<Vec<Value>> {
        let first_id = self.next_id.fetch_add(calls.len() as u64, Ordering::Relaxed);
        let ids: Vec<u64> = (first_id..first_id + calls.len() as u64).collect();
        let requests: Vec<Call> = calls
            .iter()
            .zip(ids.iter())
            .map(|((method, params), id)| Call {
                jsonrpc: "2.0",
                id: *id,
                method: *method,
                params: params.clone(),
            })
            .collect();

        let request = Request::builder()
            .method(Method::POST)
            .uri(self.uri.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&requests)?))?;

        let round_trip = async {
            let response = self.client.request(request).await?;
            let status = response.status();
            let body = hyper::body::to_bytes(response.into_body()).await?;
            Ok::<_, Error>((status, body))
        };
        let (status, body) = tokio::time::timeout(self.timeout, round_trip)
            .await
            .map_err(|_| Error::Rpc(format!("no reply within {:?}", self.timeout)))??;
        if !status.is_success() {
            return Err(Error::Rpc(format!("node replied with {}", status)));
        }

        match_replies(&ids, serde_json::from_reader(body.reader())?)
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        self.call_bundle(&[(method, params)])
            .await?
            .pop()
            .ok_or_else(|| Error::Rpc(format!("empty reply to {}", method)))
    }
}

fn match_replies(ids: &[u64], payload: Value) -> Result<Vec<Value>> {
    let replies: Vec<Reply> = match payload {
        Value::Array(_) => serde_json::from_value(payload)?,
        other => return Err(Error::Rpc(format!("expected a batch reply, got {}", other))),
    };

    let mut by_id = HashMap::with_capacity(replies.len());
    for reply in replies {
        if let Some(error) = reply.error {
            return Err(Error::Rpc(format!("call {:?} failed: {}", reply.id, error)));
        }
        if let Some(id) = reply.id {
            by_id.insert(id, reply.result.unwrap_or(Value::Null));
        }
    }

    ids.iter()
        .map(|id| {
            by_id
                .remove(id)
                .ok_or_else(|| Error::Rpc(format!("no reply for call {}", id)))
        })
        .collect()
}

#[async_trait]
impl Rpc for HttpRpc {
    async fn get_ops_in_blocks(&self, blocks: &[u64]) -> Result<Vec<Vec<TransactionRecord>>> {
        let calls: Vec<(&str, Value)> = blocks
            .iter()
            .map(|block| (GET_OPS_IN_BLOCK, json!([block, false])))
            .collect();

        self.call_bundle(&calls)
            .await?
            .into_iter()
            .map(|ops| serde_json::from_value(ops).map_err(Error::from))
            .collect()
    }

    async fn get_active_votes(&self, author: &str, permlink: &str) -> Result<Vec<ActiveVote>> {
        let votes = self.call(GET_ACTIVE_VOTES, json!([author, permlink])).await?;
        Ok(serde_json::from_value(votes)?)
    }

    async fn last_irreversible_block(&self) -> Result<u64> {
        let props = self.call(GET_DYNAMIC_GLOBAL_PROPERTIES, json!([])).await?;
        let props: GlobalProperties = serde_json::from_value(props)?;
        Ok(props.last_irreversible_block_num)
    }
}
