use crate::error::{Error, Result};
use crate::failpoints::Failpoints;
use crate::ops::{TransactionRecord, TIMESTAMP_FORMAT};
use crate::rpc::{ActiveVote, Rpc};
use crate::store::*;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::{create_dir_all, remove_dir_all};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::thread::{self, ThreadId};
use std::time::{SystemTime, UNIX_EPOCH};

pub struct TempDir {
    pub path: PathBuf,
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = remove_dir_all(&self.path);
    }
}

static SEQ: AtomicUsize = AtomicUsize::new(0);

fn gen_dir_name() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("temp-dir-{:?}-{}", nanos, SEQ.fetch_add(1, Ordering::SeqCst))
}

pub fn create_temp_dir<P: AsRef<Path>>(base: P) -> io::Result<TempDir> {
    let path = std::env::temp_dir()
        .join("ledgersync-tests")
        .join(base.as_ref())
        .join(gen_dir_name());
    create_dir_all(path.clone())?;
    Ok(TempDir { path })
}

struct CapturingLogger;

static CAPTURED: Mutex<Vec<(ThreadId, log::Level, String)>> = Mutex::new(Vec::new());
static LOGGER: CapturingLogger = CapturingLogger;
static INIT_LOGGER: Once = Once::new();

impl log::Log for CapturingLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let line = format!("{}", record.args());
        let mut captured = CAPTURED.lock().unwrap_or_else(|e| e.into_inner());
        captured.push((thread::current().id(), record.level(), line));
    }

    fn flush(&self) {}
}

/// Installs the capturing logger once per test binary.
pub fn capture_logs() {
    INIT_LOGGER.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Trace);
    });
}

/// Lines logged at `level` by the calling test thread.
pub fn captured_logs(level: log::Level) -> Vec<String> {
    let current = thread::current().id();
    CAPTURED
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .iter()
        .filter(|(thread, logged, _)| *thread == current && *logged == level)
        .map(|(_, _, line)| line.clone())
        .collect()
}

pub fn ts(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).unwrap()
}

pub fn record(kind: &str, payload: Value) -> TransactionRecord {
    TransactionRecord::new(kind, payload, ts("2016-06-01T12:00:00"))
}

/// Store double keeping every write as `(method, args as json)`.
///
/// A write fails while failpoint `store::<method>` is on.
pub struct RecordingStore {
    pub fp: Arc<Failpoints>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl RecordingStore {
    pub fn new(fp: Arc<Failpoints>) -> RecordingStore {
        RecordingStore {
            fp,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|(method, _)| method).collect()
    }

    fn record<T: serde::Serialize>(&self, method: &str, args: &T) -> Result<()> {
        if self.fp.is_on(format!("store::{}", method)) {
            return Err(Error::Store(format!("{} rejected", method)));
        }
        self.calls
            .lock()
            .unwrap()
            .push((method.to_owned(), serde_json::to_value(args)?));
        Ok(())
    }
}

#[async_trait]
impl Store for RecordingStore {
    async fn add_user(&self, user: User) -> Result<()> {
        self.record("add_user", &user)
    }
    async fn add_post(&self, post: Post) -> Result<()> {
        self.record("add_post", &post)
    }
    async fn add_comment(&self, comment: Comment) -> Result<()> {
        self.record("add_comment", &comment)
    }
    async fn delete_post(&self, post: DeletePost) -> Result<()> {
        self.record("delete_post", &post)
    }
    async fn add_vote(&self, vote: Vote) -> Result<()> {
        self.record("add_vote", &vote)
    }
    async fn add_follow(&self, follow: Follow) -> Result<()> {
        self.record("add_follow", &follow)
    }
    async fn remove_follow(&self, unfollow: Unfollow) -> Result<()> {
        self.record("remove_follow", &unfollow)
    }
    async fn add_reblog(&self, reblog: Reblog) -> Result<()> {
        self.record("add_reblog", &reblog)
    }
    async fn add_producer_reward(&self, reward: ProducerReward) -> Result<()> {
        self.record("add_producer_reward", &reward)
    }
    async fn add_author_reward(&self, reward: AuthorReward) -> Result<()> {
        self.record("add_author_reward", &reward)
    }
    async fn add_curation_reward(&self, reward: CurationReward) -> Result<()> {
        self.record("add_curation_reward", &reward)
    }
    async fn add_transfer(&self, transfer: Transfer) -> Result<()> {
        self.record("add_transfer", &transfer)
    }
    async fn add_transfer_to_vesting(&self, transfer: TransferToVesting) -> Result<()> {
        self.record("add_transfer_to_vesting", &transfer)
    }
    async fn add_claim_reward_balance(&self, claim: ClaimRewardBalance) -> Result<()> {
        self.record("add_claim_reward_balance", &claim)
    }
    async fn handle_account_update(&self, update: AccountUpdate) -> Result<()> {
        self.record("handle_account_update", &update)
    }
    async fn add_delegate_vesting_shares(&self, delegation: DelegateVestingShares) -> Result<()> {
        self.record("add_delegate_vesting_shares", &delegation)
    }
    async fn handle_return_vesting_delegation(&self, delegation: ReturnVestingDelegation) -> Result<()> {
        self.record("handle_return_vesting_delegation", &delegation)
    }
}

/// Node double serving fixed blocks and vote lists.
///
/// Failpoints `rpc::get_ops_in_blocks`, `rpc::get_active_votes` and
/// `rpc::last_irreversible_block` fail the corresponding call.
pub struct StaticRpc {
    pub fp: Arc<Failpoints>,
    blocks: HashMap<u64, Vec<TransactionRecord>>,
    votes: HashMap<(String, String), Vec<ActiveVote>>,
    last_irreversible: u64,
    bundles: Mutex<Vec<Vec<u64>>>,
    vote_queries: Mutex<Vec<(String, String)>>,
    ceiling_queries: AtomicUsize,
}

impl StaticRpc {
    pub fn new(fp: Arc<Failpoints>) -> StaticRpc {
        StaticRpc {
            fp,
            blocks: HashMap::new(),
            votes: HashMap::new(),
            last_irreversible: 0,
            bundles: Mutex::new(Vec::new()),
            vote_queries: Mutex::new(Vec::new()),
            ceiling_queries: AtomicUsize::new(0),
        }
    }

    pub fn with_block(mut self, block: u64, records: Vec<TransactionRecord>) -> StaticRpc {
        self.blocks.insert(block, records);
        self.last_irreversible = self.last_irreversible.max(block);
        self
    }

    pub fn with_votes(mut self, author: &str, permlink: &str, votes: Vec<ActiveVote>) -> StaticRpc {
        self.votes.insert((author.to_owned(), permlink.to_owned()), votes);
        self
    }

    pub fn bundles(&self) -> Vec<Vec<u64>> {
        self.bundles.lock().unwrap().clone()
    }

    pub fn vote_queries(&self) -> Vec<(String, String)> {
        self.vote_queries.lock().unwrap().clone()
    }

    pub fn ceiling_queries(&self) -> usize {
        self.ceiling_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Rpc for StaticRpc {
    async fn get_ops_in_blocks(&self, blocks: &[u64]) -> Result<Vec<Vec<TransactionRecord>>> {
        self.bundles.lock().unwrap().push(blocks.to_vec());
        if self.fp.is_on("rpc::get_ops_in_blocks") {
            return Err(Error::Rpc("connection reset".to_owned()));
        }
        Ok(blocks
            .iter()
            .map(|block| self.blocks.get(block).cloned().unwrap_or_default())
            .collect())
    }

    async fn get_active_votes(&self, author: &str, permlink: &str) -> Result<Vec<ActiveVote>> {
        self.vote_queries
            .lock()
            .unwrap()
            .push((author.to_owned(), permlink.to_owned()));
        if self.fp.is_on("rpc::get_active_votes") {
            return Err(Error::Rpc("connection reset".to_owned()));
        }
        Ok(self
            .votes
            .get(&(author.to_owned(), permlink.to_owned()))
            .cloned()
            .unwrap_or_default())
    }

    async fn last_irreversible_block(&self) -> Result<u64> {
        self.ceiling_queries.fetch_add(1, Ordering::SeqCst);
        if self.fp.is_on("rpc::last_irreversible_block") {
            return Err(Error::Rpc("connection reset".to_owned()));
        }
        Ok(self.last_irreversible)
    }
}
