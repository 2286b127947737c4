use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MAX_BATCH: u64 = 50;
pub const DEFAULT_FIRST_BLOCK: u64 = 1;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(2000);
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8090";
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Startup settings of a sync run. Read once and handed to the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_dir: PathBuf,
    pub first_block: u64,
    /// Chain ceiling. `None` asks the node for its last irreversible block.
    pub last_block: Option<u64>,
    pub max_batch: u64,
    pub retry_delay: Duration,
    /// `None` retries a failing batch forever.
    pub max_attempts: Option<u32>,
    pub rpc_url: String,
    /// Bound on one node round trip; a silent node counts as a failure.
    pub rpc_timeout: Duration,
}

impl Config {
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Config {
        Config {
            base_dir: base_dir.into(),
            first_block: DEFAULT_FIRST_BLOCK,
            last_block: None,
            max_batch: DEFAULT_MAX_BATCH,
            retry_delay: DEFAULT_RETRY_DELAY,
            max_attempts: None,
            rpc_url: DEFAULT_RPC_URL.to_owned(),
            rpc_timeout: DEFAULT_RPC_TIMEOUT,
        }
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new(default_base_dir())
    }
}

/// `$HOME/busydb`, or `./busydb` when no home directory is known.
pub fn default_base_dir() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("busydb")
}
