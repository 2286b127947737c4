use clap::{value_t, App, Arg, ArgMatches};
use ledgersync::config::{self, Config};
use ledgersync::rpc::HttpRpc;
use ledgersync::store::JournalStore;
use ledgersync::sync::CheckpointStore;
use ledgersync::{Mode, Result, SyncDriver};
use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;
use std::time::Duration;

fn optional<T: std::str::FromStr>(matches: &ArgMatches, name: &str) -> Option<T> {
    if matches.is_present(name) {
        Some(value_t!(matches, name, T).unwrap_or_else(|e| e.exit()))
    } else {
        None
    }
}

fn read_config(matches: &ArgMatches) -> Config {
    let mut config = matches
        .value_of("path")
        .map(Config::new)
        .unwrap_or_default();

    config.first_block = value_t!(matches, "first-block", u64).unwrap_or_else(|e| e.exit());
    config.last_block = optional(matches, "last-block");
    config.max_batch = value_t!(matches, "max-batch", u64).unwrap_or_else(|e| e.exit());
    config.retry_delay = Duration::from_millis(value_t!(matches, "retry-delay-ms", u64).unwrap_or_else(|e| e.exit()));
    config.max_attempts = optional(matches, "max-attempts");
    if let Some(rpc_url) = matches.value_of("rpc") {
        config.rpc_url = rpc_url.to_owned();
    }
    config.rpc_timeout = Duration::from_millis(value_t!(matches, "rpc-timeout-ms", u64).unwrap_or_else(|e| e.exit()));
    config
}

async fn run(config: Config, mode: Mode, events: PathBuf) -> Result<()> {
    log::info!("syncing into {:?}, events go to {:?}", config.base_dir, events);

    let rpc = Arc::new(HttpRpc::new(&config.rpc_url)?.with_timeout(config.rpc_timeout));
    let store = Arc::new(JournalStore::open(events)?);
    let checkpoints = CheckpointStore::open(&config.base_dir)?;

    SyncDriver::new(config, rpc, store, checkpoints).run(mode).await
}

#[tokio::main]
async fn main() {
    let default_first_block = config::DEFAULT_FIRST_BLOCK.to_string();
    let default_max_batch = config::DEFAULT_MAX_BATCH.to_string();
    let default_retry_delay = config::DEFAULT_RETRY_DELAY.as_millis().to_string();
    let default_rpc_timeout = config::DEFAULT_RPC_TIMEOUT.as_millis().to_string();

    let matches = App::new("ledgersync")
        .about("replays chain operations into a store, batch by batch")
        .arg(
            Arg::with_name("path")
                .short("p")
                .long("path")
                .takes_value(true)
                .help("directory for head, plan and batch cache (default $HOME/busydb)"),
        )
        .arg(
            Arg::with_name("offline")
                .long("offline")
                .help("replay committed batches from the cache instead of the node"),
        )
        .arg(
            Arg::with_name("first-block")
                .long("first-block")
                .takes_value(true)
                .default_value(&default_first_block)
                .help("first block of the range"),
        )
        .arg(
            Arg::with_name("last-block")
                .long("last-block")
                .takes_value(true)
                .help("last block of the range (default: last irreversible block)"),
        )
        .arg(
            Arg::with_name("max-batch")
                .long("max-batch")
                .takes_value(true)
                .env("MAX_BATCH")
                .default_value(&default_max_batch)
                .help("blocks per batch"),
        )
        .arg(
            Arg::with_name("retry-delay-ms")
                .long("retry-delay-ms")
                .takes_value(true)
                .default_value(&default_retry_delay)
                .help("delay before retrying a failed batch"),
        )
        .arg(
            Arg::with_name("max-attempts")
                .long("max-attempts")
                .takes_value(true)
                .help("give up after this many attempts of one batch (default: never)"),
        )
        .arg(
            Arg::with_name("rpc")
                .long("rpc")
                .takes_value(true)
                .env("RPC_URL")
                .default_value(config::DEFAULT_RPC_URL)
                .help("json-rpc endpoint of the node, plain http:// only (no TLS support)"),
        )
        .arg(
            Arg::with_name("rpc-timeout-ms")
                .long("rpc-timeout-ms")
                .takes_value(true)
                .default_value(&default_rpc_timeout)
                .help("give up on a node round trip after this long and retry the batch"),
        )
        .arg(
            Arg::with_name("events")
                .long("events")
                .takes_value(true)
                .help("journal file for store writes (default <path>/events.jsonl)"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("more logging, repeat for more"),
        )
        .get_matches();

    if let Err(err) = stderrlog::new()
        .module(module_path!())
        .verbosity(2 + matches.occurrences_of("verbose") as usize)
        .init()
    {
        eprintln!("can not init logging: {}", err);
        exit(1);
    }

    let config = read_config(&matches);
    let mode = if matches.is_present("offline") {
        Mode::Offline
    } else {
        Mode::Online
    };
    let events = matches
        .value_of("events")
        .map(PathBuf::from)
        .unwrap_or_else(|| config.base_dir.join("events.jsonl"));

    if let Err(err) = run(config, mode, events).await {
        log::error!("sync failed: {}", err);
        exit(1);
    }
}
