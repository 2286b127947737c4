use super::checkpoint::CheckpointStore;
use super::dispatcher::{DispatchStats, OperationDispatcher};
use super::fetcher::BatchFetcher;
use super::planner::{Batch, BatchPlan};
use super::votes::{VoteReconciler, VotedPostSet};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::ops::TransactionRecord;
use crate::rpc::Rpc;
use crate::store::Store;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Fetch from the node, commit every batch.
    Online,
    /// Replay committed batches from the cache.
    Offline,
}

/// Attempt counter of the step being retried. `attempt` starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    pub attempt: u32,
}

impl Default for RetryState {
    fn default() -> RetryState {
        RetryState::new()
    }
}

impl RetryState {
    pub fn new() -> RetryState {
        RetryState { attempt: 1 }
    }

    pub fn next_attempt(self) -> RetryState {
        RetryState {
            attempt: self.attempt.saturating_add(1),
        }
    }

    pub fn is_last(&self, max_attempts: Option<u32>) -> bool {
        max_attempts.map_or(false, |max| self.attempt >= max)
    }
}

struct Head(Option<u64>);

impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(index) => write!(f, "{}", index),
            None => write!(f, "none"),
        }
    }
}

fn log_progress(index: u64) {
    if index % 10 == 0 {
        log::info!("Processing batch: {}", index);
    }
}

/// Walks the batch plan one batch at a time.
///
/// Online mode starts after the last committed batch and only advances the
/// head once a batch is fully dispatched, reconciled and cached. A failing
/// batch is retried after `retry_delay`, never skipped.
pub struct SyncDriver<R: Rpc + ?Sized, S: Store + ?Sized> {
    config: Config,
    rpc: Arc<R>,
    store: Arc<S>,
    checkpoints: CheckpointStore,
}

impl<R: Rpc + ?Sized, S: Store + ?Sized> SyncDriver<R, S> {
    pub fn new(config: Config, rpc: Arc<R>, store: Arc<S>, checkpoints: CheckpointStore) -> SyncDriver<R, S> {
        SyncDriver {
            config,
            rpc,
            store,
            checkpoints,
        }
    }

    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.checkpoints
    }

    pub async fn run(&self, mode: Mode) -> Result<()> {
        match mode {
            Mode::Online => self.sync_online().await,
            Mode::Offline => self.sync_offline().await,
        }
    }

    pub async fn sync_offline(&self) -> Result<()> {
        let head = self.checkpoints.read_head().await?;
        log::info!("Current head is: {}", Head(head));

        if let Some(head) = head {
            for index in 0..=head {
                log_progress(index);
                let records = self.checkpoints.read_cache(index).await?;
                self.process_batch(&records).await?;
            }
        }

        log::info!("Offline sync completed");
        Ok(())
    }

    pub async fn sync_online(&self) -> Result<()> {
        let head = self.checkpoints.read_head().await?;
        log::info!("Current head is: {}", Head(head));

        let plan = self.plan().await?;
        self.checkpoints.check_plan(&plan).await?;
        log::debug!("syncing {} in {} batches", plan, plan.len());

        for batch in plan.iter_from(head.map_or(0, |head| head + 1)) {
            log_progress(batch.index);

            let index = batch.index;
            let batch = &batch;
            self.retrying(
                &format!("batch {}", index),
                |attempts| Error::RetriesExhausted { index, attempts },
                move || self.sync_batch(batch),
            )
            .await?;
        }

        log::info!("Online sync completed");
        Ok(())
    }

    /// Dispatches `records` in order, then reconciles the votes they touched.
    /// Shared by both modes so a replay writes exactly what the online run did.
    pub async fn process_batch(&self, records: &[TransactionRecord]) -> Result<DispatchStats> {
        let mut voted = VotedPostSet::new();
        let stats = OperationDispatcher::new(&*self.store)
            .dispatch_all(records, &mut voted)
            .await?;
        let votes = VoteReconciler::new(&*self.rpc, &*self.store)
            .reconcile(voted)
            .await?;
        log::debug!("{:?}, {} votes reconciled", stats, votes);
        Ok(stats)
    }

    async fn sync_batch(&self, batch: &Batch) -> Result<()> {
        let records = BatchFetcher::new(&*self.rpc).fetch(batch).await?;
        self.process_batch(&records).await?;
        self.checkpoints.commit(batch.index, &records).await
    }

    async fn plan(&self) -> Result<BatchPlan> {
        let last_block = match self.config.last_block {
            Some(last_block) => last_block,
            None => {
                self.retrying(
                    "ceiling lookup",
                    |attempts| Error::CeilingUnavailable { attempts },
                    move || self.rpc.last_irreversible_block(),
                )
                .await?
            }
        };
        BatchPlan::new(self.config.first_block, last_block, self.config.max_batch)
    }

    /// Runs `step` until it succeeds, sleeping `retry_delay` after every
    /// failure. Gives up with `exhausted(attempts)` once `max_attempts` is hit.
    async fn retrying<T, F, Fut, E>(&self, what: &str, exhausted: E, mut step: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
        E: FnOnce(u32) -> Error,
    {
        let mut retry = RetryState::new();
        loop {
            match step().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    log::error!("{} failed (attempt {}): {}", what, retry.attempt, err);
                    if retry.is_last(self.config.max_attempts) {
                        return Err(exhausted(retry.attempt));
                    }
                    tokio::time::sleep(self.config.retry_delay).await;
                    retry = retry.next_attempt();
                }
            }
        }
    }
}
