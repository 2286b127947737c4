mod checkpoint;
mod dispatcher;
mod driver;
mod fetcher;
mod planner;
mod votes;

pub use checkpoint::CheckpointStore;
pub use dispatcher::{DispatchStats, OperationDispatcher, Outcome};
pub use driver::{Mode, RetryState, SyncDriver};
pub use fetcher::BatchFetcher;
pub use planner::{Batch, BatchPlan, Batches};
pub use votes::{VoteReconciler, VotedPostSet};
