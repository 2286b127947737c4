mod follow;
mod metadata;
mod operation;
mod record;

pub use follow::{FollowArgs, FollowOp, FollowParseError, ReblogArgs};
pub use metadata::Metadata;
pub use operation::*;
pub use record::{timestamp, TransactionRecord, TIMESTAMP_FORMAT};
