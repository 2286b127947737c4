pub mod config;
pub mod error;
pub mod failpoints;
pub mod ops;
pub mod rpc;
pub mod store;
pub mod sync;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use error::{Error, Result};
pub use sync::{Mode, SyncDriver};
