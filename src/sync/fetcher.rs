use super::planner::Batch;
use crate::error::{Error, Result};
use crate::ops::TransactionRecord;
use crate::rpc::Rpc;

/// Fetches the records of one batch in a single bundled round trip.
pub struct BatchFetcher<'a, R: Rpc + ?Sized> {
    rpc: &'a R,
}

impl<'a, R: Rpc + ?Sized> BatchFetcher<'a, R> {
    pub fn new(rpc: &'a R) -> BatchFetcher<'a, R> {
        BatchFetcher { rpc }
    }

    /// Records of every block of `batch`, block order first, then the node's
    /// order within each block. Fails as a whole, never retries.
    pub async fn fetch(&self, batch: &Batch) -> Result<Vec<TransactionRecord>> {
        let blocks: Vec<u64> = batch.blocks().collect();
        let per_block = self.rpc.get_ops_in_blocks(&blocks).await?;

        if per_block.len() != blocks.len() {
            return Err(Error::Rpc(format!(
                "asked for {} blocks, got {}",
                blocks.len(),
                per_block.len()
            )));
        }

        Ok(per_block.into_iter().flatten().collect())
    }
}
