use crate::error::{Error, Result};
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Contiguous block range fetched and committed as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    pub index: u64,
    pub first_block: u64,
    pub last_block: u64,
}

impl Batch {
    pub fn blocks(&self) -> RangeInclusive<u64> {
        self.first_block..=self.last_block
    }

    pub fn len(&self) -> u64 {
        (self.last_block - self.first_block).saturating_add(1)
    }
}

/// Split of `[first_block, last_block]` into batches of at most `max_batch` blocks.
///
/// Batch `i` covers `first_block + i * max_batch` up to the next boundary or
/// `last_block`. Batches are computed on demand, nothing is materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPlan {
    pub first_block: u64,
    pub last_block: u64,
    pub max_batch: u64,
}

impl BatchPlan {
    pub fn new(first_block: u64, last_block: u64, max_batch: u64) -> Result<BatchPlan> {
        if max_batch == 0 {
            return Err(Error::InvalidPlan("max batch width must be positive".to_owned()));
        }
        Ok(BatchPlan {
            first_block,
            last_block,
            max_batch,
        })
    }

    pub fn len(&self) -> u64 {
        if self.last_block < self.first_block {
            return 0;
        }
        (self.last_block - self.first_block) / self.max_batch + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: u64) -> Option<Batch> {
        if index >= self.len() {
            return None;
        }
        // index < len, so this stays within [first_block, last_block]
        let first_block = self.first_block + index * self.max_batch;
        let last_block = first_block
            .saturating_add(self.max_batch - 1)
            .min(self.last_block);
        Some(Batch {
            index,
            first_block,
            last_block,
        })
    }

    pub fn iter(&self) -> Batches {
        self.iter_from(0)
    }

    /// Batches starting at `index`, used to resume after the last committed batch.
    pub fn iter_from(&self, index: u64) -> Batches {
        Batches {
            plan: *self,
            next: index,
        }
    }

    /// Whether batch indices of `self` address the same blocks as those of `other`.
    /// The ceiling may move, the start and the width may not.
    pub fn is_compatible(&self, other: &BatchPlan) -> bool {
        self.first_block == other.first_block && self.max_batch == other.max_batch
    }
}

impl fmt::Display for BatchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "blocks {}..={} by {}",
            self.first_block, self.last_block, self.max_batch
        )
    }
}

pub struct Batches {
    plan: BatchPlan,
    next: u64,
}

impl Iterator for Batches {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        let batch = self.plan.get(self.next)?;
        self.next += 1;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.plan.len().saturating_sub(self.next) as usize;
        (left, Some(left))
    }
}
