#[cfg(test)]
use crate::failpoints::Failpoints;
use super::planner::BatchPlan;
use crate::error::{Error, Result};
use crate::ops::TransactionRecord;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// On-disk sync progress: the head file, the plan it refers to, and one
/// cached payload per committed batch.
///
/// A batch counts as committed once its cache file and then the head are
/// written. Every file goes through a synced temp file and a rename, so a
/// crash leaves either the old or the new content.
pub struct CheckpointStore {
    base_dir: PathBuf,
    cache_dir: PathBuf,
    #[cfg(test)]
    fp: Arc<Failpoints>,
}

impl CheckpointStore {
    /// Creates the directory layout if needed. Safe to call on every start.
    pub fn open<P: AsRef<Path>>(base_dir: P, #[cfg(test)] fp: Arc<Failpoints>) -> Result<CheckpointStore> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let cache_dir = base_dir.join("cache");
        fs::create_dir_all(&cache_dir)?;
        Ok(CheckpointStore {
            base_dir,
            cache_dir,
            #[cfg(test)]
            fp,
        })
    }

    fn head_path(&self) -> PathBuf {
        self.base_dir.join("head")
    }

    fn plan_path(&self) -> PathBuf {
        self.base_dir.join("plan.json")
    }

    pub fn cache_path(&self, index: u64) -> PathBuf {
        self.cache_dir.join(format!("{}.batch", index))
    }

    /// Index of the last committed batch, `None` when nothing was committed yet.
    pub async fn read_head(&self) -> Result<Option<u64>> {
        let content = match tokio::fs::read_to_string(self.head_path()).await {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        match content.trim() {
            "" => Ok(None),
            trimmed => trimmed
                .parse::<u64>()
                .map(Some)
                .map_err(|_| Error::InvalidHead(content.clone())),
        }
    }

    pub async fn write_head(&self, index: u64) -> Result<()> {
        crate::failpoint!(self.fp, "checkpoint::write_head", Err(injected("write_head")));

        write_durably(&self.head_path(), index.to_string().as_bytes()).await
    }

    pub async fn read_cache(&self, index: u64) -> Result<Vec<TransactionRecord>> {
        let content = match tokio::fs::read(self.cache_path(index)).await {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(Error::MissingCache(index)),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&content)?)
    }

    pub async fn write_cache(&self, index: u64, records: &[TransactionRecord]) -> Result<()> {
        crate::failpoint!(self.fp, "checkpoint::write_cache", Err(injected("write_cache")));

        write_durably(&self.cache_path(index), &serde_json::to_vec(records)?).await
    }

    /// Persists the payload of batch `index`, then moves the head to it.
    pub async fn commit(&self, index: u64, records: &[TransactionRecord]) -> Result<()> {
        self.write_cache(index, records).await?;
        self.write_head(index).await
    }

    /// Pins the plan the stored indices refer to.
    ///
    /// The first run records `plan`. Later runs must keep the first block and
    /// the batch width; only the ceiling may change.
    pub async fn check_plan(&self, plan: &BatchPlan) -> Result<()> {
        match tokio::fs::read(self.plan_path()).await {
            Ok(content) => {
                let stored: BatchPlan = serde_json::from_slice(&content)?;
                if !stored.is_compatible(plan) {
                    return Err(Error::PlanMismatch {
                        stored: stored.to_string(),
                        configured: plan.to_string(),
                    });
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        write_durably(&self.plan_path(), &serde_json::to_vec(plan)?).await
    }

    /// The plan recorded by an earlier run, if any.
    pub async fn stored_plan(&self) -> Result<Option<BatchPlan>> {
        match tokio::fs::read(self.plan_path()).await {
            Ok(content) => Ok(Some(serde_json::from_slice(&content)?)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
fn injected(name: &str) -> Error {
    Error::Io(io::Error::new(io::ErrorKind::WriteZero, name.to_owned()))
}

async fn write_durably(path: &Path, contents: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("not a file path: {:?}", path)))?;
    let tmp_path = path.with_file_name(format!("{}.tmp", file_name));

    let mut file = tokio::fs::File::create(&tmp_path).await?;
    file.write_all(contents).await?;
    file.sync_data().await?;
    drop(file);

    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::test_utils::{create_temp_dir, record, TempDir};
    use serde_json::json;

    pub fn open_temp(fp: Arc<Failpoints>) -> Result<(TempDir, CheckpointStore)> {
        let dir = create_temp_dir("checkpoint")?;
        let store = CheckpointStore::open(&dir.path, fp)?;
        Ok((dir, store))
    }

    #[tokio::test]
    async fn test_head() -> Result<()> {
        let (dir, store) = open_temp(Arc::new(Failpoints::create()))?;

        assert_eq!(None, store.read_head().await?);

        fs::write(dir.path.join("head"), "")?;
        assert_eq!(None, store.read_head().await?);

        store.write_head(0).await?;
        assert_eq!(Some(0), store.read_head().await?);

        store.write_head(41).await?;
        assert_eq!(Some(41), store.read_head().await?);
        assert_eq!("41", fs::read_to_string(dir.path.join("head"))?);

        fs::write(dir.path.join("head"), "12\n")?;
        assert_eq!(Some(12), store.read_head().await?);

        fs::write(dir.path.join("head"), "NaN")?;
        assert!(matches!(store.read_head().await, Err(Error::InvalidHead(_))));

        Ok(())
    }

    #[tokio::test]
    async fn test_cache() -> Result<()> {
        let (_dir, store) = open_temp(Arc::new(Failpoints::create()))?;

        let records = vec![
            record("vote", json!({"voter": "a", "author": "b", "permlink": "p", "weight": 100})),
            record("comment", json!({"parent_author": "", "parent_permlink": "t", "author": "b", "permlink": "p"})),
        ];

        assert!(matches!(store.read_cache(3).await, Err(Error::MissingCache(3))));

        store.write_cache(3, &records).await?;
        assert_eq!(records, store.read_cache(3).await?);
        assert_eq!(
            serde_json::to_vec(&records)?,
            fs::read(store.cache_path(3))?
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_commit_order() -> Result<()> {
        let fp = Arc::new(Failpoints::create());
        let (_dir, store) = open_temp(fp.clone())?;
        let records = vec![record("vote", json!({"voter": "a", "author": "b", "permlink": "p"}))];

        store.commit(0, &records).await?;

        fp.on("checkpoint::write_head");
        assert!(store.commit(1, &records).await.is_err());
        fp.off("checkpoint::write_head");

        assert!(store.cache_path(1).is_file());
        assert_eq!(Some(0), store.read_head().await?);

        fp.on("checkpoint::write_cache");
        assert!(store.commit(2, &records).await.is_err());
        fp.off("checkpoint::write_cache");

        assert!(!store.cache_path(2).exists());
        assert_eq!(Some(0), store.read_head().await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_plan_is_pinned() -> Result<()> {
        let (_dir, store) = open_temp(Arc::new(Failpoints::create()))?;

        assert_eq!(None, store.stored_plan().await?);

        store.check_plan(&BatchPlan::new(1, 1000, 50)?).await?;
        store.check_plan(&BatchPlan::new(1, 2000, 50)?).await?;
        assert_eq!(Some(BatchPlan::new(1, 2000, 50)?), store.stored_plan().await?);

        assert!(matches!(
            store.check_plan(&BatchPlan::new(1, 2000, 100)?).await,
            Err(Error::PlanMismatch { .. })
        ));
        assert_eq!(Some(BatchPlan::new(1, 2000, 50)?), store.stored_plan().await?);

        Ok(())
    }

    #[test]
    fn test_open_is_idempotent() -> Result<()> {
        let dir = create_temp_dir("checkpoint")?;
        CheckpointStore::open(&dir.path, Arc::new(Failpoints::create()))?;
        CheckpointStore::open(&dir.path, Arc::new(Failpoints::create()))?;
        assert!(dir.path.join("cache").is_dir());
        Ok(())
    }
}
