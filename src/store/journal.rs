use super::*;
use crate::error::Error;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Serialize)]
struct JournalLine<'a, T> {
    event: &'a str,
    #[serde(flatten)]
    args: &'a T,
}

/// Store that appends every normalized write as a json line.
pub struct JournalStore {
    writer: Arc<Mutex<BufWriter<File>>>,
}

impl JournalStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<JournalStore> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(JournalStore {
            writer: Arc::new(Mutex::new(BufWriter::new(file))),
        })
    }

    async fn append<T: serde::Serialize>(&self, event: &str, args: &T) -> Result<()> {
        let mut line = serde_json::to_vec(&JournalLine { event, args })?;
        line.push(b'\n');

        let writer = self.writer.clone();
        tokio::task::spawn_blocking(move || {
            let mut writer = writer.lock().map_err(|_| Error::Store("journal writer poisoned".to_owned()))?;
            writer.write_all(&line)?;
            writer.flush()?;
            Ok::<(), Error>(())
        })
        .await
        .map_err(|err| Error::Store(format!("journal write task failed: {}", err)))?
    }
}

#[async_trait]
impl Store for JournalStore {
    async fn add_user(&self, user: User) -> Result<()> {
        self.append("add_user", &user).await
    }
    async fn add_post(&self, post: Post) -> Result<()> {
        self.append("add_post", &post).await
    }
    async fn add_comment(&self, comment: Comment) -> Result<()> {
        self.append("add_comment", &comment).await
    }
    async fn delete_post(&self, post: DeletePost) -> Result<()> {
        self.append("delete_post", &post).await
    }
    async fn add_vote(&self, vote: Vote) -> Result<()> {
        self.append("add_vote", &vote).await
    }
    async fn add_follow(&self, follow: Follow) -> Result<()> {
        self.append("add_follow", &follow).await
    }
    async fn remove_follow(&self, unfollow: Unfollow) -> Result<()> {
        self.append("remove_follow", &unfollow).await
    }
    async fn add_reblog(&self, reblog: Reblog) -> Result<()> {
        self.append("add_reblog", &reblog).await
    }
    async fn add_producer_reward(&self, reward: ProducerReward) -> Result<()> {
        self.append("add_producer_reward", &reward).await
    }
    async fn add_author_reward(&self, reward: AuthorReward) -> Result<()> {
        self.append("add_author_reward", &reward).await
    }
    async fn add_curation_reward(&self, reward: CurationReward) -> Result<()> {
        self.append("add_curation_reward", &reward).await
    }
    async fn add_transfer(&self, transfer: Transfer) -> Result<()> {
        self.append("add_transfer", &transfer).await
    }
    async fn add_transfer_to_vesting(&self, transfer: TransferToVesting) -> Result<()> {
        self.append("add_transfer_to_vesting", &transfer).await
    }
    async fn add_claim_reward_balance(&self, claim: ClaimRewardBalance) -> Result<()> {
        self.append("add_claim_reward_balance", &claim).await
    }
    async fn handle_account_update(&self, update: AccountUpdate) -> Result<()> {
        self.append("handle_account_update", &update).await
    }
    async fn add_delegate_vesting_shares(&self, delegation: DelegateVestingShares) -> Result<()> {
        self.append("add_delegate_vesting_shares", &delegation).await
    }
    async fn handle_return_vesting_delegation(&self, delegation: ReturnVestingDelegation) -> Result<()> {
        self.append("handle_return_vesting_delegation", &delegation).await
    }
}
