mod journal;

pub use journal::JournalStore;

use crate::error::Result;
use crate::ops::{timestamp, Asset, Authority, Metadata};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_derive::Serialize;

/// Sink for normalized chain events.
///
/// Writes are issued one at a time and in chain order; a failing write
/// aborts the batch it belongs to.
#[async_trait]
pub trait Store: Send + Sync {
    async fn add_user(&self, user: User) -> Result<()>;
    async fn add_post(&self, post: Post) -> Result<()>;
    async fn add_comment(&self, comment: Comment) -> Result<()>;
    async fn delete_post(&self, post: DeletePost) -> Result<()>;
    async fn add_vote(&self, vote: Vote) -> Result<()>;
    async fn add_follow(&self, follow: Follow) -> Result<()>;
    async fn remove_follow(&self, unfollow: Unfollow) -> Result<()>;
    async fn add_reblog(&self, reblog: Reblog) -> Result<()>;
    async fn add_producer_reward(&self, reward: ProducerReward) -> Result<()>;
    async fn add_author_reward(&self, reward: AuthorReward) -> Result<()>;
    async fn add_curation_reward(&self, reward: CurationReward) -> Result<()>;
    async fn add_transfer(&self, transfer: Transfer) -> Result<()>;
    async fn add_transfer_to_vesting(&self, transfer: TransferToVesting) -> Result<()>;
    async fn add_claim_reward_balance(&self, claim: ClaimRewardBalance) -> Result<()>;
    async fn handle_account_update(&self, update: AccountUpdate) -> Result<()>;
    async fn add_delegate_vesting_shares(&self, delegation: DelegateVestingShares) -> Result<()>;
    async fn handle_return_vesting_delegation(&self, delegation: ReturnVestingDelegation) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    pub name: String,
    pub metadata: Metadata,
    pub owner: Option<Authority>,
    pub active: Option<Authority>,
    pub posting: Option<Authority>,
    pub memo_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    pub category: String,
    pub author: String,
    pub permlink: String,
    pub title: String,
    pub body: String,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    pub parent_author: String,
    pub parent_permlink: String,
    pub author: String,
    pub permlink: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletePost {
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    pub author: String,
    pub permlink: String,
}

/// Authoritative vote state of a post, as reported by the node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vote {
    pub author: String,
    pub permlink: String,
    pub voter: String,
    pub percent: i64,
    pub rshares: i64,
    #[serde(with = "timestamp")]
    pub time: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Follow {
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    pub follower: String,
    pub following: String,
    pub what: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unfollow {
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    pub follower: String,
    pub following: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reblog {
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    pub account: String,
    pub author: String,
    pub permlink: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProducerReward {
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    pub producer: String,
    pub vesting_shares: Asset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorReward {
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    pub author: String,
    pub permlink: String,
    pub sbd_payout: Asset,
    pub steem_payout: Asset,
    pub vesting_payout: Asset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurationReward {
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    pub curator: String,
    pub reward: Asset,
    pub comment_author: String,
    pub comment_permlink: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transfer {
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    pub from: String,
    pub to: String,
    pub amount: Asset,
    pub memo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferToVesting {
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    pub from: String,
    pub to: String,
    pub amount: Asset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimRewardBalance {
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    pub account: String,
    pub reward_steem: Asset,
    pub reward_sbd: Asset,
    pub reward_vests: Asset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountUpdate {
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    pub account: String,
    pub owner: Option<Authority>,
    pub active: Option<Authority>,
    pub posting: Option<Authority>,
    pub memo_key: String,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelegateVestingShares {
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    pub delegator: String,
    pub delegatee: String,
    pub vesting_shares: Asset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnVestingDelegation {
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    pub account: String,
    pub vesting_shares: Asset,
}
