use super::votes::VotedPostSet;
use crate::error::Result;
use crate::ops::{self, Authority, FollowOp, Metadata, Operation, TransactionRecord};
use crate::store::{self, Store};
use chrono::NaiveDateTime;

/// What happened to a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Written,
    /// Vote recorded for reconciliation after the batch.
    Deferred,
    /// Known kind with nothing to store.
    Ignored,
    /// Unrecognized kind or undecodable payload.
    Skipped,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    pub written: usize,
    pub deferred: usize,
    pub ignored: usize,
    pub skipped: usize,
}

impl DispatchStats {
    fn count(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Written => self.written += 1,
            Outcome::Deferred => self.deferred += 1,
            Outcome::Ignored => self.ignored += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }
}

/// Turns transaction records into store writes.
///
/// Records are handled strictly in order and every write is awaited before
/// the next record, since later operations may refer to entities created
/// earlier in the same batch.
pub struct OperationDispatcher<'a, S: Store + ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> OperationDispatcher<'a, S> {
    pub fn new(store: &'a S) -> OperationDispatcher<'a, S> {
        OperationDispatcher { store }
    }

    pub async fn dispatch_all(&self, records: &[TransactionRecord], voted: &mut VotedPostSet) -> Result<DispatchStats> {
        let mut stats = DispatchStats::default();
        for record in records {
            stats.count(self.dispatch(record, voted).await?);
        }
        Ok(stats)
    }

    pub async fn dispatch(&self, record: &TransactionRecord, voted: &mut VotedPostSet) -> Result<Outcome> {
        let operation = match record.operation() {
            Ok(operation) => operation,
            Err(err) => {
                log::warn!(
                    "skipping {} operation with unexpected payload {}: {}",
                    record.kind(),
                    record.payload(),
                    err
                );
                return Ok(Outcome::Skipped);
            }
        };
        let timestamp = record.timestamp;

        match operation {
            Operation::Pow(pow) => {
                let authority = Authority::single_key(pow.work.worker.as_str());
                self.store
                    .add_user(store::User {
                        timestamp,
                        name: pow.worker_account,
                        metadata: Metadata::default(),
                        owner: Some(authority.clone()),
                        active: Some(authority.clone()),
                        posting: Some(authority),
                        memo_key: Some(pow.work.worker),
                    })
                    .await?
            }
            Operation::Pow2(pow2) => {
                let authority = pow2.new_owner_key.as_deref().map(Authority::single_key);
                self.store
                    .add_user(store::User {
                        timestamp,
                        name: pow2.worker_account().to_owned(),
                        metadata: Metadata::default(),
                        owner: authority.clone(),
                        active: authority.clone(),
                        posting: authority,
                        memo_key: pow2.new_owner_key,
                    })
                    .await?
            }
            Operation::AccountCreate(account) => {
                self.store
                    .add_user(store::User {
                        timestamp,
                        metadata: Metadata::parse_or_empty(account.json_metadata.as_deref()),
                        name: account.new_account_name,
                        owner: Some(account.owner),
                        active: Some(account.active),
                        posting: Some(account.posting),
                        memo_key: Some(account.memo_key),
                    })
                    .await?
            }
            Operation::Comment(comment) => self.comment(timestamp, comment).await?,
            Operation::Vote(vote) => {
                voted.insert(vote.author, vote.permlink);
                return Ok(Outcome::Deferred);
            }
            Operation::DeleteComment(comment) => {
                self.store
                    .delete_post(store::DeletePost {
                        timestamp,
                        author: comment.author,
                        permlink: comment.permlink,
                    })
                    .await?
            }
            Operation::CustomJson(custom) => return self.custom_json(timestamp, custom).await,
            Operation::ProducerReward(reward) => {
                self.store
                    .add_producer_reward(store::ProducerReward {
                        timestamp,
                        producer: reward.producer,
                        vesting_shares: reward.vesting_shares,
                    })
                    .await?
            }
            Operation::AuthorReward(reward) => {
                self.store
                    .add_author_reward(store::AuthorReward {
                        timestamp,
                        author: reward.author,
                        permlink: reward.permlink,
                        sbd_payout: reward.sbd_payout,
                        steem_payout: reward.steem_payout,
                        vesting_payout: reward.vesting_payout,
                    })
                    .await?
            }
            Operation::CurationReward(reward) => {
                self.store
                    .add_curation_reward(store::CurationReward {
                        timestamp,
                        curator: reward.curator,
                        reward: reward.reward,
                        comment_author: reward.comment_author,
                        comment_permlink: reward.comment_permlink,
                    })
                    .await?
            }
            Operation::Transfer(transfer) => {
                self.store
                    .add_transfer(store::Transfer {
                        timestamp,
                        from: transfer.from,
                        to: transfer.to,
                        amount: transfer.amount,
                        memo: transfer.memo,
                    })
                    .await?
            }
            Operation::TransferToVesting(transfer) => {
                self.store
                    .add_transfer_to_vesting(store::TransferToVesting {
                        timestamp,
                        from: transfer.from,
                        to: transfer.to,
                        amount: transfer.amount,
                    })
                    .await?
            }
            Operation::ClaimRewardBalance(claim) => {
                self.store
                    .add_claim_reward_balance(store::ClaimRewardBalance {
                        timestamp,
                        account: claim.account,
                        reward_steem: claim.reward_steem,
                        reward_sbd: claim.reward_sbd,
                        reward_vests: claim.reward_vests,
                    })
                    .await?
            }
            Operation::AccountUpdate(update) => {
                self.store
                    .handle_account_update(store::AccountUpdate {
                        timestamp,
                        metadata: Metadata::parse_or_empty(update.json_metadata.as_deref()),
                        account: update.account,
                        owner: update.owner,
                        active: update.active,
                        posting: update.posting,
                        memo_key: update.memo_key,
                    })
                    .await?
            }
            Operation::DelegateVestingShares(delegation) => {
                self.store
                    .add_delegate_vesting_shares(store::DelegateVestingShares {
                        timestamp,
                        delegator: delegation.delegator,
                        delegatee: delegation.delegatee,
                        vesting_shares: delegation.vesting_shares,
                    })
                    .await?
            }
            Operation::ReturnVestingDelegation(delegation) => {
                self.store
                    .handle_return_vesting_delegation(store::ReturnVestingDelegation {
                        timestamp,
                        account: delegation.account,
                        vesting_shares: delegation.vesting_shares,
                    })
                    .await?
            }
            Operation::Ignored(kind) => {
                log::trace!("ignoring {} operation", kind);
                return Ok(Outcome::Ignored);
            }
            Operation::Unrecognized { kind, payload } => {
                log::warn!("unhandled operation {}: {}", kind, payload);
                return Ok(Outcome::Skipped);
            }
        }

        Ok(Outcome::Written)
    }

    async fn comment(&self, timestamp: NaiveDateTime, comment: ops::Comment) -> Result<()> {
        if comment.is_post() {
            self.store
                .add_post(store::Post {
                    timestamp,
                    metadata: Metadata::parse_or_empty(comment.json_metadata.as_deref()),
                    category: comment.parent_permlink,
                    author: comment.author,
                    permlink: comment.permlink,
                    title: comment.title,
                    body: comment.body,
                })
                .await
        } else {
            self.store
                .add_comment(store::Comment {
                    timestamp,
                    parent_author: comment.parent_author.unwrap_or_default(),
                    parent_permlink: comment.parent_permlink,
                    author: comment.author,
                    permlink: comment.permlink,
                    body: comment.body,
                })
                .await
        }
    }

    async fn custom_json(&self, timestamp: NaiveDateTime, custom: ops::CustomJson) -> Result<Outcome> {
        if custom.id != "follow" {
            log::trace!("ignoring custom_json {}", custom.id);
            return Ok(Outcome::Ignored);
        }

        match FollowOp::parse(&custom.json) {
            Ok(FollowOp::Follow(follow)) if follow.what.is_empty() => {
                self.store
                    .remove_follow(store::Unfollow {
                        timestamp,
                        follower: follow.follower,
                        following: follow.following,
                    })
                    .await?
            }
            Ok(FollowOp::Follow(follow)) => {
                self.store
                    .add_follow(store::Follow {
                        timestamp,
                        follower: follow.follower,
                        following: follow.following,
                        what: follow.what,
                    })
                    .await?
            }
            Ok(FollowOp::Reblog(reblog)) => {
                self.store
                    .add_reblog(store::Reblog {
                        timestamp,
                        account: reblog.account,
                        author: reblog.author,
                        permlink: reblog.permlink,
                    })
                    .await?
            }
            Err(err) => {
                log::warn!("skipping follow custom_json {}: {}", custom.json, err);
                return Ok(Outcome::Skipped);
            }
        }

        Ok(Outcome::Written)
    }
}
