use crate::error::Result;
use crate::rpc::Rpc;
use crate::store::{self, Store};
use std::collections::BTreeSet;

/// Posts touched by vote operations of the batch being processed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VotedPostSet {
    posts: BTreeSet<(String, String)>,
}

impl VotedPostSet {
    pub fn new() -> VotedPostSet {
        VotedPostSet::default()
    }

    pub fn insert<A: Into<String>, P: Into<String>>(&mut self, author: A, permlink: P) -> bool {
        self.posts.insert((author.into(), permlink.into()))
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.posts
            .iter()
            .map(|(author, permlink)| (author.as_str(), permlink.as_str()))
    }
}

/// Replaces the vote state of every touched post with the node's view of it.
///
/// Later votes change the weight of earlier ones, so the `weight` carried
/// by a vote operation is never stored.
pub struct VoteReconciler<'a, R: Rpc + ?Sized, S: Store + ?Sized> {
    rpc: &'a R,
    store: &'a S,
}

impl<'a, R: Rpc + ?Sized, S: Store + ?Sized> VoteReconciler<'a, R, S> {
    pub fn new(rpc: &'a R, store: &'a S) -> VoteReconciler<'a, R, S> {
        VoteReconciler { rpc, store }
    }

    /// One active-votes query per post, then one upsert per returned vote.
    /// Returns the number of votes written.
    pub async fn reconcile(&self, voted: VotedPostSet) -> Result<usize> {
        let mut written = 0;
        for (author, permlink) in voted.iter() {
            let votes = self.rpc.get_active_votes(author, permlink).await?;
            log::debug!("{} active votes on @{}/{}", votes.len(), author, permlink);

            for vote in votes {
                self.store
                    .add_vote(store::Vote {
                        author: author.to_owned(),
                        permlink: permlink.to_owned(),
                        voter: vote.voter,
                        percent: vote.percent,
                        rshares: vote.rshares,
                        time: vote.time,
                    })
                    .await?;
                written += 1;
            }
        }
        Ok(written)
    }
}
