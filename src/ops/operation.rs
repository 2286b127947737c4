use serde::Deserialize as _;
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

/// Operation kinds that are valid on chain but never reach the store.
pub const IGNORED_KINDS: &[&str] = &[
    "limit_order_create",
    "limit_order_create2",
    "limit_order_cancel",
    "fill_order",
    "convert",
    "fill_convert_request",
    "feed_publish",
    "witness_update",
    "witness_set_properties",
    "account_witness_vote",
    "account_witness_proxy",
    "shutdown_witness",
    "transfer_to_savings",
    "transfer_from_savings",
    "cancel_transfer_from_savings",
    "fill_transfer_from_savings",
    "interest",
    "withdraw_vesting",
    "fill_vesting_withdraw",
    "set_withdraw_vesting_route",
    "request_account_recovery",
    "recover_account",
    "change_recovery_account",
    "reset_account",
    "set_reset_account",
    "escrow_transfer",
    "escrow_approve",
    "escrow_dispute",
    "escrow_release",
    "comment_options",
    "comment_benefactor_reward",
    "comment_payout_update",
    "decline_voting_rights",
    "claim_account",
    "create_claimed_account",
    "custom",
    "custom_binary",
    "liquidity_reward",
    "hardfork",
];

/// `{weight_threshold, account_auths, key_auths}` as found on chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authority {
    pub weight_threshold: u32,
    pub account_auths: Vec<(String, u16)>,
    pub key_auths: Vec<(String, u16)>,
}

impl Authority {
    /// Single-key authority used for accounts created by mining.
    pub fn single_key<K: Into<String>>(key: K) -> Authority {
        Authority {
            weight_threshold: 1,
            account_auths: Vec::new(),
            key_auths: vec![(key.into(), 1)],
        }
    }
}

/// Legacy `"1.000 STEEM"` strings or `{amount, precision, nai}` objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Asset {
    Legacy(String),
    Nai { amount: String, precision: u8, nai: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PowWork {
    pub worker: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Pow {
    pub worker_account: String,
    pub work: PowWork,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Pow2Input {
    pub worker_account: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Pow2Work {
    pub input: Pow2Input,
}

/// `work` is a static variant `[tag, {input, pow_summary}]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Pow2 {
    pub work: (u8, Pow2Work),
    #[serde(default)]
    pub new_owner_key: Option<String>,
}

impl Pow2 {
    pub fn worker_account(&self) -> &str {
        &(self.work.1).input.worker_account
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountCreate {
    pub new_account_name: String,
    pub owner: Authority,
    pub active: Authority,
    pub posting: Authority,
    pub memo_key: String,
    #[serde(default)]
    pub json_metadata: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub parent_author: Option<String>,
    pub parent_permlink: String,
    pub author: String,
    pub permlink: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub json_metadata: Option<String>,
}

impl Comment {
    /// Top-level posts have no parent author.
    pub fn is_post(&self) -> bool {
        self.parent_author.as_deref().map_or(true, str::is_empty)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Vote {
    pub voter: String,
    pub author: String,
    pub permlink: String,
    #[serde(default)]
    pub weight: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeleteComment {
    pub author: String,
    pub permlink: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomJson {
    pub id: String,
    pub json: String,
    #[serde(default)]
    pub required_auths: Vec<String>,
    #[serde(default)]
    pub required_posting_auths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProducerReward {
    pub producer: String,
    pub vesting_shares: Asset,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthorReward {
    pub author: String,
    pub permlink: String,
    pub sbd_payout: Asset,
    pub steem_payout: Asset,
    pub vesting_payout: Asset,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurationReward {
    pub curator: String,
    pub reward: Asset,
    pub comment_author: String,
    pub comment_permlink: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transfer {
    pub from: String,
    pub to: String,
    pub amount: Asset,
    #[serde(default)]
    pub memo: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransferToVesting {
    pub from: String,
    #[serde(default)]
    pub to: String,
    pub amount: Asset,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClaimRewardBalance {
    pub account: String,
    pub reward_steem: Asset,
    pub reward_sbd: Asset,
    pub reward_vests: Asset,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountUpdate {
    pub account: String,
    #[serde(default)]
    pub owner: Option<Authority>,
    #[serde(default)]
    pub active: Option<Authority>,
    #[serde(default)]
    pub posting: Option<Authority>,
    pub memo_key: String,
    #[serde(default)]
    pub json_metadata: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DelegateVestingShares {
    pub delegator: String,
    pub delegatee: String,
    pub vesting_shares: Asset,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReturnVestingDelegation {
    pub account: String,
    pub vesting_shares: Asset,
}

/// Every operation kind the dispatcher knows, with only the fields it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Pow(Pow),
    Pow2(Pow2),
    AccountCreate(AccountCreate),
    Comment(Comment),
    Vote(Vote),
    DeleteComment(DeleteComment),
    CustomJson(CustomJson),
    ProducerReward(ProducerReward),
    AuthorReward(AuthorReward),
    CurationReward(CurationReward),
    Transfer(Transfer),
    TransferToVesting(TransferToVesting),
    ClaimRewardBalance(ClaimRewardBalance),
    AccountUpdate(AccountUpdate),
    DelegateVestingShares(DelegateVestingShares),
    ReturnVestingDelegation(ReturnVestingDelegation),
    Ignored(String),
    Unrecognized { kind: String, payload: Value },
}

impl Operation {
    /// Decodes the payload of a known kind. Unknown kinds never fail.
    pub fn decode(kind: &str, payload: &Value) -> Result<Operation, serde_json::Error> {
        Ok(match kind {
            "pow" => Operation::Pow(Pow::deserialize(payload)?),
            "pow2" => Operation::Pow2(Pow2::deserialize(payload)?),
            "account_create" | "account_create_with_delegation" => {
                Operation::AccountCreate(AccountCreate::deserialize(payload)?)
            }
            "comment" => Operation::Comment(Comment::deserialize(payload)?),
            "vote" => Operation::Vote(Vote::deserialize(payload)?),
            "delete_comment" => Operation::DeleteComment(DeleteComment::deserialize(payload)?),
            "custom_json" => Operation::CustomJson(CustomJson::deserialize(payload)?),
            "producer_reward" => Operation::ProducerReward(ProducerReward::deserialize(payload)?),
            "author_reward" => Operation::AuthorReward(AuthorReward::deserialize(payload)?),
            "curation_reward" => Operation::CurationReward(CurationReward::deserialize(payload)?),
            "transfer" => Operation::Transfer(Transfer::deserialize(payload)?),
            "transfer_to_vesting" => {
                Operation::TransferToVesting(TransferToVesting::deserialize(payload)?)
            }
            "claim_reward_balance" => {
                Operation::ClaimRewardBalance(ClaimRewardBalance::deserialize(payload)?)
            }
            "account_update" => Operation::AccountUpdate(AccountUpdate::deserialize(payload)?),
            "delegate_vesting_shares" => {
                Operation::DelegateVestingShares(DelegateVestingShares::deserialize(payload)?)
            }
            "return_vesting_delegation" => {
                Operation::ReturnVestingDelegation(ReturnVestingDelegation::deserialize(payload)?)
            }
            kind if IGNORED_KINDS.contains(&kind) => Operation::Ignored(kind.to_owned()),
            kind => Operation::Unrecognized {
                kind: kind.to_owned(),
                payload: payload.clone(),
            },
        })
    }
}
