use near_sdk::borsh::{self, BorshDeserialize, BorshSerialize};
use near_sdk::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

/// Phases of a voting session, in the only order they can be entered.
#[derive(
    BorshDeserialize, BorshSerialize, Serialize, Deserialize, JsonSchema, Clone, Copy, Debug, PartialEq, Eq,
)]
#[serde(crate = "near_sdk::serde")]
pub enum WorkflowStatus {
    RegisteringVoters,
    ProposalsRegistrationStarted,
    ProposalsRegistrationEnded,
    VotingSessionStarted,
    VotingSessionEnded,
    VotesTallied,
}

impl WorkflowStatus {
    /// The phase that follows `self`, or `None` once votes are tallied.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::RegisteringVoters => Some(Self::ProposalsRegistrationStarted),
            Self::ProposalsRegistrationStarted => Some(Self::ProposalsRegistrationEnded),
            Self::ProposalsRegistrationEnded => Some(Self::VotingSessionStarted),
            Self::VotingSessionStarted => Some(Self::VotingSessionEnded),
            Self::VotingSessionEnded => Some(Self::VotesTallied),
            Self::VotesTallied => None,
        }
    }
}

#[derive(
    BorshDeserialize, BorshSerialize, Serialize, Deserialize, JsonSchema, Clone, Debug, Default, PartialEq, Eq,
)]
#[serde(crate = "near_sdk::serde")]
pub struct Voter {
    pub is_registered: bool,
    pub has_voted: bool,
    // 0 until the voter casts a ballot; only meaningful when has_voted is set
    pub voted_proposal_id: u64,
}

impl Voter {
    pub fn registered() -> Self {
        Self { is_registered: true, ..Self::default() }
    }
}

#[derive(BorshDeserialize, BorshSerialize, Serialize, Deserialize, JsonSchema, Clone, Debug, PartialEq, Eq)]
#[serde(crate = "near_sdk::serde")]
pub struct Proposal {
    pub description: String,
    pub vote_count: u64,
}

impl Proposal {
    pub fn new(description: String) -> Self {
        Self { description, vote_count: 0 }
    }

    /// Placeholder stored at index 0 when proposal registration opens.
    /// Acts as the abstention choice and the default winner.
    pub fn sentinel() -> Self {
        Self::new(String::new())
    }
}
