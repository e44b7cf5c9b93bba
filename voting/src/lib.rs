// On-chain voting session.
// The owner registers voters, then walks the session through fixed phases:
// proposal registration, voting, tally. Registered voters submit proposals
// and cast a single vote each. The most voted proposal wins; ties go to the
// proposal submitted first. Index 0 is a blank proposal that stands for
// abstention and wins when nobody votes.
//
// Every failed call returns a VotingError, which aborts the receipt so no
// partial change is ever persisted.

pub mod error;
pub mod events;
pub mod tally;
pub mod types;

use near_sdk::collections::{LookupMap, Vector};
use near_sdk::{env, near, AccountId, PanicOnDefault};

pub use crate::error::{PhaseError, VotingError};
pub use crate::events::VotingEvent;
pub use crate::types::{Proposal, Voter, WorkflowStatus};

// Limits
const DESCRIPTION_MAX: usize = 600;
const MAX_PROPOSALS: u64 = 100; // sentinel not included
const DEFAULT_PAGE_LIMIT: u64 = 50;

#[near(contract_state)]
#[derive(PanicOnDefault)]
pub struct VotingSession {
    owner: AccountId,
    workflow_status: WorkflowStatus,
    voters: LookupMap<AccountId, Voter>,
    voters_count: u64,
    proposals: Vector<Proposal>,
    winning_proposal_id: Option<u64>,
}

#[near]
impl VotingSession {
    #[init]
    pub fn new() -> Self {
        Self {
            owner: env::predecessor_account_id(),
            workflow_status: WorkflowStatus::RegisteringVoters,
            voters: LookupMap::new(b"v"),
            voters_count: 0,
            proposals: Vector::new(b"p"),
            winning_proposal_id: None,
        }
    }

    // ----------------------------------------
    // Owner: registration and workflow
    // ----------------------------------------

    #[handle_result]
    pub fn register_voter(&mut self, voter_address: AccountId) -> Result<(), VotingError> {
        self.assert_owner()?;
        self.require_status(WorkflowStatus::RegisteringVoters, PhaseError::VotersRegistrationNotOpen)?;
        if self.voters.contains_key(&voter_address) {
            return Err(VotingError::AlreadyRegistered);
        }

        self.voters.insert(&voter_address, &Voter::registered());
        self.voters_count += 1;
        VotingEvent::VoterRegistered { voter_address }.emit();
        Ok(())
    }

    #[handle_result]
    pub fn open_proposal_registration(&mut self) -> Result<(), VotingError> {
        self.assert_owner()?;
        self.require_status(WorkflowStatus::RegisteringVoters, PhaseError::ProposalsRegistrationCannotStart)?;

        self.advance(PhaseError::ProposalsRegistrationCannotStart)?;
        self.proposals.push(&Proposal::sentinel());
        Ok(())
    }

    #[handle_result]
    pub fn close_proposal_registration(&mut self) -> Result<(), VotingError> {
        self.assert_owner()?;
        self.require_status(
            WorkflowStatus::ProposalsRegistrationStarted,
            PhaseError::ProposalsRegistrationNotStarted,
        )?;
        self.advance(PhaseError::ProposalsRegistrationNotStarted)
    }

    #[handle_result]
    pub fn open_voting_session(&mut self) -> Result<(), VotingError> {
        self.assert_owner()?;
        self.require_status(
            WorkflowStatus::ProposalsRegistrationEnded,
            PhaseError::ProposalsRegistrationNotFinished,
        )?;
        self.advance(PhaseError::ProposalsRegistrationNotFinished)
    }

    #[handle_result]
    pub fn close_voting_session(&mut self) -> Result<(), VotingError> {
        self.assert_owner()?;
        self.require_status(WorkflowStatus::VotingSessionStarted, PhaseError::VotingSessionNotStarted)?;
        self.advance(PhaseError::VotingSessionNotStarted)
    }

    /// Picks the winner and closes the session for good. Returns the
    /// winning proposal id.
    #[handle_result]
    pub fn tally_votes(&mut self) -> Result<u64, VotingError> {
        self.assert_owner()?;
        self.require_status(WorkflowStatus::VotingSessionEnded, PhaseError::VotingSessionNotEnded)?;

        let winner = tally::winning_proposal(self.proposals.iter().map(|proposal| proposal.vote_count));
        self.advance(PhaseError::VotingSessionNotEnded)?;
        self.winning_proposal_id = Some(winner);
        Ok(winner)
    }

    // ----------------------------------------
    // Voters
    // ----------------------------------------

    /// Returns the id assigned to the new proposal.
    #[handle_result]
    pub fn submit_proposal(&mut self, description: String) -> Result<u64, VotingError> {
        let caller = env::predecessor_account_id();
        self.require_voter(&caller)?;
        self.require_status(WorkflowStatus::ProposalsRegistrationStarted, PhaseError::ProposalsNotAllowed)?;

        let description = description.trim().to_string();
        if description.is_empty() {
            return Err(VotingError::EmptyProposal);
        }
        if description.chars().count() > DESCRIPTION_MAX {
            return Err(VotingError::DescriptionTooLong);
        }
        if self.proposals.len() > MAX_PROPOSALS {
            return Err(VotingError::TooManyProposals);
        }

        let proposal_id = self.proposals.len();
        self.proposals.push(&Proposal::new(description));
        VotingEvent::ProposalRegistered { proposal_id }.emit();
        Ok(proposal_id)
    }

    #[handle_result]
    pub fn cast_vote(&mut self, proposal_id: u64) -> Result<(), VotingError> {
        let caller = env::predecessor_account_id();
        let mut voter = self.require_voter(&caller)?;
        self.require_status(WorkflowStatus::VotingSessionStarted, PhaseError::VotingSessionNotStarted)?;
        if voter.has_voted {
            return Err(VotingError::AlreadyVoted);
        }
        let mut proposal = self.proposals.get(proposal_id).ok_or(VotingError::ProposalNotFound)?;

        voter.has_voted = true;
        voter.voted_proposal_id = proposal_id;
        proposal.vote_count += 1;
        self.voters.insert(&caller, &voter);
        self.proposals.replace(proposal_id, &proposal);

        VotingEvent::Voted { voter: caller, proposal_id }.emit();
        Ok(())
    }

    // ----------------------------------------
    // Reads restricted to voters. These look at the predecessor, so they
    // have to be sent as function calls rather than RPC view queries.
    // ----------------------------------------

    #[handle_result]
    pub fn get_voter(&self, voter_address: AccountId) -> Result<Voter, VotingError> {
        self.require_voter(&env::predecessor_account_id())?;
        Ok(self.voters.get(&voter_address).unwrap_or_default())
    }

    #[handle_result]
    pub fn get_proposal(&self, proposal_id: u64) -> Result<Proposal, VotingError> {
        self.require_voter(&env::predecessor_account_id())?;
        self.proposals.get(proposal_id).ok_or(VotingError::ProposalNotFound)
    }

    #[handle_result]
    pub fn get_proposals(&self, from_index: Option<u64>, limit: Option<u64>) -> Result<Vec<Proposal>, VotingError> {
        self.require_voter(&env::predecessor_account_id())?;
        let from = from_index.unwrap_or(0);
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        Ok((from..self.proposals.len())
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .filter_map(|index| self.proposals.get(index))
            .collect())
    }

    // ----------------------------------------
    // Public views
    // ----------------------------------------

    pub fn owner(&self) -> AccountId {
        self.owner.clone()
    }

    pub fn get_workflow_status(&self) -> WorkflowStatus {
        self.workflow_status
    }

    pub fn get_winning_proposal_id(&self) -> Option<u64> {
        self.winning_proposal_id
    }

    pub fn get_proposals_count(&self) -> u64 {
        self.proposals.len()
    }

    pub fn get_voters_count(&self) -> u64 {
        self.voters_count
    }
}

impl VotingSession {
    fn assert_owner(&self) -> Result<(), VotingError> {
        if env::predecessor_account_id() != self.owner {
            return Err(VotingError::NotOwner);
        }
        Ok(())
    }

    fn require_status(&self, expected: WorkflowStatus, err: PhaseError) -> Result<(), VotingError> {
        if self.workflow_status != expected {
            return Err(err.into());
        }
        Ok(())
    }

    fn require_voter(&self, account: &AccountId) -> Result<Voter, VotingError> {
        self.voters
            .get(account)
            .filter(|voter| voter.is_registered)
            .ok_or(VotingError::NotAVoter)
    }

    // Moves to the phase right after the current one; `err` is reported if
    // the workflow is already finished.
    fn advance(&mut self, err: PhaseError) -> Result<(), VotingError> {
        let previous_status = self.workflow_status;
        let new_status = previous_status.next().ok_or(VotingError::Phase(err))?;
        self.workflow_status = new_status;
        VotingEvent::WorkflowStatusChange { previous_status, new_status }.emit();
        Ok(())
    }
}
