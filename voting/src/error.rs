use near_sdk::FunctionError;
use thiserror::Error;

/// Operation invoked outside the workflow phase it requires.
/// Each variant names the operation's own failure so callers can tell which
/// gate they hit.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseError {
    #[error("Voters registration is not open yet")]
    VotersRegistrationNotOpen,
    #[error("Registering proposals cannot be started now")]
    ProposalsRegistrationCannotStart,
    #[error("Registering proposals has not started yet")]
    ProposalsRegistrationNotStarted,
    #[error("Proposals are not allowed yet")]
    ProposalsNotAllowed,
    #[error("Registering proposals phase is not finished")]
    ProposalsRegistrationNotFinished,
    #[error("Voting session havent started yet")]
    VotingSessionNotStarted,
    #[error("Current status is not voting session ended")]
    VotingSessionNotEnded,
}

/// Every way a contract call can be rejected. Returned from `#[handle_result]`
/// methods, so the message becomes the panic string of the failed receipt.
#[derive(Error, FunctionError, Debug, Clone, PartialEq, Eq)]
pub enum VotingError {
    #[error("Ownable: caller is not the owner")]
    NotOwner,
    #[error(transparent)]
    Phase(#[from] PhaseError),
    #[error("Already registered")]
    AlreadyRegistered,
    #[error("You're not a voter")]
    NotAVoter,
    #[error("Vous ne pouvez pas ne rien proposer")]
    EmptyProposal,
    #[error("Proposal description exceeds max length")]
    DescriptionTooLong,
    #[error("Too many proposals")]
    TooManyProposals,
    #[error("Proposal not found")]
    ProposalNotFound,
    #[error("You have already voted")]
    AlreadyVoted,
}
