//! Domain layer - Core reconciliation types and the directory contract

pub mod directory;
pub mod error;
pub mod membership;
pub mod team;

pub use directory::{DeleteOutcome, DirectoryClient, RemoteTeam, RemovalOutcome, UserRecord};
pub use error::DomainError;
pub use membership::{MemberOperation, MembershipDiff, PartialReconciliation};
pub use team::{
    MemberId, MemberList, MemberOrder, MemberSet, MembershipPolicy, SyncStatus, TeamId, TeamSpec,
    TeamState, TeamValidationError,
};

impl From<TeamValidationError> for DomainError {
    fn from(error: TeamValidationError) -> Self {
        match error {
            TeamValidationError::MalformedId(_) | TeamValidationError::NonPositiveId(_) => {
                DomainError::invalid_id(error.to_string())
            }
            _ => DomainError::validation(error.to_string()),
        }
    }
}
