//! Directory client trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::team::{MemberId, MemberList, TeamId};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// A team as the remote directory reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteTeam {
    pub id: TeamId,
    pub name: String,
    pub email: String,
    /// Members in remote storage order, which carries no meaning
    pub members: MemberList,
}

/// A remote user record. Owned by the directory, never by a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub login: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
}

impl UserRecord {
    /// Whether `identifier` names this user by email or login
    pub fn matches(&self, identifier: &MemberId) -> bool {
        self.email == identifier.as_str() || self.login == identifier.as_str()
    }
}

/// Result of removing a member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    Removed,
    /// The identifier was not a member, or its user no longer exists
    AlreadyAbsent,
}

/// Result of deleting a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    AlreadyAbsent,
}

/// Remote directory holding teams and users.
///
/// Every call is a separate fallible unit; there is no multi-member
/// transaction. Transport and authentication failures surface as
/// [`DomainError::RemoteUnavailable`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DirectoryClient: Send + Sync + std::fmt::Debug {
    /// Fetch a team with its current members, `None` if it does not exist
    async fn get_team(&self, id: TeamId) -> Result<Option<RemoteTeam>, DomainError>;

    /// Create a team and return the id the directory assigned
    async fn create_team(&self, name: &str, email: &str) -> Result<TeamId, DomainError>;

    /// Replace the trivial fields of a team
    async fn update_team(&self, id: TeamId, name: &str, email: &str) -> Result<(), DomainError>;

    /// Delete a team. Deleting an absent team is not a failure.
    async fn delete_team(&self, id: TeamId) -> Result<DeleteOutcome, DomainError>;

    /// Add a member by identifier
    async fn add_team_member(&self, id: TeamId, member: &MemberId) -> Result<(), DomainError>;

    /// Remove a member by identifier. A member that is already gone,
    /// including one whose user was deleted out-of-band, is `AlreadyAbsent`.
    async fn remove_team_member(
        &self,
        id: TeamId,
        member: &MemberId,
    ) -> Result<RemovalOutcome, DomainError>;

    /// Look up a user by email or login, `None` if no such user exists
    async fn resolve_user(&self, identifier: &MemberId) -> Result<Option<UserRecord>, DomainError>;
}
