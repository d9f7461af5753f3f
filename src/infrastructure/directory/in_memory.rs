//! In-memory directory implementation

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::directory::{
    DeleteOutcome, DirectoryClient, RemoteTeam, RemovalOutcome, UserRecord,
};
use crate::domain::membership::MemberOperation;
use crate::domain::team::{MemberId, MemberList, TeamId};
use crate::domain::DomainError;

#[derive(Debug)]
struct StoredTeam {
    name: String,
    email: String,
    /// Insertion order stands in for remote storage order
    members: Vec<MemberId>,
}

#[derive(Debug, Default)]
struct State {
    next_team_id: i64,
    next_user_id: i64,
    teams: HashMap<TeamId, StoredTeam>,
    users: HashMap<i64, UserRecord>,
    fail_add: HashSet<MemberId>,
    fail_remove: HashSet<MemberId>,
    unavailable: bool,
    journal: Vec<(TeamId, MemberOperation)>,
}

impl State {
    fn find_user(&self, identifier: &MemberId) -> Option<&UserRecord> {
        self.users.values().find(|user| user.matches(identifier))
    }

    fn team_mut(&mut self, id: TeamId) -> Result<&mut StoredTeam, DomainError> {
        self.teams
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", id)))
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable {
            return Err(DomainError::remote_unavailable("in-memory directory is offline"));
        }
        Ok(())
    }
}

/// Thread-safe in-memory directory
///
/// Useful for testing and dry runs. Records every applied member mutation and
/// supports injecting failures for individual members.
#[derive(Debug)]
pub struct InMemoryDirectory {
    state: Mutex<State>,
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDirectory {
    /// Creates an empty directory; team and user ids start at 1
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_team_id: 1,
                next_user_id: 1,
                ..State::default()
            }),
        }
    }

    /// Register a user (builder pattern)
    pub fn with_user(mut self, login: &str, email: &str) -> Self {
        if let Ok(state) = self.state.get_mut() {
            register_user(state, login, email);
        }
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|e| DomainError::internal(format!("Failed to acquire directory lock: {}", e)))
    }

    /// Delete a user record out-of-band. Team memberships that referenced it
    /// are left behind, stale.
    pub fn delete_user(&self, identifier: &MemberId) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        let id = state.find_user(identifier).map(|user| user.id);

        Ok(id.is_some_and(|id| state.users.remove(&id).is_some()))
    }

    /// Add a member without going through the client, like an external sync
    /// process would
    pub fn add_external_member(&self, team: TeamId, member: &MemberId) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        let stored = state.team_mut(team)?;

        if !stored.members.contains(member) {
            stored.members.push(member.clone());
        }
        Ok(())
    }

    /// Make every `add_team_member` call for `member` fail
    pub fn fail_add_for(&self, member: &MemberId) -> Result<(), DomainError> {
        self.lock()?.fail_add.insert(member.clone());
        Ok(())
    }

    /// Make every `remove_team_member` call for `member` fail
    pub fn fail_remove_for(&self, member: &MemberId) -> Result<(), DomainError> {
        self.lock()?.fail_remove.insert(member.clone());
        Ok(())
    }

    /// Clear injected member failures
    pub fn clear_failures(&self) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        state.fail_add.clear();
        state.fail_remove.clear();
        Ok(())
    }

    /// Toggle whether every call fails as if the remote were unreachable
    pub fn set_unavailable(&self, unavailable: bool) -> Result<(), DomainError> {
        self.lock()?.unavailable = unavailable;
        Ok(())
    }

    /// Member mutations applied so far, in call order
    pub fn member_mutations(&self) -> Result<Vec<(TeamId, MemberOperation)>, DomainError> {
        Ok(self.lock()?.journal.clone())
    }

    /// Forget recorded member mutations
    pub fn clear_journal(&self) -> Result<(), DomainError> {
        self.lock()?.journal.clear();
        Ok(())
    }
}

fn register_user(state: &mut State, login: &str, email: &str) {
    let id = state.next_user_id;
    state.next_user_id += 1;
    state.users.insert(
        id,
        UserRecord {
            id,
            login: login.to_string(),
            email: email.to_string(),
            name: login.to_string(),
        },
    );
}

#[async_trait]
impl DirectoryClient for InMemoryDirectory {
    async fn get_team(&self, id: TeamId) -> Result<Option<RemoteTeam>, DomainError> {
        let state = self.lock()?;
        state.check_available()?;

        Ok(state.teams.get(&id).map(|team| RemoteTeam {
            id,
            name: team.name.clone(),
            email: team.email.clone(),
            members: team.members.iter().cloned().collect::<MemberList>(),
        }))
    }

    async fn create_team(&self, name: &str, email: &str) -> Result<TeamId, DomainError> {
        let mut state = self.lock()?;
        state.check_available()?;

        if state.teams.values().any(|team| team.name == name) {
            return Err(DomainError::conflict(format!(
                "Team name '{}' is already taken",
                name
            )));
        }

        let id = TeamId::new(state.next_team_id)?;
        state.next_team_id += 1;
        state.teams.insert(
            id,
            StoredTeam {
                name: name.to_string(),
                email: email.to_string(),
                members: Vec::new(),
            },
        );

        Ok(id)
    }

    async fn update_team(&self, id: TeamId, name: &str, email: &str) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        state.check_available()?;

        let team = state.team_mut(id)?;
        team.name = name.to_string();
        team.email = email.to_string();
        Ok(())
    }

    async fn delete_team(&self, id: TeamId) -> Result<DeleteOutcome, DomainError> {
        let mut state = self.lock()?;
        state.check_available()?;

        match state.teams.remove(&id) {
            Some(_) => Ok(DeleteOutcome::Deleted),
            None => Ok(DeleteOutcome::AlreadyAbsent),
        }
    }

    async fn add_team_member(&self, id: TeamId, member: &MemberId) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        state.check_available()?;

        if state.fail_add.contains(member) {
            return Err(DomainError::remote(
                500,
                format!("Failed to add '{}' to team {}", member, id),
            ));
        }

        if state.find_user(member).is_none() {
            return Err(DomainError::not_found(format!("User '{}' not found", member)));
        }

        let team = state.team_mut(id)?;
        if team.members.contains(member) {
            return Err(DomainError::conflict(format!(
                "User '{}' is already added to team {}",
                member, id
            )));
        }

        team.members.push(member.clone());
        state.journal.push((id, MemberOperation::Add(member.clone())));
        Ok(())
    }

    async fn remove_team_member(
        &self,
        id: TeamId,
        member: &MemberId,
    ) -> Result<RemovalOutcome, DomainError> {
        let mut state = self.lock()?;
        state.check_available()?;

        if state.fail_remove.contains(member) {
            return Err(DomainError::remote_unavailable(format!(
                "Timed out removing '{}' from team {}",
                member, id
            )));
        }

        let user_exists = state.find_user(member).is_some();
        let team = state.team_mut(id)?;

        let Some(position) = team.members.iter().position(|m| m == member) else {
            return Ok(RemovalOutcome::AlreadyAbsent);
        };

        team.members.remove(position);

        if !user_exists {
            // The user is gone; its membership row is purged with it
            return Ok(RemovalOutcome::AlreadyAbsent);
        }

        state.journal.push((id, MemberOperation::Remove(member.clone())));
        Ok(RemovalOutcome::Removed)
    }

    async fn resolve_user(&self, identifier: &MemberId) -> Result<Option<UserRecord>, DomainError> {
        let state = self.lock()?;
        state.check_available()?;

        Ok(state.find_user(identifier).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str) -> MemberId {
        MemberId::new(id).unwrap()
    }

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::new()
            .with_user("u1", "u1@example.com")
            .with_user("u2", "u2@example.com")
    }

    #[tokio::test]
    async fn test_create_and_get_team() {
        let directory = directory();

        let id = directory.create_team("team", "team@example.com").await.unwrap();
        assert_eq!(id.value(), 1);

        let team = directory.get_team(id).await.unwrap().unwrap();
        assert_eq!(team.name, "team");
        assert_eq!(team.email, "team@example.com");
        assert!(team.members.is_empty());
    }

    #[tokio::test]
    async fn test_create_duplicate_name() {
        let directory = directory();
        directory.create_team("team", "").await.unwrap();

        let result = directory.create_team("team", "").await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_add_and_remove_member() {
        let directory = directory();
        let id = directory.create_team("team", "").await.unwrap();

        directory.add_team_member(id, &member("u1@example.com")).await.unwrap();
        directory.add_team_member(id, &member("u2")).await.unwrap();

        let team = directory.get_team(id).await.unwrap().unwrap();
        assert_eq!(team.members.len(), 2);

        let outcome = directory
            .remove_team_member(id, &member("u1@example.com"))
            .await
            .unwrap();
        assert_eq!(outcome, RemovalOutcome::Removed);

        let journal = directory.member_mutations().unwrap();
        assert_eq!(journal.len(), 3);
        assert_eq!(journal[2].1, MemberOperation::Remove(member("u1@example.com")));
    }

    #[tokio::test]
    async fn test_add_unknown_user() {
        let directory = directory();
        let id = directory.create_team("team", "").await.unwrap();

        let result = directory.add_team_member(id, &member("nobody@example.com")).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_add_existing_member_conflicts() {
        let directory = directory();
        let id = directory.create_team("team", "").await.unwrap();
        directory.add_team_member(id, &member("u1@example.com")).await.unwrap();

        let result = directory.add_team_member(id, &member("u1@example.com")).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_remove_non_member_is_already_absent() {
        let directory = directory();
        let id = directory.create_team("team", "").await.unwrap();

        let outcome = directory
            .remove_team_member(id, &member("u1@example.com"))
            .await
            .unwrap();
        assert_eq!(outcome, RemovalOutcome::AlreadyAbsent);
        assert!(directory.member_mutations().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_deleted_user_purges_membership() {
        let directory = directory();
        let id = directory.create_team("team", "").await.unwrap();
        directory.add_team_member(id, &member("u1@example.com")).await.unwrap();

        assert!(directory.delete_user(&member("u1@example.com")).unwrap());

        let stale = directory.get_team(id).await.unwrap().unwrap();
        assert!(stale.members.contains(&member("u1@example.com")));

        let outcome = directory
            .remove_team_member(id, &member("u1@example.com"))
            .await
            .unwrap();
        assert_eq!(outcome, RemovalOutcome::AlreadyAbsent);

        let team = directory.get_team(id).await.unwrap().unwrap();
        assert!(team.members.is_empty());
    }

    #[tokio::test]
    async fn test_delete_team_twice() {
        let directory = directory();
        let id = directory.create_team("team", "").await.unwrap();

        assert_eq!(directory.delete_team(id).await.unwrap(), DeleteOutcome::Deleted);
        assert_eq!(
            directory.delete_team(id).await.unwrap(),
            DeleteOutcome::AlreadyAbsent
        );
        assert!(directory.get_team(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unavailable() {
        let directory = directory();
        directory.set_unavailable(true).unwrap();

        let result = directory.create_team("team", "").await;
        assert!(matches!(result, Err(DomainError::RemoteUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let directory = directory();
        let id = directory.create_team("team", "").await.unwrap();
        directory.fail_add_for(&member("u1@example.com")).unwrap();

        let result = directory.add_team_member(id, &member("u1@example.com")).await;
        assert!(matches!(result, Err(DomainError::Remote { status: 500, .. })));

        directory.clear_failures().unwrap();
        directory.add_team_member(id, &member("u1@example.com")).await.unwrap();
    }
}
