//! Membership reconciler
//!
//! Converges a team's remote membership onto a declared roster: read, diff,
//! apply removals then additions one call at a time, read back. Nothing is
//! retried and nothing is rolled back; a later pass re-diffs from live state.
//! Callers must serialize passes for the same team.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::directory::{DirectoryClient, RemovalOutcome};
use crate::domain::membership::{MemberOperation, MembershipDiff, PartialReconciliation};
use crate::domain::team::{MemberId, MemberList, MembershipPolicy, TeamId};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_member_operation, record_reconciliation};

/// Applies membership diffs through a directory client
#[derive(Debug)]
pub struct MembershipReconciler<D: DirectoryClient> {
    directory: Arc<D>,
}

impl<D: DirectoryClient> Clone for MembershipReconciler<D> {
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
        }
    }
}

impl<D: DirectoryClient> MembershipReconciler<D> {
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }

    /// Converge the membership of `team_id` onto `desired`.
    ///
    /// Returns the observed roster ordered like `desired`. Under
    /// [`MembershipPolicy::ObserveOnly`] the remote roster is returned as-is
    /// and nothing is mutated. A failure after the first read is reported as
    /// [`DomainError::PartialReconciliation`].
    pub async fn reconcile(
        &self,
        team_id: TeamId,
        desired: &MemberList,
        policy: MembershipPolicy,
    ) -> Result<MemberList, DomainError> {
        let actual = self.read_members(team_id).await?;

        if policy.is_observe_only() {
            debug!(team_id = %team_id, "Membership is externally synced, skipping reconciliation");
            record_reconciliation("observe_only");
            return Ok(actual);
        }

        let actual = self.canonicalize(actual, desired).await?;
        let diff = MembershipDiff::compute(desired, &actual);

        if diff.is_empty() {
            debug!(team_id = %team_id, members = actual.len(), "Membership already converged");
            record_reconciliation("noop");
            return Ok(actual.aligned_to(desired));
        }

        info!(
            team_id = %team_id,
            to_add = diff.to_add.len(),
            to_remove = diff.to_remove.len(),
            "Reconciling team membership"
        );

        let operations = diff.operations();
        let mut applied = Vec::with_capacity(operations.len());

        for (index, operation) in operations.iter().enumerate() {
            if let Err(source) = self.apply(team_id, operation).await {
                warn!(
                    team_id = %team_id,
                    operation = %operation,
                    applied = applied.len(),
                    error = %source,
                    "Reconciliation aborted"
                );

                let observed = self.observe(team_id, desired).await.ok();

                record_reconciliation("partial");
                return Err(DomainError::partial(PartialReconciliation {
                    team_id,
                    applied,
                    pending: operations[index..].to_vec(),
                    observed,
                    source,
                }));
            }

            applied.push(operation.clone());
        }

        let observed = match self.observe(team_id, desired).await {
            Ok(members) => members,
            Err(source) => {
                record_reconciliation("partial");
                return Err(DomainError::partial(PartialReconciliation {
                    team_id,
                    applied,
                    pending: Vec::new(),
                    observed: None,
                    source,
                }));
            }
        };

        record_reconciliation("converged");
        Ok(observed)
    }

    /// Rewrite `observed` identifiers into the form `declared` uses for the
    /// same user.
    ///
    /// The directory reports a member by a single identifier (email, or login
    /// when the user has none) while a roster may name that user by the
    /// other. Declared members missing from `observed` are resolved only while
    /// `observed` still holds undeclared entries they could stand for.
    pub async fn canonicalize(
        &self,
        observed: MemberList,
        declared: &MemberList,
    ) -> Result<MemberList, DomainError> {
        let missing: Vec<&MemberId> = declared
            .iter()
            .filter(|m| !observed.contains(m))
            .collect();

        if missing.is_empty() {
            return Ok(observed);
        }

        let mut members: Vec<MemberId> = observed.into();

        for wanted in missing {
            if members.iter().all(|m| declared.contains(m)) {
                break;
            }

            let Some(user) = self.directory.resolve_user(wanted).await? else {
                continue;
            };

            if let Some(slot) = members
                .iter_mut()
                .find(|m| !declared.contains(&**m) && user.matches(&**m))
            {
                debug!(member = %wanted, reported = %slot, "Matched declared member to remote identifier");
                *slot = wanted.clone();
            }
        }

        Ok(members.into())
    }

    async fn observe(&self, team_id: TeamId, desired: &MemberList) -> Result<MemberList, DomainError> {
        let members = self.read_members(team_id).await?;
        Ok(self.canonicalize(members, desired).await?.aligned_to(desired))
    }

    async fn read_members(&self, team_id: TeamId) -> Result<MemberList, DomainError> {
        self.directory
            .get_team(team_id)
            .await?
            .map(|team| team.members)
            .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", team_id)))
    }

    async fn apply(&self, team_id: TeamId, operation: &MemberOperation) -> Result<(), DomainError> {
        let result = match operation {
            MemberOperation::Remove(member) => {
                match self.directory.remove_team_member(team_id, member).await {
                    Ok(RemovalOutcome::Removed) => {
                        info!(team_id = %team_id, member = %member, "Removed team member");
                        Ok("applied")
                    }
                    Ok(RemovalOutcome::AlreadyAbsent) => {
                        warn!(team_id = %team_id, member = %member, "Member already absent");
                        Ok("already_absent")
                    }
                    Err(e) => Err(e),
                }
            }
            MemberOperation::Add(member) => self
                .directory
                .add_team_member(team_id, member)
                .await
                .map(|()| {
                    info!(team_id = %team_id, member = %member, "Added team member");
                    "applied"
                }),
        };

        match result {
            Ok(outcome) => {
                record_member_operation(operation.kind(), outcome);
                Ok(())
            }
            Err(e) => {
                record_member_operation(operation.kind(), "failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::directory::{MockDirectoryClient, RemoteTeam, UserRecord};
    use crate::domain::team::MemberId;
    use crate::infrastructure::directory::InMemoryDirectory;
    use mockall::predicate::eq;

    fn member(id: &str) -> MemberId {
        MemberId::new(id).unwrap()
    }

    fn list(ids: &[&str]) -> MemberList {
        MemberList::parse(ids.iter().copied()).unwrap()
    }

    fn team_id() -> TeamId {
        TeamId::new(1).unwrap()
    }

    fn remote(members: &[&str]) -> RemoteTeam {
        RemoteTeam {
            id: team_id(),
            name: "team".to_string(),
            email: "team@example.com".to_string(),
            members: list(members),
        }
    }

    fn directory_with_users() -> InMemoryDirectory {
        InMemoryDirectory::new()
            .with_user("u1", "u1@example.com")
            .with_user("u2", "u2@example.com")
            .with_user("u3", "u3@example.com")
    }

    #[tokio::test]
    async fn test_reorder_only_issues_no_mutations() {
        let mut directory = MockDirectoryClient::new();
        directory
            .expect_get_team()
            .with(eq(team_id()))
            .times(1)
            .returning(|_| Ok(Some(remote(&["u1@example.com", "u2@example.com"]))));

        let reconciler = MembershipReconciler::new(Arc::new(directory));
        let desired = list(&["u2@example.com", "u1@example.com"]);

        let observed = reconciler
            .reconcile(team_id(), &desired, MembershipPolicy::Reconcile)
            .await
            .unwrap();

        assert_eq!(observed, desired);
    }

    #[tokio::test]
    async fn test_observe_only_returns_actual() {
        let mut directory = MockDirectoryClient::new();
        directory
            .expect_get_team()
            .times(1)
            .returning(|_| Ok(Some(remote(&["external@example.com"]))));

        let reconciler = MembershipReconciler::new(Arc::new(directory));

        let observed = reconciler
            .reconcile(
                team_id(),
                &list(&["u1@example.com"]),
                MembershipPolicy::ObserveOnly,
            )
            .await
            .unwrap();

        assert_eq!(observed, list(&["external@example.com"]));
    }

    #[tokio::test]
    async fn test_removes_before_adds() {
        let mut directory = MockDirectoryClient::new();
        let mut sequence = mockall::Sequence::new();

        directory
            .expect_get_team()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(Some(remote(&["old@example.com"]))));
        directory
            .expect_resolve_user()
            .times(1)
            .returning(|_| Ok(None));
        directory
            .expect_remove_team_member()
            .withf(|_, m| m.as_str() == "old@example.com")
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _| Ok(RemovalOutcome::Removed));
        directory
            .expect_add_team_member()
            .withf(|_, m| m.as_str() == "new@example.com")
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _| Ok(()));
        directory
            .expect_get_team()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(Some(remote(&["new@example.com"]))));

        let reconciler = MembershipReconciler::new(Arc::new(directory));

        let observed = reconciler
            .reconcile(team_id(), &list(&["new@example.com"]), MembershipPolicy::Reconcile)
            .await
            .unwrap();

        assert_eq!(observed, list(&["new@example.com"]));
    }

    #[tokio::test]
    async fn test_member_not_found_on_remove_is_success() {
        let mut directory = MockDirectoryClient::new();
        let mut reads = 0;
        directory.expect_get_team().times(2).returning(move |_| {
            reads += 1;
            if reads == 1 {
                Ok(Some(remote(&["ghost@example.com"])))
            } else {
                Ok(Some(remote(&[])))
            }
        });
        directory
            .expect_remove_team_member()
            .times(1)
            .returning(|_, _| Ok(RemovalOutcome::AlreadyAbsent));

        let reconciler = MembershipReconciler::new(Arc::new(directory));

        let observed = reconciler
            .reconcile(team_id(), &MemberList::new(), MembershipPolicy::Reconcile)
            .await
            .unwrap();

        assert!(observed.is_empty());
    }

    #[tokio::test]
    async fn test_remove_failure_reports_pending() {
        let mut directory = MockDirectoryClient::new();
        directory
            .expect_get_team()
            .returning(|_| Ok(Some(remote(&["a@example.com", "b@example.com"]))));
        directory.expect_resolve_user().returning(|_| Ok(None));
        directory
            .expect_remove_team_member()
            .times(1)
            .returning(|_, _| Err(DomainError::remote_unavailable("timeout")));

        let reconciler = MembershipReconciler::new(Arc::new(directory));

        let error = reconciler
            .reconcile(team_id(), &list(&["c@example.com"]), MembershipPolicy::Reconcile)
            .await
            .unwrap_err();

        let partial = error.as_partial().unwrap();
        assert!(partial.applied.is_empty());
        assert_eq!(
            partial.pending,
            vec![
                MemberOperation::Remove(member("a@example.com")),
                MemberOperation::Remove(member("b@example.com")),
                MemberOperation::Add(member("c@example.com")),
            ]
        );
        assert!(matches!(partial.source, DomainError::RemoteUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_member_declared_by_login_is_not_churned() {
        let mut directory = MockDirectoryClient::new();
        directory
            .expect_get_team()
            .times(2)
            .returning(|_| Ok(Some(remote(&["alice@example.com", "b@example.com"]))));
        directory
            .expect_resolve_user()
            .withf(|m| m.as_str() == "alice")
            .times(2)
            .returning(|_| {
                Ok(Some(UserRecord {
                    id: 3,
                    login: "alice".to_string(),
                    email: "alice@example.com".to_string(),
                    name: "Alice".to_string(),
                }))
            });
        directory.expect_remove_team_member().never();
        directory.expect_add_team_member().never();

        let reconciler = MembershipReconciler::new(Arc::new(directory));
        let desired = list(&["b@example.com", "alice"]);

        for _ in 0..2 {
            let observed = reconciler
                .reconcile(team_id(), &desired, MembershipPolicy::Reconcile)
                .await
                .unwrap();
            assert_eq!(observed, desired);
        }
    }

    #[tokio::test]
    async fn test_missing_team_is_not_found() {
        let mut directory = MockDirectoryClient::new();
        directory.expect_get_team().times(1).returning(|_| Ok(None));

        let reconciler = MembershipReconciler::new(Arc::new(directory));

        let error = reconciler
            .reconcile(team_id(), &list(&["a@example.com"]), MembershipPolicy::Reconcile)
            .await
            .unwrap_err();

        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn test_add_failure_carries_committed_additions() {
        let directory = Arc::new(directory_with_users());
        let id = directory.create_team("team", "").await.unwrap();
        directory.fail_add_for(&member("u2@example.com")).unwrap();

        let reconciler = MembershipReconciler::new(Arc::clone(&directory));
        let desired = list(&["u1@example.com", "u2@example.com", "u3@example.com"]);

        let error = reconciler
            .reconcile(id, &desired, MembershipPolicy::Reconcile)
            .await
            .unwrap_err();

        let partial = error.as_partial().unwrap();
        assert_eq!(partial.added().collect::<Vec<_>>(), vec![&member("u1@example.com")]);
        assert_eq!(
            partial.pending,
            vec![
                MemberOperation::Add(member("u2@example.com")),
                MemberOperation::Add(member("u3@example.com")),
            ]
        );
        assert_eq!(partial.observed, Some(list(&["u1@example.com"])));

        // A retry re-diffs against live state and finishes the job
        directory.clear_failures().unwrap();
        directory.clear_journal().unwrap();

        let observed = reconciler
            .reconcile(id, &desired, MembershipPolicy::Reconcile)
            .await
            .unwrap();

        assert_eq!(observed, desired);
        assert_eq!(
            directory.member_mutations().unwrap(),
            vec![
                (id, MemberOperation::Add(member("u2@example.com"))),
                (id, MemberOperation::Add(member("u3@example.com"))),
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_user_aborts_additions() {
        let directory = Arc::new(directory_with_users());
        let id = directory.create_team("team", "").await.unwrap();

        let reconciler = MembershipReconciler::new(Arc::clone(&directory));

        let error = reconciler
            .reconcile(
                id,
                &list(&["nobody@example.com", "u1@example.com"]),
                MembershipPolicy::Reconcile,
            )
            .await
            .unwrap_err();

        let partial = error.as_partial().unwrap();
        assert!(partial.applied.is_empty());
        assert!(partial.source.is_not_found());
        assert_eq!(partial.observed, Some(MemberList::new()));
    }

    #[tokio::test]
    async fn test_external_additions_are_removed() {
        let directory = Arc::new(directory_with_users());
        let id = directory.create_team("team", "").await.unwrap();
        let reconciler = MembershipReconciler::new(Arc::clone(&directory));
        let desired = list(&["u1@example.com"]);

        reconciler
            .reconcile(id, &desired, MembershipPolicy::Reconcile)
            .await
            .unwrap();
        directory.add_external_member(id, &member("u3@example.com")).unwrap();

        let observed = reconciler
            .reconcile(id, &desired, MembershipPolicy::Reconcile)
            .await
            .unwrap();

        assert_eq!(observed, desired);
    }
}
