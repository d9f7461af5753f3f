//! Team lifecycle service: create, read, update, delete and import

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::directory::{DeleteOutcome, DirectoryClient};
use crate::domain::team::{
    MemberList, MemberOrder, MembershipPolicy, SyncStatus, TeamId, TeamSpec, TeamState,
};
use crate::domain::DomainError;

use super::reconciler::MembershipReconciler;

/// Result of creating a team
#[derive(Debug)]
pub struct CreateOutcome {
    /// Observed state after creation
    pub state: TeamState,
    /// Set when the team was created but its membership did not converge.
    /// The team exists remotely with its name and email set.
    pub warning: Option<DomainError>,
}

/// Team service for managing the lifecycle of remote teams
#[derive(Debug)]
pub struct TeamService<D: DirectoryClient> {
    directory: Arc<D>,
    reconciler: MembershipReconciler<D>,
}

impl<D: DirectoryClient> TeamService<D> {
    /// Create a new team service
    pub fn new(directory: Arc<D>) -> Self {
        let reconciler = MembershipReconciler::new(Arc::clone(&directory));
        Self {
            directory,
            reconciler,
        }
    }

    /// Create a team and, if members are declared, reconcile them
    pub async fn create(&self, spec: &TeamSpec) -> Result<CreateOutcome, DomainError> {
        info!(name = %spec.name(), policy = %spec.policy(), "Creating team");

        let id = self.directory.create_team(spec.name(), spec.email()).await?;
        info!(team_id = %id, "Team created");

        let Some(declared) = spec.members() else {
            let state = self.read(id, None, spec.policy()).await?;
            return Ok(CreateOutcome {
                state,
                warning: None,
            });
        };

        match self.reconciler.reconcile(id, declared, spec.policy()).await {
            Ok(members) => Ok(CreateOutcome {
                state: reconciled_state(id, spec, members),
                warning: None,
            }),
            Err(e) => {
                warn!(team_id = %id, error = %e, "Team created but membership did not converge");

                let (members, status) = match e.as_partial() {
                    Some(partial) => (
                        partial.observed.clone().unwrap_or_default(),
                        SyncStatus::Partial,
                    ),
                    None => (MemberList::new(), SyncStatus::Unsynced),
                };

                let state = TeamState::new(id, spec.name(), spec.email(), members, spec.policy())
                    .with_sync_status(status);

                Ok(CreateOutcome {
                    state,
                    warning: Some(e),
                })
            }
        }
    }

    /// Read a team's observed state.
    ///
    /// With a declared roster and the reconcile policy, members are ordered
    /// like the declaration. Otherwise they are reported in remote order.
    pub async fn read(
        &self,
        id: TeamId,
        declared: Option<&MemberList>,
        policy: MembershipPolicy,
    ) -> Result<TeamState, DomainError> {
        let remote = self
            .directory
            .get_team(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", id)))?;

        let state = match (policy, declared) {
            (MembershipPolicy::Reconcile, Some(declared)) => {
                let members = self.reconciler.canonicalize(remote.members, declared).await?;
                let status = if members.same_members(declared) {
                    SyncStatus::Synced
                } else {
                    SyncStatus::Unsynced
                };

                TeamState::new(
                    id,
                    remote.name,
                    remote.email,
                    members.aligned_to(declared),
                    policy,
                )
                .with_sync_status(status)
            }
            _ => TeamState::new(id, remote.name, remote.email, remote.members, policy)
                .with_member_order(MemberOrder::Remote),
        };

        Ok(state)
    }

    /// Re-read a previously observed team, keeping its declared order
    pub async fn refresh(&self, prior: &TeamState) -> Result<TeamState, DomainError> {
        let declared = match prior.member_order() {
            MemberOrder::Declared => Some(prior.members()),
            MemberOrder::Remote => None,
        };

        self.read(prior.id(), declared, prior.policy()).await
    }

    /// Apply a changed declaration to an existing team.
    ///
    /// Name and email are always written. Membership is reconciled only when
    /// it changed relative to `prior` or was never synced. Under the reconcile
    /// policy an undeclared roster means no members.
    pub async fn update(&self, prior: &TeamState, spec: &TeamSpec) -> Result<TeamState, DomainError> {
        let id = prior.id();
        info!(team_id = %id, name = %spec.name(), "Updating team");

        self.directory
            .update_team(id, spec.name(), spec.email())
            .await?;

        if !prior.membership_changed(spec) {
            return Ok(TeamState::new(
                id,
                spec.name(),
                spec.email(),
                prior.members().clone(),
                spec.policy(),
            )
            .with_sync_status(prior.sync_status())
            .with_member_order(prior.member_order()));
        }

        let declared = spec.members().cloned().unwrap_or_default();
        let members = self.reconciler.reconcile(id, &declared, spec.policy()).await?;

        Ok(reconciled_state(id, spec, members))
    }

    /// Delete a team. A team that is already gone counts as deleted.
    pub async fn delete(&self, id: TeamId) -> Result<DeleteOutcome, DomainError> {
        info!(team_id = %id, "Deleting team");

        let outcome = match self.directory.delete_team(id).await {
            Ok(outcome) => outcome,
            Err(DomainError::NotFound { .. }) => DeleteOutcome::AlreadyAbsent,
            Err(e) => return Err(e),
        };

        if outcome == DeleteOutcome::AlreadyAbsent {
            info!(team_id = %id, "Team already deleted");
        }

        Ok(outcome)
    }

    /// Import an existing team by id.
    ///
    /// There is no declared roster to align to, so members come back in
    /// remote order and the state is marked [`MemberOrder::Remote`]. The
    /// first update against a declaration may then only reorder.
    pub async fn import(&self, raw_id: &str) -> Result<TeamState, DomainError> {
        let id: TeamId = raw_id.parse()?;
        info!(team_id = %id, "Importing team");

        let state = self.read(id, None, MembershipPolicy::Reconcile).await?;

        if state.members().len() > 1 {
            warn!(
                team_id = %id,
                members = state.members().len(),
                "Imported member order follows the remote directory"
            );
        }

        Ok(state)
    }
}

fn reconciled_state(id: TeamId, spec: &TeamSpec, members: MemberList) -> TeamState {
    let state = TeamState::new(id, spec.name(), spec.email(), members, spec.policy());

    if spec.policy().is_observe_only() {
        state.with_member_order(MemberOrder::Remote)
    } else {
        state.with_sync_status(SyncStatus::Synced)
    }
}
