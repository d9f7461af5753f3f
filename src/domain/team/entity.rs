//! Team entity and related types

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::member::MemberList;
use super::validation::{
    validate_team_email, validate_team_id, validate_team_name, TeamValidationError,
};

/// Team identifier - numeric, assigned by the remote directory at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct TeamId(i64);

impl TeamId {
    /// Create a new TeamId after validation
    pub fn new(id: i64) -> Result<Self, TeamValidationError> {
        validate_team_id(id)?;
        Ok(Self(id))
    }

    /// Get the inner numeric value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl FromStr for TeamId {
    type Err = TeamValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<i64>()
            .map_err(|_| TeamValidationError::MalformedId(s.to_string()))?;
        Self::new(id)
    }
}

impl TryFrom<i64> for TeamId {
    type Error = TeamValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TeamId> for i64 {
    fn from(id: TeamId) -> Self {
        id.0
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a team's remote membership is managed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MembershipPolicy {
    /// Converge remote membership to the declared roster
    #[default]
    Reconcile,
    /// Membership is synced by an external process; only observe it
    ObserveOnly,
}

impl MembershipPolicy {
    /// Map the `ignore_externally_synced_members` flag onto a policy
    pub fn from_ignore_flag(ignore_externally_synced_members: bool) -> Self {
        if ignore_externally_synced_members {
            Self::ObserveOnly
        } else {
            Self::Reconcile
        }
    }

    pub fn is_observe_only(&self) -> bool {
        matches!(self, Self::ObserveOnly)
    }
}

impl std::fmt::Display for MembershipPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reconcile => write!(f, "reconcile"),
            Self::ObserveOnly => write!(f, "observe_only"),
        }
    }
}

/// Where the team sits in its membership lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Present remotely, membership not yet reconciled
    #[default]
    Unsynced,
    /// Last reconciliation converged
    Synced,
    /// Last reconciliation applied only part of its operations
    Partial,
}

/// Provenance of the order of an observed member list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemberOrder {
    /// Order follows the declared roster
    #[default]
    Declared,
    /// Order is whatever the remote directory returned. A reorder-only
    /// diff may follow on the next pass against a declared roster.
    Remote,
}

/// Declared configuration for a team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSpec {
    name: String,
    email: String,
    /// `None` when the configuration does not declare members at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    members: Option<MemberList>,
    #[serde(default)]
    policy: MembershipPolicy,
}

impl TeamSpec {
    /// Create a new spec with validated trivial fields
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, TeamValidationError> {
        let name = name.into();
        let email = email.into();
        validate_team_name(&name)?;
        validate_team_email(&email)?;

        Ok(Self {
            name,
            email,
            members: None,
            policy: MembershipPolicy::default(),
        })
    }

    /// Declare the member roster (builder pattern)
    pub fn with_members(mut self, members: MemberList) -> Self {
        self.members = Some(members);
        self
    }

    /// Set the membership policy (builder pattern)
    pub fn with_policy(mut self, policy: MembershipPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn members(&self) -> Option<&MemberList> {
        self.members.as_ref()
    }

    pub fn policy(&self) -> MembershipPolicy {
        self.policy
    }
}

/// Observed state of a team, as handed back to the configuration layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamState {
    id: TeamId,
    name: String,
    email: String,
    members: MemberList,
    policy: MembershipPolicy,
    sync_status: SyncStatus,
    member_order: MemberOrder,
    observed_at: DateTime<Utc>,
}

impl TeamState {
    pub fn new(
        id: TeamId,
        name: impl Into<String>,
        email: impl Into<String>,
        members: MemberList,
        policy: MembershipPolicy,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            members,
            policy,
            sync_status: SyncStatus::Unsynced,
            member_order: MemberOrder::Declared,
            observed_at: Utc::now(),
        }
    }

    /// Set the sync status (builder pattern)
    pub fn with_sync_status(mut self, status: SyncStatus) -> Self {
        self.sync_status = status;
        self
    }

    /// Set the member order provenance (builder pattern)
    pub fn with_member_order(mut self, order: MemberOrder) -> Self {
        self.member_order = order;
        self
    }

    // Getters

    pub fn id(&self) -> TeamId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn members(&self) -> &MemberList {
        &self.members
    }

    pub fn policy(&self) -> MembershipPolicy {
        self.policy
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.sync_status
    }

    pub fn member_order(&self) -> MemberOrder {
        self.member_order
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// Whether applying `spec` needs a membership reconciliation.
    ///
    /// True when the policy changed, or, for reconciled teams, when the
    /// declared roster differs from the observed one (order included, so a
    /// reorder refreshes the reported order) or the last pass did not converge.
    /// An undeclared roster counts as an empty one.
    pub fn membership_changed(&self, spec: &TeamSpec) -> bool {
        if spec.policy() != self.policy {
            return true;
        }

        if spec.policy().is_observe_only() {
            return false;
        }

        let declared = spec.members().cloned().unwrap_or_default();
        declared != self.members || self.sync_status != SyncStatus::Synced
    }
}
