//! Member operations and partial-progress reporting

use serde::Serialize;
use thiserror::Error;

use crate::domain::team::{MemberId, MemberList, TeamId};
use crate::domain::DomainError;

/// A single membership mutation against the remote directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "operation", content = "member", rename_all = "snake_case")]
pub enum MemberOperation {
    Add(MemberId),
    Remove(MemberId),
}

impl MemberOperation {
    pub fn member(&self) -> &MemberId {
        match self {
            Self::Add(member) | Self::Remove(member) => member,
        }
    }

    /// Metric label for the operation kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Remove(_) => "remove",
        }
    }
}

impl std::fmt::Display for MemberOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add(member) => write!(f, "add {}", member),
            Self::Remove(member) => write!(f, "remove {}", member),
        }
    }
}

/// A reconciliation that stopped part way through.
///
/// `applied` lists the operations the directory accepted, `pending` the ones
/// never attempted (the failing operation first). `observed` is the roster
/// read back after the failure, when that read succeeded.
#[derive(Debug, Error)]
#[error(
    "Partial reconciliation of team {team_id}: {} applied, {} pending: {source}",
    .applied.len(),
    .pending.len()
)]
pub struct PartialReconciliation {
    pub team_id: TeamId,
    pub applied: Vec<MemberOperation>,
    pub pending: Vec<MemberOperation>,
    pub observed: Option<MemberList>,
    #[source]
    pub source: DomainError,
}

impl PartialReconciliation {
    /// Members whose addition was committed before the failure
    pub fn added(&self) -> impl Iterator<Item = &MemberId> {
        self.applied.iter().filter_map(|op| match op {
            MemberOperation::Add(member) => Some(member),
            MemberOperation::Remove(_) => None,
        })
    }

    /// Members whose removal was committed before the failure
    pub fn removed(&self) -> impl Iterator<Item = &MemberId> {
        self.applied.iter().filter_map(|op| match op {
            MemberOperation::Remove(member) => Some(member),
            MemberOperation::Add(_) => None,
        })
    }
}
