//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use team_roster_sync::domain::{MemberId, MemberList, MemberOperation, TeamId};
use team_roster_sync::infrastructure::directory::InMemoryDirectory;

pub const USERS: [(&str, &str); 3] = [
    ("u1", "u1@example.com"),
    ("u2", "u2@example.com"),
    ("u3", "u3@example.com"),
];

/// A directory that knows `u1`..`u3`
pub fn directory() -> Arc<InMemoryDirectory> {
    let directory = USERS
        .iter()
        .fold(InMemoryDirectory::new(), |directory, (login, email)| {
            directory.with_user(login, email)
        });
    Arc::new(directory)
}

pub fn member(id: &str) -> MemberId {
    MemberId::new(id).expect("valid member id")
}

pub fn members(ids: &[&str]) -> MemberList {
    MemberList::parse(ids.iter().copied()).expect("valid member list")
}

pub fn adds(team: TeamId, ids: &[&str]) -> Vec<(TeamId, MemberOperation)> {
    ids.iter()
        .map(|id| (team, MemberOperation::Add(member(id))))
        .collect()
}

pub fn removes(team: TeamId, ids: &[&str]) -> Vec<(TeamId, MemberOperation)> {
    ids.iter()
        .map(|id| (team, MemberOperation::Remove(member(id))))
        .collect()
}
