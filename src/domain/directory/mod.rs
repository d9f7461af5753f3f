//! Directory domain - the remote service that owns teams and users

mod client;

pub use client::{DeleteOutcome, DirectoryClient, RemoteTeam, RemovalOutcome, UserRecord};

#[cfg(test)]
pub use client::MockDirectoryClient;
