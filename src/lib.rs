//! Team Roster Sync
//!
//! Keeps the membership of a remote directory team in line with a declared
//! roster. The remote team is created, read, updated, deleted and imported
//! through a [`domain::directory::DirectoryClient`], and membership changes
//! go through [`infrastructure::team::MembershipReconciler`].

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
