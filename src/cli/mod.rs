//! CLI module for Team Roster Sync
//!
//! One subcommand per team lifecycle operation. Every command talks to the
//! configured remote directory and prints the observed result as JSON.

pub mod team;

use clap::{Parser, Subcommand};

/// Team Roster Sync - keep a remote team's members in line with a declared roster
#[derive(Parser)]
#[command(name = "team-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a team and reconcile its declared members
    Create(team::CreateArgs),

    /// Read a team's observed state
    Read(team::ReadArgs),

    /// Update a team's name, email and members
    Update(team::UpdateArgs),

    /// Delete a team
    Delete(team::IdArgs),

    /// Import an existing team by id
    Import(team::IdArgs),
}
