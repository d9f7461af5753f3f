//! Team commands - lifecycle operations against the configured directory

use std::sync::Arc;

use clap::{ArgAction, Args};
use serde::Serialize;
use tracing::warn;

use crate::config::AppConfig;
use crate::domain::team::{MemberList, MembershipPolicy, TeamId, TeamSpec};
use crate::infrastructure::directory::HttpDirectoryClient;
use crate::infrastructure::logging;
use crate::infrastructure::team::TeamService;

/// Declared roster shared by the mutating commands
#[derive(Args, Clone, Debug)]
pub struct RosterArgs {
    /// Declared member (email or login). Repeat for each member; pass it
    /// once without a value to declare an empty roster.
    #[arg(long = "member", value_name = "MEMBER", num_args = 0..=1, action = ArgAction::Append)]
    pub members: Option<Vec<String>>,

    /// Membership is synced by an external process; never add or remove members
    #[arg(long)]
    pub ignore_externally_synced_members: bool,
}

impl RosterArgs {
    fn declared(&self) -> anyhow::Result<Option<MemberList>> {
        self.members
            .as_ref()
            .map(|members| MemberList::parse(members.iter().map(String::as_str)))
            .transpose()
            .map_err(Into::into)
    }

    fn policy(&self) -> MembershipPolicy {
        MembershipPolicy::from_ignore_flag(self.ignore_externally_synced_members)
    }
}

/// Arguments for the create command
#[derive(Args, Clone, Debug)]
pub struct CreateArgs {
    /// Team name
    #[arg(long)]
    pub name: String,

    /// Team email
    #[arg(long, default_value = "")]
    pub email: String,

    #[command(flatten)]
    pub roster: RosterArgs,
}

/// Arguments for the read command
#[derive(Args, Clone, Debug)]
pub struct ReadArgs {
    /// Team id
    pub id: String,

    #[command(flatten)]
    pub roster: RosterArgs,
}

/// Arguments for the update command.
///
/// Without `--member`, a reconciled team ends up with no members.
#[derive(Args, Clone, Debug)]
pub struct UpdateArgs {
    /// Team id
    pub id: String,

    /// Team name
    #[arg(long)]
    pub name: String,

    /// Team email
    #[arg(long, default_value = "")]
    pub email: String,

    /// Previously declared member, used to order the prior observed roster
    #[arg(long = "prior-member", value_name = "MEMBER")]
    pub prior_members: Vec<String>,

    #[command(flatten)]
    pub roster: RosterArgs,
}

/// Arguments for commands that take only a team id
#[derive(Args, Clone, Debug)]
pub struct IdArgs {
    /// Team id
    pub id: String,
}

/// Create a team
pub async fn create(args: CreateArgs) -> anyhow::Result<()> {
    let service = bootstrap()?;

    let mut spec = TeamSpec::new(args.name, args.email)?.with_policy(args.roster.policy());
    if let Some(members) = args.roster.declared()? {
        spec = spec.with_members(members);
    }

    let outcome = service.create(&spec).await?;
    if let Some(warning) = &outcome.warning {
        warn!(team_id = %outcome.state.id(), "{}", warning);
    }

    print_json(&outcome.state)
}

/// Read a team
pub async fn read(args: ReadArgs) -> anyhow::Result<()> {
    let service = bootstrap()?;
    let id = parse_id(&args.id)?;
    let declared = args.roster.declared()?;

    let state = service
        .read(id, declared.as_ref(), args.roster.policy())
        .await?;

    print_json(&state)
}

/// Update a team
pub async fn update(args: UpdateArgs) -> anyhow::Result<()> {
    let service = bootstrap()?;
    let id = parse_id(&args.id)?;
    let policy = args.roster.policy();

    let prior_declared = if args.prior_members.is_empty() {
        None
    } else {
        Some(MemberList::parse(
            args.prior_members.iter().map(String::as_str),
        )?)
    };
    let prior = service.read(id, prior_declared.as_ref(), policy).await?;

    let mut spec = TeamSpec::new(args.name, args.email)?.with_policy(policy);
    if let Some(members) = args.roster.declared()? {
        spec = spec.with_members(members);
    }

    let state = service.update(&prior, &spec).await?;

    print_json(&state)
}

/// Delete a team
pub async fn delete(args: IdArgs) -> anyhow::Result<()> {
    let service = bootstrap()?;
    let id = parse_id(&args.id)?;

    let outcome = service.delete(id).await?;

    print_json(&serde_json::json!({ "id": id, "outcome": outcome }))
}

/// Import a team
pub async fn import(args: IdArgs) -> anyhow::Result<()> {
    let service = bootstrap()?;

    let state = service.import(&args.id).await?;

    print_json(&state)
}

fn bootstrap() -> anyhow::Result<TeamService<HttpDirectoryClient>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging)?;

    let client = HttpDirectoryClient::new(&config.directory)?;
    Ok(TeamService::new(Arc::new(client)))
}

fn parse_id(raw: &str) -> anyhow::Result<TeamId> {
    Ok(raw.parse::<TeamId>()?)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
