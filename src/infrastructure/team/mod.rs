//! Team membership reconciliation and lifecycle

mod reconciler;
mod service;

pub use reconciler::MembershipReconciler;
pub use service::{CreateOutcome, TeamService};
