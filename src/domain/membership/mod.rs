//! Membership domain - diffing declared rosters against remote membership

mod diff;
mod operation;

pub use diff::MembershipDiff;
pub use operation::{MemberOperation, PartialReconciliation};
