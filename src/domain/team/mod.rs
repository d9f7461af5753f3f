//! Team domain module
//!
//! A team is a named roster of remote users. The declared roster is ordered;
//! the remote directory only knows set membership.

mod entity;
mod member;
mod validation;

pub use entity::{MemberOrder, MembershipPolicy, SyncStatus, TeamId, TeamSpec, TeamState};
pub use member::{MemberId, MemberList, MemberSet};
pub use validation::{
    validate_member_id, validate_team_email, validate_team_id, validate_team_name,
    TeamValidationError,
};
