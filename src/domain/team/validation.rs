//! Team validation

use thiserror::Error;

/// Errors that can occur during team validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TeamValidationError {
    #[error("resource id is malformed: '{0}'")]
    MalformedId(String),

    #[error("Team ID must be a positive integer, got {0}")]
    NonPositiveId(i64),

    #[error("Team name cannot be empty")]
    EmptyName,

    #[error("Team name cannot exceed {0} characters")]
    NameTooLong(usize),

    #[error("Team email cannot exceed {0} characters")]
    EmailTooLong(usize),

    #[error("Member identifier cannot be empty")]
    EmptyMember,

    #[error("Member identifier cannot exceed {0} characters")]
    MemberTooLong(usize),

    #[error("Member identifier cannot contain whitespace: '{0}'")]
    MemberWhitespace(String),
}

const MAX_TEAM_NAME_LENGTH: usize = 190;
const MAX_TEAM_EMAIL_LENGTH: usize = 190;
const MAX_MEMBER_LENGTH: usize = 320;

/// Validate a remote-assigned team ID
pub fn validate_team_id(id: i64) -> Result<(), TeamValidationError> {
    if id <= 0 {
        return Err(TeamValidationError::NonPositiveId(id));
    }

    Ok(())
}

/// Validate a team name
pub fn validate_team_name(name: &str) -> Result<(), TeamValidationError> {
    if name.trim().is_empty() {
        return Err(TeamValidationError::EmptyName);
    }

    if name.chars().count() > MAX_TEAM_NAME_LENGTH {
        return Err(TeamValidationError::NameTooLong(MAX_TEAM_NAME_LENGTH));
    }

    Ok(())
}

/// Validate a team contact email. An empty email is allowed.
pub fn validate_team_email(email: &str) -> Result<(), TeamValidationError> {
    if email.chars().count() > MAX_TEAM_EMAIL_LENGTH {
        return Err(TeamValidationError::EmailTooLong(MAX_TEAM_EMAIL_LENGTH));
    }

    Ok(())
}

/// Validate a member identifier (email or login)
pub fn validate_member_id(member: &str) -> Result<(), TeamValidationError> {
    if member.is_empty() {
        return Err(TeamValidationError::EmptyMember);
    }

    if member.chars().count() > MAX_MEMBER_LENGTH {
        return Err(TeamValidationError::MemberTooLong(MAX_MEMBER_LENGTH));
    }

    if member.chars().any(char::is_whitespace) {
        return Err(TeamValidationError::MemberWhitespace(member.to_string()));
    }

    Ok(())
}
