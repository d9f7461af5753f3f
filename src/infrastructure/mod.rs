//! Infrastructure layer - Directory adapters, reconciliation and logging

pub mod directory;
pub mod logging;
pub mod observability;
pub mod team;
