//! Observability infrastructure - Metrics

mod metrics;

pub use self::metrics::{record_member_operation, record_reconciliation};
