//! Reconciliation metrics

use metrics::counter;

/// Record a member mutation sent to the directory
pub fn record_member_operation(operation: &'static str, outcome: &'static str) {
    counter!(
        "team_member_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record the end of a reconciliation pass
pub fn record_reconciliation(outcome: &'static str) {
    counter!("team_reconciliations_total", "outcome" => outcome).increment(1);
}
