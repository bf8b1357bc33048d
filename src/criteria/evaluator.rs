//! Violation aggregation and failure-criteria evaluation.

use super::{AggregationOperator, FailureCriteria};
use crate::scan::types::{Severity, Violation};
use std::collections::HashMap;

/// Count violations by severity.
///
/// Only severities that actually occur get an entry; absent severities
/// are implicitly zero on lookup.
pub fn count_by_severity(violations: &[Violation]) -> HashMap<Severity, usize> {
    violations.iter().fold(HashMap::new(), |mut counts, v| {
        *counts.entry(v.severity).or_insert(0) += 1;
        counts
    })
}

/// Decide whether the violations satisfy the failure criteria.
///
/// Each severity mentioned in the criteria contributes one check,
/// `actual >= threshold` (the threshold is a minimum trigger count), and
/// the checks combine under the criteria's operator. Severities not
/// mentioned by the user are never evaluated.
pub fn is_satisfied(criteria: &FailureCriteria, violations: &[Violation]) -> bool {
    let counts = count_by_severity(violations);
    let mut checks = criteria.thresholds.iter().map(|(severity, threshold)| {
        let actual = counts.get(severity).copied().unwrap_or(0);
        actual as f64 >= *threshold
    });
    match criteria.operator {
        AggregationOperator::And => checks.all(|met| met),
        AggregationOperator::Or => checks.any(|met| met),
    }
}
