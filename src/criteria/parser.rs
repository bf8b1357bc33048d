//! Threshold expression parser.

use super::{AggregationOperator, FailureCriteria};
use crate::error::CriteriaError;
use crate::scan::types::Severity;
use std::collections::BTreeMap;

/// Parse a failure-criteria expression into a validated [`FailureCriteria`].
///
/// Matching is case-insensitive: keys and values are normalized to
/// uppercase before interpretation. Surrounding whitespace is tolerated.
pub fn parse(expression: &str) -> Result<FailureCriteria, CriteriaError> {
    let mut thresholds: BTreeMap<Severity, f64> = BTreeMap::new();
    let mut operator: Option<AggregationOperator> = None;

    for pair in expression.split(',') {
        let mut tokens = pair.split(':');
        let (key, value) = match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(key), Some(value), None) => {
                (key.trim().to_uppercase(), value.trim().to_uppercase())
            }
            _ => return Err(CriteriaError::InvalidFormat),
        };

        if key == "OPERATOR" {
            let parsed = match value.as_str() {
                "AND" => AggregationOperator::And,
                "OR" => AggregationOperator::Or,
                _ => return Err(CriteriaError::InvalidOperator(value)),
            };
            if operator.replace(parsed).is_some() {
                return Err(CriteriaError::MultipleOperators);
            }
        } else if let Some(severity) = Severity::threshold_key(&key) {
            let count: f64 = value
                .parse()
                .map_err(|_| CriteriaError::InvalidSeverityCount)?;
            if thresholds.insert(severity, count).is_some() {
                return Err(CriteriaError::DuplicateSeverity(key));
            }
        } else {
            return Err(CriteriaError::UnknownKey { key, value });
        }
    }

    let operator = operator.ok_or(CriteriaError::NoOperator)?;
    if thresholds.is_empty() {
        return Err(CriteriaError::NoSeverity);
    }

    Ok(FailureCriteria {
        thresholds,
        operator,
    })
}
