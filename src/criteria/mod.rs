//! Failure criteria: threshold expression parsing and evaluation.
//!
//! A failure-criteria expression is a comma-separated list of
//! `SEVERITY:COUNT` pairs plus exactly one `Operator:AND|OR` pair, e.g.
//! `Critical:1, High:2, Operator:OR`. The gate fails the build when the
//! aggregated violation counts satisfy the expression.

pub mod evaluator;
pub mod parser;

pub use evaluator::{count_by_severity, is_satisfied};

use crate::error::CriteriaError;
use crate::scan::types::Severity;
use std::collections::BTreeMap;

/// How per-severity threshold checks are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationOperator {
    And,
    Or,
}

impl AggregationOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationOperator::And => "AND",
            AggregationOperator::Or => "OR",
        }
    }
}

impl std::fmt::Display for AggregationOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parsed, validated representation of the user's threshold expression.
///
/// Constructed once from configuration input; read-only afterward.
/// Invariants (enforced by the parser): at least one severity entry,
/// exactly one operator, no UNSPECIFIED key.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureCriteria {
    /// Minimum trigger count per severity. Keys present only for
    /// severities the user specified. Values are kept as raw numbers:
    /// the parser deliberately performs no range validation.
    pub thresholds: BTreeMap<Severity, f64>,
    pub operator: AggregationOperator,
}

impl FailureCriteria {
    /// Expression used when the user supplies none.
    pub const DEFAULT_EXPRESSION: &'static str = "Critical:1,High:1,Medium:1,Low:1,Operator:OR";

    /// Parse an expression, substituting the default for empty/absent input.
    pub fn parse_or_default(expression: Option<&str>) -> Result<Self, CriteriaError> {
        match expression.map(str::trim) {
            None | Some("") => parser::parse(Self::DEFAULT_EXPRESSION),
            Some(expr) => parser::parse(expr),
        }
    }

    /// Canonical `KEY:VALUE` form. Re-parsing the result yields an equal
    /// structure.
    pub fn to_expression(&self) -> String {
        let mut parts: Vec<String> = self
            .thresholds
            .iter()
            .map(|(severity, count)| format!("{}:{}", severity.as_str(), count))
            .collect();
        parts.push(format!("Operator:{}", self.operator));
        parts.join(",")
    }
}
