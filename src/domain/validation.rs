//! Caller-correctable validation failures.
//!
//! Every rejection names the offending field, the value it carried, the
//! constraint it broke, and (where one exists) a remediation hint. Nothing is
//! persisted when validation fails.

use std::fmt;

/// A rejected input. Surfaced before any state is mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The offending field, camelCase as callers see it.
    pub field: String,
    /// The value the field actually carried.
    pub value: String,
    /// The constraint that was violated.
    pub constraint: String,
    /// Suggested fix, when one applies.
    pub remediation: Option<String>,
}

impl ValidationError {
    pub fn new(
        field: impl Into<String>,
        value: impl fmt::Display,
        constraint: impl Into<String>,
    ) -> Self {
        ValidationError {
            field: field.into(),
            value: value.to_string(),
            constraint: constraint.into(),
            remediation: None,
        }
    }

    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = Some(remediation.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (got {})",
            self.field, self.constraint, self.value
        )?;
        if let Some(remediation) = &self.remediation {
            write!(f, "; {}", remediation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
