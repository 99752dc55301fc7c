//! Aggregated validation reporting for typed model parsing.

use serde_json::Value;
use std::fmt;

/// One field that failed validation: where, what was expected, what was found.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// Full diagnostic path of the field, e.g. `/benchtop/storage/type`.
    pub path: String,
    /// Human-readable description of the expected type.
    pub expected: String,
    /// The offending raw value (`Null` when the field was missing).
    pub actual: Value,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Path: {}. Expected: {}. Value: {}",
            self.path, self.expected, self.actual
        )
    }
}

/// Collection of per-field validation errors.
///
/// Parsing collects every offending field rather than stopping at the first;
/// the report renders one line per error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.errors.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}
