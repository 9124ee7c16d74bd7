//! Core error and violation types

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("malformed JSON document: {0}")]
    MalformedDocument(#[source] serde_json::Error),

    #[error("request document must be a JSON object, found {found}")]
    RootNotObject { found: &'static str },

    #[error("document failed validation against schema '{schema}': {report}")]
    Violations {
        schema: &'static str,
        report: ViolationReport,
    },

    #[error("validated document failed typed decode: {0}")]
    Decode(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// A single violation: the field path, a stable machine code, and the
/// human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub code: &'static str,
    pub message: String,
}

/// Every violation found in one validation pass, in schema order.
///
/// A report is only ever produced on failure; it is never merged with a
/// successfully validated value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViolationReport {
    violations: Vec<Violation>,
}

impl ViolationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    /// True if the report holds a violation with this exact path and code.
    pub fn contains(&self, path: &str, code: &str) -> bool {
        self.violations
            .iter()
            .any(|v| v.path == path && v.code == code)
    }

    /// Field-path-keyed map for the error envelope. The first violation per
    /// path wins, matching the one-message-per-field response shape.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for violation in &self.violations {
            map.entry(violation.path.clone())
                .or_insert_with(|| violation.message.clone());
        }
        map
    }
}

impl fmt::Display for ViolationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", violation.path, violation.message)?;
        }
        Ok(())
    }
}
