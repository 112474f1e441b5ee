//! Validation driver: one fragment in, one verdict out.
//!
//! Each call builds its own parser and returns its outcome by value, so
//! independent fragments can be validated from any number of threads.

use crate::error::Diagnostic;
use crate::grammar::{Parser, StatementKind};
use serde::Serialize;
use tracing::debug;

pub const VALID: &str = "Valid construct";
pub const INVALID: &str = "Invalid construct";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub valid: bool,
    /// Category of the accepted statement; `None` when rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement: Option<StatementKind>,
    /// Lexical and syntax diagnostics, in detection order.
    pub diagnostics: Vec<Diagnostic>,
}

impl Verdict {
    pub fn summary(&self) -> &'static str {
        if self.valid {
            VALID
        } else {
            INVALID
        }
    }

    /// Text channel lines: every diagnostic, then the verdict.
    pub fn report(&self) -> Vec<String> {
        self.diagnostics
            .iter()
            .map(ToString::to_string)
            .chain(std::iter::once(self.summary().to_owned()))
            .collect()
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "valid": self.valid,
            "statement": self.statement,
            "diagnostics": self
                .diagnostics
                .iter()
                .map(Diagnostic::to_json_value)
                .collect::<Vec<_>>(),
        })
    }
}

/// Validate one fragment of source text.
///
/// Lexical defects are reported but do not by themselves reject the
/// fragment; only the grammar's error production does.
pub fn validate(text: &str) -> Verdict {
    let mut parser = Parser::new(text);
    let statement = parser.parse_fragment();
    let diagnostics = parser.finish();
    let verdict = Verdict {
        valid: statement.is_some(),
        statement,
        diagnostics,
    };
    debug!(
        valid = verdict.valid,
        diagnostics = verdict.diagnostics.len(),
        "validated fragment"
    );
    verdict
}

/// Outcome of grouping a lone expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupReport {
    /// Parenthesized grouping; `None` when the input is not one expression.
    pub grouping: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Show how the precedence table nests an operator chain.
pub fn group(text: &str) -> GroupReport {
    let mut parser = Parser::new(text);
    let grouping = parser.parse_lone_expression().map(|g| g.to_string());
    GroupReport {
        grouping,
        diagnostics: parser.finish(),
    }
}
