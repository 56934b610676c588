use crate::level::LintLevel;
use crate::lint::LintDescriptor;
use serde::Serialize;
use serde_json::json;

/// A single finding produced by an actor-clippy rule.
///
/// Findings are plain values: a rule creates them, the engine merges them,
/// and the reporting boundary renders them. `args` holds the rule-specific
/// formatted arguments substituted into the descriptor's message template.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Diagnostic {
    pub lint: &'static LintDescriptor,
    pub level: LintLevel,
    pub span: Span,
    pub args: Vec<String>,
}

impl Diagnostic {
    /// Render the descriptor's message template with this finding's arguments.
    ///
    /// Templates use `{0}`, `{1}`, ... placeholders.
    pub fn message(&self) -> String {
        let mut msg = self.lint.message.to_string();
        for (i, arg) in self.args.iter().enumerate() {
            msg = msg.replace(&format!("{{{i}}}"), arg);
        }
        msg
    }

    /// Machine-readable projection for the reporting boundary.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "id": self.lint.id,
            "name": self.lint.name,
            "level": self.level.as_str(),
            "span": self.span,
            "message": self.message(),
            "args": self.args,
        })
    }
}

/// Span in an analyzed source file (1-based row/column positions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Single position in an analyzed source file (1-based row/column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Span {
    #[must_use]
    pub fn new(start_row: usize, start_column: usize, end_row: usize, end_column: usize) -> Self {
        Self {
            start: Position {
                row: start_row,
                column: start_column,
            },
            end: Position {
                row: end_row,
                column: end_column,
            },
        }
    }

    /// Span covering a single-line range.
    #[must_use]
    pub fn line(row: usize, start_column: usize, end_column: usize) -> Self {
        Self::new(row, start_column, row, end_column)
    }
}
