//! Non-fatal findings collected over a run.
//!
//! Each pushed diagnostic is also emitted through `tracing` at the level
//! matching its kind, so a caller that only wants logs can ignore the list.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A file could not be turned into metadata and was skipped.
    ParseFailure,
    /// Two declarations share a qualified identity; the later one is kept.
    DuplicateClassName,
    /// Two declarations share a simple name across packages or files.
    DuplicateSimpleName,
    /// A call token matched more than one class project-wide.
    AmbiguousReference,
    /// The closure has a cycle and was ordered by DFS fallback.
    CycleFallback,
}

impl DiagnosticKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::ParseFailure => "parse failure",
            Self::DuplicateClassName => "duplicate class",
            Self::DuplicateSimpleName => "duplicate simple name",
            Self::AmbiguousReference => "ambiguous reference",
            Self::CycleFallback => "cycle fallback",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.label(), self.message)
    }
}

/// Cumulative diagnostic list for one run.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            DiagnosticKind::AmbiguousReference => tracing::debug!("{}", message),
            _ => tracing::warn!("{}", message),
        }
        self.items.push(Diagnostic { kind, message });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_accumulate() {
        let mut diags = Diagnostics::new();
        diags.push(DiagnosticKind::ParseFailure, "a.java");
        let mut more = Diagnostics::new();
        more.push(DiagnosticKind::CycleFallback, "A <-> B");
        more.push(DiagnosticKind::ParseFailure, "b.java");
        diags.extend(more);
        assert_eq!(diags.len(), 3);
        assert_eq!(diags.count(DiagnosticKind::ParseFailure), 2);
        assert_eq!(
            diags.iter().nth(1).unwrap().to_string(),
            "[cycle fallback] A <-> B"
        );
    }
}
