//! Recoverable problems found while discovering specialisations.
//!
//! Nothing in here aborts a scan. The orchestrator and the registries push
//! diagnostics as they go; callers drain them and decide how to present them
//! (the binary renders them with [`crate::formatting`]).

use crate::location::SourceLocation;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A labelled source position attached to a diagnostic.
///
/// `location` is `None` when the location resolver could not place the item;
/// the label is still shown so the reader knows which class was meant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub label: String,
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub references: Vec<Reference>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            references: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_reference(
        mut self,
        label: impl Into<String>,
        location: Option<SourceLocation>,
    ) -> Self {
        self.references.push(Reference {
            label: label.into(),
            location,
        });
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Whether any reference resolved to a file whose path ends with `suffix`.
    pub fn mentions_file(&self, suffix: &str) -> bool {
        self.references.iter().any(|r| {
            r.location
                .as_ref()
                .is_some_and(|loc| loc.file.to_string_lossy().ends_with(suffix))
                || r.label.contains(suffix)
        })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.severity, self.message)?;
        for reference in &self.references {
            match &reference.location {
                Some(location) => write!(f, "\n    {} ({})", reference.label, location)?,
                None => write!(f, "\n    {} (location unknown)", reference.label)?,
            }
        }
        for note in &self.notes {
            write!(f, "\n  {}", note)?;
        }
        Ok(())
    }
}

/// Ordered collection of diagnostics awaiting presentation.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::debug!("diagnostic recorded: {}", diagnostic.message);
        self.items.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.items.iter().filter(|d| d.severity == severity).count()
    }

    /// Drain everything recorded so far.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.items)
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        for diagnostic in iter {
            self.push(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_display_lists_references() {
        let diagnostic = Diagnostic::warning("Multiple classes use the same value")
            .with_reference(
                "Circle",
                Some(SourceLocation::new(PathBuf::from("src/a.ts"), 3, 14)),
            )
            .with_reference("Disc", None);

        let text = diagnostic.to_string();
        assert!(text.starts_with("WARNING - Multiple classes"));
        assert!(text.contains("Circle (src/a.ts:3:14)"));
        assert!(text.contains("Disc (location unknown)"));
    }

    #[test]
    fn test_take_drains() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::error("boom"));
        diagnostics.push(Diagnostic::warning("hmm"));
        assert_eq!(diagnostics.count(Severity::Error), 1);

        let drained = diagnostics.take();
        assert_eq!(drained.len(), 2);
        assert!(diagnostics.is_empty());
    }
}
