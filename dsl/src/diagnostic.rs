//! Provides definition for diagnostics, which are the errors associated
//! with parsing an IL program.
//!
//! There exist crates that make this easy, but we need a representation
//! that is independent of how the diagnostic is rendered (terminal, JSON,
//! or asserted on in a test).

use std::ops::Range;

use ironil_problems::Problem;

use crate::core::{FileId, SourceSpan};

/// A position marker that has both line and offset information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedPosition {
    /// Line (1-indexed)
    pub line: usize,

    /// Column (1-indexed)
    pub column: usize,

    /// Byte offset from start of string (0-indexed)
    pub offset: usize,
}

/// A position marker that only has an offset in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetRange {
    /// Byte offset from start of string (0-indexed)
    pub start: usize,
    /// Byte offset from end of string (0-indexed)
    pub end: usize,
}

/// A source line: the 1-indexed line number together with the byte range
/// of the text on that line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRange {
    /// Line (1-indexed)
    pub line: usize,
    /// Byte offset of the start of the line (0-indexed)
    pub start: usize,
    /// Byte offset of the end of the line (0-indexed)
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    QualifiedPosition(QualifiedPosition),
    OffsetRange(OffsetRange),
    LineRange(LineRange),
}

/// A label that refers to some range in a file and possibly associated
/// with a message related to that range.
///
/// Normally this indicates the location of an error along with a
/// text message describing that position.
#[derive(Debug, Clone)]
pub struct Label {
    /// The position of label.
    pub location: Location,

    /// Identifier for the file.
    pub file_id: FileId,

    /// A message describing this label.
    pub message: String,
}

impl Label {
    pub fn offset(
        file_id: impl Into<FileId>,
        offset: impl Into<Range<usize>>,
        message: impl Into<String>,
    ) -> Self {
        let range = offset.into();
        Self {
            location: Location::OffsetRange(OffsetRange {
                start: range.start,
                end: range.end,
            }),
            file_id: file_id.into(),
            message: message.into(),
        }
    }

    /// A label for a whole source line. The span gives the file and the
    /// byte range covered by the line.
    pub fn line(span: &SourceSpan, line: usize, message: impl Into<String>) -> Self {
        Self {
            location: Location::LineRange(LineRange {
                line,
                start: span.start,
                end: span.end,
            }),
            file_id: span.file_id.clone(),
            message: message.into(),
        }
    }

    /// A "position" that a file in it's entirety rather that a particular
    /// line number.
    pub fn file(file_id: impl Into<FileId>, message: impl Into<String>) -> Self {
        Self {
            location: Location::QualifiedPosition(QualifiedPosition {
                column: 0,
                line: 0,
                offset: 0,
            }),
            file_id: file_id.into(),
            message: message.into(),
        }
    }

    /// Returns the 1-indexed line number for the label if the label refers
    /// to a line.
    pub fn line_number(&self) -> Option<usize> {
        match &self.location {
            Location::QualifiedPosition(pos) if pos.line > 0 => Some(pos.line),
            Location::LineRange(range) => Some(range.line),
            _ => None,
        }
    }

    /// Returns the byte range in the file for the label.
    pub fn range(&self) -> Range<usize> {
        match &self.location {
            Location::QualifiedPosition(pos) => pos.offset..pos.offset,
            Location::OffsetRange(offset) => offset.start..offset.end,
            Location::LineRange(range) => range.start..range.end,
        }
    }
}

/// A diagnostic. Diagnostic have a code that is indicative of the category,
/// a primary location and possibly non-zero set of secondary location.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// A normally unique value describing the type of diagnostic.
    pub code: String,

    /// The class of the diagnostic (structural, label, literal format...).
    pub category: String,

    description: String,

    /// The primary or first diagnostic.
    pub primary: Label,

    /// Additional descriptions to the constant description.
    pub described: Vec<String>,

    /// Additional information about the diagnostic.
    pub secondary: Vec<Label>,
}

impl Diagnostic {
    /// Creates a diagnostic from the problem code and with the specified label.
    ///
    /// The label associates the problem to a particular instance in the IL
    /// source file.
    pub fn problem(problem: Problem, primary: Label) -> Self {
        Self {
            code: problem.code().to_string(),
            category: problem.category().to_string(),
            description: problem.message().to_string(),
            primary,
            described: vec![],
            secondary: vec![],
        }
    }

    /// Adds to the problem description (primary text) additional context
    /// about the problem.
    ///
    /// This is similar to adding primary and second items except that this
    /// forms part of the main description and does not need to be related to
    /// a position in a source file.
    pub fn with_context(mut self, description: &str, item: &str) -> Self {
        self.described.push(format!("{}={}", description, item));
        self
    }

    pub fn with_secondary(mut self, label: Label) -> Self {
        self.secondary.push(label);
        self
    }

    /// Returns the description for the diagnostic. This may add in other
    /// data in addition that is part of the diagnostic.
    pub fn description(&self) -> String {
        if self.described.is_empty() {
            self.description.clone()
        } else {
            format!("{} ({})", self.description, self.described.join(", "))
        }
    }

    /// Returns the 1-indexed source line of the primary label, if known.
    pub fn line(&self) -> Option<usize> {
        self.primary.line_number()
    }

    /// Returns the file identifiers referenced by this diagnostic.
    pub fn file_ids(&self) -> Vec<&FileId> {
        let mut ids = vec![&self.primary.file_id];
        for label in &self.secondary {
            if !ids.contains(&&label.file_id) {
                ids.push(&label.file_id);
            }
        }
        ids
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line() {
            Some(line) => write!(
                f,
                "{}: {}:{}: {}: {}",
                self.code,
                self.primary.file_id,
                line,
                self.description(),
                self.primary.message
            ),
            None => write!(
                f,
                "{}: {}: {}: {}",
                self.code,
                self.primary.file_id,
                self.description(),
                self.primary.message
            ),
        }
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_when_line_label_then_has_line() {
        let span = SourceSpan::range(10, 20);
        let diagnostic = Diagnostic::problem(
            Problem::UndefinedLabel,
            Label::line(&span, 3, "Label 'LOOP' is not defined"),
        );

        assert_eq!(Problem::UndefinedLabel.code(), diagnostic.code);
        assert_eq!("Label", diagnostic.category);
        assert_eq!(Some(3), diagnostic.line());
        assert_eq!(10..20, diagnostic.primary.range());
    }

    #[test]
    fn description_when_context_then_includes_context() {
        let diagnostic = Diagnostic::problem(
            Problem::UnrecognizedLiteral,
            Label::file(FileId::default(), "bad"),
        )
        .with_context("operand", "@@");

        assert!(diagnostic.description().ends_with("(operand=@@)"));
        assert_eq!(None, diagnostic.line());
    }

    #[test]
    fn file_when_created_then_whole_file_position() {
        let label = Label::file(FileId::from_string("main.il"), "unreadable");

        assert_eq!(
            Location::QualifiedPosition(QualifiedPosition {
                line: 0,
                column: 0,
                offset: 0,
            }),
            label.location
        );
        assert_eq!(None, label.line_number());
        assert_eq!(0..0, label.range());
    }

    #[test]
    fn display_when_line_then_includes_code_and_line() {
        let span = SourceSpan::range(0, 4).with_file_id(&FileId::from_string("main.il"));
        let diagnostic = Diagnostic::problem(Problem::OpenComment, Label::line(&span, 7, "here"));

        let text = diagnostic.to_string();
        assert!(text.starts_with("P0001: main.il:7:"));
    }
}
