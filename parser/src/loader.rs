//! Reads IL source into logical lines.
//!
//! IL is line oriented: each logical line is one instruction. A logical
//! line is normally one physical line, except that
//! * a call whose argument list is not closed continues on the following
//!   lines until the closing `)`
//! * a `VAR` or `VAR_OUTPUT` block continues until `END_VAR`
use std::{fs, path::Path};

use dsl::{
    core::{FileId, SourceSpan},
    diagnostic::{Diagnostic, Label},
};
use ironil_problems::Problem;
use log::debug;

use crate::commands;
use crate::labels::split_label;
use crate::lexer::is_identifier;
use crate::preprocessor::{strip_comments, strip_ranged_comments};

/// A logical line of source and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLine {
    /// The trimmed text of the line with the comments removed.
    pub text: String,
    /// The physical line (1-indexed) where the logical line starts.
    pub line: usize,
    /// The bytes of the source covered by the logical line.
    pub span: SourceSpan,
}

impl SourceLine {
    pub fn new(text: impl Into<String>, line: usize, span: SourceSpan) -> Self {
        Self {
            text: text.into(),
            line,
            span,
        }
    }

    /// Returns a copy of this line with different text.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            line: self.line,
            span: self.span.clone(),
        }
    }

    /// Creates a diagnostic label that refers to this line.
    pub fn label(&self, message: impl Into<String>) -> Label {
        Label::line(&self.span, self.line, message)
    }
}

/// Reads the file into a string.
pub fn read_source(path: &Path) -> Result<String, Diagnostic> {
    fs::read_to_string(path).map_err(|err| {
        Diagnostic::problem(
            Problem::ReadFile,
            Label::file(FileId::from_path(path), err.to_string()),
        )
        .with_context("path", &path.display().to_string())
    })
}

/// Reads the file and returns the logical lines of the file.
pub fn read_lines(path: &Path) -> Result<Vec<SourceLine>, Diagnostic> {
    let source = read_source(path)?;
    load(&source, &FileId::from_path(path))
}

/// Splits the source into logical lines.
///
/// Blank lines and lines that only contain a comment are not returned.
pub fn load(source: &str, file_id: &FileId) -> Result<Vec<SourceLine>, Diagnostic> {
    let physical = physical_lines(source, file_id);
    let physical_count = physical.len();

    let mut lines = Vec::with_capacity(physical_count);
    let mut physical = physical.into_iter();

    while let Some(first) = physical.next() {
        let stripped = strip_comments(&first)?;
        if stripped.is_empty() {
            continue;
        }

        let instruction = split_label(&stripped)
            .map(|(_, rest)| rest)
            .unwrap_or(&stripped);

        if is_var_block_start(instruction) {
            let uncommented = strip_ranged_comments(&first)?;
            let (label, block) = match split_label(&uncommented) {
                Some((label, rest)) => (Some(label), rest),
                None => (None, uncommented.as_str()),
            };
            let mut text = block.to_string();
            let mut span = first.span.clone();
            while !has_end_var(&text) {
                let next = physical.next().ok_or_else(|| {
                    Diagnostic::problem(
                        Problem::UnclosedVarBlock,
                        first.label("Expected END_VAR before the end of the file"),
                    )
                })?;
                text.push(' ');
                text.push_str(&strip_ranged_comments(&next)?);
                span = SourceSpan::join(&span, &next.span);
            }
            let text = match label {
                Some(label) => format!("{}: {}", label, normalize_var_block(&text)),
                None => normalize_var_block(&text),
            };
            lines.push(SourceLine::new(text, first.line, span));
            continue;
        }

        if is_call_start(instruction) && paren_depth(&stripped) > 0 {
            let mut text = stripped.clone();
            let mut span = first.span.clone();
            while paren_depth(&text) > 0 {
                let next = physical.next().ok_or_else(|| {
                    Diagnostic::problem(
                        Problem::UnclosedCall,
                        first.label("Expected ')' before the end of the file"),
                    )
                })?;
                let continuation = strip_comments(&next)?;
                if !continuation.is_empty() {
                    text.push(' ');
                    text.push_str(&continuation);
                }
                span = SourceSpan::join(&span, &next.span);
            }
            lines.push(SourceLine::new(text, first.line, span));
            continue;
        }

        lines.push(first.with_text(stripped));
    }

    debug!(
        "Loaded {} logical lines from {} non-blank physical lines",
        lines.len(),
        physical_count
    );

    Ok(lines)
}

/// Returns the non-blank physical lines with the text trimmed.
fn physical_lines(source: &str, file_id: &FileId) -> Vec<SourceLine> {
    let mut lines = vec![];
    let mut offset = 0;

    for (index, raw) in source.split_inclusive('\n').enumerate() {
        let content = raw.trim_end_matches(['\n', '\r']);
        let text = content.trim();
        if !text.is_empty() {
            let start = offset + (content.len() - content.trim_start().len());
            lines.push(SourceLine::new(
                text,
                index + 1,
                SourceSpan::range(start, start + text.len()).with_file_id(file_id),
            ));
        }
        offset += raw.len();
    }

    lines
}

fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or("")
}

fn is_var_block_start(text: &str) -> bool {
    let word = first_word(text);
    word.eq_ignore_ascii_case("VAR") || word.eq_ignore_ascii_case("VAR_OUTPUT")
}

fn has_end_var(text: &str) -> bool {
    text.to_ascii_uppercase().contains("END_VAR")
}

/// Returns true if the text starts a call, either with one of the `CAL`
/// opcodes or as an informal call `NAME(...)`.
fn is_call_start(text: &str) -> bool {
    let end = text
        .find(|c: char| c.is_whitespace() || c == '(')
        .unwrap_or(text.len());
    let word = text[..end].to_ascii_uppercase();

    if matches!(word.as_str(), "CAL" | "CALC" | "CALCN" | "CALNC") {
        return true;
    }

    commands::lookup(&word).is_none()
        && commands::lookup(&format!("{}(", word)).is_none()
        && is_identifier(&word)
        && text[end..].trim_start().starts_with('(')
}

/// Returns the number of `(` that are not closed by a `)`. Parenthesis in
/// quoted strings are not counted.
fn paren_depth(text: &str) -> i32 {
    let mut depth = 0;
    let mut quote = None;
    for c in text.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            },
        }
    }
    depth
}

/// Rewrites a variable declaration block into a canonical form where
/// each group of declarations is one whitespace separated word:
/// `VAR A, B : INT; C : BOOL := TRUE; END_VAR` becomes
/// `VAR A,B=INT C=BOOL:=TRUE END_VAR`.
pub fn normalize_var_block(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    // The type separator ':' is replaced once per declaration so that
    // colons in initial values (TOD#12:00:00) remain.
    let mut in_declaration_type = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ';' => {
                output.push(' ');
                in_declaration_type = false;
            }
            ':' if !in_declaration_type && chars.peek() != Some(&'=') => {
                output.push_str(" =");
                in_declaration_type = true;
            }
            _ => output.push(c),
        }
    }

    let mut output = output.split_whitespace().collect::<Vec<_>>().join(" ");
    for separator in [" = ", " := ", ", "] {
        output = output.replace(separator, separator.trim());
    }
    for separator in ["=", ":=", ","] {
        output = output
            .replace(&format!(" {}", separator), separator)
            .replace(&format!("{} ", separator), separator);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn texts(lines: &[SourceLine]) -> Vec<&str> {
        lines.iter().map(|line| line.text.as_str()).collect()
    }

    #[test]
    fn load_when_blank_lines_then_dropped_and_numbers_kept() {
        let lines = load("\n  LD X\n\n\tST Y  \n", &FileId::default()).unwrap();

        assert_eq!(vec!["LD X", "ST Y"], texts(&lines));
        assert_eq!(2, lines[0].line);
        assert_eq!(4, lines[1].line);
    }

    #[test]
    fn load_when_crlf_then_span_covers_text() {
        let source = "LD X\r\n  ST Y\r\n";
        let lines = load(source, &FileId::default()).unwrap();

        assert_eq!("ST Y", &source[lines[1].span.start..lines[1].span.end]);
    }

    #[test]
    fn load_when_comment_only_line_then_dropped() {
        let lines = load("(* header *)\nLD X ; load\n; trailer", &FileId::default()).unwrap();
        assert_eq!(vec!["LD X"], texts(&lines));
    }

    #[test]
    fn load_when_comment_before_label_then_comment_removed() {
        let lines = load("(* note *) L1: LD X", &FileId::default()).unwrap();
        assert_eq!(vec!["L1: LD X"], texts(&lines));
    }

    #[test]
    fn load_when_labeled_var_block_then_label_kept_and_block_normalized() {
        let lines = load("START: VAR A : INT;
B : BOOL; END_VAR", &FileId::default()).unwrap();
        assert_eq!(vec!["START: VAR A=INT B=BOOL END_VAR"], texts(&lines));
        assert_eq!(1, lines[0].line);
    }

    #[test]
    fn load_when_multi_line_call_then_merged() {
        let source = "CAL TON1(\n  IN := X, (* start *)\n  PT := T#5S\n)\nLD TON1.Q";
        let lines = load(source, &FileId::default()).unwrap();

        assert_eq!(
            vec!["CAL TON1( IN := X, PT := T#5S )", "LD TON1.Q"],
            texts(&lines)
        );
        assert_eq!(1, lines[0].line);
        assert_eq!(5, lines[1].line);
    }

    #[test]
    fn load_when_informal_call_then_merged() {
        let lines = load("MYFB(A := 1,\nB := 2)", &FileId::default()).unwrap();
        assert_eq!(vec!["MYFB(A := 1, B := 2)"], texts(&lines));
    }

    #[test]
    fn load_when_labeled_call_then_merged() {
        let lines = load("START: CAL F(\nA := 1)", &FileId::default()).unwrap();
        assert_eq!(vec!["START: CAL F( A := 1)"], texts(&lines));
    }

    #[test]
    fn load_when_push_opcode_then_not_merged() {
        let lines = load("AND( X\nOR Y\n)", &FileId::default()).unwrap();
        assert_eq!(vec!["AND( X", "OR Y", ")"], texts(&lines));
    }

    #[test]
    fn load_when_call_not_closed_then_error() {
        let err = load("LD X\nCAL F(A := 1,\nB := 2", &FileId::default()).unwrap_err();
        assert_eq!(Problem::UnclosedCall.code(), err.code);
        assert_eq!(Some(2), err.line());
    }

    #[test]
    fn load_when_var_block_then_merged_and_normalized() {
        let source = "VAR\n  A, B : INT;\n  C : BOOL := TRUE; (* flag *)\nEND_VAR\nLD A";
        let lines = load(source, &FileId::default()).unwrap();

        assert_eq!(
            vec!["VAR A,B=INT C=BOOL:=TRUE END_VAR", "LD A"],
            texts(&lines)
        );
    }

    #[test]
    fn load_when_single_line_var_block_then_normalized() {
        let lines = load("var_output Q : BOOL; END_VAR", &FileId::default()).unwrap();
        assert_eq!(vec!["var_output Q=BOOL END_VAR"], texts(&lines));
    }

    #[test]
    fn load_when_var_block_not_closed_then_error() {
        let err = load("VAR\nA : INT;\n", &FileId::default()).unwrap_err();
        assert_eq!(Problem::UnclosedVarBlock.code(), err.code);
    }

    #[test]
    fn load_when_open_comment_then_error() {
        let err = load("LD X (* oops", &FileId::default()).unwrap_err();
        assert_eq!(Problem::OpenComment.code(), err.code);
    }

    #[test]
    fn normalize_var_block_when_time_initializer_then_colons_kept() {
        assert_eq!(
            "VAR T=TOD:=TOD#12:30:00 END_VAR",
            normalize_var_block("VAR T : TOD := TOD#12:30:00; END_VAR")
        );
    }

    #[test]
    fn normalize_var_block_when_no_space_then_same_form() {
        assert_eq!(
            "VAR A,B=INT END_VAR",
            normalize_var_block("VAR A,B:INT;END_VAR")
        );
    }

    #[test]
    fn read_lines_when_file_then_file_id_is_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "LD 1").unwrap();
        writeln!(file, "ST X").unwrap();

        let lines = read_lines(file.path()).unwrap();

        assert_eq!(2, lines.len());
        assert_eq!(FileId::from_path(file.path()), lines[0].span.file_id);
    }

    #[test]
    fn read_lines_when_no_file_then_read_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_lines(&dir.path().join("missing.il")).unwrap_err();
        assert_eq!(Problem::ReadFile.code(), err.code);
    }
}
