//! Jump labels.
//!
//! A label is a name followed by `:` at the start of a line (`LOOP: LD X`).
//! Labels are collected in one pass over the logical lines so that jumps
//! may refer to labels that are defined later.
use std::collections::HashMap;

use dsl::diagnostic::Diagnostic;
use ironil_problems::Problem;
use log::debug;

use crate::loader::SourceLine;
use crate::preprocessor::remove_comments;

/// Map from label name to the line (1-indexed logical line, the same as the
/// position of the instruction) where the label is defined.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LabelTable {
    labels: HashMap<String, u32>,
}

impl LabelTable {
    /// Returns the line of the label. Label names are case sensitive.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.labels.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Splits a label from the start of the text. Returns the label and the
/// remaining trimmed text.
///
/// The label separator is the first `:` that is followed by whitespace or
/// by the end of the text. The text before the separator is only a label if
/// it is a single word.
pub fn split_label(text: &str) -> Option<(&str, &str)> {
    let (index, _) = text.char_indices().find(|(index, c)| {
        *c == ':'
            && text[index + 1..]
                .chars()
                .next()
                .map_or(true, char::is_whitespace)
    })?;

    let label = text[..index].trim();
    if label.is_empty() || label.contains(char::is_whitespace) {
        return None;
    }

    Some((label, text[index + 1..].trim()))
}

/// Collects the labels and returns the lines with the labels removed.
pub fn resolve(lines: Vec<SourceLine>) -> Result<(LabelTable, Vec<SourceLine>), Diagnostic> {
    let mut table = LabelTable::default();
    let mut output: Vec<SourceLine> = Vec::with_capacity(lines.len());

    for line in lines {
        let position = output.len() as u32 + 1;

        let Some((label, rest)) = split_label(&line.text) else {
            output.push(line);
            continue;
        };

        let has_instruction = remove_comments(rest, true).map_or(true, |text| !text.is_empty());
        if !has_instruction {
            return Err(Diagnostic::problem(
                Problem::LabelWithoutInstruction,
                line.label(format!("Label '{}' must be followed by an instruction", label)),
            )
            .with_context("label", label));
        }

        if let Some(existing) = table.get(label) {
            let first = &output[existing as usize - 1];
            return Err(Diagnostic::problem(
                Problem::DuplicateLabel,
                line.label(format!("Label '{}' is already defined", label)),
            )
            .with_context("label", label)
            .with_secondary(first.label("First definition of the label")));
        }

        table.labels.insert(label.to_string(), position);
        let stripped = line.with_text(rest);
        output.push(stripped);
    }

    debug!("Found {} labels", table.len());

    Ok((table, output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsl::core::FileId;

    use crate::loader::load;

    fn lines(source: &str) -> Vec<SourceLine> {
        load(source, &FileId::default()).unwrap()
    }

    #[test]
    fn split_label_when_label_then_label_and_rest() {
        assert_eq!(Some(("LOOP", "LD X")), split_label("LOOP: LD X"));
        assert_eq!(Some(("DONE", "")), split_label("DONE:"));
    }

    #[test]
    fn split_label_when_no_space_after_colon_then_none() {
        assert_eq!(None, split_label("LOOP:LD X"));
        assert_eq!(None, split_label("LD TOD#12:30:00"));
    }

    #[test]
    fn split_label_when_text_before_has_space_then_none() {
        assert_eq!(None, split_label("LD X (* note: this *)"));
    }

    #[test]
    fn split_label_when_assignment_then_none() {
        assert_eq!(None, split_label("CAL F(A := 1)"));
    }

    #[test]
    fn resolve_when_labels_then_table_has_logical_line() {
        let (table, output) = resolve(lines("LD 1\n\nLOOP: ADD 1\nJMP LOOP\nEND: RET")).unwrap();

        assert_eq!(2, table.len());
        assert_eq!(Some(2), table.get("LOOP"));
        assert_eq!(Some(4), table.get("END"));
        assert_eq!(None, table.get("loop"));
        assert_eq!("ADD 1", output[1].text);
        assert_eq!(3, output[1].line);
    }

    #[test]
    fn resolve_when_label_only_then_error() {
        let err = resolve(lines("LD 1\nDONE:\nRET")).unwrap_err();
        assert_eq!(Problem::LabelWithoutInstruction.code(), err.code);
        assert_eq!(Some(2), err.line());
    }

    #[test]
    fn resolve_when_label_and_comment_only_then_error() {
        let err = resolve(lines("DONE: (* nothing *)")).unwrap_err();
        assert_eq!(Problem::LabelWithoutInstruction.code(), err.code);
    }

    #[test]
    fn resolve_when_label_twice_then_error() {
        let err = resolve(lines("A: LD 1\nA: LD 2")).unwrap_err();
        assert_eq!(Problem::DuplicateLabel.code(), err.code);
        assert_eq!(Some(2), err.line());
        assert_eq!(Some(1), err.secondary[0].line_number());
    }
}
