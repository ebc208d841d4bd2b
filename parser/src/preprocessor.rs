//! Comment removal for Instruction List lines.
//!
//! IL has two forms of comment:
//! * `;` to the end of the line
//! * `(* ... *)` ranged comments
//!
//! Comment markers within quoted strings are not comments. Ranged comments
//! are replaced by a single space so that the text on either side does not
//! join into one token.

use dsl::diagnostic::Diagnostic;
use ironil_problems::Problem;

use crate::loader::SourceLine;

/// A `(*` that does not have a matching `*)` on the same text.
#[derive(Debug, PartialEq, Eq)]
pub struct OpenComment {
    /// Byte offset of the `(*` in the text.
    pub offset: usize,
}

/// Removes both forms of comment from the line and trims the result.
pub fn strip_comments(line: &SourceLine) -> Result<String, Diagnostic> {
    remove_comments(&line.text, true).map_err(|err| open_comment(line, err))
}

/// Removes only ranged comments from the line. Used in variable declaration
/// blocks where `;` terminates a declaration.
pub fn strip_ranged_comments(line: &SourceLine) -> Result<String, Diagnostic> {
    remove_comments(&line.text, false).map_err(|err| open_comment(line, err))
}

fn open_comment(line: &SourceLine, err: OpenComment) -> Diagnostic {
    Diagnostic::problem(
        Problem::OpenComment,
        line.label("Expected '*)' - end of comment"),
    )
    .with_context("column", &(err.offset + 1).to_string())
}

/// Removes comments from the text. When `line_comments` is true, `;`
/// starts a comment that runs to the end of the text.
pub fn remove_comments(text: &str, line_comments: bool) -> Result<String, OpenComment> {
    // The start of the ranged comment we are currently in (if any).
    let mut comment_start: Option<usize> = None;
    // True when the prior character is a candidate for ending a comment block
    let mut last_is_star = false;
    // The quote character when in a quoted string.
    let mut quote: Option<char> = None;

    let mut output = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();

    while let Some((index, char)) = chars.next() {
        if comment_start.is_some() {
            if last_is_star && char == ')' {
                comment_start = None;
                last_is_star = false;
                output.push(' ');
            } else {
                last_is_star = char == '*';
            }
            continue;
        }

        if let Some(q) = quote {
            if char == q {
                quote = None;
            }
            output.push(char);
            continue;
        }

        match char {
            '\'' | '"' => {
                quote = Some(char);
                output.push(char);
            }
            ';' if line_comments => break,
            '(' if matches!(chars.peek(), Some((_, '*'))) => {
                // Consume the '*' so that "(*)" does not also end the comment
                chars.next();
                comment_start = Some(index);
                last_is_star = false;
            }
            _ => output.push(char),
        }
    }

    if let Some(offset) = comment_start {
        return Err(OpenComment { offset });
    }

    Ok(output.trim().to_string())
}
