//! Parser for the argument list of a function block call.
//!
//! Arguments are either all formal (`CAL TON1(IN := X, Q => Y)`) or all
//! positional (`CAL F(1, 2)`). See section 3.2.3.
use dsl::common::{Call, CallArgument, NOT_FORMAL};
use ironil_problems::Problem;

use crate::classify::classify_and_parse;
use crate::lexer::is_identifier;
use crate::literals::LiteralError;

/// Returns the function block name of call text: the trimmed text before
/// the argument list.
pub fn function_name(text: &str) -> &str {
    match text.find('(') {
        Some(open) => text[..open].trim(),
        None => text.trim(),
    }
}

/// Parses call text `NAME(args)`, `NAME (args)` or `NAME` into the call.
pub fn parse_call(text: &str) -> Result<Call, LiteralError> {
    let text = text.trim();
    let function = function_name(text);
    if !is_identifier(function) {
        return Err(LiteralError::new(
            Problem::UnknownOpcode,
            format!("'{}' is not a function block name", function),
        ));
    }

    let arguments = match text.find('(') {
        Some(open) => {
            let close = text
                .rfind(')')
                .filter(|close| *close > open)
                .ok_or_else(|| {
                    LiteralError::new(
                        Problem::MalformedLiteral,
                        format!("Call '{}' does not have a closing ')'", text),
                    )
                })?;
            parse_arguments(&text[open + 1..close])?
        }
        None => vec![],
    };

    let named = arguments.iter().filter(|arg| arg.is_formal()).count();
    if named != 0 && named != arguments.len() {
        return Err(LiteralError::new(
            Problem::CallBindingMismatch,
            format!("Call of '{}' mixes formal and positional arguments", function),
        ));
    }

    Ok(Call {
        function: function.to_string(),
        formal: named == arguments.len(),
        arguments,
    })
}

fn parse_arguments(text: &str) -> Result<Vec<CallArgument>, LiteralError> {
    if text.trim().is_empty() {
        return Ok(vec![]);
    }
    split_top_level(text)
        .into_iter()
        .map(parse_argument)
        .collect()
}

fn parse_argument(segment: &str) -> Result<CallArgument, LiteralError> {
    let segment = segment.trim();
    if segment.is_empty() {
        return Err(LiteralError::new(
            Problem::UnrecognizedLiteral,
            "Call argument is empty",
        ));
    }

    let binding = match (segment.find(":="), segment.find("=>")) {
        (Some(input), Some(output)) if output < input => Some((output, true)),
        (Some(input), _) => Some((input, false)),
        (None, Some(output)) => Some((output, true)),
        (None, None) => None,
    };

    let (name, output, value) = match binding {
        Some((index, output)) => {
            let name = segment[..index].trim();
            if !is_identifier(name) {
                return Err(LiteralError::new(
                    Problem::MalformedLiteral,
                    format!("'{}' is not a parameter name", name),
                ));
            }
            (name, output, segment[index + 2..].trim())
        }
        None => (NOT_FORMAL, false, segment),
    };

    if value.is_empty() {
        return Err(LiteralError::new(
            Problem::UnrecognizedLiteral,
            format!("Argument '{}' does not have a value", name),
        ));
    }

    Ok(CallArgument {
        name: name.to_string(),
        output,
        value: classify_and_parse(value)?,
    })
}

/// Splits on commas that are not within quotes or nested parenthesis.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut segments = vec![];
    let mut depth = 0;
    let mut quote = None;
    let mut start = 0;

    for (index, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth -= 1,
                ',' if depth == 0 => {
                    segments.push(&text[start..index]);
                    start = index + 1;
                }
                _ => {}
            },
        }
    }
    segments.push(&text[start..]);
    segments
}
