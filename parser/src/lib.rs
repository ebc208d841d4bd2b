//! Parser for IEC 61131-3 Instruction List (IL).
//!
//! The parser turns IL source text into a [`Program`]: a sequence of typed
//! instructions terminated by `END`. Parsing proceeds in stages:
//! * load the source into logical lines (joining multi-line calls and
//!   declaration blocks)
//! * collect and remove labels
//! * for each line, remove comments, split the opcode from the operand,
//!   look up the opcode and then classify and parse the operand
//!
//! The first problem stops the parse and is returned as the error.

// Allow large errors because this is a compiler - we expect large errors.
#![allow(clippy::result_large_err)]

extern crate ironil_dsl as dsl;

mod call;
mod classify;
mod commands;
mod labels;
mod lexer;
mod literals;
pub mod loader;
pub mod options;
mod preprocessor;
mod token;
mod vars;


use std::path::Path;

use dsl::{
    common::{Instruction, Opcode, Operand, Program, TypedOperand},
    core::FileId,
    diagnostic::{Diagnostic, Label},
};
use ironil_problems::Problem;
use log::{debug, trace};

use crate::call::parse_call;
use crate::classify::classify_and_parse;
use crate::labels::LabelTable;
use crate::literals::LiteralError;
use crate::loader::SourceLine;
use crate::options::{LabelSubstitution, ParseOptions};
use crate::preprocessor::strip_comments;
use crate::vars::parse_var_block;

pub use crate::loader::read_source;

/// Parse a full IL program.
pub fn parse_program(
    source: &str,
    file_id: &FileId,
    options: &ParseOptions,
) -> Result<Program, Diagnostic> {
    let lines = loader::load(source, file_id)?;
    assemble(lines, options)
}

/// Read and parse the IL program in the file.
pub fn parse_file(path: &Path, options: &ParseOptions) -> Result<Program, Diagnostic> {
    let lines = loader::read_lines(path)?;
    assemble(lines, options)
}

/// Classify and parse a single operand, for example `16#FF` or `T#1H30M`.
pub fn classify_literal(text: &str) -> Result<TypedOperand, Diagnostic> {
    classify_and_parse(text).map_err(|err| {
        err.into_diagnostic(|message| Label::offset(FileId::default(), 0..text.len(), message))
            .with_context("literal", text)
    })
}

fn assemble(lines: Vec<SourceLine>, options: &ParseOptions) -> Result<Program, Diagnostic> {
    let (labels, lines) = labels::resolve(lines)?;

    let mut instructions = Vec::with_capacity(lines.len() + 1);
    for line in &lines {
        let instruction = parse_instruction(line, &labels, options)?;
        trace!("[{:04}] {}", instructions.len() + 1, instruction);
        instructions.push(instruction);
    }
    instructions.push(Instruction::end());

    debug!(
        "Parsed {} instructions with {} labels",
        instructions.len(),
        labels.len()
    );

    Ok(Program::new(instructions))
}

fn parse_instruction(
    line: &SourceLine,
    labels: &LabelTable,
    options: &ParseOptions,
) -> Result<Instruction, Diagnostic> {
    let text = strip_comments(line)?;
    let token = token::normalize(&text);
    let (command, operand) = commands::dispatch(&token, line, &text)?;

    let literal_error = |err: LiteralError| {
        err.into_diagnostic(|message| line.label(message))
            .with_context("operand", &operand)
    };

    let typed = match command.code {
        Opcode::Pop | Opcode::Ret => TypedOperand::untyped(Operand::None),
        Opcode::Var => {
            let output = token.opcode == "VAR_OUTPUT";
            TypedOperand::untyped(Operand::VarDeclaration(parse_var_block(&operand, output)))
        }
        Opcode::Jmp => match labels.get(&operand) {
            Some(target) => TypedOperand::untyped(Operand::JumpTarget(target)),
            None => {
                return Err(Diagnostic::problem(
                    Problem::UndefinedLabel,
                    line.label(format!("Label '{}' is not defined", operand)),
                )
                .with_context("label", &operand))
            }
        },
        Opcode::Cal => match labels.get(&operand) {
            Some(target) => TypedOperand::untyped(Operand::JumpTarget(target)),
            None => TypedOperand::untyped(Operand::Call(
                parse_call(&operand).map_err(literal_error)?,
            )),
        },
        _ => {
            let substituted = match labels.get(&operand) {
                Some(target) if options.label_substitution == LabelSubstitution::Everywhere => {
                    target.to_string()
                }
                _ => operand.clone(),
            };
            classify_and_parse(&substituted).map_err(literal_error)?
        }
    };

    Ok(Instruction {
        code: command.code,
        conditional: command.conditional,
        negate: command.negate,
        push: command.push,
        iec_type: typed.iec_type,
        operand: typed.operand,
    })
}
