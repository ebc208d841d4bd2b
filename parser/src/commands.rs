//! The table of IL opcodes.
//!
//! Each spelling of an opcode (with its modifiers) maps to the opcode and
//! the values of the modifiers. See section 3.2.2 (table 52).
use dsl::{common::Opcode, diagnostic::Diagnostic};
use ironil_problems::Problem;
use phf::phf_map;

use crate::call::function_name;
use crate::lexer::is_identifier;
use crate::loader::SourceLine;
use crate::token::Token;

/// An opcode and its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub code: Opcode,
    pub conditional: bool,
    pub negate: bool,
    pub push: bool,
}

impl Command {
    pub const fn new(code: Opcode, conditional: bool, negate: bool, push: bool) -> Self {
        Self {
            code,
            conditional,
            negate,
            push,
        }
    }

    const fn plain(code: Opcode) -> Self {
        Self::new(code, false, false, false)
    }

    const fn negated(code: Opcode) -> Self {
        Self::new(code, false, true, false)
    }

    const fn pushed(code: Opcode) -> Self {
        Self::new(code, false, false, true)
    }

    const fn pushed_negated(code: Opcode) -> Self {
        Self::new(code, false, true, true)
    }

    const fn conditional(code: Opcode) -> Self {
        Self::new(code, true, false, false)
    }

    const fn conditional_negated(code: Opcode) -> Self {
        Self::new(code, true, true, false)
    }

    /// True for the opcodes that require an operand naming a target.
    pub fn requires_operand(&self) -> bool {
        matches!(self.code, Opcode::Jmp | Opcode::Cal)
    }
}

static COMMANDS: phf::Map<&'static str, Command> = phf_map! {
    "LD" => Command::plain(Opcode::Ld),
    "LDN" => Command::negated(Opcode::Ld),
    "ST" => Command::plain(Opcode::St),
    "STN" => Command::negated(Opcode::St),
    "S" => Command::plain(Opcode::S),
    "R" => Command::plain(Opcode::R),
    "AND" => Command::plain(Opcode::And),
    "&" => Command::plain(Opcode::And),
    "ANDN" => Command::negated(Opcode::And),
    "&N" => Command::negated(Opcode::And),
    "OR" => Command::plain(Opcode::Or),
    "ORN" => Command::negated(Opcode::Or),
    "XOR" => Command::plain(Opcode::Xor),
    "XORN" => Command::negated(Opcode::Xor),
    "AND(" => Command::pushed(Opcode::And),
    "&(" => Command::pushed(Opcode::And),
    "ANDN(" => Command::pushed_negated(Opcode::And),
    "&N(" => Command::pushed_negated(Opcode::And),
    "OR(" => Command::pushed(Opcode::Or),
    "ORN(" => Command::pushed_negated(Opcode::Or),
    "XOR(" => Command::pushed(Opcode::Xor),
    "XORN(" => Command::pushed_negated(Opcode::Xor),
    "NOT" => Command::plain(Opcode::Not),
    "ADD" => Command::plain(Opcode::Add),
    "SUB" => Command::plain(Opcode::Sub),
    "MUL" => Command::plain(Opcode::Mul),
    "DIV" => Command::plain(Opcode::Div),
    "GT" => Command::plain(Opcode::Gt),
    "GE" => Command::plain(Opcode::Ge),
    "EQ" => Command::plain(Opcode::Eq),
    "NE" => Command::plain(Opcode::Ne),
    "LE" => Command::plain(Opcode::Le),
    "LT" => Command::plain(Opcode::Lt),
    "ADD(" => Command::pushed(Opcode::Add),
    "SUB(" => Command::pushed(Opcode::Sub),
    "MUL(" => Command::pushed(Opcode::Mul),
    "DIV(" => Command::pushed(Opcode::Div),
    "GT(" => Command::pushed(Opcode::Gt),
    "GE(" => Command::pushed(Opcode::Ge),
    "EQ(" => Command::pushed(Opcode::Eq),
    "NE(" => Command::pushed(Opcode::Ne),
    "LE(" => Command::pushed(Opcode::Le),
    "LT(" => Command::pushed(Opcode::Lt),
    "JMP" => Command::plain(Opcode::Jmp),
    "JMPC" => Command::conditional(Opcode::Jmp),
    "JMPCN" => Command::conditional_negated(Opcode::Jmp),
    "JMPNC" => Command::conditional_negated(Opcode::Jmp),
    "CAL" => Command::plain(Opcode::Cal),
    "CALC" => Command::conditional(Opcode::Cal),
    "CALCN" => Command::conditional_negated(Opcode::Cal),
    "CALNC" => Command::conditional_negated(Opcode::Cal),
    "RET" => Command::plain(Opcode::Ret),
    "RETC" => Command::conditional(Opcode::Ret),
    "RETCN" => Command::conditional_negated(Opcode::Ret),
    "RETNC" => Command::conditional_negated(Opcode::Ret),
    ")" => Command::plain(Opcode::Pop),
    "VAR" => Command::plain(Opcode::Var),
    "VAR_OUTPUT" => Command::plain(Opcode::Var),
};

/// Returns the command for the upper case opcode text.
pub fn lookup(opcode: &str) -> Option<Command> {
    COMMANDS.get(opcode).copied()
}

/// Determines the command of the line and the operand text for that
/// command.
///
/// A line that does not start with a known opcode is an informal call of a
/// function block (`TON1(IN := X)`) and the whole line is the operand.
pub fn dispatch(
    token: &Token,
    line: &SourceLine,
    text: &str,
) -> Result<(Command, String), Diagnostic> {
    match lookup(&token.opcode) {
        Some(command) => {
            if command.requires_operand() && token.operand.is_empty() {
                return Err(Diagnostic::problem(
                    Problem::MissingOperand,
                    line.label(format!("Opcode '{}' requires an operand", token.opcode)),
                )
                .with_context("opcode", &token.opcode));
            }
            Ok((command, token.operand.clone()))
        }
        None => {
            if is_identifier(function_name(text)) {
                Ok((Command::plain(Opcode::Cal), text.to_string()))
            } else {
                Err(Diagnostic::problem(
                    Problem::UnknownOpcode,
                    line.label(format!("'{}' is not an opcode", token.opcode)),
                )
                .with_context("opcode", &token.opcode))
            }
        }
    }
}
