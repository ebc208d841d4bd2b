//! Data model of a parsed IEC 61131-3 Instruction List program.
//!
//! The model is the output of the parser: a flat, typed sequence of
//! instructions. Diagnostics describe why a source could not be parsed.
extern crate serde;

pub mod common;
pub mod core;
pub mod diagnostic;
pub mod json_export;
pub mod textual;
pub mod time;
