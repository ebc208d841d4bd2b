//! JSON export of a parsed IL program.
//!
//! The output is a document with metadata and one entry per instruction so
//! that external tools (simulators, code generators) can consume the parsed
//! program without linking to this crate.

use serde::Serialize;
use std::io::Write;
use thiserror::Error;

use crate::common::{IecType, Instruction, LiteralFormat, Opcode, Operand, Program};

/// Errors that can occur during JSON export operations.
#[derive(Debug, Error)]
pub enum JsonExportError {
    #[error("Serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Configuration options for JSON export.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JsonExportOptions {
    /// Pretty-print the JSON output
    pub pretty_print: bool,
}

/// Exports a [`Program`] as JSON.
#[derive(Debug)]
pub struct JsonExporter {
    options: JsonExportOptions,
    schema_version: String,
}

impl JsonExporter {
    /// Create a new JsonExporter with default options.
    pub fn new() -> Self {
        Self::with_options(JsonExportOptions::default())
    }

    /// Create a JsonExporter with custom options.
    pub fn with_options(options: JsonExportOptions) -> Self {
        Self {
            options,
            schema_version: "1.0.0".to_string(),
        }
    }

    /// Export a program to JSON string.
    pub fn export_program(&self, program: &Program) -> Result<String, JsonExportError> {
        let wrapper = JsonWrapper::new(program, &self.options, &self.schema_version);

        if self.options.pretty_print {
            serde_json::to_string_pretty(&wrapper).map_err(JsonExportError::from)
        } else {
            serde_json::to_string(&wrapper).map_err(JsonExportError::from)
        }
    }

    /// Export a program to a writer.
    pub fn export_to_writer<W: Write>(
        &self,
        program: &Program,
        mut writer: W,
    ) -> Result<(), JsonExportError> {
        let wrapper = JsonWrapper::new(program, &self.options, &self.schema_version);

        if self.options.pretty_print {
            serde_json::to_writer_pretty(&mut writer, &wrapper)?;
        } else {
            serde_json::to_writer(&mut writer, &wrapper)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
struct JsonWrapper<'a> {
    schema_version: &'a str,
    metadata: JsonMetadata<'a>,
    instructions: Vec<JsonInstruction<'a>>,
}

impl<'a> JsonWrapper<'a> {
    fn new(program: &'a Program, options: &'a JsonExportOptions, schema_version: &'a str) -> Self {
        Self {
            schema_version,
            metadata: JsonMetadata {
                compiler_version: env!("CARGO_PKG_VERSION"),
                instruction_count: program.len(),
                options,
            },
            instructions: program
                .iter()
                .enumerate()
                .map(|(index, instruction)| JsonInstruction::new(index + 1, instruction))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonMetadata<'a> {
    compiler_version: &'static str,
    instruction_count: usize,
    options: &'a JsonExportOptions,
}

/// One instruction. The position is 1-indexed so that it matches the
/// values of jump targets.
#[derive(Debug, Serialize)]
struct JsonInstruction<'a> {
    instruction: usize,
    code: Opcode,
    conditional: bool,
    negate: bool,
    push: bool,
    datatype: IecType,
    dataformat: LiteralFormat,
    argument: &'a Operand,
}

impl<'a> JsonInstruction<'a> {
    fn new(instruction: usize, item: &'a Instruction) -> Self {
        Self {
            instruction,
            code: item.code,
            conditional: item.conditional,
            negate: item.negate,
            push: item.push,
            datatype: item.iec_type,
            dataformat: item.literal_format(),
            argument: &item.operand,
        }
    }
}
