//! Implements the command line behavior.

use codespan_reporting::{
    diagnostic::{Diagnostic, Label, LabelStyle, Severity},
    files::SimpleFiles,
    term::{
        self,
        termcolor::{ColorChoice, StandardStream},
    },
};
use ironil_dsl::{
    common::Program,
    core::FileId,
    json_export::{JsonExportOptions, JsonExporter},
    textual::listing,
};
use ironil_parser::{
    options::{LabelSubstitution, ParseOptions},
    parse_program, read_source,
};
use log::{debug, error};
use std::{
    fs::{metadata, read_dir},
    io::Write,
    path::{Path, PathBuf},
};

/// Returns the parse options for the command line flags.
pub fn parse_options(jump_labels_only: bool) -> ParseOptions {
    let substitution = if jump_labels_only {
        LabelSubstitution::JumpAndCallOnly
    } else {
        LabelSubstitution::Everywhere
    };
    ParseOptions::default().with_label_substitution(substitution)
}

// Checks specified files.
pub fn check(paths: &[PathBuf], suppress_output: bool) -> Result<(), String> {
    let mut files: Vec<PathBuf> = vec![];
    for path in paths {
        files.append(&mut enumerate_files(path)?);
    }

    let mut errors = 0usize;
    for path in &files {
        debug!("Checking {}", path.display());
        if load(path, &ParseOptions::default(), suppress_output).is_err() {
            errors += 1;
        }
    }

    if errors > 0 {
        return Err(format!("Number of errors: {}", errors));
    }

    if !suppress_output {
        println!("OK");
    }
    Ok(())
}

/// Parses the file and writes the program as JSON.
pub fn dump<W: Write>(
    path: &Path,
    options: &ParseOptions,
    pretty_print: bool,
    mut out: W,
) -> Result<(), String> {
    let program = load(path, options, false)?;

    let exporter = JsonExporter::with_options(JsonExportOptions { pretty_print });
    exporter
        .export_to_writer(&program, &mut out)
        .map_err(|err| err.to_string())?;
    writeln!(out).map_err(|err| err.to_string())
}

/// Parses the file and writes one listing line per instruction.
pub fn list<W: Write>(path: &Path, options: &ParseOptions, mut out: W) -> Result<(), String> {
    let program = load(path, options, false)?;

    for line in listing(&program) {
        writeln!(out, "{}", line).map_err(|err| err.to_string())?;
    }
    Ok(())
}

/// Reads and parses the file, reporting the diagnostic if there is one.
fn load(path: &Path, options: &ParseOptions, suppress_output: bool) -> Result<Program, String> {
    let contents = match read_source(path) {
        Ok(contents) => contents,
        Err(diagnostic) => {
            let message = diagnostic.to_string();
            handle_diagnostic(diagnostic, None, suppress_output);
            return Err(message);
        }
    };

    parse_program(&contents, &FileId::from_path(path), options).map_err(|diagnostic| {
        let message = diagnostic.to_string();
        handle_diagnostic(diagnostic, Some((path, &contents)), suppress_output);
        message
    })
}

fn enumerate_files(path: &Path) -> Result<Vec<PathBuf>, String> {
    // A missing path is reported when it is read so that the
    // error has the same form as every other problem.
    let Ok(metadata) = metadata(path) else {
        return Ok(vec![path.to_path_buf()]);
    };

    if metadata.is_dir() {
        let paths = read_dir(path).map_err(|e| e.to_string())?;
        let mut paths: Vec<PathBuf> = paths
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(_) => None,
            })
            .filter(|path| path.is_file())
            .collect();
        paths.sort();
        return Ok(paths);
    }
    Ok(vec![path.to_path_buf()])
}

fn handle_diagnostic(
    diagnostic: ironil_dsl::diagnostic::Diagnostic,
    source: Option<(&Path, &String)>,
    suppress_output: bool,
) {
    if suppress_output {
        return;
    }

    let writer = StandardStream::stderr(ColorChoice::Auto);
    let config = codespan_reporting::term::Config::default();

    let mut files: SimpleFiles<String, &String> = SimpleFiles::new();
    let diagnostic = match source {
        Some((path, contents)) => {
            files.add(path.display().to_string(), contents);
            map_diagnostic(diagnostic)
        }
        // Without the file contents there is nothing to point at.
        None => Diagnostic::new(Severity::Error)
            .with_code(diagnostic.code.clone())
            .with_message(diagnostic.description())
            .with_notes(vec![diagnostic.primary.message]),
    };

    let _ = term::emit(&mut writer.lock(), &config, &files, &diagnostic).map_err(|err| {
        error!("Failed writing to terminal: {}", err);
    });
}

fn map_label(label: ironil_dsl::diagnostic::Label, style: LabelStyle) -> Label<usize> {
    Label::new(style, 0, label.range()).with_message(label.message)
}

fn map_diagnostic(diagnostic: ironil_dsl::diagnostic::Diagnostic) -> Diagnostic<usize> {
    let description = diagnostic.description();

    // Set the primary labels
    let mut labels = vec![map_label(diagnostic.primary, LabelStyle::Primary)];

    // Add any secondary labels
    labels.extend(
        diagnostic
            .secondary
            .into_iter()
            .map(|lbl| map_label(lbl, LabelStyle::Secondary)),
    );

    Diagnostic::new(Severity::Error)
        .with_code(diagnostic.code)
        .with_message(description)
        .with_labels(labels)
}
