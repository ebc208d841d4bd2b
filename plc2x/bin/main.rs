use std::io;
use std::path::PathBuf;

use clap::Parser;

use ironilc::cli;
use ironilc::logger;

#[derive(Parser, Debug)]
#[command(name = "ironilc", about = "IronIL Instruction List compiler")]
struct Args {
    /// Turn on verbose logging. Repeat to increase verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write log messages to the file rather than to stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    action: Action,
}

#[derive(clap::Subcommand, Debug)]
enum Action {
    /// Check that the files (or the files in directories) parse.
    Check { files: Vec<PathBuf> },
    /// Write the parsed program as JSON.
    Dump {
        file: PathBuf,
        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
        /// Only replace labels in the operands of jumps and calls.
        #[arg(long)]
        jump_labels_only: bool,
    },
    /// Write one line for each parsed instruction.
    List {
        file: PathBuf,
        /// Only replace labels in the operands of jumps and calls.
        #[arg(long)]
        jump_labels_only: bool,
    },
}

pub fn main() -> Result<(), String> {
    let args = Args::parse();

    logger::configure(args.verbose, args.log_file)?;

    match args.action {
        Action::Check { files } => cli::check(&files, false),
        Action::Dump {
            file,
            pretty,
            jump_labels_only,
        } => cli::dump(
            &file,
            &cli::parse_options(jump_labels_only),
            pretty,
            io::stdout().lock(),
        ),
        Action::List {
            file,
            jump_labels_only,
        } => cli::list(
            &file,
            &cli::parse_options(jump_labels_only),
            io::stdout().lock(),
        ),
    }
}
