//! JitLog Viewer CLI
//!
//! Inspects tracing JIT logs: call trees of traced loops, their source
//! line ranges and the bridges leaving their guards.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use jitlog_viewer::commands::{
    display_version, execute_show, execute_summary, validate_report_file, ShowArgs, SummaryArgs,
};

/// JitLog Viewer - call trees and bridge graphs for tracing JIT logs
#[derive(Parser, Debug)]
#[command(name = "jitlog-viewer")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarize every root loop and its bridges
    Summary {
        /// JIT log file
        log: PathBuf,

        /// JSON line tables for placing bytecodes on source lines
        #[arg(long, env = "JITLOG_CODE_MAP")]
        code_map: Option<PathBuf>,

        /// Output path for the JSON report (optional)
        #[arg(short, long)]
        json: Option<PathBuf>,

        /// Print text summary to stdout
        #[arg(long = "print")]
        print_summary: bool,
    },

    /// Print the call tree of one root loop
    Show {
        /// JIT log file
        log: PathBuf,

        /// Position of the loop among the root loops
        #[arg(short = 'l', long = "loop", default_value = "0")]
        root: usize,

        /// Follow the bridge of this guard number (repeatable)
        #[arg(short, long)]
        follow: Vec<u32>,

        /// JSON line tables for placing bytecodes on source lines
        #[arg(long, env = "JITLOG_CODE_MAP")]
        code_map: Option<PathBuf>,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Summary {
            log,
            code_map,
            json,
            print_summary,
        } => {
            // Without a JSON target the text summary is the only output
            let print_summary = print_summary || json.is_none();
            execute_summary(SummaryArgs {
                log,
                code_map,
                output_json: json,
                print_summary,
            })?;
        }

        Commands::Show {
            log,
            root,
            follow,
            code_map,
        } => {
            execute_show(ShowArgs {
                log,
                code_map,
                root,
                follow,
            })?;
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
