use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// tclscope - TclPro / tbcload bytecode inspection and decompilation
#[derive(Debug, Parser)]
#[command(name = "tclscope", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Display container overview: versions, table sizes, exception ranges and commands.
    Info {
        /// Path to the .tbc file.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Disassemble the top-level code array.
    Disasm {
        /// Path to the .tbc file.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Also disassemble procedure bodies and precompiled scripts in the literal pool.
        #[arg(long)]
        nested: bool,
    },

    /// Recover Tcl source.
    Decompile {
        /// Path to the .tbc file.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Leave beginCatch4 / endCatch spans as instructions.
        #[arg(long)]
        no_catch: bool,

        /// Leave short-circuit branch shapes as instructions.
        #[arg(long)]
        no_short_circuit: bool,

        /// Keep nested procedure bodies as placeholders.
        #[arg(long)]
        no_nested: bool,

        /// Decompile nested bodies on the current thread only.
        #[arg(long)]
        sequential: bool,

        /// Drop instructions that could not be recovered from the output.
        #[arg(short, long)]
        quiet: bool,

        /// Maximum number of structural rounds.
        #[arg(long, default_value_t = 1)]
        rounds: usize,

        /// Spaces per indentation level.
        #[arg(long, default_value_t = 4)]
        indent: usize,

        /// Print a summary of the recorded rewrites to stderr.
        #[arg(long)]
        events: bool,
    },
}
