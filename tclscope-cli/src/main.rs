mod app;
mod commands;
mod output;

use clap::Parser;

use crate::app::{Cli, Command};

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })?;

    let cli = Cli::parse();

    // Show tclscope info+ on stderr unless --json; --verbose enables debug; RUST_LOG overrides
    if !cli.global.json {
        let level = if cli.global.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::new()
            .filter_module("tclscope", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    match &cli.command {
        Command::Info { path } => commands::info::run(path, &cli.global),
        Command::Disasm { path, nested } => commands::disasm::run(path, *nested, &cli.global),
        Command::Decompile {
            path,
            no_catch,
            no_short_circuit,
            no_nested,
            sequential,
            quiet,
            rounds,
            indent,
            events,
        } => commands::decompile::run(
            path,
            &commands::decompile::DecompileOptions {
                recover_catch: !*no_catch,
                recover_short_circuit: !*no_short_circuit,
                nested_bodies: !*no_nested,
                parallel: !*sequential,
                raw_instructions: !*quiet,
                rounds: *rounds,
                indent: *indent,
                events: *events,
            },
            &cli.global,
        ),
    }
}
