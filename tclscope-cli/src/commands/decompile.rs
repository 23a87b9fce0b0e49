use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tclscope::{Decompiler, DecompilerConfig};

use crate::{app::GlobalOptions, commands::common::load_file, output::print_output};

pub struct DecompileOptions {
    pub recover_catch: bool,
    pub recover_short_circuit: bool,
    pub nested_bodies: bool,
    pub parallel: bool,
    pub raw_instructions: bool,
    pub rounds: usize,
    pub indent: usize,
    pub events: bool,
}

impl DecompileOptions {
    fn config(&self) -> DecompilerConfig {
        DecompilerConfig::default()
            .with_recover_catch(self.recover_catch)
            .with_recover_short_circuit(self.recover_short_circuit)
            .with_nested_bodies(self.nested_bodies)
            .with_parallel(self.parallel)
            .with_emit_raw_instructions(self.raw_instructions)
            .with_structural_rounds(self.rounds)
            .with_indent_width(self.indent)
    }
}

#[derive(Debug, Serialize)]
pub struct EventInfo {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass: Option<&'static str>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DecompileReport {
    pub statements: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EventInfo>,
    #[serde(skip)]
    pub summary: Option<String>,
}

pub fn run(path: &Path, options: &DecompileOptions, opts: &GlobalOptions) -> anyhow::Result<()> {
    let file = load_file(path)?;
    let decompiler = Decompiler::new(options.config());
    let result = decompiler
        .decompile_file(&file)
        .with_context(|| format!("failed to decompile: {}", path.display()))?;

    log::debug!(
        "{} statements, {} events",
        result.statements.len(),
        result.events.count()
    );

    let events = if options.events {
        result
            .events
            .iter()
            .map(|event| EventInfo {
                kind: event.kind.to_string(),
                location: event.location,
                pass: event.pass,
                message: event.message.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };

    let report = DecompileReport {
        summary: options.events.then(|| result.events.summary()),
        statements: result.statements,
        events,
    };

    print_output(&report, opts, |report| {
        for statement in &report.statements {
            println!("{statement}");
        }
        if let Some(summary) = &report.summary {
            eprint!("{summary}");
        }
    })
}
