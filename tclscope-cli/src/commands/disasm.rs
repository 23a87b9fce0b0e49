use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tclscope::{bytecode::Bytecode, disassembler::decode_stream};

use crate::{
    app::GlobalOptions,
    commands::common::{load_file, nested_units},
    output::print_output,
};

#[derive(Debug, Serialize)]
pub struct InstructionInfo {
    pub location: u32,
    pub size: u32,
    pub name: &'static str,
    pub operands: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
    #[serde(skip)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct UnitListing {
    /// Literal path from the top-level unit, empty for the top-level unit itself
    pub path: Vec<usize>,
    pub kind: String,
    pub summary: String,
    pub instructions: Vec<InstructionInfo>,
}

fn disassemble(
    bytecode: &Bytecode,
    path: Vec<usize>,
    nested: bool,
    out: &mut Vec<UnitListing>,
) -> anyhow::Result<()> {
    let instructions = decode_stream(bytecode)
        .with_context(|| format!("failed to disassemble unit at literal path {path:?}"))?;

    out.push(UnitListing {
        path: path.clone(),
        kind: bytecode.kind.to_string(),
        summary: bytecode.header_string(),
        instructions: instructions
            .iter()
            .map(|instruction| InstructionInfo {
                location: instruction.location,
                size: instruction.size(),
                name: instruction.name(),
                operands: instruction.operands.iter().map(ToString::to_string).collect(),
                target: instruction.branch_location(),
                text: instruction.to_string(),
            })
            .collect(),
    });

    if nested {
        for (index, unit) in nested_units(bytecode) {
            let mut child = path.clone();
            child.push(index);
            disassemble(unit, child, nested, out)?;
        }
    }

    Ok(())
}

pub fn run(path: &Path, nested: bool, opts: &GlobalOptions) -> anyhow::Result<()> {
    let file = load_file(path)?;

    let mut listings = Vec::new();
    disassemble(file.bytecode(), Vec::new(), nested, &mut listings)?;

    print_output(&listings, opts, |listings| {
        for (i, listing) in listings.iter().enumerate() {
            if i > 0 {
                println!();
            }
            if listing.path.is_empty() {
                println!("// {} unit", listing.kind);
            } else {
                let path: Vec<String> = listing.path.iter().map(ToString::to_string).collect();
                println!("// {} unit in literal {}", listing.kind, path.join("."));
            }
            println!("// {}", listing.summary);
            for instruction in &listing.instructions {
                println!("  {}", instruction.text);
            }
        }
    })
}
