use std::path::Path;

use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{file_display_name, load_file, nested_units},
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
pub struct ContainerInfo {
    pub file: String,
    pub format: i32,
    pub build: i32,
    pub compiler_version: String,
    pub tcl_version: String,
    pub kind: String,
    pub commands: u32,
    pub source_bytes: u32,
    pub code_bytes: u32,
    pub literals: usize,
    pub nested_bodies: usize,
    pub exception_ranges: usize,
    pub aux_data: usize,
    pub max_stack_depth: u32,
    #[serde(skip)]
    pub summary: String,
    #[serde(skip)]
    pub exceptions: String,
    #[serde(skip)]
    pub command_ranges: String,
}

pub fn run(path: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    let file = load_file(path)?;
    let header = file.header();
    let bytecode = file.bytecode();

    let info = ContainerInfo {
        file: file_display_name(path),
        format: header.format,
        build: header.build,
        compiler_version: header.compiler_version.to_string(),
        tcl_version: header.tcl_version.to_string(),
        kind: bytecode.kind.to_string(),
        commands: bytecode.info.num_commands,
        source_bytes: bytecode.info.num_src_bytes,
        code_bytes: bytecode.info.num_code_bytes,
        literals: bytecode.literals.len(),
        nested_bodies: nested_units(bytecode).len(),
        exception_ranges: bytecode.exception_ranges.len(),
        aux_data: bytecode.aux_data.len(),
        max_stack_depth: bytecode.info.max_stack_depth,
        summary: bytecode.header_string(),
        exceptions: bytecode.exception_info_string(),
        command_ranges: bytecode.command_info_string(),
    };

    print_output(&info, opts, |info| {
        let mut table = TabWriter::new(vec![("Field", Align::Left), ("Value", Align::Right)]);
        table.row(vec!["File".into(), info.file.clone()]);
        table.row(vec![
            "Format".into(),
            format!("{} (build {})", info.format, info.build),
        ]);
        table.row(vec!["Compiler".into(), info.compiler_version.clone()]);
        table.row(vec!["Tcl".into(), info.tcl_version.clone()]);
        table.row(vec!["Kind".into(), info.kind.clone()]);
        table.row(vec!["Literals".into(), info.literals.to_string()]);
        table.row(vec!["Nested bodies".into(), info.nested_bodies.to_string()]);
        table.row(vec!["Aux data".into(), info.aux_data.to_string()]);
        table.print();

        println!();
        println!("{}", info.summary);
        if !info.exceptions.is_empty() {
            print!("{}", info.exceptions);
        }
        println!("{}", info.command_ranges);
    })
}
