use std::path::Path;

use anyhow::Context;
use tclscope::{bytecode::Bytecode, TbcFile};

/// Load and decode a `.tbc` file.
pub fn load_file(path: &Path) -> anyhow::Result<TbcFile> {
    TbcFile::from_file(path).with_context(|| format!("failed to load bytecode: {}", path.display()))
}

/// Nested units of a literal pool as `(literal index, unit)` pairs.
pub fn nested_units(bytecode: &Bytecode) -> Vec<(usize, &Bytecode)> {
    bytecode
        .literals
        .iter()
        .enumerate()
        .filter_map(|(index, literal)| literal.nested().map(|nested| (index, nested)))
        .collect()
}

/// Extract a display-friendly filename from a path.
pub fn file_display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or_else(|| path.display().to_string(), ToString::to_string)
}
