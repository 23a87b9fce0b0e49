pub mod common;
pub mod decompile;
pub mod disasm;
pub mod info;
