// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # tclscope
//!
//! A decompiler for Tcl bytecode as produced by TclPro's `procomp` and loaded by `tbcload`.
//! `tclscope` reads `.tbc` files, disassembles their Tcl 8.x instruction streams and recovers
//! structured, readable Tcl source from them.
//!
//! ## Features
//!
//! - **📦 Container decoding** - `.tbc` payload extraction, base-85 codec, literal pools,
//!   exception ranges, aux data and compiled locals
//! - **🔍 Disassembly** - The full Tcl 8.6 instruction set with resolved operands
//! - **🧩 Code map** - A location-indexed control-flow graph with range and reverse-edge indices
//! - **⚡ Structural recovery** - Expression folding, `catch` and short-circuit recovery,
//!   nested procedure bodies decompiled in parallel
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tclscope::prelude::*;
//! use std::path::Path;
//!
//! let file = TbcFile::from_file(Path::new("app.tbc"))?;
//! let result = Decompiler::new(DecompilerConfig::default()).decompile_file(&file)?;
//!
//! for statement in &result.statements {
//!     println!("{}", statement);
//! }
//! # Ok::<(), tclscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! Data flows leaves first:
//!
//! - [`file`] / [`bytecode`] - The container and its compiled units
//! - [`disassembler`] - Opcode table and instruction decoding
//! - [`code`] - Code units, the [`code::CodeMap`] and the graph walker
//! - [`compiler`] - The reduction passes and their scheduler
//! - [`expr`] - Expression trees of recovered source and their formatter
//! - [`Decompiler`] - Drives all of the above for one unit and its nested bodies
//!
//! ## Working on the Code Map
//!
//! ```rust
//! use tclscope::code::{CodeMap, CodeUnit};
//! use tclscope::compiler::DecompilerContext;
//! use tclscope::disassembler::{Instruction, Opcode, Operand};
//! use tclscope::Decompiler;
//!
//! let literal = |text: &str| Operand::Literal { index: 0, text: text.into() };
//! let mut map = CodeMap::new(vec![
//!     CodeUnit::from(Instruction::new(0, Opcode::Push1, vec![literal("5")])),
//!     CodeUnit::from(Instruction::new(2, Opcode::Push1, vec![literal("3")])),
//!     CodeUnit::from(Instruction::new(4, Opcode::Add, vec![])),
//!     CodeUnit::from(Instruction::new(5, Opcode::Pop, vec![])),
//! ])?;
//!
//! Decompiler::default().reduce(&mut map, &DecompilerContext::default())?;
//! assert_eq!(map.len(), 1);
//! assert_eq!(map.units().next().unwrap().render(4), "5 + 3");
//! # Ok::<(), tclscope::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result):
//!
//! ```rust,no_run
//! use tclscope::{Error, TbcFile};
//!
//! match TbcFile::from_file(std::path::Path::new("app.tbc")) {
//!     Ok(file) => println!("{}", file.bytecode().header_string()),
//!     Err(Error::NotBytecode) => println!("No tbcload payload"),
//!     Err(Error::Malformed { message, .. }) => println!("Malformed file: {}", message),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench --bench reduction
//! cargo +nightly fuzz run container --release
//! ```
#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use tclscope::prelude::*;
///
/// let file = TbcFile::from_file("app.tbc".as_ref())?;
/// let instructions = decode_stream(file.bytecode())?;
/// # Ok::<(), tclscope::Error>(())
/// ```
pub mod prelude;

/// Compiled Tcl units: literals, locals, exception ranges and aux data.
pub mod bytecode;

/// Code units, the location-indexed code map and its graph walker.
pub mod code;

/// The reduction passes, their configuration and event log.
pub mod compiler;

/// Tcl instruction decoding.
pub mod disassembler;

/// Expression trees describing recovered source.
pub mod expr;

/// Loading of `.tbc` files and the low-level readers behind them.
pub mod file;

/// Shared data structures.
pub mod utils;

mod decompiler;

/// `tclscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `tclscope` Error type
///
/// The main error type for all operations in this crate. Provides detailed error information
/// for container decoding, disassembly and code map rewrites.
pub use error::Error;

/// Main entry points: a loaded `.tbc` file and the decompiler that turns it into source.
///
/// # Example
///
/// ```rust,no_run
/// use tclscope::{Decompiler, TbcFile};
///
/// let file = TbcFile::from_file(std::path::Path::new("app.tbc"))?;
/// print!("{}", Decompiler::default().decompile_file(&file)?);
/// # Ok::<(), tclscope::Error>(())
/// ```
pub use decompiler::{Decompilation, Decompiler};
pub use file::TbcFile;

/// Configuration of a decompilation run.
pub use compiler::DecompilerConfig;

/// Half-open location ranges, used by the code map and the exception tables.
pub use code::CodeRange;

/// Provides access to the low-level readers.
///
/// The [`Parser`] walks big-endian instruction bytes; the [`BytecodeReader`] tokenizes the
/// textual container and decodes its base-85 data.
///
/// # Example
///
/// ```rust
/// use tclscope::{Parser, bytecode::Bytecode};
/// use tclscope::disassembler::{decode_instruction, DecodeContext};
///
/// let code = [0x00]; // done
/// let bytecode = Bytecode::default();
/// let mut parser = Parser::new(&code);
/// let instruction = decode_instruction(&mut parser, &DecodeContext::new(&bytecode))?;
/// assert_eq!(instruction.name(), "done");
/// # Ok::<(), tclscope::Error>(())
/// ```
pub use file::{parser::Parser, reader::BytecodeReader};
