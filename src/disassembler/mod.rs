//! Tcl bytecode disassembler.
//!
//! This module turns the raw code array of a [`crate::bytecode::Bytecode`] unit into an ordered
//! stream of [`Instruction`]s with resolved operands and derived branch targets. It also hosts
//! the static opcode table the rest of the crate consults for names, arities and stack
//! effects.
//!
//! # Key Types
//! - [`Instruction`] - A decoded instruction
//! - [`Operand`] - A resolved operand
//! - [`Opcode`] / [`InstrDesc`] - The instruction set and its metadata
//! - [`DecodeContext`] - Operand resolution against the owning unit
//!
//! # Main Functions
//! - [`decode_instruction`] - Decode a single instruction
//! - [`decode_stream`] - Decode a whole code array
//!
//! # Example
//! ```rust,no_run
//! use tclscope::{TbcFile, disassembler::decode_stream};
//! use std::path::Path;
//!
//! let file = TbcFile::from_file(Path::new("app.tbc"))?;
//! for instruction in decode_stream(file.bytecode())? {
//!     println!("{}", instruction);
//! }
//! # Ok::<(), tclscope::Error>(())
//! ```

mod decoder;
mod instruction;
mod opcodes;

pub use decoder::{
    decode_instruction, decode_stream, decode_stream_with, literal_word, DecodeContext,
};
pub use instruction::{Instruction, Operand};
pub use opcodes::{
    Arity, BuiltinMathFunction, InstrDesc, Opcode, OperandType, StackEffect, StringClass,
    INSTRUCTIONS,
};
