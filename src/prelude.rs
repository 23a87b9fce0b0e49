//! # tclscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the tclscope library. Import this module to get quick access to the essential
//! types for loading, disassembling and decompiling Tcl bytecode.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all tclscope operations
pub use crate::Error;

/// The result type used throughout tclscope
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// A loaded `.tbc` file
pub use crate::TbcFile;

/// The decompiler and its output
pub use crate::{Decompilation, Decompiler, DecompilerConfig};

/// Low-level readers for instruction bytes and the textual container
pub use crate::{BytecodeReader, Parser};

// ================================================================================================
// Compiled Units
// ================================================================================================

/// A compiled unit with its literal pool, locals, exception ranges and aux data
pub use crate::bytecode::{Bytecode, BytecodeKind};

/// Unit contents
pub use crate::bytecode::{
    AuxData, AuxDataType, ExceptionRange, ExceptionType, Literal, LiteralType, Local, LocalFlags,
};

// ================================================================================================
// Disassembly
// ================================================================================================

/// Instructions and their operands
pub use crate::disassembler::{Instruction, Opcode, Operand};

/// Decoding entry points
pub use crate::disassembler::{decode_instruction, decode_stream, DecodeContext};

// ================================================================================================
// Code Map and Reduction
// ================================================================================================

/// Code units and the map holding them
pub use crate::code::{BranchTarget, CodeMap, CodeRange, CodeUnit, Command};

/// Pass infrastructure and the events it records
pub use crate::compiler::{DecompilerContext, EventKind, EventLog, PassScheduler, ReductionPass};

/// Recovered source
pub use crate::expr::Expr;
