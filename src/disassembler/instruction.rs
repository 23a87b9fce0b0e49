//! Decoded Tcl instructions and their operands.
//!
//! An [`Instruction`] is the leaf unit of the code map. Its operands are already resolved
//! against the owning bytecode unit: literal operands carry the literal's source text, local
//! variable operands the variable's name, and `callBuiltinFunc1` / `strclass` their symbolic
//! function or class.

use std::fmt;

use crate::{
    code::{BranchKind, BranchTarget, CodeRange},
    disassembler::{Arity, BuiltinMathFunction, InstrDesc, Opcode, StackEffect, StringClass},
};

/// A decoded operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    /// Signed immediate (`Int1`, `Int4`)
    Int(i32),
    /// Unsigned immediate or count (`UInt1`, `UInt4`)
    UInt(u32),
    /// List or string index (`Idx4`), `end` relative when at most -2
    Index(i32),
    /// Index into the aux data table (`Aux4`)
    Aux(i32),
    /// Relative jump distance (`Offset1`, `Offset4`)
    Offset(i32),
    /// Entry of the literal pool
    Literal {
        /// Position in the pool
        index: u32,
        /// Source text of the literal
        text: String,
    },
    /// Entry of the local variable table
    Local {
        /// Frame slot
        index: u32,
        /// Variable name, or `%v<index>` for units without a locals table
        name: String,
    },
    /// Function called by `callBuiltinFunc1`
    MathFunction(BuiltinMathFunction),
    /// Class tested by `strclass`
    StringClass(StringClass),
}

impl Operand {
    /// Returns the numeric value of an immediate, count, index or offset operand.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Operand::Int(value)
            | Operand::Index(value)
            | Operand::Aux(value)
            | Operand::Offset(value) => Some(i64::from(*value)),
            Operand::UInt(value) => Some(i64::from(*value)),
            Operand::Literal { .. }
            | Operand::Local { .. }
            | Operand::MathFunction(_)
            | Operand::StringClass(_) => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Int(value) | Operand::Aux(value) | Operand::Offset(value) => {
                write!(f, "{}", value)
            }
            Operand::UInt(value) => write!(f, "{}", value),
            Operand::Index(-2) => write!(f, "end"),
            Operand::Index(value) if *value < -2 => write!(f, "end-{}", -2 - i64::from(*value)),
            Operand::Index(value) => write!(f, "{}", value),
            Operand::Literal { text, .. } => write!(f, "{}", text),
            Operand::Local { name, .. } => write!(f, "{}", name),
            Operand::MathFunction(function) => write!(f, "{}", function),
            Operand::StringClass(class) => write!(f, "{}", class),
        }
    }
}

/// A single decoded instruction.
///
/// # Examples
///
/// ```rust
/// use tclscope::disassembler::{Instruction, Opcode, Operand};
///
/// let jump = Instruction::new(10, Opcode::Jump1, vec![Operand::Offset(-6)]);
/// assert_eq!(jump.to_string(), "10 jump1 -6 # pc 4");
/// assert_eq!(jump.targets.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instruction {
    /// Offset of the opcode byte in the code array
    pub location: u32,
    /// The opcode
    pub opcode: Opcode,
    /// Resolved operands in stream order
    pub operands: Vec<Operand>,
    /// Outgoing edges derived from the opcode and its jump distance
    pub targets: Vec<BranchTarget>,
}

impl Instruction {
    /// Creates an instruction and derives its branch targets.
    ///
    /// Branch opcodes get a target at `location + offset`, taken from operand 0. Every opcode
    /// that is not an unconditional branch also falls through to `location + size`. Targets
    /// that would land outside the addressable range are dropped.
    #[must_use]
    pub fn new(location: u32, opcode: Opcode, operands: Vec<Operand>) -> Self {
        let mut instruction = Instruction {
            location,
            opcode,
            operands,
            targets: Vec::new(),
        };

        if opcode.is_branch() {
            if let Some(target) = instruction.branch_location() {
                let kind = if opcode.is_unconditional_branch() {
                    BranchKind::Unconditional
                } else {
                    BranchKind::Conditional
                };
                instruction.targets.push(BranchTarget::new(target, kind));
            }
        }

        if !opcode.is_unconditional_branch() {
            instruction
                .targets
                .push(BranchTarget::fallthrough(instruction.end()));
        }

        instruction
    }

    /// Returns the static descriptor of the opcode.
    #[must_use]
    pub fn desc(&self) -> &'static InstrDesc {
        self.opcode.desc()
    }

    /// Display name of the opcode.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.opcode.name()
    }

    /// Encoded size in bytes.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.desc().size
    }

    /// Location directly behind this instruction.
    #[must_use]
    pub fn end(&self) -> u32 {
        self.location.saturating_add(self.size())
    }

    /// Byte range covered by this instruction.
    #[must_use]
    pub fn range(&self) -> CodeRange {
        CodeRange::new(self.location, self.size())
    }

    /// Number of stack values consumed.
    ///
    /// Variable arities resolve to operand 0. Negative values mark instructions whose arity
    /// cannot be known statically.
    #[must_use]
    pub fn argc(&self) -> i32 {
        match self.desc().argc {
            Arity::Fixed(count) => count,
            Arity::Variable => self.count_operand().unwrap_or(-1),
        }
    }

    /// Net change of the stack depth.
    #[must_use]
    pub fn stack_effect(&self) -> i32 {
        match self.desc().stack_effect {
            StackEffect::Fixed(effect) => effect,
            StackEffect::Variable => self.count_operand().map_or(0, |count| 1 - count),
        }
    }

    /// Absolute destination of a branch instruction.
    #[must_use]
    pub fn branch_location(&self) -> Option<u32> {
        if !self.opcode.is_branch() {
            return None;
        }

        match self.operands.first() {
            Some(Operand::Offset(offset)) => {
                u32::try_from(i64::from(self.location) + i64::from(*offset)).ok()
            }
            _ => None,
        }
    }

    fn count_operand(&self) -> Option<i32> {
        self.operands
            .first()
            .and_then(Operand::as_int)
            .and_then(|value| i32::try_from(value).ok())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.location, self.name())?;
        for operand in &self.operands {
            write!(f, " {}", operand)?;
        }
        if let Some(target) = self.branch_location() {
            write!(f, " # pc {}", target)?;
        }
        Ok(())
    }
}
