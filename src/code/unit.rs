//! The closed set of units a code map holds.

use std::fmt;

use crate::{
    code::{BranchTarget, CodeRange, Command},
    disassembler::Instruction,
};

/// Discriminant of a [`CodeUnit`], used to narrow lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// A decoded instruction
    Instruction,
    /// A recovered command
    Command,
}

/// A node of the code map: either a raw instruction or a recovered command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CodeUnit {
    /// Leaf produced by the disassembler
    Instruction(Instruction),
    /// Composite produced by a reduction pass
    Command(Command),
}

impl CodeUnit {
    /// First byte of the unit.
    #[must_use]
    pub fn location(&self) -> u32 {
        match self {
            CodeUnit::Instruction(instruction) => instruction.location,
            CodeUnit::Command(command) => command.range().start,
        }
    }

    /// Number of bytes spanned.
    #[must_use]
    pub fn size(&self) -> u32 {
        match self {
            CodeUnit::Instruction(instruction) => instruction.size(),
            CodeUnit::Command(command) => command.range().length,
        }
    }

    /// Location directly behind the unit.
    #[must_use]
    pub fn end(&self) -> u32 {
        self.range().end()
    }

    /// `[location, location + size)`
    #[must_use]
    pub fn range(&self) -> CodeRange {
        match self {
            CodeUnit::Instruction(instruction) => instruction.range(),
            CodeUnit::Command(command) => command.range(),
        }
    }

    /// Outgoing edges.
    #[must_use]
    pub fn targets(&self) -> &[BranchTarget] {
        match self {
            CodeUnit::Instruction(instruction) => &instruction.targets,
            CodeUnit::Command(command) => command.targets(),
        }
    }

    /// Net stack effect.
    #[must_use]
    pub fn stack_effect(&self) -> i32 {
        match self {
            CodeUnit::Instruction(instruction) => instruction.stack_effect(),
            CodeUnit::Command(command) => command.stack_effect(),
        }
    }

    /// Which variant this is.
    #[must_use]
    pub fn kind(&self) -> UnitKind {
        match self {
            CodeUnit::Instruction(_) => UnitKind::Instruction,
            CodeUnit::Command(_) => UnitKind::Command,
        }
    }

    /// Returns the instruction, if this is one.
    #[must_use]
    pub fn as_instruction(&self) -> Option<&Instruction> {
        match self {
            CodeUnit::Instruction(instruction) => Some(instruction),
            CodeUnit::Command(_) => None,
        }
    }

    /// Returns the command, if this is one.
    #[must_use]
    pub fn as_command(&self) -> Option<&Command> {
        match self {
            CodeUnit::Command(command) => Some(command),
            CodeUnit::Instruction(_) => None,
        }
    }

    /// Returns `true` for recovered commands.
    #[must_use]
    pub fn is_command(&self) -> bool {
        matches!(self, CodeUnit::Command(_))
    }

    /// Renders the unit: commands as source text, instructions as their disassembly line.
    #[must_use]
    pub fn render(&self, indent_width: usize) -> String {
        match self {
            CodeUnit::Instruction(instruction) => instruction.to_string(),
            CodeUnit::Command(command) => command.render(indent_width),
        }
    }
}

impl From<Instruction> for CodeUnit {
    fn from(instruction: Instruction) -> Self {
        CodeUnit::Instruction(instruction)
    }
}

impl From<Command> for CodeUnit {
    fn from(command: Command) -> Self {
        CodeUnit::Command(command)
    }
}

impl fmt::Display for CodeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeUnit::Instruction(instruction) => write!(f, "{}", instruction),
            CodeUnit::Command(command) => write!(f, "{}", command),
        }
    }
}
