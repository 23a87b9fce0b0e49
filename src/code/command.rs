//! Composite code units produced by the reduction passes.

use std::fmt;

use crate::{
    code::{BranchTarget, CodeRange, CodeUnit},
    expr::{Expr, DEFAULT_INDENT_WIDTH},
    Error::Boundary,
    Result,
};

/// A run of absorbed code units together with the source form they were recovered as.
///
/// The command spans exactly its absorbed units, inherits the outgoing edges of its last unit
/// and has the summed stack effect of all of them. Absorbed units are kept in location order
/// for equality and debugging.
///
/// # Examples
///
/// ```rust
/// use tclscope::code::{CodeUnit, Command};
/// use tclscope::disassembler::{Instruction, Opcode, Operand};
/// use tclscope::expr::Expr;
///
/// let push = Instruction::new(0, Opcode::Push1, vec![Operand::Literal { index: 0, text: "5".into() }]);
/// let command = Command::new(vec![CodeUnit::Instruction(push)], Expr::literal("5"))?;
///
/// assert_eq!(command.range().end(), 2);
/// assert_eq!(command.stack_effect(), 1);
/// # Ok::<(), tclscope::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command {
    range: CodeRange,
    units: Vec<CodeUnit>,
    expr: Expr,
    stack_effect: i32,
}

impl Command {
    /// Creates a command from contiguous units in location order.
    ///
    /// # Errors
    /// Returns [`crate::Error::Boundary`] if `units` is empty or a unit does not start where
    /// its predecessor ends.
    pub fn new(units: Vec<CodeUnit>, expr: Expr) -> Result<Command> {
        let Some(first) = units.first() else {
            return Err(Boundary {
                expected: 0,
                found: 0,
            });
        };

        let mut command = Command {
            range: CodeRange::new(first.location(), 0),
            units: Vec::with_capacity(units.len()),
            expr,
            stack_effect: 0,
        };
        for unit in units {
            command.append(unit)?;
        }

        Ok(command)
    }

    /// Overrides the summed stack effect.
    ///
    /// Used when the absorbed units cover mutually exclusive paths and only one of them runs.
    #[must_use]
    pub fn with_stack_effect(mut self, stack_effect: i32) -> Self {
        self.stack_effect = stack_effect;
        self
    }

    /// Absorbs `unit` at the end of this command.
    ///
    /// # Errors
    /// Returns [`crate::Error::Boundary`] if `unit` does not start at the command's end.
    pub fn append(&mut self, unit: CodeUnit) -> Result<()> {
        let end = self.range.end();
        if unit.location() != end {
            return Err(Boundary {
                expected: end,
                found: unit.location(),
            });
        }

        let length = self.range.length.saturating_add(unit.size());
        self.range = CodeRange::new(self.range.start, length);
        self.stack_effect += unit.stack_effect();
        self.units.push(unit);
        Ok(())
    }

    /// Byte range spanned by the absorbed units.
    #[must_use]
    pub fn range(&self) -> CodeRange {
        self.range
    }

    /// The absorbed units in location order.
    #[must_use]
    pub fn units(&self) -> &[CodeUnit] {
        &self.units
    }

    /// The recovered source form.
    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Net stack effect, the sum over the absorbed units unless overridden.
    #[must_use]
    pub fn stack_effect(&self) -> i32 {
        self.stack_effect
    }

    /// Outgoing edges, inherited from the last absorbed unit.
    #[must_use]
    pub fn targets(&self) -> &[BranchTarget] {
        self.units.last().map_or(&[], CodeUnit::targets)
    }

    /// Returns `true` if the command leaves a value on the stack.
    #[must_use]
    pub fn produces_value(&self) -> bool {
        self.stack_effect > 0
    }

    /// The expression to use when this command is the operand of another node.
    ///
    /// Value-producing command words become a `[...]` substitution.
    #[must_use]
    pub fn operand(&self) -> Expr {
        if self.produces_value() && self.expr.is_words() {
            Expr::substitution(self.expr.clone())
        } else {
            self.expr.clone()
        }
    }

    /// Renders the command as a top-level source line.
    ///
    /// Commands that leave a value on the stack are wrapped in brackets.
    #[must_use]
    pub fn render(&self, indent_width: usize) -> String {
        let text = self.expr.render(indent_width);
        if self.produces_value() {
            format!("[{}]", text)
        } else {
            text
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(DEFAULT_INDENT_WIDTH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        disassembler::{Instruction, Opcode, Operand},
        Error,
    };

    fn push(location: u32, text: &str) -> CodeUnit {
        CodeUnit::Instruction(Instruction::new(
            location,
            Opcode::Push1,
            vec![Operand::Literal {
                index: 0,
                text: text.to_string(),
            }],
        ))
    }

    #[test]
    fn append_on_boundary() {
        let mut command = Command::new(vec![push(0, "a")], Expr::literal("a")).unwrap();
        command.append(push(2, "b")).unwrap();

        assert_eq!(command.range(), CodeRange::new(0, 4));
        assert_eq!(command.stack_effect(), 2);
        assert_eq!(command.targets(), &[BranchTarget::fallthrough(4)]);
    }

    #[test]
    fn append_off_boundary() {
        let mut command = Command::new(vec![push(0, "a")], Expr::literal("a")).unwrap();
        assert!(matches!(
            command.append(push(3, "b")),
            Err(Error::Boundary {
                expected: 2,
                found: 3
            })
        ));
        assert!(matches!(
            Command::new(Vec::new(), Expr::literal("x")),
            Err(Error::Boundary { .. })
        ));
    }

    #[test]
    fn rendering() {
        let call = Expr::words(vec![Expr::literal("pwd")]);
        let command = Command::new(vec![push(0, "pwd")], call).unwrap();

        assert_eq!(command.render(4), "[pwd]");
        assert_eq!(command.operand().to_string(), "[pwd]");

        let literal = Command::new(vec![push(0, "5")], Expr::literal("5")).unwrap();
        assert_eq!(literal.operand().to_string(), "5");
    }

    #[test]
    fn overridden_effect() {
        let units = vec![push(0, "a"), push(2, "b")];
        let command = Command::new(units, Expr::literal("a"))
            .unwrap()
            .with_stack_effect(0);

        assert_eq!(command.range(), CodeRange::new(0, 4));
        assert!(!command.produces_value());
        assert_eq!(command.render(4), "a");
    }
}
