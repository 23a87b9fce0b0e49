//! Tcl instruction decoding.
//!
//! Decoding is a single linear sweep: Tcl bytecode has no embedded data, so every byte of the
//! code array belongs to exactly one instruction. Operands are resolved against the owning
//! [`Bytecode`] while decoding, so later stages only deal with names and literal text.
//!
//! # Example: Decoding a Stream of Instructions
//!
//! ```rust
//! use tclscope::disassembler::{decode_stream, Opcode};
//! use tclscope::bytecode::{Bytecode, Literal};
//!
//! let mut bytecode = Bytecode::default();
//! bytecode.code = vec![0x01, 0x00, 0x03]; // push1 0; pop
//! bytecode.literals = vec![Literal::Int(5)];
//!
//! let instructions = decode_stream(&bytecode)?;
//! assert_eq!(instructions.len(), 2);
//! assert_eq!(instructions[0].to_string(), "0 push1 5");
//! assert_eq!(instructions[1].opcode, Opcode::Pop);
//! # Ok::<(), tclscope::Error>(())
//! ```

use crate::{
    bytecode::{Bytecode, Literal},
    disassembler::{
        BuiltinMathFunction, Instruction, Opcode, Operand, OperandType, StringClass,
    },
    expr::quote_word,
    file::parser::Parser,
    Result,
};

/// Everything operand resolution needs to know about the unit being decoded.
pub struct DecodeContext<'a> {
    bytecode: &'a Bytecode,
    literals: Vec<String>,
}

impl<'a> DecodeContext<'a> {
    /// Resolves literal operands to their quoted source words.
    ///
    /// Nested bytecode literals resolve to a placeholder; use
    /// [`DecodeContext::with_literals`] to substitute recovered scripts.
    #[must_use]
    pub fn new(bytecode: &'a Bytecode) -> Self {
        let literals = bytecode.literals.iter().map(literal_word).collect();
        DecodeContext { bytecode, literals }
    }

    /// Resolves literal operands to the given texts, indexed like the literal pool.
    #[must_use]
    pub fn with_literals(bytecode: &'a Bytecode, literals: Vec<String>) -> Self {
        DecodeContext { bytecode, literals }
    }

    /// The unit being decoded.
    #[must_use]
    pub fn bytecode(&self) -> &'a Bytecode {
        self.bytecode
    }

    fn literal(&self, index: u32) -> Result<Operand> {
        let text = usize::try_from(index)
            .ok()
            .and_then(|index| self.literals.get(index))
            .ok_or_else(|| malformed_error!("Literal index {} out of range", index))?;

        Ok(Operand::Literal {
            index,
            text: text.clone(),
        })
    }

    fn local(&self, index: u32) -> Result<Operand> {
        let locals = &self.bytecode.locals;
        if locals.is_empty() {
            return Ok(Operand::Local {
                index,
                name: format!("%v{}", index),
            });
        }

        let local = usize::try_from(index)
            .ok()
            .and_then(|index| locals.get(index))
            .ok_or_else(|| malformed_error!("Local index {} out of range", index))?;

        Ok(Operand::Local {
            index,
            name: local.name.clone(),
        })
    }
}

/// Source word of a literal as it appears in a command.
///
/// Strings are quoted so they parse back as one word; nested bytecode yields its placeholder.
#[must_use]
pub fn literal_word(literal: &Literal) -> String {
    match literal {
        Literal::String(value) | Literal::XString(value) => quote_word(value),
        _ => literal.to_source_string(),
    }
}

/// Decodes the instruction at the parser's current position.
///
/// # Arguments
/// * `parser`  - Cursor over the code array, positioned on an opcode byte
/// * `context` - The unit the code belongs to, used to resolve operands
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for unknown opcode bytes or unresolvable operands and
/// [`crate::Error::OutOfBounds`] if the instruction is truncated.
///
/// # Examples
///
/// ```rust
/// use tclscope::{Parser, bytecode::Bytecode};
/// use tclscope::disassembler::{decode_instruction, DecodeContext, Opcode};
///
/// let bytecode = Bytecode::default();
/// let code = [0x22, 0xFC]; // jump1 -4
/// let mut parser = Parser::new(&code);
///
/// let instruction = decode_instruction(&mut parser, &DecodeContext::new(&bytecode))?;
/// assert_eq!(instruction.opcode, Opcode::Jump1);
/// assert!(instruction.targets.is_empty());
/// # Ok::<(), tclscope::Error>(())
/// ```
pub fn decode_instruction(parser: &mut Parser, context: &DecodeContext) -> Result<Instruction> {
    let location = u32::try_from(parser.pos())
        .map_err(|_| malformed_error!("Code offset {} exceeds u32", parser.pos()))?;

    let byte = parser.read_be::<u8>()?;
    let Some(opcode) = Opcode::from_repr(byte) else {
        return Err(malformed_error!(
            "Invalid opcode {} at location {}",
            byte,
            location
        ));
    };

    let operands = match opcode {
        Opcode::Break | Opcode::Continue => {
            match context.bytecode.innermost_loop(location) {
                Some(range) => {
                    let destination = if opcode == Opcode::Break {
                        range.break_offset
                    } else {
                        range.continue_offset
                    };
                    let offset = i64::from(destination) - i64::from(location);
                    let offset = i32::try_from(offset).map_err(|_| {
                        malformed_error!(
                            "Loop exit of {} at {} out of range",
                            opcode.name(),
                            location
                        )
                    })?;
                    vec![Operand::Offset(offset)]
                }
                None => Vec::new(),
            }
        }
        _ => {
            let desc = opcode.desc();
            let mut operands = Vec::with_capacity(desc.operands.len());
            for operand_type in desc.operands {
                operands.push(decode_operand(parser, *operand_type, opcode, context)?);
            }
            operands
        }
    };

    Ok(Instruction::new(location, opcode, operands))
}

fn decode_operand(
    parser: &mut Parser,
    operand_type: OperandType,
    opcode: Opcode,
    context: &DecodeContext,
) -> Result<Operand> {
    let operand = match operand_type {
        OperandType::Int1 => Operand::Int(i32::from(parser.read_be::<i8>()?)),
        OperandType::Offset1 => Operand::Offset(i32::from(parser.read_be::<i8>()?)),
        OperandType::UInt1 if opcode == Opcode::CallBuiltinFunc1 => {
            let index = parser.read_be::<u8>()?;
            let function = BuiltinMathFunction::from_repr(index)
                .ok_or_else(|| malformed_error!("Invalid math function {}", index))?;
            Operand::MathFunction(function)
        }
        OperandType::UInt1 => Operand::UInt(u32::from(parser.read_be::<u8>()?)),
        OperandType::Scls1 => {
            let index = parser.read_be::<u8>()?;
            let class = StringClass::from_repr(index)
                .ok_or_else(|| malformed_error!("Invalid string class {}", index))?;
            Operand::StringClass(class)
        }
        OperandType::Lit1 => context.literal(u32::from(parser.read_be::<u8>()?))?,
        OperandType::Lvt1 => context.local(u32::from(parser.read_be::<u8>()?))?,
        OperandType::UInt4 => Operand::UInt(parser.read_be::<u32>()?),
        OperandType::Lit4 => context.literal(parser.read_be::<u32>()?)?,
        OperandType::Lvt4 => context.local(parser.read_be::<u32>()?)?,
        OperandType::Int4 => Operand::Int(parser.read_be::<i32>()?),
        OperandType::Offset4 => Operand::Offset(parser.read_be::<i32>()?),
        OperandType::Idx4 => Operand::Index(parser.read_be::<i32>()?),
        OperandType::Aux4 => Operand::Aux(parser.read_be::<i32>()?),
    };

    Ok(operand)
}

/// Decodes the whole code array of `bytecode`.
///
/// # Errors
/// See [`decode_instruction`].
pub fn decode_stream(bytecode: &Bytecode) -> Result<Vec<Instruction>> {
    decode_stream_with(&DecodeContext::new(bytecode))
}

/// Decodes the whole code array of the context's unit with custom literal texts.
///
/// # Errors
/// See [`decode_instruction`].
pub fn decode_stream_with(context: &DecodeContext) -> Result<Vec<Instruction>> {
    let mut parser = Parser::new(&context.bytecode.code);
    let mut instructions = Vec::new();

    while parser.has_more_data() {
        instructions.push(decode_instruction(&mut parser, context)?);
    }

    log::trace!("decoded {} instructions", instructions.len());
    Ok(instructions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bytecode::{ExceptionRange, ExceptionType, Local, LocalFlags},
        code::{BranchKind, BranchTarget},
        test::bytecode_with,
        Error,
    };

    #[test]
    fn resolves_literals_and_locals() {
        let mut bytecode = bytecode_with(
            vec![0x01, 0x00, 0x11, 0x00, 0x03],
            vec![Literal::String("hello world".to_string())],
        );
        bytecode.locals = vec![Local {
            name: "greeting".to_string(),
            frame_index: 0,
            flags: LocalFlags::empty(),
            default_value: None,
        }];

        let instructions = decode_stream(&bytecode).unwrap();
        assert_eq!(instructions.len(), 3);
        assert_eq!(instructions[0].to_string(), "0 push1 {hello world}");
        assert_eq!(instructions[1].to_string(), "2 storeScalar1 greeting");
        assert_eq!(instructions[2].location, 4);
    }

    #[test]
    fn locals_without_table() {
        let bytecode = bytecode_with(vec![0x0A, 0x03], Vec::new());
        let instructions = decode_stream(&bytecode).unwrap();
        assert_eq!(instructions[0].to_string(), "0 loadScalar1 %v3");
    }

    #[test]
    fn invalid_opcode() {
        let bytecode = bytecode_with(vec![0x00, 0xBE], Vec::new());
        assert!(matches!(
            decode_stream(&bytecode),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn literal_out_of_range() {
        let bytecode = bytecode_with(vec![0x01, 0x04], Vec::new());
        assert!(matches!(
            decode_stream(&bytecode),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn truncated_operand() {
        let bytecode = bytecode_with(vec![0x02, 0x00, 0x00], Vec::new());
        assert!(matches!(decode_stream(&bytecode), Err(Error::OutOfBounds)));
    }

    #[test]
    fn loop_exits() {
        // push1 0; pop; break; continue; done
        let mut bytecode = bytecode_with(
            vec![0x01, 0x00, 0x03, 0x41, 0x42, 0x00],
            vec![Literal::Int(1)],
        );
        bytecode.exception_ranges = vec![ExceptionRange {
            kind: ExceptionType::Loop,
            nesting_level: 0,
            code_offset: 0,
            num_code_bytes: 5,
            break_offset: 5,
            continue_offset: 0,
            catch_offset: -1,
        }];

        let instructions = decode_stream(&bytecode).unwrap();
        assert_eq!(instructions[2].opcode, Opcode::Break);
        assert_eq!(
            instructions[2].targets,
            vec![BranchTarget::new(5, BranchKind::Unconditional)]
        );
        assert_eq!(instructions[3].to_string(), "4 continue -4 # pc 0");
        assert_eq!(instructions[4].targets, vec![BranchTarget::fallthrough(6)]);
    }

    #[test]
    fn builtin_operands() {
        // callBuiltinFunc1 abs; strclass digit
        let bytecode = bytecode_with(vec![0x3E, 0x13, 0xB8, 0x04], Vec::new());
        let instructions = decode_stream(&bytecode).unwrap();

        assert_eq!(
            instructions[0].operands,
            vec![Operand::MathFunction(BuiltinMathFunction::Abs)]
        );
        assert_eq!(instructions[1].to_string(), "2 strclass digit");
    }
}
