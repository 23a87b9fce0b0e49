//! Builders shared by the unit tests.

use crate::{
    bytecode::{Bytecode, Literal},
    code::{CodeMap, CodeUnit},
    compiler::DecompilerContext,
    disassembler::{Instruction, Opcode, Operand},
    Result,
};

// Helper function to create a script unit from raw code and a literal pool
pub fn bytecode_with(code: Vec<u8>, literals: Vec<Literal>) -> Bytecode {
    let mut bytecode = Bytecode {
        code,
        literals,
        ..Bytecode::default()
    };
    bytecode.info.num_code_bytes = u32::try_from(bytecode.code.len()).unwrap();
    bytecode.info.num_lit_objects = u32::try_from(bytecode.literals.len()).unwrap();
    bytecode
}

// Helper function to create an instruction with derived targets
pub fn instr(location: u32, opcode: Opcode, operands: Vec<Operand>) -> Instruction {
    Instruction::new(location, opcode, operands)
}

// Helper function to create a literal operand from its source word
pub fn lit(text: &str) -> Operand {
    Operand::Literal {
        index: 0,
        text: text.to_string(),
    }
}

// Helper function to create a local variable operand
pub fn local_op(index: u32, name: &str) -> Operand {
    Operand::Local {
        index,
        name: name.to_string(),
    }
}

// Loads `units` into a map, applies `reduce` with a default context and returns the map
pub fn reduce_units<F>(units: Vec<Instruction>, reduce: F) -> CodeMap
where
    F: FnOnce(&mut CodeMap, &DecompilerContext) -> Result<()>,
{
    let ctx = DecompilerContext::default();
    let mut map = CodeMap::new(units.into_iter().map(CodeUnit::from)).unwrap();
    reduce(&mut map, &ctx).unwrap();
    map
}
