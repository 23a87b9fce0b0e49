//! Integration tests for loading `.tbc` containers and disassembling their code.

use std::path::{Path, PathBuf};

use tclscope::{
    bytecode::{BytecodeKind, ExceptionType, Literal},
    disassembler::{decode_stream, Opcode},
    prelude::*,
};

fn sample(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/samples")
        .join(name)
}

#[test]
fn test_load_greet() -> Result<()> {
    let file = TbcFile::from_file(&sample("greet.tbc"))?;

    let header = file.header();
    assert_eq!(header.format, 2);
    assert_eq!(header.compiler_version.to_string(), "1.4");
    assert_eq!(header.tcl_version.to_string(), "8.6");

    let bytecode = file.bytecode();
    assert_eq!(bytecode.kind, BytecodeKind::Code);
    assert_eq!(bytecode.code.len(), 18);
    assert_eq!(bytecode.literals.len(), 6);
    assert_eq!(bytecode.literals[0], Literal::XString("puts".into()));
    assert_eq!(bytecode.literals[1], Literal::String("hello".into()));
    assert!(bytecode.exception_ranges.is_empty());
    assert_eq!(
        bytecode.header_string(),
        "Cmds 2, src 0, code 18, lits 6, aux 0, stkDepth 4"
    );

    let body = bytecode.literals[5]
        .nested()
        .expect("literal 5 is a procedure body");
    assert_eq!(body.kind, BytecodeKind::Proc);
    assert_eq!(body.code, vec![0x01, 0x00, 0x0A, 0x00, 0x06, 0x02, 0x00]);
    assert_eq!(body.num_args, 1);
    assert_eq!(body.argument_names(), vec!["name"]);

    Ok(())
}

#[test]
fn test_load_from_memory() -> Result<()> {
    let data = std::fs::read(sample("catch.tbc"))?;
    let file = TbcFile::from_mem(data)?;
    let bytecode = file.bytecode();

    assert_eq!(bytecode.literals[2], Literal::Int(0));
    assert_eq!(bytecode.exception_ranges.len(), 1);

    let range = &bytecode.exception_ranges[0];
    assert_eq!(range.kind, ExceptionType::Catch);
    assert_eq!(range.code_offset, 5);
    assert_eq!(range.catch_offset, 16);
    assert!(range.contains(12));
    assert!(!range.contains(14));

    Ok(())
}

#[test]
fn test_disassemble_greet() -> Result<()> {
    let file = TbcFile::from_file(&sample("greet.tbc"))?;
    let instructions = decode_stream(file.bytecode())?;

    let listing: Vec<String> = instructions.iter().map(ToString::to_string).collect();
    assert_eq!(
        listing,
        vec![
            "0 push1 puts",
            "2 push1 hello",
            "4 invokeStk1 2",
            "6 pop",
            "7 push1 proc",
            "9 push1 greet",
            "11 push1 name",
            "13 push1 Procbody",
            "15 invokeStk1 4",
            "17 done",
        ]
    );

    let body = file.bytecode().literals[5].nested().unwrap();
    let body_instructions = decode_stream(body)?;
    assert_eq!(body_instructions[1].opcode, Opcode::LoadScalar1);
    assert_eq!(body_instructions[1].to_string(), "2 loadScalar1 name");

    Ok(())
}

#[test]
fn test_disassemble_catch_targets() -> Result<()> {
    let file = TbcFile::from_file(&sample("catch.tbc"))?;
    let instructions = decode_stream(file.bytecode())?;

    let jump = instructions
        .iter()
        .find(|instruction| instruction.opcode == Opcode::Jump1)
        .expect("catch skips its handler");
    assert_eq!(jump.location, 14);
    assert_eq!(jump.branch_location(), Some(17));
    assert_eq!(jump.to_string(), "14 jump1 3 # pc 17");

    let last = instructions.last().unwrap();
    assert_eq!(last.end(), 19);

    Ok(())
}

#[test]
fn test_not_bytecode() {
    let result = TbcFile::from_text("proc f {} { return 1 }");
    assert!(matches!(result, Err(Error::NotBytecode)));
}

#[test]
fn test_truncated_payload() {
    let text = "tbcload::bceval {\nTclPro ByteCode 2 0 1.4 8.6\n1 0 4 0 0 0 0 0 0 0 0 0 0\n4 !!\n}";
    assert!(TbcFile::from_text(text).is_err());
}

#[test]
fn test_oversized_literal_count() {
    // Declared and stored counts agree, but only one literal follows
    let text = "tbcload::bceval {\nTclPro ByteCode 2 0 1.4 8.6\n\
                2 0 19 2000000000 1 0 0 1 3 0 0 0 0\n\
                19 f!!!!#-<<!-Z/s!IdR!vZJ#!\n2000000000\nx 4 *dmID\n}";
    assert!(TbcFile::from_text(text).is_err());
}

#[test]
fn test_missing_file() {
    let result = TbcFile::from_file(Path::new("tests/samples/does-not-exist.tbc"));
    assert!(matches!(result, Err(Error::FileError(_))));
}
