//! Benchmarks for container decoding and the reduction pipeline.
//!
//! - Base-85 decoding of instruction data
//! - Container parsing of a sample `.tbc` file
//! - Expression folding over long straight-line code
//! - Full decompilation including a nested procedure body

extern crate tclscope;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use std::hint::black_box;
use tclscope::{
    code::{CodeMap, CodeUnit},
    compiler::DecompilerContext,
    disassembler::{Instruction, Opcode, Operand},
    BytecodeReader, Decompiler, TbcFile,
};

const GREET: &str = include_str!("../tests/samples/greet.tbc");

/// `set x [expr {$a + N}]`, repeated `count` times, with every local resolved.
fn straight_line(count: u32) -> Vec<Instruction> {
    let local = |index, name: &str| Operand::Local {
        index,
        name: name.to_string(),
    };

    let mut instructions = Vec::with_capacity(count as usize * 5);
    for i in 0..count {
        let base = i * 8;
        instructions.push(Instruction::new(base, Opcode::LoadScalar1, vec![local(0, "a")]));
        instructions.push(Instruction::new(
            base + 2,
            Opcode::Push1,
            vec![Operand::Literal {
                index: 0,
                text: i.to_string(),
            }],
        ));
        instructions.push(Instruction::new(base + 4, Opcode::Add, vec![]));
        instructions.push(Instruction::new(base + 5, Opcode::StoreScalar1, vec![local(1, "x")]));
        instructions.push(Instruction::new(base + 7, Opcode::Pop, vec![]));
    }
    instructions
}

/// Benchmark decoding 4 KiB of base-85 data.
fn bench_base85_decode(c: &mut Criterion) {
    let text = format!("4096 {}", "s8W-!".repeat(1024));

    c.bench_function("base85_decode_4k", |b| {
        b.iter(|| {
            let mut reader = BytecodeReader::new(black_box(&text));
            let data = reader.decode_data(Some(4096)).unwrap();
            black_box(data)
        });
    });
}

/// Benchmark locating and parsing the payload of a small `.tbc` file.
fn bench_container_parse(c: &mut Criterion) {
    c.bench_function("container_parse_greet", |b| {
        b.iter(|| {
            let file = TbcFile::from_text(black_box(GREET)).unwrap();
            black_box(file)
        });
    });
}

/// Benchmark folding 1000 assignments into commands.
fn bench_fold_straight_line(c: &mut Criterion) {
    let instructions = straight_line(1000);
    let decompiler = Decompiler::default();

    c.bench_function("fold_straight_line_1000", |b| {
        b.iter_batched(
            || CodeMap::new(instructions.iter().cloned().map(CodeUnit::from)).unwrap(),
            |mut map| {
                let ctx = DecompilerContext::default();
                decompiler.reduce(&mut map, &ctx).unwrap();
                black_box(map)
            },
            BatchSize::LargeInput,
        );
    });
}

/// Benchmark the complete pipeline on a file with a nested procedure body.
fn bench_decompile_greet(c: &mut Criterion) {
    let file = TbcFile::from_text(GREET).unwrap();
    let decompiler = Decompiler::default();

    c.bench_function("decompile_greet", |b| {
        b.iter(|| {
            let result = decompiler.decompile_file(black_box(&file)).unwrap();
            black_box(result)
        });
    });
}

criterion_group!(
    benches,
    bench_base85_decode,
    bench_container_parse,
    bench_fold_straight_line,
    bench_decompile_greet
);
criterion_main!(benches);
