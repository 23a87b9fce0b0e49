//! The decompiler driver.
//!
//! [`Decompiler`] ties the pieces together for one bytecode unit:
//!
//! 1. nested procedure bodies and precompiled scripts in the literal pool are decompiled
//!    first, optionally on the rayon thread pool, and become braced script literals
//! 2. the code array is decoded against those literal texts
//! 3. the instructions are loaded into a [`CodeMap`] and reduced by the [`PassScheduler`]
//! 4. the remaining top-level units are rendered as statements
//!
//! # Examples
//!
//! ```rust,no_run
//! use tclscope::{Decompiler, DecompilerConfig, TbcFile};
//! use std::path::Path;
//!
//! let file = TbcFile::from_file(Path::new("app.tbc"))?;
//! let decompiler = Decompiler::new(DecompilerConfig::default());
//! let result = decompiler.decompile_file(&file)?;
//!
//! print!("{}", result);
//! eprint!("{}", result.events.summary());
//! # Ok::<(), tclscope::Error>(())
//! ```

use std::fmt;

use rayon::prelude::*;

use crate::{
    bytecode::{Bytecode, Literal},
    code::{CodeMap, CodeUnit},
    compiler::{DecompilerConfig, DecompilerContext, EventKind, EventLog, PassScheduler},
    disassembler::{decode_stream_with, literal_word, DecodeContext},
    file::TbcFile,
    Result,
};

/// The recovered source of one bytecode unit.
#[derive(Debug)]
pub struct Decompilation {
    /// Top-level statements in code order
    pub statements: Vec<String>,
    /// Everything the passes rewrote, nested bodies included
    pub events: EventLog,
}

impl fmt::Display for Decompilation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}

/// Decompiles bytecode units with a fixed configuration.
pub struct Decompiler {
    config: DecompilerConfig,
    scheduler: PassScheduler,
}

impl Default for Decompiler {
    fn default() -> Self {
        Self::new(DecompilerConfig::default())
    }
}

impl Decompiler {
    /// Creates a decompiler; the pass pipeline is derived from `config`.
    #[must_use]
    pub fn new(config: DecompilerConfig) -> Self {
        let scheduler = PassScheduler::from_config(&config);
        Decompiler { config, scheduler }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &DecompilerConfig {
        &self.config
    }

    /// Decompiles the top-level unit of a `.tbc` file.
    ///
    /// # Errors
    /// See [`Decompiler::decompile`].
    pub fn decompile_file(&self, file: &TbcFile) -> Result<Decompilation> {
        self.decompile(file.bytecode())
    }

    /// Decompiles `bytecode` and all nested units in its literal pool.
    ///
    /// A nested unit that fails to decompile is kept as its literal placeholder and recorded as
    /// [`EventKind::BodyFailed`].
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the code array of `bytecode` cannot be decoded,
    /// or an invariant error from the reduction passes.
    pub fn decompile(&self, bytecode: &Bytecode) -> Result<Decompilation> {
        let ctx = DecompilerContext::new(self.config.clone());
        let statements = self.decompile_unit(bytecode, &ctx)?;

        Ok(Decompilation {
            statements,
            events: ctx.into_events(),
        })
    }

    /// Runs the reduction pipeline on an already built map.
    ///
    /// # Errors
    /// Returns an error if a pass breaks a map invariant.
    pub fn reduce(&self, map: &mut CodeMap, ctx: &DecompilerContext) -> Result<()> {
        let rounds = self.scheduler.run_pipeline(map, ctx)?;
        log::trace!("reduced to {} units in {} structural rounds", map.len(), rounds);
        Ok(())
    }

    fn decompile_unit(&self, bytecode: &Bytecode, ctx: &DecompilerContext) -> Result<Vec<String>> {
        let literals = self.literal_texts(bytecode, ctx);
        let instructions = decode_stream_with(&DecodeContext::with_literals(bytecode, literals))?;
        let count = instructions.len();

        let mut map = CodeMap::new(instructions.into_iter().map(CodeUnit::from))?;
        self.reduce(&mut map, ctx)?;
        log::debug!("{} instructions reduced to {} units", count, map.len());

        Ok(self.render(&map))
    }

    /// Source text of every literal, with nested units replaced by their recovered script.
    fn literal_texts(&self, bytecode: &Bytecode, ctx: &DecompilerContext) -> Vec<String> {
        let text = |(index, literal): (usize, &Literal)| self.literal_text(index, literal, ctx);

        if self.config.parallel && self.config.nested_bodies {
            bytecode.literals.par_iter().enumerate().map(text).collect()
        } else {
            bytecode.literals.iter().enumerate().map(text).collect()
        }
    }

    fn literal_text(&self, index: usize, literal: &Literal, ctx: &DecompilerContext) -> String {
        let nested = match literal.nested() {
            Some(nested) if self.config.nested_bodies => nested,
            _ => return literal_word(literal),
        };

        match self.decompile_unit(nested, ctx) {
            Ok(statements) => {
                ctx.events
                    .record(EventKind::BodyDecompiled)
                    .message(format!("literal {}", index));
                braced_script(&statements, self.config.indent_width)
            }
            Err(error) => {
                log::warn!("nested body in literal {} failed: {}", index, error);
                ctx.events
                    .record(EventKind::BodyFailed)
                    .pass("driver")
                    .message(format!("literal {}: {}", index, error));
                literal_word(literal)
            }
        }
    }

    fn render(&self, map: &CodeMap) -> Vec<String> {
        map.units()
            .filter(|unit| unit.is_command() || self.config.emit_raw_instructions)
            .map(|unit| unit.render(self.config.indent_width))
            .collect()
    }
}

/// Wraps statements in braces, one indented statement per line.
fn braced_script(statements: &[String], indent_width: usize) -> String {
    if statements.is_empty() {
        return "{}".to_string();
    }

    let indent = " ".repeat(indent_width);
    let mut script = String::from("{\n");
    for line in statements.iter().flat_map(|statement| statement.lines()) {
        if !line.is_empty() {
            script.push_str(&indent);
        }
        script.push_str(line);
        script.push('\n');
    }
    script.push('}');
    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::bytecode_with;

    #[test]
    fn end_to_end_statement() {
        // push1 0; push1 1; add; pop
        let bytecode = bytecode_with(
            vec![0x01, 0x00, 0x01, 0x01, 0x35, 0x03],
            vec![Literal::Int(5), Literal::Int(3)],
        );

        let result = Decompiler::default().decompile(&bytecode).unwrap();
        assert_eq!(result.statements, vec!["5 + 3"]);
        assert_eq!(result.to_string(), "5 + 3\n");
        assert_eq!(result.events.count_of(EventKind::ValueDiscarded), 1);
    }

    #[test]
    fn value_left_on_stack_is_bracketed() {
        let bytecode = bytecode_with(
            vec![0x01, 0x00, 0x01, 0x01, 0x35],
            vec![Literal::Int(5), Literal::Int(3)],
        );

        let result = Decompiler::default().decompile(&bytecode).unwrap();
        assert_eq!(result.statements, vec!["[5 + 3]"]);
    }

    fn proc_unit(body: Bytecode) -> Bytecode {
        // proc hello "" <body>
        bytecode_with(
            vec![
                0x01, 0x00, 0x01, 0x01, 0x01, 0x02, 0x01, 0x03, 0x06, 0x04, 0x03,
            ],
            vec![
                Literal::XString("proc".into()),
                Literal::XString("hello".into()),
                Literal::String(String::new()),
                Literal::ProcBody(Box::new(body)),
            ],
        )
    }

    #[test]
    fn nested_proc_body() {
        // puts hi; done
        let body = bytecode_with(
            vec![0x01, 0x00, 0x01, 0x01, 0x06, 0x02, 0x00],
            vec![Literal::XString("puts".into()), Literal::XString("hi".into())],
        );

        for parallel in [true, false] {
            let config = DecompilerConfig::default().with_parallel(parallel);
            let result = Decompiler::new(config).decompile(&proc_unit(body.clone())).unwrap();

            assert_eq!(result.statements, vec!["proc hello \"\" {\n    puts hi\n}"]);
            assert_eq!(result.events.count_of(EventKind::BodyDecompiled), 1);
        }
    }

    #[test]
    fn failed_body_keeps_placeholder() {
        let body = bytecode_with(vec![0xFF], Vec::new());

        let result = Decompiler::default().decompile(&proc_unit(body)).unwrap();

        assert_eq!(result.statements, vec!["proc hello \"\" Procbody"]);
        assert_eq!(result.events.count_of(EventKind::BodyFailed), 1);
    }

    #[test]
    fn nested_bodies_disabled() {
        let body = bytecode_with(vec![0x00], Vec::new());
        let config = DecompilerConfig::default().with_nested_bodies(false);

        let result = Decompiler::new(config).decompile(&proc_unit(body)).unwrap();

        assert_eq!(result.statements, vec!["proc hello \"\" Procbody"]);
        assert!(result.events.iter().all(|event| event.kind != EventKind::BodyDecompiled));
    }

    #[test]
    fn raw_instructions() {
        // jump1 +2; done (the jump never folds)
        let bytecode = bytecode_with(vec![0x22, 0x02, 0x00], Vec::new());

        let result = Decompiler::default().decompile(&bytecode).unwrap();
        assert_eq!(result.statements, vec!["0 jump1 2 # pc 2", "2 done"]);

        let quiet = Decompiler::new(DecompilerConfig::default().with_emit_raw_instructions(false));
        assert!(quiet.decompile(&bytecode).unwrap().statements.is_empty());
    }

    #[test]
    fn braced_scripts() {
        assert_eq!(braced_script(&[], 4), "{}");
        assert_eq!(
            braced_script(&["if 1 {\n    a\n}".to_string()], 2),
            "{\n  if 1 {\n      a\n  }\n}"
        );
    }
}
