//! Expression folding pass.
//!
//! Folds an instruction together with the commands that produced its operands into a single
//! command. An instruction consuming *k* stack values is foldable when the *k* units directly
//! before it are all commands:
//!
//! ```text
//! push1 "5"      ─┐
//! push1 "3"       ├─>  Command(5 + 3)
//! add            ─┘
//! ```
//!
//! `pop`, `done` and `tryCvtToNumeric` only consume a value; they are absorbed into the
//! preceding command without changing its expression. Branches, jump tables, loop and catch
//! markers and everything else without a source template are left for the structural passes.
//!
//! One sweep collects every foldable instruction. Their operand runs never overlap, so all of
//! them are merged before the next sweep starts. Sweeps repeat until nothing is foldable.

use crate::{
    code::{CodeMap, CodeRange, CodeUnit, Command},
    compiler::{pass::ReductionPass, DecompilerContext, EventKind},
    disassembler::{Instruction, Opcode, Operand},
    expr::{Expr, Operator},
    Result,
};

/// Folds instructions and their operand commands into commands, to a fixed point.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionFolding {
    max_iterations: usize,
}

impl Default for ExpressionFolding {
    fn default() -> Self {
        Self::new(usize::MAX)
    }
}

/// A foldable instruction found by a sweep.
struct Candidate {
    /// Span of the operands and the instruction
    range: CodeRange,
    /// Location of the folded instruction
    location: u32,
    kind: EventKind,
    expr: Expr,
    name: &'static str,
}

impl ExpressionFolding {
    /// Creates the pass with an upper bound on sweeps per run.
    #[must_use]
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    /// Sweeps until no instruction is foldable or the sweep limit is hit.
    ///
    /// # Errors
    ///
    /// Returns an error if a merge violates the map's invariants.
    pub fn fold_to_fixpoint(&self, map: &mut CodeMap, ctx: &DecompilerContext) -> Result<bool> {
        let mut changed = false;

        for _ in 0..self.max_iterations {
            let candidates = Self::find_candidates(map);
            if candidates.is_empty() {
                return Ok(changed);
            }

            Self::apply(map, ctx, candidates)?;
            changed = true;
        }

        if !Self::find_candidates(map).is_empty() {
            log::warn!(
                "expression folding stopped after {} sweeps",
                self.max_iterations
            );
            ctx.events
                .record(EventKind::IterationLimit)
                .pass(self.name())
                .message(format!("{} sweeps", self.max_iterations));
        }

        Ok(changed)
    }

    fn apply(map: &mut CodeMap, ctx: &DecompilerContext, candidates: Vec<Candidate>) -> Result<()> {
        for candidate in candidates {
            let Candidate {
                range,
                location,
                kind,
                expr,
                name,
            } = candidate;

            map.merge_with(range, move |_| Ok(expr))?;
            ctx.events
                .record(kind)
                .at(location)
                .pass("expression-folding")
                .message(name);
        }

        Ok(())
    }

    fn find_candidates(map: &CodeMap) -> Vec<Candidate> {
        let units: Vec<&CodeUnit> = map.units().collect();
        let mut candidates = Vec::new();

        for (index, unit) in units.iter().enumerate() {
            let CodeUnit::Instruction(instruction) = unit else {
                continue;
            };
            let Ok(argc) = usize::try_from(instruction.argc()) else {
                continue;
            };
            if argc > index {
                continue;
            }

            let operands = &units[index - argc..index];
            let Some(args) = operands
                .iter()
                .map(|unit| unit.as_command())
                .collect::<Option<Vec<&Command>>>()
            else {
                continue;
            };
            if !is_contiguous(&units[index - argc..=index]) {
                continue;
            }

            if discards_value(instruction.opcode) {
                let Some(CodeUnit::Command(previous)) = index.checked_sub(1).map(|i| units[i])
                else {
                    continue;
                };
                if previous.range().end() != instruction.location {
                    continue;
                }

                candidates.push(Candidate {
                    range: CodeRange::new(
                        previous.range().start,
                        instruction.end() - previous.range().start,
                    ),
                    location: instruction.location,
                    kind: EventKind::ValueDiscarded,
                    expr: previous.expr().clone(),
                    name: instruction.name(),
                });
                continue;
            }

            let Some(expr) = fold(instruction, &args) else {
                continue;
            };
            let start = args
                .first()
                .map_or(instruction.location, |first| first.range().start);

            candidates.push(Candidate {
                range: CodeRange::new(start, instruction.end() - start),
                location: instruction.location,
                kind: EventKind::ExpressionFolded,
                expr,
                name: instruction.name(),
            });
        }

        candidates
    }
}

impl ReductionPass for ExpressionFolding {
    fn name(&self) -> &'static str {
        "expression-folding"
    }

    fn description(&self) -> &'static str {
        "Fold instructions and their operand commands into source commands"
    }

    fn run(&self, map: &mut CodeMap, ctx: &DecompilerContext) -> Result<bool> {
        self.fold_to_fixpoint(map, ctx)
    }
}

fn is_contiguous(units: &[&CodeUnit]) -> bool {
    units
        .windows(2)
        .all(|pair| pair[0].end() == pair[1].location())
}

fn discards_value(opcode: Opcode) -> bool {
    matches!(opcode, Opcode::Pop | Opcode::Done | Opcode::TryCvtToNumeric)
}

fn command(name: &str, args: impl IntoIterator<Item = Expr>) -> Expr {
    let mut words = vec![Expr::literal(name)];
    words.extend(args);
    Expr::words(words)
}

fn local(instruction: &Instruction) -> Option<Expr> {
    instruction.operands.iter().find_map(|operand| match operand {
        Operand::Local { name, .. } => Some(Expr::word(name)),
        _ => None,
    })
}

fn immediate(instruction: &Instruction) -> Option<Expr> {
    instruction.operands.iter().find_map(|operand| match operand {
        Operand::Int(value) => Some(Expr::literal(value.to_string())),
        _ => None,
    })
}

/// Builds the source form of `instruction` applied to the expressions of `args`.
///
/// Returns `None` for opcodes without a source template.
fn fold(instruction: &Instruction, args: &[&Command]) -> Option<Expr> {
    let a: Vec<Expr> = args.iter().map(|arg| arg.operand()).collect();
    let arg = |index: usize| a.get(index).cloned();

    let expr = match instruction.opcode {
        Opcode::Push1 | Opcode::Push4 => match instruction.operands.first()? {
            Operand::Literal { text, .. } => Expr::literal(text.as_str()),
            _ => return None,
        },

        Opcode::LoadScalar1 | Opcode::LoadScalar4 => Expr::var(local(instruction)?),
        Opcode::LoadArray1 | Opcode::LoadArray4 => {
            Expr::var(Expr::array(local(instruction)?, arg(0)?))
        }
        Opcode::LoadArrayStk => Expr::var(Expr::array(arg(0)?, arg(1)?)),
        Opcode::LoadStk => Expr::var(arg(0)?),
        Opcode::LoadScalarStk => command("set", [arg(0)?]),

        Opcode::StoreScalar1 | Opcode::StoreScalar4 => {
            command("set", [local(instruction)?, arg(0)?])
        }
        Opcode::StoreScalarStk | Opcode::StoreStk => command("set", a),
        Opcode::StoreArray1 | Opcode::StoreArray4 => command(
            "set",
            [Expr::array(local(instruction)?, arg(0)?), arg(1)?],
        ),
        Opcode::StoreArrayStk => command("set", [Expr::array(arg(0)?, arg(1)?), arg(2)?]),

        Opcode::Lor
        | Opcode::Land
        | Opcode::Bitor
        | Opcode::Bitxor
        | Opcode::Bitand
        | Opcode::Eq
        | Opcode::Neq
        | Opcode::Lt
        | Opcode::Gt
        | Opcode::Le
        | Opcode::Ge
        | Opcode::Lshift
        | Opcode::Rshift
        | Opcode::Add
        | Opcode::Sub
        | Opcode::Mult
        | Opcode::Div
        | Opcode::Mod
        | Opcode::Expon => Expr::op(
            Operator::from_opcode(instruction.opcode)?,
            vec![arg(0)?, arg(1)?],
        ),
        Opcode::Uplus | Opcode::Uminus | Opcode::Bitnot | Opcode::Not => {
            Expr::op(Operator::from_opcode(instruction.opcode)?, vec![arg(0)?])
        }

        Opcode::InvokeStk1 | Opcode::InvokeStk4 => Expr::words(a),
        Opcode::CallBuiltinFunc1 => match instruction.operands.first()? {
            Operand::MathFunction(function) => command(&function.to_string(), a),
            _ => return None,
        },
        Opcode::StrCat => Expr::quoted(Expr::concat(
            "",
            a.into_iter().map(Expr::unbraced).collect(),
        )),
        Opcode::ExprStk => command("expr", [Expr::body(vec![arg(0)?.unbraced()])]),
        Opcode::Break => Expr::literal("break"),
        Opcode::Continue => Expr::literal("continue"),

        Opcode::StrEq => command("string equal", a),
        Opcode::StrNeq => command("!string equal", a),
        Opcode::StrCmp => command("string compare", a),
        Opcode::StrLen => command("string length", a),
        Opcode::StrIndex => command("string index", a),
        Opcode::StrMatch => {
            let nocase = instruction
                .operands
                .first()
                .and_then(Operand::as_int)
                .is_some_and(|flag| flag != 0);
            if nocase {
                command("string match -nocase", a)
            } else {
                command("string match", a)
            }
        }
        Opcode::StrTrim => command("string trim", a),
        Opcode::StrTrimLeft => command("string trimleft", a),
        Opcode::StrTrimRight => command("string trimright", a),
        Opcode::StrUpper => command("string toupper", a),
        Opcode::StrLower => command("string tolower", a),
        Opcode::StrTitle => command("string totitle", a),
        Opcode::StrReplace => command("string replace", a),
        Opcode::StrClass => match instruction.operands.first()? {
            Operand::StringClass(class) => command(&format!("string is {}", class), a),
            _ => return None,
        },

        Opcode::List => command("list", a),
        Opcode::ListIndex => command("lindex", a),
        Opcode::ListLength => command("llength", a),

        Opcode::AppendScalar1 | Opcode::AppendScalar4 => {
            command("append", [local(instruction)?, arg(0)?])
        }
        Opcode::AppendArray1 | Opcode::AppendArray4 => command(
            "append",
            [Expr::array(local(instruction)?, arg(0)?), arg(1)?],
        ),
        Opcode::AppendArrayStk => {
            command("append", [Expr::array(arg(0)?, arg(1)?), arg(2)?])
        }
        Opcode::AppendStk => command("append", a),

        Opcode::LappendScalar1 | Opcode::LappendScalar4 => {
            command("lappend", [local(instruction)?, arg(0)?])
        }
        Opcode::LappendArray1 | Opcode::LappendArray4 => command(
            "lappend",
            [Expr::array(local(instruction)?, arg(0)?), arg(1)?],
        ),
        Opcode::LappendArrayStk => {
            command("lappend", [Expr::array(arg(0)?, arg(1)?), arg(2)?])
        }
        Opcode::LappendStk | Opcode::LappendListStk => command("lappend", a),
        Opcode::LappendList => command("lappend", [local(instruction)?, Expr::words(a)]),
        Opcode::LappendListArray => command(
            "lappend",
            [
                Expr::array(local(instruction)?, arg(0)?),
                Expr::words(a.get(1..)?.to_vec()),
            ],
        ),
        Opcode::LappendListArrayStk => command(
            "lappend",
            [
                Expr::array(arg(0)?, arg(1)?),
                Expr::words(a.get(2..)?.to_vec()),
            ],
        ),

        Opcode::IncrScalar1Imm => command("incr", [local(instruction)?, immediate(instruction)?]),
        Opcode::IncrScalarStkImm | Opcode::IncrStkImm => {
            command("incr", [arg(0)?, immediate(instruction)?])
        }
        Opcode::IncrScalar1 => command("incr", [local(instruction)?, arg(0)?]),
        Opcode::IncrScalarStk | Opcode::IncrStk => command("incr", [arg(0)?, arg(1)?]),
        Opcode::IncrArray1Imm => command(
            "incr",
            [
                Expr::array(local(instruction)?, arg(0)?),
                immediate(instruction)?,
            ],
        ),
        Opcode::IncrArrayStkImm => command(
            "incr",
            [Expr::array(arg(0)?, arg(1)?), immediate(instruction)?],
        ),
        Opcode::IncrArray1 => command(
            "incr",
            [Expr::array(local(instruction)?, arg(0)?), arg(1)?],
        ),
        Opcode::IncrArrayStk => command("incr", [Expr::array(arg(0)?, arg(1)?), arg(2)?]),

        // Absorbed into the preceding command by the caller
        Opcode::Pop | Opcode::Done | Opcode::TryCvtToNumeric => return None,

        Opcode::Dup
        | Opcode::EvalStk
        | Opcode::Jump1
        | Opcode::Jump4
        | Opcode::JumpTrue1
        | Opcode::JumpTrue4
        | Opcode::JumpFalse1
        | Opcode::JumpFalse4
        | Opcode::CallFunc1
        | Opcode::ForeachStart4
        | Opcode::ForeachStep4
        | Opcode::BeginCatch4
        | Opcode::EndCatch
        | Opcode::PushResult
        | Opcode::PushReturnCode
        | Opcode::LindexMulti
        | Opcode::Over
        | Opcode::LsetList
        | Opcode::LsetFlat
        | Opcode::ReturnImm
        | Opcode::ExpandStart
        | Opcode::ExpandStkTop
        | Opcode::InvokeExpanded
        | Opcode::ListIndexImm
        | Opcode::ListRangeImm
        | Opcode::StartCommand
        | Opcode::ListIn
        | Opcode::ListNotIn
        | Opcode::PushReturnOpts
        | Opcode::ReturnStk
        | Opcode::DictGet
        | Opcode::DictSet
        | Opcode::DictUnset
        | Opcode::DictIncrImm
        | Opcode::DictAppend
        | Opcode::DictLappend
        | Opcode::DictFirst
        | Opcode::DictNext
        | Opcode::DictDone
        | Opcode::DictUpdateStart
        | Opcode::DictUpdateEnd
        | Opcode::JumpTable
        | Opcode::Upvar
        | Opcode::Nsupvar
        | Opcode::Variable
        | Opcode::Syntax
        | Opcode::Reverse
        | Opcode::Regexp
        | Opcode::ExistScalar
        | Opcode::ExistArray
        | Opcode::ExistArrayStk
        | Opcode::ExistStk
        | Opcode::Nop
        | Opcode::ReturnCodeBranch
        | Opcode::UnsetScalar
        | Opcode::UnsetArray
        | Opcode::UnsetArrayStk
        | Opcode::UnsetStk
        | Opcode::DictExpand
        | Opcode::DictRecombineStk
        | Opcode::DictRecombineImm
        | Opcode::DictExists
        | Opcode::VerifyDict
        | Opcode::StrMap
        | Opcode::StrFind
        | Opcode::StrRfind
        | Opcode::StrRangeImm
        | Opcode::StrRange
        | Opcode::Yield
        | Opcode::CoroName
        | Opcode::Tailcall
        | Opcode::CurrentNamespace
        | Opcode::InfoLevelNumber
        | Opcode::InfoLevelArgs
        | Opcode::ResolveCmd
        | Opcode::TclooSelf
        | Opcode::TclooClass
        | Opcode::TclooNamespace
        | Opcode::TclooIsObject
        | Opcode::ArrayExistsStk
        | Opcode::ArrayExistsImm
        | Opcode::ArrayMakeStk
        | Opcode::ArrayMakeImm
        | Opcode::InvokeReplace
        | Opcode::ListConcat
        | Opcode::ExpandDrop
        | Opcode::ForeachStart
        | Opcode::ForeachStep
        | Opcode::ForeachEnd
        | Opcode::LmapCollect
        | Opcode::ConcatStk
        | Opcode::OriginCmd
        | Opcode::TclooNext
        | Opcode::TclooNextClass
        | Opcode::YieldToInvoke
        | Opcode::NumericType
        | Opcode::TryCvtToBoolean
        | Opcode::ClockRead => return None,
    };

    Some(expr)
}
