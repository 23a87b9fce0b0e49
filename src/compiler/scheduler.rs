//! Pass scheduler for the reduction pipeline.
//!
//! The `PassScheduler` runs expression folding to a fixed point and then the structural
//! passes in registration order. Every structural pass re-folds after each of its own
//! rewrites, so the scheduler itself never has to re-run folding between them.

use crate::{
    code::CodeMap,
    compiler::{
        pass::ReductionPass,
        passes::{CatchRecovery, ExpressionFolding, ShortCircuitRecovery},
        DecompilerConfig, DecompilerContext,
    },
    Result,
};

/// Orchestrates the reduction passes over one code map.
///
/// The pipeline is:
///
/// 1. **Folding**: [`ExpressionFolding`] until no instruction is foldable
/// 2. **Structure**: every structural pass once, in order
///
/// Step 2 repeats up to `structural_rounds` times and stops early once a round changes
/// nothing.
pub struct PassScheduler {
    /// Number of structural rounds.
    structural_rounds: usize,
    /// Folding pass, run first.
    pub folding: ExpressionFolding,
    /// Structural passes in execution order.
    pub structural: Vec<Box<dyn ReductionPass>>,
}

impl Default for PassScheduler {
    fn default() -> Self {
        Self::from_config(&DecompilerConfig::default())
    }
}

impl PassScheduler {
    /// Creates a scheduler without structural passes.
    ///
    /// # Arguments
    ///
    /// * `structural_rounds` - Maximum number of structural rounds.
    /// * `max_fold_iterations` - Sweep limit of every folding run.
    #[must_use]
    pub fn new(structural_rounds: usize, max_fold_iterations: usize) -> Self {
        Self {
            structural_rounds,
            folding: ExpressionFolding::new(max_fold_iterations),
            structural: Vec::new(),
        }
    }

    /// Creates a scheduler with the structural passes enabled in `config`.
    #[must_use]
    pub fn from_config(config: &DecompilerConfig) -> Self {
        let mut scheduler = Self::new(config.structural_rounds, config.max_fold_iterations);
        let folding = scheduler.folding;

        if config.recover_catch {
            scheduler.add(CatchRecovery::new(folding));
        }
        if config.recover_short_circuit {
            scheduler.add(ShortCircuitRecovery::new(folding));
        }

        scheduler
    }

    /// Appends a structural pass.
    pub fn add(&mut self, pass: impl ReductionPass + 'static) {
        self.structural.push(Box::new(pass));
    }

    /// Runs the complete pipeline on `map`.
    ///
    /// # Returns
    ///
    /// The number of structural rounds executed. Events are accumulated in `ctx.events`.
    ///
    /// # Errors
    ///
    /// Returns an error if any pass breaks a map invariant.
    pub fn run_pipeline(&self, map: &mut CodeMap, ctx: &DecompilerContext) -> Result<usize> {
        self.folding.fold_to_fixpoint(map, ctx)?;

        let mut rounds = 0;
        for round in 0..self.structural_rounds {
            if self.structural.is_empty() {
                break;
            }
            rounds = round + 1;

            let mut round_changed = false;
            for pass in &self.structural {
                if pass.run(map, ctx)? {
                    log::debug!("{} changed the map in round {}", pass.name(), rounds);
                    round_changed = true;
                }
            }

            if !round_changed {
                break;
            }
        }

        Ok(rounds)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::{
        code::CodeMap,
        compiler::{
            pass::ReductionPass, DecompilerConfig, DecompilerContext, EventKind, PassScheduler,
        },
        disassembler::Opcode,
        test::{instr, lit, reduce_units},
        Result,
    };

    struct TestPass {
        name: &'static str,
        changes_to_make: usize,
        runs: AtomicUsize,
    }

    impl TestPass {
        fn new(name: &'static str, changes: usize) -> Self {
            Self {
                name,
                changes_to_make: changes,
                runs: AtomicUsize::new(0),
            }
        }
    }

    impl ReductionPass for TestPass {
        fn name(&self) -> &'static str {
            self.name
        }

        fn run(&self, _map: &mut CodeMap, ctx: &DecompilerContext) -> Result<bool> {
            let run = self.runs.fetch_add(1, Ordering::Relaxed);
            let changed = run < self.changes_to_make;
            if changed {
                ctx.events
                    .record(EventKind::CatchRecovered)
                    .pass(self.name)
                    .message("test");
            }
            Ok(changed)
        }
    }

    #[test]
    fn test_default_scheduler() {
        let scheduler = PassScheduler::default();
        assert_eq!(scheduler.structural_rounds, 1);
        let names: Vec<_> = scheduler.structural.iter().map(|pass| pass.name()).collect();
        assert_eq!(names, vec!["catch-recovery", "short-circuit-recovery"]);
    }

    #[test]
    fn test_config_disables_passes() {
        let config = DecompilerConfig::default()
            .with_recover_catch(false)
            .with_structural_rounds(3);
        let scheduler = PassScheduler::from_config(&config);

        assert_eq!(scheduler.structural_rounds, 3);
        assert_eq!(scheduler.structural.len(), 1);
        assert_eq!(scheduler.structural[0].name(), "short-circuit-recovery");
    }

    #[test]
    fn test_rounds_stop_when_stable() {
        let mut scheduler = PassScheduler::new(5, usize::MAX);
        scheduler.add(TestPass::new("pass1", 2));

        let ctx = DecompilerContext::default();
        let mut map = CodeMap::default();
        let rounds = scheduler.run_pipeline(&mut map, &ctx).unwrap();

        // Two changing rounds and one stable round
        assert_eq!(rounds, 3);
        assert_eq!(ctx.events.count_of(EventKind::CatchRecovered), 2);
    }

    #[test]
    fn test_round_limit() {
        let mut scheduler = PassScheduler::new(1, usize::MAX);
        scheduler.add(TestPass::new("pass1", 10));

        let ctx = DecompilerContext::default();
        let rounds = scheduler
            .run_pipeline(&mut CodeMap::default(), &ctx)
            .unwrap();

        assert_eq!(rounds, 1);
        assert_eq!(ctx.events.count(), 1);
    }

    #[test]
    fn test_folds_before_structure() {
        let map = reduce_units(
            vec![
                instr(0, Opcode::Push1, vec![lit("5")]),
                instr(2, Opcode::Push1, vec![lit("3")]),
                instr(4, Opcode::Add, vec![]),
                instr(5, Opcode::Pop, vec![]),
            ],
            |map, ctx| {
                PassScheduler::default().run_pipeline(map, ctx)?;
                Ok(())
            },
        );

        assert_eq!(map.len(), 1);
        let rendered: Vec<String> = map.units().map(|unit| unit.render(4)).collect();
        assert_eq!(rendered, vec!["5 + 3"]);
    }
}
