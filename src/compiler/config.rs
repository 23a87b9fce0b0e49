//! Settings of a decompilation run.

use crate::expr::DEFAULT_INDENT_WIDTH;

/// Switches and limits for the reduction pipeline and the driver.
///
/// # Examples
///
/// ```rust
/// use tclscope::DecompilerConfig;
///
/// let config = DecompilerConfig::default()
///     .with_parallel(false)
///     .with_indent_width(2);
///
/// assert!(config.recover_catch);
/// assert_eq!(config.structural_rounds, 1);
/// assert_eq!(config.indent_width, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompilerConfig {
    /// Turn `beginCatch4` / `endCatch` spans into `catch` commands.
    pub recover_catch: bool,
    /// Absorb short-circuit branch triples into their test command.
    pub recover_short_circuit: bool,
    /// How often the structural passes run after the initial folding.
    pub structural_rounds: usize,
    /// Upper bound on folding sweeps per fixed-point run.
    pub max_fold_iterations: usize,
    /// Decompile procedure bodies and precompiled scripts found in the literal pool.
    pub nested_bodies: bool,
    /// Decompile nested bodies on the rayon thread pool.
    pub parallel: bool,
    /// Render instructions that could not be reduced as disassembly lines.
    pub emit_raw_instructions: bool,
    /// Spaces per nesting level of rendered bodies.
    pub indent_width: usize,
}

impl Default for DecompilerConfig {
    fn default() -> Self {
        DecompilerConfig {
            recover_catch: true,
            recover_short_circuit: true,
            structural_rounds: 1,
            max_fold_iterations: usize::MAX,
            nested_bodies: true,
            parallel: true,
            emit_raw_instructions: true,
            indent_width: DEFAULT_INDENT_WIDTH,
        }
    }
}

impl DecompilerConfig {
    /// Enables or disables catch recovery.
    #[must_use]
    pub fn with_recover_catch(mut self, enabled: bool) -> Self {
        self.recover_catch = enabled;
        self
    }

    /// Enables or disables short-circuit recovery.
    #[must_use]
    pub fn with_recover_short_circuit(mut self, enabled: bool) -> Self {
        self.recover_short_circuit = enabled;
        self
    }

    /// Sets the number of structural rounds.
    #[must_use]
    pub fn with_structural_rounds(mut self, rounds: usize) -> Self {
        self.structural_rounds = rounds;
        self
    }

    /// Sets the folding sweep limit.
    #[must_use]
    pub fn with_max_fold_iterations(mut self, limit: usize) -> Self {
        self.max_fold_iterations = limit;
        self
    }

    /// Enables or disables decompilation of nested bodies.
    #[must_use]
    pub fn with_nested_bodies(mut self, enabled: bool) -> Self {
        self.nested_bodies = enabled;
        self
    }

    /// Enables or disables parallel decompilation of nested bodies.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Enables or disables output of unreduced instructions.
    #[must_use]
    pub fn with_emit_raw_instructions(mut self, enabled: bool) -> Self {
        self.emit_raw_instructions = enabled;
        self
    }

    /// Sets the indentation width.
    #[must_use]
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }
}
