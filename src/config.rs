/// Default bound on expression nesting, shared by parser and evaluator.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Environment variable the command-line front end reads the depth limit from.
pub const MAX_DEPTH_ENV: &str = "FORMULA_MAX_DEPTH";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Deepest parenthesis/call/unary nesting the parser and evaluator
    /// accept. Flat operator chains do not count. Exceeding it yields
    /// `Error::NestingTooDeep` rather than exhausting the stack.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }
}

impl Config {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
