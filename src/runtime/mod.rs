pub mod environment;
pub mod evaluator;
pub mod functions;

// Re-export the main public items
pub use environment::{Environment, Function};
pub use evaluator::{eval, Evaluator};
pub use functions::register_builtins;
