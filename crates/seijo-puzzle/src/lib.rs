pub mod builder;
pub mod multi_term;
pub mod puzzle;
pub mod random;
pub mod tokenize;

pub use builder::{build_puzzle, PuzzleBuilder, PuzzleConfig};
pub use puzzle::*;
pub use random::{RandomSource, RngSource, ScriptedSource};
