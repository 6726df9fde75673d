//! Runs generated SQL against the active database and renders the result.

mod executor;
mod render;

pub use executor::{execute, ExecutionOutcome};
pub use render::render_table;
