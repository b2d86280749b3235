mod engine;
mod schedule;
mod trace;
pub use engine::*;
pub use trace::*;
