mod handles;
mod literal;
mod memory;
mod netlist_builder;
mod node;
mod operations;
pub mod working;
pub use handles::*;
pub use literal::*;
pub use memory::*;
pub use netlist_builder::*;
pub use node::*;
