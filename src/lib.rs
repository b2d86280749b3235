//! Netlist construction and cycle based simulation of synchronous digital hardware.
//!
//! A design is built by creating wire vectors in a [Netlist] and combining them with its
//! operations, every operation records one [LogicNode]. A [Simulation] then evaluates the
//! netlist one clock cycle at a time and records a [SimulationTrace].
pub mod data_structures;
mod error;
pub mod netlist;
pub mod simulation;
pub use error::*;
pub use netlist::*;
pub use num_bigint::BigUint;
pub use simulation::*;
