use crate::netlist::WireKind;
use crate::BigUint;
use thiserror::Error;

/// Errors raised while building a [Netlist](crate::Netlist).
///
/// Every fallible construction call validates its arguments before allocating anything,
/// so the netlist is left exactly as it was when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("bitwidth of \"{name}\" must be positive")]
    ZeroWidth { name: String },
    #[error("wire names cannot be empty")]
    EmptyName,
    #[error("a wire named \"{0}\" already exists")]
    DuplicateName(String),
    #[error("\"{0}\" is reserved, clock signals are implicit")]
    ReservedName(String),
    #[error("constant {value} cannot fit in {width} bits")]
    ConstantTooWide { value: BigUint, width: usize },
    #[error("malformed constant literal \"{literal}\": {reason}")]
    MalformedLiteral { literal: String, reason: &'static str },
    #[error("cannot extend \"{wire}\" from {from} to {to} bits, extension cannot drop bits")]
    ExtendNarrower { wire: String, from: usize, to: usize },
    #[error("bit {index} is out of range for \"{wire}\" of width {width}")]
    SelectOutOfRange { wire: String, index: isize, width: usize },
    #[error("selection from \"{0}\" is empty")]
    EmptySelect(String),
    #[error("concatenation needs at least one argument")]
    EmptyConcat,
    #[error("wire {0} does not belong to this netlist")]
    ForeignWire(usize),
    #[error("output \"{0}\" cannot be read inside the netlist")]
    OutputRead(String),
    #[error("{kind} \"{wire}\" cannot be assigned to")]
    AssignForbidden { wire: String, kind: WireKind },
    #[error("\"{0}\" is already driven")]
    AlreadyDriven(String),
    #[error("next value of register \"{0}\" is already bound")]
    NextAlreadyBound(String),
    #[error("\"{0}\" is not a register")]
    NotARegister(String),
    #[error(transparent)]
    Memory(#[from] MemoryError),
}

/// Errors raised by memory block accesses.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("address \"{wire}\" of memory \"{memory}\" is {found} bits, address width is {expected}")]
    AddressWidth {
        memory: String,
        wire: String,
        expected: usize,
        found: usize,
    },
    #[error("data \"{wire}\" written to memory \"{memory}\" is {found} bits, data width is {expected}")]
    DataWidth {
        memory: String,
        wire: String,
        expected: usize,
        found: usize,
    },
    #[error("write enable \"{wire}\" of memory \"{memory}\" must be 1 bit, found {found}")]
    EnableWidth {
        memory: String,
        wire: String,
        found: usize,
    },
    #[error("{argument} of memory \"{memory}\" must be a wire vector")]
    NotAWire {
        memory: String,
        argument: &'static str,
    },
    #[error("memory {0} does not belong to this netlist")]
    UnknownMemory(usize),
}

/// Errors raised while preparing or stepping a [Simulation](crate::Simulation).
///
/// A failed step commits nothing and records nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("no value supplied for input \"{0}\"")]
    MissingInput(String),
    #[error("\"{0}\" is not an input of the netlist")]
    NotAnInput(String),
    #[error("value {value} does not fit in {width} bits of \"{wire}\"")]
    ValueOutOfRange {
        wire: String,
        value: BigUint,
        width: usize,
    },
    #[error("\"{0}\" is never driven")]
    Undriven(String),
    #[error("combinational loop through \"{0}\"")]
    CombinationalLoop(String),
    #[error("memory \"{memory}\" accessed out of range at address {address}")]
    MemoryOutOfRange { memory: String, address: BigUint },
    #[error("\"{0}\" has not been simulated yet")]
    NotSimulated(String),
    #[error("wire {0} does not belong to the simulated netlist")]
    ForeignWire(usize),
    #[error("no wire named \"{0}\"")]
    UnknownWire(String),
    #[error("\"{0}\" is not a register")]
    NotARegister(String),
    #[error(transparent)]
    Memory(#[from] MemoryError),
}
