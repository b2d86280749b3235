use super::ConstLiteral;
use crate::BigUint;
use auto_from::From;
use strum_macros::Display;

/// The role a [WireVector] plays in a [Netlist](super::Netlist).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
pub enum WireKind {
    /// Plain wire, driven by exactly one logic node.
    #[strum(serialize = "wire")]
    Wire,
    /// Driven externally on every simulated cycle.
    #[strum(serialize = "input")]
    Input,
    /// Exposed by the design, never read inside it.
    #[strum(serialize = "output")]
    Output,
    /// Holds the value latched at the end of the previous cycle.
    #[strum(serialize = "register")]
    Register,
    /// Fixed unsigned value.
    #[strum(serialize = "constant")]
    Const,
}

impl WireKind {
    /// Returns true if wires of this kind get their value without evaluating any logic node
    /// during a cycle.
    pub fn is_root(&self) -> bool {
        matches!(self, WireKind::Input | WireKind::Const | WireKind::Register)
    }

    /// Returns the single letter used when printing wires, e.g. `a/1I`.
    pub fn letter(&self) -> char {
        match self {
            WireKind::Wire => 'W',
            WireKind::Input => 'I',
            WireKind::Output => 'O',
            WireKind::Register => 'R',
            WireKind::Const => 'C',
        }
    }
}

/// Handle to a fixed width vector of wires stored in a [Netlist](super::Netlist).
///
/// Handles are cheap to copy, all the information about the wire lives in the netlist that
/// created it. Using a handle with a different netlist is an error.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct WireVector {
    pub(crate) netlist: usize,
    pub(crate) idx: usize,
    pub(crate) width: usize,
    pub(crate) kind: WireKind,
    pub(crate) signed: bool,
}

impl WireVector {
    /// Returns the number of bits in the wire vector.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn kind(&self) -> WireKind {
        self.kind
    }

    /// Returns true if the wire vector is sign extended when widened.
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Returns the position of the wire vector in [Netlist::wires](super::Netlist::wires).
    pub fn index(&self) -> usize {
        self.idx
    }
}

/// Handle to a [MemBlock](super::MemBlock) stored in a [Netlist](super::Netlist).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct MemoryHandle {
    pub(crate) netlist: usize,
    pub(crate) idx: usize,
}

/// Raw unsigned value used where a wire is expected, it becomes a constant wire
/// as soon as an operation receives it.
///
/// Without an explicit width, the narrowest width that holds the value is used.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Literal {
    pub(crate) value: BigUint,
    pub(crate) width: Option<usize>,
}

impl Literal {
    pub fn new<V: Into<BigUint>>(value: V) -> Self {
        Self {
            value: value.into(),
            width: None,
        }
    }

    /// Returns a [Literal] with an explicit width, checked when it is turned into a wire.
    pub fn sized<V: Into<BigUint>>(value: V, width: usize) -> Self {
        Self {
            value: value.into(),
            width: Some(width),
        }
    }
}

/// Anything an operation accepts as an argument: a wire or a raw value.
#[derive(From, Clone, Debug, Eq, PartialEq)]
pub enum Operand {
    Wire(WireVector),
    Literal(Literal),
}

impl From<&WireVector> for Operand {
    fn from(w: &WireVector) -> Self {
        Operand::Wire(*w)
    }
}

impl From<ConstLiteral> for Operand {
    fn from(l: ConstLiteral) -> Self {
        Operand::Literal(l.into())
    }
}

macro_rules! literal_from {
    ($ty:ty,$($rest:ty),*) => {
        literal_from!($ty);
        literal_from!($($rest),*);
    };
    ($ty:ty) => {
        impl From<$ty> for Literal {
            fn from(v: $ty) -> Self {
                Literal::new(v)
            }
        }
        impl From<$ty> for Operand {
            fn from(v: $ty) -> Self {
                Operand::Literal(Literal::new(v))
            }
        }
    };
}
literal_from!(u8, u16, u32, u64, u128, usize, BigUint);

/// Data written through a memory write port together with its 1 bit enable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DataWithEnable {
    pub data: Operand,
    pub enable: Operand,
}

impl DataWithEnable {
    pub fn new<D: Into<Operand>, E: Into<Operand>>(data: D, enable: E) -> Self {
        Self {
            data: data.into(),
            enable: enable.into(),
        }
    }
}

/// Argument of [Netlist::write_memory](super::Netlist::write_memory).
///
/// Plain data is written on every cycle.
#[derive(From, Clone, Debug, Eq, PartialEq)]
pub enum WriteData {
    Always(Operand),
    Enabled(DataWithEnable),
}

impl From<WireVector> for WriteData {
    fn from(w: WireVector) -> Self {
        WriteData::Always(w.into())
    }
}
