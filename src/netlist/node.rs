use super::WireVector;
use smallvec::SmallVec;
use strum_macros::Display;

/// Operation performed by a [LogicNode].
///
/// Displays as the short symbol used when printing a netlist.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum Op {
    #[strum(serialize = "&")]
    And,
    #[strum(serialize = "|")]
    Or,
    #[strum(serialize = "^")]
    Xor,
    #[strum(serialize = "~")]
    Not,
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "s")]
    Select,
    #[strum(serialize = "c")]
    Concat,
    #[strum(serialize = "w")]
    Connect,
    #[strum(serialize = "r")]
    Register,
    #[strum(serialize = "m")]
    Memory,
}
use Op::*;

impl Op {
    /// Returns the width of the wire produced by the operation from the widths of its arguments.
    ///
    /// Binary operations expect both arguments to have been extended to the same width already.
    ///
    /// # Panics
    ///
    /// Panics if `self` is Select or Memory, their result widths come from their parameters.
    pub fn result_width(&self, widths: &[usize]) -> usize {
        match self {
            And | Or | Xor => widths.iter().copied().max().unwrap_or(0),
            Add | Sub => widths.iter().copied().max().unwrap_or(0) + 1,
            Mul | Concat => widths.iter().sum(),
            Not | Connect | Register => widths[0],
            Select | Memory => unreachable!("{} width depends on its parameter", self),
        }
    }

    /// Returns true for the operations taking exactly two arguments of equal width.
    pub fn is_binary(&self) -> bool {
        matches!(self, And | Or | Xor | Add | Sub | Mul)
    }
}

/// Per operation parameter of a [LogicNode].
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum OpParam {
    None,
    /// Bit positions gathered by a Select node, in result order.
    Select(SmallVec<[usize; 8]>),
    /// Identity and port counts of the memory block a Memory node stands for.
    Memory {
        id: usize,
        reads: usize,
        writes: usize,
    },
}

/// Immutable record of one operation in a netlist, connecting its argument wires to the
/// wires it drives.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct LogicNode {
    pub(crate) op: Op,
    pub(crate) param: OpParam,
    pub(crate) args: SmallVec<[WireVector; 2]>,
    pub(crate) dests: SmallVec<[WireVector; 1]>,
}

impl LogicNode {
    pub(crate) fn new(
        op: Op,
        param: OpParam,
        args: SmallVec<[WireVector; 2]>,
        dests: SmallVec<[WireVector; 1]>,
    ) -> Self {
        Self {
            op,
            param,
            args,
            dests,
        }
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn param(&self) -> &OpParam {
        &self.param
    }

    /// Returns the wires read by the node.
    ///
    /// Memory nodes list every read address followed by `(address, data, enable)` for every
    /// write port.
    pub fn args(&self) -> &[WireVector] {
        &self.args
    }

    /// Returns the wires driven by the node.
    pub fn dests(&self) -> &[WireVector] {
        &self.dests
    }
}
