use super::handles::*;
use super::node::*;
use super::Netlist;
use crate::BuildError;
use casey::pascal;
use smallvec::{smallvec, SmallVec};
use std::ops::{Bound, RangeBounds};

use Op::*;

/// Creates a constructor for every binary operation.
///
/// The operands are normalized to wires and the narrower one is extended to the width of the
/// wider one with its own extension rule before the node is built.
macro_rules! binary_ops {
    ($name:ident,$($rest:ident),*) => {
        binary_ops!($name);
        binary_ops!($($rest),*);
    };
    ($name:ident) => {
        /// Returns a new wire driven by the operation applied to `a` and `b`.
        ///
        /// See [Op::result_width] for the width of the result.
        pub fn $name<A: Into<Operand>, B: Into<Operand>>(&mut self, a: A, b: B) -> Result<WireVector, BuildError> {
            self.binary(pascal!($name), a.into(), b.into())
        }
    };
}

impl Netlist {
    // Create and, or, xor, add, sub and mul.
    binary_ops!(and, or, xor, add, sub, mul);

    fn binary(&mut self, op: Op, a: Operand, b: Operand) -> Result<WireVector, BuildError> {
        debug_assert!(op.is_binary(), "{} is not a binary operation", op);
        self.check_operand(&a)?;
        self.check_operand(&b)?;
        let a = self.materialize(a);
        let b = self.materialize(b);

        let width = std::cmp::max(a.width, b.width);
        let a = self.extend_with(a, width, a.signed);
        let b = self.extend_with(b, width, b.signed);

        let dest = self.alloc_temp(op.result_width(&[a.width, b.width]), false);
        self.add_node(LogicNode::new(op, OpParam::None, smallvec![a, b], smallvec![dest]));
        Ok(dest)
    }

    /// Returns a new wire driven by the bitwise negation of `a`.
    pub fn not<A: Into<Operand>>(&mut self, a: A) -> Result<WireVector, BuildError> {
        let a = a.into();
        self.check_operand(&a)?;
        let a = self.materialize(a);
        let dest = self.alloc_temp(a.width, false);
        self.add_node(LogicNode::new(Not, OpParam::None, smallvec![a], smallvec![dest]));
        Ok(dest)
    }

    /// Returns a new wire made of the bits of `wire` at `positions`, in order.
    ///
    /// Bit 0 is the least significant bit, negative positions count from the most significant
    /// end so -1 is the top bit. Positions may repeat.
    pub fn select(&mut self, wire: WireVector, positions: &[isize]) -> Result<WireVector, BuildError> {
        self.check_readable(wire)?;
        if positions.is_empty() {
            return Err(BuildError::EmptySelect(self.wires[wire.idx].name.clone()));
        }
        let width = wire.width as isize;
        let mut resolved = SmallVec::with_capacity(positions.len());
        for &position in positions {
            let bit = if position < 0 { width + position } else { position };
            if bit < 0 || bit >= width {
                return Err(BuildError::SelectOutOfRange {
                    wire: self.wires[wire.idx].name.clone(),
                    index: position,
                    width: wire.width,
                });
            }
            resolved.push(bit as usize);
        }
        Ok(self.select_unchecked(wire, resolved))
    }

    /// Returns a new 1 bit wire driven by bit `position` of `wire`, see [Netlist::select].
    pub fn bit(&mut self, wire: WireVector, position: isize) -> Result<WireVector, BuildError> {
        self.select(wire, &[position])
    }

    /// Returns a new wire driven by a contiguous range of bits of `wire`.
    ///
    /// Bounds behave like python slices: negative bounds count from the most significant end
    /// and bounds past either end are clamped. An empty range is an error.
    ///
    /// # Example
    /// ```
    /// # use rtlsim::Netlist;
    /// let mut n = Netlist::new();
    /// let a = n.input(8, "a").unwrap();
    ///
    /// assert_eq!(n.slice(a, 0..4).unwrap().width(), 4);
    /// assert_eq!(n.slice(a, 1..).unwrap().width(), 7);
    /// assert_eq!(n.slice(a, ..-2).unwrap().width(), 6);
    /// assert!(n.slice(a, 5..5).is_err());
    /// ```
    pub fn slice<R: RangeBounds<isize>>(&mut self, wire: WireVector, range: R) -> Result<WireVector, BuildError> {
        self.check_readable(wire)?;
        let width = wire.width as isize;
        let resolve = |i: isize| if i < 0 { width + i } else { i };
        let clamp = |i: isize| std::cmp::min(std::cmp::max(i, 0), width);
        let start = match range.start_bound() {
            Bound::Included(i) => clamp(resolve(*i)),
            Bound::Excluded(i) => clamp(resolve(*i).saturating_add(1)),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(i) => clamp(resolve(*i).saturating_add(1)),
            Bound::Excluded(i) => clamp(resolve(*i)),
            Bound::Unbounded => width,
        };
        if start >= end {
            return Err(BuildError::EmptySelect(self.wires[wire.idx].name.clone()));
        }
        Ok(self.select_unchecked(wire, (start as usize..end as usize).collect()))
    }

    pub(super) fn select_unchecked(&mut self, wire: WireVector, positions: SmallVec<[usize; 8]>) -> WireVector {
        let dest = self.alloc_temp(positions.len(), false);
        self.add_node(LogicNode::new(
            Select,
            OpParam::Select(positions),
            smallvec![wire],
            smallvec![dest],
        ));
        dest
    }

    /// Returns a new wire holding all `parts` side by side, the first part in the most
    /// significant bits.
    ///
    /// Concatenating a single wire returns it unchanged.
    pub fn concat<I, O>(&mut self, parts: I) -> Result<WireVector, BuildError>
    where
        I: IntoIterator<Item = O>,
        O: Into<Operand>,
    {
        let parts: Vec<Operand> = parts.into_iter().map(Into::into).collect();
        if parts.is_empty() {
            return Err(BuildError::EmptyConcat);
        }
        for part in &parts {
            self.check_operand(part)?;
        }
        let parts: SmallVec<[WireVector; 2]> = parts.into_iter().map(|p| self.materialize(p)).collect();
        Ok(self.concat_unchecked(parts))
    }

    fn concat_unchecked(&mut self, parts: SmallVec<[WireVector; 2]>) -> WireVector {
        if parts.len() == 1 {
            return parts[0];
        }
        let widths: SmallVec<[usize; 2]> = parts.iter().map(|p| p.width).collect();
        let dest = self.alloc_temp(Concat.result_width(&widths), false);
        self.add_node(LogicNode::new(Concat, OpParam::None, parts, smallvec![dest]));
        dest
    }

    /// Returns `wire` widened to `width` bits with its own extension rule:
    /// sign extension for signed wires, zero extension otherwise.
    pub fn extend(&mut self, wire: WireVector, width: usize) -> Result<WireVector, BuildError> {
        self.checked_extend(wire, width, wire.signed)
    }

    /// Returns `wire` widened to `width` bits with zeros.
    pub fn zero_extend(&mut self, wire: WireVector, width: usize) -> Result<WireVector, BuildError> {
        self.checked_extend(wire, width, false)
    }

    /// Returns `wire` widened to `width` bits with copies of its most significant bit.
    pub fn sign_extend(&mut self, wire: WireVector, width: usize) -> Result<WireVector, BuildError> {
        self.checked_extend(wire, width, true)
    }

    fn checked_extend(&mut self, wire: WireVector, width: usize, signed: bool) -> Result<WireVector, BuildError> {
        self.check_readable(wire)?;
        if width < wire.width {
            return Err(BuildError::ExtendNarrower {
                wire: self.wires[wire.idx].name.clone(),
                from: wire.width,
                to: width,
            });
        }
        Ok(self.extend_with(wire, width, signed))
    }

    /// Extends `wire` to `width` >= its width, returning `wire` itself if the widths match.
    ///
    /// The extension bits are one select replicating the source bit, concatenated above `wire`.
    pub(super) fn extend_with(&mut self, wire: WireVector, width: usize, signed: bool) -> WireVector {
        let extra = width - wire.width;
        if extra == 0 {
            return wire;
        }
        let source = if signed {
            self.select_unchecked(wire, smallvec![wire.width - 1])
        } else {
            self.alloc_constant(0u8.into(), 1, false)
        };
        let extension = self.select_unchecked(source, smallvec![0; extra]);
        self.concat_unchecked(smallvec![extension, wire])
    }

    /// Drives `target` with `source`.
    ///
    /// A wider source is truncated to its least significant bits, a narrower one is extended
    /// with the extension rule of `target`. Inputs, constants and registers can't be assigned,
    /// use [Netlist::set_next] for registers.
    pub fn connect<O: Into<Operand>>(&mut self, target: WireVector, source: O) -> Result<(), BuildError> {
        let source = source.into();
        self.check_assignable(target)?;
        self.check_operand(&source)?;

        let source = self.materialize(source);
        let source = if source.width > target.width {
            self.select_unchecked(source, (0..target.width).collect())
        } else {
            self.extend_with(source, target.width, target.signed)
        };
        self.add_node(LogicNode::new(Connect, OpParam::None, smallvec![source], smallvec![target]));
        Ok(())
    }

    fn check_assignable(&self, target: WireVector) -> Result<(), BuildError> {
        self.check(target)?;
        let info = &self.wires[target.idx];
        match info.kind {
            WireKind::Input | WireKind::Const | WireKind::Register => {
                return Err(BuildError::AssignForbidden {
                    wire: info.name.clone(),
                    kind: info.kind,
                })
            }
            WireKind::Wire | WireKind::Output => {}
        }
        if self.drivers[target.idx].is_some() {
            return Err(match info.next_of {
                Some(register) => BuildError::NextAlreadyBound(self.wires[register].name.clone()),
                None => BuildError::AlreadyDriven(info.name.clone()),
            });
        }
        Ok(())
    }

    /// Returns the wire holding the value `register` latches at the end of each cycle.
    ///
    /// The wire, named after the register with a trailing `'`, and the register node are
    /// created on the first call, later calls return the same wire.
    pub fn next(&mut self, register: WireVector) -> Result<WireVector, BuildError> {
        self.check_register(register)?;
        if let Some(next) = self.wires[register.idx].next {
            return Ok(self.handle(next));
        }
        let name = self.next_primed_name(&self.wires[register.idx].name);
        let next = self.alloc(name, register.width, WireKind::Wire, register.signed, true, None);
        self.wires[next.idx].next_of = Some(register.idx);
        self.wires[register.idx].next = Some(next.idx);
        self.add_node(LogicNode::new(Register, OpParam::None, smallvec![next], smallvec![register]));
        Ok(next)
    }

    /// Binds the next value of `register` to `value`, this can only be done once.
    ///
    /// # Example
    /// ```
    /// # use rtlsim::{Netlist, BuildError};
    /// let mut n = Netlist::new();
    /// let counter = n.register(4, "counter").unwrap();
    /// let plus_one = n.add(counter, 1u8).unwrap();
    ///
    /// n.set_next(counter, plus_one).unwrap();
    /// assert_eq!(
    ///     n.set_next(counter, 0u8),
    ///     Err(BuildError::NextAlreadyBound("counter".into()))
    /// );
    /// ```
    pub fn set_next<O: Into<Operand>>(&mut self, register: WireVector, value: O) -> Result<(), BuildError> {
        let value = value.into();
        self.check_register(register)?;
        if let Some(next) = self.wires[register.idx].next {
            self.check_assignable(self.handle(next))?;
        }
        self.check_operand(&value)?;
        let next = self.next(register)?;
        self.connect(next, value)
    }

    fn check_register(&self, register: WireVector) -> Result<(), BuildError> {
        self.check(register)?;
        if register.kind != WireKind::Register {
            return Err(BuildError::NotARegister(self.wires[register.idx].name.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BigUint;

    fn driver_op(n: &Netlist, w: WireVector) -> Op {
        n.driver(w).unwrap().op()
    }

    #[test]
    fn test_binary_widths() {
        let mut n = Netlist::new();
        let a = n.input(3, "a").unwrap();
        let b = n.input(5, "b").unwrap();
        assert_eq!(n.and(a, b).unwrap().width(), 5);
        assert_eq!(n.or(a, b).unwrap().width(), 5);
        assert_eq!(n.xor(a, a).unwrap().width(), 3);
        assert_eq!(n.add(a, b).unwrap().width(), 6);
        assert_eq!(n.sub(a, b).unwrap().width(), 6);
        assert_eq!(n.mul(a, b).unwrap().width(), 10);
        assert_eq!(n.not(a).unwrap().width(), 3);
    }

    #[test]
    fn test_narrow_operand_is_extended() {
        let mut n = Netlist::new();
        let a = n.input(2, "a").unwrap();
        let b = n.input(4, "b").unwrap();
        let and = n.and(a, b).unwrap();
        let node = n.driver(and).unwrap().clone();
        assert_eq!(node.args()[0].width(), 4);
        assert_eq!(node.args()[1], b);
        assert_eq!(driver_op(&n, node.args()[0]), Concat);
    }

    #[test]
    fn test_literal_operand() {
        let mut n = Netlist::new();
        let a = n.input(8, "a").unwrap();
        let sum = n.add(a, 5u8).unwrap();
        assert_eq!(sum.width(), 9);
        let c = n.wire_by_name("const0_5").unwrap();
        assert_eq!(c.width(), 3);
        assert_eq!(c.kind(), WireKind::Const);

        assert_eq!(
            n.add(a, Literal::sized(9u8, 3)),
            Err(BuildError::ConstantTooWide {
                value: BigUint::from(9u8),
                width: 3
            })
        );
    }

    #[test]
    fn test_failed_operation_leaves_netlist_untouched() {
        let mut n = Netlist::new();
        let a = n.input(8, "a").unwrap();
        let o = n.output(8, "o").unwrap();
        let wires = n.wire_count();
        let nodes = n.logic_len();
        assert!(n.add(5u8, Literal::sized(9u8, 3)).is_err());
        assert!(n.concat(vec![Operand::from(a), Literal::sized(1u8, 0).into()]).is_err());
        #[cfg(feature = "strict_outputs")]
        assert_eq!(n.and(a, o), Err(BuildError::OutputRead("o".into())));
        assert_eq!((n.wire_count(), n.logic_len()), (wires, nodes));
    }

    #[test]
    fn test_select() {
        let mut n = Netlist::new();
        let a = n.input(4, "a").unwrap();
        let s = n.select(a, &[0, -1, 2]).unwrap();
        assert_eq!(s.width(), 3);
        assert_eq!(
            n.driver(s).unwrap().param(),
            &OpParam::Select(smallvec![0, 3, 2])
        );
        assert_eq!(
            n.select(a, &[4]),
            Err(BuildError::SelectOutOfRange {
                wire: "a".into(),
                index: 4,
                width: 4
            })
        );
        assert!(n.select(a, &[-5]).is_err());
        assert_eq!(n.select(a, &[]), Err(BuildError::EmptySelect("a".into())));
    }

    #[test]
    fn test_slice_clamps() {
        let mut n = Netlist::new();
        let a = n.input(4, "a").unwrap();
        let s = n.slice(a, 2..100).unwrap();
        assert_eq!(n.driver(s).unwrap().param(), &OpParam::Select(smallvec![2, 3]));
        let s = n.slice(a, -3..=-2).unwrap();
        assert_eq!(n.driver(s).unwrap().param(), &OpParam::Select(smallvec![1, 2]));
        let s = n.slice(a, ..=-1).unwrap();
        assert_eq!(s.width(), 4);
        let s = n.slice(a, 0..=isize::MAX).unwrap();
        assert_eq!(s.width(), 4);
        let s = n.slice(a, isize::MIN..2).unwrap();
        assert_eq!(n.driver(s).unwrap().param(), &OpParam::Select(smallvec![0, 1]));
        assert_eq!(
            n.slice(a, (Bound::Excluded(isize::MAX), Bound::Unbounded)),
            Err(BuildError::EmptySelect("a".into()))
        );
    }

    #[test]
    fn test_concat() {
        let mut n = Netlist::new();
        let a = n.input(3, "a").unwrap();
        let b = n.input(2, "b").unwrap();
        assert_eq!(n.concat(vec![a, b]).unwrap().width(), 5);
        assert_eq!(n.concat(vec![a]).unwrap(), a);
        assert_eq!(n.concat(Vec::<WireVector>::new()), Err(BuildError::EmptyConcat));
    }

    #[test]
    fn test_extend() {
        let mut n = Netlist::new();
        let a = n.input(4, "a").unwrap();
        assert_eq!(n.extend(a, 4).unwrap(), a);
        assert_eq!(
            n.zero_extend(a, 3),
            Err(BuildError::ExtendNarrower {
                wire: "a".into(),
                from: 4,
                to: 3
            })
        );
        let z = n.zero_extend(a, 7).unwrap();
        assert_eq!(z.width(), 7);
        let node = n.driver(z).unwrap().clone();
        assert_eq!(node.op(), Concat);
        assert_eq!(node.args()[0].width(), 3);
        assert_eq!(node.args()[1], a);
    }

    #[test]
    fn test_connect_truncates_and_extends() {
        let mut n = Netlist::new();
        let wide = n.input(8, "wide").unwrap();
        let narrow = n.output(3, "narrow").unwrap();
        n.connect(narrow, wide).unwrap();
        let source = n.driver(narrow).unwrap().args()[0];
        assert_eq!(
            n.driver(source).unwrap().param(),
            &OpParam::Select(smallvec![0, 1, 2])
        );

        let small = n.input(2, "small").unwrap();
        let big = n.signed_wire(6, "big").unwrap();
        n.connect(big, small).unwrap();
        let source = n.driver(big).unwrap().args()[0];
        assert_eq!(source.width(), 6);
        assert_eq!(driver_op(&n, source), Concat);
    }

    #[test]
    fn test_connect_forbidden() {
        let mut n = Netlist::new();
        let i = n.input(1, "i").unwrap();
        let r = n.register(1, "r").unwrap();
        let c = n.constant(1u8);
        let w = n.wire(1, "w").unwrap();
        assert_eq!(
            n.connect(i, w),
            Err(BuildError::AssignForbidden {
                wire: "i".into(),
                kind: WireKind::Input
            })
        );
        assert!(matches!(n.connect(r, w), Err(BuildError::AssignForbidden { kind: WireKind::Register, .. })));
        assert!(matches!(n.connect(c, w), Err(BuildError::AssignForbidden { kind: WireKind::Const, .. })));

        n.connect(w, i).unwrap();
        assert_eq!(n.connect(w, 0u8), Err(BuildError::AlreadyDriven("w".into())));
    }

    #[test]
    fn test_register_next() {
        let mut n = Netlist::new();
        let r = n.register(4, "r").unwrap();
        let w = n.wire(1, "w").unwrap();
        assert_eq!(n.next(w), Err(BuildError::NotARegister("w".into())));

        let next = n.next(r).unwrap();
        assert_eq!(n.name(next).unwrap(), "r'");
        assert_eq!(n.next(r).unwrap(), next);
        assert_eq!(n.register_next(r), Some(next));
        assert_eq!(driver_op(&n, r), Register);

        n.set_next(r, 3u8).unwrap();
        let nodes = n.logic_len();
        assert_eq!(n.set_next(r, 1u8), Err(BuildError::NextAlreadyBound("r".into())));
        assert_eq!(n.connect(next, 1u8), Err(BuildError::NextAlreadyBound("r".into())));
        assert_eq!(n.logic_len(), nodes);
        // The first binding is still in place.
        let source = n.driver(next).unwrap().args()[0];
        assert_eq!(driver_op(&n, source), Concat);
    }
}
