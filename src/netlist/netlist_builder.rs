use super::handles::*;
use super::memory::MemBlock;
use super::node::*;
use super::ConstLiteral;
use crate::data_structures::{fits, min_width};
use crate::{BigUint, BuildError};
use casey::pascal;
use concat_idents::concat_idents;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};

use WireKind::*;

/// Source of the identities that tie handles to the netlist that created them.
static NETLIST_IDS: AtomicUsize = AtomicUsize::new(0);

/// Creates `kind` and `signed_kind` constructors for every wire kind, along with
/// `kind_temp` and `signed_kind_temp` that generate the name.
macro_rules! wire_constructors {
    ($kind:ident,$($rest:ident),*) => {
        wire_constructors!($kind);
        wire_constructors!($($rest),*);
    };
    ($kind:ident) => {
        /// Returns a new zero extended wire vector of this kind named `name`.
        pub fn $kind<S: Into<String>>(&mut self, width: usize, name: S) -> Result<WireVector, BuildError> {
            self.named_wire(pascal!($kind), width, name.into(), false)
        }

        concat_idents!(signed_kind = signed, _, $kind {
            /// Returns a new sign extended wire vector of this kind named `name`.
            pub fn signed_kind<S: Into<String>>(&mut self, width: usize, name: S) -> Result<WireVector, BuildError> {
                self.named_wire(pascal!($kind), width, name.into(), true)
            }
        });

        concat_idents!(kind_temp = $kind, _, temp {
            /// Returns a new zero extended wire vector of this kind with a generated name.
            pub fn kind_temp(&mut self, width: usize) -> Result<WireVector, BuildError> {
                self.temp_wire(pascal!($kind), width, false)
            }
        });

        concat_idents!(signed_kind_temp = signed, _, $kind, _, temp {
            /// Returns a new sign extended wire vector of this kind with a generated name.
            pub fn signed_kind_temp(&mut self, width: usize) -> Result<WireVector, BuildError> {
                self.temp_wire(pascal!($kind), width, true)
            }
        });
    };
}

/// Everything a [Netlist] knows about one wire vector.
#[derive(Debug, Clone)]
pub struct WireInfo {
    pub(crate) name: String,
    pub(crate) width: usize,
    pub(crate) kind: WireKind,
    pub(crate) signed: bool,
    pub(crate) temporary: bool,
    pub(crate) value: Option<BigUint>,
    // Register <-> next surface links.
    pub(crate) next: Option<usize>,
    pub(crate) next_of: Option<usize>,
}

impl WireInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn kind(&self) -> WireKind {
        self.kind
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Returns true if the name was generated by the netlist rather than chosen by the user.
    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    /// Returns the value of a constant wire.
    pub fn const_value(&self) -> Option<&BigUint> {
        self.value.as_ref()
    }
}

/// Data structure holding every wire vector and logic node of one hardware design.
///
/// Wires are created with the constructors ([input](Netlist::input), [output](Netlist::output),
/// [register](Netlist::register), [constant](Netlist::constant)...) and combined with the
/// operations ([and](Netlist::and), [add](Netlist::add), [select](Netlist::select)...), every
/// operation returns a brand new wire and records one [LogicNode].
///
/// Every wire other than inputs, constants and registers is driven by exactly one node,
/// driving a wire twice is an error.
///
/// Generated names are allocated from counters owned by the netlist, so building the same
/// design twice produces the same names.
///
/// # Example
/// ```
/// # use rtlsim::{Netlist, Simulation};
/// let mut n = Netlist::new();
/// let a = n.input(1, "a").unwrap();
/// let b = n.input(1, "b").unwrap();
/// let carry = n.output(1, "carry").unwrap();
///
/// let and = n.and(a, b).unwrap();
/// n.connect(carry, and).unwrap();
///
/// let mut sim = Simulation::new(&n).unwrap();
/// sim.step(vec![("a", 1u8), ("b", 1u8)]).unwrap();
/// assert_eq!(sim.inspect_u8(carry).unwrap(), 1);
/// ```
#[derive(Debug)]
pub struct Netlist {
    pub(crate) id: usize,
    pub(crate) wires: Vec<WireInfo>,
    names: HashMap<String, usize>,
    pub(crate) drivers: Vec<Option<usize>>,
    pub(crate) logic: Vec<LogicNode>,
    pub(crate) memories: Vec<MemBlock>,
    next_temp: usize,
    next_const: usize,
    next_memory: usize,
}

impl Netlist {
    /// Returns a new empty [Netlist].
    pub fn new() -> Netlist {
        Netlist {
            id: NETLIST_IDS.fetch_add(1, Ordering::Relaxed),
            wires: Default::default(),
            names: Default::default(),
            drivers: Default::default(),
            logic: Default::default(),
            memories: Default::default(),
            next_temp: 0,
            next_const: 0,
            next_memory: 0,
        }
    }

    // Create input, output, register and plain wire constructors.
    wire_constructors!(wire, input, output, register);

    /// Returns a new constant wire holding `value` in the minimum number of bits.
    pub fn constant<V: Into<BigUint>>(&mut self, value: V) -> WireVector {
        let value = value.into();
        let width = min_width(&value);
        self.alloc_constant(value, width, false)
    }

    /// Returns a new constant wire holding `value` in `width` bits.
    pub fn constant_with_width<V: Into<BigUint>>(
        &mut self,
        value: V,
        width: usize,
    ) -> Result<WireVector, BuildError> {
        let value = value.into();
        self.check_literal(&Literal::sized(value.clone(), width))?;
        Ok(self.alloc_constant(value, width, false))
    }

    /// Returns a new sign extended constant wire holding the bit pattern `value` in `width` bits.
    pub fn signed_constant<V: Into<BigUint>>(
        &mut self,
        value: V,
        width: usize,
    ) -> Result<WireVector, BuildError> {
        let value = value.into();
        self.check_literal(&Literal::sized(value.clone(), width))?;
        Ok(self.alloc_constant(value, width, true))
    }

    /// Returns a new constant wire from `width'radix digits` notation, e.g. `8'hff`.
    pub fn constant_literal(&mut self, literal: &str) -> Result<WireVector, BuildError> {
        let literal = ConstLiteral::parse(literal)?;
        Ok(self.alloc_constant(literal.value().clone(), literal.width(), false))
    }

    /// Checks `width` and `name`, then registers a new wire.
    fn named_wire(
        &mut self,
        kind: WireKind,
        width: usize,
        name: String,
        signed: bool,
    ) -> Result<WireVector, BuildError> {
        self.check_width(width, &name)?;
        self.check_name(&name)?;
        Ok(self.alloc(name, width, kind, signed, false, None))
    }

    fn temp_wire(&mut self, kind: WireKind, width: usize, signed: bool) -> Result<WireVector, BuildError> {
        self.check_width(width, "temporary")?;
        let name = self.next_temp_name();
        Ok(self.alloc(name, width, kind, signed, true, None))
    }

    fn check_width(&self, width: usize, name: &str) -> Result<(), BuildError> {
        if width == 0 {
            return Err(BuildError::ZeroWidth { name: name.into() });
        }
        Ok(())
    }

    fn check_name(&self, name: &str) -> Result<(), BuildError> {
        if name.is_empty() {
            return Err(BuildError::EmptyName);
        }
        let lower = name.to_ascii_lowercase();
        if lower == "clk" || lower == "clock" {
            return Err(BuildError::ReservedName(name.into()));
        }
        if self.names.contains_key(name) {
            return Err(BuildError::DuplicateName(name.into()));
        }
        Ok(())
    }

    /// Registers a wire whose name has already been checked.
    pub(super) fn alloc(
        &mut self,
        name: String,
        width: usize,
        kind: WireKind,
        signed: bool,
        temporary: bool,
        value: Option<BigUint>,
    ) -> WireVector {
        let idx = self.wires.len();
        log::trace!("wire {}/{}{}", name, width, kind.letter());
        self.names.insert(name.clone(), idx);
        self.wires.push(WireInfo {
            name,
            width,
            kind,
            signed,
            temporary,
            value,
            next: None,
            next_of: None,
        });
        self.drivers.push(None);
        self.handle(idx)
    }

    pub(super) fn alloc_temp(&mut self, width: usize, signed: bool) -> WireVector {
        let name = self.next_temp_name();
        self.alloc(name, width, Wire, signed, true, None)
    }

    /// Registers a constant whose value has already been checked against `width`.
    pub(super) fn alloc_constant(&mut self, value: BigUint, width: usize, signed: bool) -> WireVector {
        let name = self.next_const_name(&value);
        self.alloc(name, width, Const, signed, true, Some(value))
    }

    /// Returns the next unused `tmpN` name.
    fn next_temp_name(&mut self) -> String {
        loop {
            let name = format!("tmp{}", self.next_temp);
            self.next_temp += 1;
            if !self.names.contains_key(&name) {
                return name;
            }
        }
    }

    /// Returns the next unused `constN_value` name.
    fn next_const_name(&mut self, value: &BigUint) -> String {
        loop {
            let name = format!("const{}_{}", self.next_const, value);
            self.next_const += 1;
            if !self.names.contains_key(&name) {
                return name;
            }
        }
    }

    /// Returns `base` followed by as many `'` as needed to make it unused.
    pub(super) fn next_primed_name(&self, base: &str) -> String {
        let mut name = format!("{}'", base);
        while self.names.contains_key(&name) {
            name.push('\'');
        }
        name
    }

    pub(super) fn next_memory_id(&mut self) -> usize {
        let id = self.next_memory;
        self.next_memory += 1;
        id
    }

    /// Returns an error if `wire` was not created by this netlist.
    pub(super) fn check(&self, wire: WireVector) -> Result<(), BuildError> {
        let owned = wire.netlist == self.id
            && self.wires.get(wire.idx).map_or(false, |info| {
                (info.width, info.kind, info.signed) == (wire.width, wire.kind, wire.signed)
            });
        if !owned {
            return Err(BuildError::ForeignWire(wire.idx));
        }
        Ok(())
    }

    /// Returns an error if `wire` can't be used as the argument of an operation.
    #[allow(unused_variables)]
    pub(super) fn check_readable(&self, wire: WireVector) -> Result<(), BuildError> {
        self.check(wire)?;
        #[cfg(feature = "strict_outputs")]
        if wire.kind == Output {
            return Err(BuildError::OutputRead(self.wires[wire.idx].name.clone()));
        }
        Ok(())
    }

    fn check_literal(&self, literal: &Literal) -> Result<(), BuildError> {
        if let Some(width) = literal.width {
            if width == 0 {
                return Err(BuildError::ZeroWidth {
                    name: format!("constant {}", literal.value),
                });
            }
            if !fits(&literal.value, width) {
                return Err(BuildError::ConstantTooWide {
                    value: literal.value.clone(),
                    width,
                });
            }
        }
        Ok(())
    }

    /// Returns an error if `operand` can't be turned into a readable wire.
    pub(super) fn check_operand(&self, operand: &Operand) -> Result<(), BuildError> {
        match operand {
            Operand::Wire(w) => self.check_readable(*w),
            Operand::Literal(l) => self.check_literal(l),
        }
    }

    /// Turns an operand that passed [Netlist::check_operand] into a wire.
    pub(super) fn materialize(&mut self, operand: Operand) -> WireVector {
        match operand {
            Operand::Wire(w) => w,
            Operand::Literal(Literal { value, width }) => {
                let width = width.unwrap_or_else(|| min_width(&value));
                self.alloc_constant(value, width, false)
            }
        }
    }

    /// Appends `node` and records it as the driver of its destinations.
    pub(super) fn add_node(&mut self, node: LogicNode) -> usize {
        let idx = self.logic.len();
        for dest in &node.dests {
            self.drivers[dest.idx] = Some(idx);
        }
        log::trace!("net {}", self.describe_node(&node));
        self.logic.push(node);
        idx
    }

    /// Replaces the node at `idx`, used when a memory block gains a port.
    pub(super) fn replace_node(&mut self, idx: usize, node: LogicNode) {
        for dest in &node.dests {
            self.drivers[dest.idx] = Some(idx);
        }
        log::trace!("net {} (replaced)", self.describe_node(&node));
        self.logic[idx] = node;
    }

    /// Returns the handle of the wire at `idx`.
    pub(crate) fn handle(&self, idx: usize) -> WireVector {
        let info = &self.wires[idx];
        WireVector {
            netlist: self.id,
            idx,
            width: info.width,
            kind: info.kind,
            signed: info.signed,
        }
    }

    /// Returns handles to every wire vector in creation order.
    pub fn wires(&self) -> impl Iterator<Item = WireVector> + '_ {
        (0..self.wires.len()).map(move |idx| self.handle(idx))
    }

    /// Returns everything the netlist knows about `wire`.
    pub fn wire_info(&self, wire: WireVector) -> Result<&WireInfo, BuildError> {
        self.check(wire)?;
        Ok(&self.wires[wire.idx])
    }

    /// Returns the name of `wire`, or an error if `wire` belongs to another netlist.
    pub fn name(&self, wire: WireVector) -> Result<&str, BuildError> {
        Ok(self.wire_info(wire)?.name())
    }

    /// Returns the wire vector called `name`.
    pub fn wire_by_name(&self, name: &str) -> Option<WireVector> {
        self.names.get(name).map(|idx| self.handle(*idx))
    }

    /// Returns the next surface of `register` if it has been created.
    pub fn register_next(&self, register: WireVector) -> Option<WireVector> {
        self.check(register).ok()?;
        self.wires[register.idx].next.map(|idx| self.handle(idx))
    }

    /// Returns the node driving `wire`.
    pub fn driver(&self, wire: WireVector) -> Option<&LogicNode> {
        self.check(wire).ok()?;
        self.drivers[wire.idx].map(|idx| &self.logic[idx])
    }

    /// Returns every logic node in registration order.
    pub fn logic(&self) -> impl Iterator<Item = &LogicNode> {
        self.logic.iter()
    }

    /// Returns every memory block in creation order.
    pub fn memories(&self) -> impl Iterator<Item = &MemBlock> {
        self.memories.iter()
    }

    /// Returns the number of logic nodes.
    pub fn logic_len(&self) -> usize {
        self.logic.len()
    }

    /// Returns the number of wire vectors.
    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    /// Returns `name/widthK` for the wire at `idx`, K being the [WireKind::letter].
    fn describe_wire(&self, idx: usize) -> String {
        let info = &self.wires[idx];
        format!("{}/{}{}", info.name, info.width, info.kind.letter())
    }

    fn describe_node(&self, node: &LogicNode) -> String {
        let list = |wires: &[WireVector]| {
            wires
                .iter()
                .map(|w| self.describe_wire(w.idx))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let param = match &node.param {
            OpParam::None => String::new(),
            OpParam::Select(bits) => format!(
                " ({})",
                bits.iter()
                    .map(|b| b.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            OpParam::Memory { id, reads, writes } => {
                format!(" (mem{}, {} reads, {} writes)", id, reads, writes)
            }
        };
        format!(
            "{} <-- {} -- {}{}",
            list(&node.dests),
            node.op,
            list(&node.args),
            param
        )
    }

    /// Returns the netlist in [dot](https://en.wikipedia.org/wiki/DOT_(graph_description_language))
    /// format, wires and logic nodes both become graph nodes.
    pub fn to_dot(&self) -> String {
        use petgraph::dot::{Config, Dot};
        let mut graph = petgraph::Graph::<String, ()>::new();
        let wires: Vec<_> = (0..self.wires.len())
            .map(|idx| graph.add_node(self.describe_wire(idx)))
            .collect();
        for node in &self.logic {
            let op = graph.add_node(node.op.to_string());
            graph.extend_with_edges(node.args.iter().map(|arg| (wires[arg.idx], op)));
            graph.extend_with_edges(node.dests.iter().map(|dest| (op, wires[dest.idx])));
        }
        format!("{:?}", Dot::with_config(&graph, &[Config::EdgeNoLabel]))
    }
}

impl Netlist {
    /// Returns a copy that accepts the handles of `self`, used to freeze a simulated design.
    pub(crate) fn snapshot(&self) -> Netlist {
        Netlist {
            id: self.id,
            wires: self.wires.clone(),
            names: self.names.clone(),
            drivers: self.drivers.clone(),
            logic: self.logic.clone(),
            memories: self.memories.clone(),
            next_temp: self.next_temp,
            next_const: self.next_const,
            next_memory: self.next_memory,
        }
    }
}

/// Returns an independent copy of the design, handles of one copy are foreign to the other.
impl Clone for Netlist {
    fn clone(&self) -> Self {
        Netlist {
            id: NETLIST_IDS.fetch_add(1, Ordering::Relaxed),
            ..self.snapshot()
        }
    }
}

impl Default for Netlist {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints one line per logic node: `dests <-- op -- args (param)`.
impl Display for Netlist {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for node in &self.logic {
            writeln!(f, "{}", self.describe_node(node))?;
        }
        Ok(())
    }
}
