use super::schedule::{schedule, Task};
use super::SimulationTrace;
use crate::data_structures::{concat, fits, mask, select, truncate, wrapping_sub};
use crate::netlist::*;
use crate::{BigUint, MemoryError, SimulationError};
use concat_idents::concat_idents;
use std::collections::HashMap;
use std::convert::TryFrom;
use unwrap::unwrap;

/// Generates the inspect_type functions for [Simulation].
macro_rules! inspectors {
    ($ty:ident,$($rest:ident),*) => {
        inspectors!($ty);
        inspectors!($($rest),*);
    };
    ($ty:ident) => {
        concat_idents!(inspect_t = inspect, _, $ty {
            /// Returns the latest value of `wire` as the corresponding type.
            ///
            /// Bits that don't fit in the type are ignored.
            pub fn inspect_t(&self, wire: WireVector) -> Result<$ty, SimulationError> {
                let value = truncate(self.inspect(wire)?, std::mem::size_of::<$ty>() * 8);
                Ok(<$ty>::try_from(&value).unwrap_or_default())
            }
        });
    };
}

/// Prepares a [Simulation] with non default initial state.
///
/// # Example
/// ```
/// # use rtlsim::{Netlist, Simulation, SimulationTrace};
/// let mut n = Netlist::new();
/// let counter = n.register(8, "counter").unwrap();
/// let plus_one = n.add(counter, 1u8).unwrap();
/// n.set_next(counter, plus_one).unwrap();
///
/// let mut sim = Simulation::builder(&n)
///     .register_value(counter, 40u8)
///     .trace(SimulationTrace::with_wires(vec!["counter"]))
///     .build()
///     .unwrap();
/// sim.step(Vec::<(&str, u8)>::new()).unwrap();
/// sim.step(Vec::<(&str, u8)>::new()).unwrap();
/// assert_eq!(sim.inspect_u8(counter).unwrap(), 41);
/// assert_eq!(sim.trace().get("counter").unwrap().len(), 2);
/// ```
#[derive(Debug)]
pub struct SimulationBuilder<'a> {
    netlist: &'a Netlist,
    registers: Vec<(WireVector, BigUint)>,
    memories: Vec<(MemoryHandle, BigUint, BigUint)>,
    trace: SimulationTrace,
}

impl<'a> SimulationBuilder<'a> {
    /// Sets the value `register` holds during the first cycle, 0 otherwise.
    pub fn register_value<V: Into<BigUint>>(mut self, register: WireVector, value: V) -> Self {
        self.registers.push((register, value.into()));
        self
    }

    /// Sets the word stored at `addr` of `memory` before the first cycle, 0 otherwise.
    pub fn memory_value<A: Into<BigUint>, V: Into<BigUint>>(
        mut self,
        memory: MemoryHandle,
        addr: A,
        value: V,
    ) -> Self {
        self.memories.push((memory, addr.into(), value.into()));
        self
    }

    /// Sets the trace the simulation records into, every wire is traced by default.
    pub fn trace(mut self, trace: SimulationTrace) -> Self {
        self.trace = trace;
        self
    }

    /// Checks the netlist and the initial state and returns the [Simulation].
    pub fn build(self) -> Result<Simulation, SimulationError> {
        let netlist = self.netlist;
        let schedule = schedule(netlist)?;

        let mut registers = HashMap::new();
        for w in netlist.wires().filter(|w| w.kind == WireKind::Register) {
            if netlist.wires[w.idx].next.is_none() {
                log::warn!(
                    "register {} has no next value and will hold its initial value",
                    netlist.wires[w.idx].name
                );
            }
            registers.insert(w.idx, BigUint::default());
        }
        for (register, value) in self.registers {
            let info = netlist
                .wire_info(register)
                .map_err(|_| SimulationError::ForeignWire(register.idx))?;
            if info.kind != WireKind::Register {
                return Err(SimulationError::NotARegister(info.name.clone()));
            }
            if !fits(&value, info.width) {
                return Err(SimulationError::ValueOutOfRange {
                    wire: info.name.clone(),
                    value,
                    width: info.width,
                });
            }
            registers.insert(register.idx, value);
        }

        let mut memories: HashMap<usize, HashMap<BigUint, BigUint>> = netlist
            .memories
            .iter()
            .map(|m| (m.id, HashMap::new()))
            .collect();
        for (memory, addr, value) in self.memories {
            let block = netlist.memory_info(memory)?;
            if !fits(&addr, block.addr_width) {
                return Err(SimulationError::MemoryOutOfRange {
                    memory: block.name.clone(),
                    address: addr,
                });
            }
            if !fits(&value, block.width) {
                return Err(SimulationError::ValueOutOfRange {
                    wire: block.name.clone(),
                    value,
                    width: block.width,
                });
            }
            if let Some(contents) = memories.get_mut(&block.id) {
                contents.insert(addr, value);
            }
        }

        let mut trace = self.trace;
        trace.attach(netlist)?;

        Ok(Simulation {
            netlist: netlist.snapshot(),
            schedule,
            registers,
            memories,
            values: vec![None; netlist.wires.len()],
            trace,
            cycle: 0,
        })
    }
}

/// Cycle based simulation of a [Netlist].
///
/// The netlist is copied and checked when the simulation is built, later changes to the
/// original don't affect the simulation. Each [step](Simulation::step) evaluates every logic
/// node once, then latches all registers and applies all memory writes at the same time.
#[derive(Debug)]
pub struct Simulation {
    netlist: Netlist,
    schedule: Vec<Task>,
    registers: HashMap<usize, BigUint>,
    memories: HashMap<usize, HashMap<BigUint, BigUint>>,
    values: Vec<Option<BigUint>>,
    trace: SimulationTrace,
    cycle: usize,
}

/// The copy keeps accepting the handles of the simulated netlist.
impl Clone for Simulation {
    fn clone(&self) -> Self {
        Simulation {
            netlist: self.netlist.snapshot(),
            schedule: self.schedule.clone(),
            registers: self.registers.clone(),
            memories: self.memories.clone(),
            values: self.values.clone(),
            trace: self.trace.clone(),
            cycle: self.cycle,
        }
    }
}

impl Simulation {
    /// Returns a [Simulation] of `netlist` with every register and memory word at 0, tracing
    /// every wire.
    ///
    /// Fails if a wire is never driven or if the netlist contains a combinational loop.
    pub fn new(netlist: &Netlist) -> Result<Self, SimulationError> {
        Self::builder(netlist).build()
    }

    pub fn builder(netlist: &Netlist) -> SimulationBuilder<'_> {
        SimulationBuilder {
            netlist,
            registers: Vec::new(),
            memories: Vec::new(),
            trace: SimulationTrace::new(),
        }
    }

    /// Simulates one cycle with the values of every input given by name.
    ///
    /// On error nothing is committed and nothing is recorded.
    pub fn step<I, K, V>(&mut self, inputs: I) -> Result<(), SimulationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<BigUint>,
    {
        let mut values: Vec<Option<BigUint>> = vec![None; self.values.len()];

        for (name, value) in inputs {
            let name = name.as_ref();
            let value = value.into();
            let wire = match self.netlist.wire_by_name(name) {
                Some(w) if w.kind == WireKind::Input => w,
                _ => return Err(SimulationError::NotAnInput(name.into())),
            };
            if !fits(&value, wire.width) {
                return Err(SimulationError::ValueOutOfRange {
                    wire: name.into(),
                    value,
                    width: wire.width,
                });
            }
            values[wire.idx] = Some(value);
        }
        for (idx, info) in self.netlist.wires.iter().enumerate() {
            match info.kind {
                WireKind::Input if values[idx].is_none() => {
                    return Err(SimulationError::MissingInput(info.name.clone()))
                }
                WireKind::Const => values[idx] = info.value.clone(),
                WireKind::Register => values[idx] = self.registers.get(&idx).cloned(),
                _ => {}
            }
        }

        let mut latched = Vec::new();
        let mut writes = Vec::new();
        for task in &self.schedule {
            match *task {
                Task::Eval(idx) => {
                    let node = &self.netlist.logic[idx];
                    let value = evaluate(node, &values);
                    values[node.dests[0].idx] = Some(value);
                }
                Task::MemRead(idx) => {
                    let node = &self.netlist.logic[idx];
                    let contents = self.contents(node);
                    for (addr, data) in node.args.iter().zip(&node.dests) {
                        let value = contents
                            .get(arg(&values, addr))
                            .cloned()
                            .unwrap_or_default();
                        values[data.idx] = Some(value);
                    }
                }
                Task::Latch(idx) => {
                    let node = &self.netlist.logic[idx];
                    latched.push((node.dests[0].idx, arg(&values, &node.args[0]).clone()));
                }
                Task::MemWrite(idx) => {
                    let node = &self.netlist.logic[idx];
                    let (id, reads) = match node.param {
                        OpParam::Memory { id, reads, .. } => (id, reads),
                        _ => unreachable!("memory task on a {} node", node.op),
                    };
                    for port in node.args[reads..].chunks(3) {
                        if *arg(&values, &port[2]) == BigUint::from(1u8) {
                            writes.push((
                                id,
                                arg(&values, &port[0]).clone(),
                                arg(&values, &port[1]).clone(),
                            ));
                        }
                    }
                }
            }
        }

        // Commit, later write ports win.
        for (register, value) in latched {
            self.registers.insert(register, value);
        }
        for (id, addr, data) in writes {
            if let Some(contents) = self.memories.get_mut(&id) {
                contents.insert(addr, data);
            }
        }
        self.trace.record(&values);
        self.values = values;
        log::debug!("cycle {} committed", self.cycle);
        self.cycle += 1;
        Ok(())
    }

    fn contents(&self, node: &LogicNode) -> &HashMap<BigUint, BigUint> {
        let id = match node.param {
            OpParam::Memory { id, .. } => id,
            _ => unreachable!("memory task on a {} node", node.op),
        };
        unwrap!(
            self.memories.get(&id),
            "memory {} is missing from the simulation",
            id
        )
    }

    /// Returns the value `wire` had during the latest cycle.
    pub fn inspect(&self, wire: WireVector) -> Result<&BigUint, SimulationError> {
        let info = self
            .netlist
            .wire_info(wire)
            .map_err(|_| SimulationError::ForeignWire(wire.idx))?;
        self.values[wire.idx]
            .as_ref()
            .ok_or_else(|| SimulationError::NotSimulated(info.name.clone()))
    }

    /// Returns the value the wire called `name` had during the latest cycle.
    pub fn inspect_by_name(&self, name: &str) -> Result<&BigUint, SimulationError> {
        let wire = self
            .netlist
            .wire_by_name(name)
            .ok_or_else(|| SimulationError::UnknownWire(name.into()))?;
        self.inspect(wire)
    }

    // Create inspect_u8, inspect_u16...
    inspectors!(u8, u16, u32, u64, u128);

    /// Returns the value `register` will hold during the next cycle.
    pub fn register_value(&self, register: WireVector) -> Result<&BigUint, SimulationError> {
        let info = self
            .netlist
            .wire_info(register)
            .map_err(|_| SimulationError::ForeignWire(register.idx))?;
        self.registers
            .get(&register.idx)
            .ok_or_else(|| SimulationError::NotARegister(info.name.clone()))
    }

    /// Returns the word stored at `addr` of `memory`.
    pub fn memory_value<A: Into<BigUint>>(
        &self,
        memory: MemoryHandle,
        addr: A,
    ) -> Result<BigUint, SimulationError> {
        let block = self.netlist.memory_info(memory)?;
        let addr = addr.into();
        if !fits(&addr, block.addr_width) {
            return Err(SimulationError::MemoryOutOfRange {
                memory: block.name.clone(),
                address: addr,
            });
        }
        let contents = self
            .memories
            .get(&block.id)
            .ok_or(MemoryError::UnknownMemory(memory.idx))?;
        Ok(contents.get(&addr).cloned().unwrap_or_default())
    }

    pub fn trace(&self) -> &SimulationTrace {
        &self.trace
    }

    /// Returns the number of simulated cycles.
    pub fn cycle(&self) -> usize {
        self.cycle
    }

    /// Returns the simulated copy of the netlist.
    pub fn netlist(&self) -> &Netlist {
        &self.netlist
    }
}

/// Returns the value of `wire`, which the schedule guarantees has been computed.
fn arg<'a>(values: &'a [Option<BigUint>], wire: &WireVector) -> &'a BigUint {
    unwrap!(
        values[wire.idx].as_ref(),
        "wire {} read before being computed",
        wire.idx
    )
}

/// Computes the value of the single destination of a combinational node.
fn evaluate(node: &LogicNode, values: &[Option<BigUint>]) -> BigUint {
    let width = node.dests[0].width;
    let a = || arg(values, &node.args[0]);
    let b = || arg(values, &node.args[1]);
    match node.op {
        Op::And => a() & b(),
        Op::Or => a() | b(),
        Op::Xor => a() ^ b(),
        Op::Not => a() ^ &mask(width),
        Op::Add => truncate(&(a() + b()), width),
        Op::Sub => wrapping_sub(a(), b(), width),
        Op::Mul => truncate(&(a() * b()), width),
        Op::Select => match &node.param {
            OpParam::Select(positions) => select(a(), positions),
            _ => unreachable!("select without positions"),
        },
        Op::Concat => concat(node.args.iter().map(|w| (arg(values, w), w.width))),
        Op::Connect => truncate(a(), width),
        Op::Register | Op::Memory => unreachable!("{} is not combinational", node.op),
    }
}
