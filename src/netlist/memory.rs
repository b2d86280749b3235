use super::handles::*;
use super::node::*;
use super::Netlist;
use crate::{BuildError, MemoryError};
use smallvec::SmallVec;

/// Write port of a [MemBlock], the data is stored when `enable` is 1 at the end of a cycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct WritePort {
    pub addr: WireVector,
    pub data: WireVector,
    pub enable: WireVector,
}

/// Addressed storage with asynchronous reads and synchronous writes.
///
/// A memory block is stood for in the netlist by a single [Op::Memory] node that is rebuilt
/// from the full port lists every time a port is added.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MemBlock {
    pub(crate) name: String,
    pub(crate) width: usize,
    pub(crate) addr_width: usize,
    pub(crate) id: usize,
    pub(crate) read_ports: Vec<(WireVector, WireVector)>,
    pub(crate) write_ports: Vec<WritePort>,
    pub(crate) node: Option<usize>,
}

impl MemBlock {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the width of the stored words.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn addr_width(&self) -> usize {
        self.addr_width
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns `(address, data)` for every read port in creation order.
    pub fn read_ports(&self) -> &[(WireVector, WireVector)] {
        &self.read_ports
    }

    pub fn write_ports(&self) -> &[WritePort] {
        &self.write_ports
    }

    /// Returns the position in [Netlist::logic] of the node standing for the block, if any
    /// port has been added yet.
    pub fn node(&self) -> Option<usize> {
        self.node
    }

    fn derive_node(&self) -> LogicNode {
        let mut args: SmallVec<[WireVector; 2]> =
            self.read_ports.iter().map(|(addr, _)| *addr).collect();
        for port in &self.write_ports {
            args.extend_from_slice(&[port.addr, port.data, port.enable]);
        }
        let dests = self.read_ports.iter().map(|(_, data)| *data).collect();
        LogicNode::new(
            Op::Memory,
            OpParam::Memory {
                id: self.id,
                reads: self.read_ports.len(),
                writes: self.write_ports.len(),
            },
            args,
            dests,
        )
    }
}

impl Netlist {
    /// Returns a new memory block of `2^addr_width` words of `width` bits named `memN`.
    pub fn memory(&mut self, width: usize, addr_width: usize) -> Result<MemoryHandle, BuildError> {
        let mut k = self.memories.len();
        while self.memories.iter().any(|m| m.name == format!("mem{}", k)) {
            k += 1;
        }
        let name = format!("mem{}", k);
        self.named_memory(width, addr_width, name)
    }

    /// Returns a new memory block of `2^addr_width` words of `width` bits.
    ///
    /// Memory names live apart from wire names, they only have to be unique among memories.
    ///
    /// # Example
    /// ```
    /// # use rtlsim::{Netlist, DataWithEnable, Simulation, BigUint};
    /// let mut n = Netlist::new();
    /// let mem = n.named_memory(8, 4, "ram").unwrap();
    /// let addr = n.input(4, "addr").unwrap();
    /// let data = n.input(8, "data").unwrap();
    /// let we = n.input(1, "we").unwrap();
    ///
    /// let read = n.read_memory(mem, addr).unwrap();
    /// n.write_memory(mem, addr, DataWithEnable::new(data, we)).unwrap();
    ///
    /// let mut sim = Simulation::new(&n).unwrap();
    /// sim.step(vec![("addr", 3u8), ("data", 200), ("we", 1)]).unwrap();
    /// assert_eq!(sim.inspect_u8(read).unwrap(), 0);
    /// sim.step(vec![("addr", 3u8), ("data", 0), ("we", 0)]).unwrap();
    /// assert_eq!(sim.inspect_u8(read).unwrap(), 200);
    /// ```
    pub fn named_memory<S: Into<String>>(
        &mut self,
        width: usize,
        addr_width: usize,
        name: S,
    ) -> Result<MemoryHandle, BuildError> {
        let name = name.into();
        if width == 0 || addr_width == 0 {
            return Err(BuildError::ZeroWidth { name });
        }
        if name.is_empty() {
            return Err(BuildError::EmptyName);
        }
        if self.memories.iter().any(|m| m.name == name) {
            return Err(BuildError::DuplicateName(name));
        }
        let id = self.next_memory_id();
        log::trace!("memory {} ({} bit words, {} bit addresses)", name, width, addr_width);
        self.memories.push(MemBlock {
            name,
            width,
            addr_width,
            id,
            read_ports: Vec::new(),
            write_ports: Vec::new(),
            node: None,
        });
        Ok(MemoryHandle {
            netlist: self.id,
            idx: self.memories.len() - 1,
        })
    }

    /// Returns the memory block behind `memory`.
    pub fn memory_info(&self, memory: MemoryHandle) -> Result<&MemBlock, MemoryError> {
        if memory.netlist != self.id || memory.idx >= self.memories.len() {
            return Err(MemoryError::UnknownMemory(memory.idx));
        }
        Ok(&self.memories[memory.idx])
    }

    /// Adds a read port to `memory` and returns the wire holding the word at `addr`.
    ///
    /// Reads are asynchronous, the returned wire follows `addr` within the same cycle and
    /// sees the contents committed at the end of the previous one.
    pub fn read_memory<A: Into<Operand>>(
        &mut self,
        memory: MemoryHandle,
        addr: A,
    ) -> Result<WireVector, BuildError> {
        let addr = self.memory_wire(memory, addr.into(), "address")?;
        let block = &self.memories[memory.idx];
        if addr.width != block.addr_width {
            return Err(MemoryError::AddressWidth {
                memory: block.name.clone(),
                wire: self.wires[addr.idx].name.clone(),
                expected: block.addr_width,
                found: addr.width,
            }
            .into());
        }
        let width = block.width;
        let data = self.alloc_temp(width, false);
        self.memories[memory.idx].read_ports.push((addr, data));
        self.rederive(memory.idx);
        Ok(data)
    }

    /// Adds a write port to `memory` storing `data` at `addr`.
    ///
    /// Plain data is written on every cycle, [DataWithEnable] only when its 1 bit enable is set.
    pub fn write_memory<A: Into<Operand>, D: Into<WriteData>>(
        &mut self,
        memory: MemoryHandle,
        addr: A,
        data: D,
    ) -> Result<(), BuildError> {
        let addr = self.memory_wire(memory, addr.into(), "address")?;
        let (data, enable) = match data.into() {
            WriteData::Always(data) => (self.memory_wire(memory, data, "data")?, None),
            WriteData::Enabled(DataWithEnable { data, enable }) => (
                self.memory_wire(memory, data, "data")?,
                Some(self.memory_wire(memory, enable, "enable")?),
            ),
        };

        let block = &self.memories[memory.idx];
        let name = |w: WireVector| self.wires[w.idx].name.clone();
        if addr.width != block.addr_width {
            return Err(MemoryError::AddressWidth {
                memory: block.name.clone(),
                wire: name(addr),
                expected: block.addr_width,
                found: addr.width,
            }
            .into());
        }
        if data.width != block.width {
            return Err(MemoryError::DataWidth {
                memory: block.name.clone(),
                wire: name(data),
                expected: block.width,
                found: data.width,
            }
            .into());
        }
        if let Some(enable) = enable {
            if enable.width != 1 {
                return Err(MemoryError::EnableWidth {
                    memory: block.name.clone(),
                    wire: name(enable),
                    found: enable.width,
                }
                .into());
            }
        }

        let enable = match enable {
            Some(enable) => enable,
            None => self.alloc_constant(1u8.into(), 1, false),
        };
        self.memories[memory.idx]
            .write_ports
            .push(WritePort { addr, data, enable });
        self.rederive(memory.idx);
        Ok(())
    }

    /// Checks that `operand` is a readable wire of this netlist usable with `memory`.
    fn memory_wire(
        &self,
        memory: MemoryHandle,
        operand: Operand,
        argument: &'static str,
    ) -> Result<WireVector, BuildError> {
        let block = self.memory_info(memory)?;
        match operand {
            Operand::Wire(w) => {
                self.check_readable(w)?;
                Ok(w)
            }
            Operand::Literal(_) => Err(MemoryError::NotAWire {
                memory: block.name.clone(),
                argument,
            }
            .into()),
        }
    }

    /// Replaces the node of the memory at `idx` with one built from its current ports.
    fn rederive(&mut self, idx: usize) {
        let block = &self.memories[idx];
        let node = block.derive_node();
        log::debug!(
            "memory {}: {} read ports, {} write ports",
            block.name,
            block.read_ports.len(),
            block.write_ports.len()
        );
        match block.node {
            Some(node_idx) => self.replace_node(node_idx, node),
            None => {
                let node_idx = self.add_node(node);
                self.memories[idx].node = Some(node_idx);
            }
        }
    }
}
