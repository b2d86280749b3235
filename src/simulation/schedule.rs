use crate::netlist::{Netlist, Op, OpParam, WireVector};
use crate::SimulationError;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

/// One unit of work of a simulated cycle, indices point into [Netlist::logic].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub(crate) enum Task {
    /// Computes the destinations of a combinational node.
    Eval(usize),
    /// Resolves the read ports of a memory node from the pre-cycle contents.
    MemRead(usize),
    /// Captures the next value of a register for the commit phase.
    Latch(usize),
    /// Queues the enabled write ports of a memory node for the commit phase.
    MemWrite(usize),
}

/// Orders the work of a cycle.
///
/// Combinational nodes and memory reads come first, in an order where every wire is computed
/// before it is read. Registers and memory writes follow, they only capture values that the
/// commit phase applies once every node has been evaluated.
pub(crate) fn schedule(netlist: &Netlist) -> Result<Vec<Task>, SimulationError> {
    let name = |w: &WireVector| netlist.wires[w.idx].name.clone();

    // Every wire that isn't a root must be driven.
    for w in netlist.wires() {
        if !w.kind.is_root() && netlist.drivers[w.idx].is_none() {
            return Err(SimulationError::Undriven(name(&w)));
        }
    }

    let mut graph = DiGraph::<usize, ()>::new();
    let mut task_of: Vec<Option<NodeIndex>> = vec![None; netlist.logic.len()];
    let mut sequential = Vec::new();
    for (idx, node) in netlist.logic.iter().enumerate() {
        match node.op {
            Op::Register => sequential.push(Task::Latch(idx)),
            Op::Memory => {
                task_of[idx] = Some(graph.add_node(idx));
                sequential.push(Task::MemWrite(idx));
            }
            _ => task_of[idx] = Some(graph.add_node(idx)),
        }
    }

    for (idx, node) in netlist.logic.iter().enumerate() {
        let task = match task_of[idx] {
            Some(task) => task,
            None => continue,
        };
        // Only the read addresses feed the read ports of a memory.
        let args = match (node.op, &node.param) {
            (Op::Memory, OpParam::Memory { reads, .. }) => &node.args[..*reads],
            _ => &node.args[..],
        };
        for arg in args {
            if arg.kind.is_root() {
                continue;
            }
            if let Some(producer) = netlist.drivers[arg.idx].and_then(|d| task_of[d]) {
                graph.add_edge(producer, task, ());
            }
        }
    }

    let order = toposort(&graph, None).map_err(|cycle| {
        let node = &netlist.logic[graph[cycle.node_id()]];
        let wire = node.dests.first().or_else(|| node.args.first());
        SimulationError::CombinationalLoop(wire.map(name).unwrap_or_default())
    })?;

    let mut tasks: Vec<Task> = order
        .into_iter()
        .map(|task| {
            let idx = graph[task];
            match netlist.logic[idx].op {
                Op::Memory => Task::MemRead(idx),
                _ => Task::Eval(idx),
            }
        })
        .collect();
    log::debug!(
        "scheduled {} combinational and {} sequential tasks",
        tasks.len(),
        sequential.len()
    );
    tasks.extend(sequential);
    Ok(tasks)
}
