use crate::netlist::Netlist;
use crate::{BigUint, SimulationError};
use indexmap::{IndexMap, IndexSet};
use num_integer::div_ceil;

#[derive(Debug, Clone)]
struct Column {
    wire: usize,
    width: usize,
    temporary: bool,
    values: Vec<BigUint>,
}

/// Per wire history of the values seen on every simulated cycle.
///
/// Every traced wire gains exactly one value per cycle, in cycle order.
#[derive(Debug, Clone, Default)]
pub struct SimulationTrace {
    filter: Option<IndexSet<String>>,
    columns: IndexMap<String, Column>,
    cycles: usize,
}

impl SimulationTrace {
    /// Returns a trace recording every wire of the simulated netlist.
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns a trace recording only the wires called `names`.
    pub fn with_wires<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            filter: Some(names.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    /// Picks the wires of `netlist` to record and forgets any recorded value.
    pub(crate) fn attach(&mut self, netlist: &Netlist) -> Result<(), SimulationError> {
        let column = |wire: usize| {
            let info = &netlist.wires[wire];
            (
                info.name.clone(),
                Column {
                    wire,
                    width: info.width,
                    temporary: info.temporary,
                    values: Vec::new(),
                },
            )
        };
        self.columns = match &self.filter {
            None => (0..netlist.wires.len()).map(column).collect(),
            Some(names) => names
                .iter()
                .map(|name| match netlist.wire_by_name(name) {
                    Some(w) => Ok(column(w.idx)),
                    None => Err(SimulationError::UnknownWire(name.clone())),
                })
                .collect::<Result<_, _>>()?,
        };
        self.cycles = 0;
        Ok(())
    }

    /// Appends the values of one cycle, `values` is indexed by wire.
    pub(crate) fn record(&mut self, values: &[Option<BigUint>]) {
        for column in self.columns.values_mut() {
            column
                .values
                .push(values[column.wire].clone().unwrap_or_default());
        }
        self.cycles += 1;
    }

    /// Returns the values recorded for the wire called `name`, oldest first.
    pub fn get(&self, name: &str) -> Option<&[BigUint]> {
        self.columns.get(name).map(|c| c.values.as_slice())
    }

    /// Returns `(name, values)` for every traced wire in netlist order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[BigUint])> {
        self.columns
            .iter()
            .map(|(name, c)| (name.as_str(), c.values.as_slice()))
    }

    /// Returns the number of recorded cycles.
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    /// Returns `(name, waveform)` for every traced wire named by the user.
    fn rows(&self, symbol_len: usize) -> Vec<(String, String)> {
        let visible: Vec<_> = self
            .columns
            .iter()
            .filter(|(_, c)| !c.temporary)
            .collect();
        // Wide enough for a change marker and all the hex digits of the widest wire.
        let symbol_len = visible
            .iter()
            .filter(|(_, c)| c.width > 1)
            .map(|(_, c)| div_ceil(c.width, 4) + 1)
            .fold(std::cmp::max(symbol_len, 1), std::cmp::max);

        let mut rows = Vec::with_capacity(visible.len() + 1);
        let header: String = (0..self.cycles)
            .map(|cycle| format!("{:<width$}", cycle, width = symbol_len))
            .collect();
        rows.push((String::new(), header));

        for (name, column) in visible {
            let mut line = String::new();
            let mut previous: Option<&BigUint> = None;
            for value in &column.values {
                if column.width == 1 {
                    let level = if *value == BigUint::from(0u8) { "_" } else { "‾" };
                    line.push_str(&level.repeat(symbol_len));
                } else if previous != Some(value) {
                    let digits = format!(
                        "|{:0width$x}",
                        value,
                        width = div_ceil(column.width, 4)
                    );
                    line.push_str(&format!("{:<width$}", digits, width = symbol_len));
                } else {
                    line.push_str(&" ".repeat(symbol_len));
                }
                previous = Some(value);
            }
            rows.push((name.clone(), line));
        }
        rows
    }

    /// Returns an ascii waveform of the wires named by the user, one line per wire.
    ///
    /// One bit wires are drawn as levels, wider ones print their hex value whenever it
    /// changes. Each cycle takes at least `symbol_len` characters.
    pub fn render(&self, symbol_len: usize) -> String {
        let rows = self.rows(symbol_len);
        let name_len = rows.iter().map(|(n, _)| n.chars().count()).max().unwrap_or(0);
        let mut out = String::new();
        for (name, line) in rows {
            out.push_str(&format!("{:>width$} {}\n", name, line, width = name_len));
        }
        out
    }

    /// Prints [SimulationTrace::render] to stdout with coloured names.
    pub fn print(&self, symbol_len: usize) {
        let rows = self.rows(symbol_len);
        let name_len = rows.iter().map(|(n, _)| n.chars().count()).max().unwrap_or(0);
        for (name, line) in rows {
            colour::cyan!("{:>width$} ", name, width = name_len);
            colour::white_ln!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn traced() -> (Netlist, SimulationTrace) {
        let mut n = Netlist::new();
        let a = n.input(1, "a").unwrap();
        let b = n.input(8, "b").unwrap();
        n.and(a, b).unwrap();
        let mut trace = SimulationTrace::new();
        trace.attach(&n).unwrap();
        (n, trace)
    }

    fn cycle(n: &Netlist, a: u8, b: u8) -> Vec<Option<BigUint>> {
        let mut values = vec![Some(BigUint::from(0u8)); n.wire_count()];
        values[0] = Some(a.into());
        values[1] = Some(b.into());
        values
    }

    #[test]
    fn test_record() {
        let (n, mut trace) = traced();
        trace.record(&cycle(&n, 1, 7));
        trace.record(&cycle(&n, 0, 7));
        assert_eq!(trace.cycles(), 2);
        assert_eq!(
            trace.get("a").unwrap(),
            &[BigUint::from(1u8), BigUint::from(0u8)]
        );
        assert!(trace.get("missing").is_none());
        assert_eq!(trace.iter().count(), n.wire_count());
    }

    #[test]
    fn test_subset() {
        let (n, _) = traced();
        let mut trace = SimulationTrace::with_wires(vec!["b"]);
        trace.attach(&n).unwrap();
        trace.record(&cycle(&n, 1, 7));
        assert_eq!(trace.iter().map(|(name, _)| name).collect::<Vec<_>>(), vec!["b"]);

        let mut trace = SimulationTrace::with_wires(vec!["nope"]);
        assert_eq!(
            trace.attach(&n),
            Err(SimulationError::UnknownWire("nope".into()))
        );
    }

    #[test]
    fn test_render() {
        let (n, mut trace) = traced();
        trace.record(&cycle(&n, 1, 0x2a));
        trace.record(&cycle(&n, 0, 0x2a));
        trace.record(&cycle(&n, 1, 0x03));
        assert_eq!(
            trace.render(3),
            "  0  1  2  \n\
             a ‾‾‾___‾‾‾\n\
             b |2a   |03\n"
        );
    }
}
