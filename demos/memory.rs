use rtlsim::*;

/// Accumulates the value of `data` into the word at `addr` of a small memory.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let n = &mut Netlist::new();
    let mem = n.named_memory(8, 2, "acc")?;
    let addr = n.input(2, "addr")?;
    let data = n.input(8, "data")?;
    let we = n.input(1, "we")?;
    let word = n.output(8, "word")?;

    let current = n.read_memory(mem, addr)?;
    n.connect(word, current)?;
    let sum = n.add(current, data)?;
    let sum = n.slice(sum, ..8)?;
    n.write_memory(mem, addr, DataWithEnable::new(sum, we))?;

    let mut sim = Simulation::builder(n).memory_value(mem, 3u8, 100u8).build()?;
    let steps: [(u8, u8, u8); 6] = [(0, 5, 1), (0, 7, 1), (0, 0, 0), (3, 1, 1), (3, 1, 1), (3, 0, 0)];
    for (a, d, w) in steps.iter() {
        sim.step(vec![("addr", *a), ("data", *d), ("we", *w)])?;
    }
    println!("acc[0] = {}", sim.memory_value(mem, 0u8)?);
    println!("acc[3] = {}", sim.memory_value(mem, 3u8)?);

    sim.trace().print(4);
    Ok(())
}
