use rtlsim::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let n = &mut Netlist::new();
    let a = n.input(1, "a")?;
    let b = n.input(1, "b")?;
    let c = n.input(1, "c")?;
    let sum = n.output(1, "sum")?;
    let carry_out = n.output(1, "carry_out")?;

    let half = n.xor(a, b)?;
    let s = n.xor(half, c)?;
    n.connect(sum, s)?;

    let ab = n.and(a, b)?;
    let ac = n.and(a, c)?;
    let bc = n.and(b, c)?;
    let either = n.or(ab, ac)?;
    let carry = n.or(either, bc)?;
    n.connect(carry_out, carry)?;

    print!("{}", n);

    let mut sim = Simulation::new(n)?;
    for v in 0u8..8 {
        let (a, b, c) = (v & 1, (v >> 1) & 1, v >> 2);
        sim.step(vec![("a", a), ("b", b), ("c", c)])?;
        println!(
            "{} + {} + {} = {}{}",
            a,
            b,
            c,
            sim.inspect_u8(carry_out)?,
            sim.inspect_u8(sum)?
        );
    }

    sim.trace().print(2);
    Ok(())
}
