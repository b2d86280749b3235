use rtlsim::{
    BigUint, BuildError, DataWithEnable, Netlist, Simulation, SimulationError, WireVector,
};
use test_case::test_case;

fn one_bit_adder() -> (Netlist, WireVector, WireVector) {
    let mut n = Netlist::new();
    let a = n.input(1, "a").unwrap();
    let b = n.input(1, "b").unwrap();
    let c = n.input(1, "c").unwrap();
    let sum = n.output(1, "sum").unwrap();
    let carry_out = n.output(1, "carry_out").unwrap();

    let ab = n.xor(a, b).unwrap();
    let s = n.xor(ab, c).unwrap();
    n.connect(sum, s).unwrap();

    let a_and_b = n.and(a, b).unwrap();
    let a_and_c = n.and(a, c).unwrap();
    let b_and_c = n.and(b, c).unwrap();
    let either = n.or(a_and_b, a_and_c).unwrap();
    let carry = n.or(either, b_and_c).unwrap();
    n.connect(carry_out, carry).unwrap();

    (n, sum, carry_out)
}

#[test_case(0, 0, 0 ; "all low")]
#[test_case(1, 0, 0 ; "only a")]
#[test_case(0, 1, 0 ; "only b")]
#[test_case(0, 0, 1 ; "only c")]
#[test_case(1, 1, 0 ; "a and b")]
#[test_case(1, 0, 1 ; "a and c")]
#[test_case(0, 1, 1 ; "b and c")]
#[test_case(1, 1, 1 ; "all high")]
fn test_one_bit_adder(a: u8, b: u8, c: u8) {
    let (n, sum, carry_out) = one_bit_adder();
    let mut sim = Simulation::new(&n).unwrap();
    let total = a + b + c;
    for _ in 0..3 {
        sim.step(vec![("a", a), ("b", b), ("c", c)]).unwrap();
        assert_eq!(sim.inspect_u8(sum).unwrap(), total & 1);
        assert_eq!(sim.inspect_u8(carry_out).unwrap(), total >> 1);
    }
    assert_eq!(sim.trace().get("sum").unwrap().len(), 3);
}

#[test]
fn test_one_bit_adder_trace() {
    let (n, _, _) = one_bit_adder();
    let mut sim = Simulation::new(&n).unwrap();
    for v in 0u8..8 {
        sim.step(vec![("a", v & 1), ("b", (v >> 1) & 1), ("c", v >> 2)])
            .unwrap();
    }
    let carry: Vec<_> = sim.trace().get("carry_out").unwrap().to_vec();
    let expected: Vec<BigUint> = [0u8, 0, 0, 1, 0, 1, 1, 1]
        .iter()
        .map(|v| BigUint::from(*v))
        .collect();
    assert_eq!(carry, expected);
    assert!(sim.trace().render(1).contains("carry_out"));
}

#[test]
fn test_memory_scenario() {
    let mut n = Netlist::new();
    let mem = n.memory(8, 4).unwrap();
    let addr = n.input(4, "addr").unwrap();
    let data = n.input(8, "data").unwrap();
    let we = n.input(1, "we").unwrap();
    let out = n.output(8, "out").unwrap();

    let read = n.read_memory(mem, addr).unwrap();
    n.connect(out, read).unwrap();
    n.write_memory(mem, addr, DataWithEnable::new(data, we))
        .unwrap();

    let mut sim = Simulation::new(&n).unwrap();
    sim.step(vec![("addr", 3u8), ("data", 200), ("we", 1)])
        .unwrap();
    assert_eq!(sim.inspect_u8(out).unwrap(), 0);
    sim.step(vec![("addr", 3u8), ("data", 0), ("we", 0)])
        .unwrap();
    assert_eq!(sim.inspect_u8(out).unwrap(), 200);
    assert_eq!(
        sim.trace().get("out").unwrap(),
        &[BigUint::from(0u8), BigUint::from(200u8)]
    );
}

#[test_case(2, false ; "too narrow")]
#[test_case(3, true ; "exact width")]
#[test_case(8, true ; "wider")]
fn test_constant_width(width: usize, fits: bool) {
    let mut n = Netlist::new();
    match n.constant_with_width(5u8, width) {
        Ok(c) => {
            assert!(fits);
            let info = n.wire_info(c).unwrap();
            assert_eq!(info.width(), width);
            assert_eq!(info.const_value(), Some(&BigUint::from(5u8)));
        }
        Err(e) => {
            assert!(!fits);
            assert_eq!(
                e,
                BuildError::ConstantTooWide {
                    value: BigUint::from(5u8),
                    width
                }
            );
        }
    }
}

#[test]
fn test_register_next_bound_twice() {
    let mut n = Netlist::new();
    let a = n.input(4, "a").unwrap();
    let r = n.register(4, "r").unwrap();
    n.set_next(r, a).unwrap();
    assert_eq!(
        n.set_next(r, 0u8),
        Err(BuildError::NextAlreadyBound("r".into()))
    );
}

#[test]
fn test_counter() {
    let mut n = Netlist::new();
    let counter = n.register(3, "counter").unwrap();
    let plus_one = n.add(counter, 1u8).unwrap();
    n.set_next(counter, plus_one).unwrap();

    let mut sim = Simulation::new(&n).unwrap();
    let mut seen = Vec::new();
    for _ in 0..10 {
        sim.step(Vec::<(&str, u8)>::new()).unwrap();
        seen.push(sim.inspect_u8(counter).unwrap());
    }
    assert_eq!(seen, vec![0, 1, 2, 3, 4, 5, 6, 7, 0, 1]);
}

#[test]
fn test_combinational_loop_is_rejected() {
    let mut n = Netlist::new();
    let a = n.input(1, "a").unwrap();
    let w = n.wire(1, "w").unwrap();
    let x = n.and(a, w).unwrap();
    n.connect(w, x).unwrap();
    assert!(matches!(
        Simulation::new(&n),
        Err(SimulationError::CombinationalLoop(_))
    ));
}

#[test]
fn test_working_netlist() {
    use rtlsim::working::*;
    reset_working_netlist();
    let out = with_working_netlist(|n| {
        let a = n.input(4, "a").unwrap();
        let out = n.output(5, "out").unwrap();
        let doubled = n.add(a, a).unwrap();
        n.connect(out, doubled).unwrap();
        out
    });
    let n = reset_working_netlist();
    let mut sim = Simulation::new(&n).unwrap();
    sim.step(vec![("a", 9u8)]).unwrap();
    assert_eq!(sim.inspect_u8(out).unwrap(), 18);
}
