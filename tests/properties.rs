use proptest::prelude::*;
use rtlsim::{BigUint, Netlist, Simulation};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_connect_truncates(value in any::<u16>(), width in 1usize..16) {
        let mut n = Netlist::new();
        let wide = n.input(16, "wide").unwrap();
        let narrow = n.output(width, "narrow").unwrap();
        n.connect(narrow, wide).unwrap();

        let mut sim = Simulation::new(&n).unwrap();
        sim.step(vec![("wide", value)]).unwrap();
        let expected = u32::from(value) & ((1u32 << width) - 1);
        prop_assert_eq!(sim.inspect_u32(narrow).unwrap(), expected);
    }

    #[test]
    fn prop_zero_extension_keeps_value(value in any::<u8>(), extra in 0usize..24) {
        let mut n = Netlist::new();
        let a = n.input(8, "a").unwrap();
        let wide = n.zero_extend(a, 8 + extra).unwrap();

        let mut sim = Simulation::new(&n).unwrap();
        sim.step(vec![("a", value)]).unwrap();
        prop_assert_eq!(sim.inspect_u32(wide).unwrap(), u32::from(value));
    }

    #[test]
    fn prop_sign_extension_keeps_signed_value(value in any::<i8>()) {
        let mut n = Netlist::new();
        let a = n.signed_input(8, "a").unwrap();
        let wide = n.sign_extend(a, 32).unwrap();

        let mut sim = Simulation::new(&n).unwrap();
        sim.step(vec![("a", value as u8)]).unwrap();
        prop_assert_eq!(sim.inspect_u32(wide).unwrap() as i32, i32::from(value));
    }

    #[test]
    fn prop_add_and_mul_never_overflow(a in any::<u32>(), b in any::<u32>()) {
        let mut n = Netlist::new();
        let wa = n.input(32, "a").unwrap();
        let wb = n.input(32, "b").unwrap();
        let sum = n.add(wa, wb).unwrap();
        let product = n.mul(wa, wb).unwrap();
        prop_assert_eq!(sum.width(), 33);
        prop_assert_eq!(product.width(), 64);

        let mut sim = Simulation::new(&n).unwrap();
        sim.step(vec![("a", a), ("b", b)]).unwrap();
        prop_assert_eq!(sim.inspect_u64(sum).unwrap(), u64::from(a) + u64::from(b));
        prop_assert_eq!(
            sim.inspect(product).unwrap(),
            &(BigUint::from(a) * BigUint::from(b))
        );
    }

    #[test]
    fn prop_sub_wraps(a in any::<u8>(), b in any::<u8>()) {
        let mut n = Netlist::new();
        let wa = n.input(8, "a").unwrap();
        let wb = n.input(8, "b").unwrap();
        let diff = n.sub(wa, wb).unwrap();

        let mut sim = Simulation::new(&n).unwrap();
        sim.step(vec![("a", a), ("b", b)]).unwrap();
        let expected = (u16::from(a).wrapping_sub(u16::from(b))) & 0x1ff;
        prop_assert_eq!(sim.inspect_u16(diff).unwrap(), expected);
    }

    #[test]
    fn prop_memory_round_trip(addr in 0u8..16, data in any::<u8>()) {
        let mut n = Netlist::new();
        let mem = n.memory(8, 4).unwrap();
        let wa = n.input(4, "addr").unwrap();
        let wd = n.input(8, "data").unwrap();
        let read = n.read_memory(mem, wa).unwrap();
        n.write_memory(mem, wa, wd).unwrap();

        let mut sim = Simulation::new(&n).unwrap();
        sim.step(vec![("addr", addr), ("data", data)]).unwrap();
        prop_assert_eq!(sim.inspect_u8(read).unwrap(), 0);
        sim.step(vec![("addr", addr), ("data", 0)]).unwrap();
        prop_assert_eq!(sim.inspect_u8(read).unwrap(), data);
    }
}
