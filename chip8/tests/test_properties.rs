use chip8::{constants::*, prelude::*};
use proptest::prelude::*;

proptest! {
    /// Arbitrary programs never panic. Every step either succeeds, or halts
    /// the machine with an error that names the faulting instruction.
    #[test]
    fn test_arbitrary_programs_dont_panic(
        rom in proptest::collection::vec(any::<u8>(), 0..=MAX_PROGRAM_SIZE),
        keys in proptest::collection::vec(0_u8..16, 1..8),
        seed in any::<u64>(),
    ) {
        let mut vm = Chip8Vm::new();
        vm.seed_rng(seed);
        vm.load_bytecode(&rom).unwrap();

        for (i, key) in (0..500).zip(keys.iter().cycle()) {
            if i % 50 == 0 {
                vm.key_down(*key).unwrap();
                vm.tick_timers();
            }

            match vm.step() {
                Ok(_) => {}
                Err(err) => {
                    prop_assert!(err.is_fatal());
                    prop_assert_eq!(vm.fault(), Some(&err));
                    break;
                }
            }
        }
    }

    #[test]
    fn test_add_carry(x in any::<u8>(), y in any::<u8>()) {
        let mut vm = Chip8Vm::new();
        vm.load_bytecode(&[0x60, x, 0x61, y, 0x80, 0x14]).unwrap();
        vm.run_steps(3).unwrap();

        prop_assert_eq!(vm.cpu().register(0), x.wrapping_add(y));
        prop_assert_eq!(vm.cpu().register(0xF), (x as u16 + y as u16 > 0xFF) as u8);
    }

    #[test]
    fn test_sub_borrow(x in any::<u8>(), y in any::<u8>()) {
        let mut vm = Chip8Vm::new();
        vm.load_bytecode(&[0x60, x, 0x61, y, 0x80, 0x15]).unwrap();
        vm.run_steps(3).unwrap();

        prop_assert_eq!(vm.cpu().register(0), x.wrapping_sub(y));
        prop_assert_eq!(vm.cpu().register(0xF), (x >= y) as u8);
    }

    #[test]
    fn test_shifts(x in any::<u8>()) {
        let mut vm = Chip8Vm::new();
        vm.load_bytecode(&[0x60, x, 0x61, x, 0x80, 0x06, 0x82, 0xF0, 0x81, 0x0E]).unwrap();

        vm.run_steps(4).unwrap();
        prop_assert_eq!(vm.cpu().register(0), x >> 1);
        prop_assert_eq!(vm.cpu().register(2), x & 1);

        vm.step().unwrap();
        prop_assert_eq!(vm.cpu().register(1), x << 1);
        prop_assert_eq!(vm.cpu().register(0xF), x >> 7);
    }

    #[test]
    fn test_timer_countdown(value in any::<u8>(), ticks in 0_usize..300) {
        let mut vm = Chip8Vm::new();
        vm.load_bytecode(&[0x60, value, 0xF0, 0x15]).unwrap();
        vm.run_steps(2).unwrap();

        for _ in 0..ticks {
            vm.tick_timers();
        }

        let expected = (value as usize).saturating_sub(ticks) as u8;
        prop_assert_eq!(vm.cpu().delay_timer(), expected);
    }

    #[test]
    fn test_double_draw_is_identity(x in any::<u8>(), y in any::<u8>(), digit in 0_u8..16) {
        let mut vm = Chip8Vm::new();
        vm.load_bytecode(&[
            0x60, x,
            0x61, y,
            0x62, digit,
            0xF2, 0x29,
            0xD0, 0x15,
            0xD0, 0x15,
        ]).unwrap();

        vm.run_steps(5).unwrap();
        prop_assert_eq!(vm.cpu().register(0xF), 0);
        prop_assert!(vm.display_buffer().iter().any(|px| *px));

        prop_assert_eq!(vm.step(), Ok(true));
        prop_assert_eq!(vm.cpu().register(0xF), 1);
        prop_assert!(vm.display_buffer().iter().all(|px| !px));
    }
}
