use chip8::{constants::*, prelude::*};

fn program(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

fn boot(words: &[u16]) -> Chip8Vm {
    let mut vm = Chip8Vm::new();
    vm.reset();
    vm.load_bytecode(&program(words)).unwrap();
    vm
}

#[test]
fn test_add_registers() {
    let mut vm = boot(&[0x6A02, 0x6B03, 0x8AB4]);

    for _ in 0..3 {
        assert_eq!(vm.step(), Ok(false));
    }

    assert_eq!(vm.cpu().register(0xA), 5);
    assert_eq!(vm.cpu().register(0xF), 0);
}

#[test]
fn test_clear_screen_on_empty_display() {
    let mut vm = boot(&[0x00E0]);
    assert_eq!(vm.step(), Ok(false));
}

#[test]
fn test_clear_screen_on_lit_display() {
    let mut vm = boot(&[
        0xD005, // DRW v0, v0, 5 ; glyph "0" at (0, 0)
        0x00E0, // CLS
    ]);

    assert_eq!(vm.step(), Ok(true));
    assert_eq!(vm.step(), Ok(true));
    assert!(vm.display_buffer().iter().all(|px| !px));
}

#[test]
fn test_double_draw_restores_display() {
    let mut vm = boot(&[
        0x6010, // LD v0, 16
        0x6108, // LD v1, 8
        0xA000, // LD I, glyph "0"
        0xD015, // DRW v0, v1, 5
        0xD015, // DRW v0, v1, 5
    ]);
    vm.run_steps(3).unwrap();
    let before = *vm.display_buffer();

    assert_eq!(vm.step(), Ok(true));
    let drawn = *vm.display_buffer();
    assert_ne!(drawn, before);
    assert_eq!(vm.cpu().register(0xF), 0);

    assert_eq!(vm.step(), Ok(true));
    assert_eq!(*vm.display_buffer(), before);
    assert_eq!(vm.cpu().register(0xF), 1);
}

#[test]
fn test_sprite_wraps_display_edges() {
    let mut vm = boot(&[
        0x603E, // LD v0, 62
        0x611F, // LD v1, 31
        0xA000, // LD I, glyph "0"
        0xD012, // DRW v0, v1, 2
    ]);
    vm.run_steps(4).unwrap();

    let px = |x: usize, y: usize| vm.display_buffer()[x + y * DISPLAY_WIDTH];

    // Row 0xF0 starting at x=62 wraps to x=0..2 on the bottom row.
    assert!(px(62, 31) && px(63, 31) && px(0, 31) && px(1, 31));
    assert!(!px(2, 31));
    // Second row 0x90 wraps to the top.
    assert!(px(62, 0));
    assert!(!px(63, 0));
    assert!(px(1, 0));
}

#[test]
fn test_timers_saturate() {
    let mut vm = boot(&[0x6005, 0xF015, 0xF018]);
    vm.run_steps(3).unwrap();

    for n in 1..=8_u8 {
        vm.tick_timers();
        assert_eq!(vm.cpu().delay_timer(), 5_u8.saturating_sub(n));
        assert_eq!(vm.cpu().sound_timer(), 5_u8.saturating_sub(n));
    }
    assert!(!vm.sound_timer_active());
}

#[test]
fn test_timers_independent_of_steps() {
    // Infinite loop that never touches the timers.
    let mut vm = boot(&[0x6009, 0xF015, 0x1204]);
    vm.run_steps(1000).unwrap();
    assert_eq!(vm.cpu().delay_timer(), 9);

    vm.tick_timers();
    assert_eq!(vm.cpu().delay_timer(), 8);
}

#[test]
fn test_key_wait_resumes() {
    let mut vm = boot(&[
        0xF40A, // LD v4, K
        0x7401, // ADD v4, 1
    ]);

    for _ in 0..5 {
        assert_eq!(vm.step(), Ok(false));
        assert_eq!(vm.cpu().pc(), 0x200);
    }

    vm.key_down(0xB).unwrap();
    vm.key_up(0xB).unwrap();
    assert_eq!(vm.cpu().register(4), 0xB);

    vm.step().unwrap();
    assert_eq!(vm.cpu().pc(), 0x204);
    assert_eq!(vm.cpu().register(4), 0xC);
}

#[test]
fn test_invalid_key_code() {
    let mut vm = boot(&[0xF00A]);
    vm.step().unwrap();

    assert_eq!(vm.key_down(16), Err(Chip8Error::InvalidKeyCode(16)));
    assert_eq!(vm.key_up(0xFF), Err(Chip8Error::InvalidKeyCode(0xFF)));

    // No state was touched, the machine is still waiting.
    assert!(vm.is_key_waiting());
    assert_eq!(vm.dump_keys().unwrap(), "");
}

#[test]
fn test_load_does_not_reset() {
    let mut vm = boot(&[0x6A07]);
    vm.step().unwrap();

    vm.load_bytecode(&program(&[0x6B01])).unwrap();
    assert_eq!(vm.cpu().register(0xA), 7);
    assert_eq!(vm.cpu().pc(), 0x202);
}

#[test]
fn test_host_copies_program() {
    let mut vm = Chip8Vm::new();
    vm.memory_mut()[MEM_START..MEM_START + 2].copy_from_slice(&[0x6C, 0x2A]);
    vm.step().unwrap();
    assert_eq!(vm.cpu().register(0xC), 0x2A);
}

#[test]
fn test_reset_restores_power_on_state() {
    let fresh = Chip8Vm::new();

    let mut vm = boot(&[
        0x60FF, // LD v0, 0xFF
        0xF015, // LD DT, v0
        0xF018, // LD ST, v0
        0xA300, // LD I, 0x300
        0xF055, // LD [I], v0
        0xD005, // DRW v0, v0, 5
        0x220E, // CALL 0x20E
        0xF30A, // LD v3, K
    ]);
    vm.key_down(0x2).unwrap();
    vm.run_steps(8).unwrap();
    assert!(vm.is_key_waiting());

    vm.reset();

    assert_eq!(vm.cpu(), fresh.cpu());
    assert_eq!(&vm.memory()[..], &fresh.memory()[..]);
    assert_eq!(&vm.display_buffer()[..], &fresh.display_buffer()[..]);
    assert!(!vm.is_key_waiting());
    assert!(vm.fault().is_none());
}

#[test]
fn test_halted_until_reset() {
    let mut vm = boot(&[0xFFFF]);
    let err = Chip8Error::InvalidOpcode {
        word: 0xFFFF,
        pc: 0x200,
    };

    assert_eq!(vm.step(), Err(err.clone()));
    assert_eq!(vm.step(), Err(err));

    vm.reset();
    vm.load_bytecode(&program(&[0x6001])).unwrap();
    assert_eq!(vm.step(), Ok(false));
}

#[test]
fn test_instances_are_independent() {
    let mut a = boot(&[0x6001]);
    let b = boot(&[0x6002]);

    a.step().unwrap();
    assert_eq!(a.cpu().register(0), 1);
    assert_eq!(b.cpu().register(0), 0);
    assert_eq!(b.cpu().pc(), 0x200);
}

#[test]
fn test_disassembler_listing() {
    let rom = program(&[0x6A02, 0x6B03, 0x8AB4]);
    let listing = Disassembler::new(&rom).disassemble_all().unwrap();
    assert_eq!(
        listing,
        "0200: 6A02  LD VA, 0x02\n0202: 6B03  LD VB, 0x03\n0204: 8AB4  ADD VA, VB\n"
    );
}
