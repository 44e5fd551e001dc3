//! Virtual machine.
use std::fmt::{self, Write};

use log::{debug, warn};
use rand::{prelude::*, rngs::StdRng};

use crate::{
    bytecode::fetch,
    constants::*,
    cpu::Chip8Cpu,
    display::Chip8DisplayBuffer,
    error::{Chip8Error, Chip8Result},
    keypad::KeyCode,
    opcode::Op,
};

/// A complete Chip-8 machine.
///
/// The machine doesn't own a clock. The host drives it by calling
/// [`Chip8Vm::step`] at its instruction rate, and [`Chip8Vm::tick_timers`]
/// at 60 Hz, in whatever ratio suits it.
pub struct Chip8Vm {
    cpu: Chip8Cpu,
    rng: StdRng,
    /// Error that halted the machine, if any. Cleared by reset.
    fault: Option<Chip8Error>,
}

impl Default for Chip8Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8Vm {
    /// Create a machine in its reset state.
    pub fn new() -> Self {
        Chip8Vm {
            cpu: Chip8Cpu::new(),
            rng: StdRng::from_entropy(),
            fault: None,
        }
    }

    /// Replace the random number source with a deterministic one.
    ///
    /// Intended for test harnesses that need reproducible `RND` results.
    #[doc(hidden)]
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Clear all state in preparation for a fresh program.
    ///
    /// Memory is zeroed and the builtin font is loaded again. Registers, timers,
    /// call stack, display and keypad are cleared, and the program counter is set
    /// to the program origin. A halted machine is resumed.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.fault = None;

        debug!("machine reset");
    }

    /// Copy a program into memory at the origin address.
    ///
    /// The machine is not reset; callers are expected to call [`Chip8Vm::reset`] first.
    /// Programs that don't fit between the origin and the end of memory are rejected
    /// without touching memory.
    pub fn load_bytecode(&mut self, bytecode: &[u8]) -> Chip8Result<()> {
        if !check_program_size(bytecode) {
            return Err(Chip8Error::ProgramTooLarge {
                size: bytecode.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }

        // Load program into virtual RAM
        self.cpu.ram[MEM_START..MEM_START + bytecode.len()].copy_from_slice(bytecode);

        debug!("loaded program of {} bytes", bytecode.len());

        Ok(())
    }

    pub fn display_buffer(&self) -> Chip8DisplayBuffer<'_> {
        self.cpu.display.buffer()
    }

    /// Raw view of the machine's memory.
    pub fn memory(&self) -> &[u8; MEM_SIZE] {
        &self.cpu.ram
    }

    /// Writable view of the machine's memory.
    ///
    /// Hosts may use this to copy a program in themselves. Writing while a
    /// program is running is not guarded against.
    pub fn memory_mut(&mut self) -> &mut [u8; MEM_SIZE] {
        &mut self.cpu.ram
    }

    /// Read-only view of registers, timers and the call stack.
    pub fn cpu(&self) -> &Chip8Cpu {
        &self.cpu
    }

    /// Error that halted the machine.
    pub fn fault(&self) -> Option<&Chip8Error> {
        self.fault.as_ref()
    }

    /// Whether the machine is stalled on `Fx0A` waiting for a keypress.
    pub fn is_key_waiting(&self) -> bool {
        self.cpu.keypad.is_waiting()
    }

    /// Whether the buzzer should currently sound.
    pub fn sound_timer_active(&self) -> bool {
        self.cpu.sound_timer > 0
    }
}

/// Outcome of a single interpreter cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Flow {
    Ok,
    /// Program counter has jumped to a new address.
    ///
    /// This is useful for the caller to avoid being
    /// blocked on infinite or long running loops.
    ///
    /// This is returned when the interpreter encounters:
    ///
    /// - 1nnn (`JP addr`)
    /// - 2nnn (`CALL addr`)
    /// - 00EE (`RET`)
    /// - Bnnn (`JP V0, addr`)
    Jump,
    /// The display buffer changed and should be redrawn.
    Draw,
    /// The sound timer was loaded.
    Sound,
    /// Wait for a keypress.
    ///
    /// This is triggered by the opcode `Fx0A` (`LD Vx, K`), which stops
    /// execution until a key is pressed, and loads the key value into `Vx`.
    KeyWait,
}

/// Input and timers
impl Chip8Vm {
    /// Record a key-down edge for a raw key value.
    ///
    /// Values outside of the keypad are rejected without changing any state.
    pub fn key_down(&mut self, key: u8) -> Chip8Result<()> {
        let key = KeyCode::try_from(key)?;
        self.set_key(key, true);
        Ok(())
    }

    /// Record a key-up edge for a raw key value.
    pub fn key_up(&mut self, key: u8) -> Chip8Result<()> {
        let key = KeyCode::try_from(key)?;
        self.set_key(key, false);
        Ok(())
    }

    /// Sets the keyboard key input state.
    ///
    /// If the VM is waiting for keyboard input, a key press resolves the wait:
    /// the key is stored in the waiting register and the program counter moves
    /// past the wait instruction.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        self.cpu.keypad.set(key, pressed);

        if pressed {
            if let Some(vx) = self.cpu.keypad.end_wait() {
                self.cpu.set_register(vx, key.as_u8());
                self.cpu.skip();
            }
        }
    }

    /// Clear the keyboard input state, setting all keys to up.
    pub fn clear_keys(&mut self) {
        self.cpu.keypad.clear()
    }

    /// Count down the delay and sound timers.
    ///
    /// The host calls this at 60 Hz, independently from [`Chip8Vm::step`].
    pub fn tick_timers(&mut self) {
        self.cpu.tick_timers();
    }
}

/// Interpreter
impl Chip8Vm {
    /// Execute a single instruction.
    ///
    /// Returns `true` when the display buffer changed and should be redrawn.
    pub fn step(&mut self) -> Chip8Result<bool> {
        self.cycle().map(|flow| flow == Flow::Draw)
    }

    /// Execute up to `step_count` instructions, stopping at the first error.
    ///
    /// Returns `true` when any of the instructions changed the display.
    pub fn run_steps(&mut self, step_count: usize) -> Chip8Result<bool> {
        let mut redraw = false;

        for _ in 0..step_count {
            redraw |= self.step()?;
        }

        Ok(redraw)
    }

    /// Execute a single instruction, reporting its effect on control flow.
    ///
    /// While the machine is waiting for a key this is a no-op returning
    /// [`Flow::KeyWait`]. Once halted by an error, the same error is returned
    /// until the machine is reset.
    pub fn cycle(&mut self) -> Chip8Result<Flow> {
        if let Some(err) = &self.fault {
            return Err(err.clone());
        }

        if self.cpu.keypad.is_waiting() {
            return Ok(Flow::KeyWait);
        }

        // Each instruction is two bytes, with the opcode identity in the first 4-bit nibble.
        let pc = self.cpu.pc;
        let word = fetch(&*self.cpu.ram, pc as usize);

        self.cpu.pc = pc.wrapping_add(2);

        match Op::decode(word) {
            Some(op) => {
                op_trace(pc, word, &op);
                self.exec(pc, op)
            }
            None => Err(self.halt(pc, Chip8Error::InvalidOpcode { word, pc })),
        }
    }

    /// Stop the machine on a fatal error.
    ///
    /// The program counter is rewound to the faulting instruction.
    fn halt(&mut self, pc: Address, err: Chip8Error) -> Chip8Error {
        warn!("machine halted: {err}");

        self.cpu.pc = pc;
        self.fault = Some(err.clone());
        err
    }

    fn exec(&mut self, pc: Address, op: Op) -> Chip8Result<Flow> {
        let cpu = &mut self.cpu;
        let mut control_flow = Flow::Ok;

        match op {
            Op::ClearScreen => {
                if cpu.display.clear() {
                    control_flow = Flow::Draw;
                }
            }
            Op::Return => match cpu.pop() {
                Some(addr) => {
                    cpu.pc = addr;
                    control_flow = Flow::Jump;
                }
                None => return Err(self.halt(pc, Chip8Error::StackUnderflow { pc })),
            },
            Op::JumpAddress { address } => {
                cpu.pc = address;
                control_flow = Flow::Jump;
            }
            Op::Call { address } => {
                // Return address is the instruction after the call.
                if !cpu.push(cpu.pc) {
                    return Err(self.halt(pc, Chip8Error::StackOverflow { pc }));
                }
                cpu.pc = address;
                control_flow = Flow::Jump;
            }
            Op::Skip_Eq_Byte { vx, nn } => {
                if cpu.register(vx) == nn {
                    cpu.skip();
                }
            }
            Op::Skip_NotEq_Byte { vx, nn } => {
                if cpu.register(vx) != nn {
                    cpu.skip();
                }
            }
            Op::Skip_Eq { vx, vy } => {
                if cpu.register(vx) == cpu.register(vy) {
                    cpu.skip();
                }
            }
            Op::Load_Byte { vx, nn } => cpu.set_register(vx, nn),
            Op::Add_Byte { vx, nn } => {
                let x = cpu.register(vx);
                cpu.set_register(vx, x.wrapping_add(nn));
            }
            // Arithmetic writes the result before the flag, so VF holds the
            // flag even when it is also the destination register.
            Op::Load_Vx_Vy { vx, vy } => cpu.set_register(vx, cpu.register(vy)),
            Op::Or_Vx_Vy { vx, vy } => cpu.set_register(vx, cpu.register(vx) | cpu.register(vy)),
            Op::And_Vx_Vy { vx, vy } => cpu.set_register(vx, cpu.register(vx) & cpu.register(vy)),
            Op::Xor_Vx_Vy { vx, vy } => cpu.set_register(vx, cpu.register(vx) ^ cpu.register(vy)),
            Op::Add_Vx_Vy { vx, vy } => {
                let (result, carry) = cpu.register(vx).overflowing_add(cpu.register(vy));
                cpu.set_register(vx, result);
                cpu.set_flag(carry);
            }
            Op::Sub_Vx_Vy { vx, vy } => {
                let (result, borrow) = cpu.register(vx).overflowing_sub(cpu.register(vy));
                cpu.set_register(vx, result);
                cpu.set_flag(!borrow);
            }
            Op::ShiftRight { vx } => {
                let x = cpu.register(vx);
                cpu.set_register(vx, x >> 1);
                cpu.set_flag(x & 1 == 1);
            }
            Op::SubReverse_Vx_Vy { vx, vy } => {
                let (result, borrow) = cpu.register(vy).overflowing_sub(cpu.register(vx));
                cpu.set_register(vx, result);
                cpu.set_flag(!borrow);
            }
            Op::ShiftLeft { vx } => {
                let x = cpu.register(vx);
                cpu.set_register(vx, x << 1);
                cpu.set_flag(x >> 7 == 1);
            }
            Op::Skip_NotEq { vx, vy } => {
                if cpu.register(vx) != cpu.register(vy) {
                    cpu.skip();
                }
            }
            Op::Load_Address { address } => cpu.address = address,
            Op::Jump_V0 { address } => {
                cpu.pc = address.wrapping_add(cpu.register(0) as Address);
                control_flow = Flow::Jump;
            }
            Op::Random { vx, nn } => {
                let value = nn & self.rng.gen::<u8>();
                cpu.set_register(vx, value);
            }
            // Sprite is encoded as 8 pixels wide, N pixels high, stored in bits located in
            // memory pointed to by address register I.
            //
            // If the drawing operation erases existing pixels in the display buffer, register VF is set to
            // 1, and set to 0 if no display bits are unset. This is used for collision detection.
            Op::Draw { vx, vy, n } => {
                let (x, y) = (cpu.register(vx) as usize, cpu.register(vy) as usize);
                let addr = cpu.address as usize;
                let n = n as usize;

                let mut rows = [0_u8; 0xF];
                for (r, row) in rows.iter_mut().enumerate().take(n) {
                    *row = cpu.read(addr + r);
                }

                let result = cpu.display.draw_sprite(x, y, rows[..n].iter().copied());
                cpu.set_flag(result.collision);

                if result.changed {
                    control_flow = Flow::Draw;
                }
            }
            Op::Skip_Key { vx } => {
                if cpu.keypad.is_pressed(key_of(cpu.register(vx))) {
                    cpu.skip();
                }
            }
            Op::Skip_NotKey { vx } => {
                if !cpu.keypad.is_pressed(key_of(cpu.register(vx))) {
                    cpu.skip();
                }
            }
            Op::Load_Vx_Delay { vx } => cpu.set_register(vx, cpu.delay_timer),
            Op::Wait_Key { vx } => {
                // Rewind the program counter to stall the machine
                // until a key press resolves the wait.
                cpu.pc = pc;
                cpu.keypad.begin_wait(vx);
                control_flow = Flow::KeyWait;
            }
            Op::Load_Delay_Vx { vx } => cpu.delay_timer = cpu.register(vx),
            Op::Load_Sound_Vx { vx } => {
                cpu.sound_timer = cpu.register(vx);
                control_flow = Flow::Sound;
            }
            Op::Add_Address { vx } => {
                cpu.address = cpu.address.wrapping_add(cpu.register(vx) as Address);
            }
            Op::Load_Font { vx } => {
                let digit = (cpu.register(vx) & 0xF) as Address;
                cpu.address = FONTSET_START + digit * FONTSET_HEIGHT as Address;
            }
            #[rustfmt::skip]
            Op::Store_Bcd { vx } => {
                let addr = cpu.address as usize;
                let x = cpu.register(vx);
                cpu.write(addr,     x / 100);
                cpu.write(addr + 1, x / 10 % 10);
                cpu.write(addr + 2, x % 10);
            }
            Op::Store_Registers { vx } => {
                let addr = cpu.address as usize;
                for v in 0..=vx {
                    cpu.write(addr + v as usize, cpu.register(v));
                }
            }
            Op::Load_Registers { vx } => {
                let addr = cpu.address as usize;
                for v in 0..=vx {
                    cpu.set_register(v, cpu.read(addr + v as usize));
                }
            }
        }

        Ok(control_flow)
    }
}

/// Keys are selected by the low nibble of the register value.
#[inline(always)]
fn key_of(value: u8) -> KeyCode {
    KeyCode::ALL[(value & 0xF) as usize]
}

#[inline(always)]
fn check_program_size(bytecode: &[u8]) -> bool {
    bytecode.len() <= MAX_PROGRAM_SIZE
}

/// Troubleshooting
#[doc(hidden)]
impl Chip8Vm {
    /// Returns the contents of the program memory as a human readable string.
    pub fn dump_ram(&self, count: usize) -> Result<String, fmt::Error> {
        let mut buf = String::new();

        for addr in (MEM_START..MEM_START + count).step_by(2) {
            let word = fetch(&*self.cpu.ram, addr);
            writeln!(buf, "{:04X}: {:04X}", addr & MEM_MASK, word)?;
        }

        Ok(buf)
    }

    pub fn dump_display(&self) -> Result<String, fmt::Error> {
        self.cpu.display.dump()
    }

    pub fn dump_keys(&self) -> Result<String, fmt::Error> {
        let mut buf = String::new();

        if self.cpu.keypad.any_key() {
            write!(buf, "keys:")?;
            for key in self.cpu.keypad.pressed() {
                write!(buf, " {key}")?;
            }
        }

        Ok(buf)
    }
}

#[cfg(feature = "op_trace")]
#[inline]
fn op_trace(pc: Address, word: u16, op: &Op) {
    log::trace!("{pc:04X}: {word:04X} {op}");
}

#[cfg(not(feature = "op_trace"))]
#[inline]
fn op_trace(_: Address, _: u16, _: &Op) {}
