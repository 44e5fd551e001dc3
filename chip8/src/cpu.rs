//! CPU and memory state.
use crate::{constants::*, display::Display, keypad::Keypad};

/// Core state for a chip8 interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip8Cpu {
    // ------------------------------------------------------------------------
    // Registers
    /// Program counter pointing to the current position in the bytecode.
    pub(crate) pc: Address,
    /// Stack pointer, the number of return addresses on the stack.
    pub(crate) sp: usize,
    /// General purpose registers for temporary values.
    ///
    /// Register 16 (VF) is used for either the carry flag or borrow switch depending on opcode.
    pub(crate) registers: [u8; REGISTER_COUNT],
    /// Pointer register (I) used for temporarily storing an address.
    pub(crate) address: Address,
    /// (DT) Delay timer that counts down to 0.
    pub(crate) delay_timer: u8,
    /// (ST) Sound timer that counts down to 0. When it has a non-zero value, a beep is played.
    pub(crate) sound_timer: u8,

    // ------------------------------------------------------------------------
    // Memory
    /// Main memory storage space.
    pub(crate) ram: Box<[u8; MEM_SIZE]>,
    /// Stack of return pointers used for jumping when a routine call finishes.
    pub(crate) stack: [Address; STACK_SIZE],
    /// Screen buffer that is drawn to.
    pub(crate) display: Display,
    /// Keyboard input state.
    pub(crate) keypad: Keypad,
}

impl Default for Chip8Cpu {
    fn default() -> Self {
        let mut cpu = Self {
            pc: MEM_START as Address,
            sp: 0,
            registers: [0; REGISTER_COUNT],
            address: 0,
            delay_timer: 0,
            sound_timer: 0,

            ram: Box::new([0; MEM_SIZE]),
            stack: [0; STACK_SIZE],
            display: Display::new(),
            keypad: Keypad::new(),
        };
        cpu.load_font();
        cpu
    }
}

impl Chip8Cpu {
    /// Create a CPU in its power-on state, with the font loaded.
    pub fn new() -> Self {
        Default::default()
    }

    /// Return every register, buffer and key to its power-on state.
    pub(crate) fn reset(&mut self) {
        self.pc = MEM_START as Address;
        self.sp = 0;
        self.registers.fill(0);
        self.address = 0;
        self.delay_timer = 0;
        self.sound_timer = 0;

        self.ram.fill(0);
        self.stack.fill(0);
        self.display.clear();
        self.keypad.reset();

        self.load_font();
    }

    fn load_font(&mut self) {
        let start = FONTSET_START as usize;
        self.ram[start..start + FONTSET_DATA_LENGTH].copy_from_slice(&FONTSET);
    }

    // ------------------------------------------------------------------------
    // Inspection

    #[inline(always)]
    pub fn pc(&self) -> Address {
        self.pc
    }

    #[inline(always)]
    pub fn sp(&self) -> usize {
        self.sp
    }

    #[inline(always)]
    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.registers
    }

    /// Value of register `Vx`. Only the low nibble of `vx` is used.
    #[inline(always)]
    pub fn register(&self, vx: u8) -> u8 {
        self.registers[vx as usize & 0xF]
    }

    /// Index register `I`.
    #[inline(always)]
    pub fn address(&self) -> Address {
        self.address
    }

    #[inline(always)]
    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    #[inline(always)]
    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    /// Return addresses currently on the call stack, oldest first.
    pub fn stack(&self) -> &[Address] {
        &self.stack[..self.sp]
    }

    #[inline(always)]
    pub fn ram(&self) -> &[u8; MEM_SIZE] {
        &self.ram
    }

    #[inline(always)]
    pub fn display(&self) -> &Display {
        &self.display
    }

    #[inline(always)]
    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    // ------------------------------------------------------------------------
    // Registers

    #[inline(always)]
    pub(crate) fn set_register(&mut self, vx: u8, value: u8) {
        self.registers[vx as usize & 0xF] = value;
    }

    #[inline(always)]
    pub(crate) fn set_flag(&mut self, flag: bool) {
        self.registers[FLAG_REGISTER] = flag as u8;
    }

    /// Skip over the next instruction.
    #[inline(always)]
    pub(crate) fn skip(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    // ------------------------------------------------------------------------
    // Memory

    /// Read a byte, wrapping the address into the 4K space.
    #[inline(always)]
    pub(crate) fn read(&self, addr: usize) -> u8 {
        self.ram[addr & MEM_MASK]
    }

    /// Write a byte, wrapping the address into the 4K space.
    #[inline(always)]
    pub(crate) fn write(&mut self, addr: usize, value: u8) {
        self.ram[addr & MEM_MASK] = value;
    }

    /// Push a return address.
    ///
    /// Returns `false` when the stack is full, leaving it untouched.
    #[must_use]
    pub(crate) fn push(&mut self, addr: Address) -> bool {
        match self.stack.get_mut(self.sp) {
            Some(slot) => {
                *slot = addr;
                self.sp += 1;
                true
            }
            None => false,
        }
    }

    /// Pop the most recent return address, or `None` when the stack is empty.
    #[must_use]
    pub(crate) fn pop(&mut self) -> Option<Address> {
        let sp = self.sp.checked_sub(1)?;
        self.sp = sp;
        Some(self.stack[sp])
    }

    // ------------------------------------------------------------------------
    // Timers

    /// Count down the delay and sound timers, stopping at zero.
    #[inline]
    pub(crate) fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }
}
