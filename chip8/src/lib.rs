mod bytecode;
pub mod constants;
mod cpu;
mod disasm;
mod display;
mod error;
mod keypad;
mod opcode;
mod vm;

pub use self::{
    display::{Chip8DisplayBuffer, Display, DrawResult},
    error::{Chip8Error, Chip8Result},
    keypad::{InvalidKeyCode, KeyCode, Keypad},
    opcode::Op,
};

/// Version of this implementation, as published.
pub const IMPL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    pub use super::{
        cpu::Chip8Cpu,
        disasm::Disassembler,
        error::{Chip8Error, Chip8Result},
        keypad::KeyCode,
        vm::{Chip8Vm, Flow},
    };
}
