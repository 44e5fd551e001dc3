//! Result and errors.
use std::fmt::{self, Display, Formatter};

use crate::{constants::Address, keypad::InvalidKeyCode};

pub type Chip8Result<T> = std::result::Result<T, Chip8Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chip8Error {
    /// Attempt to load a bytecode program that can't fit in memory.
    ProgramTooLarge { size: usize, max: usize },
    /// Instruction word that doesn't decode to any known operation.
    ///
    /// `pc` is the address the word was fetched from.
    InvalidOpcode { word: u16, pc: Address },
    /// Subroutine call while the call stack is full.
    StackOverflow { pc: Address },
    /// Return while the call stack is empty.
    StackUnderflow { pc: Address },
    /// Key event for a key outside of the 16 key keypad.
    InvalidKeyCode(u8),
}

impl Chip8Error {
    /// Whether the error halts the machine until it is reset.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidOpcode { .. } | Self::StackOverflow { .. } | Self::StackUnderflow { .. }
        )
    }
}

impl Display for Chip8Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProgramTooLarge { size, max } => write!(
                f,
                "program too large for VM memory: {size} bytes, maximum is {max}"
            ),
            Self::InvalidOpcode { word, pc } => {
                write!(f, "invalid opcode {word:04X} at address {pc:04X}")
            }
            Self::StackOverflow { pc } => write!(f, "call stack overflow at address {pc:04X}"),
            Self::StackUnderflow { pc } => write!(f, "call stack underflow at address {pc:04X}"),
            Self::InvalidKeyCode(key) => {
                write!(f, "invalid keycode {key}, must be in range 0 <= keycode < 16")
            }
        }
    }
}

impl std::error::Error for Chip8Error {}

impl From<InvalidKeyCode> for Chip8Error {
    fn from(err: InvalidKeyCode) -> Self {
        Chip8Error::InvalidKeyCode(err.0)
    }
}
