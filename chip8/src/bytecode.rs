//! Helpers for extracting data from instruction words.
use crate::constants::{Address, MEM_MASK};

/// Read the big-endian instruction word at the cursor.
///
/// Both byte addresses wrap around the memory space.
#[inline(always)]
pub fn fetch(ram: &[u8], cursor: usize) -> u16 {
    u16::from_be_bytes([ram[cursor & MEM_MASK], ram[(cursor + 1) & MEM_MASK]])
}

/// Extract opcode family, the first 4-bit nibble.
#[inline(always)]
pub fn op_code(word: u16) -> u8 {
    (word >> 12) as u8
}

/// Extract operand NNN, the lowest 12 bits.
#[inline(always)]
pub fn op_nnn(word: u16) -> Address {
    word & 0x0FFF
}

/// Extract operand NN, the lowest byte.
#[inline(always)]
pub fn op_nn(word: u16) -> u8 {
    (word & 0x00FF) as u8
}

/// Extract operand N, the lowest nibble.
#[inline(always)]
pub fn op_n(word: u16) -> u8 {
    (word & 0x000F) as u8
}

/// Extract the register operand VX.
#[inline(always)]
pub fn op_x(word: u16) -> u8 {
    ((word >> 8) & 0xF) as u8
}

/// Extract the register operand VY.
#[inline(always)]
pub fn op_y(word: u16) -> u8 {
    ((word >> 4) & 0xF) as u8
}

/// Extract operands VX and NN.
#[inline(always)]
pub fn op_xnn(word: u16) -> (u8, u8) {
    (op_x(word), op_nn(word))
}

/// Extract operands VX and VY. The lowest nibble is ignored.
#[inline(always)]
pub fn op_xy(word: u16) -> (u8, u8) {
    (op_x(word), op_y(word))
}

/// Extract operands VX, VY and N.
#[inline(always)]
pub fn op_xyn(word: u16) -> (u8, u8, u8) {
    (op_x(word), op_y(word), op_n(word))
}
