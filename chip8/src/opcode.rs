//! Decoded instructions.
//!
//! Every two byte instruction word decodes to exactly one [`Op`], or to
//! nothing when the word isn't part of the instruction set. The interpreter
//! and the disassembler share this decoder.
use std::fmt::{self, Formatter};

use crate::{bytecode::*, constants::Address};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum Op {
    /// 00E0 (CLS)
    ///
    /// Clear the screen.
    ClearScreen,
    /// 00EE (RET)
    ///
    /// Return from the sub-routine.
    Return,
    /// 1nnn (JP addr)
    ///
    /// Jump to the address in `nnn`.
    JumpAddress { address: Address },
    /// 2nnn (CALL addr)
    ///
    /// Call the sub-routine at address `nnn`.
    Call { address: Address },
    /// 3xnn (SE Vx, byte)
    ///
    /// Skip the next instruction if register `Vx` equals value `nn`
    Skip_Eq_Byte { vx: u8, nn: u8 },
    /// 4xnn (SNE Vx, byte)
    ///
    /// Skip the next instruction if register `Vx` does not equal value `nn`.
    Skip_NotEq_Byte { vx: u8, nn: u8 },
    /// 5xy0 (SE Vx, Vy)
    ///
    /// Skip the next instruction if register `Vx` equals register `Vy`.
    Skip_Eq { vx: u8, vy: u8 },
    /// 6xnn (LD Vx, byte)
    Load_Byte { vx: u8, nn: u8 },
    /// 7xnn (ADD Vx, byte)
    ///
    /// Add byte to the value in register `Vx`, store the result in `Vx`.
    /// Carry flag is not set.
    Add_Byte { vx: u8, nn: u8 },

    // ------------------------------------------------------------------------
    // Math
    /// 8xy0 (LD Vx, Vy)
    ///
    /// Store the value of register VY in register VX.
    Load_Vx_Vy { vx: u8, vy: u8 },
    /// 8xy1 (OR Vx, Vy)
    Or_Vx_Vy { vx: u8, vy: u8 },
    /// 8xy2 (AND Vx, Vy)
    And_Vx_Vy { vx: u8, vy: u8 },
    /// 8xy3 (XOR Vx, Vy)
    Xor_Vx_Vy { vx: u8, vy: u8 },
    /// 8xy4 (ADD Vx, Vy)
    ///
    /// Overflow is wrapped. If overflowed, set VF to 1, else 0.
    Add_Vx_Vy { vx: u8, vy: u8 },
    /// 8xy5 (SUB Vx, Vy)
    ///
    /// VF is set to 0 when there is a borrow, set to 1 when there isn't.
    Sub_Vx_Vy { vx: u8, vy: u8 },
    /// 8xy6 (SHR Vx)
    ///
    /// The bit shifted out of VX is stored in VF. VY is unused.
    ShiftRight { vx: u8 },
    /// 8xy7 (SUBN Vx, Vy)
    ///
    /// Subtracts VX from VY, and stores the result in VX.
    /// VF is set to 0 when there is a borrow, set to 1 when there isn't.
    SubReverse_Vx_Vy { vx: u8, vy: u8 },
    /// 8xyE (SHL Vx)
    ///
    /// The bit shifted out of VX is stored in VF. VY is unused.
    ShiftLeft { vx: u8 },
    /// 9xy0 (SNE Vx, Vy)
    Skip_NotEq { vx: u8, vy: u8 },

    /// Annn (LD I, addr)
    ///
    /// Load address into register `I`.
    Load_Address { address: Address },
    /// Bnnn (JP V0, addr)
    ///
    /// Jump to location nnn + V0.
    Jump_V0 { address: Address },
    /// Cxnn (RND Vx, byte)
    ///
    /// Generate random number, masked by `nn`.
    Random { vx: u8, nn: u8 },
    /// Dxyn (DRW Vx, Vy, nibble)
    ///
    /// Draw sprite to the display buffer.
    Draw { vx: u8, vy: u8, n: u8 },

    // ------------------------------------------------------------------------
    // Keyboard
    /// Ex9E (SKP Vx)
    Skip_Key { vx: u8 },
    /// ExA1 (SKNP Vx)
    Skip_NotKey { vx: u8 },

    // ------------------------------------------------------------------------
    // Timers and memory
    /// Fx07 (LD Vx, DT)
    Load_Vx_Delay { vx: u8 },
    /// Fx0A (LD Vx, K)
    ///
    /// Stall the machine until a key is pressed.
    Wait_Key { vx: u8 },
    /// Fx15 (LD DT, Vx)
    Load_Delay_Vx { vx: u8 },
    /// Fx18 (LD ST, Vx)
    Load_Sound_Vx { vx: u8 },
    /// Fx1E (ADD I, Vx)
    Add_Address { vx: u8 },
    /// Fx29 (LD F, Vx)
    ///
    /// Point `I` at the font glyph for the low nibble of `Vx`.
    Load_Font { vx: u8 },
    /// Fx33 (LD B, Vx)
    Store_Bcd { vx: u8 },
    /// Fx55 (LD [I], Vx)
    Store_Registers { vx: u8 },
    /// Fx65 (LD Vx, [I])
    Load_Registers { vx: u8 },
}

impl Op {
    /// Decode an instruction word.
    ///
    /// Returns `None` for words outside of the instruction set.
    pub fn decode(word: u16) -> Option<Op> {
        let op = match op_code(word) {
            0x0 => match word {
                0x00E0 => Op::ClearScreen,
                0x00EE => Op::Return,
                _ => return None,
            },
            0x1 => Op::JumpAddress {
                address: op_nnn(word),
            },
            0x2 => Op::Call {
                address: op_nnn(word),
            },
            0x3 => {
                let (vx, nn) = op_xnn(word);
                Op::Skip_Eq_Byte { vx, nn }
            }
            0x4 => {
                let (vx, nn) = op_xnn(word);
                Op::Skip_NotEq_Byte { vx, nn }
            }
            0x5 if op_n(word) == 0 => {
                let (vx, vy) = op_xy(word);
                Op::Skip_Eq { vx, vy }
            }
            0x6 => {
                let (vx, nn) = op_xnn(word);
                Op::Load_Byte { vx, nn }
            }
            0x7 => {
                let (vx, nn) = op_xnn(word);
                Op::Add_Byte { vx, nn }
            }
            0x8 => {
                let (vx, vy, n) = op_xyn(word);
                match n {
                    0x0 => Op::Load_Vx_Vy { vx, vy },
                    0x1 => Op::Or_Vx_Vy { vx, vy },
                    0x2 => Op::And_Vx_Vy { vx, vy },
                    0x3 => Op::Xor_Vx_Vy { vx, vy },
                    0x4 => Op::Add_Vx_Vy { vx, vy },
                    0x5 => Op::Sub_Vx_Vy { vx, vy },
                    0x6 => Op::ShiftRight { vx },
                    0x7 => Op::SubReverse_Vx_Vy { vx, vy },
                    0xE => Op::ShiftLeft { vx },
                    _ => return None,
                }
            }
            0x9 if op_n(word) == 0 => {
                let (vx, vy) = op_xy(word);
                Op::Skip_NotEq { vx, vy }
            }
            0xA => Op::Load_Address {
                address: op_nnn(word),
            },
            0xB => Op::Jump_V0 {
                address: op_nnn(word),
            },
            0xC => {
                let (vx, nn) = op_xnn(word);
                Op::Random { vx, nn }
            }
            0xD => {
                let (vx, vy, n) = op_xyn(word);
                Op::Draw { vx, vy, n }
            }
            0xE => {
                let (vx, nn) = op_xnn(word);
                match nn {
                    0x9E => Op::Skip_Key { vx },
                    0xA1 => Op::Skip_NotKey { vx },
                    _ => return None,
                }
            }
            0xF => {
                let (vx, nn) = op_xnn(word);
                match nn {
                    0x07 => Op::Load_Vx_Delay { vx },
                    0x0A => Op::Wait_Key { vx },
                    0x15 => Op::Load_Delay_Vx { vx },
                    0x18 => Op::Load_Sound_Vx { vx },
                    0x1E => Op::Add_Address { vx },
                    0x29 => Op::Load_Font { vx },
                    0x33 => Op::Store_Bcd { vx },
                    0x55 => Op::Store_Registers { vx },
                    0x65 => Op::Load_Registers { vx },
                    _ => return None,
                }
            }
            _ => return None,
        };

        Some(op)
    }
}

/// Assembly mnemonic representation.
impl fmt::Display for Op {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Op::ClearScreen => write!(f, "CLS"),
            Op::Return => write!(f, "RET"),
            Op::JumpAddress { address } => write!(f, "JP 0x{address:03X}"),
            Op::Call { address } => write!(f, "CALL 0x{address:03X}"),
            Op::Skip_Eq_Byte { vx, nn } => write!(f, "SE V{vx:X}, 0x{nn:02X}"),
            Op::Skip_NotEq_Byte { vx, nn } => write!(f, "SNE V{vx:X}, 0x{nn:02X}"),
            Op::Skip_Eq { vx, vy } => write!(f, "SE V{vx:X}, V{vy:X}"),
            Op::Load_Byte { vx, nn } => write!(f, "LD V{vx:X}, 0x{nn:02X}"),
            Op::Add_Byte { vx, nn } => write!(f, "ADD V{vx:X}, 0x{nn:02X}"),
            // ------
            Op::Load_Vx_Vy { vx, vy } => write!(f, "LD V{vx:X}, V{vy:X}"),
            Op::Or_Vx_Vy { vx, vy } => write!(f, "OR V{vx:X}, V{vy:X}"),
            Op::And_Vx_Vy { vx, vy } => write!(f, "AND V{vx:X}, V{vy:X}"),
            Op::Xor_Vx_Vy { vx, vy } => write!(f, "XOR V{vx:X}, V{vy:X}"),
            Op::Add_Vx_Vy { vx, vy } => write!(f, "ADD V{vx:X}, V{vy:X}"),
            Op::Sub_Vx_Vy { vx, vy } => write!(f, "SUB V{vx:X}, V{vy:X}"),
            Op::ShiftRight { vx } => write!(f, "SHR V{vx:X}"),
            Op::SubReverse_Vx_Vy { vx, vy } => write!(f, "SUBN V{vx:X}, V{vy:X}"),
            Op::ShiftLeft { vx } => write!(f, "SHL V{vx:X}"),
            Op::Skip_NotEq { vx, vy } => write!(f, "SNE V{vx:X}, V{vy:X}"),
            // ------
            Op::Load_Address { address } => write!(f, "LD I, 0x{address:03X}"),
            Op::Jump_V0 { address } => write!(f, "JP V0, 0x{address:03X}"),
            Op::Random { vx, nn } => write!(f, "RND V{vx:X}, 0x{nn:02X}"),
            Op::Draw { vx, vy, n } => write!(f, "DRW V{vx:X}, V{vy:X}, {n}"),
            // ------
            Op::Skip_Key { vx } => write!(f, "SKP V{vx:X}"),
            Op::Skip_NotKey { vx } => write!(f, "SKNP V{vx:X}"),
            Op::Load_Vx_Delay { vx } => write!(f, "LD V{vx:X}, DT"),
            Op::Wait_Key { vx } => write!(f, "LD V{vx:X}, K"),
            Op::Load_Delay_Vx { vx } => write!(f, "LD DT, V{vx:X}"),
            Op::Load_Sound_Vx { vx } => write!(f, "LD ST, V{vx:X}"),
            Op::Add_Address { vx } => write!(f, "ADD I, V{vx:X}"),
            Op::Load_Font { vx } => write!(f, "LD F, V{vx:X}"),
            Op::Store_Bcd { vx } => write!(f, "LD B, V{vx:X}"),
            Op::Store_Registers { vx } => write!(f, "LD [I], V{vx:X}"),
            Op::Load_Registers { vx } => write!(f, "LD V{vx:X}, [I]"),
        }
    }
}
