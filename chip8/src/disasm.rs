//! Disassembler.
use std::fmt::{self, Write as FmtWrite};

use crate::{constants::MEM_START, opcode::Op};

/// Linear disassembler over a program's bytecode.
///
/// Every two bytes are treated as one instruction. Words that don't decode
/// are printed as data, since programs freely mix sprites and code.
pub struct Disassembler<'a> {
    bytecode: &'a [u8],
    cursor: usize,
}

impl<'a> Disassembler<'a> {
    pub fn new(bytecode: &'a [u8]) -> Self {
        Self {
            bytecode,
            cursor: 0,
        }
    }

    /// Disassemble the whole program into a string.
    pub fn disassemble_all(&mut self) -> Result<String, fmt::Error> {
        let mut s = String::new();

        self.cursor = 0;
        while self.cursor < self.bytecode.len() {
            self.disassemble(&mut s)?;
            self.cursor += 2;
        }
        self.cursor = 0;

        Ok(s)
    }

    /// Write a single instruction to the given writer.
    ///
    /// Writes nothing when the cursor is past the end of the program.
    pub fn disassemble<W: FmtWrite>(&self, w: &mut W) -> fmt::Result {
        if self.cursor >= self.bytecode.len() {
            return Ok(());
        }

        let addr = MEM_START + self.cursor;

        // Odd length program, trailing byte.
        if self.cursor + 1 >= self.bytecode.len() {
            let byte = self.bytecode[self.cursor];
            return writeln!(w, "{addr:04X}: {byte:02X}    DB 0x{byte:02X}");
        }

        // Program files aren't bound by machine memory, so no address wrapping here.
        let word = u16::from_be_bytes([self.bytecode[self.cursor], self.bytecode[self.cursor + 1]]);
        match Op::decode(word) {
            Some(op) => writeln!(w, "{addr:04X}: {word:04X}  {op}"),
            None => writeln!(w, "{addr:04X}: {word:04X}  DW 0x{word:04X}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_listing() {
        let rom = [0x00, 0xE0, 0xA2, 0x08, 0xFF, 0xFF, 0x12];
        let listing = Disassembler::new(&rom).disassemble_all().unwrap();

        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(
            lines,
            vec![
                "0200: 00E0  CLS",
                "0202: A208  LD I, 0x208",
                "0204: FFFF  DW 0xFFFF",
                "0206: 12    DB 0x12",
            ]
        );
    }

    #[test]
    fn test_empty_program() {
        let mut s = String::new();
        Disassembler::new(&[]).disassemble(&mut s).unwrap();
        assert_eq!(s, "");

        assert_eq!(Disassembler::new(&[]).disassemble_all().unwrap(), "");
    }

    /// Files larger than machine memory are listed as they are.
    #[test]
    fn test_listing_past_memory_size() {
        let mut rom = vec![0; 4098];
        rom[0] = 0x12;
        rom[1] = 0x34;
        rom[4096] = 0x00;
        rom[4097] = 0xE0;

        let listing = Disassembler::new(&rom).disassemble_all().unwrap();
        let lines: Vec<&str> = listing.lines().collect();

        assert_eq!(lines.len(), 2049);
        assert_eq!(lines[0], "0200: 1234  JP 0x234");
        assert_eq!(lines[2048], "1200: 00E0  CLS");
    }
}
