//! 4 KiB of addressable memory with the built-in hexadecimal font at its
//! bottom and the loaded program from `PROGRAM_START` upwards.

use heapless::Vec;
use log::debug;

use crate::error::Error;

pub const MEMORY_SIZE: usize = 4096;
/// Highest valid 12-bit address
pub const ADDRESS_MAX: u16 = 0x0FFF;
/// Where programs are loaded and execution starts
pub const PROGRAM_START: u16 = 0x0200;
pub const PROGRAM_CAPACITY: usize = MEMORY_SIZE - PROGRAM_START as usize;
/// Bytes taken by a single glyph of the font
pub const GLYPH_SIZE: u16 = 5;

/// Sprites for hex digits 0..=F, 8x5 pixels each, stored at 0x000
#[rustfmt::skip]
pub const GLYPHS: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

pub struct Memory {
    bytes: [u8; MEMORY_SIZE],
    /// Last loaded program, reasserted on every reset
    program: Vec<u8, PROGRAM_CAPACITY>,
}

impl Memory {
    pub fn new() -> Self {
        let mut memory = Self {
            bytes: [0; MEMORY_SIZE],
            program: Vec::new(),
        };
        memory.reset();
        memory
    }

    /// Zero the whole memory, then restore the font and the last loaded program
    pub fn reset(&mut self) {
        self.bytes = [0; MEMORY_SIZE];
        self.bytes[..GLYPHS.len()].copy_from_slice(&GLYPHS);
        let start = PROGRAM_START as usize;
        self.bytes[start..start + self.program.len()].copy_from_slice(&self.program);
    }

    /// Replace the program region with `prog`
    ///
    /// Fails without touching memory if `prog` does not fit into 0x200..=0xFFF.
    pub fn load(&mut self, prog: &[u8]) -> Result<(), Error> {
        let mut program = Vec::new();
        program
            .extend_from_slice(prog)
            .map_err(|_| Error::ProgramTooLarge { len: prog.len() })?;
        self.program = program;

        self.bytes[..GLYPHS.len()].copy_from_slice(&GLYPHS);
        let start = PROGRAM_START as usize;
        self.bytes[start..].iter_mut().for_each(|byte| *byte = 0);
        self.bytes[start..start + prog.len()].copy_from_slice(prog);
        debug!("loaded program of {} bytes at {:#05X}", prog.len(), PROGRAM_START);
        Ok(())
    }

    /// Fetch a big-endian word from `addr` and `addr + 1`
    pub fn read_word(&self, addr: u16) -> Result<u16, Error> {
        let bytes = self.slice(addr, 2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Borrow `len` bytes starting at `addr`
    pub fn slice(&self, addr: u16, len: u16) -> Result<&[u8], Error> {
        let range = Self::window(addr, len)?;
        Ok(&self.bytes[range])
    }

    pub fn slice_mut(&mut self, addr: u16, len: u16) -> Result<&mut [u8], Error> {
        let range = Self::window(addr, len)?;
        Ok(&mut self.bytes[range])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn window(addr: u16, len: u16) -> Result<core::ops::Range<usize>, Error> {
        let start = addr as usize;
        let end = start + len as usize;
        if end > MEMORY_SIZE {
            let last = end - 1;
            Err(Error::AddressOverflow {
                addr: last.min(u16::MAX as usize) as u16,
            })
        } else {
            Ok(start..end)
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
