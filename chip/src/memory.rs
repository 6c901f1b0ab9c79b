//! The flat address space of the chipset.
use crate::{
    definitions::{cpu, display::fontset, memory},
    opcode::{self, Opcode},
    MemoryError, OpcodeError, RomError,
};

/// - `0x000-0x04F` - The built in `4x5` pixel font set (`0-F`)
/// - `0x050-0x1FF` - Unused, historically the interpreter
/// - `0x200-0xFFF` - Program ROM and work RAM
#[derive(Debug, Clone, PartialEq)]
pub struct Memory {
    ram: Box<[u8; memory::SIZE]>,
}

impl Default for Memory {
    fn default() -> Self {
        let mut ram = Box::new([0; memory::SIZE]);

        // load fonts
        ram[fontset::LOCATION..(fontset::LOCATION + fontset::FONTSET.len())]
            .copy_from_slice(&fontset::FONTSET);

        Self { ram }
    }
}

impl Memory {
    /// The largest program that fits behind the program start.
    pub const MAX_PROGRAM_SIZE: usize = memory::SIZE - cpu::PROGRAM_COUNTER;

    /// Will create the memory with the font loaded and everything else zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Will write the program to the program start.
    pub fn load_program(&mut self, data: &[u8]) -> Result<(), RomError> {
        if data.len() > Self::MAX_PROGRAM_SIZE {
            return Err(RomError::TooLarge {
                len: data.len(),
                max: Self::MAX_PROGRAM_SIZE,
            });
        }
        self.ram[cpu::PROGRAM_COUNTER..(cpu::PROGRAM_COUNTER + data.len())].copy_from_slice(data);
        Ok(())
    }

    /// Will build the big-endian opcode at the pointer.
    pub fn opcode(&self, pointer: usize) -> Result<Opcode, OpcodeError> {
        opcode::build_opcode(&self.ram[..], pointer)
    }

    fn check(&self, address: usize, len: usize) -> Result<(), MemoryError> {
        match address.checked_add(len) {
            Some(end) if end <= memory::SIZE => Ok(()),
            _ => Err(MemoryError::OutOfBounds { address, len }),
        }
    }

    /// Will read `len` bytes starting at address.
    pub fn read(&self, address: usize, len: usize) -> Result<&[u8], MemoryError> {
        self.check(address, len)?;
        Ok(&self.ram[address..(address + len)])
    }

    /// Will write the data starting at address, nothing is written if any
    /// part of it lies outside of the address space.
    pub fn write(&mut self, address: usize, data: &[u8]) -> Result<(), MemoryError> {
        self.check(address, data.len())?;
        self.ram[address..(address + data.len())].copy_from_slice(data);
        Ok(())
    }

    /// The raw content of the whole address space.
    pub fn as_slice(&self) -> &[u8] {
        &self.ram[..]
    }
}
