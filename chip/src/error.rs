use thiserror::Error;

use crate::{chip8::Snapshot, opcode::Opcode};

/// Everything that can go wrong during a single cycle.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum ProcessError {
    #[error("Invalid opcode state '{0}'.")]
    Opcode(#[from] OpcodeError),
    #[error("Invalid stack state '{0}'.")]
    Stack(#[from] StackError),
    #[error("Invalid memory access '{0}'.")]
    Memory(#[from] MemoryError),
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum OpcodeError {
    #[error("An unsupported opcode was used {0:#06X?}.")]
    InvalidOpcode(Opcode),
    #[error("Pointer location invalid there can not be an opcode at {pointer}, if data len is {len}")]
    MemoryInvalid { pointer: usize, len: usize },
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum StackError {
    #[error("Stack is full!")]
    Full,
    #[error("Stack is empty!")]
    Empty,
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum MemoryError {
    #[error("Access of {len} byte(s) at {address:#06X} is outside of the address space")]
    OutOfBounds { address: usize, len: usize },
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum RomError {
    #[error("The rom is {len} bytes long, but only {max} bytes fit into memory")]
    TooLarge { len: usize, max: usize },
}

/// The fatal failure of a cycle, with everything needed to write a crash dump.
#[derive(Error, Debug, PartialEq, Clone)]
#[error("The chipset crashed executing {opcode:#06X} at {pc:#06X}: {kind}\n{snapshot}")]
pub struct Crash {
    pub kind: ProcessError,
    pub opcode: Opcode,
    /// Address the faulting opcode was fetched from.
    pub pc: usize,
    pub snapshot: Snapshot,
}
