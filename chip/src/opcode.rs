//! Opcode abstractions, the mask based decoder and the decoded instruction set.
use std::{convert::TryFrom, fmt};

use crate::{definitions::memory, OpcodeError};

/// the base mask used for generating all the other sub masks
pub(crate) const OPCODE_MASK_FFFF: u16 = u16::MAX;

/// the mask for the first twelve bits
pub(crate) const OPCODE_MASK_FFF0: u16 = OPCODE_MASK_FFFF << 4;

/// the mask for the first eight bits
pub(crate) const OPCODE_MASK_FF00: u16 = OPCODE_MASK_FFFF << 8;

/// the mask for the first four bits
pub(crate) const OPCODE_MASK_F000: u16 = OPCODE_MASK_FFFF << 12;

/// the mask for the last four bits
pub(crate) const OPCODE_MASK_000F: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FFF0;

/// the mask for the last eight bits
pub(crate) const OPCODE_MASK_00FF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FF00;

/// the mask for the last twelve bits
pub(crate) const OPCODE_MASK_0FFF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_F000;

/// the size of a single byte
const BYTE_SIZE: u16 = 0x8;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// will build an opcode from data and the given point
/// # Arguments
///
/// - `data` - A slice of u8 data entries used to generate the opcodes
/// - `pointer` - Where in the data the opcode shall be extracted, so `pointer` and `pointer + 1` make
/// the opcode up (big-endian)
///
/// # Example
/// ```rust
/// # use chip::opcode::*;
/// # use chip::OpcodeError;
///  const OPCODES: [Opcode; 2] = [0x00EE, 0x1EDA];
///  const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
///  for (i, val) in OPCODES.iter().enumerate() {
///      let opcode = build_opcode(&SPLIT_OPCODE, i * 2).expect("This will work.");
///      assert_eq!(opcode, *val);
///  }
/// # let pointer = 3;
/// # let err = OpcodeError::MemoryInvalid {pointer, len: SPLIT_OPCODE.len() };
/// # assert_eq!(Err(err), build_opcode(&SPLIT_OPCODE, pointer));
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, OpcodeError> {
    // controlling that there is no illegal access here
    if pointer < data.len().saturating_sub(1) {
        Ok(Opcode::from_be_bytes([data[pointer], data[pointer + 1]]))
    } else {
        Err(OpcodeError::MemoryInvalid {
            pointer,
            len: data.len(),
        })
    }
}

/// These are special traits used to filter out information
/// from opcodes
pub trait OpcodeTrait {
    /// this is an opcode extractor for the opcode type `TNNN`
    /// - `T` is the opcode type
    /// - `NNN` is an address
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.nnn(), 0xEDA)
    /// ```
    fn nnn(&self) -> usize;

    /// this is an opcode extractor for the opcode type `TXNN`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `NN` is a constant
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.xnn(), (0xE, 0xDA));
    /// ```
    fn xnn(&self) -> (usize, u8);

    /// this is an opcode extractor for the opcode type `TXYN`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `Y` is a register index
    /// - `N` is a nibble constant
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xyn(), (0xE, 0xD, 0xA));
    /// ```
    fn xyn(&self) -> (usize, usize, usize);

    /// this is an opcode extractor for the opcode type `TXYT`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `Y` is a register index
    fn xy(&self) -> (usize, usize);

    /// this is an opcode extractor for the opcode type `TXTT`
    /// - `T` is the opcode type
    /// - `X` is a register index
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.x(), 0xE);
    /// ```
    fn x(&self) -> usize;
}

impl OpcodeTrait for Opcode {
    fn nnn(&self) -> usize {
        (self & OPCODE_MASK_0FFF) as usize
    }

    fn xnn(&self) -> (usize, u8) {
        let x = self.x();
        let nn = (self & OPCODE_MASK_00FF) as u8;
        (x, nn)
    }

    fn xyn(&self) -> (usize, usize, usize) {
        let (x, y) = self.xy();
        let n = (self & OPCODE_MASK_000F) as usize;
        (x, y, n)
    }

    fn xy(&self) -> (usize, usize) {
        let x = self.x();
        const MASK: u16 = OPCODE_MASK_00FF ^ OPCODE_MASK_000F;
        const NIBBLE: u16 = BYTE_SIZE / 2;
        let y = ((self & MASK) >> NIBBLE) as usize;
        (x, y)
    }

    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0FFF & OPCODE_MASK_FF00) >> BYTE_SIZE) as usize
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents the program counter movement an instruction requests.
///
/// The program counter already points past the executing instruction when
/// these are applied.
pub enum ProgramCounterStep {
    /// Will leave the program counter where the fetch left it
    None,
    /// Will jump over the next instruction
    Skip,
    /// Will move back onto the executing instruction, so it runs again
    Rewind,
    /// Will simply move the program counter to the given location.
    Jump(usize),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::None, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::None
        }
    }

    /// Applies the step to the given program counter.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Skip.apply(0x202), 0x204);
    /// assert_eq!(ProgramCounterStep::Rewind.apply(0x202), 0x200);
    /// assert_eq!(ProgramCounterStep::Jump(0x300).apply(0x202), 0x300);
    /// ```
    #[inline]
    pub fn apply(&self, pc: usize) -> usize {
        match *self {
            ProgramCounterStep::None => pc,
            ProgramCounterStep::Skip => pc + memory::opcodes::SIZE,
            ProgramCounterStep::Rewind => pc.wrapping_sub(memory::opcodes::SIZE),
            ProgramCounterStep::Jump(pointer) => pointer,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents a command from the interpreter up to the host.
pub enum Operation {
    /// If no action has to be taken.
    None,
    /// The chip is spinning until a key gets pressed.
    Wait,
    /// The framebuffer was cleared.
    Clear,
    /// The framebuffer changed and has to be redrawn.
    Draw,
}

/// The fieldless identifier of every supported instruction, used by the
/// decode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Clear,
    Return,
    Jump,
    Call,
    SkipEqual,
    SkipNotEqual,
    SkipEqualRegister,
    SetRegister,
    AddConst,
    Copy,
    Or,
    And,
    Xor,
    Add,
    Sub,
    ShiftRight,
    SubReverse,
    ShiftLeft,
    SkipNotEqualRegister,
    SetIndex,
    JumpOffset,
    Random,
    Draw,
    SkipPressed,
    SkipNotPressed,
    GetDelayTimer,
    AwaitKeyPress,
    SetDelayTimer,
    SetSoundTimer,
    AddToIndex,
    SetIndexToSprite,
    StoreBcd,
    StoreRegisters,
    LoadRegisters,
}

/// The masks with their registered keys. They are tried from top to bottom,
/// the first mask under which `opcode & mask` is a registered key wins.
/// `0xF000` must come after `0xF0FF` or `0xE09E` would not be found.
const DECODE_TABLE: [(Opcode, &[(Opcode, Kind)]); 5] = [
    (
        0xF0FF,
        &[
            (0xE09E, Kind::SkipPressed),
            (0xE0A1, Kind::SkipNotPressed),
            (0xF007, Kind::GetDelayTimer),
            (0xF00A, Kind::AwaitKeyPress),
            (0xF015, Kind::SetDelayTimer),
            (0xF018, Kind::SetSoundTimer),
            (0xF01E, Kind::AddToIndex),
            (0xF029, Kind::SetIndexToSprite),
            (0xF033, Kind::StoreBcd),
            (0xF055, Kind::StoreRegisters),
            (0xF065, Kind::LoadRegisters),
        ],
    ),
    (
        0xF00F,
        &[
            (0x8000, Kind::Copy),
            (0x8001, Kind::Or),
            (0x8002, Kind::And),
            (0x8003, Kind::Xor),
            (0x8004, Kind::Add),
            (0x8005, Kind::Sub),
            (0x8006, Kind::ShiftRight),
            (0x8007, Kind::SubReverse),
            (0x800E, Kind::ShiftLeft),
        ],
    ),
    (
        0xF000,
        &[
            (0x1000, Kind::Jump),
            (0x2000, Kind::Call),
            (0x3000, Kind::SkipEqual),
            (0x4000, Kind::SkipNotEqual),
            (0x5000, Kind::SkipEqualRegister),
            (0x6000, Kind::SetRegister),
            (0x7000, Kind::AddConst),
            (0x9000, Kind::SkipNotEqualRegister),
            (0xA000, Kind::SetIndex),
            (0xB000, Kind::JumpOffset),
            (0xC000, Kind::Random),
            (0xD000, Kind::Draw),
        ],
    ),
    (0x00FF, &[(0x00EE, Kind::Return)]),
    (0x00F0, &[(0x00E0, Kind::Clear)]),
];

/// A fully decoded instruction with its operands extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `00E0` - Clears the screen.
    Clear,
    /// `00EE` - Returns from a subroutine.
    Return,
    /// `1NNN` - Jumps to address `NNN`.
    Jump { nnn: usize },
    /// `2NNN` - Calls subroutine at `NNN`.
    Call { nnn: usize },
    /// `3XNN` - Skips the next instruction if `VX` equals `NN`.
    SkipEqual { x: usize, nn: u8 },
    /// `4XNN` - Skips the next instruction if `VX` doesn't equal `NN`.
    SkipNotEqual { x: usize, nn: u8 },
    /// `5XY0` - Skips the next instruction if `VX` equals `VY`.
    SkipEqualRegister { x: usize, y: usize },
    /// `6XNN` - Sets `VX` to `NN`.
    SetRegister { x: usize, nn: u8 },
    /// `7XNN` - Adds `NN` to `VX`, the carry flag is not changed.
    AddConst { x: usize, nn: u8 },
    /// `8XY0` - Sets `VX` to the value of `VY`.
    Copy { x: usize, y: usize },
    /// `8XY1` - `VX |= VY`, `VF` is reset.
    Or { x: usize, y: usize },
    /// `8XY2` - `VX &= VY`, `VF` is reset.
    And { x: usize, y: usize },
    /// `8XY3` - `VX ^= VY`, `VF` is reset.
    Xor { x: usize, y: usize },
    /// `8XY4` - `VX += VY`, `VF` is the carry.
    Add { x: usize, y: usize },
    /// `8XY5` - `VX -= VY`, `VF` is the "no borrow" flag.
    Sub { x: usize, y: usize },
    /// `8XY6` - `VX = VY >> 1`, `VF` is the shifted out bit.
    ShiftRight { x: usize, y: usize },
    /// `8XY7` - `VX = VY - VX`, `VF` is the "no borrow" flag.
    SubReverse { x: usize, y: usize },
    /// `8XYE` - `VX = VY << 1`, `VF` is the shifted out bit.
    ShiftLeft { x: usize, y: usize },
    /// `9XY0` - Skips the next instruction if `VX` doesn't equal `VY`.
    SkipNotEqualRegister { x: usize, y: usize },
    /// `ANNN` - Sets `I` to the address `NNN`.
    SetIndex { nnn: usize },
    /// `BNNN` - Jumps to the address `NNN` plus `V0`.
    JumpOffset { nnn: usize },
    /// `CXNN` - Sets `VX` to a random byte and `NN`.
    Random { x: usize, nn: u8 },
    /// `DXYN` - Draws an `N` rows high sprite from `I` at `(VX, VY)`.
    Draw { x: usize, y: usize, n: usize },
    /// `EX9E` - Skips the next instruction if the key in `VX` is pressed.
    SkipPressed { x: usize },
    /// `EXA1` - Skips the next instruction if the key in `VX` isn't pressed.
    SkipNotPressed { x: usize },
    /// `FX07` - Sets `VX` to the delay timer.
    GetDelayTimer { x: usize },
    /// `FX0A` - Waits for a key press and stores it in `VX`.
    AwaitKeyPress { x: usize },
    /// `FX15` - Sets the delay timer to `VX`.
    SetDelayTimer { x: usize },
    /// `FX18` - Sets the sound timer to `VX`.
    SetSoundTimer { x: usize },
    /// `FX1E` - Adds `VX` to `I`.
    AddToIndex { x: usize },
    /// `FX29` - Sets `I` to the font glyph of the digit in `VX`.
    SetIndexToSprite { x: usize },
    /// `FX33` - Stores the BCD of `VX` at `I`, `I+1` and `I+2`.
    StoreBcd { x: usize },
    /// `FX55` - Stores `V0..=VX` starting at `I`, then `I += X + 1`.
    StoreRegisters { x: usize },
    /// `FX65` - Loads `V0..=VX` starting at `I`, then `I += X + 1`.
    LoadRegisters { x: usize },
}

impl Instruction {
    fn build(kind: Kind, opcode: Opcode) -> Self {
        let (x, y, n) = opcode.xyn();
        let (_, nn) = opcode.xnn();
        let nnn = opcode.nnn();

        match kind {
            Kind::Clear => Instruction::Clear,
            Kind::Return => Instruction::Return,
            Kind::Jump => Instruction::Jump { nnn },
            Kind::Call => Instruction::Call { nnn },
            Kind::SkipEqual => Instruction::SkipEqual { x, nn },
            Kind::SkipNotEqual => Instruction::SkipNotEqual { x, nn },
            Kind::SkipEqualRegister => Instruction::SkipEqualRegister { x, y },
            Kind::SetRegister => Instruction::SetRegister { x, nn },
            Kind::AddConst => Instruction::AddConst { x, nn },
            Kind::Copy => Instruction::Copy { x, y },
            Kind::Or => Instruction::Or { x, y },
            Kind::And => Instruction::And { x, y },
            Kind::Xor => Instruction::Xor { x, y },
            Kind::Add => Instruction::Add { x, y },
            Kind::Sub => Instruction::Sub { x, y },
            Kind::ShiftRight => Instruction::ShiftRight { x, y },
            Kind::SubReverse => Instruction::SubReverse { x, y },
            Kind::ShiftLeft => Instruction::ShiftLeft { x, y },
            Kind::SkipNotEqualRegister => Instruction::SkipNotEqualRegister { x, y },
            Kind::SetIndex => Instruction::SetIndex { nnn },
            Kind::JumpOffset => Instruction::JumpOffset { nnn },
            Kind::Random => Instruction::Random { x, nn },
            Kind::Draw => Instruction::Draw { x, y, n },
            Kind::SkipPressed => Instruction::SkipPressed { x },
            Kind::SkipNotPressed => Instruction::SkipNotPressed { x },
            Kind::GetDelayTimer => Instruction::GetDelayTimer { x },
            Kind::AwaitKeyPress => Instruction::AwaitKeyPress { x },
            Kind::SetDelayTimer => Instruction::SetDelayTimer { x },
            Kind::SetSoundTimer => Instruction::SetSoundTimer { x },
            Kind::AddToIndex => Instruction::AddToIndex { x },
            Kind::SetIndexToSprite => Instruction::SetIndexToSprite { x },
            Kind::StoreBcd => Instruction::StoreBcd { x },
            Kind::StoreRegisters => Instruction::StoreRegisters { x },
            Kind::LoadRegisters => Instruction::LoadRegisters { x },
        }
    }

    /// The assembler mnemonic of the instruction.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Clear => "CLS",
            Instruction::Return => "RET",
            Instruction::Jump { .. } | Instruction::JumpOffset { .. } => "JP",
            Instruction::Call { .. } => "CALL",
            Instruction::SkipEqual { .. } | Instruction::SkipEqualRegister { .. } => "SE",
            Instruction::SkipNotEqual { .. } | Instruction::SkipNotEqualRegister { .. } => "SNE",
            Instruction::SetRegister { .. }
            | Instruction::Copy { .. }
            | Instruction::SetIndex { .. }
            | Instruction::GetDelayTimer { .. }
            | Instruction::AwaitKeyPress { .. }
            | Instruction::SetDelayTimer { .. }
            | Instruction::SetSoundTimer { .. }
            | Instruction::SetIndexToSprite { .. }
            | Instruction::StoreBcd { .. }
            | Instruction::StoreRegisters { .. }
            | Instruction::LoadRegisters { .. } => "LD",
            Instruction::AddConst { .. } | Instruction::Add { .. } | Instruction::AddToIndex { .. } => {
                "ADD"
            }
            Instruction::Or { .. } => "OR",
            Instruction::And { .. } => "AND",
            Instruction::Xor { .. } => "XOR",
            Instruction::Sub { .. } => "SUB",
            Instruction::ShiftRight { .. } => "SHR",
            Instruction::SubReverse { .. } => "SUBN",
            Instruction::ShiftLeft { .. } => "SHL",
            Instruction::Random { .. } => "RND",
            Instruction::Draw { .. } => "DRW",
            Instruction::SkipPressed { .. } => "SKP",
            Instruction::SkipNotPressed { .. } => "SKNP",
        }
    }
}

/// Will decode the opcode by trying the masks of the decode table in order.
///
/// # Example
/// ```rust
/// # use chip::opcode::*;
/// assert_eq!(decode(0xE19E), Ok(Instruction::SkipPressed { x: 1 }));
/// assert_eq!(decode(0x8AB4), Ok(Instruction::Add { x: 0xA, y: 0xB }));
/// assert!(decode(0x0000).is_err());
/// ```
pub fn decode(opcode: Opcode) -> Result<Instruction, OpcodeError> {
    DECODE_TABLE
        .iter()
        .find_map(|(mask, keys)| {
            let masked = opcode & mask;
            keys.iter()
                .find(|(key, _)| *key == masked)
                .map(|(_, kind)| *kind)
        })
        .map(|kind| Instruction::build(kind, opcode))
        .ok_or(OpcodeError::InvalidOpcode(opcode))
}

impl TryFrom<Opcode> for Instruction {
    type Error = OpcodeError;

    fn try_from(value: Opcode) -> Result<Self, Self::Error> {
        decode(value)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.mnemonic();
        match *self {
            Instruction::Clear | Instruction::Return => write!(f, "{}", m),
            Instruction::Jump { nnn } | Instruction::Call { nnn } => {
                write!(f, "{} {:#05X}", m, nnn)
            }
            Instruction::JumpOffset { nnn } => write!(f, "{} V0, {:#05X}", m, nnn),
            Instruction::SetIndex { nnn } => write!(f, "{} I, {:#05X}", m, nnn),
            Instruction::SkipEqual { x, nn }
            | Instruction::SkipNotEqual { x, nn }
            | Instruction::SetRegister { x, nn }
            | Instruction::AddConst { x, nn }
            | Instruction::Random { x, nn } => write!(f, "{} V{:X}, {:#04X}", m, x, nn),
            Instruction::SkipEqualRegister { x, y }
            | Instruction::SkipNotEqualRegister { x, y }
            | Instruction::Copy { x, y }
            | Instruction::Or { x, y }
            | Instruction::And { x, y }
            | Instruction::Xor { x, y }
            | Instruction::Add { x, y }
            | Instruction::Sub { x, y }
            | Instruction::ShiftRight { x, y }
            | Instruction::SubReverse { x, y }
            | Instruction::ShiftLeft { x, y } => write!(f, "{} V{:X}, V{:X}", m, x, y),
            Instruction::Draw { x, y, n } => write!(f, "{} V{:X}, V{:X}, {}", m, x, y, n),
            Instruction::SkipPressed { x } | Instruction::SkipNotPressed { x } => {
                write!(f, "{} V{:X}", m, x)
            }
            Instruction::GetDelayTimer { x } => write!(f, "{} V{:X}, DT", m, x),
            Instruction::AwaitKeyPress { x } => write!(f, "{} V{:X}, K", m, x),
            Instruction::SetDelayTimer { x } => write!(f, "{} DT, V{:X}", m, x),
            Instruction::SetSoundTimer { x } => write!(f, "{} ST, V{:X}", m, x),
            Instruction::AddToIndex { x } => write!(f, "{} I, V{:X}", m, x),
            Instruction::SetIndexToSprite { x } => write!(f, "{} F, V{:X}", m, x),
            Instruction::StoreBcd { x } => write!(f, "{} B, V{:X}", m, x),
            Instruction::StoreRegisters { x } => write!(f, "{} [I], V{:X}", m, x),
            Instruction::LoadRegisters { x } => write!(f, "{} V{:X}, [I]", m, x),
        }
    }
}
