use crate::{
    definitions::{cpu, display, memory},
    opcode::{Instruction, Operation, ProgramCounterStep},
    ProcessError,
};

use super::ChipSet;

/// The result of a single instruction, the requested program counter movement
/// and the command for the host.
type Executed = Result<(ProgramCounterStep, Operation), ProcessError>;

impl ChipSet {
    /// Will execute the instruction. The program counter already points to
    /// the following instruction.
    pub(super) fn execute(&mut self, instruction: &Instruction) -> Executed {
        let next = Ok((ProgramCounterStep::None, Operation::None));
        match *instruction {
            Instruction::Clear => {
                // 00E0
                self.display.clear();
                Ok((ProgramCounterStep::None, Operation::Clear))
            }
            Instruction::Return => {
                // 00EE
                // Return from sub routine => pop from stack
                let pc = self.pop_stack()?;
                log::debug!("return to {:#06X}", pc);
                Ok((ProgramCounterStep::Jump(pc), Operation::None))
            }
            Instruction::Jump { nnn } => Ok((ProgramCounterStep::Jump(nnn), Operation::None)),
            Instruction::Call { nnn } => {
                // the program counter already points to the instruction to return to
                self.push_stack(self.program_counter)?;
                log::debug!("call {:#06X}, stack depth {}", nnn, self.stack.len());
                Ok((ProgramCounterStep::Jump(nnn), Operation::None))
            }
            Instruction::SkipEqual { x, nn } => skip(self.registers[x] == nn),
            Instruction::SkipNotEqual { x, nn } => skip(self.registers[x] != nn),
            Instruction::SkipEqualRegister { x, y } => skip(self.registers[x] == self.registers[y]),
            Instruction::SkipNotEqualRegister { x, y } => {
                skip(self.registers[x] != self.registers[y])
            }
            Instruction::SetRegister { x, nn } => {
                self.registers[x] = nn;
                next
            }
            Instruction::AddConst { x, nn } => {
                // let VX overflow, but ignore carry
                self.registers[x] = self.registers[x].wrapping_add(nn);
                next
            }
            Instruction::Copy { x, y } => {
                self.registers[x] = self.registers[y];
                next
            }
            Instruction::Or { x, y } => {
                self.registers[x] |= self.registers[y];
                self.registers[cpu::register::LAST] = 0;
                next
            }
            Instruction::And { x, y } => {
                self.registers[x] &= self.registers[y];
                self.registers[cpu::register::LAST] = 0;
                next
            }
            Instruction::Xor { x, y } => {
                self.registers[x] ^= self.registers[y];
                self.registers[cpu::register::LAST] = 0;
                next
            }
            Instruction::Add { x, y } => {
                let sum = self.registers[x] as u16 + self.registers[y] as u16;
                self.registers[x] = sum as u8;
                self.set_flag(sum > u8::MAX as u16);
                next
            }
            Instruction::Sub { x, y } => {
                self.subtract(x, self.registers[x], self.registers[y]);
                next
            }
            Instruction::SubReverse { x, y } => {
                self.subtract(x, self.registers[y], self.registers[x]);
                next
            }
            Instruction::ShiftRight { x, y } => {
                // VX is loaded from VY before shifting
                let value = self.registers[y];
                self.registers[x] = value >> 1;
                self.registers[cpu::register::LAST] = value & 0x1;
                next
            }
            Instruction::ShiftLeft { x, y } => {
                // VX is loaded from VY before shifting
                let value = self.registers[y];
                self.registers[x] = value << 1;
                self.registers[cpu::register::LAST] = value >> 7;
                next
            }
            Instruction::SetIndex { nnn } => {
                self.index_register = nnn;
                next
            }
            Instruction::JumpOffset { nnn } => {
                let v0 = self.registers[0] as usize;
                Ok((ProgramCounterStep::Jump(nnn + v0), Operation::None))
            }
            Instruction::Random { x, nn } => {
                // using a fill bytes call here, as the trait RngCore does not
                // support random u8.
                let mut rand = [0u8; 1];
                self.rng.fill_bytes(&mut rand);
                self.registers[x] = rand[0] & nn;
                next
            }
            Instruction::Draw { x, y, n } => self.draw(x, y, n),
            Instruction::SkipPressed { x } => {
                let key = self.registers[x];
                skip(self.keypad.try_consume(key))
            }
            Instruction::SkipNotPressed { x } => {
                let key = self.registers[x];
                skip(!self.keypad.try_consume(key))
            }
            Instruction::GetDelayTimer { x } => {
                self.registers[x] = self.delay_timer.get_value();
                next
            }
            Instruction::AwaitKeyPress { x } => match self.keypad.pop_earliest() {
                Some(key) => {
                    self.registers[x] = key;
                    next
                }
                // run this instruction again next cycle
                None => Ok((ProgramCounterStep::Rewind, Operation::Wait)),
            },
            Instruction::SetDelayTimer { x } => {
                self.delay_timer.set_value(self.registers[x]);
                next
            }
            Instruction::SetSoundTimer { x } => {
                self.sound_timer.set_value(self.registers[x]);
                next
            }
            Instruction::AddToIndex { x } => {
                self.index_register += self.registers[x] as usize;
                if self.index_register >= memory::SIZE {
                    log::warn!(
                        "The index register {:#06X} points past the memory",
                        self.index_register
                    );
                }
                next
            }
            Instruction::SetIndexToSprite { x } => {
                let digit = self.registers[x] as usize;
                if digit > 0xF {
                    log::warn!("There is no font glyph for {:#X} in V{:X}", digit, x);
                }
                self.index_register =
                    display::fontset::LOCATION + digit * display::fontset::GLYPH_SIZE;
                next
            }
            Instruction::StoreBcd { x } => {
                let r = self.registers[x];
                // 246u8 / 100 => 2, 246u8 / 10 % 10 => 4, 246u8 % 10 => 6
                self.memory.write(self.index_register, &[r / 100, r / 10 % 10, r % 10])?;
                next
            }
            Instruction::StoreRegisters { x } => {
                self.memory.write(self.index_register, &self.registers[..=x])?;
                self.index_register += x + 1;
                next
            }
            Instruction::LoadRegisters { x } => {
                let data = self.memory.read(self.index_register, x + 1)?;
                self.registers[..=x].copy_from_slice(data);
                self.index_register += x + 1;
                next
            }
        }
    }

    /// Will set `VF` to `1` if the flag is set, otherwise to `0`.
    fn set_flag(&mut self, flag: bool) {
        self.registers[cpu::register::LAST] = flag as u8;
    }

    /// `VX = left - right`, with `VF` set only if left is strictly bigger.
    fn subtract(&mut self, x: usize, left: u8, right: u8) {
        self.registers[x] = left.wrapping_sub(right);
        self.set_flag(left > right);
    }

    /// Draws a sprite at coordinate `(VX, VY)` that has a width of 8 pixels and a height of `n`
    /// pixels. Each row of 8 pixels is read as bit-coded starting from memory location `I`; `I`
    /// doesn't change. Every pixel is xored onto the screen and wraps around on its own, `VF` is
    /// set if any pixel was turned off.
    fn draw(&mut self, x: usize, y: usize, n: usize) -> Executed {
        let coorx = self.registers[x] as usize;
        let coory = self.registers[y] as usize;

        // read the sprite first, so an invalid index leaves VF alone
        let sprite = self.memory.read(self.index_register, n)?;

        self.registers[cpu::register::LAST] = 0;
        let mut changed = false;

        for (i, row) in sprite.iter().enumerate() {
            for j in 0..display::sprite::WIDTH {
                // most significant bit first
                let mask: u8 = 0x80 >> j;
                if row & mask == 0 {
                    continue;
                }

                changed = true;
                if self.display.xor_pixel(coorx + j, coory + i, true) {
                    self.registers[cpu::register::LAST] = 1;
                }
            }
        }

        let operation = if changed {
            Operation::Draw
        } else {
            Operation::None
        };
        Ok((ProgramCounterStep::None, operation))
    }
}

#[inline]
fn skip(cond: bool) -> Executed {
    Ok((ProgramCounterStep::cond(cond), Operation::None))
}
