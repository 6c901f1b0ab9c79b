use rand::RngCore;
use tinyvec::ArrayVec;

use crate::{
    config::ChipConfig,
    definitions::{cpu, memory},
    devices::Keypad,
    display::Framebuffer,
    memory::Memory,
    observer::{EventSystem, Observer, TraceRecord},
    opcode::{self, Opcode, Operation},
    resources::Rom,
    timer::Timer,
    Crash, ProcessError, RomError, StackError,
};

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instant on the
/// Chip8 CPU.
pub struct ChipSet {
    /// name of the loaded rom
    pub(super) name: String,
    /// the last fetched opcode, all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// - `0x000-0x04F` - Used for the built in `4x5` pixel font set (`0-F`)
    /// - `0x200-0xFFF` - Program ROM and work RAM
    pub(super) memory: Memory,
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions; thus, it should be avoided. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`. It is not masked, so it can point past the memory.
    pub(super) index_register: usize,
    /// The program counter is a CPU register in the computer processor which has the address of the
    /// next instruction to be executed from memory.
    pub(super) program_counter: usize,
    /// The stack is only used to store return addresses when subroutines are called. The original
    /// [RCA 1802](https://de.wikipedia.org/wiki/RCA1802) version allocated `48` bytes for up to
    /// `12` levels of nesting; modern implementations usually have more.
    /// (here we are using `16`)
    pub(super) stack: ArrayVec<[usize; cpu::stack::SIZE]>,
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    /// Counts down once per cycle, until it reaches 0.
    pub(super) delay_timer: Timer,
    /// Sound timer: While its value is nonzero, a beep is owed to the host.
    /// Counts down once per cycle, until it reaches 0.
    pub(super) sound_timer: Timer,
    /// The framebuffer the draw instruction renders into.
    pub(super) display: Framebuffer,
    /// Set if the current cycle changed any pixel.
    pub(super) dirty: bool,
    /// The pending key presses, consumed by the key instructions.
    pub(super) keypad: Keypad,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
    pub(super) config: ChipConfig,
    /// The receivers of the per instruction trace records.
    pub(super) tracer: EventSystem<TraceRecord>,
}

/// A copy of the processor state, used for the crash dumps.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub opcode: Opcode,
    pub program_counter: usize,
    pub index_register: usize,
    pub registers: [u8; cpu::register::SIZE],
    /// The return addresses, oldest first.
    pub stack: Vec<usize>,
    pub delay_timer: u8,
    pub sound_timer: u8,
}

impl ChipSet {
    /// will create a new chipset object with the default configuration
    pub fn new(rom: Rom) -> Result<Self, RomError> {
        Self::with_config(rom, ChipConfig::default())
    }

    /// will create a new chipset object
    pub fn with_config(rom: Rom, config: ChipConfig) -> Result<Self, RomError> {
        // initialize all the memory with 0 and the font
        let mut memory = Memory::new();

        // write the rom data into memory
        memory.load_program(rom.get_data())?;

        log::info!(
            "Loaded rom '{}' with {} bytes",
            rom.get_name(),
            rom.get_data().len()
        );

        Ok(Self {
            name: rom.get_name().to_string(),
            opcode: 0,
            memory,
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER,
            stack: ArrayVec::new(),
            delay_timer: Timer::default(),
            sound_timer: Timer::default(),
            display: Framebuffer::new(),
            dirty: false,
            keypad: Keypad::new(),
            rng: Box::new(rand::rngs::OsRng),
            config,
            tracer: EventSystem::new(),
        })
    }

    /// Will run a single machine cycle: fetch, advance the program counter,
    /// decode, execute and tick the timers.
    ///
    /// A failing cycle leaves the state as it was at the moment of failure
    /// and the timers untouched, the chipset should not be cycled afterwards.
    pub fn cycle(&mut self) -> Result<Operation, Crash> {
        self.dirty = false;
        let address = self.program_counter;

        let operation = self.step().map_err(|kind| self.crash(kind, address))?;

        self.delay_timer.tick();
        self.sound_timer.tick();

        Ok(operation)
    }

    fn step(&mut self) -> Result<Operation, ProcessError> {
        let address = self.program_counter;

        // fetch
        self.opcode = self.memory.opcode(address)?;
        self.program_counter += memory::opcodes::SIZE;
        log::debug!("opcode {:#06X} at {:#06X}", self.opcode, address);

        // decode
        let instruction = opcode::decode(self.opcode)?;

        // execute
        let (step, operation) = self.execute(&instruction)?;
        self.program_counter = step.apply(self.program_counter);

        if operation == Operation::Draw {
            self.dirty = true;
        }

        if self.config.trace {
            self.tracer.handle_event(&TraceRecord {
                address,
                opcode: self.opcode,
                instruction,
            });
        }

        Ok(operation)
    }

    fn crash(&self, kind: ProcessError, address: usize) -> Crash {
        let crash = Crash {
            kind,
            opcode: self.opcode,
            pc: address,
            snapshot: self.snapshot(),
        };
        log::debug!("{}", crash);
        crash
    }

    /// Will copy the processor state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            opcode: self.opcode,
            program_counter: self.program_counter,
            index_register: self.index_register,
            registers: self.registers,
            stack: self.stack.to_vec(),
            delay_timer: self.delay_timer.get_value(),
            sound_timer: self.sound_timer.get_value(),
        }
    }

    /// Will mark the key as pressed.
    pub fn press_key(&mut self, key: u8) {
        self.keypad.press(key)
    }

    /// Will get the current state of the keypad
    pub fn get_keypad(&self) -> &Keypad {
        &self.keypad
    }

    /// Will return the name of the loaded rom
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// will return the sound timer
    pub fn get_sound_timer(&self) -> u8 {
        self.sound_timer.get_value()
    }

    /// If a beep is currently owed to the host.
    pub fn is_sound_active(&self) -> bool {
        self.sound_timer.is_active()
    }

    /// will return the delay timer
    pub fn get_delay_timer(&self) -> u8 {
        self.delay_timer.get_value()
    }

    /// Will return the current framebuffer
    pub fn get_display(&self) -> &Framebuffer {
        &self.display
    }

    /// If the last cycle changed any pixel.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn get_registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn get_index_register(&self) -> usize {
        self.index_register
    }

    pub fn get_program_counter(&self) -> usize {
        self.program_counter
    }

    pub fn get_memory(&self) -> &Memory {
        &self.memory
    }

    /// Will replace the random number generator, used by `CXNN`.
    pub fn set_rng(&mut self, rng: Box<dyn RngCore + Send>) {
        self.rng = rng;
    }

    /// Will register an observer for the trace records, returns the id
    /// needed for removing it. Records are only built if tracing is enabled
    /// in the configuration.
    pub fn register_observer(&mut self, observer: Box<dyn Observer<TraceRecord> + Send>) -> usize {
        self.tracer.register_observer(observer)
    }

    pub fn remove_observer(&mut self, id: usize) -> bool {
        self.tracer.remove_observer(id).is_some()
    }

    /// Will push the current pointer to the stack
    pub(super) fn push_stack(&mut self, pointer: usize) -> Result<(), StackError> {
        match self.stack.try_push(pointer) {
            None => Ok(()),
            Some(_) => Err(StackError::Full),
        }
    }

    /// Will pop from the stack
    pub(super) fn pop_stack(&mut self) -> Result<usize, StackError> {
        self.stack.pop().ok_or(StackError::Empty)
    }
}
