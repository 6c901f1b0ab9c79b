//! The host loop, driving the chipset with a timed worker and forwarding the
//! results to the display and pulling the keys from the keyboard.
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    chip8::ChipSet,
    config::ChipConfig,
    devices::{DisplayCommands, KeyboardCommands},
    opcode::Operation,
    resources::Rom,
    timer::TimedWorker,
    Crash, RomError,
};

/// Owns the chipset together with the devices it talks to.
pub struct Runner<D, K> {
    chip: ChipSet,
    display: D,
    keyboard: K,
}

impl<D, K> Runner<D, K>
where
    D: DisplayCommands,
    K: KeyboardCommands,
{
    pub fn new(chip: ChipSet, display: D, keyboard: K) -> Self {
        Self {
            chip,
            display,
            keyboard,
        }
    }

    /// Will run a single cycle, the keys that got pressed since the last
    /// tick are handed to the chipset first.
    pub fn tick(&mut self) -> Result<Operation, Crash> {
        for key in self.keyboard.poll() {
            self.chip.press_key(key);
        }

        let operation = self.chip.cycle()?;
        match operation {
            Operation::Clear => self.display.clear_display(),
            Operation::Draw => self.display.display(self.chip.get_display()),
            Operation::None | Operation::Wait => {}
        }
        Ok(operation)
    }

    pub fn get_chip(&self) -> &ChipSet {
        &self.chip
    }
}

/// The handle to a running chipset.
pub struct RunHandle<W> {
    worker: W,
    crash: Arc<Mutex<Option<Crash>>>,
}

impl<W: TimedWorker> RunHandle<W> {
    /// The crash that stopped the chipset, if there was one.
    pub fn crash(&self) -> Option<Crash> {
        self.crash.lock().clone()
    }

    pub fn stop(&mut self) {
        self.worker.stop();
        log::info!("Runner stopped");
    }

    pub fn is_alive(&self) -> bool {
        self.worker.is_alive()
    }
}

/// Will load the rom and run it on the worker at the configured rate. The
/// chipset stops cycling after the first crash.
pub fn run<D, K, W>(
    display: D,
    keyboard: K,
    rom: Rom,
    config: ChipConfig,
) -> Result<RunHandle<W>, RomError>
where
    D: DisplayCommands + Send + 'static,
    K: KeyboardCommands + Send + 'static,
    W: TimedWorker,
{
    let chip = ChipSet::with_config(rom, config)?;
    let mut runner = Runner::new(chip, display, keyboard);

    let crash = Arc::new(Mutex::new(None));
    let ccrash = crash.clone();

    let inner_run = move || {
        let mut slot = ccrash.lock();
        if slot.is_some() {
            return;
        }
        if let Err(err) = runner.tick() {
            log::error!("{}", err);
            *slot = Some(err);
        }
    };

    let mut worker = W::new();
    log::info!("Runner started at {} Hz", config.cpu_hertz);
    worker.start(inner_run, config.interval());

    Ok(RunHandle { worker, crash })
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        thread,
        time::Duration,
    };

    use super::*;
    use crate::{
        devices::{MockDisplayCommands, MockKeyboardCommands},
        timer::Worker,
        ProcessError, StackError,
    };

    fn chip(program: &[u8]) -> ChipSet {
        ChipSet::new(Rom::new("RUNNER", program).expect("small rom")).expect("small rom")
    }

    #[test]
    fn test_tick_draw() {
        // V0 = 0, V1 = 0, I = 0, draw glyph 0, clear
        let program = [0x60, 0x00, 0x61, 0x00, 0xA0, 0x00, 0xD0, 0x15, 0x00, 0xE0];

        let mut display = MockDisplayCommands::new();
        display
            .expect_display()
            .times(1)
            .withf(|pixels| pixels.get(0, 0) && pixels.count_on() == 14)
            .return_const(());
        display.expect_clear_display().times(1).return_const(());

        let mut keyboard = MockKeyboardCommands::new();
        keyboard.expect_poll().times(5).returning(Vec::new);

        let mut runner = Runner::new(chip(&program), display, keyboard);
        for _ in 0..3 {
            assert_eq!(Ok(Operation::None), runner.tick());
        }
        assert_eq!(Ok(Operation::Draw), runner.tick());
        assert_eq!(Ok(Operation::Clear), runner.tick());
    }

    #[test]
    fn test_tick_keys() {
        // wait for a key in V3, then in V4
        let program = [0xF3, 0x0A, 0xF4, 0x0A];

        let mut display = MockDisplayCommands::new();
        display.expect_display().never();
        display.expect_clear_display().never();

        let mut keyboard = MockKeyboardCommands::new();
        let mut polls = vec![vec![], vec![0xC, 0x5], vec![]].into_iter();
        keyboard
            .expect_poll()
            .times(3)
            .returning(move || polls.next().unwrap_or_default());

        let mut runner = Runner::new(chip(&program), display, keyboard);
        assert_eq!(Ok(Operation::Wait), runner.tick());
        assert_eq!(runner.get_chip().get_program_counter(), 0x200);

        assert_eq!(Ok(Operation::None), runner.tick());
        assert_eq!(runner.get_chip().get_registers()[3], 0xC);
        assert_eq!(runner.get_chip().get_keypad().pending(), &[0x5]);

        // the second key is still pending from the last poll
        assert_eq!(Ok(Operation::None), runner.tick());
        assert_eq!(runner.get_chip().get_registers()[4], 0x5);
        assert_eq!(runner.get_chip().get_program_counter(), 0x204);
    }

    #[test]
    fn test_run_until_crash() {
        let mut display = MockDisplayCommands::new();
        display.expect_display().never();
        display.expect_clear_display().never();

        // every tick polls the keyboard exactly once
        let ticks = Arc::new(AtomicUsize::new(0));
        let cticks = ticks.clone();
        let mut keyboard = MockKeyboardCommands::new();
        keyboard.expect_poll().returning(move || {
            cticks.fetch_add(1, Ordering::SeqCst);
            Vec::new()
        });

        let config = ChipConfig::default().with_cpu_hertz(1000);
        let rom = Rom::new("RETURN", &[0x00, 0xEE]).expect("small rom");
        let mut handle: RunHandle<Worker> =
            run(display, keyboard, rom, config).expect("small rom");
        assert!(handle.is_alive());

        thread::sleep(Duration::from_millis(50));

        let crash = handle.crash().expect("the return on an empty stack crashes");
        assert_eq!(crash.kind, ProcessError::Stack(StackError::Empty));
        assert_eq!(crash.pc, 0x200);
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        // the worker keeps running, but the chipset is not cycled anymore
        thread::sleep(Duration::from_millis(50));
        assert!(handle.is_alive());
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
        assert_eq!(handle.crash(), Some(crash));

        handle.stop();
        assert!(!handle.is_alive());
    }
}
