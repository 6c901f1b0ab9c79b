//! The explicit configuration handed to the chipset and the runner.
use std::time::Duration;

use crate::definitions::cpu;

/// Configures the behaviour of the chipset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipConfig {
    /// If the per instruction trace records shall be built and delivered to
    /// the registered observers.
    pub trace: bool,
    /// The amount of cycles per second the host runs, the timers tick with
    /// every cycle.
    pub cpu_hertz: u64,
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self {
            trace: false,
            cpu_hertz: cpu::HERTZ,
        }
    }
}

impl ChipConfig {
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_cpu_hertz(mut self, hertz: u64) -> Self {
        self.cpu_hertz = hertz;
        self
    }

    /// The time between two cycles.
    ///
    /// # Example
    /// ```rust
    /// # use chip::ChipConfig;
    /// # use std::time::Duration;
    /// let config = ChipConfig::default().with_cpu_hertz(500);
    /// assert_eq!(config.interval(), Duration::from_millis(2));
    /// ```
    pub fn interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.cpu_hertz.max(1))
    }
}
