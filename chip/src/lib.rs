pub mod chip8;
pub mod config;
pub mod definitions;
pub mod devices;
pub mod display;
pub mod memory;
pub mod observer;
pub mod opcode;
pub mod resources;
pub mod timer;
mod error;

// reexporting for convinience
mod runner;
pub use config::ChipConfig;
pub use error::*;
pub use runner::*;
