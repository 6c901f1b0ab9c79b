use tinyvec::ArrayVec;

use crate::{definitions::keyboard, display::Framebuffer};

#[cfg_attr(test, mockall::automock)]
/// The traits responsible for the display based code
pub trait DisplayCommands {
    /// Will clear the display
    fn clear_display(&mut self);
    /// Will display all from the pixels
    fn display(&mut self, pixels: &Framebuffer);
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for delivering the keyboard data, every key code
/// returned is treated as a fresh key press.
pub trait KeyboardCommands {
    fn poll(&mut self) -> Vec<u8>;
}

/// Will store the pending key presses in the order they happened.
///
/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. The `8`, `4`, `6`, and
/// `2` keys are typically used for directional input. Three opcodes are used to detect input.
/// One skips an instruction if a specific key is pressed, while another does the same if a
/// specific key is not pressed. The third waits for a key press, and then stores it in one of
/// the data registers. Each of them consumes the key it reports as pressed.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Keypad {
    pending: ArrayVec<[u8; keyboard::SIZE]>,
}

impl Keypad {
    pub fn new() -> Self {
        Keypad::default()
    }

    /// Will mark the key as pressed, a key already pending keeps its position.
    pub fn press(&mut self, key: u8) {
        if key as usize >= keyboard::SIZE {
            log::warn!("Ignoring the key {:#X} as it is not on the keypad", key);
            return;
        }
        if !self.pending.contains(&key) {
            self.pending.push(key);
        }
    }

    /// Will consume the key if it is pending and report if it was.
    pub fn try_consume(&mut self, key: u8) -> bool {
        match self.pending.iter().position(|&k| k == key) {
            Some(index) => {
                self.pending.remove(index);
                true
            }
            None => false,
        }
    }

    /// Will consume the oldest pending key.
    pub fn pop_earliest(&mut self) -> Option<u8> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// The pending keys, oldest first.
    pub fn pending(&self) -> &[u8] {
        &self.pending[..]
    }

    /// Will return the pressed state of every key.
    pub fn get_keys(&self) -> [bool; keyboard::SIZE] {
        let mut keys = [false; keyboard::SIZE];
        for &key in self.pending.iter() {
            keys[key as usize] = true;
        }
        keys
    }
}
