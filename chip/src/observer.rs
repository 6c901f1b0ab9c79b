//! The observer responsible for handing out the per instruction trace records.
use hashbrown::HashMap;
use std::fmt;

use crate::opcode::{Instruction, Opcode};

/// A single executed instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    /// Address the instruction was fetched from.
    pub address: usize,
    pub opcode: Opcode,
    pub instruction: Instruction,
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:#06X}  {:#06X}  {}",
            self.address, self.opcode, self.instruction
        )
    }
}

pub trait Observer<E> {
    fn on_notify(&mut self, event: &E);
}

/// Any closure taking the event is an observer.
impl<E, F> Observer<E> for F
where
    F: FnMut(&E),
{
    fn on_notify(&mut self, event: &E) {
        self(event)
    }
}

pub struct EventSystem<E> {
    observers: HashMap<usize, Box<dyn Observer<E> + Send>>,
    counter: usize,
}

impl<E> Default for EventSystem<E> {
    fn default() -> Self {
        EventSystem {
            observers: HashMap::new(),
            counter: 0,
        }
    }
}

impl<E> EventSystem<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_observer(&mut self, observer: Box<dyn Observer<E> + Send>) -> usize {
        self.counter += 1;
        self.observers.insert(self.counter, observer);
        self.counter
    }

    pub fn remove_observer(&mut self, index: usize) -> Option<Box<dyn Observer<E> + Send>> {
        self.observers.remove(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn handle_event(&mut self, event: &E) {
        for observer in self.observers.values_mut() {
            observer.on_notify(event);
        }
    }
}

impl<E> fmt::Debug for EventSystem<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSystem")
            .field("observers", &self.observers.len())
            .field("counter", &self.counter)
            .finish()
    }
}
