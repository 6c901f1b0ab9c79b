use crate::{memory::Memory, RomError};

#[derive(Clone, Debug, PartialEq)]
/// Represents a single rom with it's information, the bytes are handed in by
/// whatever loaded them.
pub struct Rom {
    /// The rom name
    name: String,
    /// The program data, stored as a u8 slice on the heap
    data: Box<[u8]>,
}

impl Rom {
    /// Will generate a new rom based of the given data, failing if it cannot
    /// fit into the program area of the memory.
    pub fn new(name: &str, data: &[u8]) -> Result<Self, RomError> {
        if data.len() > Memory::MAX_PROGRAM_SIZE {
            return Err(RomError::TooLarge {
                len: data.len(),
                max: Memory::MAX_PROGRAM_SIZE,
            });
        }
        Ok(Rom {
            name: name.to_string(),
            data: data.into(),
        })
    }

    /// Will return a slice internal values of the given data
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    /// Will return the name of the rom.
    pub fn get_name(&self) -> &str {
        &self.name
    }
}
