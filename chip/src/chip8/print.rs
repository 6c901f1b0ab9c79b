//! The pretty print implementation for the [`Snapshot`](super::Snapshot) crash dumps and the
//! full [`ChipSet`](super::ChipSet) including memory and keypad.
//! This implementation was split up into this file for smaller file sizes and higher
//! cohesion.

use super::{ChipSet, Snapshot};
use crate::definitions::cpu;
use once_cell::sync::Lazy;
use std::fmt;

/// The amount of entries printed per row
const HEX_PRINT_STEP: usize = 8;

const END_OF_LINE: char = '\n';
const INDENT_FILLAMENT: char = '\t';
const INDENT_SIZE: usize = 2;

/// Will add an indent post processing
fn indent_helper(text: &mut String, indent: usize) {
    for _ in 0..indent {
        text.push(INDENT_FILLAMENT);
    }
}

macro_rules! intformat {
    () => {
        // The formatted string will be 2 symbols for the prefix (0x)
        // and 4 for the rest long.
        "{:#06X}"
    };
}

static INTEGER_LEN: Lazy<usize> = Lazy::new(|| format!(intformat!(), 0u8).len());

/// Handles all the printing of the pointer values.
mod pointer_print {
    use std::fmt::{self, Write};

    /// will format the pointers according to definition
    pub(super) fn formatter(line: &mut String, from: usize, to: usize) -> fmt::Result {
        write!(line, concat!(intformat!(), " - ", intformat!(), " :"), from, to)
    }
}

/// Handles all the memory prints, two bytes are shown as a single word.
mod opcode_print {
    use super::{pointer_print, HEX_PRINT_STEP};
    use crate::{definitions::memory, opcode};
    use std::fmt::{self, Write};

    /// The amount of bytes a single row covers
    const POINTER_INCREMENT: usize = HEX_PRINT_STEP * memory::opcodes::SIZE;
    /// The values that are used when there are at least two rows of zeros.
    const FILLER_BASE: &str = "...";

    /// a single row of words
    struct Row {
        from: usize,
        to: usize,
        data: [opcode::Opcode; HEX_PRINT_STEP],
        only_null: bool,
    }

    impl fmt::Display for Row {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let mut res = String::new();
            pointer_print::formatter(&mut res, self.from, self.to)?;
            res.push(' ');

            if self.only_null {
                write!(res, concat!(intformat!(), " {} ", intformat!()), 0, FILLER_BASE, 0)?;
            } else {
                let words: Vec<String> = self
                    .data
                    .iter()
                    .map(|word| format!(intformat!(), word))
                    .collect();
                res.push_str(&words.join(" "));
            }
            write!(f, "{}", res)
        }
    }

    /// will pretty print the content of the raw memory, runs of zero rows are
    /// collapsed into a single one
    pub(super) fn printer(memory: &[u8], indent: usize) -> Result<String, fmt::Error> {
        let mut rows: Vec<Row> = Vec::with_capacity(memory.len() / POINTER_INCREMENT);

        for from in (0..memory.len()).step_by(POINTER_INCREMENT) {
            let to = (from + POINTER_INCREMENT - 1).min(memory.len() - 1);

            let mut data = [0; HEX_PRINT_STEP];
            for (slot, index) in data
                .iter_mut()
                .zip((from..to).step_by(memory::opcodes::SIZE))
            {
                // the memory always has an even length
                *slot = opcode::build_opcode(memory, index).unwrap_or_default();
            }
            let only_null = data.iter().all(|&word| word == 0);

            let mut row = Row {
                from,
                to,
                data,
                only_null,
            };

            if only_null {
                if let Some(last_row) = rows.last() {
                    if last_row.only_null {
                        row.from = last_row.from;
                        rows.pop();
                    }
                }
            }
            rows.push(row)
        }

        let mut string = String::new();
        for row in rows {
            super::indent_helper(&mut string, indent);
            write!(string, "{}{}", row, super::END_OF_LINE)?;
        }
        if let Some(index) = string.rfind(super::END_OF_LINE) {
            string.truncate(index);
        }
        Ok(string)
    }
}

/// handles printing of any and all of integers.
mod integer_print {
    use super::{pointer_print, END_OF_LINE, HEX_PRINT_STEP};
    use std::fmt::{self, Write};

    /// will format all integer types
    pub(super) fn formatter<T>(line: &mut String, data: T) -> fmt::Result
    where
        T: fmt::UpperHex + num_traits::Unsigned + Copy,
    {
        write!(line, intformat!(), data)
    }

    /// will pretty print all the integer data given
    pub(super) fn printer<T>(data: &[T], indent: usize) -> Result<String, fmt::Error>
    where
        T: fmt::UpperHex + num_traits::Unsigned + Copy,
    {
        let mut res = String::new();
        for (row, chunk) in data.chunks(HEX_PRINT_STEP).enumerate() {
            let i = row * HEX_PRINT_STEP;
            super::indent_helper(&mut res, indent);
            pointer_print::formatter(&mut res, i, i + chunk.len() - 1)?;

            for entry in chunk {
                res.push(' ');
                formatter(&mut res, *entry)?;
            }
            res.push(END_OF_LINE);
        }

        // Remove unneeded new line
        if let Some(index) = res.rfind(END_OF_LINE) {
            res.truncate(index);
        }

        Ok(res)
    }
}

/// Handles all the boolean data types.
mod bool_print {
    use super::{pointer_print, END_OF_LINE, HEX_PRINT_STEP};
    use once_cell::sync::Lazy;

    /// the prepared true string
    static TRUE: Lazy<String> = Lazy::new(|| formatter("true"));
    /// the prepared false string
    static FALSE: Lazy<String> = Lazy::new(|| formatter("false"));

    /// a function to keep the correct format length
    fn formatter(message: &str) -> String {
        format!("{:<width$}", message, width = *super::INTEGER_LEN)
    }

    /// will pretty print all the boolean data given
    pub(super) fn printer(data: &[bool], indent: usize) -> Result<String, std::fmt::Error> {
        let check_type = |val: bool| if val { &*TRUE } else { &*FALSE };

        let mut res = String::new();
        for (row, chunk) in data.chunks(HEX_PRINT_STEP).enumerate() {
            let i = row * HEX_PRINT_STEP;
            super::indent_helper(&mut res, indent);
            pointer_print::formatter(&mut res, i, i + chunk.len() - 1)?;

            let values: Vec<&str> = chunk.iter().map(|&value| check_type(value).as_str()).collect();
            res.push(' ');
            res.push_str(values.join(" ").trim_end());
            res.push(END_OF_LINE);
        }
        // Remove unneeded new line
        if let Some(index) = res.rfind(END_OF_LINE) {
            res.truncate(index);
        }

        Ok(res)
    }
}

/// Will print a single value on its own indented line.
fn single(value: usize) -> Result<String, fmt::Error> {
    let mut line = String::new();
    indent_helper(&mut line, INDENT_SIZE);
    integer_print::formatter(&mut line, value)?;
    Ok(line)
}

impl Snapshot {
    /// Will write the register part of the dump, shared by the snapshot and
    /// the full chipset print.
    fn write_registers(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // handle stack specially as it needs to be filled up if empty
        let mut stack = [0usize; cpu::stack::SIZE];
        stack[..self.stack.len()].copy_from_slice(&self.stack);

        let sta = integer_print::printer(&stack, INDENT_SIZE)?;
        let reg = integer_print::printer(&self.registers, INDENT_SIZE)?;
        let timers = integer_print::printer(&[self.delay_timer, self.sound_timer], INDENT_SIZE)?;

        write!(
            f,
            "\tOpcode :\n{}\n\
             \tProgram Counter :\n{}\n\
             \tIndex Register :\n{}\n\
             \tTimers (DT, ST) :\n{}\n\
             \tStack ({}) :\n{}\n\
             \tRegister :\n{}\n",
            single(self.opcode as usize)?,
            single(self.program_counter)?,
            single(self.index_register)?,
            timers,
            self.stack.len(),
            sta,
            reg
        )
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Snapshot {{")?;
        self.write_registers(f)?;
        write!(f, "}}")
    }
}

impl fmt::Display for ChipSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // prepare the rom name
        let mut nam = String::with_capacity(INDENT_SIZE + self.name.len());
        indent_helper(&mut nam, INDENT_SIZE);
        nam.push_str(&self.name);

        let mem = opcode_print::printer(self.memory.as_slice(), INDENT_SIZE)?;
        let key = bool_print::printer(&self.keypad.get_keys(), INDENT_SIZE)?;

        write!(f, "Chipset {{\n\tProgram Name :\n{}\n", nam)?;
        self.snapshot().write_registers(f)?;
        write!(
            f,
            "\tKeypad :\n{}\n\
             \tMemory :\n{}\n\
             }}",
            key, mem
        )
    }
}
