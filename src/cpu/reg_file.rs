use std::{
    fmt::Debug,
    ops::{Index, IndexMut},
};

use crate::config::arch_config::{REG_NAME, REGFILE_CNT, WordType};

/// A general-purpose register identified by its 5-bit index.
///
/// The index is the canonical form; the ABI name is a constant-time view
/// used for diagnostics only.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Reg(u8);

impl Reg {
    pub const fn new(index: u8) -> Self {
        Reg(index & 0x1F)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub fn name(self) -> &'static str {
        REG_NAME[self.index()]
    }

    pub fn from_name(name: &str) -> Option<Reg> {
        REG_NAME.iter().position(|&n| n == name).map(|i| Reg(i as u8))
    }
}

impl Debug for Reg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}/{}", self.0, self.name())
    }
}

pub struct RegFile {
    data: [WordType; REGFILE_CNT],
}

impl Index<usize> for RegFile {
    type Output = WordType;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<usize> for RegFile {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl Debug for RegFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "reg_file {{")?;
        for (i, val) in self.data.iter().enumerate() {
            if i % 4 == 0 {
                write!(f, "  ")?;
            }

            write!(f, "{:>4}: 0x{:016x}  ", Reg::new(i as u8).name(), val)?;

            if i % 4 == 3 {
                writeln!(f)?;
            }
        }
        write!(f, "}}")
    }
}

impl RegFile {
    pub fn new() -> Self {
        Self {
            data: [0; REGFILE_CNT],
        }
    }

    /// Paired source-register read.
    pub fn read(&self, rs1: u8, rs2: u8) -> (WordType, WordType) {
        (self.data[rs1 as usize], self.data[rs2 as usize])
    }

    /// Writes to register 0 are silently discarded.
    pub fn write(&mut self, rd: u8, value: WordType) {
        if rd != 0 {
            self.data[rd as usize] = value;
        }
    }
}
