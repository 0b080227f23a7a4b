mod cpu;
mod load;
mod ram;
mod utils;

pub mod config;
pub mod isa;
pub mod logging;

pub use config::ram_config;
pub use cpu::{Reg, RegFile};
pub use isa::riscv::{
    executor::{CpuState, RV64CPU},
    trap::{Exception, Fault},
};

use std::{io, path::Path};

/// A complete simulator instance: one hart together with the memory and
/// CSRs it owns. Instances are independent; no process-wide state exists.
pub struct Emulator {
    cpu: RV64CPU,
}

impl Emulator {
    /// Build a simulator from a flat binary image already in memory.
    pub fn from_image(image: &[u8]) -> Self {
        Self {
            cpu: RV64CPU::from_image(image),
        }
    }

    /// Read a flat binary file and build a simulator from it.
    pub fn from_bin(path: &Path) -> io::Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self::from_image(&bytes))
    }

    /// Run until the PC leaves the loaded image or a fault is raised.
    /// Returns the number of retired instructions.
    pub fn run(&mut self) -> Result<usize, Fault> {
        self.cpu.run()
    }

    pub fn cpu(&self) -> &RV64CPU {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut RV64CPU {
        &mut self.cpu
    }
}
