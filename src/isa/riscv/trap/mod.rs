use thiserror::Error;

use crate::{config::arch_config::WordType, ram::MemError};

/// Architectural faults. Every kind is terminal for the current run.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum Exception {
    #[error("illegal instruction")]
    IllegalInstruction,
    #[error("load access fault")]
    LoadAccessFault,
    #[error("misaligned jump")]
    MisalignedJump,
}

impl Exception {
    /// Out-of-range accesses raise a load access fault on both loads
    /// and stores.
    pub fn from_memory_err(err: MemError) -> Self {
        match err {
            MemError::OutOfRange => Exception::LoadAccessFault,
        }
    }

    /// Standard mcause encoding of the fault kind.
    pub fn code(&self) -> WordType {
        match self {
            Exception::MisalignedJump => 0,
            Exception::IllegalInstruction => 2,
            Exception::LoadAccessFault => 5,
        }
    }
}

/// What the run loop surfaces: the raised kind and the address of the
/// faulting instruction.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
#[error("{kind} at pc {pc:#x}")]
pub struct Fault {
    pub kind: Exception,
    pub pc: WordType,
}
