//! Structured error types for the CPU core and the assembler.
//!
//! The disassembler has no error type of its own: per the decode-hint rule,
//! an unknown opcode is not fatal, it is rendered as a `DB 0xNN` line tagged
//! `crate::disassembler::DecodeHint::UnknownByte`.

use thiserror::Error;

/// A fault raised by the CPU core. Stored on `Cpu` once `step` halts so that
/// callers can read `cpu.diagnostic()` after the fact, matching the "human
/// readable diagnostic text" field from the data model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("invalid opcode 0x{opcode:02X} at {cs:04X}:{pc:04X}")]
    InvalidOpcode { cs: u16, pc: u16, opcode: u8 },

    #[error("out-of-range memory access at physical address 0x{addr:06X}")]
    OutOfRangeAccess { addr: u32 },

    #[error("division by zero")]
    DivideByZero,

    #[error("quotient overflow (result does not fit in the destination register)")]
    QuotientOverflow,
}

/// An error raised while assembling source text. Every variant carries the
/// 1-based source line number, per the propagation rule in the error design.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssembleError {
    #[error("line {line}: syntax error: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: undefined symbol '{name}'")]
    UndefinedSymbol { line: usize, name: String },

    #[error("line {line}: duplicate definition of '{name}'")]
    DuplicateSymbol { line: usize, name: String },

    #[error("line {line}: relative branch displacement {displacement} out of range (-128..127)")]
    RelativeBranchOutOfRange { line: usize, displacement: i32 },

    #[error("line {line}: {message}")]
    CapacityExceeded { line: usize, message: String },
}

impl AssembleError {
    /// The source line this error was reported on.
    pub fn line(&self) -> usize {
        match self {
            AssembleError::Syntax { line, .. }
            | AssembleError::UndefinedSymbol { line, .. }
            | AssembleError::DuplicateSymbol { line, .. }
            | AssembleError::RelativeBranchOutOfRange { line, .. }
            | AssembleError::CapacityExceeded { line, .. } => *line,
        }
    }
}
