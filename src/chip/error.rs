use thiserror::Error;

/// Everything that can go wrong while loading or running a program. None of
/// these are transient: once a step fails the machine halts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Chip8Error {
    #[error("memory access out of bounds at address {address:#06X}")]
    Address { address: usize },

    #[error("stack overflow: call at {pc:#05X} with all 16 stack entries in use")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: return at {pc:#05X} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("unknown opcode {opcode:#06X} at address {address:#05X}")]
    Decode { opcode: u16, address: u16 },

    #[error("program is too large ({size} bytes), max size is {max} bytes")]
    Load { size: usize, max: usize },

    #[error("the machine halted after a previous error")]
    Halted,
}
