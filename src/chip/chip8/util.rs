use crate::chip::{
    chip8::{constants::CHIP8_MEMORY_SIZE, Chip8},
    Chip8Error,
};

pub fn conditional_skip<T>(opcode: &T, state: &mut Chip8, f: fn(&T, &Chip8) -> bool) {
    if f(opcode, state) {
        increment_program_counter(state);
    }
}

pub fn increment_program_counter(state: &mut Chip8) {
    state.program_counter = state.program_counter.wrapping_add(2);
}

/// Returns the address `offset` bytes past the index register.
pub fn index_offset(state: &Chip8, offset: u16) -> Result<u16, Chip8Error> {
    state
        .index
        .checked_add(offset)
        .ok_or(Chip8Error::Address {
            address: state.index as usize + offset as usize,
        })
}

/// Fails with the first unaddressable byte unless all `len` bytes starting at
/// the index register lie inside memory.
pub fn check_index_span(state: &Chip8, len: u16) -> Result<(), Chip8Error> {
    let start = state.index as usize;
    if start + len as usize > CHIP8_MEMORY_SIZE {
        return Err(Chip8Error::Address {
            address: start.max(CHIP8_MEMORY_SIZE),
        });
    }
    Ok(())
}
