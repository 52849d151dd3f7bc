use core::convert::TryFrom;
use log::debug;
use rand::Rng;
use std::marker::PhantomData;

use crate::chip::{
    chip8::{
        constants::{CHIP8_CHARSET_GLYPH_LEN, CHIP8_CHARSET_OFFSET, CHIP8_FLAG_REGISTER},
        opcodes::{
            ExecutableOpcode, InstructionParsingError, InstructionWithAddress,
            InstructionWithOperands, InstructionWithRegAndValue, Opcode,
        },
        util, Chip8, MachineState,
    },
    Chip8Error,
};

define_instruction_with_reg_and_value!(Ldr, LdrInstruction, 0x6);
impl ExecutableOpcode for LdrInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        state.registers[self.reg as usize] = self.value;
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_reg_and_value!(Add, AddInstruction, 0x7);
impl ExecutableOpcode for AddInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        state.registers[self.reg as usize] =
            state.registers[self.reg as usize].wrapping_add(self.value);
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_operands!(Reg, RegInstruction, 0x8);
impl ExecutableOpcode for RegInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        /// Stores the result of `f` in `r1` and, if `f` reports one, the flag
        /// in VF afterwards. The flag therefore wins if `r1` is VF.
        fn modify_registers(
            state: &mut Chip8,
            r1: u8,
            r2: u8,
            f: fn(u8, u8) -> (u8, Option<bool>),
        ) {
            let (val, flag) = f(state.registers[r1 as usize], state.registers[r2 as usize]);
            state.registers[r1 as usize] = val;
            if let Some(flag) = flag {
                state.registers[CHIP8_FLAG_REGISTER] = flag as u8;
            }
        }

        match self.op3 {
            0x0 => modify_registers(state, self.op1, self.op2, |_, v2| (v2, None)),
            0x1 => modify_registers(state, self.op1, self.op2, |v1, v2| (v1 | v2, None)),
            0x2 => modify_registers(state, self.op1, self.op2, |v1, v2| (v1 & v2, None)),
            0x3 => modify_registers(state, self.op1, self.op2, |v1, v2| (v1 ^ v2, None)),
            0x4 => modify_registers(state, self.op1, self.op2, |v1, v2| {
                let (result, overflow) = v1.overflowing_add(v2);
                (result, Some(overflow))
            }),
            0x5 => modify_registers(state, self.op1, self.op2, |v1, v2| {
                (v1.wrapping_sub(v2), Some(v1 > v2))
            }),
            0x6 => modify_registers(state, self.op1, self.op2, |v1, _| {
                (v1 >> 1, Some(v1 & 1 != 0))
            }),
            0x7 => modify_registers(state, self.op1, self.op2, |v1, v2| {
                (v2.wrapping_sub(v1), Some(v2 > v1))
            }),
            0xE => modify_registers(state, self.op1, self.op2, |v1, _| {
                (v1 << 1, Some(v1 & 0x80 != 0))
            }),
            _ => return Err(state.decode_error()),
        };
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_address!(Ld, LdInstruction, 0xA);
impl ExecutableOpcode for LdInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        state.index = self.address;
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_reg_and_value!(Rnd, RndInstruction, 0xC);
impl ExecutableOpcode for RndInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        let sample: u8 = state.rng.gen();
        state.registers[self.reg as usize] = sample & self.value;
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_operands!(Drw, DrwInstruction, 0xD);
impl ExecutableOpcode for DrwInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        let x = state.registers[self.op1 as usize] as usize;
        let y = state.registers[self.op2 as usize] as usize;

        // Read the whole sprite first so a bad index leaves the display untouched.
        let sprite = (0..self.op3 as u16)
            .map(|row| state.memory.read_byte(util::index_offset(state, row)?))
            .collect::<Result<Vec<u8>, Chip8Error>>()?;

        let mut collision = false;
        for (y_pos, &pixel_byte) in sprite.iter().enumerate() {
            for x_pos in 0..8 {
                if pixel_byte & (0x80 >> x_pos) != 0 {
                    collision |= state.memory.toggle_pixel(x + x_pos, y + y_pos);
                }
            }
        }

        state.registers[CHIP8_FLAG_REGISTER] = collision as u8;
        state.memory.request_redraw();
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_reg_and_value!(Ldu, LduInstruction, 0xF);
impl ExecutableOpcode for LduInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), Chip8Error> {
        let vx = state.registers[self.reg as usize];
        match self.value {
            0x07 => {
                state.registers[self.reg as usize] = state.delay_timer;
            }
            0x0A => {
                debug!("awaiting key press into V{:X}", self.reg);
                state.state = MachineState::AwaitingKey {
                    register: self.reg,
                    key: None,
                };
                // The program counter advances once a key went down.
                return Ok(());
            }
            0x15 => {
                state.delay_timer = vx;
            }
            0x18 => {
                state.sound_timer = vx;
            }
            0x1E => {
                let sum = state.index as u32 + vx as u32;
                state.index = state.index.wrapping_add(vx as u16);
                state.registers[CHIP8_FLAG_REGISTER] = (sum > 0xFFF) as u8;
            }
            0x29 => {
                state.index = CHIP8_CHARSET_OFFSET + (vx & 0xF) as u16 * CHIP8_CHARSET_GLYPH_LEN;
            }
            0x33 => {
                let digits = [vx / 100, (vx / 10) % 10, vx % 10];
                util::check_index_span(state, digits.len() as u16)?;
                for (offset, digit) in digits.iter().enumerate() {
                    let address = util::index_offset(state, offset as u16)?;
                    state.memory.write_byte(address, *digit)?;
                }
            }
            0x55 => {
                util::check_index_span(state, self.reg as u16 + 1)?;
                for reg in 0x0..=self.reg {
                    let address = util::index_offset(state, reg as u16)?;
                    state.memory.write_byte(address, state.registers[reg as usize])?;
                }
                state.index = state.index.wrapping_add(self.reg as u16 + 1);
            }
            0x65 => {
                util::check_index_span(state, self.reg as u16 + 1)?;
                for reg in 0x0..=self.reg {
                    let address = util::index_offset(state, reg as u16)?;
                    state.registers[reg as usize] = state.memory.read_byte(address)?;
                }
                state.index = state.index.wrapping_add(self.reg as u16 + 1);
            }
            _ => return Err(state.decode_error()),
        }
        util::increment_program_counter(state);
        Ok(())
    }
}
