/// CHIP-8 constants.
mod constants;
/// Cursive display output.
pub mod cursive_display;
/// Main memory and framebuffer.
mod memory;
/// Decoding of opcodes and their execution.
mod opcodes;
/// Convenience functions for modification of the CHIP-8 state.
mod util;


use log::{debug, error, trace, warn};
use rand::{rngs::StdRng, SeedableRng};

pub use crate::chip::chip8::constants::{
    CHIP8_DISPLAY_HEIGHT, CHIP8_DISPLAY_SIZE, CHIP8_DISPLAY_WIDTH, CHIP8_MAX_PROGRAM_SIZE,
    CHIP8_PROGRAM_OFFSET,
};
pub use crate::chip::chip8::memory::Memory;

use crate::chip::{
    chip8::{
        constants::{CHIP8_KEY_COUNT, CHIP8_REGISTER_COUNT, CHIP8_STACK_SIZE},
        opcodes::Opcode,
    },
    Chip, Chip8Error,
};

/// The execution state of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    /// Every step fetches and executes the next instruction.
    Running,

    /// A key wait instruction is pending. Steps only tick the timers until a
    /// key goes down, which is then stored in `register`.
    AwaitingKey { register: u8, key: Option<u8> },

    /// A step failed. The machine does not execute anything anymore.
    Halted,
}

/// Represents the state of the CHIP-8.
pub struct Chip8 {
    /// 4096 bytes of main memory plus the framebuffer
    memory: Memory,

    /// 16 registers where each can store one byte
    registers: [u8; CHIP8_REGISTER_COUNT],

    /// An index register
    index: u16,

    /// A program counter
    program_counter: u16,

    /// The delay timer. Decremented once per step while nonzero.
    delay_timer: u8,

    /// The sound timer. Decremented once per step while nonzero.
    sound_timer: u8,

    /// The input pins. Note that those input pins are usually directly wired
    /// up to the keys. However, we do not prescribe how this is handled and
    /// hence refer to them as input pins rather than as keys.
    input_pins: [bool; CHIP8_KEY_COUNT],

    /// A stack. Note that there are no instructions allowing to modify the
    /// stack and it is only used to store return addresses for the return
    /// opcode.
    stack: [u16; CHIP8_STACK_SIZE],

    /// The number of stack entries in use.
    stack_pointer: u8,

    /// The instruction word currently being executed.
    opcode: u16,

    state: MachineState,

    /// The random source for the random opcode.
    rng: StdRng,
}

impl Chip for Chip8 {
    /// The CHIP-8's pins can actually be addressed by using just half a byte.
    /// However, we use a whole byte here and check whether it is in the right
    /// range, because it is more convenient to handle.
    type PinAddress = u8;

    type Error = Chip8Error;

    fn load_program(&mut self, program: &[u8]) -> Result<usize, Chip8Error> {
        if program.len() > CHIP8_MAX_PROGRAM_SIZE {
            return Err(Chip8Error::Load {
                size: program.len(),
                max: CHIP8_MAX_PROGRAM_SIZE,
            });
        }
        self.memory.load(CHIP8_PROGRAM_OFFSET, program)?;
        debug!(
            "loaded {} bytes at {:#05X}",
            program.len(),
            CHIP8_PROGRAM_OFFSET
        );
        Ok(program.len())
    }

    fn step(&mut self) -> Result<(), Chip8Error> {
        if self.state == MachineState::Halted {
            return Err(Chip8Error::Halted);
        }

        self.tick_timers();

        let result = match self.state {
            MachineState::AwaitingKey {
                register,
                key: Some(key),
            } => {
                debug!("key {:X} pressed, resuming into V{:X}", key, register);
                self.registers[register as usize] = key;
                self.state = MachineState::Running;
                util::increment_program_counter(self);
                Ok(())
            }
            MachineState::AwaitingKey { key: None, .. } => Ok(()),
            _ => self.execute_next_instruction(),
        };

        if let Err(e) = &result {
            error!("halting at {:#05X}: {}", self.program_counter, e);
            self.state = MachineState::Halted;
        }
        result
    }

    fn take_frame(&mut self) -> Option<&[bool]> {
        self.memory.take_frame()
    }

    fn set_key(&mut self, pin: u8, pressed: bool) {
        if pin as usize >= CHIP8_KEY_COUNT {
            warn!("ignoring state change of unknown key {:#04X}", pin);
            return;
        }

        let went_down = pressed && !self.input_pins[pin as usize];
        self.input_pins[pin as usize] = pressed;

        if let MachineState::AwaitingKey {
            register,
            key: None,
        } = self.state
        {
            if went_down {
                self.state = MachineState::AwaitingKey {
                    register,
                    key: Some(pin),
                };
            }
        }
    }

    fn reset_keys(&mut self) {
        self.input_pins = [false; CHIP8_KEY_COUNT];
    }

    fn sound_timer(&self) -> u8 {
        self.sound_timer
    }
}

impl Chip8 {
    /// Constructs a new CHIP-8 and appropriately initializes all fields so that
    /// it is ready for the first execution cycle. Essentially this means that
    /// the program counter is set to 0x200 and the default CHIP-8 charset is
    /// loaded at memory address `CHIP8_CHARSET_OFFSET`. Note that no program is
    /// loaded upon initialization.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Like `new`, but with a deterministic random source.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Chip8 {
            memory: Memory::new(),
            registers: [0; CHIP8_REGISTER_COUNT],
            index: 0,
            program_counter: CHIP8_PROGRAM_OFFSET,
            delay_timer: 0,
            sound_timer: 0,
            input_pins: [false; CHIP8_KEY_COUNT],
            stack: [0; CHIP8_STACK_SIZE],
            stack_pointer: 0,
            opcode: 0,
            state: MachineState::Running,
            rng,
        }
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn stack_pointer(&self) -> u8 {
        self.stack_pointer
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    pub fn is_awaiting_key(&self) -> bool {
        matches!(self.state, MachineState::AwaitingKey { .. })
    }

    pub fn is_halted(&self) -> bool {
        self.state == MachineState::Halted
    }

    /// The current framebuffer, regardless of whether it changed.
    pub fn frame(&self) -> &[bool] {
        self.memory.frame()
    }

    fn tick_timers(&mut self) {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }

        if self.sound_timer > 0 {
            self.sound_timer -= 1;
        }
    }

    fn execute_next_instruction(&mut self) -> Result<(), Chip8Error> {
        let opcode = self.next_instruction()?;
        trace!("{:#05X}: {:04X}", self.program_counter, self.opcode);
        opcode.execute(self)
    }

    /// Fetches the next instruction based on the current state of self.program_counter.
    fn next_instruction(&mut self) -> Result<Opcode, Chip8Error> {
        self.opcode = self.memory.read_word(self.program_counter)?;
        Ok(Opcode::new(&self.opcode.to_be_bytes()))
    }

    /// The error reported for the instruction currently being executed if it
    /// does not decode to a known instruction.
    fn decode_error(&self) -> Chip8Error {
        Chip8Error::Decode {
            opcode: self.opcode,
            address: self.program_counter,
        }
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Chip8::new()
    }
}
