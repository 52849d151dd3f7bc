/// Emits the `TryFrom<Opcode>` implementation shared by all instruction
/// shapes. The conversion fails if the instruction class of the opcode does
/// not match `$instruction_class`; otherwise the payload is handed to
/// `$build` to fill in the operand fields.
macro_rules! implement_try_from_opcode {
    ($name:ty, $instruction_class:expr, |$payload:ident| $build:expr) => {
        impl TryFrom<Opcode> for $name {
            type Error = InstructionParsingError;

            fn try_from(opcode: Opcode) -> Result<Self, Self::Error> {
                if opcode.instruction_class != $instruction_class {
                    return Err(InstructionParsingError::InvalidInstructionClass(
                        opcode.instruction_class,
                        $instruction_class,
                    ));
                }
                let $payload = opcode.payload;
                Ok($build)
            }
        }
    };
}

/// Defines a struct `$instruction` and a type alias `$name` for
/// `InstructionWithAddress<$instruction>` that decodes from opcodes of
/// class `$instruction_class`.
macro_rules! define_instruction_with_address {
    ($instruction:ident, $name:ident, $instruction_class:expr) => {
        pub(super) struct $instruction;
        pub(super) type $name = InstructionWithAddress<$instruction>;
        implement_try_from_opcode!($name, $instruction_class, |payload| Self {
            instruction: PhantomData,
            address: payload.address(),
        });
    };
}

/// Defines a struct `$instruction` and a type alias `$name` for
/// `InstructionWithRegAndValue<$instruction>` that decodes from opcodes of
/// class `$instruction_class`.
macro_rules! define_instruction_with_reg_and_value {
    ($instruction:ident, $name:ident, $instruction_class:expr) => {
        pub(super) struct $instruction;
        pub(super) type $name = InstructionWithRegAndValue<$instruction>;
        implement_try_from_opcode!($name, $instruction_class, |payload| {
            let (reg, value) = payload.reg_and_value();
            Self {
                instruction: PhantomData,
                reg,
                value,
            }
        });
    };
}

/// Defines a struct `$instruction` and a type alias `$name` for
/// `InstructionWithOperands<$instruction>` that decodes from opcodes of
/// class `$instruction_class`.
macro_rules! define_instruction_with_operands {
    ($instruction:ident, $name:ident, $instruction_class:expr) => {
        pub(super) struct $instruction;
        pub(super) type $name = InstructionWithOperands<$instruction>;
        implement_try_from_opcode!($name, $instruction_class, |payload| {
            let (op1, op2, op3) = payload.operands();
            Self {
                instruction: PhantomData,
                op1,
                op2,
                op3,
            }
        });
    };
}
