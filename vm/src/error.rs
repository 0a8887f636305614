use crate::memory::PROGRAM_CAPACITY;
use crate::STACK_DEPTH;

/// Faults raised by the interpreter
///
/// None of them is recoverable by the core itself, a failing `step` leaves the
/// machine exactly as it was before the offending instruction.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// `SYS` or a bit pattern that is not part of the instruction set
    #[error("illegal instruction {opcode:#06X}")]
    IllegalInstruction { opcode: u16 },
    /// `CALL` with every stack slot taken
    #[error("stack overflow, call depth is limited to {depth}", depth = STACK_DEPTH)]
    StackOverflow,
    /// `RET` outside of any subroutine
    #[error("stack underflow, return without a matching call")]
    StackUnderflow,
    /// Jump or call below the program region or past the address space
    #[error("invalid jump target {target:#06X}")]
    InvalidJumpTarget { target: u16 },
    /// Write through `I` outside of the program region
    #[error("address {addr:#06X} is outside of writable memory")]
    AddressOutOfRange { addr: u16 },
    /// Access that runs past the end of the 12-bit address space
    #[error("address {addr:#06X} overflows the address space")]
    AddressOverflow { addr: u16 },
    /// Register used as a key or glyph index holds more than a nibble
    #[error("register V{reg:X} holds {value:#04X}, expected a hex digit")]
    InvalidRegisterValue { reg: u8, value: u8 },
    /// Program does not fit between 0x200 and the end of memory
    #[error("program of {len} bytes exceeds {capacity} bytes of program memory", capacity = PROGRAM_CAPACITY)]
    ProgramTooLarge { len: usize },
}
