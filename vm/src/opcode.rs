use core::convert::TryFrom;
use core::fmt;

use crate::error::Error;

/// Bit fields of a raw instruction word
///
/// Every word splits into fields, whether they form a valid instruction is
/// decided by `OpCode::try_from`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Fields {
    pub kind: u8,
    pub x: u8,
    pub y: u8,
    pub n: u8,
    pub nn: u8,
    pub nnn: u16,
}

/// Split `raw` into its nibble, byte and address fields
pub fn decode(raw: u16) -> Fields {
    Fields {
        kind: (raw >> 12 & 0x000F) as u8,
        x: (raw >> 8 & 0x000F) as u8,
        y: (raw >> 4 & 0x000F) as u8,
        n: (raw & 0x000F) as u8,
        nn: (raw & 0x00FF) as u8,
        nnn: raw & 0x0FFF,
    }
}

/// The 35 instructions of the CHIP-8 architecture
///
/// Examples:
/// ```
/// use core::convert::TryFrom;
/// use chip8_vm::opcode::OpCode;
///
/// assert_eq!(OpCode::try_from(0x6A12u16), Ok(OpCode::LdByte { x: 0xA, nn: 0x12 }));
/// assert!(OpCode::try_from(0x8AB8u16).is_err());
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OpCode {
    /// `0NNN` machine language routine, not supported
    Sys { nnn: u16 },
    /// `00E0` clear the screen
    Cls,
    /// `00EE` return from a subroutine
    Ret,
    /// `1NNN` jump to NNN
    Jp { nnn: u16 },
    /// `2NNN` call subroutine at NNN
    Call { nnn: u16 },
    /// `3XNN` skip next instruction if VX == NN
    SeByte { x: u8, nn: u8 },
    /// `4XNN` skip next instruction if VX != NN
    SneByte { x: u8, nn: u8 },
    /// `5XY0` skip next instruction if VX == VY
    SeReg { x: u8, y: u8 },
    /// `6XNN` VX = NN
    LdByte { x: u8, nn: u8 },
    /// `7XNN` VX += NN, no carry
    AddByte { x: u8, nn: u8 },
    /// `8XY0` VX = VY
    LdReg { x: u8, y: u8 },
    /// `8XY1` VX |= VY
    Or { x: u8, y: u8 },
    /// `8XY2` VX &= VY
    And { x: u8, y: u8 },
    /// `8XY3` VX ^= VY
    Xor { x: u8, y: u8 },
    /// `8XY4` VX += VY, VF = carry
    AddReg { x: u8, y: u8 },
    /// `8XY5` VX -= VY, VF = VX > VY
    Sub { x: u8, y: u8 },
    /// `8XY6` VX >>= 1, VF = shifted out bit
    Shr { x: u8, y: u8 },
    /// `8XY7` VX = VY - VX, VF = VY > VX
    Subn { x: u8, y: u8 },
    /// `8XYE` VX <<= 1, VF = shifted out bit
    Shl { x: u8, y: u8 },
    /// `9XY0` skip next instruction if VX != VY
    SneReg { x: u8, y: u8 },
    /// `ANNN` I = NNN
    LdI { nnn: u16 },
    /// `BNNN` jump to V0 + NNN
    JpV0 { nnn: u16 },
    /// `CXNN` VX = random & NN
    Rnd { x: u8, nn: u8 },
    /// `DXYN` draw N rows of sprite at I on (VX, VY), VF = collision
    Drw { x: u8, y: u8, n: u8 },
    /// `EX9E` skip next instruction if key VX is pressed
    Skp { x: u8 },
    /// `EXA1` skip next instruction if key VX is not pressed
    Sknp { x: u8 },
    /// `FX07` VX = delay timer
    LdVxDt { x: u8 },
    /// `FX0A` wait for a key press, store it in VX
    LdVxK { x: u8 },
    /// `FX15` delay timer = VX
    LdDtVx { x: u8 },
    /// `FX18` sound timer = VX
    LdStVx { x: u8 },
    /// `FX1E` I += VX
    AddIVx { x: u8 },
    /// `FX29` I = address of glyph for digit VX
    LdF { x: u8 },
    /// `FX33` store BCD of VX at I, I+1, I+2
    LdB { x: u8 },
    /// `FX55` store V0..=VX at I
    LdMemVx { x: u8 },
    /// `FX65` fill V0..=VX from I
    LdVxMem { x: u8 },
}

impl OpCode {
    /// Whether the instruction sets the program counter on its own
    pub fn is_branch(&self) -> bool {
        matches!(
            self,
            OpCode::Ret | OpCode::Jp { .. } | OpCode::Call { .. } | OpCode::JpV0 { .. }
        )
    }
}

impl TryFrom<u16> for OpCode {
    type Error = Error;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        let Fields { kind, x, y, n, nn, nnn } = decode(raw);
        let illegal = Err(Error::IllegalInstruction { opcode: raw });

        let opcode = match kind {
            0x0 => match nnn {
                0x0E0 => OpCode::Cls,
                0x0EE => OpCode::Ret,
                nnn => OpCode::Sys { nnn },
            },
            0x1 => OpCode::Jp { nnn },
            0x2 => OpCode::Call { nnn },
            0x3 => OpCode::SeByte { x, nn },
            0x4 => OpCode::SneByte { x, nn },
            0x5 if n == 0 => OpCode::SeReg { x, y },
            0x6 => OpCode::LdByte { x, nn },
            0x7 => OpCode::AddByte { x, nn },
            0x8 => match n {
                0x0 => OpCode::LdReg { x, y },
                0x1 => OpCode::Or { x, y },
                0x2 => OpCode::And { x, y },
                0x3 => OpCode::Xor { x, y },
                0x4 => OpCode::AddReg { x, y },
                0x5 => OpCode::Sub { x, y },
                0x6 => OpCode::Shr { x, y },
                0x7 => OpCode::Subn { x, y },
                0xE => OpCode::Shl { x, y },
                _ => return illegal,
            },
            0x9 if n == 0 => OpCode::SneReg { x, y },
            0xA => OpCode::LdI { nnn },
            0xB => OpCode::JpV0 { nnn },
            0xC => OpCode::Rnd { x, nn },
            0xD => OpCode::Drw { x, y, n },
            0xE => match nn {
                0x9E => OpCode::Skp { x },
                0xA1 => OpCode::Sknp { x },
                _ => return illegal,
            },
            0xF => match nn {
                0x07 => OpCode::LdVxDt { x },
                0x0A => OpCode::LdVxK { x },
                0x15 => OpCode::LdDtVx { x },
                0x18 => OpCode::LdStVx { x },
                0x1E => OpCode::AddIVx { x },
                0x29 => OpCode::LdF { x },
                0x33 => OpCode::LdB { x },
                0x55 => OpCode::LdMemVx { x },
                0x65 => OpCode::LdVxMem { x },
                _ => return illegal,
            },
            _ => return illegal,
        };
        Ok(opcode)
    }
}

impl fmt::Display for OpCode {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            OpCode::Sys { nnn }      => write!(f, "SYS {:#05X}", nnn),
            OpCode::Cls              => write!(f, "CLS"),
            OpCode::Ret              => write!(f, "RET"),
            OpCode::Jp { nnn }       => write!(f, "JP {:#05X}", nnn),
            OpCode::Call { nnn }     => write!(f, "CALL {:#05X}", nnn),
            OpCode::SeByte { x, nn } => write!(f, "SE V{:X}, {:#04X}", x, nn),
            OpCode::SneByte { x, nn }=> write!(f, "SNE V{:X}, {:#04X}", x, nn),
            OpCode::SeReg { x, y }   => write!(f, "SE V{:X}, V{:X}", x, y),
            OpCode::LdByte { x, nn } => write!(f, "LD V{:X}, {:#04X}", x, nn),
            OpCode::AddByte { x, nn }=> write!(f, "ADD V{:X}, {:#04X}", x, nn),
            OpCode::LdReg { x, y }   => write!(f, "LD V{:X}, V{:X}", x, y),
            OpCode::Or { x, y }      => write!(f, "OR V{:X}, V{:X}", x, y),
            OpCode::And { x, y }     => write!(f, "AND V{:X}, V{:X}", x, y),
            OpCode::Xor { x, y }     => write!(f, "XOR V{:X}, V{:X}", x, y),
            OpCode::AddReg { x, y }  => write!(f, "ADD V{:X}, V{:X}", x, y),
            OpCode::Sub { x, y }     => write!(f, "SUB V{:X}, V{:X}", x, y),
            OpCode::Shr { x, y }     => write!(f, "SHR V{:X}, V{:X}", x, y),
            OpCode::Subn { x, y }    => write!(f, "SUBN V{:X}, V{:X}", x, y),
            OpCode::Shl { x, y }     => write!(f, "SHL V{:X}, V{:X}", x, y),
            OpCode::SneReg { x, y }  => write!(f, "SNE V{:X}, V{:X}", x, y),
            OpCode::LdI { nnn }      => write!(f, "LD I, {:#05X}", nnn),
            OpCode::JpV0 { nnn }     => write!(f, "JP V0, {:#05X}", nnn),
            OpCode::Rnd { x, nn }    => write!(f, "RND V{:X}, {:#04X}", x, nn),
            OpCode::Drw { x, y, n }  => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            OpCode::Skp { x }        => write!(f, "SKP V{:X}", x),
            OpCode::Sknp { x }       => write!(f, "SKNP V{:X}", x),
            OpCode::LdVxDt { x }     => write!(f, "LD V{:X}, DT", x),
            OpCode::LdVxK { x }      => write!(f, "LD V{:X}, K", x),
            OpCode::LdDtVx { x }     => write!(f, "LD DT, V{:X}", x),
            OpCode::LdStVx { x }     => write!(f, "LD ST, V{:X}", x),
            OpCode::AddIVx { x }     => write!(f, "ADD I, V{:X}", x),
            OpCode::LdF { x }        => write!(f, "LD F, V{:X}", x),
            OpCode::LdB { x }        => write!(f, "LD B, V{:X}", x),
            OpCode::LdMemVx { x }    => write!(f, "LD [I], V{:X}", x),
            OpCode::LdVxMem { x }    => write!(f, "LD V{:X}, [I]", x),
        }
    }
}
