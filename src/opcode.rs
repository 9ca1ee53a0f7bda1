use std::fmt;

use crate::nibble::u4;

/// A decoded CHIP-8 instruction.
///
/// Variant names follow the usual assembler mnemonics; operand fields use
/// the conventional names `x`, `y` (register numbers), `n` (nibble), `nn`
/// (byte) and `nnn` (12-bit address).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    /// 00E0 - CLS
    ClearScreen,
    /// 00EE - RET
    Return,
    /// 1NNN - JP nnn
    Jump { nnn: u16 },
    /// 2NNN - CALL nnn
    Call { nnn: u16 },
    /// 3XNN - SE Vx, nn
    SkipEqImm { x: u4, nn: u8 },
    /// 4XNN - SNE Vx, nn
    SkipNeImm { x: u4, nn: u8 },
    /// 5XY0 - SE Vx, Vy
    SkipEqReg { x: u4, y: u4 },
    /// 6XNN - LD Vx, nn
    LoadImm { x: u4, nn: u8 },
    /// 7XNN - ADD Vx, nn
    AddImm { x: u4, nn: u8 },
    /// 8XY0..8XYE - register/register ALU group
    Alu { x: u4, y: u4, op: AluOp },
    /// 9XY0 - SNE Vx, Vy
    SkipNeReg { x: u4, y: u4 },
    /// ANNN - LD I, nnn
    LoadIndex { nnn: u16 },
    /// BNNN - JP V0, nnn
    JumpV0 { nnn: u16 },
    /// CXNN - RND Vx, nn
    Random { x: u4, nn: u8 },
    /// DXYN - DRW Vx, Vy, n
    Draw { x: u4, y: u4, n: u4 },
    /// EX9E - SKP Vx
    SkipKeyPressed { x: u4 },
    /// EXA1 - SKNP Vx
    SkipKeyNotPressed { x: u4 },
    /// FX07 - LD Vx, DT
    LoadDelay { x: u4 },
    /// FX0A - LD Vx, K (suspends until a key is pressed)
    WaitKey { x: u4 },
    /// FX15 - LD DT, Vx
    SetDelay { x: u4 },
    /// FX18 - LD ST, Vx
    SetSound { x: u4 },
    /// FX1E - ADD I, Vx
    AddIndex { x: u4 },
    /// FX29 - LD F, Vx
    FontGlyph { x: u4 },
    /// FX33 - LD B, Vx
    StoreBcd { x: u4 },
    /// FX55 - LD [I], Vx
    StoreRegs { x: u4 },
    /// FX65 - LD Vx, [I]
    LoadRegs { x: u4 },
    /// Anything that matched no encoding; carries the raw word.
    Unknown(u16),
}

/// The 8XYn sub-operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    /// 8XY0 - Vx = Vy
    Load,
    /// 8XY1 - Vx |= Vy
    Or,
    /// 8XY2 - Vx &= Vy
    And,
    /// 8XY3 - Vx ^= Vy
    Xor,
    /// 8XY4 - Vx += Vy, VF = carry
    Add,
    /// 8XY5 - Vx -= Vy, VF = no borrow
    Sub,
    /// 8XY6 - Vx >>= 1, VF = shifted-out bit
    Shr,
    /// 8XY7 - Vx = Vy - Vx, VF = no borrow
    SubFrom,
    /// 8XYE - Vx <<= 1, VF = shifted-out bit
    Shl,
}

impl Opcode {
    /// Decodes a raw 16-bit instruction word.
    ///
    /// Matching is hierarchical: the two zero-operand words first, then by
    /// top nibble, with the bottom nibble or byte disambiguating the 5/8/9,
    /// E and F groups.
    pub fn decode(word: u16) -> Self {
        let nibbles = (
            ((word & 0xF000) >> 12) as u8,
            ((word & 0x0F00) >> 8) as u8,
            ((word & 0x00F0) >> 4) as u8,
            (word & 0x000F) as u8,
        );

        let x = u4::new(nibbles.1);
        let y = u4::new(nibbles.2);
        let n = u4::new(nibbles.3);
        let nn = (word & 0x00FF) as u8;
        let nnn = word & 0x0FFF;

        match nibbles {
            (0x0, 0x0, 0xE, 0x0) => Opcode::ClearScreen,
            (0x0, 0x0, 0xE, 0xE) => Opcode::Return,
            (0x1, _, _, _) => Opcode::Jump { nnn },
            (0x2, _, _, _) => Opcode::Call { nnn },
            (0x3, _, _, _) => Opcode::SkipEqImm { x, nn },
            (0x4, _, _, _) => Opcode::SkipNeImm { x, nn },
            (0x5, _, _, 0x0) => Opcode::SkipEqReg { x, y },
            (0x6, _, _, _) => Opcode::LoadImm { x, nn },
            (0x7, _, _, _) => Opcode::AddImm { x, nn },
            (0x8, _, _, low) => {
                let op = match low {
                    0x0 => AluOp::Load,
                    0x1 => AluOp::Or,
                    0x2 => AluOp::And,
                    0x3 => AluOp::Xor,
                    0x4 => AluOp::Add,
                    0x5 => AluOp::Sub,
                    0x6 => AluOp::Shr,
                    0x7 => AluOp::SubFrom,
                    0xE => AluOp::Shl,
                    _ => return Opcode::Unknown(word),
                };
                Opcode::Alu { x, y, op }
            }
            (0x9, _, _, 0x0) => Opcode::SkipNeReg { x, y },
            (0xA, _, _, _) => Opcode::LoadIndex { nnn },
            (0xB, _, _, _) => Opcode::JumpV0 { nnn },
            (0xC, _, _, _) => Opcode::Random { x, nn },
            (0xD, _, _, _) => Opcode::Draw { x, y, n },
            (0xE, _, 0x9, 0xE) => Opcode::SkipKeyPressed { x },
            (0xE, _, 0xA, 0x1) => Opcode::SkipKeyNotPressed { x },
            (0xF, _, 0x0, 0x7) => Opcode::LoadDelay { x },
            (0xF, _, 0x0, 0xA) => Opcode::WaitKey { x },
            (0xF, _, 0x1, 0x5) => Opcode::SetDelay { x },
            (0xF, _, 0x1, 0x8) => Opcode::SetSound { x },
            (0xF, _, 0x1, 0xE) => Opcode::AddIndex { x },
            (0xF, _, 0x2, 0x9) => Opcode::FontGlyph { x },
            (0xF, _, 0x3, 0x3) => Opcode::StoreBcd { x },
            (0xF, _, 0x5, 0x5) => Opcode::StoreRegs { x },
            (0xF, _, 0x6, 0x5) => Opcode::LoadRegs { x },

            _ => Opcode::Unknown(word),
        }
    }
}

/// Disassembly, used by the debugger's `disasm` command.
impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Opcode::ClearScreen => write!(f, "CLS"),
            Opcode::Return => write!(f, "RET"),
            Opcode::Jump { nnn } => write!(f, "JP {nnn:#05X}"),
            Opcode::Call { nnn } => write!(f, "CALL {nnn:#05X}"),
            Opcode::SkipEqImm { x, nn } => write!(f, "SE V{x}, {nn:#04X}"),
            Opcode::SkipNeImm { x, nn } => write!(f, "SNE V{x}, {nn:#04X}"),
            Opcode::SkipEqReg { x, y } => write!(f, "SE V{x}, V{y}"),
            Opcode::LoadImm { x, nn } => write!(f, "LD V{x}, {nn:#04X}"),
            Opcode::AddImm { x, nn } => write!(f, "ADD V{x}, {nn:#04X}"),
            Opcode::Alu { x, y, op } => match op {
                AluOp::Load => write!(f, "LD V{x}, V{y}"),
                AluOp::Or => write!(f, "OR V{x}, V{y}"),
                AluOp::And => write!(f, "AND V{x}, V{y}"),
                AluOp::Xor => write!(f, "XOR V{x}, V{y}"),
                AluOp::Add => write!(f, "ADD V{x}, V{y}"),
                AluOp::Sub => write!(f, "SUB V{x}, V{y}"),
                AluOp::Shr => write!(f, "SHR V{x}"),
                AluOp::SubFrom => write!(f, "SUBN V{x}, V{y}"),
                AluOp::Shl => write!(f, "SHL V{x}"),
            },
            Opcode::SkipNeReg { x, y } => write!(f, "SNE V{x}, V{y}"),
            Opcode::LoadIndex { nnn } => write!(f, "LD I, {nnn:#05X}"),
            Opcode::JumpV0 { nnn } => write!(f, "JP V0, {nnn:#05X}"),
            Opcode::Random { x, nn } => write!(f, "RND V{x}, {nn:#04X}"),
            Opcode::Draw { x, y, n } => write!(f, "DRW V{x}, V{y}, {n}"),
            Opcode::SkipKeyPressed { x } => write!(f, "SKP V{x}"),
            Opcode::SkipKeyNotPressed { x } => write!(f, "SKNP V{x}"),
            Opcode::LoadDelay { x } => write!(f, "LD V{x}, DT"),
            Opcode::WaitKey { x } => write!(f, "LD V{x}, K"),
            Opcode::SetDelay { x } => write!(f, "LD DT, V{x}"),
            Opcode::SetSound { x } => write!(f, "LD ST, V{x}"),
            Opcode::AddIndex { x } => write!(f, "ADD I, V{x}"),
            Opcode::FontGlyph { x } => write!(f, "LD F, V{x}"),
            Opcode::StoreBcd { x } => write!(f, "LD B, V{x}"),
            Opcode::StoreRegs { x } => write!(f, "LD [I], V{x}"),
            Opcode::LoadRegs { x } => write!(f, "LD V{x}, [I]"),
            Opcode::Unknown(word) => write!(f, ".WORD {word:#06X}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_zero_operand_words_exactly() {
        assert_eq!(Opcode::decode(0x00E0), Opcode::ClearScreen);
        assert_eq!(Opcode::decode(0x00EE), Opcode::Return);
        // Other 0NNN words (machine routines) are not implemented
        assert_eq!(Opcode::decode(0x0123), Opcode::Unknown(0x0123));
    }

    #[test]
    fn decodes_operand_fields() {
        assert_eq!(Opcode::decode(0x1ABC), Opcode::Jump { nnn: 0xABC });
        assert_eq!(
            Opcode::decode(0x6A42),
            Opcode::LoadImm {
                x: u4::new(0xA),
                nn: 0x42
            }
        );
        assert_eq!(
            Opcode::decode(0xD125),
            Opcode::Draw {
                x: u4::new(1),
                y: u4::new(2),
                n: u4::new(5)
            }
        );
    }

    #[test]
    fn bottom_nibble_disambiguates_register_groups() {
        assert_eq!(
            Opcode::decode(0x5120),
            Opcode::SkipEqReg {
                x: u4::new(1),
                y: u4::new(2)
            }
        );
        assert_eq!(Opcode::decode(0x5121), Opcode::Unknown(0x5121));
        assert_eq!(
            Opcode::decode(0x8AB7),
            Opcode::Alu {
                x: u4::new(0xA),
                y: u4::new(0xB),
                op: AluOp::SubFrom
            }
        );
        assert_eq!(Opcode::decode(0x8AB8), Opcode::Unknown(0x8AB8));
    }

    #[test]
    fn bottom_byte_disambiguates_key_and_misc_groups() {
        assert_eq!(
            Opcode::decode(0xE19E),
            Opcode::SkipKeyPressed { x: u4::new(1) }
        );
        assert_eq!(
            Opcode::decode(0xE1A1),
            Opcode::SkipKeyNotPressed { x: u4::new(1) }
        );
        assert_eq!(Opcode::decode(0xE1A2), Opcode::Unknown(0xE1A2));
        assert_eq!(Opcode::decode(0xF533), Opcode::StoreBcd { x: u4::new(5) });
        assert_eq!(Opcode::decode(0xF534), Opcode::Unknown(0xF534));
    }

    #[test]
    fn disassembles_common_instructions() {
        assert_eq!(Opcode::decode(0x00E0).to_string(), "CLS");
        assert_eq!(Opcode::decode(0x1200).to_string(), "JP 0x200");
        assert_eq!(Opcode::decode(0x8124).to_string(), "ADD V1, V2");
        assert_eq!(Opcode::decode(0xD015).to_string(), "DRW V0, V1, 5");
    }
}
