//! Opcode decode tables.
//!
//! Two 256-entry tables map a fetched byte to an [`Op`] and its cost in
//! machine cycles: one for the base instruction set and one for the
//! instructions that follow the 0xCB prefix byte. Both are built once per
//! process and never change.
//!
//! Cycle costs are those of the register form. Every access to the (HL)
//! memory operand adds one machine cycle on top, charged by the operand
//! read/write path, so e.g. `INC (HL)` costs 1 + 2 and `BIT 0,(HL)` costs
//! 2 + 1.

use lazy_static::lazy_static;

use super::regs::{Operand, Reg16};

/// 8-bit arithmetic/logic operations on A, in opcode-field order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

/// Rotate/shift family of the prefixed table, in opcode-field order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

/// Branch condition encoded in bits 4..3 of conditional opcodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cond {
    NotZero,
    Zero,
    NotCarry,
    Carry,
}

impl Cond {
    pub const fn from_field(field: u8) -> Cond {
        match field & 0x03 {
            0 => Cond::NotZero,
            1 => Cond::Zero,
            2 => Cond::NotCarry,
            _ => Cond::Carry,
        }
    }
}

/// Memory operand of `LD (rr),A` / `LD A,(rr)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indirect {
    Bc,
    De,
    /// (HL), then HL += 1.
    HlInc,
    /// (HL), then HL -= 1.
    HlDec,
}

/// Decoded operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Nop,
    Stop,
    Halt,
    Di,
    Ei,
    /// 0xCB: the next byte selects from the prefixed table.
    Prefix,

    /// LD r,r' (either side may be (HL), never both).
    Ld { dst: Operand, src: Operand },
    /// LD r,d8
    LdImm8(Operand),
    /// LD rr,d16
    LdImm16(Reg16),
    /// LD (rr),A
    StoreA(Indirect),
    /// LD A,(rr)
    LoadA(Indirect),
    /// LD (a16),SP
    StoreSp,
    /// LDH (a8),A
    StoreHighImm,
    /// LDH A,(a8)
    LoadHighImm,
    /// LDH (C),A
    StoreHighC,
    /// LDH A,(C)
    LoadHighC,
    /// LD (a16),A
    StoreAbs,
    /// LD A,(a16)
    LoadAbs,
    /// LD HL,SP+i8
    LdHlSpOffset,
    /// LD SP,HL
    LdSpHl,

    Alu(AluOp, Operand),
    AluImm(AluOp),
    Inc8(Operand),
    Dec8(Operand),
    Inc16(Reg16),
    Dec16(Reg16),
    AddHl(Reg16),
    /// ADD SP,i8
    AddSpOffset,
    Rlca,
    Rrca,
    Rla,
    Rra,
    Daa,
    Cpl,
    Scf,
    Ccf,

    Jr(Option<Cond>),
    Jp(Option<Cond>),
    JpHl,
    Call(Option<Cond>),
    Ret(Option<Cond>),
    Reti,
    /// RST with its target vector.
    Rst(u16),
    Push(Reg16),
    Pop(Reg16),

    Shift(ShiftOp, Operand),
    Bit(u8, Operand),
    Res(u8, Operand),
    Set(u8, Operand),
}

/// One table slot: the operation plus its cost in machine cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpcodeEntry {
    pub op: Op,
    /// Cost when no branch is taken (or the only cost for unconditional
    /// instructions).
    pub cycles: u8,
    /// Cost of a conditional instruction whose condition holds.
    pub taken_cycles: Option<u8>,
}

impl OpcodeEntry {
    const fn fixed(op: Op, cycles: u8) -> Self {
        Self {
            op,
            cycles,
            taken_cycles: None,
        }
    }

    const fn branch(op: Op, cycles: u8, taken: u8) -> Self {
        Self {
            op,
            cycles,
            taken_cycles: Some(taken),
        }
    }

    /// Extra machine cycles paid on top of `cycles` when the branch is taken.
    #[inline]
    pub fn taken_surcharge(&self) -> u32 {
        self.taken_cycles
            .map_or(0, |taken| taken.saturating_sub(self.cycles) as u32)
    }
}

const ALU_OPS: [AluOp; 8] = [
    AluOp::Add,
    AluOp::Adc,
    AluOp::Sub,
    AluOp::Sbc,
    AluOp::And,
    AluOp::Xor,
    AluOp::Or,
    AluOp::Cp,
];

const SHIFT_OPS: [ShiftOp; 8] = [
    ShiftOp::Rlc,
    ShiftOp::Rrc,
    ShiftOp::Rl,
    ShiftOp::Rr,
    ShiftOp::Sla,
    ShiftOp::Sra,
    ShiftOp::Swap,
    ShiftOp::Srl,
];

/// `rp` field: 16-bit operands of loads and 16-bit arithmetic.
const RP: [Reg16; 4] = [Reg16::BC, Reg16::DE, Reg16::HL, Reg16::SP];
/// `rp2` field: 16-bit operands of PUSH/POP.
const RP2: [Reg16; 4] = [Reg16::BC, Reg16::DE, Reg16::HL, Reg16::AF];

lazy_static! {
    static ref BASE_TABLE: [Option<OpcodeEntry>; 256] =
        std::array::from_fn(|opcode| decode_base(opcode as u8));
    static ref PREFIXED_TABLE: [OpcodeEntry; 256] =
        std::array::from_fn(|opcode| decode_prefixed(opcode as u8));
}

/// Look up an unprefixed opcode. `None` marks the opcode holes that have no
/// defined behaviour.
#[inline]
pub fn base(opcode: u8) -> Option<&'static OpcodeEntry> {
    BASE_TABLE[opcode as usize].as_ref()
}

/// Look up the byte following a 0xCB prefix. Every value is defined.
#[inline]
pub fn prefixed(opcode: u8) -> &'static OpcodeEntry {
    &PREFIXED_TABLE[opcode as usize]
}

fn decode_base(opcode: u8) -> Option<OpcodeEntry> {
    use OpcodeEntry as E;

    let y = (opcode >> 3) & 0x07;
    let z = opcode & 0x07;
    let rp = RP[((opcode >> 4) & 0x03) as usize];
    let rp2 = RP2[((opcode >> 4) & 0x03) as usize];
    let cond = Cond::from_field(y);

    let entry = match opcode {
        0x00 => E::fixed(Op::Nop, 1),
        0x10 => E::fixed(Op::Stop, 1),
        0x76 => E::fixed(Op::Halt, 1),
        0xF3 => E::fixed(Op::Di, 1),
        0xFB => E::fixed(Op::Ei, 1),
        0xCB => E::fixed(Op::Prefix, 0),

        // 8-bit loads.
        0x40..=0x7F => E::fixed(
            Op::Ld {
                dst: Operand::from_index(y),
                src: Operand::from_index(z),
            },
            1,
        ),
        0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
            E::fixed(Op::LdImm8(Operand::from_index(y)), 2)
        }
        0x02 | 0x12 | 0x22 | 0x32 => E::fixed(Op::StoreA(indirect(opcode)), 2),
        0x0A | 0x1A | 0x2A | 0x3A => E::fixed(Op::LoadA(indirect(opcode)), 2),
        0xE0 => E::fixed(Op::StoreHighImm, 3),
        0xF0 => E::fixed(Op::LoadHighImm, 3),
        0xE2 => E::fixed(Op::StoreHighC, 2),
        0xF2 => E::fixed(Op::LoadHighC, 2),
        0xEA => E::fixed(Op::StoreAbs, 4),
        0xFA => E::fixed(Op::LoadAbs, 4),

        // 16-bit loads.
        0x01 | 0x11 | 0x21 | 0x31 => E::fixed(Op::LdImm16(rp), 3),
        0x08 => E::fixed(Op::StoreSp, 5),
        0xF8 => E::fixed(Op::LdHlSpOffset, 3),
        0xF9 => E::fixed(Op::LdSpHl, 2),
        0xC5 | 0xD5 | 0xE5 | 0xF5 => E::fixed(Op::Push(rp2), 4),
        0xC1 | 0xD1 | 0xE1 | 0xF1 => E::fixed(Op::Pop(rp2), 3),

        // 8-bit arithmetic and logic.
        0x80..=0xBF => E::fixed(Op::Alu(ALU_OPS[y as usize], Operand::from_index(z)), 1),
        0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
            E::fixed(Op::AluImm(ALU_OPS[y as usize]), 2)
        }
        0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => {
            E::fixed(Op::Inc8(Operand::from_index(y)), 1)
        }
        0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => {
            E::fixed(Op::Dec8(Operand::from_index(y)), 1)
        }
        0x27 => E::fixed(Op::Daa, 1),
        0x2F => E::fixed(Op::Cpl, 1),
        0x37 => E::fixed(Op::Scf, 1),
        0x3F => E::fixed(Op::Ccf, 1),

        // 16-bit arithmetic.
        0x03 | 0x13 | 0x23 | 0x33 => E::fixed(Op::Inc16(rp), 2),
        0x0B | 0x1B | 0x2B | 0x3B => E::fixed(Op::Dec16(rp), 2),
        0x09 | 0x19 | 0x29 | 0x39 => E::fixed(Op::AddHl(rp), 2),
        0xE8 => E::fixed(Op::AddSpOffset, 4),

        // Accumulator rotates.
        0x07 => E::fixed(Op::Rlca, 1),
        0x0F => E::fixed(Op::Rrca, 1),
        0x17 => E::fixed(Op::Rla, 1),
        0x1F => E::fixed(Op::Rra, 1),

        // Control flow.
        0x18 => E::fixed(Op::Jr(None), 3),
        0x20 | 0x28 | 0x30 | 0x38 => E::branch(Op::Jr(Some(cond)), 2, 3),
        0xC3 => E::fixed(Op::Jp(None), 4),
        0xC2 | 0xCA | 0xD2 | 0xDA => E::branch(Op::Jp(Some(cond)), 3, 4),
        0xE9 => E::fixed(Op::JpHl, 1),
        0xCD => E::fixed(Op::Call(None), 6),
        0xC4 | 0xCC | 0xD4 | 0xDC => E::branch(Op::Call(Some(cond)), 3, 6),
        0xC9 => E::fixed(Op::Ret(None), 4),
        0xC0 | 0xC8 | 0xD0 | 0xD8 => E::branch(Op::Ret(Some(cond)), 2, 5),
        0xD9 => E::fixed(Op::Reti, 4),
        0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
            E::fixed(Op::Rst((opcode & 0x38) as u16), 4)
        }

        // D3, DB, DD, E3, E4, EB, EC, ED, F4, FC, FD.
        _ => return None,
    };

    Some(entry)
}

fn decode_prefixed(opcode: u8) -> OpcodeEntry {
    let bit = (opcode >> 3) & 0x07;
    let target = Operand::from_index(opcode & 0x07);

    let op = match opcode >> 6 {
        0 => Op::Shift(SHIFT_OPS[bit as usize], target),
        1 => Op::Bit(bit, target),
        2 => Op::Res(bit, target),
        _ => Op::Set(bit, target),
    };

    OpcodeEntry::fixed(op, 2)
}

fn indirect(opcode: u8) -> Indirect {
    match (opcode >> 4) & 0x03 {
        0 => Indirect::Bc,
        1 => Indirect::De,
        2 => Indirect::HlInc,
        _ => Indirect::HlDec,
    }
}
