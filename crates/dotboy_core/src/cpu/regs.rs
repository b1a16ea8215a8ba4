/// Registers for the LR35902 CPU.
///
/// Every 8-bit register is an explicit field; the 16-bit pairs are composed
/// and split arithmetically so nothing depends on host byte order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

/// 8-bit register names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reg8 {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
}

/// 16-bit register names: the four pairs plus SP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reg16 {
    AF,
    BC,
    DE,
    HL,
    SP,
}

/// Flag bits in the F register.
///
/// Layout (bit index in the byte, from MSB to LSB):
/// - bit 7: Z (zero)
/// - bit 6: N (subtract)
/// - bit 5: H (half carry)
/// - bit 4: C (carry)
/// - bits 0–3 are always zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flag {
    Z = 7,
    N = 6,
    H = 5,
    C = 4,
}

/// Operand-register field translation.
///
/// Opcodes encode 8-bit operands in the order B,C,D,E,H,L,(HL),A. Slot 6 is
/// the memory operand at HL and never resolves to a register; callers must
/// handle it before indexing (see [`Operand::from_index`]).
const OPERAND_REGS: [Option<Reg8>; 8] = [
    Some(Reg8::B),
    Some(Reg8::C),
    Some(Reg8::D),
    Some(Reg8::E),
    Some(Reg8::H),
    Some(Reg8::L),
    None,
    Some(Reg8::A),
];

/// Source or destination of an 8-bit operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    Reg(Reg8),
    /// The byte at the address held in HL.
    IndirectHl,
}

impl Operand {
    /// Decode a 3-bit operand field.
    ///
    /// Panics on indices above 7; the opcode tables only ever pass masked
    /// fields, so hitting that is a bug in table construction.
    pub const fn from_index(index: u8) -> Operand {
        if index == 6 {
            return Operand::IndirectHl;
        }
        match OPERAND_REGS[index as usize] {
            Some(reg) => Operand::Reg(reg),
            None => unreachable!(),
        }
    }

    #[inline]
    pub fn is_indirect(self) -> bool {
        matches!(self, Operand::IndirectHl)
    }
}

impl Registers {
    pub fn get8(&self, reg: Reg8) -> u8 {
        match reg {
            Reg8::A => self.a,
            Reg8::F => self.f,
            Reg8::B => self.b,
            Reg8::C => self.c,
            Reg8::D => self.d,
            Reg8::E => self.e,
            Reg8::H => self.h,
            Reg8::L => self.l,
        }
    }

    pub fn set8(&mut self, reg: Reg8, value: u8) {
        match reg {
            Reg8::A => self.a = value,
            // Lower 4 bits of F are always zero.
            Reg8::F => self.f = value & 0xF0,
            Reg8::B => self.b = value,
            Reg8::C => self.c = value,
            Reg8::D => self.d = value,
            Reg8::E => self.e = value,
            Reg8::H => self.h = value,
            Reg8::L => self.l = value,
        }
    }

    pub fn get16(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::AF => self.af(),
            Reg16::BC => self.bc(),
            Reg16::DE => self.de(),
            Reg16::HL => self.hl(),
            Reg16::SP => self.sp,
        }
    }

    pub fn set16(&mut self, reg: Reg16, value: u16) {
        match reg {
            Reg16::AF => self.set_af(value),
            Reg16::BC => self.set_bc(value),
            Reg16::DE => self.set_de(value),
            Reg16::HL => self.set_hl(value),
            Reg16::SP => self.sp = value,
        }
    }

    #[inline]
    pub fn af(&self) -> u16 {
        pair(self.a, self.f & 0xF0)
    }

    #[inline]
    pub fn set_af(&mut self, value: u16) {
        let (a, f) = split(value);
        self.a = a;
        self.f = f & 0xF0;
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        pair(self.b, self.c)
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        (self.b, self.c) = split(value);
    }

    #[inline]
    pub fn de(&self) -> u16 {
        pair(self.d, self.e)
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        (self.d, self.e) = split(value);
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        pair(self.h, self.l)
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        (self.h, self.l) = split(value);
    }

    #[inline]
    pub fn flag(&self, flag: Flag) -> bool {
        (self.f & (1 << flag as u8)) != 0
    }

    #[inline]
    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        let bit = 1 << flag as u8;
        if value {
            self.f |= bit;
        } else {
            self.f &= !bit;
        }
    }
}

#[inline]
fn pair(hi: u8, lo: u8) -> u16 {
    ((hi as u16) << 8) | lo as u16
}

#[inline]
fn split(value: u16) -> (u8, u8) {
    ((value >> 8) as u8, value as u8)
}
