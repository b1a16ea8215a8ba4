use super::opcodes::AluOp;
use super::{Cpu, Flag};

impl Cpu {
    /// Apply one of the eight accumulator operations of the 0x80–0xBF block
    /// (and their immediate forms).
    pub(super) fn alu(&mut self, op: AluOp, value: u8) {
        match op {
            AluOp::Add => self.alu_add(value, false),
            AluOp::Adc => self.alu_add(value, true),
            AluOp::Sub => self.alu_sub(value, false),
            AluOp::Sbc => self.alu_sub(value, true),
            AluOp::And => self.alu_and(value),
            AluOp::Xor => self.alu_xor(value),
            AluOp::Or => self.alu_or(value),
            AluOp::Cp => self.alu_cp(value),
        }
    }

    /// Core 8-bit ADD/ADC operation on A.
    ///
    /// `use_carry` selects between ADD (false) and ADC (true).
    pub(super) fn alu_add(&mut self, value: u8, use_carry: bool) {
        let a = self.regs.a;
        let carry_in = (use_carry && self.get_flag(Flag::C)) as u8;

        let half = (a & 0x0F) + (value & 0x0F) + carry_in;
        let full = a as u16 + value as u16 + carry_in as u16;
        let result = full as u8;

        self.regs.a = result;

        self.clear_flags();
        self.set_flag(Flag::Z, result == 0);
        self.set_flag(Flag::H, half > 0x0F);
        self.set_flag(Flag::C, full > 0xFF);
    }

    /// Core 8-bit SUB/SBC operation on A.
    ///
    /// `use_carry` selects between SUB (false) and SBC (true).
    pub(super) fn alu_sub(&mut self, value: u8, use_carry: bool) {
        let carry_in = (use_carry && self.get_flag(Flag::C)) as u8;
        self.regs.a = self.compare(value, carry_in);
    }

    #[inline]
    pub(super) fn alu_and(&mut self, value: u8) {
        let result = self.regs.a & value;
        self.regs.a = result;

        self.clear_flags();
        self.set_flag(Flag::Z, result == 0);
        self.set_flag(Flag::H, true);
    }

    #[inline]
    pub(super) fn alu_or(&mut self, value: u8) {
        let result = self.regs.a | value;
        self.regs.a = result;

        self.clear_flags();
        self.set_flag(Flag::Z, result == 0);
    }

    #[inline]
    pub(super) fn alu_xor(&mut self, value: u8) {
        let result = self.regs.a ^ value;
        self.regs.a = result;

        self.clear_flags();
        self.set_flag(Flag::Z, result == 0);
    }

    /// Compare A with `value`, setting flags as if `A - value` was performed.
    /// A itself is not modified.
    #[inline]
    pub(super) fn alu_cp(&mut self, value: u8) {
        self.compare(value, 0);
    }

    /// Shared subtract path: sets all four flags for `A - value - carry_in`
    /// and returns the difference without storing it.
    fn compare(&mut self, value: u8, carry_in: u8) -> u8 {
        let a = self.regs.a;
        let result = a.wrapping_sub(value).wrapping_sub(carry_in);

        self.clear_flags();
        self.set_flag(Flag::Z, result == 0);
        self.set_flag(Flag::N, true);
        self.set_flag(Flag::H, (a & 0x0F) < (value & 0x0F) + carry_in);
        self.set_flag(Flag::C, (value as u16 + carry_in as u16) > a as u16);
        result
    }

    /// DAA: turn A back into packed BCD after an add or a subtract.
    ///
    /// The correction depends on N: after a subtraction only the H and C
    /// borrows count. N is kept and H always ends up clear.
    pub(super) fn alu_daa(&mut self) {
        let a = self.regs.a;
        let subtract = self.get_flag(Flag::N);
        let low_fix = self.get_flag(Flag::H) || (!subtract && a & 0x0F > 0x09);
        let high_fix = self.get_flag(Flag::C) || (!subtract && a > 0x99);

        let correction = (low_fix as u8 * 0x06) | (high_fix as u8 * 0x60);
        let result = if subtract {
            a.wrapping_sub(correction)
        } else {
            a.wrapping_add(correction)
        };

        self.regs.a = result;
        self.set_flag(Flag::Z, result == 0);
        self.set_flag(Flag::H, false);
        self.set_flag(Flag::C, high_fix);
    }

    /// INC r and INC (HL).
    pub(super) fn alu_inc8(&mut self, value: u8) -> u8 {
        self.nudge8(value, false)
    }

    /// DEC r and DEC (HL).
    pub(super) fn alu_dec8(&mut self, value: u8) -> u8 {
        self.nudge8(value, true)
    }

    // Shared by INC/DEC. C is left alone; H flags a carry out of (or borrow
    // into) the low nibble.
    fn nudge8(&mut self, value: u8, down: bool) -> u8 {
        let (result, nibble_edge) = if down {
            (value.wrapping_sub(1), 0x00)
        } else {
            (value.wrapping_add(1), 0x0F)
        };
        self.set_flag(Flag::Z, result == 0);
        self.set_flag(Flag::N, down);
        self.set_flag(Flag::H, value & 0x0F == nibble_edge);
        result
    }

    /// ADD HL,rr. Carries out of bits 11 and 15 land in H and C; Z survives.
    pub(super) fn alu_add16_hl(&mut self, value: u16) {
        let hl = self.regs.hl();
        let (sum, carry) = hl.overflowing_add(value);

        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, (hl ^ value ^ sum) & 0x1000 != 0);
        self.set_flag(Flag::C, carry);
        self.regs.set_hl(sum);
    }

    /// `base` plus a signed displacement, for ADD SP,e and LD HL,SP+e.
    ///
    /// H and C come from the unsigned add of the low byte.
    pub(super) fn alu_add16_signed(&mut self, base: u16, imm8: u8) -> u16 {
        let low = base as u8;
        let (_, carry) = low.overflowing_add(imm8);
        let half = (low & 0x0F) + (imm8 & 0x0F) > 0x0F;

        self.clear_flags();
        self.set_flag(Flag::H, half);
        self.set_flag(Flag::C, carry);
        base.wrapping_add_signed(imm8 as i8 as i16)
    }
}
