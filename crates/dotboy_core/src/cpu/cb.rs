use super::opcodes::ShiftOp;
use super::{Bus, Cpu, Flag, Operand};

impl Cpu {
    /// Rotate/shift `value` one bit and rewrite all four flags.
    ///
    /// The bit shifted out lands in C, N and H are cleared and Z reflects
    /// the result. SWAP exchanges nibbles and clears C.
    pub(super) fn alu_shift(&mut self, op: ShiftOp, value: u8) -> u8 {
        let carry_in = self.get_flag(Flag::C);
        let (result, carry_out) = match op {
            ShiftOp::Rlc => (value.rotate_left(1), value & 0x80 != 0),
            ShiftOp::Rrc => (value.rotate_right(1), value & 0x01 != 0),
            ShiftOp::Rl => ((value << 1) | carry_in as u8, value & 0x80 != 0),
            ShiftOp::Rr => ((value >> 1) | ((carry_in as u8) << 7), value & 0x01 != 0),
            ShiftOp::Sla => (value << 1, value & 0x80 != 0),
            ShiftOp::Sra => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
            ShiftOp::Swap => (value.rotate_left(4), false),
            ShiftOp::Srl => (value >> 1, value & 0x01 != 0),
        };

        self.clear_flags();
        self.set_flag(Flag::Z, result == 0);
        self.set_flag(Flag::C, carry_out);
        result
    }

    /// RLCA/RRCA/RLA/RRA: the prefixed rotate applied to A, except that Z
    /// is always cleared.
    pub(super) fn rotate_a(&mut self, op: ShiftOp) {
        self.regs.a = self.alu_shift(op, self.regs.a);
        self.set_flag(Flag::Z, false);
    }

    pub(super) fn exec_shift<B: Bus>(&mut self, bus: &mut B, op: ShiftOp, target: Operand) {
        let value = self.read_operand(bus, target);
        let result = self.alu_shift(op, value);
        self.write_operand(bus, target, result);
    }

    /// BIT u,r: Z = bit clear, N = 0, H = 1, C unchanged.
    pub(super) fn exec_bit<B: Bus>(&mut self, bus: &mut B, bit: u8, target: Operand) {
        let value = self.read_operand(bus, target);
        self.set_flag(Flag::Z, value & (1 << bit) == 0);
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, true);
    }

    /// SET/RES u,r. Flags are untouched.
    pub(super) fn exec_set_bit<B: Bus>(&mut self, bus: &mut B, bit: u8, target: Operand, set: bool) {
        let value = self.read_operand(bus, target);
        let result = if set {
            value | (1 << bit)
        } else {
            value & !(1 << bit)
        };
        self.write_operand(bus, target, result);
    }
}
