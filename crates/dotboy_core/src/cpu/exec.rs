use super::opcodes::{Indirect, Op, OpcodeEntry, ShiftOp};
use super::{Bus, Cpu, Flag};

impl Cpu {
    /// Execute one decoded entry and return the machine cycles it consumed:
    /// the table cost, plus one per (HL) access, plus the taken surcharge
    /// for conditional branches that jump.
    pub(super) fn execute<B: Bus>(&mut self, bus: &mut B, entry: &OpcodeEntry) -> u32 {
        self.extra_cycles = 0;
        let taken = self.execute_op(bus, entry.op);

        let mut cycles = entry.cycles as u32 + self.extra_cycles;
        if taken {
            cycles += entry.taken_surcharge();
        }
        cycles
    }

    /// Returns `true` when a conditional branch was taken.
    fn execute_op<B: Bus>(&mut self, bus: &mut B, op: Op) -> bool {
        match op {
            Op::Nop => {}
            Op::Stop => {
                // STOP is encoded as 10 00; the padding byte is skipped.
                let _ = self.fetch8(bus);
                self.stopped = true;
            }
            Op::Halt => self.halted = true,
            Op::Di => {
                self.ime = false;
                self.ime_pending = false;
            }
            Op::Ei => self.ime_pending = true,
            Op::Prefix => unreachable!("0xCB is resolved during fetch"),

            Op::Ld { dst, src } => {
                let value = self.read_operand(bus, src);
                self.write_operand(bus, dst, value);
            }
            Op::LdImm8(dst) => {
                let value = self.fetch8(bus);
                self.write_operand(bus, dst, value);
            }
            Op::LdImm16(reg) => {
                let value = self.fetch16(bus);
                self.regs.set16(reg, value);
            }
            Op::StoreA(target) => {
                let addr = self.indirect_addr(target);
                bus.write8(addr, self.regs.a);
            }
            Op::LoadA(target) => {
                let addr = self.indirect_addr(target);
                self.regs.a = bus.read8(addr);
            }
            Op::StoreSp => {
                let addr = self.fetch16(bus);
                let sp = self.regs.sp;
                bus.write8(addr, sp as u8);
                bus.write8(addr.wrapping_add(1), (sp >> 8) as u8);
            }
            Op::StoreHighImm => {
                let offset = self.fetch8(bus);
                bus.write8(0xFF00 | offset as u16, self.regs.a);
            }
            Op::LoadHighImm => {
                let offset = self.fetch8(bus);
                self.regs.a = bus.read8(0xFF00 | offset as u16);
            }
            Op::StoreHighC => bus.write8(0xFF00 | self.regs.c as u16, self.regs.a),
            Op::LoadHighC => self.regs.a = bus.read8(0xFF00 | self.regs.c as u16),
            Op::StoreAbs => {
                let addr = self.fetch16(bus);
                bus.write8(addr, self.regs.a);
            }
            Op::LoadAbs => {
                let addr = self.fetch16(bus);
                self.regs.a = bus.read8(addr);
            }
            Op::LdHlSpOffset => {
                let imm = self.fetch8(bus);
                let value = self.alu_add16_signed(self.regs.sp, imm);
                self.regs.set_hl(value);
            }
            Op::LdSpHl => self.regs.sp = self.regs.hl(),

            Op::Alu(op, src) => {
                let value = self.read_operand(bus, src);
                self.alu(op, value);
            }
            Op::AluImm(op) => {
                let value = self.fetch8(bus);
                self.alu(op, value);
            }
            Op::Inc8(target) => {
                let value = self.read_operand(bus, target);
                let result = self.alu_inc8(value);
                self.write_operand(bus, target, result);
            }
            Op::Dec8(target) => {
                let value = self.read_operand(bus, target);
                let result = self.alu_dec8(value);
                self.write_operand(bus, target, result);
            }
            Op::Inc16(reg) => {
                let value = self.regs.get16(reg).wrapping_add(1);
                self.regs.set16(reg, value);
            }
            Op::Dec16(reg) => {
                let value = self.regs.get16(reg).wrapping_sub(1);
                self.regs.set16(reg, value);
            }
            Op::AddHl(reg) => {
                let value = self.regs.get16(reg);
                self.alu_add16_hl(value);
            }
            Op::AddSpOffset => {
                let imm = self.fetch8(bus);
                self.regs.sp = self.alu_add16_signed(self.regs.sp, imm);
            }
            Op::Rlca => self.rotate_a(ShiftOp::Rlc),
            Op::Rrca => self.rotate_a(ShiftOp::Rrc),
            Op::Rla => self.rotate_a(ShiftOp::Rl),
            Op::Rra => self.rotate_a(ShiftOp::Rr),
            Op::Daa => self.alu_daa(),
            Op::Cpl => {
                self.regs.a = !self.regs.a;
                self.set_flag(Flag::N, true);
                self.set_flag(Flag::H, true);
            }
            Op::Scf => {
                self.set_flag(Flag::N, false);
                self.set_flag(Flag::H, false);
                self.set_flag(Flag::C, true);
            }
            Op::Ccf => {
                let carry = self.get_flag(Flag::C);
                self.set_flag(Flag::N, false);
                self.set_flag(Flag::H, false);
                self.set_flag(Flag::C, !carry);
            }

            Op::Jr(cond) => return self.jr(bus, cond),
            Op::Jp(cond) => return self.jp(bus, cond),
            Op::JpHl => self.jp_hl(),
            Op::Call(cond) => return self.call(bus, cond),
            Op::Ret(cond) => return self.ret(bus, cond),
            Op::Reti => self.reti(bus),
            Op::Rst(vector) => self.rst(bus, vector),
            Op::Push(reg) => {
                let value = self.regs.get16(reg);
                self.push_u16(bus, value);
            }
            Op::Pop(reg) => {
                let value = self.pop_u16(bus);
                self.regs.set16(reg, value);
            }

            Op::Shift(op, target) => self.exec_shift(bus, op, target),
            Op::Bit(bit, target) => self.exec_bit(bus, bit, target),
            Op::Res(bit, target) => self.exec_set_bit(bus, bit, target, false),
            Op::Set(bit, target) => self.exec_set_bit(bus, bit, target, true),
        }
        false
    }

    /// Resolve the address of `LD (rr),A` / `LD A,(rr)`, applying the HL
    /// post-increment or post-decrement.
    fn indirect_addr(&mut self, target: Indirect) -> u16 {
        match target {
            Indirect::Bc => self.regs.bc(),
            Indirect::De => self.regs.de(),
            Indirect::HlInc => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_add(1));
                hl
            }
            Indirect::HlDec => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_sub(1));
                hl
            }
        }
    }
}
