use super::opcodes::Cond;
use super::{Bus, Cpu, Flag};

impl Cpu {
    #[inline]
    fn condition(&self, cond: Option<Cond>) -> bool {
        match cond {
            None => true,
            Some(Cond::NotZero) => !self.get_flag(Flag::Z),
            Some(Cond::Zero) => self.get_flag(Flag::Z),
            Some(Cond::NotCarry) => !self.get_flag(Flag::C),
            Some(Cond::Carry) => self.get_flag(Flag::C),
        }
    }

    /// Relative jump. The signed offset is always consumed; it is applied to
    /// the address following the operand.
    ///
    /// Returns whether the branch was taken.
    pub(super) fn jr<B: Bus>(&mut self, bus: &mut B, cond: Option<Cond>) -> bool {
        let offset = self.fetch8(bus) as i8;
        let taken = self.condition(cond);
        if taken {
            self.regs.pc = self.regs.pc.wrapping_add(offset as i16 as u16);
        }
        taken
    }

    /// Absolute jump helper used by JP a16 and JP cc,a16.
    pub(super) fn jp<B: Bus>(&mut self, bus: &mut B, cond: Option<Cond>) -> bool {
        let addr = self.fetch16(bus);
        let taken = self.condition(cond);
        if taken {
            self.regs.pc = addr;
        }
        taken
    }

    pub(super) fn jp_hl(&mut self) {
        self.regs.pc = self.regs.hl();
    }

    /// Call helper used by CALL a16 and CALL cc,a16. The pushed return
    /// address is the one following the 16-bit operand.
    pub(super) fn call<B: Bus>(&mut self, bus: &mut B, cond: Option<Cond>) -> bool {
        let addr = self.fetch16(bus);
        let taken = self.condition(cond);
        if taken {
            let ret = self.regs.pc;
            self.push_u16(bus, ret);
            self.regs.pc = addr;
        }
        taken
    }

    pub(super) fn ret<B: Bus>(&mut self, bus: &mut B, cond: Option<Cond>) -> bool {
        let taken = self.condition(cond);
        if taken {
            self.regs.pc = self.pop_u16(bus);
        }
        taken
    }

    /// RETI enables interrupts immediately, without the EI delay.
    pub(super) fn reti<B: Bus>(&mut self, bus: &mut B) {
        self.regs.pc = self.pop_u16(bus);
        self.ime = true;
        self.ime_pending = false;
    }

    pub(super) fn rst<B: Bus>(&mut self, bus: &mut B, vector: u16) {
        let ret = self.regs.pc;
        self.push_u16(bus, ret);
        self.regs.pc = vector;
    }
}
