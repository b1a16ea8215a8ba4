use super::{Bus, Cpu, Operand};

impl Cpu {
    /// Read an 8-bit operand.
    ///
    /// Reading through HL is an extra memory round trip and charges one
    /// machine cycle on top of the instruction's table cost.
    #[inline]
    pub(super) fn read_operand<B: Bus>(&mut self, bus: &mut B, operand: Operand) -> u8 {
        match operand {
            Operand::Reg(reg) => self.regs.get8(reg),
            Operand::IndirectHl => {
                self.extra_cycles += 1;
                bus.read8(self.regs.hl())
            }
        }
    }

    /// Write an 8-bit operand. Writes through HL charge one machine cycle.
    #[inline]
    pub(super) fn write_operand<B: Bus>(&mut self, bus: &mut B, operand: Operand, value: u8) {
        match operand {
            Operand::Reg(reg) => self.regs.set8(reg, value),
            Operand::IndirectHl => {
                self.extra_cycles += 1;
                bus.write8(self.regs.hl(), value);
            }
        }
    }

    #[inline]
    pub(super) fn fetch8<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read8(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    #[inline]
    pub(super) fn fetch16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch8(bus) as u16;
        let hi = self.fetch8(bus) as u16;
        (hi << 8) | lo
    }

    #[inline]
    pub(super) fn push_u16<B: Bus>(&mut self, bus: &mut B, value: u16) {
        let lo = value as u8;
        let hi = (value >> 8) as u8;
        // Stack grows downward: memory[SP] = low, memory[SP+1] = high.
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, lo);
    }

    #[inline]
    pub(super) fn pop_u16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = bus.read8(self.regs.sp) as u16;
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = bus.read8(self.regs.sp) as u16;
        self.regs.sp = self.regs.sp.wrapping_add(1);
        (hi << 8) | lo
    }
}
