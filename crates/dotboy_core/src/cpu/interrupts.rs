use crate::interrupts::{Interrupt, IE_ADDR, IF_ADDR};

use super::{Bus, Cpu};

/// Machine cycles charged for an interrupt dispatch.
const DISPATCH_CYCLES: u32 = 5;

impl Cpu {
    /// Wake from HALT on any pending request and dispatch the
    /// highest-priority one when IME is set.
    ///
    /// Returns `Some(cycles)` if an interrupt was taken, or `None` otherwise.
    pub(super) fn handle_interrupts<B: Bus>(&mut self, bus: &mut B) -> Option<u32> {
        let ie = bus.read8(IE_ADDR);
        let iflags = bus.read8(IF_ADDR);
        let pending = Interrupt::from_bits_truncate(ie & iflags);
        let next = pending.highest_priority()?;

        // A request wakes HALT even with IME off; execution then resumes
        // after the HALT without entering the handler.
        self.halted = false;
        if !self.ime {
            return None;
        }

        self.ime = false;
        self.ime_pending = false;
        bus.write8(IF_ADDR, iflags & !next.bits());

        let pc = self.regs.pc;
        self.push_u16(bus, pc);
        self.regs.pc = next.vector();

        log::debug!(
            "CPU interrupt: {:?} vector=0x{:04X} pc=0x{:04X} sp=0x{:04X} IF=0x{:02X} IE=0x{:02X}",
            next,
            self.regs.pc,
            pc,
            self.regs.sp,
            iflags & 0x1F,
            ie,
        );

        Some(DISPATCH_CYCLES)
    }
}
