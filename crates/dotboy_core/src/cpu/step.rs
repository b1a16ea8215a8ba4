use super::opcodes::{self, Op};
use super::{Bus, Cpu, CpuError};

impl Cpu {
    /// Run one step: an interrupt dispatch, one HALT bookkeeping cycle or a
    /// single instruction.
    ///
    /// Returns the machine cycles consumed. The cycle counter is updated
    /// before `bus.tick` is called, so peripheral side effects of this step
    /// are only observed by the next one.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, CpuError> {
        if let Some(err) = self.fault {
            return Err(err);
        }

        // STOP freezes the system clock until an external wake.
        if self.stopped {
            return Ok(0);
        }

        let cycles = match self.handle_interrupts(bus) {
            Some(cycles) => cycles,
            None if self.halted => 1,
            None => self.step_instruction(bus)?,
        };

        self.cycles += cycles as u64;
        bus.tick(cycles);
        Ok(cycles)
    }

    fn step_instruction<B: Bus>(&mut self, bus: &mut B) -> Result<u32, CpuError> {
        let ime_was_pending = self.ime_pending;
        let pc = self.regs.pc;

        let opcode = self.fetch8(bus);
        let entry = match opcodes::base(opcode) {
            Some(entry) if entry.op == Op::Prefix => {
                let cb = self.fetch8(bus);
                opcodes::prefixed(cb)
            }
            Some(entry) => entry,
            None => {
                return Err(self.raise(CpuError::UnimplementedOpcode {
                    opcode,
                    pc,
                    prefixed: false,
                }))
            }
        };

        let cycles = self.execute(bus, entry);

        // EI takes effect after the instruction that follows it.
        if ime_was_pending && self.ime_pending {
            self.ime = true;
            self.ime_pending = false;
        }

        Ok(cycles)
    }

    /// Latch a fatal error. The CPU keeps returning it from `step`.
    fn raise(&mut self, err: CpuError) -> CpuError {
        let r = &self.regs;
        log::error!(
            "CPU fault: {} (A={:02X} F={:02X} B={:02X} C={:02X} D={:02X} E={:02X} H={:02X} L={:02X} SP={:04X})",
            err,
            r.a,
            r.f,
            r.b,
            r.c,
            r.d,
            r.e,
            r.h,
            r.l,
            r.sp,
        );
        self.fault = Some(err);
        err
    }
}
