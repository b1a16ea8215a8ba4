use crate::cpu::{Bus, Cpu, CpuError, CpuMode, CpuState};
use crate::memory::{Memory, MemoryError};

/// Why [`Machine::run_until_stopped`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The CPU executed STOP.
    Stopped { steps: u64 },
    /// The step budget ran out first.
    StepLimit { steps: u64 },
}

impl RunOutcome {
    pub fn steps(self) -> u64 {
        match self {
            RunOutcome::Stopped { steps } | RunOutcome::StepLimit { steps } => steps,
        }
    }
}

/// CPU core wired to the flat memory map.
///
/// This is the entry point used by the `dotboy` runner.
pub struct Machine {
    pub cpu: Cpu,
    pub memory: Memory,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            memory: Memory::new(),
        }
    }

    pub fn with_rom(rom: &[u8]) -> Result<Self, MemoryError> {
        let mut machine = Self::new();
        machine.memory.load_rom(rom)?;
        Ok(machine)
    }

    /// Return to the power-on state with the loaded ROM still mapped.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.memory.reset();
    }

    /// Execute one CPU step; returns the machine cycles it took.
    #[inline]
    pub fn step(&mut self) -> Result<u32, CpuError> {
        self.cpu.step(&mut self.memory)
    }

    /// Step until the CPU executes STOP or `max_steps` steps have run.
    pub fn run_until_stopped(&mut self, max_steps: u64) -> Result<RunOutcome, CpuError> {
        let mut steps = 0;
        while steps < max_steps {
            if self.cpu.mode() == CpuMode::Stopped {
                return Ok(RunOutcome::Stopped { steps });
            }
            self.step()?;
            steps += 1;
        }

        if self.cpu.mode() == CpuMode::Stopped {
            Ok(RunOutcome::Stopped { steps })
        } else {
            log::warn!("Step budget of {} exhausted at PC=0x{:04X}", max_steps, self.cpu.regs.pc);
            Ok(RunOutcome::StepLimit { steps })
        }
    }

    pub fn snapshot(&self) -> CpuState {
        self.cpu.snapshot()
    }

    /// The four bytes starting at PC, as shown in execution traces.
    pub fn pc_window(&mut self) -> [u8; 4] {
        let pc = self.cpu.regs.pc;
        std::array::from_fn(|i| self.memory.read8(pc.wrapping_add(i as u16)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interrupts::{Interrupt, IF_ADDR};

    /// Build a ROM with `program` placed at the 0x0100 entry point.
    fn rom_with_entry(program: &[u8]) -> Vec<u8> {
        let mut rom = vec![0x00; 0x0100];
        rom.extend_from_slice(program);
        rom
    }

    #[test]
    fn runs_until_stop() {
        // LD A,0x05 ; DEC A ; JR NZ,-3 ; STOP
        let rom = rom_with_entry(&[0x3E, 0x05, 0x3D, 0x20, 0xFD, 0x10, 0x00]);
        let mut machine = Machine::with_rom(&rom).unwrap();

        let outcome = machine.run_until_stopped(1_000).unwrap();
        assert_eq!(outcome, RunOutcome::Stopped { steps: 12 });
        assert_eq!(machine.cpu.regs.a, 0);
        assert_eq!(machine.cpu.regs.pc, 0x0107);
        // 2 + 5 * (1 + 3) - 1 + 1
        assert_eq!(machine.snapshot().cycles, 22);
    }

    #[test]
    fn step_budget_limits_run() {
        // JR -2
        let rom = rom_with_entry(&[0x18, 0xFE]);
        let mut machine = Machine::with_rom(&rom).unwrap();
        let outcome = machine.run_until_stopped(10).unwrap();
        assert_eq!(outcome, RunOutcome::StepLimit { steps: 10 });
        assert_eq!(outcome.steps(), 10);
    }

    #[test]
    fn fault_is_propagated() {
        let rom = rom_with_entry(&[0x00, 0xED]);
        let mut machine = Machine::with_rom(&rom).unwrap();
        let err = machine.run_until_stopped(10).unwrap_err();
        assert_eq!(
            err,
            CpuError::UnimplementedOpcode {
                opcode: 0xED,
                pc: 0x0101,
                prefixed: false
            }
        );
    }

    #[test]
    fn timer_overflow_interrupt_is_serviced() {
        // LD A,0xFF ; LDH (05),A ; LD A,0x04 ; LDH (FF),A ; LD A,0x05 ;
        // LDH (07),A ; EI ; HALT ; STOP
        let mut rom = rom_with_entry(&[
            0x3E, 0xFF, 0xE0, 0x05, 0x3E, 0x04, 0xE0, 0xFF, 0x3E, 0x05, 0xE0, 0x07, 0xFB, 0x76,
            0x10, 0x00,
        ]);
        // Timer handler at 0x0050: RETI.
        rom[0x0050] = 0xD9;
        let mut machine = Machine::with_rom(&rom).unwrap();

        let outcome = machine.run_until_stopped(1_000).unwrap();
        assert!(matches!(outcome, RunOutcome::Stopped { .. }));
        assert_eq!(machine.memory.read8(IF_ADDR) & Interrupt::TIMER.bits(), 0);
        assert_eq!(machine.cpu.regs.pc, 0x0110);
        assert!(machine.cpu.ime);
    }

    #[test]
    fn tima_overflow_is_visible_on_next_step() {
        // NOP sled; TIMA about to overflow with the fastest clock.
        let mut machine = Machine::with_rom(&rom_with_entry(&[0x00; 16])).unwrap();
        machine.memory.write8(0xFF05, 0xFF);
        machine.memory.write8(0xFF07, 0b101);

        for _ in 0..3 {
            machine.step().unwrap();
        }
        assert_eq!(machine.memory.if_reg() & Interrupt::TIMER.bits(), 0);
        machine.step().unwrap();
        assert_eq!(machine.memory.if_reg() & Interrupt::TIMER.bits(), Interrupt::TIMER.bits());
    }

    #[test]
    fn reset_restarts_the_loaded_rom() {
        // LD A,0x42 ; STOP
        let rom = rom_with_entry(&[0x3E, 0x42, 0x10, 0x00]);
        let mut machine = Machine::with_rom(&rom).unwrap();
        machine.run_until_stopped(10).unwrap();
        assert_eq!(machine.cpu.mode(), CpuMode::Stopped);
        machine.memory.write8(0xC000, 0x55);

        machine.reset();

        assert_eq!(machine.cpu.regs.pc, 0x0100);
        assert_eq!(machine.cpu.mode(), CpuMode::Running);
        assert_eq!(machine.snapshot().cycles, 0);
        assert_eq!(machine.pc_window(), [0x3E, 0x42, 0x10, 0x00]);
        assert_eq!(machine.memory.read8(0xC000), 0x00);

        let outcome = machine.run_until_stopped(10).unwrap();
        assert_eq!(outcome, RunOutcome::Stopped { steps: 2 });
        assert_eq!(machine.cpu.regs.a, 0x42);
    }

    #[test]
    fn pc_window_reads_four_bytes() {
        let rom = rom_with_entry(&[0x00, 0xC3, 0x13, 0x02]);
        let mut machine = Machine::with_rom(&rom).unwrap();
        assert_eq!(machine.pc_window(), [0x00, 0xC3, 0x13, 0x02]);
    }

    #[test]
    fn oversized_rom_is_an_error() {
        let rom = vec![0u8; 0x8001];
        assert!(matches!(
            Machine::with_rom(&rom),
            Err(MemoryError::RomTooLarge { len: 0x8001 })
        ));
    }
}
