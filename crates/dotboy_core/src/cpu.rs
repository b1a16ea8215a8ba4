mod alu;
mod cb;
mod control;
mod exec;
mod helpers;
mod init;
mod interrupts;
pub mod opcodes;
mod regs;
mod step;

pub use regs::{Flag, Operand, Reg16, Reg8, Registers};

use thiserror::Error;

/// Abstraction over the LR35902 memory space.
///
/// The core treats every address uniformly; implementors route reads and
/// writes to ROM, RAM or device registers and are responsible for ignoring
/// writes to read-only regions.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);

    /// Advance bus-side peripherals after a completed CPU step.
    ///
    /// `m_cycles` is the number of machine cycles the step consumed. The
    /// CPU calls this exactly once per step, after its own cycle counter
    /// has been updated. Default implementation does nothing; system buses
    /// override it to drive the timer.
    fn tick(&mut self, _m_cycles: u32) {}
}

/// Fatal CPU conditions.
///
/// Every variant is a data or programming error: once raised the CPU stays
/// faulted and keeps reporting the same error.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum CpuError {
    #[error(
        "unimplemented {}opcode 0x{opcode:02X} at PC=0x{pc:04X}",
        prefix_label(.prefixed)
    )]
    UnimplementedOpcode { opcode: u8, pc: u16, prefixed: bool },
}

fn prefix_label(prefixed: &bool) -> &'static str {
    if *prefixed {
        "CB-prefixed "
    } else {
        ""
    }
}

/// Execution state of the fetch-decode-execute engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CpuMode {
    Running,
    Halted,
    Stopped,
}

/// Read-only copy of everything observable about the CPU after a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CpuState {
    pub regs: Registers,
    pub ime: bool,
    pub ime_pending: bool,
    pub halted: bool,
    pub stopped: bool,
    /// Elapsed machine cycles since power-on.
    pub cycles: u64,
}

impl CpuState {
    #[inline]
    pub fn flag(&self, flag: Flag) -> bool {
        self.regs.flag(flag)
    }
}

/// LR35902 CPU core.
///
/// Owns the register file, the interrupt/low-power mode flags and the
/// machine-cycle counter. All memory traffic goes through a [`Bus`] passed
/// into [`Cpu::step`].
#[derive(Clone, Debug)]
pub struct Cpu {
    pub regs: Registers,
    pub ime: bool,
    pub halted: bool,
    pub stopped: bool,
    /// EI was executed; IME turns on after the following instruction.
    pub ime_pending: bool,
    /// Machine cycles elapsed since power-on.
    cycles: u64,
    /// Surcharge accumulated by (HL) operand accesses during the current
    /// instruction.
    extra_cycles: u32,
    /// Set once an unimplemented opcode has been fetched.
    fault: Option<CpuError>,
}

impl Cpu {
    #[inline]
    pub fn get_flag(&self, flag: Flag) -> bool {
        self.regs.flag(flag)
    }

    #[inline]
    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        self.regs.set_flag(flag, value);
    }

    #[inline]
    pub fn clear_flags(&mut self) {
        self.regs.f = 0;
    }

    /// Total machine cycles consumed since power-on (or the last reset).
    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn mode(&self) -> CpuMode {
        if self.stopped {
            CpuMode::Stopped
        } else if self.halted {
            CpuMode::Halted
        } else {
            CpuMode::Running
        }
    }

    /// The fatal error that stopped this CPU, if any.
    pub fn fault(&self) -> Option<CpuError> {
        self.fault
    }

    /// Leave HALT or STOP without servicing an interrupt.
    ///
    /// This is the external wake hook for collaborators that model
    /// joypad lines or a debugger "continue".
    pub fn resume(&mut self) {
        self.halted = false;
        self.stopped = false;
    }

    pub fn snapshot(&self) -> CpuState {
        CpuState {
            regs: self.regs,
            ime: self.ime,
            ime_pending: self.ime_pending,
            halted: self.halted,
            stopped: self.stopped,
            cycles: self.cycles,
        }
    }
}
