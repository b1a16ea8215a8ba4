pub mod cpu;
pub mod interrupts;
pub mod machine;
pub mod memory;
pub mod timer;

pub use cpu::{Bus, Cpu, CpuError, CpuMode, CpuState};
pub use interrupts::Interrupt;
pub use machine::{Machine, RunOutcome};
pub use memory::{Memory, MemoryError};
pub use timer::Timer;

/// Clock cycles per machine cycle.
pub const CLOCKS_PER_MCYCLE: u32 = 4;
