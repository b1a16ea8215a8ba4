use std::str::FromStr;

use thiserror::Error;

use dotboy_core::CpuState;

/// Layout of the per-step execution trace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraceFormat {
    /// `A:01 F:B0 B:00 ... SP:FFFE PC:0100 PCMEM:00,C3,13,02`, the format
    /// consumed by Game Boy Doctor.
    #[default]
    Doctor,
    /// `A: 01 F: B0 ... SP: FFFE PC: 00:0100 (00 C3 13 02)`, matching BGB's
    /// debugger log.
    Bgb,
}

impl FromStr for TraceFormat {
    type Err = UnknownTraceFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "doctor" | "gbdoc" | "gameboy-doctor" => Ok(TraceFormat::Doctor),
            "bgb" => Ok(TraceFormat::Bgb),
            other => Err(UnknownTraceFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown trace format '{0}' (expected doctor or bgb)")]
pub struct UnknownTraceFormat(pub String);

/// Render one trace line (without the trailing newline) for the state the
/// CPU is in *before* the next step.
pub fn format_line(format: TraceFormat, state: &CpuState, window: [u8; 4]) -> String {
    let r = &state.regs;
    match format {
        TraceFormat::Doctor => format!(
            "A:{:02X} F:{:02X} B:{:02X} C:{:02X} D:{:02X} E:{:02X} H:{:02X} L:{:02X} SP:{:04X} PC:{:04X} PCMEM:{:02X},{:02X},{:02X},{:02X}",
            r.a, r.f, r.b, r.c, r.d, r.e, r.h, r.l, r.sp, r.pc,
            window[0], window[1], window[2], window[3],
        ),
        TraceFormat::Bgb => format!(
            "A: {:02X} F: {:02X} B: {:02X} C: {:02X} D: {:02X} E: {:02X} H: {:02X} L: {:02X} SP: {:04X} PC: 00:{:04X} ({:02X} {:02X} {:02X} {:02X})",
            r.a, r.f, r.b, r.c, r.d, r.e, r.h, r.l, r.sp, r.pc,
            window[0], window[1], window[2], window[3],
        ),
    }
}
