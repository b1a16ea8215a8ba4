use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use typed_builder::TypedBuilder;

use dotboy_core::{CpuMode, Machine, RunOutcome};

pub mod trace;

pub use trace::TraceFormat;

/// Step budget used when none is given.
pub const DEFAULT_MAX_STEPS: u64 = 100_000_000;

#[derive(Debug, Clone, TypedBuilder)]
pub struct RunConfig {
    #[builder(setter(into))]
    pub rom_path: PathBuf,
    /// Where to write the per-step trace, if anywhere.
    #[builder(default)]
    pub trace_path: Option<PathBuf>,
    #[builder(default)]
    pub trace_format: TraceFormat,
    #[builder(default = DEFAULT_MAX_STEPS)]
    pub max_steps: u64,
    /// Report LY as 0x90 so traces match emulators with a running PPU.
    #[builder(default = false)]
    pub ly_stub: bool,
    /// Copy serial output to stdout as it arrives.
    #[builder(default = true)]
    pub echo_serial: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    /// Machine cycles consumed by the whole run.
    pub cycles: u64,
    /// Everything the program sent over the serial port.
    pub serial: Vec<u8>,
}

/// Load the configured ROM and run it until STOP or the step budget.
pub fn run(config: &RunConfig) -> anyhow::Result<RunSummary> {
    let rom = std::fs::read(&config.rom_path)
        .with_context(|| format!("failed to read ROM {}", config.rom_path.display()))?;
    log::info!("Running ROM '{}'", config.rom_path.display());

    let mut machine = Machine::with_rom(&rom)?;
    machine.memory.set_ly_stub(config.ly_stub);

    let mut trace = match &config.trace_path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create trace file {}", path.display()))?;
            Some(BufWriter::new(file))
        }
        None => None,
    };

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    let summary = drive(
        &mut machine,
        config,
        trace.as_mut().map(|w| w as &mut dyn Write),
        &mut stdout,
    )?;

    if let Some(mut w) = trace {
        w.flush().context("failed to flush trace file")?;
    }

    log::info!(
        "Finished after {} steps, {} machine cycles",
        summary.outcome.steps(),
        summary.cycles
    );
    Ok(summary)
}

/// Step `machine`, writing one trace line before each step and forwarding
/// serial bytes to `serial_out` when echo is enabled.
pub fn drive(
    machine: &mut Machine,
    config: &RunConfig,
    mut trace: Option<&mut dyn Write>,
    serial_out: &mut dyn Write,
) -> anyhow::Result<RunSummary> {
    let mut serial = Vec::new();
    let mut steps = 0u64;

    let outcome = loop {
        if machine.cpu.mode() == CpuMode::Stopped {
            break RunOutcome::Stopped { steps };
        }
        if steps >= config.max_steps {
            log::warn!("Step budget of {} exhausted", config.max_steps);
            break RunOutcome::StepLimit { steps };
        }

        if let Some(w) = trace.as_mut() {
            let state = machine.snapshot();
            let line = trace::format_line(config.trace_format, &state, machine.pc_window());
            writeln!(w, "{line}").context("failed to write trace line")?;
        }

        machine
            .step()
            .with_context(|| format!("CPU fault after {steps} steps"))?;
        steps += 1;

        let bytes = machine.memory.take_serial_output();
        if !bytes.is_empty() {
            if config.echo_serial {
                serial_out.write_all(&bytes).context("failed to echo serial output")?;
                serial_out.flush().context("failed to echo serial output")?;
            }
            serial.extend(bytes);
        }
    };

    Ok(RunSummary {
        outcome,
        cycles: machine.cpu.cycles(),
        serial,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// LD A,'h' ; LDH (01),A ; LD A,0x81 ; LDH (02),A ; STOP
    const HELLO: [u8; 10] = [0x3E, b'h', 0xE0, 0x01, 0x3E, 0x81, 0xE0, 0x02, 0x10, 0x00];

    fn machine_with(program: &[u8]) -> Machine {
        let mut rom = vec![0x00; 0x0100];
        rom.extend_from_slice(program);
        Machine::with_rom(&rom).unwrap()
    }

    #[test]
    fn drive_traces_each_step_and_echoes_serial() {
        let mut machine = machine_with(&HELLO);
        let config = RunConfig::builder().rom_path("unused.gb").build();
        let mut trace = Vec::new();
        let mut serial_out = Vec::new();

        let summary = drive(
            &mut machine,
            &config,
            Some(&mut trace as &mut dyn Write),
            &mut serial_out,
        )
        .unwrap();

        assert_eq!(summary.outcome, RunOutcome::Stopped { steps: 5 });
        assert_eq!(summary.serial, b"h".to_vec());
        assert_eq!(serial_out, b"h".to_vec());
        assert_eq!(summary.cycles, 2 + 3 + 2 + 3 + 1);

        let text = String::from_utf8(trace).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[0],
            "A:01 F:B0 B:00 C:13 D:00 E:D8 H:01 L:4D SP:FFFE PC:0100 PCMEM:3E,68,E0,01"
        );
        assert!(lines[4].contains("PC:0108 PCMEM:10,00,FF,FF"));
    }

    #[test]
    fn quiet_run_still_collects_serial() {
        let mut machine = machine_with(&HELLO);
        let config = RunConfig::builder()
            .rom_path("unused.gb")
            .echo_serial(false)
            .build();
        let mut serial_out = Vec::new();

        let summary = drive(&mut machine, &config, None, &mut serial_out).unwrap();
        assert!(serial_out.is_empty());
        assert_eq!(summary.serial, b"h".to_vec());
    }

    #[test]
    fn step_budget_is_honoured() {
        let mut machine = machine_with(&[0x18, 0xFE]);
        let config = RunConfig::builder()
            .rom_path("unused.gb")
            .max_steps(7)
            .build();
        let summary = drive(&mut machine, &config, None, &mut io::sink()).unwrap();
        assert_eq!(summary.outcome, RunOutcome::StepLimit { steps: 7 });
    }

    #[test]
    fn cpu_fault_becomes_error() {
        let mut machine = machine_with(&[0xDD]);
        let config = RunConfig::builder().rom_path("unused.gb").build();
        let err = drive(&mut machine, &config, None, &mut io::sink()).unwrap_err();
        assert!(format!("{err:#}").contains("unimplemented opcode 0xDD"));
    }

    #[test]
    fn run_reports_missing_rom() {
        let config = RunConfig::builder()
            .rom_path("/nonexistent/dotboy/rom.gb")
            .build();
        let err = run(&config).unwrap_err();
        assert!(err.to_string().contains("failed to read ROM"));
    }

    #[test]
    fn run_writes_bgb_trace_file() {
        let dir = std::env::temp_dir().join(format!("dotboy-run-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let rom_path = dir.join("hello.gb");
        let trace_path = dir.join("trace.log");

        let mut rom = vec![0x00; 0x0100];
        rom.extend_from_slice(&HELLO);
        std::fs::write(&rom_path, &rom).unwrap();

        let config = RunConfig::builder()
            .rom_path(rom_path)
            .trace_path(Some(trace_path.clone()))
            .trace_format(TraceFormat::Bgb)
            .echo_serial(false)
            .build();
        let summary = run(&config).unwrap();
        assert_eq!(summary.serial, b"h".to_vec());

        let text = std::fs::read_to_string(&trace_path).unwrap();
        assert!(text.starts_with("A: 01 F: B0 "));
        assert_eq!(text.lines().count(), 5);

        std::fs::remove_dir_all(&dir).ok();
    }
}
