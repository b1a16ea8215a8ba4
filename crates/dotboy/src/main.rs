use std::path::PathBuf;

use anyhow::{bail, Context};

use dotboy::{RunConfig, TraceFormat, DEFAULT_MAX_STEPS};
use dotboy_core::RunOutcome;

const USAGE: &str = "usage: dotboy <rom> [--trace <file>] [--format doctor|bgb] \
                     [--max-steps <n>] [--ly-stub] [--quiet]";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let mut rom_path: Option<PathBuf> = None;
    let mut trace_path: Option<PathBuf> = None;
    let mut trace_format = TraceFormat::default();
    let mut max_steps = DEFAULT_MAX_STEPS;
    let mut ly_stub = false;
    let mut echo_serial = true;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--trace" => {
                let path = args.next().context("--trace needs a file path")?;
                trace_path = Some(PathBuf::from(path));
            }
            "--format" => {
                let name = args.next().context("--format needs a value")?;
                trace_format = name.parse()?;
            }
            "--max-steps" => {
                let value = args.next().context("--max-steps needs a value")?;
                max_steps = value
                    .parse()
                    .with_context(|| format!("invalid step count '{value}'"))?;
            }
            "--ly-stub" => ly_stub = true,
            "--quiet" => echo_serial = false,
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(());
            }
            flag if flag.starts_with("--") => bail!("unknown option '{flag}'\n{USAGE}"),
            path if rom_path.is_none() => rom_path = Some(PathBuf::from(path)),
            extra => bail!("unexpected argument '{extra}'\n{USAGE}"),
        }
    }

    let Some(rom_path) = rom_path else {
        bail!("no ROM path provided\n{USAGE}");
    };

    let config = RunConfig::builder()
        .rom_path(rom_path)
        .trace_path(trace_path)
        .trace_format(trace_format)
        .max_steps(max_steps)
        .ly_stub(ly_stub)
        .echo_serial(echo_serial)
        .build();

    let summary = dotboy::run(&config)?;
    if let RunOutcome::StepLimit { steps } = summary.outcome {
        log::warn!("Stopped after {} steps without reaching STOP", steps);
    }
    Ok(())
}
