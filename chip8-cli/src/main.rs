//! Entrypoint for CLI
mod clock;
mod config;
mod error;
mod runner;

use std::{env, error::Error, fs, time::Instant};

use chip8::{prelude::*, IMPL_VERSION};
use log::info;

use self::{config::RunConf, error::AppError, runner::Runner};

static USAGE: &str = r#"
usage: chip8 CMD FILE [--config CONF]

commands:
    run     Run the target ROM file headless, and print the final display
    dis     Disassemble the the target ROM into readable assembly

options:
    --config CONF   YAML run configuration (frames, steps per frame, scripted keys)

examples:
    chip8 run breakout.rom
    chip8 run breakout.rom --config breakout.yaml
    chip8 dis breakout.rom
"#;

fn run_bytecode(filepath: &str, config: Option<&str>) -> Result<(), AppError> {
    info!("running {filepath}");

    let bytecode = fs::read(filepath)?;
    let conf = match config {
        Some(path) => RunConf::from_file(path)?,
        None => RunConf::default(),
    };

    let mut vm = Chip8Vm::new();
    let mut runner = Runner::new(conf);

    let start = Instant::now();
    let result = runner.run(&mut vm, &bytecode);
    let end = Instant::now();

    let stats = runner.stats();
    info!(
        "time taken: {}ms, {} frames, {} steps, {} redraws, {} beeps",
        end.duration_since(start).as_nanos() as f64 / 1000000.0, // to millis
        stats.frames,
        stats.steps,
        stats.redraws,
        stats.beeps
    );
    println!("{}", vm.dump_display()?);

    result
}

fn run_disassembler(filepath: &str) -> Result<(), AppError> {
    info!("disassembling {filepath}");

    let bytecode = fs::read(filepath)?;
    let listing = Disassembler::new(&bytecode).disassemble_all()?;
    print!("{listing}");

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new().env().init()?;

    match parse_args(env::args().skip(1)) {
        Some(Cmd::Run { filepath, config }) => run_bytecode(&filepath, config.as_deref())?,
        Some(Cmd::Dis { filepath }) => run_disassembler(&filepath)?,
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    }

    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Option<Cmd> {
    let cmd = args.next()?;
    match cmd.as_str() {
        "run" => {
            let filepath = args.next()?;
            let config = match args.next().as_deref() {
                Some("--config") => Some(args.next()?),
                Some(_) => return None,
                None => None,
            };
            Some(Cmd::Run { filepath, config })
        }
        "dis" => Some(Cmd::Dis {
            filepath: args.next()?,
        }),
        _ => None,
    }
}

fn print_usage() {
    println!("Chip8 v{IMPL_VERSION}");
    println!("{USAGE}");
}

#[derive(Debug, PartialEq, Eq)]
enum Cmd {
    /// Run file
    Run {
        filepath: String,
        config: Option<String>,
    },
    /// Disassemble
    Dis { filepath: String },
}
