use std::{error::Error, fs, path::PathBuf};

use clap::{builder::RangedU64ValueParser, Parser};
use log::{error, info, warn};

use chip8_host::{logger, HeadlessContext};
use chip8_vm::{nb, Builder};

/// CPU steps per 60Hz timer tick, roughly 500Hz
const STEPS_PER_TICK: usize = 8;
const DEFAULT_CYCLES: usize = 1000;

/// Run a CHIP-8 program without a display and print its final screen
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the ROM file to run
    rom: PathBuf,

    /// Number of instructions to execute before exiting
    #[arg(long, default_value_t = DEFAULT_CYCLES)]
    cycles: usize,

    /// Seed of the random source used by RND
    #[arg(long, default_value_t = 0)]
    seed: u128,

    /// Instructions executed per 60Hz timer tick
    #[arg(long, default_value_t = STEPS_PER_TICK, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    steps_per_tick: usize,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    logger::init(logger::LevelFilter::Info)?;

    let rom = fs::read(&args.rom)?;
    info!("running {} for {} cycles", args.rom.display(), args.cycles);
    let mut chip = Builder::new()
        .with_context(HeadlessContext::new(args.seed))
        .with_program(&rom)
        .build()?;

    for cycle in 0..args.cycles {
        match chip.step() {
            Ok(()) => {}
            Err(nb::Error::WouldBlock) => {
                warn!("program waits for a key at {:#05X}, stopping", chip.pc());
                break;
            }
            Err(nb::Error::Other(err)) => {
                error!("halted after {} cycles", cycle);
                print!("{}", chip.ctx().render());
                return Err(err.into());
            }
        }
        if (cycle + 1) % args.steps_per_tick == 0 {
            chip.tick_timers();
        }
    }

    if chip.ctx().is_sound_on() {
        info!("stopped with sound on, {} ticks left", chip.sound_timer());
    }
    print!("{}", chip.ctx().render());
    Ok(())
}
