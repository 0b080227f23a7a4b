use std::{path::PathBuf, process::ExitCode};

use clap::Parser;

use rv64emu::{
    logging::{self, LogLevel},
    Emulator,
};

/// User-mode RV64I + Zicsr instruction-set simulator.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Flat binary image of little-endian RV64 instructions.
    bin: PathBuf,

    /// Logging verbosity.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _logger_handle = logging::init(cli.log_level);

    let mut emu = match Emulator::from_bin(&cli.bin) {
        Ok(emu) => emu,
        Err(err) => {
            eprintln!("rv64emu: cannot load {}: {}", cli.bin.display(), err);
            return ExitCode::FAILURE;
        }
    };

    println!("{:?}", emu.cpu().reg_file());

    let result = emu.run();

    println!("{:?}", emu.cpu().reg_file());

    match result {
        Ok(retired) => {
            log::info!(
                "clean exit after {} instructions at pc {:#x}",
                retired,
                emu.cpu().pc()
            );
            ExitCode::SUCCESS
        }
        Err(fault) => {
            eprintln!("rv64emu: {}", fault);
            ExitCode::from(fault.kind.code().max(1) as u8)
        }
    }
}
