//! Headless Nintendo 64 runner binary.
//!
//! No GUI, audio, or debugger front end; this is a CLI for driving the
//! core and inspecting its state, not a player-facing emulator shell.

use std::path::PathBuf;
use std::process;

use emu_n64::N64;

struct CliArgs {
    rom_path: Option<PathBuf>,
    ipl_path: Option<PathBuf>,
    frames: u64,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs { rom_path: None, ipl_path: None, frames: 60 };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rom" => {
                i += 1;
                cli.rom_path = args.get(i).map(PathBuf::from);
            }
            "--ipl" => {
                i += 1;
                cli.ipl_path = args.get(i).map(PathBuf::from);
            }
            "--frames" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.frames = s.parse().unwrap_or(60);
                }
            }
            other => {
                eprintln!("unrecognized argument: {other}");
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let cli = parse_args();

    let Some(rom_path) = cli.rom_path else {
        eprintln!("usage: emu-n64 --rom <path> [--ipl <path>] [--frames <n>]");
        process::exit(1);
    };

    let rom = match std::fs::read(&rom_path) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("failed to read {}: {err}", rom_path.display());
            process::exit(1);
        }
    };

    let mut n64 = N64::new();
    if let Err(err) = n64.load_cartridge(&rom) {
        eprintln!("failed to load cartridge: {err}");
        process::exit(1);
    }

    if let Some(ipl_path) = cli.ipl_path {
        match std::fs::read(&ipl_path) {
            Ok(data) => {
                if let Err(err) = n64.load_ipl(&data) {
                    eprintln!("failed to load IPL: {err}");
                    process::exit(1);
                }
            }
            Err(err) => {
                eprintln!("failed to read {}: {err}", ipl_path.display());
                process::exit(1);
            }
        }
    }

    n64.reset();

    for frame in 0..cli.frames {
        if let Err(err) = n64.run_frame() {
            eprintln!("stopped during frame {frame}: {err}");
            process::exit(1);
        }
    }

    println!(
        "ran {} frames, {} instructions retired",
        n64.frame_count(),
        n64.cpu().instructions_retired()
    );
}
