//! soma_leap entry point.
//!
//! Flags:
//!
//! * `--sound`          play MIDI cues on mode changes
//! * `--fast`           run the simulated hand as fast as possible
//! * `--no-calibrate`   skip position calibration
//! * `--config <file>`  load a JSON `SomaConfig`
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;

use soma_leap::app::load_config;
use soma_leap::{run, AppConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Soma — LeapMotion Hand Pose Input Controller        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Source: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Source: Simulated hand  (use --features leap for hardware)");
    println!("  Show six fingers to quit.");
    println!();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cfg = AppConfig::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--sound"        => cfg.sound = true,
            "--fast"         => cfg.realtime = false,
            "--no-calibrate" => cfg.calibrate = false,
            "--config" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    eprintln!("Error: --config needs a file");
                    std::process::exit(2);
                };
                match load_config(&PathBuf::from(path)) {
                    Ok(soma) => cfg.soma = soma,
                    Err(e)   => {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                }
            }
            other => eprintln!("  ignoring unknown argument {other}"),
        }
        i += 1;
    }

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
