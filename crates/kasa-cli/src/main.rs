//! kasa - host loop for the kasa performance core.
//!
//! Attaches a grid control surface over MIDI, runs the tick loop at the
//! render rate, and logs transport state. The actual animation renderers
//! live in the graphical host; this binary is the reference wiring and a
//! handy way to exercise a surface end to end.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, Subcommand};

use kasa_core::{MidiSurface, PerformanceEngine};

#[derive(Parser)]
#[command(name = "kasa")]
#[command(author, version, about = "Control-surface core for the kasa visuals tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Substring of the MIDI port name to attach (runs headless if absent
    /// or unmatched)
    #[arg(short, long)]
    port: Option<String>,

    /// Initial tempo
    #[arg(long, default_value = "120.0")]
    bpm: f64,

    /// Tick rate in frames per second
    #[arg(long, default_value = "60")]
    fps: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// List available MIDI ports
    ListPorts,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Some(Commands::ListPorts) = cli.command {
        let inputs = kasa_core::list_input_ports();
        if inputs.is_empty() {
            println!("No MIDI input ports found");
        } else {
            println!("MIDI input ports:");
            for port in inputs {
                println!("  {}", port);
            }
        }
        let outputs = kasa_core::list_output_ports();
        if !outputs.is_empty() {
            println!("MIDI output ports:");
            for port in outputs {
                println!("  {}", port);
            }
        }
        return Ok(());
    }

    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let mut engine = PerformanceEngine::with_bpm(cli.bpm);

    if let Some(ref port) = cli.port {
        match MidiSurface::connect(port, engine.event_sender()) {
            Ok(surface) => {
                log::info!("Surface attached: {}", surface.port_name());
                engine.set_sink(Box::new(surface));
            }
            Err(e) => {
                log::warn!("Running headless: {}", e);
            }
        }
    } else {
        log::info!("No port requested, running headless");
    }

    let term = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&term))?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&term))?;

    let frame = Duration::from_micros(1_000_000 / cli.fps.max(1));
    let origin = Instant::now();
    let mut last_status = Instant::now();

    engine.start();
    log::info!("Running at {} fps, Ctrl+C to quit", cli.fps.max(1));

    while !term.load(Ordering::Relaxed) {
        let tick_start = Instant::now();
        let now_ms = origin.elapsed().as_secs_f64() * 1000.0;
        engine.tick(now_ms);

        if last_status.elapsed() >= Duration::from_secs(1) {
            log::info!(
                "beat {:.2}  bpm {:.1}  step {}  pattern {}",
                engine.beat(),
                engine.bpm(),
                engine.current_step(),
                engine.selected_pattern(),
            );
            last_status = Instant::now();
        }

        if let Some(remaining) = frame.checked_sub(tick_start.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    engine.stop();
    log::info!("Stopped");
    Ok(())
}
