use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use serde::de::IgnoredAny;
use serde::Deserialize;

use highway_sim::driver::{spawn_broadcaster, spawn_ticker, Broadcaster, Frame, SimCommand};
use highway_sim::simulation::{ConfigUpdate, SimEngine, SimSnapshot};

#[derive(Parser)]
#[command(name = "highway_sim")]
#[command(about = "Single-road car-following traffic simulation")]
struct Cli {
    /// Maximum number of ticks to run in batch mode
    #[arg(long, default_value = "20000")]
    ticks: u32,

    /// Time delta per tick in seconds
    #[arg(long, default_value = "0.05")]
    delta: f64,

    /// Run on the wall clock with ticker and broadcaster threads
    #[arg(long)]
    realtime: bool,

    /// Stop a realtime run after this many wall-clock seconds
    #[arg(long)]
    duration: Option<f64>,

    /// Read JSON commands from stdin instead of starting immediately (realtime only)
    #[arg(long)]
    commands: bool,

    /// Print every broadcast frame to stdout (realtime only)
    #[arg(long)]
    json: bool,

    /// Draw the road after every second's worth of ticks (batch only)
    #[arg(long)]
    map: bool,

    /// Seconds between spawn attempts
    #[arg(long, default_value = "2.0")]
    spawn_interval: f64,

    /// Minimum spawn speed in km/h
    #[arg(long, default_value = "50")]
    min_speed: f64,

    /// Maximum spawn speed in km/h
    #[arg(long, default_value = "80")]
    max_speed: f64,

    /// Total number of cars to spawn
    #[arg(long, default_value = "100")]
    max_vehicles: i64,

    /// Simulated seconds per real second
    #[arg(long, default_value = "1.0")]
    time_scale: f64,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let engine = Arc::new(match cli.seed {
        Some(seed) => SimEngine::new_with_seed(seed),
        None => SimEngine::new(),
    });
    engine.update_config(&ConfigUpdate {
        spawn_interval: cli.spawn_interval,
        min_speed: cli.min_speed,
        max_speed: cli.max_speed,
        max_cars: cli.max_vehicles,
    });
    engine.set_time_scale(cli.time_scale);

    if cli.realtime {
        run_realtime(&cli, Arc::clone(&engine))?;
    } else {
        run_headless(&cli, &engine);
    }

    print_final_stats(&engine.snapshot());
    Ok(())
}

/// Run the simulation in headless mode, as fast as possible
fn run_headless(cli: &Cli, engine: &SimEngine) {
    info!("Running highway simulation in headless mode...");
    info!("Max ticks: {}, Delta: {}s", cli.ticks, cli.delta);

    // Calculate how many ticks equal 1 second of unscaled time
    let ticks_per_second = (1.0 / cli.delta).ceil().max(1.0) as u32;

    engine.start();

    let mut tick = 0;
    while tick < cli.ticks && engine.is_running() {
        let ticks_to_run = ticks_per_second.min(cli.ticks - tick);

        for _ in 0..ticks_to_run {
            tick += 1;
            engine.tick(cli.delta);
        }

        if cli.map {
            let snapshot = engine.snapshot();
            println!("{}", snapshot.summary());
            println!("{}", snapshot.draw_road(100));
        }
    }

    if engine.is_running() {
        warn!("Tick budget of {} used up before all cars finished", cli.ticks);
        engine.stop();
    }
}

/// Run the simulation against the wall clock
fn run_realtime(cli: &Cli, engine: Arc<SimEngine>) -> Result<()> {
    let interval = Duration::try_from_secs_f64(cli.delta)
        .with_context(|| format!("Invalid tick delta: {}", cli.delta))?;
    anyhow::ensure!(!interval.is_zero(), "Tick delta must be positive");
    let shutdown = Arc::new(AtomicBool::new(false));
    let broadcaster = Arc::new(Broadcaster::new());

    let frames = broadcaster.subscribe();
    let printer = thread::Builder::new()
        .name("sim-printer".into())
        .spawn({
            let json = cli.json;
            move || print_frames(frames, json)
        })
        .context("Failed to spawn printer thread")?;

    let ticker = spawn_ticker(Arc::clone(&engine), interval, Arc::clone(&shutdown))?;
    let broadcast = spawn_broadcaster(
        Arc::clone(&engine),
        Arc::clone(&broadcaster),
        interval,
        Arc::clone(&shutdown),
    )?;

    if cli.commands {
        info!("Reading commands from stdin, e.g. {{\"action\":\"start\"}}");
        read_commands(&engine, cli.duration)?;
    } else {
        engine.start();
        wait_for_completion(&engine, cli.duration, interval);
    }

    shutdown.store(true, Ordering::Release);
    for (name, handle) in [("ticker", ticker), ("broadcaster", broadcast)] {
        if handle.join().is_err() {
            warn!("The {} thread panicked", name);
        }
    }
    // Dropping the last handle closes every subscriber channel
    drop(broadcaster);
    if printer.join().is_err() {
        warn!("The printer thread panicked");
    }

    engine.stop();
    Ok(())
}

fn wait_for_completion(engine: &SimEngine, duration: Option<f64>, poll: Duration) {
    let started = Instant::now();
    while engine.is_running() {
        if duration.is_some_and(|limit| started.elapsed().as_secs_f64() >= limit) {
            info!("Duration limit reached");
            break;
        }
        thread::sleep(poll);
    }
}

/// Apply stdin commands until stdin closes or the duration limit passes
///
/// Lines are read on their own thread so the limit holds even while stdin
/// stays silent.
fn read_commands(engine: &SimEngine, duration: Option<f64>) -> Result<()> {
    let (sender, lines) = mpsc::channel();
    thread::Builder::new()
        .name("sim-stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                if sender.send(line).is_err() {
                    break;
                }
            }
        })
        .context("Failed to spawn stdin thread")?;

    let started = Instant::now();
    let limit = duration.map(|secs| Duration::try_from_secs_f64(secs).unwrap_or_default());
    loop {
        let line = match limit {
            Some(limit) => match lines.recv_timeout(limit.saturating_sub(started.elapsed())) {
                Ok(line) => line,
                Err(RecvTimeoutError::Timeout) => {
                    info!("Duration limit reached");
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match lines.recv() {
                Ok(line) => line,
                Err(_) => break,
            },
        };
        let line = line.context("Failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        match SimCommand::parse(&line) {
            Ok(command) => command.apply(engine),
            Err(e) => warn!("{:#}", e),
        }
    }
    Ok(())
}

/// The few frame fields shown in a progress line
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrameSummary {
    time: f64,
    cars: Vec<IgnoredAny>,
    cars_completed: usize,
}

/// Print broadcast frames until the channel closes
///
/// Without `--json` only one frame per second is summarized.
fn print_frames(frames: Receiver<Frame>, json: bool) {
    let stdout = io::stdout();
    let mut last_summary = Instant::now();
    for frame in frames {
        if json {
            let mut out = stdout.lock();
            if writeln!(out, "{}", frame).is_err() {
                break;
            }
        } else if last_summary.elapsed() >= Duration::from_secs(1) {
            last_summary = Instant::now();
            match serde_json::from_str::<FrameSummary>(&frame) {
                Ok(summary) => info!(
                    "t={:.1}s cars={} completed={}",
                    summary.time,
                    summary.cars.len(),
                    summary.cars_completed
                ),
                Err(e) => warn!("Unreadable frame: {}", e),
            }
        }
    }
}

fn print_final_stats(snapshot: &SimSnapshot) {
    info!("=== SIMULATION COMPLETE ===");
    info!("Elapsed time: {:.2}s", snapshot.time);
    info!("Total cars spawned: {}", snapshot.total_cars_made);
    info!("Total cars completed: {}", snapshot.cars_completed);
    info!("Active cars: {}", snapshot.cars.len());
    info!("Total brake events: {}", snapshot.total_brake_events);
    info!(
        "Completion rate: {:.1}%",
        if snapshot.total_cars_made > 0 {
            (snapshot.cars_completed as f64 / snapshot.total_cars_made as f64) * 100.0
        } else {
            0.0
        }
    );
}
