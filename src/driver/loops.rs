//! Fixed-interval background loops driving the engine
//!
//! Both loops run on their own thread until `shutdown` is raised. Missed
//! deadlines are skipped rather than replayed, like a wall-clock ticker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{error, info};

use super::broadcast::{encode_snapshot, Broadcaster};
use crate::simulation::SimEngine;

/// Call `step` every `interval` until `shutdown` is set
fn run_every(interval: Duration, shutdown: &AtomicBool, mut step: impl FnMut()) {
    let mut next = Instant::now() + interval;
    while !shutdown.load(Ordering::Acquire) {
        let now = Instant::now();
        if now < next {
            thread::sleep(next - now);
            continue;
        }
        step();
        next += interval;
        if next < now {
            next = now + interval;
        }
    }
}

/// Spawn the simulation clock
///
/// Each tick advances the engine by exactly `interval`, regardless of how
/// late the thread woke up.
pub fn spawn_ticker(
    engine: Arc<SimEngine>,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
) -> Result<JoinHandle<()>> {
    let delta_secs = interval.as_secs_f64();
    thread::Builder::new()
        .name("sim-ticker".into())
        .spawn(move || {
            info!("Ticker running every {}ms", interval.as_millis());
            run_every(interval, &shutdown, || engine.tick(delta_secs));
            info!("Ticker stopped");
        })
        .context("Failed to spawn ticker thread")
}

/// Spawn the loop that snapshots the engine and publishes the frames
pub fn spawn_broadcaster(
    engine: Arc<SimEngine>,
    broadcaster: Arc<Broadcaster>,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("sim-broadcast".into())
        .spawn(move || {
            info!("Broadcaster running every {}ms", interval.as_millis());
            run_every(interval, &shutdown, || {
                let snapshot = engine.snapshot();
                match encode_snapshot(&snapshot) {
                    Ok(frame) => {
                        broadcaster.publish(frame);
                    }
                    Err(e) => error!("{:#}", e),
                }
            });
            info!("Broadcaster stopped");
        })
        .context("Failed to spawn broadcast thread")
}
