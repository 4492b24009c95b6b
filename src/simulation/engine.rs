//! Thread-safe handle to a single simulation
//!
//! # Locking contract
//!
//! The whole [`SimWorld`] sits behind one reader/writer lock. Every mutating
//! operation (`tick`, `start`, `stop`, `reset`, `update_config`,
//! `set_time_scale`) holds the write lock for its full duration, so
//! mutations are applied one at a time in arrival order. `snapshot` and
//! `config` hold the read lock only while copying, so any number of readers
//! may run together but never alongside a mutation. A reader therefore only
//! ever sees states that existed between two complete operations.
//!
//! Nothing blocks on I/O while a lock is held. Construct one engine at
//! startup and share it as `Arc<SimEngine>`.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::config::{ConfigUpdate, SimConfig};
use super::snapshot::SimSnapshot;
use super::world::SimWorld;

pub struct SimEngine {
    world: RwLock<SimWorld>,
}

impl Default for SimEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SimEngine {
    pub fn new() -> Self {
        Self::from_world(SimWorld::new())
    }

    /// Create an engine whose spawns are reproducible
    pub fn new_with_seed(seed: u64) -> Self {
        Self::from_world(SimWorld::new_with_seed(seed))
    }

    /// Wrap an already prepared world
    pub fn from_world(world: SimWorld) -> Self {
        Self {
            world: RwLock::new(world),
        }
    }

    // Poisoning is ignored: the world stays structurally valid after a panic.
    fn read(&self) -> RwLockReadGuard<'_, SimWorld> {
        self.world.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SimWorld> {
        self.world.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn start(&self) {
        self.write().start();
    }

    pub fn stop(&self) {
        self.write().stop();
    }

    pub fn reset(&self) {
        self.write().reset();
    }

    /// Apply new spawn settings; speeds are in km/h
    pub fn update_config(&self, update: &ConfigUpdate) {
        self.write().update_config(update);
    }

    /// Store `scale` clamped to [0.1, 10.0]
    pub fn set_time_scale(&self, scale: f64) {
        self.write().set_time_scale(scale);
    }

    /// Advance the simulation by `delta_secs` of unscaled time
    pub fn tick(&self, delta_secs: f64) {
        self.write().tick(delta_secs);
    }

    pub fn snapshot(&self) -> SimSnapshot {
        self.read().snapshot()
    }

    pub fn config(&self) -> SimConfig {
        self.read().config
    }

    pub fn is_running(&self) -> bool {
        self.read().running
    }
}
