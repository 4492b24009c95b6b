//! Runtime-adjustable simulation settings

use serde::{Deserialize, Serialize};

use super::types::{kmh_to_ms, ms_to_kmh, MAX_TIME_SCALE, MIN_TIME_SCALE};

/// Spawn and clock settings, in internal units (seconds, m/s)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimConfig {
    /// Simulated seconds between spawn attempts
    pub spawn_interval: f64,
    /// Lower bound for spawn speed (m/s)
    pub min_speed: f64,
    /// Upper bound for spawn speed (m/s)
    pub max_speed: f64,
    /// Total cars to ever spawn in a run
    pub max_cars: usize,
    /// Multiplier applied to every tick's delta
    pub time_scale: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            spawn_interval: 2.0,
            min_speed: kmh_to_ms(50.0),
            max_speed: kmh_to_ms(80.0),
            max_cars: 100,
            time_scale: 1.0,
        }
    }
}

impl SimConfig {
    /// Apply an update given in external units
    ///
    /// A non-positive `max_cars` or a non-finite number is ignored and the
    /// prior value kept. Negative speeds are raised to zero and the bounds
    /// are swapped if they arrive out of order.
    pub fn apply(&mut self, update: &ConfigUpdate) {
        if update.spawn_interval.is_finite() {
            self.spawn_interval = update.spawn_interval;
        }
        self.min_speed = speed_bound(update.min_speed, self.min_speed);
        self.max_speed = speed_bound(update.max_speed, self.max_speed);
        if self.min_speed > self.max_speed {
            std::mem::swap(&mut self.min_speed, &mut self.max_speed);
        }
        if update.max_cars > 0 {
            self.max_cars = usize::try_from(update.max_cars).unwrap_or(usize::MAX);
        }
    }

    pub fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = clamp_time_scale(scale);
    }

    pub fn min_speed_kmh(&self) -> f64 {
        ms_to_kmh(self.min_speed)
    }

    pub fn max_speed_kmh(&self) -> f64 {
        ms_to_kmh(self.max_speed)
    }
}

/// A configuration change as it arrives from outside, speeds in km/h
///
/// Missing fields decode as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigUpdate {
    pub spawn_interval: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    pub max_cars: i64,
}

/// Convert a km/h bound to m/s, keeping `prior` when it is not a number
fn speed_bound(kmh: f64, prior: f64) -> f64 {
    if kmh.is_finite() {
        kmh_to_ms(kmh).max(0.0)
    } else {
        prior
    }
}

/// Clamp a time-scale factor into the supported range
///
/// NaN falls back to normal speed.
pub fn clamp_time_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(MIN_TIME_SCALE, MAX_TIME_SCALE)
}
