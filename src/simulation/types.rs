//! Core types and model constants for the traffic simulation

use serde::Serialize;

/// A wrapper type for car IDs
///
/// Assigned in spawn order and never reused within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CarId(pub usize);

/// What a car did during its last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CarState {
    #[default]
    Normal,
    Braking,
    Accelerating,
}

/// Length of the road in meters
pub const ROAD_LENGTH: f64 = 5000.0;

/// Length of a car in meters
pub const CAR_LENGTH: f64 = 4.5;

/// Seconds a braking car holds its speed before it may brake again
pub const REACTION_TIME: f64 = 0.2;

/// Safe following distance multiplier
pub const SAFETY_MULTIPLIER: f64 = 3.0;

/// Braking deceleration in m/s² (roughly 15 mph per second)
pub const BRAKE_DECELERATION: f64 = 6.67;

/// Acceleration toward target speed in m/s²
pub const ACCELERATION: f64 = 2.0;

/// Minimum simulated seconds between two counted braking episodes
pub const BRAKE_DEBOUNCE: f64 = 1.0;

/// A car closer than this to the start of the road blocks spawning
pub const SPAWN_CLEARANCE: f64 = 50.0;

/// Time-scale bounds
pub const MIN_TIME_SCALE: f64 = 0.1;
pub const MAX_TIME_SCALE: f64 = 10.0;

/// Display colors handed out at spawn
pub const CAR_COLORS: [&str; 8] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#FFA07A", "#98D8C8", "#F7DC6F", "#BB8FCE", "#85C1E2",
];

/// Convert km/h to m/s
pub fn kmh_to_ms(kmh: f64) -> f64 {
    kmh / 3.6
}

/// Convert m/s to km/h
pub fn ms_to_kmh(ms: f64) -> f64 {
    ms * 3.6
}
