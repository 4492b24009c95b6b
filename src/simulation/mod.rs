//! Standalone traffic simulation module
//!
//! This module contains the car-following model and the simulation state
//! machine. It has no I/O and can be driven from tests, the headless CLI,
//! or any server that shares a [`SimEngine`].

pub mod behavior;
mod car;
mod config;
mod engine;
mod snapshot;
mod types;
mod world;

pub use behavior::{decide, find_lead, safe_following_distance, Decision, LeadCar};
pub use car::{CarUpdateResult, SimCar};
pub use config::{clamp_time_scale, ConfigUpdate, SimConfig};
pub use engine::SimEngine;
pub use snapshot::SimSnapshot;
pub use types::{
    kmh_to_ms, ms_to_kmh, CarId, CarState, ACCELERATION, BRAKE_DEBOUNCE, BRAKE_DECELERATION,
    CAR_COLORS, CAR_LENGTH, MAX_TIME_SCALE, MIN_TIME_SCALE, REACTION_TIME, ROAD_LENGTH,
    SAFETY_MULTIPLIER, SPAWN_CLEARANCE,
};
pub use world::SimWorld;
