//! Highway Traffic Simulation Library
//!
//! One-dimensional car-following simulation on a single road, with a
//! thread-safe engine that a clock mutates while observers take snapshots.

pub mod driver;
pub mod simulation;
