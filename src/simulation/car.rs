//! Car state and per-tick movement for the traffic simulation

use serde::Serialize;

use super::behavior::{self, LeadCar};
use super::types::{CarId, CarState, ROAD_LENGTH};

/// Result of a car update indicating what action should be taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarUpdateResult {
    Continue, // Car is still on the road
    Finished, // Car reached the end of the road and should be removed
}

/// A car on the road
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimCar {
    pub id: CarId,
    /// Meters from the start of the road
    pub position: f64,
    /// Current speed in m/s
    pub speed: f64,
    /// Cruising speed in m/s, fixed at spawn
    pub target_speed: f64,
    /// Number of distinct braking episodes
    pub brake_count: u32,
    pub color: &'static str,
    pub state: CarState,
    /// Simulated time of the last counted braking episode
    #[serde(skip)]
    pub last_brake_time: Option<f64>,
}

impl SimCar {
    pub fn new(id: CarId, speed: f64, color: &'static str) -> Self {
        Self {
            id,
            position: 0.0,
            speed,
            target_speed: speed,
            brake_count: 0,
            color,
            state: CarState::Normal,
            last_brake_time: None,
        }
    }

    /// The view other cars get of this one when searching for a lead car
    pub fn as_lead(&self) -> LeadCar {
        LeadCar {
            position: self.position,
            speed: self.speed,
        }
    }

    /// Apply the behavior model for one tick and move the car
    ///
    /// `lead` must come from positions taken before any car moved this tick.
    pub fn update(&mut self, lead: Option<LeadCar>, now: f64, delta_secs: f64) -> CarUpdateResult {
        let decision = behavior::decide(self, lead, now, delta_secs);

        self.speed = decision.speed;
        self.state = decision.state;
        if decision.brake_registered {
            self.brake_count += 1;
            self.last_brake_time = Some(now);
        }

        self.position += self.speed * delta_secs;

        if self.position >= ROAD_LENGTH {
            CarUpdateResult::Finished
        } else {
            CarUpdateResult::Continue
        }
    }
}
