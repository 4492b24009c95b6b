//! Car-following behavior model
//!
//! Pure functions over explicit inputs. Nothing here touches shared state,
//! so every decision can be checked in isolation from the world.

use ordered_float::OrderedFloat;

use super::car::SimCar;
use super::types::{
    CarState, ACCELERATION, BRAKE_DEBOUNCE, BRAKE_DECELERATION, CAR_LENGTH, REACTION_TIME,
    SAFETY_MULTIPLIER,
};

/// Position and speed of a car as seen at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeadCar {
    pub position: f64,
    pub speed: f64,
}

/// Outcome of the per-tick decision for one car
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub speed: f64,
    pub state: CarState,
    /// A new braking episode was counted at this tick's time
    pub brake_registered: bool,
}

/// Minimum gap to keep from the car ahead given the speed difference (m/s)
///
/// One foot of spacing per mph of difference, scaled by the safety
/// multiplier. Never below two car lengths.
pub fn safe_following_distance(speed_diff: f64) -> f64 {
    let speed_diff_kmh = super::types::ms_to_kmh(speed_diff.abs());
    let safe_distance = (speed_diff_kmh / 1.6) * 0.3 * SAFETY_MULTIPLIER;
    safe_distance.max(CAR_LENGTH * 2.0)
}

/// Find the nearest car strictly ahead of `cars[index]`
///
/// Linear scan over every other car, so a full tick is O(n²). Fine for the
/// tens of cars a single road holds.
pub fn find_lead(cars: &[LeadCar], index: usize) -> Option<LeadCar> {
    let own = cars.get(index)?;

    cars.iter()
        .enumerate()
        .filter(|(j, other)| *j != index && other.position > own.position)
        .min_by_key(|(_, other)| OrderedFloat(other.position - own.position))
        .map(|(_, other)| *other)
}

/// Decide the car's speed and state for this tick
///
/// `now` is the simulated clock after this tick's advance and `delta_secs`
/// the already scaled tick length.
pub fn decide(car: &SimCar, lead: Option<LeadCar>, now: f64, delta_secs: f64) -> Decision {
    if let Some(lead) = lead {
        let gap = lead.position - car.position - CAR_LENGTH;
        let safe_distance = safe_following_distance(car.speed - lead.speed);

        if gap < safe_distance {
            return brake(car, now, delta_secs);
        }
    }

    cruise(car, delta_secs)
}

fn brake(car: &SimCar, now: f64, delta_secs: f64) -> Decision {
    let since_last_brake = car.last_brake_time.map(|last| now - last);

    // Already braking and inside the reaction window: hold speed
    let reacting = car.state == CarState::Braking
        && since_last_brake.is_some_and(|elapsed| elapsed <= REACTION_TIME);
    if reacting {
        return Decision {
            speed: car.speed,
            state: CarState::Braking,
            brake_registered: false,
        };
    }

    Decision {
        speed: (car.speed - BRAKE_DECELERATION * delta_secs).max(0.0),
        state: CarState::Braking,
        brake_registered: since_last_brake.map_or(true, |elapsed| elapsed > BRAKE_DEBOUNCE),
    }
}

fn cruise(car: &SimCar, delta_secs: f64) -> Decision {
    if car.speed < car.target_speed {
        Decision {
            speed: car.target_speed.min(car.speed + ACCELERATION * delta_secs),
            state: CarState::Accelerating,
            brake_registered: false,
        }
    } else {
        Decision {
            speed: car.speed,
            state: CarState::Normal,
            brake_registered: false,
        }
    }
}
