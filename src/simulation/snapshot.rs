//! Owned, serializable copy of the simulation state
//!
//! This is what observers receive. It never borrows from the world, so it
//! can be serialized and sent around after the read lock is released.

use serde::Serialize;

use super::car::SimCar;
use super::types::{CarState, ROAD_LENGTH};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimSnapshot {
    pub cars: Vec<SimCar>,
    /// Simulated seconds since the run started
    pub time: f64,
    pub cars_completed: usize,
    pub total_cars_made: usize,
    /// Braking episodes counted this run, including completed cars
    pub total_brake_events: u64,
    pub running: bool,
    pub road_length: f64,
    pub time_scale: f64,
    pub max_cars: usize,
}

impl SimSnapshot {
    pub fn average_speed(&self) -> f64 {
        if self.cars.is_empty() {
            return 0.0;
        }
        self.cars.iter().map(|car| car.speed).sum::<f64>() / self.cars.len() as f64
    }

    /// Get a summary string for display
    pub fn summary(&self) -> String {
        format!(
            "Time: {:.1}s | Cars: {} | Completed: {}/{} | Avg speed: {:.1} km/h | Scale: {:.1}x | {}",
            self.time,
            self.cars.len(),
            self.cars_completed,
            self.total_cars_made,
            super::types::ms_to_kmh(self.average_speed()),
            self.time_scale,
            if self.running { "running" } else { "stopped" }
        )
    }

    /// Render the road as a single line of `width` cells
    ///
    /// Each cell shows the most urgent state of the cars inside it:
    /// `B` braking, `A` accelerating, `o` cruising, `.` empty.
    pub fn draw_road(&self, width: usize) -> String {
        let width = width.max(1);
        let mut cells = vec!['.'; width];

        for car in &self.cars {
            let ratio = (car.position / ROAD_LENGTH).clamp(0.0, 1.0);
            let index = ((ratio * width as f64) as usize).min(width - 1);
            let symbol = match car.state {
                CarState::Braking => 'B',
                CarState::Accelerating => 'A',
                CarState::Normal => 'o',
            };
            let cell = &mut cells[index];
            if cell_priority(symbol) > cell_priority(*cell) {
                *cell = symbol;
            }
        }

        let mut road = String::with_capacity(width + 2);
        road.push('|');
        road.extend(cells);
        road.push('|');
        road
    }
}

fn cell_priority(symbol: char) -> u8 {
    match symbol {
        'B' => 3,
        'A' => 2,
        'o' => 1,
        _ => 0,
    }
}
