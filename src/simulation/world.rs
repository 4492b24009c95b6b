//! Main simulation world that ties everything together
//!
//! `SimWorld` is the plain, single-owner state: every operation takes
//! `&mut self` and runs to completion. Sharing it between threads is the
//! job of [`super::engine::SimEngine`].

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;
use rand::SeedableRng;

use super::behavior::{find_lead, LeadCar};
use super::car::{CarUpdateResult, SimCar};
use super::config::{ConfigUpdate, SimConfig};
use super::snapshot::SimSnapshot;
use super::types::{CarId, CAR_COLORS, CAR_LENGTH, ROAD_LENGTH, SPAWN_CLEARANCE};

/// The main simulation world
pub struct SimWorld {
    /// Cars on the road, in spawn order
    pub cars: Vec<SimCar>,

    /// Simulated seconds, advanced only by `tick`
    pub time: f64,

    /// Cars that reached the end of the road
    pub cars_completed: usize,

    /// Cars spawned this run, including completed ones
    pub total_cars_made: usize,

    /// Braking episodes counted this run, including completed cars
    pub total_brake_events: u64,

    /// Whether `tick` has any effect
    pub running: bool,

    pub config: SimConfig,

    /// Simulated time of the last successful spawn
    last_spawn: f64,

    /// Next ID to assign
    next_id: usize,

    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    fn new_internal(rng: Option<StdRng>) -> Self {
        Self {
            cars: Vec::new(),
            time: 0.0,
            cars_completed: 0,
            total_cars_made: 0,
            total_brake_events: 0,
            running: false,
            config: SimConfig::default(),
            last_spawn: 0.0,
            next_id: 0,
            rng,
        }
    }

    pub fn new() -> Self {
        Self::new_internal(None)
    }

    /// Create a new SimWorld with a seeded RNG for reproducible simulations
    pub fn new_with_seed(seed: u64) -> Self {
        Self::new_internal(Some(StdRng::seed_from_u64(seed)))
    }

    /// Uniform value in [0, 1), using seeded RNG if available
    fn random_unit(&mut self) -> f64 {
        match &mut self.rng {
            Some(rng) => rng.random::<f64>(),
            None => rand::rng().random::<f64>(),
        }
    }

    /// Choose a random element from a slice, using seeded RNG if available
    fn choose_random<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        match &mut self.rng {
            Some(rng) => slice.choose(rng),
            None => slice.choose(&mut rand::rng()),
        }
    }

    fn next_car_id(&mut self) -> CarId {
        let id = CarId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn start(&mut self) {
        if !self.running {
            info!("Simulation started at {:.2}s", self.time);
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            info!("Simulation stopped at {:.2}s", self.time);
        }
        self.running = false;
    }

    /// Clear the road and all counters and stop. Configuration is kept.
    pub fn reset(&mut self) {
        self.cars.clear();
        self.time = 0.0;
        self.cars_completed = 0;
        self.total_cars_made = 0;
        self.total_brake_events = 0;
        self.running = false;
        self.last_spawn = 0.0;
        self.next_id = 0;
        info!("Simulation reset");
    }

    pub fn update_config(&mut self, update: &ConfigUpdate) {
        self.config.apply(update);
        info!(
            "Config updated: spawn every {:.2}s, speed {:.0}-{:.0} km/h, max {} cars",
            self.config.spawn_interval,
            self.config.min_speed_kmh(),
            self.config.max_speed_kmh(),
            self.config.max_cars
        );
    }

    pub fn set_time_scale(&mut self, scale: f64) {
        self.config.set_time_scale(scale);
        info!("Time scale set to {:.2}x", self.config.time_scale);
    }

    /// Place a car at an explicit position and speed, bypassing the spawn gate
    ///
    /// Counts toward `total_cars_made`. Used to set up scenarios. The
    /// position is kept on the road, at most one car length short of its
    /// end, and negative or NaN speeds become zero.
    pub fn insert_car(&mut self, position: f64, speed: f64, target_speed: f64) -> CarId {
        let id = self.next_car_id();
        let color = self.random_color();
        let mut car = SimCar::new(id, speed.max(0.0), color);
        car.position = position.max(0.0).min(ROAD_LENGTH - CAR_LENGTH);
        car.target_speed = target_speed.max(0.0);
        self.cars.push(car);
        self.total_cars_made += 1;
        id
    }

    fn random_color(&mut self) -> &'static str {
        self.choose_random(&CAR_COLORS)
            .copied()
            .unwrap_or(CAR_COLORS[0])
    }

    fn random_speed(&mut self) -> f64 {
        let (min, max) = (self.config.min_speed, self.config.max_speed);
        min + self.random_unit() * (max - min)
    }

    /// Whether a spawn may happen at the current time
    fn spawn_allowed(&self) -> bool {
        self.time - self.last_spawn >= self.config.spawn_interval
            && self.total_cars_made < self.config.max_cars
            && self.cars.iter().all(|car| car.position >= SPAWN_CLEARANCE)
    }

    fn spawn_car(&mut self) {
        let speed = self.random_speed();
        let color = self.random_color();
        let id = self.next_car_id();
        self.cars.push(SimCar::new(id, speed, color));
        self.total_cars_made += 1;
        self.last_spawn = self.time;
        debug!("Spawned car {} at {:.2}s, speed {:.2} m/s", id.0, self.time, speed);
    }

    /// Update all cars against one consistent view of the road
    ///
    /// Lead cars are looked up in positions taken before anything moved,
    /// so the result does not depend on iteration order.
    fn update_cars(&mut self, delta_secs: f64) -> Vec<CarUpdateResult> {
        let view: Vec<LeadCar> = self.cars.iter().map(SimCar::as_lead).collect();
        let now = self.time;
        let mut brake_events = 0;

        let results = self
            .cars
            .iter_mut()
            .enumerate()
            .map(|(index, car)| {
                let lead = find_lead(&view, index);
                let brakes_before = car.brake_count;
                let result = car.update(lead, now, delta_secs);
                brake_events += u64::from(car.brake_count - brakes_before);
                result
            })
            .collect();

        self.total_brake_events += brake_events;
        results
    }

    /// Main simulation tick
    ///
    /// Does nothing while stopped or when `delta_secs` is not a positive
    /// finite number, so the clock never runs backwards.
    pub fn tick(&mut self, delta_secs: f64) {
        if !self.running || !delta_secs.is_finite() || delta_secs <= 0.0 {
            return;
        }

        let delta_secs = delta_secs * self.config.time_scale;
        self.time += delta_secs;

        if self.spawn_allowed() {
            self.spawn_car();
        }

        let results = self.update_cars(delta_secs);

        // Remove cars that reached the end of the road
        let before = self.cars.len();
        let mut results = results.into_iter();
        self.cars
            .retain(|_| results.next() != Some(CarUpdateResult::Finished));
        let finished = before - self.cars.len();
        if finished > 0 {
            self.cars_completed += finished;
            debug!(
                "{} car(s) finished at {:.2}s, {} completed",
                finished, self.time, self.cars_completed
            );
        }

        if self.total_cars_made >= self.config.max_cars && self.cars.is_empty() {
            self.running = false;
            info!(
                "All {} cars completed the road at {:.2}s, stopping",
                self.cars_completed, self.time
            );
        }
    }

    /// Copy out everything observers need
    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot {
            cars: self.cars.clone(),
            time: self.time,
            cars_completed: self.cars_completed,
            total_cars_made: self.total_cars_made,
            total_brake_events: self.total_brake_events,
            running: self.running,
            road_length: ROAD_LENGTH,
            time_scale: self.config.time_scale,
            max_cars: self.config.max_cars,
        }
    }
}
