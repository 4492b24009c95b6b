//! Shared-engine behavior under concurrent ticks, commands and snapshots

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use highway_sim::driver::{spawn_broadcaster, spawn_ticker, Broadcaster};
use highway_sim::simulation::{ConfigUpdate, SimEngine, ROAD_LENGTH};

fn busy_engine() -> Arc<SimEngine> {
    let engine = SimEngine::new_with_seed(77);
    engine.update_config(&ConfigUpdate {
        spawn_interval: 0.5,
        min_speed: 60.0,
        max_speed: 130.0,
        max_cars: 30,
    });
    engine.set_time_scale(10.0);
    engine.start();
    Arc::new(engine)
}

#[test]
fn test_snapshots_never_see_partial_ticks() {
    let engine = busy_engine();
    let done = Arc::new(AtomicBool::new(false));

    let ticker = {
        let engine = Arc::clone(&engine);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for _ in 0..3000 {
                engine.tick(0.05);
            }
            done.store(true, Ordering::Release);
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut last_time = 0.0;
                let mut observed = 0;
                while !done.load(Ordering::Acquire) {
                    let snapshot = engine.snapshot();
                    assert_eq!(
                        snapshot.cars.len() + snapshot.cars_completed,
                        snapshot.total_cars_made
                    );
                    assert!(snapshot.time >= last_time);
                    assert!(snapshot
                        .cars
                        .iter()
                        .all(|car| car.position >= 0.0 && car.position < ROAD_LENGTH));
                    last_time = snapshot.time;
                    observed += 1;
                }
                observed
            })
        })
        .collect();

    ticker.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    let snapshot = engine.snapshot();
    assert_eq!(
        snapshot.cars.len() + snapshot.cars_completed,
        snapshot.total_cars_made
    );
    assert!(snapshot.total_cars_made > 0);
}

#[test]
fn test_commands_interleave_with_ticks() {
    let engine = busy_engine();
    let done = Arc::new(AtomicBool::new(false));

    let ticker = {
        let engine = Arc::clone(&engine);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for _ in 0..2000 {
                engine.tick(0.05);
            }
            done.store(true, Ordering::Release);
        })
    };

    let controller = {
        let engine = Arc::clone(&engine);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut scale = 0.0;
            while !done.load(Ordering::Acquire) {
                scale = (scale + 0.7) % 12.0;
                engine.set_time_scale(scale);
                engine.update_config(&ConfigUpdate {
                    spawn_interval: 0.5,
                    min_speed: 60.0,
                    max_speed: 130.0,
                    max_cars: 0,
                });
                let config = engine.config();
                assert!(config.time_scale >= 0.1 && config.time_scale <= 10.0);
                assert_eq!(config.max_cars, 30);
            }
        })
    };

    ticker.join().unwrap();
    controller.join().unwrap();

    let snapshot = engine.snapshot();
    assert!(snapshot.total_cars_made <= 30);
    assert_eq!(
        snapshot.cars.len() + snapshot.cars_completed,
        snapshot.total_cars_made
    );
}

#[test]
fn test_ticker_and_broadcaster_stream_frames() {
    let engine = busy_engine();
    let broadcaster = Arc::new(Broadcaster::new());
    let shutdown = Arc::new(AtomicBool::new(false));
    let frames = broadcaster.subscribe();

    let interval = Duration::from_millis(5);
    let ticker = spawn_ticker(Arc::clone(&engine), interval, Arc::clone(&shutdown)).unwrap();
    let broadcast = spawn_broadcaster(
        Arc::clone(&engine),
        Arc::clone(&broadcaster),
        interval,
        Arc::clone(&shutdown),
    )
    .unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut latest_time = 0.0;
    while latest_time <= 0.0 && Instant::now() < deadline {
        let frame = frames
            .recv_timeout(Duration::from_secs(1))
            .expect("broadcaster stopped sending");
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["roadLength"], ROAD_LENGTH);
        latest_time = value["time"].as_f64().unwrap();
    }
    assert!(latest_time > 0.0, "clock never advanced");

    shutdown.store(true, Ordering::Release);
    ticker.join().unwrap();
    broadcast.join().unwrap();

    // The clock stands still once the ticker is gone
    let frozen = engine.snapshot().time;
    thread::sleep(Duration::from_millis(20));
    assert_eq!(engine.snapshot().time, frozen);
}
