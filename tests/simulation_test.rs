use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn run_headless(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_highway_sim"))
        .args(args)
        .env("RUST_LOG", "warn,highway_sim=info")
        .output()
        .expect("Failed to execute simulation")
}

fn stat_value<'a>(stderr: &'a str, label: &str) -> &'a str {
    let line = stderr
        .lines()
        .find(|line| line.contains(label))
        .unwrap_or_else(|| panic!("Could not find '{}' line", label));
    line.split(label)
        .nth(1)
        .map(str::trim)
        .unwrap_or_else(|| panic!("Could not parse line: {}", line))
}

/// Test that the simulation runs in headless mode without crashing
#[test]
fn test_headless_simulation_runs() {
    let output = run_headless(&["--max-vehicles", "3", "--time-scale", "10", "--seed", "7"]);

    assert!(
        output.status.success(),
        "Simulation failed to run in headless mode. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("SIMULATION COMPLETE"),
        "Simulation did not complete properly. stderr: {}",
        stderr
    );
}

/// Test that every spawned car reaches the end of the road
#[test]
fn test_all_cars_complete() {
    let output = run_headless(&[
        "--max-vehicles",
        "5",
        "--spawn-interval",
        "1.0",
        "--time-scale",
        "10",
        "--seed",
        "21",
    ]);
    assert!(output.status.success(), "Simulation failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stat_value(&stderr, "Total cars spawned:"), "5");
    assert_eq!(stat_value(&stderr, "Total cars completed:"), "5");
    assert_eq!(stat_value(&stderr, "Active cars:"), "0");
    assert_eq!(stat_value(&stderr, "Completion rate:"), "100.0%");
}

/// Test that the tick budget stops an unfinished run
#[test]
fn test_tick_budget_stops_run() {
    let output = run_headless(&["--ticks", "100", "--seed", "1"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Tick budget of 100 used up"));
    assert_eq!(stat_value(&stderr, "Total cars completed:"), "0");
}

/// Test that the road map is drawn when requested
#[test]
fn test_map_output() {
    let output = run_headless(&["--ticks", "200", "--map", "--seed", "1"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|line| line.starts_with('|') && line.ends_with('|')));
    assert!(stdout.contains("Completed:"));
}

/// Test that the duration limit ends a command session even if stdin stays silent
#[test]
fn test_duration_limit_with_idle_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_highway_sim"))
        .args(["--realtime", "--commands", "--duration", "0.5"])
        .env("RUST_LOG", "warn,highway_sim=info")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute simulation");
    // Held open and never written to
    let _stdin = child.stdin.take();

    let started = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait().expect("Failed to poll simulation") {
            break status;
        }
        if started.elapsed() > Duration::from_secs(15) {
            child.kill().ok();
            panic!("Simulation ignored the duration limit");
        }
        thread::sleep(Duration::from_millis(50));
    };
    assert!(status.success());

    let output = child.wait_with_output().expect("Failed to collect output");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Duration limit reached"), "stderr: {}", stderr);
    assert!(stderr.contains("SIMULATION COMPLETE"));
}

/// Test that a realtime run logs progress lines read from broadcast frames
#[test]
fn test_realtime_progress_lines() {
    let output = Command::new(env!("CARGO_BIN_EXE_highway_sim"))
        .args(["--realtime", "--duration", "2.5", "--time-scale", "10", "--seed", "3"])
        .env("RUST_LOG", "warn,highway_sim=info")
        .output()
        .expect("Failed to execute simulation");
    assert!(output.status.success(), "Simulation failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr
            .lines()
            .any(|line| line.contains("t=") && line.contains("cars=") && line.contains("completed=")),
        "no progress line in stderr: {}",
        stderr
    );
    assert!(!stderr.contains("Unreadable frame"));
}
