//! Integration Test: Scheduler Core Purity
//!
//! **Policy**: `eye/core` is driven entirely by its caller. It must not read a
//! clock, sleep, write to the terminal, or panic on `unwrap`/`expect` outside
//! test code. Time arrives as `tick(delta_ms)`; output leaves as frames and
//! `tracing` events.

use std::fs;

use architectural_enforcement::{assert_clean, scan, workspace_root};

const CORE_SRC: &str = "eye/core/src";

#[test]
fn test_no_sleep_in_core() {
    let violations = scan(CORE_SRC, &["::sleep(", ".sleep("]);
    assert_clean("Core must not sleep; the caller owns pacing", &violations);
}

#[test]
fn test_no_wall_clock_in_core() {
    let violations = scan(CORE_SRC, &["Instant::now", "SystemTime::now"]);
    assert_clean(
        "Core must not read the clock; time arrives via tick()",
        &violations,
    );
}

#[test]
fn test_no_terminal_output_in_core() {
    let violations = scan(CORE_SRC, &["println!(", "print!(", "eprintln!(", "dbg!("]);
    assert_clean(
        "Core must log through tracing, not stdout/stderr",
        &violations,
    );
}

#[test]
fn test_no_unwrap_in_core() {
    let violations = scan(CORE_SRC, &[".unwrap()", ".expect("]);
    assert_clean("Core must propagate or substitute, not unwrap", &violations);
}

#[test]
fn test_core_has_no_runtime_or_ui_dependencies() {
    let manifest = fs::read_to_string(workspace_root().join("eye/core/Cargo.toml"))
        .expect("core manifest readable");

    for forbidden in ["tokio", "ratatui", "crossterm", "clap"] {
        assert!(
            !manifest
                .lines()
                .any(|line| line.trim_start().starts_with(forbidden)),
            "eye/core must stay headless, found dependency on {forbidden}"
        );
    }
}
