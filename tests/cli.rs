use assert_cmd::prelude::*;
use predicates::str::contains;
use std::process::Command;

fn orbit_cube() -> Command {
    Command::cargo_bin("orbit-cube").expect("binary exists")
}

#[test]
fn headless_widen_grows_radius() {
    let mut cmd = orbit_cube();
    cmd.args([
        "--headless",
        "--frames",
        "10",
        "--frame-time",
        "0.1",
        "--hold",
        "widen",
    ]);
    cmd.assert()
        .success()
        .stdout(contains("Simulated 10 frame(s) at 0.100s per frame"))
        .stdout(contains("Final camera: radius=7.70 height=0.00"));
}

#[test]
fn headless_reset_overrides_other_controls() {
    let mut cmd = orbit_cube();
    cmd.args([
        "--headless",
        "--frames",
        "4",
        "--frame-time",
        "0.5",
        "--hold",
        "raise,narrow,reset",
    ]);
    cmd.assert()
        .success()
        .stdout(contains("Final camera: radius=5.00 height=0.00"));
}

#[test]
fn headless_without_input_stays_at_start() {
    let mut cmd = orbit_cube();
    cmd.args(["--headless", "--frames", "1"]);
    cmd.assert().success().stdout(contains(
        "Final camera: radius=5.00 height=0.00 position=(5.00, 0.00, 0.00)",
    ));
}

#[test]
fn rebinding_changes_which_key_drives_a_control() {
    let mut cmd = orbit_cube();
    cmd.args([
        "--headless",
        "--bind",
        "raise=W",
        "--hold",
        "raise",
        "--frames",
        "3",
        "--frame-time",
        "0.5",
    ]);
    cmd.assert()
        .success()
        .stdout(contains("radius=5.00 height=3.00"));
}

#[test]
fn unknown_argument_is_rejected() {
    let mut cmd = orbit_cube();
    cmd.arg("--spin");
    cmd.assert()
        .failure()
        .stderr(contains("Unknown argument: --spin"));
}

#[test]
fn unknown_control_is_rejected() {
    let mut cmd = orbit_cube();
    cmd.args(["--headless", "--hold", "spin"]);
    cmd.assert()
        .failure()
        .stderr(contains("unknown control `spin`"));
}

#[test]
fn negative_frame_time_is_rejected() {
    let mut cmd = orbit_cube();
    cmd.args(["--headless", "--frame-time", "-1"]);
    cmd.assert()
        .failure()
        .stderr(contains("frame time must be a non-negative number"));
}

#[test]
fn help_lists_usage() {
    let mut cmd = orbit_cube();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(contains("Usage: orbit-cube"));
}
