use std::{fs, path::Path, process::Command};

use tempfile::TempDir;

const CORRIDOR: &str = "5 1 1 1 E 0\nW 3 1 E\nB 2 1 2\n";

fn write(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("fixture written");
    path.display().to_string()
}

fn karel(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_karel"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to launch karel binary")
}

#[test]
fn summary_run_reports_error_shutoff_with_exit_code_one() {
    let dir = TempDir::new().expect("temporary directory");
    let world = write(&dir, "corridor.kw", CORRIDOR);
    let program = write(&dir, "walk.kp", "repeat 3 { step }\n");

    let output = karel(&["run", &world, &program, "--summary"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error Shutoff! (Can't move this way)"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("outcome: error_shutoff\n"));
    assert!(!stdout.contains("ST."));
}

#[test]
fn completed_run_prints_json_report() {
    let dir = TempDir::new().expect("temporary directory");
    let world = write(&dir, "corridor.kw", CORRIDOR);
    let program = write(
        &dir,
        "collect.kp",
        "step\nwhile markers_present { pick_marker }\n",
    );

    let output = karel(&[
        "run",
        &world,
        &program,
        "--step-delay",
        "0",
        "--report",
        "json",
    ]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ST."));
    let report_start = stdout.find("{\n").expect("json report present");
    let report: serde_json::Value =
        serde_json::from_str(&stdout[report_start..]).expect("valid json report");
    assert_eq!(report["outcome"], "completed");
    assert_eq!(report["agent"]["markers_in_bag"], 2);
    assert_eq!(report["agent"]["last_command"], "power_off");
    assert_eq!(report["agent"]["state"], "halted");
}

#[test]
fn endless_program_exits_with_code_two() {
    let dir = TempDir::new().expect("temporary directory");
    let world = write(&dir, "corridor.kw", CORRIDOR);
    let program = write(&dir, "spin.kp", "while front_is_clear { turn_left turn_right }\n");
    let config = write(&dir, "karel.toml", "summary = true\nfuel = 40\n");

    let output = karel(&["run", &world, &program, "--config", &config]);

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("outcome: out_of_fuel\nexecuted: 40\n"));
}

#[test]
fn malformed_program_fails_before_running() {
    let dir = TempDir::new().expect("temporary directory");
    let world = write(&dir, "corridor.kw", CORRIDOR);
    let program = write(&dir, "broken.kp", "repeat { step }\n");

    let output = karel(&["run", &world, &program, "--summary"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to parse program"));
    assert!(output.stdout.is_empty());
}

#[test]
fn generate_mazes_writes_every_variant() {
    let dir = TempDir::new().expect("temporary directory");
    let template = write(&dir, "maze.tpl", "6 6 {ave} {st} N 0");
    let out_dir = dir.path().join("mazes");

    let output = karel(&[
        "generate-mazes",
        &template,
        &out_dir.display().to_string(),
    ]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(fs::read_dir(&out_dir).expect("output directory").count(), 36);
    let first = fs::read_to_string(Path::new(&out_dir).join("maze007.kw")).expect("first maze");
    assert_eq!(first, "6 6 1 1 N 0\n");
}
