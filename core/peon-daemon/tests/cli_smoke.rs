use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const SESSION: &str = "8f14e45f-ceea-467f-a0e6-0123456789ab";

fn peon_pet(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_peon-pet"))
        .env("HOME", home)
        .env_remove("RUST_LOG")
        .env_remove("PEON_DEBUG_LOG")
        .args(args)
        .output()
        .expect("Failed to spawn peon-pet")
}

fn json_lines(output: &Output) -> Vec<Value> {
    String::from_utf8(output.stdout.clone())
        .expect("stdout was not UTF-8")
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line was not JSON"))
        .collect()
}

#[test]
fn skins_lists_built_in_tables() {
    let home = TempDir::new().unwrap();
    let output = peon_pet(home.path(), &["skins"]);
    assert!(output.status.success());

    let skins: Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = skins
        .as_array()
        .unwrap()
        .iter()
        .map(|skin| skin["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["orc", "laptop"]);
    assert_eq!(skins[0]["resting"], "sleeping");
}

#[test]
fn replay_prints_intents_for_a_session() {
    let home = TempDir::new().unwrap();
    let log = home.path().join("events.jsonl");
    fs_err::write(
        &log,
        format!(
            "{{\"timestamp\":5000000,\"event\":\"UserPromptSubmit\",\"session_id\":\"{id}\",\"cwd\":\"/work/api\"}}\n\
             {{\"timestamp\":5004000,\"event\":\"Stop\",\"session_id\":\"{id}\"}}\n",
            id = SESSION
        ),
    )
    .unwrap();

    let output = peon_pet(
        home.path(),
        &["replay", log.to_str().unwrap(), "--fps", "30", "--tail-ms", "1500"],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let lines = json_lines(&output);
    let dots = lines
        .iter()
        .find(|line| line["intent"] == "update_dots")
        .unwrap();
    assert_eq!(dots["sessions"][0]["cwd"], "/work/api");

    let celebrate = lines
        .iter()
        .find(|line| line["intent"] == "play_anim" && line["name"] == "celebrate")
        .unwrap();
    assert_eq!(celebrate["at_ms"], 5_004_000);
    assert!(lines.iter().any(|line| line["intent"] == "burst_particles"));
}

#[test]
fn replay_with_laptop_skin_never_celebrates() {
    let home = TempDir::new().unwrap();
    let log = home.path().join("events.jsonl");
    fs_err::write(
        &log,
        format!(
            "{{\"timestamp\":5000000,\"event\":\"Stop\",\"session_id\":\"{}\"}}\n",
            SESSION
        ),
    )
    .unwrap();

    let output = peon_pet(
        home.path(),
        &["replay", log.to_str().unwrap(), "--skin", "laptop"],
    );
    assert!(output.status.success());
    assert!(!json_lines(&output)
        .iter()
        .any(|line| line["name"] == "celebrate"));
}

#[test]
fn unknown_skin_fails() {
    let home = TempDir::new().unwrap();
    let log = home.path().join("events.jsonl");
    fs_err::write(&log, "").unwrap();

    let output = peon_pet(
        home.path(),
        &["replay", log.to_str().unwrap(), "--skin", "dragon"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("dragon"));
}

#[test]
fn malformed_config_fails() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("config.toml");
    fs_err::write(&config, "[sessions\nhot_window_ms = 1").unwrap();
    let log = home.path().join("events.jsonl");
    fs_err::write(&log, "").unwrap();

    let output = peon_pet(
        home.path(),
        &["replay", log.to_str().unwrap(), "--config", config.to_str().unwrap()],
    );
    assert!(!output.status.success());
}
