use predicates::prelude::*;

use factorio_export::test_utils::TestInstallation;

use crate::common::{bob_installation, fie_command};

#[test]
fn test_help_lists_commands() {
    let installation = TestInstallation::new();
    fie_command(&installation)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("update-list"))
        .stdout(predicate::str::contains("list-missing"))
        .stdout(predicate::str::contains("export-step"));
}

#[test]
fn test_update_list_then_list() {
    let installation = bob_installation();

    fie_command(&installation)
        .arg("update-list")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 added, 0 updated, 0 removed"));

    assert!(installation.path().join("data").join("mods.json").exists());
    assert!(installation.path().join("dump").join("info.json").exists());

    fie_command(&installation)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("bobplates"))
        .stdout(predicate::str::contains("0.2.1"));

    let output = fie_command(&installation).args(["list", "--format", "json"]).output().unwrap();
    assert!(output.status.success());
    let mods: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = mods.as_array().unwrap().iter().map(|m| m["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["base", "FNEI", "bobplates"]);
}

#[test]
fn test_list_without_mods() {
    let installation = TestInstallation::new();
    fie_command(&installation)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No mods known"));
}

#[test]
fn test_list_missing() {
    let installation = bob_installation();
    installation.write_mod("angelsrefining", "0.10.0", &["angelslib >= 0.1"]);

    fie_command(&installation).arg("update-list").assert().success();
    fie_command(&installation)
        .arg("list-missing")
        .assert()
        .success()
        .stdout(predicate::str::contains("angelsrefining requires angelslib >= 0.1 (not installed)"))
        .stdout(predicate::str::contains("bobplates").not());
}

#[test]
fn test_generate_dump_info() {
    let installation = bob_installation();
    fie_command(&installation).arg("update-list").assert().success();
    std::fs::remove_file(installation.path().join("dump").join("info.json")).unwrap();

    fie_command(&installation).arg("generate-dump-info").assert().success();

    let content = std::fs::read_to_string(installation.path().join("dump").join("info.json")).unwrap();
    let info: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(info["name"], "Dump");
    assert_eq!(info["factorio_version"], "0.17");
    assert_eq!(info["dependencies"], serde_json::json!(["base", "? FNEI", "? bobplates"]));
}

#[test]
fn test_generate_dump_info_without_base_mod() {
    let installation = TestInstallation::new();
    fie_command(&installation)
        .arg("generate-dump-info")
        .assert()
        .failure()
        .code(500)
        .stderr(predicate::str::contains("base mod"));
}

#[test]
fn test_export_unknown_mod_exits_with_404() {
    let installation = bob_installation();
    fie_command(&installation).arg("update-list").assert().success();

    fie_command(&installation)
        .args(["export", "angelsrefining"])
        .assert()
        .failure()
        .code(404)
        .stderr(predicate::str::contains("angelsrefining"));
}

#[test]
fn test_invalid_config() {
    let installation = TestInstallation::new();
    let path = installation.path().join("broken.toml");
    std::fs::write(&path, "number_of_instances = 0\n").unwrap();

    let mut cmd = assert_cmd::Command::cargo_bin("fie").unwrap();
    cmd.env_remove(factorio_export::config::CONFIG_ENV_VAR)
        .arg("--config")
        .arg(&path)
        .arg("list")
        .assert()
        .failure()
        .code(500)
        .stderr(predicate::str::contains("number_of_instances"));
}
