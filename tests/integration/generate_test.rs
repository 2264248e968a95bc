use crate::{fixture_path, restc};
use predicates::prelude::*;
use serde_json::Value;

#[cfg(unix)]
#[test]
fn generate_pipes_definitions_to_shell_plugin() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("server");

    restc()
        .arg("generate")
        .arg(fixture_path("petstore"))
        .args([
            "--shell",
            "--plugin",
            "mkdir -p \"$RESTC_OUTPUT\" && cat > \"$RESTC_OUTPUT/api.json\"",
            "--output",
        ])
        .arg(&out)
        .assert()
        .success();

    let written = std::fs::read_to_string(out.join("api.json")).unwrap();
    let defs: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(defs["controllers"]["PetController"]["base"], "/v1/pets");
}

#[cfg(unix)]
#[test]
fn generate_output_env_is_absolute() {
    let tmp = tempfile::tempdir().unwrap();
    let marker = tmp.path().join("output.txt");
    let script = format!("printf '%s' \"$RESTC_OUTPUT\" > '{}'", marker.display());

    restc()
        .current_dir(tmp.path())
        .arg("generate")
        .arg(fixture_path("petstore"))
        .args(["--shell", "--plugin", &script, "--output", "gen"])
        .assert()
        .success();

    let reported = std::fs::read_to_string(&marker).unwrap();
    assert!(std::path::Path::new(&reported).is_absolute());
    assert!(reported.ends_with("gen"));
}

#[cfg(unix)]
#[test]
fn generate_fails_when_plugin_fails() {
    restc()
        .arg("generate")
        .arg(fixture_path("petstore"))
        .args(["--shell", "--plugin", "exit 2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exited with status 2"));
}

#[test]
fn generate_reports_missing_plugin_executable() {
    restc()
        .arg("generate")
        .arg(fixture_path("petstore"))
        .args(["--plugin", "no-such-generator"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("restc-no-such-generator"));
}

#[test]
fn generate_requires_a_plugin() {
    restc()
        .arg("generate")
        .arg(fixture_path("petstore"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no generator plugin configured"));
}
