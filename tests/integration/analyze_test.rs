use crate::{fixture_path, restc, write};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::Value;

const API: &str = "github.com/acme/petstore/api";
const MODELS: &str = "github.com/acme/petstore/models";

fn analyze_petstore(extra: &[&str]) -> Value {
    let output = restc()
        .arg("analyze")
        .arg(fixture_path("petstore"))
        .args(extra)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn analyze_petstore_json() {
    let defs = analyze_petstore(&[]);

    assert_eq!(
        defs["imports"],
        serde_json::json!([
            format!("github_com_acme_petstore_api \"{API}\""),
            format!("github_com_acme_petstore_models \"{MODELS}\""),
        ])
    );

    let controllers = defs["controllers"].as_object().unwrap();
    let names: Vec<&str> = controllers.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Health", "PetController"]);

    let pets = &controllers["PetController"];
    assert_eq!(pets["base"], "/v1/pets");
    assert_eq!(pets["package"], API);
    assert_eq!(pets["file"], format!("{API}/pets.go"));
    assert_eq!(pets["alias"], "github_com_acme_petstore_api.PetController");

    let resources = pets["resources"].as_object().unwrap();
    let names: Vec<&str> = resources.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Create", "Get", "List"]);

    let get = &resources["Get"];
    assert_eq!(get["file"], "pets.go");
    assert_eq!(get["package"], API);
    assert_eq!(get["method"], "GET");
    assert_eq!(get["path"], "/{petId}");
    assert_eq!(get["summary"], "Fetch a pet");
    assert_eq!(get["tags"], serde_json::json!(["pets", "read"]));
    assert_eq!(
        get["params"],
        serde_json::json!([
            {"source": "Context", "type": "context Context", "name": "ctx"},
            {"source": "Path", "type": "string", "name": "petId"},
            {"source": "Header", "type": "string", "name": "trace", "metadata": "X-Trace-Id"},
            {"source": "Responder", "type": format!("{MODELS} PetResponder"), "name": "res"},
        ])
    );

    let create = &resources["Create"];
    assert_eq!(create["details"], "The pet name must be unique.");
    assert_eq!(create["params"][1]["source"], "Body");
    assert_eq!(create["params"][1]["type"], format!("{MODELS} NewPet"));

    assert_eq!(controllers["Health"]["base"], "");
}

#[test]
fn analyze_petstore_registers_reachable_types() {
    let defs = analyze_petstore(&[]);

    let types = defs["types"].as_object().unwrap();
    let keys: Vec<&str> = types.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "github.com/acme/petstore/models NewPet",
            "github.com/acme/petstore/models Owner",
            "github.com/acme/petstore/models Pet",
        ]
    );

    let pet = &types[&format!("{MODELS} Pet")];
    assert_eq!(pet["alias"], "github_com_acme_petstore_models.Pet");
    assert_eq!(
        pet["schema"]["required"],
        serde_json::json!(["id", "name", "born"])
    );
    assert_eq!(pet["schema"]["properties"]["born"]["ref"], "time Time");
    assert_eq!(
        pet["schema"]["properties"]["owner"]["ref"],
        format!("{MODELS} Owner")
    );

    let responder = &defs["responders"][&format!("{MODELS} PetResponder")];
    let statuses: Vec<&str> = responder["responses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["200", "201", "404", "200"]);
    assert_eq!(
        responder["responses"][2]["annotations"]["@Status"],
        serde_json::json!(["404"])
    );
}

#[test]
fn analyze_is_deterministic() {
    let first = restc()
        .arg("analyze")
        .arg(fixture_path("petstore"))
        .output()
        .unwrap();
    let second = restc()
        .arg("analyze")
        .arg(fixture_path("petstore"))
        .output()
        .unwrap();
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn analyze_petstore_text() {
    restc()
        .arg("analyze")
        .arg(fixture_path("petstore"))
        .args(["--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("restc API Report"))
        .stdout(predicate::str::contains("Controllers: 2"))
        .stdout(predicate::str::contains("Resources:   4"))
        .stdout(predicate::str::contains("PetController (/v1/pets)"));
}

#[test]
fn analyze_writes_output_file() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("api.json");

    restc()
        .arg("analyze")
        .arg(fixture_path("petstore"))
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let defs: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert!(defs["controllers"]["PetController"].is_object());
}

#[test]
fn analyze_include_tests_picks_up_test_files() {
    let defs = analyze_petstore(&["--include-tests"]);
    assert!(defs["controllers"]["TestOnly"].is_object());

    let defs = analyze_petstore(&[]);
    assert!(defs["controllers"].get("TestOnly").is_none());
}

#[test]
fn analyze_exclude_pattern() {
    let defs = analyze_petstore(&["--exclude", "api/health.go"]);
    assert!(defs["controllers"].get("Health").is_none());
    assert!(defs["controllers"]["PetController"].is_object());
}

#[test]
fn analyze_module_flag_replaces_go_mod() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        "api/c.go",
        "package api\n\n// @Controller /c\ntype C struct{}\n\n// @Resource GET /x\nfunc (c *C) X(q string) error { return nil }\n",
    );

    restc()
        .arg("analyze")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not determine module path"));

    let output = restc()
        .arg("analyze")
        .arg(tmp.path())
        .args(["--module", "example.com/svc"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let defs: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(defs["controllers"]["C"]["package"], "example.com/svc/api");
}

#[test]
fn analyze_reports_syntax_errors() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "go.mod", "module example.com/broken\n");
    write(tmp.path(), "api/bad.go", "package api\n\nfunc (\n");

    restc()
        .arg("analyze")
        .arg(tmp.path())
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("bad.go"));
}

#[test]
fn analyze_rejects_orphan_resources() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "go.mod", "module example.com/orphan\n");
    write(
        tmp.path(),
        "api/c.go",
        "package api\n\ntype C struct{}\n\n// @Resource GET /x\nfunc (c *C) X() error { return nil }\n",
    );

    restc()
        .arg("analyze")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Resource X has no"));
}

#[test]
fn analyze_rejects_unknown_format() {
    restc()
        .arg("analyze")
        .arg(fixture_path("petstore"))
        .args(["--format", "yaml"])
        .assert()
        .failure();
}

#[test]
fn analyze_format_from_env() {
    restc()
        .arg("analyze")
        .arg(fixture_path("petstore"))
        .env("RESTC_FORMAT", "text")
        .assert()
        .success()
        .stdout(predicate::str::contains("restc API Report"));
}

#[test]
fn analyze_missing_path_fails() {
    restc()
        .args(["analyze", "/definitely/not/a/project"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No Go source files"));
}

#[test]
fn analyze_empty_project_emits_empty_document() {
    let tmp = tempfile::tempdir().unwrap();
    let output = restc()
        .arg("analyze")
        .arg(tmp.path())
        .args(["--module", "example.com/empty"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let defs: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(defs["controllers"], serde_json::json!({}));
    assert_eq!(defs["imports"], serde_json::json!([]));
}
