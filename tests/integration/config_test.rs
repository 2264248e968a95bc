use crate::{fixture_path, restc, write};
use predicates::prelude::*;

#[test]
fn config_show_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    restc()
        .args(["config", "show", "--path"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolved settings:"))
        .stdout(predicate::str::contains("output.format: json <- default"))
        .stdout(predicate::str::contains(
            "analysis.context_type: context Context <- default",
        ))
        .stdout(predicate::str::contains(
            "analysis.module: (from go.mod) <- default",
        ));
}

#[test]
fn config_show_with_project_config() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        ".restc.toml",
        r#"
[analysis]
module = "github.com/acme/shop"
include_tests = true

[generate]
plugin = "gin"
"#,
    );

    restc()
        .args(["config", "show", "--path"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(".restc.toml"))
        .stdout(predicate::str::contains("analysis.module: github.com/acme/shop <- project config"))
        .stdout(predicate::str::contains("analysis.include_tests: true <- project config"))
        .stdout(predicate::str::contains("generate.plugin: gin <- project config"));
}

#[test]
fn config_show_env_overrides_project_config() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), ".restc.toml", "[output]\nformat = \"json\"\n");

    restc()
        .args(["config", "show", "--path"])
        .arg(tmp.path())
        .env("RESTC_FORMAT", "text")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "output.format: text <- env var (RESTC_FORMAT)",
        ));
}

#[test]
fn config_show_rejects_invalid_file() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), ".restc.toml", "[analysis]\nunknown_key = 1\n");

    restc()
        .args(["config", "show", "--path"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid project config"));
}

#[test]
fn project_config_drives_analysis() {
    let tmp = tempfile::tempdir().unwrap();
    let project = tmp.path().join("petstore");
    copy_dir(&fixture_path("petstore"), &project);
    write(
        &project,
        ".restc.toml",
        "[analysis]\nexclude = [\"api/health.go\"]\n\n[output]\nformat = \"text\"\n",
    );

    restc()
        .arg("analyze")
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("Controllers: 1"));

    // CLI flag beats the project file.
    restc()
        .arg("analyze")
        .arg(&project)
        .args(["--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{"));
}

#[test]
fn config_paths_lists_project_file() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), ".restc.toml", "");

    restc()
        .args(["config", "paths", "--path"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("project: "))
        .stdout(predicate::str::contains(".restc.toml"));
}

fn copy_dir(from: &std::path::Path, to: &std::path::Path) {
    for entry in walkdir::WalkDir::new(from) {
        let entry = entry.unwrap();
        let target = to.join(entry.path().strip_prefix(from).unwrap());
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).unwrap();
        } else {
            std::fs::copy(entry.path(), &target).unwrap();
        }
    }
}
