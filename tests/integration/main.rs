mod analyze_test;
mod config_test;
mod generate_test;

use std::path::{Path, PathBuf};

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("go")
        .join(name)
}

pub fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

pub fn restc() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("restc").unwrap();
    // Plain diagnostics, no line wrapping.
    cmd.env("NO_GRAPHICS", "1");
    for var in [
        "RESTC_MODULE",
        "RESTC_INCLUDE",
        "RESTC_EXCLUDE",
        "RESTC_INCLUDE_TESTS",
        "RESTC_CONTEXT_TYPE",
        "RESTC_FORMAT",
        "RESTC_PLUGIN",
    ] {
        cmd.env_remove(var);
    }
    cmd
}
