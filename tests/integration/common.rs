use assert_cmd::Command;
use std::path::{Path, PathBuf};

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// `stylgraph` with the user config directory pointed at `home` and no
/// STYLGRAPH_* variables inherited from the calling shell.
pub fn stylgraph(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("stylgraph").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("STYLGRAPH_FORMAT")
        .env_remove("STYLGRAPH_PATHS")
        .env_remove("STYLGRAPH_INCLUDE_CSS")
        .env_remove("STYLGRAPH_IMPORT")
        .env_remove("RUST_LOG");
    cmd
}
