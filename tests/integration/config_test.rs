use crate::common::{fixture_path, stylgraph};
use predicates::prelude::*;

#[test]
fn config_show_defaults() {
    // No config file present, so every setting is a default
    let tmp = tempfile::tempdir().unwrap();
    stylgraph(tmp.path())
        .args(["config", "show", "--path", tmp.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded config files: (none)"))
        .stdout(predicate::str::contains("Resolved settings:"))
        .stdout(predicate::str::contains("defaults.format: json <- default"))
        .stdout(predicate::str::contains("stylus.include_css: false <- default"))
        .stdout(predicate::str::contains(
            "resolve.main_fields: [styl, style, stylus, main] <- default",
        ))
        .stdout(predicate::str::contains(
            "resolve.extensions: [.styl, .css] <- default",
        ));
}

#[test]
fn config_show_with_project_config() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join(".stylgraph.toml"),
        r#"
[defaults]
format = "text"

[stylus]
include_css = true
import = ["vars"]

[stylus.define]
theme = "dark"
"#,
    )
    .unwrap();

    stylgraph(tmp.path())
        .args(["config", "show", "--path", tmp.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(".stylgraph.toml"))
        .stdout(predicate::str::contains("defaults.format: text <- project config"))
        .stdout(predicate::str::contains("stylus.include_css: true <- project config"))
        .stdout(predicate::str::contains("stylus.import: [vars] <- project config"))
        .stdout(predicate::str::contains("stylus.define: {theme=dark} <- project config"));
}

#[test]
fn config_show_fixture_project() {
    let home = tempfile::tempdir().unwrap();
    stylgraph(home.path())
        .args([
            "config",
            "show",
            "--path",
            fixture_path("site/partials").to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "resolve.modules: [vendor_styles] <- project config",
        ));
}

#[test]
fn config_show_env_overrides_project() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join(".stylgraph.toml"),
        "[stylus]\ninclude_css = false\n",
    )
    .unwrap();

    stylgraph(tmp.path())
        .env("STYLGRAPH_INCLUDE_CSS", "1")
        .args(["config", "show", "--path", tmp.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "stylus.include_css: true <- env var (STYLGRAPH_INCLUDE_CSS)",
        ));
}

#[test]
fn config_invalid_project_config() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join(".stylgraph.toml"),
        "[stylus]\nunknown_key = 1\n",
    )
    .unwrap();

    stylgraph(tmp.path())
        .args(["config", "show", "--path", tmp.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid project config"));
}
