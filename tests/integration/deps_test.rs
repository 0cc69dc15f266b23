use crate::common::{fixture_path, stylgraph};
use predicates::prelude::*;

#[test]
fn deps_site_json() {
    let home = tempfile::tempdir().unwrap();
    let output = stylgraph(home.path())
        .args(["deps", fixture_path("site/main.styl").to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["summary"]["imports"], 3);
    assert_eq!(json["summary"]["unresolved"], 0);
    assert!(json["cycles"].as_array().unwrap().is_empty());

    let main = json["files"]
        .as_array()
        .unwrap()
        .iter()
        .find(|entry| entry["file"].as_str().unwrap().ends_with("main.styl"))
        .unwrap();
    let imports = main["imports"].as_array().unwrap();
    let requests: Vec<&str> = imports
        .iter()
        .map(|import| import["request"].as_str().unwrap())
        .collect();
    assert_eq!(requests, vec!["colors", "~kit", "./partials"]);

    assert_eq!(imports[1]["status"], "resolved");
    assert!(imports[1]["targets"][0]
        .as_str()
        .unwrap()
        .ends_with("vendor_styles/kit/lib/kit.styl"));

    assert_eq!(imports[2]["status"], "resolved-many");
    let partials: Vec<&str> = imports[2]["targets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|target| target.as_str().unwrap())
        .collect();
    assert_eq!(partials.len(), 3);
    assert!(partials[0].ends_with("partials/a.styl"));
    assert!(partials[2].ends_with("partials/c.styl"));
}

#[test]
fn deps_cycle_text() {
    let home = tempfile::tempdir().unwrap();
    stylgraph(home.path())
        .args([
            "deps",
            fixture_path("site/cycle/one.styl").to_str().unwrap(),
            "--format",
            "text",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stylgraph Dependency Report"))
        .stdout(predicate::str::contains("Import Cycles"))
        .stdout(predicate::str::contains("  - one.styl"))
        .stdout(predicate::str::contains("  - two.styl"));
}

#[test]
fn deps_unresolved_reported_without_failing() {
    let home = tempfile::tempdir().unwrap();
    stylgraph(home.path())
        .args([
            "deps",
            fixture_path("site/broken.styl").to_str().unwrap(),
            "--format",
            "text",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unresolved:   1"))
        .stdout(predicate::str::contains("FAILED"));
}

#[test]
fn deps_dot() {
    let home = tempfile::tempdir().unwrap();
    stylgraph(home.path())
        .args([
            "deps",
            fixture_path("site/main.styl").to_str().unwrap(),
            "--format",
            "dot",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("digraph imports"))
        .stdout(predicate::str::contains("kit.styl"));
}

#[test]
fn deps_format_from_env() {
    let home = tempfile::tempdir().unwrap();
    stylgraph(home.path())
        .env("STYLGRAPH_FORMAT", "text")
        .args(["deps", fixture_path("site/main.styl").to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stylgraph Dependency Report"));
}
