use crate::common::{fixture_path, stylgraph};
use predicates::prelude::*;

#[test]
fn compile_site_resolves_every_import_kind() {
    let home = tempfile::tempdir().unwrap();
    stylgraph(home.path())
        .args(["compile", fixture_path("site/main.styl").to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            ".colors\n.kit\n.a\n.b\n.c\n\
             @import \"http://example.com/reset.css\"\n.main\ncolor brand\n",
        )
        .stderr(predicate::str::contains("error:").not());
}

#[test]
fn compile_missing_import_fails_after_writing_css() {
    let home = tempfile::tempdir().unwrap();
    stylgraph(home.path())
        .args(["compile", fixture_path("site/broken.styl").to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stdout(".before\n.after\n")
        .stderr(predicate::str::contains("Stylus resolver error"))
        .stderr(predicate::str::contains("does-not-exist.styl"))
        .stderr(predicate::str::contains("Host resolver error details"))
        .stderr(predicate::str::contains("Build failed with 1 error(s)"));
}

#[test]
fn compile_search_path_from_flag() {
    let home = tempfile::tempdir().unwrap();
    let file = fixture_path("site/mixins-user.styl");

    stylgraph(home.path())
        .args(["compile", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mixins.styl"));

    stylgraph(home.path())
        .args([
            "compile",
            file.to_str().unwrap(),
            "--paths",
            fixture_path("shared").to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(".mixins\n.user\n");
}

#[test]
fn compile_search_path_from_env() {
    let home = tempfile::tempdir().unwrap();
    stylgraph(home.path())
        .env("STYLGRAPH_PATHS", fixture_path("shared"))
        .args(["compile", fixture_path("site/mixins-user.styl").to_str().unwrap()])
        .assert()
        .success()
        .stdout(".mixins\n.user\n");
}

#[test]
fn compile_define_selects_import() {
    let home = tempfile::tempdir().unwrap();
    let file = fixture_path("site/themed.styl");
    for (theme, css) in [("dark", ".dark\n"), ("light", ".light\n")] {
        stylgraph(home.path())
            .args([
                "compile",
                file.to_str().unwrap(),
                "--define",
                &format!("theme={theme}"),
            ])
            .assert()
            .success()
            .stdout(css);
    }
}

#[test]
fn compile_import_option_prepends_requests() {
    let home = tempfile::tempdir().unwrap();
    stylgraph(home.path())
        .args([
            "compile",
            fixture_path("site/themed.styl").to_str().unwrap(),
            "--define",
            "theme=dark",
            "--import",
            "colors",
        ])
        .assert()
        .success()
        .stdout(".colors\n.dark\n");
}

#[test]
fn compile_writes_output_file() {
    let home = tempfile::tempdir().unwrap();
    let out = home.path().join("out.css");
    stylgraph(home.path())
        .args([
            "compile",
            fixture_path("site/main.styl").to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout("");

    let css = std::fs::read_to_string(&out).unwrap();
    assert!(css.starts_with(".colors\n.kit\n"));
}

#[test]
fn compile_nonexistent_input() {
    let home = tempfile::tempdir().unwrap();
    stylgraph(home.path())
        .args(["compile", "tests/fixtures/site/nope.styl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}
