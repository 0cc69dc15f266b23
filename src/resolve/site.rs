use crate::style::{eval_expr, eval_target, lookup, Node, Position, Scope, Stylesheet};
use serde::Serialize;
use std::path::PathBuf;

/// How an import's path reads before any lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportClass {
    /// Ends in `.css`; searched for exactly as written.
    LiteralCss,
    /// Ends in `.styl` (any case).
    LiteralStyle,
    /// No recognised extension; `.styl` is inferred.
    Bare,
    /// `url(...)` or a URL-looking path; never resolved as a file.
    UrlOnly,
}

/// One import statement occurrence in one file.
///
/// `line`/`column` are the target expression's position in the parse that
/// produced the site. A later parse of the same text yields the same
/// positions, so `(line, column, path)` identifies the site across parses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSite {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    /// Evaluated path as written, before extension inference.
    pub path: String,
    pub class: ImportClass,
}

impl ImportSite {
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Same position and same evaluated path.
    pub fn matches(&self, pos: Position, path: &str) -> bool {
        self.line == pos.line && self.column == pos.column && self.path == path
    }
}

/// Paths that name a URL rather than a file: fragments, scheme-relative
/// paths and `http(s)://` URLs, optionally wrapped in `url(` and quotes.
/// Absolute filesystem paths are files.
pub fn is_url_path(path: &str) -> bool {
    let mut rest = path.trim_start();
    if rest.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("url(")) {
        rest = rest[4..].trim_start();
    }
    let rest = rest.trim_start_matches(['"', '\'']);
    if rest.starts_with('#') || rest.starts_with("//") {
        return true;
    }
    let lower = rest.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

pub fn classify(path: &str, is_url_function: bool) -> ImportClass {
    if is_url_function || is_url_path(path) {
        ImportClass::UrlOnly
    } else if lookup::is_literal_css(path) {
        ImportClass::LiteralCss
    } else if lookup::has_style_extension(path) {
        ImportClass::LiteralStyle
    } else {
        ImportClass::Bare
    }
}

/// Import sites of one parsed file, in document order.
///
/// Targets that are not literals are evaluated against `defines` plus the
/// file's own assignments seen so far; nothing else in the file is
/// evaluated. Sites whose path evaluates to the empty string are skipped.
pub fn extract_imports(sheet: &Stylesheet, defines: &Scope) -> Vec<ImportSite> {
    let mut scope = defines.clone();
    let mut sites = Vec::new();
    for node in &sheet.nodes {
        match node {
            Node::Assign { name, value, .. } => {
                let value = eval_expr(value, &scope);
                scope.set(name.clone(), value);
            }
            Node::Import(import) => {
                let target = eval_target(&import.path, &scope);
                if target.path.is_empty() {
                    continue;
                }
                sites.push(ImportSite {
                    file: sheet.file.clone(),
                    line: target.pos.line,
                    column: target.pos.column,
                    class: classify(&target.path, target.is_url_function),
                    path: target.path,
                });
            }
            Node::Rule { .. } => {}
        }
    }
    sites
}
