//! The preprocessor's own file lookup rules: search paths, implicit
//! extension and index files.

use crate::source::{normalize_path, SourceAccessor};
use std::path::{Path, PathBuf};

pub const STYLE_EXTENSION: &str = ".styl";
pub const CSS_EXTENSION: &str = ".css";

/// Path names a plain CSS file.
pub fn is_literal_css(path: &str) -> bool {
    path.ends_with(CSS_EXTENSION)
}

/// Path already carries the style extension (any case).
pub fn has_style_extension(path: &str) -> bool {
    path.to_ascii_lowercase().ends_with(STYLE_EXTENSION)
}

/// Directories searched for an import written in `file`: the file's own
/// directory first, then the configured paths in order.
pub fn search_paths(file: &Path, configured: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(configured.len() + 1);
    if let Some(dir) = file.parent() {
        paths.push(dir.to_path_buf());
    }
    for path in configured {
        if !paths.contains(path) {
            paths.push(path.clone());
        }
    }
    paths
}

/// Find `path` on the search paths. A candidate equal to `ignore` (the
/// importing file) is skipped.
pub fn find(
    path: &str,
    paths: &[PathBuf],
    ignore: Option<&Path>,
    source: &dyn SourceAccessor,
) -> Option<PathBuf> {
    let request = Path::new(path);
    if request.is_absolute() {
        let candidate = normalize_path(request);
        return (Some(candidate.as_path()) != ignore && source.is_file(&candidate))
            .then_some(candidate);
    }
    paths
        .iter()
        .map(|dir| normalize_path(&dir.join(request)))
        .filter(|candidate| Some(candidate.as_path()) != ignore)
        .find(|candidate| source.is_file(candidate))
}

/// Look `name` up as a directory: `name/index.styl`, then
/// `name/<basename>.styl`, then a `node_modules` package.
pub fn lookup_index(
    name: &str,
    paths: &[PathBuf],
    ignore: Option<&Path>,
    source: &dyn SourceAccessor,
) -> Option<PathBuf> {
    let trimmed = name.trim_end_matches('/');
    if let Some(found) = find(&format!("{trimmed}/index{STYLE_EXTENSION}"), paths, ignore, source) {
        return Some(found);
    }

    let base = Path::new(trimmed)
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.trim_end_matches(STYLE_EXTENSION).to_string());
    if let Some(base) = base.filter(|b| !b.is_empty()) {
        let named = format!("{trimmed}/{base}{STYLE_EXTENSION}");
        if let Some(found) = find(&named, paths, ignore, source) {
            return Some(found);
        }
    }

    if trimmed.contains("node_modules") {
        return None;
    }
    lookup_package(trimmed, paths, source)
}

/// `node_modules/<name>` under any search path, entered through the `main`
/// field of its `package.json` or its index file.
fn lookup_package(name: &str, paths: &[PathBuf], source: &dyn SourceAccessor) -> Option<PathBuf> {
    for dir in paths {
        let package = normalize_path(&dir.join("node_modules").join(name));
        if !source.is_directory(&package) {
            continue;
        }
        if let Some(main) = package_main(&package, source) {
            let entry = normalize_path(&package.join(main));
            if source.is_file(&entry) && has_style_extension(&entry.to_string_lossy()) {
                return Some(entry);
            }
            let index = entry.join(format!("index{STYLE_EXTENSION}"));
            if source.is_file(&index) {
                return Some(index);
            }
        }
        let index = package.join(format!("index{STYLE_EXTENSION}"));
        if source.is_file(&index) {
            return Some(index);
        }
    }
    None
}

fn package_main(package: &Path, source: &dyn SourceAccessor) -> Option<String> {
    let manifest = source.read_to_string(&package.join("package.json")).ok()?;
    let json: serde_json::Value = serde_json::from_str(&manifest).ok()?;
    json.get("main")?.as_str().map(str::to_string)
}
