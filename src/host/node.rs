//! Node-style module resolution: aliases, `node_modules` hierarchy,
//! `package.json` entry points and extension inference.

use crate::host::{HostResolver, ResolveError};
use crate::source::{normalize_path, SourceAccessor};
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Host resolver configuration, fixed for a whole build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Request prefix → replacement path.
    pub alias: BTreeMap<String, PathBuf>,
    /// Directory names searched while walking up from the context.
    pub modules: Vec<String>,
    /// `exports` conditions, in priority order. `default` is always tried last.
    pub condition_names: Vec<String>,
    /// `package.json` fields naming a package's entry point.
    pub main_fields: Vec<String>,
    /// File names tried inside a directory.
    pub main_files: Vec<String>,
    /// Extensions appended to extensionless requests. A resolved file must
    /// end in one of these.
    pub extensions: Vec<String>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            alias: BTreeMap::new(),
            modules: vec!["node_modules".to_string()],
            condition_names: vec!["styl".into(), "stylus".into(), "style".into()],
            main_fields: vec![
                "styl".into(),
                "style".into(),
                "stylus".into(),
                "main".into(),
            ],
            main_files: vec!["index".to_string()],
            extensions: vec![".styl".to_string(), ".css".to_string()],
        }
    }
}

pub struct NodeResolver {
    options: ResolveOptions,
    source: Rc<dyn SourceAccessor>,
}

/// Bookkeeping for one resolution, turned into the error on failure.
struct Attempt {
    details: Vec<String>,
    missing: Vec<PathBuf>,
}

impl Attempt {
    fn new() -> Self {
        Self {
            details: Vec::new(),
            missing: Vec::new(),
        }
    }

    fn miss(&mut self, path: &Path, why: &str) {
        self.details.push(format!("{} {why}", path.display()));
        self.missing.push(path.to_path_buf());
    }

    fn note(&mut self, line: String) {
        self.details.push(line);
    }

    fn into_error(self, request: &str, context: &Path) -> ResolveError {
        ResolveError {
            details: self.details,
            missing: self.missing,
            ..ResolveError::not_found(request, context)
        }
    }
}

/// Bare request split into package name and subpath.
fn split_package(request: &str) -> (&str, Option<&str>) {
    let cut = if request.starts_with('@') {
        request
            .match_indices('/')
            .nth(1)
            .map(|(i, _)| i)
    } else {
        request.find('/')
    };
    match cut {
        Some(i) => {
            let sub = request[i + 1..].trim_end_matches('/');
            (&request[..i], (!sub.is_empty()).then_some(sub))
        }
        None => (request, None),
    }
}

fn is_path_request(request: &str) -> bool {
    request == "."
        || request == ".."
        || request.starts_with("./")
        || request.starts_with("../")
        || Path::new(request).is_absolute()
}

impl NodeResolver {
    pub fn new(options: ResolveOptions, source: Rc<dyn SourceAccessor>) -> Self {
        Self { options, source }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    fn apply_alias(&self, request: &str) -> Option<PathBuf> {
        self.options.alias.iter().find_map(|(key, target)| {
            if request == key {
                Some(target.clone())
            } else {
                request
                    .strip_prefix(key.as_str())
                    .and_then(|rest| rest.strip_prefix('/'))
                    .map(|rest| target.join(rest))
            }
        })
    }

    fn allowed(&self, path: &Path) -> bool {
        let name = path.to_string_lossy().to_ascii_lowercase();
        self.options
            .extensions
            .iter()
            .any(|ext| name.ends_with(&ext.to_ascii_lowercase()))
    }

    fn resolve_file(&self, context: &Path, request: &str) -> Result<PathBuf, ResolveError> {
        let mut attempt = Attempt::new();
        let found = if let Some(aliased) = self.apply_alias(request) {
            attempt.note(format!("aliased to {}", aliased.display()));
            self.load_file_or_directory(&normalize_path(&aliased), &mut attempt)
        } else if is_path_request(request) {
            self.load_file_or_directory(&normalize_path(&context.join(request)), &mut attempt)
        } else {
            self.load_module(context, request, &mut attempt)
        };
        found.ok_or_else(|| attempt.into_error(request, context))
    }

    fn resolve_directory(&self, context: &Path, request: &str) -> Result<PathBuf, ResolveError> {
        let mut attempt = Attempt::new();
        let candidates: Vec<PathBuf> = if let Some(aliased) = self.apply_alias(request) {
            vec![normalize_path(&aliased)]
        } else if is_path_request(request) {
            vec![normalize_path(&context.join(request))]
        } else {
            let (name, sub) = split_package(request);
            self.module_directories(context, name)
                .into_iter()
                .map(|dir| match sub {
                    Some(sub) => normalize_path(&dir.join(sub)),
                    None => dir,
                })
                .collect()
        };
        for candidate in candidates {
            if self.source.is_directory(&candidate) {
                return Ok(candidate);
            }
            attempt.miss(&candidate, "is not a directory");
        }
        Err(attempt.into_error(request, context))
    }

    /// `<ancestor>/<modules>/<name>` for every ancestor of `context`,
    /// nearest first.
    fn module_directories(&self, context: &Path, name: &str) -> Vec<PathBuf> {
        context
            .ancestors()
            .flat_map(|ancestor| {
                self.options
                    .modules
                    .iter()
                    .map(move |modules| ancestor.join(modules).join(name))
            })
            .collect()
    }

    fn load_module(&self, context: &Path, request: &str, attempt: &mut Attempt) -> Option<PathBuf> {
        let (name, sub) = split_package(request);
        for package in self.module_directories(context, name) {
            if !self.source.is_directory(&package) {
                attempt.miss(&package, "doesn't exist");
                continue;
            }
            let manifest = self.manifest(&package);
            if let Some(exports) = manifest.as_ref().and_then(|m| m.get("exports")) {
                let key = sub.map_or_else(|| ".".to_string(), |s| format!("./{s}"));
                match self.exports_target(exports, &key) {
                    Some(target) => {
                        let entry = normalize_path(&package.join(target));
                        if self.source.is_file(&entry) && self.allowed(&entry) {
                            return Some(entry);
                        }
                        attempt.miss(&entry, "is not a usable exports target");
                    }
                    None => attempt.note(format!(
                        "{}: no exports entry for '{key}' under conditions {:?}",
                        package.display(),
                        self.options.condition_names
                    )),
                }
                continue;
            }
            let found = match sub {
                Some(sub) => {
                    self.load_file_or_directory(&normalize_path(&package.join(sub)), attempt)
                }
                None => self.load_directory(&package, attempt),
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }

    fn load_file_or_directory(&self, base: &Path, attempt: &mut Attempt) -> Option<PathBuf> {
        if let Some(found) = self.load_file(base, attempt) {
            return Some(found);
        }
        if self.source.is_directory(base) {
            return self.load_directory(base, attempt);
        }
        None
    }

    fn load_file(&self, base: &Path, attempt: &mut Attempt) -> Option<PathBuf> {
        if self.source.is_file(base) {
            if self.allowed(base) {
                return Some(base.to_path_buf());
            }
            attempt.note(format!(
                "{} doesn't match the allowed extensions {:?}",
                base.display(),
                self.options.extensions
            ));
        } else {
            attempt.miss(base, "doesn't exist");
        }
        for ext in &self.options.extensions {
            let mut name = base.as_os_str().to_owned();
            name.push(ext);
            let candidate = PathBuf::from(name);
            if self.source.is_file(&candidate) {
                return Some(candidate);
            }
            attempt.miss(&candidate, "doesn't exist");
        }
        None
    }

    fn load_directory(&self, dir: &Path, attempt: &mut Attempt) -> Option<PathBuf> {
        if let Some(manifest) = self.manifest(dir) {
            for field in &self.options.main_fields {
                let Some(entry) = manifest.get(field).and_then(Value::as_str) else {
                    continue;
                };
                let entry = normalize_path(&dir.join(entry));
                if entry == dir {
                    continue;
                }
                if let Some(found) = self.load_file(&entry, attempt) {
                    return Some(found);
                }
                if self.source.is_directory(&entry) {
                    if let Some(found) = self.load_main_files(&entry, attempt) {
                        return Some(found);
                    }
                }
            }
        }
        self.load_main_files(dir, attempt)
    }

    fn load_main_files(&self, dir: &Path, attempt: &mut Attempt) -> Option<PathBuf> {
        self.options
            .main_files
            .iter()
            .find_map(|main| self.load_file(&dir.join(main), attempt))
    }

    fn manifest(&self, dir: &Path) -> Option<Value> {
        let text = self.source.read_to_string(&dir.join("package.json")).ok()?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("ignoring malformed {}: {e}", dir.join("package.json").display());
                None
            }
        }
    }

    /// Target of `exports` for subpath `key` (`.` or `./sub`).
    fn exports_target<'v>(&self, exports: &'v Value, key: &str) -> Option<&'v str> {
        match exports {
            Value::Object(map) if map.keys().any(|k| k.starts_with('.')) => {
                self.conditional_target(map.get(key)?)
            }
            _ if key == "." => self.conditional_target(exports),
            _ => None,
        }
    }

    fn conditional_target<'v>(&self, value: &'v Value) -> Option<&'v str> {
        match value {
            Value::String(s) => Some(s.as_str()),
            Value::Array(items) => items.iter().find_map(|v| self.conditional_target(v)),
            Value::Object(map) => self
                .options
                .condition_names
                .iter()
                .map(String::as_str)
                .chain(std::iter::once("default"))
                .filter_map(|cond| map.get(cond))
                .find_map(|v| self.conditional_target(v)),
            _ => None,
        }
    }
}

impl HostResolver for NodeResolver {
    fn resolve<'a>(
        &'a self,
        context: &'a Path,
        request: &'a str,
    ) -> LocalBoxFuture<'a, Result<PathBuf, ResolveError>> {
        async move { self.resolve_file(context, request) }.boxed_local()
    }

    fn resolve_context<'a>(
        &'a self,
        context: &'a Path,
        request: &'a str,
    ) -> LocalBoxFuture<'a, Result<PathBuf, ResolveError>> {
        async move { self.resolve_directory(context, request) }.boxed_local()
    }
}
