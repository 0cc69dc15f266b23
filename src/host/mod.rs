//! The host build system's side of the boundary: its module resolver and
//! its dependency/diagnostic sink.

pub mod node;

pub use node::{NodeResolver, ResolveOptions};

use crate::errors::LoaderError;
use futures::future::LocalBoxFuture;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure reported by a [`HostResolver`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ResolveError {
    pub message: String,
    pub request: String,
    pub context: PathBuf,
    /// One line per candidate the resolver tried.
    pub details: Vec<String>,
    /// Candidate paths that did not exist.
    pub missing: Vec<PathBuf>,
}

impl ResolveError {
    pub fn new(message: impl Into<String>, request: &str, context: &Path) -> Self {
        Self {
            message: message.into(),
            request: request.to_string(),
            context: context.to_path_buf(),
            details: Vec::new(),
            missing: Vec::new(),
        }
    }

    pub fn not_found(request: &str, context: &Path) -> Self {
        Self::new(
            format!("Can't resolve '{request}' in '{}'", context.display()),
            request,
            context,
        )
    }
}

/// General-purpose module resolver of the host build system.
pub trait HostResolver {
    /// Resolve `request` to a single file, relative to `context`.
    fn resolve<'a>(
        &'a self,
        context: &'a Path,
        request: &'a str,
    ) -> LocalBoxFuture<'a, Result<PathBuf, ResolveError>>;

    /// Resolve `request` to a directory, relative to `context`.
    fn resolve_context<'a>(
        &'a self,
        context: &'a Path,
        request: &'a str,
    ) -> LocalBoxFuture<'a, Result<PathBuf, ResolveError>>;
}

/// Per-compile sink for build dependencies and emitted diagnostics.
///
/// Single-threaded: every method takes `&self` and mutates through a
/// `RefCell`, so concurrently awaited branches can share one context.
#[derive(Debug, Default)]
pub struct BuildContext {
    dependencies: RefCell<Vec<PathBuf>>,
    context_dependencies: RefCell<Vec<PathBuf>>,
    errors: RefCell<Vec<LoaderError>>,
    warnings: RefCell<Vec<LoaderError>>,
}

impl BuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file whose change must invalidate the build.
    pub fn add_dependency(&self, path: &Path) {
        let mut deps = self.dependencies.borrow_mut();
        if !deps.iter().any(|d| d == path) {
            deps.push(path.to_path_buf());
        }
    }

    /// Register a directory whose listing must invalidate the build.
    pub fn add_context_dependency(&self, path: &Path) {
        let mut deps = self.context_dependencies.borrow_mut();
        if !deps.iter().any(|d| d == path) {
            deps.push(path.to_path_buf());
        }
    }

    pub fn emit_error(&self, error: LoaderError) {
        tracing::debug!("build error: {error}");
        self.errors.borrow_mut().push(error);
    }

    pub fn emit_warning(&self, warning: LoaderError) {
        tracing::debug!("build warning: {warning}");
        self.warnings.borrow_mut().push(warning);
    }

    pub fn dependencies(&self) -> Vec<PathBuf> {
        self.dependencies.borrow().clone()
    }

    pub fn context_dependencies(&self) -> Vec<PathBuf> {
        self.context_dependencies.borrow().clone()
    }

    pub fn error_count(&self) -> usize {
        self.errors.borrow().len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.borrow().len()
    }

    /// Consume the context: dependencies, context dependencies, errors,
    /// warnings.
    pub fn into_parts(self) -> (Vec<PathBuf>, Vec<PathBuf>, Vec<LoaderError>, Vec<LoaderError>) {
        (
            self.dependencies.into_inner(),
            self.context_dependencies.into_inner(),
            self.errors.into_inner(),
            self.warnings.into_inner(),
        )
    }
}
