//! Loader entry point: shadow pass, then the real compile with recorded
//! resolutions injected.

use crate::errors::LoaderError;
use crate::host::{BuildContext, HostResolver, NodeResolver, ResolveOptions};
use crate::resolve::{DependencyGraphBuilder, DependencyIndex, ImportInjector, ResolutionContext};
use crate::source::{FsSource, SourceAccessor};
use crate::style::{parse, CompileOptions, Evaluator, Scope};
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderOptions {
    pub style: CompileOptions,
    /// Requests imported ahead of the resource's own content.
    pub imports: Vec<String>,
    pub resolve: ResolveOptions,
}

/// Result of a completed compile. `errors` may be non-empty: each one stands
/// for an import that produced no output.
#[derive(Debug)]
pub struct LoaderOutput {
    pub css: String,
    pub dependencies: Vec<PathBuf>,
    pub context_dependencies: Vec<PathBuf>,
    pub errors: Vec<LoaderError>,
    pub warnings: Vec<LoaderError>,
}

impl LoaderOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Shadow pass results on their own.
#[derive(Debug)]
pub struct DependencyReport {
    pub index: DependencyIndex,
    pub dependencies: Vec<PathBuf>,
    pub context_dependencies: Vec<PathBuf>,
    pub errors: Vec<LoaderError>,
    pub warnings: Vec<LoaderError>,
}

pub struct Loader {
    options: LoaderOptions,
    source: Rc<dyn SourceAccessor>,
    host: Rc<dyn HostResolver>,
}

impl Loader {
    pub fn new(
        options: LoaderOptions,
        source: Rc<dyn SourceAccessor>,
        host: Rc<dyn HostResolver>,
    ) -> Self {
        Self {
            options,
            source,
            host,
        }
    }

    /// Loader over the real filesystem with the bundled node-style resolver.
    pub fn with_filesystem(options: LoaderOptions) -> Self {
        let source: Rc<dyn SourceAccessor> = Rc::new(FsSource);
        let host = Rc::new(NodeResolver::new(options.resolve.clone(), source.clone()));
        Self::new(options, source, host)
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    pub async fn dependency_index(&self, resource: &Path, code: &str) -> DependencyReport {
        let code = self.with_prelude(code);
        let build = BuildContext::new();
        let index = self.shadow_pass(resource, &code, &build).await;
        let (dependencies, context_dependencies, errors, warnings) = build.into_parts();
        DependencyReport {
            index,
            dependencies,
            context_dependencies,
            errors,
            warnings,
        }
    }

    /// Compile `code` as the contents of `resource`.
    ///
    /// Only a parse error in the resource itself fails the call. Every
    /// other problem is collected in the returned output.
    pub async fn compile(&self, resource: &Path, code: &str) -> Result<LoaderOutput, LoaderError> {
        let code = self.with_prelude(code);
        let build = BuildContext::new();
        let index = self.shadow_pass(resource, &code, &build).await;
        tracing::debug!(
            "{}: {} record(s) across {} file(s), {} unresolved",
            resource.display(),
            index.record_count(),
            index.len(),
            index.failed_count()
        );

        let sheet = parse(&code, resource)?;
        let css = {
            let injector = ImportInjector::new(&index, &build);
            let mut evaluator =
                Evaluator::new(&self.options.style, self.source.as_ref(), &injector, resource);
            evaluator.evaluate(&sheet)?.to_css()
        };

        let (dependencies, context_dependencies, errors, warnings) = build.into_parts();
        Ok(LoaderOutput {
            css,
            dependencies,
            context_dependencies,
            errors,
            warnings,
        })
    }

    async fn shadow_pass(
        &self,
        resource: &Path,
        code: &str,
        build: &BuildContext,
    ) -> DependencyIndex {
        let context = ResolutionContext {
            paths: self.options.style.paths.clone(),
        };
        let builder = DependencyGraphBuilder::new(
            self.source.as_ref(),
            self.host.as_ref(),
            build,
            context,
            Scope::with_defines(&self.options.style.define),
        );
        builder.build(resource, code).await
    }

    /// The `imports` option as one leading import line.
    fn with_prelude(&self, code: &str) -> String {
        if self.options.imports.is_empty() {
            return code.to_string();
        }
        let line = self
            .options
            .imports
            .iter()
            .map(|request| format!("@import \"{request}\""))
            .collect::<Vec<_>>()
            .join("; ");
        format!("{line}\n{code}")
    }
}
