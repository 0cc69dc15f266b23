use crate::host::{BuildContext, HostResolver, ResolveError};
use crate::resolve::index::Resolution;
use crate::resolve::site::{ImportClass, ImportSite};
use crate::source::SourceAccessor;
use crate::style::lookup;
use globset::GlobBuilder;
use std::path::{Path, PathBuf};

/// Per-build inputs shared by every resolution: the native search paths.
/// The importing file's directory is taken from each site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionContext {
    pub paths: Vec<PathBuf>,
}

const GLOB_WITHOUT_BASE: &str = "Glob resolving without a glob base (\"~**/*\") is not supported, \
     please specify a glob base (\"~package/**/*\")";

/// Ordered resolution strategies for one import site, first success wins:
/// native direct lookup, native index lookup (bare paths only), then the
/// host resolver with glob and directory expansion.
pub struct StrategyChain<'a> {
    source: &'a dyn SourceAccessor,
    host: &'a dyn HostResolver,
    build: &'a BuildContext,
    context: &'a ResolutionContext,
}

impl<'a> StrategyChain<'a> {
    pub fn new(
        source: &'a dyn SourceAccessor,
        host: &'a dyn HostResolver,
        build: &'a BuildContext,
        context: &'a ResolutionContext,
    ) -> Self {
        Self {
            source,
            host,
            build,
            context,
        }
    }

    pub async fn resolve(&self, site: &ImportSite) -> Resolution {
        debug_assert!(site.class != ImportClass::UrlOnly);

        if let Some(found) = self.native(site) {
            tracing::debug!(
                "{}:{}: '{}' found natively at {}",
                site.file.display(),
                site.position(),
                site.path,
                found.display()
            );
            return Resolution::Resolved(found);
        }

        let context = site.file.parent().unwrap_or_else(|| Path::new("."));
        match self.host_resolve(context, &site.path).await {
            Ok(resolution) => {
                tracing::debug!(
                    "{}:{}: '{}' resolved by host: {:?}",
                    site.file.display(),
                    site.position(),
                    site.path,
                    resolution.paths()
                );
                resolution
            }
            Err(err) => {
                tracing::debug!(
                    "{}:{}: '{}' unresolved: {err}",
                    site.file.display(),
                    site.position(),
                    site.path
                );
                Resolution::Failed(err)
            }
        }
    }

    fn native(&self, site: &ImportSite) -> Option<PathBuf> {
        let paths = lookup::search_paths(&site.file, &self.context.paths);
        let ignore = Some(site.file.as_path());
        match site.class {
            ImportClass::LiteralCss | ImportClass::LiteralStyle => {
                lookup::find(&site.path, &paths, ignore, self.source)
            }
            ImportClass::Bare => {
                let with_ext = format!("{}{}", site.path, lookup::STYLE_EXTENSION);
                lookup::find(&with_ext, &paths, ignore, self.source)
                    .or_else(|| lookup::lookup_index(&site.path, &paths, ignore, self.source))
            }
            ImportClass::UrlOnly => None,
        }
    }

    async fn host_resolve(
        &self,
        context: &Path,
        request: &str,
    ) -> Result<Resolution, ResolveError> {
        let requests = possible_requests(request);
        let err = match self.first_file(context, &requests).await {
            Ok(path) => return Ok(Resolution::Resolved(path)),
            Err(err) => err,
        };

        if is_glob(request) {
            return self.expand_glob(context, request).await;
        }

        match self.first_directory(context, &requests).await {
            Ok(dir) => {
                let files: Vec<PathBuf> = self
                    .source
                    .read_dir(&dir)
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|p| {
                        self.source.is_file(p) && lookup::has_style_extension(&p.to_string_lossy())
                    })
                    .collect();
                if files.is_empty() {
                    return Err(err);
                }
                self.build.add_context_dependency(&dir);
                Ok(Resolution::ResolvedMany(files))
            }
            Err(_) => Err(err),
        }
    }

    async fn first_file(
        &self,
        context: &Path,
        requests: &[String],
    ) -> Result<PathBuf, ResolveError> {
        let first = requests.first().map_or("", String::as_str);
        let mut last = ResolveError::not_found(first, context);
        for request in requests {
            match self.host.resolve(context, request).await {
                Ok(path) => return Ok(path),
                Err(err) => last = err,
            }
        }
        Err(last)
    }

    async fn first_directory(
        &self,
        context: &Path,
        requests: &[String],
    ) -> Result<PathBuf, ResolveError> {
        let first = requests.first().map_or("", String::as_str);
        let mut last = ResolveError::not_found(first, context);
        for request in requests {
            match self.host.resolve_context(context, request).await {
                Ok(path) => return Ok(path),
                Err(err) => last = err,
            }
        }
        Err(last)
    }

    async fn expand_glob(&self, context: &Path, pattern: &str) -> Result<Resolution, ResolveError> {
        let base = glob_base(pattern);
        if base == "." || base == "~" {
            return Err(ResolveError::new(GLOB_WITHOUT_BASE, pattern, context));
        }
        let dir = self.first_directory(context, &possible_requests(base)).await?;
        self.build.add_context_dependency(&dir);

        let rest = pattern[base.len()..].trim_start_matches('/');
        let matcher = GlobBuilder::new(rest)
            .literal_separator(true)
            .build()
            .map_err(|e| {
                ResolveError::new(format!("Invalid glob '{pattern}': {e}"), pattern, context)
            })?
            .compile_matcher();

        let files = self
            .source
            .walk_files(&dir)
            .into_iter()
            .filter(|file| {
                file.strip_prefix(&dir)
                    .is_ok_and(|relative| matcher.is_match(relative))
            })
            .filter(|file| lookup::has_style_extension(&file.to_string_lossy()))
            .collect();
        Ok(Resolution::ResolvedMany(files))
    }
}

/// Requests to hand the host resolver, in order. A leading `~` marks a
/// package request; a request naming only a package gets a trailing `/` so
/// it resolves as the package rather than a sibling file.
pub fn possible_requests(request: &str) -> Vec<String> {
    let mut primary = request.strip_prefix('~').unwrap_or(request).to_string();
    if request.starts_with('~') && names_only_package(&primary) && !primary.ends_with('/') {
        primary.push('/');
    }
    let mut requests = vec![primary];
    if requests[0] != request {
        requests.push(request.to_string());
    }
    requests
}

fn names_only_package(request: &str) -> bool {
    let trimmed = request.trim_end_matches('/');
    if trimmed.is_empty() {
        return false;
    }
    let segments = trimmed.split('/').count();
    if trimmed.starts_with('@') {
        segments <= 2
    } else {
        segments == 1
    }
}

pub fn is_glob(request: &str) -> bool {
    request.contains(['*', '?', '[', '{'])
}

/// Leading path segments of `pattern` that contain no glob syntax.
pub fn glob_base(pattern: &str) -> &str {
    let mut end = 0;
    for (i, segment) in pattern.split('/').enumerate() {
        if is_glob(segment) {
            break;
        }
        end = if i == 0 { segment.len() } else { end + 1 + segment.len() };
    }
    if end == 0 {
        "."
    } else {
        &pattern[..end]
    }
}
