use crate::errors::LoaderError;
use crate::host::{BuildContext, HostResolver};
use crate::resolve::chain::{ResolutionContext, StrategyChain};
use crate::resolve::index::{DependencyIndex, DependencyRecord, Resolution};
use crate::resolve::site::{extract_imports, ImportClass};
use crate::source::SourceAccessor;
use crate::style::{parse, Scope};
use futures::future::{join_all, LocalBoxFuture};
use futures::FutureExt;
use std::cell::RefCell;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

/// Shadow pass over a root file and everything it transitively imports.
///
/// Every reachable file is parsed and resolved once. Sibling subtrees are
/// awaited together on the current thread; a failure in one branch is
/// emitted to the build and never cancels the others.
pub struct DependencyGraphBuilder<'a> {
    source: &'a dyn SourceAccessor,
    host: &'a dyn HostResolver,
    build: &'a BuildContext,
    context: ResolutionContext,
    defines: Scope,
    visited: RefCell<HashSet<PathBuf>>,
    index: RefCell<DependencyIndex>,
}

impl<'a> DependencyGraphBuilder<'a> {
    pub fn new(
        source: &'a dyn SourceAccessor,
        host: &'a dyn HostResolver,
        build: &'a BuildContext,
        context: ResolutionContext,
        defines: Scope,
    ) -> Self {
        Self {
            source,
            host,
            build,
            context,
            defines,
            visited: RefCell::new(HashSet::new()),
            index: RefCell::new(DependencyIndex::new()),
        }
    }

    pub async fn build(self, root: &Path, code: &str) -> DependencyIndex {
        self.visited.borrow_mut().insert(root.to_path_buf());
        self.walk(root.to_path_buf(), code.to_string()).await;
        tracing::debug!(
            "resolved {} file(s) reachable from {}",
            self.visited.borrow().len(),
            root.display()
        );
        self.index.into_inner()
    }

    fn walk<'s>(&'s self, file: PathBuf, code: String) -> LocalBoxFuture<'s, ()> {
        async move {
            let sheet = match parse(&code, &file) {
                Ok(sheet) => sheet,
                Err(err) => {
                    self.build.emit_error(err.into());
                    return;
                }
            };

            let sites: Vec<_> = extract_imports(&sheet, &self.defines)
                .into_iter()
                .filter(|site| site.class != ImportClass::UrlOnly)
                .collect();
            if sites.is_empty() {
                return;
            }

            let chain = StrategyChain::new(self.source, self.host, self.build, &self.context);
            let resolutions = join_all(sites.iter().map(|site| chain.resolve(site))).await;

            let mut records = Vec::with_capacity(sites.len());
            let mut children = Vec::new();
            for (site, resolution) in sites.into_iter().zip(resolutions) {
                match &resolution {
                    Resolution::Resolved(path) if *path == file => {
                        tracing::warn!(
                            "{}:{}: import of itself dropped",
                            file.display(),
                            site.position()
                        );
                        self.build
                            .emit_warning(LoaderError::SelfImport { file: file.clone() });
                        continue;
                    }
                    Resolution::Resolved(_) | Resolution::ResolvedMany(_) => {
                        for path in resolution.paths().iter().filter(|p| **p != file) {
                            self.build.add_dependency(path);
                            children.extend(self.follow(path.clone()));
                        }
                    }
                    Resolution::Failed(_) => {}
                }
                records.push(DependencyRecord { site, resolution });
            }

            join_all(children).await;

            if !records.is_empty() {
                self.index.borrow_mut().insert(file, records);
            }
        }
        .boxed_local()
    }

    /// Claim `path` and return the future that reads and walks it, or `None`
    /// when another branch already claimed it. The claim happens here,
    /// before the first suspension point.
    fn follow<'s>(&'s self, path: PathBuf) -> Option<LocalBoxFuture<'s, ()>> {
        if !self.visited.borrow_mut().insert(path.clone()) {
            tracing::trace!("{} already visited", path.display());
            return None;
        }
        Some(
            async move {
                let code = self.source.read_file(&path).await.and_then(|bytes| {
                    String::from_utf8(bytes)
                        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
                });
                match code {
                    Ok(code) => self.walk(path, code).await,
                    Err(source) => {
                        tracing::warn!("could not read {}: {source}", path.display());
                        self.build.emit_error(LoaderError::Read { path, source });
                    }
                }
            }
            .boxed_local(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{NodeResolver, ResolveOptions};
    use crate::source::MemorySource;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn build_index(
        source: MemorySource,
        paths: &[&str],
        root: &str,
        code: &str,
    ) -> (Rc<MemorySource>, DependencyIndex, BuildContext) {
        let source = Rc::new(source);
        let host = NodeResolver::new(ResolveOptions::default(), source.clone());
        let build = BuildContext::new();
        let context = ResolutionContext {
            paths: paths.iter().map(PathBuf::from).collect(),
        };
        let builder =
            DependencyGraphBuilder::new(source.as_ref(), &host, &build, context, Scope::default());
        let index = block_on(builder.build(Path::new(root), code));
        (source, index, build)
    }

    fn summary(index: &DependencyIndex, file: &str) -> Vec<(usize, usize, String, Vec<PathBuf>)> {
        index
            .get(Path::new(file))
            .unwrap_or_default()
            .iter()
            .map(|r| {
                (
                    r.site.line,
                    r.site.column,
                    r.site.path.clone(),
                    r.resolution.paths().to_vec(),
                )
            })
            .collect()
    }

    #[test]
    fn single_native_import() {
        let (_, index, build) = build_index(
            MemorySource::new().with_file("/lib/b.styl", ".b\n  color blue"),
            &["/lib"],
            "/p/a.styl",
            ".a\n  color red\n@import \"b\"",
        );
        assert_eq!(
            summary(&index, "/p/a.styl"),
            vec![(3, 9, "b".to_string(), vec![PathBuf::from("/lib/b.styl")])]
        );
        assert!(index.get(Path::new("/lib/b.styl")).is_none());
        assert_eq!(index.len(), 1);
        assert_eq!(build.dependencies(), vec![PathBuf::from("/lib/b.styl")]);
        assert_eq!(build.error_count(), 0);
    }

    #[test]
    fn url_imports_create_no_records() {
        let (_, index, build) = build_index(
            MemorySource::new(),
            &[],
            "/p/a.styl",
            "@import \"http://example.com/x.css\"\n@import url(y.css)",
        );
        assert!(index.is_empty());
        assert!(build.dependencies().is_empty());
    }

    #[test]
    fn unresolvable_import_is_recorded_as_failed() {
        let (_, index, build) =
            build_index(MemorySource::new(), &[], "/p/a.styl", "@import \"missing\"");
        let records = index.get(Path::new("/p/a.styl")).unwrap();
        assert_eq!(records.len(), 1);
        match &records[0].resolution {
            Resolution::Failed(err) => assert_eq!(err.request, "missing"),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(index.failed_count(), 1);
        assert_eq!(build.error_count(), 0);
    }

    #[test]
    fn directory_import_recurses_into_every_member() {
        let (_, index, build) = build_index(
            MemorySource::new()
                .with_file("/p/pkgdir/one.styl", "@import \"../shared\"")
                .with_file("/p/pkgdir/two.styl", ".two")
                .with_file("/p/pkgdir/three.styl", ".three")
                .with_file("/p/shared.styl", ".shared"),
            &[],
            "/p/a.styl",
            "@import \"./pkgdir\"",
        );
        assert_eq!(
            summary(&index, "/p/a.styl"),
            vec![(
                1,
                9,
                "./pkgdir".to_string(),
                vec![
                    PathBuf::from("/p/pkgdir/one.styl"),
                    PathBuf::from("/p/pkgdir/three.styl"),
                    PathBuf::from("/p/pkgdir/two.styl"),
                ]
            )]
        );
        assert_eq!(
            summary(&index, "/p/pkgdir/one.styl"),
            vec![(1, 9, "../shared".to_string(), vec![PathBuf::from("/p/shared.styl")])]
        );
        assert_eq!(build.dependencies().len(), 4);
    }

    #[test]
    fn shared_dependency_is_read_once_but_recorded_per_importer() {
        let (source, index, _) = build_index(
            MemorySource::new()
                .with_file("/p/b.styl", "@import \"common\"")
                .with_file("/p/c.styl", "@import \"common\"")
                .with_file("/p/common.styl", ".common"),
            &[],
            "/p/a.styl",
            "@import \"b\"\n@import \"c\"",
        );
        assert_eq!(source.read_count(Path::new("/p/common.styl")), 1);
        assert_eq!(source.read_count(Path::new("/p/b.styl")), 1);
        assert_eq!(summary(&index, "/p/b.styl").len(), 1);
        assert_eq!(summary(&index, "/p/c.styl").len(), 1);
    }

    #[test]
    fn cycles_terminate() {
        let (source, index, build) = build_index(
            MemorySource::new()
                .with_file("/p/a.styl", "@import \"b\"")
                .with_file("/p/b.styl", "@import \"a\""),
            &[],
            "/p/a.styl",
            "@import \"b\"",
        );
        assert_eq!(source.read_count(Path::new("/p/a.styl")), 0);
        assert_eq!(
            summary(&index, "/p/b.styl"),
            vec![(1, 9, "a".to_string(), vec![PathBuf::from("/p/a.styl")])]
        );
        assert_eq!(build.error_count(), 0);
    }

    #[test]
    fn self_import_is_dropped_with_a_warning() {
        let (_, index, build) = build_index(
            MemorySource::new().with_file("/p/a.styl", "@import \"./a\"\n.a"),
            &[],
            "/p/a.styl",
            "@import \"./a\"\n.a",
        );
        assert!(index.get(Path::new("/p/a.styl")).is_none());
        assert!(build.dependencies().is_empty());
        assert_eq!(build.warning_count(), 1);
    }

    #[test]
    fn imports_sharing_a_line_are_told_apart_by_column() {
        let (_, index, _) = build_index(
            MemorySource::new()
                .with_file("/p/x.styl", "")
                .with_file("/p/y.styl", ""),
            &[],
            "/p/a.styl",
            "@import \"x\"; @import \"y\"",
        );
        let records = summary(&index, "/p/a.styl");
        assert_eq!(records.len(), 2);
        assert_eq!((records[0].0, records[0].1), (1, 9));
        assert_eq!((records[1].0, records[1].1), (1, 22));
        assert_eq!(records[1].3, vec![PathBuf::from("/p/y.styl")]);
    }

    #[test]
    fn parse_and_read_failures_do_not_stop_siblings() {
        let (_, index, build) = build_index(
            MemorySource::new()
                .with_file("/p/broken.styl", "@import \"unterminated")
                .with_unreadable("/p/locked.styl")
                .with_file("/p/fine.styl", "@import \"leaf\"")
                .with_file("/p/leaf.styl", ".leaf"),
            &[],
            "/p/a.styl",
            "@import \"broken\"\n@import \"locked\"\n@import \"fine\"",
        );
        assert_eq!(summary(&index, "/p/a.styl").len(), 3);
        assert_eq!(summary(&index, "/p/fine.styl").len(), 1);
        assert_eq!(build.error_count(), 2);
    }

    #[test]
    fn root_parse_error_yields_empty_index() {
        let (_, index, build) = build_index(MemorySource::new(), &[], "/p/a.styl", "}");
        assert!(index.is_empty());
        assert_eq!(build.error_count(), 1);
    }

    #[test]
    fn native_lookup_wins_over_host_package() {
        let (_, index, _) = build_index(
            MemorySource::new()
                .with_file("/lib/foo.styl", "")
                .with_file("/p/node_modules/foo/index.styl", ""),
            &["/lib"],
            "/p/a.styl",
            "@import \"foo\"",
        );
        assert_eq!(
            summary(&index, "/p/a.styl")[0].3,
            vec![PathBuf::from("/lib/foo.styl")]
        );
    }
}
