use crate::errors::LoaderError;
use crate::host::{BuildContext, ResolveError};
use crate::resolve::index::{DependencyIndex, Resolution};
use crate::resolve::site::{classify, ImportClass};
use crate::style::{Block, CompileError, Evaluator, ImportHandler, ImportNode, Target};

/// Import handling for the real evaluation pass.
///
/// Each import node is matched to the record the shadow pass produced for
/// it, by file, target position and evaluated path, and expanded to the
/// file(s) that record names. Anything without a usable record goes through
/// the compiler's native handling. Failures are emitted to the build and
/// the import expands to nothing, so evaluation of the rest of the file
/// carries on.
pub struct ImportInjector<'a> {
    index: &'a DependencyIndex,
    build: &'a BuildContext,
}

impl<'a> ImportInjector<'a> {
    pub fn new(index: &'a DependencyIndex, build: &'a BuildContext) -> Self {
        Self { index, build }
    }

    fn import_one(
        &self,
        evaluator: &mut Evaluator<'_>,
        node: &ImportNode,
        target: &Target,
        host: Option<&ResolveError>,
    ) -> Block {
        match evaluator.import_default(node, target) {
            Ok(block) => block,
            Err(err) => {
                self.report(err, host);
                Block::default()
            }
        }
    }

    fn report(&self, err: CompileError, host: Option<&ResolveError>) {
        let err = match err {
            CompileError::Parse(parse) => LoaderError::from(parse),
            other => LoaderError::Import {
                message: other.to_string(),
                host: host.cloned(),
            },
        };
        self.build.emit_error(err);
    }
}

impl ImportHandler for ImportInjector<'_> {
    fn visit_import(
        &self,
        evaluator: &mut Evaluator<'_>,
        node: &ImportNode,
    ) -> Result<Block, CompileError> {
        let target = evaluator.eval_target(&node.path);
        let class = classify(&target.path, target.is_url_function);
        if class == ImportClass::UrlOnly || target.path.is_empty() {
            return Ok(self.import_one(evaluator, node, &target, None));
        }

        let record = self
            .index
            .find(evaluator.current_file(), target.pos, &target.path);
        match record.map(|r| &r.resolution) {
            Some(Resolution::Resolved(path)) => {
                let resolved = target.with_path(path.to_string_lossy());
                Ok(self.import_one(evaluator, node, &resolved, None))
            }
            Some(Resolution::ResolvedMany(paths)) => {
                let blocks: Vec<Block> = paths
                    .iter()
                    .map(|path| {
                        let member = target.with_path(path.to_string_lossy());
                        self.import_one(evaluator, node, &member, None)
                    })
                    .collect();
                Ok(merge_blocks(blocks))
            }
            Some(Resolution::Failed(host)) => {
                Ok(self.import_one(evaluator, node, &target, Some(host)))
            }
            None => {
                tracing::debug!(
                    "{}:{}: no resolution recorded for '{}'",
                    evaluator.current_file().display(),
                    target.pos,
                    target.path
                );
                Ok(self.import_one(evaluator, node, &target, None))
            }
        }
    }
}

/// Concatenate blocks in order into the first one, or an empty block when
/// there are none.
pub fn merge_blocks(blocks: impl IntoIterator<Item = Block>) -> Block {
    let mut blocks = blocks.into_iter();
    let Some(mut merged) = blocks.next() else {
        return Block::default();
    };
    for block in blocks {
        merged.extend(block);
    }
    merged
}
