use crate::host::ResolveError;
use crate::resolve::site::ImportSite;
use crate::style::Position;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Outcome of resolving one import site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(PathBuf),
    /// Directory or glob expansion; order is the resolver's and is kept.
    ResolvedMany(Vec<PathBuf>),
    /// No strategy found the import. Carries the last strategy's diagnostic.
    Failed(ResolveError),
}

impl Resolution {
    /// Files this resolution points at.
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            Resolution::Resolved(path) => std::slice::from_ref(path),
            Resolution::ResolvedMany(paths) => paths,
            Resolution::Failed(_) => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Resolution::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRecord {
    pub site: ImportSite,
    pub resolution: Resolution,
}

/// File → its dependency records in document order.
///
/// Only files with at least one record are present. Written once per file
/// during the resolution pass and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyIndex {
    files: BTreeMap<PathBuf, Vec<DependencyRecord>>,
}

impl DependencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, file: PathBuf, records: Vec<DependencyRecord>) {
        debug_assert!(!records.is_empty());
        debug_assert!(!self.files.contains_key(&file));
        self.files.insert(file, records);
    }

    pub fn get(&self, file: &Path) -> Option<&[DependencyRecord]> {
        self.files.get(file).map(Vec::as_slice)
    }

    /// The record for the import at `pos` in `file` whose evaluated path is
    /// `path`.
    pub fn find(&self, file: &Path, pos: Position, path: &str) -> Option<&DependencyRecord> {
        self.get(file)?
            .iter()
            .find(|record| record.site.matches(pos, path))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &Vec<DependencyRecord>)> {
        self.files.iter()
    }

    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.keys()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    pub fn failed_count(&self) -> usize {
        self.files
            .values()
            .flatten()
            .filter(|r| r.resolution.is_failed())
            .count()
    }
}
