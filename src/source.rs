use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io;
use std::path::{Component, Path, PathBuf};

/// Access to whatever storage backs the build.
///
/// `read_file` is the suspension point used by the resolution pass; the
/// remaining methods are synchronous, matching how the compiler's own import
/// handling and the native lookup rules touch the filesystem.
pub trait SourceAccessor {
    fn read_file<'a>(&'a self, path: &'a Path) -> LocalBoxFuture<'a, io::Result<Vec<u8>>>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    fn is_file(&self, path: &Path) -> bool;

    fn is_directory(&self, path: &Path) -> bool;

    /// Immediate children of a directory, sorted.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Every file below `dir`, sorted.
    fn walk_files(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let mut pending = vec![dir.to_path_buf()];
        while let Some(current) = pending.pop() {
            let Ok(entries) = self.read_dir(&current) else {
                continue;
            };
            for entry in entries {
                if self.is_directory(&entry) {
                    pending.push(entry);
                } else if self.is_file(&entry) {
                    files.push(entry);
                }
            }
        }
        files.sort();
        files
    }
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component. Symlinks are not consulted.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSource;

impl SourceAccessor for FsSource {
    fn read_file<'a>(&'a self, path: &'a Path) -> LocalBoxFuture<'a, io::Result<Vec<u8>>> {
        async move { std::fs::read(path) }.boxed_local()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<io::Result<Vec<_>>>()?;
        entries.sort();
        Ok(entries)
    }

    fn walk_files(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect();
        files.sort();
        files
    }
}

/// In-memory sources keyed by absolute path. Directories are implied by the
/// files beneath them. Reads are counted per path.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: BTreeMap<PathBuf, String>,
    unreadable: BTreeSet<PathBuf>,
    reads: RefCell<HashMap<PathBuf, usize>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files
            .insert(normalize_path(&path.into()), content.into());
    }

    /// Keep the file visible to lookups but make every read of it fail.
    pub fn with_unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        let path = normalize_path(&path.into());
        self.files.entry(path.clone()).or_default();
        self.unreadable.insert(path);
        self
    }

    /// Number of reads (async or sync) of `path` so far.
    pub fn read_count(&self, path: &Path) -> usize {
        self.reads.borrow().get(path).copied().unwrap_or(0)
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        let path = normalize_path(path);
        *self.reads.borrow_mut().entry(path.clone()).or_insert(0) += 1;
        if self.unreadable.contains(&path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {}", path.display()),
            ));
        }
        self.files.get(&path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }
}

impl SourceAccessor for MemorySource {
    fn read_file<'a>(&'a self, path: &'a Path) -> LocalBoxFuture<'a, io::Result<Vec<u8>>> {
        async move { self.read(path).map(String::into_bytes) }.boxed_local()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.read(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize_path(path))
    }

    fn is_directory(&self, path: &Path) -> bool {
        let path = normalize_path(path);
        self.files
            .keys()
            .any(|file| file != &path && file.starts_with(&path))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let dir = normalize_path(path);
        let children: BTreeSet<PathBuf> = self
            .files
            .keys()
            .filter(|file| *file != &dir)
            .filter_map(|file| file.strip_prefix(&dir).ok())
            .filter_map(|rest| rest.components().next())
            .map(|first| dir.join(first.as_os_str()))
            .collect();
        if children.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", dir.display()),
            ));
        }
        Ok(children.into_iter().collect())
    }
}
