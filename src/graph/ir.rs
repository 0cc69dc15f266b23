use petgraph::graph::DiGraph;
use serde::Serialize;
use std::path::PathBuf;

/// File-level import graph derived from a dependency index.
pub type ImportGraph = DiGraph<FileNode, ImportEdge>;

#[derive(Debug, Clone, Serialize)]
pub struct FileNode {
    pub path: PathBuf,
    /// Path relative to the root file's directory when it lies below it.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportLocation {
    pub line: usize,
    pub column: usize,
    pub request: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportEdge {
    /// Every import statement that contributed to this edge
    pub locations: Vec<ImportLocation>,
}
