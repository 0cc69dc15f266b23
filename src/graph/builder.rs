use crate::graph::ir::{FileNode, ImportEdge, ImportGraph, ImportLocation};
use crate::resolve::DependencyIndex;
use petgraph::graph::NodeIndex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Builds an [`ImportGraph`] with one node per file and one edge per
/// importer/target pair.
pub struct GraphBuilder {
    graph: ImportGraph,
    node_map: HashMap<PathBuf, NodeIndex>,
    base: PathBuf,
}

impl GraphBuilder {
    /// Node names are shown relative to `base`.
    pub fn new(base: &Path) -> Self {
        Self {
            graph: ImportGraph::new(),
            node_map: HashMap::new(),
            base: base.to_path_buf(),
        }
    }

    /// Graph of every resolved import in `index`, with `root` as the first
    /// node. Failed resolutions contribute no edges.
    pub fn from_index(root: &Path, index: &DependencyIndex) -> ImportGraph {
        let base = root.parent().unwrap_or_else(|| Path::new(""));
        let mut builder = Self::new(base);
        builder.ensure_node(root);
        for (file, records) in index.iter() {
            for record in records {
                let location = ImportLocation {
                    line: record.site.line,
                    column: record.site.column,
                    request: record.site.path.clone(),
                };
                for target in record.resolution.paths() {
                    builder.add_import(file, target, location.clone());
                }
            }
        }
        builder.build()
    }

    fn ensure_node(&mut self, path: &Path) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(path) {
            return idx;
        }
        let name = path
            .strip_prefix(&self.base)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned();
        let idx = self.graph.add_node(FileNode {
            path: path.to_path_buf(),
            name,
        });
        self.node_map.insert(path.to_path_buf(), idx);
        idx
    }

    pub fn add_import(&mut self, from: &Path, to: &Path, location: ImportLocation) {
        let source_idx = self.ensure_node(from);
        let target_idx = self.ensure_node(to);

        if let Some(edge_idx) = self.graph.find_edge(source_idx, target_idx) {
            let edge = &mut self.graph[edge_idx];
            if !edge.locations.contains(&location) {
                edge.locations.push(location);
            }
        } else {
            self.graph.add_edge(
                source_idx,
                target_idx,
                ImportEdge {
                    locations: vec![location],
                },
            );
        }
    }

    pub fn build(self) -> ImportGraph {
        self.graph
    }
}
