pub mod dot;
pub mod json;
pub mod text;

use crate::graph::{find_cycles, Cycle, GraphBuilder, ImportGraph};
use crate::loader::DependencyReport;
use crate::resolve::{ImportClass, Resolution};
use clap::ValueEnum;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Default, Clone, Copy, ValueEnum, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
    Dot,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" => Ok(OutputFormat::Text),
            "dot" => Ok(OutputFormat::Dot),
            other => Err(format!("unknown format '{other}' (expected json, text or dot)")),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "text",
            OutputFormat::Dot => "dot",
        };
        f.write_str(name)
    }
}

/// Serializable view of a shadow pass, shared by every writer.
#[derive(Debug, Serialize)]
pub struct DepsOutput {
    pub root: PathBuf,
    pub summary: Summary,
    pub files: Vec<FileEntry>,
    pub cycles: Vec<Cycle>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(skip)]
    pub graph: ImportGraph,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub files: usize,
    pub imports: usize,
    pub unresolved: usize,
    pub dependencies: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    pub file: PathBuf,
    pub imports: Vec<ImportEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Resolved,
    ResolvedMany,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportEntry {
    pub line: usize,
    pub column: usize,
    pub request: String,
    pub class: ImportClass,
    pub status: Status,
    pub targets: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DepsOutput {
    pub fn new(root: &Path, report: &DependencyReport) -> Self {
        let files = report
            .index
            .iter()
            .map(|(file, records)| FileEntry {
                file: file.clone(),
                imports: records
                    .iter()
                    .map(|record| {
                        let (status, error) = match &record.resolution {
                            Resolution::Resolved(_) => (Status::Resolved, None),
                            Resolution::ResolvedMany(_) => (Status::ResolvedMany, None),
                            Resolution::Failed(err) => (Status::Failed, Some(err.message.clone())),
                        };
                        ImportEntry {
                            line: record.site.line,
                            column: record.site.column,
                            request: record.site.path.clone(),
                            class: record.site.class,
                            status,
                            targets: record.resolution.paths().to_vec(),
                            error,
                        }
                    })
                    .collect(),
            })
            .collect();

        let graph = GraphBuilder::from_index(root, &report.index);
        let cycles = find_cycles(&graph);

        Self {
            root: root.to_path_buf(),
            summary: Summary {
                files: report.index.len(),
                imports: report.index.record_count(),
                unresolved: report.index.failed_count(),
                dependencies: report.dependencies.len(),
            },
            files,
            cycles,
            errors: report.errors.iter().map(ToString::to_string).collect(),
            warnings: report.warnings.iter().map(ToString::to_string).collect(),
            graph,
        }
    }
}
