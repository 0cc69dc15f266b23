pub mod provenance;
pub mod resolve;
pub mod schema;
pub mod show;

use crate::host::ResolveOptions;
use crate::loader::LoaderOptions;
use crate::output::OutputFormat;
use crate::style::CompileOptions;
use provenance::ProvenanceMap;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Fully resolved configuration, no Option fields.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    // Operational
    pub format: OutputFormat,

    // Compiler
    pub paths: Vec<PathBuf>,
    pub include_css: bool,
    pub imports: Vec<String>,
    pub define: BTreeMap<String, String>,

    // Host resolver
    pub resolve: ResolveOptions,

    // Provenance
    pub provenance: ProvenanceMap,
    pub loaded_files: Vec<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            paths: Vec::new(),
            include_css: false,
            imports: Vec::new(),
            define: BTreeMap::new(),
            resolve: ResolveOptions::default(),
            provenance: ProvenanceMap::new(),
            loaded_files: Vec::new(),
        }
    }
}

impl ResolvedConfig {
    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            style: CompileOptions {
                paths: self.paths.clone(),
                include_css: self.include_css,
                define: self.define.clone(),
            },
            imports: self.imports.clone(),
            resolve: self.resolve.clone(),
        }
    }
}
