use std::collections::BTreeMap;
use std::path::PathBuf;

/// Where a configuration value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Default,
    UserConfig(PathBuf),
    ProjectConfig(PathBuf),
    EnvVar(String),
    CliFlag(String),
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Default => write!(f, "default"),
            Source::UserConfig(path) => write!(f, "user config ({})", path.display()),
            Source::ProjectConfig(path) => write!(f, "project config ({})", path.display()),
            Source::EnvVar(name) => write!(f, "env var ({})", name),
            Source::CliFlag(name) => write!(f, "CLI flag ({})", name),
        }
    }
}

/// Tracks the source of each configuration value by dotted key.
#[derive(Debug, Clone, Default)]
pub struct ProvenanceMap {
    entries: BTreeMap<String, Source>,
}

impl ProvenanceMap {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, source: Source) {
        self.entries.insert(key.into(), source);
    }

    pub fn get(&self, key: &str) -> Option<&Source> {
        self.entries.get(key)
    }

    /// Return all entries sorted by key.
    pub fn sorted_entries(&self) -> Vec<(&str, &Source)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_layers_replace_earlier_ones() {
        let mut map = ProvenanceMap::new();
        map.set("stylus.paths", Source::Default);
        map.set(
            "stylus.paths",
            Source::ProjectConfig(PathBuf::from("/project/.stylgraph.toml")),
        );

        assert_eq!(
            map.get("stylus.paths"),
            Some(&Source::ProjectConfig(PathBuf::from(
                "/project/.stylgraph.toml"
            )))
        );
        assert_eq!(map.get("nonexistent"), None);
    }

    #[test]
    fn sorted_entries_order() {
        let mut map = ProvenanceMap::new();
        map.set("stylus.paths", Source::Default);
        map.set("defaults.format", Source::Default);
        map.set("resolve.alias", Source::Default);

        let keys: Vec<&str> = map.sorted_entries().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["defaults.format", "resolve.alias", "stylus.paths"]);
    }

    #[test]
    fn display_sources() {
        assert_eq!(format!("{}", Source::Default), "default");
        assert_eq!(
            format!(
                "{}",
                Source::ProjectConfig(PathBuf::from("/project/.stylgraph.toml"))
            ),
            "project config (/project/.stylgraph.toml)"
        );
        assert_eq!(
            format!("{}", Source::EnvVar("STYLGRAPH_PATHS".to_string())),
            "env var (STYLGRAPH_PATHS)"
        );
        assert_eq!(
            format!("{}", Source::CliFlag("--include-css".to_string())),
            "CLI flag (--include-css)"
        );
    }
}
