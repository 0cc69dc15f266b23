use crate::config::provenance::{ProvenanceMap, Source};
use crate::config::schema::FileConfig;
use crate::config::ResolvedConfig;
use crate::errors::{Result, StylgraphError};
use crate::output::OutputFormat;
use std::path::{Path, PathBuf};

pub const PROJECT_CONFIG_FILE: &str = ".stylgraph.toml";

/// CLI overrides extracted from command arguments.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub format: Option<OutputFormat>,
    pub paths: Vec<PathBuf>,
    pub include_css: bool,
    pub imports: Vec<String>,
    pub define: Vec<(String, String)>,
    pub alias: Vec<(String, PathBuf)>,
}

/// Resolve configuration by applying layers bottom-up:
/// 1. Built-in defaults
/// 2. User config (~/.config/stylgraph/config.toml)
/// 3. Project config (nearest .stylgraph.toml walking up from working_dir)
/// 4. Environment variables
/// 5. CLI overrides
pub fn resolve_config(working_dir: &Path, cli: &CliOverrides) -> Result<ResolvedConfig> {
    let mut prov = ProvenanceMap::new();
    let mut loaded_files = Vec::new();

    // 1. Start with built-in defaults
    let mut config = ResolvedConfig::default();
    set_all_default_provenance(&mut prov);

    // 2. User config
    if let Some(user_config_path) = find_user_config() {
        if user_config_path.exists() {
            let file_config = load_file(&user_config_path, "user")?;
            apply_file_config(
                &mut config,
                &file_config,
                &user_config_path,
                Source::UserConfig(user_config_path.clone()),
                &mut prov,
            );
            loaded_files.push(user_config_path);
        }
    }

    // 3. Project config (walk up from working_dir)
    if let Some(project_config_path) = find_project_config(working_dir) {
        let file_config = load_file(&project_config_path, "project")?;
        apply_file_config(
            &mut config,
            &file_config,
            &project_config_path,
            Source::ProjectConfig(project_config_path.clone()),
            &mut prov,
        );
        loaded_files.push(project_config_path);
    }

    // 4. Environment variables
    apply_env_vars(&mut config, &mut prov);

    // 5. CLI overrides
    apply_cli_overrides(&mut config, cli, &mut prov);

    config.provenance = prov;
    config.loaded_files = loaded_files;

    Ok(config)
}

fn load_file(path: &Path, layer: &str) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path).map_err(|_| {
        StylgraphError::Config(format!("Could not read {layer} config: {}", path.display()))
    })?;
    FileConfig::from_toml(&content).map_err(|e| {
        StylgraphError::Config(format!("Invalid {layer} config {}: {e}", path.display()))
    })
}

fn find_user_config() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("stylgraph").join("config.toml"))
}

fn find_project_config(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let config_path = dir.join(PROJECT_CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

fn set_all_default_provenance(prov: &mut ProvenanceMap) {
    let defaults = [
        "defaults.format",
        "stylus.paths",
        "stylus.include_css",
        "stylus.import",
        "stylus.define",
        "resolve.alias",
        "resolve.modules",
        "resolve.condition_names",
        "resolve.main_fields",
        "resolve.main_files",
        "resolve.extensions",
    ];
    for key in defaults {
        prov.set(key, Source::Default);
    }
}

fn apply_file_config(
    config: &mut ResolvedConfig,
    file: &FileConfig,
    file_path: &Path,
    source: Source,
    prov: &mut ProvenanceMap,
) {
    let base = file_path.parent().unwrap_or_else(|| Path::new("."));

    // Defaults
    if let Some(ref format) = file.defaults.format {
        match format.parse::<OutputFormat>() {
            Ok(format) => {
                config.format = format;
                prov.set("defaults.format", source.clone());
            }
            Err(e) => tracing::warn!("{}: {e}", file_path.display()),
        }
    }

    // Compiler
    if let Some(ref paths) = file.stylus.paths {
        config.paths = paths.iter().map(|p| base.join(p)).collect();
        prov.set("stylus.paths", source.clone());
    }
    if let Some(include_css) = file.stylus.include_css {
        config.include_css = include_css;
        prov.set("stylus.include_css", source.clone());
    }
    if let Some(ref imports) = file.stylus.import {
        config.imports = imports.clone();
        prov.set("stylus.import", source.clone());
    }
    if !file.stylus.define.is_empty() {
        config.define.extend(file.stylus.define.clone());
        prov.set("stylus.define", source.clone());
    }

    // Host resolver
    let resolve = &file.resolve;
    if !resolve.alias.is_empty() {
        config.resolve.alias.extend(
            resolve
                .alias
                .iter()
                .map(|(name, target)| (name.clone(), base.join(target))),
        );
        prov.set("resolve.alias", source.clone());
    }
    let lists = [
        ("resolve.modules", &resolve.modules, &mut config.resolve.modules),
        (
            "resolve.condition_names",
            &resolve.condition_names,
            &mut config.resolve.condition_names,
        ),
        (
            "resolve.main_fields",
            &resolve.main_fields,
            &mut config.resolve.main_fields,
        ),
        (
            "resolve.main_files",
            &resolve.main_files,
            &mut config.resolve.main_files,
        ),
        (
            "resolve.extensions",
            &resolve.extensions,
            &mut config.resolve.extensions,
        ),
    ];
    for (key, value, target) in lists {
        if let Some(value) = value {
            *target = value.clone();
            prov.set(key, source.clone());
        }
    }
}

fn env_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

fn apply_env_vars(config: &mut ResolvedConfig, prov: &mut ProvenanceMap) {
    if let Ok(val) = std::env::var("STYLGRAPH_FORMAT") {
        match val.parse::<OutputFormat>() {
            Ok(format) => {
                config.format = format;
                prov.set("defaults.format", Source::EnvVar("STYLGRAPH_FORMAT".into()));
            }
            Err(e) => tracing::warn!("STYLGRAPH_FORMAT: {e}"),
        }
    }
    if let Some(val) = std::env::var_os("STYLGRAPH_PATHS") {
        config.paths = std::env::split_paths(&val)
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        prov.set("stylus.paths", Source::EnvVar("STYLGRAPH_PATHS".into()));
    }
    if let Ok(val) = std::env::var("STYLGRAPH_INCLUDE_CSS") {
        config.include_css = env_flag(&val);
        prov.set(
            "stylus.include_css",
            Source::EnvVar("STYLGRAPH_INCLUDE_CSS".into()),
        );
    }
    if let Ok(val) = std::env::var("STYLGRAPH_IMPORT") {
        config.imports = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        prov.set("stylus.import", Source::EnvVar("STYLGRAPH_IMPORT".into()));
    }
}

fn apply_cli_overrides(config: &mut ResolvedConfig, cli: &CliOverrides, prov: &mut ProvenanceMap) {
    if let Some(format) = cli.format {
        config.format = format;
        prov.set("defaults.format", Source::CliFlag("--format".into()));
    }
    if !cli.paths.is_empty() {
        config.paths = cli.paths.clone();
        prov.set("stylus.paths", Source::CliFlag("--paths".into()));
    }
    if cli.include_css {
        config.include_css = true;
        prov.set("stylus.include_css", Source::CliFlag("--include-css".into()));
    }
    if !cli.imports.is_empty() {
        config.imports = cli.imports.clone();
        prov.set("stylus.import", Source::CliFlag("--import".into()));
    }
    if !cli.define.is_empty() {
        config.define.extend(cli.define.iter().cloned());
        prov.set("stylus.define", Source::CliFlag("--define".into()));
    }
    if !cli.alias.is_empty() {
        config.resolve.alias.extend(cli.alias.iter().cloned());
        prov.set("resolve.alias", Source::CliFlag("--alias".into()));
    }
}
