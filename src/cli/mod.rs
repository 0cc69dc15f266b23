pub mod compile;
pub mod config;
pub mod deps;

use crate::config::resolve::CliOverrides;
use crate::errors::{Result, StylgraphError};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(
    name = "stylgraph",
    version,
    about = "Stylus import resolver with host module resolution"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile a stylesheet, resolving imports natively then through node_modules
    Compile(compile::CompileArgs),
    /// Print the resolved import index of a stylesheet
    Deps(deps::DepsArgs),
    /// Inspect configuration
    Config(config::ConfigArgs),
}

/// Dispatch to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Compile(args) => compile::run(&args),
        Commands::Deps(args) => deps::run(&args),
        Commands::Config(args) => config::run(&args),
    }
}

/// Loader options shared by `compile` and `deps`.
#[derive(Debug, Args)]
pub struct StylusArgs {
    /// Additional native search path (repeatable)
    #[arg(long = "paths", value_name = "DIR")]
    pub paths: Vec<PathBuf>,

    /// Inline imported .css files
    #[arg(long)]
    pub include_css: bool,

    /// Import this request before the file's own content (repeatable)
    #[arg(long = "import", value_name = "REQUEST")]
    pub imports: Vec<String>,

    /// Define a variable (repeatable)
    #[arg(long, value_name = "NAME=VALUE", value_parser = parse_key_val)]
    pub define: Vec<(String, String)>,

    /// Alias a request prefix to a path for the host resolver (repeatable)
    #[arg(long, value_name = "NAME=PATH", value_parser = parse_key_val)]
    pub alias: Vec<(String, String)>,
}

impl StylusArgs {
    pub fn to_cli_overrides(&self) -> CliOverrides {
        CliOverrides {
            paths: self.paths.clone(),
            include_css: self.include_css,
            imports: self.imports.clone(),
            define: self.define.clone(),
            alias: self
                .alias
                .iter()
                .map(|(name, path)| (name.clone(), absolute(Path::new(path))))
                .collect(),
            ..Default::default()
        }
    }
}

fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty name in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Canonical path of an input stylesheet.
pub(crate) fn input_file(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .ok()
        .filter(|p| p.is_file())
        .ok_or_else(|| StylgraphError::NoInput {
            path: path.to_path_buf(),
        })
}
