use crate::host::ResolveError;
use crate::style::{CompileError, ParseError};
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Diagnostics emitted to the build while loading one stylesheet.
#[derive(Error, Diagnostic, Debug)]
pub enum LoaderError {
    #[error("Parse error in {}:{line}:{column}: {message}", file.display())]
    #[diagnostic(code(stylgraph::parse))]
    Parse {
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Could not read {}: {source}", path.display())]
    #[diagnostic(code(stylgraph::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", import_failure(.message, .host))]
    #[diagnostic(code(stylgraph::resolve))]
    Import {
        message: String,
        host: Option<ResolveError>,
    },

    #[error(transparent)]
    #[diagnostic(code(stylgraph::compile))]
    Compile(CompileError),

    #[error("{} imports itself; the import was skipped during resolution", file.display())]
    #[diagnostic(code(stylgraph::self_import), severity(Warning))]
    SelfImport { file: PathBuf },
}

impl From<ParseError> for LoaderError {
    fn from(err: ParseError) -> Self {
        LoaderError::Parse {
            file: err.file,
            line: err.line,
            column: err.column,
            message: err.message,
        }
    }
}

impl From<CompileError> for LoaderError {
    fn from(err: CompileError) -> Self {
        match err {
            CompileError::Parse(parse) => parse.into(),
            other => LoaderError::Compile(other),
        }
    }
}

fn import_failure(message: &str, host: &Option<ResolveError>) -> String {
    let mut text = format!("Stylus resolver error: {message}");
    if let Some(host) = host {
        let missing: Vec<String> = host
            .missing
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        text.push_str(&format!(
            "\n\nHost resolver error details:\n{}\n{}\n\nHost resolver error missing:\n{}\n",
            host.message,
            host.details.join("\n"),
            missing.join("\n")
        ));
    }
    text
}

/// Errors surfaced by the command line.
#[derive(Error, Diagnostic, Debug)]
pub enum StylgraphError {
    #[error("Input file not found: {}", path.display())]
    #[diagnostic(code(stylgraph::no_input))]
    NoInput { path: PathBuf },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(stylgraph::config))]
    Config(String),

    #[error("Build failed with {errors} error(s)")]
    #[diagnostic(code(stylgraph::build_failed))]
    BuildFailed { errors: usize },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    #[diagnostic(code(stylgraph::io))]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(stylgraph::json))]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StylgraphError>;
