use std::path::PathBuf;
use thiserror::Error;

/// Syntax error reported by [`crate::style::parse`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}:{line}:{column}: {message}", file.display())]
pub struct ParseError {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Failure raised while evaluating a parsed stylesheet.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to locate @import file {path} ({}:{line}:{column})", file.display())]
    ImportNotFound {
        path: String,
        file: PathBuf,
        line: usize,
        column: usize,
    },

    #[error("import loop has been found: {}", path.display())]
    ImportLoop { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
