//! Stylus import resolution that reconciles the preprocessor's own lookup
//! rules with a host build system's module resolver.
//!
//! A compile runs in two passes. The shadow pass walks the import graph
//! from the root file and records, per import site, where the import
//! resolves to. The real pass evaluates the stylesheet with those
//! resolutions injected in place of the compiler's own lookup. See
//! [`loader::Loader`].

pub mod cli;
pub mod config;
pub mod errors;
pub mod graph;
pub mod host;
pub mod loader;
pub mod output;
pub mod resolve;
pub mod source;
pub mod style;

pub use errors::{LoaderError, StylgraphError};
pub use loader::{Loader, LoaderOptions, LoaderOutput};
