//! Two-pass import resolution.
//!
//! The shadow pass ([`DependencyGraphBuilder`]) parses the root and every
//! file it reaches, resolves each import site through the
//! [`StrategyChain`] and records the outcome in a [`DependencyIndex`]. The
//! real evaluation pass then runs with an [`ImportInjector`], which replays
//! those outcomes instead of resolving again.

pub mod chain;
pub mod index;
pub mod inject;
pub mod site;
pub mod walker;

pub use chain::{ResolutionContext, StrategyChain};
pub use index::{DependencyIndex, DependencyRecord, Resolution};
pub use inject::{merge_blocks, ImportInjector};
pub use site::{classify, extract_imports, ImportClass, ImportSite};
pub use walker::DependencyGraphBuilder;
