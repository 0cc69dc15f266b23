pub mod builder;
pub mod cycles;
pub mod ir;

pub use builder::GraphBuilder;
pub use cycles::{find_cycles, Cycle};
pub use ir::{FileNode, ImportEdge, ImportGraph, ImportLocation};
