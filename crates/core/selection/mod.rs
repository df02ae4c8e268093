//! Prefix grouping of results and the checkbox state built on top of it.

pub mod state;
pub mod tree;

pub use state::{CheckState, SelectionState};
pub use tree::{GROUP_DEPTH, PrefixControl, PrefixNode, PrefixTree};
