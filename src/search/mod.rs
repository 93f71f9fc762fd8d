//! Best-move search: iterative deepening alpha-beta with a transposition
//! table, aggressive move ordering and a portfolio of pruning heuristics.

pub mod limits;
pub mod picker;
#[allow(clippy::module_inception)]
pub mod search;
pub mod tt;

pub use limits::Limits;
pub use picker::{History, MovePicker};
pub use search::{perft, NodeType, PostMode, Search, SearchResult, SearchStack};
pub use tt::TranspositionTable;
