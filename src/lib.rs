pub mod bitboard;
pub mod board;
pub mod eval;
pub mod magic;
pub mod search;
pub mod types;
pub mod uci;
pub mod zobrist;

pub use board::{Board, START_FEN};

/// Builds every lazily initialized table up front. Lookups self-initialize,
/// so this only moves the one-time cost out of the first search.
pub fn init() {
    bitboard::init();
    zobrist::init();
    eval::scores::init();
}
