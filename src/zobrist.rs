//! Zobrist keys for position hashing.
//!
//! The keys are generated deterministically with splitmix64 from a fixed
//! seed, so they are identical across runs and platforms. The black side
//! key is derived so that `SIDE[Black] ^ SIDE[White] == MOVE_KEY`; making a
//! move therefore keeps the invariant "state hash = piece keys XOR key of
//! the side to move", which the incremental-hash tests rely on.

use std::sync::OnceLock;

use crate::types::{Color, Piece, Square};

/// XORed into the state hash by every regular move (flips the side-to-move
/// component).
pub const MOVE_KEY: u64 = 0x54ca_3eb5_b5f3_cb5b;

/// XORed by a null move instead of `MOVE_KEY`, so positions reached through
/// a null move never transpose with real lines.
pub const NULL_MOVE_KEY: u64 = 0x08d9_bc25_bebf_91b1;

pub struct Keys {
    /// [piece][square]; the none-piece rows are zero.
    pub piece: [[u64; Square::COUNT]; Piece::COUNT],
    pub side: [u64; Color::COUNT],
    /// [file of the en-passant square]
    pub ep: [u64; 8],
    /// [castle-rights byte, including the castle-done bits]
    pub castling: [u64; 64],
}

static KEYS: OnceLock<Box<Keys>> = OnceLock::new();

#[inline]
pub fn keys() -> &'static Keys {
    KEYS.get_or_init(build)
}

pub fn init() {
    let _ = keys();
}

fn split_mix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

fn build() -> Box<Keys> {
    let mut state = 0x9d39_247e_3377_6d41u64;
    let mut keys = Box::new(Keys {
        piece: [[0; Square::COUNT]; Piece::COUNT],
        side: [0; Color::COUNT],
        ep: [0; 8],
        castling: [0; 64],
    });

    // Index 0 is the empty square and index 1 is unused; both stay zero so
    // XORing a none-piece is a no-op.
    for piece in 2..Piece::COUNT {
        for sq in 0..Square::COUNT {
            keys.piece[piece][sq] = split_mix64(&mut state);
        }
    }

    keys.side[Color::White.index()] = split_mix64(&mut state);
    keys.side[Color::Black.index()] = keys.side[Color::White.index()] ^ MOVE_KEY;

    for file in 0..8 {
        keys.ep[file] = split_mix64(&mut state);
    }
    for rights in 0..64 {
        keys.castling[rights] = split_mix64(&mut state);
    }

    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_deterministic_and_distinct() {
        let k = keys();
        assert_eq!(k.side[0] ^ k.side[1], MOVE_KEY);
        // Spot-check that keys do not repeat across a few slots.
        let mut seen = std::collections::HashSet::new();
        for piece in 2..Piece::COUNT {
            for sq in 0..Square::COUNT {
                assert!(seen.insert(k.piece[piece][sq]));
            }
        }
        for rights in 0..64 {
            assert!(seen.insert(k.castling[rights]));
        }
    }
}
