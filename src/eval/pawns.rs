//! Pawn-structure hash table.
//!
//! Pawn structure changes rarely between nearby positions, so everything
//! that depends only on the two pawn bitboards is scanned once and cached
//! in a small direct-mapped table. A slot stores both pawn boards for
//! collision detection plus the scan results.

use crate::bitboard::{self as bb, BitBoard};
use crate::board::Board;
use crate::eval::scores;
use crate::types::{relative_rank, Color, Direction, Score, Square};

pub const PAWN_HASH_SIZE_LOG2: u32 = 12;
const SLOTS: usize = 1 << PAWN_HASH_SIZE_LOG2;

#[derive(Clone, Copy, Default)]
pub struct PawnHashEntry {
    /// The scanned pawn boards; a probe is valid only when both match.
    pub pawns: [BitBoard; Color::COUNT],
    pub passed: BitBoard,
    pub isolated: BitBoard,
    pub doubled: BitBoard,
    pub backward: BitBoard,
    /// [side][file + 1]: relative rank of the side's most advanced pawn per
    /// file; the sentinel columns keep adjacent-file queries in bounds.
    pub most_advanced: [[u8; 10]; Color::COUNT],
    pub pawn_eval: [Score; Color::COUNT],
    pub islands: [u8; Color::COUNT],
    pub distortion: [u8; Color::COUNT],
}

pub struct PawnHashTable {
    entries: Vec<PawnHashEntry>,
}

impl PawnHashTable {
    pub fn new() -> PawnHashTable {
        PawnHashTable {
            entries: vec![PawnHashEntry::default(); SLOTS],
        }
    }

    pub fn reset(&mut self) {
        self.entries.fill(PawnHashEntry::default());
    }

    fn index_of(wpawns: BitBoard, bpawns: BitBoard) -> usize {
        // Pawns never stand on the first or last rank, so only 48 bits carry
        // information; fold them down to the table size.
        let mut hash = (wpawns.0 ^ bpawns.0) >> 8;
        hash ^= (hash >> PAWN_HASH_SIZE_LOG2)
            ^ (hash >> (PAWN_HASH_SIZE_LOG2 * 2))
            ^ (hash >> (PAWN_HASH_SIZE_LOG2 * 3));
        (hash & (SLOTS as u64 - 1)) as usize
    }

    /// Returns the cached entry for the board's pawn structure, scanning it
    /// first on a miss.
    pub fn get_or_scan(&mut self, board: &Board) -> &PawnHashEntry {
        let wpawns = board.pawns(Color::White);
        let bpawns = board.pawns(Color::Black);
        let index = Self::index_of(wpawns, bpawns);

        let mut key = [BitBoard::EMPTY; Color::COUNT];
        key[Color::White.index()] = wpawns;
        key[Color::Black.index()] = bpawns;

        if self.entries[index].pawns != key {
            let mut entry = PawnHashEntry {
                pawns: key,
                ..Default::default()
            };
            scan_pawns(board, &mut entry, Color::White);
            scan_pawns(board, &mut entry, Color::Black);
            self.entries[index] = entry;
        }

        &self.entries[index]
    }
}

impl Default for PawnHashTable {
    fn default() -> Self {
        PawnHashTable::new()
    }
}

fn scan_pawns(board: &Board, entry: &mut PawnHashEntry, side: Color) {
    let opp = side.opposite();
    let up = Direction::Up.relative(side);

    let pawns = board.pawns(side);
    let enemy_pawns = board.pawns(opp);
    let our_pawn_attacks = pawns.pawn_attacked_squares(side);
    let si = side.index();

    for sq in pawns {
        let file = sq.file();
        let rel_rank = relative_rank(side, sq.rank());

        entry.most_advanced[si][file as usize + 1] =
            entry.most_advanced[si][file as usize + 1].max(rel_rank);

        // Island counting: each pawn on the last file of its island counts.
        if file == 7 || (BitBoard::from_file(file + 1) & pawns).is_empty() {
            entry.islands[si] += 1;
        } else {
            let next_file_pawns = BitBoard::from_file(file + 1) & pawns;
            let step = next_file_pawns.lsb().rank().abs_diff(sq.rank());
            entry.distortion[si] += step.saturating_sub(1);
        }

        if our_pawn_attacks.test(sq) {
            entry.pawn_eval[si] += scores::DEFENDED_PAWN[rel_rank as usize];
        }

        if (bb::three_files_forward(side, sq) & enemy_pawns).is_empty()
            && (bb::direction_bits(sq, up) & pawns).is_empty()
        {
            entry.pawn_eval[si] += scores::PASSED_PAWN[rel_rank as usize];
            entry.passed.set(sq);
        }

        if (bb::adjacent_files(file) & pawns).is_empty() {
            entry.pawn_eval[si] += scores::ISOLATED_PAWN;
            entry.isolated.set(sq);
        }

        if (bb::direction_bits(sq, up) & pawns).any() {
            entry.pawn_eval[si] += scores::DOUBLE_PAWN;
            entry.doubled.set(sq);
        }

        // Backward: no friendly pawn can ever defend the stop square, and an
        // enemy pawn attacks it.
        let stop = sq.shifted(up);
        if (bb::adjacent_files_forward(opp, stop) & pawns).is_empty()
            && (bb::pawn_attacks(side, stop) & enemy_pawns).any()
        {
            entry.pawn_eval[si] += scores::BACKWARD_PAWN;
            entry.backward.set(sq);
        }
    }

    let islands = (entry.islands[si] as usize).min(scores::PAWN_ISLANDS.len() - 1);
    entry.pawn_eval[si] += scores::PAWN_ISLANDS[islands];
    entry.pawn_eval[si] += scores::PAWN_DISTORTION * entry.distortion[si] as i16;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn entry_for(fen: &str) -> PawnHashEntry {
        crate::init();
        let board = Board::from_fen(fen).expect("valid fen");
        let mut table = PawnHashTable::new();
        *table.get_or_scan(&board)
    }

    #[test]
    fn startpos_has_no_structural_features() {
        let e = entry_for("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert!(e.passed.is_empty());
        assert!(e.isolated.is_empty());
        assert!(e.doubled.is_empty());
        assert!(e.backward.is_empty());
        assert_eq!(e.islands, [1, 1]);
        assert_eq!(e.pawn_eval[0], e.pawn_eval[1]);
    }

    #[test]
    fn passed_pawn_detected() {
        // White pawn on e5 with no black pawns ahead of it.
        let e = entry_for("4k3/8/8/4P3/8/8/8/4K3 w - - 0 1");
        assert!(e.passed.test(Square::make(4, 4)));
        assert!(e.isolated.test(Square::make(4, 4)));
    }

    #[test]
    fn doubled_and_isolated() {
        let e = entry_for("4k3/8/8/8/4P3/4P3/8/4K3 w - - 0 1");
        // The rear pawn is doubled, both are isolated.
        assert!(e.doubled.test(Square::make(4, 2)));
        assert!(!e.doubled.test(Square::make(4, 3)));
        assert_eq!((e.isolated & e.pawns[Color::White.index()]).popcnt(), 2);
    }

    #[test]
    fn backward_pawn_detected() {
        // White d4/e3 versus black d5: e3 cannot advance (d5xe4) and has no
        // pawn behind it on an adjacent file.
        let e = entry_for("4k3/8/8/3p4/3P4/4P3/8/4K3 w - - 0 1");
        assert!(e.backward.test(Square::make(4, 2)));
    }

    #[test]
    fn island_count() {
        // a2, c2, c3, h4: islands a, c, h.
        let e = entry_for("4k3/8/8/8/7P/2P5/P1P5/4K3 w - - 0 1");
        assert_eq!(e.islands[Color::White.index()], 4); // c-file counts per pawn
    }

    #[test]
    fn cache_returns_identical_entry() {
        crate::init();
        let board =
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
        let mut table = PawnHashTable::new();
        let first = *table.get_or_scan(&board);
        let second = *table.get_or_scan(&board);
        assert_eq!(first.pawn_eval, second.pawn_eval);
        assert_eq!(first.passed, second.passed);
    }
}
