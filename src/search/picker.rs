//! Move ordering: scoring, the pick-best iterator and the history tables.
//!
//! Ordering tiers: the hash move first, then captures and promotions by
//! MVV/LVA, then the two killers of the ply, then quiet moves by their
//! historical cutoff rate. Picking is a linear max-scan; the lists are
//! short and the best moves resolve first, so this beats a full sort.

use crate::board::Board;
use crate::eval::scores;
use crate::types::{Color, Depth, Move, MoveList, MoveType, Piece, Square, Value};

const SCORE_TABLE_MOVE: Value = 30000;
const SCORE_CAPTURE: Value = 1000;
const SCORE_FIRST_KILLER: Value = 120;
const SCORE_SECOND_KILLER: Value = 110;

/// Success/try counters per (piece, to-square), aged between searches.
pub struct History {
    tries: [[u32; Square::COUNT]; Piece::COUNT],
    successes: [[u32; Square::COUNT]; Piece::COUNT],
}

impl History {
    const RENEWAL_SHIFT: u32 = 3;

    pub fn new() -> History {
        History {
            tries: [[0; Square::COUNT]; Piece::COUNT],
            successes: [[0; Square::COUNT]; Piece::COUNT],
        }
    }

    /// Ages both tables sharply instead of clearing them; recent history is
    /// still partially predictive for the next search.
    pub fn decay(&mut self) {
        for piece in 0..Piece::COUNT {
            for sq in 0..Square::COUNT {
                self.tries[piece][sq] >>= History::RENEWAL_SHIFT;
                self.successes[piece][sq] >>= History::RENEWAL_SHIFT;
            }
        }
    }

    #[inline]
    pub fn add_try(&mut self, piece: Piece, to: Square, depth: Depth) {
        self.tries[piece.index()][to.index()] += (depth * depth) as u32;
    }

    #[inline]
    pub fn add_success(&mut self, piece: Piece, to: Square, depth: Depth) {
        self.successes[piece.index()][to.index()] += (depth * depth) as u32;
    }

    /// Success rate in roughly [0, 100]. The +1/+2 smoothing separates
    /// 1-of-1 from 10-of-10 and starts unknown moves at 50.
    #[inline]
    pub fn rate(&self, piece: Piece, to: Square) -> Value {
        let successes = self.successes[piece.index()][to.index()] as u64;
        let tries = self.tries[piece.index()][to.index()] as u64;
        ((successes + 1) * 100 / (tries + 2)) as Value
    }
}

impl Default for History {
    fn default() -> Self {
        History::new()
    }
}

/// Scores a generated move list once and then yields moves best-first.
/// Does not generate or filter; legality stays with the caller.
pub struct MovePicker<'a> {
    moves: &'a mut MoveList,
    scores: [Value; MoveList::MAX_MOVES],
    first: usize,
}

impl<'a> MovePicker<'a> {
    pub fn new(
        board: &Board,
        history: &History,
        moves: &'a mut MoveList,
        table_move: Move,
        killers: (Move, Move),
    ) -> MovePicker<'a> {
        let mut scores = [0 as Value; MoveList::MAX_MOVES];

        for i in 0..moves.len() {
            let m = moves[i];

            if !table_move.is_null() && m.data() == table_move.data() {
                scores[i] = SCORE_TABLE_MOVE;
                continue;
            }

            if board.is_quiet(m) {
                scores[i] = if m.data() == killers.0.data() && !killers.0.is_null() {
                    SCORE_FIRST_KILLER
                } else if m.data() == killers.1.data() && !killers.1.is_null() {
                    SCORE_SECOND_KILLER
                } else {
                    history.rate(board.piece_at(m.from()), m.to())
                };
            } else {
                let piece = board.piece_at(m.from());
                let captured = if m.move_type() == MoveType::EnPassant {
                    Piece::WHITE_PAWN
                } else {
                    board.piece_at(m.to())
                };
                let promoted = if m.move_type() == MoveType::Promotion {
                    Piece::new(Color::White, m.promoted())
                } else {
                    Piece::NONE
                };

                let balance = (scores::simplified_value(captured)
                    + scores::simplified_value(promoted))
                    * 2
                    - scores::simplified_value(piece);
                scores[i] = SCORE_CAPTURE + balance;
            }
        }

        MovePicker {
            moves,
            scores,
            first: 0,
        }
    }

    /// Yields the highest-scored remaining move, or None when exhausted.
    pub fn pick(&mut self) -> Option<Move> {
        if self.first >= self.moves.len() {
            return None;
        }

        let mut best = self.first;
        for i in self.first + 1..self.moves.len() {
            if self.scores[i] > self.scores[best] {
                best = i;
            }
        }
        if best != self.first {
            self.moves.swap(self.first, best);
            self.scores.swap(self.first, best);
        }

        let m = self.moves[self.first];
        self.first += 1;
        Some(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::types::MoveList;

    fn picked_order(board: &Board, table_move: Move, killers: (Move, Move)) -> Vec<Move> {
        let history = History::new();
        let mut moves = MoveList::new();
        board.generate_moves(&mut moves);
        let mut picker = MovePicker::new(board, &history, &mut moves, table_move, killers);
        let mut order = Vec::new();
        while let Some(m) = picker.pick() {
            order.push(m);
        }
        order
    }

    #[test]
    fn hash_move_comes_first() {
        crate::init();
        let board = Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .unwrap();
        let table_move = board.move_from_coord("g1f3");
        let order = picked_order(&board, table_move, (Move::NULL, Move::NULL));
        assert_eq!(order[0], table_move);
        assert_eq!(order.len(), 20);
    }

    #[test]
    fn captures_ordered_by_victim_value() {
        crate::init();
        // White pawn can take a queen or a knight.
        let board = Board::from_fen("4k3/8/8/q1n5/1P6/8/8/6K1 w - - 0 1").unwrap();
        let order = picked_order(&board, Move::NULL, (Move::NULL, Move::NULL));
        let qxp = board.move_from_coord("b4a5");
        let nxp = board.move_from_coord("b4c5");
        let qi = order.iter().position(|&m| m == qxp).unwrap();
        let ni = order.iter().position(|&m| m == nxp).unwrap();
        assert!(qi < ni, "queen capture must come before knight capture");
        // Both captures before any quiet move.
        assert!(ni <= 1);
    }

    #[test]
    fn killers_beat_plain_quiets() {
        crate::init();
        let board = Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .unwrap();
        let killer = board.move_from_coord("b1c3");
        let order = picked_order(&board, Move::NULL, (killer, Move::NULL));
        assert_eq!(order[0], killer);
    }

    #[test]
    fn history_rate_smoothing() {
        let mut history = History::new();
        let piece = Piece::WHITE_PAWN;
        let sq = Square::A1;
        // Unknown move starts at 50.
        assert_eq!(history.rate(piece, sq), 50);
        history.add_try(piece, sq, 2);
        history.add_success(piece, sq, 2);
        // 4 tries, 4 successes: (4+1)*100/(4+2) = 83.
        assert_eq!(history.rate(piece, sq), 83);
        history.decay();
        // 0 tries, 0 successes after the shift.
        assert_eq!(history.rate(piece, sq), 50);
    }
}
