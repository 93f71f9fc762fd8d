//! Static position evaluation.
//!
//! Material and piece-square subtotals are maintained incrementally by the
//! board; this module adds pawn-structure terms (via the pawn hash table),
//! a handful of positional bonuses, and dedicated evaluators for endgames
//! where the general terms mislead: pure pawn endings, dead-drawn material
//! constellations, and won KXK / KBNK positions.

pub mod pawns;
pub mod scores;

pub use pawns::{PawnHashEntry, PawnHashTable};

use crate::bitboard::{self as bb, BitBoard};
use crate::board::Board;
use crate::types::{relative_rank, Color, Direction, Piece, PieceType, Score, Square, Value, SURE_WIN};

/// Evaluates the position from the side to move's point of view.
pub fn eval(board: &Board, pawn_table: &mut PawnHashTable) -> Value {
    // Pure pawn endgame: kings and pawns only.
    if !board.has_non_pawns(Color::White) && !board.has_non_pawns(Color::Black) {
        let entry = *pawn_table.get_or_scan(board);
        let mut result = eval_pawn_endgame(board, &entry, Color::White)
            - eval_pawn_endgame(board, &entry, Color::Black);
        if board.side() == Color::Black {
            result = -result;
        }
        return result + scores::TEMPO_SCORE.eg;
    }

    if is_drawish_endgame(board) {
        return 0;
    }

    if board.material(Color::White) == 0 || board.material(Color::Black) == 0 {
        return eval_sole_king(board);
    }

    let entry = *pawn_table.get_or_scan(board);
    let score = eval_side(board, &entry, Color::White) - eval_side(board, &entry, Color::Black);

    let material = board.material(Color::White) + board.material(Color::Black);
    let mut result = score.collapse(material);
    if board.side() == Color::Black {
        result = -result;
    }

    result + scores::TEMPO_SCORE.collapse(material)
}

/// General per-side evaluation: incremental piece-square subtotal, cached
/// pawn structure, passed-pawn support and the bishop pair.
fn eval_side(board: &Board, entry: &PawnHashEntry, side: Color) -> Score {
    let opp = side.opposite();
    let up = Direction::Up.relative(side);
    let down = Direction::Down.relative(side);

    let mut result = board.score(side) + entry.pawn_eval[side.index()];
    let occ = board.all_pieces();

    let passed = entry.passed & entry.pawns[side.index()];
    for sq in passed {
        // A rook behind the passed pawn with an open path between them.
        let rooks_behind = board.rooks(side) & bb::direction_bits(sq, down);
        if rooks_behind.any() {
            let rook_sq = if side == Color::White {
                rooks_behind.msb()
            } else {
                rooks_behind.lsb()
            };
            let path = bb::between(sq, rook_sq) & !BitBoard::from_square(rook_sq);
            if (occ & path).is_empty() {
                result += scores::ROOK_BEHIND_PASSED_PAWN;
            }
        }

        // An enemy minor piece parked on the stop square.
        let blocker = board.piece_at(sq.shifted(up));
        if blocker == Piece::new(opp, PieceType::Knight)
            || blocker == Piece::new(opp, PieceType::Bishop)
        {
            result += scores::MINOR_PASSED_BLOCKED;
        }
    }

    if board.has_different_colored_bishops(side) {
        result += scores::BISHOP_PAIR;
    }

    result
}

/// One side of a kings-and-pawns-only position, endgame components only.
fn eval_pawn_endgame(board: &Board, entry: &PawnHashEntry, side: Color) -> Value {
    let opp = side.opposite();
    let our_king = board.king(side);
    let enemy_king = board.king(opp);

    let mut result = board.score(side).eg + entry.pawn_eval[side.index()].eg;

    let pawns = entry.pawns[side.index()];
    let passed = entry.passed & pawns;
    for sq in pawns {
        if passed.test(sq) {
            // Rule of the square: an uncatchable passed pawn promotes.
            let promotion_sq = Square::make(sq.file(), relative_rank(side, 7));
            let enemy_to_move = board.side() != side;
            let pawn_dist = bb::distance(sq, promotion_sq).min(5) as i32;
            let king_dist = bb::distance(enemy_king, promotion_sq) as i32 - enemy_to_move as i32;
            if pawn_dist < king_dist {
                result += scores::SQUARE_RULE_PASSED;
            }

            result += scores::KING_PASSED_TROPISM * bb::manhattan_closedness(our_king, sq) as Value;
            result -=
                scores::KING_PASSED_TROPISM * bb::manhattan_closedness(enemy_king, sq) as Value;
        } else {
            result += scores::KING_PAWN_TROPISM * bb::manhattan_closedness(our_king, sq) as Value;
            result -= scores::KING_PAWN_TROPISM * bb::manhattan_closedness(enemy_king, sq) as Value;
        }
    }

    result
}

/// Material constellations that cannot be won with normal play. The
/// enumeration is deliberately conservative and mirrors well-known cases
/// only: lone minors, two knights, same-colored bishops, minor versus
/// minor(s).
fn is_drawish_endgame(board: &Board) -> bool {
    let wmat = board.material(Color::White);
    let bmat = board.material(Color::Black);
    if wmat + bmat > 9 {
        return false;
    }
    if board.pawns(Color::White).any() || board.pawns(Color::Black).any() {
        return false;
    }

    if wmat > bmat {
        is_drawish_for(board, Color::White, wmat, bmat)
    } else {
        is_drawish_for(board, Color::Black, bmat, wmat)
    }
}

fn is_drawish_for(board: &Board, strong: Color, strong_mat: i32, weak_mat: i32) -> bool {
    let weak = strong.opposite();
    match strong_mat + weak_mat {
        // A lone minor piece cannot mate.
        3 => true,
        6 => {
            if strong_mat == 3 {
                // Minor versus minor.
                true
            } else {
                // Two knights, or two bishops on the same color, cannot
                // force mate against a bare king.
                board.bishops(strong).is_empty() || board.has_only_same_colored_bishops(strong)
            }
        }
        9 => {
            // Two minors versus one: drawn unless the strong side has the
            // genuine bishop pair against a bishop.
            strong_mat == 6
                && (board.knights(strong).any()
                    || board.bishops(weak).is_empty()
                    || board.has_only_same_colored_bishops(strong))
        }
        _ => false,
    }
}

/// One side has only its king: drive it to a corner and report a sure win,
/// with the KBNK corner correction.
fn eval_sole_king(board: &Board) -> Value {
    let result = if board.material(Color::White) == 0 {
        if board.material(Color::Black) == 6
            && board.bishops(Color::Black).any()
            && board.knights(Color::Black).any()
        {
            -SURE_WIN + eval_kbnk(board, Color::Black)
        } else {
            -scores::KING_PUSH_TO_CORNER[board.king(Color::White).index()] - SURE_WIN
        }
    } else if board.material(Color::White) == 6
        && board.bishops(Color::White).any()
        && board.knights(Color::White).any()
    {
        SURE_WIN - eval_kbnk(board, Color::White)
    } else {
        scores::KING_PUSH_TO_CORNER[board.king(Color::Black).index()] + SURE_WIN
    };

    if board.side() == Color::White {
        result
    } else {
        -result
    }
}

/// King+bishop+knight versus king: the defender must be driven to a corner
/// of the bishop's color.
fn eval_kbnk(board: &Board, strong: Color) -> Value {
    let enemy_king = board.king(strong.opposite());
    let king_tropism = bb::distance(enemy_king, board.king(strong)) as Value;

    let (corner1, corner2) =
        if (board.bishops(strong) & BitBoard::from_color(Color::White)).any() {
            (Square::A8, Square::H1)
        } else {
            (Square::H8, Square::A1)
        };

    let corner_dist = bb::distance(corner1, enemy_king).min(bb::distance(corner2, enemy_king));
    king_tropism - corner_dist as Value * 5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn eval_fen(fen: &str) -> Value {
        crate::init();
        let board = Board::from_fen(fen).expect("valid fen");
        let mut pawn_table = PawnHashTable::new();
        eval(&board, &mut pawn_table)
    }

    #[test]
    fn startpos_is_balanced() {
        let v = eval_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert!(v.abs() < 100, "startpos eval {}", v);
    }

    #[test]
    fn side_to_move_symmetry() {
        let white = eval_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        let black = eval_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1");
        // Identical position: both sides see the same tempo-adjusted value.
        assert_eq!(white, black);
    }

    #[test]
    fn material_advantage_shows() {
        // White is a rook up in an otherwise balanced pawn position.
        let v = eval_fen("4k3/7p/8/8/8/8/7P/R3K3 w - - 0 1");
        assert!(v > 300, "rook-up eval {}", v);
        let v = eval_fen("4k3/7p/8/8/8/8/7P/R3K3 b - - 0 1");
        assert!(v < -300, "rook-down eval {}", v);
    }

    #[test]
    fn drawish_endgames_are_zero() {
        // Lone knight.
        assert_eq!(eval_fen("4k3/8/8/8/8/8/8/2N1K3 w - - 0 1"), 0);
        // Lone bishop, either side to move.
        assert_eq!(eval_fen("4k3/8/8/8/8/8/8/2B1K3 b - - 0 1"), 0);
        // Minor versus minor.
        assert_eq!(eval_fen("2b1k3/8/8/8/8/8/8/2N1K3 w - - 0 1"), 0);
        // Two knights versus bare king.
        assert_eq!(eval_fen("4k3/8/8/8/8/8/8/1NN1K3 w - - 0 1"), 0);
    }

    #[test]
    fn kxk_is_a_sure_win() {
        // KQK: the side with the queen sees a huge score.
        let v = eval_fen("7k/8/8/8/8/8/8/Q3K3 w - - 0 1");
        assert!(v > SURE_WIN, "KQK eval {}", v);
        // From the defender's perspective it is hugely lost.
        let v = eval_fen("7k/8/8/8/8/8/8/Q3K3 b - - 0 1");
        assert!(v < -SURE_WIN, "KQK defender eval {}", v);
    }

    #[test]
    fn kxk_prefers_cornered_defender() {
        let cornered = eval_fen("7k/8/8/8/8/8/8/Q3K3 w - - 0 1");
        let centered = eval_fen("8/8/8/4k3/8/8/8/Q3K3 w - - 0 1");
        assert!(cornered > centered);
    }

    #[test]
    fn passed_pawn_counts_in_pawn_endgame() {
        // White has an outside passed pawn the black king cannot catch.
        let with_passer = eval_fen("8/7k/8/P7/8/8/8/4K3 w - - 0 1");
        assert!(with_passer > scores::SQUARE_RULE_PASSED / 2, "eval {}", with_passer);
    }

    #[test]
    fn bishop_pair_bonus() {
        let pair = eval_fen("4k3/8/r7/8/8/8/4P3/1BB1K3 w - - 0 1");
        let same_color = eval_fen("4k3/8/r7/8/8/8/4P3/1B1BK3 w - - 0 1");
        assert!(pair > same_color);
    }
}
