//! Legality-filter edge cases: double check, en-passant discovered checks,
//! castling through attacked squares.

use arrocco::board::Board;
use arrocco::types::{MoveList, MoveType, PieceType};

fn legal_moves(board: &Board) -> Vec<arrocco::types::Move> {
    let mut moves = MoveList::new();
    board.generate_moves(&mut moves);
    moves
        .iter()
        .copied()
        .filter(|&m| board.is_legal(m))
        .collect()
}

#[test]
fn double_check_allows_only_king_moves() {
    arrocco::init();
    // Knight on f6 and rook on e1 both check the black king on e8.
    let board = Board::from_fen("4k3/8/5N2/8/8/8/8/4RK2 b - - 0 1").unwrap();
    assert!(board.in_check());
    assert!(board.check_givers().more_than_one());
    let moves = legal_moves(&board);
    assert!(!moves.is_empty());
    for m in &moves {
        assert_eq!(
            board.piece_at(m.from()).piece_type(),
            PieceType::King,
            "non-king move {} in double check",
            m
        );
    }
}

#[test]
fn single_check_allows_blocks_and_captures() {
    arrocco::init();
    // Rook on e1 checks the king on e8; the bishop can block on e6 or e2,
    // the queen can block on e5 or capture on e1.
    let board = Board::from_fen("4k3/8/8/q7/2b5/8/8/4R1K1 b - - 0 1").unwrap();
    let moves = legal_moves(&board);
    assert!(moves.iter().any(|m| m.to().to_string() == "e6"));
    assert!(moves.iter().any(|m| m.to().to_string() == "e5"));
    assert!(moves.iter().any(|m| m.to().to_string() == "e1"));
    // Nothing may move to a square off the check ray except the king.
    for m in moves.iter().filter(|m| m.to().file() != 4) {
        assert_eq!(board.piece_at(m.from()).piece_type(), PieceType::King);
    }
}

#[test]
fn en_passant_discovered_check_on_rank_is_illegal() {
    arrocco::init();
    // After exd3 both pawns leave the fourth rank and the rook on h4 would
    // see the black king on a4.
    let board = Board::from_fen("8/8/8/8/k2pP2R/8/8/4K3 b - e3 0 1").unwrap();
    let m = board.move_from_coord("d4e3");
    assert!(m.is_null(), "ep capture must be rejected");
}

#[test]
fn en_passant_discovered_check_on_diagonal_is_illegal() {
    arrocco::init();
    // The bishop on f3 pins the capturing pawn to the king on c6 through
    // the e4-d5 diagonal; exd3 would open it.
    let board = Board::from_fen("8/8/2k5/8/3Pp3/5B2/8/4K3 b - d3 0 1").unwrap();
    let m = board.move_from_coord("e4d3");
    assert!(m.is_null(), "diagonally pinned pawn cannot capture ep");
}

#[test]
fn legal_en_passant_is_generated() {
    arrocco::init();
    let board =
        Board::from_fen("rnbqkbnr/pp1ppppp/8/8/2pPP3/5P2/PPP3PP/RNBQKBNR b KQkq d3 0 1").unwrap();
    let m = board.move_from_coord("c4d3");
    assert_eq!(m.move_type(), MoveType::EnPassant);
    assert!(board.is_legal(m));
}

#[test]
fn castling_through_attack_is_illegal() {
    arrocco::init();
    // Black rook on f8 attacks f1: kingside castling is out, queenside fine.
    let board = Board::from_fen("2k2r2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
    let short = board.move_from_coord("e1g1");
    assert!(short.is_null(), "castling across an attacked square");
    let long = board.move_from_coord("e1c1");
    assert!(!long.is_null());
    assert_eq!(long.move_type(), MoveType::Castle);
}

#[test]
fn castling_into_attack_is_illegal() {
    arrocco::init();
    // Rook on g8 guards g1.
    let board = Board::from_fen("2k3r1/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
    assert!(board.move_from_coord("e1g1").is_null());
}

#[test]
fn castling_with_blocked_interior_is_not_generated() {
    arrocco::init();
    let board = Board::from_fen("4k3/8/8/8/8/8/8/4KB1R w K - 0 1").unwrap();
    assert!(board.move_from_coord("e1g1").is_null());
}

#[test]
fn castling_out_of_check_is_illegal() {
    arrocco::init();
    // The rook on e8 checks the king; evasions never include castling.
    let board = Board::from_fen("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
    assert!(board.in_check());
    assert!(board.move_from_coord("e1g1").is_null());
    assert!(board.move_from_coord("e1c1").is_null());
}

#[test]
fn pinned_piece_moves_stay_on_the_ray() {
    arrocco::init();
    // The d2 rook is pinned to the d-file by the d8 rook.
    let board = Board::from_fen("3r2k1/8/8/8/8/8/3R4/3K4 w - - 0 1").unwrap();
    let moves = legal_moves(&board);
    for m in moves.iter().filter(|m| m.from().to_string() == "d2") {
        assert_eq!(m.to().file(), 3, "pinned rook left the pin ray: {}", m);
    }
    // Along the ray it may still move, including capturing the pinner.
    assert!(!board.move_from_coord("d2d8").is_null());
    assert!(!board.move_from_coord("d2d5").is_null());
    assert!(board.move_from_coord("d2e2").is_null());
}

#[test]
fn king_cannot_retreat_along_the_check_ray() {
    arrocco::init();
    // Rook checks along the e-file; e2 keeps the king on the ray and stays
    // illegal even though the square is "behind" the king.
    let board = Board::from_fen("4r1k1/8/8/8/8/4K3/8/8 w - - 0 1").unwrap();
    assert!(board.move_from_coord("e3e2").is_null());
    assert!(!board.move_from_coord("e3d2").is_null());
}
