//! Draw detection: fifty-move rule, repetitions, insufficient material.

use arrocco::board::{Board, GameResult};

fn play(board: &mut Board, moves: &[&str]) {
    for coord in moves {
        let m = board.move_from_coord(coord);
        assert!(!m.is_null(), "illegal move {} in {}", coord, board.to_fen());
        board.make_move(m);
    }
}

#[test]
fn fifty_move_rule() {
    arrocco::init();
    let mut board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 99 80").unwrap();
    assert!(!board.is_draw(0));
    play(&mut board, &["a1a2"]);
    assert!(board.fifty_rule_draw());
    assert!(board.is_draw(0));
    assert_eq!(board.game_result(), GameResult::Draw);
}

#[test]
fn fifty_counter_resets_on_pawn_move_and_capture() {
    arrocco::init();
    let mut board = Board::from_fen("4k3/8/8/3p4/8/8/4P3/R3K3 w - - 30 40").unwrap();
    play(&mut board, &["e2e4"]);
    assert_eq!(board.fifty_rule(), 0);
    play(&mut board, &["d5e4"]);
    assert_eq!(board.fifty_rule(), 0);
    play(&mut board, &["a1a2"]);
    assert_eq!(board.fifty_rule(), 1);
}

#[test]
fn repetition_during_search_is_a_draw_early() {
    arrocco::init();
    let mut board = Board::start_position();
    // Two full knight shuffles: the position has now occurred three times,
    // but only the latest occurrence carries a repetition record.
    play(
        &mut board,
        &["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"],
    );
    // In-search rule: one recorded repetition suffices.
    assert!(board.repetition_draw(1));
    assert!(board.is_draw(1));
    // Root rule is stricter and does not fire yet.
    assert!(!board.repetition_draw(0));
}

#[test]
fn repetition_at_root_needs_the_full_cycle() {
    arrocco::init();
    let mut board = Board::start_position();
    play(
        &mut board,
        &[
            "g1f3", "g8f6", "f3g1", "f6g8", //
            "g1f3", "g8f6", "f3g1", "f6g8", //
            "g1f3", "g8f6", "f3g1", "f6g8",
        ],
    );
    assert!(board.repetition_draw(0));
    assert!(board.is_draw(0));
    assert_eq!(board.game_result(), GameResult::Draw);
}

#[test]
fn pawn_move_breaks_repetition_chain() {
    arrocco::init();
    let mut board = Board::start_position();
    play(&mut board, &["g1f3", "g8f6", "f3g1", "f6g8", "e2e4"]);
    assert!(!board.repetition_draw(1));
}

#[test]
fn insufficient_material() {
    arrocco::init();
    // King versus king.
    assert!(Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1")
        .unwrap()
        .low_material_draw());
    // Lone minor on either side.
    assert!(Board::from_fen("4k3/8/8/8/8/8/8/2N1K3 w - - 0 1")
        .unwrap()
        .low_material_draw());
    assert!(Board::from_fen("2b1k3/8/8/8/8/8/8/2N1K3 w - - 0 1")
        .unwrap()
        .low_material_draw());
    // A rook is enough to play on.
    assert!(!Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1")
        .unwrap()
        .low_material_draw());
    // Pawns always keep the game alive.
    assert!(!Board::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1")
        .unwrap()
        .low_material_draw());
}

#[test]
fn stalemate_is_a_draw_result() {
    arrocco::init();
    // Black to move, no legal moves, not in check.
    let board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert_eq!(board.game_result(), GameResult::Draw);
}

#[test]
fn mate_is_a_win_result() {
    arrocco::init();
    // Back-rank mate, black to move.
    let board = Board::from_fen("4R2k/6pp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
    assert_eq!(board.game_result(), GameResult::WhiteWon);
}
