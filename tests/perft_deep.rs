//! Exact depth-5 perft node counts. These take a while, so they are ignored
//! by default; run them with `cargo test --release -- --ignored`.

use arrocco::board::Board;
use arrocco::search::perft;

fn run(fen: &str, expected: u64) {
    arrocco::init();
    let mut board = Board::from_fen(fen).expect("valid fen");
    assert_eq!(perft(&mut board, 5), expected, "perft(5) on '{}'", fen);
}

#[test]
#[ignore]
fn startpos() {
    run(
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        4_865_609,
    );
}

#[test]
#[ignore]
fn kiwipete() {
    run(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        193_690_690,
    );
}

#[test]
#[ignore]
fn endgame_pins() {
    run("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", 674_624);
}

#[test]
#[ignore]
fn promotion_storm() {
    run(
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        15_833_292,
    );
}

#[test]
#[ignore]
fn talkchess() {
    run(
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        89_941_194,
    );
}

#[test]
#[ignore]
fn symmetric_middlegame() {
    run(
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
        164_075_551,
    );
}
