use criterion::{criterion_group, criterion_main, Criterion};

use arrocco::board::Board;
use arrocco::search::{perft, Search};
use arrocco::START_FEN;

fn perft_startpos(c: &mut Criterion) {
    arrocco::init();
    let mut board = Board::from_fen(START_FEN).expect("valid fen");
    c.bench_function("perft 4 startpos", |b| b.iter(|| perft(&mut board, 4)));
}

fn perft_kiwipete(c: &mut Criterion) {
    arrocco::init();
    let mut board =
        Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .expect("valid fen");
    c.bench_function("perft 3 kiwipete", |b| b.iter(|| perft(&mut board, 3)));
}

fn search_fixed_depth(c: &mut Criterion) {
    arrocco::init();
    c.bench_function("search depth 6 startpos", |b| {
        b.iter(|| {
            let mut search = Search::new(Board::start_position(), 16 * 1024 * 1024);
            search.limits.make_infinite();
            search.limits.set_depth_limit(6);
            search.root_search()
        })
    });
}

criterion_group!(benches, perft_startpos, perft_kiwipete, search_fixed_depth);
criterion_main!(benches);
