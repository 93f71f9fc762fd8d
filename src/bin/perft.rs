//! Perft runner: counts leaf nodes with arrocco and with shakmaty and
//! compares, with timing for both.

use clap::Parser;

use arrocco::board::Board;
use arrocco::search::perft;
use arrocco::types::Depth;
use arrocco::START_FEN;

use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Position};

#[derive(Parser, Debug)]
#[command(author, version, about = "Compare perft node counts against shakmaty")]
struct Args {
    #[arg(short, long, default_value_t = String::from(START_FEN))]
    fen: String,
    #[arg(short, long, default_value_t = 5)]
    depth: Depth,
}

fn perft_shakmaty(pos: &Chess, depth: Depth) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut nodes = 0u64;
    for m in pos.legal_moves() {
        let mut next = pos.clone();
        next.play_unchecked(&m);
        nodes += perft_shakmaty(&next, depth - 1);
    }
    nodes
}

fn main() {
    arrocco::init();
    let args = Args::parse();

    println!("perft on '{}' at depth {}", args.fen, args.depth);

    let mut board = match Board::from_fen(&args.fen) {
        Ok(board) => board,
        Err(err) => {
            eprintln!("bad fen: {}", err);
            std::process::exit(1);
        }
    };
    let start = std::time::Instant::now();
    let ours = perft(&mut board, args.depth);
    let our_time = start.elapsed();

    let pos: Chess = match args.fen.parse::<Fen>() {
        Ok(fen) => match fen.into_position(CastlingMode::Standard) {
            Ok(pos) => pos,
            Err(err) => {
                eprintln!("shakmaty rejected position: {}", err);
                std::process::exit(1);
            }
        },
        Err(err) => {
            eprintln!("shakmaty rejected fen: {}", err);
            std::process::exit(1);
        }
    };
    let start = std::time::Instant::now();
    let reference = perft_shakmaty(&pos, args.depth);
    let ref_time = start.elapsed();

    println!(
        "arrocco  perft({}) = {:>12} ({} ms, {:.2} Mnps)",
        args.depth,
        ours,
        our_time.as_millis(),
        ours as f64 / our_time.as_micros().max(1) as f64
    );
    println!(
        "shakmaty perft({}) = {:>12} ({} ms, {:.2} Mnps)",
        args.depth,
        reference,
        ref_time.as_millis(),
        reference as f64 / ref_time.as_micros().max(1) as f64
    );

    if ours == reference {
        println!("counts match");
    } else {
        println!("MISMATCH: difference = {}", ours as i64 - reference as i64);
        std::process::exit(2);
    }
}
