//! UCI event loop.
//!
//! A dedicated thread owns stdin and feeds lines into a channel; the search
//! drains that channel every few thousand nodes, so `stop` and `quit` work
//! mid-search while other commands queue up for this loop.

use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use crate::board::Board;
use crate::search::{perft, PostMode, Search};
use crate::types::Color;
use crate::uci::parser::{parse_command, GoParams, UciCommand};
use crate::START_FEN;

const ENGINE_NAME: &str = "Arrocco";
const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct UciEngine {
    search: Search,
    running: bool,
}

/// Runs the UCI loop until `quit` or end of input.
pub fn run() {
    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut engine = UciEngine::new();
    engine.search.set_input(rx);
    engine.main_loop();
}

impl UciEngine {
    pub fn new() -> UciEngine {
        let mut search = Search::with_default_tt(Board::start_position());
        search.post = PostMode::Uci;
        UciEngine {
            search,
            running: true,
        }
    }

    fn main_loop(&mut self) {
        while self.running {
            let Some(line) = self.search.next_command(true) else {
                break;
            };
            self.handle_line(&line);
        }
    }

    pub fn handle_line(&mut self, line: &str) {
        match parse_command(line) {
            UciCommand::Uci => {
                println!("id name {} {}", ENGINE_NAME, ENGINE_VERSION);
                println!("id author the {} developers", ENGINE_NAME);
                println!("uciok");
            }
            UciCommand::IsReady => println!("readyok"),
            UciCommand::UciNewGame => self.search.new_game(),
            UciCommand::Position { fen, moves } => self.handle_position(fen, moves),
            UciCommand::Go(params) => self.handle_go(params),
            // A stray stop outside a search is a no-op.
            UciCommand::Stop => {}
            UciCommand::Quit => self.running = false,
            UciCommand::Perft(depth) => {
                let start = Instant::now();
                let nodes = perft(self.search.board_mut(), depth);
                let elapsed = start.elapsed();
                println!(
                    "info string perft({}) = {} nodes in {} ms",
                    depth,
                    nodes,
                    elapsed.as_millis()
                );
            }
            UciCommand::Eval => {
                println!("info string eval {}", self.search.static_eval());
            }
            UciCommand::Display => print!("{}", self.search.board()),
            UciCommand::Unknown(cmd) => {
                if !cmd.is_empty() {
                    println!("info string unknown command: {}", cmd);
                }
            }
        }
    }

    /// Validates the whole position command on a scratch board before
    /// committing: a bad FEN or an illegal move leaves the engine's current
    /// position untouched.
    fn handle_position(&mut self, fen: Option<String>, moves: Vec<String>) {
        let fen = fen.unwrap_or_else(|| START_FEN.to_string());
        let mut board = match Board::from_fen(&fen) {
            Ok(board) => board,
            Err(err) => {
                println!("info string invalid fen: {}", err);
                return;
            }
        };

        for move_str in &moves {
            let m = board.move_from_coord(move_str);
            if m.is_null() {
                println!("info string illegal move: {}", move_str);
                return;
            }
            board.make_move(m);
        }

        self.search.set_board(board);
    }

    fn handle_go(&mut self, params: GoParams) {
        let side = self.search.board().side();
        let limits = &mut self.search.limits;
        limits.make_infinite();

        if let Some(depth) = params.depth {
            limits.set_depth_limit(depth);
        }
        if let Some(nodes) = params.nodes {
            limits.set_nodes_limit(nodes);
        }

        if !params.infinite {
            let (our_time, our_inc) = if side == Color::White {
                (params.wtime, params.winc.unwrap_or(0))
            } else {
                (params.btime, params.binc.unwrap_or(0))
            };

            if let Some(movetime) = params.movetime {
                limits.set_time_control(0, 0, movetime);
                limits.reset(0);
            } else if let Some(time_left) = our_time {
                match params.movestogo {
                    Some(movestogo) if movestogo > 0 => {
                        limits.set_time_control(movestogo, time_left, our_inc);
                    }
                    _ => {
                        limits.set_time_control(0, time_left.max(1), our_inc);
                    }
                }
                limits.reset(time_left);
            }
        }

        let result = self.search.root_search();
        println!("bestmove {}", result.best);
    }
}

impl Default for UciEngine {
    fn default() -> Self {
        UciEngine::new()
    }
}
