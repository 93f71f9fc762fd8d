//! The search driver: iterative deepening, alpha-beta, quiescence, perft.
//!
//! `Search` owns everything mutable a search touches: the board, the
//! transposition table, the pawn cache, history and killers, the PV stack,
//! the limits and the cooperative stop flag. Cancellation is polled every
//! 512 nodes; buffered input every 8192.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use crate::board::Board;
use crate::eval::{eval, scores, PawnHashTable};
use crate::search::limits::Limits;
use crate::search::picker::{History, MovePicker};
use crate::search::tt::{self, TranspositionTable};
use crate::types::{
    getting_mated_in, giving_mate_in, is_mate_value, Depth, Move, MoveList, MoveType, Piece, Value,
    INF, MATE, MAX_DEPTH,
};

const DELTA_PRUNING_MARGIN: Value = 200;

const MAX_QPLY_FOR_CHECKS: Depth = 2;
const MIN_NULLMOVE_DEPTH: Depth = 2;
const NULLMOVE_DEPTH_REDUCTION_BASE: Depth = 3;
const MIN_NULLMOVE_VERIFICATION_DEPTH: Depth = 5;
const MIN_LMR_DEPTH: Depth = 3;
const MAX_LOW_DEPTH_SEE_PRUNING_DEPTH: Depth = 3;

const NULLMOVE_HIGH_DEPTH_DENOMINATOR: Depth = 5;
const NULLMOVE_BETA_DIFFERENCE_DENOMINATOR: i32 = 300;
const LMR_MAX_HISTORY_SUCCESS_RATE: Value = 75;
const LMR_MIN_QUIETS_COUNT: u16 = 2;
const LMR_HIGH_DEPTH_DENOMINATOR: Depth = 9;
const LMR_MANY_QUIETS_DENOMINATOR: u16 = 9;

const FUTILITY_MARGIN: [Value; 5] = [0, 50, 200, 400, 700];
const HISTORY_LEAF_MAX_SUCCESS_RATE: [Value; 5] = [0, 20, 12, 7, 3];

/// Aspiration window widths; the last is effectively no window.
const ASPIRATION_WINDOW: [i32; 4] = [35, 110, 450, 2 * INF as i32];

const STACK_SIZE: usize = 2 * MAX_DEPTH as usize + 2;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    NonPv = 0,
    Pv = 1,
}

#[derive(Clone, Copy, Default)]
pub struct SearchStack {
    pub first_killer: Move,
    pub second_killer: Move,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchResult {
    pub best: Move,
    pub value: Value,
}

/// Where to send per-iteration progress lines.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum PostMode {
    None,
    Uci,
    Xboard,
}

pub struct Search {
    board: Board,
    pub limits: Limits,
    pub post: PostMode,

    tt: TranspositionTable,
    pawn_table: PawnHashTable,
    history: History,
    stacks: Vec<SearchStack>,
    pvs: Vec<MoveList>,

    nodes: u64,
    root_depth: Depth,
    must_stop: Arc<AtomicBool>,

    /// Lines arriving while the search runs; urgent ones stop the search,
    /// the rest wait here for the event loop.
    input: Option<Receiver<String>>,
    pending_input: Vec<String>,
}

impl Search {
    pub fn new(board: Board, tt_size_bytes: usize) -> Search {
        Search {
            board,
            limits: Limits::new(),
            post: PostMode::None,
            tt: TranspositionTable::new(tt_size_bytes),
            pawn_table: PawnHashTable::new(),
            history: History::new(),
            stacks: vec![SearchStack::default(); STACK_SIZE],
            pvs: vec![MoveList::new(); STACK_SIZE],
            nodes: 0,
            root_depth: 0,
            must_stop: Arc::new(AtomicBool::new(false)),
            input: None,
            pending_input: Vec::new(),
        }
    }

    pub fn with_default_tt(board: Board) -> Search {
        Search::new(board, TranspositionTable::DEFAULT_SIZE)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// The shared cancellation flag; another thread may set it at any time.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.must_stop)
    }

    /// Attaches the line channel drained during search.
    pub fn set_input(&mut self, input: Receiver<String>) {
        self.input = Some(input);
    }

    /// The next buffered or incoming command line; blocks when `block`.
    pub fn next_command(&mut self, block: bool) -> Option<String> {
        if !self.pending_input.is_empty() {
            return Some(self.pending_input.remove(0));
        }
        let input = self.input.as_ref()?;
        if block {
            input.recv().ok()
        } else {
            input.try_recv().ok()
        }
    }

    /// Fresh game: starting position, cleared tables.
    pub fn new_game(&mut self) {
        self.board = Board::start_position();
        self.tt.clear();
        self.pawn_table.reset();
        self.history = History::new();
    }

    /// Static evaluation of the current position (side to move's view).
    pub fn static_eval(&mut self) -> Value {
        eval(&self.board, &mut self.pawn_table)
    }

    //  ROOT SEARCH  //

    /// Iterative deepening driver. Returns the best move and value of the
    /// last fully completed depth.
    pub fn root_search(&mut self) -> SearchResult {
        let mut last_best = Move::NULL;
        let mut last_result: Value = 0;
        let mut result: Value = 0;

        self.must_stop.store(false, Ordering::Relaxed);
        self.nodes = 0;
        self.root_depth = 0;
        self.history.decay();
        self.tt.set_root_age(self.board.move_count() as u16);
        self.stacks.fill(SearchStack::default());

        loop {
            self.root_depth += 1;
            if self.limits.is_depth_limit_broken(self.root_depth) {
                break;
            }

            // Aspiration: open with a narrow window around the previous
            // value, widening independently per side on failure. Depth 1
            // has no previous value and searches the full window.
            let max_growth = ASPIRATION_WINDOW.len() - 1;
            let mut failed_low = if self.root_depth < 2 { max_growth } else { 0 };
            let mut failed_high = failed_low;

            let mut alpha = window_bound(result, -ASPIRATION_WINDOW[failed_low]);
            let mut beta = window_bound(result, ASPIRATION_WINDOW[failed_high]);

            loop {
                result = self.search(NodeType::Pv, alpha, beta, self.root_depth, 0);

                if self.must_stop.load(Ordering::Relaxed) {
                    return SearchResult {
                        best: last_best,
                        value: last_result,
                    };
                }

                if result <= alpha && failed_low < max_growth {
                    failed_low += 1;
                    alpha = window_bound(result, -ASPIRATION_WINDOW[failed_low]);
                    beta = window_bound(result, ASPIRATION_WINDOW[failed_high]);
                } else if result >= beta && failed_high < max_growth {
                    failed_high += 1;
                    alpha = window_bound(result, -ASPIRATION_WINDOW[failed_low]);
                    beta = window_bound(result, ASPIRATION_WINDOW[failed_high]);
                } else {
                    break;
                }
            }

            self.post_iteration(result);

            // The soft limit between iterations is the perfect place to stop.
            if self.limits.is_soft_limit_broken() {
                let best = if self.pvs[0].is_empty() {
                    last_best
                } else {
                    self.pvs[0][0]
                };
                return SearchResult {
                    best,
                    value: result,
                };
            }

            if !self.pvs[0].is_empty() {
                last_best = self.pvs[0][0];
            }
            last_result = result;
        }

        SearchResult {
            best: last_best,
            value: last_result,
        }
    }

    //  ALPHA-BETA  //

    fn search(
        &mut self,
        nt: NodeType,
        mut alpha: Value,
        mut beta: Value,
        depth: Depth,
        ply: Depth,
    ) -> Value {
        // Leaf: drop into quiescence, which handles all its own checks.
        if depth <= 0 {
            return self.quiescence(nt, alpha, beta, ply, 0);
        }

        if self.must_stop.load(Ordering::Relaxed) {
            return alpha;
        }

        if self.nodes & 0x1ff == 0 {
            if self.limits.is_hard_limit_broken() || self.limits.is_nodes_limit_broken(self.nodes)
            {
                self.must_stop.store(true, Ordering::Relaxed);
                return alpha;
            }
            if self.nodes & 0x1fff == 0 {
                self.poll_input();
                if self.must_stop.load(Ordering::Relaxed) {
                    return alpha;
                }
            }
        }

        let plyi = ply as usize;
        self.pvs[plyi].clear();

        if self.board.is_draw(ply) {
            return 0;
        }

        if ply > MAX_DEPTH {
            return alpha;
        }

        //  MATE DISTANCE PRUNING  //

        if nt != NodeType::Pv {
            alpha = alpha.max(-MATE + ply as Value);
            beta = beta.min(MATE - ply as Value);
            if alpha >= beta {
                return alpha;
            }
        }

        //  TRANSPOSITION TABLE  //

        let hash = self.board.compute_hash();
        let mut table_move = Move::NULL;
        if let Some(entry) = self.tt.probe(hash) {
            if entry.depth as Depth >= depth && ply > 0 && (entry.is_pv() || nt != NodeType::Pv) {
                let mut value = entry.value;
                if is_mate_value(value) {
                    // Stored mate distances are relative to the entry's node.
                    if value > MATE - 2 * MAX_DEPTH as Value {
                        value -= ply as Value;
                    } else if value < 2 * MAX_DEPTH as Value - MATE {
                        value += ply as Value;
                    }
                }

                let bound = entry.bound();
                if bound == tt::BOUND_EXACT {
                    return value;
                } else if bound == tt::BOUND_ALPHA {
                    if value <= alpha {
                        return alpha;
                    }
                } else if bound == tt::BOUND_BETA && value >= beta {
                    return beta;
                }
            }
            table_move = Move::from_data(entry.mv);
        }

        //  FORWARD PRUNING  //

        let is_in_check = self.board.in_check();
        if nt != NodeType::Pv && !is_in_check {
            let static_eval = eval(&self.board, &mut self.pawn_table);

            // Futility: a leaf-bound eval far outside the window settles the
            // node without searching.
            if depth <= 4 {
                let margin = FUTILITY_MARGIN[depth as usize];
                if static_eval <= alpha - margin {
                    return self.quiescence(nt, alpha, beta, ply, 0);
                }
                if static_eval >= beta + margin {
                    return beta;
                }
            }

            // Null move: hand the opponent a free tempo; if the reduced
            // search still fails high, the position is safely above beta.
            // Zugzwang guard: requires non-pawn material.
            if static_eval >= beta
                && depth >= MIN_NULLMOVE_DEPTH
                && self.board.has_non_pawns(self.board.side())
            {
                let reduction = (NULLMOVE_DEPTH_REDUCTION_BASE
                    + (depth - MIN_NULLMOVE_DEPTH) / NULLMOVE_HIGH_DEPTH_DENOMINATOR
                    + ((static_eval as i32 - beta as i32) / NULLMOVE_BETA_DIFFERENCE_DENOMINATOR)
                        .max(0) as Depth)
                    .max(0);

                self.board.make_null_move();
                let mut tmp =
                    -self.search(NodeType::NonPv, -beta, -beta + 1, depth - reduction, ply + 1);
                self.board.unmake_null_move();

                if self.must_stop.load(Ordering::Relaxed) {
                    return alpha;
                }

                if tmp >= beta {
                    if is_mate_value(tmp) {
                        tmp = beta;
                    }

                    if depth >= MIN_NULLMOVE_VERIFICATION_DEPTH {
                        // Deep nodes verify with a real reduced search.
                        let verification =
                            self.search(NodeType::NonPv, beta - 1, beta, depth - reduction, ply);
                        if verification >= beta {
                            return tmp;
                        }
                    } else {
                        return tmp;
                    }
                }
            }
        }

        //  INTERNAL ITERATIVE DEEPENING  //

        if table_move.is_null() && depth > 6 {
            self.search(nt, alpha, beta, depth - 6, ply);
            if !self.pvs[plyi].is_empty() {
                table_move = self.pvs[plyi][0];
            }
        }

        //  MOVE LOOP  //

        let mut legal_moves: u16 = 0;
        // Bumped by both the history-leaf guard and the LMR band, so it can
        // run past the actual number of quiet moves.
        let mut quiet_moves: u16 = 0;
        let mut entry_bound = tt::BOUND_ALPHA;
        let mut best_move = Move::NULL;

        // Grandchild killers are stale once we search this subtree.
        self.stacks[plyi + 2] = SearchStack::default();
        let killers = (
            self.stacks[plyi].first_killer,
            self.stacks[plyi].second_killer,
        );

        let mut moves = MoveList::new();
        self.board.generate_moves(&mut moves);
        let mut picker = MovePicker::new(&self.board, &self.history, &mut moves, table_move, killers);

        while let Some(m) = picker.pick() {
            if !self.board.is_legal(m) {
                continue;
            }
            legal_moves += 1;

            let is_quiet = self.board.is_quiet(m);

            if nt != NodeType::Pv
                && depth <= MAX_LOW_DEPTH_SEE_PRUNING_DEPTH
                && !is_in_check
                && self.board.has_non_pawns(self.board.side())
            {
                // Low-depth SEE pruning: skip clearly losing moves.
                if self.board.see(m)
                    <= -scores::simplified_value(Piece::WHITE_PAWN) * depth as Value
                {
                    continue;
                }

                // History leaf pruning: skip quiets with a miserable record,
                // unless they give check.
                if is_quiet {
                    quiet_moves += 1;
                    if quiet_moves > LMR_MIN_QUIETS_COUNT {
                        let rate = self.history.rate(self.board.piece_at(m.from()), m.to());
                        if rate < HISTORY_LEAF_MAX_SUCCESS_RATE[depth as usize]
                            && !self.board.gives_check(m)
                        {
                            continue;
                        }
                    }
                }
            }

            if is_quiet && !is_in_check {
                let piece = self.board.piece_at(m.from());
                self.history.add_try(piece, m.to(), depth);
            }

            self.nodes += 1;
            self.board.make_move(m);

            //  LATE MOVE REDUCTIONS  //

            let mut reduction: Depth = 0;
            if depth >= MIN_LMR_DEPTH && !is_in_check && !self.board.in_check() && is_quiet {
                let rate = self.history.rate(self.board.piece_at(m.to()), m.to());
                if rate < LMR_MAX_HISTORY_SUCCESS_RATE {
                    quiet_moves += 1;
                    if quiet_moves > LMR_MIN_QUIETS_COUNT {
                        reduction = 1
                            + (depth - MIN_LMR_DEPTH) / LMR_HIGH_DEPTH_DENOMINATOR
                            + ((quiet_moves - LMR_MIN_QUIETS_COUNT) / LMR_MANY_QUIETS_DENOMINATOR)
                                as Depth;

                        if rate > 50 {
                            reduction -= 1;
                        } else if rate < 10 {
                            reduction += 1;
                            if rate < 2 {
                                reduction += 1;
                            }
                        }

                        if reduction >= depth {
                            reduction = depth - 1;
                        }
                    }
                }
            }

            //  PRINCIPAL VARIATION SEARCH  //

            let mut tmp;
            if legal_moves == 1 {
                tmp = -self.search(nt, -beta, -alpha, depth - 1, ply + 1);
            } else {
                tmp = -self.search(
                    NodeType::NonPv,
                    -alpha - 1,
                    -alpha,
                    depth - 1 - reduction,
                    ply + 1,
                );
                if tmp > alpha && reduction > 0 {
                    // The reduction was too optimistic; retry at full depth.
                    tmp = -self.search(NodeType::NonPv, -alpha - 1, -alpha, depth - 1, ply + 1);
                }
                if nt == NodeType::Pv && tmp > alpha && tmp < beta {
                    tmp = -self.search(NodeType::Pv, -beta, -alpha, depth - 1, ply + 1);
                }
            }

            self.board.unmake_move(m);
            if self.must_stop.load(Ordering::Relaxed) {
                return alpha;
            }

            if tmp > alpha {
                alpha = tmp;
                entry_bound = tt::BOUND_EXACT;
                best_move = m;
                self.update_pv(plyi, m);
            } else if ply == 0 && legal_moves == 1 {
                // Keep a root PV even when the only move fails low.
                self.update_pv(plyi, m);
            }

            if alpha >= beta {
                if is_quiet && !is_in_check {
                    let piece = self.board.piece_at(m.from());
                    self.history.add_success(piece, m.to(), depth);

                    let stack = &mut self.stacks[plyi];
                    if stack.first_killer.data() != m.data() {
                        stack.second_killer = stack.first_killer;
                        stack.first_killer = m;
                    }
                }
                entry_bound = tt::BOUND_BETA;
                break;
            }
        }

        if legal_moves == 0 {
            alpha = if self.board.in_check() {
                -MATE + ply as Value
            } else {
                0
            };
        }

        self.tt.record(
            entry_bound | nt as u8,
            hash,
            best_move.data(),
            alpha,
            self.board.move_count() as u16,
            depth as u8,
            ply,
        );

        alpha
    }

    //  QUIESCENCE  //

    fn quiescence(
        &mut self,
        nt: NodeType,
        mut alpha: Value,
        beta: Value,
        ply: Depth,
        qply: Depth,
    ) -> Value {
        if self.must_stop.load(Ordering::Relaxed) {
            return alpha;
        }

        if self.nodes & 0x1ff == 0 {
            if self.limits.is_hard_limit_broken() || self.limits.is_nodes_limit_broken(self.nodes)
            {
                self.must_stop.store(true, Ordering::Relaxed);
                return alpha;
            }
            if self.nodes & 0x1fff == 0 {
                self.poll_input();
                if self.must_stop.load(Ordering::Relaxed) {
                    return alpha;
                }
            }
        }

        let plyi = ply as usize;
        if nt == NodeType::Pv {
            self.pvs[plyi].clear();
        }

        if self.board.is_draw(ply) {
            return 0;
        }

        if ply > MAX_DEPTH {
            return alpha;
        }

        let static_eval = eval(&self.board, &mut self.pawn_table);
        let is_in_check = self.board.in_check();

        if !is_in_check {
            //  STANDING PAT  //
            if static_eval >= beta {
                return static_eval;
            }
            if static_eval > alpha {
                alpha = static_eval;
            }
        }

        let mut legal_moves: u8 = 0;

        let mut moves = MoveList::new();
        self.board.generate_captures(&mut moves);
        if !is_in_check && qply < MAX_QPLY_FOR_CHECKS {
            self.board.generate_quiet_checks(&mut moves);
        }

        let mut picker = MovePicker::new(
            &self.board,
            &self.history,
            &mut moves,
            Move::NULL,
            (Move::NULL, Move::NULL),
        );

        while let Some(m) = picker.pick() {
            if !self.board.is_legal(m) {
                continue;
            }
            legal_moves += 1;

            // No pruning in check or in pawn endings.
            if !is_in_check && self.board.has_non_pawns(self.board.side()) {
                // Delta pruning: even winning the victim with a surplus
                // margin cannot reach alpha.
                if m.move_type() != MoveType::Promotion {
                    let captured = if m.move_type() == MoveType::EnPassant {
                        Piece::WHITE_PAWN
                    } else {
                        self.board.piece_at(m.to())
                    };
                    let captured_value = scores::simplified_value(captured);

                    if static_eval + captured_value + DELTA_PRUNING_MARGIN <= alpha
                        && !self.board.gives_check(m)
                    {
                        continue;
                    }
                }

                // SEE pruning: skip losing exchanges.
                if self.board.see(m) < 0 {
                    continue;
                }
            }

            self.nodes += 1;
            self.board.make_move(m);
            let tmp = -self.quiescence(nt, -beta, -alpha, ply + 1, qply + 1);
            self.board.unmake_move(m);

            if self.must_stop.load(Ordering::Relaxed) {
                return alpha;
            }

            if tmp > alpha {
                alpha = tmp;
                if nt == NodeType::Pv {
                    self.update_pv(plyi, m);
                }
            }
            if alpha >= beta {
                break;
            }
        }

        if legal_moves == 0 && is_in_check {
            return -MATE + ply as Value;
        }

        alpha
    }

    //  HELPERS  //

    fn update_pv(&mut self, plyi: usize, m: Move) {
        let (head, tail) = self.pvs.split_at_mut(plyi + 1);
        let pv = &mut head[plyi];
        pv.clear();
        pv.push(m);
        pv.merge_with(&tail[0], 1);
    }

    /// Drains buffered input lines. `stop` and `quit` take effect
    /// immediately; everything else waits for the event loop.
    fn poll_input(&mut self) {
        let Some(input) = &self.input else {
            return;
        };
        while let Ok(line) = input.try_recv() {
            let is_stop = line.trim() == "stop";
            let is_quit = line.trim() == "quit";
            if is_stop || is_quit {
                self.must_stop.store(true, Ordering::Relaxed);
            }
            if !is_stop {
                self.pending_input.push(line);
            }
        }
    }

    fn post_iteration(&self, value: Value) {
        match self.post {
            PostMode::None => {}
            PostMode::Uci => {
                let score = if is_mate_value(value) {
                    let mate = if value < 0 {
                        -getting_mated_in(value)
                    } else {
                        giving_mate_in(value)
                    };
                    format!("mate {}", mate)
                } else {
                    format!("cp {}", value)
                };
                println!(
                    "info depth {} nodes {} time {} score {} pv {}",
                    self.root_depth,
                    self.nodes,
                    self.limits.elapsed_milliseconds(),
                    score,
                    self.pvs[0].line_string()
                );
            }
            PostMode::Xboard => {
                println!(
                    "{} {} {} {} {}",
                    self.root_depth,
                    value,
                    self.limits.elapsed_centiseconds(),
                    self.nodes,
                    self.pvs[0].line_string()
                );
            }
        }
    }
}

fn window_bound(center: Value, delta: i32) -> Value {
    (center as i32 + delta).clamp(-(INF as i32), INF as i32) as Value
}

/// Counts leaf nodes of the legal game tree at the given depth. The
/// standard movegen correctness test.
pub fn perft(board: &mut Board, depth: Depth) -> u64 {
    let mut moves = MoveList::new();
    board.generate_moves(&mut moves);

    let mut nodes = 0;
    for &m in moves.iter() {
        if !board.is_legal(m) {
            continue;
        }
        if depth <= 1 {
            nodes += 1;
            continue;
        }
        board.make_move(m);
        nodes += perft(board, depth - 1);
        board.unmake_move(m);
    }
    nodes
}
