//! Search limits: wall-clock deadlines, node and depth caps.
//!
//! The soft deadline is where iterative deepening stops starting new
//! iterations; the hard deadline aborts the search mid-tree. Both are
//! derived from one of three time controls: conventional (N moves per
//! block), incremental, or fixed time per move.

use std::time::{Duration, Instant};

use crate::types::{Depth, MAX_DEPTH};

/// Moves assumed to remain in the game under an incremental control.
const GAME_LENGTH_FACTOR: u64 = 40;

pub struct Limits {
    start: Instant,
    soft_break: Option<Instant>,
    hard_break: Option<Instant>,

    time_control_moves: u32,
    moves_made: u32,
    base_time_ms: u64,
    inc_time_ms: u64,
    depth_limit: Depth,
    nodes_limit: u64,

    /// Playing against another instance of ourselves: cut the budget by 10
    /// to keep self-play games short.
    pub self_play: bool,
}

impl Limits {
    pub fn new() -> Limits {
        Limits {
            start: Instant::now(),
            soft_break: None,
            hard_break: None,
            time_control_moves: 0,
            moves_made: 0,
            base_time_ms: 60_000,
            inc_time_ms: 3_000,
            depth_limit: MAX_DEPTH,
            nodes_limit: u64::MAX,
            self_play: false,
        }
    }

    /// Drops every limit; the search runs until told to stop.
    pub fn make_infinite(&mut self) {
        self.soft_break = None;
        self.hard_break = None;
        self.start = Instant::now();
        self.time_control_moves = 0;
        self.moves_made = 0;
        self.base_time_ms = i32::MAX as u64;
        self.inc_time_ms = i32::MAX as u64;
        self.depth_limit = MAX_DEPTH;
        self.nodes_limit = u64::MAX;
    }

    /// Starts the clock now and recomputes the deadlines from the remaining
    /// time (`ms_left == 0` falls back to the configured base time).
    pub fn reset(&mut self, ms_left: u64) {
        self.start = Instant::now();

        if self.time_control_moves > 0 && self.base_time_ms > 0 {
            self.compute_conventional(ms_left);
        } else if self.base_time_ms > 0 {
            self.compute_incremental(ms_left);
        } else if self.inc_time_ms > 0 {
            self.compute_exact_time_per_move(ms_left);
        }

        if self.self_play {
            self.soft_break = self
                .soft_break
                .map(|b| self.start + ((b - self.start) / 10).max(Duration::from_millis(100)));
            self.hard_break = self
                .hard_break
                .map(|b| self.start + ((b - self.start) / 10).max(Duration::from_millis(100)));
        }
    }

    /// Accounts moves made (or unmade, for negative counts) within the
    /// current time-control block.
    pub fn add_moves(&mut self, count: i32) {
        if self.time_control_moves > 0 {
            let total = self.moves_made as i64 + count as i64;
            self.moves_made = total.rem_euclid(self.time_control_moves as i64) as u32;
        }
    }

    fn compute_conventional(&mut self, ms_left: u64) {
        let ms_per_move = if ms_left > 0 {
            (ms_left / (self.time_control_moves - self.moves_made) as u64 + self.inc_time_ms)
                .min(ms_left)
        } else {
            self.base_time_ms / self.time_control_moves as u64 + self.inc_time_ms
        };

        self.soft_break = Some(self.start + Duration::from_millis(ms_per_move / 2));
        self.hard_break = Some(self.start + Duration::from_millis(ms_per_move * 9 / 10));
    }

    fn compute_incremental(&mut self, ms_left: u64) {
        let ms_per_move = if ms_left > 0 {
            (self.inc_time_ms + ms_left / GAME_LENGTH_FACTOR).min(ms_left)
        } else {
            self.inc_time_ms + self.base_time_ms / GAME_LENGTH_FACTOR
        };

        self.soft_break = Some(self.start + Duration::from_millis(ms_per_move / 2));
        self.hard_break = Some(self.start + Duration::from_millis(ms_per_move * 9 / 10));
    }

    fn compute_exact_time_per_move(&mut self, ms_left: u64) {
        let ms_for_move = if ms_left > 0 { ms_left } else { self.inc_time_ms };

        self.soft_break = Some(self.start + Duration::from_millis(ms_for_move * 9 / 10));
        self.hard_break = Some(self.start + Duration::from_millis(ms_for_move * 95 / 100));
    }

    /// Conventional: `control` moves per block; incremental: `control == 0`;
    /// fixed per move: `control == 0` and `base_ms == 0`.
    pub fn set_time_control(&mut self, control: u32, base_ms: u64, inc_ms: u64) {
        self.time_control_moves = control;
        self.base_time_ms = base_ms;
        self.inc_time_ms = inc_ms;
    }

    pub fn set_nodes_limit(&mut self, nodes: u64) {
        self.nodes_limit = nodes;
    }

    pub fn set_depth_limit(&mut self, depth: Depth) {
        self.depth_limit = depth;
    }

    pub fn elapsed_milliseconds(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    pub fn elapsed_centiseconds(&self) -> u64 {
        self.elapsed_milliseconds() / 10
    }

    /// The optimal point to end the search; checked between iterations.
    pub fn is_soft_limit_broken(&self) -> bool {
        matches!(self.soft_break, Some(b) if Instant::now() >= b)
    }

    /// The point where the search stops no matter what.
    pub fn is_hard_limit_broken(&self) -> bool {
        matches!(self.hard_break, Some(b) if Instant::now() >= b)
    }

    pub fn is_nodes_limit_broken(&self, nodes: u64) -> bool {
        nodes > self.nodes_limit
    }

    pub fn is_depth_limit_broken(&self, depth: Depth) -> bool {
        depth > self.depth_limit
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_limits_never_break() {
        let mut limits = Limits::new();
        limits.make_infinite();
        assert!(!limits.is_soft_limit_broken());
        assert!(!limits.is_hard_limit_broken());
        assert!(!limits.is_nodes_limit_broken(u64::MAX - 1));
        assert!(!limits.is_depth_limit_broken(MAX_DEPTH));
        assert!(limits.is_depth_limit_broken(MAX_DEPTH + 1));
    }

    #[test]
    fn fixed_time_per_move() {
        let mut limits = Limits::new();
        limits.set_time_control(0, 0, 1000);
        limits.reset(0);
        // 900 ms soft, 950 ms hard: neither is broken immediately.
        assert!(!limits.is_soft_limit_broken());
        assert!(!limits.is_hard_limit_broken());
    }

    #[test]
    fn conventional_accounting_wraps() {
        let mut limits = Limits::new();
        limits.set_time_control(40, 60_000, 0);
        limits.add_moves(41);
        // 41 mod 40
        limits.add_moves(-2);
        limits.reset(30_000);
        assert!(!limits.is_hard_limit_broken());
    }

    #[test]
    fn self_play_floors_at_100ms() {
        let mut limits = Limits::new();
        limits.self_play = true;
        limits.set_time_control(0, 0, 500);
        limits.reset(0);
        // 450 ms / 10 < 100 ms floor: the deadline is at least 100 ms out.
        assert!(!limits.is_hard_limit_broken());
    }

    #[test]
    fn nodes_limit() {
        let mut limits = Limits::new();
        limits.set_nodes_limit(1000);
        assert!(!limits.is_nodes_limit_broken(1000));
        assert!(limits.is_nodes_limit_broken(1001));
    }
}
