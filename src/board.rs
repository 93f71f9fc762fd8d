//! The board: position state, FEN, make/unmake, move generation, legality,
//! attack queries and static exchange evaluation.
//!
//! The position keeps a piece array redundant with the piece bitboards for
//! O(1) piece-at-square, incremental material and piece-square subtotals,
//! and a stack of reversible state records. Move generation is monomorphized
//! over the side to move and the generation mode so the hot branches fold at
//! compile time.

use crate::bitboard::{self as bb, BitBoard};
use crate::eval::scores;
use crate::types::{
    castle, relative_rank, Color, Direction, Move, MoveList, MoveType, Piece, PieceType, Score,
    Square, Value,
};
use crate::zobrist;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Generation modes for the pseudo-legal move generator.
pub mod movegen {
    /// Every pseudo-legal move.
    pub const ALL_MOVES: u8 = 0;
    /// Captures and queen promotions only.
    pub const CAPTURES: u8 = 1;
    /// Moves that may resolve a check.
    pub const CHECK_EVASIONS: u8 = 2;
    /// Non-capturing checking moves.
    pub const QUIET_CHECKS: u8 = 3;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    None,
    WhiteWon,
    Draw,
    BlackWon,
}

/// Everything needed to undo a move plus the derived per-position state.
#[derive(Clone, Default)]
pub struct StateInfo {
    pub hash: u64,
    /// [side]: pieces of either color shielding `side`'s king from a slider.
    pub check_blockers: [BitBoard; Color::COUNT],
    /// [side]: `side`'s sliders pinning enemy pieces to the enemy king.
    pub pinners: [BitBoard; Color::COUNT],
    /// Opponent pieces currently giving check.
    pub check_givers: BitBoard,
    /// How many state records back this position last occurred; 0 = never.
    pub last_repetition: u16,
    /// State records since the last null move (or since the root).
    pub moves_from_null: u32,
    pub ep: Option<Square>,
    pub captured: Piece,
    pub fifty_rule: u8,
    pub castle_right: u8,
}

#[derive(Clone)]
pub struct Board {
    board: [Piece; Square::COUNT],
    pieces: [BitBoard; Piece::COUNT],
    by_color: [BitBoard; Color::COUNT],
    material: [i32; Color::COUNT],
    score: [Score; Color::COUNT],
    move_count: u32,
    side: Color,
    states: Vec<StateInfo>,
}

impl Board {
    fn empty() -> Board {
        let mut states = Vec::with_capacity(64);
        states.push(StateInfo::default());
        Board {
            board: [Piece::NONE; Square::COUNT],
            pieces: [BitBoard::EMPTY; Piece::COUNT],
            by_color: [BitBoard::EMPTY; Color::COUNT],
            material: [0; Color::COUNT],
            score: [Score::ZERO; Color::COUNT],
            move_count: 1,
            side: Color::White,
            states,
        }
    }

    pub fn start_position() -> Board {
        match Board::from_fen(START_FEN) {
            Ok(board) => board,
            Err(_) => unreachable!("start FEN is valid"),
        }
    }

    //  FEN  //

    /// Builds a board from Forsyth-Edwards notation. The castling and later
    /// fields may be omitted and default to "-", "-", 0, 1.
    pub fn from_fen(fen: &str) -> Result<Board, String> {
        let mut result = Board::empty();
        let mut fields = fen.split_whitespace();

        let placement = fields.next().ok_or_else(|| "empty FEN".to_string())?;
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(format!("expected 8 ranks, got {}", ranks.len()));
        }

        let keys = zobrist::keys();
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u32;
            for ch in rank_str.chars() {
                if let Some(d) = ch.to_digit(10) {
                    if d == 0 || d > 8 {
                        return Err(format!("bad empty-run digit '{}'", ch));
                    }
                    file += d;
                    continue;
                }
                if file >= 8 {
                    return Err(format!("rank '{}' overflows the board", rank_str));
                }
                let piece =
                    Piece::from_fen_char(ch).ok_or_else(|| format!("bad piece char '{}'", ch))?;
                let sq = Square::make(file as u8, rank);
                let color = piece.color();

                result.board[sq.index()] = piece;
                result.pieces[piece.index()].set(sq);
                result.by_color[color.index()].set(sq);
                result.material[color.index()] += piece.piece_type().material();
                result.score[color.index()] += scores::pst(piece, sq);
                result.states[0].hash ^= keys.piece[piece.index()][sq.index()];

                file += 1;
            }
            if file != 8 {
                return Err(format!("rank '{}' has {} files", rank_str, file));
            }
        }

        for color in [Color::White, Color::Black] {
            if result.pieces[Piece::new(color, PieceType::King).index()].popcnt() != 1 {
                return Err("each side needs exactly one king".to_string());
            }
        }

        let side_str = fields.next().ok_or_else(|| "missing side to move".to_string())?;
        let mut side_chars = side_str.chars();
        result.side = side_chars
            .next()
            .and_then(Color::from_fen_char)
            .filter(|_| side_chars.next().is_none())
            .ok_or_else(|| format!("bad side to move '{}'", side_str))?;
        result.states[0].hash ^= keys.side[result.side.index()];

        if let Some(castling) = fields.next() {
            if castling != "-" {
                for ch in castling.chars() {
                    let mask = castle::from_fen_char(ch)
                        .ok_or_else(|| format!("bad castling char '{}'", ch))?;
                    result.states[0].castle_right |= mask;
                }
            }
        }

        if let Some(ep) = fields.next() {
            if ep != "-" {
                let mut chars = ep.chars();
                let sq = match (chars.next(), chars.next(), chars.next()) {
                    (Some(f), Some(r), None) => Square::from_chars(f, r),
                    _ => None,
                };
                result.states[0].ep =
                    Some(sq.ok_or_else(|| format!("bad en-passant square '{}'", ep))?);
            }
        }

        if let Some(fifty) = fields.next() {
            result.states[0].fifty_rule = fifty
                .parse::<u8>()
                .map_err(|_| format!("bad half-move clock '{}'", fifty))?;
        }

        let full_moves = match fields.next() {
            Some(s) => s
                .parse::<u32>()
                .map_err(|_| format!("bad move counter '{}'", s))?,
            None => 1,
        };
        let move_base = if full_moves > 0 { 2 * (full_moves - 1) } else { 0 };
        result.move_count = move_base + result.side.opposite() as u32;

        result.update_internal_state();
        Ok(result)
    }

    pub fn to_fen(&self) -> String {
        let mut result = String::with_capacity(87);

        for rank in (0..8u8).rev() {
            let mut empties = 0;
            for file in 0..8u8 {
                let piece = self.board[Square::make(file, rank).index()];
                if piece == Piece::NONE {
                    empties += 1;
                    continue;
                }
                if empties > 0 {
                    result.push((b'0' + empties) as char);
                    empties = 0;
                }
                result.push(piece.to_char());
            }
            if empties > 0 {
                result.push((b'0' + empties) as char);
            }
            if rank > 0 {
                result.push('/');
            }
        }

        result.push_str(if self.side == Color::Black { " b " } else { " w " });

        let rights = self.state().castle_right;
        if castle::any_right(rights) {
            for (mask, ch) in [
                (castle::WHITE_KING, 'K'),
                (castle::WHITE_QUEEN, 'Q'),
                (castle::BLACK_KING, 'k'),
                (castle::BLACK_QUEEN, 'q'),
            ] {
                if castle::has_right(rights, mask) {
                    result.push(ch);
                }
            }
            result.push(' ');
        } else {
            result.push_str("- ");
        }

        match self.state().ep {
            Some(sq) => {
                result.push_str(&sq.to_string());
                result.push(' ');
            }
            None => result.push_str("- "),
        }

        result.push_str(&self.state().fifty_rule.to_string());
        result.push(' ');

        let full_moves = if self.move_count > 0 {
            (self.move_count - self.side.opposite() as u32) / 2 + 1
        } else {
            1
        };
        result.push_str(&full_moves.to_string());

        result
    }

    //  COORDINATE MOVES  //

    /// Resolves a coordinate move string ("e2e4", "e7e8q", "0-0") against the
    /// current position. Returns the null move if the string does not name a
    /// legal move. A promotion without a piece letter promotes to a knight.
    pub fn move_from_coord(&self, s: &str) -> Move {
        let bytes = s.as_bytes();
        let (from, to) = if s == "0-0" {
            (
                Square::E1.relative(self.side),
                Square::G1.relative(self.side),
            )
        } else if s == "0-0-0" {
            (
                Square::E1.relative(self.side),
                Square::C1.relative(self.side),
            )
        } else if bytes.len() >= 4 {
            let from = Square::from_chars(bytes[0] as char, bytes[1] as char);
            let to = Square::from_chars(bytes[2] as char, bytes[3] as char);
            match (from, to) {
                (Some(f), Some(t)) => (f, t),
                _ => return Move::NULL,
            }
        } else {
            return Move::NULL;
        };

        if !self.by_color[self.side.index()].test(from)
            || self.by_color[self.side.index()].test(to)
            || from == to
        {
            return Move::NULL;
        }

        let mut moves = MoveList::new();
        self.generate_moves(&mut moves);
        for &m in moves.iter() {
            if m.from() == from && m.to() == to {
                if !self.is_legal(m) {
                    return Move::NULL;
                }
                if m.move_type() == MoveType::Promotion {
                    let promoted = if bytes.len() > 4 {
                        match Piece::from_fen_char(bytes[4] as char) {
                            Some(p) => p.piece_type(),
                            None => return Move::NULL,
                        }
                    } else {
                        PieceType::Knight
                    };
                    return Move::with_type(from, to, MoveType::Promotion, promoted);
                }
                return m;
            }
        }

        Move::NULL
    }

    //  ACCESSORS  //

    #[inline]
    fn state(&self) -> &StateInfo {
        &self.states[self.states.len() - 1]
    }

    #[inline]
    fn state_mut(&mut self) -> &mut StateInfo {
        let last = self.states.len() - 1;
        &mut self.states[last]
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Piece {
        self.board[sq.index()]
    }

    #[inline]
    pub fn by_piece(&self, piece: Piece) -> BitBoard {
        self.pieces[piece.index()]
    }

    #[inline]
    pub fn by_color(&self, color: Color) -> BitBoard {
        self.by_color[color.index()]
    }

    #[inline]
    pub fn all_pieces(&self) -> BitBoard {
        self.by_color[0] | self.by_color[1]
    }

    #[inline]
    pub fn by_piece_type(&self, pt: PieceType) -> BitBoard {
        self.pieces[Piece::new(Color::White, pt).index()]
            | self.pieces[Piece::new(Color::Black, pt).index()]
    }

    #[inline]
    pub fn pawns(&self, color: Color) -> BitBoard {
        self.pieces[Piece::new(color, PieceType::Pawn).index()]
    }

    #[inline]
    pub fn knights(&self, color: Color) -> BitBoard {
        self.pieces[Piece::new(color, PieceType::Knight).index()]
    }

    #[inline]
    pub fn bishops(&self, color: Color) -> BitBoard {
        self.pieces[Piece::new(color, PieceType::Bishop).index()]
    }

    #[inline]
    pub fn rooks(&self, color: Color) -> BitBoard {
        self.pieces[Piece::new(color, PieceType::Rook).index()]
    }

    #[inline]
    pub fn queens(&self, color: Color) -> BitBoard {
        self.pieces[Piece::new(color, PieceType::Queen).index()]
    }

    #[inline]
    pub fn rooks_and_queens(&self, color: Color) -> BitBoard {
        self.rooks(color) | self.queens(color)
    }

    #[inline]
    pub fn bishops_and_queens(&self, color: Color) -> BitBoard {
        self.bishops(color) | self.queens(color)
    }

    #[inline]
    pub fn king(&self, color: Color) -> Square {
        self.pieces[Piece::new(color, PieceType::King).index()].lsb()
    }

    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    #[inline]
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    #[inline]
    pub fn material(&self, color: Color) -> i32 {
        self.material[color.index()]
    }

    #[inline]
    pub fn score(&self, color: Color) -> Score {
        self.score[color.index()]
    }

    #[inline]
    pub fn ep(&self) -> Option<Square> {
        self.state().ep
    }

    #[inline]
    pub fn fifty_rule(&self) -> u8 {
        self.state().fifty_rule
    }

    #[inline]
    pub fn castle_right(&self) -> u8 {
        self.state().castle_right
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.state().hash
    }

    #[inline]
    pub fn check_givers(&self) -> BitBoard {
        self.state().check_givers
    }

    #[inline]
    pub fn check_blockers(&self, side: Color) -> BitBoard {
        self.state().check_blockers[side.index()]
    }

    #[inline]
    pub fn in_check(&self) -> bool {
        self.state().check_givers.any()
    }

    /// Whether the side owns anything besides its king and pawns.
    #[inline]
    pub fn has_non_pawns(&self, color: Color) -> bool {
        (self.by_color[color.index()]
            ^ self.pieces[Piece::new(color, PieceType::Pawn).index()]
            ^ self.pieces[Piece::new(color, PieceType::King).index()])
        .any()
    }

    pub fn has_only_same_colored_bishops(&self, color: Color) -> bool {
        let bishops = self.bishops(color);
        (bishops & BitBoard::from_color(Color::White)).is_empty()
            || (bishops & BitBoard::from_color(Color::Black)).is_empty()
    }

    pub fn has_different_colored_bishops(&self, color: Color) -> bool {
        let bishops = self.bishops(color);
        (bishops & BitBoard::from_color(Color::White)).any()
            && (bishops & BitBoard::from_color(Color::Black)).any()
    }

    /// The full position key for the transposition table: the incremental
    /// piece hash plus side, en-passant file and castle rights.
    pub fn compute_hash(&self) -> u64 {
        let keys = zobrist::keys();
        let st = self.state();
        st.hash
            ^ keys.side[self.side.index()]
            ^ st.ep.map_or(0, |sq| keys.ep[sq.file() as usize])
            ^ keys.castling[st.castle_right as usize]
    }

    //  DRAWS AND GAME RESULT  //

    /// No pawns and neither side has more than a single minor piece.
    pub fn low_material_draw(&self) -> bool {
        self.by_piece_type(PieceType::Pawn).is_empty()
            && self.material[0] < 5
            && self.material[1] < 5
    }

    pub fn fifty_rule_draw(&self) -> bool {
        self.state().fifty_rule >= 100
    }

    /// During search (`ply > 0`) a single repetition already counts as a
    /// draw; at the root an actual threefold repetition is required.
    pub fn repetition_draw(&self, ply: i32) -> bool {
        let last_rep = self.state().last_repetition as usize;
        if last_rep == 0 {
            return false;
        }
        ply > 0 || self.states[self.states.len() - last_rep].last_repetition != 0
    }

    pub fn is_draw(&self, ply: i32) -> bool {
        self.low_material_draw() || self.fifty_rule_draw() || self.repetition_draw(ply)
    }

    /// Full game-result classification. Slow (runs movegen); meant for the
    /// front end, not for search nodes.
    pub fn game_result(&self) -> GameResult {
        if self.is_draw(0) {
            return GameResult::Draw;
        }

        let mut moves = MoveList::new();
        self.generate_moves(&mut moves);
        if moves.iter().any(|&m| self.is_legal(m)) {
            return GameResult::None;
        }

        if self.in_check() {
            if self.side == Color::White {
                GameResult::BlackWon
            } else {
                GameResult::WhiteWon
            }
        } else {
            GameResult::Draw
        }
    }

    //  ATTACK QUERIES  //

    /// Pieces of `side` attacking `sq` under the occupancy `occ`.
    pub fn compute_attackers_of(&self, side: Color, sq: Square, occ: BitBoard) -> BitBoard {
        let opposite = side.opposite();
        (bb::pawn_attacks(opposite, sq) & self.pawns(side))
            | (bb::attacks_of(PieceType::Knight, sq, occ) & self.knights(side))
            | (bb::attacks_of(PieceType::Bishop, sq, occ) & self.bishops(side))
            | (bb::attacks_of(PieceType::Rook, sq, occ) & self.rooks(side))
            | (bb::attacks_of(PieceType::Queen, sq, occ) & self.queens(side))
            | (bb::attacks_of(PieceType::King, sq, occ)
                & self.pieces[Piece::new(side, PieceType::King).index()])
    }

    /// Attackers of `sq` from both sides.
    pub fn compute_all_attackers_of(&self, sq: Square, occ: BitBoard) -> BitBoard {
        self.compute_attackers_of(Color::White, sq, occ)
            | self.compute_attackers_of(Color::Black, sq, occ)
    }

    /// The squares attacked by `piece` standing on `sq`.
    pub fn compute_attacks_of(&self, piece: Piece, sq: Square, occ: BitBoard) -> BitBoard {
        match piece.piece_type() {
            PieceType::None => BitBoard::EMPTY,
            PieceType::Pawn => bb::pawn_attacks(piece.color(), sq),
            pt => bb::attacks_of(pt, sq, occ),
        }
    }

    /// True when the move does not change material: a non-capturing simple
    /// move or a castling.
    #[inline]
    pub fn is_quiet(&self, m: Move) -> bool {
        match m.move_type() {
            MoveType::Simple => self.board[m.to().index()] == Piece::NONE,
            MoveType::Castle => true,
            _ => false,
        }
    }

    /// Whether the move checks the opponent, without making it.
    pub fn gives_check(&self, m: Move) -> bool {
        let from = m.from();
        let to = m.to();
        let side = self.board[from.index()].color();
        let opposite = side.opposite();
        let king_sq = self.king(opposite);

        let piece = if m.move_type() != MoveType::Promotion {
            self.board[from.index()]
        } else {
            Piece::new(side, m.promoted())
        };

        // Direct check from the destination square.
        let mut occ = self.all_pieces() ^ BitBoard::from_square(from);
        if self.compute_attacks_of(piece, to, occ).test(king_sq) {
            return true;
        }

        // Discovered check by stepping off a pin ray of the enemy king.
        if self.check_blockers(opposite).test(from) {
            return !bb::are_aligned(from, to, king_sq) || m.move_type() == MoveType::Castle;
        }

        match m.move_type() {
            MoveType::EnPassant => {
                // The captured pawn vanishes from a different square, which
                // can open a diagonal or horizontal line to the king.
                let captured_sq = Square::make(to.file(), from.rank());
                if bb::pseudo_attacks(PieceType::Bishop, king_sq).test(captured_sq) {
                    occ.mv(captured_sq, to);
                    (bb::attacks_of(PieceType::Bishop, king_sq, occ)
                        & self.bishops_and_queens(side))
                    .any()
                } else if king_sq.rank() == captured_sq.rank() {
                    occ.mv(captured_sq, to);
                    (bb::attacks_of(PieceType::Rook, king_sq, occ) & self.rooks_and_queens(side))
                        .any()
                } else {
                    false
                }
            }
            MoveType::Castle => {
                // The rook may deliver a vertical check from its new square.
                let rook_to = if to.file() == 6 {
                    Square::F1.relative(side)
                } else {
                    Square::D1.relative(side)
                };
                rook_to.file() == king_sq.file()
                    && bb::attacks_of(PieceType::Rook, king_sq, occ).test(rook_to)
            }
            _ => false,
        }
    }

    //  LEGALITY  //

    /// Checks whether a pseudo-legal move is legal.
    pub fn is_legal(&self, m: Move) -> bool {
        let from = m.from();
        let to = m.to();
        let us = self.side;
        let them = us.opposite();

        match m.move_type() {
            MoveType::Simple | MoveType::Promotion => {
                if m.move_type() == MoveType::Simple
                    && self.board[from.index()].piece_type() == PieceType::King
                {
                    // The king must not step onto an attacked square; remove
                    // it from the occupancy so it cannot hide behind itself
                    // on the check ray.
                    return self
                        .compute_attackers_of(
                            them,
                            to,
                            self.all_pieces() ^ BitBoard::from_square(from),
                        )
                        .is_empty();
                }
                !self.check_blockers(us).test(from) || bb::are_aligned(from, to, self.king(us))
            }
            MoveType::EnPassant => {
                // Two pieces leave their squares at once, so check the rays
                // to our king explicitly.
                let king_sq = self.king(us);
                let captured_sq = if us == Color::White {
                    to.offset(-8)
                } else {
                    to.offset(8)
                };
                let occ = (self.all_pieces()
                    ^ BitBoard::from_square(from)
                    ^ BitBoard::from_square(captured_sq))
                    | BitBoard::from_square(to);

                (bb::attacks_of(PieceType::Rook, king_sq, occ) & self.rooks_and_queens(them))
                    .is_empty()
                    && (bb::attacks_of(PieceType::Bishop, king_sq, occ)
                        & self.bishops_and_queens(them))
                    .is_empty()
            }
            MoveType::Castle => {
                // No transit square of the king may be attacked. The interior
                // emptiness was checked at generation.
                let step: i8 = if to.file() == 6 { -1 } else { 1 };
                let mut sq = to;
                while sq != from {
                    if self
                        .compute_attackers_of(them, sq, self.all_pieces())
                        .any()
                    {
                        return false;
                    }
                    sq = sq.offset(step);
                }
                true
            }
        }
    }

    //  MAKE / UNMAKE  //

    /// Pushes a new state copying the carry-over fields from the previous.
    fn push_state(&mut self) {
        let prev = self.state();
        let next = StateInfo {
            castle_right: prev.castle_right,
            fifty_rule: prev.fifty_rule.saturating_add(1),
            moves_from_null: prev.moves_from_null + 1,
            hash: prev.hash,
            ..Default::default()
        };
        self.states.push(next);
    }

    pub fn make_move(&mut self, m: Move) {
        debug_assert!(!m.is_null());
        let us = self.side;
        let keys = zobrist::keys();

        self.push_state();

        let from = m.from();
        let to = m.to();
        let piece = self.board[from.index()];

        self.move_count += 1;
        self.side = us.opposite();
        self.state_mut().hash ^= zobrist::MOVE_KEY;

        match m.move_type() {
            MoveType::Simple => {
                let captured = self.move_piece_with_capture(us, piece, from, to);
                let st = self.state_mut();
                if captured != Piece::NONE {
                    st.captured = captured;
                    st.hash ^= keys.piece[captured.index()][to.index()];
                    st.fifty_rule = 0;
                } else if piece == Piece::new(us, PieceType::Pawn) {
                    st.fifty_rule = 0;
                    if bb::distance(from, to) == 2 {
                        st.ep = Some(if us == Color::White {
                            from.offset(8)
                        } else {
                            from.offset(-8)
                        });
                    }
                }
                st.hash ^=
                    keys.piece[piece.index()][from.index()] ^ keys.piece[piece.index()][to.index()];
                st.castle_right &= castle::CHANGE_MASK[from.index()] & castle::CHANGE_MASK[to.index()];
            }
            MoveType::Promotion => {
                let promoted = Piece::new(us, m.promoted());
                let push_delta = if us == Color::White { 8 } else { -8 };
                let straight_push = to.index() as i32 - from.index() as i32 == push_delta;
                if straight_push {
                    self.promote_pawn(us, promoted, from, to, true);
                } else {
                    let captured = self.promote_pawn_with_capture(us, promoted, from, to);
                    if captured != Piece::NONE {
                        let st = self.state_mut();
                        st.captured = captured;
                        st.hash ^= keys.piece[captured.index()][to.index()];
                    }
                }
                let pawn = Piece::new(us, PieceType::Pawn);
                let st = self.state_mut();
                st.hash ^= keys.piece[pawn.index()][from.index()]
                    ^ keys.piece[promoted.index()][to.index()];
                st.fifty_rule = 0;
                st.castle_right &= castle::CHANGE_MASK[from.index()] & castle::CHANGE_MASK[to.index()];
            }
            MoveType::EnPassant => {
                let pawn = Piece::new(us, PieceType::Pawn);
                let their_pawn = Piece::new(us.opposite(), PieceType::Pawn);
                let captured_sq = if us == Color::White {
                    to.offset(-8)
                } else {
                    to.offset(8)
                };
                self.do_enpassant(us, from, to, true);
                let st = self.state_mut();
                st.fifty_rule = 0;
                st.hash ^= keys.piece[pawn.index()][from.index()]
                    ^ keys.piece[pawn.index()][to.index()]
                    ^ keys.piece[their_pawn.index()][captured_sq.index()];
            }
            MoveType::Castle => {
                let king = Piece::new(us, PieceType::King);
                let rook = Piece::new(us, PieceType::Rook);
                {
                    let st = self.state_mut();
                    st.castle_right &= castle::CHANGE_MASK[from.index()];
                    st.castle_right |= castle::done(us);
                }

                self.do_castling(us, from, to, true);

                let (rook_from, rook_to) = if to.file() == 6 {
                    (Square::H1.relative(us), Square::F1.relative(us))
                } else {
                    (Square::A1.relative(us), Square::D1.relative(us))
                };
                let st = self.state_mut();
                st.hash ^=
                    keys.piece[king.index()][from.index()] ^ keys.piece[king.index()][to.index()];
                st.hash ^= keys.piece[rook.index()][rook_from.index()]
                    ^ keys.piece[rook.index()][rook_to.index()];
            }
        }

        self.update_internal_state();

        // Track how far back this position last occurred, scanning every
        // other ply within the reversible window.
        let st = self.state();
        let window = (st.fifty_rule as u32).min(st.moves_from_null) as usize;
        if window >= 4 {
            let len = self.states.len();
            let current = self.states[len - 1].hash;
            let stop = (len - window) as i64;
            let mut i = len as i64 - 5;
            while i >= stop {
                if self.states[i as usize].hash == current {
                    self.states[len - 1].last_repetition = (len as i64 - i) as u16;
                    break;
                }
                i -= 2;
            }
        }
    }

    pub fn unmake_move(&mut self, m: Move) {
        debug_assert!(self.states.len() > 1);
        let captured = self.state().captured;
        self.states.pop();

        self.move_count -= 1;
        let us = self.side.opposite();
        self.side = us;

        let from = m.from();
        let to = m.to();

        match m.move_type() {
            MoveType::Simple => {
                let piece = self.board[to.index()];
                self.unmove_piece_with_capture(us, piece, captured, from, to);
            }
            MoveType::Promotion => {
                let promoted = Piece::new(us, m.promoted());
                if captured != Piece::NONE {
                    self.unpromote_pawn_with_capture(us, promoted, captured, from, to);
                } else {
                    self.promote_pawn(us, promoted, from, to, false);
                }
            }
            MoveType::EnPassant => self.do_enpassant(us, from, to, false),
            MoveType::Castle => self.do_castling(us, from, to, false),
        }
    }

    /// Skips the side's turn. Never legal in a real game; used by the
    /// null-move heuristic in search.
    pub fn make_null_move(&mut self) {
        self.side = self.side.opposite();
        self.push_state();
        let st = self.state_mut();
        st.hash ^= zobrist::NULL_MOVE_KEY;
        st.moves_from_null = 0;
        self.update_internal_state();
    }

    pub fn unmake_null_move(&mut self) {
        debug_assert!(self.states.len() > 1);
        self.side = self.side.opposite();
        self.states.pop();
    }

    //  INTERNAL STATE  //

    fn update_internal_state(&mut self) {
        let us = self.side;
        let givers = self.compute_attackers_of(us.opposite(), self.king(us), self.all_pieces());
        self.state_mut().check_givers = givers;

        self.update_pins(Color::White);
        self.update_pins(Color::Black);
    }

    /// Recomputes the pieces shielding `side`'s king and the enemy sliders
    /// pinning them.
    fn update_pins(&mut self, side: Color) {
        let king_sq = self.king(side);
        let opp = side.opposite();

        let snipers = (bb::pseudo_attacks(PieceType::Bishop, king_sq)
            & self.bishops_and_queens(opp))
            | (bb::pseudo_attacks(PieceType::Rook, king_sq) & self.rooks_and_queens(opp));
        let occupancy = self.all_pieces() ^ snipers;

        let mut blockers = BitBoard::EMPTY;
        let mut pinners = BitBoard::EMPTY;
        for sq in snipers {
            let shield = bb::between(king_sq, sq) & occupancy;
            if shield.any() && !shield.more_than_one() {
                blockers |= shield;
                if (shield & self.by_color[side.index()]).any() {
                    pinners.set(sq);
                }
            }
        }

        let st = self.state_mut();
        st.check_blockers[side.index()] = blockers;
        st.pinners[opp.index()] = pinners;
    }

    //  PIECE MOTION PRIMITIVES  //
    // None of these touch the hash or the castle rights; make_move does.

    fn move_piece_with_capture(
        &mut self,
        us: Color,
        piece: Piece,
        from: Square,
        to: Square,
    ) -> Piece {
        let them = us.opposite();
        let captured = self.board[to.index()];

        self.board[from.index()] = Piece::NONE;
        self.board[to.index()] = piece;
        self.pieces[piece.index()].mv(from, to);
        self.by_color[us.index()].mv(from, to);
        self.score[us.index()] += scores::pst(piece, to) - scores::pst(piece, from);

        if captured != Piece::NONE {
            self.pieces[captured.index()].clear(to);
            self.by_color[them.index()].clear(to);
            self.score[them.index()] -= scores::pst(captured, to);
            self.material[them.index()] -= captured.piece_type().material();
        }

        captured
    }

    fn unmove_piece_with_capture(
        &mut self,
        us: Color,
        piece: Piece,
        captured: Piece,
        from: Square,
        to: Square,
    ) {
        let them = us.opposite();

        self.board[to.index()] = captured;
        self.board[from.index()] = piece;
        self.pieces[piece.index()].mv(from, to);
        self.by_color[us.index()].mv(from, to);
        self.score[us.index()] -= scores::pst(piece, to) - scores::pst(piece, from);

        if captured != Piece::NONE {
            self.pieces[captured.index()].set(to);
            self.by_color[them.index()].set(to);
            self.score[them.index()] += scores::pst(captured, to);
            self.material[them.index()] += captured.piece_type().material();
        }
    }

    fn do_enpassant(&mut self, us: Color, from: Square, to: Square, doing: bool) {
        let them = us.opposite();
        let our_pawn = Piece::new(us, PieceType::Pawn);
        let their_pawn = Piece::new(them, PieceType::Pawn);
        let captured_sq = if us == Color::White {
            to.offset(-8)
        } else {
            to.offset(8)
        };

        if doing {
            self.board[to.index()] = our_pawn;
            self.board[from.index()] = Piece::NONE;
            self.board[captured_sq.index()] = Piece::NONE;
            self.pieces[our_pawn.index()].mv(from, to);
            self.by_color[us.index()].mv(from, to);
            self.score[us.index()] += scores::pst(our_pawn, to) - scores::pst(our_pawn, from);

            self.pieces[their_pawn.index()].clear(captured_sq);
            self.by_color[them.index()].clear(captured_sq);
            self.score[them.index()] -= scores::pst(their_pawn, captured_sq);
            self.material[them.index()] -= PieceType::Pawn.material();
        } else {
            self.board[from.index()] = our_pawn;
            self.board[to.index()] = Piece::NONE;
            self.board[captured_sq.index()] = their_pawn;
            self.pieces[our_pawn.index()].mv(from, to);
            self.by_color[us.index()].mv(from, to);
            self.score[us.index()] -= scores::pst(our_pawn, to) - scores::pst(our_pawn, from);

            self.pieces[their_pawn.index()].set(captured_sq);
            self.by_color[them.index()].set(captured_sq);
            self.score[them.index()] += scores::pst(their_pawn, captured_sq);
            self.material[them.index()] += PieceType::Pawn.material();
        }
    }

    fn promote_pawn(&mut self, us: Color, promoted: Piece, from: Square, to: Square, doing: bool) {
        let pawn = Piece::new(us, PieceType::Pawn);
        let gain = promoted.piece_type().material() - PieceType::Pawn.material();

        if doing {
            self.board[from.index()] = Piece::NONE;
            self.board[to.index()] = promoted;
            self.pieces[pawn.index()].clear(from);
            self.pieces[promoted.index()].set(to);
            self.by_color[us.index()].mv(from, to);
            self.score[us.index()] += scores::pst(promoted, to) - scores::pst(pawn, from);
            self.material[us.index()] += gain;
        } else {
            self.board[to.index()] = Piece::NONE;
            self.board[from.index()] = pawn;
            self.pieces[pawn.index()].set(from);
            self.pieces[promoted.index()].clear(to);
            self.by_color[us.index()].mv(from, to);
            self.score[us.index()] -= scores::pst(promoted, to) - scores::pst(pawn, from);
            self.material[us.index()] -= gain;
        }
    }

    fn promote_pawn_with_capture(
        &mut self,
        us: Color,
        promoted: Piece,
        from: Square,
        to: Square,
    ) -> Piece {
        let them = us.opposite();
        let pawn = Piece::new(us, PieceType::Pawn);
        let captured = self.board[to.index()];

        self.board[from.index()] = Piece::NONE;
        self.board[to.index()] = promoted;
        self.pieces[pawn.index()].clear(from);
        self.pieces[promoted.index()].set(to);
        self.by_color[us.index()].mv(from, to);
        self.score[us.index()] += scores::pst(promoted, to) - scores::pst(pawn, from);
        self.material[us.index()] += promoted.piece_type().material() - PieceType::Pawn.material();

        if captured != Piece::NONE {
            self.pieces[captured.index()].clear(to);
            self.by_color[them.index()].clear(to);
            self.score[them.index()] -= scores::pst(captured, to);
            self.material[them.index()] -= captured.piece_type().material();
        }

        captured
    }

    fn unpromote_pawn_with_capture(
        &mut self,
        us: Color,
        promoted: Piece,
        captured: Piece,
        from: Square,
        to: Square,
    ) {
        let them = us.opposite();
        let pawn = Piece::new(us, PieceType::Pawn);

        self.board[to.index()] = captured;
        self.board[from.index()] = pawn;
        self.pieces[pawn.index()].set(from);
        self.pieces[promoted.index()].clear(to);
        self.by_color[us.index()].mv(from, to);
        self.score[us.index()] -= scores::pst(promoted, to) - scores::pst(pawn, from);
        self.material[us.index()] -= promoted.piece_type().material() - PieceType::Pawn.material();

        if captured != Piece::NONE {
            self.pieces[captured.index()].set(to);
            self.by_color[them.index()].set(to);
            self.score[them.index()] += scores::pst(captured, to);
            self.material[them.index()] += captured.piece_type().material();
        }
    }

    fn do_castling(&mut self, us: Color, from: Square, to: Square, doing: bool) {
        let king = Piece::new(us, PieceType::King);
        let rook = Piece::new(us, PieceType::Rook);

        let (king_from, king_to) = if doing { (from, to) } else { (to, from) };
        let (rook_from, rook_to) = if to.file() == 6 {
            let (a, b) = (Square::H1.relative(us), Square::F1.relative(us));
            if doing {
                (a, b)
            } else {
                (b, a)
            }
        } else {
            let (a, b) = (Square::A1.relative(us), Square::D1.relative(us));
            if doing {
                (a, b)
            } else {
                (b, a)
            }
        };

        self.board[king_from.index()] = Piece::NONE;
        self.board[king_to.index()] = king;
        self.board[rook_from.index()] = Piece::NONE;
        self.board[rook_to.index()] = rook;
        self.pieces[king.index()].mv(king_from, king_to);
        self.pieces[rook.index()].mv(rook_from, rook_to);
        self.by_color[us.index()].mv(king_from, king_to);
        self.by_color[us.index()].mv(rook_from, rook_to);
        self.score[us.index()] += scores::pst(king, king_to) - scores::pst(king, king_from)
            + scores::pst(rook, rook_to)
            - scores::pst(rook, rook_from);
    }

    //  MOVE GENERATION  //

    /// Generates all pseudo-legal moves, or check evasions when in check.
    pub fn generate_moves(&self, moves: &mut MoveList) {
        moves.clear();
        if self.in_check() {
            match self.side {
                Color::White => self.generate::<true, { movegen::CHECK_EVASIONS }>(moves),
                Color::Black => self.generate::<false, { movegen::CHECK_EVASIONS }>(moves),
            }
        } else {
            match self.side {
                Color::White => self.generate::<true, { movegen::ALL_MOVES }>(moves),
                Color::Black => self.generate::<false, { movegen::ALL_MOVES }>(moves),
            }
        }
    }

    /// Generates captures and queen promotions, or evasions when in check.
    pub fn generate_captures(&self, moves: &mut MoveList) {
        moves.clear();
        if self.in_check() {
            match self.side {
                Color::White => self.generate::<true, { movegen::CHECK_EVASIONS }>(moves),
                Color::Black => self.generate::<false, { movegen::CHECK_EVASIONS }>(moves),
            }
        } else {
            match self.side {
                Color::White => self.generate::<true, { movegen::CAPTURES }>(moves),
                Color::Black => self.generate::<false, { movegen::CAPTURES }>(moves),
            }
        }
    }

    /// Appends non-capturing checking moves. The caller must not be in check.
    pub fn generate_quiet_checks(&self, moves: &mut MoveList) {
        debug_assert!(!self.in_check());
        match self.side {
            Color::White => self.generate::<true, { movegen::QUIET_CHECKS }>(moves),
            Color::Black => self.generate::<false, { movegen::QUIET_CHECKS }>(moves),
        }
    }

    fn generate<const WHITE: bool, const MODE: u8>(&self, moves: &mut MoveList) {
        let us = if WHITE { Color::White } else { Color::Black };
        let them = us.opposite();

        let up = Direction::Up.relative(us);
        let up_right = Direction::UpRight.relative(us);
        let up_left = Direction::UpLeft.relative(us);
        let down = Direction::Down.relative(us);
        let down_right = Direction::DownRight.relative(us);
        let down_left = Direction::DownLeft.relative(us);
        let rank3 = BitBoard::from_rank(relative_rank(us, 2));
        let rank7 = BitBoard::from_rank(relative_rank(us, 6));

        let friendly = self.by_color[us.index()];
        let enemy = if MODE == movegen::CHECK_EVASIONS {
            // In check the only capture that helps is of the checking piece.
            self.check_givers()
        } else {
            self.by_color[them.index()]
        };

        let all = self.all_pieces();
        let empty = !all;
        let king_sq = self.king(us);
        let opp_king_sq = self.king(them);

        let trg = if MODE == movegen::CAPTURES {
            enemy
        } else if MODE == movegen::CHECK_EVASIONS {
            // Block the check or capture the checker; between() includes the
            // checker's own square.
            bb::between(king_sq, self.check_givers().lsb())
        } else if MODE == movegen::QUIET_CHECKS {
            !all
        } else {
            !friendly
        };

        // King

        if MODE != movegen::QUIET_CHECKS || self.check_blockers(them).test(king_sq) {
            let mut attacks = bb::attacks_of(PieceType::King, king_sq, all)
                & if MODE != movegen::CHECK_EVASIONS {
                    trg
                } else {
                    !friendly
                };
            if MODE == movegen::QUIET_CHECKS {
                // A discovered king check only works off the shared line.
                attacks &= !bb::pseudo_attacks(PieceType::Queen, opp_king_sq);
            }
            for sq in attacks {
                moves.push(Move::new(king_sq, sq));
            }
            if MODE == movegen::CHECK_EVASIONS && self.check_givers().more_than_one() {
                // Double check: nothing but a king move can help.
                return;
            }
        }

        // Pawns

        let pawns = self.pieces[Piece::new(us, PieceType::Pawn).index()];
        let promotable = pawns & rank7;
        let non_promotable = pawns ^ promotable;

        if MODE != movegen::QUIET_CHECKS && promotable.any() {
            let mut up_promotions = promotable.shift(up) & empty;
            let up_left_promotions = promotable.shift(up_left) & enemy;
            let up_right_promotions = promotable.shift(up_right) & enemy;

            if MODE == movegen::CHECK_EVASIONS {
                up_promotions &= trg;
            }

            for sq in up_promotions {
                moves.push(Move::with_type(sq.shifted(down), sq, MoveType::Promotion, PieceType::Queen));
                if MODE != movegen::CAPTURES {
                    for pt in [PieceType::Rook, PieceType::Bishop, PieceType::Knight] {
                        moves.push(Move::with_type(sq.shifted(down), sq, MoveType::Promotion, pt));
                    }
                }
            }
            for sq in up_left_promotions {
                moves.push(Move::with_type(sq.shifted(down_right), sq, MoveType::Promotion, PieceType::Queen));
                if MODE != movegen::CAPTURES {
                    for pt in [PieceType::Rook, PieceType::Bishop, PieceType::Knight] {
                        moves.push(Move::with_type(sq.shifted(down_right), sq, MoveType::Promotion, pt));
                    }
                }
            }
            for sq in up_right_promotions {
                moves.push(Move::with_type(sq.shifted(down_left), sq, MoveType::Promotion, PieceType::Queen));
                if MODE != movegen::CAPTURES {
                    for pt in [PieceType::Rook, PieceType::Bishop, PieceType::Knight] {
                        moves.push(Move::with_type(sq.shifted(down_left), sq, MoveType::Promotion, pt));
                    }
                }
            }
        }

        if MODE != movegen::QUIET_CHECKS && non_promotable.any() {
            let up_left_captures = non_promotable.shift(up_left) & enemy;
            let up_right_captures = non_promotable.shift(up_right) & enemy;

            for sq in up_left_captures {
                moves.push(Move::new(sq.shifted(down_right), sq));
            }
            for sq in up_right_captures {
                moves.push(Move::new(sq.shifted(down_left), sq));
            }

            if let Some(ep) = self.state().ep {
                let ep_capturers = pawns & BitBoard::from_square(ep).pawn_attacked_squares(them);
                for sq in ep_capturers {
                    moves.push(Move::with_type(sq, ep, MoveType::EnPassant, PieceType::Knight));
                }
            }
        }

        if MODE != movegen::CAPTURES {
            let mut single_push = non_promotable.shift(up) & empty;
            let mut double_push = (single_push & rank3).shift(up) & empty;

            if MODE == movegen::CHECK_EVASIONS {
                single_push &= trg;
                double_push &= trg;
            } else if MODE == movegen::QUIET_CHECKS {
                // A pawn push checks either directly or by discovering a
                // slider; a blocker pawn on the king's file discovers nothing.
                let pawn_to_king = bb::pawn_attacks(them, opp_king_sq);
                let blocking =
                    (self.check_blockers(them) & !BitBoard::from_file(opp_king_sq.file())).shift(up);
                single_push &= pawn_to_king | blocking;
                double_push &= pawn_to_king | blocking.shift(up);
            }

            for sq in single_push {
                moves.push(Move::new(sq.shifted(down), sq));
            }
            for sq in double_push {
                moves.push(Move::new(sq.shifted(down).shifted(down), sq));
            }
        }

        // Knights, bishops, rooks, queens

        self.generate_piece::<MODE>(us, PieceType::Knight, moves, all, trg);
        self.generate_piece::<MODE>(us, PieceType::Bishop, moves, all, trg);
        self.generate_piece::<MODE>(us, PieceType::Rook, moves, all, trg);
        self.generate_piece::<MODE>(us, PieceType::Queen, moves, all, trg);

        // Castlings

        if MODE == movegen::ALL_MOVES {
            let rights = self.state().castle_right;
            if castle::has_right(rights, castle::king_side(us))
                && (bb::castling_internal(us, castle::KING_SIDE) & all).is_empty()
            {
                moves.push(Move::with_type(
                    king_sq,
                    Square::make(6, relative_rank(us, 0)),
                    MoveType::Castle,
                    PieceType::Knight,
                ));
            }
            if castle::has_right(rights, castle::queen_side(us))
                && (bb::castling_internal(us, castle::QUEEN_SIDE) & all).is_empty()
            {
                moves.push(Move::with_type(
                    king_sq,
                    Square::make(2, relative_rank(us, 0)),
                    MoveType::Castle,
                    PieceType::Knight,
                ));
            }
        }
    }

    fn generate_piece<const MODE: u8>(
        &self,
        us: Color,
        pt: PieceType,
        moves: &mut MoveList,
        all: BitBoard,
        trg: BitBoard,
    ) {
        let them = us.opposite();
        // Squares from which this piece type would check the enemy king.
        let opp_king_attacks = if MODE == movegen::QUIET_CHECKS {
            self.compute_attacks_of(Piece::new(us, pt), self.king(them), all)
        } else {
            BitBoard::EMPTY
        };

        for sq in self.pieces[Piece::new(us, pt).index()] {
            let mut attacks = bb::attacks_of(pt, sq, all) & trg;
            if MODE == movegen::QUIET_CHECKS && !self.check_blockers(them).test(sq) {
                attacks &= opp_king_attacks;
            }
            for to in attacks {
                moves.push(Move::new(sq, to));
            }
        }
    }

    //  STATIC EXCHANGE EVALUATION  //

    /// Resolves the capture sequence on the destination square using scalar
    /// piece values only. Positive means the side to move wins material.
    /// X-ray attackers are revealed as pieces are removed; pieces pinned
    /// against their own king do not take part.
    pub fn see(&self, m: Move) -> Value {
        let to = m.to();
        let from = m.from();
        let mut occ = self.all_pieces();
        let mut result: Value;
        let mut next_loss: Value;

        match m.move_type() {
            MoveType::Promotion => {
                next_loss = scores::simplified_value(Piece::new(Color::White, m.promoted()));
                result = scores::simplified_value(self.board[to.index()]) + next_loss
                    - scores::simplified_value(Piece::WHITE_PAWN);
                occ.clear(from);
            }
            MoveType::Simple => {
                result = scores::simplified_value(self.board[to.index()]);
                next_loss = scores::simplified_value(self.board[from.index()]);
                occ.clear(from);
            }
            MoveType::EnPassant => {
                let captured_sq = Square::make(to.file(), from.rank());
                result = scores::simplified_value(Piece::WHITE_PAWN);
                next_loss = result;
                occ.clear(captured_sq);
                occ.clear(from);
            }
            MoveType::Castle => return 0,
        }

        let mut values = [0 as Value; 36];
        values[0] = result;
        let mut i = 0usize;

        let mut side = self.side;
        let mut attackers = self.compute_all_attackers_of(to, occ);
        let mut modifier: Value = 1;

        let all_bishops_queens =
            self.bishops_and_queens(Color::White) | self.bishops_and_queens(Color::Black);
        let all_rooks_queens =
            self.rooks_and_queens(Color::White) | self.rooks_and_queens(Color::Black);

        loop {
            side = side.opposite();
            attackers &= occ;
            let mut current = attackers & self.by_color[side.index()];

            if (occ & self.state().pinners[side.opposite().index()]).any() {
                current &= !self.check_blockers(side);
            }

            if current.is_empty() {
                break;
            }

            modifier = -modifier;

            // Pawns first: capturing with a pawn is never a loss.
            let b = current & self.pawns(side);
            if b.any() {
                result += modifier * next_loss;
                next_loss = scores::simplified_value(Piece::WHITE_PAWN);
                i += 1;
                values[i] = result;

                occ.clear(b.lsb());
                attackers |=
                    bb::attacks_of(PieceType::Bishop, to, occ) & all_bishops_queens;
                continue;
            }

            let b = current & self.knights(side);
            if b.any() {
                result += modifier * next_loss;
                next_loss = scores::simplified_value(Piece::new(Color::White, PieceType::Knight));
                i += 1;
                values[i] = result;

                occ.clear(b.lsb());
                continue;
            }

            let b = current & self.bishops(side);
            if b.any() {
                result += modifier * next_loss;
                next_loss = scores::simplified_value(Piece::new(Color::White, PieceType::Bishop));
                i += 1;
                values[i] = result;

                occ.clear(b.lsb());
                attackers |=
                    bb::attacks_of(PieceType::Bishop, to, occ) & all_bishops_queens;
                continue;
            }

            let b = current & self.rooks(side);
            if b.any() {
                result += modifier * next_loss;
                next_loss = scores::simplified_value(Piece::new(Color::White, PieceType::Rook));
                i += 1;
                values[i] = result;

                occ.clear(b.lsb());
                attackers |= bb::attacks_of(PieceType::Rook, to, occ) & all_rooks_queens;
                continue;
            }

            let b = current & self.queens(side);
            if b.any() {
                result += modifier * next_loss;
                next_loss = scores::simplified_value(Piece::new(Color::White, PieceType::Queen));
                i += 1;
                values[i] = result;

                occ.clear(b.lsb());
                attackers |= (bb::attacks_of(PieceType::Bishop, to, occ) & all_bishops_queens)
                    | (bb::attacks_of(PieceType::Rook, to, occ) & all_rooks_queens);
                continue;
            }

            // Only the king is left; it may capture only when the square is
            // not defended anymore, and nothing can follow it.
            if (attackers & self.by_color[side.opposite().index()] & occ).is_empty() {
                let b = current & self.pieces[Piece::new(side, PieceType::King).index()];
                if b.any() {
                    result += modifier * next_loss;
                }
                i += 1;
                values[i] = result;
            }

            break;
        }

        // Fold back to front: each side stops capturing when that helps.
        while i > 0 {
            if i & 1 == 1 {
                values[i - 1] = values[i - 1].min(values[i]);
            } else {
                values[i - 1] = values[i - 1].max(values[i]);
            }
            i -= 1;
        }

        values[0]
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "+---+---+---+---+---+---+---+---+")?;
        for rank in (0..8u8).rev() {
            for file in 0..8u8 {
                let piece = self.board[Square::make(file, rank).index()];
                write!(f, "| {} ", piece.to_char())?;
            }
            writeln!(f, "|")?;
            writeln!(f, "+---+---+---+---+---+---+---+---+")?;
        }
        writeln!(f, "FEN: {}", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> Board {
        crate::init();
        Board::from_fen(fen).expect("valid fen")
    }

    #[test]
    fn startpos_basics() {
        let b = board(START_FEN);
        assert_eq!(b.side(), Color::White);
        assert_eq!(b.material(Color::White), 8 + 4 * 3 + 2 * 5 + 10);
        assert_eq!(b.king(Color::White), Square::E1);
        assert_eq!(b.king(Color::Black), Square::E8);
        assert!(!b.in_check());
        let mut moves = MoveList::new();
        b.generate_moves(&mut moves);
        assert_eq!(moves.iter().filter(|&&m| b.is_legal(m)).count(), 20);
    }

    #[test]
    fn coordinate_move_resolution() {
        let b = board(START_FEN);
        let m = b.move_from_coord("e2e4");
        assert!(!m.is_null());
        assert_eq!(m.from(), Square::make(4, 1));
        assert_eq!(m.to(), Square::make(4, 3));
        assert!(b.move_from_coord("e2e5").is_null());
        assert!(b.move_from_coord("e7e5").is_null());
        assert!(b.move_from_coord("junk").is_null());
    }

    #[test]
    fn promotion_defaults_to_knight() {
        let b = board("8/3P4/8/8/8/k7/8/1K6 w - - 0 1");
        let m = b.move_from_coord("d7d8");
        assert_eq!(m.move_type(), MoveType::Promotion);
        assert_eq!(m.promoted(), PieceType::Knight);
        let q = b.move_from_coord("d7d8q");
        assert_eq!(q.promoted(), PieceType::Queen);
    }

    #[test]
    fn castling_via_zeros_notation() {
        let b = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let m = b.move_from_coord("0-0");
        assert_eq!(m.move_type(), MoveType::Castle);
        assert_eq!(m.to(), Square::G1);
        let m = b.move_from_coord("0-0-0");
        assert_eq!(m.to(), Square::C1);
    }

    #[test]
    fn double_push_sets_ep_square() {
        let mut b = board(START_FEN);
        b.make_move(b.move_from_coord("e2e4"));
        assert_eq!(b.ep(), Some(Square::make(4, 2)));
        b.make_move(b.move_from_coord("g8f6"));
        assert_eq!(b.ep(), None);
    }

    #[test]
    fn gives_check_cases() {
        // Direct queen check.
        let b = board("4k3/8/8/8/8/8/8/3QK3 w - - 0 1");
        assert!(b.gives_check(b.move_from_coord("d1d7")));
        assert!(b.gives_check(b.move_from_coord("d1e2")));
        assert!(!b.gives_check(b.move_from_coord("d1c2")));

        // Discovered check by a bishop move off the rook's file.
        let b = board("4k3/8/8/8/8/4B3/8/4RK2 w - - 0 1");
        assert!(b.gives_check(b.move_from_coord("e3c5")));
    }

    #[test]
    fn castle_done_flag_set() {
        let mut b = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        b.make_move(b.move_from_coord("e1g1"));
        assert!(b.castle_right() & castle::DONE_WHITE != 0);
        assert!(!castle::has_right(b.castle_right(), castle::WHITE_KING));
        assert!(!castle::has_right(b.castle_right(), castle::WHITE_QUEEN));
        assert!(castle::has_right(b.castle_right(), castle::BLACK_KING));
    }
}
