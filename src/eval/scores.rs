//! Evaluation weights: piece values, piece-square tables and pawn-structure
//! scores.
//!
//! The piece-square tables are stored as half boards (four files by eight
//! ranks) and expanded at startup: mirrored by file, rank-flipped for
//! white, with the piece value folded in. All weights are (middlegame,
//! endgame) pairs collapsed by the game phase at evaluation time.

use std::sync::OnceLock;

use crate::types::{Color, Piece, PieceType, Score, Square, Value, S};

const Z: Score = Score::ZERO;

pub const TEMPO_SCORE: Score = S(15, 3);

///  PAWNS  ///

/// [number of pawn islands, clamped]
/// A pawn island is a run of pawns on consecutive files.
pub const PAWN_ISLANDS: [Score; 5] = [Z, Z, S(-3, -3), S(-21, -16), S(-34, -32)];

/// A pawn defended by another pawn, by relative rank.
pub const DEFENDED_PAWN: [Score; 8] =
    [Z, Z, S(3, 5), S(7, 8), S(13, 15), S(19, 23), S(28, 36), Z];

/// A pawn with no friendly pawns on the adjacent files.
pub const ISOLATED_PAWN: Score = S(-7, -5);

/// A pawn that cannot be protected by its own pawns and cannot safely advance.
pub const BACKWARD_PAWN: Score = S(-9, -9);

/// A pawn with a friendly pawn ahead on the same file.
pub const DOUBLE_PAWN: Score = S(-10, -23);

/// Per-step rank difference between pawns on adjacent files.
pub const PAWN_DISTORTION: Score = S(-1, -2);

/// Bonus for a passed pawn by its relative rank.
pub const PASSED_PAWN: [Score; 8] = [
    Z,
    S(15, 25),
    S(22, 30),
    S(30, 35),
    S(42, 48),
    S(55, 65),
    S(75, 95),
    Z,
];

/// A rook supporting a passed pawn from behind.
pub const ROOK_BEHIND_PASSED_PAWN: Score = S(12, 28);

/// A passed pawn blocked by an enemy minor piece.
pub const MINOR_PASSED_BLOCKED: Score = S(-14, -27);

///  MINOR PIECES  ///

/// Bonus for owning bishops of both square colors.
pub const BISHOP_PAIR: Score = S(35, 20);

///  PAWN ENDGAMES  ///

/// A passed pawn the enemy king can no longer catch.
pub const SQUARE_RULE_PASSED: Value = 200;

/// Factor for the king being near a passed pawn in a pawn endgame.
pub const KING_PASSED_TROPISM: Value = 5;

/// Factor for the king being near any pawn in a pawn endgame.
pub const KING_PAWN_TROPISM: Value = 2;

///  TABLES  ///

/// Penalty table for the lone king in won KXK endgames, pushing it toward a
/// corner.
#[rustfmt::skip]
pub const KING_PUSH_TO_CORNER: [Value; Square::COUNT] = [
    100, 90, 80, 70, 70, 80, 90, 100,
     90, 60, 50, 40, 40, 50, 60,  90,
     80, 50, 30, 20, 20, 30, 50,  80,
     70, 40, 20, 10, 10, 20, 40,  70,
     70, 40, 20, 10, 10, 20, 40,  70,
     80, 50, 30, 20, 20, 30, 50,  80,
     90, 60, 50, 40, 40, 50, 60,  90,
    100, 90, 80, 70, 70, 80, 90, 100,
];

/// Piece values by type.
pub const PIECE_VALUE: [Score; PieceType::COUNT] = [
    Z,             // none
    S(100, 130),   // pawn
    S(320, 360),   // knight
    S(350, 390),   // bishop
    S(550, 650),   // rook
    S(1050, 1150), // queen
    Z,             // king
];

/// Half-board piece-square tables, four files per rank, written from the
/// eighth rank down as seen by white. Mirrored by file and expanded per
/// color at startup.
#[rustfmt::skip]
const PST_HALF: [[Score; 32]; PieceType::COUNT] = [
    [Z; 32], // none
    [ // pawn
        Z,            Z,            Z,            Z,
        S(20,  40),   S(20,  45),   S(16,  45),   S(25,  45),
        S(11,  25),   S(10,  25),   S(10,  25),   S(18,  25),
        S(3,   15),   S(2,   15),   S(6,   15),   S(15,  15),
        S(0,   10),   S(0,   10),   S(4,   10),   S(12,  10),
        S(3,   5),    S(4,   5),    S(-4,  5),    S(0,   5),
        S(-2,  0),    S(-3,  0),    S(4,   0),    S(-12, 0),
        Z,            Z,            Z,            Z,
    ],
    [ // knight
        S(-65, -40),  S(-40, -20),  S(-22, -20),  S(-15, -15),
        S(-45, -30),  S(-15, -9),   S(7,   2),    S(10,  5),
        S(-20, -14),  S(3,   2),    S(15,  10),   S(26,  17),
        S(-12, -8),   S(10,  5),    S(24,  15),   S(40,  23),
        S(-15, -10),  S(5,   5),    S(20,  15),   S(36,  23),
        S(-30, -20),  S(0,   2),    S(12,  10),   S(23,  17),
        S(-45, -30),  S(-16, -9),   S(2,   2),    S(8,   5),
        S(-60, -40),  S(-25, -20),  S(-22, -20),  S(-25, -15),
    ],
    [ // bishop
        S(-15, -20),  S(-14, -15),  S(-9,  -10),  S(-15, -10),
        S(-10, -15),  S(5,   10),   S(2,   5),    S(-2,  0),
        S(-5,  -10),  S(7,   5),    S(5,   10),   S(8,   5),
        S(0,   -10),  S(-5,  0),    S(10,  5),    S(15,  10),
        S(0,   -10),  S(-5,  0),    S(10,  5),    S(15,  10),
        S(10,  -10),  S(5,   5),    S(5,   10),   S(9,   5),
        S(5,   -15),  S(20,  10),   S(3,   5),    S(0,   0),
        S(-5,  -20),  S(-12, -15),  S(1,   -10),  S(-10, -10),
    ],
    [ // rook
        S(-12, -1),   S(-10, 0),    S(-4,  0),    S(-1,  0),
        S(-8,  0),    S(4,   0),    S(5,   0),    S(5,   0),
        S(-15, 0),    S(-2,  0),    S(-5,  0),    S(-5,  0),
        S(-20, 0),    S(-5,  0),    S(-10, 0),    S(-20, 0),
        S(-20, 0),    S(-5,  0),    S(-10, 0),    S(-20, 0),
        S(-15, 0),    S(-2,  0),    S(-5,  0),    S(-5,  0),
        S(-8,  0),    S(0,   0),    S(1,   0),    S(12,  0),
        S(-10, -1),   S(-8,  0),    S(2,   0),    S(20,  0),
    ],
    [ // queen
        S(-8,  -20),  S(-10, -15),  S(-10, -10),  S(0,   -5),
        S(0,   -15),  S(0,   -9),   S(0,   0),    S(10,  0),
        S(0,   -10),  S(0,   0),    S(0,   5),    S(6,   6),
        S(0,   -5),   S(0,   3),    S(4,   10),   S(3,   12),
        S(0,   -5),   S(0,   3),    S(4,   10),   S(4,   12),
        S(0,   -10),  S(0,   0),    S(0,   5),    S(0,   6),
        S(0,   -15),  S(0,   -9),   S(0,   0),    S(0,   0),
        S(-8,  -20),  S(-8,  -15),  S(-5,  -10),  S(0,   -5),
    ],
    [ // king
        S(-70, -60),  S(-70, -45),  S(-75, -40),  S(-80, -35),
        S(-80, -45),  S(-80, -25),  S(-85, -20),  S(-85, -15),
        S(-80, -40),  S(-80, -20),  S(-85, -5),   S(-85, 0),
        S(-70, -35),  S(-70, -15),  S(-70, 0),    S(-70, 10),
        S(-55, -35),  S(-55, -15),  S(-60, 0),    S(-65, 10),
        S(-40, -40),  S(-45, -20),  S(-45, -5),   S(-50, 0),
        S(-5,  -45),  S(-5,  -25),  S(-25, -20),  S(-30, -15),
        S(25,  -60),  S(35,  -45),  S(7,   -40),  S(-5,  -35),
    ],
];

pub struct ScoreTables {
    /// [piece][square], piece value included.
    pub pst: [[Score; Square::COUNT]; Piece::COUNT],
    /// Single scalar piece values for SEE and move ordering, (mg + eg) / 2.
    pub simplified: [Value; Piece::COUNT],
}

static TABLES: OnceLock<Box<ScoreTables>> = OnceLock::new();

#[inline]
pub fn tables() -> &'static ScoreTables {
    TABLES.get_or_init(build)
}

pub fn init() {
    let _ = tables();
}

#[inline]
pub fn pst(piece: Piece, sq: Square) -> Score {
    tables().pst[piece.index()][sq.index()]
}

#[inline]
pub fn simplified_value(piece: Piece) -> Value {
    tables().simplified[piece.index()]
}

fn build() -> Box<ScoreTables> {
    let mut t = Box::new(ScoreTables {
        pst: [[Z; Square::COUNT]; Piece::COUNT],
        simplified: [0; Piece::COUNT],
    });

    for pt_idx in 1..PieceType::COUNT {
        let pt = PieceType::from_index(pt_idx as u8);
        let white = Piece::new(Color::White, pt).index();
        let black = Piece::new(Color::Black, pt).index();

        let value = PIECE_VALUE[pt_idx];
        t.simplified[white] = (value.mg + value.eg) / 2;
        t.simplified[black] = t.simplified[white];

        for i in 0..32 {
            let rank = (i >> 2) as u8;
            let file = (i & 3) as u8;
            let sq_black = Square::make(file, rank);
            let sq_white = sq_black.mirror_rank();
            let score = PST_HALF[pt_idx][i] + value;

            t.pst[white][sq_white.index()] = score;
            t.pst[white][sq_white.mirror_file().index()] = score;
            t.pst[black][sq_black.index()] = score;
            t.pst[black][sq_black.mirror_file().index()] = score;
        }
    }

    t
}
