use serde::{Deserialize, Serialize};

use crate::{are_collinear_at_step, Board, Side, Square};

const DIRECTIONS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// A move of one piece. Captures jump over one or three opponent pieces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub is_capture: bool,
}

impl Move {
    pub const fn step(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            is_capture: false,
        }
    }

    pub const fn capture(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            is_capture: true,
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sep = if self.is_capture { 'x' } else { '-' };
        write!(f, "{}{}{}", self.from, sep, self.to)
    }
}

/// Who is forced to capture whenever some capture is available.
///
/// This is a policy applied to the moves of a whole side, not to a single
/// square: with a covering policy, quiet moves of `side` are dropped as soon as
/// any of its pieces can capture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CapturePriority {
    #[default]
    Nobody,
    Only(Side),
    Everybody,
}

impl CapturePriority {
    pub fn applies_to(self, side: Side) -> bool {
        match self {
            CapturePriority::Nobody => false,
            CapturePriority::Only(s) => s == side,
            CapturePriority::Everybody => true,
        }
    }

    /// Drops the quiet moves if `moves` contains a capture and the policy covers `side`.
    pub fn filter(self, side: Side, mut moves: Vec<Move>) -> Vec<Move> {
        if self.applies_to(side) && moves.iter().any(|mv| mv.is_capture) {
            moves.retain(|mv| mv.is_capture);
        }
        moves
    }
}

impl Board {
    /// The legal moves of the piece on `from`.
    ///
    /// With `must_capture` (a capture was already made this turn) only captures
    /// are returned. Otherwise quiet steps come first, followed by the captures
    /// in direction order, short before long. An empty square yields no moves.
    pub fn moves_from(&self, from: Square, must_capture: bool) -> Vec<Move> {
        let mut moves = Vec::new();
        self.moves_from_into(from, must_capture, &mut moves);
        moves
    }

    fn moves_from_into(&self, from: Square, must_capture: bool, moves: &mut Vec<Move>) {
        let Some(side) = self.get(from) else {
            return;
        };
        let opponent = Some(side.opponent());
        let is_opponent = |dir: (i8, i8), k: i8| {
            from.offset(dir, k)
                .map_or(false, |sq| self.get(sq) == opponent)
        };
        let landing = |dir: (i8, i8), k: i8| {
            from.offset(dir, k)
                .filter(|&to| self.is_empty(to) && are_collinear_at_step(from, to))
        };

        if !must_capture {
            for dir in DIRECTIONS {
                if let Some(to) = landing(dir, 1) {
                    moves.push(Move::step(from, to));
                }
            }
        }
        for dir in DIRECTIONS {
            if is_opponent(dir, 1) {
                if let Some(to) = landing(dir, 2) {
                    moves.push(Move::capture(from, to));
                }
                if is_opponent(dir, 2) && is_opponent(dir, 3) {
                    if let Some(to) = landing(dir, 4) {
                        moves.push(Move::capture(from, to));
                    }
                }
            }
        }
    }

    /// The union of [`Self::moves_from()`] over all pieces of `side`, in row-major order.
    pub fn all_moves_for(&self, side: Side, must_capture: bool) -> Vec<Move> {
        let mut moves = Vec::new();
        for sq in self.pieces(side) {
            self.moves_from_into(sq, must_capture, &mut moves);
        }
        moves
    }

    /// [`Self::all_moves_for()`] with the capture priority filter applied.
    pub fn legal_moves(&self, side: Side, must_capture: bool, priority: CapturePriority) -> Vec<Move> {
        priority.filter(side, self.all_moves_for(side, must_capture))
    }

    /// The moves available to `side` in the current state of its turn.
    ///
    /// `chain` is the landing square of a capture already made this turn; then
    /// only further captures by that piece are allowed.
    pub fn turn_moves(
        &self,
        side: Side,
        chain: Option<Square>,
        priority: CapturePriority,
    ) -> Vec<Move> {
        match chain {
            Some(sq) if self.get(sq) == Some(side) => self.moves_from(sq, true),
            Some(_) => Vec::new(),
            None => self.legal_moves(side, false, priority),
        }
    }

    /// Whether `side` has any legal move at all. Cheaper than counting them.
    pub fn has_any_move(&self, side: Side) -> bool {
        let mut buf = Vec::with_capacity(8);
        self.pieces(side).into_iter().any(|sq| {
            buf.clear();
            self.moves_from_into(sq, false, &mut buf);
            !buf.is_empty()
        })
    }
}
