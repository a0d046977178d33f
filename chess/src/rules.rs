//! Position with game history: move counters, draw rules and repetitions

use crate::moves::Move;
use crate::position::{Detail, FenParseError, Position};
use crate::types::{Color, DrawKind, Piece};

use std::ops::Deref;

const RING_SIZE: usize = 256;

/// Longest walk back through the history when looking for repetitions
const MAX_WALK: usize = RING_SIZE - 1;

/// Position together with the history of the game
///
/// There are two ways to apply a move:
///
/// - [`Rules::play_move()`] makes a move in the game. It updates the move counters and records
///   the move in the history, so it is later taken into account by the draw rules. Played
///   moves cannot be taken back.
/// - [`Rules::push_move()`] and [`Rules::pop_move()`] apply and revert moves temporarily,
///   e.g. to look ahead. Pushed moves do not touch the counters or the history.
///
/// Both histories are ring buffers of 256 entries, so only the recent moves are kept.
///
/// # Example
///
/// ```
/// # use kibitzer::{Color, DrawKind, Move, Rules};
/// #
/// let mut rules = Rules::new();
/// for _ in 0..2 {
///     for s in ["g1f3", "g8f6", "f3g1", "f6g8"] {
///         let mv = Move::from_terse(s, &rules).unwrap();
///         rules.play_move(mv);
///     }
/// }
/// assert_eq!(rules.is_draw(Color::White), Some(DrawKind::Repetition));
/// ```
#[derive(Debug, Clone)]
pub struct Rules {
    pos: Position,
    history: [(Move, Detail); RING_SIZE],
    history_idx: u8,
    stack: [Detail; RING_SIZE],
    stack_idx: u8,
}

impl Rules {
    /// Creates a game from the initial position
    pub fn new() -> Rules {
        Rules::from_position(Position::initial())
    }

    /// Creates a game starting from `pos`, with empty history
    pub fn from_position(pos: Position) -> Rules {
        let mut res = Rules {
            pos,
            history: [(Move::NULL, Detail::default()); RING_SIZE],
            history_idx: 0,
            stack: [Detail::default(); RING_SIZE],
            stack_idx: 0,
        };
        res.clear_history();
        res
    }

    pub fn from_fen(s: &str) -> Result<Rules, FenParseError> {
        Ok(Rules::from_position(Position::from_fen(s)?))
    }

    /// Starts the game over from `pos`, clearing the history
    pub fn set_position(&mut self, pos: Position) {
        self.pos = pos;
        self.clear_history();
    }

    /// Starts the game over from the position given in FEN
    ///
    /// Nothing is changed if the FEN is invalid.
    pub fn set_fen(&mut self, s: &str) -> Result<(), FenParseError> {
        let pos = Position::from_fen(s)?;
        self.set_position(pos);
        Ok(())
    }

    /// Starts the game over from the initial position
    pub fn reset(&mut self) {
        self.set_position(Position::initial());
    }

    fn clear_history(&mut self) {
        // The null move at the start stops the walks back through the history
        self.history[0] = (Move::NULL, Detail::default());
        self.history_idx = 1;
        self.stack_idx = 0;
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// Consumes the game and returns the current position
    #[inline]
    pub fn into_position(self) -> Position {
        self.pos
    }

    /// Iterates over the played moves still kept in the history, from the oldest to the latest
    pub fn history(&self) -> impl Iterator<Item = Move> + '_ {
        let end = self.history_idx;
        let mut idx = end;
        let mut res = Vec::new();
        for _ in 0..MAX_WALK {
            idx = idx.wrapping_sub(1);
            let (mv, _) = self.history[idx as usize];
            if mv.is_null() {
                break;
            }
            res.push(mv);
        }
        res.into_iter().rev()
    }

    /// Applies `mv` temporarily
    ///
    /// The move must be legal. Undo it with [`Rules::pop_move()`].
    pub fn push_move(&mut self, mv: Move) {
        #[cfg(feature = "selftest")]
        let expected = self.pos.hash64_update(self.pos.hash64(), mv);
        let detail = self.pos.make_move(mv);
        self.stack[self.stack_idx as usize] = detail;
        self.stack_idx = self.stack_idx.wrapping_add(1);
        #[cfg(feature = "selftest")]
        assert_eq!(self.pos.hash64(), expected, "hash mismatch after {}", mv);
    }

    /// Reverts the last move applied with [`Rules::push_move()`]
    ///
    /// `mv` must be the same move that was pushed.
    pub fn pop_move(&mut self, mv: Move) {
        self.stack_idx = self.stack_idx.wrapping_sub(1);
        let detail = self.stack[self.stack_idx as usize];
        #[cfg(feature = "selftest")]
        let before = self.pos.clone();
        self.pos.unmake_move(mv, detail);
        #[cfg(feature = "selftest")]
        {
            let mut check = self.pos.clone();
            let redo = check.make_move(mv);
            assert!(check.strict_eq(&before), "pop_move({}) does not revert the move", mv);
            assert_eq!(redo, detail);
        }
    }

    /// Plays `mv` in the game
    ///
    /// The move must be legal. The move counters are updated, and the move is recorded in the
    /// history.
    pub fn play_move(&mut self, mv: Move) {
        if self.pos.side() == Color::Black {
            self.pos.full_move_count = self.pos.full_move_count.saturating_add(1);
        }
        if self.pos.get(mv.src()).piece() == Some(Piece::Pawn) || mv.is_capture() {
            self.pos.half_move_clock = 0;
        } else {
            self.pos.half_move_clock = self.pos.half_move_clock.saturating_add(1);
        }
        let detail = self.pos.make_move(mv);
        self.history[self.history_idx as usize] = (mv, detail);
        self.history_idx = self.history_idx.wrapping_add(1);
    }

    /// Number of plies to look back, as derived from the move counters
    fn walk_len(&self) -> usize {
        let full = i32::from(self.pos.full_move_count);
        let plies = (full - 1) * 2 + i32::from(self.pos.side() == Color::Black);
        plies.clamp(0, MAX_WALK as i32) as usize
    }

    /// Walks back through the history and counts the positions equal to the current one
    ///
    /// The walk stops after `limit` matches, at the start of the history, or after undoing
    /// a pawn move or a capture, since the positions before those cannot repeat.
    fn count_repeats(&self, limit: usize) -> usize {
        let mut pos = self.pos.clone();
        let mut idx = self.history_idx;
        let mut matches = 0;
        for _ in 0..self.walk_len() {
            idx = idx.wrapping_sub(1);
            let (mv, detail) = self.history[idx as usize];
            if mv.is_null() {
                break;
            }
            pos.unmake_move(mv, detail);
            if pos == self.pos {
                matches += 1;
                if matches >= limit {
                    break;
                }
            }
            if pos.get(mv.src()).piece() == Some(Piece::Pawn) || mv.is_capture() {
                break;
            }
        }
        matches
    }

    /// Returns `true` if the current position already occurred in the game
    pub fn is_repetition(&self) -> bool {
        self.count_repeats(1) >= 1
    }

    /// Checks whether the game can be drawn in the current position
    ///
    /// `claimant` is the side asking for the draw, which matters only for insufficient
    /// material. The rules are checked in the following order: insufficient material, the
    /// fifty move rule and threefold repetition.
    pub fn is_draw(&self, claimant: Color) -> Option<DrawKind> {
        if let Some(kind) = self.is_insufficient_draw(claimant) {
            return Some(kind);
        }
        if self.pos.half_move_clock() >= 100 {
            return Some(DrawKind::FiftyMove);
        }
        if self.count_repeats(2) >= 2 {
            return Some(DrawKind::Repetition);
        }
        None
    }

    /// Checks the material on the board
    ///
    /// Returns [`DrawKind::InsufficientAuto`] if nobody can mate (bare kings, or a single
    /// knight or bishop on the board). Otherwise, returns [`DrawKind::Insufficient`] if the
    /// opponent of `claimant` has a bare king.
    pub fn is_insufficient_draw(&self, claimant: Color) -> Option<DrawKind> {
        let mut count = 0;
        let mut minor = false;
        let mut bare = [true; 2];
        for cell in self.pos.cells() {
            let (color, piece) = match (cell.color(), cell.piece()) {
                (Some(color), Some(piece)) => (color, piece),
                _ => continue,
            };
            match piece {
                Piece::King => continue,
                Piece::Knight | Piece::Bishop => minor = true,
                _ => {}
            }
            count += 1;
            bare[color.index()] = false;
        }
        if count == 0 || (count == 1 && minor) {
            return Some(DrawKind::InsufficientAuto);
        }
        if bare[claimant.inv().index()] {
            return Some(DrawKind::Insufficient);
        }
        None
    }
}

impl Default for Rules {
    #[inline]
    fn default() -> Self {
        Rules::new()
    }
}

impl Deref for Rules {
    type Target = Position;

    #[inline]
    fn deref(&self) -> &Position {
        &self.pos
    }
}

impl From<Position> for Rules {
    #[inline]
    fn from(pos: Position) -> Self {
        Rules::from_position(pos)
    }
}
