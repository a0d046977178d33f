//! Core types shared by all the modules

pub use kibitzer_base::types::{
    CastlingRights, CastlingRightsParseError, CastlingSide, Cell, CellParseError, Color, Coord,
    CoordParseError, File, Piece, Rank,
};

use std::fmt;

/// Game end on the board, with the color of the side which has no moves
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Terminal {
    Checkmate(Color),
    Stalemate(Color),
}

impl Terminal {
    /// Color of the side which has no moves
    pub fn side(&self) -> Color {
        match *self {
            Terminal::Checkmate(c) | Terminal::Stalemate(c) => c,
        }
    }

    pub fn is_checkmate(&self) -> bool {
        matches!(self, Terminal::Checkmate(_))
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let (what, c) = match *self {
            Terminal::Checkmate(c) => ("checkmated", c),
            Terminal::Stalemate(c) => ("stalemated", c),
        };
        match c {
            Color::White => write!(f, "white {}", what),
            Color::Black => write!(f, "black {}", what),
        }
    }
}

/// Status of the position for the side to move
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    /// The side which has just moved left its king under attack
    Illegal,
    /// The side to move has at least one legal move
    Ongoing,
    Terminal(Terminal),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DrawKind {
    /// Fifty moves by each side without pawn moves or captures
    FiftyMove,
    /// The opponent has a bare king, so the claiming side can ask for a draw
    Insufficient,
    /// Neither side can mate: bare kings or a single minor piece
    InsufficientAuto,
    /// The same position occurred for the third time
    Repetition,
}

impl fmt::Display for DrawKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            DrawKind::FiftyMove => write!(f, "fifty move rule"),
            DrawKind::Insufficient => write!(f, "lack of mating material"),
            DrawKind::InsufficientAuto => write!(f, "insufficient material"),
            DrawKind::Repetition => write!(f, "threefold repetition"),
        }
    }
}
