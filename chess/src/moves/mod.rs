//! Moves and their text forms

mod make;
mod natural;
mod terse;

pub use natural::NaturalParseError;
pub use terse::TerseParseError;

use crate::types::{CastlingSide, Cell, Color, Coord, Piece};
use kibitzer_base::geometry;

use std::fmt;

use thiserror::Error;

/// Move kind
///
/// Besides the promotions, all the kinds that affect more than two squares or the king cache
/// carry the color of the moving side.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveKind {
    /// Any move except the ones below
    #[default]
    Normal = 0,
    /// Non-castling king move
    KingMove = 1,
    WhiteKingsideCastling = 2,
    WhiteQueensideCastling = 3,
    BlackKingsideCastling = 4,
    BlackQueensideCastling = 5,
    /// Pawn promote to queen (either non-capture or capture)
    PromoteQueen = 6,
    /// Pawn promote to rook (either non-capture or capture)
    PromoteRook = 7,
    /// Pawn promote to bishop (either non-capture or capture)
    PromoteBishop = 8,
    /// Pawn promote to knight (either non-capture or capture)
    PromoteKnight = 9,
    /// Double pawn move, which sets the en passant target
    WhitePawnDouble = 10,
    BlackPawnDouble = 11,
    WhiteEnpassant = 12,
    BlackEnpassant = 13,
}

impl MoveKind {
    /// Promotion kinds in the order they are generated
    pub const PROMOTES: [MoveKind; 4] = [
        MoveKind::PromoteQueen,
        MoveKind::PromoteKnight,
        MoveKind::PromoteBishop,
        MoveKind::PromoteRook,
    ];

    #[inline]
    pub const fn castling(c: Color, s: CastlingSide) -> MoveKind {
        match (c, s) {
            (Color::White, CastlingSide::King) => MoveKind::WhiteKingsideCastling,
            (Color::White, CastlingSide::Queen) => MoveKind::WhiteQueensideCastling,
            (Color::Black, CastlingSide::King) => MoveKind::BlackKingsideCastling,
            (Color::Black, CastlingSide::Queen) => MoveKind::BlackQueensideCastling,
        }
    }

    #[inline]
    pub const fn pawn_double(c: Color) -> MoveKind {
        match c {
            Color::White => MoveKind::WhitePawnDouble,
            Color::Black => MoveKind::BlackPawnDouble,
        }
    }

    #[inline]
    pub const fn enpassant(c: Color) -> MoveKind {
        match c {
            Color::White => MoveKind::WhiteEnpassant,
            Color::Black => MoveKind::BlackEnpassant,
        }
    }

    /// Returns the promote kind for piece `p`, or `None` if pawns cannot promote to `p`
    #[inline]
    pub const fn from_promote(p: Piece) -> Option<MoveKind> {
        match p {
            Piece::Queen => Some(MoveKind::PromoteQueen),
            Piece::Rook => Some(MoveKind::PromoteRook),
            Piece::Bishop => Some(MoveKind::PromoteBishop),
            Piece::Knight => Some(MoveKind::PromoteKnight),
            _ => None,
        }
    }

    /// Returns the piece after promote if this move kind represents a promote
    ///
    /// Otherwise, returns `None`.
    #[inline]
    pub const fn promote(self) -> Option<Piece> {
        match self {
            MoveKind::PromoteQueen => Some(Piece::Queen),
            MoveKind::PromoteRook => Some(Piece::Rook),
            MoveKind::PromoteBishop => Some(Piece::Bishop),
            MoveKind::PromoteKnight => Some(Piece::Knight),
            _ => None,
        }
    }

    /// Returns the color and the side if this move kind represents castling
    #[inline]
    pub const fn as_castling(self) -> Option<(Color, CastlingSide)> {
        match self {
            MoveKind::WhiteKingsideCastling => Some((Color::White, CastlingSide::King)),
            MoveKind::WhiteQueensideCastling => Some((Color::White, CastlingSide::Queen)),
            MoveKind::BlackKingsideCastling => Some((Color::Black, CastlingSide::King)),
            MoveKind::BlackQueensideCastling => Some((Color::Black, CastlingSide::Queen)),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_castling(self) -> bool {
        self.as_castling().is_some()
    }

    #[inline]
    pub const fn is_promote(self) -> bool {
        self.promote().is_some()
    }

    #[inline]
    pub const fn is_enpassant(self) -> bool {
        matches!(self, MoveKind::WhiteEnpassant | MoveKind::BlackEnpassant)
    }

    #[inline]
    pub const fn is_pawn_double(self) -> bool {
        matches!(self, MoveKind::WhitePawnDouble | MoveKind::BlackPawnDouble)
    }

    /// Same kind for the opposite color
    pub const fn mirrored(self) -> MoveKind {
        match self {
            MoveKind::WhiteKingsideCastling => MoveKind::BlackKingsideCastling,
            MoveKind::WhiteQueensideCastling => MoveKind::BlackQueensideCastling,
            MoveKind::BlackKingsideCastling => MoveKind::WhiteKingsideCastling,
            MoveKind::BlackQueensideCastling => MoveKind::WhiteQueensideCastling,
            MoveKind::WhitePawnDouble => MoveKind::BlackPawnDouble,
            MoveKind::BlackPawnDouble => MoveKind::WhitePawnDouble,
            MoveKind::WhiteEnpassant => MoveKind::BlackEnpassant,
            MoveKind::BlackEnpassant => MoveKind::WhiteEnpassant,
            other => other,
        }
    }
}

/// Chess move
///
/// Apart from the source and destination squares, the move keeps its [kind](MoveKind) and
/// the contents of the captured cell, so it can be unmade without looking at the position.
/// For en passant, the captured cell is the enemy pawn, even though the destination square
/// is empty.
///
/// # Null move
///
/// The null move has equal source and destination squares. It is never legal, and serves as
/// a placeholder, e.g. to mark the start of the game in the move history. Its text form is
/// `0000`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    src: Coord,
    dst: Coord,
    kind: MoveKind,
    capture: Cell,
}

/// Error indicating that the move is not legal in the given position
#[derive(Debug, Clone, Error, Eq, PartialEq)]
#[error("move is not legal")]
pub struct IllegalMoveError;

impl Move {
    /// Null move
    pub const NULL: Move = Move {
        src: Coord::A8,
        dst: Coord::A8,
        kind: MoveKind::Normal,
        capture: Cell::EMPTY,
    };

    /// Creates a move from its raw parts
    ///
    /// No validation is performed, so it's up to the caller to pass moves created this way only
    /// into positions where they make sense.
    #[inline]
    pub const fn new(kind: MoveKind, src: Coord, dst: Coord, capture: Cell) -> Move {
        Move {
            src,
            dst,
            kind,
            capture,
        }
    }

    /// Creates a castling move made by `color` with side `side`
    #[inline]
    pub const fn from_castling(color: Color, side: CastlingSide) -> Move {
        Move::new(
            MoveKind::castling(color, side),
            geometry::king_home(color),
            geometry::castling_king_dst(color, side),
            Cell::EMPTY,
        )
    }

    #[inline]
    pub const fn src(&self) -> Coord {
        self.src
    }

    #[inline]
    pub const fn dst(&self) -> Coord {
        self.dst
    }

    #[inline]
    pub const fn kind(&self) -> MoveKind {
        self.kind
    }

    /// Captured cell, or [`Cell::EMPTY`] if the move is not a capture
    #[inline]
    pub const fn capture(&self) -> Cell {
        self.capture
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.src.index() == self.dst.index()
    }

    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.capture.is_occupied()
    }

    /// Square of the pawn taken by en passant
    ///
    /// Meaningful only for en passant moves.
    #[inline]
    pub(crate) fn enpassant_victim(&self) -> Coord {
        match self.kind {
            MoveKind::BlackEnpassant => Coord::from_index(self.dst.index() - 8),
            _ => Coord::from_index(self.dst.index() + 8),
        }
    }

    /// Formats the move in terse form, like `e2e4` or `e7e8q`
    #[inline]
    pub fn terse(&self) -> String {
        self.to_string()
    }

    /// Returns the same move for the [mirrored](crate::Position::mirrored) position
    pub const fn mirrored(&self) -> Move {
        if self.is_null() {
            return *self;
        }
        Move {
            src: self.src.flipped_rank(),
            dst: self.dst.flipped_rank(),
            kind: self.kind.mirrored(),
            capture: self.capture.inverted(),
        }
    }
}

impl Default for Move {
    #[inline]
    fn default() -> Self {
        Move::NULL
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if self.is_null() {
            return write!(f, "0000");
        }
        write!(f, "{}{}", self.src, self.dst)?;
        if let Some(p) = self.kind.promote() {
            write!(f, "{}", p.as_char().to_ascii_lowercase())?;
        }
        Ok(())
    }
}
