//! Moves in terse form, like `e2e4` or `e7e8q`

use super::{Move, MoveKind};
use crate::position::Position;
use crate::types::{Coord, CoordParseError, Piece};

use thiserror::Error;

/// Error parsing a move in terse form
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum TerseParseError {
    /// Bad string length
    #[error("bad string length")]
    BadLength,
    /// Bad source square
    #[error("bad source: {0}")]
    BadSrc(CoordParseError),
    /// Bad destination square
    #[error("bad destination: {0}")]
    BadDst(CoordParseError),
    /// Bad promote character
    #[error("bad promote char {0:?}")]
    BadPromote(char),
    /// The move is well-formed, but not legal in the given position
    #[error("move is not legal")]
    NotLegal,
}

fn parse_promote(c: char) -> Result<Piece, TerseParseError> {
    match Piece::from_char(c) {
        Some(p) if MoveKind::from_promote(p).is_some() => Ok(p),
        _ => Err(TerseParseError::BadPromote(c)),
    }
}

impl Move {
    /// Parses a move in terse form and finds it among the legal moves of `pos`
    ///
    /// The promote letter may be omitted, in which case the pawn promotes to a queen. The null
    /// move `0000` is never legal.
    pub fn from_terse(s: &str, pos: &Position) -> Result<Move, TerseParseError> {
        if !s.is_ascii() || !matches!(s.len(), 4 | 5) {
            return Err(TerseParseError::BadLength);
        }
        if s == "0000" {
            return Err(TerseParseError::NotLegal);
        }
        let src: Coord = s[0..2].parse().map_err(TerseParseError::BadSrc)?;
        let dst: Coord = s[2..4].parse().map_err(TerseParseError::BadDst)?;
        let promote = match s[4..].chars().next() {
            Some(c) => Some(parse_promote(c)?),
            None => None,
        };
        pos.legal_moves()
            .iter()
            .copied()
            .find(|mv| {
                mv.src() == src
                    && mv.dst() == dst
                    && match mv.kind().promote() {
                        Some(p) => p == promote.unwrap_or(Piece::Queen),
                        None => promote.is_none(),
                    }
            })
            .ok_or(TerseParseError::NotLegal)
    }
}
