//! Compact 24-byte encoding of positions
//!
//! Empty squares take two bits and pieces take four, written from the top of each byte down
//! in a8..h1 order. The side to move, castling rights and en passant are folded into the
//! board itself using piece arrangements which cannot occur in a real game:
//!
//! - an allowed castling is marked by an enemy pawn on the rook's home square;
//! - an en passant capture is marked by swapping the pawn which has just made the double
//!   move with the square on its back rank, where it stays as a pawn;
//! - black to move is marked by giving the second king met in a8..h1 order the same color
//!   as the first one.
//!
//! Move counters are not preserved.

use crate::position::Position;
use crate::types::{CastlingSide, Cell, Color, Coord, Piece};
use kibitzer_base::geometry;

use log::warn;
use thiserror::Error;

pub const COMPRESSED_SIZE: usize = 24;

const EMPTY_CODE: u8 = 0b10;

/// Error compressing a position
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum CompressError {
    #[error("position does not fit into {} bytes", COMPRESSED_SIZE)]
    TooLarge,
    #[error("side to move cannot be encoded without two kings")]
    NoKings,
}

fn piece_code(cell: Cell) -> Option<u8> {
    let code = match (cell.color()?, cell.piece()?) {
        (Color::White, Piece::Rook) => 0,
        (Color::White, Piece::Knight) => 1,
        (Color::White, Piece::Bishop) => 2,
        (Color::White, Piece::Queen) => 3,
        (Color::White, Piece::King) => 4,
        (Color::White, Piece::Pawn) => 5,
        (Color::Black, Piece::Rook) => 6,
        (Color::Black, Piece::Knight) => 7,
        (Color::Black, Piece::Bishop) => 12,
        (Color::Black, Piece::Queen) => 13,
        (Color::Black, Piece::King) => 14,
        (Color::Black, Piece::Pawn) => 15,
    };
    Some(code)
}

fn code_piece(code: u8) -> Cell {
    let (color, piece) = match code {
        0 => (Color::White, Piece::Rook),
        1 => (Color::White, Piece::Knight),
        2 => (Color::White, Piece::Bishop),
        3 => (Color::White, Piece::Queen),
        4 => (Color::White, Piece::King),
        5 => (Color::White, Piece::Pawn),
        6 => (Color::Black, Piece::Rook),
        7 => (Color::Black, Piece::Knight),
        12 => (Color::Black, Piece::Bishop),
        13 => (Color::Black, Piece::Queen),
        14 => (Color::Black, Piece::King),
        15 => (Color::Black, Piece::Pawn),
        _ => return Cell::EMPTY,
    };
    Cell::from_parts(color, piece)
}

struct BitWriter {
    buf: [u8; COMPRESSED_SIZE],
    pos: usize,
}

impl BitWriter {
    fn write(&mut self, value: u8, bits: usize) -> Result<(), CompressError> {
        if self.pos + bits > COMPRESSED_SIZE * 8 {
            return Err(CompressError::TooLarge);
        }
        for i in (0..bits).rev() {
            if (value >> i) & 1 != 0 {
                self.buf[self.pos / 8] |= 0x80 >> (self.pos % 8);
            }
            self.pos += 1;
        }
        Ok(())
    }
}

struct BitReader<'a> {
    buf: &'a [u8; COMPRESSED_SIZE],
    pos: usize,
    overrun: bool,
}

impl<'a> BitReader<'a> {
    fn peek(&self, bits: usize) -> u8 {
        let mut res = 0;
        for i in 0..bits {
            let pos = self.pos + i;
            let bit = match self.buf.get(pos / 8) {
                Some(b) => (b >> (7 - pos % 8)) & 1,
                None => 0,
            };
            res = (res << 1) | bit;
        }
        res
    }

    fn read(&mut self, bits: usize) -> u8 {
        let res = self.peek(bits);
        self.pos += bits;
        if self.pos > COMPRESSED_SIZE * 8 {
            self.overrun = true;
        }
        res
    }
}

/// Position packed into 24 bytes
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CompressedPosition([u8; COMPRESSED_SIZE]);

impl CompressedPosition {
    /// Compresses the position and returns it together with a 16-bit hash of the record
    ///
    /// The castling rights and the en passant target are taken in their effective form, see
    /// [`Position::castling()`] and [`Position::enpassant()`].
    pub fn new(pos: &Position) -> Result<(CompressedPosition, u16), CompressError> {
        let mut cells = *pos.cells();
        let side = pos.side();

        for color in [Color::White, Color::Black] {
            for s in [CastlingSide::King, CastlingSide::Queen] {
                if pos.castling_allowed(color, s) {
                    cells[geometry::rook_home(color, s).index()] =
                        Cell::from_parts(color.inv(), Piece::Pawn);
                }
            }
        }

        if let Some(target) = pos.enpassant() {
            // The pawn which made the double move stands just behind the target
            let (passed, back) = match side {
                Color::White => (target.index() + 8, target.index() - 16),
                Color::Black => (target.index() - 8, target.index() + 16),
            };
            cells[passed] = cells[back];
            cells[back] = Cell::from_parts(side.inv(), Piece::Pawn);
        }

        let mut kings = 0;
        let mut w = BitWriter {
            buf: [0; COMPRESSED_SIZE],
            pos: 0,
        };
        for cell in cells {
            let mut code = match piece_code(cell) {
                Some(code) => code,
                None => {
                    w.write(EMPTY_CODE, 2)?;
                    continue;
                }
            };
            if cell.piece() == Some(Piece::King) {
                kings += 1;
                if kings == 2 && side == Color::Black {
                    code = if code == 14 { 4 } else { 14 };
                }
            }
            w.write(code, 4)?;
        }
        if kings < 2 {
            return Err(CompressError::NoKings);
        }

        let res = CompressedPosition(w.buf);
        Ok((res, res.hash()))
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; COMPRESSED_SIZE]) -> CompressedPosition {
        CompressedPosition(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; COMPRESSED_SIZE] {
        &self.0
    }

    /// 16-bit hash of the record
    pub fn hash(&self) -> u16 {
        let big = self
            .0
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .fold(0, |acc, x| acc ^ x);
        ((big & 0xffff) ^ (big >> 16)) as u16
    }

    /// Restores the position
    ///
    /// The move counters are set to 0 and 1 respectively.
    pub fn to_position(&self) -> Position {
        let mut r = BitReader {
            buf: &self.0,
            pos: 0,
            overrun: false,
        };
        let mut cells = [Cell::EMPTY; 64];
        let mut first_king = None;
        let mut kings = 0;
        let mut side = Color::White;
        for cell in &mut cells {
            if r.peek(2) == EMPTY_CODE {
                r.read(2);
                continue;
            }
            let mut piece = code_piece(r.read(4));
            if piece.piece() == Some(Piece::King) {
                kings += 1;
                match kings {
                    1 => first_king = Some(piece),
                    2 if Some(piece) == first_king => {
                        side = Color::Black;
                        piece = piece.inverted();
                    }
                    _ => {}
                }
            }
            *cell = piece;
        }
        if r.overrun {
            warn!("compressed position is longer than {} bytes", COMPRESSED_SIZE);
        }
        if kings < 2 {
            warn!("compressed position has less than two kings, assuming white to move");
        }

        let mut pos = Position::empty();
        pos.set_side(side);
        pos.set_counters(0, 1);

        let black_pawn = Cell::from_parts(Color::Black, Piece::Pawn);
        let white_pawn = Cell::from_parts(Color::White, Piece::Pawn);
        let marker = (0..8)
            .find(|&i| cells[i] == black_pawn)
            .map(|i| (i, i + 24, i + 16))
            .or_else(|| {
                (56..64)
                    .find(|&i| cells[i] == white_pawn)
                    .map(|i| (i, i - 24, i - 16))
            });
        if let Some((back, passed, target)) = marker {
            cells[back] = cells[passed];
            cells[passed] = if back < 8 { black_pawn } else { white_pawn };
            pos.set_raw_enpassant(Some(Coord::from_index(target)));
        }

        let mut castling = pos.raw_castling();
        for color in [Color::White, Color::Black] {
            if cells[geometry::king_home(color).index()] != Cell::from_parts(color, Piece::King) {
                continue;
            }
            for s in [CastlingSide::King, CastlingSide::Queen] {
                let home = geometry::rook_home(color, s).index();
                if cells[home] == Cell::from_parts(color.inv(), Piece::Pawn) {
                    cells[home] = Cell::from_parts(color, Piece::Rook);
                    castling.set(color, s);
                }
            }
        }
        pos.set_raw_castling(castling);

        for (c, cell) in Coord::iter().zip(cells) {
            pos.put(c, cell);
        }
        pos
    }
}

impl TryFrom<&Position> for CompressedPosition {
    type Error = CompressError;

    #[inline]
    fn try_from(pos: &Position) -> Result<Self, Self::Error> {
        Ok(CompressedPosition::new(pos)?.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(fen: &str) -> (CompressedPosition, u16) {
        let pos = Position::from_fen(fen).unwrap();
        let (comp, hash) = CompressedPosition::new(&pos).unwrap();
        assert_eq!(comp.hash(), hash);
        let back = comp.to_position();
        assert_eq!(back, pos, "{}", fen);
        assert_eq!(back.half_move_clock(), 0);
        assert_eq!(back.full_move_count(), 1);
        (comp, hash)
    }

    #[test]
    fn test_initial_bytes() {
        let (comp, _) = CompressedPosition::new(&Position::initial()).unwrap();
        assert_eq!(&comp.as_bytes()[..4], &[0x57, 0xcd, 0xec, 0x75]);
    }

    #[test]
    fn test_roundtrip() {
        for fen in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1",
            "r3k2r/8/8/8/8/8/8/R3K2R w Kq - 5 10",
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            "rnbqkbnr/pppp1ppp/8/8/3Pp3/8/PPP1PPPP/RNBQKBNR b KQkq d3 0 3",
            "4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1",
            "8/8/6k1/PK6/8/8/8/8 w - - 0 0",
            "8/8/6k1/PK6/8/8/8/8 b - - 0 0",
            "K7/8/8/8/8/8/8/7k b - - 0 1",
        ] {
            roundtrip(fen);
        }
    }

    #[test]
    fn test_enpassant_is_groomed() {
        let (with_ep, h1) =
            roundtrip("rnbqkbnr/ppppppp1/8/4P2p/8/8/PPPP1PPP/RNBQKBNR w KQkq h6 0 3");
        let (without, h2) =
            roundtrip("rnbqkbnr/ppppppp1/8/4P2p/8/8/PPPP1PPP/RNBQKBNR w KQkq - 0 3");
        assert_eq!(with_ep, without);
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_side_differs() {
        let (white, _) = roundtrip("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        let (black, _) = roundtrip("4k3/8/8/8/8/8/8/4K3 b - - 0 1");
        assert_ne!(white, black);
    }

    #[test]
    fn test_errors() {
        // 33 pieces do not fit into 24 bytes
        let pos =
            Position::from_fen("rnbqkbnr/pppppppp/8/8/4N3/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
                .unwrap();
        assert_eq!(CompressedPosition::new(&pos), Err(CompressError::TooLarge));
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/8 w - - 0 1").unwrap();
        assert_eq!(CompressedPosition::new(&pos), Err(CompressError::NoKings));
    }

    #[test]
    fn test_garbage_decodes() {
        let pos = CompressedPosition::from_bytes([0x44; COMPRESSED_SIZE]).to_position();
        assert_eq!(pos.full_move_count(), 1);
        assert_eq!(pos.side(), Color::Black);
    }
}
