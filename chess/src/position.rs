//! Chess position: board, side to move, castling, en passant and move counters.

use crate::types::{CastlingRights, CastlingSide, Cell, Color, Coord, File, Piece, Rank};
use kibitzer_base::geometry;

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use thiserror::Error;

/// Error parsing [`Position`] from FEN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum FenParseError {
    #[error("unexpected char {0:?} in board")]
    UnexpectedBoardChar(char),
    #[error("board ends before square h1")]
    BoardTooShort,
    #[error("board runs past square h1")]
    BoardTooLong,
    #[error("bad move side")]
    BadMoveSide,
    #[error("bad castling rights")]
    BadCastling,
    #[error("bad enpassant square")]
    BadEnpassant,
    #[error("bad half-move clock")]
    BadHalfMoveClock,
    #[error("negative full-move count")]
    NegativeMoveCount,
}

/// Packed snapshot of the state that is not recoverable from a move alone
///
/// The snapshot contains the raw en passant target, both king squares and the raw castling
/// flags. It is returned by [`Position::make_move()`](crate::Position::make_move) and passed back
/// to [`Position::unmake_move()`](crate::Position::unmake_move) to restore the position exactly.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Detail(u32);

impl Detail {
    const NONE: u32 = 0x40;

    fn pack(c: Option<Coord>) -> u32 {
        c.map_or(Self::NONE, |c| c.index() as u32)
    }

    fn unpack(v: u32) -> Option<Coord> {
        if v >= 64 {
            None
        } else {
            Some(Coord::from_index(v as usize))
        }
    }

    pub fn new(
        enpassant: Option<Coord>,
        kings: [Option<Coord>; 2],
        castling: CastlingRights,
    ) -> Detail {
        Detail(
            Self::pack(enpassant)
                | (Self::pack(kings[0]) << 8)
                | (Self::pack(kings[1]) << 16)
                | ((castling.index() as u32) << 24),
        )
    }

    pub fn enpassant(&self) -> Option<Coord> {
        Self::unpack(self.0 & 0x7f)
    }

    pub fn king(&self, c: Color) -> Option<Coord> {
        Self::unpack((self.0 >> (8 + 8 * c.index())) & 0x7f)
    }

    pub fn castling(&self) -> CastlingRights {
        CastlingRights::from_index(((self.0 >> 24) & 15) as usize)
    }

    pub fn as_raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("Detail")
            .field("enpassant", &self.enpassant())
            .field("white_king", &self.king(Color::White))
            .field("black_king", &self.king(Color::Black))
            .field("castling", &self.castling())
            .finish()
    }
}

/// Chess position
///
/// The position keeps the raw castling flags and the raw en passant target exactly as they were
/// set by FEN or by moves. Whether castling or en passant is actually possible is answered by
/// [`Position::castling_allowed()`] and [`Position::enpassant()`], and all the comparisons,
/// hashing and compression use these effective values.
///
/// # Example
///
/// ```
/// # use kibitzer::Position;
/// #
/// let pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
/// // Black has no rooks, so black castling is not available despite the flags
/// assert_eq!(pos.to_fen(), "4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
/// ```
#[derive(Debug, Clone)]
pub struct Position {
    pub(crate) cells: [Cell; 64],
    pub(crate) side: Color,
    pub(crate) castling: CastlingRights,
    pub(crate) ep_target: Option<Coord>,
    pub(crate) kings: [Option<Coord>; 2],
    pub(crate) half_move_clock: u16,
    pub(crate) full_move_count: u16,
}

impl Position {
    /// Returns an empty board, white to move
    pub const fn empty() -> Position {
        Position {
            cells: [Cell::EMPTY; 64],
            side: Color::White,
            castling: CastlingRights::EMPTY,
            ep_target: None,
            kings: [None, None],
            half_move_clock: 0,
            full_move_count: 1,
        }
    }

    /// Returns the standard initial position
    pub fn initial() -> Position {
        let mut res = Position::empty();
        for (color, back, pawns) in [
            (Color::White, Rank::R1, Rank::R2),
            (Color::Black, Rank::R8, Rank::R7),
        ] {
            for (file, piece) in File::iter().zip([
                Piece::Rook,
                Piece::Knight,
                Piece::Bishop,
                Piece::Queen,
                Piece::King,
                Piece::Bishop,
                Piece::Knight,
                Piece::Rook,
            ]) {
                res.put(Coord::from_parts(file, back), Cell::from_parts(color, piece));
                res.put(
                    Coord::from_parts(file, pawns),
                    Cell::from_parts(color, Piece::Pawn),
                );
            }
        }
        res.castling = CastlingRights::FULL;
        res
    }

    /// Parses the position from extended FEN
    ///
    /// Besides `/`, the board accepts `|` and `\` as rank separators. Repeated separators skip
    /// whole ranks, and `x` stands for a single empty square. The board must describe exactly
    /// 64 squares.
    pub fn from_fen(s: &str) -> Result<Position, FenParseError> {
        FenParser::new(s).parse()
    }

    /// Replaces the position with the one parsed from `s`
    ///
    /// On error, the position is left untouched.
    pub fn set_fen(&mut self, s: &str) -> Result<(), FenParseError> {
        *self = Position::from_fen(s)?;
        Ok(())
    }

    /// Converts the position into a canonical FEN string
    #[inline]
    pub fn to_fen(&self) -> String {
        self.to_string()
    }

    #[inline]
    pub fn get(&self, c: Coord) -> Cell {
        self.cells[c.index()]
    }

    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Cell {
        self.get(Coord::from_parts(file, rank))
    }

    /// Puts `cell` on square `c`, keeping track of the king squares
    pub fn put(&mut self, c: Coord, cell: Cell) {
        let old = self.cells[c.index()];
        if old.piece() == Some(Piece::King) {
            if let Some(color) = old.color() {
                if self.kings[color.index()] == Some(c) {
                    self.kings[color.index()] = None;
                }
            }
        }
        if cell.piece() == Some(Piece::King) {
            if let Some(color) = cell.color() {
                self.kings[color.index()] = Some(c);
            }
        }
        self.cells[c.index()] = cell;
    }

    #[inline]
    pub fn cells(&self) -> &[Cell; 64] {
        &self.cells
    }

    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    pub fn set_side(&mut self, side: Color) {
        self.side = side;
    }

    /// Square of the king of color `c`
    ///
    /// If there are several such kings, the last placed one is returned.
    #[inline]
    pub fn king_pos(&self, c: Color) -> Option<Coord> {
        self.kings[c.index()]
    }

    /// Raw castling flags, as given in FEN and cleared by moves
    #[inline]
    pub fn raw_castling(&self) -> CastlingRights {
        self.castling
    }

    pub fn set_raw_castling(&mut self, castling: CastlingRights) {
        self.castling = castling;
    }

    /// Returns `true` if the castling flag is set and both the king and the rook stand on their
    /// initial squares
    pub fn castling_allowed(&self, c: Color, s: CastlingSide) -> bool {
        self.castling.has(c, s)
            && self.get(geometry::king_home(c)).is(c, Piece::King)
            && self.get(geometry::rook_home(c, s)).is(c, Piece::Rook)
    }

    /// Effective castling rights
    pub fn castling(&self) -> CastlingRights {
        let mut res = CastlingRights::EMPTY;
        for c in [Color::White, Color::Black] {
            for s in [CastlingSide::King, CastlingSide::Queen] {
                if self.castling_allowed(c, s) {
                    res.set(c, s);
                }
            }
        }
        res
    }

    /// Raw en passant target, i.e. the square skipped by the last double pawn move
    #[inline]
    pub fn raw_enpassant(&self) -> Option<Coord> {
        self.ep_target
    }

    pub fn set_raw_enpassant(&mut self, target: Option<Coord>) {
        self.ep_target = target;
    }

    /// Effective en passant target
    ///
    /// Returns the raw target only if it lies on the proper rank and some pawn of the side to
    /// move stands next to the pawn which has just made the double move.
    pub fn enpassant(&self) -> Option<Coord> {
        let target = self.ep_target?;
        if target.rank() != geometry::enpassant_dst_rank(self.side) {
            return None;
        }
        let pawn = Cell::from_parts(self.side, Piece::Pawn);
        let file = target.file().index();
        let src_rank = geometry::enpassant_src_rank(self.side);
        let left = file > 0 && self.get2(File::from_index(file - 1), src_rank) == pawn;
        let right = file < 7 && self.get2(File::from_index(file + 1), src_rank) == pawn;
        if left || right {
            Some(target)
        } else {
            None
        }
    }

    #[inline]
    pub fn half_move_clock(&self) -> u16 {
        self.half_move_clock
    }

    #[inline]
    pub fn full_move_count(&self) -> u16 {
        self.full_move_count
    }

    pub fn set_counters(&mut self, half_move_clock: u16, full_move_count: u16) {
        self.half_move_clock = half_move_clock;
        self.full_move_count = full_move_count;
    }

    /// Current detail snapshot
    pub fn detail(&self) -> Detail {
        Detail::new(self.ep_target, self.kings, self.castling)
    }

    pub(crate) fn restore_detail(&mut self, d: Detail) {
        self.ep_target = d.enpassant();
        self.kings = [d.king(Color::White), d.king(Color::Black)];
        self.castling = d.castling();
    }

    /// Compares the positions together with the move counters
    pub fn strict_eq(&self, other: &Position) -> bool {
        self == other
            && self.half_move_clock == other.half_move_clock
            && self.full_move_count == other.full_move_count
    }

    /// Returns the same position with colors exchanged
    ///
    /// The board is mirrored vertically, all the pieces change their color, and the other side
    /// is to move. Move counters are kept.
    pub fn mirrored(&self) -> Position {
        let mut res = Position::empty();
        for c in Coord::iter() {
            res.put(c.flipped_rank(), self.get(c).inverted());
        }
        res.side = self.side.inv();
        res.castling = self.castling.swapped();
        res.ep_target = self.ep_target.map(Coord::flipped_rank);
        res.half_move_clock = self.half_move_clock;
        res.full_move_count = self.full_move_count;
        res
    }

    /// Wraps the position to print the board as eight lines of text
    ///
    /// ```
    /// # use kibitzer::Position;
    /// #
    /// let res = r#"
    /// White to move
    /// rnbqkbnr
    /// pppppppp
    /// ........
    /// ........
    /// ........
    /// ........
    /// PPPPPPPP
    /// RNBQKBNR
    /// "#;
    /// assert_eq!(Position::initial().pretty().to_string().trim(), res.trim());
    /// ```
    #[inline]
    pub fn pretty(&self) -> Pretty<'_> {
        Pretty(self)
    }

    fn ordering_key(&self) -> (Color, Option<Coord>, [bool; 4]) {
        (
            self.side,
            self.enpassant(),
            [
                !self.castling_allowed(Color::White, CastlingSide::King),
                !self.castling_allowed(Color::White, CastlingSide::Queen),
                !self.castling_allowed(Color::Black, CastlingSide::King),
                !self.castling_allowed(Color::Black, CastlingSide::Queen),
            ],
        )
    }
}

impl Default for Position {
    #[inline]
    fn default() -> Position {
        Position::initial()
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Position) -> bool {
        self.side == other.side
            && self.cells == other.cells
            && self.enpassant() == other.enpassant()
            && self.castling() == other.castling()
    }
}

impl Eq for Position {}

impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.side.hash(state);
        self.cells.hash(state);
        self.enpassant().hash(state);
        self.castling().hash(state);
    }
}

impl Ord for Position {
    /// Orders by side to move (white first), then board contents, then en passant target
    /// (absent first), then castling rights (present first).
    fn cmp(&self, other: &Position) -> Ordering {
        let (side, ep, castling) = self.ordering_key();
        let (o_side, o_ep, o_castling) = other.ordering_key();
        side.cmp(&o_side)
            .then_with(|| self.cells.cmp(&other.cells))
            .then_with(|| ep.cmp(&o_ep))
            .then_with(|| castling.cmp(&o_castling))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Position) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct FenParser<'a> {
    s: &'a [u8],
    pos: usize,
}

impl<'a> FenParser<'a> {
    fn new(s: &'a str) -> Self {
        FenParser {
            s: s.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.s.get(self.pos).copied()
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
    }

    fn is_separator(b: u8) -> bool {
        matches!(b, b'/' | b'|' | b'\\')
    }

    fn parse_board(&mut self, res: &mut Position) -> Result<(), FenParseError> {
        type Error = FenParseError;

        let mut sq = 0_usize;
        let mut prev_separator = false;
        while sq < 64 {
            let b = self.peek().ok_or(Error::BoardTooShort)?;
            self.pos += 1;
            let separator = Self::is_separator(b);
            match b {
                b' ' | b'\t' => return Err(Error::BoardTooShort),
                b'x' => sq += 1,
                b'1'..=b'8' => sq += (b - b'0') as usize,
                b'/' | b'|' | b'\\' => {
                    let file = sq % 8;
                    if file != 0 {
                        sq += 8 - file;
                    } else if prev_separator {
                        sq += 8;
                    }
                }
                _ => {
                    let cell = match Cell::from_char(b as char) {
                        Some(cell) if cell.is_occupied() => cell,
                        _ => return Err(Error::UnexpectedBoardChar(b as char)),
                    };
                    res.put(Coord::from_index(sq), cell);
                    sq += 1;
                }
            }
            prev_separator = separator;
        }
        if sq > 64 {
            return Err(Error::BoardTooLong);
        }
        if matches!(self.peek(), Some(b) if Self::is_separator(b)) {
            self.pos += 1;
        }
        Ok(())
    }

    fn parse_side(&mut self) -> Result<Color, FenParseError> {
        self.skip_spaces();
        let side = self
            .peek()
            .and_then(|b| Color::from_char(b as char))
            .ok_or(FenParseError::BadMoveSide)?;
        self.pos += 1;
        Ok(side)
    }

    fn parse_castling(&mut self) -> Result<CastlingRights, FenParseError> {
        self.skip_spaces();
        if self.peek() == Some(b'-') {
            self.pos += 1;
            return Ok(CastlingRights::EMPTY);
        }
        let start = self.pos;
        while self.pos - start < 4 {
            match self.peek() {
                Some(b'K' | b'Q' | b'k' | b'q' | b'-') => self.pos += 1,
                Some(b' ' | b'\t') => break,
                _ => return Err(FenParseError::BadCastling),
            }
        }
        let field = std::str::from_utf8(&self.s[start..self.pos])
            .map_err(|_| FenParseError::BadCastling)?;
        CastlingRights::from_str(field).map_err(|_| FenParseError::BadCastling)
    }

    fn parse_enpassant(&mut self) -> Result<Option<Coord>, FenParseError> {
        self.skip_spaces();
        if self.peek() == Some(b'-') {
            self.pos += 1;
            return Ok(None);
        }
        let file = self
            .peek()
            .and_then(|b| File::from_char(b as char))
            .ok_or(FenParseError::BadEnpassant)?;
        self.pos += 1;
        let rank = self
            .peek()
            .and_then(|b| Rank::from_char(b as char))
            .ok_or(FenParseError::BadEnpassant)?;
        self.pos += 1;
        Ok(Some(Coord::from_parts(file, rank)))
    }

    fn parse_digits(&mut self) -> Option<u16> {
        let start = self.pos;
        let mut val: u16 = 0;
        while let Some(b @ b'0'..=b'9') = self.peek() {
            val = val.saturating_mul(10).saturating_add((b - b'0') as u16);
            self.pos += 1;
        }
        (self.pos != start).then_some(val)
    }

    fn parse(mut self) -> Result<Position, FenParseError> {
        let mut res = Position::empty();
        self.skip_spaces();
        self.parse_board(&mut res)?;
        res.side = self.parse_side()?;
        res.castling = self.parse_castling()?;
        res.ep_target = self.parse_enpassant()?;

        self.skip_spaces();
        res.half_move_clock = self
            .parse_digits()
            .ok_or(FenParseError::BadHalfMoveClock)?;

        // A missing or non-numeric full-move count reads as zero
        self.skip_spaces();
        if self.peek() == Some(b'-') {
            self.pos += 1;
            if self.parse_digits().unwrap_or(0) != 0 {
                return Err(FenParseError::NegativeMoveCount);
            }
            res.full_move_count = 0;
        } else {
            res.full_move_count = self.parse_digits().unwrap_or(0);
        }
        Ok(res)
    }
}

impl FromStr for Position {
    type Err = FenParseError;

    fn from_str(s: &str) -> Result<Position, Self::Err> {
        Position::from_fen(s)
    }
}

fn format_cells(cells: &[Cell; 64], f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
    for rank in Rank::iter() {
        if rank.index() != 0 {
            write!(f, "/")?;
        }
        let mut empty = 0;
        for file in File::iter() {
            let cell = cells[Coord::from_parts(file, rank).index()];
            if cell.is_empty() {
                empty += 1;
                continue;
            }
            if empty != 0 {
                write!(f, "{}", (b'0' + empty) as char)?;
                empty = 0;
            }
            write!(f, "{}", cell)?;
        }
        if empty != 0 {
            write!(f, "{}", (b'0' + empty) as char)?;
        }
    }
    Ok(())
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        format_cells(&self.cells, f)?;
        write!(f, " {} {}", self.side, self.castling())?;
        match self.ep_target {
            Some(p) if p.rank() != Rank::R1 => write!(f, " {}", p)?,
            _ => write!(f, " -")?,
        };
        write!(f, " {} {}", self.half_move_clock, self.full_move_count)?;
        Ok(())
    }
}

/// Wrapper to print the board as a diagram
///
/// See docs for [`Position::pretty()`] for more details.
pub struct Pretty<'a>(&'a Position);

impl<'a> Display for Pretty<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.0.side {
            Color::White => writeln!(f, "White to move")?,
            Color::Black => writeln!(f, "Black to move")?,
        }
        for rank in Rank::iter() {
            for file in File::iter() {
                write!(f, "{}", self.0.get2(file, rank))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_initial() {
        let pos = Position::initial();
        assert_eq!(pos.to_fen(), INITIAL_FEN);
        assert_eq!(Position::from_fen(INITIAL_FEN).unwrap(), pos);
        assert!(Position::from_fen(INITIAL_FEN).unwrap().strict_eq(&pos));
        assert_eq!(pos.king_pos(Color::White), Some(Coord::E1));
        assert_eq!(pos.king_pos(Color::Black), Some(Coord::E8));
        assert_eq!(pos.castling(), CastlingRights::FULL);
    }

    #[test]
    fn test_fen_roundtrip() {
        for fen in [
            INITIAL_FEN,
            "r1bqk2r/ppp2ppp/2np1n2/2b1p3/2B1P3/2PP1N2/PP3PPP/RNBQK2R b KQkq - 0 6",
            "4k3/8/8/8/8/8/8/4K3 w - - 99 120",
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            "8/8/6k1/PK6/8/8/8/8 w - - 0 0",
        ] {
            let pos = Position::from_fen(fen).unwrap();
            assert_eq!(pos.to_fen(), fen);
        }
    }

    #[test]
    fn test_fen_separators() {
        let canonical = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        for fen in [
            "4k3|8|8|8|8|8|8|4K3 w - - 0 1",
            "4k3\\8\\8/8/8/8/8/4K3 w - - 0 1",
            "4k3///////4K3 w - - 0 1",
            "4k/8/8/8/8/8/8/4K/ w - - 0 1",
            "xxxxkxxx/8/8/8/8/8/8/xxxxKxxx w - - 0 1",
            "  4k3/8/8/8/8/8/8/4K3/ W - - 0 1",
        ] {
            let pos = Position::from_fen(fen).unwrap();
            assert!(pos.strict_eq(&canonical), "{}", fen);
        }
    }

    #[test]
    fn test_fen_errors() {
        use FenParseError::*;
        for (fen, err) in [
            ("4k3/8/8/8/8/8/8/4K2 w - - 0 1", BoardTooShort),
            ("4k3/8/8/8/8/8/8/4K3", BadMoveSide),
            ("4k3/8/8/8/8/8/8", BoardTooShort),
            ("4k3/8/8/8/8/8/8/4K39 w - - 0 1", BadMoveSide),
            ("4k3/8/8/8/8/8/8/4K2z w - - 0 1", UnexpectedBoardChar('z')),
            ("4k3/8/8/8/8/8/8/4K5 w - - 0 1", BoardTooLong),
            ("4k3/8/8/8/8/8/8/4K3 x - - 0 1", BadMoveSide),
            ("4k3/8/8/8/8/8/8/4K3 w KX - 0 1", BadCastling),
            ("4k3/8/8/8/8/8/8/4K3 w - e9 0 1", BadEnpassant),
            ("4k3/8/8/8/8/8/8/4K3 w - i3 0 1", BadEnpassant),
            ("4k3/8/8/8/8/8/8/4K3 w - - -3 1", BadHalfMoveClock),
            ("4k3/8/8/8/8/8/8/4K3 w - -", BadHalfMoveClock),
            ("4k3/8/8/8/8/8/8/4K3 w - - 0 -7", NegativeMoveCount),
        ] {
            assert_eq!(Position::from_fen(fen), Err(err), "{}", fen);
        }
    }

    #[test]
    fn test_fen_failure_keeps_position() {
        let mut pos = Position::initial();
        assert!(pos.set_fen("4k3/8/8/8/8/8/8/4K3 w - e9 0 1").is_err());
        assert!(pos.strict_eq(&Position::initial()));
        pos.set_fen("4k3/8/8/8/8/8/8/4K3 b - - 3").unwrap();
        assert_eq!(pos.to_fen(), "4k3/8/8/8/8/8/8/4K3 b - - 3 0");
    }

    #[test]
    fn test_effective_castling() {
        let pos = Position::from_fen("r3k3/8/8/8/8/8/8/4K2R w KQkq - 0 1").unwrap();
        assert!(pos.castling_allowed(Color::White, CastlingSide::King));
        assert!(!pos.castling_allowed(Color::White, CastlingSide::Queen));
        assert!(!pos.castling_allowed(Color::Black, CastlingSide::King));
        assert!(pos.castling_allowed(Color::Black, CastlingSide::Queen));
        assert_eq!(pos.raw_castling(), CastlingRights::FULL);
        assert_eq!(pos.to_fen(), "r3k3/8/8/8/8/8/8/4K2R w Kq - 0 1");

        let other = Position::from_fen("r3k3/8/8/8/8/8/8/4K2R w Kq - 0 1").unwrap();
        assert_eq!(pos, other);
        assert_eq!(pos.cmp(&other), Ordering::Equal);
    }

    #[test]
    fn test_effective_enpassant() {
        let pos =
            Position::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .unwrap();
        assert_eq!(pos.enpassant(), Some("f6".parse().unwrap()));

        // No white pawn next to the pawn on h5
        let pos =
            Position::from_fen("rnbqkbnr/ppppppp1/8/4P2p/8/8/PPPP1PPP/RNBQKBNR w KQkq h6 0 3")
                .unwrap();
        assert_eq!(pos.raw_enpassant(), Some("h6".parse().unwrap()));
        assert_eq!(pos.enpassant(), None);
        let plain =
            Position::from_fen("rnbqkbnr/ppppppp1/8/4P2p/8/8/PPPP1PPP/RNBQKBNR w KQkq - 0 3")
                .unwrap();
        assert_eq!(pos, plain);

        // Wrong rank for the side to move
        let pos = Position::from_fen("4k3/8/8/8/3pP3/8/8/4K3 w - e3 0 1").unwrap();
        assert_eq!(pos.enpassant(), None);
        let pos = Position::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1").unwrap();
        assert_eq!(pos.enpassant(), Some("e3".parse().unwrap()));
    }

    #[test]
    fn test_ordering() {
        let white = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let black = Position::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert!(white < black);
        assert!(!(black < white));
        assert_ne!(white, black);

        let castle = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let no_castle = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w - - 0 1").unwrap();
        assert!(castle < no_castle);
        assert_ne!(castle, no_castle);

        let counters = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w - - 17 40").unwrap();
        assert_eq!(counters, no_castle);
        assert!(!counters.strict_eq(&no_castle));
        assert_eq!(counters.cmp(&no_castle), Ordering::Equal);
    }

    #[test]
    fn test_detail() {
        let pos =
            Position::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w Kq f6 0 3")
                .unwrap();
        let d = pos.detail();
        assert_eq!(d.enpassant(), Some("f6".parse().unwrap()));
        assert_eq!(d.king(Color::White), Some(Coord::E1));
        assert_eq!(d.king(Color::Black), Some(Coord::E8));
        assert_eq!(d.castling(), "Kq".parse().unwrap());

        let empty = Position::empty().detail();
        assert_eq!(empty.enpassant(), None);
        assert_eq!(empty.king(Color::White), None);
    }

    #[test]
    fn test_mirrored() {
        let pos =
            Position::from_fen("r3k2r/pppq1ppp/2n5/3pP3/8/8/PPP2PPP/R3K1NR w KQq d6 0 9").unwrap();
        let mirrored = pos.mirrored();
        assert_eq!(
            mirrored.to_fen(),
            "r3k1nr/ppp2ppp/8/8/3Pp3/2N5/PPPQ1PPP/R3K2R b Qkq d3 0 9"
        );
        assert!(mirrored.mirrored().strict_eq(&pos));
        assert_eq!(mirrored.enpassant(), Some("d3".parse().unwrap()));
    }
}
