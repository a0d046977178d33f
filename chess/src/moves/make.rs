use super::{Move, MoveKind};
use crate::position::{Detail, Position};
use crate::types::{CastlingRights, CastlingSide, Cell, Color, Coord, Piece};
use kibitzer_base::geometry;

/// Castling flags which survive a move touching the given square
const fn castling_mask(c: Coord) -> CastlingRights {
    let lost = match c.index() {
        0 => CastlingRights::EMPTY.with(Color::Black, CastlingSide::Queen),
        4 => CastlingRights::EMPTY
            .with(Color::Black, CastlingSide::Queen)
            .with(Color::Black, CastlingSide::King),
        7 => CastlingRights::EMPTY.with(Color::Black, CastlingSide::King),
        56 => CastlingRights::EMPTY.with(Color::White, CastlingSide::Queen),
        60 => CastlingRights::EMPTY
            .with(Color::White, CastlingSide::Queen)
            .with(Color::White, CastlingSide::King),
        63 => CastlingRights::EMPTY.with(Color::White, CastlingSide::King),
        _ => CastlingRights::EMPTY,
    };
    CastlingRights::from_index(lost.index() ^ 15)
}

impl Position {
    #[inline]
    fn take(&mut self, c: Coord) -> Cell {
        std::mem::take(&mut self.cells[c.index()])
    }

    #[inline]
    fn set(&mut self, c: Coord, cell: Cell) {
        self.cells[c.index()] = cell;
    }

    fn castle(&mut self, color: Color, side: CastlingSide) {
        let king = self.take(geometry::king_home(color));
        let rook = self.take(geometry::rook_home(color, side));
        let king_dst = geometry::castling_king_dst(color, side);
        self.set(king_dst, king);
        self.set(geometry::castling_rook_dst(color, side), rook);
        self.kings[color.index()] = Some(king_dst);
    }

    fn uncastle(&mut self, color: Color, side: CastlingSide) {
        let king = self.take(geometry::castling_king_dst(color, side));
        let rook = self.take(geometry::castling_rook_dst(color, side));
        self.set(geometry::king_home(color), king);
        self.set(geometry::rook_home(color, side), rook);
    }

    /// Applies the move `mv` and returns the detail snapshot needed to unmake it
    ///
    /// The move is assumed to be pseudo-legal in the current position, no checks are made. The
    /// move counters are not updated, see [`Rules::play_move()`](crate::Rules::play_move) for
    /// this.
    pub fn make_move(&mut self, mv: Move) -> Detail {
        let prev = self.detail();
        let (src, dst) = (mv.src(), mv.dst());
        let side = self.side;

        self.castling &= castling_mask(src);
        self.castling &= castling_mask(dst);
        self.ep_target = None;

        match mv.kind() {
            MoveKind::Normal => {
                let piece = self.take(src);
                self.set(dst, piece);
            }
            MoveKind::KingMove => {
                let piece = self.take(src);
                self.set(dst, piece);
                self.kings[side.index()] = Some(dst);
            }
            MoveKind::PromoteQueen
            | MoveKind::PromoteRook
            | MoveKind::PromoteBishop
            | MoveKind::PromoteKnight => {
                self.take(src);
                if let Some(p) = mv.kind().promote() {
                    self.set(dst, Cell::from_parts(side, p));
                }
            }
            MoveKind::WhitePawnDouble | MoveKind::BlackPawnDouble => {
                let piece = self.take(src);
                self.set(dst, piece);
                self.ep_target = Some(Coord::from_index((src.index() + dst.index()) / 2));
            }
            MoveKind::WhiteEnpassant | MoveKind::BlackEnpassant => {
                let piece = self.take(src);
                self.set(dst, piece);
                self.take(mv.enpassant_victim());
            }
            MoveKind::WhiteKingsideCastling
            | MoveKind::WhiteQueensideCastling
            | MoveKind::BlackKingsideCastling
            | MoveKind::BlackQueensideCastling => {
                if let Some((color, side)) = mv.kind().as_castling() {
                    self.castle(color, side);
                }
            }
        }

        self.side = side.inv();
        prev
    }

    /// Reverts the move `mv` previously applied by [`Position::make_move()`]
    ///
    /// `prev` must be the detail snapshot returned by the corresponding `make_move()` call.
    pub fn unmake_move(&mut self, mv: Move, prev: Detail) {
        let side = self.side.inv();
        let (src, dst) = (mv.src(), mv.dst());
        self.side = side;

        match mv.kind() {
            MoveKind::Normal
            | MoveKind::KingMove
            | MoveKind::WhitePawnDouble
            | MoveKind::BlackPawnDouble => {
                let piece = self.take(dst);
                self.set(src, piece);
                self.set(dst, mv.capture());
            }
            MoveKind::PromoteQueen
            | MoveKind::PromoteRook
            | MoveKind::PromoteBishop
            | MoveKind::PromoteKnight => {
                self.set(src, Cell::from_parts(side, Piece::Pawn));
                self.set(dst, mv.capture());
            }
            MoveKind::WhiteEnpassant | MoveKind::BlackEnpassant => {
                let piece = self.take(dst);
                self.set(src, piece);
                self.set(
                    mv.enpassant_victim(),
                    Cell::from_parts(side.inv(), Piece::Pawn),
                );
            }
            MoveKind::WhiteKingsideCastling
            | MoveKind::WhiteQueensideCastling
            | MoveKind::BlackKingsideCastling
            | MoveKind::BlackQueensideCastling => {
                if let Some((color, side)) = mv.kind().as_castling() {
                    self.uncastle(color, side);
                }
            }
        }

        self.restore_detail(prev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Coord {
        s.parse().unwrap()
    }

    fn check_roundtrip(fen: &str, mv: Move, expected: &str) {
        let mut pos = Position::from_fen(fen).unwrap();
        let orig = pos.clone();
        let detail = pos.make_move(mv);
        assert_eq!(pos.to_fen(), expected);
        pos.unmake_move(mv, detail);
        assert!(pos.strict_eq(&orig));
        assert_eq!(pos.detail(), orig.detail());
    }

    #[test]
    fn test_castling_mask() {
        assert_eq!(castling_mask(sq("d4")), CastlingRights::FULL);
        assert_eq!(castling_mask(Coord::E1), "kq".parse().unwrap());
        assert_eq!(castling_mask(Coord::A8), "KQk".parse().unwrap());
        assert_eq!(castling_mask(Coord::H1), "Qkq".parse().unwrap());
    }

    #[test]
    fn test_simple() {
        check_roundtrip(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            Move::new(MoveKind::WhitePawnDouble, sq("e2"), sq("e4"), Cell::EMPTY),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
        );
        check_roundtrip(
            "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2",
            Move::new(
                MoveKind::Normal,
                sq("e4"),
                sq("d5"),
                Cell::from_parts(Color::Black, Piece::Pawn),
            ),
            "rnbqkbnr/ppp1pppp/8/3P4/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 2",
        );
    }

    #[test]
    fn test_double_sets_target() {
        let mut pos =
            Position::from_fen("rnbqkbnr/pppp1ppp/8/8/4p3/8/PPPPPPPP/RNBQKBNR w KQkq - 0 3")
                .unwrap();
        pos.make_move(Move::new(
            MoveKind::WhitePawnDouble,
            sq("d2"),
            sq("d4"),
            Cell::EMPTY,
        ));
        assert_eq!(pos.raw_enpassant(), Some(sq("d3")));
        assert_eq!(pos.enpassant(), Some(sq("d3")));
        pos.make_move(Move::new(
            MoveKind::Normal,
            sq("g8"),
            sq("f6"),
            Cell::EMPTY,
        ));
        assert_eq!(pos.raw_enpassant(), None);
    }

    #[test]
    fn test_enpassant() {
        check_roundtrip(
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            Move::new(
                MoveKind::WhiteEnpassant,
                sq("e5"),
                sq("f6"),
                Cell::from_parts(Color::Black, Piece::Pawn),
            ),
            "rnbqkbnr/ppp1p1pp/5P2/3p4/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 3",
        );
        check_roundtrip(
            "4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1",
            Move::new(
                MoveKind::BlackEnpassant,
                sq("d4"),
                sq("e3"),
                Cell::from_parts(Color::White, Piece::Pawn),
            ),
            "4k3/8/8/8/8/4p3/8/4K3 w - - 0 1",
        );
    }

    #[test]
    fn test_castling() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        check_roundtrip(
            fen,
            Move::from_castling(Color::White, CastlingSide::King),
            "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 0 1",
        );
        check_roundtrip(
            fen,
            Move::from_castling(Color::White, CastlingSide::Queen),
            "r3k2r/8/8/8/8/8/8/2KR3R b kq - 0 1",
        );
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1";
        check_roundtrip(
            fen,
            Move::from_castling(Color::Black, CastlingSide::Queen),
            "2kr3r/8/8/8/8/8/8/R3K2R w KQ - 0 1",
        );

        let mut pos = Position::from_fen(fen).unwrap();
        pos.make_move(Move::from_castling(Color::Black, CastlingSide::King));
        assert_eq!(pos.king_pos(Color::Black), Some(sq("g8")));
        assert_eq!(pos.raw_castling(), "KQ".parse().unwrap());
    }

    #[test]
    fn test_rook_capture_clears_castling() {
        check_roundtrip(
            "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1",
            Move::new(
                MoveKind::Normal,
                Coord::H1,
                Coord::H8,
                Cell::from_parts(Color::Black, Piece::Rook),
            ),
            "r3k2R/8/8/8/8/8/8/R3K3 b Qq - 0 1",
        );
    }

    #[test]
    fn test_king_move() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let mv = Move::new(MoveKind::KingMove, Coord::E1, sq("e2"), Cell::EMPTY);
        let detail = pos.make_move(mv);
        assert_eq!(pos.king_pos(Color::White), Some(sq("e2")));
        assert_eq!(pos.raw_castling(), "kq".parse().unwrap());
        pos.unmake_move(mv, detail);
        assert_eq!(pos.king_pos(Color::White), Some(Coord::E1));
        assert_eq!(pos.raw_castling(), CastlingRights::FULL);
    }

    #[test]
    fn test_promote() {
        check_roundtrip(
            "1r2k3/P7/8/8/8/8/8/4K3 w - - 0 1",
            Move::new(
                MoveKind::PromoteKnight,
                sq("a7"),
                sq("b8"),
                Cell::from_parts(Color::Black, Piece::Rook),
            ),
            "1N2k3/8/8/8/8/8/8/4K3 b - - 0 1",
        );
        check_roundtrip(
            "4k3/8/8/8/8/8/p7/4K3 b - - 0 1",
            Move::new(MoveKind::PromoteQueen, sq("a2"), sq("a1"), Cell::EMPTY),
            "4k3/8/8/8/8/8/8/q3K3 w - - 0 1",
        );
    }
}
