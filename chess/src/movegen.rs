//! Pseudo-legal move generation
//!
//! The generated moves obey all the rules of chess, except that the king may be left under
//! attack. Castling is the exception: it is generated only if the king does not pass through
//! or stand on an attacked square.

use crate::attack;
use crate::moves::{Move, MoveKind};
use crate::position::Position;
use crate::tables;
use crate::types::{CastlingSide, Cell, Color, Coord, File, Piece};
use kibitzer_base::geometry;

use std::ops::{Deref, DerefMut};
use std::slice;

use arrayvec::ArrayVec;

/// Maximum number of moves in a [`MoveList`]
pub const MAX_MOVES: usize = 256;

/// List of moves with fixed capacity
///
/// Moves which do not fit into the list are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveList(ArrayVec<Move, MAX_MOVES>);

impl Deref for MoveList {
    type Target = ArrayVec<Move, MAX_MOVES>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = arrayvec::IntoIter<Move, MAX_MOVES>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a mut MoveList {
    type Item = &'a mut Move;
    type IntoIter = slice::IterMut<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter_mut()
    }
}

impl FromIterator<Move> for MoveList {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        let mut res = MoveList::new();
        for mv in iter {
            MovePush::push(&mut res, mv);
        }
        res
    }
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList(ArrayVec::new())
    }
}

/// Sink for the generated moves
pub trait MovePush {
    fn push(&mut self, m: Move);
}

impl MovePush for MoveList {
    #[inline]
    fn push(&mut self, m: Move) {
        let _ = self.0.try_push(m);
    }
}

impl MovePush for Vec<Move> {
    #[inline]
    fn push(&mut self, m: Move) {
        Vec::push(self, m);
    }
}

struct MoveGen<'a, P> {
    pos: &'a Position,
    side: Color,
    dst: &'a mut P,
}

impl<'a, P: MovePush> MoveGen<'a, P> {
    #[inline]
    fn add(&mut self, kind: MoveKind, src: Coord, dst: Coord, capture: Cell) {
        self.dst.push(Move::new(kind, src, dst, capture));
    }

    fn add_promotes(&mut self, src: Coord, dst: Coord, capture: Cell) {
        for kind in MoveKind::PROMOTES {
            self.add(kind, src, dst, capture);
        }
    }

    fn gen_long(&mut self, src: Coord, rays: &[&[Coord]]) {
        for ray in rays {
            for &dst in ray.iter() {
                let cell = self.pos.get(dst);
                if cell.is_empty() {
                    self.add(MoveKind::Normal, src, dst, Cell::EMPTY);
                    continue;
                }
                if !cell.has_color(self.side) {
                    self.add(MoveKind::Normal, src, dst, cell);
                }
                break;
            }
        }
    }

    fn gen_short(&mut self, src: Coord, steps: &[Coord], kind: MoveKind) {
        for &dst in steps {
            let cell = self.pos.get(dst);
            if !cell.has_color(self.side) {
                self.add(kind, src, dst, cell);
            }
        }
    }

    fn gen_pawn(&mut self, src: Coord) {
        let side = self.side;
        let promote = src.rank() == geometry::promote_src_rank(side);
        let enpassant = self.pos.enpassant();

        for &dst in tables::pawn_captures(side, src) {
            if Some(dst) == enpassant {
                self.add(
                    MoveKind::enpassant(side),
                    src,
                    dst,
                    Cell::from_parts(side.inv(), Piece::Pawn),
                );
                continue;
            }
            let cell = self.pos.get(dst);
            if !cell.has_color(side.inv()) {
                continue;
            }
            if promote {
                self.add_promotes(src, dst, cell);
            } else {
                self.add(MoveKind::Normal, src, dst, cell);
            }
        }

        for (i, &dst) in tables::pawn_advances(side, src).iter().enumerate() {
            if self.pos.get(dst).is_occupied() {
                break;
            }
            if promote {
                self.add_promotes(src, dst, Cell::EMPTY);
            } else if i == 0 {
                self.add(MoveKind::Normal, src, dst, Cell::EMPTY);
            } else {
                self.add(MoveKind::pawn_double(side), src, dst, Cell::EMPTY);
            }
        }
    }

    fn can_castle(&self, s: CastlingSide) -> bool {
        let side = self.side;
        if !self.pos.castling_allowed(side, s) {
            return false;
        }
        let rank = geometry::castling_rank(side);
        let (between, passed): (&[usize], [usize; 3]) = match s {
            CastlingSide::King => (&[5, 6], [4, 5, 6]),
            CastlingSide::Queen => (&[1, 2, 3], [4, 3, 2]),
        };
        let base = Coord::from_parts(File::A, rank).index();
        between
            .iter()
            .all(|&f| self.pos.get(Coord::from_index(base + f)).is_empty())
            && passed.iter().all(|&f| {
                !attack::is_square_attacked(self.pos, Coord::from_index(base + f), side.inv())
            })
    }

    fn gen_king(&mut self, src: Coord) {
        self.gen_short(src, tables::king_steps(src), MoveKind::KingMove);
        if src != geometry::king_home(self.side) {
            return;
        }
        for s in [CastlingSide::King, CastlingSide::Queen] {
            if self.can_castle(s) {
                self.dst.push(Move::from_castling(self.side, s));
            }
        }
    }

    fn run(&mut self) {
        for src in Coord::iter() {
            let cell = self.pos.get(src);
            if !cell.has_color(self.side) {
                continue;
            }
            match cell.piece() {
                Some(Piece::Pawn) => self.gen_pawn(src),
                Some(Piece::Knight) => {
                    self.gen_short(src, tables::knight_steps(src), MoveKind::Normal)
                }
                Some(Piece::Bishop) => self.gen_long(src, tables::bishop_rays(src)),
                Some(Piece::Rook) => self.gen_long(src, tables::rook_rays(src)),
                Some(Piece::Queen) => self.gen_long(src, tables::queen_rays(src)),
                Some(Piece::King) => self.gen_king(src),
                None => {}
            }
        }
    }
}

/// Generates all the pseudo-legal moves for the side to move into `dst`
///
/// The moves are generated square by square from a8 to h1. Promotions come in queen, knight,
/// bishop, rook order.
pub fn gen_pseudo<P: MovePush>(pos: &Position, dst: &mut P) {
    MoveGen {
        pos,
        side: pos.side(),
        dst,
    }
    .run();
}

/// Returns all the pseudo-legal moves for the side to move
pub fn pseudo_moves(pos: &Position) -> MoveList {
    let mut res = MoveList::new();
    gen_pseudo(pos, &mut res);
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terse(list: &MoveList) -> Vec<String> {
        let mut res: Vec<_> = list.iter().map(|m| m.terse()).collect();
        res.sort();
        res
    }

    #[test]
    fn test_initial() {
        let moves = pseudo_moves(&Position::initial());
        assert_eq!(moves.len(), 20);
        let doubles = moves
            .iter()
            .filter(|m| m.kind() == MoveKind::WhitePawnDouble)
            .count();
        assert_eq!(doubles, 8);
    }

    #[test]
    fn test_promotes() {
        let pos = Position::from_fen("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let moves = pseudo_moves(&pos);
        let kinds: Vec<_> = moves
            .iter()
            .filter(|m| m.src() == "a7".parse().unwrap())
            .map(|m| (m.dst().to_string(), m.kind()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("b8".to_string(), MoveKind::PromoteQueen),
                ("b8".to_string(), MoveKind::PromoteKnight),
                ("b8".to_string(), MoveKind::PromoteBishop),
                ("b8".to_string(), MoveKind::PromoteRook),
                ("a8".to_string(), MoveKind::PromoteQueen),
                ("a8".to_string(), MoveKind::PromoteKnight),
                ("a8".to_string(), MoveKind::PromoteBishop),
                ("a8".to_string(), MoveKind::PromoteRook),
            ]
        );
    }

    #[test]
    fn test_enpassant() {
        let pos =
            Position::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .unwrap();
        let moves = pseudo_moves(&pos);
        let ep: Vec<_> = moves.iter().filter(|m| m.kind().is_enpassant()).collect();
        assert_eq!(ep.len(), 1);
        assert_eq!(ep[0].terse(), "e5f6");
        assert_eq!(ep[0].capture(), Cell::from_parts(Color::Black, Piece::Pawn));
        // No capture towards d6, as there is no target there
        assert!(!moves.iter().any(|m| m.terse() == "e5d6"));
    }

    #[test]
    fn test_castling() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let moves = terse(&pseudo_moves(&pos));
        assert!(moves.contains(&"e1g1".to_string()));
        assert!(moves.contains(&"e1c1".to_string()));

        // Bishop on a6 attacks f1, knight on b1 blocks the queenside
        let pos = Position::from_fen("r3k2r/8/b7/8/8/8/8/RN2K2R w KQkq - 0 1").unwrap();
        let moves = terse(&pseudo_moves(&pos));
        assert!(!moves.contains(&"e1g1".to_string()));
        assert!(!moves.contains(&"e1c1".to_string()));

        // The squares between must be empty, but b1 may be attacked
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/Rr2K2R w KQkq - 0 1").unwrap();
        let moves = terse(&pseudo_moves(&pos));
        assert!(!moves.contains(&"e1c1".to_string()));
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/1r6/R3K2R w KQkq - 0 1").unwrap();
        let moves = terse(&pseudo_moves(&pos));
        assert!(moves.contains(&"e1c1".to_string()));

        // No castling out of check
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/4r3/R3K2R w KQkq - 0 1").unwrap();
        let moves = terse(&pseudo_moves(&pos));
        assert!(!moves.contains(&"e1g1".to_string()));
        assert!(!moves.contains(&"e1c1".to_string()));
    }

    #[test]
    fn test_blocked_pawns() {
        let pos = Position::from_fen("4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1").unwrap();
        let moves = terse(&pseudo_moves(&pos));
        assert!(!moves.iter().any(|m| m.starts_with("e2")));
        let pos = Position::from_fen("4k3/8/8/8/4n3/8/4P3/4K3 w - - 0 1").unwrap();
        let moves = terse(&pseudo_moves(&pos));
        assert!(moves.contains(&"e2e3".to_string()));
        assert!(!moves.contains(&"e2e4".to_string()));
    }
}
