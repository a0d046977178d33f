//! Zobrist hashing of the board
//!
//! The hashes cover only the cells, so positions differing in side to move, castling or en
//! passant get the same hash. Every `(cell, square)` pair has its own key, including the
//! empty cell.

use crate::moves::{Move, MoveKind};
use crate::position::Position;
use crate::types::{Cell, Coord, Piece};
use kibitzer_base::geometry;

use std::ops::BitXorAssign;

include!(concat!(env!("OUT_DIR"), "/zobrist.rs"));

type Keys<T> = [[T; 64]; Cell::MAX_INDEX];

trait HashKey: Copy + Default + BitXorAssign {}

impl HashKey for u32 {}
impl HashKey for u64 {}

struct Updater<'a, T> {
    keys: &'a Keys<T>,
    hash: T,
}

impl<'a, T: HashKey> Updater<'a, T> {
    #[inline]
    fn replace(&mut self, c: Coord, old: Cell, new: Cell) {
        self.hash ^= self.keys[old.index()][c.index()];
        self.hash ^= self.keys[new.index()][c.index()];
    }
}

fn full<T: HashKey>(keys: &Keys<T>, pos: &Position) -> T {
    let mut hash = T::default();
    for (idx, cell) in pos.cells().iter().enumerate() {
        hash ^= keys[cell.index()][idx];
    }
    hash
}

fn update<T: HashKey>(keys: &Keys<T>, pos: &Position, hash: T, mv: Move) -> T {
    let mut u = Updater { keys, hash };
    let (src, dst) = (mv.src(), mv.dst());
    let piece = pos.get(src);
    let side = pos.side();
    match mv.kind() {
        MoveKind::Normal
        | MoveKind::KingMove
        | MoveKind::WhitePawnDouble
        | MoveKind::BlackPawnDouble => {
            u.replace(src, piece, Cell::EMPTY);
            u.replace(dst, pos.get(dst), piece);
        }
        MoveKind::PromoteQueen
        | MoveKind::PromoteRook
        | MoveKind::PromoteBishop
        | MoveKind::PromoteKnight => {
            let promote = mv.kind().promote().unwrap_or(Piece::Queen);
            u.replace(src, piece, Cell::EMPTY);
            u.replace(dst, pos.get(dst), Cell::from_parts(side, promote));
        }
        MoveKind::WhiteEnpassant | MoveKind::BlackEnpassant => {
            let victim = mv.enpassant_victim();
            u.replace(src, piece, Cell::EMPTY);
            u.replace(dst, Cell::EMPTY, piece);
            u.replace(victim, pos.get(victim), Cell::EMPTY);
        }
        MoveKind::WhiteKingsideCastling
        | MoveKind::WhiteQueensideCastling
        | MoveKind::BlackKingsideCastling
        | MoveKind::BlackQueensideCastling => {
            if let Some((color, side)) = mv.kind().as_castling() {
                let king = Cell::from_parts(color, Piece::King);
                let rook = Cell::from_parts(color, Piece::Rook);
                u.replace(geometry::king_home(color), king, Cell::EMPTY);
                u.replace(geometry::rook_home(color, side), rook, Cell::EMPTY);
                u.replace(geometry::castling_king_dst(color, side), Cell::EMPTY, king);
                u.replace(geometry::castling_rook_dst(color, side), Cell::EMPTY, rook);
            }
        }
    }
    u.hash
}

impl Position {
    /// 32-bit Zobrist hash of the board
    #[inline]
    pub fn hash32(&self) -> u32 {
        full(&KEYS32, self)
    }

    /// 64-bit Zobrist hash of the board
    #[inline]
    pub fn hash64(&self) -> u64 {
        full(&KEYS64, self)
    }

    /// Returns the 32-bit hash of the board after `mv`, given the hash `hash` of the current
    /// board
    ///
    /// The move must not be applied yet.
    #[inline]
    pub fn hash32_update(&self, hash: u32, mv: Move) -> u32 {
        update(&KEYS32, self, hash, mv)
    }

    /// Returns the 64-bit hash of the board after `mv`, given the hash `hash` of the current
    /// board
    ///
    /// The move must not be applied yet.
    #[inline]
    pub fn hash64_update(&self, hash: u64, mv: Move) -> u64 {
        update(&KEYS64, self, hash, mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_keys_distinct() {
        let empty = Position::empty();
        let initial = Position::initial();
        assert_ne!(empty.hash32(), initial.hash32());
        assert_ne!(empty.hash64(), initial.hash64());
        assert_ne!(KEYS64[0][0], KEYS64[0][1]);
    }

    #[test]
    fn test_board_only() {
        let white = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let black = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R b - - 0 1").unwrap();
        assert_eq!(white.hash64(), black.hash64());
        assert_eq!(white.hash32(), black.hash32());
    }

    #[test]
    fn test_incremental() {
        let mut rng = StdRng::seed_from_u64(42);
        for fen in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
        ] {
            for _ in 0..20 {
                let mut pos = Position::from_fen(fen).unwrap();
                let mut h32 = pos.hash32();
                let mut h64 = pos.hash64();
                for _ in 0..60 {
                    let moves = pos.legal_moves();
                    if moves.is_empty() {
                        break;
                    }
                    let mv = moves[rng.gen_range(0..moves.len())];
                    h32 = pos.hash32_update(h32, mv);
                    h64 = pos.hash64_update(h64, mv);
                    pos.make_move(mv);
                    assert_eq!(h32, pos.hash32(), "{} after {}", pos, mv);
                    assert_eq!(h64, pos.hash64(), "{} after {}", pos, mv);
                }
            }
        }
    }
}
