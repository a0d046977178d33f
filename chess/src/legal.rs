//! Legal moves, game status and position validation

use crate::attack;
use crate::movegen::{self, MoveList};
use crate::moves::Move;
use crate::position::Position;
use crate::types::{Color, Coord, Piece, Rank, Status, Terminal};

use derive_more::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// Extra information about a legal move
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MoveFlags {
    /// The move gives check, but not mate
    pub check: bool,
    /// The move mates the opponent
    pub mate: bool,
    /// The move stalemates the opponent
    pub stalemate: bool,
}

/// Set of reasons why a position cannot occur in a game
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Hash, BitOr, BitAnd, BitOrAssign, BitAndAssign, Not,
)]
pub struct IllegalReasons(u8);

impl IllegalReasons {
    pub const EMPTY: IllegalReasons = IllegalReasons(0);
    /// A pawn stands on the first or the last rank
    pub const PAWN_POSITION: IllegalReasons = IllegalReasons(1);
    /// There must be exactly one king of each color
    pub const NOT_ONE_KING_EACH: IllegalReasons = IllegalReasons(2);
    /// The side to move can capture the opponent's king
    pub const CAN_TAKE_KING: IllegalReasons = IllegalReasons(4);
    pub const WHITE_TOO_MANY_PIECES: IllegalReasons = IllegalReasons(8);
    pub const WHITE_TOO_MANY_PAWNS: IllegalReasons = IllegalReasons(16);
    pub const BLACK_TOO_MANY_PIECES: IllegalReasons = IllegalReasons(32);
    pub const BLACK_TOO_MANY_PAWNS: IllegalReasons = IllegalReasons(64);

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(&self, other: IllegalReasons) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn bits(&self) -> u8 {
        self.0
    }
}

/// Returns `true` if the pseudo-legal move `mv` does not leave the moving side's king under
/// attack
pub fn is_legal_after(pos: &mut Position, mv: Move) -> bool {
    let side = pos.side();
    let detail = pos.make_move(mv);
    let res = !attack::is_king_attacked(pos, side);
    pos.unmake_move(mv, detail);
    res
}

/// Generates all the legal moves into `dst`
///
/// The position is restored before returning.
pub fn gen_legal(pos: &mut Position, dst: &mut MoveList) {
    let mut pseudo = MoveList::new();
    movegen::gen_pseudo(pos, &mut pseudo);
    for &mv in &pseudo {
        if is_legal_after(pos, mv) {
            movegen::MovePush::push(dst, mv);
        }
    }
}

impl Position {
    /// Returns all the legal moves for the side to move
    pub fn legal_moves(&self) -> MoveList {
        let mut res = MoveList::new();
        gen_legal(&mut self.clone(), &mut res);
        res
    }

    /// Same as [`Position::legal_moves()`], but also tells for each move whether it gives
    /// check, mate or stalemate
    pub fn legal_moves_annotated(&self) -> Vec<(Move, MoveFlags)> {
        let mut pos = self.clone();
        let mut pseudo = MoveList::new();
        movegen::gen_pseudo(&pos, &mut pseudo);
        let mut scratch = MoveList::new();
        let mut res = Vec::with_capacity(pseudo.len());
        for &mv in &pseudo {
            let detail = pos.make_move(mv);
            let status = pos.status_with(&mut scratch);
            let check = attack::is_check(&pos);
            pos.unmake_move(mv, detail);
            let flags = match status {
                Status::Illegal => continue,
                Status::Ongoing => MoveFlags {
                    check,
                    ..MoveFlags::default()
                },
                Status::Terminal(Terminal::Checkmate(_)) => MoveFlags {
                    mate: true,
                    ..MoveFlags::default()
                },
                Status::Terminal(Terminal::Stalemate(_)) => MoveFlags {
                    stalemate: true,
                    ..MoveFlags::default()
                },
            };
            res.push((mv, flags));
        }
        res
    }

    /// Returns `true` if the side to move is in check
    #[inline]
    pub fn is_check(&self) -> bool {
        attack::is_check(self)
    }

    /// Determines whether the game is over in this position
    pub fn status(&self) -> Status {
        self.clone().status_with(&mut MoveList::new())
    }

    /// Same as [`Position::status()`], but leaves the pseudo-legal moves in `list`
    ///
    /// The list is filled only if the position is not [`Status::Illegal`]. The position is
    /// restored before returning.
    pub fn status_with(&mut self, list: &mut MoveList) -> Status {
        list.clear();
        if attack::is_opponent_king_attacked(self) {
            return Status::Illegal;
        }
        movegen::gen_pseudo(self, list);
        let side = self.side();
        for &mv in list.iter() {
            if is_legal_after(self, mv) {
                return Status::Ongoing;
            }
        }
        if attack::is_check(self) {
            Status::Terminal(Terminal::Checkmate(side))
        } else {
            Status::Terminal(Terminal::Stalemate(side))
        }
    }

    /// Checks whether the position can occur in a real game
    ///
    /// Returns an empty set if no problems were found.
    pub fn validate(&self) -> IllegalReasons {
        let mut res = IllegalReasons::EMPTY;
        let mut kings = [0; 2];
        let mut pawns = [0; 2];
        let mut pieces = [0; 2];
        for (c, cell) in Coord::iter().zip(self.cells().iter()) {
            let (color, piece) = match (cell.color(), cell.piece()) {
                (Some(color), Some(piece)) => (color, piece),
                _ => continue,
            };
            let idx = color.index();
            match piece {
                Piece::Pawn => {
                    pawns[idx] += 1;
                    if matches!(c.rank(), Rank::R1 | Rank::R8) {
                        res |= IllegalReasons::PAWN_POSITION;
                    }
                }
                Piece::King => {
                    kings[idx] += 1;
                    pieces[idx] += 1;
                }
                _ => pieces[idx] += 1,
            }
        }
        if kings != [1, 1] {
            res |= IllegalReasons::NOT_ONE_KING_EACH;
        }
        if attack::is_opponent_king_attacked(self) {
            res |= IllegalReasons::CAN_TAKE_KING;
        }
        for (color, too_many_pieces, too_many_pawns) in [
            (
                Color::White,
                IllegalReasons::WHITE_TOO_MANY_PIECES,
                IllegalReasons::WHITE_TOO_MANY_PAWNS,
            ),
            (
                Color::Black,
                IllegalReasons::BLACK_TOO_MANY_PIECES,
                IllegalReasons::BLACK_TOO_MANY_PAWNS,
            ),
        ] {
            let idx = color.index();
            if pieces[idx] > 8 && pieces[idx] + pawns[idx] > 16 {
                res |= too_many_pieces;
            }
            if pawns[idx] > 8 {
                res |= too_many_pawns;
            }
        }
        res
    }
}
