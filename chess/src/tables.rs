//! Precomputed per-square geometry.
//!
//! All the tables are generated by the build script. Rays are ordered from the origin
//! square outwards, so walking a ray stops naturally at the first occupied square.

use crate::types::{Color, Coord, Piece};

const fn c(idx: usize) -> Coord {
    Coord::from_index(idx)
}

include!(concat!(env!("OUT_DIR"), "/tables.rs"));

/// Bit for `p` in the piece masks of [`attack_rays`].
pub const fn piece_bit(p: Piece) -> u8 {
    1 << p as u8
}

#[inline]
pub fn queen_rays(c: Coord) -> &'static [&'static [Coord]] {
    QUEEN_RAYS[c.index()]
}

#[inline]
pub fn rook_rays(c: Coord) -> &'static [&'static [Coord]] {
    ROOK_RAYS[c.index()]
}

#[inline]
pub fn bishop_rays(c: Coord) -> &'static [&'static [Coord]] {
    BISHOP_RAYS[c.index()]
}

#[inline]
pub fn knight_steps(c: Coord) -> &'static [Coord] {
    KNIGHT_STEPS[c.index()]
}

#[inline]
pub fn king_steps(c: Coord) -> &'static [Coord] {
    KING_STEPS[c.index()]
}

/// Diagonal capture squares for a pawn of color `color` standing on `c`.
#[inline]
pub fn pawn_captures(color: Color, c: Coord) -> &'static [Coord] {
    match color {
        Color::White => WHITE_PAWN_CAPTURES[c.index()],
        Color::Black => BLACK_PAWN_CAPTURES[c.index()],
    }
}

/// Advance squares for a pawn, two of them from the initial rank.
#[inline]
pub fn pawn_advances(color: Color, c: Coord) -> &'static [Coord] {
    match color {
        Color::White => WHITE_PAWN_ADVANCES[c.index()],
        Color::Black => BLACK_PAWN_ADVANCES[c.index()],
    }
}

/// Squares holding enemy pawns that would attack a piece of color `target` on `c`.
#[inline]
pub fn pawn_attackers(target: Color, c: Coord) -> &'static [Coord] {
    match target {
        Color::White => BLACK_PAWNS_ATTACKING_WHITE[c.index()],
        Color::Black => WHITE_PAWNS_ATTACKING_BLACK[c.index()],
    }
}

/// Queen rays from a piece of color `target` on `c`. Each square carries a mask of the
/// enemy pieces that attack the target from that square along the ray.
#[inline]
pub fn attack_rays(target: Color, c: Coord) -> &'static [&'static [(Coord, u8)]] {
    match target {
        Color::White => ATTACKS_ON_WHITE[c.index()],
        Color::Black => ATTACKS_ON_BLACK[c.index()],
    }
}

#[inline]
pub fn good_king_positions(c: Coord) -> &'static [Coord] {
    GOOD_KING_POSITIONS[c.index()]
}
