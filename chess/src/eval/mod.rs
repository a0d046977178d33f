//! Static evaluation of positions
//!
//! All the scores are measured in decipawns from White's point of view, so a pawn is worth
//! `10` and positive scores mean that White is better. The evaluation is split into two
//! parts. [`Planning`] is computed once at the root of the search and describes the plan
//! for the whole game phase, while [`evaluate_leaf()`] is called for every searched position.

mod enprise;

pub use enprise::enprise;

use crate::attack;
use crate::legal;
use crate::movegen::{self, MoveList};
use crate::moves::Move;
use crate::position::Position;
use crate::tables;
use crate::types::{Color, Coord, Piece, Status, Terminal};

use arrayvec::ArrayVec;

/// Material of a full army with all the pieces still on the board, above which the position
/// is considered to be an opening
pub const MATERIAL_OPENING: i32 = 500 + (8 * 10 + 4 * 30 + 2 * 50 + 90) * 2 / 3;

/// Material below which a side is considered to be in an ending
pub const MATERIAL_ENDING: i32 = 500 + (8 * 10 + 4 * 30 + 2 * 50 + 90) / 3;

/// Material above which the position is considered to be a middlegame
pub const MATERIAL_MIDDLE: i32 = MATERIAL_ENDING;

/// Score of a checkmate for [`legal_moves_sorted()`]
pub const MATE_SCORE: i32 = 1_000_000;

const KING_VALUE: i32 = 500;
const WILL_QUEEN_BONUS: i32 = 65;

/// Value of the piece in decipawns
///
/// A bishop is slightly better than a knight. The king has a finite value so it can take part
/// in exchanges.
pub const fn piece_value(p: Piece) -> i32 {
    match p {
        Piece::Pawn => 10,
        Piece::Knight => 30,
        Piece::Bishop => 31,
        Piece::Rook => 50,
        Piece::Queen => 90,
        Piece::King => KING_VALUE,
    }
}

const fn is_minor_or_major(p: Piece) -> bool {
    matches!(
        p,
        Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen
    )
}

#[rustfmt::skip]
const KING_ENDING_BONUS: [i32; 64] = [
    -25, -25, -25, -25, -25, -25, -25, -25,
    -25,   0,   0,   0,   0,   0,   0, -25,
    -25,   0,  25,  25,  25,  25,   0, -25,
    -25,   0,  25,  50,  50,  25,   0, -25,
    -25,   0,  25,  50,  50,  25,   0, -25,
    -25,   0,  25,  25,  25,  25,   0, -25,
    -25,   0,   0,   0,   0,   0,   0, -25,
    -25, -25, -25, -25, -25, -25, -25, -25,
];

const KING_CENTER_BONUS: i32 = KING_ENDING_BONUS[28];

const fn sign(c: Color) -> i32 {
    match c {
        Color::White => 1,
        Color::Black => -1,
    }
}

/// Rank counted from the back rank of `c`, so `0` is the home rank and `7` is the promotion rank
#[inline]
fn rel_rank(sq: Coord, c: Color) -> usize {
    match c {
        Color::White => 7 - sq.rank().index(),
        Color::Black => sq.rank().index(),
    }
}

/// Files `f - 1`, `f` and `f + 1` as a bit mask
#[inline]
fn neighbor_files(f: usize) -> u8 {
    ((0b111_u16 << f) >> 1) as u8
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
struct Material {
    /// Total material including pawns and the king
    total: i32,
    /// Knights, bishops, rooks and queens only
    pieces: i32,
}

impl Material {
    fn of(pos: &Position, c: Color) -> Material {
        let mut res = Material::default();
        for &cell in pos.cells() {
            if !cell.has_color(c) {
                continue;
            }
            if let Some(p) = cell.piece() {
                res.total += piece_value(p);
                if is_minor_or_major(p) {
                    res.pieces += piece_value(p);
                }
            }
        }
        res
    }

    /// Ratio between the pieces and the pawns, in percent, capped at `1000`
    fn piece_pawn_percent(&self) -> i32 {
        let pawns = self.total - KING_VALUE - self.pieces;
        if pawns == 0 {
            1000
        } else {
            (100 * self.pieces / pawns).min(1000)
        }
    }
}

/// Evaluation data computed once before the search
///
/// It holds the material balance at the root, which is used to encourage the stronger side to
/// exchange pieces rather than pawns, and the king placement tables for endings.
#[derive(Debug, Clone)]
pub struct Planning {
    pieces: [i32; 2],
    piece_pawn_percent: [i32; 2],
    ending: bool,
    better: Option<Color>,
    king_bonus: [[i32; 64]; 2],
}

impl Planning {
    pub fn new(pos: &Position) -> Planning {
        let mat = [
            Material::of(pos, Color::White),
            Material::of(pos, Color::Black),
        ];
        let ending = mat.iter().all(|m| m.total < MATERIAL_ENDING);

        let side = pos.side();
        let mut total = [mat[0].total, mat[1].total];
        total[side.index()] += enprise(pos, side);
        let better = match total[0].cmp(&total[1]) {
            std::cmp::Ordering::Greater => Some(Color::White),
            std::cmp::Ordering::Less => Some(Color::Black),
            std::cmp::Ordering::Equal => None,
        };

        let mut king_bonus = [[0; 64]; 2];
        if ending {
            king_bonus = [KING_ENDING_BONUS; 2];
            // Kings are attracted by the enemy pawns
            for sq in Coord::iter() {
                let cell = pos.get(sq);
                if cell.piece() != Some(Piece::Pawn) {
                    continue;
                }
                if let Some(c) = cell.color() {
                    king_bonus[c.inv().index()][sq.index()] = KING_CENTER_BONUS;
                }
            }
            // The stronger king is attracted to the squares which push the weaker king to
            // the edge
            if let Some(strong) = better {
                if let Some(weak_king) = pos.king_pos(strong.inv()) {
                    let base = KING_ENDING_BONUS[weak_king.index()];
                    for &sq in tables::good_king_positions(weak_king) {
                        if KING_ENDING_BONUS[sq.index()] > base {
                            king_bonus[strong.index()][sq.index()] += KING_CENTER_BONUS;
                        }
                    }
                }
            }
        }

        Planning {
            pieces: [mat[0].pieces, mat[1].pieces],
            piece_pawn_percent: [mat[0].piece_pawn_percent(), mat[1].piece_pawn_percent()],
            ending,
            better,
            king_bonus,
        }
    }

    /// Returns `true` if both sides have little material left
    #[inline]
    pub fn is_ending(&self) -> bool {
        self.ending
    }

    /// Side which is ahead in material at the root, if any
    #[inline]
    pub fn better_side(&self) -> Option<Color> {
        self.better
    }

    /// Bonus for the king of color `c` standing on `sq`
    #[inline]
    pub fn king_bonus(&self, c: Color, sq: Coord) -> i32 {
        self.king_bonus[c.index()][sq.index()]
    }
}

/// Result of [`evaluate_leaf()`]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Leaf {
    /// Material balance, including the material that can be won by the side to move
    pub material: i32,
    /// Sum of the positional bonuses
    pub positional: i32,
}

impl Leaf {
    /// Combined score with material weighted as `balance` times positional factors
    #[inline]
    pub fn score(&self, balance: i32) -> i32 {
        self.material * balance + self.positional
    }
}

/// Per-color features collected by a single scan over the board
#[derive(Default)]
struct SideScan {
    material: Material,
    bonus: i32,
    king: Option<Coord>,
    back_rank_pieces: u8,
    undeveloped_minors: i32,
    king_safe: bool,
    queen_developed: bool,
    queen_central: bool,
    queen_deep: bool,
    pawns: ArrayVec<Coord, 64>,
    passers: ArrayVec<Coord, 64>,
}

impl SideScan {
    /// Applies the bonuses which depend on the game phase
    fn phase_bonus(&self) -> i32 {
        let flag = |b: bool| if b { 10 } else { 0 };
        if self.material.total > MATERIAL_OPENING {
            flag(self.king_safe) + flag(self.queen_developed) - 3 * self.undeveloped_minors
        } else if self.material.total > MATERIAL_MIDDLE {
            flag(self.king_safe) + flag(self.queen_central)
        } else if self.queen_deep {
            5
        } else {
            0
        }
    }
}

struct Scanner<'a> {
    pos: &'a Position,
    planning: &'a Planning,
    // Files of the pawns, indexed by color and absolute rank
    pawn_files: [[u8; 8]; 2],
}

impl<'a> Scanner<'a> {
    fn new(pos: &'a Position, planning: &'a Planning) -> Self {
        let mut pawn_files = [[0_u8; 8]; 2];
        for sq in Coord::iter() {
            let cell = pos.get(sq);
            if cell.piece() != Some(Piece::Pawn) {
                continue;
            }
            if let Some(c) = cell.color() {
                pawn_files[c.index()][sq.rank().index()] |= 1 << sq.file().index();
            }
        }
        Scanner {
            pos,
            planning,
            pawn_files,
        }
    }

    /// Returns `true` if enemy pawns stand on any of the neighbor files of `sq` from the rank
    /// after the pawn's one up to the seventh rank
    fn is_blocked_pawn(&self, sq: Coord, c: Color) -> bool {
        let files = neighbor_files(sq.file().index());
        let enemy = &self.pawn_files[c.inv().index()];
        (rel_rank(sq, c) + 1..7).any(|rel| {
            let rank = match c {
                Color::White => 7 - rel,
                Color::Black => rel,
            };
            enemy[rank] & files != 0
        })
    }

    /// Returns `true` if the bishop on `sq` cannot move forward because of its own pieces
    fn is_blocked_bishop(&self, sq: Coord, c: Color) -> bool {
        let forward = -sign(c) as isize;
        [-1, 1]
            .into_iter()
            .filter_map(|df| sq.shift(df, forward))
            .all(|dst| self.pos.get(dst).has_color(c))
    }

    fn add_passer(&self, scan: &mut SideScan, sq: Coord, c: Color, bonus: i32) {
        scan.bonus += bonus;
        // Passer escorted by its own king on a square not attracted to enemy pawns
        let ahead = match c {
            Color::White => sq.north(),
            Color::Black => sq.south(),
        };
        if let Some(ahead) = ahead {
            if self.pos.king_pos(c) == Some(ahead) && self.planning.king_bonus(c, ahead) == 0 {
                scan.bonus += 50;
            }
        }
        scan.passers.push(sq);
    }

    fn scan_pawn(&self, scan: &mut SideScan, sq: Coord, c: Color) {
        scan.pawns.push(sq);
        let file = sq.file().index();
        match rel_rank(sq, c) {
            6 => self.add_passer(scan, sq, c, 40),
            5 => {
                if !self.is_blocked_pawn(sq, c) {
                    self.add_passer(scan, sq, c, 30);
                }
            }
            4 => {
                if file == 3 || file == 4 {
                    scan.bonus += 5;
                }
                if !self.is_blocked_pawn(sq, c) {
                    self.add_passer(scan, sq, c, 20);
                }
            }
            3 => {
                if (2..=5).contains(&file) {
                    scan.bonus += 5;
                }
            }
            _ => {}
        }
    }

    fn scan(&self, c: Color) -> SideScan {
        let mut scan = SideScan::default();
        for sq in Coord::iter() {
            let cell = self.pos.get(sq);
            if !cell.has_color(c) {
                continue;
            }
            let piece = match cell.piece() {
                Some(p) => p,
                None => continue,
            };
            scan.material.total += piece_value(piece);
            if is_minor_or_major(piece) {
                scan.material.pieces += piece_value(piece);
            }

            let rel = rel_rank(sq, c);
            let file = sq.file().index();
            let central = (2..=5).contains(&file);
            match piece {
                Piece::Pawn => self.scan_pawn(&mut scan, sq, c),
                Piece::King => {
                    scan.king = Some(sq);
                    scan.bonus += self.planning.king_bonus(c, sq);
                    if rel == 0 {
                        scan.back_rank_pieces = 2;
                    }
                    if rel <= 1 && !central {
                        scan.king_safe = true;
                    }
                }
                Piece::Rook => {
                    if rel == 0 {
                        scan.back_rank_pieces += 1;
                        if scan.back_rank_pieces == 2 {
                            scan.bonus += 10;
                        }
                    } else if rel == 6 {
                        scan.bonus += 5;
                    }
                }
                Piece::Knight => {
                    if rel == 0 {
                        scan.back_rank_pieces = 2;
                        scan.undeveloped_minors += 1;
                    } else if central && (2..=5).contains(&rel) {
                        scan.bonus += [8, 9, 10, 12][rel - 2];
                    }
                }
                Piece::Bishop => {
                    if rel == 0 {
                        scan.back_rank_pieces = 2;
                        scan.undeveloped_minors += 1;
                    }
                    if rel <= 1 && self.is_blocked_bishop(sq, c) {
                        scan.bonus -= 10;
                    }
                }
                Piece::Queen => match rel {
                    0 => scan.back_rank_pieces = 2,
                    1 => scan.queen_developed |= central,
                    2..=5 => scan.queen_central = true,
                    _ => scan.queen_deep = true,
                },
            }
        }
        scan.bonus += scan.phase_bonus();
        scan
    }
}

/// Returns `true` if the side to move is checkmated
///
/// Only the pseudo-legal moves are tried, so it's cheaper than the full [`Position::status()`].
fn is_mated(pos: &mut Position) -> bool {
    if !attack::is_check(pos) {
        return false;
    }
    let moves = movegen::pseudo_moves(pos);
    !moves.iter().any(|&mv| legal::is_legal_after(pos, mv))
}

/// Returns `true` if a passer of `owner` cannot be stopped by the enemy king, or the owner has
/// two pawns the enemy king cannot handle at once
fn will_queen(pos: &Position, planning: &Planning, scans: &[SideScan; 2], owner: Color) -> bool {
    let defender = owner.inv();
    let def = &scans[defender.index()];
    let own = &scans[owner.index()];
    let to_move = pos.side() == defender;

    if def.material.pieces == 0 {
        if let Some(king) = def.king {
            let king_rel = rel_rank(king, owner) as i32;
            let king_file = king.file().index() as i32;
            for &p in &own.passers {
                let mut rel = rel_rank(p, owner) as i32;
                if to_move {
                    rel -= 1;
                }
                let dist = (king_file - p.file().index() as i32).abs();
                if rel > king_rel || dist > 7 - rel {
                    return true;
                }
            }
        }
    }

    // A bare king against pawns which either protect each other or stand too far apart
    if def.material.total == KING_VALUE && planning.pieces[defender.index()] != 0 {
        let max_sep = if to_move { 5 } else { 4 };
        for (i, &a) in own.pawns.iter().enumerate() {
            for &b in &own.pawns[..i] {
                let df = (a.file().index() as i32 - b.file().index() as i32).abs();
                let dr = (a.rank().index() as i32 - b.rank().index() as i32).abs();
                if (df == 1 && dr == 1) || df > max_sep {
                    return true;
                }
            }
        }
    }
    false
}

/// Evaluates the position reached during the search
///
/// `pos` is restored before returning.
pub fn evaluate_leaf(pos: &mut Position, planning: &Planning) -> Leaf {
    let scanner = Scanner::new(pos, planning);
    let scans = [scanner.scan(Color::White), scanner.scan(Color::Black)];

    let side = pos.side();
    let mut material = scans[0].material.total - scans[1].material.total;
    if is_mated(pos) {
        material = -KING_VALUE * sign(side);
    } else {
        material += enprise(pos, side) * sign(side);
    }

    // Encourage the stronger side to trade pieces
    if material > 0 && planning.piece_pawn_percent[0] != 0 {
        let cur = scans[0].material.piece_pawn_percent();
        material += (8 - 8 * cur / planning.piece_pawn_percent[0]).max(-8);
    } else if material < 0 && planning.piece_pawn_percent[1] != 0 {
        let cur = scans[1].material.piece_pawn_percent();
        material -= (8 - 8 * cur / planning.piece_pawn_percent[1]).max(-8);
    }

    for owner in [Color::Black, Color::White] {
        if will_queen(pos, planning, &scans, owner) {
            material += WILL_QUEEN_BONUS * sign(owner);
        }
    }

    Leaf {
        material,
        positional: scans[0].bonus - scans[1].bonus,
    }
}

/// Returns the legal moves ordered from the best to the worst for the side to move, together
/// with their scores
///
/// Each move is scored by a static evaluation of the resulting position. Checkmates get
/// [`MATE_SCORE`], stalemates get zero. The scores are from White's point of view, so the
/// moves are sorted in descending order for White and in ascending order for Black. Moves with
/// equal scores keep their generation order. `pos` is restored before returning.
pub fn legal_moves_sorted(pos: &mut Position) -> (MoveList, Vec<i32>) {
    let planning = Planning::new(pos);
    legal_moves_sorted_with(pos, &planning)
}

/// Same as [`legal_moves_sorted()`], but uses the given `planning`
pub fn legal_moves_sorted_with(pos: &mut Position, planning: &Planning) -> (MoveList, Vec<i32>) {
    let side = pos.side();
    let pseudo = movegen::pseudo_moves(pos);
    let mut scratch = MoveList::new();
    let mut scored: Vec<(Move, i32)> = Vec::with_capacity(pseudo.len());
    for &mv in &pseudo {
        let detail = pos.make_move(mv);
        let score = match pos.status_with(&mut scratch) {
            Status::Illegal => None,
            Status::Terminal(Terminal::Checkmate(c)) => Some(-MATE_SCORE * sign(c)),
            Status::Terminal(Terminal::Stalemate(_)) => Some(0),
            Status::Ongoing => Some(evaluate_leaf(pos, planning).score(4)),
        };
        pos.unmake_move(mv, detail);
        if let Some(score) = score {
            scored.push((mv, score));
        }
    }
    match side {
        Color::White => scored.sort_by_key(|&(_, s)| std::cmp::Reverse(s)),
        Color::Black => scored.sort_by_key(|&(_, s)| s),
    }
    let moves = scored.iter().map(|&(mv, _)| mv).collect();
    let scores = scored.into_iter().map(|(_, s)| s).collect();
    (moves, scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FENS: &[&str] = &[
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r1bqkbnr/1ppp1ppp/p1n5/4p3/B3P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 1 4",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "8/8/4k3/8/2P5/3K4/8/8 b - - 0 1",
        "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1",
    ];

    #[test]
    fn test_initial() {
        let mut pos = Position::initial();
        let planning = Planning::new(&pos);
        assert!(!planning.is_ending());
        assert_eq!(planning.better_side(), None);
        assert_eq!(planning.king_bonus(Color::White, Coord::E1), 0);
        assert_eq!(evaluate_leaf(&mut pos, &planning), Leaf::default());
        assert!(pos.strict_eq(&Position::initial()));
    }

    #[test]
    fn test_mirror() {
        for fen in FENS {
            let mut pos = Position::from_fen(fen).unwrap();
            let mut mirror = pos.mirrored();
            let planning = Planning::new(&pos);
            let leaf = evaluate_leaf(&mut pos, &planning);
            let planning = Planning::new(&mirror);
            let mirror_leaf = evaluate_leaf(&mut mirror, &planning);
            assert_eq!(leaf.material, -mirror_leaf.material, "{}", fen);
            assert_eq!(leaf.positional, -mirror_leaf.positional, "{}", fen);
        }
    }

    #[test]
    fn test_ending() {
        let pos = Position::from_fen("8/8/4k3/8/2P5/3K4/8/8 b - - 0 1").unwrap();
        let planning = Planning::new(&pos);
        assert!(planning.is_ending());
        assert_eq!(planning.better_side(), Some(Color::White));
        let c4 = "c4".parse().unwrap();
        assert_eq!(planning.king_bonus(Color::Black, c4), KING_CENTER_BONUS);
        assert_eq!(planning.king_bonus(Color::White, c4), KING_ENDING_BONUS[c4.index()]);
        assert_eq!(planning.king_bonus(Color::White, Coord::A1), -25);
    }

    #[test]
    fn test_hanging_piece() {
        let mut pos = Position::from_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1").unwrap();
        let planning = Planning::new(&pos);
        assert_eq!(planning.better_side(), Some(Color::White));
        let leaf = evaluate_leaf(&mut pos, &planning);
        // Rook against queen, but the queen is hanging
        assert!(leaf.material > 0);
    }

    #[test]
    fn test_mated() {
        let mut pos = Position::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 1 1").unwrap();
        let planning = Planning::new(&pos);
        assert_eq!(evaluate_leaf(&mut pos, &planning).material, KING_VALUE);
    }

    #[test]
    fn test_unstoppable_passer() {
        // The black king is outside the square of the pawn
        let mut pos = Position::from_fen("8/8/8/P7/8/8/5k2/K7 w - - 0 1").unwrap();
        let planning = Planning::new(&pos);
        let leaf = evaluate_leaf(&mut pos, &planning);
        assert!(leaf.material >= 10 + WILL_QUEEN_BONUS);

        // The black king stands in front of the pawn
        let mut pos = Position::from_fen("8/1k6/8/P7/8/8/8/K7 w - - 0 1").unwrap();
        let planning = Planning::new(&pos);
        let leaf = evaluate_leaf(&mut pos, &planning);
        assert!(leaf.material < WILL_QUEEN_BONUS);
    }

    #[test]
    fn test_sorted() {
        let mut pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let (moves, scores) = legal_moves_sorted(&mut pos);
        assert_eq!(moves.len(), pos.legal_moves().len());
        assert_eq!(moves.len(), scores.len());
        assert_eq!(moves[0].terse(), "a1a8");
        assert_eq!(scores[0], MATE_SCORE);
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));

        let mut pos = pos.mirrored();
        let (moves, scores) = legal_moves_sorted(&mut pos);
        assert_eq!(moves[0].terse(), "a8a1");
        assert_eq!(scores[0], -MATE_SCORE);
        assert!(scores.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_sorted_captures_first() {
        let mut pos = Position::from_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1").unwrap();
        let (moves, _) = legal_moves_sorted(&mut pos);
        assert_eq!(moves[0].terse(), "d1d5");
    }
}
