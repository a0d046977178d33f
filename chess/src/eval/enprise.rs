//! Static exchange analysis of hanging pieces

use super::piece_value;
use crate::position::Position;
use crate::tables;
use crate::types::{Cell, Color, Coord, Piece};

use arrayvec::ArrayVec;

type Pieces = ArrayVec<Piece, 64>;

/// Appends all the pieces of color `color` attacking `target` to `out`, in the order they would
/// join an exchange on `target`
///
/// Pawns come first, then knights, then the sliders ray by ray. Pieces standing behind each other
/// on the same ray are all collected, so a rook behind a queen takes part in the exchange. If a
/// ray starts with a cheaper piece than the earlier rays, it is moved to the front.
fn collect(pos: &Position, target: Coord, color: Color, out: &mut Pieces) {
    let pawn = Cell::from_parts(color, Piece::Pawn);
    for &c in tables::pawn_attackers(color.inv(), target) {
        if pos.get(c) == pawn {
            out.push(Piece::Pawn);
        }
    }
    let knight = Cell::from_parts(color, Piece::Knight);
    for &c in tables::knight_steps(target) {
        if pos.get(c) == knight {
            out.push(Piece::Knight);
        }
    }

    let sliders_start = out.len();
    for ray in tables::attack_rays(color.inv(), target) {
        let ray_start = out.len();
        for &(c, mask) in ray.iter() {
            let cell = pos.get(c);
            if cell.is_empty() {
                continue;
            }
            let piece = match cell.piece() {
                Some(p) if cell.has_color(color) && mask & tables::piece_bit(p) != 0 => p,
                _ => break,
            };
            // Pawns were already counted above, but they don't stop the x-ray.
            if piece != Piece::Pawn {
                out.push(piece);
            }
            if piece == Piece::King {
                break;
            }
        }
        if out.len() > ray_start && ray_start > sliders_start {
            let first = out[sliders_start];
            let head = out[ray_start];
            let cheaper = match first {
                Piece::King => true,
                Piece::Queen => head != Piece::King,
                Piece::Rook => head == Piece::Bishop,
                _ => false,
            };
            if cheaper {
                out[sliders_start..].rotate_left(ray_start - sliders_start);
            }
        }
    }
}

/// Best material gain for `side` by capturing one of the opponent's pieces, in decipawns
///
/// Each exchange is simulated by alternating the cheapest available captures. Either side may
/// stop capturing when it is not profitable anymore. The result is never negative.
pub fn enprise(pos: &Position, side: Color) -> i32 {
    let mut best = 0;
    let mut attackers = Pieces::new();
    let mut defenders = Pieces::new();
    for target in Coord::iter() {
        let cell = pos.get(target);
        let piece = match cell.piece() {
            Some(p) if cell.has_color(side.inv()) => p,
            _ => continue,
        };

        attackers.clear();
        collect(pos, target, side, &mut attackers);
        if attackers.is_empty() {
            continue;
        }
        defenders.clear();
        defenders.push(piece);
        collect(pos, target, side.inv(), &mut defenders);

        let mut min = i32::MAX;
        let mut max = i32::MIN;
        let mut net = 0;
        let (mut a, mut d) = (0, 0);
        while a < attackers.len() && d < defenders.len() {
            net += piece_value(defenders[d]);
            d += 1;
            min = min.min(net);
            if d == defenders.len() {
                max = max.max(net);
                break;
            }
            net -= piece_value(attackers[a]);
            a += 1;
            max = max.max(net);
        }
        let score = if min <= max { min } else { max };
        best = best.max(score);
    }
    best
}
