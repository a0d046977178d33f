use crate::position::Position;
use crate::tables;
use crate::types::{Cell, Color, Coord, Piece};

/// Returns `true` if the square `c` is attacked by some piece of color `by`
///
/// The square itself may be occupied or not, and pieces standing on it are ignored.
pub fn is_square_attacked(pos: &Position, c: Coord, by: Color) -> bool {
    for ray in tables::attack_rays(by.inv(), c) {
        for &(sq, mask) in ray.iter() {
            let cell = pos.get(sq);
            let (color, piece) = match (cell.color(), cell.piece()) {
                (Some(color), Some(piece)) => (color, piece),
                _ => continue,
            };
            if color == by && mask & tables::piece_bit(piece) != 0 {
                return true;
            }
            break;
        }
    }
    let knight = Cell::from_parts(by, Piece::Knight);
    tables::knight_steps(c)
        .iter()
        .any(|&sq| pos.get(sq) == knight)
}

/// Returns `true` if the king of color `c` stands under attack
///
/// If the king is missing, `false` is returned.
#[inline]
pub fn is_king_attacked(pos: &Position, c: Color) -> bool {
    match pos.king_pos(c) {
        Some(king) => is_square_attacked(pos, king, c.inv()),
        None => false,
    }
}

/// Returns `true` if the side to move is in check
#[inline]
pub fn is_check(pos: &Position) -> bool {
    is_king_attacked(pos, pos.side())
}

/// Returns `true` if the side to move can capture the opponent's king
///
/// Such positions are illegal, as the opponent has left its king under attack.
#[inline]
pub fn is_opponent_king_attacked(pos: &Position) -> bool {
    is_king_attacked(pos, pos.side().inv())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Coord {
        s.parse().unwrap()
    }

    #[test]
    fn test_simple() {
        let pos = Position::from_fen("4k3/8/8/3p4/8/1N6/8/R3K3 w - - 0 1").unwrap();
        // Black pawn on d5 attacks c4 and e4, but not d4
        assert!(is_square_attacked(&pos, sq("c4"), Color::Black));
        assert!(is_square_attacked(&pos, sq("e4"), Color::Black));
        assert!(!is_square_attacked(&pos, sq("d4"), Color::Black));
        assert!(!is_square_attacked(&pos, sq("c6"), Color::Black));
        // Knight on b3
        assert!(is_square_attacked(&pos, sq("d4"), Color::White));
        assert!(is_square_attacked(&pos, sq("a5"), Color::White));
        // Rook on a1 along the file and the rank, blocked by the king
        assert!(is_square_attacked(&pos, sq("a8"), Color::White));
        assert!(is_square_attacked(&pos, sq("d1"), Color::White));
        assert!(!is_square_attacked(&pos, sq("h1"), Color::Black));
        // Kings attack adjacent squares
        assert!(is_square_attacked(&pos, sq("f2"), Color::White));
        assert!(is_square_attacked(&pos, sq("d7"), Color::Black));
        assert!(!is_square_attacked(&pos, sq("d6"), Color::Black));
    }

    #[test]
    fn test_blocked_sliders() {
        let pos = Position::from_fen("4k3/8/8/8/8/2P5/8/B3K2q w - - 0 1").unwrap();
        assert!(is_square_attacked(&pos, sq("b2"), Color::White));
        assert!(!is_square_attacked(&pos, sq("e5"), Color::White));
        // The queen on h1 is blocked by the king on e1
        assert!(is_square_attacked(&pos, sq("f1"), Color::Black));
        assert!(!is_square_attacked(&pos, sq("d1"), Color::Black));
        assert!(is_check(&pos));
        assert!(!is_opponent_king_attacked(&pos));
    }

    #[test]
    fn test_pawn_direction() {
        let pos = Position::from_fen("4k3/8/8/8/3P4/8/8/4K3 b - - 0 1").unwrap();
        assert!(is_square_attacked(&pos, sq("c5"), Color::White));
        assert!(is_square_attacked(&pos, sq("e5"), Color::White));
        assert!(!is_square_attacked(&pos, sq("c3"), Color::White));
    }

    #[test]
    fn test_missing_king() {
        let pos = Position::from_fen("8/8/8/8/8/8/8/q7 w - - 0 1").unwrap();
        assert!(!is_king_attacked(&pos, Color::White));
    }
}
