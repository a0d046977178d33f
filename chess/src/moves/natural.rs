//! Moves in natural (algebraic) form, like `Nbd2`, `exd5` or `O-O-O`

use super::{IllegalMoveError, Move, MoveKind};
use crate::movegen::MoveList;
use crate::position::Position;
use crate::types::{CastlingSide, File, Piece, Rank, Status, Terminal};

use thiserror::Error;

/// Error parsing a move in natural form
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum NaturalParseError {
    /// String is empty
    #[error("string is empty")]
    EmptyString,
    /// Parsing failed for unspecified reasons
    #[error("syntax error")]
    Syntax,
    /// Bad promote character
    #[error("bad promote char {0:?}")]
    BadPromote(char),
    /// No legal move matches the string
    #[error("no such move")]
    NotFound,
    /// The string describes more than one legal move
    #[error("ambiguous move (candidates are at least `{0}` and `{1}`)")]
    Ambiguity(Move, Move),
}

fn piece_letter(c: u8) -> Option<Piece> {
    match c {
        b'K' | b'Q' | b'R' | b'B' | b'N' | b'P' => Piece::from_char(c as char),
        _ => None,
    }
}

fn file_letter(c: u8) -> Option<File> {
    match c {
        b'a'..=b'h' => File::from_char(c as char),
        _ => None,
    }
}

fn rank_digit(c: u8) -> Option<Rank> {
    Rank::from_char(c as char)
}

/// Parsed move description, with all the unspecified parts left as `None`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Pattern {
    castling: Option<CastlingSide>,
    piece: Option<Piece>,
    src_file: Option<File>,
    src_rank: Option<Rank>,
    dst_file: Option<File>,
    dst_rank: Option<Rank>,
    promote: Option<Piece>,
    enpassant: bool,
}

impl Pattern {
    fn parse(s: &str) -> Result<Pattern, NaturalParseError> {
        let mut s = s
            .trim()
            .trim_end_matches(|c: char| !c.is_ascii_alphanumeric());
        if s.is_empty() {
            return Err(NaturalParseError::EmptyString);
        }
        if !s.is_ascii() {
            return Err(NaturalParseError::Syntax);
        }

        let mut res = Pattern::default();

        let castling: String = s
            .chars()
            .filter(|&c| c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match castling.as_str() {
            "OO" | "00" => {
                res.castling = Some(CastlingSide::King);
                return Ok(res);
            }
            "OOO" | "000" => {
                res.castling = Some(CastlingSide::Queen);
                return Ok(res);
            }
            _ => {}
        }

        for suffix in ["e.p", "ep"] {
            if let Some(rest) = s.strip_suffix(suffix) {
                s = rest.trim_end();
                res.enpassant = true;
                break;
            }
        }

        let mut body: Vec<u8> = s
            .bytes()
            .filter(|b| !matches!(b, b'x' | b'X' | b':' | b'-' | b'=' | b' '))
            .collect();

        if let Some(&last) = body.last() {
            let after_rank = body.len() >= 2 && body[body.len() - 2].is_ascii_digit();
            if matches!(last, b'Q' | b'R' | b'B' | b'N')
                || (after_rank && last.is_ascii_alphabetic())
            {
                let c = last as char;
                res.promote = match Piece::from_char(c) {
                    Some(p) if MoveKind::from_promote(p).is_some() => Some(p),
                    _ => return Err(NaturalParseError::BadPromote(c)),
                };
                body.pop();
            }
        }

        if body.len() < 2 {
            return Err(NaturalParseError::Syntax);
        }

        // Pawn capture with files only, like `ed`
        if let [src, dst] = body[..] {
            if let (Some(src), Some(dst)) = (file_letter(src), file_letter(dst)) {
                res.piece = Some(Piece::Pawn);
                res.src_file = Some(src);
                res.dst_file = Some(dst);
                return Ok(res);
            }
        }

        let (prefix, dst) = body.split_at(body.len() - 2);
        res.dst_file = Some(File::from_char(dst[0] as char).ok_or(NaturalParseError::Syntax)?);
        res.dst_rank = Some(rank_digit(dst[1]).ok_or(NaturalParseError::Syntax)?);

        let rest = match prefix.first().copied().and_then(piece_letter) {
            Some(p) => {
                res.piece = Some(p);
                &prefix[1..]
            }
            None => prefix,
        };
        match *rest {
            [] => {}
            [c] => match (file_letter(c), rank_digit(c)) {
                (Some(f), _) => res.src_file = Some(f),
                (_, Some(r)) => res.src_rank = Some(r),
                _ => return Err(NaturalParseError::Syntax),
            },
            [f, r] => {
                res.src_file = Some(file_letter(f).ok_or(NaturalParseError::Syntax)?);
                res.src_rank = Some(rank_digit(r).ok_or(NaturalParseError::Syntax)?);
            }
            _ => return Err(NaturalParseError::Syntax),
        }

        // Without a piece letter, only a full source square may denote a non-pawn move
        if res.piece.is_none() && (res.src_file.is_none() || res.src_rank.is_none()) {
            res.piece = Some(Piece::Pawn);
        }
        Ok(res)
    }

    fn matches(&self, pos: &Position, mv: Move) -> bool {
        if let Some(side) = self.castling {
            return matches!(mv.kind().as_castling(), Some((_, s)) if s == side);
        }
        let (src, dst) = (mv.src(), mv.dst());
        if self.piece.map_or(false, |p| pos.get(src).piece() != Some(p))
            || self.src_file.map_or(false, |f| src.file() != f)
            || self.src_rank.map_or(false, |r| src.rank() != r)
            || self.dst_file.map_or(false, |f| dst.file() != f)
            || self.dst_rank.map_or(false, |r| dst.rank() != r)
        {
            return false;
        }
        // Pawn moves without a source file are pushes, and `ed` forms are captures
        let push = src.file() == dst.file();
        if (self.dst_rank.is_none() && push)
            || (self.piece == Some(Piece::Pawn) && self.src_file.is_none() && !push)
        {
            return false;
        }
        if self.enpassant && !mv.kind().is_enpassant() {
            return false;
        }
        match mv.kind().promote() {
            Some(p) => p == self.promote.unwrap_or(Piece::Queen),
            None => self.promote.is_none(),
        }
    }
}

impl Move {
    /// Formats the move in natural form
    ///
    /// The shortest unambiguous form is used, with `+` or `#` appended for check or mate.
    /// Returns an error if the move is not legal in `pos`.
    pub fn natural(&self, pos: &Position) -> Result<String, IllegalMoveError> {
        let legal = pos.legal_moves();
        if !legal.contains(self) {
            return Err(IllegalMoveError);
        }

        let (src, dst) = (self.src, self.dst);
        let cell = pos.get(src);
        let mut res = String::new();
        match (self.kind.as_castling(), cell.piece()) {
            (Some((_, CastlingSide::King)), _) => res.push_str("O-O"),
            (Some((_, CastlingSide::Queen)), _) => res.push_str("O-O-O"),
            (None, Some(Piece::Pawn)) => {
                if src.file() != dst.file() {
                    res.push(src.file().as_char());
                    res.push('x');
                }
                res.push_str(&dst.to_string());
                if let Some(p) = self.kind.promote() {
                    res.push('=');
                    res.push(p.as_char());
                }
            }
            (None, Some(piece)) => {
                let rivals: Vec<Move> = legal
                    .iter()
                    .copied()
                    .filter(|m| m.dst == dst && pos.get(m.src) == cell)
                    .collect();
                let same_file = rivals.iter().filter(|m| m.src.file() == src.file()).count();
                let same_rank = rivals.iter().filter(|m| m.src.rank() == src.rank()).count();
                res.push(piece.as_char());
                if rivals.len() > 1 {
                    if same_file == 1 {
                        res.push(src.file().as_char());
                    } else if same_rank == 1 {
                        res.push(src.rank().as_char());
                    } else {
                        res.push_str(&src.to_string());
                    }
                }
                if self.is_capture() {
                    res.push('x');
                }
                res.push_str(&dst.to_string());
            }
            (None, None) => return Err(IllegalMoveError),
        }

        let mut after = pos.clone();
        after.make_move(*self);
        match after.status_with(&mut MoveList::new()) {
            Status::Terminal(Terminal::Checkmate(_)) => res.push('#'),
            _ if after.is_check() => res.push('+'),
            _ => {}
        }
        Ok(res)
    }

    /// Parses a move in natural form and finds it among the legal moves of `pos`
    ///
    /// Besides the strict algebraic notation, many sloppy forms are accepted, like `Ng1-f3`,
    /// `e2e4`, `ed`, `0-0` or `e8Q`. A promote without piece letter promotes to a queen.
    pub fn from_natural(s: &str, pos: &Position) -> Result<Move, NaturalParseError> {
        let pattern = Pattern::parse(s)?;
        let mut found = None;
        for &mv in &pos.legal_moves() {
            if !pattern.matches(pos, mv) {
                continue;
            }
            if let Some(prev) = found {
                return Err(NaturalParseError::Ambiguity(prev, mv));
            }
            found = Some(mv);
        }
        found.ok_or(NaturalParseError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn natural(fen: &str, terse: &str) -> String {
        let pos = Position::from_fen(fen).unwrap();
        Move::from_terse(terse, &pos).unwrap().natural(&pos).unwrap()
    }

    fn parse(fen: &str, s: &str) -> Result<String, NaturalParseError> {
        let pos = Position::from_fen(fen).unwrap();
        Move::from_natural(s, &pos).map(|m| m.terse())
    }

    const INITIAL: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    const QUEENS: &str = "1k6/8/8/8/4Q2Q/8/8/K6Q w - - 0 1";
    const KNIGHTS: &str = "4k3/8/8/8/8/1N3N2/8/R3K3 w Q - 0 1";

    #[test]
    fn test_output() {
        assert_eq!(natural(INITIAL, "e2e4"), "e4");
        assert_eq!(natural(INITIAL, "g1f3"), "Nf3");
        assert_eq!(natural(KNIGHTS, "b3d2"), "Nbd2");
        assert_eq!(natural(KNIGHTS, "f3d2"), "Nfd2");
        assert_eq!(natural(KNIGHTS, "e1c1"), "O-O-O");
        assert_eq!(natural(QUEENS, "h4e1"), "Qh4e1");
        assert_eq!(natural(QUEENS, "e4e1"), "Qee1");
        assert_eq!(natural(QUEENS, "h1e1"), "Q1e1");
        assert_eq!(natural("4k3/R7/8/8/8/8/8/R3K3 w - - 0 1", "a7a4"), "R7a4");
        assert_eq!(natural("4k3/R7/8/8/8/8/8/R3K3 w - - 0 1", "a1a4"), "R1a4");
    }

    #[test]
    fn test_output_extras() {
        let fen = "1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1";
        assert_eq!(natural(fen, "a7b8q"), "axb8=Q+");
        assert_eq!(natural(fen, "a7a8n"), "a8=N");
        assert_eq!(natural(fen, "a7a8q"), "a8=Q");
        let fen = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1";
        assert_eq!(natural(fen, "e5d6"), "exd6");
        let fen = "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq g3 0 2";
        assert_eq!(natural(fen, "d8h4"), "Qh4#");
        let fen = "4k3/8/8/8/8/8/8/R3K3 w Q - 0 1";
        assert_eq!(natural(fen, "a1a8"), "Ra8+");

        let pos = Position::initial();
        let mv = Move::from_terse("e2e4", &pos).unwrap();
        let after = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(mv.natural(&after), Err(IllegalMoveError));
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse(INITIAL, "e4").unwrap(), "e2e4");
        assert_eq!(parse(INITIAL, "Nf3").unwrap(), "g1f3");
        assert_eq!(parse(INITIAL, "Ng1-f3").unwrap(), "g1f3");
        assert_eq!(parse(INITIAL, "e2-e4").unwrap(), "e2e4");
        assert_eq!(parse(INITIAL, "g1f3").unwrap(), "g1f3");
        assert_eq!(parse(INITIAL, "Pe4!?").unwrap(), "e2e4");
        assert_eq!(parse(KNIGHTS, "Nbd2").unwrap(), "b3d2");
        assert_eq!(parse(KNIGHTS, "Nf3d2").unwrap(), "f3d2");
        assert_eq!(parse(KNIGHTS, "0-0-0").unwrap(), "e1c1");
        assert_eq!(parse(KNIGHTS, "o-o-o").unwrap(), "e1c1");
        assert_eq!(parse(KNIGHTS, "OOO").unwrap(), "e1c1");
        assert_eq!(parse(QUEENS, "Qh4e1").unwrap(), "h4e1");
        assert_eq!(parse(QUEENS, "Q1e1").unwrap(), "h1e1");
    }

    #[test]
    fn test_parse_pawns() {
        let fen = "1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1";
        assert_eq!(parse(fen, "a8").unwrap(), "a7a8q");
        assert_eq!(parse(fen, "a8=N").unwrap(), "a7a8n");
        assert_eq!(parse(fen, "a8N").unwrap(), "a7a8n");
        assert_eq!(parse(fen, "a8r").unwrap(), "a7a8r");
        assert_eq!(parse(fen, "axb8=B+").unwrap(), "a7b8b");
        assert_eq!(parse(fen, "ab").unwrap(), "a7b8q");
        assert_eq!(parse(fen, "abN").unwrap(), "a7b8n");

        let fen = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1";
        assert_eq!(parse(fen, "exd6 e.p.").unwrap(), "e5d6");
        assert_eq!(parse(fen, "exd6ep").unwrap(), "e5d6");
        assert_eq!(parse(fen, "ed").unwrap(), "e5d6");
        assert_eq!(parse(fen, "e6").unwrap(), "e5e6");
        assert_eq!(parse(fen, "e6ep"), Err(NaturalParseError::NotFound));

        let fen = "4k3/8/8/8/8/2n5/1P1B4/4K3 w - - 0 1";
        assert_eq!(parse(fen, "bxc3").unwrap(), "b2c3");
        assert_eq!(parse(fen, "Bxc3").unwrap(), "d2c3");
        assert_eq!(parse(fen, "b3").unwrap(), "b2b3");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse(INITIAL, ""), Err(NaturalParseError::EmptyString));
        assert_eq!(parse(INITIAL, "+"), Err(NaturalParseError::EmptyString));
        assert_eq!(parse(INITIAL, "Zz9"), Err(NaturalParseError::Syntax));
        assert_eq!(parse(INITIAL, "e"), Err(NaturalParseError::Syntax));
        assert_eq!(parse(INITIAL, "e5"), Err(NaturalParseError::NotFound));
        assert_eq!(parse(INITIAL, "O-O"), Err(NaturalParseError::NotFound));
        assert_eq!(
            parse("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1", "a8=K"),
            Err(NaturalParseError::BadPromote('K'))
        );
        assert!(matches!(
            parse(KNIGHTS, "Nd2"),
            Err(NaturalParseError::Ambiguity(_, _))
        ));
        assert!(matches!(
            parse(QUEENS, "Qe1"),
            Err(NaturalParseError::Ambiguity(_, _))
        ));
        assert!(matches!(
            parse(QUEENS, "Qhe1"),
            Err(NaturalParseError::Ambiguity(_, _))
        ));
    }

    #[test]
    fn test_roundtrip() {
        for fen in [
            INITIAL,
            QUEENS,
            KNIGHTS,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            "r3k2r/8/3Q4/8/8/5q2/8/R3K2R b KQkq - 0 1",
        ] {
            let pos = Position::from_fen(fen).unwrap();
            for &mv in &pos.legal_moves() {
                let s = mv.natural(&pos).unwrap();
                assert_eq!(Move::from_natural(&s, &pos), Ok(mv), "{} in {}", s, fen);
            }
        }
    }
}
