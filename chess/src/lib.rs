//! # Kibitzer
//!
//! Chess rules, a compact position model and a small alpha-beta engine.
//!
//! The crate consists of the following parts:
//!
//! - [`Position`] is a plain mailbox board with the side to move, castling rights, en passant
//!   target and move counters. It can be parsed from FEN and published back, compressed into
//!   24 bytes with [`CompressedPosition`], and hashed with 32-bit or 64-bit Zobrist keys.
//! - [`Move`] is a move together with its kind and captured piece, which is enough to make and
//!   unmake it. Moves can be converted to and from terse (`e2e4`) and natural (`Nf3`) notation.
//! - [`Rules`] adds the game history on top of the position, which is needed to detect draws by
//!   repetition.
//! - [`eval`] and [`search`] implement the engine.
//!
//! # Example
//!
//! ```
//! use kibitzer::{Move, Rules, Status};
//!
//! let mut rules = Rules::new();
//! assert_eq!(rules.legal_moves().len(), 20);
//! for s in ["f3", "e5", "g4", "Qh4"] {
//!     let mv = Move::from_natural(s, &rules).unwrap();
//!     rules.play_move(mv);
//! }
//! assert_eq!(rules.to_fen(), "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
//! assert!(rules.status() == Status::Terminal(kibitzer::Terminal::Checkmate(kibitzer::Color::White)));
//! ```

pub mod attack;
pub mod compress;
pub mod eval;
pub mod legal;
pub mod movegen;
pub mod moves;
pub mod position;
pub mod rules;
pub mod search;
pub mod types;

mod hash;
mod tables;

pub use compress::{CompressError, CompressedPosition};
pub use legal::{IllegalReasons, MoveFlags};
pub use movegen::MoveList;
pub use moves::{IllegalMoveError, Move, MoveKind, NaturalParseError, TerseParseError};
pub use position::{Detail, FenParseError, Position};
pub use rules::Rules;
pub use search::{Engine, NoProgress, Progress, ProgressReport, SearchConfig, SearchOutcome, StopToken};
pub use types::{
    CastlingRights, CastlingSide, Cell, Color, Coord, DrawKind, File, Piece, Rank, Status,
    Terminal,
};
