//! Iterative deepening alpha-beta search
//!
//! The search is a plain minimax with alpha-beta pruning, without transposition tables or
//! quiescence search. White maximizes the score and Black minimizes it. The bounds of all the
//! ancestor nodes are checked on each new best score, so the cutoffs may happen several
//! levels above the current node.
//!
//! [`Engine`] wraps the search with iterative deepening, time control and repetition avoidance.
//! All the scratch data lives in a per-call context, so separate engines can search in
//! parallel.

mod params;

pub use params::{
    SearchConfig, StopToken, DEFAULT_BALANCE, DEFAULT_CAREFUL_SORT_LEVELS,
    DEFAULT_KILLING_INITIAL, DEFAULT_KILLING_STEP, DEFAULT_MAX_DEPTH,
    DEFAULT_REPETITION_ATTEMPTS, DEFAULT_REPETITION_THRESHOLD, MAX_DEPTH,
};

use crate::attack;
use crate::eval::{self, Planning};
use crate::legal;
use crate::movegen::{MoveList, MAX_MOVES};
use crate::moves::Move;
use crate::position::Position;
use crate::rules::Rules;
use crate::types::Color;

use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use log::{debug, trace};

const POS_INF: i32 = 1_000_000_000;
const NEG_INF: i32 = -1_000_000_000;

/// Scores above this value in centipawns are mates
pub const MATE_THRESHOLD_CP: i32 = 30_000;

/// Score of a checkmate delivered at recursion level `level`
///
/// Mates found closer to the root get bigger scores.
#[inline]
fn mate_score(level: usize) -> i32 {
    10_000 * (MAX_DEPTH - level) as i32
}

/// Converts the internal score into centipawns, compressing the mate scores
fn to_centipawns(score: i32, balance: i32) -> i32 {
    let cp = score * 10 / balance;
    if cp > MATE_THRESHOLD_CP {
        MATE_THRESHOLD_CP + (cp - MATE_THRESHOLD_CP) / 10_000
    } else if cp < -MATE_THRESHOLD_CP {
        -MATE_THRESHOLD_CP + (cp + MATE_THRESHOLD_CP) / 10_000
    } else {
        cp
    }
}

/// Intermediate search result passed to [`Progress`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressReport {
    /// Index of the line in multi-PV mode, starting from `1`
    pub index: usize,
    pub depth: usize,
    /// Score in centipawns from White's point of view
    pub score_cp: i32,
    pub pv: Vec<Move>,
    pub elapsed: Duration,
}

/// Receives the intermediate results of the search
pub trait Progress {
    fn report(&mut self, report: &ProgressReport);
}

impl<F: FnMut(&ProgressReport)> Progress for F {
    fn report(&mut self, report: &ProgressReport) {
        self(report)
    }
}

/// [`Progress`] which ignores all the reports
#[derive(Debug, Copy, Clone, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&mut self, _report: &ProgressReport) {}
}

/// Final result of the search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub best: Move,
    /// Principal variation, starting with [`SearchOutcome::best`]
    pub pv: Vec<Move>,
    /// Score in centipawns from White's point of view
    ///
    /// Mates are reported as values slightly above [`MATE_THRESHOLD_CP`].
    pub score_cp: i32,
    pub depth: usize,
    /// `true` if there was only one legal move, so no search was made
    pub only_move: bool,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default)]
struct Iteration {
    score: i32,
    best: Option<usize>,
    only_move: bool,
    pv: Vec<Move>,
}

/// Scratch data of a single fixed-depth search
struct SearchContext<'a> {
    pos: Position,
    planning: &'a Planning,
    config: &'a SearchConfig,
    balance: i32,
    depth: usize,
    nodes: u64,
    alpha: [i32; MAX_DEPTH],
    beta: [i32; MAX_DEPTH],
    pv: [[Move; MAX_DEPTH]; MAX_DEPTH],
    pv_len: [usize; MAX_DEPTH],
}

impl<'a> SearchContext<'a> {
    fn new(
        pos: Position,
        planning: &'a Planning,
        config: &'a SearchConfig,
        balance: i32,
        depth: usize,
    ) -> Self {
        SearchContext {
            pos,
            planning,
            config,
            balance,
            depth,
            nodes: 0,
            alpha: [NEG_INF; MAX_DEPTH],
            beta: [POS_INF; MAX_DEPTH],
            pv: [[Move::NULL; MAX_DEPTH]; MAX_DEPTH],
            pv_len: [0; MAX_DEPTH],
        }
    }

    fn leaf_score(&mut self) -> i32 {
        eval::evaluate_leaf(&mut self.pos, self.planning).score(self.balance)
    }

    /// Sorts the moves by the static score after each of them, best first for the side to move
    fn careful_sort(&mut self, moves: &mut MoveList) {
        let mut scored: ArrayVec<(Move, i32), MAX_MOVES> = ArrayVec::new();
        for &mv in moves.iter() {
            let detail = self.pos.make_move(mv);
            let score = self.leaf_score();
            self.pos.unmake_move(mv, detail);
            scored.push((mv, score));
        }
        match self.pos.side() {
            Color::White => scored.sort_by_key(|&(_, s)| std::cmp::Reverse(s)),
            Color::Black => scored.sort_by_key(|&(_, s)| s),
        }
        for (dst, (mv, _)) in moves.iter_mut().zip(scored) {
            *dst = mv;
        }
    }

    /// Searches the node at recursion level `level` with legal moves `moves`
    ///
    /// Returns the score and the index of the best move. `moves` may be reordered.
    fn search(
        &mut self,
        moves: &mut MoveList,
        level: usize,
        parent_mobility: i32,
    ) -> (i32, Option<usize>) {
        let side = self.pos.side();
        let mut mobility = [0; 2];
        mobility[side.index()] = moves.len() as i32;
        mobility[side.inv().index()] = parent_mobility;

        self.alpha[level] = NEG_INF;
        self.beta[level] = POS_INF;
        if level < self.config.careful_sort_levels {
            self.careful_sort(moves);
        }

        let mut best_score = match side {
            Color::White => NEG_INF,
            Color::Black => POS_INF,
        };
        let mut best = None;
        let mut child = MoveList::new();
        for i in 0..moves.len() {
            let mv = moves[i];
            self.pv_len[level] = 0;
            let detail = self.pos.make_move(mv);
            self.nodes += 1;

            let score = if level > self.depth || self.config.is_stopped() {
                self.leaf_score() + (mobility[0] - mobility[1]) / 4
            } else {
                child.clear();
                legal::gen_legal(&mut self.pos, &mut child);
                if !child.is_empty() {
                    self.search(&mut child, level + 1, mobility[side.index()]).0
                } else if attack::is_check(&self.pos) {
                    match side {
                        Color::White => mate_score(level),
                        Color::Black => -mate_score(level),
                    }
                } else {
                    0
                }
            };

            let improves = match side {
                Color::White => score > best_score,
                Color::Black => score < best_score,
            };
            let mut prune = false;
            if improves {
                prune = (0..level).rev().step_by(2).any(|j| match side {
                    Color::White => score > self.beta[j],
                    Color::Black => score < self.alpha[j],
                });
                match side {
                    Color::White => self.alpha[level] = self.alpha[level].max(score),
                    Color::Black => self.beta[level] = self.beta[level].min(score),
                }
                best_score = score;
                best = Some(i);

                let (head, tail) = self.pv.split_at_mut(level);
                let row = &mut head[level - 1];
                let len = self.pv_len[level];
                row[0] = mv;
                row[1..=len].copy_from_slice(&tail[0][..len]);
                self.pv_len[level - 1] = len + 1;
            }

            self.pos.unmake_move(mv, detail);
            if prune {
                break;
            }
        }
        (best_score, best)
    }

    fn principal_variation(&self) -> Vec<Move> {
        self.pv[0][..self.pv_len[0]].to_vec()
    }
}

/// State carried between the moves of one game
#[derive(Debug, Clone)]
struct Streak {
    winning: [bool; 2],
    losing: [bool; 2],
    idx: usize,
    killing: i32,
    /// Ratio between the times of consecutive iterations, by depth
    multiplier: [u64; MAX_DEPTH],
}

impl Streak {
    fn new(config: &SearchConfig) -> Self {
        Streak {
            winning: [false; 2],
            losing: [false; 2],
            idx: 0,
            killing: config.killing_initial,
            multiplier: [0; MAX_DEPTH],
        }
    }

    fn is_winning(&self) -> bool {
        self.winning[0] && self.winning[1]
    }

    fn is_losing(&self) -> bool {
        self.losing[0] && self.losing[1]
    }

    fn update(&mut self, score_cp: i32, config: &SearchConfig) {
        self.winning[self.idx] = score_cp > self.killing;
        self.losing[self.idx] = score_cp < -self.killing;
        self.idx ^= 1;
        if self.is_winning() || self.is_losing() {
            self.killing += config.killing_step;
        } else {
            self.killing = config.killing_initial;
        }
    }
}

/// Chess engine playing one game
///
/// The engine owns the game record, so it can avoid repeating positions when it is winning.
///
/// # Example
///
/// ```
/// use kibitzer::search::{Engine, NoProgress, SearchConfig};
/// use kibitzer::Rules;
///
/// let rules = Rules::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
/// let mut engine = Engine::with_rules(rules, SearchConfig::default());
/// let outcome = engine.calculate_fixed_depth(4, 2).unwrap();
/// assert_eq!(outcome.best.to_string(), "a1a8");
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    rules: Rules,
    config: SearchConfig,
    streak: Streak,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(SearchConfig::default())
    }
}

impl Engine {
    pub fn new(config: SearchConfig) -> Engine {
        Engine::with_rules(Rules::new(), config)
    }

    pub fn with_rules(rules: Rules, config: SearchConfig) -> Engine {
        let streak = Streak::new(&config);
        Engine {
            rules,
            config,
            streak,
        }
    }

    #[inline]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    #[inline]
    pub fn rules_mut(&mut self) -> &mut Rules {
        &mut self.rules
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SearchConfig) {
        self.config = config;
    }

    /// Plays `mv` in the game
    ///
    /// The move must be legal.
    pub fn play_move(&mut self, mv: Move) {
        self.rules.play_move(mv);
    }

    /// Searches the already sorted legal `moves` to the given depth
    fn search_moves(
        &self,
        planning: &Planning,
        moves: &mut MoveList,
        balance: i32,
        depth: usize,
    ) -> Iteration {
        let depth = self.config.depth_limit(depth);
        let pos = self.rules.position().clone();
        let mut ctx = SearchContext::new(pos, planning, &self.config, balance, depth);
        let (score, best) = ctx.search(moves, 1, 0);
        trace!("depth {}: searched {} nodes", depth, ctx.nodes);
        Iteration {
            score,
            best,
            only_move: false,
            pv: ctx.principal_variation(),
        }
    }

    /// Same as [`Engine::search_moves()`], but returns immediately if there is at most one move
    fn run_depth(
        &self,
        planning: &Planning,
        moves: &mut MoveList,
        balance: i32,
        depth: usize,
    ) -> Iteration {
        match moves.len() {
            0 => Iteration::default(),
            1 => {
                let mv = moves[0];
                let mut pos = self.rules.position().clone();
                pos.make_move(mv);
                let score = eval::evaluate_leaf(&mut pos, planning).score(balance);
                Iteration {
                    score,
                    best: Some(0),
                    only_move: true,
                    pv: vec![mv],
                }
            }
            _ => self.search_moves(planning, moves, balance, depth),
        }
    }

    /// Legal moves at the root, sorted by a one-ply score
    fn root_moves(&self, planning: &Planning) -> MoveList {
        let mut pos = self.rules.position().clone();
        eval::legal_moves_sorted_with(&mut pos, planning).0
    }

    fn outcome(
        iter: &Iteration,
        balance: i32,
        depth: usize,
        start: Instant,
    ) -> Option<SearchOutcome> {
        let best = *iter.pv.first()?;
        Some(SearchOutcome {
            best,
            pv: iter.pv.clone(),
            score_cp: to_centipawns(iter.score, balance),
            depth,
            only_move: iter.only_move,
            elapsed: start.elapsed(),
        })
    }

    /// Searches the current position at a fixed depth
    ///
    /// `balance` is the weight of the material against the positional factors, see
    /// [`DEFAULT_BALANCE`]. Returns `None` if there are no legal moves.
    pub fn calculate_fixed_depth(&mut self, balance: i32, depth: usize) -> Option<SearchOutcome> {
        let start = Instant::now();
        let balance = balance.max(1);
        let planning = Planning::new(self.rules.position());
        let mut moves = self.root_moves(&planning);
        let iter = self.run_depth(&planning, &mut moves, balance, depth);
        Self::outcome(&iter, balance, self.config.depth_limit(depth), start)
    }

    /// Finds the `count` best moves in the current position
    ///
    /// The position is searched repeatedly, and the best move is removed from the candidates
    /// after each search. Each line is reported to `progress` with its index. The returned
    /// list is shorter than `count` if there are not enough legal moves.
    pub fn calculate_multi_pv(
        &mut self,
        count: usize,
        balance: i32,
        depth: usize,
        progress: &mut impl Progress,
    ) -> Vec<SearchOutcome> {
        let start = Instant::now();
        let balance = balance.max(1);
        let depth = self.config.depth_limit(depth);
        let planning = Planning::new(self.rules.position());
        let mut moves = self.root_moves(&planning);
        let mut res = Vec::with_capacity(count);
        for index in 1..=count {
            if moves.is_empty() {
                break;
            }
            let iter = self.search_moves(&planning, &mut moves, balance, depth);
            let best = match iter.best {
                Some(b) => b,
                None => break,
            };
            moves.remove(best);
            let outcome = match Self::outcome(&iter, balance, depth, start) {
                Some(o) => o,
                None => break,
            };
            debug!(
                "multipv {}: move {} score {} depth {}",
                index, outcome.best, outcome.score_cp, depth
            );
            progress.report(&ProgressReport {
                index,
                depth,
                score_cp: outcome.score_cp,
                pv: outcome.pv.clone(),
                elapsed: outcome.elapsed,
            });
            res.push(outcome);
        }
        res
    }

    /// Finds the best move in the current position within the given time
    ///
    /// `ms_time` is the time left on the clock and `ms_budget` is the time the engine would
    /// like to spend on this move, both in milliseconds. `balance` is the weight of the material
    /// against the positional factors, see [`DEFAULT_BALANCE`]. Set `new_game` to `true` on the
    /// first move of each game.
    ///
    /// The search deepens until one of the following happens:
    ///
    /// - there is at most one legal move;
    /// - a mate is found;
    /// - the game has been clearly decided for several moves;
    /// - half of the budget is spent;
    /// - the next iteration is predicted to take more than a tenth of `ms_time`;
    /// - the stop token from [`SearchConfig`] is triggered.
    ///
    /// If the side to move is better, moves that repeat the position are avoided. Returns `None`
    /// if there are no legal moves.
    pub fn calculate_next_move(
        &mut self,
        new_game: bool,
        ms_time: u64,
        ms_budget: u64,
        balance: i32,
        progress: &mut impl Progress,
    ) -> Option<SearchOutcome> {
        let start = Instant::now();
        let balance = balance.max(1);
        if new_game {
            self.streak = Streak::new(&self.config);
        }
        let planning = Planning::new(self.rules.position());
        let mut moves = self.root_moves(&planning);

        let mut iter = Iteration::default();
        let mut depth = 0;
        let mut previous_elapsed = 0_u64;
        for d in 1..=self.config.depth_limit(MAX_DEPTH) {
            depth = d;
            iter = self.run_depth(&planning, &mut moves, balance, d);
            let elapsed = start.elapsed().as_millis() as u64;
            let raw_cp = iter.score * 10 / balance;
            if iter.best.is_some() {
                progress.report(&ProgressReport {
                    index: 1,
                    depth: d,
                    score_cp: to_centipawns(iter.score, balance),
                    pv: iter.pv.clone(),
                    elapsed: start.elapsed(),
                });
                debug!(
                    "depth {}: pv {:?} score {} elapsed {}ms budget {}ms time {}ms",
                    d,
                    iter.pv.iter().map(Move::terse).collect::<Vec<_>>(),
                    raw_cp,
                    elapsed,
                    ms_budget,
                    ms_time
                );
            }

            if previous_elapsed != 0 {
                self.streak.multiplier[d - 1] = elapsed / previous_elapsed;
            }
            let predicted_here = if elapsed != 0 && previous_elapsed != 0 {
                elapsed * (elapsed / previous_elapsed)
            } else {
                0
            };
            let predicted_before = elapsed * self.streak.multiplier[d];
            let inc_depth_threshold = ms_time / 10;

            if iter.only_move || iter.best.is_none() {
                debug!("stop at depth {}: {} legal moves", d, moves.len());
                break;
            }
            if raw_cp.abs() > MATE_THRESHOLD_CP {
                debug!("stop at depth {}: mate found", d);
                break;
            }
            if d >= 5 && self.streak.is_winning() && raw_cp > self.streak.killing {
                debug!("stop at depth {}: winning, score {}", d, raw_cp);
                break;
            }
            if d >= 5 && self.streak.is_losing() && raw_cp < -self.streak.killing {
                debug!("stop at depth {}: losing, score {}", d, raw_cp);
                break;
            }
            if elapsed > ms_budget / 2 {
                debug!("stop at depth {}: budget exceeded", d);
                break;
            }
            if predicted_here > inc_depth_threshold {
                debug!("stop at depth {}: predicted {}ms for this position", d, predicted_here);
                break;
            }
            if predicted_before > inc_depth_threshold {
                debug!("stop at depth {}: predicted {}ms from previous moves", d, predicted_before);
                break;
            }
            if self.config.is_stopped() {
                debug!("stop at depth {}: stop requested", d);
                break;
            }
            previous_elapsed = elapsed;
        }

        if iter.best.is_some() && !iter.only_move {
            iter = self.avoid_repetition(&planning, &mut moves, iter, balance, depth, start, progress);
        }

        let score_cp = if iter.best.is_some() {
            to_centipawns(iter.score, balance)
        } else {
            0
        };
        self.streak.update(score_cp, &self.config);
        debug!(
            "killing threshold {}, winning {:?}, losing {:?}",
            self.streak.killing, self.streak.winning, self.streak.losing
        );
        Self::outcome(&iter, balance, depth, start)
    }

    /// Replaces the best move with another one if it repeats the position and the side to move
    /// is better
    #[allow(clippy::too_many_arguments)]
    fn avoid_repetition(
        &self,
        planning: &Planning,
        moves: &mut MoveList,
        best_line: Iteration,
        balance: i32,
        depth: usize,
        start: Instant,
        progress: &mut impl Progress,
    ) -> Iteration {
        let side = self.rules.side();
        let threshold = self.config.repetition_threshold;
        let mut iter = best_line.clone();
        let mut retry_depth = depth;
        for attempt in 0..self.config.repetition_attempts {
            let score_cp = to_centipawns(iter.score, balance);
            let better = match side {
                Color::White => score_cp > threshold,
                Color::Black => score_cp < -threshold,
            };
            if !better {
                if attempt > 0 {
                    trace!("no better move without repetition, keeping the best line");
                    iter = best_line;
                    progress.report(&ProgressReport {
                        index: 1,
                        depth,
                        score_cp: to_centipawns(iter.score, balance),
                        pv: iter.pv.clone(),
                        elapsed: start.elapsed(),
                    });
                }
                break;
            }

            let best = match iter.best {
                Some(b) => b,
                None => break,
            };
            let mv = moves[best];
            let mut rules = self.rules.clone();
            rules.play_move(mv);
            if !rules.is_repetition() {
                break;
            }

            trace!("removing {} (score {}) because of repetition", mv, score_cp);
            moves.remove(best);
            if moves.is_empty() {
                break;
            }
            if attempt == 0 {
                retry_depth = retry_depth.saturating_sub(1);
            }
            let next = self.run_depth(planning, moves, balance, retry_depth);
            if next.best.is_none() {
                break;
            }
            iter = next;
            trace!(
                "repetition attempt {}: depth {} pv {:?} score {}",
                attempt + 1,
                retry_depth,
                iter.pv.iter().map(Move::terse).collect::<Vec<_>>(),
                to_centipawns(iter.score, balance)
            );
            progress.report(&ProgressReport {
                index: 1,
                depth,
                score_cp: to_centipawns(iter.score, balance),
                pv: iter.pv.clone(),
                elapsed: start.elapsed(),
            });
        }
        iter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(fen: &str) -> Engine {
        Engine::with_rules(Rules::from_fen(fen).unwrap(), SearchConfig::default())
    }

    #[test]
    fn test_centipawns() {
        assert_eq!(to_centipawns(40, 4), 100);
        assert_eq!(to_centipawns(-40, 4), -100);
        let mate = to_centipawns(mate_score(1), 4);
        assert!(mate > MATE_THRESHOLD_CP && mate < MATE_THRESHOLD_CP + 100);
        assert_eq!(to_centipawns(-mate_score(1), 4), -mate);
        assert!(to_centipawns(mate_score(1), 4) > to_centipawns(mate_score(3), 4));
    }

    #[test]
    fn test_pawn_race() {
        let mut engine = engine("8/8/6k1/PK6/8/8/8/8 w - - 0 0");
        let outcome = engine.calculate_fixed_depth(DEFAULT_BALANCE, 7).unwrap();
        assert_eq!(outcome.best.terse(), "a5a6");
        assert_eq!(outcome.pv[0], outcome.best);
        assert!(!outcome.only_move);
    }

    #[test]
    fn test_mate_in_one() {
        let mut engine = engine("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        let mut reports = Vec::new();
        let outcome = engine
            .calculate_next_move(true, 60_000, 10_000, DEFAULT_BALANCE, &mut |r: &ProgressReport| {
                reports.push(r.clone())
            })
            .unwrap();
        assert_eq!(outcome.best.terse(), "a1a8");
        assert!(outcome.score_cp > MATE_THRESHOLD_CP);
        assert_eq!(outcome.depth, 1);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].pv[0], outcome.best);

        let mut engine = Engine::with_rules(
            Rules::from_position(engine.rules().mirrored()),
            SearchConfig::default(),
        );
        let outcome = engine.calculate_fixed_depth(DEFAULT_BALANCE, 2).unwrap();
        assert_eq!(outcome.best.terse(), "a8a1");
        assert!(outcome.score_cp < -MATE_THRESHOLD_CP);
    }

    #[test]
    fn test_only_move() {
        let mut engine = engine("7k/8/6K1/8/8/8/8/R7 b - - 0 1");
        let outcome = engine
            .calculate_next_move(true, 60_000, 10_000, DEFAULT_BALANCE, &mut NoProgress)
            .unwrap();
        assert!(outcome.only_move);
        assert_eq!(outcome.best.terse(), "h8g8");
        assert_eq!(outcome.pv, vec![outcome.best]);
        assert_eq!(outcome.depth, 1);
    }

    #[test]
    fn test_no_moves() {
        // Stalemate
        let mut engine = engine("7k/8/6Q1/8/8/8/8/6K1 b - - 0 1");
        assert_eq!(
            engine.calculate_next_move(true, 60_000, 10_000, DEFAULT_BALANCE, &mut NoProgress),
            None
        );
        // Fool's mate
        let mut engine = self::engine("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert_eq!(engine.calculate_fixed_depth(DEFAULT_BALANCE, 3), None);
        assert!(engine.calculate_multi_pv(3, DEFAULT_BALANCE, 1, &mut NoProgress).is_empty());
    }

    #[test]
    fn test_multi_pv() {
        let mut engine = Engine::default();
        let mut indices = Vec::new();
        let lines = engine.calculate_multi_pv(3, DEFAULT_BALANCE, 1, &mut |r: &ProgressReport| {
            indices.push(r.index)
        });
        assert_eq!(lines.len(), 3);
        assert_eq!(indices, vec![1, 2, 3]);
        assert_ne!(lines[0].best, lines[1].best);
        assert_ne!(lines[0].best, lines[2].best);
        assert_ne!(lines[1].best, lines[2].best);
        // White is to move, so the lines come from the best to the worst
        assert!(lines[0].score_cp >= lines[1].score_cp);
        assert!(lines[1].score_cp >= lines[2].score_cp);
    }

    #[test]
    fn test_stop() {
        let token = StopToken::new();
        token.stop();
        let mut engine = Engine::new(SearchConfig::default().with_stop(token));
        let outcome = engine
            .calculate_next_move(true, 60_000, 60_000, DEFAULT_BALANCE, &mut NoProgress)
            .unwrap();
        assert_eq!(outcome.depth, 1);
        assert!(engine.rules().legal_moves().contains(&outcome.best));
    }

    #[test]
    fn test_avoid_repetition() {
        let mut engine = engine("7k/8/8/8/8/8/8/KQ6 w - - 0 1");
        let shuffle = ["b1b2", "h8g8", "b2b1", "g8h8", "b1b2", "h8g8", "b2b1", "g8h8"];
        for s in shuffle {
            let mv = Move::from_terse(s, engine.rules()).unwrap();
            engine.play_move(mv);
        }
        let outcome = engine
            .calculate_next_move(true, 60_000, 2_000, DEFAULT_BALANCE, &mut NoProgress)
            .unwrap();
        let mut rules = engine.rules().clone();
        rules.play_move(outcome.best);
        assert!(!rules.is_repetition());
        assert!(outcome.score_cp > 0);
    }

    #[test]
    fn test_streak() {
        let config = SearchConfig::default();
        let mut streak = Streak::new(&config);
        streak.update(1000, &config);
        assert_eq!(streak.killing, DEFAULT_KILLING_INITIAL);
        streak.update(1000, &config);
        assert_eq!(streak.killing, DEFAULT_KILLING_INITIAL + DEFAULT_KILLING_STEP);
        streak.update(0, &config);
        assert_eq!(streak.killing, DEFAULT_KILLING_INITIAL);
        streak.update(-1000, &config);
        streak.update(-1000, &config);
        assert!(streak.is_losing());
        assert!(!streak.is_winning());
    }
}
