//! Search configuration

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Hard limit on the recursion depth
pub const MAX_DEPTH: usize = 30;

/// Deepest iteration of the iterative deepening
pub const DEFAULT_MAX_DEPTH: usize = 19;

/// Recursion levels below this one sort the moves by a static score before searching
pub const DEFAULT_CAREFUL_SORT_LEVELS: usize = 3;

/// How many repeating best moves are replaced before giving up
pub const DEFAULT_REPETITION_ATTEMPTS: usize = 6;

/// Score in centipawns the side to move must exceed to avoid repeating the position
pub const DEFAULT_REPETITION_THRESHOLD: i32 = 0;

/// Score in centipawns which is considered decisive by the streak rule
pub const DEFAULT_KILLING_INITIAL: i32 = 800;

/// Growth of the decisive score while the streak continues
pub const DEFAULT_KILLING_STEP: i32 = 10;

/// Weight of the material against the positional factors used by default
pub const DEFAULT_BALANCE: i32 = 4;

/// Flag to stop a running search from another thread
///
/// The search checks it cooperatively, and returns the best line found so far.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clears the flag so the token can be used for the next search
    #[inline]
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub max_depth: usize,
    pub careful_sort_levels: usize,
    pub repetition_attempts: usize,
    pub repetition_threshold: i32,
    pub killing_initial: i32,
    pub killing_step: i32,
    pub stop: Option<StopToken>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            careful_sort_levels: DEFAULT_CAREFUL_SORT_LEVELS,
            repetition_attempts: DEFAULT_REPETITION_ATTEMPTS,
            repetition_threshold: DEFAULT_REPETITION_THRESHOLD,
            killing_initial: DEFAULT_KILLING_INITIAL,
            killing_step: DEFAULT_KILLING_STEP,
            stop: None,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the deepest iteration, which is capped so the recursion never exceeds [`MAX_DEPTH`]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.clamp(1, MAX_DEPTH - 10);
        self
    }

    pub fn with_careful_sort_levels(mut self, levels: usize) -> Self {
        self.careful_sort_levels = levels;
        self
    }

    pub fn with_repetition_attempts(mut self, attempts: usize) -> Self {
        self.repetition_attempts = attempts;
        self
    }

    pub fn with_repetition_threshold(mut self, threshold: i32) -> Self {
        self.repetition_threshold = threshold;
        self
    }

    pub fn with_killing(mut self, initial: i32, step: i32) -> Self {
        self.killing_initial = initial;
        self.killing_step = step;
        self
    }

    pub fn with_stop(mut self, stop: StopToken) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Returns `true` if the stop token is set and was triggered
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stop.as_ref().map_or(false, StopToken::is_stopped)
    }

    /// Depth limit actually used by the search
    #[inline]
    pub fn depth_limit(&self, depth: usize) -> usize {
        depth.min(self.max_depth).min(MAX_DEPTH - 10)
    }
}
