//! Greedy step engine
//!
//! From the current pin, every legal destination is scored by the mean
//! residual darkness along its chord and the best one wins. The chosen chord
//! is then faded out of the residual so the same dark region is not picked
//! again straight away.

use crate::algorithm::cache::{CacheStats, ChordCache};
use crate::algorithm::pairs::{PairKey, UsedPairs};
use crate::algorithm::residual::{Raster, ResidualImage};
use crate::io::configuration::MAX_PINS;
use crate::io::error::{Result, invalid_parameter};
use crate::spatial::line::chord_pixels;
use crate::spatial::pins::{Pin, circular_distance, generate_pins};
use serde::{Deserialize, Serialize};

/// Parameters fixed for the lifetime of one engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Side length of the square raster
    pub size: usize,
    /// Brightness added per pixel of a chosen chord
    pub fade: u32,
    /// Minimum circular index distance between connected pins
    pub min_dist: usize,
    /// Number of pins on the board
    pub pin_count: usize,
}

/// Lifecycle of an engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed, no step taken
    Ready,
    /// At least one step taken, more may follow
    Stepping,
    /// No legal next pin remains; terminal
    Exhausted,
}

/// One accepted greedy step
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    /// 1-based ordinal of the step within the run
    pub index: usize,
    /// Pin the string leaves from
    pub from: usize,
    /// Pin the string arrives at
    pub to: usize,
    /// Mean darkness score that won selection
    pub score: f64,
    /// Residual sum after the fade minus residual sum before it
    pub delta_error: f64,
}

/// Greedy path builder owning all per-run state
///
/// The residual image, chord cache and used-pair set belong to exactly one
/// engine; a new run needs a new engine.
pub struct StepEngine {
    config: EngineConfig,
    pins: Vec<Pin>,
    residual: ResidualImage,
    chords: ChordCache,
    used: UsedPairs,
    steps: Vec<StepRecord>,
    path: Vec<usize>,
    current: usize,
    state: EngineState,
}

impl StepEngine {
    /// Build an engine positioned at pin 0
    ///
    /// # Errors
    ///
    /// Returns [`crate::StringArtError::InvalidParameter`] if the pin count
    /// exceeds [`MAX_PINS`], or [`crate::StringArtError::UnsupportedRaster`]
    /// if the raster cannot be read as a `size x size` image.
    pub fn new(config: EngineConfig, raster: Raster<'_>) -> Result<Self> {
        if config.pin_count > MAX_PINS {
            return Err(invalid_parameter(
                "pins",
                &config.pin_count,
                &format!("must not exceed {MAX_PINS}"),
            ));
        }
        let residual = ResidualImage::from_raster(raster, config.size)?;
        let pins = generate_pins(config.size, config.pin_count);
        let path = if pins.is_empty() { Vec::new() } else { vec![0] };

        Ok(Self {
            config,
            pins,
            residual,
            chords: ChordCache::new(),
            used: UsedPairs::new(config.pin_count),
            steps: Vec::new(),
            path,
            current: 0,
            state: EngineState::Ready,
        })
    }

    /// Engine parameters
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Pin layout used by this engine
    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    /// Pin the next step starts from
    pub const fn current(&self) -> usize {
        self.current
    }

    /// Current lifecycle state
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Accepted steps in order
    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    /// Full pin path so far, starting at pin 0
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// Pairs connected so far
    pub const fn used_pairs(&self) -> &UsedPairs {
        &self.used
    }

    /// Residual image in its current state
    pub const fn residual(&self) -> &ResidualImage {
        &self.residual
    }

    /// Chord cache hit/miss counters
    pub const fn cache_stats(&self) -> CacheStats {
        self.chords.stats
    }

    fn chord<'c>(chords: &'c mut ChordCache, pins: &[Pin], a: usize, b: usize) -> &'c [[i32; 2]] {
        let key = PairKey::new(a, b, pins.len());
        chords.get_or_compute(key, || match (pins.get(a), pins.get(b)) {
            (Some(pin_a), Some(pin_b)) => chord_pixels(pin_a, pin_b),
            _ => Vec::new(),
        })
    }

    /// Mean remaining darkness along the chord between two pins
    pub fn line_score(&mut self, a: usize, b: usize) -> f64 {
        let pixels = Self::chord(&mut self.chords, &self.pins, a, b);
        self.residual.mean_darkness(pixels)
    }

    /// Brighten the residual along the chord between two pins
    ///
    /// Returns the change in residual sum.
    pub fn apply_fade(&mut self, a: usize, b: usize) -> f64 {
        let pixels = Self::chord(&mut self.chords, &self.pins, a, b);
        self.residual.fade(pixels, self.config.fade)
    }

    /// Total of all residual values
    pub const fn residual_sum(&self) -> f64 {
        self.residual.sum()
    }

    /// Best legal destination from the current pin, with its score
    ///
    /// Candidates are visited in ascending index order and only a strictly
    /// greater score replaces the best so far, so ties go to the lowest
    /// index. A score must also be strictly above zero to count.
    pub fn next_pin(&mut self) -> Option<(usize, f64)> {
        let current = self.current;
        let count = self.config.pin_count;
        let mut best = None;
        let mut best_score = 0.0;

        for candidate in 0..count {
            if candidate == current
                || circular_distance(candidate, current, count) < self.config.min_dist
                || self.used.contains(current, candidate)
            {
                continue;
            }
            let score = self.line_score(current, candidate);
            if score > best_score {
                best_score = score;
                best = Some(candidate);
            }
        }

        best.map(|pin| (pin, best_score))
    }

    /// Take one greedy step
    ///
    /// Returns `None` once no legal destination remains; the engine is then
    /// [`EngineState::Exhausted`] and every later call returns `None` too.
    pub fn step(&mut self) -> Option<StepRecord> {
        if self.state == EngineState::Exhausted {
            return None;
        }

        let Some((next, score)) = self.next_pin() else {
            log::debug!(
                "engine exhausted at pin {} after {} steps",
                self.current,
                self.steps.len()
            );
            self.state = EngineState::Exhausted;
            return None;
        };

        let from = self.current;
        let before = self.residual_sum();
        self.used.insert(from, next);
        self.apply_fade(from, next);
        let after = self.residual_sum();

        let record = StepRecord {
            index: self.steps.len() + 1,
            from,
            to: next,
            score,
            delta_error: after - before,
        };
        self.steps.push(record);
        self.path.push(next);
        self.current = next;
        self.state = EngineState::Stepping;
        Some(record)
    }

    /// Consume the engine, keeping what a run reports
    pub fn into_parts(self) -> (Vec<StepRecord>, Vec<Pin>, f64) {
        let residual = self.residual.sum();
        (self.steps, self.pins, residual)
    }
}
