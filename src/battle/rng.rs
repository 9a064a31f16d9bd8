use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{trace, warn};

#[derive(Debug, Clone)]
enum RngSource {
    Seeded(ChaCha8Rng),
    /// Replays fixed values; each is reduced into the requested range.
    Scripted {
        values: VecDeque<u32>,
        fallback: ChaCha8Rng,
        exhausted: bool,
    },
}

/// The single source of randomness for a battle.
///
/// Every draw is tagged with a reason and logged at `trace` level so a replay
/// can be matched draw-for-draw against a previous run.
#[derive(Debug, Clone)]
pub struct BattleRng {
    source: RngSource,
    draws: u64,
}

impl BattleRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            source: RngSource::Seeded(ChaCha8Rng::seed_from_u64(seed)),
            draws: 0,
        }
    }

    /// Scripted outcomes for tests. Once the script runs out, draws continue
    /// from a fixed-seed generator.
    pub fn new_for_test(values: Vec<u32>) -> Self {
        Self {
            source: RngSource::Scripted {
                values: values.into(),
                fallback: ChaCha8Rng::seed_from_u64(0),
                exhausted: false,
            },
            draws: 0,
        }
    }

    /// Uniform value in `min..=max`.
    pub fn int_range(&mut self, min: u32, max: u32, reason: &str) -> u32 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        let value = match &mut self.source {
            RngSource::Seeded(rng) => rng.random_range(min..=max),
            RngSource::Scripted {
                values,
                fallback,
                exhausted,
            } => match values.pop_front() {
                Some(raw) => min + raw % span,
                None => {
                    if !*exhausted {
                        warn!(reason, "scripted rng exhausted; continuing from fallback generator");
                        *exhausted = true;
                    }
                    fallback.random_range(min..=max)
                }
            },
        };
        self.draws += 1;
        trace!(reason, value, min, max, "rng draw");
        value
    }

    /// Uniform value in `0..range`.
    pub fn rand_int(&mut self, range: u32, reason: &str) -> u32 {
        if range == 0 {
            return 0;
        }
        self.int_range(0, range - 1, reason)
    }

    /// True with probability `numerator / denominator`.
    pub fn chance(&mut self, numerator: u32, denominator: u32, reason: &str) -> bool {
        if numerator >= denominator {
            return true;
        }
        if numerator == 0 {
            return false;
        }
        self.rand_int(denominator, reason) < numerator
    }

    /// Percentage roll; 100 and above always succeeds without drawing.
    pub fn percent(&mut self, percent: u32, reason: &str) -> bool {
        self.chance(percent, 100, reason)
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T], reason: &str) -> Option<&'a T> {
        match items.len() {
            0 => None,
            1 => items.first(),
            len => {
                let index = self.rand_int(len as u32, reason) as usize;
                items.get(index)
            }
        }
    }

    /// Fisher-Yates shuffle driven by this generator.
    pub fn shuffle<T>(&mut self, items: &mut [T], reason: &str) {
        for i in (1..items.len()).rev() {
            let j = self.int_range(0, i as u32, reason) as usize;
            items.swap(i, j);
        }
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}
