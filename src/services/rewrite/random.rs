// Random Source
// Every random draw the rewrite layers make goes through this trait

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource: Send {
    /// True with probability `p` (clamped to 0..=1).
    fn chance(&mut self, p: f64) -> bool;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// Adapter over any `rand` generator
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng + Send> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> RandomSource for RngSource<R> {
    fn chance(&mut self, p: f64) -> bool {
        if p.is_nan() {
            return false;
        }
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }

    fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}

/// Deterministic source: a draw succeeds only when `p >= 1`, and every pick is 0.
#[cfg(test)]
pub(crate) struct FirstChoice;

#[cfg(test)]
impl RandomSource for FirstChoice {
    fn chance(&mut self, p: f64) -> bool {
        p >= 1.0
    }

    fn pick(&mut self, _len: usize) -> usize {
        0
    }
}

/// Replays a fixed sequence of picks, then falls back to 0.
#[cfg(test)]
pub(crate) struct ScriptedPicks {
    pub picks: std::collections::VecDeque<usize>,
}

#[cfg(test)]
impl ScriptedPicks {
    pub fn new(picks: &[usize]) -> Self {
        Self {
            picks: picks.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedPicks {
    fn chance(&mut self, p: f64) -> bool {
        p >= 1.0
    }

    fn pick(&mut self, len: usize) -> usize {
        self.picks.pop_front().unwrap_or(0).min(len.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chance_extremes() {
        let mut source = RngSource::seeded(7);
        for _ in 0..100 {
            assert!(source.chance(1.0));
            assert!(!source.chance(0.0));
            assert!(!source.chance(f64::NAN));
            assert!(source.chance(3.0));
        }
    }

    #[test]
    fn test_pick_in_range() {
        let mut source = RngSource::seeded(42);
        for len in 1..10 {
            for _ in 0..50 {
                assert!(source.pick(len) < len);
            }
        }
        assert_eq!(source.pick(0), 0);
    }

    #[test]
    fn test_seeded_sources_agree() {
        let mut a = RngSource::seeded(99);
        let mut b = RngSource::seeded(99);
        let xs: Vec<usize> = (0..20).map(|_| a.pick(1000)).collect();
        let ys: Vec<usize> = (0..20).map(|_| b.pick(1000)).collect();
        assert_eq!(xs, ys);
    }
}
