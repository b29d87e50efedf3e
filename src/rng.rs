use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// The single source of randomness for a battle. It is created once per
/// battle and passed by reference into every step that rolls, so two battles
/// built from the same seed make the same draws in the same order.
#[derive(Debug, Clone)]
pub struct BattleRng {
    inner: StdRng,
    draws: u64,
}

impl BattleRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            draws: 0,
        }
    }

    pub fn from_os_rng() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
            draws: 0,
        }
    }

    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_os_rng(),
        }
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Rolls 1..=100.
    pub fn roll_percent(&mut self, reason: &str) -> u8 {
        let outcome = self.inner.random_range(1..=100u8);
        self.record(reason, outcome as f64);
        outcome
    }

    /// True with `percent`% probability. 100 and above always succeed without a draw.
    pub fn chance(&mut self, percent: u8, reason: &str) -> bool {
        if percent >= 100 {
            return true;
        }
        if percent == 0 {
            return false;
        }
        self.roll_percent(reason) <= percent
    }

    pub fn probability(&mut self, p: f64, reason: &str) -> bool {
        let p = p.clamp(0.0, 1.0);
        let outcome = self.inner.random_bool(p);
        self.record(reason, if outcome { 1.0 } else { 0.0 });
        outcome
    }

    /// Uniform draw in `[low, high]`.
    pub fn uniform(&mut self, low: f64, high: f64, reason: &str) -> f64 {
        let outcome = self.inner.random_range(low..=high);
        self.record(reason, outcome);
        outcome
    }

    /// Uniform integer in `[low, high]`.
    pub fn range(&mut self, low: u8, high: u8, reason: &str) -> u8 {
        let outcome = self.inner.random_range(low..=high);
        self.record(reason, outcome as f64);
        outcome
    }

    /// Unbiased key for breaking ordering ties.
    pub fn tie_breaker(&mut self) -> u64 {
        let outcome: u64 = self.inner.random();
        self.draws += 1;
        outcome
    }

    fn record(&mut self, reason: &str, outcome: f64) {
        self.draws += 1;
        trace!(draw = self.draws, outcome, reason, "rng draw");
    }
}
