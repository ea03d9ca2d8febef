use std::ops::RangeInclusive;
use std::time::Duration;

use criterion::BenchmarkGroup;
use criterion::measurement::Measurement;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const RNG_SEED: u64 = 0x5EED_2026;

/// Criterion sampling profile, picked by how long one iteration takes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RuntimeProfile {
    Small,
    Medium,
    Large,
}

impl RuntimeProfile {
    /// Profile for a workload over a sequence of `len` elements.
    pub fn for_len(len: usize) -> Self {
        match len {
            0..=16_000 => Self::Small,
            16_001..=128_000 => Self::Medium,
            _ => Self::Large,
        }
    }

    fn sample_size(self) -> usize {
        match self {
            Self::Small | Self::Medium => 15,
            Self::Large => 10,
        }
    }

    fn warm_up(self) -> Duration {
        match self {
            Self::Small => Duration::from_millis(100),
            Self::Medium => Duration::from_millis(500),
            Self::Large => Duration::from_millis(800),
        }
    }

    fn measurement(self) -> Duration {
        match self {
            Self::Small => Duration::from_millis(200),
            Self::Medium => Duration::from_millis(1000),
            Self::Large => Duration::from_millis(1500),
        }
    }

    pub fn apply<M: Measurement>(self, group: &mut BenchmarkGroup<'_, M>) {
        group.sample_size(self.sample_size());
        group.warm_up_time(self.warm_up());
        group.measurement_time(self.measurement());
    }
}

pub fn default_rng() -> StdRng {
    StdRng::seed_from_u64(RNG_SEED)
}

pub fn random_values<R: Rng + ?Sized>(
    rng: &mut R,
    len: usize,
    range: RangeInclusive<i64>,
) -> Vec<i64> {
    (0..len).map(|_| rng.random_range(range.clone())).collect()
}

/// A uniformly chosen non-empty closed interval `[l, r]` inside `0..len`.
pub fn random_closed_range<R: Rng + ?Sized>(rng: &mut R, len: usize) -> (usize, usize) {
    let l = rng.random_range(0..len);
    let r = rng.random_range(l..len);
    (l, r)
}
