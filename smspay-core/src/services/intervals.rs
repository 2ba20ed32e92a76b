// src/services/intervals.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smspay_common::traits::purchase_traits::IntervalSource;
use crate::Error;

/// Draws pacing intervals uniformly from `[min_secs, max_secs]`.
pub struct UniformIntervalGenerator {
    rng: StdRng,
    min_secs: u32,
    max_secs: u32,
}

impl UniformIntervalGenerator {
    /// A seeded generator always yields the same sequence.
    pub fn seeded(min_secs: u32, max_secs: u32, seed: u64) -> Result<Self, Error> {
        Self::validate(min_secs, max_secs)?;
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            min_secs,
            max_secs,
        })
    }

    pub fn from_os_rng(min_secs: u32, max_secs: u32) -> Result<Self, Error> {
        Self::validate(min_secs, max_secs)?;
        Ok(Self {
            rng: StdRng::from_os_rng(),
            min_secs,
            max_secs,
        })
    }

    fn validate(min_secs: u32, max_secs: u32) -> Result<(), Error> {
        if min_secs == 0 || min_secs > max_secs {
            return Err(Error::Config(format!(
                "invalid interval range [{min_secs}, {max_secs}]: need 1 <= min <= max"
            )));
        }
        Ok(())
    }
}

impl IntervalSource for UniformIntervalGenerator {
    fn next_interval(&mut self) -> u32 {
        self.rng.random_range(self.min_secs..=self.max_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = UniformIntervalGenerator::seeded(5, 30, 42).unwrap();
        let mut b = UniformIntervalGenerator::seeded(5, 30, 42).unwrap();
        let xs: Vec<u32> = (0..20).map(|_| a.next_interval()).collect();
        let ys: Vec<u32> = (0..20).map(|_| b.next_interval()).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|&x| (5..=30).contains(&x)));
    }

    #[test]
    fn degenerate_range_is_constant() {
        let mut g = UniformIntervalGenerator::seeded(7, 7, 1).unwrap();
        assert_eq!(g.next_interval(), 7);
    }

    #[test]
    fn rejects_zero_and_inverted_ranges() {
        assert!(UniformIntervalGenerator::seeded(0, 5, 1).is_err());
        assert!(UniformIntervalGenerator::seeded(9, 5, 1).is_err());
    }
}
