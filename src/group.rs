//! Group of redundant units carrying one side of an encoded bit

use rand::Rng;

use crate::{utils, Bit, Error};

/// Fixed-size group of binary units
///
/// A unit is either set (`One`) or reset (`Zero`). Measuring a set unit reveals `One`; measuring
/// a reset unit reveals nothing about it and yields a fresh coin flip instead.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Group {
    /// State of each unit
    units: Vec<Bit>,
}

impl Group {
    /// Returns group of given size with all units reset.
    ///
    /// # Parameters
    ///
    /// - `size`: Number of units in the group.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is `0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dualset::Group;
    ///
    /// let group = Group::new(32)?;
    /// assert!(group.is_all_reset());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(size: usize) -> Result<Self, Error> {
        if size == 0 {
            return Err(Error::InvalidInput(
                "Number of units in a group must be a positive integer".to_string(),
            ));
        }
        Ok(Self {
            units: vec![Bit::Zero; size],
        })
    }

    /// Returns number of units in the group.
    #[must_use]
    pub fn size(&self) -> usize {
        self.units.len()
    }

    /// Returns state of each unit.
    #[must_use]
    pub fn units(&self) -> &[Bit] {
        &self.units
    }

    /// Sets all units.
    pub fn set_all(&mut self) {
        self.units.fill(Bit::One);
    }

    /// Resets all units.
    pub fn reset_all(&mut self) {
        self.units.fill(Bit::Zero);
    }

    /// Returns `true` if every unit is set.
    #[must_use]
    pub fn is_all_set(&self) -> bool {
        self.units.iter().all(|&u| u == Bit::One)
    }

    /// Returns `true` if every unit is reset.
    #[must_use]
    pub fn is_all_reset(&self) -> bool {
        self.units.iter().all(|&u| u == Bit::Zero)
    }

    /// Measures every unit of the group.
    ///
    /// # Parameters
    ///
    /// - `rng`: Random number generator to be used for reset units.
    ///
    /// - `output`: Buffer for measured values (any pre-existing contents will be cleared). On
    ///   return it holds one value per unit, in unit order: `One` for a set unit, and an
    ///   independent uniformly random bit for a reset unit. Reset units are resampled on every
    ///   call.
    ///
    /// # Examples
    ///
    /// ```
    /// use dualset::{Bit, Group};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(0);
    /// let mut group = Group::new(4)?;
    /// group.set_all();
    /// let mut output = Vec::new();
    /// group.measure(&mut rng, &mut output);
    /// assert_eq!(output, [Bit::One; 4]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn measure<R: Rng + ?Sized>(&self, rng: &mut R, output: &mut Vec<Bit>) {
        output.clear();
        output.extend(self.units.iter().map(|&unit| match unit {
            Bit::One => Bit::One,
            Bit::Zero => utils::random_bit(rng),
        }));
    }
}

#[cfg(test)]
mod tests_of_group {
    use float_eq::assert_float_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_new() {
        // Invalid input
        assert!(Group::new(0).is_err());
        // Valid input
        let group = Group::new(5).unwrap();
        assert_eq!(group.size(), 5);
        assert_eq!(group.units(), [Bit::Zero; 5]);
    }

    #[test]
    fn test_set_all_and_reset_all() {
        let mut group = Group::new(6).unwrap();
        group.set_all();
        assert!(group.is_all_set());
        assert!(!group.is_all_reset());
        group.reset_all();
        assert!(group.is_all_reset());
        assert!(!group.is_all_set());
    }

    #[test]
    fn test_measure_all_set() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut group = Group::new(32).unwrap();
        group.set_all();
        let mut output = vec![Bit::Zero; 3];
        for _ in 0 .. 1000 {
            group.measure(&mut rng, &mut output);
            assert_eq!(output, [Bit::One; 32]);
        }
    }

    #[test]
    fn test_measure_partially_set() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut group = Group::new(3).unwrap();
        group.units[1] = Bit::One;
        let mut output = Vec::new();
        for _ in 0 .. 100 {
            group.measure(&mut rng, &mut output);
            assert_eq!(output.len(), 3);
            assert_eq!(output[1], Bit::One);
        }
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_measure_all_reset() {
        let mut rng = StdRng::seed_from_u64(13);
        let group = Group::new(4).unwrap();
        let mut output = Vec::new();
        let num_trials = 100_000;
        let mut num_all_ones = 0;
        let mut num_ones = 0;
        for _ in 0 .. num_trials {
            group.measure(&mut rng, &mut output);
            let ones = output.iter().filter(|&&b| b == Bit::One).count();
            num_ones += ones;
            if ones == group.size() {
                num_all_ones += 1;
            }
        }
        let all_ones_rate = f64::from(num_all_ones) / f64::from(num_trials);
        assert_float_eq!(all_ones_rate, 0.5f64.powi(4), r2nd <= 0.1);
        let ones_rate = num_ones as f64 / f64::from(4 * num_trials);
        assert_float_eq!(ones_rate, 0.5, abs <= 0.01);
        // Measurement does not change the group itself
        assert!(group.is_all_reset());
    }

    #[test]
    fn test_measure_resamples_reset_units() {
        let mut rng = StdRng::seed_from_u64(14);
        let group = Group::new(64).unwrap();
        let mut first = Vec::new();
        let mut second = Vec::new();
        group.measure(&mut rng, &mut first);
        group.measure(&mut rng, &mut second);
        assert_ne!(first, second);
    }
}
