//! # Some useful functions for simulating the channel
//!
//! The [`random_bit`] function returns a single fair coin flip; the [`random_bits`] function
//! returns a given number of random bits (a random message); and the [`error_count`] function
//! returns the number of errors in a sequence with respect to a reference sequence.
//!
//! All randomness comes from a caller-supplied random number generator, so that seeded runs are
//! reproducible.
//!
//! # Examples
//!
//! The code below illustrates the usage of the functions in this module.
//! ```
//! use dualset::utils;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let message = utils::random_bits(8, &mut rng);
//! let copy = message.clone();
//! assert_eq!(utils::error_count(&copy, &message), 0);
//! ```

use rand::Rng;

use crate::Bit;

/// Returns a uniformly random bit.
///
/// # Parameters
///
/// - `rng`: Random number generator to be used.
///
/// # Returns
///
/// - `bit`: `Zero` or `One`, each with probability `1/2`, independently of all previous calls.
pub fn random_bit<R: Rng + ?Sized>(rng: &mut R) -> Bit {
    if rng.random_bool(0.5) {
        Bit::One
    } else {
        Bit::Zero
    }
}

/// Returns given number of random bits.
///
/// # Parameters
///
/// - `num_bits`: Number of random bits to be generated.
///
/// - `rng`: Random number generator to be used.
///
/// # Returns
///
/// - `bits`: Random bits.
pub fn random_bits<R: Rng + ?Sized>(num_bits: usize, rng: &mut R) -> Vec<Bit> {
    (0 .. num_bits).map(|_| random_bit(rng)).collect()
}

/// Returns number of errors in a sequence with respect to a reference sequence.
///
/// # Parameters
///
/// - `seq`: Sequence in which errors must be counted.
///
/// - `ref_seq`: Reference sequence to which the given sequence is compared.
///
/// # Returns
///
/// - `err_count`: Number of positions in which the two sequences differ. If they are of different
///   lengths, then the longer sequence is effectively truncated to the length of the shorter one.
pub fn error_count<T: PartialEq>(seq: &[T], ref_seq: &[T]) -> usize {
    ref_seq
        .iter()
        .zip(seq.iter())
        .filter(|&(x, y)| x != y)
        .count()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use Bit::{One, Zero};

    #[test]
    fn test_random_bit() {
        let mut rng = StdRng::seed_from_u64(1);
        let num_draws = 10000;
        let num_ones = (0 .. num_draws)
            .filter(|_| random_bit(&mut rng) == One)
            .count();
        assert!(num_ones > 9 * num_draws / 20 && num_ones < 11 * num_draws / 20);
    }

    #[test]
    fn test_random_bits() {
        let mut rng = StdRng::seed_from_u64(2);
        let num_bits = 0;
        assert!(random_bits(num_bits, &mut rng).is_empty());
        let num_bits = 10000;
        let bits = random_bits(num_bits, &mut rng);
        assert_eq!(bits.len(), num_bits);
        let num_zeros = bits.iter().filter(|&b| *b == Zero).count();
        let num_ones = bits.iter().filter(|&b| *b == One).count();
        assert!(num_zeros > 9 * num_bits / 20 && num_ones > 9 * num_bits / 20);
    }

    #[test]
    fn test_random_bits_with_same_seed() {
        let bits = random_bits(64, &mut StdRng::seed_from_u64(3));
        assert_eq!(bits, random_bits(64, &mut StdRng::seed_from_u64(3)));
    }

    #[test]
    fn test_error_count() {
        assert_eq!(error_count(&[], &[One, Zero]), 0);
        assert_eq!(error_count(&[One, Zero], &[]), 0);
        // Longer `seq`
        let ref_seq = [One, Zero, Zero, One, One, One, Zero, Zero];
        let seq = [One, One, Zero, Zero, One, One, Zero, Zero, Zero, One];
        assert_eq!(error_count(&seq, &ref_seq), 2);
        // Shorter `seq`
        let ref_seq = [One, Zero, Zero, One, One, One, Zero, Zero, Zero, One];
        let seq = [One, One, Zero, Zero, One, One, Zero, Zero];
        assert_eq!(error_count(&seq, &ref_seq), 2);
    }
}
