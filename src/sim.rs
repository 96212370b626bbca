//! Simulator to evaluate ambiguity of the dual-set redundancy channel
//!
//! Each trial draws a random message, sends it bit by bit over a [`GroupPair`], and classifies
//! both the individual bits and the message as a whole. Bit outcomes are correct, ambiguous or
//! incorrect; a message is correct if it is reconstructed exactly, ambiguous if it is not but some
//! bit was ambiguous, and incorrect otherwise.

use std::fmt;
use std::fs::File;
use std::io::BufWriter;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{receive_bit, utils, Bit, Error, GroupPair, Outcome};

/// Default number of units per group
pub const GROUP_SIZE: usize = 32;

/// Default number of messages per simulation
pub const NUM_MESSAGES: u32 = 100_000;

/// Default number of bits per message
pub const MESSAGE_SIZE: usize = 8;

/// Number of messages simulated with one random number generator in [`run_sim_parallel`]
const NUM_MESSAGES_PER_CHUNK: u32 = 10_000;

/// Parameters for simulation of the dual-set redundancy channel
#[derive(Clone, Eq, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub struct SimParams {
    /// Number of units per group
    pub group_size: usize,
    /// Number of messages to be sent
    pub num_messages: u32,
    /// Number of bits per message
    pub message_size: usize,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            group_size: GROUP_SIZE,
            num_messages: NUM_MESSAGES,
            message_size: MESSAGE_SIZE,
        }
    }
}

impl SimParams {
    /// Checks validity of simulation parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is `0`, or if the total number of units used by the
    /// simulation does not fit in a `u64`.
    pub fn check(&self) -> Result<(), Error> {
        if self.group_size == 0 {
            return Err(Error::InvalidInput(
                "Number of units per group cannot be zero".to_string(),
            ));
        }
        if self.num_messages == 0 {
            return Err(Error::InvalidInput(
                "Number of messages cannot be zero".to_string(),
            ));
        }
        if self.message_size == 0 {
            return Err(Error::InvalidInput(
                "Number of bits per message cannot be zero".to_string(),
            ));
        }
        if self.checked_num_units().is_none() {
            return Err(Error::InvalidInput(format!(
                "Total number of units for {} messages of {} bits with {} units per group \
                 overflows",
                self.num_messages, self.message_size, self.group_size
            )));
        }
        Ok(())
    }

    /// Returns total number of bits sent.
    #[must_use]
    pub fn num_bits(&self) -> u64 {
        u64::from(self.num_messages).saturating_mul(to_u64(self.message_size))
    }

    /// Returns total number of units used (one group per bit).
    #[must_use]
    pub fn num_units(&self) -> u64 {
        self.num_bits().saturating_mul(to_u64(self.group_size))
    }

    /// Returns theoretical probability that a bit is ambiguous, i.e., that a reset group of
    /// `group_size` units measures as all ones.
    #[must_use]
    pub fn ambiguity_probability(&self) -> f64 {
        i32::try_from(self.group_size).map_or(0.0, |n| 0.5f64.powi(n))
    }

    /// Returns total number of units used, or `None` on overflow.
    fn checked_num_units(&self) -> Option<u64> {
        u64::from(self.num_messages)
            .checked_mul(u64::try_from(self.message_size).ok()?)?
            .checked_mul(u64::try_from(self.group_size).ok()?)
    }
}

/// Numbers of correct, ambiguous and incorrect items
#[derive(Clone, Eq, PartialEq, Debug, Default, Copy, Deserialize, Serialize)]
pub struct Counts {
    /// Number of correct items
    pub correct: u64,
    /// Number of ambiguous items
    pub ambiguous: u64,
    /// Number of incorrect items
    pub incorrect: u64,
}

impl Counts {
    /// Returns total number of items.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.correct + self.ambiguous + self.incorrect
    }

    /// Adds counts from another instance.
    fn add(&mut self, other: &Counts) {
        self.correct += other.correct;
        self.ambiguous += other.ambiguous;
        self.incorrect += other.incorrect;
    }
}

/// Results from simulation of the dual-set redundancy channel
#[derive(Clone, Eq, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub struct SimResults {
    /// Simulation parameters
    pub params: SimParams,
    /// Message-level counts
    pub messages: Counts,
    /// Bit-level counts
    pub bits: Counts,
}

impl SimResults {
    /// Returns initialized simulation results.
    #[must_use]
    pub fn new(params: &SimParams) -> Self {
        Self {
            params: *params,
            messages: Counts::default(),
            bits: Counts::default(),
        }
    }

    /// Updates bit-level counts given the bit sent and the outcome of receiving it. Returns `true`
    /// if the outcome is ambiguous.
    pub fn record_bit(&mut self, bit: Bit, outcome: Outcome) -> bool {
        match outcome {
            Outcome::Ambiguous => {
                self.bits.ambiguous += 1;
                return true;
            }
            Outcome::Decoded(bit_hat) if bit_hat == bit => self.bits.correct += 1,
            Outcome::Decoded(_) | Outcome::NoSignal => self.bits.incorrect += 1,
        }
        false
    }

    /// Updates message-level counts given the message sent, the reconstructed message, and
    /// whether any bit of the latter was ambiguous.
    pub fn record_message(&mut self, message: &[Bit], message_hat: &[Bit], ambiguous: bool) {
        if message.len() == message_hat.len() && utils::error_count(message_hat, message) == 0 {
            self.messages.correct += 1;
        } else if ambiguous {
            self.messages.ambiguous += 1;
        } else {
            self.messages.incorrect += 1;
        }
    }

    /// Merges results of another simulation with the same group and message sizes.
    ///
    /// # Errors
    ///
    /// Returns an error if the group sizes or message sizes of the two simulations differ, or if
    /// the total number of messages does not fit in a `u32`.
    pub fn merge(&mut self, other: &SimResults) -> Result<(), Error> {
        if self.params.group_size != other.params.group_size
            || self.params.message_size != other.params.message_size
        {
            return Err(Error::InvalidInput(format!(
                "Cannot merge results for group/message sizes {}/{} and {}/{}",
                self.params.group_size,
                self.params.message_size,
                other.params.group_size,
                other.params.message_size
            )));
        }
        self.params.num_messages = self
            .params
            .num_messages
            .checked_add(other.params.num_messages)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "Total number of messages ({} + {}) overflows",
                    self.params.num_messages, other.params.num_messages
                ))
            })?;
        self.messages.add(&other.messages);
        self.bits.add(&other.bits);
        Ok(())
    }

    /// Returns fraction of messages that were ambiguous.
    #[must_use]
    pub fn ambiguous_message_rate(&self) -> f64 {
        ratio(self.messages.ambiguous, self.messages.total())
    }

    /// Returns fraction of bits that were ambiguous.
    #[must_use]
    pub fn ambiguous_bit_rate(&self) -> f64 {
        ratio(self.bits.ambiguous, self.bits.total())
    }

    /// Returns fraction of bits that were incorrect.
    #[must_use]
    pub fn incorrect_bit_rate(&self) -> f64 {
        ratio(self.bits.incorrect, self.bits.total())
    }

    /// Returns expected number of ambiguous bits.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn expected_ambiguous_bits(&self) -> f64 {
        self.params.ambiguity_probability() * self.params.num_bits() as f64
    }

    /// Returns `true` if all messages and bits have been accounted for.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.messages.total() == u64::from(self.params.num_messages)
            && self.bits.total() == self.params.num_bits()
    }
}

impl fmt::Display for SimResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of units used: {}", self.params.num_units())?;
        writeln!(f, "Number of messages sent: {}", self.params.num_messages)?;
        writeln!(f, "Number of bits sent: {}", self.params.num_bits())?;
        writeln!(f, "Message size: {}", self.params.message_size)?;
        writeln!(f, "Group size: {}", self.params.group_size)?;
        writeln!(f)?;
        writeln!(f, "Correct messages: {}", self.messages.correct)?;
        writeln!(f, "Ambiguous messages: {}", self.messages.ambiguous)?;
        writeln!(f, "Incorrect messages: {}", self.messages.incorrect)?;
        writeln!(
            f,
            "Percentage of ambiguous messages: {}%",
            100.0 * self.ambiguous_message_rate()
        )?;
        writeln!(f)?;
        writeln!(f, "Correct bits: {}", self.bits.correct)?;
        writeln!(f, "Ambiguous bits: {}", self.bits.ambiguous)?;
        writeln!(f, "Incorrect bits: {} (control)", self.bits.incorrect)?;
        writeln!(
            f,
            "Percentage of ambiguous bits: {}%",
            100.0 * self.ambiguous_bit_rate()
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "Theoretical percentage of ambiguous bits: {:e}%",
            100.0 * self.params.ambiguity_probability()
        )?;
        write!(
            f,
            "Or {:e} out of {} bits",
            self.expected_ambiguous_bits(),
            self.params.num_bits()
        )
    }
}

/// Sends a message over the channel, one bit at a time.
///
/// # Parameters
///
/// - `message`: Bits to be sent.
///
/// - `pair`: Groups to be reused for sending every bit.
///
/// - `results`: Simulation results in which bit-level counts are to be updated.
///
/// - `rng`: Random number generator to be used for measurement.
///
/// # Returns
///
/// - `message_hat`: Reconstructed message. A bit whose outcome carries no decoded bit is
///   reconstructed as `One`.
///
/// - `ambiguous`: `true` if any bit of the message was ambiguous.
///
/// # Errors
///
/// Returns an error if encoding a bit into `pair` fails.
///
/// # Examples
/// ```
/// use dualset::sim::{simulate_message, SimParams, SimResults};
/// use dualset::{Bit, GroupPair};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(9);
/// let params = SimParams::default();
/// let mut pair = GroupPair::new(params.group_size)?;
/// let mut results = SimResults::new(&params);
/// let message = [Bit::One, Bit::Zero, Bit::Zero, Bit::One];
/// let (message_hat, ambiguous) = simulate_message(&message, &mut pair, &mut results, &mut rng)?;
/// if !ambiguous {
///     assert_eq!(message_hat, message);
/// }
/// assert_eq!(results.bits.total(), 4);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn simulate_message<R: Rng + ?Sized>(
    message: &[Bit],
    pair: &mut GroupPair,
    results: &mut SimResults,
    rng: &mut R,
) -> Result<(Vec<Bit>, bool), Error> {
    let mut message_hat = Vec::with_capacity(message.len());
    let mut ambiguous = false;
    for &bit in message {
        pair.send(bit)?;
        let outcome = receive_bit(pair, rng);
        message_hat.push(outcome.recorded_bit());
        ambiguous |= results.record_bit(bit, outcome);
    }
    Ok((message_hat, ambiguous))
}

/// Runs simulation of the dual-set redundancy channel.
///
/// # Parameters
///
/// - `params`: Parameters for the simulation.
///
/// - `rng`: Random number generator to be used for messages and measurements.
///
/// # Returns
///
/// - `results`: Results from the simulation.
///
/// # Errors
///
/// Returns an error if `params` is invalid.
///
/// # Examples
/// ```
/// use dualset::sim::{run_sim, SimParams};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let params = SimParams {
///     group_size: 32,
///     num_messages: 100,
///     message_size: 8,
/// };
/// let results = run_sim(&params, &mut StdRng::seed_from_u64(0))?;
/// assert_eq!(results.messages.total(), 100);
/// assert_eq!(results.bits.total(), 800);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn run_sim<R: Rng + ?Sized>(params: &SimParams, rng: &mut R) -> Result<SimResults, Error> {
    params.check()?;
    let mut pair = GroupPair::new(params.group_size)?;
    let mut results = SimResults::new(params);
    for _ in 0 .. params.num_messages {
        let message = utils::random_bits(params.message_size, rng);
        let (message_hat, ambiguous) = simulate_message(&message, &mut pair, &mut results, rng)?;
        results.record_message(&message, &message_hat, ambiguous);
    }
    Ok(results)
}

/// Runs simulation of the dual-set redundancy channel on all available threads.
///
/// The messages are split into chunks, each simulated with its own random number generator
/// seeded from `seed`, so the results depend only on `params` and `seed`.
///
/// # Errors
///
/// Returns an error if `params` is invalid.
pub fn run_sim_parallel(params: &SimParams, seed: u64) -> Result<SimResults, Error> {
    params.check()?;
    let mut seeder = StdRng::seed_from_u64(seed);
    let all_chunk_params: Vec<(SimParams, u64)> = chunk_sizes(params.num_messages)
        .into_iter()
        .map(|num_messages| {
            (
                SimParams {
                    num_messages,
                    ..*params
                },
                seeder.random(),
            )
        })
        .collect();
    let all_chunk_results = all_chunk_params
        .into_par_iter()
        .map(|(chunk_params, chunk_seed)| {
            run_sim(&chunk_params, &mut StdRng::seed_from_u64(chunk_seed))
        })
        .collect::<Result<Vec<SimResults>, Error>>()?;
    let mut results = SimResults::new(&SimParams {
        num_messages: 0,
        ..*params
    });
    for chunk_results in &all_chunk_results {
        results.merge(chunk_results)?;
    }
    Ok(results)
}

/// Runs simulations for several parameter sets and saves results to a JSON file.
///
/// # Parameters
///
/// - `all_params`: Parameters for each simulation.
///
/// - `seed`: Seed from which the seed of each simulation is derived.
///
/// - `json_filename`: Name of JSON file to which results are to be saved.
///
/// # Returns
///
/// - `all_results`: Results from each simulation, in the order of `all_params`.
///
/// # Errors
///
/// Returns an error if any parameter set is invalid, or if the results cannot be saved.
pub fn run_sims(
    all_params: &[SimParams],
    seed: u64,
    json_filename: &str,
) -> Result<Vec<SimResults>, Error> {
    for params in all_params {
        params.check()?;
    }
    let mut seeder = StdRng::seed_from_u64(seed);
    let mut all_results = Vec::with_capacity(all_params.len());
    for params in all_params {
        let results = run_sim_parallel(params, seeder.random())?;
        eprintln!(
            "Group size {:>3}: {} of {} bits ambiguous ({:e} vs. {:e} theoretical), {} incorrect",
            params.group_size,
            results.bits.ambiguous,
            results.bits.total(),
            results.ambiguous_bit_rate(),
            params.ambiguity_probability(),
            results.bits.incorrect,
        );
        all_results.push(results);
    }
    save_all_results(&all_results, json_filename)?;
    Ok(all_results)
}

/// Saves simulation results to a JSON file.
fn save_all_results(all_results: &[SimResults], json_filename: &str) -> Result<(), Error> {
    let writer = BufWriter::new(File::create(json_filename)?);
    serde_json::to_writer_pretty(writer, all_results)?;
    Ok(())
}

/// Returns number of messages in each chunk for parallel simulation.
fn chunk_sizes(num_messages: u32) -> Vec<u32> {
    let num_full_chunks = (num_messages / NUM_MESSAGES_PER_CHUNK) as usize;
    let mut sizes = vec![NUM_MESSAGES_PER_CHUNK; num_full_chunks];
    if num_messages % NUM_MESSAGES_PER_CHUNK > 0 {
        sizes.push(num_messages % NUM_MESSAGES_PER_CHUNK);
    }
    sizes
}

/// Returns `num / den`, or `0.0` if `den` is `0`.
#[allow(clippy::cast_precision_loss)]
fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Converts `usize` to `u64`, saturating on (theoretical) overflow.
fn to_u64(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}


#[cfg(test)]
mod tests_of_sim_results {
    use float_eq::assert_float_eq;

    use super::*;
    use Bit::{One, Zero};

    fn params_for_test() -> SimParams {
        SimParams {
            group_size: 4,
            num_messages: 2,
            message_size: 3,
        }
    }

    #[test]
    fn test_record_bit() {
        let mut results = SimResults::new(&params_for_test());
        assert!(!results.record_bit(Zero, Outcome::Decoded(Zero)));
        assert!(!results.record_bit(One, Outcome::Decoded(One)));
        assert!(!results.record_bit(One, Outcome::Decoded(Zero)));
        assert!(results.record_bit(Zero, Outcome::Ambiguous));
        assert!(!results.record_bit(Zero, Outcome::NoSignal));
        assert_eq!(
            results.bits,
            Counts {
                correct: 2,
                ambiguous: 1,
                incorrect: 2,
            }
        );
        assert_eq!(results.messages, Counts::default());
    }

    #[test]
    fn test_record_message() {
        let mut results = SimResults::new(&params_for_test());
        results.record_message(&[One, Zero, One], &[One, Zero, One], false);
        // An ambiguous bit recorded as `One` can still reconstruct the message
        results.record_message(&[One, Zero, One], &[One, Zero, One], true);
        results.record_message(&[Zero, Zero, One], &[One, Zero, One], true);
        results.record_message(&[Zero, Zero, One], &[One, Zero, One], false);
        assert_eq!(
            results.messages,
            Counts {
                correct: 2,
                ambiguous: 1,
                incorrect: 1,
            }
        );
    }

    #[test]
    fn test_merge() {
        let mut results = SimResults::new(&params_for_test());
        results.bits.correct = 5;
        results.bits.ambiguous = 1;
        results.messages.correct = 1;
        results.messages.ambiguous = 1;
        let mut other = SimResults::new(&params_for_test());
        other.bits.correct = 6;
        other.messages.correct = 2;
        results.merge(&other).unwrap();
        assert_eq!(results.params.num_messages, 4);
        assert_eq!(results.bits.correct, 11);
        assert_eq!(results.bits.ambiguous, 1);
        assert_eq!(results.messages.correct, 3);
        assert!(results.is_complete());
        // Mismatched sizes
        let other = SimResults::new(&SimParams {
            group_size: 5,
            ..params_for_test()
        });
        assert!(results.merge(&other).is_err());
    }

    #[test]
    fn test_merge_with_too_many_messages() {
        let params = SimParams {
            num_messages: u32::MAX,
            ..params_for_test()
        };
        let mut results = SimResults::new(&params);
        results.messages.correct = 7;
        let other = SimResults::new(&params);
        assert!(results.merge(&other).is_err());
        // Failed merge leaves results unchanged
        assert_eq!(results.params.num_messages, u32::MAX);
        assert_eq!(results.messages.correct, 7);
    }

    #[test]
    fn test_rates() {
        let mut results = SimResults::new(&params_for_test());
        assert_float_eq!(results.ambiguous_bit_rate(), 0.0, abs <= 1e-12);
        results.bits = Counts {
            correct: 4,
            ambiguous: 1,
            incorrect: 1,
        };
        results.messages = Counts {
            correct: 1,
            ambiguous: 1,
            incorrect: 0,
        };
        assert_float_eq!(results.ambiguous_bit_rate(), 1.0 / 6.0, abs <= 1e-12);
        assert_float_eq!(results.incorrect_bit_rate(), 1.0 / 6.0, abs <= 1e-12);
        assert_float_eq!(results.ambiguous_message_rate(), 0.5, abs <= 1e-12);
        assert_float_eq!(results.expected_ambiguous_bits(), 6.0 / 16.0, abs <= 1e-12);
        assert!(results.is_complete());
    }

    #[test]
    fn test_display() {
        let report = SimResults::new(&SimParams::default()).to_string();
        assert!(report.contains("Number of units used: 25600000"));
        assert!(report.contains("Number of bits sent: 800000"));
        assert!(report.contains("Ambiguous bits: 0"));
        assert!(report.contains("Theoretical percentage of ambiguous bits"));
    }
}
