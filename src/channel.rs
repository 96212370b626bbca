//! Encoder and decoder for the dual-set redundancy channel
//!
//! A bit is sent by fully setting the group that indicates its value and resetting the other.
//! The receiver measures both groups and reads each one as either all ones or containing a zero.
//! A set group can never contain a zero after measurement, so a non-ambiguous decision is always
//! correct; a reset group measures as all ones with probability `0.5^G` for groups of `G` units,
//! in which case the decision is ambiguous.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Bit, Error, Group};

/// Outcome of receiving one bit
#[derive(Clone, Eq, Hash, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub enum Outcome {
    /// Exactly one group measured as all ones, indicating the given bit
    Decoded(Bit),
    /// Both groups measured as all ones
    Ambiguous,
    /// Neither group measured as all ones
    NoSignal,
}

impl Outcome {
    /// Returns numeric code of the outcome: the bit value for `Decoded`, `-1` for `Ambiguous` and
    /// `-2` for `NoSignal`.
    #[must_use]
    pub fn code(self) -> i8 {
        match self {
            Outcome::Decoded(bit) => bit as i8,
            Outcome::Ambiguous => -1,
            Outcome::NoSignal => -2,
        }
    }

    /// Returns decoded bit, if any.
    #[must_use]
    pub fn bit(self) -> Option<Bit> {
        match self {
            Outcome::Decoded(bit) => Some(bit),
            Outcome::Ambiguous | Outcome::NoSignal => None,
        }
    }

    /// Returns bit to be written into a reconstructed message. Outcomes without a decoded bit have
    /// a nonzero code and are written as `One`.
    #[must_use]
    pub fn recorded_bit(self) -> Bit {
        self.bit().unwrap_or(Bit::One)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Decoded(Bit::Zero) => write!(f, "0"),
            Outcome::Decoded(Bit::One) => write!(f, "1"),
            Outcome::Ambiguous => write!(f, "ambiguous"),
            Outcome::NoSignal => write!(f, "no signal"),
        }
    }
}

/// Reading of a measured group
#[derive(Clone, Eq, PartialEq, Debug, Copy)]
pub enum Reading {
    /// Every measured value is `One`
    AllOnes,
    /// At least one measured value is `Zero`
    ContainsZero,
}

impl Reading {
    /// Returns reading of given measured values.
    #[must_use]
    pub fn of(measured: &[Bit]) -> Self {
        if measured.iter().all(|&b| b == Bit::One) {
            Reading::AllOnes
        } else {
            Reading::ContainsZero
        }
    }
}

/// Pair of groups used to send one bit at a time, along with measurement buffers
///
/// The groups are reused for every bit; [`send_bit`] overwrites both of them.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct GroupPair {
    /// Group that is set to indicate `Zero`
    for_zero: Group,
    /// Group that is set to indicate `One`
    for_one: Group,
    /// Buffer for measured values of `for_zero`
    measured_for_zero: Vec<Bit>,
    /// Buffer for measured values of `for_one`
    measured_for_one: Vec<Bit>,
}

impl GroupPair {
    /// Returns pair of reset groups with given number of units each.
    ///
    /// # Errors
    ///
    /// Returns an error if `group_size` is `0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dualset::GroupPair;
    ///
    /// let pair = GroupPair::new(32)?;
    /// assert_eq!(pair.group_size(), 32);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(group_size: usize) -> Result<Self, Error> {
        Ok(Self {
            for_zero: Group::new(group_size)?,
            for_one: Group::new(group_size)?,
            measured_for_zero: Vec::with_capacity(group_size),
            measured_for_one: Vec::with_capacity(group_size),
        })
    }

    /// Returns number of units in each group.
    #[must_use]
    pub fn group_size(&self) -> usize {
        self.for_zero.size()
    }

    /// Returns group indicating `Zero`.
    #[must_use]
    pub fn group_for_zero(&self) -> &Group {
        &self.for_zero
    }

    /// Returns group indicating `One`.
    #[must_use]
    pub fn group_for_one(&self) -> &Group {
        &self.for_one
    }

    /// Encodes a bit into the pair (see [`send_bit`]).
    ///
    /// # Errors
    ///
    /// Never returns an error in practice, since both groups of a pair have the same size.
    pub fn send(&mut self, bit: Bit) -> Result<(), Error> {
        send_bit(bit, &mut self.for_zero, &mut self.for_one)
    }
}

/// Encodes a bit into a pair of groups.
///
/// # Parameters
///
/// - `bit`: Bit to be sent.
///
/// - `group_for_zero`: Group indicating `Zero`. Set if `bit` is `Zero`, reset otherwise.
///
/// - `group_for_one`: Group indicating `One`. Set if `bit` is `One`, reset otherwise.
///
/// Both groups are overwritten regardless of their previous contents.
///
/// # Errors
///
/// Returns an error if the two groups differ in size.
///
/// # Examples
/// ```
/// use dualset::{send_bit, Bit, Group};
///
/// let mut group_for_zero = Group::new(8)?;
/// let mut group_for_one = Group::new(8)?;
/// send_bit(Bit::One, &mut group_for_zero, &mut group_for_one)?;
/// assert!(group_for_zero.is_all_reset());
/// assert!(group_for_one.is_all_set());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn send_bit(
    bit: Bit,
    group_for_zero: &mut Group,
    group_for_one: &mut Group,
) -> Result<(), Error> {
    if group_for_zero.size() != group_for_one.size() {
        return Err(Error::InvalidInput(format!(
            "Groups must have equal sizes (found {} and {})",
            group_for_zero.size(),
            group_for_one.size()
        )));
    }
    group_for_zero.reset_all();
    group_for_one.reset_all();
    match bit {
        Bit::Zero => group_for_zero.set_all(),
        Bit::One => group_for_one.set_all(),
    }
    Ok(())
}

/// Measures a pair of groups and returns the outcome.
///
/// # Parameters
///
/// - `pair`: Groups carrying the bit. Both groups are measured afresh on every call.
///
/// - `rng`: Random number generator to be used for measurement.
///
/// # Returns
///
/// - `outcome`: See [`classify`].
///
/// # Examples
/// ```
/// use dualset::{receive_bit, Bit, GroupPair, Outcome};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(5);
/// let mut pair = GroupPair::new(32)?;
/// pair.send(Bit::Zero)?;
/// let outcome = receive_bit(&mut pair, &mut rng);
/// assert_ne!(outcome, Outcome::Decoded(Bit::One));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn receive_bit<R: Rng + ?Sized>(pair: &mut GroupPair, rng: &mut R) -> Outcome {
    pair.for_zero.measure(rng, &mut pair.measured_for_zero);
    pair.for_one.measure(rng, &mut pair.measured_for_one);
    classify(
        Reading::of(&pair.measured_for_zero),
        Reading::of(&pair.measured_for_one),
    )
}

/// Returns outcome for given readings of the two groups.
///
/// | Group for `Zero` | Group for `One` | Outcome |
/// |---|---|---|
/// | all ones | all ones | `Ambiguous` |
/// | contains zero | contains zero | `NoSignal` |
/// | all ones | contains zero | `Decoded(Zero)` |
/// | contains zero | all ones | `Decoded(One)` |
#[must_use]
pub fn classify(for_zero: Reading, for_one: Reading) -> Outcome {
    match (for_zero, for_one) {
        (Reading::AllOnes, Reading::AllOnes) => Outcome::Ambiguous,
        (Reading::ContainsZero, Reading::ContainsZero) => Outcome::NoSignal,
        (Reading::AllOnes, Reading::ContainsZero) => Outcome::Decoded(Bit::Zero),
        (Reading::ContainsZero, Reading::AllOnes) => Outcome::Decoded(Bit::One),
    }
}
