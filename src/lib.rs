//! This crate simulates a toy binary-communication scheme over a redundancy-based channel. Each
//! bit is carried by a pair of equal-size groups of units: the group indicating the bit value is
//! fully set, and the other is left reset. Measuring a set unit always yields `One`, while
//! measuring a reset unit yields a fair coin flip. The receiver decides in favor of whichever
//! group measures as all ones; if both do, the bit is ambiguous. This happens with probability
//! `0.5^G` per bit for groups of `G` units, which the simulation compares against the empirical
//! ambiguity rate over many random messages.

#![warn(
    clippy::complexity,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_allocation,
    unused_import_braces,
    unused_qualifications
)]

pub mod channel;
mod common;
mod group;
pub mod sim;
pub mod utils;

pub use channel::{receive_bit, send_bit, GroupPair, Outcome};
pub use common::{Bit, Error};
pub use group::Group;
