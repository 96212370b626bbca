//! This crate simulates the ambiguity of a dual-set redundancy channel, in which each bit is
//! carried by a pair of groups of units and ambiguity arises when a reset group happens to measure
//! as all ones. Simulation parameters are specified on the command line, a report for each
//! parameter set is printed, and simulation results are saved to a JSON file.
//!
//! Build the executable with `cargo build --release` and then run `./target/release/dualset -h`
//! for help on the command-line interface.

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

use anyhow::{anyhow, Result};
use clap::{crate_name, crate_version, value_parser, Arg, ArgMatches, Command};
use dualset::sim;
use rand::Rng;
use std::time::Instant;

/// Main function
fn main() -> Result<()> {
    let timer = Instant::now();
    let matches = command_line_parser().get_matches();
    let seed = seed_from_matches(&matches).unwrap_or_else(|| rand::rng().random());
    eprintln!("Seed: {seed}");
    let json_filename = &json_filename_from_matches(&matches);
    let all_results = sim::run_sims(&all_sim_params(&matches)?, seed, json_filename)?;
    for results in &all_results {
        println!("{results}\n");
    }
    eprintln!("Elapsed time: {:.3?}", timer.elapsed());
    Ok(())
}

/// Returns command line parser.
fn command_line_parser() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .about("Evaluates the ambiguity of a dual-set redundancy channel with erasure-prone units")
        .arg(first_group_size())
        .arg(group_size_step())
        .arg(num_group_sizes())
        .arg(num_messages())
        .arg(message_size())
        .arg(seed())
        .arg(json_filename())
}

/// Returns argument for first number of units per group.
fn first_group_size() -> Arg {
    Arg::new("first_group_size")
        .short('g')
        .value_parser(value_parser!(usize))
        .default_value("32")
        .help("First number of units per group")
}

/// Returns argument for step in number of units per group.
fn group_size_step() -> Arg {
    Arg::new("group_size_step")
        .short('p')
        .value_parser(value_parser!(usize))
        .default_value("1")
        .help("Step in number of units per group")
}

/// Returns argument for number of group sizes.
fn num_group_sizes() -> Arg {
    Arg::new("num_group_sizes")
        .short('n')
        .value_parser(value_parser!(usize))
        .default_value("1")
        .help("Number of group sizes")
}

/// Returns argument for number of messages.
fn num_messages() -> Arg {
    Arg::new("num_messages")
        .short('m')
        .value_parser(value_parser!(u32))
        .default_value("100000")
        .help("Number of messages to be sent per group size")
}

/// Returns argument for number of bits per message.
fn message_size() -> Arg {
    Arg::new("message_size")
        .short('l')
        .value_parser(value_parser!(usize))
        .default_value("8")
        .help("Number of bits per message")
}

/// Returns argument for seed of random number generator.
fn seed() -> Arg {
    Arg::new("seed")
        .short('s')
        .value_parser(value_parser!(u64))
        .help("Seed of random number generator (random if not given)")
}

/// Returns argument for name of JSON file to which results must be saved.
fn json_filename() -> Arg {
    Arg::new("json_filename")
        .short('f')
        .default_value("results.json")
        .help("Name of JSON file to which results must be saved")
}

/// Returns simulation parameters based on command-line arguments.
fn all_sim_params(matches: &ArgMatches) -> Result<Vec<sim::SimParams>> {
    let num_messages = num_messages_from_matches(matches);
    let message_size = message_size_from_matches(matches);
    Ok(all_group_sizes_from_matches(matches)?
        .into_iter()
        .map(|group_size| sim::SimParams {
            group_size,
            num_messages,
            message_size,
        })
        .collect())
}

// OK to unwrap in the functions below: All command-line arguments other than the seed have
// default values, so an error cannot occur in them.

/// Returns all numbers of units per group, or an error if any of them overflows.
fn all_group_sizes_from_matches(matches: &ArgMatches) -> Result<Vec<usize>> {
    let first_group_size: usize = *matches.get_one("first_group_size").unwrap();
    let group_size_step: usize = *matches.get_one("group_size_step").unwrap();
    let num_group_sizes: usize = *matches.get_one("num_group_sizes").unwrap();
    (0 .. num_group_sizes)
        .map(|n| {
            group_size_step
                .checked_mul(n)
                .and_then(|offset| first_group_size.checked_add(offset))
                .ok_or_else(|| {
                    anyhow!(
                        "Group size {first_group_size} + {group_size_step} * {n} is too large"
                    )
                })
        })
        .collect()
}

/// Returns number of messages.
fn num_messages_from_matches(matches: &ArgMatches) -> u32 {
    *matches.get_one("num_messages").unwrap()
}

/// Returns number of bits per message.
fn message_size_from_matches(matches: &ArgMatches) -> usize {
    *matches.get_one("message_size").unwrap()
}

/// Returns seed of random number generator, if given.
fn seed_from_matches(matches: &ArgMatches) -> Option<u64> {
    matches.get_one("seed").copied()
}

/// Returns name of JSON file to which simulation results must be saved.
fn json_filename_from_matches(matches: &ArgMatches) -> String {
    matches
        .get_one::<String>("json_filename")
        .unwrap()
        .to_string()
}
