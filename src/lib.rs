#![deny(clippy::all, clippy::cargo, clippy::expect_used, clippy::unwrap_used)]
#![deny(clippy::pedantic, clippy::nursery, unsafe_code)]
#![warn(clippy::unimplemented, clippy::redundant_type_annotations)]

use anyhow::Result;
use std::io::Read;

pub mod algo;
pub mod core;
pub mod data;

/// Runs the given scheduler on the catalog read from reader and writes the schedule to stdout,
/// either as a table or as JSON. Also writes the fitness to stdout.
///
/// # Errors
/// - If the catalog could not be read from the reader.
/// - If the schedule could not be serialized.
pub fn run_reader(
    scheduler: &mut dyn core::Scheduler,
    reader: &mut impl Read,
    json: bool,
) -> Result<()> {
    let catalog: core::Catalog = data::deserialize(reader)?;
    let outcome = scheduler.schedule(&catalog);

    if json {
        println!("{}", data::to_string(&outcome.schedule)?);
    } else {
        print!("{}", outcome.schedule);
    }
    println!("{}", outcome.fitness);

    Ok(())
}
