use super::{ConfigError, GeneticConfig, Registration};
use crate::core::{Catalog, Outcome, ScheduleBuilder, Scheduler};
use rand::prelude::*;
use tracing::info;

/// Builds a single random schedule without any search.
#[derive(Clone, Debug)]
pub struct Random {
    rng: StdRng,
}

impl Random {
    /// Creates a new random scheduler.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let rng = StdRng::seed_from_u64(seed);
        Self { rng }
    }
}

impl Default for Random {
    fn default() -> Self {
        let rng = StdRng::from_entropy();
        Self { rng }
    }
}

impl Scheduler for Random {
    fn schedule<'a>(&mut self, catalog: &'a Catalog) -> Outcome<'a> {
        let built = ScheduleBuilder::new(catalog).build(&mut self.rng);
        let outcome = Outcome::new(built.schedule, built.dropped);
        info!(
            fitness = outcome.fitness,
            lessons = outcome.schedule.len(),
            dropped = outcome.dropped,
            "random schedule built"
        );
        outcome
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

#[allow(clippy::unnecessary_wraps)]
fn init(config: &GeneticConfig) -> Result<Box<dyn Scheduler>, ConfigError> {
    let scheduler: Box<dyn Scheduler> = match config.seed {
        Some(seed) => Box::new(Random::new(seed)),
        None => Box::new(Random::default()),
    };
    Ok(scheduler)
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SCHEDULERS)]
static INSTANCE: Registration = Registration { name: "random", init };
