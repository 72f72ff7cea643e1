use crate::core::Scheduler;

mod genetic;
mod random;

pub use genetic::*;
pub use random::Random;

/// Creates a scheduler from the shared genetic configuration.
pub type SchedulerInit = fn(&GeneticConfig) -> Result<Box<dyn Scheduler>, ConfigError>;

/// A scheduler available to the command line.
#[derive(Clone, Copy, Debug)]
pub struct Registration {
    pub name: &'static str,
    pub init: SchedulerInit,
}

/// Every registered scheduler.
#[allow(unsafe_code)]
#[linkme::distributed_slice]
pub static SCHEDULERS: [Registration];

/// Finds a registered scheduler by name.
#[must_use]
pub fn find(name: &str) -> Option<&'static Registration> {
    SCHEDULERS.iter().find(|registration| registration.name == name)
}
