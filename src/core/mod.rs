mod builder;
pub(crate) mod catalog;
mod fitness;
mod schedule;

pub use builder::*;
pub use catalog::*;
pub use fitness::*;
pub use schedule::*;

/// The result of scheduling a catalog.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Outcome<'a> {
    pub schedule: Schedule<'a>,
    pub fitness: i64,
    /// Sessions left out while building the starting schedules.
    pub dropped: usize,
}

impl<'a> Outcome<'a> {
    /// Creates an outcome, scoring the schedule.
    #[must_use]
    pub fn new(schedule: Schedule<'a>, dropped: usize) -> Self {
        let fitness = schedule.fitness();
        Self {
            schedule,
            fitness,
            dropped,
        }
    }
}

/// Builds a timetable for the resources of a catalog.
pub trait Scheduler {
    /// Schedules the sessions of the given catalog.
    fn schedule<'a>(&mut self, catalog: &'a Catalog) -> Outcome<'a>;

    /// Returns the name of the scheduler.
    fn name(&self) -> &str;
}
