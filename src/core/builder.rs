use super::{Catalog, Lesson, Schedule, Slot, Subject};
use rand::seq::SliceRandom;
use rand::Rng;

/// Builds random schedules from a catalog.
/// Sessions without a large enough auditorium or a qualified lecturer
/// are left out of the schedule and counted as dropped.
#[derive(Clone, Copy, Debug)]
pub struct ScheduleBuilder<'a> {
    catalog: &'a Catalog,
}

/// A freshly built schedule with the number of sessions that were left out.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Built<'a> {
    pub schedule: Schedule<'a>,
    pub dropped: usize,
}

impl<'a> ScheduleBuilder<'a> {
    /// Creates a new schedule builder.
    #[must_use]
    pub const fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Places every session of every subject at a random slot, in a random
    /// suitable auditorium, with a random qualified lecturer.
    pub fn build(&self, rng: &mut impl Rng) -> Built<'a> {
        let mut schedule = Schedule::new();
        let mut dropped = 0;

        for subject in &self.catalog.subjects {
            for session in 0..subject.sessions() {
                match self.place(subject, session, rng) {
                    Some(lesson) => schedule.push(lesson),
                    None => dropped += 1,
                }
            }
        }

        Built { schedule, dropped }
    }

    fn place(&self, subject: &'a Subject, session: usize, rng: &mut impl Rng) -> Option<Lesson<'a>> {
        let class_format = subject.format_of(session);
        let slot = Slot::random(rng);

        let headcount = self.catalog.headcount(&subject.group_id)?;
        let auditorium = self.catalog.auditoriums_for(headcount).choose(rng).copied();
        let lecturer = self
            .catalog
            .lecturers_for(&subject.id, class_format)
            .choose(rng)
            .copied();

        Some(Lesson {
            group_id: &subject.group_id,
            subject: &subject.name,
            auditorium_id: &auditorium?.id,
            lecturer_id: &lecturer?.id,
            slot,
            class_format,
        })
    }
}
