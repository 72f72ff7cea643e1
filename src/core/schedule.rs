use super::{fitness, ClassFormat};
use rand::Rng;
use serde::Serialize;
use std::fmt::{Display, Formatter, Result};

/// Number of teaching days in a week.
pub const DAYS: u8 = 5;

/// Number of periods in a teaching day.
pub const PERIODS: u8 = 4;

/// A (day, period) pair, both counted from 1.
#[derive(Clone, Copy, Debug, Eq, Hash, Serialize, PartialEq, PartialOrd, Ord)]
pub struct Slot {
    pub day: u8,
    #[serde(rename = "time_slot")]
    pub period: u8,
}

impl Slot {
    /// Creates a new slot.
    #[must_use]
    pub const fn new(day: u8, period: u8) -> Self {
        Self { day, period }
    }

    /// Draws a uniformly random slot of the week.
    pub fn random(rng: &mut impl Rng) -> Self {
        let day = rng.gen_range(1..=DAYS);
        let period = rng.gen_range(1..=PERIODS);
        Self { day, period }
    }
}

/// A single class placed in the timetable.
/// Borrows its identifiers from the catalog it was built from.
#[derive(Clone, Copy, Debug, Eq, Hash, Serialize, PartialEq)]
pub struct Lesson<'a> {
    pub group_id: &'a str,
    pub subject: &'a str,
    pub auditorium_id: &'a str,
    pub lecturer_id: &'a str,
    #[serde(flatten)]
    pub slot: Slot,
    pub class_format: ClassFormat,
}

/// A candidate timetable. Lessons keep their insertion order,
/// which matters to crossover but not to conflict checking.
#[derive(Clone, Debug, Default, Eq, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Schedule<'a> {
    lessons: Vec<Lesson<'a>>,
}

impl<'a> Schedule<'a> {
    /// Creates an empty schedule.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lessons: Vec::new(),
        }
    }

    /// Appends a lesson.
    pub fn push(&mut self, lesson: Lesson<'a>) {
        self.lessons.push(lesson);
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson<'a>] {
        &self.lessons
    }

    pub fn lessons_mut(&mut self) -> &mut [Lesson<'a>] {
        &mut self.lessons
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    /// Calculates the fitness of the schedule.
    #[must_use]
    pub fn fitness(&self) -> i64 {
        fitness(&self.lessons)
    }
}

impl<'a> From<Vec<Lesson<'a>>> for Schedule<'a> {
    fn from(lessons: Vec<Lesson<'a>>) -> Self {
        Self { lessons }
    }
}

impl<'a> FromIterator<Lesson<'a>> for Schedule<'a> {
    fn from_iter<T: IntoIterator<Item = Lesson<'a>>>(iter: T) -> Self {
        Self {
            lessons: iter.into_iter().collect(),
        }
    }
}

const HEADERS: [&str; 7] = [
    "Group",
    "Subject",
    "Auditorium",
    "Lecturer",
    "Day",
    "Time slot",
    "Class format",
];

impl Display for Schedule<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let rows: Vec<[String; 7]> = self
            .lessons
            .iter()
            .map(|lesson| {
                [
                    lesson.group_id.to_owned(),
                    lesson.subject.to_owned(),
                    lesson.auditorium_id.to_owned(),
                    lesson.lecturer_id.to_owned(),
                    lesson.slot.day.to_string(),
                    lesson.slot.period.to_string(),
                    lesson.class_format.to_string(),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let headers = HEADERS.map(str::to_owned);
        for row in std::iter::once(&headers).chain(&rows) {
            let mut cells = row.iter().zip(widths).peekable();
            while let Some((cell, width)) = cells.next() {
                if cells.peek().is_some() {
                    write!(f, "{cell:<width$}  ")?;
                } else {
                    writeln!(f, "{cell}")?;
                }
            }
        }

        Ok(())
    }
}
