use ahash::{HashSet, HashSetExt};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// A group of students attending the same classes.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub struct Group {
    pub id: String,
    pub students: u32,
}

/// A room with a seating capacity.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub struct Auditorium {
    pub id: String,
    pub capacity: u32,
}

/// A lecturer. Qualifications are free text matched by containment,
/// e.g. `subjects: "S1, S3"` and `class_format: "Lecture, Exercise"`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub struct Lecturer {
    pub id: String,
    pub subjects: String,
    pub class_format: String,
}

impl Lecturer {
    /// Returns whether the lecturer may teach the subject in the given format.
    #[must_use]
    pub fn teaches(&self, subject: &str, format: ClassFormat) -> bool {
        self.subjects.contains(subject) && self.class_format.contains(format.label())
    }
}

/// A subject taught to a single group.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub group_id: String,
    pub lectures: usize,
    pub exercises: usize,
}

impl Subject {
    /// Returns the number of sessions required per week.
    #[must_use]
    pub const fn sessions(&self) -> usize {
        self.lectures + self.exercises
    }

    /// Returns the format of the session with the given index.
    /// Lectures come first, exercises after them.
    #[must_use]
    pub const fn format_of(&self, session: usize) -> ClassFormat {
        if session < self.lectures {
            ClassFormat::Lecture
        } else {
            ClassFormat::Exercise
        }
    }
}

/// The way a class is held.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Serialize, PartialEq, PartialOrd, Ord)]
pub enum ClassFormat {
    Lecture,
    Exercise,
}

impl ClassFormat {
    /// Returns the label used in lecturer qualifications.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lecture => "Lecture",
            Self::Exercise => "Exercise",
        }
    }
}

impl Display for ClassFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors found while assembling a catalog.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum CatalogError {
    #[error("duplicate group id `{0}`")]
    DuplicateGroup(String),
    #[error("duplicate auditorium id `{0}`")]
    DuplicateAuditorium(String),
    #[error("duplicate lecturer id `{0}`")]
    DuplicateLecturer(String),
    #[error("duplicate subject id `{0}`")]
    DuplicateSubject(String),
    #[error("subject `{subject}` belongs to unknown group `{group}`")]
    UnknownGroup { subject: String, group: String },
}

#[derive(Deserialize)]
struct Tables {
    groups: Vec<Group>,
    auditoriums: Vec<Auditorium>,
    lecturers: Vec<Lecturer>,
    subjects: Vec<Subject>,
}

impl TryFrom<Tables> for Catalog {
    type Error = CatalogError;

    fn try_from(tables: Tables) -> Result<Self, Self::Error> {
        Self::new(
            tables.groups,
            tables.auditoriums,
            tables.lecturers,
            tables.subjects,
        )
    }
}

/// Read-only tables of the resources a timetable is built from.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Eq, Serialize, PartialEq)]
#[serde(try_from = "Tables")]
pub struct Catalog {
    pub groups: Vec<Group>,
    pub auditoriums: Vec<Auditorium>,
    pub lecturers: Vec<Lecturer>,
    pub subjects: Vec<Subject>,
}

impl Catalog {
    /// Creates a catalog, checking that identifiers are unique and that
    /// every subject belongs to a known group.
    ///
    /// # Errors
    /// - If an identifier repeats within a table.
    /// - If a subject references a group that does not exist.
    pub fn new(
        groups: Vec<Group>,
        auditoriums: Vec<Auditorium>,
        lecturers: Vec<Lecturer>,
        subjects: Vec<Subject>,
    ) -> Result<Self, CatalogError> {
        unique(groups.iter().map(|g| &g.id), CatalogError::DuplicateGroup)?;
        unique(auditoriums.iter().map(|a| &a.id), CatalogError::DuplicateAuditorium)?;
        unique(lecturers.iter().map(|l| &l.id), CatalogError::DuplicateLecturer)?;
        unique(subjects.iter().map(|s| &s.id), CatalogError::DuplicateSubject)?;

        if let Some(subject) = subjects
            .iter()
            .find(|s| !groups.iter().any(|g| g.id == s.group_id))
        {
            return Err(CatalogError::UnknownGroup {
                subject: subject.id.clone(),
                group: subject.group_id.clone(),
            });
        }

        Ok(Self {
            groups,
            auditoriums,
            lecturers,
            subjects,
        })
    }

    /// Returns the headcount of the group.
    #[must_use]
    pub fn headcount(&self, group: &str) -> Option<u32> {
        self.groups
            .iter()
            .find(|g| g.id == group)
            .map(|g| g.students)
    }

    /// Returns the auditoriums that seat at least `headcount` students.
    #[must_use]
    pub fn auditoriums_for(&self, headcount: u32) -> Vec<&Auditorium> {
        self.auditoriums
            .iter()
            .filter(|a| a.capacity >= headcount)
            .collect()
    }

    /// Returns the lecturers qualified for the subject in the given format.
    #[must_use]
    pub fn lecturers_for(&self, subject: &str, format: ClassFormat) -> Vec<&Lecturer> {
        self.lecturers
            .iter()
            .filter(|l| l.teaches(subject, format))
            .collect()
    }

    /// Returns the total number of sessions the subjects require.
    #[must_use]
    pub fn required_sessions(&self) -> usize {
        self.subjects.iter().map(Subject::sessions).sum()
    }
}

fn unique<'a>(
    ids: impl Iterator<Item = &'a String>,
    error: fn(String) -> CatalogError,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(error(id.clone()));
        }
    }
    Ok(())
}
