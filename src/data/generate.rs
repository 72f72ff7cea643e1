use crate::core::{Auditorium, Catalog, CatalogError, Group, Lecturer, Subject};
use clap::Args;
use rand::prelude::*;
use std::num::NonZero;

/// Parameters of a randomly generated catalog.
#[derive(Args, Clone, Debug)]
pub struct GenerateConfig {
    /// The number of student groups.
    pub groups: NonZero<usize>,
    /// The number of subjects per group.
    pub subjects: NonZero<usize>,
    /// The number of auditoriums.
    #[clap(short, long, default_value = "4")]
    pub auditoriums: usize,
    /// The number of lecturers.
    #[clap(short, long, default_value = "6")]
    pub lecturers: usize,
    /// The maximum number of students in a group.
    #[clap(long, default_value = "30")]
    pub max_students: NonZero<u32>,
    /// The maximum number of lectures and of exercises per subject.
    #[clap(long, default_value = "2")]
    pub max_sessions: usize,
    /// The number of subjects a lecturer is qualified for.
    #[clap(short, long, default_value = "3")]
    pub qualifications: usize,
}

/// Generates a random catalog.
/// Auditorium capacities range up to the largest group, so every group has a room.
///
/// # Errors
/// - If the generated tables are inconsistent. Should not happen.
pub fn gen_catalog(config: &GenerateConfig, rng: &mut impl Rng) -> Result<Catalog, CatalogError> {
    let max_students = config.max_students.get();

    let groups: Vec<_> = (1..=config.groups.get())
        .map(|i| Group {
            id: format!("G{i}"),
            students: rng.gen_range(1..=max_students),
        })
        .collect();
    let largest = groups.iter().map(|g| g.students).max().unwrap_or(max_students);

    let auditoriums = (1..=config.auditoriums)
        .map(|i| Auditorium {
            id: format!("A{i}"),
            capacity: if i == 1 {
                largest
            } else {
                rng.gen_range(1..=largest)
            },
        })
        .collect();

    let mut subjects = Vec::with_capacity(groups.len() * config.subjects.get());
    for group in &groups {
        for _ in 0..config.subjects.get() {
            let number = subjects.len() + 1;
            subjects.push(Subject {
                id: format!("S{number}"),
                name: format!("Subject {number}"),
                group_id: group.id.clone(),
                lectures: rng.gen_range(0..=config.max_sessions),
                exercises: rng.gen_range(0..=config.max_sessions),
            });
        }
    }

    let ids: Vec<&str> = subjects.iter().map(|s: &Subject| s.id.as_str()).collect();
    let lecturers = (1..=config.lecturers)
        .map(|i| Lecturer {
            id: format!("L{i}"),
            subjects: ids
                .choose_multiple(rng, config.qualifications)
                .copied()
                .collect::<Vec<_>>()
                .join(", "),
            class_format: match rng.gen_range(0..3) {
                0 => "Lecture".into(),
                1 => "Exercise".into(),
                _ => "Lecture, Exercise".into(),
            },
        })
        .collect();

    Catalog::new(groups, auditoriums, lecturers, subjects)
}
