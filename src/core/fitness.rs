use super::{Lesson, Slot};
use ahash::{HashMap, HashMapExt, HashSet, HashSetExt};

/// A resource booked for a slot. Kinds never collide with each other,
/// even when a group and a lecturer share an identifier.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
enum Occupation<'a> {
    Group(&'a str, Slot),
    Lecturer(&'a str, Slot),
    Auditorium(&'a str, Slot),
}

impl<'a> Occupation<'a> {
    const fn of(lesson: &Lesson<'a>) -> [Self; 3] {
        [
            Self::Group(lesson.group_id, lesson.slot),
            Self::Lecturer(lesson.lecturer_id, lesson.slot),
            Self::Auditorium(lesson.auditorium_id, lesson.slot),
        ]
    }
}

/// Scores the lessons of a schedule. Higher is better and `0` is the best.
///
/// Lessons are visited in order. A lesson whose group, lecturer or auditorium
/// is already booked in its slot counts as a conflict and books nothing;
/// otherwise it books all three. After every lesson the score drops by the
/// number of conflicts seen so far, so later conflicts weigh more, and by the
/// number of other lessons identical to it.
#[must_use]
pub fn fitness(lessons: &[Lesson]) -> i64 {
    let mut copies: HashMap<&Lesson, i64> = HashMap::with_capacity(lessons.len());
    for lesson in lessons {
        *copies.entry(lesson).or_default() += 1;
    }

    let mut occupied = HashSet::with_capacity(lessons.len() * 3);
    let mut conflicts = 0;
    let mut score = 0;

    for lesson in lessons {
        let keys = Occupation::of(lesson);
        if keys.iter().any(|key| occupied.contains(key)) {
            conflicts += 1;
        } else {
            occupied.extend(keys);
        }

        score -= conflicts + copies[lesson] - 1;
    }

    score
}
