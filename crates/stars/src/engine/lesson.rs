//! Lesson time slots and the clash predicate.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kind of meeting a lesson represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LessonKind {
    Lecture,
    Tutorial,
    Lab,
}

/// Returned when a lesson's time bounds are inverted or empty.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("lesson start {start} is not before end {end}")]
pub struct InvalidLessonTime {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// An immutable weekly time slot belonging to a section.
///
/// The interval is half-open: a lesson ending at 10:00 does not clash with
/// one starting at 10:00 on the same day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub kind: LessonKind,
    pub day: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Lesson {
    /// Creates a lesson, enforcing `start < end`.
    pub fn new(
        kind: LessonKind,
        day: Weekday,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Self, InvalidLessonTime> {
        if start >= end {
            return Err(InvalidLessonTime { start, end });
        }
        Ok(Self {
            kind,
            day,
            start,
            end,
        })
    }

    /// Returns true if the two lessons occupy overlapping time on the same day.
    pub fn overlaps(&self, other: &Lesson) -> bool {
        self.day == other.day && self.start < other.end && other.start < self.end
    }
}

/// Returns true if any lesson pair across the two slices overlaps.
pub fn lessons_clash(a: &[Lesson], b: &[Lesson]) -> bool {
    a.iter().any(|la| b.iter().any(|lb| la.overlaps(lb)))
}
