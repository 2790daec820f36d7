//! The course catalog: repository of courses and their sections.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::course::Course;
use super::error::EnrollError;
use super::section::{Section, SectionId};

/// Canonical owner of all courses and sections. Timetables refer into the
/// catalog by `(course code, section id)` handle and never hold pointers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    courses: BTreeMap<String, Course>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a course; returns false if the code is already taken.
    pub fn add_course(&mut self, course: Course) -> bool {
        if self.courses.contains_key(&course.code) {
            return false;
        }
        self.courses.insert(course.code.clone(), course);
        true
    }

    pub fn course(&self, code: &str) -> Result<&Course, EnrollError> {
        self.courses.get(code).ok_or_else(|| EnrollError::UnknownCourse {
            code: code.to_string(),
        })
    }

    pub fn course_mut(&mut self, code: &str) -> Result<&mut Course, EnrollError> {
        self.courses.get_mut(code).ok_or_else(|| EnrollError::UnknownCourse {
            code: code.to_string(),
        })
    }

    pub fn section(&self, code: &str, id: SectionId) -> Result<&Section, EnrollError> {
        self.course(code)?
            .section(id)
            .ok_or_else(|| EnrollError::UnknownSection {
                code: code.to_string(),
                section_id: id,
            })
    }

    pub fn section_mut(&mut self, code: &str, id: SectionId) -> Result<&mut Section, EnrollError> {
        self.course_mut(code)?
            .section_mut(id)
            .ok_or_else(|| EnrollError::UnknownSection {
                code: code.to_string(),
                section_id: id,
            })
    }

    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    /// Academic-unit weight of a course, zero if the code is unknown.
    /// Used for load sums over timetable entries whose courses are
    /// guaranteed to exist.
    pub fn load_weight(&self, code: &str) -> u32 {
        self.courses.get(code).map_or(0, |c| c.load_weight)
    }
}
