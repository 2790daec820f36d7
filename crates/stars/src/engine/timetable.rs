//! Per-student timetables: the registered and waitlisted course maps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::section::SectionId;

/// Where a course sits in a student's timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnrollmentState {
    None,
    Registered,
    Waitlisted,
}

/// A student's view of their enrollment: course code to section id, for both
/// confirmed registrations and waitlist places. A course code is never in
/// both maps at once; the engine enforces that on every transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    registered: BTreeMap<String, SectionId>,
    waitlisted: BTreeMap<String, SectionId>,
}

impl Timetable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_of(&self, code: &str) -> EnrollmentState {
        if self.registered.contains_key(code) {
            EnrollmentState::Registered
        } else if self.waitlisted.contains_key(code) {
            EnrollmentState::Waitlisted
        } else {
            EnrollmentState::None
        }
    }

    pub fn registered_section(&self, code: &str) -> Option<SectionId> {
        self.registered.get(code).copied()
    }

    pub fn waitlisted_section(&self, code: &str) -> Option<SectionId> {
        self.waitlisted.get(code).copied()
    }

    pub fn registered_entries(&self) -> impl Iterator<Item = (&str, SectionId)> {
        self.registered.iter().map(|(c, s)| (c.as_str(), *s))
    }

    pub fn waitlisted_entries(&self) -> impl Iterator<Item = (&str, SectionId)> {
        self.waitlisted.iter().map(|(c, s)| (c.as_str(), *s))
    }

    pub(crate) fn insert_registered(&mut self, code: &str, section: SectionId) {
        self.registered.insert(code.to_string(), section);
    }

    pub(crate) fn remove_registered(&mut self, code: &str) -> Option<SectionId> {
        self.registered.remove(code)
    }

    pub(crate) fn insert_waitlisted(&mut self, code: &str, section: SectionId) {
        self.waitlisted.insert(code.to_string(), section);
    }

    pub(crate) fn remove_waitlisted(&mut self, code: &str) -> Option<SectionId> {
        self.waitlisted.remove(code)
    }
}
