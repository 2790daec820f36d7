//! Sections (index numbers) and their registration/waitlist containers.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::error::EnrollError;
use super::lesson::Lesson;

/// Identifier of a section within its course.
pub type SectionId = u32;

/// A specific timetabled offering of a course, with fixed capacity.
///
/// Section is a dumb container: every mutation here is a single atomic field
/// change, and the caller (the engine) is responsible for all multi-step
/// validation before invoking one. Given valid inputs a section can never
/// become inconsistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    /// Course this section belongs to, as a handle rather than a pointer.
    pub course_code: String,
    capacity: u32,
    pub lessons: Vec<Lesson>,
    registered: BTreeSet<String>,
    waitlist: VecDeque<String>,
}

impl Section {
    pub fn new(id: SectionId, course_code: &str, capacity: u32, lessons: Vec<Lesson>) -> Self {
        Self {
            id,
            course_code: course_code.to_string(),
            capacity,
            lessons,
            registered: BTreeSet::new(),
            waitlist: VecDeque::new(),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Remaining seats; can only be non-positive, never observable below
    /// `-0` in practice because capacity edits below occupancy are rejected.
    pub fn available_seats(&self) -> i64 {
        self.capacity as i64 - self.registered.len() as i64
    }

    /// Lowers or raises capacity. Fails if the new capacity is below the
    /// current occupancy.
    pub fn set_capacity(&mut self, new_capacity: u32) -> Result<(), EnrollError> {
        if (new_capacity as usize) < self.registered.len() {
            return Err(EnrollError::InvalidCapacity {
                requested: new_capacity,
                occupied: self.registered.len(),
            });
        }
        self.capacity = new_capacity;
        Ok(())
    }

    /// Adds a student to the registered set. No validation happens here.
    pub fn admit(&mut self, student_id: &str) {
        self.registered.insert(student_id.to_string());
    }

    /// Removes a student from the registered set.
    pub fn release(&mut self, student_id: &str) {
        self.registered.remove(student_id);
    }

    pub fn is_registered(&self, student_id: &str) -> bool {
        self.registered.contains(student_id)
    }

    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    pub fn registered_students(&self) -> impl Iterator<Item = &str> {
        self.registered.iter().map(String::as_str)
    }

    /// Appends a student to the waitlist unless already queued.
    pub fn enqueue_waitlist(&mut self, student_id: &str) {
        if !self.waitlist.iter().any(|s| s == student_id) {
            self.waitlist.push_back(student_id.to_string());
        }
    }

    /// Pops the earliest-enqueued student, if any.
    pub fn dequeue_waitlist(&mut self) -> Option<String> {
        self.waitlist.pop_front()
    }

    /// Removes a student from anywhere in the waitlist.
    pub fn remove_from_waitlist(&mut self, student_id: &str) {
        self.waitlist.retain(|s| s != student_id);
    }

    pub fn is_waitlisted(&self, student_id: &str) -> bool {
        self.waitlist.iter().any(|s| s == student_id)
    }

    pub fn waitlist_len(&self) -> usize {
        self.waitlist.len()
    }

    pub fn waitlisted_students(&self) -> impl Iterator<Item = &str> {
        self.waitlist.iter().map(String::as_str)
    }
}
