//! Course catalog entries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::section::{Section, SectionId};

/// School offering a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum School {
    Computing,
    Engineering,
    Science,
    Business,
    Humanities,
}

/// A catalog entry: one course and the sections offered under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub code: String,
    pub name: String,
    pub school: School,
    /// Academic units this course counts for against the load cap.
    pub load_weight: u32,
    sections: BTreeMap<SectionId, Section>,
}

impl Course {
    pub fn new(code: &str, name: &str, school: School, load_weight: u32) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            school,
            load_weight,
            sections: BTreeMap::new(),
        }
    }

    /// Adds a section; returns false (and leaves the catalog unchanged) if
    /// the id is already taken within this course.
    pub fn add_section(&mut self, section: Section) -> bool {
        if self.sections.contains_key(&section.id) {
            return false;
        }
        self.sections.insert(section.id, section);
        true
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(&id)
    }

    pub fn section_mut(&mut self, id: SectionId) -> Option<&mut Section> {
        self.sections.get_mut(&id)
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }
}
