//! Error types for enrollment operations.

use thiserror::Error;

use super::section::SectionId;

/// Errors returned by the enrollment engine.
///
/// Every variant except the lookup errors is a validation conflict the caller
/// can act on; the engine never retries on its own and always restores the
/// pre-call state before returning one of these from a swap path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnrollError {
    /// No student with this id exists
    #[error("Student {student_id} not found")]
    UnknownStudent { student_id: String },

    /// No course with this code exists in the catalog
    #[error("Course {code} not found")]
    UnknownCourse { code: String },

    /// The course exists but has no section with this index
    #[error("Course {code} has no section {section_id}")]
    UnknownSection { code: String, section_id: SectionId },

    /// Student already holds a registered section for this course
    #[error("Already registered for {code}")]
    AlreadyRegistered { code: String },

    /// Student already holds a waitlist place for this course
    #[error("Already waitlisted for {code}")]
    AlreadyWaitlisted { code: String },

    /// Adding the course would push the registered+waitlisted load past the cap
    #[error("Registering {code} would bring the load to {would_be} AU, above the {max_load} AU cap")]
    LoadExceeded {
        code: String,
        would_be: u32,
        max_load: u32,
    },

    /// The candidate section clashes with a registered course
    #[error("Timetable clash with registered course {other}")]
    ClashRegistered { other: String },

    /// The candidate section clashes with a waitlisted course
    #[error("Timetable clash with waitlisted course {other}")]
    ClashWaitlisted { other: String },

    /// In a peer swap, the incoming section clashes with the peer's registered courses
    #[error("Peer timetable clash with registered course {other}")]
    PeerClashRegistered { other: String },

    /// In a peer swap, the incoming section clashes with the peer's waitlisted courses
    #[error("Peer timetable clash with waitlisted course {other}")]
    PeerClashWaitlisted { other: String },

    /// The section is full; the caller may follow up with a waitlist request
    #[error("No vacancy in section {section_id} of {code}")]
    NoVacancy { code: String, section_id: SectionId },

    /// The target section of a same-student swap is full
    #[error("No vacancy in target section {section_id} of {code}")]
    NoVacancySwap { code: String, section_id: SectionId },

    /// Source and target of a swap are the same section
    #[error("Source and target sections are the same")]
    SameSection,

    /// Capacity edit would drop capacity below current occupancy
    #[error("Capacity {requested} is below the current occupancy of {occupied}")]
    InvalidCapacity { requested: u32, occupied: usize },

    /// Student holds no registered section for this course
    #[error("Not registered for {code}")]
    NotRegistered { code: String },

    /// Student holds no waitlist place for this course
    #[error("Not waitlisted for {code}")]
    NotWaitlisted { code: String },

    /// The peer in a swap holds no registered section for this course
    #[error("Peer is not registered for {code}")]
    PeerNotRegistered { code: String },
}

impl EnrollError {
    /// Returns true if the error is a missing-entity lookup failure rather
    /// than a validation conflict.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EnrollError::UnknownStudent { .. }
                | EnrollError::UnknownCourse { .. }
                | EnrollError::UnknownSection { .. }
        )
    }

    /// Returns true if the caller is expected to follow up with a waitlist
    /// request for the same section.
    pub fn suggests_waitlist(&self) -> bool {
        matches!(self, EnrollError::NoVacancy { .. })
    }

    /// Short machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            EnrollError::UnknownStudent { .. } => "unknown_student",
            EnrollError::UnknownCourse { .. } => "unknown_course",
            EnrollError::UnknownSection { .. } => "unknown_section",
            EnrollError::AlreadyRegistered { .. } => "already_registered",
            EnrollError::AlreadyWaitlisted { .. } => "already_waitlisted",
            EnrollError::LoadExceeded { .. } => "load_exceeded",
            EnrollError::ClashRegistered { .. } => "clash_registered",
            EnrollError::ClashWaitlisted { .. } => "clash_waitlisted",
            EnrollError::PeerClashRegistered { .. } => "peer_clash_registered",
            EnrollError::PeerClashWaitlisted { .. } => "peer_clash_waitlisted",
            EnrollError::NoVacancy { .. } => "no_vacancy",
            EnrollError::NoVacancySwap { .. } => "no_vacancy_swap",
            EnrollError::SameSection => "same_section",
            EnrollError::InvalidCapacity { .. } => "invalid_capacity",
            EnrollError::NotRegistered { .. } => "not_registered",
            EnrollError::NotWaitlisted { .. } => "not_waitlisted",
            EnrollError::PeerNotRegistered { .. } => "peer_not_registered",
        }
    }
}
