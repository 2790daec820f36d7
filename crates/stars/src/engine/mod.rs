//! The enrollment engine.
//!
//! Owns the catalog and the student registry and drives every enrollment
//! state transition: register, waitlist, drop, waitlist promotion, and the
//! two swap flows. All multi-step validation lives here; sections and
//! timetables below only expose atomic single-field mutations.

mod catalog;
mod course;
mod error;
mod lesson;
mod section;
mod student;
mod timetable;

pub use catalog::Catalog;
pub use course::{Course, School};
pub use error::EnrollError;
pub use lesson::{lessons_clash, InvalidLessonTime, Lesson, LessonKind};
pub use section::{Section, SectionId};
pub use student::Student;
pub use timetable::{EnrollmentState, Timetable};

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::notify::Notifier;

/// Default cap on combined registered + waitlisted academic units.
pub const DEFAULT_MAX_LOAD: u32 = 21;

/// The enrollment engine: catalog + student registry + transition rules.
///
/// Every public operation runs to completion before the next begins (the
/// server wraps the whole engine in one lock), so no partial state is ever
/// observable from outside a call.
pub struct Engine {
    catalog: Catalog,
    students: BTreeMap<String, Student>,
    max_load: u32,
    notifier: Arc<dyn Notifier>,
}

impl Engine {
    pub fn new(max_load: u32, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            catalog: Catalog::new(),
            students: BTreeMap::new(),
            max_load,
            notifier,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn max_load(&self) -> u32 {
        self.max_load
    }

    /// Adds a course to the catalog; returns false if the code is taken.
    pub fn add_course(&mut self, course: Course) -> bool {
        self.catalog.add_course(course)
    }

    /// Adds a section under an existing course. Fails on an unknown course;
    /// returns `Ok(false)` if the section id is already taken.
    pub fn add_section(&mut self, code: &str, section: Section) -> Result<bool, EnrollError> {
        Ok(self.catalog.course_mut(code)?.add_section(section))
    }

    /// Adds a student to the registry; returns false if the id is taken.
    pub fn add_student(&mut self, student: Student) -> bool {
        if self.students.contains_key(&student.id) {
            return false;
        }
        self.students.insert(student.id.clone(), student);
        true
    }

    pub fn student(&self, student_id: &str) -> Result<&Student, EnrollError> {
        self.students
            .get(student_id)
            .ok_or_else(|| EnrollError::UnknownStudent {
                student_id: student_id.to_string(),
            })
    }

    pub fn students(&self) -> impl Iterator<Item = &Student> {
        self.students.values()
    }

    fn student_mut(&mut self, student_id: &str) -> Result<&mut Student, EnrollError> {
        self.students
            .get_mut(student_id)
            .ok_or_else(|| EnrollError::UnknownStudent {
                student_id: student_id.to_string(),
            })
    }

    /// First timetable entry whose section clashes with `candidate`, if any.
    fn find_clash<'a>(
        &self,
        entries: impl Iterator<Item = (&'a str, SectionId)>,
        candidate: &Section,
    ) -> Option<String> {
        for (code, sid) in entries {
            if code == candidate.course_code {
                continue;
            }
            if let Ok(held) = self.catalog.section(code, sid) {
                if lessons_clash(&held.lessons, &candidate.lessons) {
                    return Some(code.to_string());
                }
            }
        }
        None
    }

    /// Combined academic-unit load of a student's registered and waitlisted
    /// courses.
    fn current_load(&self, student: &Student) -> u32 {
        student
            .timetable
            .registered_entries()
            .chain(student.timetable.waitlisted_entries())
            .map(|(code, _)| self.catalog.load_weight(code))
            .sum()
    }

    /// Registers a student into a section.
    ///
    /// Checks run in a fixed order so the most specific error surfaces:
    /// duplicate registration, load cap, duplicate waitlist place, clash
    /// against registered courses, clash against waitlisted courses, and
    /// finally vacancy. On `NoVacancy` the caller may follow up with
    /// [`Engine::add_to_waitlist`] for the same section.
    pub fn register(
        &mut self,
        student_id: &str,
        code: &str,
        section_id: SectionId,
    ) -> Result<(), EnrollError> {
        let weight = self.catalog.course(code)?.load_weight;
        self.catalog.section(code, section_id)?;

        {
            let student = self.student(student_id)?;
            let tt = &student.timetable;

            if tt.registered_section(code).is_some() {
                return Err(EnrollError::AlreadyRegistered {
                    code: code.to_string(),
                });
            }

            let would_be = self.current_load(student) + weight;
            if would_be > self.max_load {
                return Err(EnrollError::LoadExceeded {
                    code: code.to_string(),
                    would_be,
                    max_load: self.max_load,
                });
            }

            if tt.waitlisted_section(code).is_some() {
                return Err(EnrollError::AlreadyWaitlisted {
                    code: code.to_string(),
                });
            }

            let candidate = self.catalog.section(code, section_id)?;
            if let Some(other) = self.find_clash(tt.registered_entries(), candidate) {
                return Err(EnrollError::ClashRegistered { other });
            }
            if let Some(other) = self.find_clash(tt.waitlisted_entries(), candidate) {
                return Err(EnrollError::ClashWaitlisted { other });
            }
            if candidate.available_seats() <= 0 {
                return Err(EnrollError::NoVacancy {
                    code: code.to_string(),
                    section_id,
                });
            }
        }

        self.catalog.section_mut(code, section_id)?.admit(student_id);
        self.student_mut(student_id)?
            .timetable
            .insert_registered(code, section_id);

        info!("Registered {} for {} index {}", student_id, code, section_id);
        self.notifier.notify(
            student_id,
            &format!("Registered for {code} (index {section_id})"),
        );
        Ok(())
    }

    /// Places a student on a section's waitlist.
    ///
    /// By protocol this is only called after [`Engine::register`] returned
    /// `NoVacancy` for the same section, so clash and load checks are taken
    /// as already satisfied and are not repeated here.
    pub fn add_to_waitlist(
        &mut self,
        student_id: &str,
        code: &str,
        section_id: SectionId,
    ) -> Result<(), EnrollError> {
        self.catalog.section(code, section_id)?;
        self.student(student_id)?;

        self.catalog
            .section_mut(code, section_id)?
            .enqueue_waitlist(student_id);
        self.student_mut(student_id)?
            .timetable
            .insert_waitlisted(code, section_id);

        info!("Waitlisted {} for {} index {}", student_id, code, section_id);
        self.notifier.notify(
            student_id,
            &format!("Added to the waitlist for {code} (index {section_id})"),
        );
        Ok(())
    }

    /// Drops a registered course and promotes the head of the waitlist into
    /// the freed seat.
    pub fn drop_registered(&mut self, student_id: &str, code: &str) -> Result<(), EnrollError> {
        let section_id = self
            .student(student_id)?
            .timetable
            .registered_section(code)
            .ok_or_else(|| EnrollError::NotRegistered {
                code: code.to_string(),
            })?;

        self.catalog
            .section_mut(code, section_id)?
            .release(student_id);
        self.student_mut(student_id)?
            .timetable
            .remove_registered(code);

        self.promote_next(code, section_id);

        info!("Dropped {} from {} index {}", student_id, code, section_id);
        self.notifier.notify(
            student_id,
            &format!("Dropped {code} (index {section_id})"),
        );
        Ok(())
    }

    /// Gives up a waitlist place. No seat frees, so no promotion runs.
    pub fn drop_waitlisted(&mut self, student_id: &str, code: &str) -> Result<(), EnrollError> {
        let section_id = self
            .student(student_id)?
            .timetable
            .waitlisted_section(code)
            .ok_or_else(|| EnrollError::NotWaitlisted {
                code: code.to_string(),
            })?;

        self.catalog
            .section_mut(code, section_id)?
            .remove_from_waitlist(student_id);
        self.student_mut(student_id)?
            .timetable
            .remove_waitlisted(code);

        info!(
            "Removed {} from the {} index {} waitlist",
            student_id, code, section_id
        );
        self.notifier.notify(
            student_id,
            &format!("Removed from the waitlist for {code} (index {section_id})"),
        );
        Ok(())
    }

    /// Promotes the earliest-waitlisted student into a freed seat by
    /// re-running the full registration path on their behalf.
    ///
    /// Nothing in the public protocol should let that re-validation fail
    /// (the promoted student already cleared clash and load checks when
    /// they waitlisted), so a failure here is a logic fault: it is logged
    /// at error level and the promotion is skipped, leaving the seat open
    /// for the next trigger.
    fn promote_next(&mut self, code: &str, section_id: SectionId) {
        let next = match self.catalog.section_mut(code, section_id) {
            Ok(section) => section.dequeue_waitlist(),
            Err(_) => None,
        };
        let Some(next_id) = next else {
            return;
        };

        if let Some(promoted) = self.students.get_mut(&next_id) {
            promoted.timetable.remove_waitlisted(code);
        }

        match self.register(&next_id, code, section_id) {
            Ok(()) => {
                info!(
                    "Promoted {} from the waitlist into {} index {}",
                    next_id, code, section_id
                );
            }
            Err(err) => {
                error!(
                    "Waitlist promotion of {} into {} index {} failed ({}); skipping",
                    next_id, code, section_id, err
                );
            }
        }
    }

    /// Moves a student to a different section of a course they are
    /// registered for.
    ///
    /// Two-phase: the current seat is tentatively released (without firing a
    /// waitlist promotion, since the vacancy is not real yet), the target is
    /// validated against both timetable maps and for vacancy, and on any
    /// failure the original registration is restored exactly before the
    /// error is returned.
    pub fn swap_section(
        &mut self,
        student_id: &str,
        code: &str,
        new_section_id: SectionId,
    ) -> Result<(), EnrollError> {
        let old_section_id = self
            .student(student_id)?
            .timetable
            .registered_section(code)
            .ok_or_else(|| EnrollError::NotRegistered {
                code: code.to_string(),
            })?;
        if new_section_id == old_section_id {
            return Err(EnrollError::SameSection);
        }
        self.catalog.section(code, new_section_id)?;

        // Phase A: tentative release, promotion suppressed.
        self.catalog
            .section_mut(code, old_section_id)?
            .release(student_id);
        self.student_mut(student_id)?
            .timetable
            .remove_registered(code);

        let failure = {
            let student = self.student(student_id)?;
            let candidate = self.catalog.section(code, new_section_id)?;
            if let Some(other) = self.find_clash(student.timetable.registered_entries(), candidate)
            {
                Some(EnrollError::ClashRegistered { other })
            } else if let Some(other) =
                self.find_clash(student.timetable.waitlisted_entries(), candidate)
            {
                Some(EnrollError::ClashWaitlisted { other })
            } else if candidate.available_seats() <= 0 {
                Some(EnrollError::NoVacancySwap {
                    code: code.to_string(),
                    section_id: new_section_id,
                })
            } else {
                None
            }
        };

        if let Some(err) = failure {
            self.catalog
                .section_mut(code, old_section_id)?
                .admit(student_id);
            self.student_mut(student_id)?
                .timetable
                .insert_registered(code, old_section_id);
            debug!(
                "Swap of {} in {} from index {} to {} rolled back: {}",
                student_id, code, old_section_id, new_section_id, err
            );
            return Err(err);
        }

        self.catalog
            .section_mut(code, new_section_id)?
            .admit(student_id);
        self.student_mut(student_id)?
            .timetable
            .insert_registered(code, new_section_id);

        info!(
            "Swapped {} in {} from index {} to index {}",
            student_id, code, old_section_id, new_section_id
        );
        self.notifier.notify(
            student_id,
            &format!("Changed index for {code}: {old_section_id} to {new_section_id}"),
        );
        Ok(())
    }

    /// Exchanges section assignments for one course between two students.
    ///
    /// Both timetables are validated against the section they would receive
    /// (registered then waitlisted entries, self before peer); the first
    /// failed check rolls both students back to their original sections.
    /// Vacancy is never checked: the exchange conserves seat counts.
    pub fn swap_with_peer(
        &mut self,
        student_id: &str,
        peer_id: &str,
        code: &str,
    ) -> Result<(), EnrollError> {
        let my_section_id = self
            .student(student_id)?
            .timetable
            .registered_section(code)
            .ok_or_else(|| EnrollError::NotRegistered {
                code: code.to_string(),
            })?;
        let peer_section_id = self
            .student(peer_id)?
            .timetable
            .registered_section(code)
            .ok_or_else(|| EnrollError::PeerNotRegistered {
                code: code.to_string(),
            })?;
        if my_section_id == peer_section_id {
            return Err(EnrollError::SameSection);
        }

        // Phase A: tentatively release both sides, promotion suppressed.
        self.catalog
            .section_mut(code, my_section_id)?
            .release(student_id);
        self.catalog
            .section_mut(code, peer_section_id)?
            .release(peer_id);
        self.student_mut(student_id)?
            .timetable
            .remove_registered(code);
        self.student_mut(peer_id)?.timetable.remove_registered(code);

        let failure = {
            let me = self.student(student_id)?;
            let peer = self.student(peer_id)?;
            let my_incoming = self.catalog.section(code, peer_section_id)?;
            let peer_incoming = self.catalog.section(code, my_section_id)?;

            if let Some(other) = self.find_clash(me.timetable.registered_entries(), my_incoming) {
                Some(EnrollError::ClashRegistered { other })
            } else if let Some(other) =
                self.find_clash(me.timetable.waitlisted_entries(), my_incoming)
            {
                Some(EnrollError::ClashWaitlisted { other })
            } else if let Some(other) =
                self.find_clash(peer.timetable.registered_entries(), peer_incoming)
            {
                Some(EnrollError::PeerClashRegistered { other })
            } else if let Some(other) =
                self.find_clash(peer.timetable.waitlisted_entries(), peer_incoming)
            {
                Some(EnrollError::PeerClashWaitlisted { other })
            } else {
                None
            }
        };

        if let Some(err) = failure {
            self.catalog
                .section_mut(code, my_section_id)?
                .admit(student_id);
            self.catalog
                .section_mut(code, peer_section_id)?
                .admit(peer_id);
            self.student_mut(student_id)?
                .timetable
                .insert_registered(code, my_section_id);
            self.student_mut(peer_id)?
                .timetable
                .insert_registered(code, peer_section_id);
            debug!(
                "Peer swap of {} and {} in {} rolled back: {}",
                student_id, peer_id, code, err
            );
            return Err(err);
        }

        self.catalog
            .section_mut(code, peer_section_id)?
            .admit(student_id);
        self.catalog
            .section_mut(code, my_section_id)?
            .admit(peer_id);
        self.student_mut(student_id)?
            .timetable
            .insert_registered(code, peer_section_id);
        self.student_mut(peer_id)?
            .timetable
            .insert_registered(code, my_section_id);

        info!(
            "Peer swap in {}: {} index {} <> {} index {}",
            code, student_id, my_section_id, peer_id, peer_section_id
        );
        self.notifier.notify(
            student_id,
            &format!("Swapped index for {code} with {peer_id}: now holding index {peer_section_id}"),
        );
        self.notifier.notify(
            peer_id,
            &format!("Swapped index for {code} with {student_id}: now holding index {my_section_id}"),
        );
        Ok(())
    }

    /// Edits a section's capacity. The only catalog-admin operation routed
    /// through the engine, because it interacts with the occupancy invariant.
    pub fn set_capacity(
        &mut self,
        code: &str,
        section_id: SectionId,
        new_capacity: u32,
    ) -> Result<(), EnrollError> {
        self.catalog
            .section_mut(code, section_id)?
            .set_capacity(new_capacity)?;
        info!(
            "Capacity of {} index {} set to {}",
            code, section_id, new_capacity
        );
        Ok(())
    }

    /// Re-applies a persisted registration without validation or
    /// notification. Only used when replaying a snapshot at startup.
    pub(crate) fn restore_registration(
        &mut self,
        student_id: &str,
        code: &str,
        section_id: SectionId,
    ) -> Result<(), EnrollError> {
        self.student(student_id)?;
        self.catalog.section_mut(code, section_id)?.admit(student_id);
        self.student_mut(student_id)?
            .timetable
            .insert_registered(code, section_id);
        Ok(())
    }

    /// Re-applies a persisted waitlist place. Callers must replay rows in
    /// their original enqueue order to keep the FIFO intact.
    pub(crate) fn restore_waitlist(
        &mut self,
        student_id: &str,
        code: &str,
        section_id: SectionId,
    ) -> Result<(), EnrollError> {
        self.student(student_id)?;
        self.catalog
            .section_mut(code, section_id)?
            .enqueue_waitlist(student_id);
        self.student_mut(student_id)?
            .timetable
            .insert_waitlisted(code, section_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::OutboxNotifier;
    use chrono::{NaiveTime, Weekday};

    fn lesson(day: Weekday, start: (u32, u32), end: (u32, u32)) -> Lesson {
        Lesson::new(
            LessonKind::Lecture,
            day,
            NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        )
        .unwrap()
    }

    /// Engine with a small catalog and three students, behind a 21 AU cap.
    ///
    /// CZ1001 (3 AU): 10001 Mon 08-10 cap 2, 10002 Tue 08-10 cap 1,
    ///                10003 Wed 08-10 cap 1
    /// CZ2002 (3 AU): 20001 Mon 09-11 cap 1, 20002 Wed 10-12 cap 5
    /// CZ3003 (3 AU): 30001 Tue 09-11 cap 5
    /// CZ9000 (18 AU): 90001 Fri 14-16 cap 10
    fn engine() -> (Engine, Arc<OutboxNotifier>) {
        let outbox = Arc::new(OutboxNotifier::new());
        let mut engine = Engine::new(DEFAULT_MAX_LOAD, outbox.clone());

        let mut cz1001 = Course::new("CZ1001", "Engineering Mathematics", School::Science, 3);
        cz1001.add_section(Section::new(
            10001,
            "CZ1001",
            2,
            vec![lesson(Weekday::Mon, (8, 0), (10, 0))],
        ));
        cz1001.add_section(Section::new(
            10002,
            "CZ1001",
            1,
            vec![lesson(Weekday::Tue, (8, 0), (10, 0))],
        ));
        cz1001.add_section(Section::new(
            10003,
            "CZ1001",
            1,
            vec![lesson(Weekday::Wed, (8, 0), (10, 0))],
        ));
        engine.add_course(cz1001);

        let mut cz2002 = Course::new("CZ2002", "Object Oriented Design", School::Computing, 3);
        cz2002.add_section(Section::new(
            20001,
            "CZ2002",
            1,
            vec![lesson(Weekday::Mon, (9, 0), (11, 0))],
        ));
        cz2002.add_section(Section::new(
            20002,
            "CZ2002",
            5,
            vec![lesson(Weekday::Wed, (10, 0), (12, 0))],
        ));
        engine.add_course(cz2002);

        let mut cz3003 = Course::new("CZ3003", "Software Engineering", School::Computing, 3);
        cz3003.add_section(Section::new(
            30001,
            "CZ3003",
            5,
            vec![lesson(Weekday::Tue, (9, 0), (11, 0))],
        ));
        engine.add_course(cz3003);

        let mut cz9000 = Course::new("CZ9000", "Final Year Project", School::Engineering, 18);
        cz9000.add_section(Section::new(
            90001,
            "CZ9000",
            10,
            vec![lesson(Weekday::Fri, (14, 0), (16, 0))],
        ));
        engine.add_course(cz9000);

        engine.add_student(Student::new("u1", "Aisha", Some("aisha@u.example")));
        engine.add_student(Student::new("u2", "Ben", None));
        engine.add_student(Student::new("u3", "Carol", None));

        (engine, outbox)
    }

    fn state(engine: &Engine, student: &str, code: &str) -> EnrollmentState {
        engine.student(student).unwrap().timetable.state_of(code)
    }

    #[test]
    fn test_register_admits_and_notifies() {
        let (mut engine, outbox) = engine();
        engine.register("u1", "CZ1001", 10001).unwrap();

        assert_eq!(state(&engine, "u1", "CZ1001"), EnrollmentState::Registered);
        let section = engine.catalog().section("CZ1001", 10001).unwrap();
        assert!(section.is_registered("u1"));
        assert_eq!(section.available_seats(), 1);
        assert_eq!(outbox.pending_count("u1"), 1);
    }

    #[test]
    fn test_register_twice_is_rejected() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ1001", 10001).unwrap();
        let err = engine.register("u1", "CZ1001", 10002).unwrap_err();
        assert!(matches!(err, EnrollError::AlreadyRegistered { .. }));
    }

    #[test]
    fn test_register_unknown_entities() {
        let (mut engine, _) = engine();
        assert!(engine
            .register("u1", "CZ0000", 1)
            .unwrap_err()
            .is_not_found());
        assert!(engine
            .register("u1", "CZ1001", 99999)
            .unwrap_err()
            .is_not_found());
        assert!(engine
            .register("ghost", "CZ1001", 10001)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_register_clash_with_registered_course() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ1001", 10001).unwrap();

        // Mon 08-10 vs Mon 09-11
        let err = engine.register("u1", "CZ2002", 20001).unwrap_err();
        assert_eq!(
            err,
            EnrollError::ClashRegistered {
                other: "CZ1001".to_string()
            }
        );
        assert_eq!(state(&engine, "u1", "CZ2002"), EnrollmentState::None);
    }

    #[test]
    fn test_register_clash_with_waitlisted_course() {
        let (mut engine, _) = engine();
        // Fill CZ1001 index 10002 (Tue 08-10, cap 1), waitlist u1 on it.
        engine.register("u2", "CZ1001", 10002).unwrap();
        let err = engine.register("u1", "CZ1001", 10002).unwrap_err();
        assert!(err.suggests_waitlist());
        engine.add_to_waitlist("u1", "CZ1001", 10002).unwrap();

        // Tue 09-11 clashes with the waitlisted Tue 08-10.
        let err = engine.register("u1", "CZ3003", 30001).unwrap_err();
        assert_eq!(
            err,
            EnrollError::ClashWaitlisted {
                other: "CZ1001".to_string()
            }
        );
    }

    #[test]
    fn test_register_already_waitlisted_precedes_clash() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ2002", 20001).unwrap(); // Mon 09-11
        engine.register("u2", "CZ1001", 10002).unwrap(); // Tue 08-10, full
        assert!(engine
            .register("u1", "CZ1001", 10002)
            .unwrap_err()
            .suggests_waitlist());
        engine.add_to_waitlist("u1", "CZ1001", 10002).unwrap();

        // CZ1001 index 10001 (Mon 08-10) clashes with the registered CZ2002,
        // but the duplicate waitlist place is reported first.
        let err = engine.register("u1", "CZ1001", 10001).unwrap_err();
        assert_eq!(
            err,
            EnrollError::AlreadyWaitlisted {
                code: "CZ1001".to_string()
            }
        );
    }

    #[test]
    fn test_clash_reported_before_vacancy() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ1001", 10001).unwrap();
        engine.register("u2", "CZ2002", 20001).unwrap();

        // CZ2002 index 20001 is now full *and* clashes with u1's CZ1001.
        let err = engine.register("u1", "CZ2002", 20001).unwrap_err();
        assert!(matches!(err, EnrollError::ClashRegistered { .. }));
    }

    #[test]
    fn test_load_cap_counts_registered_and_waitlisted() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ9000", 90001).unwrap(); // 18 AU
        engine.register("u1", "CZ1001", 10002).unwrap(); // 21 AU, at the cap

        let err = engine.register("u1", "CZ2002", 20002).unwrap_err();
        assert_eq!(
            err,
            EnrollError::LoadExceeded {
                code: "CZ2002".to_string(),
                would_be: 24,
                max_load: DEFAULT_MAX_LOAD,
            }
        );
    }

    #[test]
    fn test_load_checked_before_clash() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ9000", 90001).unwrap();
        engine.register("u1", "CZ1001", 10001).unwrap(); // Mon 08-10, 21 AU

        // CZ2002 index 20001 clashes, but the load cap fires first.
        let err = engine.register("u1", "CZ2002", 20001).unwrap_err();
        assert!(matches!(err, EnrollError::LoadExceeded { .. }));
    }

    #[test]
    fn test_no_vacancy_waitlist_and_promotion() {
        let (mut engine, outbox) = engine();
        engine.register("u1", "CZ1001", 10002).unwrap();

        let err = engine.register("u2", "CZ1001", 10002).unwrap_err();
        assert_eq!(
            err,
            EnrollError::NoVacancy {
                code: "CZ1001".to_string(),
                section_id: 10002
            }
        );

        engine.add_to_waitlist("u2", "CZ1001", 10002).unwrap();
        assert_eq!(state(&engine, "u2", "CZ1001"), EnrollmentState::Waitlisted);

        engine.drop_registered("u1", "CZ1001").unwrap();

        assert_eq!(state(&engine, "u1", "CZ1001"), EnrollmentState::None);
        assert_eq!(state(&engine, "u2", "CZ1001"), EnrollmentState::Registered);
        let section = engine.catalog().section("CZ1001", 10002).unwrap();
        assert!(section.is_registered("u2"));
        assert_eq!(section.waitlist_len(), 0);
        // waitlist confirmation + promotion registration
        assert_eq!(outbox.pending_count("u2"), 2);
    }

    #[test]
    fn test_promotion_is_fifo() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ1001", 10002).unwrap();
        engine.add_to_waitlist("u2", "CZ1001", 10002).unwrap();
        engine.add_to_waitlist("u3", "CZ1001", 10002).unwrap();

        engine.drop_registered("u1", "CZ1001").unwrap();
        assert_eq!(state(&engine, "u2", "CZ1001"), EnrollmentState::Registered);
        assert_eq!(state(&engine, "u3", "CZ1001"), EnrollmentState::Waitlisted);

        engine.drop_registered("u2", "CZ1001").unwrap();
        assert_eq!(state(&engine, "u3", "CZ1001"), EnrollmentState::Registered);
        let section = engine.catalog().section("CZ1001", 10002).unwrap();
        assert_eq!(section.waitlist_len(), 0);
    }

    #[test]
    fn test_drop_waitlisted_does_not_promote() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ1001", 10002).unwrap();
        engine.add_to_waitlist("u2", "CZ1001", 10002).unwrap();
        engine.add_to_waitlist("u3", "CZ1001", 10002).unwrap();

        engine.drop_waitlisted("u2", "CZ1001").unwrap();

        assert_eq!(state(&engine, "u2", "CZ1001"), EnrollmentState::None);
        assert_eq!(state(&engine, "u3", "CZ1001"), EnrollmentState::Waitlisted);
        assert_eq!(state(&engine, "u1", "CZ1001"), EnrollmentState::Registered);
        let section = engine.catalog().section("CZ1001", 10002).unwrap();
        assert_eq!(section.waitlist_len(), 1);
    }

    #[test]
    fn test_drop_without_holding_course() {
        let (mut engine, _) = engine();
        assert!(matches!(
            engine.drop_registered("u1", "CZ1001").unwrap_err(),
            EnrollError::NotRegistered { .. }
        ));
        assert!(matches!(
            engine.drop_waitlisted("u1", "CZ1001").unwrap_err(),
            EnrollError::NotWaitlisted { .. }
        ));
    }

    #[test]
    fn test_failed_promotion_is_skipped() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ1001", 10002).unwrap(); // Tue 08-10, cap 1
        engine.register("u2", "CZ3003", 30001).unwrap(); // Tue 09-11

        // A snapshot replay can introduce a waitlist place that no longer
        // passes validation; promotion must not tear down the drop.
        engine.restore_waitlist("u2", "CZ1001", 10002).unwrap();

        engine.drop_registered("u1", "CZ1001").unwrap();

        assert_eq!(state(&engine, "u2", "CZ1001"), EnrollmentState::None);
        let section = engine.catalog().section("CZ1001", 10002).unwrap();
        assert_eq!(section.available_seats(), 1);
        assert_eq!(section.waitlist_len(), 0);
    }

    #[test]
    fn test_swap_section_moves_the_student() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ1001", 10001).unwrap();
        engine.swap_section("u1", "CZ1001", 10002).unwrap();

        assert_eq!(
            engine
                .student("u1")
                .unwrap()
                .timetable
                .registered_section("CZ1001"),
            Some(10002)
        );
        assert!(!engine
            .catalog()
            .section("CZ1001", 10001)
            .unwrap()
            .is_registered("u1"));
        assert!(engine
            .catalog()
            .section("CZ1001", 10002)
            .unwrap()
            .is_registered("u1"));
    }

    #[test]
    fn test_swap_to_same_section_rejected() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ1001", 10001).unwrap();
        assert_eq!(
            engine.swap_section("u1", "CZ1001", 10001).unwrap_err(),
            EnrollError::SameSection
        );
    }

    #[test]
    fn test_swap_does_not_trigger_promotion() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ1001", 10001).unwrap();
        engine.register("u2", "CZ1001", 10001).unwrap(); // 10001 now full
        engine.add_to_waitlist("u3", "CZ1001", 10001).unwrap();

        engine.swap_section("u1", "CZ1001", 10002).unwrap();

        // The vacated seat stays open; the swap is not a real drop.
        assert_eq!(state(&engine, "u3", "CZ1001"), EnrollmentState::Waitlisted);
        assert_eq!(
            engine
                .catalog()
                .section("CZ1001", 10001)
                .unwrap()
                .available_seats(),
            1
        );
    }

    #[test]
    fn test_swap_no_vacancy_rolls_back() {
        let (mut engine, _) = engine();
        engine.register("u2", "CZ1001", 10003).unwrap(); // target full
        engine.register("u1", "CZ1001", 10001).unwrap();

        let before = engine.student("u1").unwrap().timetable.clone();
        let err = engine.swap_section("u1", "CZ1001", 10003).unwrap_err();
        assert_eq!(
            err,
            EnrollError::NoVacancySwap {
                code: "CZ1001".to_string(),
                section_id: 10003
            }
        );

        assert_eq!(engine.student("u1").unwrap().timetable, before);
        assert!(engine
            .catalog()
            .section("CZ1001", 10001)
            .unwrap()
            .is_registered("u1"));
        assert!(!engine
            .catalog()
            .section("CZ1001", 10003)
            .unwrap()
            .is_registered("u1"));
    }

    #[test]
    fn test_swap_clash_rolls_back() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ1001", 10001).unwrap(); // Mon 08-10
        engine.register("u1", "CZ2002", 20002).unwrap(); // Wed 10-12

        let before = engine.student("u1").unwrap().timetable.clone();
        // CZ2002 index 20001 is Mon 09-11, clashing with CZ1001.
        let err = engine.swap_section("u1", "CZ2002", 20001).unwrap_err();
        assert_eq!(
            err,
            EnrollError::ClashRegistered {
                other: "CZ1001".to_string()
            }
        );

        assert_eq!(engine.student("u1").unwrap().timetable, before);
        assert!(engine
            .catalog()
            .section("CZ2002", 20002)
            .unwrap()
            .is_registered("u1"));
    }

    #[test]
    fn test_swap_waitlisted_clash_rolls_back() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ1001", 10003).unwrap(); // Wed 08-10

        // u1 waitlists CZ2002 index 20001 (Mon 09-11) after it fills.
        engine.register("u2", "CZ2002", 20001).unwrap();
        assert!(engine
            .register("u1", "CZ2002", 20001)
            .unwrap_err()
            .suggests_waitlist());
        engine.add_to_waitlist("u1", "CZ2002", 20001).unwrap();

        let before = engine.student("u1").unwrap().timetable.clone();
        // CZ1001 index 10001 is Mon 08-10, clashing with the waitlisted
        // Mon 09-11.
        let err = engine.swap_section("u1", "CZ1001", 10001).unwrap_err();
        assert_eq!(
            err,
            EnrollError::ClashWaitlisted {
                other: "CZ2002".to_string()
            }
        );
        assert_eq!(engine.student("u1").unwrap().timetable, before);
        assert!(engine
            .catalog()
            .section("CZ1001", 10003)
            .unwrap()
            .is_registered("u1"));

        // The waitlist place is still promotable once the seat frees.
        engine.drop_registered("u2", "CZ2002").unwrap();
        assert_eq!(state(&engine, "u1", "CZ2002"), EnrollmentState::Registered);
    }

    #[test]
    fn test_peer_swap_exchanges_sections() {
        let (mut engine, outbox) = engine();
        engine.register("u1", "CZ1001", 10001).unwrap();
        engine.register("u2", "CZ1001", 10002).unwrap();
        outbox.drain("u1");
        outbox.drain("u2");

        engine.swap_with_peer("u1", "u2", "CZ1001").unwrap();

        assert_eq!(
            engine
                .student("u1")
                .unwrap()
                .timetable
                .registered_section("CZ1001"),
            Some(10002)
        );
        assert_eq!(
            engine
                .student("u2")
                .unwrap()
                .timetable
                .registered_section("CZ1001"),
            Some(10001)
        );
        assert!(engine
            .catalog()
            .section("CZ1001", 10002)
            .unwrap()
            .is_registered("u1"));
        assert!(engine
            .catalog()
            .section("CZ1001", 10001)
            .unwrap()
            .is_registered("u2"));
        assert_eq!(outbox.pending_count("u1"), 1);
        assert_eq!(outbox.pending_count("u2"), 1);
    }

    #[test]
    fn test_peer_swap_same_section_rejected() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ1001", 10001).unwrap();
        engine.register("u2", "CZ1001", 10001).unwrap();
        assert_eq!(
            engine.swap_with_peer("u1", "u2", "CZ1001").unwrap_err(),
            EnrollError::SameSection
        );
    }

    #[test]
    fn test_peer_swap_requires_both_registered() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ1001", 10001).unwrap();
        assert!(matches!(
            engine.swap_with_peer("u1", "u2", "CZ1001").unwrap_err(),
            EnrollError::PeerNotRegistered { .. }
        ));
        assert!(matches!(
            engine.swap_with_peer("u3", "u1", "CZ1001").unwrap_err(),
            EnrollError::NotRegistered { .. }
        ));
    }

    #[test]
    fn test_peer_swap_peer_clash_rolls_back_both() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ1001", 10002).unwrap(); // Tue 08-10
        engine.register("u2", "CZ1001", 10001).unwrap(); // Mon 08-10
        engine.register("u2", "CZ3003", 30001).unwrap(); // Tue 09-11

        let before_u1 = engine.student("u1").unwrap().timetable.clone();
        let before_u2 = engine.student("u2").unwrap().timetable.clone();

        // u2 would receive Tue 08-10, clashing with their CZ3003.
        let err = engine.swap_with_peer("u1", "u2", "CZ1001").unwrap_err();
        assert_eq!(
            err,
            EnrollError::PeerClashRegistered {
                other: "CZ3003".to_string()
            }
        );

        assert_eq!(engine.student("u1").unwrap().timetable, before_u1);
        assert_eq!(engine.student("u2").unwrap().timetable, before_u2);
        assert!(engine
            .catalog()
            .section("CZ1001", 10002)
            .unwrap()
            .is_registered("u1"));
        assert!(engine
            .catalog()
            .section("CZ1001", 10001)
            .unwrap()
            .is_registered("u2"));
    }

    #[test]
    fn test_peer_swap_self_waitlist_clash_rolls_back() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ1001", 10002).unwrap(); // Tue 08-10
        engine.register("u2", "CZ1001", 10003).unwrap(); // Wed 08-10

        // u1 waitlists CZ2002 index 20001 (Mon 09-11) after it fills.
        engine.register("u3", "CZ2002", 20001).unwrap();
        assert!(engine
            .register("u1", "CZ2002", 20001)
            .unwrap_err()
            .suggests_waitlist());
        engine.add_to_waitlist("u1", "CZ2002", 20001).unwrap();

        // Move u2 to the Mon section so u1 would receive Mon 08-10,
        // clashing with the waitlisted Mon 09-11.
        engine.swap_section("u2", "CZ1001", 10001).unwrap();

        let before_u1 = engine.student("u1").unwrap().timetable.clone();
        let err = engine.swap_with_peer("u1", "u2", "CZ1001").unwrap_err();
        assert_eq!(
            err,
            EnrollError::ClashWaitlisted {
                other: "CZ2002".to_string()
            }
        );
        assert_eq!(engine.student("u1").unwrap().timetable, before_u1);
    }

    #[test]
    fn test_peer_swap_peer_waitlist_clash_rolls_back_both() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ1001", 10001).unwrap(); // Mon 08-10
        engine.register("u2", "CZ1001", 10003).unwrap(); // Wed 08-10

        // u2 waitlists CZ2002 index 20001 (Mon 09-11) after it fills.
        engine.register("u3", "CZ2002", 20001).unwrap();
        assert!(engine
            .register("u2", "CZ2002", 20001)
            .unwrap_err()
            .suggests_waitlist());
        engine.add_to_waitlist("u2", "CZ2002", 20001).unwrap();

        let before_u1 = engine.student("u1").unwrap().timetable.clone();
        let before_u2 = engine.student("u2").unwrap().timetable.clone();

        // u2 would receive Mon 08-10, clashing with their waitlisted CZ2002.
        let err = engine.swap_with_peer("u1", "u2", "CZ1001").unwrap_err();
        assert_eq!(
            err,
            EnrollError::PeerClashWaitlisted {
                other: "CZ2002".to_string()
            }
        );
        assert_eq!(engine.student("u1").unwrap().timetable, before_u1);
        assert_eq!(engine.student("u2").unwrap().timetable, before_u2);
        assert!(engine
            .catalog()
            .section("CZ1001", 10001)
            .unwrap()
            .is_registered("u1"));
        assert!(engine
            .catalog()
            .section("CZ1001", 10003)
            .unwrap()
            .is_registered("u2"));
    }

    #[test]
    fn test_peer_swap_ignores_vacancy() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ1001", 10002).unwrap(); // cap 1, full
        engine.register("u2", "CZ1001", 10003).unwrap(); // cap 1, full

        engine.swap_with_peer("u1", "u2", "CZ1001").unwrap();
        assert_eq!(
            engine
                .student("u1")
                .unwrap()
                .timetable
                .registered_section("CZ1001"),
            Some(10003)
        );
        assert_eq!(
            engine
                .student("u2")
                .unwrap()
                .timetable
                .registered_section("CZ1001"),
            Some(10002)
        );
    }

    #[test]
    fn test_set_capacity_guarded_by_occupancy() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ1001", 10001).unwrap();
        engine.register("u2", "CZ1001", 10001).unwrap();

        let err = engine.set_capacity("CZ1001", 10001, 1).unwrap_err();
        assert!(matches!(err, EnrollError::InvalidCapacity { .. }));
        assert_eq!(
            engine.catalog().section("CZ1001", 10001).unwrap().capacity(),
            2
        );

        engine.set_capacity("CZ1001", 10001, 5).unwrap();
        assert_eq!(
            engine.catalog().section("CZ1001", 10001).unwrap().capacity(),
            5
        );
    }

    #[test]
    fn test_capacity_invariant_holds_throughout() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ1001", 10002).unwrap();
        let _ = engine.register("u2", "CZ1001", 10002);
        engine.add_to_waitlist("u2", "CZ1001", 10002).unwrap();
        engine.drop_registered("u1", "CZ1001").unwrap();
        let _ = engine.register("u3", "CZ1001", 10002);

        for course in engine.catalog().courses() {
            for section in course.sections() {
                assert!(section.registered_count() <= section.capacity() as usize);
            }
        }
    }

    #[test]
    fn test_snapshot_restore_preserves_waitlist_order() {
        let (mut engine, _) = engine();
        engine.register("u1", "CZ1001", 10002).unwrap();
        engine.restore_waitlist("u2", "CZ1001", 10002).unwrap();
        engine.restore_waitlist("u3", "CZ1001", 10002).unwrap();

        engine.drop_registered("u1", "CZ1001").unwrap();
        assert_eq!(state(&engine, "u2", "CZ1001"), EnrollmentState::Registered);
        assert_eq!(state(&engine, "u3", "CZ1001"), EnrollmentState::Waitlisted);
    }
}
