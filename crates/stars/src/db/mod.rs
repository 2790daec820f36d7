/// Snapshot database for enrollment state
///
/// The engine is oblivious to durability; the server calls [`SnapshotDb::save`]
/// after each successful mutation and replays the snapshot into a freshly
/// seeded engine at startup. Rows that no longer validate against the seeded
/// catalog or roster are skipped with a warning rather than failing startup.

mod types;

pub use types::{DbCapacity, DbRegistration, DbWaitlistEntry};

use rusqlite::{Connection, Result};
use std::sync::Mutex;
use tracing::warn;

use crate::engine::Engine;

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_enrollment.sql");

pub struct SnapshotDb {
    db: Mutex<Connection>,
}

impl SnapshotDb {
    /// Opens (or creates) the snapshot database and initializes the schema.
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// In-memory snapshot, mainly for tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// Writes the full enrollment state in one transaction, replacing any
    /// previous snapshot.
    pub fn save(&self, engine: &Engine) -> Result<()> {
        let mut db = self.db.lock().unwrap();
        let tx = db.transaction()?;

        tx.execute("DELETE FROM registrations", [])?;
        tx.execute("DELETE FROM waitlists", [])?;
        tx.execute("DELETE FROM capacities", [])?;

        for course in engine.catalog().courses() {
            for section in course.sections() {
                tx.execute(
                    "INSERT INTO capacities (course_code, section_id, capacity)
                     VALUES (?1, ?2, ?3)",
                    (&course.code, section.id, section.capacity()),
                )?;
                for student_id in section.registered_students() {
                    tx.execute(
                        "INSERT INTO registrations (student_id, course_code, section_id)
                         VALUES (?1, ?2, ?3)",
                        (student_id, &course.code, section.id),
                    )?;
                }
                for (position, student_id) in section.waitlisted_students().enumerate() {
                    tx.execute(
                        "INSERT INTO waitlists (student_id, course_code, section_id, position)
                         VALUES (?1, ?2, ?3, ?4)",
                        (student_id, &course.code, section.id, position as i64),
                    )?;
                }
            }
        }

        tx.commit()
    }

    /// Replays the snapshot into an engine already seeded with the catalog
    /// and roster. Waitlist rows are applied in their saved position order
    /// so the FIFO survives the round trip.
    pub fn load_into(&self, engine: &mut Engine) -> Result<()> {
        for row in self.capacities()? {
            if let Err(e) =
                engine.set_capacity(&row.course_code, row.section_id as u32, row.capacity as u32)
            {
                warn!(
                    "Skipping stale capacity row for {} index {}: {}",
                    row.course_code, row.section_id, e
                );
            }
        }

        for row in self.registrations()? {
            if let Err(e) =
                engine.restore_registration(&row.student_id, &row.course_code, row.section_id as u32)
            {
                warn!(
                    "Skipping stale registration of {} in {} index {}: {}",
                    row.student_id, row.course_code, row.section_id, e
                );
            }
        }

        for row in self.waitlist_entries()? {
            if let Err(e) =
                engine.restore_waitlist(&row.student_id, &row.course_code, row.section_id as u32)
            {
                warn!(
                    "Skipping stale waitlist place of {} in {} index {}: {}",
                    row.student_id, row.course_code, row.section_id, e
                );
            }
        }

        Ok(())
    }

    fn registrations(&self) -> Result<Vec<DbRegistration>> {
        let db = self.db.lock().unwrap();
        let mut stmt =
            db.prepare("SELECT student_id, course_code, section_id FROM registrations")?;
        let rows = stmt.query_map([], |row| {
            Ok(DbRegistration {
                student_id: row.get(0)?,
                course_code: row.get(1)?,
                section_id: row.get(2)?,
            })
        })?;
        rows.collect()
    }

    fn waitlist_entries(&self) -> Result<Vec<DbWaitlistEntry>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT student_id, course_code, section_id, position
             FROM waitlists
             ORDER BY course_code, section_id, position",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DbWaitlistEntry {
                student_id: row.get(0)?,
                course_code: row.get(1)?,
                section_id: row.get(2)?,
                position: row.get(3)?,
            })
        })?;
        rows.collect()
    }

    fn capacities(&self) -> Result<Vec<DbCapacity>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare("SELECT course_code, section_id, capacity FROM capacities")?;
        let rows = stmt.query_map([], |row| {
            Ok(DbCapacity {
                course_code: row.get(0)?,
                section_id: row.get(1)?,
                capacity: row.get(2)?,
            })
        })?;
        rows.collect()
    }
}
