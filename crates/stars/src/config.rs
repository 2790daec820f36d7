//! Configuration and seed-data loading.
//!
//! The engine itself takes plain values; this module reads them from JSON
//! files so a deployment is described by a config file plus a seed directory
//! holding the course catalog and the student roster.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::{Course, Engine, Lesson, LessonKind, School, Section, SectionId, Student};

fn default_max_load() -> u32 {
    crate::engine::DEFAULT_MAX_LOAD
}

fn default_bind_address() -> String {
    "127.0.0.1:8000".to_string()
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Cap on combined registered + waitlisted academic units per student.
    #[serde(default = "default_max_load")]
    pub max_load: u32,

    /// Address the API server binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Path of the SQLite enrollment snapshot; omit to run without one.
    #[serde(default)]
    pub snapshot_db_path: Option<String>,

    /// Directory holding `courses.json` and `students.json` seed files.
    #[serde(default)]
    pub seed_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_load: default_max_load(),
            bind_address: default_bind_address(),
            snapshot_db_path: None,
            seed_dir: None,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: EngineConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }
}

/// One lesson in a seeded section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedLesson {
    pub kind: LessonKind,
    pub day: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// One section in a seeded course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedSection {
    pub id: SectionId,
    pub capacity: u32,
    #[serde(default)]
    pub lessons: Vec<SeedLesson>,
}

/// One course in `courses.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedCourse {
    pub code: String,
    pub name: String,
    pub school: School,
    pub load_weight: u32,
    #[serde(default)]
    pub sections: Vec<SeedSection>,
}

/// One student in `students.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedStudent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Loads the catalog and roster seed files from a directory into the engine.
pub fn load_seed_dir(dir: &Path, engine: &mut Engine) -> anyhow::Result<()> {
    let courses_path = dir.join("courses.json");
    let students_path = dir.join("students.json");

    if courses_path.exists() {
        let content = fs::read_to_string(&courses_path)
            .with_context(|| format!("reading {}", courses_path.display()))?;
        let courses: Vec<SeedCourse> = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", courses_path.display()))?;
        let count = courses.len();
        for seed in courses {
            add_seed_course(engine, seed)?;
        }
        info!("Seeded {} courses from {}", count, courses_path.display());
    }

    if students_path.exists() {
        let content = fs::read_to_string(&students_path)
            .with_context(|| format!("reading {}", students_path.display()))?;
        let students: Vec<SeedStudent> = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", students_path.display()))?;
        let count = students.len();
        for seed in &students {
            if !engine.add_student(Student::new(&seed.id, &seed.name, seed.email.as_deref())) {
                bail!("duplicate student id {} in roster", seed.id);
            }
        }
        info!("Seeded {} students from {}", count, students_path.display());
    }

    Ok(())
}

fn add_seed_course(engine: &mut Engine, seed: SeedCourse) -> anyhow::Result<()> {
    let code = seed.code.clone();
    if !engine.add_course(Course::new(&code, &seed.name, seed.school, seed.load_weight)) {
        bail!("duplicate course code {} in catalog seed", code);
    }
    for section in seed.sections {
        if section.capacity == 0 {
            bail!("section {} of {} has zero capacity", section.id, code);
        }
        let mut lessons = Vec::with_capacity(section.lessons.len());
        for lesson in section.lessons {
            lessons.push(
                Lesson::new(lesson.kind, lesson.day, lesson.start, lesson.end).with_context(
                    || format!("invalid lesson in section {} of {}", section.id, code),
                )?,
            );
        }
        let added = engine
            .add_section(&code, Section::new(section.id, &code, section.capacity, lessons))
            .with_context(|| format!("adding section {} of {}", section.id, code))?;
        if !added {
            bail!("duplicate section id {} in {}", section.id, code);
        }
    }
    Ok(())
}
