//! Student records.

use serde::{Deserialize, Serialize};

use super::timetable::Timetable;

/// A student: identity fields plus the timetable they exclusively own.
/// All enrollment mutations go through the engine, which is the only code
/// that writes into the timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    #[serde(default)]
    pub timetable: Timetable,
}

impl Student {
    pub fn new(id: &str, name: &str, email: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            email: email.map(str::to_string),
            timetable: Timetable::new(),
        }
    }
}
