/// Row types for the enrollment snapshot database

#[derive(Debug, Clone)]
pub struct DbRegistration {
    pub student_id: String,
    pub course_code: String,
    pub section_id: i64,
}

#[derive(Debug, Clone)]
pub struct DbWaitlistEntry {
    pub student_id: String,
    pub course_code: String,
    pub section_id: i64,
    pub position: i64,
}

#[derive(Debug, Clone)]
pub struct DbCapacity {
    pub course_code: String,
    pub section_id: i64,
    pub capacity: i64,
}
