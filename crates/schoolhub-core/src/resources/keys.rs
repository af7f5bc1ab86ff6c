//! Cache keys for every resource read.
//!
//! Each endpoint gets its own key shape so two different reads never share
//! an entry, even when they take the same id.

use chrono::NaiveDate;

use crate::cache::CacheKey;

pub fn students() -> CacheKey {
    CacheKey::new("students")
}

pub fn student(id: i64) -> CacheKey {
    students().with(id)
}

pub fn my_student_profile() -> CacheKey {
    students().with("me")
}

/// Parent of every per-section roster key
pub fn section_rosters() -> CacheKey {
    students().with("section")
}

pub fn students_in_section(section_id: i64) -> CacheKey {
    section_rosters().with(section_id)
}

pub fn parents() -> CacheKey {
    CacheKey::new("parents")
}

pub fn parent(id: i64) -> CacheKey {
    parents().with(id)
}

pub fn my_children() -> CacheKey {
    parents().with("me").with("children")
}

pub fn teachers() -> CacheKey {
    CacheKey::new("teachers")
}

pub fn teacher(id: i64) -> CacheKey {
    teachers().with(id)
}

pub fn sections() -> CacheKey {
    CacheKey::new("sections")
}

pub fn section(id: i64) -> CacheKey {
    sections().with(id)
}

pub fn grade_levels() -> CacheKey {
    CacheKey::new("gradeLevels")
}

pub fn grade_level(id: i64) -> CacheKey {
    grade_levels().with(id)
}

pub fn subjects() -> CacheKey {
    CacheKey::new("subjects")
}

pub fn subjects_for_grade(grade_level_id: i64) -> CacheKey {
    subjects().with("gradeLevel").with(grade_level_id)
}

pub fn announcements() -> CacheKey {
    CacheKey::new("announcements")
}

pub fn announcement(id: i64) -> CacheKey {
    announcements().with(id)
}

pub fn calendar() -> CacheKey {
    CacheKey::new("calendar")
}

pub fn messages() -> CacheKey {
    CacheKey::new("messages")
}

pub fn conversation(user_id: i64) -> CacheKey {
    messages().with("user").with(user_id)
}

pub fn student_results(student_id: i64) -> CacheKey {
    CacheKey::new("results").with("student").with(student_id)
}

pub fn collective_results(section_id: i64) -> CacheKey {
    CacheKey::new("results").with("collective").with("section").with(section_id)
}

pub fn section_attendance(section_id: i64, date: NaiveDate) -> CacheKey {
    CacheKey::new("attendance").with("section").with(section_id).with(date)
}

pub fn student_attendance(student_id: i64) -> CacheKey {
    CacheKey::new("attendance").with("student").with(student_id)
}

pub fn director_overview() -> CacheKey {
    CacheKey::new("director").with("overview")
}
