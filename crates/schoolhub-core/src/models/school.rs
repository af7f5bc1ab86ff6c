//! Grouping entities: grade levels, subjects and sections.

use serde::{Deserialize, Serialize};

use super::people::{Student, Teacher};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeLevel {
    pub id: i64,
    pub level: i32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    #[serde(rename = "gradeLevelId", default)]
    pub grade_level_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: i64,
    pub name: String,
    pub grade_level_id: i64,
    #[serde(default)]
    pub home_room_teacher_id: Option<i64>,
    #[serde(default)]
    pub home_room_teacher: Option<Teacher>,
    #[serde(default)]
    pub students: Vec<Student>,
}

impl Section {
    pub fn student_count(&self) -> usize {
        self.students.len()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GradeLevelInput {
    pub level: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectInput {
    pub name: String,
    pub grade_level_id: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionInput {
    pub name: String,
    pub grade_level_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_room_teacher_id: Option<i64>,
}

/// Head-count summary shown on the director dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DirectorOverview {
    pub total_students: u32,
    pub total_teachers: u32,
    pub total_parents: u32,
    pub total_sections: u32,
    pub active_teachers: u32,
}
