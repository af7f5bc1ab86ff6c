//! Assessment results and attendance.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::school::Subject;

/// One student's marks in one subject.
///
/// Components are optional because teachers fill them in over the term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    #[serde(default)]
    pub subject: Option<Subject>,
    #[serde(default)]
    pub test1: Option<f64>,
    #[serde(default)]
    pub test2: Option<f64>,
    #[serde(default)]
    pub mid: Option<f64>,
    #[serde(rename = "final", default)]
    pub final_exam: Option<f64>,
    #[serde(default)]
    pub assignment: Option<f64>,
    #[serde(default)]
    pub quiz: Option<f64>,
}

impl ScoreRecord {
    /// Sum of the components entered so far
    pub fn total(&self) -> f64 {
        [
            self.test1,
            self.test2,
            self.mid,
            self.final_exam,
            self.assignment,
            self.quiz,
        ]
        .iter()
        .flatten()
        .sum()
    }
}

/// Per-student aggregate across all subjects in a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectiveResult {
    pub student_id: i64,
    #[serde(default)]
    pub section_id: Option<i64>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub average: Option<f64>,
    #[serde(default)]
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreInput {
    pub student_id: i64,
    pub subject_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mid: Option<f64>,
    #[serde(rename = "final", skip_serializing_if = "Option::is_none")]
    pub final_exam: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub student_id: i64,
    #[serde(default)]
    pub section_id: Option<i64>,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// A whole section's roll call for one day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceInput {
    pub section_id: i64,
    pub date: NaiveDate,
    pub records: Vec<AttendanceEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub student_id: i64,
    pub status: AttendanceStatus,
}
