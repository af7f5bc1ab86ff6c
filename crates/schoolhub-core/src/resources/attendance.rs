use chrono::NaiveDate;

use crate::api::ApiError;
use crate::models::{AttendanceInput, AttendanceRecord};
use crate::query::{Enabled, Mutation, Query, QueryOutcome};
use crate::validation::Validate;
use crate::SchoolClient;

use super::{keys, STAFF};

/// Daily roll calls at `/attendance`.
#[derive(Clone, Copy)]
pub struct Attendance<'a> {
    client: &'a SchoolClient,
}

impl<'a> Attendance<'a> {
    pub(crate) fn new(client: &'a SchoolClient) -> Self {
        Self { client }
    }

    pub async fn for_section(self, section_id: i64, date: NaiveDate) -> Result<QueryOutcome<Vec<AttendanceRecord>>, ApiError> {
        let query = Query::new(
            keys::section_attendance(section_id, date),
            format!("/attendance/section/{}?date={}", section_id, date.format("%Y-%m-%d")),
        )
        .enabled(Enabled::Roles(STAFF));
        self.client.fetch(&query).await
    }

    pub async fn for_student(self, student_id: Option<i64>) -> Result<QueryOutcome<Vec<AttendanceRecord>>, ApiError> {
        let id = student_id.unwrap_or_default();
        let query = Query::new(keys::student_attendance(id), format!("/attendance/student/{}", id))
            .when(student_id.is_some());
        self.client.fetch(&query).await
    }

    /// Submit a section's roll call for one day
    pub async fn record(self, input: &AttendanceInput) -> Result<Vec<AttendanceRecord>, ApiError> {
        input.validate()?;
        let mut invalidates = vec![keys::section_attendance(input.section_id, input.date)];
        invalidates.extend(input.records.iter().map(|r| keys::student_attendance(r.student_id)));
        let mutation = Mutation::post("/attendance")
            .require_roles(STAFF)
            .json(input)?
            .invalidates(invalidates);
        self.client.mutate(mutation).await
    }
}
