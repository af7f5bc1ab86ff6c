use crate::api::ApiError;
use crate::models::{Role, Student, StudentInput};
use crate::query::{Enabled, Mutation, Query, QueryOutcome};
use crate::SchoolClient;

use super::{keys, STAFF};

/// Student records at `/student`.
#[derive(Clone, Copy)]
pub struct Students<'a> {
    client: &'a SchoolClient,
}

impl<'a> Students<'a> {
    pub(crate) fn new(client: &'a SchoolClient) -> Self {
        Self { client }
    }

    pub fn list_query() -> Query<Vec<Student>> {
        Query::new(keys::students(), "/student").enabled(Enabled::Roles(STAFF))
    }

    pub async fn list(self) -> Result<QueryOutcome<Vec<Student>>, ApiError> {
        self.client.fetch(&Self::list_query()).await
    }

    pub async fn get(self, id: i64) -> Result<QueryOutcome<Student>, ApiError> {
        let query = Query::new(keys::student(id), format!("/student/{}", id));
        self.client.fetch(&query).await
    }

    /// The signed-in student's own record
    pub async fn me(self) -> Result<QueryOutcome<Student>, ApiError> {
        let query = Query::new(keys::my_student_profile(), "/student/me")
            .enabled(Enabled::Roles(&[Role::Student]));
        self.client.fetch(&query).await
    }

    /// Students of one section; disabled until a section is chosen
    pub async fn in_section(self, section_id: Option<i64>) -> Result<QueryOutcome<Vec<Student>>, ApiError> {
        let id = section_id.unwrap_or_default();
        let query = Query::new(keys::students_in_section(id), format!("/student/section/{}", id))
            .enabled(Enabled::Roles(STAFF))
            .when(section_id.is_some());
        self.client.fetch(&query).await
    }

    /// Section counts embed their students, so every section read goes stale
    pub async fn create(self, input: &StudentInput) -> Result<Student, ApiError> {
        input.validate_for(true)?;
        let mut invalidates = vec![keys::students()];
        if let Some(section_id) = input.section_id {
            invalidates.push(keys::students_in_section(section_id));
        }
        let mutation = Mutation::post("/student")
            .json(input)?
            .invalidates(invalidates)
            .invalidates_under([keys::sections()]);
        self.client.mutate(mutation).await
    }

    /// The student's previous section is unknown here, so every roster goes stale
    pub async fn update(self, id: i64, input: &StudentInput) -> Result<Student, ApiError> {
        input.validate_for(false)?;
        let mutation = Mutation::put(format!("/student/{}", id))
            .json(input)?
            .invalidates([keys::students(), keys::student(id), keys::my_student_profile()])
            .invalidates_under([keys::section_rosters(), keys::sections()]);
        self.client.mutate(mutation).await
    }

    pub async fn delete(self, id: i64) -> Result<(), ApiError> {
        let mutation = Mutation::delete(format!("/student/{}", id))
            .invalidates([keys::students(), keys::student(id)])
            .invalidates_under([keys::section_rosters(), keys::sections()]);
        self.client.mutate_value(mutation).await?;
        Ok(())
    }
}
