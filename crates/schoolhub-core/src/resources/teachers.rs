use crate::api::ApiError;
use crate::models::{Teacher, TeacherInput};
use crate::query::{Mutation, Query, QueryOutcome};
use crate::SchoolClient;

use super::keys;

/// Teacher records at `/teacher`.
#[derive(Clone, Copy)]
pub struct Teachers<'a> {
    client: &'a SchoolClient,
}

impl<'a> Teachers<'a> {
    pub(crate) fn new(client: &'a SchoolClient) -> Self {
        Self { client }
    }

    pub async fn list(self) -> Result<QueryOutcome<Vec<Teacher>>, ApiError> {
        self.client.fetch(&Query::new(keys::teachers(), "/teacher")).await
    }

    pub async fn get(self, id: i64) -> Result<QueryOutcome<Teacher>, ApiError> {
        let query = Query::new(keys::teacher(id), format!("/teacher/{}", id));
        self.client.fetch(&query).await
    }

    pub async fn create(self, input: &TeacherInput) -> Result<Teacher, ApiError> {
        input.validate_for(true)?;
        let mutation = Mutation::post("/teacher")
            .json(input)?
            .invalidates([keys::teachers()]);
        self.client.mutate(mutation).await
    }

    pub async fn update(self, id: i64, input: &TeacherInput) -> Result<Teacher, ApiError> {
        input.validate_for(false)?;
        let mutation = Mutation::put(format!("/teacher/{}", id))
            .json(input)?
            .invalidates([keys::teachers(), keys::teacher(id)])
            .invalidates_under([keys::sections()]);
        self.client.mutate(mutation).await
    }

    // Sections embed their home-room teacher, so the update above and the
    // delete below refresh every section read.

    /// Deleting a teacher also drops home-room assignments on sections
    pub async fn delete(self, id: i64) -> Result<(), ApiError> {
        let mutation = Mutation::delete(format!("/teacher/{}", id))
            .invalidates([keys::teachers(), keys::teacher(id)])
            .invalidates_under([keys::sections()]);
        self.client.mutate_value(mutation).await?;
        Ok(())
    }
}
