use crate::api::ApiError;
use crate::models::{CalendarEvent, CalendarEventInput};
use crate::query::{Mutation, Query, QueryOutcome};
use crate::validation::Validate;
use crate::SchoolClient;

use super::{keys, DIRECTOR_ONLY};

/// School calendar at `/calendar`. Everyone reads; only directors edit.
#[derive(Clone, Copy)]
pub struct Calendar<'a> {
    client: &'a SchoolClient,
}

impl<'a> Calendar<'a> {
    pub(crate) fn new(client: &'a SchoolClient) -> Self {
        Self { client }
    }

    pub async fn list(self) -> Result<QueryOutcome<Vec<CalendarEvent>>, ApiError> {
        self.client.fetch(&Query::new(keys::calendar(), "/calendar")).await
    }

    pub async fn create(self, input: &CalendarEventInput) -> Result<CalendarEvent, ApiError> {
        input.validate()?;
        let mutation = Mutation::post("/calendar")
            .require_roles(DIRECTOR_ONLY)
            .json(input)?
            .invalidates([keys::calendar()]);
        self.client.mutate(mutation).await
    }

    pub async fn update(self, id: i64, input: &CalendarEventInput) -> Result<CalendarEvent, ApiError> {
        input.validate()?;
        let mutation = Mutation::put(format!("/calendar/{}", id))
            .require_roles(DIRECTOR_ONLY)
            .json(input)?
            .invalidates([keys::calendar()]);
        self.client.mutate(mutation).await
    }

    pub async fn delete(self, id: i64) -> Result<(), ApiError> {
        let mutation = Mutation::delete(format!("/calendar/{}", id))
            .require_roles(DIRECTOR_ONLY)
            .invalidates([keys::calendar()]);
        self.client.mutate_value(mutation).await?;
        Ok(())
    }
}
