use crate::api::ApiError;
use crate::models::{Parent, ParentInput, Role, Student};
use crate::query::{Enabled, Mutation, Query, QueryOutcome};
use crate::SchoolClient;

use super::{keys, STAFF};

/// Parent records at `/parent`.
#[derive(Clone, Copy)]
pub struct Parents<'a> {
    client: &'a SchoolClient,
}

impl<'a> Parents<'a> {
    pub(crate) fn new(client: &'a SchoolClient) -> Self {
        Self { client }
    }

    pub async fn list(self) -> Result<QueryOutcome<Vec<Parent>>, ApiError> {
        let query = Query::new(keys::parents(), "/parent").enabled(Enabled::Roles(STAFF));
        self.client.fetch(&query).await
    }

    pub async fn get(self, id: i64) -> Result<QueryOutcome<Parent>, ApiError> {
        let query = Query::new(keys::parent(id), format!("/parent/{}", id));
        self.client.fetch(&query).await
    }

    /// Children of the signed-in parent
    pub async fn my_children(self) -> Result<QueryOutcome<Vec<Student>>, ApiError> {
        let query = Query::new(keys::my_children(), "/parent/children")
            .enabled(Enabled::Roles(&[Role::Parent]));
        self.client.fetch(&query).await
    }

    pub async fn create(self, input: &ParentInput) -> Result<Parent, ApiError> {
        input.validate_for(true)?;
        let mutation = Mutation::post("/parent")
            .json(input)?
            .invalidates([keys::parents()]);
        self.client.mutate(mutation).await
    }

    pub async fn update(self, id: i64, input: &ParentInput) -> Result<Parent, ApiError> {
        input.validate_for(false)?;
        let mutation = Mutation::put(format!("/parent/{}", id))
            .json(input)?
            .invalidates([keys::parents(), keys::parent(id)]);
        self.client.mutate(mutation).await
    }

    pub async fn delete(self, id: i64) -> Result<(), ApiError> {
        let mutation = Mutation::delete(format!("/parent/{}", id))
            .invalidates([keys::parents(), keys::parent(id), keys::students()]);
        self.client.mutate_value(mutation).await?;
        Ok(())
    }
}
