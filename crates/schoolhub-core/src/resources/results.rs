//! Subject scores (`/result`) and section-wide aggregates (`/collective-result`).

use crate::api::ApiError;
use crate::models::{CollectiveResult, ScoreInput, ScoreRecord};
use crate::query::{Mutation, Query, QueryOutcome};
use crate::validation::Validate;
use crate::SchoolClient;

use super::{keys, STAFF};

#[derive(Clone, Copy)]
pub struct Results<'a> {
    client: &'a SchoolClient,
}

impl<'a> Results<'a> {
    pub(crate) fn new(client: &'a SchoolClient) -> Self {
        Self { client }
    }

    /// Every subject score for one student; disabled until a student is chosen
    pub async fn for_student(self, student_id: Option<i64>) -> Result<QueryOutcome<Vec<ScoreRecord>>, ApiError> {
        let id = student_id.unwrap_or_default();
        let query = Query::new(keys::student_results(id), format!("/result/student/{}", id))
            .when(student_id.is_some());
        self.client.fetch(&query).await
    }

    pub async fn create(self, input: &ScoreInput) -> Result<ScoreRecord, ApiError> {
        input.validate()?;
        let mutation = Mutation::post("/result")
            .require_roles(STAFF)
            .json(input)?
            .invalidates([keys::student_results(input.student_id)]);
        self.client.mutate(mutation).await
    }

    pub async fn update(self, id: i64, input: &ScoreInput) -> Result<ScoreRecord, ApiError> {
        input.validate()?;
        let mutation = Mutation::put(format!("/result/{}", id))
            .require_roles(STAFF)
            .json(input)?
            .invalidates([keys::student_results(input.student_id)]);
        self.client.mutate(mutation).await
    }

    pub async fn collective(self, section_id: Option<i64>) -> Result<QueryOutcome<Vec<CollectiveResult>>, ApiError> {
        let id = section_id.unwrap_or_default();
        let query = Query::new(keys::collective_results(id), format!("/collective-result/{}", id))
            .when(section_id.is_some());
        self.client.fetch(&query).await
    }

    /// Recompute totals and ranks for a section from the current scores
    pub async fn generate_collective(self, section_id: i64) -> Result<Vec<CollectiveResult>, ApiError> {
        let mutation = Mutation::post(format!("/collective-result/{}", section_id))
            .require_roles(STAFF)
            .invalidates([keys::collective_results(section_id)]);
        self.client.mutate(mutation).await
    }
}

#[cfg(test)]
mod tests {
    use crate::models::Role;
    use crate::school_client::testing::harness;

    use super::*;

    #[tokio::test]
    async fn test_student_results_keyed_apart_from_collective() {
        let h = harness(Some(Role::Director));
        h.transport
            .respond(200, r#"[{"id":1,"studentId":4,"subjectId":2,"test1":9}]"#)
            .respond(200, r#"[{"studentId":4,"total":88.5,"rank":2}]"#);

        let scores = h.client.results().for_student(Some(4)).await.unwrap().data().unwrap();
        let ranks = h.client.results().collective(Some(4)).await.unwrap().data().unwrap();
        assert_eq!(scores[0].total(), 9.0);
        assert_eq!(ranks[0].rank, Some(2));
        assert_eq!(h.transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_out_of_range_score_never_sent() {
        let h = harness(Some(Role::Teacher));
        let input = ScoreInput {
            student_id: 4,
            subject_id: 2,
            mid: Some(25.0),
            ..Default::default()
        };
        let err = h.client.results().create(&input).await.unwrap_err();
        match err {
            ApiError::Validation(errors) => assert_eq!(errors.for_field("mid"), vec!["must be between 0 and 20"]),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(h.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_parent_cannot_generate_collective() {
        let h = harness(Some(Role::Parent));
        let err = h.client.results().generate_collective(3).await.unwrap_err();
        assert!(matches!(err, ApiError::RoleRequired { .. }));
        assert_eq!(h.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_update_invalidates_student_results() {
        let h = harness(Some(Role::Teacher));
        h.transport.respond(200, "[]");
        h.client.results().for_student(Some(4)).await.unwrap();

        h.transport.respond(200, r#"{"id":1,"studentId":4,"subjectId":2,"quiz":8}"#);
        let input = ScoreInput {
            student_id: 4,
            subject_id: 2,
            quiz: Some(8.0),
            ..Default::default()
        };
        h.client.results().update(1, &input).await.unwrap();
        assert!(!h.client.cache().is_fresh(&keys::student_results(4)));
    }
}
