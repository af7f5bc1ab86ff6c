use serde_json::json;

use crate::api::ApiError;
use crate::models::DirectorOverview;
use crate::query::{Enabled, Mutation, Query, QueryOutcome};
use crate::SchoolClient;

use super::{keys, DIRECTOR_ONLY};

/// Director-only endpoints under `/director`.
#[derive(Clone, Copy)]
pub struct Director<'a> {
    client: &'a SchoolClient,
}

impl<'a> Director<'a> {
    pub(crate) fn new(client: &'a SchoolClient) -> Self {
        Self { client }
    }

    pub async fn overview(self) -> Result<QueryOutcome<DirectorOverview>, ApiError> {
        let query = Query::new(keys::director_overview(), "/director/overview")
            .enabled(Enabled::Roles(DIRECTOR_ONLY));
        self.client.fetch(&query).await
    }

    /// Activate or deactivate a teacher account
    pub async fn set_teacher_active(self, teacher_id: i64, active: bool) -> Result<(), ApiError> {
        let mutation = Mutation::put(format!("/director/teacher/{}/status", teacher_id))
            .require_roles(DIRECTOR_ONLY)
            .json(&json!({ "isActive": active }))?
            .invalidates([
                keys::teachers(),
                keys::teacher(teacher_id),
                keys::director_overview(),
            ])
            .invalidates_under([keys::sections()]);
        self.client.mutate_value(mutation).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::models::Role;
    use crate::school_client::testing::harness;

    use super::*;

    #[tokio::test]
    async fn test_overview_director_only() {
        let h = harness(Some(Role::Teacher));
        assert!(h.client.director().overview().await.unwrap().is_disabled());

        let h = harness(Some(Role::Director));
        h.transport.respond(200, r#"{"totalStudents":420,"totalTeachers":31}"#);
        let overview = h.client.director().overview().await.unwrap().data().unwrap();
        assert_eq!(overview.total_teachers, 31);
    }

    #[tokio::test]
    async fn test_toggle_teacher_refreshes_teacher_lists() {
        let h = harness(Some(Role::Director));
        h.transport
            .respond(200, "[]")
            .respond(200, "[]")
            .respond(200, r#"{"id":5,"name":"9A","gradeLevelId":1,"homeRoomTeacherId":7}"#);
        h.client.teachers().list().await.unwrap();
        h.client.sections().list().await.unwrap();
        h.client.sections().get(5).await.unwrap();

        h.client.director().set_teacher_active(7, false).await.unwrap();
        let request = h.transport.last_request().unwrap();
        assert!(request.url.ends_with("/director/teacher/7/status"));
        assert_eq!(request.body.unwrap()["isActive"], false);
        assert!(!h.client.cache().is_fresh(&keys::teachers()));
        assert!(!h.client.cache().is_fresh(&keys::sections()));
        assert!(!h.client.cache().is_fresh(&keys::section(5)));
    }
}
