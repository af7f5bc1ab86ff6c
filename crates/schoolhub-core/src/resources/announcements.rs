use crate::api::ApiError;
use crate::models::{Announcement, AnnouncementInput};
use crate::query::{Mutation, Query, QueryOutcome};
use crate::validation::Validate;
use crate::SchoolClient;

use super::keys;

/// Announcements at `/announcement`. The server filters by audience.
#[derive(Clone, Copy)]
pub struct Announcements<'a> {
    client: &'a SchoolClient,
}

impl<'a> Announcements<'a> {
    pub(crate) fn new(client: &'a SchoolClient) -> Self {
        Self { client }
    }

    pub async fn list(self) -> Result<QueryOutcome<Vec<Announcement>>, ApiError> {
        self.client.fetch(&Query::new(keys::announcements(), "/announcement")).await
    }

    pub async fn get(self, id: i64) -> Result<QueryOutcome<Announcement>, ApiError> {
        let query = Query::new(keys::announcement(id), format!("/announcement/{}", id));
        self.client.fetch(&query).await
    }

    pub async fn create(self, input: &AnnouncementInput) -> Result<Announcement, ApiError> {
        input.validate()?;
        let mutation = Mutation::post("/announcement")
            .json(input)?
            .invalidates([keys::announcements()]);
        self.client.mutate(mutation).await
    }

    pub async fn update(self, id: i64, input: &AnnouncementInput) -> Result<Announcement, ApiError> {
        input.validate()?;
        let mutation = Mutation::put(format!("/announcement/{}", id))
            .json(input)?
            .invalidates([keys::announcements(), keys::announcement(id)]);
        self.client.mutate(mutation).await
    }

    pub async fn delete(self, id: i64) -> Result<(), ApiError> {
        let mutation = Mutation::delete(format!("/announcement/{}", id))
            .invalidates([keys::announcements(), keys::announcement(id)]);
        self.client.mutate_value(mutation).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::cache::CacheSource;
    use crate::models::Role;
    use crate::school_client::testing::harness;

    use super::*;

    const ANNOUNCEMENT_JSON: &str = r#"{"id":7,"title":"Sports day","content":"Friday","audience":[]}"#;

    #[tokio::test]
    async fn test_create_refetches_list() {
        let h = harness(Some(Role::Teacher));
        h.transport.respond(200, "[]");
        let first = h.client.announcements().list().await.unwrap();
        assert_eq!(first.source(), Some(CacheSource::Network));

        h.transport.respond(201, ANNOUNCEMENT_JSON);
        let input = AnnouncementInput {
            title: "Sports day".into(),
            content: "Friday".into(),
            ..Default::default()
        };
        let created = h.client.announcements().create(&input).await.unwrap();
        assert_eq!(created.id, 7);

        h.transport.respond(200, &format!("[{}]", ANNOUNCEMENT_JSON));
        let second = h.client.announcements().list().await.unwrap();
        assert_eq!(second.source(), Some(CacheSource::Network));
        assert_eq!(second.data().unwrap().len(), 1);
        assert_eq!(h.transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_attachment_url_is_sent() {
        let h = harness(Some(Role::Director));
        h.transport.respond(201, ANNOUNCEMENT_JSON);
        let input = AnnouncementInput {
            title: "Sports day".into(),
            content: "Friday".into(),
            attachment: Some("https://res.cloudinary.com/demo/flyer.png".into()),
            audience: vec![Role::Parent],
        };
        h.client.announcements().create(&input).await.unwrap();

        let body = h.transport.last_request().unwrap().body.unwrap();
        assert_eq!(body["attachment"], "https://res.cloudinary.com/demo/flyer.png");
        assert_eq!(body["audience"][0], "PARENT");
    }
}
