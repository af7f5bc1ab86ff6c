use crate::api::ApiError;
use crate::models::{Message, MessageInput};
use crate::query::{Mutation, Query, QueryOutcome};
use crate::validation::Validate;
use crate::SchoolClient;

use super::keys;

/// Direct messages at `/message`, scoped to the signed-in user.
#[derive(Clone, Copy)]
pub struct Messages<'a> {
    client: &'a SchoolClient,
}

impl<'a> Messages<'a> {
    pub(crate) fn new(client: &'a SchoolClient) -> Self {
        Self { client }
    }

    pub async fn inbox(self) -> Result<QueryOutcome<Vec<Message>>, ApiError> {
        self.client.fetch(&Query::new(keys::messages(), "/message")).await
    }

    /// Messages exchanged with one other user
    pub async fn conversation(self, user_id: i64) -> Result<QueryOutcome<Vec<Message>>, ApiError> {
        let query = Query::new(keys::conversation(user_id), format!("/message/{}", user_id));
        self.client.fetch(&query).await
    }

    pub async fn send(self, input: &MessageInput) -> Result<Message, ApiError> {
        input.validate()?;
        let mutation = Mutation::post("/message")
            .json(input)?
            .invalidates([keys::messages(), keys::conversation(input.receiver_id)]);
        self.client.mutate(mutation).await
    }

    pub async fn mark_read(self, message: &Message) -> Result<(), ApiError> {
        let mutation = Mutation::put(format!("/message/{}/read", message.id))
            .invalidates([keys::messages(), keys::conversation(message.sender_id)]);
        self.client.mutate_value(mutation).await?;
        Ok(())
    }

    pub async fn delete(self, message: &Message) -> Result<(), ApiError> {
        let mutation = Mutation::delete(format!("/message/{}", message.id)).invalidates([
            keys::messages(),
            keys::conversation(message.sender_id),
            keys::conversation(message.receiver_id),
        ]);
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
    async fn test_send_refreshes_conversation() {
        let h = harness(Some(Role::Parent));
        h.transport.respond(200, "[]");
        h.client.messages().conversation(9).await.unwrap();

        h.transport
            .respond(201, r#"{"id":40,"senderId":1,"receiverId":9,"content":"See you Friday"}"#);
        let sent = h
            .client
            .messages()
            .send(&MessageInput {
                receiver_id: 9,
                content: "See you Friday".into(),
                attachment: None,
            })
            .await
            .unwrap();
        assert!(!sent.is_read);
        assert!(!h.client.cache().is_fresh(&keys::conversation(9)));
    }

    #[tokio::test]
    async fn test_mark_read_path() {
        let h = harness(Some(Role::Teacher));
        let message: Message =
            serde_json::from_str(r#"{"id":40,"senderId":9,"receiverId":1,"content":"hi"}"#).unwrap();
        h.client.messages().mark_read(&message).await.unwrap();

        let request = h.transport.last_request().unwrap();
        assert_eq!(request.method, reqwest::Method::PUT);
        assert!(request.url.ends_with("/message/40/read"));
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let h = harness(Some(Role::Student));
        let err = h
            .client
            .messages()
            .send(&MessageInput {
                receiver_id: 9,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.is_client_side());
        assert_eq!(h.transport.request_count(), 0);
    }
}
