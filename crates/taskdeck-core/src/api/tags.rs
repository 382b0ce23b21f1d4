use taskdeck_types::{Tag, TagCreate, TagUpdate};

use super::ApiClient;
use crate::client::{ApiRequest, ClientResult, Transport};

pub struct TagsApi<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> TagsApi<'a, T> {
    pub(super) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ClientResult<Vec<Tag>> {
        self.client.fetch(ApiRequest::get("/tags")).await
    }

    pub async fn create(&self, tag: &TagCreate) -> ClientResult<Tag> {
        let request = ApiRequest::post("/tags").json(tag)?;
        self.client.fetch(request).await
    }

    pub async fn update(&self, id: i64, update: &TagUpdate) -> ClientResult<Tag> {
        let request = ApiRequest::patch(format!("/tags/{id}")).json(update)?;
        self.client.fetch(request).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.client
            .execute(ApiRequest::delete(format!("/tags/{id}")))
            .await
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use super::*;
    use crate::api::testing::client_returning;

    #[tokio::test]
    async fn test_create_posts_tag() {
        let (client, recorder) = client_returning(
            201,
            &json!({"id": 2, "name": "urgent", "color": "#EF4444", "created_at": "2025-10-01T10:30:00"}),
        );

        let tag = client
            .tags()
            .create(&TagCreate {
                name: "urgent".to_string(),
                color: Some("#EF4444".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(tag.id, 2);
        let request = recorder.last();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.body, Some(json!({"name": "urgent", "color": "#EF4444"})));
    }
}
