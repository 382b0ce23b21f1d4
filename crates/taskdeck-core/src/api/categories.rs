use taskdeck_types::{Category, CategoryCreate, CategoryUpdate};

use super::ApiClient;
use crate::client::{ApiRequest, ClientResult, Transport};

pub struct CategoriesApi<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> CategoriesApi<'a, T> {
    pub(super) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ClientResult<Vec<Category>> {
        self.client.fetch(ApiRequest::get("/categories")).await
    }

    pub async fn create(&self, category: &CategoryCreate) -> ClientResult<Category> {
        let request = ApiRequest::post("/categories").json(category)?;
        self.client.fetch(request).await
    }

    pub async fn update(&self, id: i64, update: &CategoryUpdate) -> ClientResult<Category> {
        let request = ApiRequest::patch(format!("/categories/{id}")).json(update)?;
        self.client.fetch(request).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.client
            .execute(ApiRequest::delete(format!("/categories/{id}")))
            .await
    }
}
