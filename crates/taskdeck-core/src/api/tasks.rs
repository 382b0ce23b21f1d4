use taskdeck_types::{Task, TaskCreate, TaskList, TaskQuery, TaskStats, TaskUpdate};

use super::ApiClient;
use crate::client::{ApiRequest, ClientResult, Transport};

/// `/tasks` CRUD.
pub struct TasksApi<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> TasksApi<'a, T> {
    pub(super) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &TaskQuery) -> ClientResult<TaskList> {
        let request = ApiRequest::get("/tasks").query(query.to_pairs());
        self.client.fetch(request).await
    }

    pub async fn get(&self, id: i64) -> ClientResult<Task> {
        self.client.fetch(ApiRequest::get(format!("/tasks/{id}"))).await
    }

    pub async fn create(&self, task: &TaskCreate) -> ClientResult<Task> {
        let request = ApiRequest::post("/tasks").json(task)?;
        self.client.fetch(request).await
    }

    /// Partial update; unset fields are left alone.
    pub async fn update(&self, id: i64, update: &TaskUpdate) -> ClientResult<Task> {
        let request = ApiRequest::patch(format!("/tasks/{id}")).json(update)?;
        self.client.fetch(request).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.client
            .execute(ApiRequest::delete(format!("/tasks/{id}")))
            .await
    }

    pub async fn stats(&self) -> ClientResult<TaskStats> {
        self.client.fetch(ApiRequest::get("/tasks/stats/summary")).await
    }
}
