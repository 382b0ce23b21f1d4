use taskdeck_types::{PriorityMatrix, TaskList, TimelinePeriod};

use super::ApiClient;
use crate::client::{ApiRequest, ClientResult, Transport};

/// Read-only task views under `/tasks/views`.
pub struct ViewsApi<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> ViewsApi<'a, T> {
    pub(super) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    /// Active tasks grouped into the four urgency/importance quadrants.
    pub async fn priority_matrix(&self) -> ClientResult<PriorityMatrix> {
        self.client
            .fetch(ApiRequest::get("/tasks/views/priority-matrix"))
            .await
    }

    pub async fn timeline(&self, period: TimelinePeriod) -> ClientResult<TaskList> {
        let request =
            ApiRequest::get("/tasks/views/timeline").query([("period", period.as_str())]);
        self.client.fetch(request).await
    }

    pub async fn overdue(&self) -> ClientResult<TaskList> {
        self.client.fetch(ApiRequest::get("/tasks/views/overdue")).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::testing::client_returning;

    #[tokio::test]
    async fn test_timeline_sends_period() {
        let (client, recorder) = client_returning(200, &json!({"total": 0, "tasks": []}));

        let list = client.views().timeline(TimelinePeriod::Today).await.unwrap();

        assert_eq!(list.total, 0);
        let request = recorder.last();
        assert_eq!(request.path, "/tasks/views/timeline");
        assert_eq!(request.query, vec![("period".to_string(), "today".to_string())]);
    }
}
