use super::{id_path, Extra, ListParams, PaginatedResponse};
use crate::transport::ApiRequest;
use crate::Scorable;
use scorable_core::ScorableError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionLog {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionLogListParams {
    pub list: ListParams,
    /// Sent comma-joined.
    pub tags: Vec<String>,
}

impl From<ListParams> for ExecutionLogListParams {
    fn from(list: ListParams) -> Self {
        Self {
            list,
            ..Self::default()
        }
    }
}

/// `client.execution_logs()`
#[derive(Debug, Clone, Copy)]
pub struct ExecutionLogsResource<'a> {
    client: &'a Scorable,
}

impl<'a> ExecutionLogsResource<'a> {
    pub(crate) fn new(client: &'a Scorable) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        params: &ExecutionLogListParams,
    ) -> Result<PaginatedResponse<ExecutionLog>, ScorableError> {
        let tags = (!params.tags.is_empty()).then(|| params.tags.join(","));
        let request = params
            .list
            .apply(ApiRequest::get("/v1/execution-logs/"))
            .query_opt("tags", tags);

        self.client
            .send_json(
                request,
                "LIST_EXECUTION_LOGS_FAILED",
                "Failed to list execution logs".to_string(),
            )
            .await
    }

    pub async fn get(&self, id: &str) -> Result<ExecutionLog, ScorableError> {
        self.client
            .send_json(
                ApiRequest::get(id_path("/v1/execution-logs/", id, "/")?),
                "GET_EXECUTION_LOG_FAILED",
                format!("Failed to get execution log {}", id),
            )
            .await
    }
}
