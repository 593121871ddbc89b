use super::{id_path, ExecutionPayload, Extra, ListParams, PaginatedResponse};
use crate::transport::ApiRequest;
use crate::Scorable;
use scorable_core::ScorableError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluator {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorExecutionResult {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub justification: Option<String>,
    #[serde(default)]
    pub execution_log_id: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// `client.evaluators()`
#[derive(Debug, Clone, Copy)]
pub struct EvaluatorsResource<'a> {
    client: &'a Scorable,
}

impl<'a> EvaluatorsResource<'a> {
    pub(crate) fn new(client: &'a Scorable) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        params: &ListParams,
    ) -> Result<PaginatedResponse<Evaluator>, ScorableError> {
        self.client
            .send_json(
                params.apply(ApiRequest::get("/v1/evaluators/")),
                "LIST_EVALUATORS_FAILED",
                "Failed to list evaluators".to_string(),
            )
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Evaluator, ScorableError> {
        self.client
            .send_json(
                ApiRequest::get(id_path("/v1/evaluators/", id, "/")?),
                "GET_EVALUATOR_FAILED",
                format!("Failed to get evaluator {}", id),
            )
            .await
    }

    pub async fn execute(
        &self,
        id: &str,
        payload: &ExecutionPayload,
    ) -> Result<EvaluatorExecutionResult, ScorableError> {
        self.client
            .send_json(
                ApiRequest::post(id_path("/v1/evaluators/execute/", id, "/")?).json(payload)?,
                "EXECUTE_EVALUATOR_FAILED",
                format!("Failed to execute evaluator {}", id),
            )
            .await
    }

    pub async fn execute_by_name(
        &self,
        name: &str,
        payload: &ExecutionPayload,
    ) -> Result<EvaluatorExecutionResult, ScorableError> {
        self.client
            .send_json(
                ApiRequest::post("/v1/evaluators/execute/by-name/")
                    .query("name", name)
                    .json(payload)?,
                "EXECUTE_EVALUATOR_BY_NAME_FAILED",
                format!("Failed to execute evaluator by name: {}", name),
            )
            .await
    }
}
