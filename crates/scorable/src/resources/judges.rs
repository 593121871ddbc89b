use super::{id_path, ExecutionPayload, Extra, ListParams, PaginatedResponse};
use crate::transport::ApiRequest;
use crate::Scorable;
use scorable_core::ScorableError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judge {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorReference {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateJudge {
    pub name: String,
    pub intent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluator_references: Option<Vec<EvaluatorReference>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// Sent as `"unlisted"` when unset.
    pub status: Option<String>,
}

impl CreateJudge {
    pub fn new(name: impl Into<String>, intent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            intent: intent.into(),
            ..Self::default()
        }
    }
}

/// Partial update; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateJudge {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluator_references: Option<Vec<EvaluatorReference>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JudgeListParams {
    pub list: ListParams,
    pub is_preset: Option<bool>,
    pub is_public: Option<bool>,
}

impl From<ListParams> for JudgeListParams {
    fn from(list: ListParams) -> Self {
        Self {
            list,
            ..Self::default()
        }
    }
}

/// Score of one evaluator within a judge run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorResult {
    #[serde(default)]
    pub evaluator_id: Option<String>,
    #[serde(default)]
    pub evaluator_name: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub justification: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeExecutionResult {
    #[serde(default)]
    pub evaluator_results: Vec<EvaluatorResult>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Input for server-side judge generation from an intent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateJudge {
    pub intent: String,
    pub stage: Option<String>,
    pub name: Option<String>,
    /// Replace an existing judge with the same name.
    pub overwrite: bool,
    pub extra_contexts: Option<HashMap<String, Option<String>>>,
}

impl GenerateJudge {
    pub fn new(intent: impl Into<String>) -> Self {
        Self {
            intent: intent.into(),
            ..Self::default()
        }
    }
}

// Generated judges are always unlisted and strict.
#[derive(Serialize)]
struct GenerateJudgeBody<'a> {
    overwrite: bool,
    intent: &'a str,
    visibility: &'static str,
    stage: Option<&'a str>,
    strict: bool,
    extra_contexts: Option<&'a HashMap<String, Option<String>>>,
    name: Option<&'a str>,
}

impl<'a> From<&'a GenerateJudge> for GenerateJudgeBody<'a> {
    fn from(data: &'a GenerateJudge) -> Self {
        Self {
            overwrite: data.overwrite,
            intent: &data.intent,
            visibility: "unlisted",
            stage: data.stage.as_deref(),
            strict: true,
            extra_contexts: data.extra_contexts.as_ref(),
            name: data.name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeGeneration {
    pub judge_id: String,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// `client.judges()`
#[derive(Debug, Clone, Copy)]
pub struct JudgesResource<'a> {
    client: &'a Scorable,
}

impl<'a> JudgesResource<'a> {
    pub(crate) fn new(client: &'a Scorable) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        params: &JudgeListParams,
    ) -> Result<PaginatedResponse<Judge>, ScorableError> {
        let request = params
            .list
            .apply(ApiRequest::get("/v1/judges/"))
            .query_opt("is_preset", params.is_preset)
            .query_opt("is_public", params.is_public);

        self.client
            .send_json(request, "LIST_JUDGES_FAILED", "Failed to list judges".to_string())
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Judge, ScorableError> {
        self.client
            .send_json(
                ApiRequest::get(id_path("/v1/judges/", id, "/")?),
                "GET_JUDGE_FAILED",
                format!("Failed to get judge {}", id),
            )
            .await
    }

    pub async fn create(&self, data: &CreateJudge) -> Result<Judge, ScorableError> {
        let mut body = data.clone();
        body.status.get_or_insert_with(|| "unlisted".to_string());

        self.client
            .send_json(
                ApiRequest::post("/v1/judges/").json(&body)?,
                "CREATE_JUDGE_FAILED",
                "Failed to create judge".to_string(),
            )
            .await
    }

    pub async fn update(&self, id: &str, data: &UpdateJudge) -> Result<Judge, ScorableError> {
        self.client
            .send_json(
                ApiRequest::patch(id_path("/v1/judges/", id, "/")?).json(data)?,
                "UPDATE_JUDGE_FAILED",
                format!("Failed to update judge {}", id),
            )
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ScorableError> {
        self.client
            .send(
                ApiRequest::delete(id_path("/v1/judges/", id, "/")?),
                "DELETE_JUDGE_FAILED",
                format!("Failed to delete judge {}", id),
            )
            .await
            .map(|_| ())
    }

    pub async fn execute(
        &self,
        id: &str,
        payload: &ExecutionPayload,
    ) -> Result<JudgeExecutionResult, ScorableError> {
        self.client
            .send_json(
                ApiRequest::post(id_path("/v1/judges/", id, "/execute/")?).json(payload)?,
                "EXECUTE_JUDGE_FAILED",
                format!("Failed to execute judge {}", id),
            )
            .await
    }

    pub async fn execute_by_name(
        &self,
        name: &str,
        payload: &ExecutionPayload,
    ) -> Result<JudgeExecutionResult, ScorableError> {
        self.client
            .send_json(
                ApiRequest::post("/v1/judges/execute/by-name/")
                    .query("name", name)
                    .json(payload)?,
                "EXECUTE_JUDGE_BY_NAME_FAILED",
                format!("Failed to execute judge by name: {}", name),
            )
            .await
    }

    pub async fn generate(&self, data: &GenerateJudge) -> Result<JudgeGeneration, ScorableError> {
        self.client
            .send_json(
                ApiRequest::post("/v1/judges/generate/").json(&GenerateJudgeBody::from(data))?,
                "GENERATE_JUDGE_FAILED",
                "Failed to generate judge".to_string(),
            )
            .await
    }

    /// Sends refinement feedback for a judge.
    ///
    /// The feedback schema evolves with the server, so both sides are
    /// passed through as JSON objects.
    pub async fn refine(&self, id: &str, feedback: &Extra) -> Result<Extra, ScorableError> {
        self.client
            .send_json(
                ApiRequest::post(id_path("/v1/judges/", id, "/refine/")?).json(feedback)?,
                "REFINE_JUDGE_FAILED",
                format!("Failed to refine judge {}", id),
            )
            .await
    }

    pub async fn duplicate(&self, id: &str) -> Result<Judge, ScorableError> {
        self.client
            .send_json(
                ApiRequest::post(id_path("/v1/judges/", id, "/duplicate/")?),
                "DUPLICATE_JUDGE_FAILED",
                format!("Failed to duplicate judge {}", id),
            )
            .await
    }
}
