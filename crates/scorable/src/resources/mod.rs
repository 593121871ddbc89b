//! Typed wrappers over the Scorable REST endpoints.
//!
//! Response types carry the fields the client relies on and keep every
//! other field in a flattened `extra` map, so schema additions on the
//! server never break decoding.

mod evaluators;
mod execution_logs;
mod judges;
mod models;
mod objectives;

pub use evaluators::{Evaluator, EvaluatorExecutionResult, EvaluatorsResource};
pub use execution_logs::{ExecutionLog, ExecutionLogListParams, ExecutionLogsResource};
pub use judges::{
    CreateJudge, EvaluatorReference, EvaluatorResult, GenerateJudge, Judge, JudgeExecutionResult,
    JudgeGeneration, JudgeListParams, JudgesResource, UpdateJudge,
};
pub use models::{CreateModel, Model, ModelListParams, ModelsResource, UpdateModel};
pub use objectives::{Objective, ObjectiveData, ObjectiveListParams, ObjectivesResource};

use crate::transport::ApiRequest;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use scorable_core::ScorableError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaginatedResponse<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
}

/// Query parameters shared by every listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub cursor: Option<String>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

impl ListParams {
    pub(crate) fn apply(&self, request: ApiRequest) -> ApiRequest {
        request
            .query_opt("cursor", self.cursor.as_deref())
            .query_opt("page_size", self.page_size)
            .query_opt("search", self.search.as_deref())
            .query_opt("ordering", self.ordering.as_deref())
    }
}

/// Input scored by a judge or an evaluator.
///
/// Either `response` (single turn) or `turns` (conversation) is normally
/// set; the server validates the combination.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turns: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contexts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl ExecutionPayload {
    /// A single request/response pair.
    pub fn new(request: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            request: Some(request.into()),
            response: Some(response.into()),
            ..Self::default()
        }
    }
}

/// Fields the client does not model.
pub type Extra = Map<String, Value>;

// Everything but RFC 3986 unreserved characters is escaped.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Builds `{prefix}{id}{suffix}` with `id` encoded as exactly one path
/// segment.
///
/// Ids that would resolve as dot segments are rejected before any request
/// is made.
pub(crate) fn id_path(prefix: &str, id: &str, suffix: &str) -> Result<String, ScorableError> {
    if id.is_empty() || id == "." || id == ".." {
        return Err(ScorableError::new(
            400,
            "invalid",
            None,
            Some(format!("invalid resource id: {:?}", id)),
        ));
    }
    Ok(format!(
        "{}{}{}",
        prefix,
        utf8_percent_encode(id, SEGMENT),
        suffix
    ))
}
