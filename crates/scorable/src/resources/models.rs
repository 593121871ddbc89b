use super::{id_path, Extra, ListParams, PaginatedResponse};
use crate::transport::ApiRequest;
use crate::Scorable;
use scorable_core::ScorableError;
use serde::{Deserialize, Serialize};

/// A model registered for use by evaluators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub max_token_count: Option<u64>,
    #[serde(default)]
    pub max_output_token_count: Option<u64>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateModel {
    /// Unique name, e.g. `google/gemma-2-9b`.
    pub name: String,
    /// Base model; the server falls back to `name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_token_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_token_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CreateModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Partial update; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_token_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_token_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelListParams {
    pub list: ListParams,
    /// Each capability is sent as its own `capable_of` parameter.
    pub capable_of: Vec<String>,
}

impl From<ListParams> for ModelListParams {
    fn from(list: ListParams) -> Self {
        Self {
            list,
            ..Self::default()
        }
    }
}

impl ModelListParams {
    fn apply(&self, request: ApiRequest) -> ApiRequest {
        self.capable_of
            .iter()
            .fold(self.list.apply(request), |request, capability| {
                request.query("capable_of", capability)
            })
    }
}

/// `client.models()`
#[derive(Debug, Clone, Copy)]
pub struct ModelsResource<'a> {
    client: &'a Scorable,
}

impl<'a> ModelsResource<'a> {
    pub(crate) fn new(client: &'a Scorable) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        params: &ModelListParams,
    ) -> Result<PaginatedResponse<Model>, ScorableError> {
        let request = params.apply(ApiRequest::get("/v1/models/"));

        self.client
            .send_json(request, "LIST_MODELS_FAILED", "Failed to list models".to_string())
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Model, ScorableError> {
        self.client
            .send_json(
                ApiRequest::get(id_path("/v1/models/", id, "/")?),
                "GET_MODEL_FAILED",
                format!("Failed to get model {}", id),
            )
            .await
    }

    pub async fn create(&self, data: &CreateModel) -> Result<Model, ScorableError> {
        self.client
            .send_json(
                ApiRequest::post("/v1/models/").json(data)?,
                "CREATE_MODEL_FAILED",
                "Failed to create model".to_string(),
            )
            .await
    }

    pub async fn update(&self, id: &str, data: &UpdateModel) -> Result<Model, ScorableError> {
        self.client
            .send_json(
                ApiRequest::patch(id_path("/v1/models/", id, "/")?).json(data)?,
                "UPDATE_MODEL_FAILED",
                format!("Failed to update model {}", id),
            )
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ScorableError> {
        self.client
            .send(
                ApiRequest::delete(id_path("/v1/models/", id, "/")?),
                "DELETE_MODEL_FAILED",
                format!("Failed to delete model {}", id),
            )
            .await
            .map(|_| ())
    }
}
