use super::{id_path, Extra, ListParams, PaginatedResponse};
use crate::transport::ApiRequest;
use crate::Scorable;
use scorable_core::ScorableError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: String,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub test_dataset_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Body for both create and partial update; unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObjectiveData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_dataset_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectiveListParams {
    pub list: ListParams,
    pub intent: Option<String>,
}

impl From<ListParams> for ObjectiveListParams {
    fn from(list: ListParams) -> Self {
        Self {
            list,
            ..Self::default()
        }
    }
}

/// `client.objectives()`
#[derive(Debug, Clone, Copy)]
pub struct ObjectivesResource<'a> {
    client: &'a Scorable,
}

impl<'a> ObjectivesResource<'a> {
    pub(crate) fn new(client: &'a Scorable) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        params: &ObjectiveListParams,
    ) -> Result<PaginatedResponse<Objective>, ScorableError> {
        let request = params
            .list
            .apply(ApiRequest::get("/v1/objectives/"))
            .query_opt("intent", params.intent.as_deref());

        self.client
            .send_json(
                request,
                "LIST_OBJECTIVES_FAILED",
                "Failed to list objectives".to_string(),
            )
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Objective, ScorableError> {
        self.client
            .send_json(
                ApiRequest::get(id_path("/v1/objectives/", id, "/")?),
                "GET_OBJECTIVE_FAILED",
                format!("Failed to get objective {}", id),
            )
            .await
    }

    pub async fn create(&self, data: &ObjectiveData) -> Result<Objective, ScorableError> {
        self.client
            .send_json(
                ApiRequest::post("/v1/objectives/").json(data)?,
                "CREATE_OBJECTIVE_FAILED",
                "Failed to create objective".to_string(),
            )
            .await
    }

    pub async fn update(&self, id: &str, data: &ObjectiveData) -> Result<Objective, ScorableError> {
        self.client
            .send_json(
                ApiRequest::patch(id_path("/v1/objectives/", id, "/")?).json(data)?,
                "UPDATE_OBJECTIVE_FAILED",
                format!("Failed to update objective {}", id),
            )
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ScorableError> {
        self.client
            .send(
                ApiRequest::delete(id_path("/v1/objectives/", id, "/")?),
                "DELETE_OBJECTIVE_FAILED",
                format!("Failed to delete objective {}", id),
            )
            .await
            .map(|_| ())
    }
}
