use serde::{Deserialize, Serialize};

/// Topic ("theme") as listed by `GET /topics`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Only filled in when the request carried a bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscribed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Body of `POST /topics`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTopicRequest {
    pub title: String,
    pub description: String,
}
