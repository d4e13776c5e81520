use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A payload received by the local webhook sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: Uuid,
    pub endpoint: String,
    pub payload: Value,
    pub user_agent: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl Delivery {
    pub fn new(endpoint: impl Into<String>, payload: Value, user_agent: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            endpoint: endpoint.into(),
            payload,
            user_agent,
            received_at: Utc::now(),
        }
    }
}
