use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A seminar hall. Capacity is a free-form display string, not a number
/// the system enforces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hall {
    pub id: Uuid,
    pub name: String,
    pub capacity: String,
    pub location: Option<String>,
    pub amenities: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHallRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub capacity: String,
    pub location: Option<String>,
    pub amenities: Option<String>,
}
