use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category ("organization class") used to classify organizations, e.g. committee
///
/// A category cannot be deleted while any organization references it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Composite identity `{data_source_id}:{origin_id}`
    pub id: String,
    pub data_source_id: String,
    pub origin_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(id: String, data_source_id: String, origin_id: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            data_source_id,
            origin_id,
            name,
            created_at: now,
            updated_at: now,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
