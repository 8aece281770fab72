use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::flexible_id;
use crate::db::Record;

/// Newsletter subscriber.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscriber {
    #[serde(deserialize_with = "flexible_id")]
    pub id: i64,
    pub email: String,
    #[serde(alias = "created_at", alias = "subscribedAt")]
    pub date: Option<DateTime<Utc>>,
}

impl Record for Subscriber {
    const COLLECTION: &'static str = "subscribers";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}
