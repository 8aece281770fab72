use serde::{Deserialize, Serialize};

use super::flexible_id;
use crate::db::Record;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(deserialize_with = "flexible_id")]
    pub id: i64,
    pub email: String,
    /// Either a bcrypt hash (`$2a$`/`$2b$`/`$2y$`) or a legacy plaintext value.
    pub password: String,
    pub role: String,
    pub name: String,
}

impl Record for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}
