use serde::{Deserialize, Serialize};

use super::{flexible_id, slugify};
use crate::db::Record;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    #[serde(deserialize_with = "flexible_id")]
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
}

impl Category {
    pub fn new(id: i64, name: &str, icon: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            slug: slugify(name),
            icon: Some(icon.to_string()),
        }
    }
}

impl Record for Category {
    const COLLECTION: &'static str = "categories";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn defaults() -> Vec<Self> {
        vec![
            Category::new(6, "Land", "map"),
            Category::new(5, "Commercial", "building"),
            Category::new(4, "Penthouses", "crown"),
            Category::new(3, "Houses", "home"),
            Category::new(2, "Villas", "palmtree"),
            Category::new(1, "Apartments", "apartment"),
        ]
    }
}
