use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::{flexible_id, slugify};
use crate::db::Record;

/// Blog post shown on the marketing site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    #[serde(deserialize_with = "flexible_id")]
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub image: Option<String>,
    pub author: String,
    pub category: String,
    pub tags: Vec<String>,
    #[serde(alias = "created_at", alias = "createdAt")]
    pub date: Option<DateTime<Utc>>,
}

impl Post {
    /// Stored slug, or one derived from the title for rows that never had one.
    pub fn effective_slug(&self) -> String {
        if self.slug.trim().is_empty() {
            slugify(&self.title)
        } else {
            self.slug.clone()
        }
    }
}

fn post(id: i64, title: &str, category: &str, excerpt: &str, date: (i32, u32, u32)) -> Post {
    Post {
        id,
        title: title.to_string(),
        slug: slugify(title),
        excerpt: excerpt.to_string(),
        content: excerpt.to_string(),
        image: None,
        author: "Estate Team".to_string(),
        category: category.to_string(),
        tags: vec![category.to_lowercase()],
        date: Utc
            .with_ymd_and_hms(date.0, date.1, date.2, 9, 0, 0)
            .single(),
    }
}

impl Record for Post {
    const COLLECTION: &'static str = "posts";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn defaults() -> Vec<Self> {
        vec![
            post(
                3,
                "How to Stage Your Home for a Quick Sale",
                "Selling",
                "Small changes in lighting, layout and decluttering can shorten time on market.",
                (2026, 3, 14),
            ),
            post(
                2,
                "Renting vs Buying in 2026",
                "Market",
                "We compare monthly costs, flexibility and long-term equity for both options.",
                (2026, 2, 2),
            ),
            post(
                1,
                "Five Questions to Ask at an Open House",
                "Buying",
                "A short checklist that helps you compare properties and spot hidden costs.",
                (2026, 1, 10),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_slug_falls_back_to_title() {
        let p = Post {
            title: "Open House Tips".to_string(),
            ..Post::default()
        };
        assert_eq!(p.effective_slug(), "open-house-tips");

        let q = Post {
            slug: "custom".to_string(),
            ..p
        };
        assert_eq!(q.effective_slug(), "custom");
    }

    #[test]
    fn default_posts_have_dates_and_slugs() {
        for p in Post::defaults() {
            assert!(p.date.is_some());
            assert!(!p.slug.is_empty());
        }
    }
}
