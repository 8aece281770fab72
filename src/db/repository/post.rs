use crate::db::models::{normalize_label, Post};
use crate::db::DataStore;

// ============================================================================
// Post Repository
// ============================================================================

pub struct PostRepository;

impl PostRepository {
    /// Posts ordered by date (newest first); undated posts go last, by id.
    pub async fn list(store: &DataStore, category: Option<&str>, limit: Option<usize>) -> Vec<Post> {
        let mut posts: Vec<Post> = store
            .list::<Post>()
            .await
            .into_iter()
            .filter(|p| {
                category.map_or(true, |c| normalize_label(&p.category) == normalize_label(c))
            })
            .collect();

        posts.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        if let Some(limit) = limit {
            posts.truncate(limit);
        }
        posts
    }

    /// Look up by slug, or by numeric id when the key parses as one.
    pub async fn find(store: &DataStore, key: &str) -> Option<Post> {
        let id = key.parse::<i64>().ok();
        store
            .list::<Post>()
            .await
            .into_iter()
            .find(|p| p.effective_slug() == key || Some(p.id) == id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::db::{DisabledRemote, LocalStore};

    async fn store_with_posts(dir: &std::path::Path) -> DataStore {
        let store = DataStore::new(Arc::new(DisabledRemote), LocalStore::new(dir));
        store
            .local()
            .write(
                "posts",
                &[
                    json!({"id": 1, "title": "Buying Your First Home", "category": "Guides", "date": "2024-01-10T00:00:00Z"}),
                    json!({"id": 2, "title": "Market Update", "slug": "market-2024", "category": "News", "date": "2024-03-01T00:00:00Z"}),
                    json!({"id": 3, "title": "Undated Note", "category": "guides"}),
                ],
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn list_orders_by_date_and_filters_category() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_posts(dir.path()).await;

        let ids: Vec<i64> = PostRepository::list(&store, None, None)
            .await
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![2, 1, 3]);

        let guides = PostRepository::list(&store, Some("GUIDES"), Some(1)).await;
        assert_eq!(guides.len(), 1);
        assert_eq!(guides[0].id, 1);
    }

    #[tokio::test]
    async fn find_by_slug_derived_slug_or_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_posts(dir.path()).await;

        assert_eq!(PostRepository::find(&store, "market-2024").await.unwrap().id, 2);
        assert_eq!(
            PostRepository::find(&store, "buying-your-first-home")
                .await
                .unwrap()
                .id,
            1
        );
        assert_eq!(PostRepository::find(&store, "3").await.unwrap().title, "Undated Note");
        assert!(PostRepository::find(&store, "missing").await.is_none());
    }
}
