//! Keeps the local JSON files warm by periodically pulling every remote
//! collection into them.

use crate::db::{Category, DataStore, Inquiry, Post, Property, Record, Settings, Subscriber, User};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MirrorReport {
    pub collections: usize,
    pub records: usize,
    pub failed: Vec<&'static str>,
}

pub struct MirrorService;

impl MirrorService {
    /// One pass over all collections. A failing collection is recorded and
    /// skipped; the rest are still mirrored.
    pub async fn mirror_all(store: &DataStore) -> MirrorReport {
        let mut report = MirrorReport::default();

        Self::mirror_one::<Property>(store, &mut report).await;
        Self::mirror_one::<Inquiry>(store, &mut report).await;
        Self::mirror_one::<Settings>(store, &mut report).await;
        Self::mirror_one::<Category>(store, &mut report).await;
        Self::mirror_one::<User>(store, &mut report).await;
        Self::mirror_one::<Post>(store, &mut report).await;
        Self::mirror_one::<Subscriber>(store, &mut report).await;

        report
    }

    async fn mirror_one<T: Record>(store: &DataStore, report: &mut MirrorReport) {
        match store.mirror_collection::<T>().await {
            Ok(count) => {
                tracing::debug!("Mirrored {} {} records", count, T::COLLECTION);
                report.collections += 1;
                report.records += count;
            }
            Err(e) => {
                tracing::warn!("Failed to mirror {}: {:?}", T::COLLECTION, e);
                report.failed.push(T::COLLECTION);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::db::store::testing::FakeRemote;
    use crate::db::{DisabledRemote, LocalStore};

    #[tokio::test]
    async fn mirrors_every_collection_into_local_files() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote::default());
        remote
            .seed("properties", vec![json!({ "id": 5, "title": "Loft" })])
            .await;
        let store = DataStore::new(remote.clone(), LocalStore::new(dir.path()));

        let report = MirrorService::mirror_all(&store).await;
        assert_eq!(report.collections, 7);
        assert!(report.failed.is_empty());
        assert_eq!(report.records, 1);

        let local = store.local().read("properties").await.unwrap().unwrap();
        assert_eq!(local[0]["title"], "Loft");
    }

    #[tokio::test]
    async fn disabled_remote_reports_every_collection_failed() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(Arc::new(DisabledRemote), LocalStore::new(dir.path()));

        let report = MirrorService::mirror_all(&store).await;
        assert_eq!(report.collections, 0);
        assert_eq!(report.failed.len(), 7);
    }
}
