//! Upload storage chain: Supabase Storage, then the local uploads directory,
//! then an inline `data:` URI.

use std::path::Path;

use base64::Engine;
use chrono::Utc;
use rand::Rng;
use serde::Serialize;

use crate::db::DataStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStorage {
    Supabase,
    Local,
    Inline,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredUpload {
    pub url: String,
    pub storage: UploadStorage,
    pub name: String,
    pub size: usize,
}

/// Lowercase alphanumeric extension of `original`, capped at 10 chars; `bin` when none.
pub fn sanitize_extension(original: Option<&str>) -> String {
    let ext: String = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(10)
        .collect::<String>()
        .to_lowercase();

    if ext.is_empty() {
        "bin".to_string()
    } else {
        ext
    }
}

/// `{millis}-{random}.{ext}`
pub fn generate_file_name(original: Option<&str>) -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..8)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!(
        "{}-{}.{}",
        Utc::now().timestamp_millis(),
        suffix,
        sanitize_extension(original)
    )
}

pub fn data_uri(content_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        content_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

pub struct UploadService;

impl UploadService {
    /// Store `bytes` through the first tier that accepts them. Never fails:
    /// the inline data URI is the last resort.
    pub async fn store(
        store: &DataStore,
        uploads_dir: &Path,
        original_name: Option<&str>,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> StoredUpload {
        let name = generate_file_name(original_name);
        let size = bytes.len();

        if store.remote_enabled() {
            match store
                .remote()
                .upload(&name, bytes.clone(), content_type)
                .await
            {
                Ok(url) => {
                    tracing::info!("Stored upload {} in Supabase Storage", name);
                    return StoredUpload {
                        url,
                        storage: UploadStorage::Supabase,
                        name,
                        size,
                    };
                }
                Err(e) => {
                    tracing::warn!("Supabase Storage upload failed, trying local disk: {}", e);
                }
            }
        }

        match Self::write_local(uploads_dir, &name, &bytes).await {
            Ok(()) => {
                tracing::info!("Stored upload {} on local disk", name);
                return StoredUpload {
                    url: format!("/uploads/{}", name),
                    storage: UploadStorage::Local,
                    name,
                    size,
                };
            }
            Err(e) => {
                tracing::warn!(
                    "Local upload write to {} failed, inlining as data URI: {}",
                    uploads_dir.display(),
                    e
                );
            }
        }

        StoredUpload {
            url: data_uri(content_type, &bytes),
            storage: UploadStorage::Inline,
            name,
            size,
        }
    }

    async fn write_local(dir: &Path, name: &str, bytes: &[u8]) -> std::io::Result<()> {
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(dir.join(name), bytes).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::store::testing::FakeRemote;
    use crate::db::{DisabledRemote, LocalStore};

    #[test]
    fn extension_is_sanitized() {
        assert_eq!(sanitize_extension(Some("photo.JPG")), "jpg");
        assert_eq!(sanitize_extension(Some("a.p$n%g")), "png");
        assert_eq!(sanitize_extension(Some("noext")), "bin");
        assert_eq!(sanitize_extension(None), "bin");
    }

    #[test]
    fn generated_names_have_expected_shape() {
        let name = generate_file_name(Some("house.webp"));
        let (stem, ext) = name.rsplit_once('.').unwrap();
        assert_eq!(ext, "webp");
        let (millis, suffix) = stem.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 8);
    }

    #[tokio::test]
    async fn remote_upload_wins_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(Arc::new(FakeRemote::default()), LocalStore::new(dir.path()));

        let up = UploadService::store(&store, dir.path(), Some("a.png"), "image/png", vec![1, 2]).await;
        assert_eq!(up.storage, UploadStorage::Supabase);
        assert!(up.url.starts_with("https://"));
    }

    #[tokio::test]
    async fn falls_back_to_local_disk() {
        let dir = tempfile::tempdir().unwrap();
        let remote = FakeRemote::default();
        remote.set_failing(true);
        let store = DataStore::new(Arc::new(remote), LocalStore::new(dir.path()));
        let uploads = dir.path().join("uploads");

        let up = UploadService::store(&store, &uploads, Some("a.png"), "image/png", vec![9; 4]).await;
        assert_eq!(up.storage, UploadStorage::Local);
        assert_eq!(up.url, format!("/uploads/{}", up.name));
        assert_eq!(std::fs::read(uploads.join(&up.name)).unwrap(), vec![9; 4]);
    }

    #[tokio::test]
    async fn falls_back_to_data_uri_when_disk_is_unusable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();
        let store = DataStore::new(Arc::new(DisabledRemote), LocalStore::new(dir.path()));

        let up = UploadService::store(&store, &blocker, Some("a.gif"), "image/gif", b"GIF".to_vec()).await;
        assert_eq!(up.storage, UploadStorage::Inline);
        assert_eq!(up.url, "data:image/gif;base64,R0lG");
    }
}
