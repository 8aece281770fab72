use serde_json::Value;

use super::{canonicalize_keys, deep_merge};
use crate::db::models::{Settings, SETTINGS_ID, SITE_STATS_KEY_ALIASES};
use crate::db::DataStore;
use crate::error::{AppError, AppResult};
use crate::i18n;

// ============================================================================
// Settings Repository (singleton)
// ============================================================================

pub struct SettingsRepository;

impl SettingsRepository {
    pub async fn get(store: &DataStore) -> Settings {
        store
            .get::<Settings>(SETTINGS_ID)
            .await
            .unwrap_or_default()
    }

    /// Deep-merge `patch` into the current settings and persist the result.
    pub async fn update(store: &DataStore, mut patch: Value) -> AppResult<Settings> {
        if !patch.is_object() {
            return Err(AppError::Validation(i18n::t_with(
                "validation.settings_shape",
                &[("err", "expected a JSON object")],
            )));
        }

        if let Some(stats) = patch.get_mut("stats") {
            canonicalize_keys(stats, SITE_STATS_KEY_ALIASES);
        }

        let current = Self::get(store).await;
        let mut value = serde_json::to_value(&current).map_err(anyhow::Error::from)?;
        deep_merge(&mut value, patch);

        let mut updated: Settings = serde_json::from_value(value).map_err(|e| {
            AppError::Validation(i18n::t_with(
                "validation.settings_shape",
                &[("err", &e.to_string())],
            ))
        })?;
        updated.id = SETTINGS_ID;

        Ok(store.upsert(updated).await?)
    }
}
