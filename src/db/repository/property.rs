use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use super::{canonicalize_keys, shallow_merge};
use crate::db::models::{normalize_label, Property, PROPERTY_KEY_ALIASES};
use crate::db::DataStore;
use crate::error::{AppError, AppResult};
use crate::i18n;

// ============================================================================
// Listing filters
// ============================================================================

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PropertyFilter {
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Minimum number of bedrooms.
    pub beds: Option<u32>,
    /// Free-text search over title, location and description.
    pub q: Option<String>,
    pub limit: Option<usize>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl PropertyFilter {
    pub fn matches(&self, p: &Property) -> bool {
        if let Some(t) = non_empty(&self.property_type) {
            if normalize_label(&p.property_type) != normalize_label(t) {
                return false;
            }
        }
        if let Some(s) = non_empty(&self.status) {
            if !p.has_status(s) {
                return false;
            }
        }
        if let Some(loc) = non_empty(&self.location) {
            if !p.location.to_lowercase().contains(&loc.to_lowercase()) {
                return false;
            }
        }
        if let Some(cat) = non_empty(&self.category) {
            let matches_category = p
                .category
                .as_deref()
                .map(|c| normalize_label(c) == normalize_label(cat))
                .unwrap_or(false);
            if !matches_category && normalize_label(&p.property_type) != normalize_label(cat) {
                return false;
            }
        }
        if let Some(featured) = self.featured {
            if p.featured != featured {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if p.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if p.price > max {
                return false;
            }
        }
        if let Some(beds) = self.beds {
            if p.beds < beds {
                return false;
            }
        }
        if let Some(q) = non_empty(&self.q) {
            let q = q.to_lowercase();
            let haystack = [&p.title, &p.location, &p.description];
            if !haystack.iter().any(|f| f.to_lowercase().contains(&q)) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, properties: Vec<Property>) -> Vec<Property> {
        let filtered = properties.into_iter().filter(|p| self.matches(p));
        match self.limit {
            Some(limit) => filtered.take(limit).collect(),
            None => filtered.collect(),
        }
    }
}

// ============================================================================
// Property Repository
// ============================================================================

pub struct PropertyRepository;

impl PropertyRepository {
    pub async fn list(store: &DataStore, filter: &PropertyFilter) -> Vec<Property> {
        filter.apply(store.list::<Property>().await)
    }

    pub async fn list_all(store: &DataStore) -> Vec<Property> {
        store.list::<Property>().await
    }

    pub async fn find_by_id(store: &DataStore, id: i64) -> Option<Property> {
        store.get::<Property>(id).await
    }

    async fn find_or_404(store: &DataStore, id: i64) -> AppResult<Property> {
        Self::find_by_id(store, id)
            .await
            .ok_or_else(|| AppError::NotFound(i18n::t("not_found.property")))
    }

    pub fn validate(property: &Property) -> AppResult<()> {
        if property.title.trim().is_empty() {
            return Err(AppError::Validation(i18n::t_with(
                "validation.required",
                &[("field", "title")],
            )));
        }
        if property.price < 0.0 || !property.price.is_finite() {
            return Err(AppError::Validation(i18n::t("validation.negative_price")));
        }
        Ok(())
    }

    pub async fn create(store: &DataStore, mut property: Property) -> AppResult<Property> {
        Self::validate(&property)?;

        let now = Utc::now();
        property.id = store.next_id::<Property>().await;
        property.created_at = Some(now);
        property.updated_at = Some(now);

        let saved = store.upsert(property).await?;
        tracing::info!("Created property {} ({})", saved.id, saved.title);
        Ok(saved)
    }

    /// Replace every editable field; id and creation time are preserved.
    pub async fn replace(store: &DataStore, id: i64, mut property: Property) -> AppResult<Property> {
        let existing = Self::find_or_404(store, id).await?;
        Self::validate(&property)?;

        property.id = id;
        property.created_at = existing.created_at.or(property.created_at);
        property.updated_at = Some(Utc::now());

        Ok(store.upsert(property).await?)
    }

    /// Shallow JSON merge of the provided fields into the stored record.
    pub async fn patch(store: &DataStore, id: i64, mut patch: Value) -> AppResult<Property> {
        let existing = Self::find_or_404(store, id).await?;
        canonicalize_keys(&mut patch, PROPERTY_KEY_ALIASES);

        let mut value = serde_json::to_value(&existing).map_err(anyhow::Error::from)?;
        shallow_merge(&mut value, patch);

        let mut updated: Property = serde_json::from_value(value).map_err(|e| {
            AppError::Validation(i18n::t_with(
                "validation.property_shape",
                &[("err", &e.to_string())],
            ))
        })?;
        Self::validate(&updated)?;

        updated.id = id;
        updated.created_at = existing.created_at;
        updated.updated_at = Some(Utc::now());

        Ok(store.upsert(updated).await?)
    }

    pub async fn delete(store: &DataStore, id: i64) -> AppResult<()> {
        Self::find_or_404(store, id).await?;
        store.delete::<Property>(id).await?;
        tracing::info!("Deleted property {}", id);
        Ok(())
    }
}
