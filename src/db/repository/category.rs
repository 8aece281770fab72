use std::collections::BTreeSet;

use crate::db::models::{normalize_label, slugify, Category, Property};
use crate::db::DataStore;
use crate::error::{AppError, AppResult};
use crate::i18n;

/// Property types always offered by `/api/types`, even before any listing uses them.
pub const DEFAULT_TYPES: &[&str] = &["Apartment", "Commercial", "House", "Land", "Penthouse", "Villa"];

// ============================================================================
// Category Repository
// ============================================================================

pub struct CategoryRepository;

impl CategoryRepository {
    pub async fn list(store: &DataStore) -> Vec<Category> {
        store.list::<Category>().await
    }

    pub async fn create(store: &DataStore, name: &str, icon: Option<String>) -> AppResult<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(i18n::t_with(
                "validation.required",
                &[("field", "name")],
            )));
        }

        let category = Category {
            id: store.next_id::<Category>().await,
            name: name.to_string(),
            slug: slugify(name),
            icon,
        };
        Ok(store.upsert(category).await?)
    }

    pub async fn delete(store: &DataStore, id: i64) -> AppResult<()> {
        if store.get::<Category>(id).await.is_none() {
            return Err(AppError::NotFound(i18n::t("not_found.category")));
        }
        store.delete::<Category>(id).await?;
        Ok(())
    }
}

/// Number of properties whose category or type matches the category name.
///
/// Singular/plural forms are treated alike ("Villa" counts towards "Villas").
pub fn count_for_category(category: &Category, properties: &[Property]) -> usize {
    let name = normalize_label(&category.name);
    let singular = name.strip_suffix('s').unwrap_or(&name).to_string();

    let is_match = |label: &str| {
        let label = normalize_label(label);
        !label.is_empty()
            && (label == name
                || label == singular
                || label.strip_suffix('s') == Some(singular.as_str()))
    };

    properties
        .iter()
        .filter(|p| {
            is_match(&p.property_type) || p.category.as_deref().map_or(false, |c| is_match(c))
        })
        .count()
}

/// Distinct property types in use plus the built-in ones, sorted.
pub fn distinct_types(properties: &[Property]) -> Vec<String> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut out = Vec::new();

    for t in DEFAULT_TYPES
        .iter()
        .map(|t| t.to_string())
        .chain(properties.iter().map(|p| p.property_type.trim().to_string()))
    {
        if !t.is_empty() && seen.insert(normalize_label(&t)) {
            out.push(t);
        }
    }

    out.sort_by_key(|t| t.to_lowercase());
    out
}

/// Distinct non-empty locations, sorted case-insensitively.
pub fn distinct_locations(properties: &[Property]) -> Vec<String> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut out: Vec<String> = properties
        .iter()
        .map(|p| p.location.trim().to_string())
        .filter(|l| !l.is_empty() && seen.insert(l.to_lowercase()))
        .collect();
    out.sort_by_key(|l| l.to_lowercase());
    out
}
