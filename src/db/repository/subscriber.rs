use chrono::Utc;

use super::is_valid_email;
use crate::db::models::Subscriber;
use crate::db::DataStore;
use crate::error::{AppError, AppResult};
use crate::i18n;

// ============================================================================
// Subscriber Repository
// ============================================================================

pub struct SubscriberRepository;

impl SubscriberRepository {
    pub async fn count(store: &DataStore) -> usize {
        store.list::<Subscriber>().await.len()
    }

    /// Subscribe an email. Returns `(subscriber, created)`; `created` is false
    /// when the address was already on the list.
    pub async fn subscribe(store: &DataStore, email: &str) -> AppResult<(Subscriber, bool)> {
        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(AppError::Validation(i18n::t("validation.invalid_email")));
        }

        if let Some(existing) = store
            .list::<Subscriber>()
            .await
            .into_iter()
            .find(|s| s.email.trim().eq_ignore_ascii_case(&email))
        {
            return Ok((existing, false));
        }

        let subscriber = Subscriber {
            id: store.next_id::<Subscriber>().await,
            email,
            date: Some(Utc::now()),
        };
        let saved = store.upsert(subscriber).await?;
        tracing::info!("New newsletter subscriber {}", saved.id);
        Ok((saved, true))
    }
}
