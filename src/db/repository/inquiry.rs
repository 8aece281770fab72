use chrono::Utc;

use crate::db::models::{Inquiry, InquiryStatus};
use super::is_valid_email;
use crate::db::DataStore;
use crate::error::{AppError, AppResult};
use crate::i18n;

// ============================================================================
// Inquiry Repository
// ============================================================================

pub struct InquiryRepository;

impl InquiryRepository {
    pub async fn list(store: &DataStore, status: Option<InquiryStatus>) -> Vec<Inquiry> {
        store
            .list::<Inquiry>()
            .await
            .into_iter()
            .filter(|i| status.map_or(true, |s| i.status == s))
            .collect()
    }

    /// Name, a valid email and a message are required.
    pub fn validate(inquiry: &Inquiry) -> AppResult<()> {
        for (field, value) in [("name", &inquiry.name), ("message", &inquiry.message)] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(i18n::t_with(
                    "validation.required",
                    &[("field", field)],
                )));
            }
        }
        if !is_valid_email(&inquiry.email) {
            return Err(AppError::Validation(i18n::t("validation.invalid_email")));
        }
        Ok(())
    }

    /// Store a new inquiry; id, status (`new`) and date are assigned here.
    pub async fn create(store: &DataStore, mut inquiry: Inquiry) -> AppResult<Inquiry> {
        Self::validate(&inquiry)?;
        inquiry.email = inquiry.email.trim().to_string();
        inquiry.id = store.next_id::<Inquiry>().await;
        inquiry.status = InquiryStatus::New;
        inquiry.date = Some(Utc::now());

        let saved = store.upsert(inquiry).await?;
        tracing::info!("Received inquiry {} from {}", saved.id, saved.email);
        Ok(saved)
    }

    pub async fn update_status(
        store: &DataStore,
        id: i64,
        status: InquiryStatus,
    ) -> AppResult<Inquiry> {
        let mut inquiry = store
            .get::<Inquiry>(id)
            .await
            .ok_or_else(|| AppError::NotFound(i18n::t("not_found.inquiry")))?;

        inquiry.status = status;
        Ok(store.upsert(inquiry).await?)
    }

    pub async fn delete(store: &DataStore, id: i64) -> AppResult<()> {
        if store.get::<Inquiry>(id).await.is_none() {
            return Err(AppError::NotFound(i18n::t("not_found.inquiry")));
        }
        store.delete::<Inquiry>(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::db::{DisabledRemote, LocalStore};

    fn store(dir: &std::path::Path) -> DataStore {
        DataStore::new(Arc::new(DisabledRemote), LocalStore::new(dir))
    }

    fn inquiry(name: &str, email: &str, message: &str) -> Inquiry {
        Inquiry {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
            ..Inquiry::default()
        }
    }

    #[test]
    fn validation_requires_message_and_valid_email() {
        assert!(InquiryRepository::validate(&inquiry("Ann", "ann@example.com", "Hello")).is_ok());
        assert!(matches!(
            InquiryRepository::validate(&inquiry("Ann", "ann@example.com", "  ")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            InquiryRepository::validate(&inquiry("Ann", "ann@", "Hello")),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn create_assigns_status_and_trims_email() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let mut submitted = inquiry("Ann", "  ann@example.com ", "Hello");
        submitted.status = InquiryStatus::Archived;
        let saved = InquiryRepository::create(&store, submitted).await.unwrap();

        assert_eq!(saved.status, InquiryStatus::New);
        assert_eq!(saved.email, "ann@example.com");
        assert!(saved.date.is_some());
        assert_eq!(
            InquiryRepository::list(&store, Some(InquiryStatus::New)).await.len(),
            1
        );
    }

    #[tokio::test]
    async fn rows_with_legacy_statuses_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store
            .local()
            .write(
                "inquiries",
                &[json!({"id": 1, "status": "unread"}), json!({"id": 2, "status": "New"})],
            )
            .await
            .unwrap();

        assert_eq!(InquiryRepository::list(&store, None).await.len(), 2);
        assert_eq!(
            InquiryRepository::list(&store, Some(InquiryStatus::New)).await.len(),
            2
        );
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        assert!(matches!(
            InquiryRepository::update_status(&store, 404, InquiryStatus::Read).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            InquiryRepository::delete(&store, 404).await,
            Err(AppError::NotFound(_))
        ));
    }
}
