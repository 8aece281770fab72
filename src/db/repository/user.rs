use crate::db::models::User;
use crate::db::DataStore;

// ============================================================================
// User Repository
// ============================================================================

pub struct UserRepository;

impl UserRepository {
    /// Case-insensitive lookup by email.
    pub async fn find_by_email(store: &DataStore, email: &str) -> Option<User> {
        let email = email.trim().to_lowercase();
        store
            .list::<User>()
            .await
            .into_iter()
            .find(|u| u.email.trim().to_lowercase() == email)
    }
}
