//! Persistence: Supabase (remote) -> local JSON files -> in-memory defaults.

pub mod error;
pub mod local;
pub mod memory;
pub mod models;
pub mod repository;
pub mod store;
pub mod supabase;

pub use error::{StoreError, StoreResult};
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use models::*;
pub use repository::*;
pub use store::{merge_by_id, DataStore, Record};
pub use supabase::{DisabledRemote, RemoteStore, SupabaseClient};
