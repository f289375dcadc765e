pub mod auth;
pub mod error;
pub mod query;
pub mod supabase;

pub use error::DbError;
pub use query::{Order, Query};
pub use supabase::{CredentialTier, SupabaseClient};
