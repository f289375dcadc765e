pub mod cache;
pub mod crypto;
pub mod datetime;
pub mod documents;
pub mod extractor;
pub mod format;
pub mod ids;
pub mod jwt;
pub mod pagination;
pub mod state;
pub mod test_utils;
pub mod text;
pub mod validation;

pub use pagination::{PageMeta, PaginatedResponse, Pagination};
pub use state::AppState;
pub use validation::{Validate, Validator};
