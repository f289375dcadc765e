pub mod catalog;
pub mod tenant;
pub mod unit;
pub mod user;

pub use catalog::CatalogService;
pub use tenant::TenantService;
pub use unit::UnitService;
pub use user::UserService;
