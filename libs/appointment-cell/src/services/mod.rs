pub mod availability;
pub mod booking;
pub mod conflict;
pub mod report;

pub use availability::{merge_exclusions, resolve_availability, AvailabilityService};
pub use booking::{BookingOutcome, BookingService};
pub use conflict::{overlaps, ConflictGuard};
pub use report::ReportService;
