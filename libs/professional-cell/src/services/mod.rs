pub mod professional;
pub mod schedule;
pub mod slots;
pub mod time_off;

pub use professional::ProfessionalService;
pub use schedule::ScheduleRuleService;
pub use slots::{generate_slots, generate_slots_for_width, Interval};
pub use time_off::TimeOffService;
