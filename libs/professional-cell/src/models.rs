use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::ValidationErrors;
use shared_utils::validation::{parse_time_of_day, Validate, Validator};

// ==============================================================================
// PROFESSIONALS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Professional {
    pub id: Uuid,
    pub unit_id: Uuid,
    pub name: String,
    pub bio: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfessionalRequest {
    pub unit_id: Uuid,
    pub name: String,
    pub bio: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfessionalRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl Validate for CreateProfessionalRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .length("name", &self.name, 2, 100)
            .max_length("bio", self.bio.as_deref(), 500)
            .finish()
    }
}

impl Validate for UpdateProfessionalRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Some(name) = &self.name {
            v.length("name", name, 2, 100);
        }
        v.max_length("bio", self.bio.as_deref(), 500);
        v.finish()
    }
}

// ==============================================================================
// SCHEDULE RULES
// ==============================================================================

pub const DEFAULT_SLOT_MINUTES: u32 = 15;
pub const MIN_SLOT_MINUTES: u32 = 15;
pub const MAX_SLOT_MINUTES: u32 = 120;

fn default_slot_minutes() -> u32 {
    DEFAULT_SLOT_MINUTES
}

/// Recurring weekly window of a professional's calendar. `day_of_week` 0 is Sunday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRule {
    pub id: Uuid,
    pub calendar_id: Uuid,
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
    pub slot_min: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Rule times as stored; the backend returns `HH:MM:SS` for `time` columns.
pub fn parse_rule_time(raw: &str) -> Option<NaiveTime> {
    parse_time_of_day(raw).or_else(|| NaiveTime::parse_from_str(raw, "%H:%M:%S").ok())
}

impl ScheduleRule {
    pub fn window(&self) -> Option<(NaiveTime, NaiveTime)> {
        let start = parse_rule_time(&self.start_time)?;
        let end = parse_rule_time(&self.end_time)?;
        (start < end).then_some((start, end))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScheduleRuleRequest {
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_slot_minutes")]
    pub slot_min: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateScheduleRuleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_min: Option<u32>,
}

fn check_time_order(v: &mut Validator, start: &str, end: &str) {
    if let (Some(start), Some(end)) = (parse_rule_time(start), parse_rule_time(end)) {
        v.check(start < end, "end_time", "invalid_range", "end_time must be after start_time");
    }
}

impl Validate for CreateScheduleRuleRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.range("day_of_week", self.day_of_week, 0, 6)
            .time_of_day("start_time", &self.start_time)
            .time_of_day("end_time", &self.end_time)
            .range("slot_min", self.slot_min, MIN_SLOT_MINUTES, MAX_SLOT_MINUTES);
        check_time_order(&mut v, &self.start_time, &self.end_time);
        v.finish()
    }
}

impl Validate for UpdateScheduleRuleRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Some(day) = self.day_of_week {
            v.range("day_of_week", day, 0, 6);
        }
        if let Some(start) = &self.start_time {
            v.time_of_day("start_time", start);
        }
        if let Some(end) = &self.end_time {
            v.time_of_day("end_time", end);
        }
        if let Some(slot) = self.slot_min {
            v.range("slot_min", slot, MIN_SLOT_MINUTES, MAX_SLOT_MINUTES);
        }
        if let (Some(start), Some(end)) = (&self.start_time, &self.end_time) {
            check_time_order(&mut v, start, end);
        }
        v.finish()
    }
}

impl UpdateScheduleRuleRequest {
    /// Whether only one edge of the window changes, so ordering depends on the stored rule.
    pub fn moves_one_edge(&self) -> bool {
        self.start_time.is_some() != self.end_time.is_some()
    }

    /// Checks the window that results from applying this update to `current`.
    pub fn validate_against(&self, current: &ScheduleRule) -> Result<(), ValidationErrors> {
        let start = self.start_time.as_deref().unwrap_or(&current.start_time);
        let end = self.end_time.as_deref().unwrap_or(&current.end_time);
        let mut v = Validator::new();
        check_time_order(&mut v, start, end);
        v.finish()
    }
}

// ==============================================================================
// TIME OFF
// ==============================================================================

/// Blocked interval `[start, end)` on a professional's calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeOff {
    pub id: Uuid,
    pub calendar_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub reason: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTimeOffRequest {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTimeOffRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Validate for CreateTimeOffRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .interval("end", &self.start, &self.end)
            .length("reason", &self.reason, 5, 200)
            .finish()
    }
}

impl Validate for UpdateTimeOffRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let (Some(start), Some(end)) = (&self.start, &self.end) {
            v.interval("end", start, end);
        }
        if let Some(reason) = &self.reason {
            v.length("reason", reason, 5, 200);
        }
        v.finish()
    }
}

impl UpdateTimeOffRequest {
    pub fn moves_one_edge(&self) -> bool {
        self.start.is_some() != self.end.is_some()
    }

    pub fn validate_against(&self, current: &TimeOff) -> Result<(), ValidationErrors> {
        let start = self.start.unwrap_or(current.start);
        let end = self.end.unwrap_or(current.end);
        Validator::new().interval("end", &start, &end).finish()
    }
}

/// Optional `[from, to)` window for listing time off.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeOffWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}
