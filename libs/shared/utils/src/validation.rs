use std::fmt::Display;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use shared_models::error::{FieldError, ValidationErrors};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").unwrap());
static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([01]?[0-9]|2[0-3]):[0-5][0-9]$").unwrap());
static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Implemented by every request payload; runs before any storage call.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// `HH:MM`, hour may have a single digit.
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    if !TIME_RE.is_match(raw) {
        return None;
    }
    let (hour, minute) = raw.split_once(':')?;
    NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0)
}

/// `YYYY-MM-DD` that is also a real calendar date.
pub fn parse_date_only(raw: &str) -> Option<NaiveDate> {
    if !DATE_RE.is_match(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Accumulates field errors so a caller sees every problem at once.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: &str, code: &str, message: impl Into<String>) -> &mut Self {
        self.errors.push(FieldError::new(field, code, message));
        self
    }

    pub fn check(&mut self, condition: bool, field: &str, code: &str, message: impl Into<String>) -> &mut Self {
        if !condition {
            self.error(field, code, message);
        }
        self
    }

    /// Length in characters, inclusive bounds.
    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        let len = value.chars().count();
        if len < min {
            self.error(field, "too_short", format!("{} must have at least {} characters", field, min));
        } else if len > max {
            self.error(field, "too_long", format!("{} must have at most {} characters", field, max));
        }
        self
    }

    pub fn min_length(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        self.length(field, value, min, usize::MAX)
    }

    pub fn max_length(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(value) = value {
            self.length(field, value, 0, max);
        }
        self
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(!value.trim().is_empty(), field, "required", format!("{} is required", field))
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(is_valid_email(value), field, "invalid_email", "Invalid e-mail")
    }

    pub fn phone(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(phone) = value {
            self.check(is_valid_phone(phone), field, "invalid_phone", "Invalid phone number");
        }
        self
    }

    pub fn time_of_day(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(
            parse_time_of_day(value).is_some(),
            field,
            "invalid_time",
            "Time must be in HH:MM format",
        )
    }

    pub fn date_only(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(
            parse_date_only(value).is_some(),
            field,
            "invalid_date",
            "Date must be in YYYY-MM-DD format",
        )
    }

    pub fn range<T>(&mut self, field: &str, value: T, min: T, max: T) -> &mut Self
    where
        T: PartialOrd + Display,
    {
        if value < min {
            self.error(field, "too_small", format!("{} must be at least {}", field, min));
        } else if value > max {
            self.error(field, "too_big", format!("{} must be at most {}", field, max));
        }
        self
    }

    /// Half-open intervals need a strictly positive width.
    pub fn interval(&mut self, field: &str, start: &DateTime<Utc>, end: &DateTime<Utc>) -> &mut Self {
        self.check(start < end, field, "invalid_range", "end must be after start")
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(std::mem::take(&mut self.errors)))
        }
    }
}
