//! Availability resolution.
//!
//! Candidate slots come from the professional's schedule rules; exclusions are
//! their time off plus every appointment still occupying time. Exclusions are
//! sorted and merged once, then candidates are swept in start order with a
//! single forward pointer, which keeps the pass at O(n log n + m).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use futures::try_join;
use tracing::debug;
use uuid::Uuid;

use organization_cell::services::{CatalogService, UnitService};
use professional_cell::services::{
    generate_slots_for_width, Interval, ProfessionalService, ScheduleRuleService, TimeOffService,
};
use shared_database::{CredentialTier, SupabaseClient};
use shared_utils::datetime::{day_of_week, parse_timezone, start_of_day};
use shared_utils::validation::Validate;

use crate::models::{AppointmentError, AvailabilityRequest, AvailabilityResponse, AvailabilitySlot};
use crate::services::conflict::ConflictGuard;

/// Sorts `intervals` by start and merges the ones that overlap or touch.
pub fn merge_exclusions(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.retain(|i| i.start < i.end);
    intervals.sort_by_key(|i| i.start);

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end => {
                if interval.end > last.end {
                    last.end = interval.end;
                }
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Marks each candidate available unless it intersects an exclusion. A slot
/// that ends exactly where an exclusion starts is still available.
pub fn resolve_availability(
    professional_id: Uuid,
    candidates: &[Interval],
    exclusions: Vec<Interval>,
) -> Vec<AvailabilitySlot> {
    let blocked = merge_exclusions(exclusions);

    let mut ordered = candidates.to_vec();
    ordered.sort();

    let mut next = 0;
    ordered
        .into_iter()
        .map(|slot| {
            while next < blocked.len() && blocked[next].end <= slot.start {
                next += 1;
            }
            let available = blocked.get(next).map_or(true, |b| b.start >= slot.end);

            AvailabilitySlot {
                start: slot.start,
                end: slot.end,
                available,
                professional_id,
            }
        })
        .collect()
}

pub struct AvailabilityService {
    supabase: Arc<SupabaseClient>,
}

impl AvailabilityService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Slots for every active professional of the unit on `request.date`, sized
    /// to the service duration and ordered by start, then professional.
    pub async fn get_availability(
        &self,
        tenant_id: Uuid,
        request: AvailabilityRequest,
        auth_token: &str,
    ) -> Result<AvailabilityResponse, AppointmentError> {
        request.validate()?;
        let date = request.parsed_date()?;
        let tier = CredentialTier::UserScoped(Some(auth_token));

        let units = UnitService::new(self.supabase.clone());
        let catalog = CatalogService::new(self.supabase.clone());
        let (unit, service) = try_join!(
            units.get_unit(tenant_id, request.unit_id, auth_token),
            catalog.get_service(tenant_id, request.service_id, auth_token),
        )?;
        if !service.active {
            return Err(AppointmentError::InactiveService(service.id));
        }

        let tz = parse_timezone(&unit.timezone);
        let professionals = ProfessionalService::new(self.supabase.clone())
            .list_active(unit.id, tier)
            .await?;
        let ids: Vec<Uuid> = professionals.iter().map(|p| p.id).collect();

        let day = day_window(date, tz);
        let schedule = ScheduleRuleService::new(self.supabase.clone());
        let absences = TimeOffService::new(self.supabase.clone());
        let guard = ConflictGuard::new(self.supabase.clone());
        let (rules, time_off, booked) = try_join!(
            schedule.list_rules_for_day(&ids, day_of_week(date), tier),
            absences.list_overlapping(&ids, &day, tier),
            guard.occupying_in_window(&ids, &day, tier),
        )?;

        let mut exclusions: HashMap<Uuid, Vec<Interval>> = HashMap::new();
        for entry in &time_off {
            exclusions
                .entry(entry.calendar_id)
                .or_default()
                .push(Interval::new(entry.start, entry.end));
        }
        for appointment in &booked {
            exclusions
                .entry(appointment.professional_id)
                .or_default()
                .push(Interval::new(appointment.start, appointment.end));
        }

        let mut slots = Vec::new();
        for professional_id in ids {
            let own_rules: Vec<_> = rules
                .iter()
                .filter(|r| r.calendar_id == professional_id)
                .cloned()
                .collect();
            let candidates = generate_slots_for_width(&own_rules, date, tz, service.duration_min);
            let blocked = exclusions.remove(&professional_id).unwrap_or_default();
            slots.extend(resolve_availability(professional_id, &candidates, blocked));
        }
        slots.sort_by_key(|s| (s.start, s.professional_id));

        debug!(
            "Resolved {} slots ({} available) for unit {} on {}",
            slots.len(),
            slots.iter().filter(|s| s.available).count(),
            unit.id,
            request.date
        );

        Ok(AvailabilityResponse {
            date: request.date,
            unit_id: request.unit_id,
            service_id: request.service_id,
            slots,
        })
    }
}

/// `[local midnight, next local midnight)` of `date` in UTC.
fn day_window(date: NaiveDate, tz: chrono_tz::Tz) -> Interval {
    let next = date.checked_add_days(Days::new(1)).unwrap_or(date);
    Interval::new(start_of_day(date, tz), start_of_day(next, tz))
}
