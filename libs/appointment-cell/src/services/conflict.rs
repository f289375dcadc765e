use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use professional_cell::services::Interval;
use shared_database::{CredentialTier, Order, Query, SupabaseClient};
use shared_models::error::AppError;

use crate::models::{Appointment, AppointmentError, AppointmentStatus};

/// Half-open overlap: `[a_start, a_end)` and `[b_start, b_end)` share an instant.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

fn occupying(query: Query) -> Query {
    query.not_in("status", AppointmentStatus::RELEASED.iter().map(|s| s.as_str()))
}

/// Rejects writes that would double-book a professional. The storage layer's
/// exclusion constraint remains the final arbiter for concurrent writers.
pub struct ConflictGuard {
    supabase: Arc<SupabaseClient>,
}

impl ConflictGuard {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Occupying appointments of `professional_id` intersecting `interval`,
    /// ignoring `exclude_id` (the appointment being moved).
    pub async fn find_conflicts(
        &self,
        professional_id: Uuid,
        interval: &Interval,
        exclude_id: Option<Uuid>,
        tier: CredentialTier<'_>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut query = occupying(
            Query::table("appointments")
                .eq("professional_id", professional_id)
                .overlapping("start", "end", &interval.start, &interval.end),
        );
        if let Some(id) = exclude_id {
            query = query.neq("id", id);
        }

        let rows: Vec<Appointment> = self.supabase.select(&query, tier).await?;

        Ok(rows
            .into_iter()
            .filter(|a| Some(a.id) != exclude_id)
            .filter(|a| a.status.occupies_slot())
            .filter(|a| overlaps(a.start, a.end, interval.start, interval.end))
            .collect())
    }

    pub async fn ensure_free(
        &self,
        professional_id: Uuid,
        interval: &Interval,
        exclude_id: Option<Uuid>,
        tier: CredentialTier<'_>,
    ) -> Result<(), AppointmentError> {
        let conflicts = self
            .find_conflicts(professional_id, interval, exclude_id, tier)
            .await?;

        if let Some(existing) = conflicts.first() {
            warn!(
                "Professional {} already booked by appointment {} ({} - {})",
                professional_id, existing.id, existing.start, existing.end
            );
            return Err(AppointmentError::Conflict {
                professional_id,
                start: interval.start,
                end: interval.end,
            });
        }

        debug!("Professional {} is free from {} to {}", professional_id, interval.start, interval.end);
        Ok(())
    }

    /// Occupying appointments of several professionals intersecting `window`.
    pub async fn occupying_in_window(
        &self,
        professional_ids: &[Uuid],
        window: &Interval,
        tier: CredentialTier<'_>,
    ) -> Result<Vec<Appointment>, AppError> {
        if professional_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = occupying(
            Query::table("appointments")
                .in_list("professional_id", professional_ids)
                .overlapping("start", "end", &window.start, &window.end),
        )
        .order("start", Order::Asc);

        let rows: Vec<Appointment> = self.supabase.select(&query, tier).await?;
        Ok(rows.into_iter().filter(|a| a.status.occupies_slot()).collect())
    }
}
