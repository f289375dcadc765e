use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::query::timestamp;
use shared_database::{CredentialTier, Order, Query, SupabaseClient};
use shared_models::error::AppError;
use shared_utils::validation::Validate;

use crate::models::{CreateTimeOffRequest, TimeOff, TimeOffWindow, UpdateTimeOffRequest};
use crate::services::slots::Interval;

pub struct TimeOffService {
    supabase: Arc<SupabaseClient>,
}

impl TimeOffService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn by_id(calendar_id: Uuid, time_off_id: Uuid) -> Query {
        Query::table("time_off")
            .eq("id", time_off_id)
            .eq("calendar_id", calendar_id)
    }

    pub async fn create_time_off(
        &self,
        calendar_id: Uuid,
        request: CreateTimeOffRequest,
        auth_token: &str,
    ) -> Result<TimeOff, AppError> {
        request.validate()?;
        debug!("Blocking calendar {} from {} to {}", calendar_id, request.start, request.end);

        let time_off_data = json!({
            "calendar_id": calendar_id,
            "start": timestamp(&request.start),
            "end": timestamp(&request.end),
            "reason": request.reason,
        });

        let time_off: TimeOff = self
            .supabase
            .insert("time_off", &time_off_data, CredentialTier::UserScoped(Some(auth_token)))
            .await?;

        info!("Time off {} created", time_off.id);
        Ok(time_off)
    }

    /// Time off of a calendar ordered by start. With both window bounds given,
    /// only entries intersecting `[from, to)` are returned.
    pub async fn list_time_off(
        &self,
        calendar_id: Uuid,
        window: &TimeOffWindow,
        tier: CredentialTier<'_>,
    ) -> Result<Vec<TimeOff>, AppError> {
        let mut query = Query::table("time_off").eq("calendar_id", calendar_id);
        query = match (window.from, window.to) {
            (Some(from), Some(to)) => query.overlapping("start", "end", &from, &to),
            (Some(from), None) => query.gt("end", timestamp(&from)),
            (None, Some(to)) => query.lt("start", timestamp(&to)),
            (None, None) => query,
        };

        Ok(self.supabase.select(&query.order("start", Order::Asc), tier).await?)
    }

    /// Time off of several calendars intersecting `window`.
    pub async fn list_overlapping(
        &self,
        calendar_ids: &[Uuid],
        window: &Interval,
        tier: CredentialTier<'_>,
    ) -> Result<Vec<TimeOff>, AppError> {
        if calendar_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = Query::table("time_off")
            .in_list("calendar_id", calendar_ids)
            .overlapping("start", "end", &window.start, &window.end)
            .order("start", Order::Asc);

        Ok(self.supabase.select(&query, tier).await?)
    }

    pub async fn update_time_off(
        &self,
        calendar_id: Uuid,
        time_off_id: Uuid,
        request: UpdateTimeOffRequest,
        auth_token: &str,
    ) -> Result<TimeOff, AppError> {
        request.validate()?;

        let tier = CredentialTier::UserScoped(Some(auth_token));
        let query = Self::by_id(calendar_id, time_off_id);

        if request.moves_one_edge() {
            let current: TimeOff = self
                .supabase
                .select_one(&query, tier)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Time off {} not found", time_off_id)))?;
            request.validate_against(&current)?;
        }

        Ok(self.supabase.update(&query, &request, tier).await?)
    }

    pub async fn delete_time_off(&self, calendar_id: Uuid, time_off_id: Uuid, auth_token: &str) -> Result<(), AppError> {
        self.supabase
            .delete(&Self::by_id(calendar_id, time_off_id), CredentialTier::UserScoped(Some(auth_token)))
            .await?;
        info!("Time off {} deleted", time_off_id);
        Ok(())
    }
}
