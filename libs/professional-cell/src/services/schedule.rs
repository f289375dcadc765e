use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::{CredentialTier, Order, Query, SupabaseClient};
use shared_models::error::AppError;
use shared_utils::validation::Validate;

use crate::models::{CreateScheduleRuleRequest, ScheduleRule, UpdateScheduleRuleRequest};

pub struct ScheduleRuleService {
    supabase: Arc<SupabaseClient>,
}

impl ScheduleRuleService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn by_id(calendar_id: Uuid, rule_id: Uuid) -> Query {
        Query::table("schedule_rules")
            .eq("id", rule_id)
            .eq("calendar_id", calendar_id)
    }

    pub async fn create_rule(
        &self,
        calendar_id: Uuid,
        request: CreateScheduleRuleRequest,
        auth_token: &str,
    ) -> Result<ScheduleRule, AppError> {
        request.validate()?;
        debug!(
            "Adding rule day {} {}-{} to calendar {}",
            request.day_of_week, request.start_time, request.end_time, calendar_id
        );

        let rule_data = json!({
            "calendar_id": calendar_id,
            "day_of_week": request.day_of_week,
            "start_time": request.start_time,
            "end_time": request.end_time,
            "slot_min": request.slot_min,
        });

        let rule: ScheduleRule = self
            .supabase
            .insert("schedule_rules", &rule_data, CredentialTier::UserScoped(Some(auth_token)))
            .await?;

        info!("Schedule rule {} created", rule.id);
        Ok(rule)
    }

    pub async fn list_rules(
        &self,
        calendar_id: Uuid,
        tier: CredentialTier<'_>,
    ) -> Result<Vec<ScheduleRule>, AppError> {
        let query = Query::table("schedule_rules")
            .eq("calendar_id", calendar_id)
            .order("day_of_week", Order::Asc)
            .order("start_time", Order::Asc);

        Ok(self.supabase.select(&query, tier).await?)
    }

    /// Rules of several calendars in one round trip.
    pub async fn list_rules_for_day(
        &self,
        calendar_ids: &[Uuid],
        day_of_week: u8,
        tier: CredentialTier<'_>,
    ) -> Result<Vec<ScheduleRule>, AppError> {
        if calendar_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = Query::table("schedule_rules")
            .in_list("calendar_id", calendar_ids)
            .eq("day_of_week", day_of_week)
            .order("start_time", Order::Asc);

        Ok(self.supabase.select(&query, tier).await?)
    }

    pub async fn update_rule(
        &self,
        calendar_id: Uuid,
        rule_id: Uuid,
        request: UpdateScheduleRuleRequest,
        auth_token: &str,
    ) -> Result<ScheduleRule, AppError> {
        request.validate()?;

        let tier = CredentialTier::UserScoped(Some(auth_token));
        let query = Self::by_id(calendar_id, rule_id);

        if request.moves_one_edge() {
            let current: ScheduleRule = self
                .supabase
                .select_one(&query, tier)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Schedule rule {} not found", rule_id)))?;
            request.validate_against(&current)?;
        }

        Ok(self.supabase.update(&query, &request, tier).await?)
    }

    pub async fn delete_rule(&self, calendar_id: Uuid, rule_id: Uuid, auth_token: &str) -> Result<(), AppError> {
        self.supabase
            .delete(&Self::by_id(calendar_id, rule_id), CredentialTier::UserScoped(Some(auth_token)))
            .await?;
        info!("Schedule rule {} deleted", rule_id);
        Ok(())
    }
}
