use std::sync::Arc;

use chrono::Duration;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use customer_cell::services::CustomerService;
use organization_cell::services::CatalogService;
use professional_cell::services::Interval;
use shared_database::query::timestamp;
use shared_database::{CredentialTier, DbError, Order, Query, SupabaseClient};
use shared_models::error::ValidationErrors;
use shared_utils::pagination::PaginatedResponse;
use shared_utils::validation::{Validate, Validator};

use crate::models::{
    Appointment, AppointmentDetails, AppointmentError, AppointmentListQuery, AppointmentStatus,
    CreateAppointmentRequest, UpdateAppointmentRequest, DETAILS_SELECT,
};
use crate::services::conflict::ConflictGuard;

/// Result of a booking attempt. A replay carries the appointment first stored
/// under the same idempotency key.
#[derive(Debug, Clone)]
pub enum BookingOutcome {
    Created(Appointment),
    Replayed(Appointment),
}

impl BookingOutcome {
    pub fn is_replay(&self) -> bool {
        matches!(self, BookingOutcome::Replayed(_))
    }

    pub fn appointment(&self) -> &Appointment {
        match self {
            BookingOutcome::Created(a) | BookingOutcome::Replayed(a) => a,
        }
    }

    pub fn into_inner(self) -> Appointment {
        match self {
            BookingOutcome::Created(a) | BookingOutcome::Replayed(a) => a,
        }
    }
}

fn lost_key_race(err: &AppointmentError) -> bool {
    match err {
        AppointmentError::Conflict { .. } => true,
        AppointmentError::Storage(e) => e.is_unique_violation(),
        _ => false,
    }
}

pub struct BookingService {
    supabase: Arc<SupabaseClient>,
    guard: ConflictGuard,
}

impl BookingService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        let guard = ConflictGuard::new(Arc::clone(&supabase));
        Self { supabase, guard }
    }

    fn by_id(tenant_id: Uuid, appointment_id: Uuid) -> Query {
        Query::table("appointments")
            .eq("id", appointment_id)
            .eq("tenant_id", tenant_id)
    }

    pub async fn find_by_idempotency_key(
        &self,
        tenant_id: Uuid,
        key: &str,
        auth_token: &str,
    ) -> Result<Option<Appointment>, AppointmentError> {
        let query = Query::table("appointments")
            .eq("tenant_id", tenant_id)
            .eq("idempotency_key", key);

        Ok(self
            .supabase
            .select_one(&query, CredentialTier::UserScoped(Some(auth_token)))
            .await?)
    }

    /// Books an appointment. The end instant and price estimate come from the
    /// service; a repeated idempotency key returns the stored row untouched.
    pub async fn create_appointment(
        &self,
        tenant_id: Uuid,
        request: CreateAppointmentRequest,
        auth_token: &str,
    ) -> Result<BookingOutcome, AppointmentError> {
        request.validate()?;
        let tier = CredentialTier::UserScoped(Some(auth_token));

        if let Some(key) = request.idempotency_key.as_deref() {
            if let Some(existing) = self.find_by_idempotency_key(tenant_id, key, auth_token).await? {
                info!("Idempotency key {} replayed appointment {}", key, existing.id);
                return Ok(BookingOutcome::Replayed(existing));
            }
        }

        let service = CatalogService::new(self.supabase.clone())
            .get_service(tenant_id, request.service_id, auth_token)
            .await?;
        if !service.active {
            return Err(AppointmentError::InactiveService(service.id));
        }
        let interval = Interval::new(
            request.start,
            request.start + Duration::minutes(i64::from(service.duration_min)),
        );

        let customer_id = match (request.customer_id, request.customer_data.clone()) {
            (Some(id), _) => id,
            (None, Some(data)) => {
                CustomerService::new(self.supabase.clone())
                    .find_or_create(tenant_id, data.into(), auth_token)
                    .await?
                    .id
            }
            (None, None) => {
                return Err(ValidationErrors::single(
                    "customer_id",
                    "required",
                    "Either customer_id or customer_data is required",
                )
                .into())
            }
        };

        let appointment_data = json!({
            "tenant_id": tenant_id,
            "unit_id": request.unit_id,
            "customer_id": customer_id,
            "professional_id": request.professional_id,
            "service_id": request.service_id,
            "start": timestamp(&interval.start),
            "end": timestamp(&interval.end),
            "status": AppointmentStatus::Pending,
            "source": request.source.unwrap_or_default(),
            "price_estimate": service.base_price,
            "notes": request.notes,
            "idempotency_key": request.idempotency_key,
        });

        let stored = match self
            .guard
            .ensure_free(request.professional_id, &interval, None, tier)
            .await
        {
            Ok(()) => self
                .supabase
                .insert::<Appointment, _>("appointments", &appointment_data, tier)
                .await
                .map_err(|e| self.map_write_error(e, request.professional_id, &interval)),
            Err(e) => Err(e),
        };

        match (stored, request.idempotency_key.as_deref()) {
            (Ok(appointment), _) => {
                info!(
                    "Appointment {} booked with professional {} at {}",
                    appointment.id, appointment.professional_id, appointment.start
                );
                Ok(BookingOutcome::Created(appointment))
            }
            // A concurrent request with the same key may have stored its row
            // first, surfacing here as an overlap or a key violation.
            (Err(e), Some(key)) if lost_key_race(&e) => {
                warn!("Booking with idempotency key {} collided, re-reading", key);
                match self.find_by_idempotency_key(tenant_id, key, auth_token).await? {
                    Some(existing) => {
                        info!("Idempotency key {} replayed appointment {}", key, existing.id);
                        Ok(BookingOutcome::Replayed(existing))
                    }
                    None => Err(e),
                }
            }
            (Err(e), _) => Err(e),
        }
    }

    fn map_write_error(&self, err: DbError, professional_id: Uuid, interval: &Interval) -> AppointmentError {
        if err.is_exclusion_violation() {
            warn!("Storage rejected overlapping appointment for professional {}", professional_id);
            AppointmentError::Conflict {
                professional_id,
                start: interval.start,
                end: interval.end,
            }
        } else {
            AppointmentError::Storage(err)
        }
    }

    pub async fn list_appointments(
        &self,
        tenant_id: Uuid,
        params: &AppointmentListQuery,
        auth_token: &str,
    ) -> Result<PaginatedResponse<AppointmentDetails>, AppointmentError> {
        let pagination = params.pagination();
        pagination.validate()?;

        let mut query = Query::table("appointments")
            .select(DETAILS_SELECT)
            .eq("tenant_id", tenant_id);
        if let Some(unit_id) = params.unit_id {
            query = query.eq("unit_id", unit_id);
        }
        if let Some(professional_id) = params.professional_id {
            query = query.eq("professional_id", professional_id);
        }
        if let Some(customer_id) = params.customer_id {
            query = query.eq("customer_id", customer_id);
        }
        if let Some(status) = params.status {
            query = query.eq("status", status);
        }
        if let Some(from) = params.from {
            query = query.gte("start", timestamp(&from));
        }
        if let Some(to) = params.to {
            query = query.lte("start", timestamp(&to));
        }
        let query = query
            .order("start", Order::Desc)
            .range(pagination.offset(), pagination.limit);

        let (appointments, total) = self
            .supabase
            .select_with_count(&query, CredentialTier::UserScoped(Some(auth_token)))
            .await?;

        debug!("Listed {} of {} appointments for tenant {}", appointments.len(), total, tenant_id);
        Ok(PaginatedResponse::new(appointments, &pagination, total))
    }

    pub async fn get_appointment(
        &self,
        tenant_id: Uuid,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<AppointmentDetails, AppointmentError> {
        self.supabase
            .select_one(
                &Self::by_id(tenant_id, appointment_id).select(DETAILS_SELECT),
                CredentialTier::UserScoped(Some(auth_token)),
            )
            .await?
            .ok_or(AppointmentError::NotFound(appointment_id))
    }

    /// Applies a partial update. Moving the appointment, or bringing a released
    /// one back into an occupying status, goes through the conflict guard with
    /// the appointment itself excluded.
    pub async fn update_appointment(
        &self,
        tenant_id: Uuid,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        request.validate()?;
        let tier = CredentialTier::UserScoped(Some(auth_token));

        let current: Appointment = self
            .supabase
            .select_one(&Self::by_id(tenant_id, appointment_id), tier)
            .await?
            .ok_or(AppointmentError::NotFound(appointment_id))?;

        let start = request.start.unwrap_or(current.start);
        let end = match (request.start, request.end) {
            (_, Some(end)) => end,
            (Some(start), None) => start + (current.end - current.start),
            (None, None) => current.end,
        };
        Validator::new().interval("end", &start, &end).finish()?;
        let interval = Interval::new(start, end);

        let status = request.status.unwrap_or(current.status);
        let reoccupies = !current.status.occupies_slot() && status.occupies_slot();
        if status.occupies_slot() && (request.moves_time() || reoccupies) {
            self.guard
                .ensure_free(current.professional_id, &interval, Some(appointment_id), tier)
                .await?;
        }

        let mut changes = request;
        if changes.start.is_some() {
            changes.end = Some(end);
        }

        let updated = self
            .supabase
            .update::<Appointment, _>(&Self::by_id(tenant_id, appointment_id), &changes, tier)
            .await
            .map_err(|e| match e {
                DbError::NotFound(_) => AppointmentError::NotFound(appointment_id),
                e => self.map_write_error(e, current.professional_id, &interval),
            })?;

        info!("Appointment {} updated (status {})", updated.id, updated.status);
        Ok(updated)
    }

    pub async fn delete_appointment(
        &self,
        tenant_id: Uuid,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        self.supabase
            .delete(
                &Self::by_id(tenant_id, appointment_id),
                CredentialTier::UserScoped(Some(auth_token)),
            )
            .await
            .map_err(|e| match e {
                DbError::NotFound(_) => AppointmentError::NotFound(appointment_id),
                e => AppointmentError::Storage(e),
            })?;
        info!("Appointment {} deleted", appointment_id);
        Ok(())
    }
}
