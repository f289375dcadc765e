use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use shared_database::{CredentialTier, Order, Query, SupabaseClient};
use shared_utils::validation::Validate;

use crate::models::{Appointment, AppointmentError, AppointmentReport, AppointmentStatus, ReportFilters};

/// Counts `appointments` by status, professional, unit and UTC start date.
/// Every status appears in `by_status`, zero when absent.
pub fn aggregate(appointments: &[Appointment]) -> AppointmentReport {
    let mut report = AppointmentReport {
        total: appointments.len() as u64,
        by_status: AppointmentStatus::ALL.iter().map(|s| (*s, 0)).collect(),
        ..Default::default()
    };

    for appointment in appointments {
        *report.by_status.entry(appointment.status).or_default() += 1;
        *report.by_professional.entry(appointment.professional_id).or_default() += 1;
        *report.by_unit.entry(appointment.unit_id).or_default() += 1;
        *report
            .by_date
            .entry(appointment.start.date_naive().format("%Y-%m-%d").to_string())
            .or_default() += 1;
    }

    report
}

pub struct ReportService {
    supabase: Arc<SupabaseClient>,
}

impl ReportService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub async fn appointment_report(
        &self,
        tenant_id: Uuid,
        filters: ReportFilters,
        auth_token: &str,
    ) -> Result<AppointmentReport, AppointmentError> {
        filters.validate()?;

        let mut query = Query::table("appointments")
            .eq("tenant_id", tenant_id)
            .gte("start", format!("{}T00:00:00Z", filters.from))
            .lte("start", format!("{}T23:59:59Z", filters.to));
        if let Some(unit_id) = filters.unit_id {
            query = query.eq("unit_id", unit_id);
        }
        if let Some(professional_id) = filters.professional_id {
            query = query.eq("professional_id", professional_id);
        }
        if let Some(status) = filters.status {
            query = query.eq("status", status);
        }

        let appointments: Vec<Appointment> = self
            .supabase
            .select(&query.order("start", Order::Asc), CredentialTier::UserScoped(Some(auth_token)))
            .await?;

        debug!(
            "Report for tenant {} from {} to {} covers {} appointments",
            tenant_id,
            filters.from,
            filters.to,
            appointments.len()
        );
        Ok(aggregate(&appointments))
    }
}
