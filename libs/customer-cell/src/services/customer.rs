use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::{CredentialTier, Order, Query, SupabaseClient};
use shared_models::error::AppError;
use shared_utils::pagination::PaginatedResponse;
use shared_utils::validation::Validate;

use crate::models::{CreateCustomerRequest, Customer, CustomerListQuery, UpdateCustomerRequest};

pub struct CustomerService {
    supabase: Arc<SupabaseClient>,
}

impl CustomerService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn by_id(tenant_id: Uuid, customer_id: Uuid) -> Query {
        Query::table("customers")
            .eq("id", customer_id)
            .eq("tenant_id", tenant_id)
    }

    pub async fn create_customer(
        &self,
        tenant_id: Uuid,
        request: CreateCustomerRequest,
        auth_token: &str,
    ) -> Result<Customer, AppError> {
        request.validate()?;
        debug!("Creating customer {} for tenant {}", request.email, tenant_id);

        let customer_data = json!({
            "tenant_id": tenant_id,
            "name": request.name,
            "email": request.email.to_lowercase(),
            "phone": request.phone,
            "consent_flags": request.consent_flags,
        });

        let customer: Customer = self
            .supabase
            .insert("customers", &customer_data, CredentialTier::UserScoped(Some(auth_token)))
            .await?;

        info!("Customer {} created", customer.id);
        Ok(customer)
    }

    /// One page of the tenant's customers ordered by name. `search` matches
    /// name or e-mail case-insensitively.
    pub async fn list_customers(
        &self,
        tenant_id: Uuid,
        params: &CustomerListQuery,
        auth_token: &str,
    ) -> Result<PaginatedResponse<Customer>, AppError> {
        let pagination = params.pagination();
        pagination.validate()?;

        let mut query = Query::table("customers").eq("tenant_id", tenant_id);
        if let Some(term) = params.search_term() {
            query = query.any_ilike(&["name", "email"], term);
        }
        let query = query
            .order("name", Order::Asc)
            .range(pagination.offset(), pagination.limit);

        let (customers, total) = self
            .supabase
            .select_with_count(&query, CredentialTier::UserScoped(Some(auth_token)))
            .await?;

        Ok(PaginatedResponse::new(customers, &pagination, total))
    }

    pub async fn get_customer(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
        auth_token: &str,
    ) -> Result<Customer, AppError> {
        self.supabase
            .select_one(&Self::by_id(tenant_id, customer_id), CredentialTier::UserScoped(Some(auth_token)))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Customer {} not found", customer_id)))
    }

    pub async fn find_by_email(
        &self,
        tenant_id: Uuid,
        email: &str,
        auth_token: &str,
    ) -> Result<Option<Customer>, AppError> {
        let query = Query::table("customers")
            .eq("email", email.to_lowercase())
            .eq("tenant_id", tenant_id);

        Ok(self
            .supabase
            .select_one(&query, CredentialTier::UserScoped(Some(auth_token)))
            .await?)
    }

    pub async fn get_customer_by_email(
        &self,
        tenant_id: Uuid,
        email: &str,
        auth_token: &str,
    ) -> Result<Customer, AppError> {
        self.find_by_email(tenant_id, email, auth_token)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Customer with email {} not found", email)))
    }

    /// Existing customer with the same e-mail in the tenant, or a new one.
    pub async fn find_or_create(
        &self,
        tenant_id: Uuid,
        request: CreateCustomerRequest,
        auth_token: &str,
    ) -> Result<Customer, AppError> {
        request.validate()?;

        if let Some(existing) = self.find_by_email(tenant_id, &request.email, auth_token).await? {
            debug!("Reusing customer {} for {}", existing.id, request.email);
            return Ok(existing);
        }

        self.create_customer(tenant_id, request, auth_token).await
    }

    pub async fn update_customer(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
        mut request: UpdateCustomerRequest,
        auth_token: &str,
    ) -> Result<Customer, AppError> {
        request.validate()?;
        request.email = request.email.map(|e| e.to_lowercase());

        Ok(self
            .supabase
            .update(
                &Self::by_id(tenant_id, customer_id),
                &request,
                CredentialTier::UserScoped(Some(auth_token)),
            )
            .await?)
    }

    pub async fn delete_customer(&self, tenant_id: Uuid, customer_id: Uuid, auth_token: &str) -> Result<(), AppError> {
        self.supabase
            .delete(&Self::by_id(tenant_id, customer_id), CredentialTier::UserScoped(Some(auth_token)))
            .await?;
        info!("Customer {} deleted", customer_id);
        Ok(())
    }
}
