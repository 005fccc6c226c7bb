/**
 * Leads Routes
 * Contact-form submissions: public create, admin-only list/delete
 */
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::auth::require_admin;
use crate::db::models::Lead;
use crate::error::ApiError;
use crate::routes::{ApiResponse, Pagination};
use crate::AppState;

const LEAD_COLUMNS: &str = "id, name, email, whatsapp, service, message, created_at";

// ============================================================================
// Request Types
// ============================================================================

/// Request body for POST /leads (create)
#[derive(Debug, Deserialize)]
pub struct CreateLeadRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub service: Option<String>,
    pub message: Option<String>,
}

/// Query parameters for GET /leads (list)
#[derive(Debug, Deserialize)]
pub struct LeadListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub search: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    50
}

/// Query parameters carrying the target id for DELETE
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /leads - Create a lead (public; this is the contact form). All of
/// name/email/whatsapp/service must be non-empty after trimming; email is
/// normalized to lower case.
pub async fn create_lead(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let payload: CreateLeadRequest = crate::routes::parse_json(&body)?;

    let name = payload.name.as_deref().unwrap_or("").trim().to_string();
    let email = payload
        .email
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_lowercase();
    let whatsapp = payload.whatsapp.as_deref().unwrap_or("").trim().to_string();
    let service = payload.service.as_deref().unwrap_or("").trim().to_string();

    if name.is_empty() || email.is_empty() || whatsapp.is_empty() || service.is_empty() {
        return Err(ApiError::validation("Missing required fields"));
    }

    let message = payload
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    let pool = state.pool()?;

    let lead = sqlx::query_as::<_, Lead>(&format!(
        "INSERT INTO leads (name, email, whatsapp, service, message) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {LEAD_COLUMNS}"
    ))
    .bind(&name)
    .bind(&email)
    .bind(&whatsapp)
    .bind(&service)
    .bind(&message)
    .fetch_one(pool)
    .await?;

    tracing::info!("Lead created: id={}", lead.id);

    Ok(Json(ApiResponse::created(lead, "Lead created")))
}

/// GET /leads - List leads with pagination and search (auth required).
/// `search` matches substrings of name, email, or service,
/// case-insensitively.
pub async fn list_leads(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LeadListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers)?;

    let pool = state.pool()?;

    let page = query.page.max(1);
    let limit = query.limit.max(1);
    let offset = (page - 1) * limit;

    let search = query.search.as_deref().filter(|s| !s.is_empty());

    let (leads, total): (Vec<Lead>, i64) = if let Some(search) = search {
        let pattern = format!("%{search}%");

        let leads = sqlx::query_as(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads \
             WHERE name ILIKE $1 OR email ILIKE $1 OR service ILIKE $1 \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM leads \
             WHERE name ILIKE $1 OR email ILIKE $1 OR service ILIKE $1",
        )
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

        (leads, total.0)
    } else {
        let leads = sqlx::query_as(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads \
             ORDER BY created_at DESC \
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM leads")
            .fetch_one(pool)
            .await?;

        (leads, total.0)
    };

    Ok(Json(ApiResponse::page(
        leads,
        Pagination::new(page, limit, total),
    )))
}

/// DELETE /leads?id= - Delete a lead (auth required). Idempotent: the
/// affected-row count is not checked.
pub async fn delete_lead(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<IdQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers)?;

    let id = query
        .id
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation("Missing id parameter"))?;

    let pool = state.pool()?;

    sqlx::query("DELETE FROM leads WHERE id::text = $1")
        .bind(&id)
        .execute(pool)
        .await?;

    tracing::info!("Lead deleted: id={}", id);

    Ok(Json(ApiResponse::<()>::message("Lead deleted")))
}
