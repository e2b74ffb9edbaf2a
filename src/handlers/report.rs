use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::AppResult;
use crate::handlers::common::CurrentUser;
use crate::middlewares::AuthUser;
use crate::models::{Department, ReportSelector, UserRow};
use crate::repositories::DepartmentRepository;
use crate::services::ReportService;
use crate::session::{FlashMessage, Session};
use crate::state::AppState;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportParams {
    /// Department id, `todos` for everyone, empty for no selection
    pub departamento: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportScreen {
    pub current_user: CurrentUser,
    /// Choices for the department selector
    pub departments: Vec<Department>,
    /// Selector as submitted
    pub selected: String,
    pub title: Option<String>,
    pub rows: Vec<UserRow>,
    pub total: u64,
    pub messages: Vec<FlashMessage>,
}

// ============ Handlers ============

/// Users grouped by department
#[utoipa::path(
    get,
    path = "/relatorios/usuarios-departamento",
    params(ReportParams),
    responses(
        (status = 200, description = "Report rows sorted by name", body = ReportScreen),
        (status = 303, description = "Not logged in, redirect to /")
    ),
    tag = "Reports"
)]
pub async fn users_by_department_report(
    user: AuthUser,
    session: Session,
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<ReportScreen>> {
    let selector = ReportSelector::parse(params.departamento.as_deref());
    let report = ReportService::users_by_department(&state.db, &selector).await?;
    let departments = DepartmentRepository::list_all(&state.db).await?;

    Ok(Json(ReportScreen {
        current_user: user.into(),
        departments,
        selected: params.departamento.unwrap_or_default(),
        title: report.title,
        rows: report.rows,
        total: report.total,
        messages: session.take_messages().await,
    }))
}
