use axum::{extract::State, response::Redirect, Form, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::handlers::common::{
    parse_id, redirect_with_outcome, validate_optional, validate_required, CurrentUser, FormAction,
};
use crate::middlewares::AuthUser;
use crate::models::{Department, DepartmentInput};
use crate::repositories::{DepartmentRepository, Repository};
use crate::session::{FlashMessage, Session};
use crate::state::AppState;

const DEPARTMENTS_SCREEN: &str = "/departamentos";
const NOT_FOUND: &str = "Departamento não encontrado.";
const NAME_REQUIRED: &str = "O nome do departamento é obrigatório.";

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct DepartmentForm {
    /// `criar`, `alterar` or `excluir`
    pub acao: Option<String>,
    pub id: Option<String>,
    pub departamento: Option<String>,
    pub sigla: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentScreen {
    pub current_user: CurrentUser,
    pub departments: Vec<Department>,
    pub messages: Vec<FlashMessage>,
}

// ============ Handlers ============

/// List departments
#[utoipa::path(
    get,
    path = "/departamentos",
    responses(
        (status = 200, description = "Departments sorted by name", body = DepartmentScreen),
        (status = 303, description = "Not logged in, redirect to /")
    ),
    tag = "Departments"
)]
pub async fn department_screen(
    user: AuthUser,
    session: Session,
    State(state): State<AppState>,
) -> AppResult<Json<DepartmentScreen>> {
    let departments = DepartmentRepository::list_all(&state.db).await?;

    Ok(Json(DepartmentScreen {
        current_user: user.into(),
        departments,
        messages: session.take_messages().await,
    }))
}

/// Create, update or delete a department
#[utoipa::path(
    post,
    path = "/departamentos",
    request_body(content = DepartmentForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirect back to /departamentos with a flash message")
    ),
    tag = "Departments"
)]
pub async fn department_action(
    user: AuthUser,
    session: Session,
    State(state): State<AppState>,
    Form(form): Form<DepartmentForm>,
) -> AppResult<Redirect> {
    let outcome = match FormAction::parse(form.acao.as_deref()) {
        Some(FormAction::Create) => create_department(&state, &form).await,
        Some(FormAction::Update) => update_department(&state, &form).await,
        Some(FormAction::Delete) => delete_department(&state, &form).await,
        None => return Ok(Redirect::to(DEPARTMENTS_SCREEN)),
    };

    if let Err(e) = &outcome {
        tracing::info!(user_id = user.id, action = ?form.acao, reason = %e, "Department action rejected");
    }

    redirect_with_outcome(&session, DEPARTMENTS_SCREEN, outcome).await
}

fn department_input(form: &DepartmentForm) -> AppResult<DepartmentInput> {
    let name = validate_required(form.departamento.as_deref())
        .ok_or_else(|| AppError::Validation(NAME_REQUIRED.to_string()))?;

    Ok(DepartmentInput::new(
        name,
        validate_optional(form.sigla.as_deref()),
    ))
}

async fn create_department(state: &AppState, form: &DepartmentForm) -> AppResult<String> {
    let input = department_input(form)?;
    let department = DepartmentRepository::create(&state.db, &input).await?;

    tracing::info!(department_id = department.id, name = %department.name, "Department created");
    Ok("Departamento cadastrado com sucesso!".to_string())
}

async fn update_department(state: &AppState, form: &DepartmentForm) -> AppResult<String> {
    let input = department_input(form)?;
    let id = parse_id(form.id.as_deref(), NOT_FOUND)?;
    let department = DepartmentRepository::update(&state.db, id, &input).await?;

    tracing::info!(department_id = department.id, name = %department.name, "Department updated");
    Ok("Departamento alterado com sucesso!".to_string())
}

async fn delete_department(state: &AppState, form: &DepartmentForm) -> AppResult<String> {
    let id = parse_id(form.id.as_deref(), NOT_FOUND)?;
    DepartmentRepository::delete(&state.db, id).await?;

    tracing::info!(department_id = id, "Department deleted");
    Ok("Departamento excluído com sucesso!".to_string())
}
