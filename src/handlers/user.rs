use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    response::Redirect,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};
use crate::handlers::common::{
    parse_id, redirect_with_outcome, validate_required, CurrentUser, FormAction,
};
use crate::middlewares::AuthUser;
use crate::models::{Department, Page, PageRequest, Profile, UserRow, USERS_PER_PAGE};
use crate::repositories::{DepartmentRepository, ProfileRepository, UserRepository};
use crate::services::{NewUser, UploadedPhoto, UserChanges, UserService};
use crate::session::{FlashMessage, Session};
use crate::state::AppState;

const USERS_SCREEN: &str = "/usuarios";
const NOT_FOUND: &str = "Usuário não encontrado.";
const FIELDS_REQUIRED: &str = "Todos os campos obrigatórios devem ser preenchidos.";
const INVALID_REFERENCES: &str = "Perfil ou departamento inválido.";

/// Request body limit for the user form, photo included
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserListParams {
    /// Case-insensitive fragment of the user's name
    pub nome: Option<String>,
    /// 1-based page number; anything unusable falls back to page 1
    pub page: Option<String>,
}

/// Fields of the multipart user form
#[derive(Debug, Default, ToSchema)]
pub struct UserForm {
    /// `criar`, `alterar` or `excluir`
    pub acao: Option<String>,
    pub id: Option<String>,
    pub nome: Option<String>,
    pub email: Option<String>,
    pub senha: Option<String>,
    /// Profile id
    pub perfil: Option<String>,
    /// Department id
    pub departamento: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub foto: Option<Vec<u8>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserScreen {
    pub current_user: CurrentUser,
    #[schema(value_type = Object)]
    pub page: Page<UserRow>,
    pub name_filter: String,
    pub profiles: Vec<Profile>,
    pub departments: Vec<Department>,
    pub messages: Vec<FlashMessage>,
}

/// Parsed multipart submission. The photo is kept apart from the text fields.
#[derive(Debug, Default)]
struct UserSubmission {
    acao: Option<String>,
    id: Option<String>,
    nome: Option<String>,
    email: Option<String>,
    senha: Option<String>,
    perfil: Option<String>,
    departamento: Option<String>,
    foto: Option<UploadedPhoto>,
}

impl UserSubmission {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut submission = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "foto" {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;

                // Browsers send an empty part when no file was chosen
                if !filename.is_empty() && !bytes.is_empty() {
                    submission.foto = Some(UploadedPhoto {
                        filename,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                continue;
            }

            let value = Some(field.text().await?);
            match name.as_str() {
                "acao" => submission.acao = value,
                "id" => submission.id = value,
                "nome" => submission.nome = value,
                "email" => submission.email = value,
                "senha" => submission.senha = value,
                "perfil" => submission.perfil = value,
                "departamento" => submission.departamento = value,
                _ => {}
            }
        }

        Ok(submission)
    }

    fn password(&self) -> Option<String> {
        self.senha.clone().filter(|p| !p.is_empty())
    }

    /// Profile and department ids; ids that are not numbers cannot match
    fn references(&self) -> AppResult<(i32, i32)> {
        let profile_id = parse_id(self.perfil.as_deref(), INVALID_REFERENCES)?;
        let department_id = parse_id(self.departamento.as_deref(), INVALID_REFERENCES)?;
        Ok((profile_id, department_id))
    }
}

// ============ Handlers ============

/// List users, filtered by name and paginated
#[utoipa::path(
    get,
    path = "/usuarios",
    params(UserListParams),
    responses(
        (status = 200, description = "One page of users sorted by name", body = UserScreen),
        (status = 303, description = "Not logged in, redirect to /")
    ),
    tag = "Users"
)]
pub async fn user_screen(
    user: AuthUser,
    session: Session,
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<UserScreen>> {
    let name_filter = params.nome.as_deref().unwrap_or_default().trim().to_string();
    let page_request = PageRequest::parse(params.page.as_deref());

    let page =
        UserRepository::search_page(&state.db, &name_filter, page_request, USERS_PER_PAGE).await?;
    let profiles = ProfileRepository::list_all(&state.db).await?;
    let departments = DepartmentRepository::list_all(&state.db).await?;

    Ok(Json(UserScreen {
        current_user: user.into(),
        page,
        name_filter,
        profiles,
        departments,
        messages: session.take_messages().await,
    }))
}

/// Create, update or delete a user
#[utoipa::path(
    post,
    path = "/usuarios",
    request_body(content = UserForm, content_type = "multipart/form-data"),
    responses(
        (status = 303, description = "Redirect back to /usuarios with a flash message")
    ),
    tag = "Users"
)]
pub async fn user_action(
    user: AuthUser,
    session: Session,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Redirect> {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::info!(user_id = user.id, reason = %rejection.body_text(), "User form rejected");
            return redirect_with_outcome(&session, USERS_SCREEN, Err(rejection.into())).await;
        }
    };
    let submission = match UserSubmission::read(multipart).await {
        Ok(submission) => submission,
        Err(e) => return redirect_with_outcome(&session, USERS_SCREEN, Err(e)).await,
    };

    let outcome = match FormAction::parse(submission.acao.as_deref()) {
        Some(FormAction::Create) => create_user(&state, submission).await,
        Some(FormAction::Update) => update_user(&state, submission).await,
        Some(FormAction::Delete) => delete_user(&state, submission).await,
        None => return Ok(Redirect::to(USERS_SCREEN)),
    };

    if let Err(e) = &outcome {
        tracing::info!(user_id = user.id, reason = %e, "User action rejected");
    }

    redirect_with_outcome(&session, USERS_SCREEN, outcome).await
}

async fn create_user(state: &AppState, submission: UserSubmission) -> AppResult<String> {
    let full_name = validate_required(submission.nome.as_deref());
    let email = validate_required(submission.email.as_deref());
    let password = submission.password();
    let profile = validate_required(submission.perfil.as_deref());
    let department = validate_required(submission.departamento.as_deref());

    let (Some(full_name), Some(email), Some(password), Some(_), Some(_)) =
        (full_name, email, password, profile, department)
    else {
        return Err(AppError::Validation(FIELDS_REQUIRED.to_string()));
    };
    let (profile_id, department_id) = submission.references()?;

    let created = UserService::create(
        &state.db,
        &state.photos,
        NewUser {
            full_name,
            email,
            password,
            profile_id,
            department_id,
            photo: submission.foto,
        },
    )
    .await?;

    tracing::debug!(user_id = created.id, photo = ?created.photo_path, "User registered");
    Ok("Funcionário registrado com sucesso!".to_string())
}

async fn update_user(state: &AppState, submission: UserSubmission) -> AppResult<String> {
    let full_name = validate_required(submission.nome.as_deref());
    let email = validate_required(submission.email.as_deref());
    let profile = validate_required(submission.perfil.as_deref());
    let department = validate_required(submission.departamento.as_deref());

    let (Some(full_name), Some(email), Some(_), Some(_)) = (full_name, email, profile, department)
    else {
        return Err(AppError::Validation(FIELDS_REQUIRED.to_string()));
    };
    let id = parse_id(submission.id.as_deref(), NOT_FOUND)?;
    let (profile_id, department_id) = submission.references()?;
    let password = submission.password();

    UserService::update(
        &state.db,
        &state.photos,
        id,
        UserChanges {
            full_name,
            email,
            password,
            profile_id,
            department_id,
            photo: submission.foto,
        },
    )
    .await?;

    Ok("Funcionário atualizado com sucesso!".to_string())
}

async fn delete_user(state: &AppState, submission: UserSubmission) -> AppResult<String> {
    let id = parse_id(submission.id.as_deref(), NOT_FOUND)?;
    UserService::delete(&state.db, &state.photos, id).await?;

    Ok("Funcionário excluído com sucesso!".to_string())
}
