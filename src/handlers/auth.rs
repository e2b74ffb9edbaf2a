use axum::{extract::State, response::Redirect, Form, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::handlers::common::{validate_required, CurrentUser};
use crate::middlewares::AuthUser;
use crate::models::{Profile, User, UserResponse};
use crate::repositories::{ProfileRepository, Repository, UserRepository};
use crate::services::AuthService;
use crate::session::{FlashMessage, Session, SessionIdentity};
use crate::state::AppState;

const LOGIN_SCREEN: &str = "/";
const HOME_SCREEN: &str = "/home";
const LOGIN_NOT_FOUND: &str = "Usuário não encontrado com este email e perfil.";

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub senha: Option<String>,
    /// Profile id chosen on the login screen
    pub perfil: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginScreen {
    /// Set when the visitor already holds a session
    pub current_user: Option<CurrentUser>,
    pub profiles: Vec<Profile>,
    pub messages: Vec<FlashMessage>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HomeScreen {
    pub current_user: CurrentUser,
    pub user: UserResponse,
    pub messages: Vec<FlashMessage>,
}

// ============ Handlers ============

/// Login screen
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Login screen", body = LoginScreen)
    ),
    tag = "Auth"
)]
pub async fn login_screen(
    session: Session,
    State(state): State<AppState>,
) -> AppResult<Json<LoginScreen>> {
    let profiles = ProfileRepository::list_all(&state.db).await?;
    let current_user: Option<CurrentUser> = session
        .identity()
        .await
        .map(|identity| AuthUser::from(identity).into());

    Ok(Json(LoginScreen {
        current_user,
        profiles,
        messages: session.take_messages().await,
    }))
}

/// Log in with email, password and profile
#[utoipa::path(
    post,
    path = "/",
    request_body(content = LoginRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirect to /home on success, back to / otherwise")
    ),
    tag = "Auth"
)]
pub async fn login(
    session: Session,
    State(state): State<AppState>,
    Form(payload): Form<LoginRequest>,
) -> AppResult<Redirect> {
    let email = validate_required(payload.email.as_deref());
    let password = payload.senha.filter(|p| !p.is_empty());
    let profile = validate_required(payload.perfil.as_deref());

    let (Some(email), Some(password), Some(profile)) = (email, password, profile) else {
        session.error("Todos os campos são obrigatórios.").await;
        return Ok(Redirect::to(LOGIN_SCREEN));
    };

    match authenticate(&state, &email, &password, &profile).await {
        Ok((user, profile)) => {
            tracing::info!(user_id = user.id, profile = %profile.name, "User logged in");
            let welcome = format!("Bem-vindo(a), {}!", user.full_name);
            session
                .login(SessionIdentity {
                    user_id: user.id,
                    user_name: user.full_name,
                    user_email: user.email,
                    profile_name: profile.name,
                })
                .await;
            session.success(welcome).await;
            Ok(Redirect::to(HOME_SCREEN))
        }
        Err(e) if e.is_user_facing() => {
            tracing::info!(email = %email, reason = %e, "Login rejected");
            session.error(e.to_string()).await;
            Ok(Redirect::to(LOGIN_SCREEN))
        }
        Err(e) => Err(e),
    }
}

/// Look the user up by email and profile, then check the password
async fn authenticate(
    state: &AppState,
    email: &str,
    password: &str,
    profile: &str,
) -> AppResult<(User, Profile)> {
    let profile_id: i32 = profile
        .parse()
        .map_err(|_| AppError::NotFound(LOGIN_NOT_FOUND.to_string()))?;

    let user = UserRepository::find_by_email_and_profile(&state.db, email, profile_id).await?;

    if !AuthService::verify_password(password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let profile = ProfileRepository::find_by_id(&state.db, profile_id).await?;
    Ok((user, profile))
}

/// Log out and forget the whole session
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 303, description = "Redirect to the login screen")
    ),
    tag = "Auth"
)]
pub async fn logout(session: Session) -> Redirect {
    if let Some(identity) = session.identity().await {
        tracing::info!(user_id = identity.user_id, "User logged out");
    }
    session.flush().await;
    session.info("Você saiu do sistema.").await;
    Redirect::to(LOGIN_SCREEN)
}

/// Main menu for the logged-in user
#[utoipa::path(
    get,
    path = "/home",
    responses(
        (status = 200, description = "Home screen", body = HomeScreen),
        (status = 303, description = "Not logged in, redirect to /")
    ),
    tag = "Auth"
)]
pub async fn home(
    user: AuthUser,
    session: Session,
    State(state): State<AppState>,
) -> AppResult<Json<HomeScreen>> {
    let record = UserRepository::find_by_id(&state.db, user.id).await?;

    Ok(Json(HomeScreen {
        current_user: user.into(),
        user: record.into(),
        messages: session.take_messages().await,
    }))
}
