// Library crate for the Lumon staff portal
// Exports modules for use by the server and manage binaries and tests

pub mod config;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod middlewares;
pub mod models;
pub mod repositories;
pub mod services;
pub mod session;
pub mod state;

use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::handlers::{
    department_action, department_screen, home, login, login_screen, logout, user_action,
    user_screen, users_by_department_report, MAX_UPLOAD_BYTES,
};
use crate::middlewares::session_middleware;
use crate::state::AppState;

/// Build the application router with the given state
pub fn build_router(state: AppState) -> Router {
    let media = ServeDir::new(state.photos.media_root());

    Router::new()
        .route("/health", get(|| async { "ok" }))
        // Login / logout
        .route("/", get(login_screen).post(login))
        .route("/logout", get(logout).post(logout))
        // Screens behind the auth gate
        .route("/home", get(home))
        .route(
            "/departamentos",
            get(department_screen).post(department_action),
        )
        .route(
            "/usuarios",
            get(user_screen)
                .post(user_action)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/relatorios/usuarios-departamento",
            get(users_by_department_report),
        )
        // Uploaded photos
        .nest_service("/media", media)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
