use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use lumon_portal::config::Config;
use lumon_portal::handlers::{
    CurrentUser, DepartmentForm, DepartmentScreen, HomeScreen, LoginRequest, LoginScreen,
    ReportScreen, UserForm, UserScreen,
};
use lumon_portal::models::{Department, Profile, UserResponse, UserRow};
use lumon_portal::session::{FlashLevel, FlashMessage, SESSION_COOKIE};
use lumon_portal::state::AppState;
use lumon_portal::{build_router, handlers};

/// Security scheme for the session cookie
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login_screen,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::home,
        handlers::department::department_screen,
        handlers::department::department_action,
        handlers::user::user_screen,
        handlers::user::user_action,
        handlers::report::users_by_department_report,
    ),
    components(schemas(
        LoginRequest,
        LoginScreen,
        HomeScreen,
        CurrentUser,
        DepartmentForm,
        DepartmentScreen,
        UserForm,
        UserScreen,
        ReportScreen,
        Department,
        Profile,
        UserResponse,
        UserRow,
        FlashLevel,
        FlashMessage,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login, logout and main menu"),
        (name = "Departments", description = "Department registry"),
        (name = "Users", description = "Staff registry with photo upload"),
        (name = "Reports", description = "Users by department")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");
    let addr = config.server_addr();

    tracing::info!("Connecting to database...");
    let state = AppState::new(config)
        .await
        .expect("Failed to initialize application state");
    tracing::info!("Database connection established");

    // Build the main application router
    let app = build_router(state)
        // Add Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server address");

    tracing::info!("Server started on http://{}", addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", addr);
    axum::serve(listener, app)
        .await
        .expect("Server error");
}
