use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::{header::SET_COOKIE, StatusCode};
use axum_test::{TestResponse, TestServer};
use cookie::Cookie;
use serde_json::Value;
use tempfile::TempDir;

use lumon_portal::build_router;
use lumon_portal::config::Config;
use lumon_portal::session::{InMemorySessionStore, SESSION_COOKIE};
use lumon_portal::state::AppState;

/// Test configuration: SQLite file database and media root inside `dir`
pub fn test_config(dir: &Path) -> Config {
    Config {
        database_url: format!("sqlite://{}?mode=rwc", dir.join("lumon.db").display()),
        redis_url: None,
        media_root: dir.join("media"),
        session_ttl_seconds: 3600,
        session_cookie_secure: false,
        host: "127.0.0.1".to_string(),
        port: 0,
    }
}

/// Test application wrapper
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub sessions: Arc<InMemorySessionStore>,
    // Dropped last; removes the database and every stored photo
    _dir: TempDir,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = test_config(dir.path());

        // In-memory sessions avoid a Redis dependency in tests
        let sessions = Arc::new(InMemorySessionStore::new());

        let state = AppState::with_session_store(config, sessions.clone())
            .await
            .expect("Failed to create test app state");

        let router = build_router(state.clone());
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            state,
            sessions,
            _dir: dir,
        }
    }

    pub fn media_path(&self, relative: &str) -> PathBuf {
        self.state.config.media_root.join(relative)
    }

    /// Submit the login form and keep the resulting session
    pub async fn login(&self, email: &str, password: &str, profile_id: i32) -> TestSession {
        let response = self
            .server
            .post("/")
            .form(&[
                ("email", email.to_string()),
                ("senha", password.to_string()),
                ("perfil", profile_id.to_string()),
            ])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/home", "login was rejected");

        TestSession {
            cookie: session_cookie(&response).expect("login did not set a session cookie"),
        }
    }

    /// GET a screen with the session and return its JSON view model
    pub async fn screen(&self, session: &TestSession, path: &str) -> Value {
        let response = self
            .server
            .get(path)
            .add_header("Cookie", session.header())
            .await;

        response.assert_status_ok();
        response.json::<Value>()
    }
}

/// Session cookie carried between requests
#[derive(Debug, Clone)]
pub struct TestSession {
    pub cookie: String,
}

impl TestSession {
    pub fn header(&self) -> String {
        format!("{}={}", SESSION_COOKIE, self.cookie)
    }

    /// Follow a cookie refresh; responses that don't touch it keep the old one
    pub fn update(&mut self, response: &TestResponse) {
        if let Some(cookie) = session_cookie(response) {
            self.cookie = cookie;
        }
    }
}

/// Value of the session cookie set by `response`, if any
pub fn session_cookie(response: &TestResponse) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| Cookie::parse(value.to_string()).ok())
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

pub fn location(response: &TestResponse) -> String {
    response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Texts of the flash messages in a screen's view model
pub fn messages(screen: &Value) -> Vec<String> {
    screen["messages"]
        .as_array()
        .map(|messages| {
            messages
                .iter()
                .filter_map(|m| m["text"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
