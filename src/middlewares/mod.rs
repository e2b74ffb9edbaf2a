pub mod auth;
pub mod session;

pub use auth::AuthUser;
pub use session::session_middleware;
