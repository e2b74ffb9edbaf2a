pub mod auth;
pub mod common;
pub mod department;
pub mod report;
pub mod user;

pub use auth::{home, login, login_screen, logout, HomeScreen, LoginRequest, LoginScreen};
pub use common::{
    parse_id, redirect_with_outcome, validate_optional, validate_required, CurrentUser, FormAction,
};
pub use department::{department_action, department_screen, DepartmentForm, DepartmentScreen};
pub use report::{users_by_department_report, ReportParams, ReportScreen};
pub use user::{user_action, user_screen, UserForm, UserListParams, UserScreen, MAX_UPLOAD_BYTES};
