use serde::Serialize;
use utoipa::ToSchema;

use crate::services::HashedPassword;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)] // Never expose password hash
    pub password_hash: HashedPassword,
    pub photo_path: Option<String>,
    pub profile_id: i32,
    pub department_id: i32,
}

/// User creation DTO. The credential arrives already hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: HashedPassword,
    pub photo_path: Option<String>,
    pub profile_id: i32,
    pub department_id: i32,
}

/// User update DTO. `None` leaves the stored credential / photo untouched.
#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: Option<HashedPassword>,
    pub photo_path: Option<String>,
    pub profile_id: i32,
    pub department_id: i32,
}

/// Public user response (safe to return via API)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub photo_path: Option<String>,
    pub profile_id: i32,
    pub department_id: i32,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            photo_path: user.photo_path,
            profile_id: user.profile_id,
            department_id: user.department_id,
        }
    }
}

/// User joined with the names of its profile and department, as listed on
/// the user screen and in reports
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserRow {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub photo_path: Option<String>,
    pub profile_id: i32,
    pub profile_name: String,
    pub department_id: i32,
    pub department_name: String,
    pub department_abbreviation: Option<String>,
}
