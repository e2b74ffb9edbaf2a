use uuid::Uuid;

use lumon_portal::models::{CreateProfile, Department, DepartmentInput, Profile, User};
use lumon_portal::repositories::{DepartmentRepository, ProfileRepository};
use lumon_portal::services::{NewUser, UploadedPhoto, UserService};
use lumon_portal::state::AppState;

pub const TEST_PASSWORD: &str = "1234";

/// Profiles and a department most tests start from
pub struct Fixtures {
    pub manager: Profile,
    pub employee: Profile,
    pub department: Department,
}

/// Factory for creating test data
pub struct Factory<'a> {
    state: &'a AppState,
}

impl<'a> Factory<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Gerente / Funcionário profiles plus one department
    pub async fn fixtures(&self) -> Fixtures {
        Fixtures {
            manager: self.create_profile("Gerente").await,
            employee: self.create_profile("Funcionário").await,
            department: self
                .create_department("Refinamento de Macrodados", Some("MDR"))
                .await,
        }
    }

    pub async fn create_profile(&self, name: &str) -> Profile {
        let input = CreateProfile {
            name: name.to_string(),
        };

        ProfileRepository::create(&self.state.db, &input)
            .await
            .unwrap()
    }

    pub async fn create_department(&self, name: &str, abbreviation: Option<&str>) -> Department {
        let input = DepartmentInput::new(name, abbreviation.map(str::to_string));

        DepartmentRepository::create(&self.state.db, &input)
            .await
            .unwrap()
    }

    /// Create a user with `TEST_PASSWORD` and no photo
    pub async fn create_user(
        &self,
        full_name: &str,
        email: &str,
        profile_id: i32,
        department_id: i32,
    ) -> User {
        self.create_user_with_photo(full_name, email, profile_id, department_id, None)
            .await
    }

    pub async fn create_user_with_photo(
        &self,
        full_name: &str,
        email: &str,
        profile_id: i32,
        department_id: i32,
        photo: Option<UploadedPhoto>,
    ) -> User {
        let input = NewUser {
            full_name: full_name.to_string(),
            email: email.to_string(),
            password: TEST_PASSWORD.to_string(),
            profile_id,
            department_id,
            photo,
        };

        UserService::create(&self.state.db, &self.state.photos, input)
            .await
            .unwrap()
    }

    /// A user with a unique email
    pub async fn create_random_user(&self, profile_id: i32, department_id: i32) -> User {
        let unique_id = Uuid::new_v4();
        self.create_user(
            &format!("Test User {}", unique_id),
            &format!("test-{}@lumon.com", unique_id),
            profile_id,
            department_id,
        )
        .await
    }
}

/// A small PNG-looking upload
pub fn test_photo(filename: &str) -> UploadedPhoto {
    UploadedPhoto {
        filename: filename.to_string(),
        content_type: Some("image/png".to_string()),
        bytes: b"\x89PNG\r\n\x1a\nfake image data".to_vec(),
    }
}
