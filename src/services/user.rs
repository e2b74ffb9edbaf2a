use sea_orm::DatabaseConnection;

use crate::error::AppResult;
use crate::models::{CreateUser, UpdateUser, User};
use crate::repositories::{Repository, UserRepository};
use crate::services::{AuthService, PhotoStorage, UploadedPhoto};

/// Fields of a user about to be created; the password is still plaintext
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub profile_id: i32,
    pub department_id: i32,
    pub photo: Option<UploadedPhoto>,
}

/// Edits to an existing user. `None` keeps the stored password / photo.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub full_name: String,
    pub email: String,
    pub password: Option<String>,
    pub profile_id: i32,
    pub department_id: i32,
    pub photo: Option<UploadedPhoto>,
}

/// User lifecycle: every write hashes the credential, and photo files are
/// created, replaced and removed together with the row that owns them.
pub struct UserService;

impl UserService {
    pub async fn create(
        db: &DatabaseConnection,
        photos: &PhotoStorage,
        input: NewUser,
    ) -> AppResult<User> {
        if let Some(photo) = &input.photo {
            photo.validate()?;
        }

        let password_hash = AuthService::hash_password(&input.password)?;

        let photo_path = match &input.photo {
            Some(photo) => Some(photos.store(&photo.filename, &photo.bytes).await?),
            None => None,
        };

        let create_user = CreateUser {
            full_name: input.full_name,
            email: input.email,
            password_hash,
            photo_path: photo_path.clone(),
            profile_id: input.profile_id,
            department_id: input.department_id,
        };

        match UserRepository::create(db, &create_user).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "User created");
                Ok(user)
            }
            Err(e) => {
                if let Some(path) = &photo_path {
                    photos.remove(path).await;
                }
                Err(e)
            }
        }
    }

    /// Apply changes; a replaced photo is removed only after the row update
    /// went through
    pub async fn update(
        db: &DatabaseConnection,
        photos: &PhotoStorage,
        id: i32,
        changes: UserChanges,
    ) -> AppResult<User> {
        let previous = UserRepository::find_by_id(db, id).await?;

        if let Some(photo) = &changes.photo {
            photo.validate()?;
        }

        let password_hash = match &changes.password {
            Some(password) => Some(AuthService::hash_password(password)?),
            None => None,
        };

        let photo_path = match &changes.photo {
            Some(photo) => Some(photos.store(&photo.filename, &photo.bytes).await?),
            None => None,
        };

        let update_user = UpdateUser {
            full_name: changes.full_name,
            email: changes.email,
            password_hash,
            photo_path: photo_path.clone(),
            profile_id: changes.profile_id,
            department_id: changes.department_id,
        };

        let updated = match UserRepository::update(db, id, &update_user).await {
            Ok(user) => user,
            Err(e) => {
                if let Some(path) = &photo_path {
                    photos.remove(path).await;
                }
                return Err(e);
            }
        };

        Self::remove_replaced_photo(photos, &previous, &updated).await;

        tracing::info!(user_id = updated.id, "User updated");
        Ok(updated)
    }

    /// Store a new photo for the user and drop the one it replaces
    pub async fn replace_photo(
        db: &DatabaseConnection,
        photos: &PhotoStorage,
        id: i32,
        photo: &UploadedPhoto,
    ) -> AppResult<User> {
        let previous = UserRepository::find_by_id(db, id).await?;
        photo.validate()?;

        let photo_path = photos.store(&photo.filename, &photo.bytes).await?;

        let updated = match UserRepository::set_photo(db, id, Some(photo_path.clone())).await {
            Ok(user) => user,
            Err(e) => {
                photos.remove(&photo_path).await;
                return Err(e);
            }
        };

        Self::remove_replaced_photo(photos, &previous, &updated).await;
        Ok(updated)
    }

    /// Delete the user, then its photo. The row goes even if the file can't.
    pub async fn delete(
        db: &DatabaseConnection,
        photos: &PhotoStorage,
        id: i32,
    ) -> AppResult<User> {
        let user = UserRepository::find_by_id(db, id).await?;
        UserRepository::delete(db, id).await?;

        if let Some(path) = &user.photo_path {
            photos.remove(path).await;
        }

        tracing::info!(user_id = user.id, "User deleted");
        Ok(user)
    }

    async fn remove_replaced_photo(photos: &PhotoStorage, previous: &User, updated: &User) {
        match (&previous.photo_path, &updated.photo_path) {
            (Some(old), Some(new)) if old == new => {}
            (Some(old), _) if !old.is_empty() => photos.remove(old).await,
            _ => {}
        }
    }
}
