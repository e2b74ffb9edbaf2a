use std::path::Path;

use sea_orm::DatabaseConnection;
use tokio::fs;

use crate::error::{AppError, AppResult};
use crate::models::{CreateProfile, DepartmentInput};
use crate::repositories::{DepartmentRepository, ProfileRepository, Repository, UserRepository};
use crate::services::{NewUser, PhotoStorage, UploadedPhoto, UserService};

pub const MANAGER_PROFILE: &str = "Gerente";
pub const EMPLOYEE_PROFILE: &str = "Funcionário";

/// Seeded password for every demo user
pub const SEED_PASSWORD: &str = "1234";

const SEED_DEPARTMENTS: &[(&str, &str)] = &[
    ("Refinamento de Macrodados", "MDR"),
    ("Bem Estar", "Wellness"),
    ("Ótica e Design", "O&D"),
];

/// (name, email, profile, department)
const SEED_USERS: &[(&str, &str, &str, &str)] = &[
    ("Mark Scout", "mark@lumon.com", MANAGER_PROFILE, "Refinamento de Macrodados"),
    ("Helly Riggs", "helly@lumon.com", EMPLOYEE_PROFILE, "Refinamento de Macrodados"),
    ("Irving Bailiff", "irving@lumon.com", EMPLOYEE_PROFILE, "Refinamento de Macrodados"),
    ("Dylan George", "dylan@lumon.com", EMPLOYEE_PROFILE, "Refinamento de Macrodados"),
    ("Ms. Casey", "casey@lumon.com", EMPLOYEE_PROFILE, "Bem Estar"),
    ("Burt Goodman", "burt@lumon.com", MANAGER_PROFILE, "Ótica e Design"),
];

/// Photo file stem -> user name
const SEED_PHOTOS: &[(&str, &str)] = &[
    ("mark", "Mark Scout"),
    ("helly", "Helly Riggs"),
    ("irving", "Irving Bailiff"),
    ("dylan", "Dylan George"),
    ("mscasey", "Ms. Casey"),
    ("burt", "Burt Goodman"),
];

const PHOTO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub profiles: u64,
    pub departments: u64,
    pub users: u64,
    pub photos_loaded: u64,
    /// Photo files that could not be matched or loaded
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoLoadSummary {
    pub loaded: u64,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoMigrationSummary {
    pub total: u64,
    pub migrated: u64,
    pub errors: u64,
}

/// Database seeding and photo housekeeping run from the `manage` binary
pub struct MaintenanceService;

impl MaintenanceService {
    /// Replace all data with the demo organisation, then attach the photos
    /// found in `photos_dir`
    pub async fn seed(
        db: &DatabaseConnection,
        photos: &PhotoStorage,
        photos_dir: Option<&Path>,
    ) -> AppResult<SeedSummary> {
        tracing::info!("Clearing existing data");
        for user in UserRepository::list_all(db).await? {
            UserService::delete(db, photos, user.id).await?;
        }
        DepartmentRepository::delete_all(db).await?;
        ProfileRepository::delete_all(db).await?;

        tracing::info!("Creating profiles");
        for name in [MANAGER_PROFILE, EMPLOYEE_PROFILE] {
            let profile = ProfileRepository::create(
                db,
                &CreateProfile {
                    name: name.to_string(),
                },
            )
            .await?;
            tracing::info!(profile_id = profile.id, name = %profile.name, "Profile created");
        }

        tracing::info!("Creating departments");
        for (name, abbreviation) in SEED_DEPARTMENTS {
            let department = DepartmentRepository::create(
                db,
                &DepartmentInput::new(*name, Some(abbreviation.to_string())),
            )
            .await?;
            tracing::info!(department_id = department.id, name = %department, "Department created");
        }

        tracing::info!("Creating users");
        for (full_name, email, profile_name, department_name) in SEED_USERS {
            let profile = ProfileRepository::find_by_name(db, profile_name).await?;
            let department = DepartmentRepository::find_by_name(db, department_name).await?;

            let user = UserService::create(
                db,
                photos,
                NewUser {
                    full_name: full_name.to_string(),
                    email: email.to_string(),
                    password: SEED_PASSWORD.to_string(),
                    profile_id: profile.id,
                    department_id: department.id,
                    photo: None,
                },
            )
            .await?;
            tracing::info!(user_id = user.id, email = %user.email, "User created");
        }

        let mut summary = SeedSummary::default();
        if let Some(dir) = photos_dir {
            let loaded = Self::load_photos(db, photos, dir).await?;
            summary.photos_loaded = loaded.loaded;
            summary.warnings = loaded.warnings;
        }

        summary.profiles = ProfileRepository::count(db).await?;
        summary.departments = DepartmentRepository::count(db).await?;
        summary.users = UserRepository::count(db).await?;

        Ok(summary)
    }

    /// Attach the demo photos found in `dir` to the existing users they map to.
    /// Rows are left in place; a user's previous photo is replaced.
    pub async fn load_photos(
        db: &DatabaseConnection,
        photos: &PhotoStorage,
        dir: &Path,
    ) -> AppResult<PhotoLoadSummary> {
        let mut summary = PhotoLoadSummary::default();
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Photo directory not readable");
                summary
                    .warnings
                    .push(format!("Pasta de fotos não encontrada: {}", dir.display()));
                return Ok(summary);
            }
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::Storage(format!("{}: {}", dir.display(), e)))?
        {
            files.push(entry.path());
        }
        files.sort();

        for path in files {
            let is_photo = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| PHOTO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            if !is_photo {
                continue;
            }

            let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_lowercase();

            let Some((_, full_name)) = SEED_PHOTOS.iter().find(|(key, _)| *key == stem) else {
                summary.warnings.push(format!("Nome não mapeado: {}", filename));
                continue;
            };

            let user = match UserRepository::find_by_name(db, full_name).await {
                Ok(user) => user,
                Err(AppError::NotFound(_)) => {
                    summary
                        .warnings
                        .push(format!("Usuário não encontrado: {}", full_name));
                    continue;
                }
                Err(e) => return Err(e),
            };

            let bytes = match fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    summary
                        .warnings
                        .push(format!("Erro ao carregar foto de {}: {}", full_name, e));
                    continue;
                }
            };

            let photo = UploadedPhoto {
                filename: filename.to_string(),
                content_type: None,
                bytes,
            };
            let user = UserService::replace_photo(db, photos, user.id, &photo).await?;
            tracing::info!(user_id = user.id, photo = ?user.photo_path, "Photo loaded");
            summary.loaded += 1;
        }

        Ok(summary)
    }

    /// Re-store every user photo under a freshly generated unique name
    pub async fn migrate_photos(
        db: &DatabaseConnection,
        photos: &PhotoStorage,
    ) -> AppResult<PhotoMigrationSummary> {
        let users = UserRepository::list_with_photo(db).await?;
        let mut summary = PhotoMigrationSummary {
            total: users.len() as u64,
            ..Default::default()
        };

        for user in users {
            let Some(old_path) = user.photo_path.clone() else {
                continue;
            };

            let source = match photos.absolute_path(&old_path) {
                Some(source) if photos.exists(&old_path).await => source,
                _ => {
                    tracing::warn!(user_id = user.id, photo = %old_path, "Photo file not found");
                    summary.errors += 1;
                    continue;
                }
            };

            let bytes = match fs::read(&source).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(user_id = user.id, error = %e, "Failed to read photo");
                    summary.errors += 1;
                    continue;
                }
            };

            let filename = Path::new(&old_path)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            let photo = UploadedPhoto {
                filename,
                content_type: None,
                bytes,
            };

            match UserService::replace_photo(db, photos, user.id, &photo).await {
                Ok(updated) => {
                    tracing::info!(
                        user_id = updated.id,
                        old = %old_path,
                        new = ?updated.photo_path,
                        "Photo migrated"
                    );
                    summary.migrated += 1;
                }
                Err(e) => {
                    tracing::warn!(user_id = user.id, error = %e, "Failed to migrate photo");
                    summary.errors += 1;
                }
            }
        }

        Ok(summary)
    }
}
