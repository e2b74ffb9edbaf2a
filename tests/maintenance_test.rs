mod common;

use std::path::Path;

use common::{test_photo, Factory, TestApp};
use lumon_portal::repositories::{ProfileRepository, Repository, UserRepository};
use lumon_portal::services::maintenance::{MANAGER_PROFILE, SEED_PASSWORD};
use lumon_portal::services::{AuthService, MaintenanceService, UserService};

fn write_photos(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), b"\x89PNG\r\n\x1a\nseed").unwrap();
    }
}

#[tokio::test]
async fn test_seed_creates_demo_organisation() {
    let app = TestApp::new().await;
    let photos_dir = tempfile::tempdir().unwrap();
    write_photos(
        photos_dir.path(),
        &["mark.png", "MsCasey.JPG", "unknown.png", "notes.txt"],
    );

    let summary = MaintenanceService::seed(&app.state.db, &app.state.photos, Some(photos_dir.path()))
        .await
        .unwrap();

    assert_eq!(summary.profiles, 2);
    assert_eq!(summary.departments, 3);
    assert_eq!(summary.users, 6);
    assert_eq!(summary.photos_loaded, 2);
    assert_eq!(summary.warnings, vec!["Nome não mapeado: unknown.png"]);

    let mark = UserRepository::find_by_name(&app.state.db, "Mark Scout")
        .await
        .unwrap();
    assert_eq!(mark.email, "mark@lumon.com");
    assert!(AuthService::verify_password(SEED_PASSWORD, &mark.password_hash).unwrap());
    let photo = mark.photo_path.unwrap();
    assert!(photo.starts_with("usuarios/fotos/"));
    assert!(app.media_path(&photo).exists());

    let casey = UserRepository::find_by_name(&app.state.db, "Ms. Casey")
        .await
        .unwrap();
    assert!(casey.photo_path.unwrap().ends_with(".JPG"));

    let helly = UserRepository::find_by_name(&app.state.db, "Helly Riggs")
        .await
        .unwrap();
    assert!(helly.photo_path.is_none());
}

#[tokio::test]
async fn test_seeded_manager_can_log_in() {
    let app = TestApp::new().await;
    MaintenanceService::seed(&app.state.db, &app.state.photos, None)
        .await
        .unwrap();
    let manager = ProfileRepository::find_by_name(&app.state.db, MANAGER_PROFILE)
        .await
        .unwrap();

    let session = app.login("mark@lumon.com", SEED_PASSWORD, manager.id).await;

    let home = app.screen(&session, "/home").await;
    assert_eq!(home["current_user"]["name"], "Mark Scout");
    assert_eq!(home["current_user"]["profile_name"], "Gerente");
}

#[tokio::test]
async fn test_reseed_replaces_data_and_photos() {
    let app = TestApp::new().await;
    let photos_dir = tempfile::tempdir().unwrap();
    write_photos(photos_dir.path(), &["mark.png"]);

    MaintenanceService::seed(&app.state.db, &app.state.photos, Some(photos_dir.path()))
        .await
        .unwrap();
    let first_photo = UserRepository::find_by_name(&app.state.db, "Mark Scout")
        .await
        .unwrap()
        .photo_path
        .unwrap();

    let summary = MaintenanceService::seed(&app.state.db, &app.state.photos, Some(photos_dir.path()))
        .await
        .unwrap();

    assert_eq!(summary.users, 6);
    assert_eq!(UserRepository::count(&app.state.db).await.unwrap(), 6);
    assert!(!app.media_path(&first_photo).exists());
}

#[tokio::test]
async fn test_seed_with_missing_photo_dir() {
    let app = TestApp::new().await;

    let summary = MaintenanceService::seed(
        &app.state.db,
        &app.state.photos,
        Some(Path::new("/nonexistent/photos")),
    )
    .await
    .unwrap();

    assert_eq!(summary.users, 6);
    assert_eq!(summary.photos_loaded, 0);
    assert_eq!(summary.warnings.len(), 1);
}

#[tokio::test]
async fn test_migrate_photos() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let fixtures = factory.fixtures().await;
    let with_photo = factory
        .create_user_with_photo(
            "Helly Riggs",
            "helly@lumon.com",
            fixtures.employee.id,
            fixtures.department.id,
            Some(test_photo("helly.png")),
        )
        .await;
    let lost_photo = factory
        .create_user_with_photo(
            "Irving Bailiff",
            "irving@lumon.com",
            fixtures.employee.id,
            fixtures.department.id,
            Some(test_photo("irving.png")),
        )
        .await;
    factory
        .create_user("Dylan George", "dylan@lumon.com", fixtures.employee.id, fixtures.department.id)
        .await;

    let old_path = with_photo.photo_path.clone().unwrap();
    let lost_path = lost_photo.photo_path.clone().unwrap();
    std::fs::remove_file(app.media_path(&lost_path)).unwrap();

    let summary = MaintenanceService::migrate_photos(&app.state.db, &app.state.photos)
        .await
        .unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.migrated, 1);
    assert_eq!(summary.errors, 1);

    let migrated = UserRepository::find_by_id(&app.state.db, with_photo.id)
        .await
        .unwrap();
    let new_path = migrated.photo_path.unwrap();
    assert_ne!(new_path, old_path);
    assert!(new_path.ends_with(".png"));
    assert!(app.media_path(&new_path).exists());
    assert!(!app.media_path(&old_path).exists());

    // The user whose file was missing keeps its reference
    let skipped = UserRepository::find_by_id(&app.state.db, lost_photo.id)
        .await
        .unwrap();
    assert_eq!(skipped.photo_path.unwrap(), lost_path);

    UserService::delete(&app.state.db, &app.state.photos, migrated.id)
        .await
        .unwrap();
    assert!(!app.media_path(&new_path).exists());
}

#[tokio::test]
async fn test_load_photos_onto_existing_users() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let fixtures = factory.fixtures().await;
    let mark = factory
        .create_user("Mark Scout", "mark@lumon.com", fixtures.manager.id, fixtures.department.id)
        .await;
    let helly = factory
        .create_user_with_photo(
            "Helly Riggs",
            "helly@lumon.com",
            fixtures.employee.id,
            fixtures.department.id,
            Some(test_photo("old.png")),
        )
        .await;
    let old_photo = helly.photo_path.clone().unwrap();

    let photos_dir = tempfile::tempdir().unwrap();
    write_photos(photos_dir.path(), &["mark.png", "helly.png", "burt.png"]);

    let summary = MaintenanceService::load_photos(&app.state.db, &app.state.photos, photos_dir.path())
        .await
        .unwrap();

    assert_eq!(summary.loaded, 2);
    assert_eq!(summary.warnings, vec!["Usuário não encontrado: Burt Goodman"]);

    // Nothing is wiped
    assert_eq!(UserRepository::count(&app.state.db).await.unwrap(), 2);
    let mark = UserRepository::find_by_id(&app.state.db, mark.id).await.unwrap();
    assert_eq!(mark.email, "mark@lumon.com");
    let mark_photo = mark.photo_path.unwrap();
    assert!(app.media_path(&mark_photo).exists());

    let helly = UserRepository::find_by_id(&app.state.db, helly.id).await.unwrap();
    let new_photo = helly.photo_path.unwrap();
    assert_ne!(new_photo, old_photo);
    assert!(app.media_path(&new_photo).exists());
    assert!(!app.media_path(&old_photo).exists());
}
