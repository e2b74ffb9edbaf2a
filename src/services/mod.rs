pub mod auth;
pub mod maintenance;
pub mod photo;
pub mod report;
pub mod user;

pub use auth::{AuthService, HashedPassword};
pub use maintenance::{MaintenanceService, PhotoLoadSummary, PhotoMigrationSummary, SeedSummary};
pub use photo::{PhotoStorage, UploadedPhoto, PHOTO_DIR};
pub use report::ReportService;
pub use user::{NewUser, UserChanges, UserService};
