use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use lumon_portal::config::Config;
use lumon_portal::services::maintenance::SEED_PASSWORD;
use lumon_portal::services::{MaintenanceService, PhotoStorage};
use lumon_portal::state::connect_database;

#[derive(Parser, Debug)]
#[command(name = "manage")]
#[command(about = "Maintenance commands for the Lumon staff portal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace all data with the demo profiles, departments and users
    Seed {
        /// Directory with the demo user photos
        #[arg(long, value_name = "DIR", default_value = "static/img/users_photos")]
        photos_dir: PathBuf,

        /// Do not load any photos
        #[arg(long)]
        no_photos: bool,
    },
    /// Attach the demo photos to the users already in the database
    LoadPhotos {
        /// Directory with the demo user photos
        #[arg(long, value_name = "DIR", default_value = "static/img/users_photos")]
        photos_dir: PathBuf,
    },
    /// Store every user photo again under a freshly generated unique name
    MigratePhotos,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    let db = connect_database(&config)
        .await
        .context("Failed to connect to the database")?;
    let photos = PhotoStorage::new(config.media_root.clone());

    match cli.command {
        Command::Seed {
            photos_dir,
            no_photos,
        } => {
            let photos_dir = (!no_photos).then_some(photos_dir.as_path());
            let summary = MaintenanceService::seed(&db, &photos, photos_dir)
                .await
                .context("Seeding failed")?;

            for warning in &summary.warnings {
                println!("AVISO: {}", warning);
            }
            println!("Banco de dados populado com sucesso!");
            println!("  Perfis: {}", summary.profiles);
            println!("  Departamentos: {}", summary.departments);
            println!("  Usuários: {}", summary.users);
            println!("  Fotos carregadas: {}", summary.photos_loaded);
            println!("Senha de todos os usuários: {}", SEED_PASSWORD);
        }
        Command::LoadPhotos { photos_dir } => {
            let summary = MaintenanceService::load_photos(&db, &photos, &photos_dir)
                .await
                .context("Photo loading failed")?;

            for warning in &summary.warnings {
                println!("AVISO: {}", warning);
            }
            println!("Fotos carregadas: {}", summary.loaded);
            println!("Avisos: {}", summary.warnings.len());
        }
        Command::MigratePhotos => {
            let summary = MaintenanceService::migrate_photos(&db, &photos)
                .await
                .context("Photo migration failed")?;

            println!("Total de usuários com foto: {}", summary.total);
            println!("Migrados com sucesso: {}", summary.migrated);
            if summary.errors > 0 {
                println!("Erros: {}", summary.errors);
            }
        }
    }

    Ok(())
}
