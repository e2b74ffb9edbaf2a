use std::sync::Arc;

use redis::aio::ConnectionManager as RedisConnectionManager;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr,
    EntityTrait, Schema,
};
use sqlx::postgres::PgPool;

use crate::config::Config;
use crate::entity::{department, profile, user};
use crate::services::PhotoStorage;
use crate::session::{InMemorySessionStore, RedisSessionStore, SessionStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// SeaORM database connection
    pub db: DatabaseConnection,
    pub config: Config,
    /// Server-side session persistence
    pub sessions: Arc<dyn SessionStore>,
    /// Uploaded user photos under the media root
    pub photos: PhotoStorage,
}

impl AppState {
    /// Create a new AppState, picking Redis for sessions when configured
    pub async fn new(config: Config) -> Result<Self, AppStateError> {
        let sessions: Arc<dyn SessionStore> = match &config.redis_url {
            Some(redis_url) => {
                let redis_client = redis::Client::open(redis_url.as_str())
                    .map_err(|e| AppStateError::Redis(e.to_string()))?;
                let redis = RedisConnectionManager::new(redis_client)
                    .await
                    .map_err(|e| AppStateError::Redis(e.to_string()))?;
                tracing::info!("Using Redis session store");
                Arc::new(RedisSessionStore::new(redis))
            }
            None => {
                tracing::info!("REDIS_URL not set, sessions are kept in memory");
                Arc::new(InMemorySessionStore::new())
            }
        };

        Self::with_session_store(config, sessions).await
    }

    /// Create AppState with a custom session store (for testing)
    pub async fn with_session_store(
        config: Config,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self, AppStateError> {
        let db = connect_database(&config).await?;
        let photos = PhotoStorage::new(config.media_root.clone());

        Ok(Self {
            db,
            config,
            sessions,
            photos,
        })
    }
}

/// Connect to the database and bring its schema up to date.
///
/// PostgreSQL runs the SQL migrations; SQLite (local runs and tests) gets its
/// tables straight from the entity definitions.
pub async fn connect_database(config: &Config) -> Result<DatabaseConnection, AppStateError> {
    let is_sqlite = config.database_url.starts_with("sqlite:");

    if !is_sqlite {
        // Connect to PostgreSQL with SQLx (for migrations)
        let pg_pool = PgPool::connect(&config.database_url)
            .await
            .map_err(|e| AppStateError::Database(e.to_string()))?;

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pg_pool)
            .await
            .map_err(|e| AppStateError::Migration(e.to_string()))?;

        pg_pool.close().await;
    }

    let mut opt = ConnectOptions::new(&config.database_url);
    if is_sqlite {
        opt.max_connections(1).sqlx_logging(false);
    } else {
        opt.max_connections(100)
            .min_connections(5)
            .sqlx_logging(true);
    }

    let db = Database::connect(opt)
        .await
        .map_err(|e| AppStateError::Database(e.to_string()))?;

    if is_sqlite {
        create_schema_from_entities(&db)
            .await
            .map_err(|e| AppStateError::Migration(e.to_string()))?;
    }

    Ok(db)
}

async fn create_schema_from_entities(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, profile::Entity).await?;
    create_table(db, department::Entity).await?;
    create_table(db, user::Entity).await?;
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend: DatabaseBackend = db.get_database_backend();
    let mut statement = Schema::new(backend).create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("Database connection error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Redis connection error: {0}")]
    Redis(String),
}
