use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entity::profile::{self, ActiveModel, Column, Entity as ProfileEntity};
use crate::entity::user::{Column as UserColumn, Entity as UserEntity};
use crate::error::{AppError, AppResult};
use crate::models::{CreateProfile, Profile};
use crate::repositories::Repository;

/// Profile repository for database operations
pub struct ProfileRepository;

#[async_trait]
impl Repository<Profile> for ProfileRepository {
    async fn find_by_id(db: &DatabaseConnection, id: i32) -> AppResult<Profile> {
        let model = ProfileEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Perfil não encontrado.".to_string()))?;

        Ok(model.into())
    }

    /// Delete a profile no user refers to
    async fn delete(db: &DatabaseConnection, id: i32) -> AppResult<()> {
        let in_use = UserEntity::find()
            .filter(UserColumn::ProfileId.eq(id))
            .count(db)
            .await?;

        if in_use > 0 {
            return Err(AppError::Integrity(
                "Não é possível excluir um perfil que possui usuários vinculados.".to_string(),
            ));
        }

        let result = ProfileEntity::delete_by_id(id).exec(db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Perfil não encontrado.".to_string()));
        }

        Ok(())
    }

    async fn count(db: &DatabaseConnection) -> AppResult<u64> {
        let count = ProfileEntity::find().count(db).await?;
        Ok(count)
    }
}

impl ProfileRepository {
    /// Create a new profile
    pub async fn create(db: &DatabaseConnection, input: &CreateProfile) -> AppResult<Profile> {
        let model = ActiveModel {
            name: Set(input.name.clone()),
            ..Default::default()
        };

        let result = model.insert(db).await.map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict("Já existe um perfil com este nome.".to_string()),
            other => other,
        })?;

        Ok(result.into())
    }

    /// All profiles, sorted by name
    pub async fn list_all(db: &DatabaseConnection) -> AppResult<Vec<Profile>> {
        let models = ProfileEntity::find()
            .order_by_asc(Column::Name)
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    pub async fn find_by_name(db: &DatabaseConnection, name: &str) -> AppResult<Profile> {
        let model = ProfileEntity::find()
            .filter(Column::Name.eq(name))
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Perfil não encontrado.".to_string()))?;

        Ok(model.into())
    }

    /// Remove every profile (seeding); fails while users still refer to any
    pub async fn delete_all(db: &DatabaseConnection) -> AppResult<u64> {
        let result = ProfileEntity::delete_many().exec(db).await?;
        Ok(result.rows_affected)
    }
}

// Conversion from SeaORM model to our domain model
impl From<profile::Model> for Profile {
    fn from(m: profile::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
        }
    }
}
