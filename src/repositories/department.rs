use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entity::department::{self, ActiveModel, Column, Entity as DepartmentEntity};
use crate::entity::user::{Column as UserColumn, Entity as UserEntity};
use crate::error::{AppError, AppResult};
use crate::models::{Department, DepartmentInput};
use crate::repositories::Repository;

const NOT_FOUND: &str = "Departamento não encontrado.";
const IN_USE: &str = "Não é possível excluir um departamento que possui funcionários.";

/// Department repository for database operations
pub struct DepartmentRepository;

#[async_trait]
impl Repository<Department> for DepartmentRepository {
    async fn find_by_id(db: &DatabaseConnection, id: i32) -> AppResult<Department> {
        let model = DepartmentEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

        Ok(model.into())
    }

    /// Delete a department no user belongs to
    async fn delete(db: &DatabaseConnection, id: i32) -> AppResult<()> {
        let model = DepartmentEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

        let members = UserEntity::find()
            .filter(UserColumn::DepartmentId.eq(id))
            .count(db)
            .await?;

        if members > 0 {
            return Err(AppError::Integrity(IN_USE.to_string()));
        }

        // A user may have been added since the check; the constraint still holds
        let active: ActiveModel = model.into();
        active.delete(db).await.map_err(|e| match AppError::from(e) {
            AppError::Integrity(_) => AppError::Integrity(IN_USE.to_string()),
            other => other,
        })?;

        Ok(())
    }

    async fn count(db: &DatabaseConnection) -> AppResult<u64> {
        let count = DepartmentEntity::find().count(db).await?;
        Ok(count)
    }
}

impl DepartmentRepository {
    /// Create a new department with a name no other department uses
    pub async fn create(db: &DatabaseConnection, input: &DepartmentInput) -> AppResult<Department> {
        if Self::name_exists(db, &input.name, None).await? {
            return Err(AppError::Conflict(
                "Já existe um departamento com este nome.".to_string(),
            ));
        }

        let model = ActiveModel {
            name: Set(input.name.clone()),
            abbreviation: Set(input.abbreviation.clone()),
            ..Default::default()
        };

        let result = model.insert(db).await.map_err(Self::conflict_message)?;
        Ok(result.into())
    }

    /// Replace name and abbreviation of an existing department
    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        input: &DepartmentInput,
    ) -> AppResult<Department> {
        let model = DepartmentEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

        if Self::name_exists(db, &input.name, Some(id)).await? {
            return Err(AppError::Conflict(
                "Já existe outro departamento com este nome.".to_string(),
            ));
        }

        let mut active: ActiveModel = model.into();
        active.name = Set(input.name.clone());
        active.abbreviation = Set(input.abbreviation.clone());

        let result = active.update(db).await.map_err(Self::conflict_message)?;
        Ok(result.into())
    }

    /// All departments, sorted by name
    pub async fn list_all(db: &DatabaseConnection) -> AppResult<Vec<Department>> {
        let models = DepartmentEntity::find()
            .order_by_asc(Column::Name)
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    /// Exact, case-sensitive name match, optionally ignoring one department
    pub async fn name_exists(
        db: &DatabaseConnection,
        name: &str,
        exclude_id: Option<i32>,
    ) -> AppResult<bool> {
        let mut query = DepartmentEntity::find().filter(Column::Name.eq(name));
        if let Some(id) = exclude_id {
            query = query.filter(Column::Id.ne(id));
        }

        let count = query.count(db).await?;
        Ok(count > 0)
    }

    pub async fn find_by_name(db: &DatabaseConnection, name: &str) -> AppResult<Department> {
        let model = DepartmentEntity::find()
            .filter(Column::Name.eq(name))
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

        Ok(model.into())
    }

    /// Remove every department (seeding); fails while users still belong to any
    pub async fn delete_all(db: &DatabaseConnection) -> AppResult<u64> {
        let result = DepartmentEntity::delete_many().exec(db).await?;
        Ok(result.rows_affected)
    }

    /// The name is pre-checked, so a unique violation here is either a lost
    /// race on the name or a duplicate abbreviation
    fn conflict_message(err: sea_orm::DbErr) -> AppError {
        match AppError::from(err) {
            AppError::Conflict(_) => AppError::Conflict(
                "Já existe um departamento com este nome ou sigla.".to_string(),
            ),
            other => other,
        }
    }
}

// Conversion from SeaORM model to our domain model
impl From<department::Model> for Department {
    fn from(m: department::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            abbreviation: m.abbreviation,
        }
    }
}
