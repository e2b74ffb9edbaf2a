use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    sea_query::{BinOper, Expr, Func, SimpleExpr},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ItemsAndPagesNumber,
    PaginatorTrait, QueryFilter, QueryOrder, Select, Set,
};

use crate::entity::department::{Column as DepartmentColumn, Entity as DepartmentEntity};
use crate::entity::profile::{Column as ProfileColumn, Entity as ProfileEntity};
use crate::entity::user::{self, ActiveModel, Column, Entity as UserEntity};
use crate::error::{AppError, AppResult};
use crate::models::{CreateUser, Page, PageRequest, UpdateUser, User, UserRow};
use crate::repositories::Repository;
use crate::services::HashedPassword;

const NOT_FOUND: &str = "Usuário não encontrado.";
const INVALID_REFERENCES: &str = "Perfil ou departamento inválido.";

/// User repository for database operations
pub struct UserRepository;

// Implement the base Repository trait
#[async_trait]
impl Repository<User> for UserRepository {
    async fn find_by_id(db: &DatabaseConnection, id: i32) -> AppResult<User> {
        let model = UserEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

        Ok(model.into())
    }

    /// Delete the row only; photo cleanup belongs to `UserService::delete`
    async fn delete(db: &DatabaseConnection, id: i32) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id).exec(db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(NOT_FOUND.to_string()));
        }

        Ok(())
    }

    async fn count(db: &DatabaseConnection) -> AppResult<u64> {
        let count = UserEntity::find().count(db).await?;
        Ok(count)
    }
}

// User-specific methods (not in the base trait)
impl UserRepository {
    /// Create a new user
    pub async fn create(db: &DatabaseConnection, input: &CreateUser) -> AppResult<User> {
        if Self::email_exists(db, &input.email, None).await? {
            return Err(AppError::Conflict(
                "Já existe um usuário com este e-mail.".to_string(),
            ));
        }
        Self::verify_references(db, input.profile_id, input.department_id).await?;

        let model = ActiveModel {
            full_name: Set(input.full_name.clone()),
            email: Set(input.email.clone()),
            password_hash: Set(input.password_hash.as_str().to_string()),
            photo_path: Set(input.photo_path.clone()),
            profile_id: Set(input.profile_id),
            department_id: Set(input.department_id),
            ..Default::default()
        };

        let result = model.insert(db).await.map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => {
                AppError::Conflict("Já existe um usuário com este e-mail.".to_string())
            }
            AppError::Integrity(_) => AppError::NotFound(INVALID_REFERENCES.to_string()),
            other => other,
        })?;

        Ok(result.into())
    }

    /// Update user. Credential and photo are only replaced when a new value
    /// is supplied.
    pub async fn update(db: &DatabaseConnection, id: i32, input: &UpdateUser) -> AppResult<User> {
        let model = UserEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

        if Self::email_exists(db, &input.email, Some(id)).await? {
            return Err(AppError::Conflict(
                "Já existe outro usuário com este e-mail.".to_string(),
            ));
        }
        Self::verify_references(db, input.profile_id, input.department_id).await?;

        let mut active: ActiveModel = model.into();

        active.full_name = Set(input.full_name.clone());
        active.email = Set(input.email.clone());
        active.profile_id = Set(input.profile_id);
        active.department_id = Set(input.department_id);
        if let Some(password_hash) = &input.password_hash {
            active.password_hash = Set(password_hash.as_str().to_string());
        }
        if let Some(photo_path) = &input.photo_path {
            active.photo_path = Set(Some(photo_path.clone()));
        }

        let result = active.update(db).await.map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => {
                AppError::Conflict("Já existe outro usuário com este e-mail.".to_string())
            }
            AppError::Integrity(_) => AppError::NotFound(INVALID_REFERENCES.to_string()),
            other => other,
        })?;

        Ok(result.into())
    }

    /// Point the user at a different stored photo (or none)
    pub async fn set_photo(
        db: &DatabaseConnection,
        id: i32,
        photo_path: Option<String>,
    ) -> AppResult<User> {
        let model = UserEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

        let mut active: ActiveModel = model.into();
        active.photo_path = Set(photo_path);

        let result = active.update(db).await?;
        Ok(result.into())
    }

    /// Find the user matching both email and profile (for login)
    pub async fn find_by_email_and_profile(
        db: &DatabaseConnection,
        email: &str,
        profile_id: i32,
    ) -> AppResult<User> {
        let model = UserEntity::find()
            .filter(Column::Email.eq(email))
            .filter(Column::ProfileId.eq(profile_id))
            .one(db)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Usuário não encontrado com este email e perfil.".to_string())
            })?;

        Ok(model.into())
    }

    pub async fn find_by_name(db: &DatabaseConnection, full_name: &str) -> AppResult<User> {
        let model = UserEntity::find()
            .filter(Column::FullName.eq(full_name))
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

        Ok(model.into())
    }

    pub async fn exists(db: &DatabaseConnection, id: i32) -> AppResult<bool> {
        let count = UserEntity::find()
            .filter(Column::Id.eq(id))
            .count(db)
            .await?;

        Ok(count > 0)
    }

    /// Check if email exists, optionally ignoring one user
    pub async fn email_exists(
        db: &DatabaseConnection,
        email: &str,
        exclude_id: Option<i32>,
    ) -> AppResult<bool> {
        let mut query = UserEntity::find().filter(Column::Email.eq(email));
        if let Some(id) = exclude_id {
            query = query.filter(Column::Id.ne(id));
        }

        let count = query.count(db).await?;
        Ok(count > 0)
    }

    /// One page of users whose name contains `name_filter` (case-insensitive),
    /// sorted by name
    pub async fn search_page(
        db: &DatabaseConnection,
        name_filter: &str,
        page: PageRequest,
        per_page: u64,
    ) -> AppResult<Page<UserRow>> {
        let mut query = UserEntity::find();
        if !name_filter.is_empty() {
            query = query.filter(name_contains(name_filter));
        }

        let paginator = query.order_by_asc(Column::FullName).paginate(db, per_page);
        let ItemsAndPagesNumber {
            number_of_items,
            number_of_pages,
        } = paginator.num_items_and_pages().await?;

        let number = page.resolve(number_of_pages);
        let models = paginator.fetch_page(number - 1).await?;
        let rows = Self::into_rows(db, models).await?;

        Ok(Page::new(
            rows,
            number,
            number_of_pages,
            per_page,
            number_of_items,
        ))
    }

    /// All users sorted by name, optionally restricted to one department
    pub async fn list_rows(
        db: &DatabaseConnection,
        department_id: Option<i32>,
    ) -> AppResult<Vec<UserRow>> {
        let mut query: Select<UserEntity> = UserEntity::find();
        if let Some(department_id) = department_id {
            query = query.filter(Column::DepartmentId.eq(department_id));
        }

        let models = query.order_by_asc(Column::FullName).all(db).await?;
        Self::into_rows(db, models).await
    }

    /// Every user, sorted by name
    pub async fn list_all(db: &DatabaseConnection) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(Column::FullName)
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    /// Users that currently own a photo
    pub async fn list_with_photo(db: &DatabaseConnection) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(Column::PhotoPath.is_not_null())
            .filter(Column::PhotoPath.ne(""))
            .order_by_asc(Column::FullName)
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn verify_references(
        db: &DatabaseConnection,
        profile_id: i32,
        department_id: i32,
    ) -> AppResult<()> {
        let profiles = ProfileEntity::find()
            .filter(ProfileColumn::Id.eq(profile_id))
            .count(db)
            .await?;
        let departments = DepartmentEntity::find()
            .filter(DepartmentColumn::Id.eq(department_id))
            .count(db)
            .await?;

        if profiles == 0 || departments == 0 {
            return Err(AppError::NotFound(INVALID_REFERENCES.to_string()));
        }

        Ok(())
    }

    /// Attach profile and department names to user rows
    async fn into_rows(db: &DatabaseConnection, models: Vec<user::Model>) -> AppResult<Vec<UserRow>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let profile_ids: Vec<i32> = models.iter().map(|m| m.profile_id).collect();
        let department_ids: Vec<i32> = models.iter().map(|m| m.department_id).collect();

        let profiles: HashMap<i32, String> = ProfileEntity::find()
            .filter(ProfileColumn::Id.is_in(profile_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();

        let departments: HashMap<i32, (String, Option<String>)> = DepartmentEntity::find()
            .filter(DepartmentColumn::Id.is_in(department_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|d| (d.id, (d.name, d.abbreviation)))
            .collect();

        let rows = models
            .into_iter()
            .map(|m| {
                let profile_name = profiles.get(&m.profile_id).cloned().unwrap_or_default();
                let (department_name, department_abbreviation) = departments
                    .get(&m.department_id)
                    .cloned()
                    .unwrap_or_default();

                UserRow {
                    id: m.id,
                    full_name: m.full_name,
                    email: m.email,
                    photo_path: m.photo_path,
                    profile_id: m.profile_id,
                    profile_name,
                    department_id: m.department_id,
                    department_name,
                    department_abbreviation,
                }
            })
            .collect();

        Ok(rows)
    }
}

/// `lower(full_name) LIKE lower(%filter%)`, with LIKE wildcards in the filter escaped.
/// Both sides go through the database's `lower()` so they fold the same way.
fn name_contains(filter: &str) -> SimpleExpr {
    let escaped = filter
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");

    let pattern = SimpleExpr::Binary(
        Box::new(Func::lower(Expr::val(format!("%{}%", escaped))).into()),
        BinOper::Escape,
        Box::new(SimpleExpr::Constant('\\'.into())),
    );

    Expr::expr(Func::lower(Expr::col(Column::FullName))).binary(BinOper::Like, pattern)
}

// Conversion from SeaORM model to our domain model
impl From<user::Model> for User {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            full_name: m.full_name,
            email: m.email,
            password_hash: HashedPassword::from_stored(m.password_hash),
            photo_path: m.photo_path,
            profile_id: m.profile_id,
            department_id: m.department_id,
        }
    }
}
