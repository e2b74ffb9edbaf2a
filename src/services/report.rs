use sea_orm::DatabaseConnection;

use crate::error::{AppError, AppResult};
use crate::models::{ReportSelector, UsersByDepartmentReport};
use crate::repositories::{DepartmentRepository, Repository, UserRepository};

pub const ALL_USERS_TITLE: &str = "Todos os Funcionários";
pub const DEPARTMENT_NOT_FOUND_TITLE: &str = "Departamento não encontrado";

pub struct ReportService;

impl ReportService {
    /// Users of one department, of every department, or nobody until a
    /// selection is made
    pub async fn users_by_department(
        db: &DatabaseConnection,
        selector: &ReportSelector,
    ) -> AppResult<UsersByDepartmentReport> {
        match selector {
            ReportSelector::Unselected => Ok(UsersByDepartmentReport::empty(None)),
            ReportSelector::All => {
                let rows = UserRepository::list_rows(db, None).await?;
                Ok(UsersByDepartmentReport::with_rows(
                    ALL_USERS_TITLE.to_string(),
                    rows,
                ))
            }
            ReportSelector::Department(raw_id) => {
                let Ok(id) = raw_id.parse::<i32>() else {
                    return Ok(Self::department_not_found());
                };

                let department = match DepartmentRepository::find_by_id(db, id).await {
                    Ok(department) => department,
                    Err(AppError::NotFound(_)) => return Ok(Self::department_not_found()),
                    Err(e) => return Err(e),
                };

                let rows = UserRepository::list_rows(db, Some(department.id)).await?;
                Ok(UsersByDepartmentReport::with_rows(
                    format!("Funcionários do Departamento: {}", department.name),
                    rows,
                ))
            }
        }
    }

    fn department_not_found() -> UsersByDepartmentReport {
        UsersByDepartmentReport::empty(Some(DEPARTMENT_NOT_FOUND_TITLE.to_string()))
    }
}
