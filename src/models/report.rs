use serde::Serialize;
use utoipa::ToSchema;

use crate::models::UserRow;

pub const ALL_DEPARTMENTS: &str = "todos";

/// Which users the department report should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSelector {
    /// Nothing picked yet
    Unselected,
    All,
    /// Raw department id as submitted; may not parse or exist
    Department(String),
}

impl ReportSelector {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => ReportSelector::Unselected,
            Some(ALL_DEPARTMENTS) => ReportSelector::All,
            Some(id) => ReportSelector::Department(id.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UsersByDepartmentReport {
    /// `None` until a selector is chosen
    pub title: Option<String>,
    pub rows: Vec<UserRow>,
    pub total: u64,
}

impl UsersByDepartmentReport {
    pub fn empty(title: Option<String>) -> Self {
        Self {
            title,
            rows: Vec::new(),
            total: 0,
        }
    }

    pub fn with_rows(title: String, rows: Vec<UserRow>) -> Self {
        Self {
            title: Some(title),
            total: rows.len() as u64,
            rows,
        }
    }
}
