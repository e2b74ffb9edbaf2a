use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Department {
    pub id: i32,
    pub name: String,
    pub abbreviation: Option<String>,
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.abbreviation {
            Some(abbreviation) => write!(f, "{} ({})", self.name, abbreviation),
            None => f.write_str(&self.name),
        }
    }
}

/// Department creation / update DTO. Both operations replace every column.
#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentInput {
    pub name: String,
    pub abbreviation: Option<String>,
}

impl DepartmentInput {
    /// Blank abbreviations are stored as NULL so they never collide
    pub fn new(name: impl Into<String>, abbreviation: Option<String>) -> Self {
        Self {
            name: name.into(),
            abbreviation: abbreviation
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
        }
    }
}
