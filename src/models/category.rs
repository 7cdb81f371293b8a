use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::habit::{validate_color, validate_name};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: Option<String>,
}

impl CategoryDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_color(&self.color)
    }
}
