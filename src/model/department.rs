use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::HrError;
use crate::model::{check_text, double_option};

const NAME_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Department {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Engineering")]
    pub name: String,
    #[schema(example = "Software development and engineering team")]
    pub description: String,
    #[schema(example = 5)]
    pub manager_id: Option<u64>,
}

impl Department {
    pub fn apply(&mut self, changes: &DepartmentChanges) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(description) = &changes.description {
            self.description = description.clone();
        }
        if let Some(manager_id) = changes.manager_id {
            self.manager_id = manager_id;
        }
    }

    /// Name uniqueness ignores case.
    pub fn same_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// A department together with its derived head count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "name": "Engineering",
    "description": "Software development and engineering team",
    "manager_id": 5,
    "employee_count": 15
}))]
pub struct DepartmentView {
    #[serde(flatten)]
    pub department: Department,
    pub employee_count: u64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateDepartment {
    #[schema(example = "Engineering")]
    pub name: String,
    #[schema(example = "Software development and engineering team")]
    pub description: String,
    #[schema(example = 5)]
    pub manager_id: Option<u64>,
}

impl CreateDepartment {
    pub fn validate(&self) -> Result<(), HrError> {
        check_text("name", &self.name, NAME_MAX)?;
        check_text("description", &self.description, DESCRIPTION_MAX)
    }
}

/// Partial update. `manager_id: null` clears the manager, an absent
/// `manager_id` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct DepartmentChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<u64>)]
    pub manager_id: Option<Option<u64>>,
}

impl DepartmentChanges {
    pub fn validate(&self) -> Result<(), HrError> {
        if let Some(name) = &self.name {
            check_text("name", name, NAME_MAX)?;
        }
        if let Some(description) = &self.description {
            check_text("description", description, DESCRIPTION_MAX)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == DepartmentChanges::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DepartmentStats {
    pub department_id: u64,
    pub department_name: String,
    pub total_employees: u64,
    pub active_employees: u64,
    pub total_salary_expense: f64,
    pub average_salary: f64,
    pub manager_id: Option<u64>,
}
