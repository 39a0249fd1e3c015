use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use utoipa::ToSchema;

use crate::error::HrError;
use crate::model::check_text;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    AsRefStr,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
    OnLeave,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "first_name": "John",
        "last_name": "Doe",
        "email": "john.doe@company.com",
        "phone": "+1234567890",
        "department_id": 1,
        "position": "Software Engineer",
        "hire_date": "2024-01-15",
        "salary": 75000.0,
        "status": "active"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "+1234567890")]
    pub phone: String,

    #[schema(example = 1)]
    pub department_id: u64,

    #[schema(example = "Software Engineer")]
    pub position: String,

    #[schema(
        example = "2024-01-15",
        value_type = String,
        format = "date"
    )]
    pub hire_date: NaiveDate,

    #[schema(example = 75000.0)]
    pub salary: f64,

    pub status: EmployeeStatus,
}

impl Employee {
    pub fn apply(&mut self, changes: &EmployeeChanges) {
        if let Some(v) = &changes.first_name {
            self.first_name = v.clone();
        }
        if let Some(v) = &changes.last_name {
            self.last_name = v.clone();
        }
        if let Some(v) = &changes.email {
            self.email = v.clone();
        }
        if let Some(v) = &changes.phone {
            self.phone = v.clone();
        }
        if let Some(v) = changes.department_id {
            self.department_id = v;
        }
        if let Some(v) = &changes.position {
            self.position = v.clone();
        }
        if let Some(v) = changes.salary {
            self.salary = v;
        }
        if let Some(v) = changes.status {
            self.status = v;
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "john.doe@company.com", format = "email")]
    pub email: String,
    #[schema(example = "+1234567890")]
    pub phone: String,
    #[schema(example = 1)]
    pub department_id: u64,
    #[schema(example = "Software Engineer")]
    pub position: String,
    #[schema(example = "2024-01-15", format = "date", value_type = String)]
    pub hire_date: NaiveDate,
    #[schema(example = 75000.0)]
    pub salary: f64,
    #[serde(default)]
    pub status: EmployeeStatus,
}

impl CreateEmployee {
    pub fn validate(&self) -> Result<(), HrError> {
        check_text("first_name", &self.first_name, NAME_MAX)?;
        check_text("last_name", &self.last_name, NAME_MAX)?;
        check_email(&self.email)?;
        check_phone(&self.phone)?;
        check_text("position", &self.position, POSITION_MAX)?;
        check_salary(self.salary)
    }
}

/// Partial update; hire date is fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct EmployeeChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department_id: Option<u64>,
    pub position: Option<String>,
    pub salary: Option<f64>,
    pub status: Option<EmployeeStatus>,
}

impl EmployeeChanges {
    pub fn validate(&self) -> Result<(), HrError> {
        if let Some(v) = &self.first_name {
            check_text("first_name", v, NAME_MAX)?;
        }
        if let Some(v) = &self.last_name {
            check_text("last_name", v, NAME_MAX)?;
        }
        if let Some(v) = &self.email {
            check_email(v)?;
        }
        if let Some(v) = &self.phone {
            check_phone(v)?;
        }
        if let Some(v) = &self.position {
            check_text("position", v, POSITION_MAX)?;
        }
        if let Some(v) = self.salary {
            check_salary(v)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == EmployeeChanges::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    pub department_id: Option<u64>,
    pub status: Option<EmployeeStatus>,
}

impl EmployeeFilter {
    pub fn in_department(department_id: u64) -> Self {
        Self {
            department_id: Some(department_id),
            status: None,
        }
    }

    pub fn matches(&self, employee: &Employee) -> bool {
        self.department_id.is_none_or(|id| employee.department_id == id)
            && self.status.is_none_or(|s| employee.status == s)
    }
}

const NAME_MAX: usize = 50;
const POSITION_MAX: usize = 100;

fn check_salary(salary: f64) -> Result<(), HrError> {
    if !(salary.is_finite() && salary > 0.0) {
        return Err(HrError::Validation("salary must be greater than 0".into()));
    }
    Ok(())
}

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(?:\.[^\s@.]+)+$").expect("email pattern compiles")
});

static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?1?[0-9]{9,15}$").expect("phone pattern compiles"));

fn check_email(email: &str) -> Result<(), HrError> {
    if email.len() > 255 || !EMAIL_REGEX.is_match(email) {
        return Err(HrError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(())
}

fn check_phone(phone: &str) -> Result<(), HrError> {
    if !PHONE_REGEX.is_match(phone) {
        return Err(HrError::Validation(format!(
            "'{phone}' is not a valid phone number"
        )));
    }
    Ok(())
}
