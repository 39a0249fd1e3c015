pub mod department;
pub mod employee;
pub mod leave_request;

use serde::{Deserialize, Deserializer};

use crate::error::HrError;

pub const DEFAULT_LIMIT: u64 = 100;
pub const MAX_LIMIT: u64 = 1000;

/// skip/limit pagination shared by every list operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u64,
    pub limit: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    /// Every row, used for internal aggregation.
    pub const ALL: Page = Page {
        skip: 0,
        limit: u64::MAX,
    };

    pub fn new(skip: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            skip: skip.unwrap_or(0),
            limit: limit.unwrap_or(DEFAULT_LIMIT),
        }
    }

    pub fn validate(&self) -> Result<(), HrError> {
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(HrError::Validation(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        Ok(())
    }

    pub fn apply<T>(&self, rows: impl Iterator<Item = T>) -> Vec<T> {
        rows.skip(usize::try_from(self.skip).unwrap_or(usize::MAX))
            .take(usize::try_from(self.limit).unwrap_or(usize::MAX))
            .collect()
    }
}

/// Distinguishes an absent field from an explicit `null` in partial updates.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

pub(crate) fn check_text(field: &str, value: &str, max: usize) -> Result<(), HrError> {
    let len = value.chars().count();
    if len == 0 || len > max {
        return Err(HrError::Validation(format!(
            "{field} must be between 1 and {max} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_rejects_out_of_range_limits() {
        assert!(Page { skip: 0, limit: 0 }.validate().is_err());
        assert!(Page { skip: 0, limit: 1001 }.validate().is_err());
        assert!(Page::default().validate().is_ok());
    }

    #[test]
    fn page_slices_rows() {
        let page = Page { skip: 2, limit: 2 };
        assert_eq!(page.apply(1..=10), vec![3, 4]);
        assert_eq!(Page::ALL.apply(1..=3), vec![1, 2, 3]);
    }

    #[test]
    fn text_bounds_are_inclusive() {
        assert!(check_text("reason", "x", 1).is_ok());
        assert!(check_text("reason", "", 10).is_err());
        assert!(check_text("reason", "toolong", 3).is_err());
    }
}
