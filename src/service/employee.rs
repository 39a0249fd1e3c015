use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::HrError;
use crate::model::Page;
use crate::model::employee::{CreateEmployee, Employee, EmployeeChanges, EmployeeFilter};
use crate::store::{Store, StoreTx};

#[derive(Clone)]
pub struct EmployeeDirectory {
    store: Arc<dyn Store>,
}

async fn load_employee(tx: &mut dyn StoreTx, id: u64) -> Result<Employee, HrError> {
    tx.find_employee(id)
        .await?
        .ok_or_else(|| HrError::not_found("Employee", id))
}

async fn check_department(tx: &mut dyn StoreTx, department_id: u64) -> Result<(), HrError> {
    if tx.find_department(department_id).await?.is_none() {
        return Err(HrError::invalid_reference("Department", department_id));
    }
    Ok(())
}

async fn check_unique_email(
    tx: &mut dyn StoreTx,
    email: &str,
    except: Option<u64>,
) -> Result<(), HrError> {
    if tx.find_employee_by_email(email, except).await?.is_some() {
        return Err(HrError::Conflict(format!(
            "Email {email} is already registered"
        )));
    }
    Ok(())
}

impl EmployeeDirectory {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: u64) -> Result<Employee, HrError> {
        let mut tx = self.store.begin().await?;
        let employee = load_employee(&mut *tx, id).await?;
        Ok(employee)
    }

    pub async fn list(&self, filter: EmployeeFilter, page: Page) -> Result<Vec<Employee>, HrError> {
        page.validate()?;
        let mut tx = self.store.begin().await?;
        let employees = tx.list_employees(&filter, page).await?;
        Ok(employees)
    }

    pub async fn list_by_department(&self, department_id: u64) -> Result<Vec<Employee>, HrError> {
        let mut tx = self.store.begin().await?;
        if tx.find_department(department_id).await?.is_none() {
            return Err(HrError::not_found("Department", department_id));
        }
        let employees = tx
            .list_employees(&EmployeeFilter::in_department(department_id), Page::ALL)
            .await?;
        Ok(employees)
    }

    #[instrument(skip(self, new), fields(email = %new.email))]
    pub async fn create(&self, new: CreateEmployee) -> Result<Employee, HrError> {
        new.validate()?;
        let mut tx = self.store.begin().await?;

        check_department(&mut *tx, new.department_id).await?;
        check_unique_email(&mut *tx, &new.email, None).await?;

        let id = tx.insert_employee(&new).await?;
        let employee = load_employee(&mut *tx, id).await?;
        tx.commit().await?;

        info!(employee_id = id, "Employee created");
        Ok(employee)
    }

    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: u64, changes: EmployeeChanges) -> Result<Employee, HrError> {
        changes.validate()?;
        let mut tx = self.store.begin().await?;

        load_employee(&mut *tx, id).await?;
        if let Some(department_id) = changes.department_id {
            check_department(&mut *tx, department_id).await?;
        }
        if let Some(email) = &changes.email {
            check_unique_email(&mut *tx, email, Some(id)).await?;
        }

        if !changes.is_empty() {
            tx.update_employee(id, &changes).await?;
        }
        let employee = load_employee(&mut *tx, id).await?;
        tx.commit().await?;

        info!("Employee updated");
        Ok(employee)
    }

    /// Removes the employee. Departments they manage and leave requests that
    /// name them are left in place.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: u64) -> Result<(), HrError> {
        let mut tx = self.store.begin().await?;
        load_employee(&mut *tx, id).await?;
        tx.delete_employee(id).await?;
        tx.commit().await?;

        info!("Employee deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::EmployeeStatus;
    use crate::service::fixtures::{department, employee, seeded, services};

    #[actix_web::test]
    async fn create_requires_existing_department() {
        let services = services();
        let err = services
            .employees
            .create(employee("x@company.com", 7))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HrError::InvalidReference {
                entity: "Department",
                id: 7
            }
        ));
    }

    #[actix_web::test]
    async fn emails_are_unique() {
        let services = seeded().await;
        let err = services
            .employees
            .create(employee("first@company.com", 1))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Email first@company.com is already registered"
        );

        // keeping one's own address is fine, taking another's is not
        services
            .employees
            .update(
                1,
                EmployeeChanges {
                    email: Some("first@company.com".into()),
                    ..EmployeeChanges::default()
                },
            )
            .await
            .unwrap();
        let err = services
            .employees
            .update(
                1,
                EmployeeChanges {
                    email: Some("second@company.com".into()),
                    ..EmployeeChanges::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::Conflict(_)));
    }

    #[actix_web::test]
    async fn email_uniqueness_ignores_case() {
        let services = seeded().await;
        let err = services
            .employees
            .create(employee("FIRST@company.com", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::Conflict(_)));

        let err = services
            .employees
            .update(
                2,
                EmployeeChanges {
                    email: Some("First@Company.com".into()),
                    ..EmployeeChanges::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::Conflict(_)));

        // a case change to one's own address is still allowed
        let renamed = services
            .employees
            .update(
                1,
                EmployeeChanges {
                    email: Some("First@Company.com".into()),
                    ..EmployeeChanges::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.email, "First@Company.com");
    }

    #[actix_web::test]
    async fn update_touches_only_supplied_fields() {
        let services = seeded().await;
        let before = services.employees.get(2).await.unwrap();

        let after = services
            .employees
            .update(
                2,
                EmployeeChanges {
                    salary: Some(82000.0),
                    status: Some(EmployeeStatus::OnLeave),
                    ..EmployeeChanges::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(after.salary, 82000.0);
        assert_eq!(after.status, EmployeeStatus::OnLeave);
        assert_eq!(after.email, before.email);
        assert_eq!(after.hire_date, before.hire_date);

        let err = services
            .employees
            .update(
                2,
                EmployeeChanges {
                    department_id: Some(42),
                    ..EmployeeChanges::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::InvalidReference { .. }));
    }

    #[actix_web::test]
    async fn invalid_fields_are_rejected_before_storage() {
        let services = seeded().await;
        let err = services
            .employees
            .create(CreateEmployee {
                salary: 0.0,
                ..employee("third@company.com", 1)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::Validation(_)));

        let err = services
            .employees
            .update(
                1,
                EmployeeChanges {
                    phone: Some("call me".into()),
                    ..EmployeeChanges::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::Validation(_)));
    }

    #[actix_web::test]
    async fn list_filters_and_pages() {
        let services = seeded().await;
        let sales = services.departments.create(department("Sales")).await.unwrap();
        services
            .employees
            .create(CreateEmployee {
                status: EmployeeStatus::Inactive,
                ..employee("third@company.com", sales.department.id)
            })
            .await
            .unwrap();

        let all = services
            .employees
            .list(EmployeeFilter::default(), Page::default())
            .await
            .unwrap();
        assert_eq!(all.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2, 3]);

        let paged = services
            .employees
            .list(EmployeeFilter::default(), Page::new(Some(1), Some(1)))
            .await
            .unwrap();
        assert_eq!(paged.iter().map(|e| e.id).collect::<Vec<_>>(), vec![2]);

        let inactive = services
            .employees
            .list(
                EmployeeFilter {
                    status: Some(EmployeeStatus::Inactive),
                    ..EmployeeFilter::default()
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].department_id, sales.department.id);

        let err = services
            .employees
            .list(EmployeeFilter::default(), Page::new(None, Some(0)))
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::Validation(_)));
    }

    #[actix_web::test]
    async fn list_by_department_requires_the_department() {
        let services = seeded().await;
        assert_eq!(services.employees.list_by_department(1).await.unwrap().len(), 2);
        assert!(matches!(
            services.employees.list_by_department(9).await.unwrap_err(),
            HrError::NotFound { .. }
        ));
    }

    #[actix_web::test]
    async fn delete_leaves_references_in_place() {
        let services = seeded().await;
        services
            .departments
            .update(
                1,
                crate::model::department::DepartmentChanges {
                    manager_id: Some(Some(2)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        services.employees.delete(2).await.unwrap();

        assert!(matches!(
            services.employees.get(2).await.unwrap_err(),
            HrError::NotFound { .. }
        ));
        assert!(matches!(
            services.employees.delete(2).await.unwrap_err(),
            HrError::NotFound { .. }
        ));
        let engineering = services.departments.get(1).await.unwrap();
        assert_eq!(engineering.department.manager_id, Some(2));
        assert_eq!(engineering.employee_count, 1);
    }
}
