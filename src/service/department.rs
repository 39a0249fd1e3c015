use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::HrError;
use crate::model::Page;
use crate::model::department::{
    CreateDepartment, Department, DepartmentChanges, DepartmentStats, DepartmentView,
};
use crate::model::employee::{EmployeeFilter, EmployeeStatus};
use crate::store::{Store, StoreTx};

#[derive(Clone)]
pub struct DepartmentRegistry {
    store: Arc<dyn Store>,
}

async fn load_department(tx: &mut dyn StoreTx, id: u64) -> Result<Department, HrError> {
    tx.find_department(id)
        .await?
        .ok_or_else(|| HrError::not_found("Department", id))
}

async fn with_count(
    tx: &mut dyn StoreTx,
    department: Department,
) -> Result<DepartmentView, HrError> {
    let employee_count = tx.count_employees(department.id).await?;
    Ok(DepartmentView {
        department,
        employee_count,
    })
}

async fn check_unique_name(
    tx: &mut dyn StoreTx,
    name: &str,
    except: Option<u64>,
) -> Result<(), HrError> {
    if tx.find_department_by_name(name, except).await?.is_some() {
        return Err(HrError::Conflict(format!(
            "Department with name '{name}' already exists"
        )));
    }
    Ok(())
}

async fn check_manager(tx: &mut dyn StoreTx, manager_id: Option<u64>) -> Result<(), HrError> {
    if let Some(id) = manager_id {
        if tx.find_employee(id).await?.is_none() {
            return Err(HrError::invalid_reference("Employee", id));
        }
    }
    Ok(())
}

impl DepartmentRegistry {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: u64) -> Result<DepartmentView, HrError> {
        let mut tx = self.store.begin().await?;
        let department = load_department(&mut *tx, id).await?;
        let view = with_count(&mut *tx, department).await?;
        Ok(view)
    }

    pub async fn list(&self, page: Page) -> Result<Vec<DepartmentView>, HrError> {
        page.validate()?;
        let mut tx = self.store.begin().await?;
        let departments = tx.list_departments(page).await?;

        let mut views = Vec::with_capacity(departments.len());
        for department in departments {
            views.push(with_count(&mut *tx, department).await?);
        }
        Ok(views)
    }

    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create(&self, new: CreateDepartment) -> Result<DepartmentView, HrError> {
        new.validate()?;
        let mut tx = self.store.begin().await?;

        check_unique_name(&mut *tx, &new.name, None).await?;
        check_manager(&mut *tx, new.manager_id).await?;

        let id = tx.insert_department(&new).await?;
        let department = load_department(&mut *tx, id).await?;
        tx.commit().await?;

        info!(department_id = id, "Department created");
        Ok(DepartmentView {
            department,
            employee_count: 0,
        })
    }

    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: u64,
        changes: DepartmentChanges,
    ) -> Result<DepartmentView, HrError> {
        changes.validate()?;
        let mut tx = self.store.begin().await?;

        load_department(&mut *tx, id).await?;
        if let Some(name) = &changes.name {
            check_unique_name(&mut *tx, name, Some(id)).await?;
        }
        if let Some(manager_id) = changes.manager_id {
            check_manager(&mut *tx, manager_id).await?;
        }

        if !changes.is_empty() {
            tx.update_department(id, &changes).await?;
        }
        let department = load_department(&mut *tx, id).await?;
        let view = with_count(&mut *tx, department).await?;
        tx.commit().await?;

        info!("Department updated");
        Ok(view)
    }

    /// Refuses while any employee still references the department.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: u64) -> Result<(), HrError> {
        let mut tx = self.store.begin().await?;

        load_department(&mut *tx, id).await?;
        let dependents = tx.count_employees(id).await?;
        if dependents > 0 {
            return Err(HrError::InvalidState(format!(
                "Department {id} has dependents: {dependents} employee(s) still assigned. \
                 Reassign or remove them first."
            )));
        }

        tx.delete_department(id).await?;
        tx.commit().await?;

        info!("Department deleted");
        Ok(())
    }

    pub async fn stats(&self, id: u64) -> Result<DepartmentStats, HrError> {
        let mut tx = self.store.begin().await?;

        let department = load_department(&mut *tx, id).await?;
        let employees = tx
            .list_employees(&EmployeeFilter::in_department(id), Page::ALL)
            .await?;

        let total_employees = employees.len() as u64;
        let active_employees = employees
            .iter()
            .filter(|e| e.status == EmployeeStatus::Active)
            .count() as u64;
        let total_salary_expense: f64 = employees.iter().map(|e| e.salary).sum();
        let average_salary = if employees.is_empty() {
            0.0
        } else {
            (total_salary_expense / employees.len() as f64 * 100.0).round() / 100.0
        };

        Ok(DepartmentStats {
            department_id: department.id,
            department_name: department.name,
            total_employees,
            active_employees,
            total_salary_expense,
            average_salary,
            manager_id: department.manager_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::EmployeeChanges;
    use crate::service::fixtures::{department, employee, seeded, services};

    #[actix_web::test]
    async fn duplicate_names_conflict_regardless_of_case() {
        let services = services();
        let registry = &services.departments;

        registry.create(department("Engineering")).await.unwrap();
        let err = registry.create(department("engineering")).await.unwrap_err();
        assert!(matches!(err, HrError::Conflict(_)));
    }

    #[actix_web::test]
    async fn renaming_to_own_name_is_not_a_conflict() {
        let services = services();
        let registry = &services.departments;
        let hr = registry.create(department("HR")).await.unwrap();
        registry.create(department("Sales")).await.unwrap();

        let renamed = registry
            .update(
                hr.department.id,
                DepartmentChanges {
                    name: Some("hr".into()),
                    ..DepartmentChanges::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.department.name, "hr");

        let err = registry
            .update(
                hr.department.id,
                DepartmentChanges {
                    name: Some("SALES".into()),
                    ..DepartmentChanges::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::Conflict(_)));
    }

    #[actix_web::test]
    async fn manager_must_exist() {
        let services = seeded().await;
        let registry = &services.departments;

        let err = registry
            .create(CreateDepartment {
                manager_id: Some(99),
                ..department("Finance")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::InvalidReference { id: 99, .. }));

        let finance = registry
            .create(CreateDepartment {
                manager_id: Some(2),
                ..department("Finance")
            })
            .await
            .unwrap();
        assert_eq!(finance.department.manager_id, Some(2));

        let cleared = registry
            .update(
                finance.department.id,
                DepartmentChanges {
                    manager_id: Some(None),
                    ..DepartmentChanges::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.department.manager_id, None);

        let err = registry
            .update(
                finance.department.id,
                DepartmentChanges {
                    manager_id: Some(Some(99)),
                    ..DepartmentChanges::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::InvalidReference { .. }));
    }

    #[actix_web::test]
    async fn delete_is_refused_while_employees_remain() {
        let services = seeded().await;
        let registry = &services.departments;

        let err = registry.delete(1).await.unwrap_err();
        assert!(matches!(err, HrError::InvalidState(_)));
        assert_eq!(registry.get(1).await.unwrap().employee_count, 2);

        let ops = registry.create(department("Operations")).await.unwrap();
        for id in [1, 2] {
            services
                .employees
                .update(
                    id,
                    EmployeeChanges {
                        department_id: Some(ops.department.id),
                        ..EmployeeChanges::default()
                    },
                )
                .await
                .unwrap();
        }

        registry.delete(1).await.unwrap();
        assert!(matches!(
            registry.get(1).await.unwrap_err(),
            HrError::NotFound { .. }
        ));
        assert!(matches!(
            registry.delete(1).await.unwrap_err(),
            HrError::NotFound { .. }
        ));
    }

    #[actix_web::test]
    async fn list_reports_head_counts() {
        let services = seeded().await;
        services.departments.create(department("Legal")).await.unwrap();

        let views = services.departments.list(Page::default()).await.unwrap();
        let counts: Vec<_> = views
            .iter()
            .map(|v| (v.department.name.as_str(), v.employee_count))
            .collect();
        assert_eq!(counts, vec![("Engineering", 2), ("Legal", 0)]);
    }

    #[actix_web::test]
    async fn stats_aggregate_salaries_and_active_staff() {
        let services = seeded().await;
        services
            .employees
            .create(crate::model::employee::CreateEmployee {
                salary: 70001.0,
                status: EmployeeStatus::Inactive,
                ..employee("third@company.com", 1)
            })
            .await
            .unwrap();

        let stats = services.departments.stats(1).await.unwrap();
        assert_eq!(stats.department_name, "Engineering");
        assert_eq!(stats.total_employees, 3);
        assert_eq!(stats.active_employees, 2);
        assert_eq!(stats.total_salary_expense, 190001.0);
        assert_eq!(stats.average_salary, 63333.67);

        let empty = services.departments.create(department("Empty")).await.unwrap();
        let stats = services.departments.stats(empty.department.id).await.unwrap();
        assert_eq!(stats.total_employees, 0);
        assert_eq!(stats.average_salary, 0.0);
    }
}
