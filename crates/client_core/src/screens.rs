//! Screen controllers for the list, create and edit flows.
//!
//! Each screen owns its state exclusively. Service failures are logged and
//! kept as a [`ScreenNotice`] for the user; a failed submit leaves the form
//! exactly as the user left it so it can be retried.

use shared::domain::{Employee, EmployeeId};
use thiserror::Error;
use tracing::{error, info};

use crate::{
    employee_form::{EmployeeForm, FormMode},
    error::ServiceError,
    form::FormErrors,
    router::Route,
    EmployeeService,
};

/// A failure the user should see on the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenNotice {
    pub message: String,
}

impl ScreenNotice {
    fn from_service(action: &str, err: &ServiceError) -> Self {
        Self {
            message: format!("Could not {action}. {}", err.user_message()),
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("the form has validation errors: {0}")]
    Invalid(FormErrors),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("the employee has not finished loading")]
    NotLoaded,
    #[error("the current screen has no form to submit")]
    NoForm,
}

#[derive(Debug, Default)]
pub struct ListScreen {
    employees: Vec<Employee>,
    loaded: bool,
    notice: Option<ScreenNotice>,
}

impl ListScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load<S>(&mut self, service: &S)
    where
        S: EmployeeService + ?Sized,
    {
        let result = service.get_employees().await;
        self.apply(result);
    }

    pub fn apply(&mut self, result: Result<Vec<Employee>, ServiceError>) {
        match result {
            Ok(employees) => {
                self.employees = employees;
                self.loaded = true;
                self.notice = None;
            }
            Err(err) => {
                error!(error = %err, "failed to load employees");
                self.employees.clear();
                self.notice = Some(ScreenNotice::from_service("load the employee list", &err));
            }
        }
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn notice(&self) -> Option<&ScreenNotice> {
        self.notice.as_ref()
    }

    /// Choosing a row opens its edit screen.
    pub fn select(&self, id: EmployeeId) -> Route {
        Route::Edit(id)
    }
}

#[derive(Debug)]
pub struct CreateScreen {
    form: EmployeeForm,
    notice: Option<ScreenNotice>,
}

impl CreateScreen {
    pub fn new(email_domain: &str) -> Self {
        Self {
            form: EmployeeForm::new(FormMode::Create, email_domain),
            notice: None,
        }
    }

    pub fn form(&self) -> &EmployeeForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EmployeeForm {
        &mut self.form
    }

    pub fn notice(&self) -> Option<&ScreenNotice> {
        self.notice.as_ref()
    }

    pub async fn submit<S>(&mut self, service: &S) -> Result<Route, SubmitError>
    where
        S: EmployeeService + ?Sized,
    {
        let employee = prepare(&mut self.form, None)?;
        match service.add_employee(&employee).await {
            Ok(()) => {
                info!(full_name = %employee.full_name, "employee created");
                self.notice = None;
                Ok(Route::List)
            }
            Err(err) => {
                error!(error = %err, "failed to create employee");
                self.notice = Some(ScreenNotice::from_service("save the new employee", &err));
                Err(SubmitError::Service(err))
            }
        }
    }
}

#[derive(Debug)]
pub struct EditScreen {
    id: EmployeeId,
    form: EmployeeForm,
    employee: Option<Employee>,
    notice: Option<ScreenNotice>,
}

impl EditScreen {
    pub fn new(id: EmployeeId, email_domain: &str) -> Self {
        Self {
            id,
            form: EmployeeForm::new(FormMode::Edit, email_domain),
            employee: None,
            notice: None,
        }
    }

    pub fn id(&self) -> EmployeeId {
        self.id
    }

    pub fn form(&self) -> &EmployeeForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EmployeeForm {
        &mut self.form
    }

    /// The record as last fetched from the service.
    pub fn employee(&self) -> Option<&Employee> {
        self.employee.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.employee.is_some()
    }

    pub fn notice(&self) -> Option<&ScreenNotice> {
        self.notice.as_ref()
    }

    pub async fn load<S>(&mut self, service: &S)
    where
        S: EmployeeService + ?Sized,
    {
        let result = service.get_employee(self.id).await;
        self.apply(result);
    }

    pub fn apply(&mut self, result: Result<Employee, ServiceError>) {
        match result {
            Ok(employee) => {
                self.form.populate(&employee);
                self.employee = Some(employee);
                self.notice = None;
            }
            Err(err) => {
                error!(employee_id = self.id.0, error = %err, "failed to load employee");
                self.notice = Some(ScreenNotice::from_service(
                    &format!("load employee {}", self.id),
                    &err,
                ));
            }
        }
    }

    pub async fn submit<S>(&mut self, service: &S) -> Result<Route, SubmitError>
    where
        S: EmployeeService + ?Sized,
    {
        if self.employee.is_none() {
            return Err(SubmitError::NotLoaded);
        }
        let employee = prepare(&mut self.form, Some(self.id))?;
        match service.update_employee(&employee).await {
            Ok(()) => {
                info!(employee_id = self.id.0, "employee updated");
                self.employee = Some(employee);
                self.notice = None;
                Ok(Route::List)
            }
            Err(err) => {
                error!(employee_id = self.id.0, error = %err, "failed to update employee");
                self.notice = Some(ScreenNotice::from_service("save your changes", &err));
                Err(SubmitError::Service(err))
            }
        }
    }
}

/// Maps the form for submission. A rejected form gets every control marked
/// touched so that all of its messages become visible.
fn prepare(form: &mut EmployeeForm, id: Option<EmployeeId>) -> Result<Employee, SubmitError> {
    match form.to_employee(id) {
        Ok(employee) => Ok(employee),
        Err(errors) => {
            form.mark_all_touched();
            Err(SubmitError::Invalid(errors))
        }
    }
}

#[cfg(test)]
#[path = "tests/screens_tests.rs"]
mod tests;
