use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Employee, EmployeeId},
    error::{ApiError, ErrorCode},
};
use tracing::{debug, info};
use url::Url;

pub mod config;
pub mod employee_form;
pub mod error;
pub mod form;
pub mod router;
pub mod screens;
pub mod session;

pub use config::ClientSettings;
pub use employee_form::{EmployeeForm, FormMode, SkillField};
pub use error::ServiceError;
pub use router::Route;
pub use screens::{CreateScreen, EditScreen, ListScreen, ScreenNotice, SubmitError};
pub use session::{LoadOutcome, LoadTicket, Screen, Session};

/// The external employee REST service.
#[async_trait]
pub trait EmployeeService: Send + Sync {
    async fn get_employees(&self) -> Result<Vec<Employee>, ServiceError>;
    async fn get_employee(&self, id: EmployeeId) -> Result<Employee, ServiceError>;
    async fn add_employee(&self, employee: &Employee) -> Result<(), ServiceError>;
    async fn update_employee(&self, employee: &Employee) -> Result<(), ServiceError>;
}

pub struct HttpEmployeeService {
    http: Client,
    base_url: String,
}

impl HttpEmployeeService {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ServiceError> {
        Self::with_client(base_url, Client::new())
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ServiceError> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Self::with_client(settings.api_base_url.clone(), http)
    }

    pub fn with_client(base_url: impl Into<String>, http: Client) -> Result<Self, ServiceError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|source| ServiceError::InvalidBaseUrl {
            url: base_url.clone(),
            source,
        })?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn employees_url(&self) -> String {
        format!("{}/employees", self.base_url)
    }

    fn employee_url(&self, id: EmployeeId) -> String {
        format!("{}/employees/{}", self.base_url, id.0)
    }
}

#[async_trait]
impl EmployeeService for HttpEmployeeService {
    async fn get_employees(&self) -> Result<Vec<Employee>, ServiceError> {
        let res = self.http.get(self.employees_url()).send().await?;
        let employees: Vec<Employee> = decode(check_status(res).await?).await?;
        debug!(count = employees.len(), "fetched employees");
        Ok(employees)
    }

    async fn get_employee(&self, id: EmployeeId) -> Result<Employee, ServiceError> {
        let res = self.http.get(self.employee_url(id)).send().await?;
        match check_status(res).await {
            Ok(res) => decode(res).await,
            Err(err) if err.is_not_found() => Err(ServiceError::NotFound(id)),
            Err(err) => Err(err),
        }
    }

    async fn add_employee(&self, employee: &Employee) -> Result<(), ServiceError> {
        let res = self
            .http
            .post(self.employees_url())
            .json(employee)
            .send()
            .await?;
        check_status(res).await?;
        info!(full_name = %employee.full_name, "created employee");
        Ok(())
    }

    async fn update_employee(&self, employee: &Employee) -> Result<(), ServiceError> {
        let id = employee.id.ok_or(ServiceError::MissingId)?;
        let res = self
            .http
            .put(self.employee_url(id))
            .json(employee)
            .send()
            .await?;
        match check_status(res).await {
            Ok(_) => {
                info!(employee_id = id.0, "updated employee");
                Ok(())
            }
            Err(err) if err.is_not_found() => Err(ServiceError::NotFound(id)),
            Err(err) => Err(err),
        }
    }
}

/// Passes 2xx responses through; everything else becomes
/// [`ServiceError::Status`], using the service's error body when it has one.
async fn check_status(res: Response) -> Result<Response, ServiceError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.bytes().await.unwrap_or_default();
    let (code, message) = match serde_json::from_slice::<ApiError>(&body) {
        Ok(api_error) => (api_error.code, api_error.message),
        Err(_) => {
            let text = String::from_utf8_lossy(&body).trim().to_string();
            let message = if text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            } else {
                text
            };
            (ErrorCode::from_status(status.as_u16()), message)
        }
    };
    Err(ServiceError::Status {
        status: status.as_u16(),
        code,
        message,
    })
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ServiceError> {
    let body = res.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
