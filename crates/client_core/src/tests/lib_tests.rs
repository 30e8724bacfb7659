use super::*;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use shared::domain::{ContactPreference, Skill};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct ServerState {
    employees: Arc<Mutex<Vec<Employee>>>,
    received: Arc<Mutex<Vec<(String, Employee)>>>,
    reject_writes_with: Arc<Mutex<Option<(StatusCode, String)>>>,
}

fn employee(id: Option<i64>, full_name: &str) -> Employee {
    Employee {
        id: id.map(EmployeeId),
        full_name: full_name.into(),
        contact_preference: ContactPreference::Email,
        email: format!("{}@gmail.com", full_name.to_ascii_lowercase()),
        phone: None,
        skills: vec![Skill::new("SQL", 3.0, "intermediate")],
    }
}

async fn list_employees(State(state): State<ServerState>) -> Json<Vec<Employee>> {
    Json(state.employees.lock().await.clone())
}

async fn fetch_employee(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    let employees = state.employees.lock().await;
    match employees.iter().find(|e| e.id == Some(EmployeeId(id))) {
        Some(found) => Json(found.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn create_employee(
    State(state): State<ServerState>,
    Json(payload): Json<Employee>,
) -> axum::response::Response {
    if let Some((status, body)) = state.reject_writes_with.lock().await.clone() {
        return (status, body).into_response();
    }
    state
        .received
        .lock()
        .await
        .push(("POST /employees".to_string(), payload));
    StatusCode::CREATED.into_response()
}

async fn replace_employee(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<Employee>,
) -> axum::response::Response {
    if let Some((status, body)) = state.reject_writes_with.lock().await.clone() {
        return (status, body).into_response();
    }
    let mut employees = state.employees.lock().await;
    let Some(slot) = employees.iter_mut().find(|e| e.id == Some(EmployeeId(id))) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    *slot = payload.clone();
    state
        .received
        .lock()
        .await
        .push((format!("PUT /employees/{id}"), payload));
    StatusCode::OK.into_response()
}

async fn spawn_employee_server(seed: Vec<Employee>) -> anyhow::Result<(String, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    *state.employees.lock().await = seed;
    let app = Router::new()
        .route("/employees", get(list_employees).post(create_employee))
        .route("/employees/:id", get(fetch_employee).put(replace_employee))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

#[tokio::test]
async fn get_employees_returns_collection_in_order() {
    let (server_url, _state) = spawn_employee_server(vec![
        employee(Some(1), "Ann"),
        employee(Some(2), "Bob"),
    ])
    .await
    .expect("spawn server");
    let service = HttpEmployeeService::new(server_url).expect("service");

    let employees = service.get_employees().await.expect("list");
    let names: Vec<_> = employees.iter().map(|e| e.full_name.as_str()).collect();
    assert_eq!(names, vec!["Ann", "Bob"]);
}

#[tokio::test]
async fn get_employee_by_id_and_missing_id() {
    let (server_url, _state) = spawn_employee_server(vec![employee(Some(5), "Cy")])
        .await
        .expect("spawn server");
    let service = HttpEmployeeService::new(format!("{server_url}/")).expect("service");

    let found = service.get_employee(EmployeeId(5)).await.expect("fetch");
    assert_eq!(found.full_name, "Cy");

    let err = service
        .get_employee(EmployeeId(99))
        .await
        .expect_err("must be missing");
    assert!(matches!(err, ServiceError::NotFound(EmployeeId(99))));
}

#[tokio::test]
async fn add_employee_posts_camel_case_payload() {
    let (server_url, state) = spawn_employee_server(Vec::new())
        .await
        .expect("spawn server");
    let service = HttpEmployeeService::new(server_url).expect("service");

    let new_employee = employee(None, "Ann");
    service.add_employee(&new_employee).await.expect("create");

    let received = state.received.lock().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].0, "POST /employees");
    assert_eq!(received[0].1, new_employee);
}

#[tokio::test]
async fn update_employee_puts_to_id_path() {
    let (server_url, state) = spawn_employee_server(vec![employee(Some(3), "Dee")])
        .await
        .expect("spawn server");
    let service = HttpEmployeeService::new(server_url).expect("service");

    let mut changed = employee(Some(3), "Dee");
    changed.full_name = "Deirdre".into();
    service.update_employee(&changed).await.expect("update");

    assert_eq!(state.received.lock().await[0].0, "PUT /employees/3");
    assert_eq!(state.employees.lock().await[0].full_name, "Deirdre");
}

#[tokio::test]
async fn update_without_id_is_refused_before_sending() {
    let (server_url, state) = spawn_employee_server(Vec::new())
        .await
        .expect("spawn server");
    let service = HttpEmployeeService::new(server_url).expect("service");

    let err = service
        .update_employee(&employee(None, "Eve"))
        .await
        .expect_err("must fail");
    assert!(matches!(err, ServiceError::MissingId));
    assert!(state.received.lock().await.is_empty());
}

#[tokio::test]
async fn update_of_unknown_employee_is_not_found() {
    let (server_url, _state) = spawn_employee_server(Vec::new())
        .await
        .expect("spawn server");
    let service = HttpEmployeeService::new(server_url).expect("service");

    let err = service
        .update_employee(&employee(Some(8), "Fay"))
        .await
        .expect_err("must fail");
    assert!(matches!(err, ServiceError::NotFound(EmployeeId(8))));
}

#[tokio::test]
async fn service_error_body_is_decoded() {
    let (server_url, state) = spawn_employee_server(Vec::new())
        .await
        .expect("spawn server");
    *state.reject_writes_with.lock().await = Some((
        StatusCode::CONFLICT,
        r#"{"code":"conflict","message":"email already registered"}"#.to_string(),
    ));
    let service = HttpEmployeeService::new(server_url).expect("service");

    let err = service
        .add_employee(&employee(None, "Gus"))
        .await
        .expect_err("must fail");
    match err {
        ServiceError::Status {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 409);
            assert_eq!(code, ErrorCode::Conflict);
            assert_eq!(message, "email already registered");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn plain_text_error_body_keeps_status_code() {
    let (server_url, state) = spawn_employee_server(Vec::new())
        .await
        .expect("spawn server");
    *state.reject_writes_with.lock().await = Some((
        StatusCode::SERVICE_UNAVAILABLE,
        "maintenance window".to_string(),
    ));
    let service = HttpEmployeeService::new(server_url).expect("service");

    let err = service
        .add_employee(&employee(None, "Hal"))
        .await
        .expect_err("must fail");
    assert!(matches!(
        err,
        ServiceError::Status {
            status: 503,
            code: ErrorCode::Internal,
            ..
        }
    ));
    assert!(err.to_string().contains("maintenance window"));
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = match HttpEmployeeService::new("not a url") {
        Ok(_) => panic!("must fail"),
        Err(err) => err,
    };
    assert!(matches!(err, ServiceError::InvalidBaseUrl { .. }));
}

#[test]
fn base_url_trailing_slash_is_trimmed() {
    let service = HttpEmployeeService::new("http://localhost:3000/").expect("service");
    assert_eq!(service.base_url(), "http://localhost:3000");
    assert_eq!(
        service.employee_url(EmployeeId(4)),
        "http://localhost:3000/employees/4"
    );
}
