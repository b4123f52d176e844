//! HTTP inbound adapter (axum). Binds JSON requests to the todo use case.
//!
//! No business rules here: bodies are validated for shape and length, then
//! handed to `TodoUseCase`; its errors become status codes in `response`.

pub mod request;
pub mod response;

use crate::domain::Todo;
use crate::ports::TodoUseCase;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use request::{CreateTodoRequest, UpdateTodoRequest};
use response::{ApiError, DataResponse};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub todos: Arc<dyn TodoUseCase>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/todos", get(list_todos).post(create_todo))
        .route(
            "/api/v1/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .with_state(state)
}

fn path_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id).map_err(|_| ApiError::InvalidId)
}

async fn list_todos(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<Vec<Todo>>>, ApiError> {
    let todos = state.todos.get_all_todos().await?;
    Ok(Json(DataResponse::new("todos fetched", todos)))
}

async fn get_todo(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<DataResponse<Todo>>, ApiError> {
    let id = path_id(path)?;
    let todo = state.todos.get_todo_by_id(id).await?;
    Ok(Json(DataResponse::new("todo fetched", todo)))
}

async fn create_todo(
    State(state): State<AppState>,
    body: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<Todo>>), ApiError> {
    let Json(body) = body.map_err(|_| ApiError::InvalidJson)?;
    let errors = body.validate();
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let todo = state.todos.create_todo(body.into_draft()).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new("todo created", todo)),
    ))
}

async fn update_todo(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<Json<DataResponse<Todo>>, ApiError> {
    let id = path_id(path)?;
    let Json(body) = body.map_err(|_| ApiError::InvalidJson)?;
    let errors = body.validate();
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let todo = state.todos.update_todo(id, body.into_changes()).await?;
    Ok(Json(DataResponse::new("todo updated", todo)))
}

async fn delete_todo(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<DataResponse<()>>, ApiError> {
    let id = path_id(path)?;
    state.todos.delete_todo(id).await?;
    Ok(Json(DataResponse::message_only("todo deleted")))
}
