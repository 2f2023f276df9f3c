use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub mod config;

pub use config::ServerConfig;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: u64,
    pub name: String,
    pub is_done: bool,
}

/// Todos keyed by id, so listing returns them in id order.
pub type Db = Arc<RwLock<BTreeMap<u64, Todo>>>;

pub fn app() -> Router {
    app_with(Vec::new())
}

pub fn app_with(seed: Vec<Todo>) -> Router {
    let db: Db = Arc::new(RwLock::new(
        seed.into_iter().map(|todo| (todo.id, todo)).collect(),
    ));
    Router::new()
        .route("/todos", get(list_todos))
        .route("/todos/{id}", get(get_todo).put(update_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Vec::new()).await
}

pub async fn run_with(listener: TcpListener, seed: Vec<Todo>) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(seed)).await
}

async fn list_todos(State(db): State<Db>) -> Json<Vec<Todo>> {
    let todos = db.read().await;
    debug!(count = todos.len(), "list todos");
    Json(todos.values().cloned().collect())
}

async fn get_todo(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Todo>, StatusCode> {
    let todos = db.read().await;
    todos.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

/// Stores `name` and `isDone` from the body. The body id must match the path.
async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<Todo>,
) -> Result<Json<Todo>, StatusCode> {
    if input.id != id {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut todos = db.write().await;
    let todo = todos.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    todo.name = input.name;
    todo.is_done = input.is_done;
    debug!(id, is_done = todo.is_done, "updated todo");
    Ok(Json(todo.clone()))
}
