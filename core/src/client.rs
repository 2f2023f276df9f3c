//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`, so the I/O step in between is explicit.

use crate::error::ServiceError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::Todo;

/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/todos", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    /// The whole todo is sent; the server stores `name` and `isDone` as given.
    pub fn build_update_todo(&self, todo: &Todo) -> Result<HttpRequest, ServiceError> {
        let body =
            serde_json::to_string(todo).map_err(|e| ServiceError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: format!("{}/todos/{}", self.base_url, todo.id),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ServiceError> {
        check_status(&response, 200)?;
        serde_json::from_str(&response.body)
            .map_err(|e| ServiceError::DeserializationError(e.to_string()))
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ServiceError> {
        check_status(&response, 200)?;
        serde_json::from_str(&response.body)
            .map_err(|e| ServiceError::DeserializationError(e.to_string()))
    }
}

/// Map non-success status codes to the appropriate `ServiceError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ServiceError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ServiceError::NotFound);
    }
    Err(ServiceError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
