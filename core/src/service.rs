//! The data-service boundary the model talks to.
//!
//! # Design
//! `TodoService` is the only way the model reaches the outside world. Its
//! futures are not `Send`: the whole mediator runs on one `LocalSet`.
//! `HttpTodoService` composes the stateless `TodoClient` with a `Transport`.

use std::rc::Rc;

use async_trait::async_trait;

use crate::client::TodoClient;
use crate::error::ServiceError;
use crate::http::{ReqwestTransport, Transport};
use crate::types::Todo;

/// Asynchronous, fallible access to the remote todo collection.
///
/// Implementations never retry; each call settles exactly once.
#[async_trait(?Send)]
pub trait TodoService {
    async fn get_todos(&self) -> Result<Vec<Todo>, ServiceError>;

    async fn update_todo(&self, todo: &Todo) -> Result<(), ServiceError>;
}

#[async_trait(?Send)]
impl<S: TodoService + ?Sized> TodoService for Rc<S> {
    async fn get_todos(&self) -> Result<Vec<Todo>, ServiceError> {
        (**self).get_todos().await
    }

    async fn update_todo(&self, todo: &Todo) -> Result<(), ServiceError> {
        (**self).update_todo(todo).await
    }
}

/// `TodoService` over the todo HTTP API.
#[derive(Debug, Clone)]
pub struct HttpTodoService<T = ReqwestTransport> {
    client: TodoClient,
    transport: T,
}

impl HttpTodoService<ReqwestTransport> {
    pub fn new(base_url: &str) -> Self {
        Self::with_transport(base_url, ReqwestTransport::new())
    }
}

impl<T: Transport> HttpTodoService<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            client: TodoClient::new(base_url),
            transport,
        }
    }
}

#[async_trait(?Send)]
impl<T: Transport> TodoService for HttpTodoService<T> {
    async fn get_todos(&self) -> Result<Vec<Todo>, ServiceError> {
        let request = self.client.build_list_todos();
        let response = self.transport.execute(request).await?;
        self.client.parse_list_todos(response)
    }

    async fn update_todo(&self, todo: &Todo) -> Result<(), ServiceError> {
        let request = self.client.build_update_todo(todo)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_update_todo(response).map(|_| ())
    }
}
