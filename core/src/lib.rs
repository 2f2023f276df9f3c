//! Mediator between a todo model and its views.
//!
//! # Overview
//! Views never call the model and the model never sees a view: both talk to
//! a controller. Three bindings are provided:
//! - `TodoControllerImpl`: one model, one view.
//! - `MultiViewTodoController`: one model, an ordered list of views that all
//!   receive every update.
//! - `TodosController` + `Store`: intents become `Action`s reduced into a
//!   `TodoState` that views subscribe to.
//!
//! # Design
//! - Everything is `Rc`/`RefCell` based and runs on a single thread; service
//!   calls are spawned on the current `tokio::task::LocalSet`.
//! - Unbound models, dropped views and unknown todo ids are silent no-ops.
//! - Toggling is optimistic and not rolled back on a failed write.
//! - The HTTP service keeps the host-does-IO split: `TodoClient` builds and
//!   parses plain-data requests, a `Transport` executes them.

pub mod client;
pub mod controller;
pub mod error;
pub mod http;
pub mod model;
pub mod service;
pub mod store;
pub mod types;
pub mod view;

pub use client::TodoClient;
pub use controller::{
    Controller, ModelBinding, MultiViewController, MultiViewTodoController, TodoController,
    TodoControllerImpl,
};
pub use error::ServiceError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use model::{TodoModel, TodoModelImpl};
pub use service::{HttpTodoService, TodoService};
pub use store::{
    connect_view, reduce, select_error, select_todos, Action, ActionDispatchers, Dispatch, Store,
    StoreController, SubscriptionId, TodoState, TodoStore, TodosController,
};
pub use types::{Todo, TodoId};
pub use view::{ElementView, ListView, SnapshotView, TableView, TodoView, ViewSnapshot};
