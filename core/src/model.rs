//! The todo model: authoritative state plus asynchronous service access.
//!
//! # Design
//! `TodoModelImpl` owns the todo collection and is the only caller of the
//! `TodoService`. It binds itself to its controller on creation, reports
//! outcomes to that controller only (held weakly) and never sees a view.
//!
//! Service calls are spawned with `tokio::task::spawn_local`, so `fetch_todos`
//! and `toggle_todo_done` must run inside a `LocalSet`. Calls are
//! fire-and-forget: each reports exactly one outcome, eventually, and no
//! ordering between in-flight calls is guaranteed.
//!
//! Toggling is optimistic and is not rolled back when persistence fails. The
//! error is reported, but the local collection keeps the flipped value and
//! can disagree with the server until the next successful fetch.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tokio::task;
use tracing::{debug, info, warn};

use crate::controller::{ModelBinding, TodoController};
use crate::service::TodoService;
use crate::types::{Todo, TodoId};

/// Operations the controller forwards user intents to.
pub trait TodoModel {
    fn fetch_todos(&self);

    fn toggle_todo_done(&self, id: TodoId);
}

pub struct TodoModelImpl<S> {
    todos: Rc<RefCell<Vec<Todo>>>,
    controller: Weak<dyn TodoController>,
    service: Rc<S>,
}

impl<S: TodoService + 'static> TodoModelImpl<S> {
    /// Creates a model with an empty collection and binds it to `controller`,
    /// the controller it reports to.
    pub fn register<C>(controller: &Rc<C>, service: S) -> Rc<Self>
    where
        C: TodoController + ModelBinding + 'static,
    {
        Self::register_with_todos(controller, service, Vec::new())
    }

    /// Like `register`, seeding the collection with `todos`.
    pub fn register_with_todos<C>(controller: &Rc<C>, service: S, todos: Vec<Todo>) -> Rc<Self>
    where
        C: TodoController + ModelBinding + 'static,
    {
        let weak = Rc::downgrade(controller);
        let weak: Weak<dyn TodoController> = weak;
        let model = Rc::new(Self {
            todos: Rc::new(RefCell::new(todos)),
            controller: weak,
            service: Rc::new(service),
        });
        controller.bind_model(model.clone());
        model
    }

    /// Snapshot of the current collection.
    pub fn todos(&self) -> Vec<Todo> {
        self.todos.borrow().clone()
    }
}

impl<S: TodoService + 'static> TodoModel for TodoModelImpl<S> {
    fn fetch_todos(&self) {
        let todos = Rc::clone(&self.todos);
        let controller = self.controller.clone();
        let service = Rc::clone(&self.service);

        task::spawn_local(async move {
            match service.get_todos().await {
                Ok(fetched) => {
                    info!(count = fetched.len(), "fetched todos");
                    *todos.borrow_mut() = fetched.clone();
                    if let Some(controller) = controller.upgrade() {
                        controller.update_views_with_todos(&fetched);
                    }
                }
                Err(error) => {
                    warn!(%error, "failed to fetch todos");
                    if let Some(controller) = controller.upgrade() {
                        controller.update_view_with_error(&error.to_string());
                    }
                }
            }
        });
    }

    fn toggle_todo_done(&self, id: TodoId) {
        let toggled = {
            let mut todos = self.todos.borrow_mut();
            let Some(todo) = todos.iter_mut().find(|todo| todo.id == id) else {
                debug!(%id, "ignoring toggle for unknown todo");
                return;
            };
            todo.is_done = !todo.is_done;
            todo.clone()
        };

        let controller = self.controller.clone();
        let service = Rc::clone(&self.service);

        task::spawn_local(async move {
            if let Err(error) = service.update_todo(&toggled).await {
                warn!(id = %toggled.id, %error, "failed to persist todo");
                if let Some(controller) = controller.upgrade() {
                    controller.update_view_with_error(&error.to_string());
                }
            }
        });
    }
}
