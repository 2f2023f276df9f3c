//! Presentation surfaces driven by a controller.
//!
//! # Design
//! A view only keeps a read-only snapshot of what it was last shown. The
//! snapshot is overwritten wholesale on every update: `show_todos` replaces
//! the todos and clears the error, `show_error` keeps the todos and sets the
//! error. Rendering is plain text; there is no markup or styling.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::controller::{TodoController, TodoControllerImpl};
use crate::types::{Todo, TodoId};

/// What a controller can push into a presentation surface.
pub trait TodoView {
    fn show_todos(&self, todos: &[Todo]);

    fn show_error(&self, message: &str);
}

/// The last state pushed into a view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub todos: Vec<Todo>,
    pub error: Option<String>,
}

/// View that only records what it was shown.
#[derive(Debug, Default)]
pub struct SnapshotView {
    snapshot: RefCell<ViewSnapshot>,
}

impl SnapshotView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.snapshot.borrow().clone()
    }
}

impl TodoView for SnapshotView {
    fn show_todos(&self, todos: &[Todo]) {
        let mut snapshot = self.snapshot.borrow_mut();
        snapshot.todos = todos.to_vec();
        snapshot.error = None;
    }

    fn show_error(&self, message: &str) {
        self.snapshot.borrow_mut().error = Some(message.to_string());
    }
}

/// One line per todo: `<id> <name>`, open todos suffixed with `[mark done]`.
#[derive(Debug, Default)]
pub struct ListView {
    inner: SnapshotView,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.inner.snapshot()
    }

    pub fn render(&self) -> String {
        let snapshot = self.inner.snapshot();
        if let Some(error) = snapshot.error {
            return format!("Failure: {error}");
        }
        snapshot
            .todos
            .iter()
            .map(|todo| {
                if todo.is_done {
                    format!("{} {}", todo.id, todo.name)
                } else {
                    format!("{} {} [mark done]", todo.id, todo.name)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl TodoView for ListView {
    fn show_todos(&self, todos: &[Todo]) {
        self.inner.show_todos(todos);
    }

    fn show_error(&self, message: &str) {
        self.inner.show_error(message);
    }
}

/// Tab-separated `id`, `name`, `done` columns with a header row.
#[derive(Debug, Default)]
pub struct TableView {
    inner: SnapshotView,
}

impl TableView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.inner.snapshot()
    }

    pub fn render(&self) -> String {
        let snapshot = self.inner.snapshot();
        let mut rows = vec!["id\tname\tdone".to_string()];
        rows.extend(snapshot.todos.iter().map(|todo| {
            let mark = if todo.is_done { "[x]" } else { "[ ]" };
            format!("{}\t{}\t{mark}", todo.id, todo.name)
        }));
        if let Some(error) = snapshot.error {
            rows.push(format!("error: {error}"));
        }
        rows.join("\n")
    }
}

impl TodoView for TableView {
    fn show_todos(&self, todos: &[Todo]) {
        self.inner.show_todos(todos);
    }

    fn show_error(&self, message: &str) {
        self.inner.show_error(message);
    }
}

/// Self-registering element: binds itself to a single-view controller on
/// creation, starts a fetch when connected and forwards "mark done" clicks.
pub struct ElementView {
    controller: Weak<dyn TodoController>,
    inner: SnapshotView,
    loading: Cell<bool>,
}

impl ElementView {
    pub fn register(controller: &Rc<TodoControllerImpl>) -> Rc<Self> {
        let weak = Rc::downgrade(controller);
        let weak: Weak<dyn TodoController> = weak;
        let view = Rc::new(Self {
            controller: weak,
            inner: SnapshotView::new(),
            loading: Cell::new(false),
        });
        controller.set_view(view.clone());
        view
    }

    /// Called when the element is attached to its host.
    pub fn connected(&self) {
        self.loading.set(true);
        if let Some(controller) = self.controller.upgrade() {
            controller.start_fetch_todos();
        }
    }

    /// Only open todos carry a "mark done" button; clicks on anything else
    /// are ignored.
    pub fn click_mark_done(&self, id: TodoId) {
        let has_button = self
            .inner
            .snapshot()
            .todos
            .iter()
            .any(|todo| todo.id == id && !todo.is_done);
        if !has_button {
            return;
        }
        if let Some(controller) = self.controller.upgrade() {
            controller.toggle_todo_done(id);
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.inner.snapshot()
    }
}

impl TodoView for ElementView {
    fn show_todos(&self, todos: &[Todo]) {
        self.loading.set(false);
        self.inner.show_todos(todos);
    }

    fn show_error(&self, message: &str) {
        self.loading.set(false);
        self.inner.show_error(message);
    }
}
