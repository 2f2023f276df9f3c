//! The mediator between one model and its views.
//!
//! # Design
//! `Controller` and `MultiViewController` are pure coordination state: an
//! optional model plus one or many views. They hold no domain data. The model
//! is owned (the controller is its single holder); views are held weakly, so
//! a view that is dropped while a fetch is in flight silently stops receiving
//! updates instead of dangling.
//!
//! `TodoControllerImpl` (one view) and `MultiViewTodoController` (fan-out)
//! implement `TodoController`, the interface both the model and the views
//! program against. Every method is a no-op while the relevant side is
//! unbound.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::model::TodoModel;
use crate::types::{Todo, TodoId};
use crate::view::TodoView;

/// Intent and update operations of the todo mediator.
///
/// Views call the intent half (`start_fetch_todos`, `toggle_todo_done`); the
/// model calls the update half (`update_views_with_todos`,
/// `update_view_with_error`).
pub trait TodoController {
    fn start_fetch_todos(&self);

    fn toggle_todo_done(&self, id: TodoId);

    fn update_views_with_todos(&self, todos: &[Todo]);

    fn update_view_with_error(&self, message: &str);
}

/// Controllers a model binds itself to when it is created.
pub trait ModelBinding {
    fn bind_model(&self, model: Rc<dyn TodoModel>);
}

/// Coordination state for exactly one model and at most one view.
pub struct Controller<M: ?Sized, V: ?Sized> {
    model: RefCell<Option<Rc<M>>>,
    view: RefCell<Option<Weak<V>>>,
}

impl<M: ?Sized, V: ?Sized> Controller<M, V> {
    pub fn new() -> Self {
        Self {
            model: RefCell::new(None),
            view: RefCell::new(None),
        }
    }

    pub fn model(&self) -> Option<Rc<M>> {
        self.model.borrow().clone()
    }

    /// Binds `model`, replacing any earlier binding.
    pub fn set_model(&self, model: Rc<M>) {
        *self.model.borrow_mut() = Some(model);
    }

    /// The bound view, unless none was set or it has since been dropped.
    pub fn view(&self) -> Option<Rc<V>> {
        self.view.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// Binds `view`, replacing any earlier binding. Only a weak reference is
    /// kept.
    pub fn set_view(&self, view: Rc<V>) {
        *self.view.borrow_mut() = Some(Rc::downgrade(&view));
    }
}

impl<M: ?Sized, V: ?Sized> Default for Controller<M, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Coordination state for exactly one model and an ordered list of views.
pub struct MultiViewController<M: ?Sized, V: ?Sized> {
    model: RefCell<Option<Rc<M>>>,
    views: RefCell<Vec<Weak<V>>>,
}

impl<M: ?Sized, V: ?Sized> MultiViewController<M, V> {
    pub fn new() -> Self {
        Self {
            model: RefCell::new(None),
            views: RefCell::new(Vec::new()),
        }
    }

    pub fn model(&self) -> Option<Rc<M>> {
        self.model.borrow().clone()
    }

    pub fn set_model(&self, model: Rc<M>) {
        *self.model.borrow_mut() = Some(model);
    }

    /// Live views in registration order. Dropped views are skipped.
    pub fn views(&self) -> Vec<Rc<V>> {
        self.views
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }

    /// Appends `view`. No de-duplication: a view added twice is notified
    /// twice. Entries of views dropped since are pruned here.
    pub fn add_view(&self, view: Rc<V>) {
        let mut views = self.views.borrow_mut();
        views.retain(|existing| existing.strong_count() > 0);
        views.push(Rc::downgrade(&view));
    }
}

impl<M: ?Sized, V: ?Sized> Default for MultiViewController<M, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-view todo mediator.
#[derive(Default)]
pub struct TodoControllerImpl {
    base: Controller<dyn TodoModel, dyn TodoView>,
}

impl TodoControllerImpl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_model(&self, model: Rc<dyn TodoModel>) {
        self.base.set_model(model);
    }

    pub fn model(&self) -> Option<Rc<dyn TodoModel>> {
        self.base.model()
    }

    pub fn set_view(&self, view: Rc<dyn TodoView>) {
        self.base.set_view(view);
    }

    pub fn view(&self) -> Option<Rc<dyn TodoView>> {
        self.base.view()
    }
}

impl ModelBinding for TodoControllerImpl {
    fn bind_model(&self, model: Rc<dyn TodoModel>) {
        self.set_model(model);
    }
}

impl TodoController for TodoControllerImpl {
    fn start_fetch_todos(&self) {
        match self.base.model() {
            Some(model) => model.fetch_todos(),
            None => debug!("start_fetch_todos ignored: no model bound"),
        }
    }

    fn toggle_todo_done(&self, id: TodoId) {
        match self.base.model() {
            Some(model) => model.toggle_todo_done(id),
            None => debug!(%id, "toggle_todo_done ignored: no model bound"),
        }
    }

    fn update_views_with_todos(&self, todos: &[Todo]) {
        match self.base.view() {
            Some(view) => view.show_todos(todos),
            None => debug!(count = todos.len(), "todos dropped: no view bound"),
        }
    }

    fn update_view_with_error(&self, message: &str) {
        match self.base.view() {
            Some(view) => view.show_error(message),
            None => debug!(error = message, "error dropped: no view bound"),
        }
    }
}

/// Todo mediator that fans every update out to all registered views.
#[derive(Default)]
pub struct MultiViewTodoController {
    base: MultiViewController<dyn TodoModel, dyn TodoView>,
}

impl MultiViewTodoController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_model(&self, model: Rc<dyn TodoModel>) {
        self.base.set_model(model);
    }

    pub fn model(&self) -> Option<Rc<dyn TodoModel>> {
        self.base.model()
    }

    pub fn add_view(&self, view: Rc<dyn TodoView>) {
        self.base.add_view(view);
    }

    pub fn views(&self) -> Vec<Rc<dyn TodoView>> {
        self.base.views()
    }
}

impl ModelBinding for MultiViewTodoController {
    fn bind_model(&self, model: Rc<dyn TodoModel>) {
        self.set_model(model);
    }
}

impl TodoController for MultiViewTodoController {
    fn start_fetch_todos(&self) {
        match self.base.model() {
            Some(model) => model.fetch_todos(),
            None => debug!("start_fetch_todos ignored: no model bound"),
        }
    }

    fn toggle_todo_done(&self, id: TodoId) {
        match self.base.model() {
            Some(model) => model.toggle_todo_done(id),
            None => debug!(%id, "toggle_todo_done ignored: no model bound"),
        }
    }

    fn update_views_with_todos(&self, todos: &[Todo]) {
        let views = self.base.views();
        debug!(views = views.len(), count = todos.len(), "relaying todos");
        for view in views {
            view.show_todos(todos);
        }
    }

    fn update_view_with_error(&self, message: &str) {
        let views = self.base.views();
        debug!(views = views.len(), error = message, "relaying error");
        for view in views {
            view.show_error(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    /// Appends `"<tag>:todos:<ids>"` / `"<tag>:error:<msg>"` to a shared log.
    struct LoggingView {
        tag: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl LoggingView {
        fn new(tag: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Rc<Self> {
            Rc::new(Self {
                tag,
                log: Rc::clone(log),
            })
        }
    }

    impl TodoView for LoggingView {
        fn show_todos(&self, todos: &[Todo]) {
            let ids: Vec<String> = todos.iter().map(|t| t.id.to_string()).collect();
            self.log
                .borrow_mut()
                .push(format!("{}:todos:{}", self.tag, ids.join(",")));
        }

        fn show_error(&self, message: &str) {
            self.log
                .borrow_mut()
                .push(format!("{}:error:{message}", self.tag));
        }
    }

    #[derive(Default)]
    struct CountingModel {
        fetches: Cell<usize>,
        toggles: RefCell<Vec<TodoId>>,
    }

    impl TodoModel for CountingModel {
        fn fetch_todos(&self) {
            self.fetches.set(self.fetches.get() + 1);
        }

        fn toggle_todo_done(&self, id: TodoId) {
            self.toggles.borrow_mut().push(id);
        }
    }

    #[test]
    fn intents_before_set_model_are_no_ops() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let controller = MultiViewTodoController::new();
        controller.add_view(LoggingView::new("a", &log));

        controller.start_fetch_todos();
        controller.toggle_todo_done(TodoId(1));

        assert!(controller.model().is_none());
        assert!(log.borrow().is_empty());

        let single = TodoControllerImpl::new();
        single.start_fetch_todos();
        single.toggle_todo_done(TodoId(1));
        assert!(single.model().is_none());
    }

    #[test]
    fn intents_forward_to_bound_model() {
        let model = Rc::new(CountingModel::default());
        let controller = TodoControllerImpl::new();
        controller.set_model(model.clone());

        controller.start_fetch_todos();
        controller.toggle_todo_done(TodoId(4));

        assert_eq!(model.fetches.get(), 1);
        assert_eq!(*model.toggles.borrow(), vec![TodoId(4)]);
    }

    #[test]
    fn set_model_last_write_wins() {
        let first = Rc::new(CountingModel::default());
        let second = Rc::new(CountingModel::default());
        let controller = MultiViewTodoController::new();
        controller.set_model(first.clone());
        controller.set_model(second.clone());

        controller.start_fetch_todos();

        assert_eq!(first.fetches.get(), 0);
        assert_eq!(second.fetches.get(), 1);
    }

    #[test]
    fn fan_out_follows_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = LoggingView::new("a", &log);
        let b = LoggingView::new("b", &log);
        let c = LoggingView::new("c", &log);
        let controller = MultiViewTodoController::new();
        controller.add_view(b.clone());
        controller.add_view(a.clone());
        controller.add_view(c.clone());

        controller.update_views_with_todos(&[Todo::new(1, "A", false)]);
        controller.update_view_with_error("boom");

        assert_eq!(
            *log.borrow(),
            vec![
                "b:todos:1",
                "a:todos:1",
                "c:todos:1",
                "b:error:boom",
                "a:error:boom",
                "c:error:boom",
            ]
        );
    }

    #[test]
    fn duplicate_registration_notifies_twice() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = LoggingView::new("a", &log);
        let controller = MultiViewTodoController::new();
        controller.add_view(a.clone());
        controller.add_view(a.clone());

        controller.update_views_with_todos(&[]);

        assert_eq!(*log.borrow(), vec!["a:todos:", "a:todos:"]);
    }

    #[test]
    fn dropped_view_is_skipped() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = LoggingView::new("a", &log);
        let b = LoggingView::new("b", &log);
        let controller = MultiViewTodoController::new();
        controller.add_view(a.clone());
        controller.add_view(b.clone());
        drop(a);

        controller.update_views_with_todos(&[Todo::new(2, "B", true)]);

        assert_eq!(controller.views().len(), 1);
        assert_eq!(*log.borrow(), vec!["b:todos:2"]);
    }

    #[test]
    fn add_view_prunes_dropped_entries() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let controller = MultiViewTodoController::new();
        for tag in ["a", "b", "c"] {
            controller.add_view(LoggingView::new(tag, &log));
        }
        let kept = LoggingView::new("kept", &log);
        controller.add_view(kept.clone());

        assert_eq!(controller.base.views.borrow().len(), 1);
        controller.update_views_with_todos(&[]);
        assert_eq!(*log.borrow(), vec!["kept:todos:"]);
    }

    #[test]
    fn single_view_updates_are_no_ops_when_unbound_or_dropped() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let controller = TodoControllerImpl::new();
        controller.update_views_with_todos(&[Todo::new(1, "A", false)]);
        controller.update_view_with_error("ignored");
        assert!(log.borrow().is_empty());

        let view = LoggingView::new("only", &log);
        controller.set_view(view.clone());
        controller.update_view_with_error("shown");
        drop(view);
        controller.update_view_with_error("after drop");

        assert!(controller.view().is_none());
        assert_eq!(*log.borrow(), vec!["only:error:shown"]);
    }

    #[test]
    fn set_view_replaces_previous_view() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = LoggingView::new("first", &log);
        let second = LoggingView::new("second", &log);
        let controller = TodoControllerImpl::new();
        controller.set_view(first.clone());
        controller.set_view(second.clone());

        controller.update_views_with_todos(&[Todo::new(5, "E", false)]);

        assert_eq!(*log.borrow(), vec!["second:todos:5"]);
    }
}
