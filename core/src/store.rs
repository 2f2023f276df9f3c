//! Store-backed mediation: actions, a pure reducer and subscribing views.
//!
//! # Design
//! Instead of pushing into views, `TodosController` wraps every intent into an
//! `Action` and hands it to a single `Dispatch` function. The `Store` reduces
//! the action into the next `TodoState` and notifies subscribers whose
//! selected slice changed. Asynchronous completions come back as further
//! actions (`FetchTodosSucceeded`, `FetchTodosFailed`, `UpdateTodoFailed`).
//!
//! Dispatching is single-threaded and run-to-completion: an action dispatched
//! while another is being reduced or delivered is queued and handled right
//! after it. Work that depends on the state an action produced goes through
//! `Store::dispatch_then`, which runs once that action is actually reduced.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use tokio::task;
use tracing::{debug, warn};

use crate::service::TodoService;
use crate::types::{Todo, TodoId};
use crate::view::TodoView;

/// The single global dispatch function.
pub type Dispatch<A> = Rc<dyn Fn(A)>;

/// Handle returned by `Store::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<S> = Rc<dyn Fn(&S)>;
type AfterReduce<S> = Box<dyn FnOnce(&S)>;

/// Clears the dispatching flag on scope exit, unwinding included.
struct DispatchGuard<'a>(&'a Cell<bool>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Reducer-driven state container.
pub struct Store<S, A> {
    state: RefCell<S>,
    reducer: fn(&S, &A) -> S,
    listeners: RefCell<Vec<(SubscriptionId, Listener<S>)>>,
    queue: RefCell<VecDeque<(A, Option<AfterReduce<S>>)>>,
    dispatching: Cell<bool>,
    next_id: Cell<u64>,
}

impl<S: Clone + 'static, A: 'static> Store<S, A> {
    pub fn new(initial: S, reducer: fn(&S, &A) -> S) -> Self {
        Self {
            state: RefCell::new(initial),
            reducer,
            listeners: RefCell::new(Vec::new()),
            queue: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
            next_id: Cell::new(0),
        }
    }

    pub fn state(&self) -> S {
        self.state.borrow().clone()
    }

    /// A `Dispatch` that forwards into this store for as long as it lives.
    pub fn dispatcher(self: &Rc<Self>) -> Dispatch<A> {
        let store = Rc::downgrade(self);
        Rc::new(move |action| {
            if let Some(store) = store.upgrade() {
                store.dispatch(action);
            }
        })
    }

    pub fn dispatch(&self, action: A) {
        self.queue.borrow_mut().push_back((action, None));
        self.drain();
    }

    /// Dispatches `action` and calls `after` with the state it reduced to,
    /// before listeners see that state. When called re-entrantly both wait
    /// for the actions queued ahead.
    pub fn dispatch_then(&self, action: A, after: impl FnOnce(&S) + 'static) {
        self.queue
            .borrow_mut()
            .push_back((action, Some(Box::new(after))));
        self.drain();
    }

    /// Calls `listener` with the selected slice now and again whenever a
    /// dispatched action changes it.
    pub fn subscribe<T, F, L>(&self, selector: F, listener: L) -> SubscriptionId
    where
        T: Clone + PartialEq + 'static,
        F: Fn(&S) -> T + 'static,
        L: Fn(&T) + 'static,
    {
        let last: RefCell<Option<T>> = RefCell::new(None);
        let notify: Listener<S> = Rc::new(move |state: &S| {
            let slice = selector(state);
            if last.borrow().as_ref() == Some(&slice) {
                return;
            }
            *last.borrow_mut() = Some(slice.clone());
            listener(&slice);
        });

        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::clone(&notify)));

        // Actions dispatched from the initial call are queued behind it.
        if self.dispatching.replace(true) {
            notify(&self.state());
        } else {
            {
                let _guard = DispatchGuard(&self.dispatching);
                notify(&self.state());
            }
            self.drain();
        }
        id
    }

    /// Returns whether the subscription was still registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    fn drain(&self) {
        if self.dispatching.replace(true) {
            return;
        }
        let _guard = DispatchGuard(&self.dispatching);
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some((action, after)) = next else {
                break;
            };
            let reduced = (self.reducer)(&self.state.borrow(), &action);
            *self.state.borrow_mut() = reduced.clone();
            if let Some(after) = after {
                after(&reduced);
            }

            let listeners: Vec<Listener<S>> = self
                .listeners
                .borrow()
                .iter()
                .map(|(_, listener)| Rc::clone(listener))
                .collect();
            for listener in listeners {
                listener(&reduced);
            }
        }
    }
}

/// State slice owned by the todo store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoState {
    pub todos: Vec<Todo>,
    pub error: Option<String>,
}

/// Every way the todo state can change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    StartFetchTodos,
    ToggleTodoDone(TodoId),
    FetchTodosSucceeded(Vec<Todo>),
    FetchTodosFailed(String),
    UpdateTodoFailed(String),
}

impl Action {
    /// Pure reduction of `state` by this action.
    pub fn perform(&self, state: &TodoState) -> TodoState {
        match self {
            Action::StartFetchTodos => TodoState {
                todos: state.todos.clone(),
                error: None,
            },
            Action::ToggleTodoDone(id) => TodoState {
                todos: state
                    .todos
                    .iter()
                    .map(|todo| {
                        if todo.id == *id {
                            Todo {
                                is_done: !todo.is_done,
                                ..todo.clone()
                            }
                        } else {
                            todo.clone()
                        }
                    })
                    .collect(),
                error: state.error.clone(),
            },
            Action::FetchTodosSucceeded(todos) => TodoState {
                todos: todos.clone(),
                error: None,
            },
            Action::FetchTodosFailed(message) | Action::UpdateTodoFailed(message) => TodoState {
                todos: state.todos.clone(),
                error: Some(message.clone()),
            },
        }
    }
}

/// Reducer for `Store<TodoState, Action>`.
pub fn reduce(state: &TodoState, action: &Action) -> TodoState {
    action.perform(state)
}

pub type TodoStore = Store<TodoState, Action>;

/// The todos slice views subscribe to.
pub fn select_todos(state: &TodoState) -> Vec<Todo> {
    state.todos.clone()
}

pub fn select_error(state: &TodoState) -> Option<String> {
    state.error.clone()
}

/// Base for controllers that only talk to a store through `Dispatch`.
pub struct StoreController<A> {
    dispatch: Dispatch<A>,
}

impl<A> StoreController<A> {
    pub fn new(dispatch: Dispatch<A>) -> Self {
        Self { dispatch }
    }

    pub fn dispatch(&self, action: A) {
        (self.dispatch)(action);
    }

    pub fn dispatcher(&self) -> Dispatch<A> {
        Rc::clone(&self.dispatch)
    }
}

/// Named dispatcher functions handed to views.
#[derive(Clone)]
pub struct ActionDispatchers {
    start_fetch_todos: Rc<dyn Fn()>,
    toggle_todo_done: Rc<dyn Fn(TodoId)>,
}

impl ActionDispatchers {
    pub fn start_fetch_todos(&self) {
        (self.start_fetch_todos)();
    }

    pub fn toggle_todo_done(&self, id: TodoId) {
        (self.toggle_todo_done)(id);
    }
}

/// Store-backed todo mediator.
pub struct TodosController<S> {
    base: StoreController<Action>,
    store: Weak<TodoStore>,
    service: Rc<S>,
}

impl<S: TodoService + 'static> TodosController<S> {
    pub fn new(store: &Rc<TodoStore>, service: S) -> Self {
        Self {
            base: StoreController::new(store.dispatcher()),
            store: Rc::downgrade(store),
            service: Rc::new(service),
        }
    }

    pub fn action_dispatchers(self: &Rc<Self>) -> ActionDispatchers {
        let fetch = Rc::clone(self);
        let toggle = Rc::clone(self);
        ActionDispatchers {
            start_fetch_todos: Rc::new(move || fetch.start_fetch_todos()),
            toggle_todo_done: Rc::new(move |id| toggle.toggle_todo_done(id)),
        }
    }

    /// Dispatches `StartFetchTodos`, then the fetch outcome once it settles.
    pub fn start_fetch_todos(&self) {
        self.base.dispatch(Action::StartFetchTodos);

        let dispatch = self.base.dispatcher();
        let service = Rc::clone(&self.service);
        task::spawn_local(async move {
            let action = match service.get_todos().await {
                Ok(todos) => Action::FetchTodosSucceeded(todos),
                Err(error) => {
                    warn!(%error, "failed to fetch todos");
                    Action::FetchTodosFailed(error.to_string())
                }
            };
            dispatch(action);
        });
    }

    /// Flips the todo in the store, then persists the value that flip
    /// produced. A failed write is reported but not reverted.
    pub fn toggle_todo_done(&self, id: TodoId) {
        let Some(store) = self.store.upgrade() else {
            debug!(%id, "toggle_todo_done ignored: store dropped");
            return;
        };

        let dispatch = self.base.dispatcher();
        let service = Rc::clone(&self.service);
        store.dispatch_then(Action::ToggleTodoDone(id), move |state: &TodoState| {
            let Some(toggled) = state.todos.iter().find(|todo| todo.id == id).cloned() else {
                debug!(%id, "ignoring toggle for unknown todo");
                return;
            };
            task::spawn_local(async move {
                if let Err(error) = service.update_todo(&toggled).await {
                    warn!(id = %toggled.id, %error, "failed to persist todo");
                    dispatch(Action::UpdateTodoFailed(error.to_string()));
                }
            });
        });
    }
}

/// Subscribes `view` to the todo store: `show_todos` whenever the todos change
/// and `show_error` whenever a new error appears.
pub fn connect_view<V: TodoView + 'static>(store: &TodoStore, view: Rc<V>) -> [SubscriptionId; 2] {
    let todos_view = Rc::clone(&view);
    let todos = store.subscribe(select_todos, move |todos: &Vec<Todo>| {
        todos_view.show_todos(todos)
    });
    let error = store.subscribe(select_error, move |error: &Option<String>| {
        if let Some(message) = error {
            view.show_error(message);
        }
    });
    [todos, error]
}
