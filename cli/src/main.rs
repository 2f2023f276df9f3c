use std::rc::Rc;

use anyhow::bail;
use clap::Parser;
use todo_mediator::{
    HttpTodoService, ListView, MultiViewTodoController, TableView, TodoController, TodoId,
    TodoModelImpl,
};
use tokio::task::LocalSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Fetch todos from a todo service, optionally toggle some, and print them
/// as a list and as a table.
#[derive(Parser, Debug)]
#[command(name = "todo-cli", version)]
struct Cli {
    /// Base URL of the todo service.
    #[arg(long, env = "TODO_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    /// Todo id to toggle; may be repeated.
    #[arg(long = "toggle", value_name = "ID")]
    toggle: Vec<u64>,
}

/// Runs `f` on a fresh `LocalSet` and waits for the service calls it started.
async fn settle(f: impl FnOnce()) {
    let local = LocalSet::new();
    local.run_until(async { f() }).await;
    local.await;
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let controller = Rc::new(MultiViewTodoController::new());
    let list = Rc::new(ListView::new());
    let table = Rc::new(TableView::new());
    controller.add_view(list.clone());
    controller.add_view(table.clone());
    TodoModelImpl::register(&controller, HttpTodoService::new(&cli.base_url));

    info!(base_url = %cli.base_url, "fetching todos");
    settle(|| controller.start_fetch_todos()).await;

    if !cli.toggle.is_empty() {
        settle(|| {
            for id in &cli.toggle {
                controller.toggle_todo_done(TodoId(*id));
            }
        })
        .await;
        if let Some(error) = list.snapshot().error {
            bail!("toggle failed: {error}");
        }
        settle(|| controller.start_fetch_todos()).await;
    }

    if let Some(error) = list.snapshot().error {
        bail!("todo service error: {error}");
    }

    println!("{}", list.render());
    println!();
    println!("{}", table.render());
    Ok(())
}
