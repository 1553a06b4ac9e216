mod table;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use tasktrack_core::{
    Error, FileTaskStore, IdAllocator, Status, StorageLocator, TaskId, TaskService,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "task-cli")]
#[command(about = "Track tasks in a local JSON file", long_about = None)]
struct Cli {
    /// Storage file (defaults to data.json in the working directory)
    #[arg(long, global = true, env = "TASK_CLI_FILE")]
    file: Option<PathBuf>,

    /// How ids for new tasks are chosen: "max" (highest id + 1) or "count" (task count + 1)
    #[arg(long, global = true, default_value_t = IdAllocator::HighWaterMark)]
    ids: IdAllocator,

    /// Log operations to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Add a new task (usage: add "Buy milk")
    Add {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        description: Vec<String>,
    },
    /// Replace a task's description
    Update {
        id: String,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        description: Vec<String>,
    },
    /// Delete a task
    Delete { id: String },
    /// Mark a task as in progress
    MarkInProgress { id: String },
    /// Mark a task as done
    MarkDone { id: String },
    /// List tasks, optionally only those with the given status
    List { status: Option<Status> },
}

fn init_tracing(verbose: bool) {
    // RUST_LOG wins; ignore filters that are empty, huge or malformed.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new(if verbose { "info" } else { "off" }));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn parse_id(raw: &str) -> Option<TaskId> {
    raw.trim().parse::<TaskId>().ok().filter(|id| *id > 0)
}

fn run(cli: Cli) -> Result<()> {
    let locator = match cli.file {
        Some(path) => StorageLocator::from_path(path),
        None => StorageLocator::WorkingDir,
    };
    let store = FileTaskStore::new(&locator)?;
    let service = TaskService::new(store).with_allocator(cli.ids);

    match cli.command {
        Commands::Add { description } => {
            tracing::info!("add command received");
            let id = service.add_task(description.join(" "))?;
            println!("Task added successfully (ID: {})", id);
        }
        Commands::Update { id, description } => {
            let Some(id) = parse_id(&id) else {
                println!("Invalid ID");
                return Ok(());
            };
            service.update_task(id, description.join(" "))?;
            println!("Task updated successfully (ID: {})", id);
        }
        Commands::Delete { id } => {
            let Some(id) = parse_id(&id) else {
                println!("Invalid ID");
                return Ok(());
            };
            service.delete_task(id)?;
            println!("Task deleted successfully (ID: {})", id);
        }
        Commands::MarkInProgress { id } => {
            let Some(id) = parse_id(&id) else {
                println!("Invalid ID");
                return Ok(());
            };
            service.mark_in_progress(id)?;
            println!("Task {} marked as {}", id, Status::InProgress);
        }
        Commands::MarkDone { id } => {
            let Some(id) = parse_id(&id) else {
                println!("Invalid ID");
                return Ok(());
            };
            service.mark_done(id)?;
            println!("Task {} marked as {}", id, Status::Done);
        }
        Commands::List { status } => {
            let tasks = match status {
                Some(status) => service.list_by_status(status)?,
                None => service.list_tasks()?,
            };
            if tasks.is_empty() {
                println!("No tasks found.");
            } else {
                println!("{}", table::render_tasks(&tasks));
            }
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        match err.downcast_ref::<Error>() {
            // Missing tasks are reported, not treated as a failure.
            Some(e) if e.is_expected() => println!("{}", e),
            Some(e) => {
                eprintln!("Error: {:#}", err);
                process::exit(e.exit_code());
            }
            None => {
                eprintln!("Error: {:#}", err);
                process::exit(1);
            }
        }
    }
}
