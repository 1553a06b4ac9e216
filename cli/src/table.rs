use chrono::{DateTime, Local, Utc};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tasktrack_core::{Task, TaskId};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: TaskId,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

fn local_time(at: DateTime<Utc>) -> String {
    DateTime::<Local>::from(at).format("%Y-%m-%d %H:%M").to_string()
}

pub fn render_tasks(tasks: &[Task]) -> String {
    let rows = tasks.iter().map(|t| TaskRow {
        id: t.id,
        description: t.description.clone(),
        status: t.status.to_string(),
        created: local_time(t.created_at),
        updated: local_time(t.updated_at),
    });
    Table::new(rows).with(Style::rounded()).to_string()
}
