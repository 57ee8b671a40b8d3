//! Task management commands for CLI.

use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use nosofy_core::{Database, Priority, Store, Task, ValidationError};

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Task description
        #[arg(long)]
        description: Option<String>,
        /// Deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<NaiveDate>,
        /// Priority: low, medium or high (default: medium)
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// List tasks
    List {
        /// Include completed and archived tasks
        #[arg(long)]
        all: bool,
    },
    /// Mark a task completed now
    Complete {
        /// Task ID
        id: i64,
    },
    /// Mark a task pending again
    Reopen {
        /// Task ID
        id: i64,
    },
    /// Hide a task from the default listing and the deadline list
    Archive {
        /// Task ID
        id: i64,
    },
    /// Restore an archived task
    Unarchive {
        /// Task ID
        id: i64,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: i64,
    },
}

fn existing(db: &Database, id: i64) -> Result<Task, Box<dyn std::error::Error>> {
    let task: Option<Task> = db.get(id)?;
    Ok(task.ok_or(ValidationError::NotFound {
        collection: "tasks",
        id,
    })?)
}

fn set_archived(
    db: &Database,
    id: i64,
    archived: bool,
) -> Result<Task, Box<dyn std::error::Error>> {
    let mut task = existing(db, id)?;
    if task.archived != archived {
        task.archived = archived;
        db.put(&task)?;
    }
    Ok(task)
}

pub fn run(action: TaskAction) -> CmdResult {
    let db = Database::open()?;

    match action {
        TaskAction::Add {
            title,
            description,
            deadline,
            priority,
            tags,
        } => {
            let mut task = Task::new(title, Utc::now());
            task.description = description.unwrap_or_default();
            task.deadline = deadline;
            task.priority = priority;
            task.tags = tags
                .map(|t| {
                    t.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default();
            task.id = Some(db.add(&task)?);
            print_json(&task)?;
        }
        TaskAction::List { all } => {
            let tasks: Vec<Task> = db.get_all()?;
            let tasks: Vec<Task> = tasks
                .into_iter()
                .filter(|t| all || (!t.completed && !t.archived))
                .collect();
            print_json(&tasks)?;
        }
        TaskAction::Complete { id } => {
            let mut task = existing(&db, id)?;
            if !task.completed {
                task.complete(Utc::now());
                db.put(&task)?;
            }
            print_json(&task)?;
        }
        TaskAction::Reopen { id } => {
            let mut task = existing(&db, id)?;
            task.reopen();
            db.put(&task)?;
            print_json(&task)?;
        }
        TaskAction::Archive { id } => print_json(&set_archived(&db, id, true)?)?,
        TaskAction::Unarchive { id } => print_json(&set_archived(&db, id, false)?)?,
        TaskAction::Delete { id } => {
            existing(&db, id)?;
            Store::<Task>::delete(&db, id)?;
            println!("{{\"deleted\": {id}}}");
        }
    }
    Ok(())
}
