//! CLI commands

use anyhow::Result;
use clap::Subcommand;
use taskpad_core::{Task, TaskDraft};
use taskpad_http::{Gateway, SessionStore};

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account
    Register {
        username: String,
        email: String,

        /// Password; also read from TASKPAD_PASSWORD
        #[arg(long, env = "TASKPAD_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Log in and store the session tokens
    Login {
        username: String,

        /// Password; also read from TASKPAD_PASSWORD
        #[arg(long, env = "TASKPAD_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Drop the stored session
    Logout,

    /// Show whether a session is currently held
    Status,

    /// List all tasks
    List,

    /// Show a single task
    Show { id: i64 },

    /// Create a task
    Add {
        title: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// Replace a task's title and, optionally, its description
    Edit {
        id: i64,
        title: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// Toggle a task's completion state
    Done { id: i64 },

    /// Delete a task
    Rm { id: i64 },
}

impl Commands {
    pub async fn execute(self, session: &SessionStore, gateway: &Gateway) -> Result<()> {
        match self {
            Self::Register {
                username,
                email,
                password,
            } => {
                session.register(&username, &email, &password).await?;
                println!("Account created. Log in with `taskpad login {username}`.");
                Ok(())
            }
            Self::Login { username, password } => {
                session.login(&username, &password).await?;
                println!("Logged in as {username}.");
                Ok(())
            }
            Self::Logout => {
                session.logout();
                println!("Logged out.");
                Ok(())
            }
            Self::Status => {
                if session.is_authenticated() {
                    println!("Session held; tokens are stored.");
                } else {
                    println!("Not logged in.");
                }
                Ok(())
            }
            Self::List => {
                let page = gateway.list_tasks().await?;
                if page.results.is_empty() {
                    println!("No tasks.");
                }
                for task in &page.results {
                    println!("{}", format_row(task));
                }
                Ok(())
            }
            Self::Show { id } => {
                let task = gateway.get_task(id).await?;
                println!("{}", format_row(&task));
                if let Some(description) = &task.description {
                    println!("    {description}");
                }
                println!("    created {}", task.created_at);
                Ok(())
            }
            Self::Add { title, description } => {
                let mut draft = TaskDraft::new(title);
                draft.description = description;
                let task = gateway.create_task(&draft).await?;
                println!("Created task {}.", task.id);
                Ok(())
            }
            Self::Edit {
                id,
                title,
                description,
            } => {
                // PUT replaces all client-authored fields, so keep the current
                // description unless a new one was given.
                let current = gateway.get_task(id).await?;
                let draft = TaskDraft {
                    title,
                    description: description.or(current.description),
                };
                let task = gateway.update_task(id, &draft).await?;
                println!("Updated task {}.", task.id);
                Ok(())
            }
            Self::Done { id } => {
                let current = gateway.get_task(id).await?;
                let task = gateway.toggle_task(id, current.is_completed).await?;
                let state = if task.is_completed { "done" } else { "open" };
                println!("Task {} marked {state}.", task.id);
                Ok(())
            }
            Self::Rm { id } => {
                gateway.delete_task(id).await?;
                println!("Deleted task {id}.");
                Ok(())
            }
        }
    }
}

fn format_row(task: &Task) -> String {
    let marker = if task.is_completed { "x" } else { " " };
    format!("[{marker}] {:>4}  {}", task.id, task.title)
}
