//! taskdeck - command line client for the to-do service.
//!
//! Logs in, keeps the session between runs, and lists or adds tasks.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use taskdeck_core::utils::{mask_token, task_line};
use taskdeck_core::{ApiError, Config, TaskCache, Workspace};

/// Environment variable read instead of prompting for a password
const PASSWORD_ENV: &str = "TASKDECK_PASSWORD";

/// Width of the text column in task listings
const TASK_TEXT_WIDTH: usize = 60;

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(about = "Manage your to-do list from the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        /// Account email (defaults to the last one used)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Create an account (does not log in)
    Signup {
        #[arg(short, long)]
        email: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,
    },

    /// End the session on the server and on this device
    Logout,

    /// Show the profile of the logged in user
    Whoami,

    /// Show local session state
    Status,

    /// Work with tasks
    #[command(subcommand)]
    Tasks(TaskCommands),
}

#[derive(Subcommand)]
enum TaskCommands {
    /// List tasks from the server
    List {
        /// Show the cached list without contacting the server
        #[arg(long)]
        offline: bool,
    },

    /// Create a task on the server
    Add {
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Rename a task locally (not sent to the server)
    Rename { id: i64, title: String },

    /// Toggle completion locally (not sent to the server)
    Toggle { id: i64 },

    /// Remove a task locally (not sent to the server)
    Remove { id: i64 },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(verbose: bool) {
    // RUST_LOG wins; otherwise warn, or debug with --verbose
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load()?;
    let store = config.credential_store()?;
    let cache = TaskCache::new(config.cache_dir()?)?;
    let mut workspace = Workspace::new(config.api_client()?, store).with_cache(cache);
    workspace.restore()?;
    debug!(api_url = %config.api_url(), "Workspace ready");

    match cli.command {
        Commands::Login { email } => login(&mut workspace, &mut config, email).await,
        Commands::Signup {
            email,
            first_name,
            last_name,
        } => signup(&workspace, &email, &first_name, &last_name).await,
        Commands::Logout => logout(&mut workspace).await,
        Commands::Whoami => whoami(&workspace).await,
        Commands::Status => {
            status(&workspace, &config);
            Ok(())
        }
        Commands::Tasks(command) => tasks(&mut workspace, command).await,
    }
}

fn prompt_line(label: &str) -> Result<String> {
    eprint!("{}: ", label);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim().to_string())
}

fn read_password() -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    rpassword::prompt_password("Password: ").context("Failed to read password")
}

async fn login(
    workspace: &mut Workspace,
    config: &mut Config,
    email: Option<String>,
) -> Result<()> {
    let email = match email.or_else(|| config.last_email.clone()) {
        Some(email) => email,
        None => prompt_line("Email")?,
    };
    let password = read_password()?;

    let session = workspace.login(&email, &password).await?;
    info!("Login successful");

    config.last_email = Some(email);
    config.save()?;

    match &session.user {
        Some(user) => println!("Logged in as {}", user.display_name()),
        None => println!("Logged in"),
    }
    Ok(())
}

async fn signup(
    workspace: &Workspace,
    email: &str,
    first_name: &str,
    last_name: &str,
) -> Result<()> {
    let password = read_password()?;
    let confirmation = workspace
        .signup(email, &password, first_name, last_name)
        .await?;
    if confirmation.message.is_empty() {
        println!("Account created. Run `taskdeck login` to continue.");
    } else {
        println!("{}", confirmation.message);
    }
    Ok(())
}

async fn logout(workspace: &mut Workspace) -> Result<()> {
    match workspace.logout().await {
        Ok(()) => {
            println!("Logged out");
            Ok(())
        }
        Err(e @ (ApiError::LogoutRejected { .. } | ApiError::Network(_))) => {
            println!("Logged out on this device");
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

async fn whoami(workspace: &Workspace) -> Result<()> {
    let profile = workspace.profile().await?;
    if let Some(name) = profile.full_name() {
        println!("{}", name);
    }
    if let Some(email) = &profile.email {
        println!("{}", email);
    }
    if let Some(id) = profile.id {
        println!("id {}", id);
    }
    Ok(())
}

fn status(workspace: &Workspace, config: &Config) {
    println!("Server:  {}", config.api_url());
    match workspace.session() {
        Some(session) => {
            let who = session
                .user
                .as_ref()
                .map(|u| u.display_name())
                .unwrap_or_else(|| "unknown user".to_string());
            println!("Session: logged in as {}", who);
            println!("Token:   {}", mask_token(&session.access_token));
            let list = workspace.task_list();
            println!("Tasks:   {} cached, {} pending", list.len(), list.pending_count());
        }
        None => println!("Session: logged out"),
    }
}

fn print_tasks(workspace: &Workspace) {
    if workspace.tasks().is_empty() {
        println!("No tasks");
        return;
    }
    for task in workspace.tasks() {
        println!("{}", task_line(task, TASK_TEXT_WIDTH));
    }
}

async fn tasks(workspace: &mut Workspace, command: TaskCommands) -> Result<()> {
    match command {
        TaskCommands::List { offline } => {
            if offline {
                if let Some(age) = workspace.cache_age() {
                    println!("(cached {})", age);
                }
            } else {
                workspace.refresh_tasks().await?;
            }
            print_tasks(workspace);
        }
        TaskCommands::Add { title, description } => {
            let task = workspace.add_task(&title, &description).await?;
            println!("Added {}", task_line(&task, TASK_TEXT_WIDTH));
        }
        TaskCommands::Rename { id, title } => {
            ensure_found(workspace.rename_task_local(id, &title), id)?;
            print_tasks(workspace);
        }
        TaskCommands::Toggle { id } => {
            ensure_found(workspace.toggle_task_local(id), id)?;
            print_tasks(workspace);
        }
        TaskCommands::Remove { id } => {
            ensure_found(workspace.remove_task_local(id), id)?;
            print_tasks(workspace);
        }
    }
    Ok(())
}

fn ensure_found(found: bool, id: i64) -> Result<()> {
    if found {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "No task #{} in the local list; run `taskdeck tasks list` first",
            id
        ))
    }
}
