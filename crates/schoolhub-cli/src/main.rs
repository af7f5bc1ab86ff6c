//! SchoolHub CLI - command-line access to the school administration API.
//!
//! Signs in against the configured backend, keeps the bearer token between
//! runs and prints resources as JSON.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use schoolhub_core::models::{AnnouncementInput, Role, User};
use schoolhub_core::{Config, QueryOutcome, SchoolClient};

/// File name prefix for rolling log files
const LOG_FILE_PREFIX: &str = "schoolhub.log";

#[derive(Parser, Debug)]
#[command(name = "schoolhub")]
#[command(about = "Command-line client for the SchoolHub administration API")]
#[command(version)]
struct Args {
    /// Write logs to daily files in this directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session
    Login {
        /// Account email (defaults to the last one used)
        email: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Print a resource list as JSON
    List {
        #[arg(value_enum)]
        resource: Resource,
    },
    /// Post an announcement, optionally with an uploaded image
    Announce {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Image file to upload and attach
        #[arg(long)]
        attachment: Option<PathBuf>,
        /// Restrict to these roles (repeatable); everyone when omitted
        #[arg(long, value_parser = parse_role)]
        audience: Vec<Role>,
    },
    /// Show a student's subject scores
    Results {
        #[arg(long)]
        student: i64,
    },
    /// Activate or deactivate a teacher account
    TeacherStatus {
        teacher: i64,
        /// `true` to activate, `false` to deactivate
        #[arg(long, action = clap::ArgAction::Set)]
        active: bool,
    },
    /// Summary of what needs attention for the signed-in role
    Dashboard,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Resource {
    Students,
    Parents,
    Teachers,
    Sections,
    GradeLevels,
    Subjects,
    Announcements,
    Calendar,
    Messages,
    Children,
}

fn parse_role(value: &str) -> Result<Role, String> {
    match value.to_ascii_uppercase().as_str() {
        "DIRECTOR" => Ok(Role::Director),
        "TEACHER" => Ok(Role::Teacher),
        "PARENT" => Ok(Role::Parent),
        "STUDENT" => Ok(Role::Student),
        other => Err(format!("unknown role '{}'", other)),
    }
}

/// Initialize the tracing subscriber for logging.
///
/// The returned guard flushes the file writer and must live until exit.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let _guard = init_tracing(args.log_dir.as_deref());
    info!("SchoolHub CLI starting");

    let mut config = Config::load()?;
    let client = SchoolClient::from_config(&config)?;
    debug!(api_url = %config.api_url, "Client configured");

    match args.command {
        Command::Login { email } => login(&client, &mut config, email).await,
        Command::Logout => {
            client.logout()?;
            println!("Signed out");
            Ok(())
        }
        Command::Whoami => {
            let user = require_session(&client).await?;
            println!("{} {} <{}> ({})", user.first_name, user.last_name, user.email, user.role);
            Ok(())
        }
        Command::List { resource } => {
            require_session(&client).await?;
            list(&client, resource).await
        }
        Command::Announce {
            title,
            content,
            attachment,
            audience,
        } => {
            require_session(&client).await?;
            let attachment = match attachment {
                Some(path) => Some(client.upload_image(path).await?),
                None => None,
            };
            let input = AnnouncementInput {
                title,
                content,
                attachment,
                audience,
            };
            let created = client.announcements().create(&input).await?;
            println!("Posted announcement #{}", created.id);
            Ok(())
        }
        Command::Results { student } => {
            require_session(&client).await?;
            show_results(&client, student).await
        }
        Command::TeacherStatus { teacher, active } => {
            require_session(&client).await?;
            client.director().set_teacher_active(teacher, active).await?;
            println!(
                "Teacher #{} {}",
                teacher,
                if active { "activated" } else { "deactivated" }
            );
            Ok(())
        }
        Command::Dashboard => {
            let user = require_session(&client).await?;
            dashboard(&client, user.role).await
        }
    }
}

async fn login(client: &SchoolClient, config: &mut Config, email: Option<String>) -> Result<()> {
    let email = match email.or_else(|| config.last_email.clone()) {
        Some(email) => email,
        None => bail!("No email given and none remembered"),
    };
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;

    let user = client.login(&email, &password).await?;

    config.last_email = Some(email);
    config.save().context("Failed to remember email")?;

    println!("Signed in as {} {} ({})", user.first_name, user.last_name, user.role);
    Ok(())
}

async fn require_session(client: &SchoolClient) -> Result<User> {
    match client.init().await? {
        Some(user) => Ok(user),
        None => bail!("Not signed in. Run `schoolhub login` first."),
    }
}

fn print_outcome<T: Serialize>(outcome: QueryOutcome<T>) -> Result<()> {
    match outcome {
        QueryOutcome::Disabled => println!("Not available for your role"),
        QueryOutcome::Data { value, source } => {
            debug!(?source, "Printing query result");
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

async fn list(client: &SchoolClient, resource: Resource) -> Result<()> {
    match resource {
        Resource::Students => print_outcome(client.students().list().await?),
        Resource::Parents => print_outcome(client.parents().list().await?),
        Resource::Teachers => print_outcome(client.teachers().list().await?),
        Resource::Sections => print_outcome(client.sections().list().await?),
        Resource::GradeLevels => print_outcome(client.grade_levels().list().await?),
        Resource::Subjects => print_outcome(client.subjects().list().await?),
        Resource::Announcements => print_outcome(client.announcements().list().await?),
        Resource::Calendar => print_outcome(client.calendar().list().await?),
        Resource::Messages => print_outcome(client.messages().inbox().await?),
        Resource::Children => print_outcome(client.parents().my_children().await?),
    }
}

async fn show_results(client: &SchoolClient, student: i64) -> Result<()> {
    let scores = match client.results().for_student(Some(student)).await? {
        QueryOutcome::Data { value, .. } => value,
        QueryOutcome::Disabled => bail!("Results are not available for your role"),
    };

    if scores.is_empty() {
        println!("No results recorded");
        return Ok(());
    }
    for score in &scores {
        let subject = score
            .subject
            .as_ref()
            .map(|s| s.name.clone())
            .unwrap_or_else(|| format!("Subject #{}", score.subject_id));
        println!("{:<24} {:>6.1}", subject, score.total());
    }
    Ok(())
}

/// Fetch the role's dashboard reads concurrently and print a summary
async fn dashboard(client: &SchoolClient, role: Role) -> Result<()> {
    let (announcements, calendar, messages, overview) = futures::join!(
        client.announcements().list(),
        client.calendar().list(),
        client.messages().inbox(),
        client.director().overview(),
    );

    if let Some(overview) = overview?.data() {
        println!(
            "Students {}  Teachers {} ({} active)  Parents {}  Sections {}",
            overview.total_students,
            overview.total_teachers,
            overview.active_teachers,
            overview.total_parents,
            overview.total_sections
        );
    }

    let announcements = announcements?.data().unwrap_or_default();
    println!("Announcements: {}", announcements.len());
    for announcement in announcements.iter().take(5) {
        println!("  - {}", announcement.title);
    }

    let now = Utc::now();
    let upcoming: Vec<_> = calendar?
        .data()
        .unwrap_or_default()
        .into_iter()
        .filter(|e| e.is_upcoming(now))
        .collect();
    println!("Upcoming events: {}", upcoming.len());
    for event in upcoming.iter().take(5) {
        println!("  - {} ({})", event.title, event.start_date.format("%Y-%m-%d"));
    }

    let unread = messages?
        .data()
        .unwrap_or_default()
        .iter()
        .filter(|m| !m.is_read)
        .count();
    println!("Unread messages: {}", unread);

    if role == Role::Parent {
        let children = client.parents().my_children().await?.data().unwrap_or_default();
        println!("Children: {}", children.len());
    }
    Ok(())
}
