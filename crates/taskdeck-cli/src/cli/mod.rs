//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use taskdeck_core::api::{AnalyticsReport, TrendsQuery};
use taskdeck_core::client::Surface;
use taskdeck_core::{config, logging};
use taskdeck_types::{TaskPriority, TaskStatus, TimelinePeriod};

mod commands;
mod output;
mod session;

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(version)]
#[command(about = "Command-line client for the taskdeck task service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    #[command(flatten)]
    Api(ApiCommands),
}

/// Commands that talk to the service.
#[derive(clap::Subcommand)]
enum ApiCommands {
    /// Sign in and store the session cookies
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TASKDECK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account (signs in on success)
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "TASKDECK_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        full_name: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Request a password reset email
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password using a reset token
    ResetPassword {
        #[arg(long)]
        token: String,
        #[arg(long, env = "TASKDECK_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
    /// Manage tasks
    Tasks {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Show the Eisenhower priority matrix
    Matrix,
    /// Show tasks due in a period
    Timeline {
        /// today, week, or month
        #[arg(long, default_value = "week")]
        period: TimelinePeriod,
    },
    /// Show overdue tasks
    Overdue,
    /// Manage categories
    Categories {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Manage tags
    Tags {
        #[command(subcommand)]
        command: TagCommands,
    },
    /// Print an analytics report as JSON
    Analytics {
        /// overview, trends, priority-distribution, categories, tags, time-analysis, dashboard
        #[arg(value_name = "REPORT")]
        report: AnalyticsReport,
        /// Trends bucket: day, week, month, year
        #[arg(long, default_value = "month")]
        period: String,
        /// Trends window in days (1-365)
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
}

#[derive(clap::Subcommand)]
enum TaskCommands {
    /// List tasks
    List {
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        #[arg(long)]
        skip: Option<u32>,
        /// Page size (max 100)
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show one task
    Show {
        #[arg(value_name = "TASK_ID")]
        id: i64,
    },
    /// Create a task
    Create {
        #[arg(value_name = "TITLE")]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value = "medium")]
        priority: TaskPriority,
        #[arg(long, default_value = "todo")]
        status: TaskStatus,
    },
    /// Update fields of a task
    Update {
        #[arg(value_name = "TASK_ID")]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        #[arg(long)]
        status: Option<TaskStatus>,
    },
    /// Delete a task
    Delete {
        #[arg(value_name = "TASK_ID")]
        id: i64,
    },
    /// Show task counts by status and priority
    Stats,
}

#[derive(clap::Subcommand)]
enum CategoryCommands {
    List,
    Create {
        #[arg(value_name = "NAME")]
        name: String,
        /// Hex colour, e.g. #3B82F6
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    Update {
        #[arg(value_name = "CATEGORY_ID")]
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    Delete {
        #[arg(value_name = "CATEGORY_ID")]
        id: i64,
    },
}

#[derive(clap::Subcommand)]
enum TagCommands {
    List,
    Create {
        #[arg(value_name = "NAME")]
        name: String,
        #[arg(long)]
        color: Option<String>,
    },
    Update {
        #[arg(value_name = "TAG_ID")]
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    Delete {
        #[arg(value_name = "TAG_ID")]
        id: i64,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Print the config file path
    Path,
    /// Write a default config file
    Init,
    /// Store the API base URL
    SetBaseUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
}

impl ApiCommands {
    /// The surface the user is on while this command runs.
    fn surface(&self) -> Surface {
        match self {
            ApiCommands::Login { .. } => Surface::Login,
            ApiCommands::Register { .. } => Surface::Register,
            ApiCommands::ForgotPassword { .. } => Surface::ForgotPassword,
            ApiCommands::ResetPassword { .. } => Surface::ResetPassword,
            ApiCommands::Logout | ApiCommands::Whoami => Surface::Account,
            ApiCommands::Tasks { .. } | ApiCommands::Timeline { .. } | ApiCommands::Overdue => {
                Surface::Tasks
            }
            ApiCommands::Matrix => Surface::PriorityMatrix,
            ApiCommands::Categories { .. } => Surface::Categories,
            ApiCommands::Tags { .. } => Surface::Tags,
            ApiCommands::Analytics { .. } => Surface::Analytics,
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = config::Config::load().context("load config")?;
    let _log_guard = logging::init(&config.log);

    let command = match cli.command {
        Commands::Config { command } => {
            return match command {
                ConfigCommands::Path => {
                    commands::config::path();
                    Ok(())
                }
                ConfigCommands::Init => commands::config::init(),
                ConfigCommands::SetBaseUrl { url } => commands::config::set_base_url(&url),
            };
        }
        Commands::Api(command) => command,
    };

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(command, &config).await })
}

async fn dispatch(command: ApiCommands, config: &config::Config) -> Result<()> {
    let session = session::Session::open(config, command.surface())?;
    tracing::debug!(surface = %command.surface(), "running command");

    match command {
        ApiCommands::Login { email, password } => {
            commands::auth::login(&session, email, password).await
        }
        ApiCommands::Register {
            email,
            username,
            password,
            full_name,
        } => {
            commands::auth::register(
                &session,
                taskdeck_types::Registration {
                    email,
                    username,
                    password,
                    full_name,
                },
            )
            .await
        }
        ApiCommands::Logout => commands::auth::logout(&session).await,
        ApiCommands::Whoami => commands::auth::whoami(&session).await,
        ApiCommands::ForgotPassword { email } => {
            commands::auth::forgot_password(&session, &email).await
        }
        ApiCommands::ResetPassword {
            token,
            new_password,
        } => commands::auth::reset_password(&session, &token, &new_password).await,

        ApiCommands::Tasks { command } => match command {
            TaskCommands::List {
                status,
                priority,
                skip,
                limit,
            } => {
                commands::tasks::list(
                    &session,
                    &taskdeck_types::TaskQuery {
                        status,
                        priority,
                        skip,
                        limit,
                    },
                )
                .await
            }
            TaskCommands::Show { id } => commands::tasks::show(&session, id).await,
            TaskCommands::Create {
                title,
                description,
                priority,
                status,
            } => {
                commands::tasks::create(
                    &session,
                    &taskdeck_types::TaskCreate {
                        title,
                        description,
                        priority,
                        status,
                    },
                )
                .await
            }
            TaskCommands::Update {
                id,
                title,
                description,
                priority,
                status,
            } => {
                commands::tasks::update(
                    &session,
                    id,
                    &taskdeck_types::TaskUpdate {
                        title,
                        description,
                        priority,
                        status,
                    },
                )
                .await
            }
            TaskCommands::Delete { id } => commands::tasks::delete(&session, id).await,
            TaskCommands::Stats => commands::tasks::stats(&session).await,
        },

        ApiCommands::Matrix => commands::views::matrix(&session).await,
        ApiCommands::Timeline { period } => commands::views::timeline(&session, period).await,
        ApiCommands::Overdue => commands::views::overdue(&session).await,

        ApiCommands::Categories { command } => match command {
            CategoryCommands::List => commands::categories::list(&session).await,
            CategoryCommands::Create { name, color, icon } => {
                commands::categories::create(
                    &session,
                    taskdeck_types::CategoryCreate { name, color, icon },
                )
                .await
            }
            CategoryCommands::Update {
                id,
                name,
                color,
                icon,
            } => {
                commands::categories::update(
                    &session,
                    id,
                    taskdeck_types::CategoryUpdate { name, color, icon },
                )
                .await
            }
            CategoryCommands::Delete { id } => commands::categories::delete(&session, id).await,
        },

        ApiCommands::Tags { command } => match command {
            TagCommands::List => commands::tags::list(&session).await,
            TagCommands::Create { name, color } => {
                commands::tags::create(&session, taskdeck_types::TagCreate { name, color }).await
            }
            TagCommands::Update { id, name, color } => {
                commands::tags::update(&session, id, taskdeck_types::TagUpdate { name, color })
                    .await
            }
            TagCommands::Delete { id } => commands::tags::delete(&session, id).await,
        },

        ApiCommands::Analytics {
            report,
            period,
            days,
        } => {
            commands::analytics::show(
                &session,
                report,
                &TrendsQuery { period, days },
            )
            .await
        }

    }
}
