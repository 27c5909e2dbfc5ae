use anyhow::Result;
use clap::{Parser, Subcommand};
use profitwise_client::{DashboardClient, PersistenceController, SaveOutcome};
use profitwise_core::PersistenceState;
use profitwise_gateway::Config;
use profitwise_monitor::{install_panic_hook, ErrorMonitor};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "profitwise-cli",
    about = "Command-line access to the ProfitWi$e dashboard backend",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, help = "Output format", default_value = "pretty")]
    format: OutputFormat,

    #[arg(short, long, help = "Set log level", default_value = "warn")]
    log_level: String,

    #[arg(long, help = "Print error monitor statistics after the command")]
    show_errors: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Fetch dashboard data, falling back to the sample payload")]
    Dashboard,

    #[command(subcommand, about = "Read or write the saved dashboard state")]
    State(StateCommand),

    #[command(about = "Download a backup of the user's data")]
    Export {
        #[arg(long, help = "Target directory (defaults to the downloads folder)")]
        dir: Option<PathBuf>,
    },

    #[command(about = "Restore user data from a backup file")]
    Import {
        #[arg(help = "Path to a backup JSON file")]
        file: PathBuf,
    },

    #[command(subcommand, about = "AI analysis endpoints")]
    Ai(AiCommand),

    #[command(about = "Show the error monitor for this session")]
    Errors {
        #[arg(long, help = "Also write the error log to this directory")]
        export_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum StateCommand {
    #[command(about = "Print the saved dashboard state")]
    Get,

    #[command(about = "Save a dashboard state")]
    Save {
        #[arg(help = "Dashboard state as a JSON string")]
        state: String,
    },
}

#[derive(Subcommand)]
enum AiCommand {
    #[command(about = "Run a new AI analysis")]
    Analyze,

    #[command(about = "Fetch the latest AI insights")]
    Insights,

    #[command(about = "Send a message to the AI assistant")]
    Chat {
        #[arg(help = "Message text")]
        message: String,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.log_level.as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let config = Config::load()?;
    config.validate()?;
    let client_config = config.client_config()?;
    let debounce = client_config.debounce();

    let client = Arc::new(DashboardClient::from_config(client_config)?);
    install_panic_hook(Arc::clone(client.logger()));
    let monitor = client.error_monitor();

    let result = execute(cli.command, &client, &monitor, debounce, cli.format).await;

    if cli.show_errors {
        print_output(&monitor.refresh(), cli.format)?;
    }

    result
}

async fn execute(
    command: Commands,
    client: &Arc<DashboardClient>,
    monitor: &ErrorMonitor,
    debounce: Duration,
    format: OutputFormat,
) -> Result<()> {
    let controller = || PersistenceController::with_debounce(Arc::clone(client), debounce);

    match command {
        Commands::Dashboard => {
            let data = client.fetch_dashboard_data().await;
            print_output(&data, format)
        }
        Commands::State(command) => run_state(&controller(), command, format).await,
        Commands::Export { dir } => {
            let file = controller().export_data().await?;
            let dir = dir.unwrap_or_else(default_download_dir);
            let path = file.write_to(&dir).await?;
            print_output(&json!({ "exported": path }), format)
        }
        Commands::Import { file } => {
            let state = controller().import_file(&file).await?;
            print_output(&state, format)
        }
        Commands::Ai(command) => {
            let result = match command {
                AiCommand::Analyze => client.run_ai_analysis().await?,
                AiCommand::Insights => client.get_ai_insights().await?,
                AiCommand::Chat { message } => client.send_ai_message(&message).await?,
            };
            print_output(&result, format)
        }
        Commands::Errors { export_dir } => show_errors(monitor, export_dir, format).await,
    }
}

async fn run_state(
    controller: &PersistenceController<DashboardClient>,
    command: StateCommand,
    format: OutputFormat,
) -> Result<()> {
    match command {
        StateCommand::Get => {
            let state = controller.load().await;
            print_output(&state, format)
        }
        StateCommand::Save { state } => {
            let state: PersistenceState = serde_json::from_str(&state)?;
            let outcome = match controller.save(&state).await? {
                SaveOutcome::Saved => "saved",
                SaveOutcome::Unchanged => "unchanged",
            };
            print_output(&json!({ "outcome": outcome }), format)
        }
    }
}

async fn show_errors(
    monitor: &ErrorMonitor,
    export_dir: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let stats = monitor.refresh();
    let mut report = json!({
        "total": stats.total,
        "by_category": stats.by_category,
        "by_severity": stats.by_severity,
        "entries": monitor.entry_views(),
    });

    if let Some(dir) = export_dir {
        let path = monitor.export_log()?.write_to(&dir).await?;
        report["exported"] = Value::from(path.display().to_string());
    }

    print_output(&report, format)
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn print_output<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(value)?),
        OutputFormat::Pretty => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
