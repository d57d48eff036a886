//! taskscope CLI - locate, classify and download task service artifacts.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use taskscope_client::{ClientConfig, TaskClient, ROOT_URL_ENV};
use taskscope_core::{classify, Classification, GroupTask, Platform, TaskId};

/// taskscope CLI - task service index, queue and artifact tool
#[derive(Parser)]
#[command(name = "taskscope")]
#[command(about = "CLI for the task service index, queue and artifact APIs", long_about = None)]
struct Cli {
    /// Deployment root URL
    #[arg(long, env = ROOT_URL_ENV)]
    root_url: Option<String>,

    /// Page size for task-group listings
    #[arg(long, default_value_t = 200)]
    page_limit: u32,

    /// Total download attempts
    #[arg(long, default_value_t = 5)]
    attempts: u32,

    /// Seconds to wait between download attempts
    #[arg(long, default_value_t = 30)]
    retry_delay_secs: u64,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the coverage build of a revision in the index
    #[command(name = "find-task")]
    FindTask {
        /// Repository branch (e.g. mozilla-central)
        #[arg(short, long)]
        branch: String,

        /// Revision hash
        #[arg(short, long)]
        revision: String,

        /// Platform: linux, windows or android
        #[arg(short, long)]
        platform: Platform,
    },

    /// Print the status of a task
    Status {
        /// Task ID
        id: String,
    },

    /// Print the definition of a task
    Task {
        /// Task ID
        id: String,
    },

    /// List the artifacts of a task
    Artifacts {
        /// Task ID
        id: String,
    },

    /// List the tasks of a task group
    Group {
        /// Task group ID
        id: String,

        /// Only show coverage tasks
        #[arg(long)]
        coverage_only: bool,
    },

    /// Classify task names without contacting the service
    Classify {
        /// Task names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Download an artifact and check it is a valid zip archive
    Download {
        /// Task ID
        task_id: String,

        /// Artifact name (e.g. public/test_info/code-coverage-grcov.zip)
        artifact: String,

        /// Destination file
        destination: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config = client_config(&cli);

    match cli.command {
        // Offline, no client needed.
        Commands::Classify { names } => {
            classify_names(&names)?;
        }
        Commands::FindTask {
            branch,
            revision,
            platform,
        } => {
            let client = connect(config)?;
            return find_task(&client, &branch, &revision, platform).await;
        }
        Commands::Status { id } => {
            let client = connect(config)?;
            let status = client.get_task_status(&TaskId::new(id)).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Commands::Task { id } => {
            let client = connect(config)?;
            let task = client.get_task_details(&TaskId::new(id)).await?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        Commands::Artifacts { id } => {
            list_artifacts(&connect(config)?, TaskId::new(id)).await?;
        }
        Commands::Group { id, coverage_only } => {
            list_group(&connect(config)?, TaskId::new(id), coverage_only).await?;
        }
        Commands::Download {
            task_id,
            artifact,
            destination,
        } => {
            let client = connect(config)?;
            client
                .download_artifact(&destination, &TaskId::new(task_id), &artifact)
                .await?;
            println!("{}", destination.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Environment defaults overridden by command-line flags.
fn client_config(cli: &Cli) -> ClientConfig {
    let mut config = ClientConfig::from_env();
    if let Some(root_url) = &cli.root_url {
        config.root_url = root_url.clone();
    }
    config.page_limit = cli.page_limit;
    config.download_attempts = cli.attempts;
    config.retry_delay = Duration::from_secs(cli.retry_delay_secs);
    config
}

fn connect(config: ClientConfig) -> Result<TaskClient, Box<dyn std::error::Error>> {
    let client = TaskClient::new(config)?;
    debug!(
        root_url = %client.config().root_url,
        attempts = client.config().download_attempts,
        "Client ready"
    );
    Ok(client)
}

/// Prints the task id; exits with 1 when the revision is not indexed.
async fn find_task(
    client: &TaskClient,
    branch: &str,
    revision: &str,
    platform: Platform,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match client.resolve_coverage_task(branch, revision, platform).await? {
        Some(task_id) => {
            println!("{}", task_id);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            info!(branch = %branch, revision = %revision, platform = %platform, "No indexed task");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn list_artifacts(client: &TaskClient, id: TaskId) -> Result<(), Box<dyn std::error::Error>> {
    let artifacts = client.list_artifacts(&id).await?;

    println!("Artifacts ({}):", artifacts.len());
    println!("{:<8}  {:<24}  {}", "STORAGE", "CONTENT TYPE", "NAME");
    println!("{}", "-".repeat(80));

    for artifact in artifacts {
        let content_type = artifact.content_type.as_deref().unwrap_or("-");
        println!("{:<8}  {:<24}  {}", artifact.storage_type, content_type, artifact.name);
    }

    Ok(())
}

async fn list_group(
    client: &TaskClient,
    id: TaskId,
    coverage_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let tasks = client.list_task_group_all(&id).await?;

    println!(
        "{:<22}  {:<10}  {:<8}  {:<28}  {:<24}  {}",
        "ID", "STATE", "PLATFORM", "CHUNK", "SUITE", "NAME"
    );
    println!("{}", "-".repeat(128));

    let rows: Vec<String> = tasks
        .iter()
        .filter_map(|task| group_row(task, coverage_only))
        .collect();
    for row in &rows {
        println!("{}", row);
    }

    println!("\n{} of {} tasks", rows.len(), tasks.len());
    Ok(())
}

/// One table line for `task`, or `None` when filtered out.
fn group_row(task: &GroupTask, coverage_only: bool) -> Option<String> {
    let name = task.task.name();
    let classification = classify(name).unwrap_or(Classification::NotCoverage);
    let identity = classification.identity();
    if coverage_only && identity.is_none() {
        return None;
    }

    let (platform, chunk, suite) = match identity {
        Some(identity) => (
            identity.platform.as_str(),
            identity.chunk.as_str(),
            identity.suite.as_str(),
        ),
        None => ("-", "-", "-"),
    };
    Some(format!(
        "{:<22}  {:<10}  {:<8}  {:<28}  {:<24}  {}",
        task.task_id().as_str(),
        task.status.state.as_str(),
        platform,
        chunk,
        suite,
        name
    ))
}

fn classify_names(names: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    for name in names {
        let result = classify(name)?;
        println!("{}\t{}", name, serde_json::to_string(&result)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn group_task(name: &str) -> GroupTask {
        serde_json::from_value(json!({
            "status": {"taskId": "AN1M9SW0QY6DZT6suL3zlQ", "state": "completed", "runs": []},
            "task": {"metadata": {"name": name}}
        }))
        .unwrap()
    }

    #[test]
    fn test_group_row_shows_chunk_and_suite() {
        let row = group_row(&group_task("test-linux64-ccov/debug-mochitest-e10s-7"), true).unwrap();
        let columns: Vec<&str> = row.split_whitespace().collect();
        assert_eq!(
            columns,
            [
                "AN1M9SW0QY6DZT6suL3zlQ",
                "completed",
                "linux",
                "mochitest-plain-chunked-7",
                "mochitest-plain-chunked",
                "test-linux64-ccov/debug-mochitest-e10s-7",
            ]
        );
    }

    #[test]
    fn test_group_row_filters_non_coverage() {
        let task = group_task("test-linux64/debug-mochitest-1");
        assert!(group_row(&task, true).is_none());

        let row = group_row(&task, false).unwrap();
        assert_eq!(row.split_whitespace().filter(|c| *c == "-").count(), 3);
    }

    #[test]
    fn test_classify_parses_without_root_url() {
        let cli = Cli::try_parse_from(["taskscope", "classify", "build-win64-ccov/debug"]).unwrap();
        assert!(matches!(cli.command, Commands::Classify { ref names } if names.len() == 1));
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "taskscope",
            "--root-url",
            "http://taskcluster.test",
            "--attempts",
            "3",
            "--retry-delay-secs",
            "1",
            "find-task",
            "--branch",
            "mozilla-central",
            "--revision",
            "b2a9a4bb5c94",
            "--platform",
            "windows",
        ])
        .unwrap();

        let config = client_config(&cli);
        assert_eq!(config.root_url, "http://taskcluster.test");
        assert_eq!(config.download_attempts, 3);
        assert_eq!(config.retry_delay, Duration::from_secs(1));
        assert!(matches!(
            cli.command,
            Commands::FindTask { platform: Platform::Windows, .. }
        ));
    }
}
