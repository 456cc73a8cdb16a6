//! mbyte CLI - Command-line front-end for the mbyte manager and stores

mod context;
mod logging;
mod view;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use context::Context;
use futures::StreamExt;
use mbyte_core::application::{
    CommandPhase, CommandRunner, ContentNavigator, Location, ResolveOutcome,
};
use mbyte_core::port::{notification_channel, ContentService, ProcessService};
use mbyte_infra_http::config::default_config_path;
use mbyte_infra_http::{ClientConfig, ConfigOverrides};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

const NOTIFICATION_CAPACITY: usize = 32;

#[derive(Parser)]
#[command(name = "mbyte")]
#[command(about = "mbyte command-line client", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: $MBYTE_CONFIG, then the platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Manager API base URL
    #[arg(long, global = true)]
    manager_url: Option<String>,

    /// Store API base URL (derived from your store application when absent)
    #[arg(long, global = true)]
    store_url: Option<String>,

    /// Access token sent as bearer token
    #[arg(long, global = true, env = "MBYTE_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Owner used to look up the store application
    #[arg(long, global = true)]
    owner: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the processes of an application
    Procs {
        /// Application id
        app: String,

        /// Include finished processes
        #[arg(long)]
        all: bool,
    },

    /// List the commands available for an application
    #[command(name = "commands")]
    ListCommands {
        /// Application id
        app: String,

        /// Application status, to show which commands apply
        #[arg(long)]
        status: Option<String>,
    },

    /// Run a command and follow it until it finishes
    Run {
        /// Application id
        app: String,

        /// Command name (e.g. start, stop)
        command: String,
    },

    /// Follow the active process of an application
    Watch {
        /// Application id
        app: String,
    },

    /// Show a folder (or a file within the root listing) of your store
    Browse {
        /// Node id (default: root)
        node: Option<String>,
    },

    /// Download the content of a file
    Download {
        /// Node id
        node: String,

        /// Destination path (default: file name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Request inline content instead of an attachment
        #[arg(long)]
        inline: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging()?;

    let overrides = ConfigOverrides {
        manager_base_url: cli.manager_url.clone(),
        store_base_url: cli.store_url.clone(),
        access_token: cli.token.clone(),
    };
    let config = ClientConfig::load_with(cli.config.clone().or_else(default_config_path), overrides)
        .context("Failed to load configuration")?;
    debug!(manager = %config.manager_base_url, "Configuration loaded");

    // Failures reported by the services are printed as they happen
    let (notifier, mut notifications) = notification_channel(NOTIFICATION_CAPACITY);
    let printer = tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            eprintln!("{} {}", "✗".red(), notification.message.red());
        }
    });

    let context = Context::new(config, Arc::new(notifier));
    let result = run(cli.command, &context, cli.owner.as_deref()).await;

    drop(context);
    let _ = tokio::time::timeout(Duration::from_millis(200), printer).await;

    result
}

async fn run(command: Commands, context: &Context, owner: Option<&str>) -> Result<()> {
    match command {
        Commands::Procs { app, all } => list_processes(context, &app, all).await,
        Commands::ListCommands { app, status } => {
            list_commands(context, &app, status.as_deref()).await
        }
        Commands::Run { app, command } => run_command(context, &app, &command).await,
        Commands::Watch { app } => watch(context, &app).await,
        Commands::Browse { node } => browse(context, owner, node).await,
        Commands::Download {
            node,
            output,
            inline,
        } => download(context, owner, &node, output, inline).await,
    }
}

async fn list_processes(context: &Context, app: &str, all: bool) -> Result<()> {
    let processes = context
        .processes()?
        .list_processes(app, !all)
        .await
        .with_context(|| format!("Failed to list processes of {}", app))?;

    if processes.is_empty() {
        let scope = if all { "" } else { "active " };
        println!("{}", format!("No {}process for {}", scope, app).yellow());
        return Ok(());
    }
    println!("{}", view::processes_table(&processes));
    Ok(())
}

async fn list_commands(context: &Context, app: &str, status: Option<&str>) -> Result<()> {
    let commands = context
        .processes()?
        .list_commands(app)
        .await
        .with_context(|| format!("Failed to list commands of {}", app))?;

    if commands.is_empty() {
        println!("{}", format!("No command available for {}", app).yellow());
        return Ok(());
    }
    println!("{}", view::commands_table(&commands, status));
    Ok(())
}

async fn run_command(context: &Context, app: &str, command: &str) -> Result<()> {
    let runner = CommandRunner::with_poll_interval(
        app,
        context.processes()?,
        context.config().poll_interval(),
    );

    println!("{}", format!("▶ Running {} on {}", command, app).cyan().bold());
    runner.run_command(app, command).await;
    follow(&runner).await
}

async fn watch(context: &Context, app: &str) -> Result<()> {
    let runner =
        CommandRunner::attach(app, context.processes()?, context.config().poll_interval()).await;

    if runner.snapshot().phase == CommandPhase::Idle {
        println!("{}", format!("No active process for {}", app).yellow());
        return Ok(());
    }
    follow(&runner).await
}

/// Print every state change until the runner reaches completed or error (or Ctrl+C)
async fn follow(runner: &CommandRunner) -> Result<()> {
    let mut updates = runner.subscribe();
    let mut last = updates.borrow_and_update().clone();
    println!("{}", view::execution_line(&last));

    while !last.phase.is_finished() {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let exec = updates.borrow_and_update().clone();
                if exec != last {
                    println!("{}", view::execution_line(&exec));
                    last = exec;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                runner.dispose();
                println!("{}", "Stopped following, the process keeps running remotely".yellow());
                return Ok(());
            }
        }
    }

    if let Some(log) = last.last_snapshot.as_ref().and_then(|p| p.log.as_deref()) {
        println!();
        println!("{}", "Log:".bold());
        println!("{}", log);
    }

    match last.phase {
        CommandPhase::Error => anyhow::bail!(
            "Command failed: {}",
            last.last_error.unwrap_or_else(|| "unknown error".to_string())
        ),
        _ => Ok(()),
    }
}

async fn browse(context: &Context, owner: Option<&str>, node: Option<String>) -> Result<()> {
    let (base, contents) = context.store(owner).await?;
    let navigator = ContentNavigator::with_page_size(contents, context.config().page_size);

    let location = Location {
        base,
        reference: node,
    };
    let outcome = navigator.navigate_to(&location).await;
    info!(outcome = ?outcome, "Browse finished");
    if outcome != ResolveOutcome::Committed {
        anyhow::bail!("Nothing to browse");
    }

    let state = navigator.snapshot();
    if state.breadcrumb.is_empty() {
        println!("{}", "Location not found, showing the root folder".yellow());
    } else {
        println!("{}", state.breadcrumb.to_string().cyan().bold());
    }
    println!();

    if state.children.is_empty() {
        println!("{}", "Empty folder".dimmed());
    } else {
        println!("{}", view::nodes_table(&state.children));
    }

    if let Some(selected) = &state.selection {
        println!();
        println!("{}", "Selected".bold());
        println!("  {} {}", "Name:".bold(), selected.name);
        println!("  {} {}", "Id:".bold(), selected.id);
        println!("  {} {}", "Size:".bold(), view::format_size(selected.size));
        if let Some(mimetype) = &selected.mimetype {
            println!("  {} {}", "Type:".bold(), mimetype);
        }
        if let Some(modified) = selected.modification {
            println!("  {} {}", "Modified:".bold(), modified.to_rfc3339());
        }
    }
    Ok(())
}

async fn download(
    context: &Context,
    owner: Option<&str>,
    node_id: &str,
    output: Option<PathBuf>,
    inline: bool,
) -> Result<()> {
    let (_, contents) = context.store(owner).await?;
    let node = contents
        .get_node(node_id)
        .await
        .with_context(|| format!("Failed to get node {}", node_id))?;
    if node.is_folder() {
        anyhow::bail!("{} is a folder", node.name);
    }

    let path = output.unwrap_or_else(|| {
        PathBuf::from(if node.name.is_empty() {
            node.id.as_str()
        } else {
            node.name.as_str()
        })
    });

    let mut stream = contents
        .get_content(&node.id, !inline)
        .await
        .with_context(|| format!("Failed to open content of {}", node.id))?;
    let mut file = tokio::fs::File::create(&path)
        .await
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("Download interrupted")?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    println!(
        "{}",
        format!(
            "✓ Saved {} ({}) to {}",
            node.name,
            view::format_size(Some(written)),
            path.display()
        )
        .green()
        .bold()
    );
    Ok(())
}
