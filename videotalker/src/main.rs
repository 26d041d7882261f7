// VideoTalker - Timestamped video annotations
// Entry point and command dispatch

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use videotalker::commands::{self, AddArgs, DeleteArgs, EditArgs, ListArgs, PlayArgs};

#[derive(Parser)]
#[command(name = "videotalker")]
#[command(about = "Timestamped annotations and on-screen markers for video files")]
#[command(version)]
struct Cli {
    /// Directory holding settings.json (defaults are used when omitted)
    #[arg(long, global = true)]
    settings_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a video's annotations in time order
    List(ListArgs),

    /// Add an annotation
    Add(AddArgs),

    /// Edit an annotation
    Edit(EditArgs),

    /// Delete an annotation
    Delete(DeleteArgs),

    /// Print the annotation outline
    Outline(ListArgs),

    /// Simulate playback and log marker transitions
    Play(PlayArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "videotalker=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let settings = commands::load_settings(cli.settings_dir)
        .await
        .context("Failed to load settings")?;

    match cli.command {
        Commands::List(args) => {
            commands::list_annotations(args, &settings)
                .await
                .context("Failed to list annotations")?;
        }
        Commands::Add(args) => {
            commands::add_annotation(args, &settings)
                .await
                .context("Failed to add annotation")?;
        }
        Commands::Edit(args) => {
            commands::edit_annotation(args, &settings)
                .await
                .context("Failed to edit annotation")?;
        }
        Commands::Delete(args) => {
            commands::delete_annotation(args, &settings)
                .await
                .context("Failed to delete annotation")?;
        }
        Commands::Outline(args) => {
            commands::print_outline(args, &settings)
                .await
                .context("Failed to build outline")?;
        }
        Commands::Play(args) => {
            commands::play(args, &settings)
                .await
                .context("Failed to play annotations")?;
        }
    }

    Ok(())
}
