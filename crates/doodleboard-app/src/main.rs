//! Main application entry point.

use clap::{Args, Parser, Subcommand};
use doodleboard_app::{AppError, ReplayOptions, SaveTarget, import_generated, list_gallery, load_config, run_replay};
use doodleboard_core::prompt::{DEFAULT_ENDPOINT, prompt_url};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "doodleboard", about = "Replay, export and save DoodleBoard drawings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GalleryArgs {
    /// Gallery directory.
    #[arg(long, env = "DOODLEBOARD_GALLERY")]
    gallery: PathBuf,

    #[arg(long, env = "DOODLEBOARD_USER")]
    user: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a gesture script and export the drawing.
    Replay {
        script: PathBuf,

        /// Engine configuration JSON.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Sampling preset: coarse, touch, mobile, fine, mouse or web.
        #[arg(long)]
        sampling: Option<String>,

        #[arg(long)]
        png: Option<PathBuf>,

        /// Write the vector surface as JSON.
        #[arg(long)]
        vector: Option<PathBuf>,

        /// Save to this gallery directory.
        #[arg(long, env = "DOODLEBOARD_GALLERY")]
        gallery: Option<PathBuf>,

        #[arg(long, env = "DOODLEBOARD_USER", default_value = "local")]
        user: String,

        #[arg(long, default_value = "Untitled")]
        title: String,
    },
    /// Print the generation URL for a prompt.
    PromptUrl {
        prompt: String,

        #[arg(long, default_value = DEFAULT_ENDPOINT)]
        endpoint: String,
    },
    /// Save a generated image to the gallery.
    Import {
        image: PathBuf,

        #[arg(long)]
        prompt: String,

        #[command(flatten)]
        target: GalleryArgs,

        #[arg(long)]
        title: Option<String>,
    },
    /// List saved artifacts.
    List {
        #[command(flatten)]
        target: GalleryArgs,
    },
}

fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Replay {
            script,
            config,
            sampling,
            png,
            vector,
            gallery,
            user,
            title,
        } => {
            let config = load_config(config.as_deref(), sampling.as_deref())?;
            let options = ReplayOptions {
                png,
                vector,
                save: gallery.map(|gallery| SaveTarget {
                    gallery,
                    user_id: user,
                    title,
                }),
            };
            let outcome = run_replay(config, &script, &options)?;
            println!(
                "{} paths on canvas ({} committed, {} erase passes)",
                outcome.paths, outcome.stats.committed, outcome.stats.erase_passes
            );
            if let Some(id) = outcome.artifact_id {
                println!("saved {}", id);
            }
        }
        Command::PromptUrl { prompt, endpoint } => {
            println!("{}", prompt_url(&endpoint, &prompt)?);
        }
        Command::Import {
            image,
            prompt,
            target,
            title,
        } => {
            let target = SaveTarget {
                gallery: target.gallery,
                user_id: target.user,
                title: title.unwrap_or_else(|| prompt.clone()),
            };
            let id = import_generated(&image, &prompt, &target)?;
            println!("saved {}", id);
        }
        Command::List { target } => {
            for record in list_gallery(&target.gallery, &target.user)? {
                println!(
                    "{}  {:>4}  {}x{}  {}",
                    record.id,
                    record.format.extension(),
                    record.width,
                    record.height,
                    record.title
                );
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting DoodleBoard");

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
