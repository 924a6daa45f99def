//! Bakatex CLI - typesets the volumes listed in a config file.

use anyhow::{Context, Result};
use bakatex::pipeline::{Pipeline, VolumeStatus};
use bakatex::{Config, Console, HttpFetcher, LatexRenderer, Settings, Template};
use clap::Parser;
use std::path::PathBuf;

/// Turns wiki-hosted light novel volumes into typeset documents.
#[derive(Parser, Debug)]
#[command(name = "bakatex")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Volume list: author, title, then one `<url> <volume title>` per line.
    config_file: PathBuf,

    /// Settings file to use instead of the one in the config directory.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Directory holding the template files.
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Typesetting command to run on each changed volume.
    #[arg(long)]
    renderer: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let console = Console::new();

    if let Err(e) = run(args, &console).await {
        console.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

async fn run(args: Args, console: &Console) -> Result<()> {
    console.section("Bakatex");

    console.step("Loading settings...");
    let mut settings = match &args.settings {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .context("Failed to load settings")?;

    if let Some(dir) = args.templates {
        settings.paths.templates_directory = dir;
    }
    if let Some(command) = args.renderer {
        settings.render.command = command;
    }
    settings.validate().context("Invalid settings")?;

    let config = Config::load_from(&args.config_file)
        .with_context(|| format!("Failed to load {}", args.config_file.display()))?;
    console.success(&format!(
        "{} by {}: {} volume(s)",
        config.main_title,
        config.author,
        console.count(config.volumes.len())
    ));

    console.step("Loading templates...");
    let template = Template::load(&settings.paths.templates_directory)
        .context("Failed to load templates")?;

    let renderer = LatexRenderer::locate(&settings.render.command, console.clone())?;
    console.info(&format!("Renderer: {}", console.path(renderer.program())));

    let fetcher = HttpFetcher::new(settings.scraping.delay_between_requests_sec)
        .context("Failed to create HTTP client")?;

    let pipeline = Pipeline::new(&fetcher, &renderer, &template, &settings, console);
    let statuses = pipeline.run(&config).await?;

    let generated = statuses
        .iter()
        .filter(|status| **status == VolumeStatus::Generated)
        .count();
    console.section("Done!");
    console.info(&format!(
        "{} generated, {} up-to-date",
        console.count(generated),
        console.count(statuses.len() - generated)
    ));

    Ok(())
}
