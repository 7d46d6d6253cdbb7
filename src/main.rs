// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stadium::persistence::{self, document_from_colors};
use stadium::show::ShowWatcher;
use stadium::{
    ColorBuffer, DirectorySource, EngineSettings, InstallationFile, LightController, LightEngine,
    LedRegistry,
};

#[derive(Parser)]
#[command(author, version, about = "Stadium LED show engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print sections, LED counts and duplicate positions of a layout
    Inspect {
        /// Layout file (.yaml, or .txt position list)
        layout: PathBuf,

        /// Engine settings (.toml)
        #[arg(long)]
        settings: Option<PathBuf>,
    },
    /// Convert a position list ("x, z" per line) into a YAML layout
    ImportPositions {
        /// Position list
        input: PathBuf,

        /// Output layout file
        #[arg(long)]
        out: PathBuf,

        /// Name of the single section
        #[arg(long, default_value = "Section 1")]
        section: String,
    },
    /// Load save documents against a layout and report unresolved entries
    Validate {
        /// Save documents (.json)
        documents: Vec<PathBuf>,

        /// Layout file
        #[arg(long)]
        layout: PathBuf,

        /// Engine settings (.toml)
        #[arg(long)]
        settings: Option<PathBuf>,
    },
    /// Play a show in real time
    Play {
        /// Layout file
        #[arg(long)]
        layout: PathBuf,

        /// Directory holding `{show}/{step}.json`
        #[arg(long)]
        shows: PathBuf,

        /// Engine settings (.toml)
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Stop after this many seconds
        #[arg(long, default_value_t = 10.0)]
        seconds: f64,

        /// Ticks per second
        #[arg(long, default_value_t = 30.0)]
        fps: f64,

        /// Re-apply step files when they are edited
        #[arg(long)]
        watch: bool,
    },
    /// Run a show headless up to a time and export the frame as a show step
    Snapshot {
        /// Layout file
        #[arg(long)]
        layout: PathBuf,

        /// Directory holding `{show}/{step}.json`
        #[arg(long)]
        shows: PathBuf,

        /// Engine settings (.toml)
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Real time in seconds since the show began
        #[arg(long)]
        at: f64,

        /// Ticks per second
        #[arg(long, default_value_t = 30.0)]
        fps: f64,

        /// Output document
        #[arg(long)]
        out: PathBuf,
    },
}

fn load_layout(path: &Path) -> Result<InstallationFile> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("txt") => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read position list: {:?}", path))?;
            InstallationFile::from_positions_txt(&text, "Section 1")
        }
        _ => InstallationFile::load(path),
    }
}

fn load_settings(path: Option<&Path>, fallback: EngineSettings) -> Result<EngineSettings> {
    match path {
        Some(path) => EngineSettings::load(path),
        None => Ok(fallback),
    }
}

fn build_registry(layout: &Path, settings: &EngineSettings) -> Result<LedRegistry> {
    let layout = load_layout(layout)?;
    Ok(LedRegistry::build(&layout, settings.section_order))
}

fn build_controller(
    layout: &Path,
    shows: &Path,
    settings: Option<&Path>,
) -> Result<LightController<ColorBuffer, DirectorySource>> {
    let settings = load_settings(settings, EngineSettings::viewer())?;
    let registry = build_registry(layout, &settings)?;
    let sink = ColorBuffer::new(registry.len());
    Ok(LightController::from_settings(
        registry,
        settings,
        sink,
        DirectorySource::new(shows),
    )?)
}

fn inspect(layout: &Path, settings: Option<&Path>) -> Result<()> {
    let settings = load_settings(settings, EngineSettings::default())?;
    let registry = build_registry(layout, &settings)?;

    println!("{} LEDs in {} sections", registry.len(), registry.section_count());
    for (i, name) in registry.section_names().iter().enumerate() {
        println!(
            "  [{}] {:<20} {:>6} LEDs  {:>4} rows  starts at {}",
            i,
            name,
            registry.section_len(i)?,
            registry.row_starts(i)?.len(),
            registry.section_starts()[i]
        );
    }
    if !registry.duplicates().is_empty() {
        println!("{} duplicate positions:", registry.duplicates().len());
        for &led in registry.duplicates() {
            if let Some(pos) = registry.canonical_position(led) {
                println!("  {} at {}", led, pos);
            }
        }
    }
    Ok(())
}

fn import_positions(input: &Path, out: &Path, section: &str) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read position list: {:?}", input))?;
    let layout = InstallationFile::from_positions_txt(&text, section)?;
    layout.save(out)?;
    println!("Wrote {} LEDs to {:?}", layout.led_count(), out);
    Ok(())
}

fn validate(documents: &[PathBuf], layout: &Path, settings: Option<&Path>) -> Result<()> {
    let settings = load_settings(settings, EngineSettings::viewer())?;
    let registry = build_registry(layout, &settings)?;
    let sink = ColorBuffer::new(registry.len());
    let mut engine = LightEngine::new(registry, settings, sink)?;

    let mut failures = 0;
    for path in documents {
        let document = persistence::load_from_path(path)?;
        let report = engine.load_state(&document);
        let ok = report.skipped_groups.is_empty() && report.skipped_members == 0;
        println!(
            "{:?}: {} groups applied, {} unknown groups, {} unresolved members",
            path,
            report.applied,
            report.skipped_groups.len(),
            report.skipped_members
        );
        if !ok {
            failures += 1;
        }
    }

    if failures > 0 {
        return Err(anyhow!("{} of {} documents did not fully resolve", failures, documents.len()));
    }
    Ok(())
}

fn play(
    layout: &Path,
    shows: &Path,
    settings: Option<&Path>,
    seconds: f64,
    fps: f64,
    watch: bool,
) -> Result<()> {
    if !fps.is_finite() || fps <= 0.0 {
        return Err(anyhow!("fps must be positive, got {}", fps));
    }
    let mut controller = build_controller(layout, shows, settings)?;
    let watcher = if watch {
        Some(ShowWatcher::new(shows, None)?)
    } else {
        None
    };

    let frame = Duration::from_secs_f64(1.0 / fps);
    let start = Instant::now();
    controller.begin_show(0.0);

    let mut ticks = 0u64;
    while start.elapsed().as_secs_f64() < seconds {
        if let Some(watcher) = &watcher {
            for event in watcher.recv_all() {
                controller.handle_show_event(&event);
            }
        }
        controller.tick(start.elapsed().as_secs_f64());
        ticks += 1;

        let next = frame.saturating_mul(ticks as u32);
        if let Some(wait) = next.checked_sub(start.elapsed()) {
            thread::sleep(wait);
        }
    }

    controller.end_show();
    info!(
        "Played {} ticks, last step {}",
        ticks,
        controller.player().last_loaded_step()
    );
    if let Some(step) = controller.player().stalled_on() {
        warn!("Playback stalled on step {}", step);
    }
    Ok(())
}

fn snapshot(
    layout: &Path,
    shows: &Path,
    settings: Option<&Path>,
    at: f64,
    fps: f64,
    out: &Path,
) -> Result<()> {
    if !fps.is_finite() || fps <= 0.0 {
        return Err(anyhow!("fps must be positive, got {}", fps));
    }
    let mut controller = build_controller(layout, shows, settings)?;
    controller.begin_show(0.0);

    let frames = (at * fps).ceil().max(0.0) as u64;
    for i in 0..=frames {
        controller.tick((i as f64 / fps).min(at));
    }

    let document = document_from_colors(controller.engine().sink().colors());
    persistence::save_to_path(&document, out)?;
    println!(
        "Wrote {} color groups at step {} to {:?}",
        document.groups.len(),
        controller.player().last_loaded_step(),
        out
    );
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Inspect { layout, settings } => inspect(&layout, settings.as_deref()),
        Commands::ImportPositions {
            input,
            out,
            section,
        } => import_positions(&input, &out, &section),
        Commands::Validate {
            documents,
            layout,
            settings,
        } => validate(&documents, &layout, settings.as_deref()),
        Commands::Play {
            layout,
            shows,
            settings,
            seconds,
            fps,
            watch,
        } => play(&layout, &shows, settings.as_deref(), seconds, fps, watch),
        Commands::Snapshot {
            layout,
            shows,
            settings,
            at,
            fps,
            out,
        } => snapshot(&layout, &shows, settings.as_deref(), at, fps, out.as_path()),
    }
}
