mod app;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use folio_field::ShareState;
use folio_field::config;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Portfolio JSON; the bundled sample is used when omitted.
    #[arg(long)]
    data: Option<PathBuf>,
    /// Field config TOML; defaults to the per-user config file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Share link search string, e.g. `query=Rust&filter=DevOps`.
    #[arg(long, default_value = "")]
    link: String,
    #[arg(long, value_enum, default_value = "field")]
    mode: app::ViewMode,
    #[arg(long)]
    reduced_motion: bool,
    /// Write the effective config back to its file and exit.
    #[arg(long)]
    write_config: bool,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut field_config = match &args.config {
        Some(path) => config::load_or_default_from_path(path),
        None => config::load_or_default(),
    };
    if args.reduced_motion {
        field_config.motion.reduced_motion = true;
    }

    if args.write_config {
        match &args.config {
            Some(path) => config::save_to_path(&field_config, path)?,
            None => config::save(&field_config)?,
        }
        tracing::info!("config written");
        return Ok(());
    }

    let link = ShareState::from_search(&args.link);
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 820.0]),
        ..Default::default()
    };

    eframe::run_native(
        "folio-field",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::FolioFieldApp::new(
                cc,
                args.data.clone(),
                field_config.clone(),
                link.clone(),
                args.mode,
            )))
        }),
    )
    .map_err(|error| anyhow::anyhow!("{error}"))
    .context("viewer exited with an error")
}
