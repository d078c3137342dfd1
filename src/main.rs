mod app;
mod catalog;
mod util;

use std::path::PathBuf;

use clap::Parser;

use crate::catalog::Catalog;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to a catalog JSON file overriding the embedded catalog.
    #[arg(long)]
    catalog: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => Catalog::from_file(path)?,
        None => Catalog::embedded()?,
    };
    log::info!(
        "loaded catalog: {} log types, {} categories",
        catalog.log_count(),
        catalog.categories.len()
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "pivotmap",
        options,
        Box::new(move |cc| Ok(Box::new(app::PivotMapApp::new(cc, catalog)))),
    )
    .map_err(|error| anyhow::anyhow!("failed to start UI: {error}"))
}
